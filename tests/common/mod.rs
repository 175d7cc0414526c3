//! Shared test fixtures: a scripted search backend and a gateway server
//! wired to it.

use async_trait::async_trait;
use axum_test::TestServer;
use genogate::handlers::{create_router, AppState};
use genogate::pipeline::Limits;
use genogate::solr::{DocStream, SearchBackend, SolrQuery, SolrResponse};
use genogate::types::{Collection, Doc};
use genogate::Result;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Backend double. Responses are canned per collection; every dispatched
/// query is recorded so tests can assert on what the handlers sent.
pub struct MockBackend {
    bodies: Mutex<HashMap<Collection, Value>>,
    pub queries: Mutex<Vec<(Collection, SolrQuery)>>,
}

impl MockBackend {
    pub fn new() -> MockBackend {
        MockBackend {
            bodies: Mutex::new(HashMap::new()),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Can a full response body for a collection.
    pub fn respond(self, collection: Collection, body: Value) -> Self {
        self.bodies.lock().unwrap().insert(collection, body);
        self
    }

    /// Can a plain document-list response for a collection.
    pub fn respond_docs(self, collection: Collection, docs: Value) -> Self {
        let count = docs.as_array().map(|docs| docs.len()).unwrap_or(0);
        self.respond(
            collection,
            json!({"response": {"numFound": count, "start": 0, "docs": docs}}),
        )
    }

    fn body(&self, collection: Collection) -> Value {
        self.bodies
            .lock()
            .unwrap()
            .get(&collection)
            .cloned()
            .unwrap_or_else(|| json!({"response": {"numFound": 0, "start": 0, "docs": []}}))
    }
}

#[async_trait]
impl SearchBackend for MockBackend {
    async fn query(&self, collection: Collection, query: &SolrQuery) -> Result<SolrResponse> {
        self.queries.lock().unwrap().push((collection, query.clone()));
        SolrResponse::from_body(self.body(collection))
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Doc>> {
        let response = SolrResponse::from_body(self.body(collection))?;
        let key = collection.primary_key();
        Ok(response
            .response
            .docs
            .into_iter()
            .find(|doc| matches_id(doc.get(key), id)))
    }

    async fn stream(&self, collection: Collection, query: &SolrQuery) -> Result<DocStream> {
        self.queries.lock().unwrap().push((collection, query.clone()));
        let response = SolrResponse::from_body(self.body(collection))?;
        let docs: Vec<Result<Doc>> = response.response.docs.into_iter().map(Ok).collect();
        Ok(Box::pin(tokio_stream::iter(docs)))
    }
}

// Primary keys arrive as strings from some collections and numbers from
// others (taxon_id).
fn matches_id(value: Option<&Value>, id: &str) -> bool {
    match value {
        Some(Value::String(s)) => s == id,
        Some(Value::Number(n)) => n.to_string() == id,
        _ => false,
    }
}

/// Build a gateway over the given backend. The tree directory is empty;
/// tests that serve trees write files into it.
pub fn create_test_server(backend: MockBackend) -> (TestServer, Arc<MockBackend>, TempDir) {
    let backend = Arc::new(backend);
    let shared: Arc<dyn SearchBackend> = backend.clone();
    let tree_dir = tempfile::tempdir().unwrap();

    let state = AppState {
        backend: shared,
        limits: Limits {
            default_rows: 25,
            max_rows: 25000,
        },
        api_url: "http://localhost:8080".to_string(),
        content_url: "https://www.bv-brc.org".to_string(),
        tree_dir: tree_dir.path().to_path_buf(),
    };

    let app = create_router(state);
    (TestServer::new(app).unwrap(), backend, tree_dir)
}
