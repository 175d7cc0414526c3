//! Search backend abstraction.
//!
//! The gateway talks to its search service through the [`SearchBackend`]
//! trait so handlers and tests can swap implementations. The production
//! implementation is [`SolrClient`]; integration tests inject a mock.

mod client;
mod query;
mod response;

pub use client::SolrClient;
pub use query::{SolrQuery, SortDirection, SortSpec};
pub use response::{DocList, FieldStats, RangeFacet, SolrResponse};

use crate::types::{Collection, Doc};
use crate::Result;
use async_trait::async_trait;

/// Stream of documents from a cursor-paged backend result.
pub type DocStream = std::pin::Pin<Box<dyn tokio_stream::Stream<Item = Result<Doc>> + Send>>;

/// Search backend trait for the collections the gateway serves.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Run a query and return one result page.
    async fn query(&self, collection: Collection, query: &SolrQuery) -> Result<SolrResponse>;

    /// Fetch a single document by primary key.
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Doc>>;

    /// Stream the full result set, paging with a cursor.
    async fn stream(&self, collection: Collection, query: &SolrQuery) -> Result<DocStream>;
}
