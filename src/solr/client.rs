use super::{DocStream, SearchBackend, SolrQuery, SolrResponse, SortSpec};
use crate::metrics::METRICS;
use crate::types::{Collection, Doc};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio_stream::wrappers::ReceiverStream;

/// Rows fetched per page when streaming a full result set.
const STREAM_PAGE_SIZE: usize = 25_000;

/// Solr implementation of [`SearchBackend`].
#[derive(Clone)]
pub struct SolrClient {
    client: Client,
    base_url: String,
}

impl SolrClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base = url::Url::parse(base_url)
            .map_err(|e| Error::Internal(format!("invalid backend URL {}: {}", base_url, e)))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Internal(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base.as_str().trim_end_matches('/').to_string(),
        })
    }

    fn select_url(&self, collection: Collection) -> String {
        format!("{}/{}/select", self.base_url, collection.as_str())
    }

    async fn select(&self, collection: Collection, query: &SolrQuery) -> Result<SolrResponse> {
        let mut params = query.to_params();
        params.push(("wt".to_string(), "json".to_string()));

        tracing::debug!("solr select {}: q={}", collection, query.effective_q());

        let response = self
            .client
            .post(self.select_url(collection))
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                METRICS.upstream_errors.fetch_add(1, Ordering::Relaxed);
                Error::Upstream(format!("{} select failed: {}", collection, e))
            })?;

        let status = response.status();
        if !status.is_success() {
            METRICS.upstream_errors.fetch_add(1, Ordering::Relaxed);
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream(format!(
                "{} select returned {}: {}",
                collection,
                status,
                body.chars().take(500).collect::<String>()
            )));
        }

        let body = response.json().await.map_err(|e| {
            METRICS.upstream_errors.fetch_add(1, Ordering::Relaxed);
            Error::Upstream(format!("{} select returned invalid JSON: {}", collection, e))
        })?;

        SolrResponse::from_body(body)
    }
}

#[async_trait]
impl SearchBackend for SolrClient {
    async fn query(&self, collection: Collection, query: &SolrQuery) -> Result<SolrResponse> {
        self.select(collection, query).await
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Doc>> {
        let query = SolrQuery::matching(format!(
            "{}:{}",
            collection.primary_key(),
            crate::rql::escape_value(id)
        ))
        .rows(1);

        let response = self.select(collection, &query).await?;
        Ok(response.response.docs.into_iter().next())
    }

    async fn stream(&self, collection: Collection, query: &SolrQuery) -> Result<DocStream> {
        // Cursor paging needs a total order ending on the unique key.
        let mut query = query.clone();
        query.start = None;
        query.rows = Some(STREAM_PAGE_SIZE);
        if !query.sort.iter().any(|s| s.field == collection.primary_key()) {
            query.sort.push(SortSpec {
                field: collection.primary_key().to_string(),
                direction: super::SortDirection::Asc,
            });
        }

        let client = self.clone();
        let (tx, rx) = tokio::sync::mpsc::channel::<Result<Doc>>(256);

        tokio::spawn(async move {
            let mut mark = "*".to_string();
            loop {
                query.cursor = Some(mark.clone());
                let page = match client.select(collection, &query).await {
                    Ok(page) => page,
                    Err(e) => {
                        let _ = tx.send(Err(e)).await;
                        return;
                    }
                };

                let next = page.next_cursor_mark.clone();
                for doc in page.response.docs {
                    if tx.send(Ok(doc)).await.is_err() {
                        // Receiver dropped, stop paging.
                        return;
                    }
                }

                match next {
                    Some(next) if next != mark => mark = next,
                    _ => return,
                }
            }
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }
}
