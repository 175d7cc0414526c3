//! Decoration steps applied to every backend-bound query.
//!
//! Order matters: visibility filters are appended before limits are
//! clamped, and every dispatch is counted.

use crate::metrics::METRICS;
use crate::rql;
use crate::solr::{DocStream, SearchBackend, SolrQuery, SolrResponse};
use crate::types::{CallMethod, Collection, UserContext};
use crate::Result;

/// Row limits from configuration.
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    pub default_rows: usize,
    pub max_rows: usize,
}

/// Anonymous callers see public documents; authenticated callers also see
/// what they own or were granted read access to.
pub fn visibility_filter(user: Option<&UserContext>) -> String {
    match user {
        Some(user) => {
            let id = rql::escape_value(&user.user_id);
            format!("public:true OR owner:{} OR user_read:{}", id, id)
        }
        None => "public:true".to_string(),
    }
}

pub fn decorate(query: &mut SolrQuery, collection: Collection, user: Option<&UserContext>) {
    if collection.has_private_docs() {
        query.filters.push(visibility_filter(user));
    }
}

pub fn clamp(query: &mut SolrQuery, limits: &Limits) {
    let rows = query.rows.unwrap_or(limits.default_rows);
    query.rows = Some(rows.min(limits.max_rows));
}

/// Parse an `items=a-b` Range header into (start, rows). Bounds are
/// inclusive, so `items=0-24` asks for 25 rows.
pub fn parse_range_items(value: &str) -> Option<(usize, usize)> {
    let rest = value.trim().strip_prefix("items=")?;
    let (start, end) = rest.split_once('-')?;
    let start: usize = start.trim().parse().ok()?;
    let end: usize = end.trim().parse().ok()?;
    (end >= start).then(|| (start, end - start + 1))
}

/// Content-Range value for one JSON result page.
pub fn content_range(start: u64, returned: usize, total: u64) -> String {
    let end = start + (returned as u64).saturating_sub(1);
    format!("items {}-{}/{}", start, end, total)
}

/// Decorate, clamp, count, and run one query page.
pub async fn run_query(
    backend: &dyn SearchBackend,
    limits: &Limits,
    collection: Collection,
    mut query: SolrQuery,
    user: Option<&UserContext>,
) -> Result<SolrResponse> {
    decorate(&mut query, collection, user);
    clamp(&mut query, limits);
    METRICS.record_call(collection, CallMethod::Query);
    backend.query(collection, &query).await
}

/// Decorate, count, and stream a full result set. Row limits do not apply;
/// the backend client pages with a cursor.
pub async fn run_stream(
    backend: &dyn SearchBackend,
    collection: Collection,
    mut query: SolrQuery,
    user: Option<&UserContext>,
) -> Result<DocStream> {
    decorate(&mut query, collection, user);
    METRICS.record_call(collection, CallMethod::Stream);
    backend.stream(collection, &query).await
}

/// Primary-key lookup. Collections with private documents go through a
/// decorated query so invisible documents stay invisible.
pub async fn run_get(
    backend: &dyn SearchBackend,
    collection: Collection,
    id: &str,
    user: Option<&UserContext>,
) -> Result<Option<crate::types::Doc>> {
    METRICS.record_call(collection, CallMethod::Get);
    if collection.has_private_docs() {
        let mut query = SolrQuery::matching(format!(
            "{}:{}",
            collection.primary_key(),
            rql::escape_value(id)
        ))
        .rows(1);
        query.filters.push(visibility_filter(user));
        let response = backend.query(collection, &query).await?;
        Ok(response.response.docs.into_iter().next())
    } else {
        backend.get(collection, id).await
    }
}
