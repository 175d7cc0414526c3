//! Generic data-API endpoints over the search collections.
//!
//! Queries arrive as RQL (query string, form field, or raw body) or as raw
//! backend parameters; responses are negotiated through `Accept`. The
//! `download` header switches to streamed attachment dispatch.

use super::AppState;
use crate::auth::OptionalUser;
use crate::media::{self, MediaType};
use crate::pipeline;
use crate::solr::{SolrQuery, SolrResponse};
use crate::types::{Collection, UserContext};
use crate::{rql, Error, Result};
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use percent_encoding::percent_decode_str;

pub async fn get_document(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
    OptionalUser(user): OptionalUser,
) -> Result<Response> {
    let collection = resolve(&collection)?;
    let media = accepted_media(&headers)?;

    if media == MediaType::SolrJson {
        let query = SolrQuery::matching(format!(
            "{}:{}",
            collection.primary_key(),
            rql::escape_value(&id)
        ))
        .rows(1);
        let response = pipeline::run_query(
            state.backend.as_ref(),
            &state.limits,
            collection,
            query,
            user.as_ref(),
        )
        .await?;
        return Ok(raw_body(&response));
    }

    let doc = pipeline::run_get(state.backend.as_ref(), collection, &id, user.as_ref())
        .await?
        .ok_or_else(|| Error::NotFound(format!("{} {}", collection, id)))?;

    if let Some(kind) = media.fasta_kind() {
        if !media::supports_fasta(collection, kind) {
            return Err(Error::UnsupportedMediaType(
                media.content_type().to_string(),
            ));
        }
        let body = media::render_fasta(collection, kind, std::slice::from_ref(&doc));
        return Ok(([(header::CONTENT_TYPE, media.content_type())], body).into_response());
    }

    if media == MediaType::NewickJson {
        if collection != Collection::Taxonomy {
            return Err(Error::UnsupportedMediaType(
                media.content_type().to_string(),
            ));
        }
        return Ok(match media::tree_for_taxon(&state.tree_dir, &doc).await? {
            Some(tree) => {
                ([(header::CONTENT_TYPE, media.content_type())], tree).into_response()
            }
            None => (
                StatusCode::NOT_FOUND,
                [(header::CONTENT_TYPE, "application/json")],
                "{}",
            )
                .into_response(),
        });
    }

    Ok(Json(doc).into_response())
}

/// Query via GET: the raw query string is the RQL expression.
pub async fn get_collection(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    uri: Uri,
    headers: HeaderMap,
    OptionalUser(user): OptionalUser,
) -> Result<Response> {
    let collection = resolve(&collection)?;
    let query = rql::compile(uri.query().unwrap_or(""))?;
    execute(&state, collection, query, &headers, user.as_ref()).await
}

pub async fn post_collection(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    headers: HeaderMap,
    OptionalUser(user): OptionalUser,
    body: String,
) -> Result<Response> {
    let collection = resolve(&collection)?;
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .unwrap_or("")
        .trim();

    let query = match content_type {
        "application/x-www-form-urlencoded" => {
            let rql_text = form_rql(&body)
                .ok_or_else(|| Error::InvalidQuery("rql form field is required".to_string()))?;
            rql::compile(&rql_text)?
        }
        "application/rqlquery+x-www-form-urlencoded" => rql::compile(body.trim())?,
        "application/solrquery+x-www-form-urlencoded" => parse_solr_params(&body)?,
        other => return Err(Error::UnsupportedMediaType(other.to_string())),
    };

    execute(&state, collection, query, &headers, user.as_ref()).await
}

/// Shared query dispatch: media checks, Range paging, then either a
/// streamed download or one result page.
async fn execute(
    state: &AppState,
    collection: Collection,
    mut query: SolrQuery,
    headers: &HeaderMap,
    user: Option<&UserContext>,
) -> Result<Response> {
    let media = accepted_media(headers)?;

    if let Some(kind) = media.fasta_kind() {
        if !media::supports_fasta(collection, kind) {
            return Err(Error::UnsupportedMediaType(
                media.content_type().to_string(),
            ));
        }
    } else if media == MediaType::NewickJson {
        // Trees come from single-document lookups only.
        return Err(Error::UnsupportedMediaType(
            media.content_type().to_string(),
        ));
    }

    if let Some(range) = headers.get(header::RANGE).and_then(|v| v.to_str().ok()) {
        if let Some((start, rows)) = pipeline::parse_range_items(range) {
            query = query.start(start).rows(rows);
        }
    }

    if wants_download(headers) {
        let stream =
            pipeline::run_stream(state.backend.as_ref(), collection, query, user).await?;
        let body = match media.fasta_kind() {
            Some(kind) => media::stream_body(collection, kind, stream),
            None if media == MediaType::Json => media::json_stream_body(stream),
            None => {
                return Err(Error::UnsupportedMediaType(
                    media.content_type().to_string(),
                ))
            }
        };
        return Ok((
            [
                (header::CONTENT_TYPE, media.content_type().to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", attachment(media, collection)),
                ),
            ],
            body,
        )
            .into_response());
    }

    let response = pipeline::run_query(
        state.backend.as_ref(),
        &state.limits,
        collection,
        query,
        user,
    )
    .await?;

    match media.fasta_kind() {
        Some(kind) => {
            let body = media::render_fasta(collection, kind, response.docs());
            Ok(([(header::CONTENT_TYPE, media.content_type())], body).into_response())
        }
        None if media == MediaType::SolrJson => Ok(raw_body(&response)),
        None => {
            let total = response.response.num_found;
            let start = response.response.start;
            let docs = response.response.docs;
            let range = pipeline::content_range(start, docs.len(), total);
            Ok(([(header::CONTENT_RANGE, range)], Json(docs)).into_response())
        }
    }
}

fn resolve(segment: &str) -> Result<Collection> {
    Collection::from_path(segment)
        .ok_or_else(|| Error::NotFound(format!("unknown collection {}", segment)))
}

fn accepted_media(headers: &HeaderMap) -> Result<MediaType> {
    MediaType::from_accept(headers.get(header::ACCEPT).and_then(|v| v.to_str().ok()))
}

fn wants_download(headers: &HeaderMap) -> bool {
    headers
        .get("download")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| !v.eq_ignore_ascii_case("false"))
}

fn raw_body(response: &SolrResponse) -> Response {
    (
        [(header::CONTENT_TYPE, MediaType::SolrJson.content_type())],
        response.raw.to_string(),
    )
        .into_response()
}

fn attachment(media: MediaType, collection: Collection) -> String {
    if media.fasta_kind().is_some() {
        media::attachment_name(collection)
    } else {
        format!("PATRIC_{}.json", collection.as_str())
    }
}

/// Pull the `rql` field out of a form body. Clients percent-encode the
/// expression once more on top of the form encoding.
fn form_rql(body: &str) -> Option<String> {
    for pair in body.split('&') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        if key != "rql" {
            continue;
        }
        let form_decoded = form_decode(value).ok()?;
        let decoded = percent_decode_str(&form_decoded).decode_utf8().ok()?;
        return Some(decoded.into_owned());
    }
    None
}

fn form_decode(value: &str) -> Result<String> {
    percent_decode_str(&value.replace('+', " "))
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| Error::InvalidQuery("request body is not valid UTF-8".to_string()))
}

/// Body of a `solrquery` POST: the backend's own parameter syntax. The
/// first segment is the main query; later segments shape the request.
fn parse_solr_params(body: &str) -> Result<SolrQuery> {
    let mut query = SolrQuery::default();
    let mut segments = body.trim().split('&').filter(|s| !s.is_empty());

    if let Some(first) = segments.next() {
        let main = first.strip_prefix("q=").unwrap_or(first);
        query.q = form_decode(main)?;
    }

    for segment in segments {
        let (key, value) = segment
            .split_once('=')
            .ok_or_else(|| Error::InvalidQuery(format!("malformed parameter: {segment}")))?;
        let value = form_decode(value)?;
        match key {
            "q" => query.q = value,
            "fq" => query.filters.push(value),
            "fl" => query.fields = Some(value),
            "sort" => {
                for clause in value.split(',') {
                    let mut parts = clause.split_whitespace();
                    let Some(field) = parts.next() else { continue };
                    query = match parts.next() {
                        Some("desc") => query.sort_desc(field),
                        _ => query.sort_asc(field),
                    };
                }
            }
            "start" => {
                query.start = Some(value.parse().map_err(|_| {
                    Error::InvalidQuery(format!("start is not a number: {value}"))
                })?);
            }
            "rows" => {
                query.rows = Some(value.parse().map_err(|_| {
                    Error::InvalidQuery(format!("rows is not a number: {value}"))
                })?);
            }
            _ => query.extra.push((key.to_string(), value)),
        }
    }
    Ok(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solr::SortDirection;

    #[test]
    fn test_form_rql_double_decode() {
        // encodeURIComponent("eq(genome_id,83332.12)&limit(10)"), form-encoded.
        let body = "rql=eq%2528genome_id%252C83332.12%2529%2526limit%252810%2529";
        assert_eq!(
            form_rql(body).unwrap(),
            "eq(genome_id,83332.12)&limit(10)"
        );
    }

    #[test]
    fn test_form_rql_plain_value() {
        let body = "rql=eq(genome_id,83332.12)";
        assert_eq!(form_rql(body).unwrap(), "eq(genome_id,83332.12)");
        assert!(form_rql("other=1").is_none());
    }

    #[test]
    fn test_parse_solr_params() {
        let query = parse_solr_params(
            "q=genome_id:83332.12&fl=genome_id,genome_name&sort=genome_name+desc&rows=10&start=5&fq=public:true&facet=true",
        )
        .unwrap();
        assert_eq!(query.q, "genome_id:83332.12");
        assert_eq!(query.fields.as_deref(), Some("genome_id,genome_name"));
        assert_eq!(query.sort.len(), 1);
        assert_eq!(query.sort[0].field, "genome_name");
        assert_eq!(query.sort[0].direction, SortDirection::Desc);
        assert_eq!(query.rows, Some(10));
        assert_eq!(query.start, Some(5));
        assert_eq!(query.filters, vec!["public:true".to_string()]);
        assert_eq!(
            query.extra,
            vec![("facet".to_string(), "true".to_string())]
        );
    }

    #[test]
    fn test_parse_solr_params_bare_main_query() {
        let query = parse_solr_params("genome_id:83332.12&rows=5").unwrap();
        assert_eq!(query.q, "genome_id:83332.12");
        assert_eq!(query.rows, Some(5));
    }

    #[test]
    fn test_attachment_names() {
        assert_eq!(
            attachment(MediaType::DnaFasta, Collection::GenomeFeature),
            "PATRIC_genome_feature.fasta"
        );
        assert_eq!(
            attachment(MediaType::Json, Collection::Genome),
            "PATRIC_genome.json"
        );
    }

    #[test]
    fn test_resolve_rejects_unknown() {
        assert!(matches!(resolve("genome"), Ok(Collection::Genome)));
        assert!(matches!(resolve("users"), Err(Error::NotFound(_))));
    }
}
