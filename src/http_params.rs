//! Header overrides via `http_`-prefixed query parameters.
//!
//! Plain `<a href>` downloads cannot set request headers, so clients pass
//! `http_accept=...`, `http_download=true`, or `http_authorization=...` in
//! the query string. This middleware promotes them to real headers and
//! strips them from the query before anything downstream parses it as RQL.

use axum::{
    http::{
        header::{HeaderName, HeaderValue},
        uri::{PathAndQuery, Uri},
    },
    middleware::Next,
    response::Response,
};
use percent_encoding::percent_decode_str;

pub async fn http_params(mut request: axum::extract::Request, next: Next) -> Response {
    let query = request.uri().query().unwrap_or("").to_owned();
    if !query.contains("http_") {
        return next.run(request).await;
    }

    let mut kept: Vec<&str> = Vec::new();
    let mut overrides: Vec<(String, String)> = Vec::new();

    for segment in query.split('&') {
        if let Some(promoted) = parse_override(segment) {
            overrides.push(promoted);
        } else {
            kept.push(segment);
        }
    }

    for (name, value) in overrides {
        let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(&value),
        ) else {
            continue;
        };
        request.headers_mut().insert(name, value);
    }

    if let Some(uri) = rebuild_uri(request.uri(), &kept) {
        *request.uri_mut() = uri;
    }

    next.run(request).await
}

fn parse_override(segment: &str) -> Option<(String, String)> {
    let rest = segment.strip_prefix("http_")?;
    let (key, value) = rest.split_once('=')?;
    if key.is_empty() {
        return None;
    }
    let value = percent_decode_str(value).decode_utf8().ok()?;
    Some((key.to_ascii_lowercase(), value.into_owned()))
}

fn rebuild_uri(uri: &Uri, kept: &[&str]) -> Option<Uri> {
    let path = uri.path();
    let path_and_query = if kept.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, kept.join("&"))
    };

    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(PathAndQuery::try_from(path_and_query).ok()?);
    Uri::from_parts(parts).ok()
}
