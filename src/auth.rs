//! Bearer-token parsing middleware.
//!
//! Tokens are pipe-delimited key=value strings
//! (`un=user@patricbrc.org|...|expiry=1750000000|...|sig=...`).
//! Signature verification happens at the fronting proxy; this layer
//! validates shape and expiry and attaches the caller identity to the
//! request. Requests without a token proceed anonymously.

use crate::types::UserContext;
use crate::{Error, Result};
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::time::{SystemTime, UNIX_EPOCH};

pub async fn auth_middleware(mut request: axum::extract::Request, next: Next) -> Response {
    let header = match request.headers().get(AUTHORIZATION) {
        Some(header) => header,
        None => return next.run(request).await,
    };

    let raw = match header.to_str() {
        Ok(raw) => raw,
        Err(_) => return Error::InvalidAuthentication.into_response(),
    };

    match parse_token(raw, unix_now()) {
        Ok(user) => {
            tracing::debug!("authenticated request from {}", user.user_id);
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Extractor for the caller identity attached by [`auth_middleware`].
///
/// Yields `None` for anonymous requests.
pub struct OptionalUser(pub Option<UserContext>);

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        Ok(OptionalUser(parts.extensions.get::<UserContext>().cloned()))
    }
}

/// Parse and validate a token. A `Bearer ` prefix is tolerated; older
/// clients send the bare token.
pub fn parse_token(raw: &str, now: u64) -> Result<UserContext> {
    let token = raw.strip_prefix("Bearer ").unwrap_or(raw);

    let mut user_id = None;
    let mut expiry = None;
    let mut signed = false;

    for field in token.split('|') {
        let (key, value) = field
            .split_once('=')
            .ok_or(Error::InvalidAuthentication)?;
        match key {
            "un" => user_id = Some(value),
            "expiry" => {
                expiry = Some(
                    value
                        .parse::<u64>()
                        .map_err(|_| Error::InvalidAuthentication)?,
                )
            }
            "sig" => signed = !value.is_empty(),
            _ => {}
        }
    }

    let user_id = user_id
        .filter(|u| !u.is_empty())
        .ok_or(Error::InvalidAuthentication)?;
    if !signed {
        return Err(Error::InvalidAuthentication);
    }
    match expiry {
        Some(expiry) if expiry > now => Ok(UserContext {
            user_id: user_id.to_string(),
        }),
        _ => Err(Error::InvalidAuthentication),
    }
}
