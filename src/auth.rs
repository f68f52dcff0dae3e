//! Caller identity extraction.
//!
//! The hosting environment authenticates every request and forwards the
//! principal in `x-caller-id`. Handlers that mutate reports take a `Caller`.

use crate::{errors::AppError, models::identity::CallerId};
use axum::{extract::FromRequestParts, http::request::Parts};

pub const CALLER_HEADER: &str = "x-caller-id";

/// Authenticated principal bound to the current request.
#[derive(Debug, Clone)]
pub struct Caller(pub CallerId);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(CALLER_HEADER)
            .ok_or_else(|| AppError::unauthenticated(format!("missing {CALLER_HEADER} header")))?;

        let id = value
            .to_str()
            .map_err(|_| AppError::unauthenticated(format!("{CALLER_HEADER} is not valid text")))?
            .trim();
        if id.is_empty() {
            return Err(AppError::unauthenticated(format!(
                "{CALLER_HEADER} cannot be empty"
            )));
        }

        Ok(Caller(CallerId::from(id)))
    }
}
