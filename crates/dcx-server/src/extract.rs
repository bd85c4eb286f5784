//! Request body extraction.

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// JSON request body, parsed regardless of `Content-Type`.
///
/// Clients of this API post JSON with whatever content type their HTTP
/// library picks, so unlike [`axum::Json`] the header is not checked.
/// Failures reject with [`ApiError::BadRequest`].
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|err| ApiError::bad_request(err.body_text()))?;
        serde_json::from_slice(&bytes)
            .map(Self)
            .map_err(|err| ApiError::bad_request(format!("invalid JSON body: {err}")))
    }
}
