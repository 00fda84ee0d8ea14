//! Typed access to the REST API.
//!
//! Services hold an `Api`; it owns the `Arc<dyn RawApiPort>` chosen by the
//! binary and turns `serde_json::Value` into the shared DTOs.

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::ports::outbound::{ApiError, RawApiPort};

#[derive(Clone)]
pub struct Api {
    raw: Arc<dyn RawApiPort>,
}

impl Api {
    pub fn new(raw: Arc<dyn RawApiPort>) -> Self {
        Self { raw }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        decode(self.raw.get_json(path).await?)
    }

    /// `Ok(None)` when the resource does not exist.
    pub async fn get_optional<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Option<T>, ApiError> {
        self.raw
            .get_optional_json(path)
            .await?
            .map(decode)
            .transpose()
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_value(body).map_err(|e| ApiError::SerializeError(e.to_string()))?;
        decode(self.raw.post_json(path, &body).await?)
    }

    /// POST with no body, for action endpoints (`like/`, `mark_as_read/`).
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        decode(self.raw.post_empty_with_response_json(path).await?)
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::ParseError(e.to_string()))
}
