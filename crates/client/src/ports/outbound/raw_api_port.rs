//! Raw API Port - Object-safe HTTP boundary
//!
//! The application layer provides a typed wrapper (`Api`) on top that does
//! the serde_json conversions.

use async_trait::async_trait;
use serde_json::Value;

use super::ApiError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RawApiPort: Send + Sync {
    async fn get_json(&self, path: &str) -> Result<Value, ApiError>;

    /// Like `get_json`, but a 404 yields `Ok(None)`.
    async fn get_optional_json(&self, path: &str) -> Result<Option<Value>, ApiError>;

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value, ApiError>;

    /// POST without a request body (action endpoints such as like or mark-as-read).
    async fn post_empty_with_response_json(&self, path: &str) -> Result<Value, ApiError>;
}
