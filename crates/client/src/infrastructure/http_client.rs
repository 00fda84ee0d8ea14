//! REST API adapter on reqwest.
//!
//! Attaches the stored access token as a bearer token. A 401 with a stored
//! refresh token triggers one refresh and one retry; a failed refresh clears
//! both tokens.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Method, Response, StatusCode};
use serde_json::Value;

use teammate_shared::{ErrorBody, RefreshResponse, RefreshTokenRequest};

use crate::config::ClientConfig;
use crate::ports::outbound::{storage_keys, ApiError, RawApiPort, StorageProvider};

const REFRESH_PATH: &str = "/api/auth/jwt/refresh/";

#[derive(Clone)]
pub struct HttpApiClient {
    client: Client,
    base_url: String,
    storage: Arc<dyn StorageProvider>,
}

impl HttpApiClient {
    pub fn new(config: &ClientConfig, storage: Arc<dyn StorageProvider>) -> Self {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            storage,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send_once(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Response, ApiError> {
        let mut request = self.client.request(method, self.url(path));
        if let Some(token) = self.storage.load(storage_keys::ACCESS_TOKEN) {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        request
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Response, ApiError> {
        tracing::debug!(%method, path, "API request");
        let response = self.send_once(method.clone(), path, body).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        let Some(refresh) = self.storage.load(storage_keys::REFRESH_TOKEN) else {
            return Ok(response);
        };

        if self.refresh_access_token(refresh).await {
            self.send_once(method, path, body).await
        } else {
            Err(ApiError::Unauthorized)
        }
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// Returns false (with both tokens cleared) when the exchange fails.
    async fn refresh_access_token(&self, refresh: String) -> bool {
        let result = self
            .client
            .post(self.url(REFRESH_PATH))
            .json(&RefreshTokenRequest { refresh })
            .send()
            .await;

        let renewed = match result {
            Ok(response) if response.status().is_success() => {
                response.json::<RefreshResponse>().await.ok()
            }
            Ok(response) => {
                tracing::debug!(status = %response.status(), "Token refresh rejected");
                None
            }
            Err(e) => {
                tracing::warn!("Token refresh failed: {}", e);
                None
            }
        };

        match renewed {
            Some(RefreshResponse { access }) => {
                self.storage.save(storage_keys::ACCESS_TOKEN, &access);
                tracing::debug!("Access token refreshed");
                true
            }
            None => {
                self.storage.remove(storage_keys::ACCESS_TOKEN);
                self.storage.remove(storage_keys::REFRESH_TOKEN);
                false
            }
        }
    }
}

async fn into_json(response: Response) -> Result<Value, ApiError> {
    let status = response.status();

    if status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthorized);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound);
    }
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|body| body.message().map(str::to_string))
            .unwrap_or(text);
        return Err(ApiError::HttpError {
            status: status.as_u16(),
            message,
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| ApiError::RequestFailed(e.to_string()))?;
    if bytes.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&bytes).map_err(|e| ApiError::ParseError(e.to_string()))
}

#[async_trait]
impl RawApiPort for HttpApiClient {
    async fn get_json(&self, path: &str) -> Result<Value, ApiError> {
        let response = self.execute(Method::GET, path, None).await?;
        into_json(response).await
    }

    async fn get_optional_json(&self, path: &str) -> Result<Option<Value>, ApiError> {
        let response = self.execute(Method::GET, path, None).await?;
        match into_json(response).await {
            Ok(value) => Ok(Some(value)),
            Err(ApiError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        let response = self.execute(Method::POST, path, Some(body)).await?;
        into_json(response).await
    }

    async fn post_empty_with_response_json(&self, path: &str) -> Result<Value, ApiError> {
        let response = self.execute(Method::POST, path, None).await?;
        into_json(response).await
    }
}
