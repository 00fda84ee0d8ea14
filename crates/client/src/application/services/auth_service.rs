//! Auth Service - Google sign-in, session restore, and logout.
//!
//! Tokens and the signed-in user live in storage under `storage_keys`; the
//! HTTP adapter reads the access token from there on every request.

use std::sync::Arc;

use teammate_shared::{AuthUserData, GoogleLoginRequest, GoogleLoginResponse};

use super::ProfileService;
use crate::application::{Api, ServiceError, SessionContext};
use crate::ports::outbound::{storage_keys, ApiError, StorageProvider};

/// Result of a successful sign-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginOutcome {
    /// The server created the account on this sign-in.
    pub created: bool,
    pub has_profile: bool,
}

#[derive(Clone)]
pub struct AuthService {
    api: Api,
    storage: Arc<dyn StorageProvider>,
    profiles: ProfileService,
}

impl AuthService {
    pub fn new(api: Api, storage: Arc<dyn StorageProvider>) -> Self {
        Self {
            profiles: ProfileService::new(api.clone()),
            api,
            storage,
        }
    }

    /// Exchange a Google ID token for API tokens and build a session.
    ///
    /// The own profile is loaded best-effort; a missing profile is not an error.
    pub async fn login_with_google(
        &self,
        credential: &str,
    ) -> Result<(SessionContext, LoginOutcome), ServiceError> {
        let request = GoogleLoginRequest {
            token: credential.to_string(),
        };
        let result: Result<GoogleLoginResponse, ApiError> =
            self.api.post("/api/auth/google/", &request).await;
        let response = match result {
            Ok(response) => response,
            Err(ApiError::HttpError { message, .. }) => {
                return Err(ServiceError::LoginRejected(message));
            }
            Err(e) => return Err(e.into()),
        };

        let Some(access) = response.access else {
            let reason = response
                .error
                .unwrap_or_else(|| "no access token in response".to_string());
            return Err(ServiceError::LoginRejected(reason));
        };

        self.storage.save(storage_keys::ACCESS_TOKEN, &access);
        if let Some(refresh) = &response.refresh {
            self.storage.save(storage_keys::REFRESH_TOKEN, refresh);
        }

        let user = match response.user {
            Some(user) => user,
            None => self.current_user().await?,
        };
        self.store_user(&user);
        tracing::info!(user_id = %user.id, created = response.created, "Signed in");

        let mut ctx = SessionContext::new(user);
        self.load_profile_into(&mut ctx).await;

        let outcome = LoginOutcome {
            created: response.created,
            has_profile: ctx.has_profile(),
        };
        Ok((ctx, outcome))
    }

    /// Rebuild the session from storage; `None` unless both token and user are stored.
    pub async fn restore(&self) -> Option<SessionContext> {
        self.storage.load(storage_keys::ACCESS_TOKEN)?;
        let raw_user = self.storage.load(storage_keys::USER)?;
        let user: AuthUserData = match serde_json::from_str(&raw_user) {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!("Discarding unreadable stored user: {}", e);
                self.storage.remove(storage_keys::USER);
                return None;
            }
        };

        let mut ctx = SessionContext::new(user);
        self.load_profile_into(&mut ctx).await;
        Some(ctx)
    }

    pub fn logout(&self) {
        self.storage.remove(storage_keys::ACCESS_TOKEN);
        self.storage.remove(storage_keys::REFRESH_TOKEN);
        self.storage.remove(storage_keys::USER);
        tracing::info!("Signed out");
    }

    pub fn access_token(&self) -> Option<String> {
        self.storage.load(storage_keys::ACCESS_TOKEN)
    }

    pub async fn current_user(&self) -> Result<AuthUserData, ServiceError> {
        Ok(self.api.get("/api/auth/users/me/").await?)
    }

    fn store_user(&self, user: &AuthUserData) {
        match serde_json::to_string(user) {
            Ok(json) => self.storage.save(storage_keys::USER, &json),
            Err(e) => tracing::error!("Failed to serialize user: {}", e),
        }
    }

    async fn load_profile_into(&self, ctx: &mut SessionContext) {
        match self.profiles.my_profile().await {
            Ok(profile) => ctx.set_profile(profile),
            Err(e) => tracing::warn!("Failed to load own profile: {}", e),
        }
    }
}
