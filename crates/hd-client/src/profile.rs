//! Profile fetching for the current session.

use std::sync::Arc;

use hd_common::{ClientError, EditProfileContext, Profile, Result};
use hd_session::{SessionOverrides, SessionResolver};
use reqwest::header::AUTHORIZATION;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::router;

/// Fetches role-shaped profile data. Missing optional fields render as
/// placeholders, never as a fetch failure.
pub struct ProfileService {
    client: reqwest::Client,
    config: ApiConfig,
    resolver: Arc<SessionResolver>,
}

impl ProfileService {
    pub fn new(
        client: reqwest::Client,
        config: ApiConfig,
        resolver: Arc<SessionResolver>,
    ) -> Self {
        Self {
            client,
            config,
            resolver,
        }
    }

    pub async fn fetch(&self) -> Result<Profile> {
        self.fetch_with(SessionOverrides::default()).await
    }

    /// Fetch the profile, letting navigation context override the stored
    /// user id and role.
    pub async fn fetch_with(&self, overrides: SessionOverrides) -> Result<Profile> {
        let session = self.resolver.resolve_with(overrides).await?;

        let url = router::profile_endpoint(&self.config.base_url, session.role, &session.user_id);
        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, session.bearer())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            warn!(status = %status, "profile fetch rejected");
            return Err(ClientError::ServerRejected {
                status: status.as_u16(),
                body,
            });
        }

        let profile: Profile = serde_json::from_str(&body).map_err(|e| {
            warn!(error = %e, "profile body was not a profile object");
            ClientError::ServerRejected {
                status: status.as_u16(),
                body,
            }
        })?;

        debug!(user_id = %session.user_id, role = ?session.role, "profile fetched");
        Ok(profile)
    }

    /// Resolve the session and hand back the edit-profile navigation
    /// context.
    pub async fn edit_context(&self, overrides: SessionOverrides) -> Result<EditProfileContext> {
        let session = self.resolver.resolve_with(overrides).await?;
        Ok(EditProfileContext {
            user_id: session.user_id,
            role: session.role,
        })
    }
}
