//! Authentication flows: login, registration handoff, OTP verification,
//! and the two-stage forgot-password reset.
//!
//! Login is the only flow that writes the credential triple, and it writes
//! all three keys or none: every failure path tears the triple down before
//! returning, so a partial triple never survives. No flow retries
//! automatically.

use std::sync::Arc;

use hd_common::{
    server_message, ClientError, FieldError, RegistrationHandoff, Result, Role, Session,
};
use hd_store::{clear_credentials, CredentialKey, CredentialStore};
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::ApiConfig;
use crate::router;

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct LoginResponse {
    token: Option<String>,
    user_id: Option<String>,
    role: Option<String>,
    username: Option<String>,
}

#[derive(Debug, Serialize)]
struct OtpRequest<'a> {
    username: &'a str,
    otp: &'a str,
}

#[derive(Debug, Serialize)]
struct ForgotPasswordRequest<'a> {
    username: &'a str,
}

#[derive(Debug, Serialize)]
struct ResetPasswordRequest<'a> {
    username: &'a str,
    otp: &'a str,
    password: &'a str,
}

/// Drives authentication against the user service and owns the credential
/// triple lifecycle.
pub struct AuthFlow {
    client: reqwest::Client,
    config: ApiConfig,
    store: Arc<dyn CredentialStore>,
}

impl AuthFlow {
    pub fn new(client: reqwest::Client, config: ApiConfig, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            client,
            config,
            store,
        }
    }

    /// Authenticate and persist the credential triple.
    ///
    /// The bearer token may arrive in the `Authorization` response header
    /// or in the body `token` field; the header wins when both are present.
    /// On any failure the triple is cleared before the error is returned.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session> {
        match self.try_login(username, password).await {
            Ok(session) => Ok(session),
            Err(err) => {
                if let Err(teardown) = clear_credentials(self.store.as_ref()).await {
                    warn!(error = %teardown, "credential teardown after failed login failed");
                }
                Err(err)
            }
        }
    }

    async fn try_login(&self, username: &str, password: &str) -> Result<Session> {
        let url = router::login_endpoint(&self.config.auth_base_url);
        let response = self
            .client
            .post(&url)
            .json(&LoginRequest { username, password })
            .send()
            .await?;

        let status = response.status();
        let header_token = response
            .headers()
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .map(str::to_string);

        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            warn!(status = %status, "login rejected");
            return Err(ClientError::ServerRejected {
                status: status.as_u16(),
                body,
            });
        }

        let data: LoginResponse = serde_json::from_str(&body)
            .map_err(|e| ClientError::auth(format!("malformed login response: {}", e)))?;

        let token = header_token
            .or(data.token)
            .map(|t| t.strip_prefix("Bearer ").unwrap_or(&t).to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ClientError::auth("token not found in login response"))?;

        let user_id = data
            .user_id
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ClientError::auth("user id not found in login response"))?;

        let role = Role::from_label(data.role.as_deref().unwrap_or(""));

        self.store.set(CredentialKey::AuthToken, &token).await?;
        self.store.set(CredentialKey::UserId, &user_id).await?;
        self.store
            .set(CredentialKey::UserType, role.as_store_str())
            .await?;

        info!(
            username = %data.username.as_deref().unwrap_or(username),
            role = ?role,
            "login succeeded"
        );

        Ok(Session {
            token,
            user_id,
            role,
        })
    }

    /// Clear the credential triple.
    pub async fn logout(&self) -> Result<()> {
        clear_credentials(self.store.as_ref()).await?;
        info!("logged out");
        Ok(())
    }

    /// Stage one of registration: validate presence of all fields and hand
    /// the context to the details-collection stage. No network call here.
    pub fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<RegistrationHandoff> {
        let mut missing = Vec::new();
        for (field, value) in [
            ("username", username),
            ("email", email),
            ("password", password),
        ] {
            if value.is_empty() {
                missing.push(FieldError::new(field, "Please fill out all fields"));
            }
        }
        if !missing.is_empty() {
            return Err(ClientError::Validation(missing));
        }

        Ok(RegistrationHandoff {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        })
    }

    /// Verify a one-time code, e.g. after registration. An empty OTP is
    /// rejected locally before any network call.
    pub async fn verify_otp(&self, username: &str, otp: &str) -> Result<()> {
        if otp.is_empty() {
            return Err(ClientError::validation("otp", "Please enter the OTP"));
        }

        let url = router::verify_otp_endpoint(&self.config.auth_base_url);
        let response = self
            .client
            .post(&url)
            .json(&OtpRequest { username, otp })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            info!(username = %username, "OTP verified");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(ClientError::auth(
            server_message(&body).unwrap_or_else(|| "Invalid OTP. Please try again.".to_string()),
        ))
    }

    /// Stage one of forgot-password: request an OTP for the username.
    ///
    /// The username must be non-empty alphanumeric; otherwise the flow
    /// fails locally and no request is issued. Success advances the flow
    /// to [`PendingReset`].
    pub async fn request_password_reset(&self, username: &str) -> Result<PendingReset> {
        if username.is_empty() || !username.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ClientError::validation(
                "username",
                "Please enter a valid alphanumeric username.",
            ));
        }

        let url = router::forgot_password_endpoint(&self.config.auth_base_url);
        let response = self
            .client
            .post(&url)
            .json(&ForgotPasswordRequest { username })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::auth(server_message(&body).unwrap_or_else(
                || "Failed to send OTP. Please try again.".to_string(),
            )));
        }

        info!(username = %username, "password reset OTP requested");
        Ok(PendingReset {
            client: self.client.clone(),
            config: self.config.clone(),
            username: username.to_string(),
        })
    }
}

/// Stage two of forgot-password, carrying the username submitted in stage
/// one. Completing consumes the flow.
pub struct PendingReset {
    client: reqwest::Client,
    config: ApiConfig,
    username: String,
}

impl PendingReset {
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Verify the OTP and set the new password. Both fields are required;
    /// each missing one is reported as its own field error.
    pub async fn complete(self, otp: &str, new_password: &str) -> Result<()> {
        let mut missing = Vec::new();
        if otp.is_empty() {
            missing.push(FieldError::new("otp", "OTP is required."));
        }
        if new_password.is_empty() {
            missing.push(FieldError::new("password", "Password is required."));
        }
        if !missing.is_empty() {
            return Err(ClientError::Validation(missing));
        }

        let url = router::verify_forgot_password_endpoint(&self.config.auth_base_url);
        let response = self
            .client
            .post(&url)
            .json(&ResetPasswordRequest {
                username: &self.username,
                otp,
                password: new_password,
            })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            info!(username = %self.username, "password reset completed");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(ClientError::auth(server_message(&body).unwrap_or_else(
            || "Failed to reset password. Please try again.".to_string(),
        )))
    }
}
