//! Authentication and user management

mod session;
mod types;

use log::{info, warn};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::fetch::Fetch;
use crate::store::Submission;
use crate::validate;
use crate::ClientContext;

pub use session::*;
pub use types::*;

/// Client for the auth service
pub struct Auth {
    ctx: Arc<ClientContext>,
}

impl Auth {
    pub(crate) fn new(ctx: Arc<ClientContext>) -> Self {
        Self { ctx }
    }

    /// Register a new account
    pub async fn register(&self, request: &RegisterRequest) -> Result<serde_json::Value> {
        validate::required("Username", &request.user_name)?;
        validate::email(&request.email_id)?;
        validate::required("Password", &request.password)?;
        validate::phone_number(&request.phone_number)?;

        let _guard = self.ctx.in_flight.begin(Submission::Register)?;
        let text = Fetch::post(&self.ctx.http, &self.ctx.endpoint("/api/auth/register"))
            .json(request)?
            .execute_text()
            .await?;
        Ok(parse_lenient(&text))
    }

    /// Log in and start a session. The token is persisted when the client
    /// is configured to.
    pub async fn login(&self, request: &LoginRequest) -> Result<Session> {
        match (&request.email, &request.phone) {
            (Some(email), _) => validate::email(email)?,
            (None, Some(phone)) => validate::phone_number(phone)?,
            (None, None) => return Err(Error::invalid_input("Email or phone is required")),
        }
        validate::required("Password", &request.password)?;

        let _guard = self.ctx.in_flight.begin(Submission::Login)?;
        let response: LoginResponse =
            Fetch::post(&self.ctx.http, &self.ctx.endpoint("/api/auth/login"))
                .json(request)?
                .execute()
                .await
                .map_err(|e| e.or_message("Invalid credentials", ""))?;

        let session = Session::new(response.token);
        self.set_session(session.clone()).await?;
        info!("session started");
        Ok(session)
    }

    /// Reset the password using Aadhaar details
    pub async fn forgot_password(
        &self,
        request: &ForgotPasswordRequest,
    ) -> Result<serde_json::Value> {
        if request.new_password != request.confirm_password {
            return Err(Error::invalid_input("Passwords do not match"));
        }
        validate::required("Email or phone", &request.email_or_phone)?;
        validate::required("Date of birth", &request.date_of_birth)?;
        validate::required("New password", &request.new_password)?;
        let aadhaar_number = validate::aadhaar(&request.aadhaar_number)?;

        let payload = ForgotPasswordRequest {
            aadhaar_number,
            ..request.clone()
        };

        let _guard = self.ctx.in_flight.begin(Submission::ForgotPassword)?;
        let text = Fetch::post(
            &self.ctx.http,
            &self.ctx.endpoint("/api/auth/forgot-password"),
        )
        .json(&payload)?
        .execute_text()
        .await?;
        Ok(parse_lenient(&text))
    }

    /// Fetch the profile of the logged in user and cache it in the store.
    ///
    /// A 401 ends the session: the token is dropped here and in storage.
    pub async fn profile(&self) -> Result<UserProfile> {
        let token = self.ctx.require_token().await?;
        self.ctx.state.write().await.set_user_loading(true);

        let result = Fetch::get(&self.ctx.http, &self.ctx.endpoint("/api/auth/profile"))
            .bearer_auth(&token)
            .execute::<UserProfile>()
            .await;

        match result {
            Ok(profile) => {
                self.ctx.state.write().await.set_user(profile.clone());
                Ok(profile)
            }
            Err(Error::Unauthorized(_)) => {
                warn!("profile lookup rejected, clearing session");
                self.logout().await?;
                Err(Error::SessionExpired)
            }
            Err(e) => {
                self.ctx.state.write().await.set_user_loading(false);
                Err(e)
            }
        }
    }

    /// One-time Aadhaar verification. Unlocks address creation.
    ///
    /// `aadhaar_number` may be grouped with spaces (`1234 5678 9012`).
    pub async fn verify_aadhaar(
        &self,
        aadhaar_number: &str,
        date_of_birth: &str,
    ) -> Result<serde_json::Value> {
        let aadhaar_number = validate::aadhaar(aadhaar_number)?;
        validate::required("Date of birth", date_of_birth)?;
        let token = self.ctx.require_token().await?;

        let payload = AadhaarVerificationRequest {
            aadhaar_number,
            date_of_birth: date_of_birth.to_string(),
        };

        let _guard = self.ctx.in_flight.begin(Submission::VerifyAadhaar)?;
        let result = Fetch::post(
            &self.ctx.http,
            &self.ctx.endpoint("/api/auth/verify-aadhaar"),
        )
        .bearer_auth(&token)
        .json(&payload)?
        .execute_text()
        .await;

        match result {
            Ok(text) => {
                self.ctx.state.write().await.set_user_verified(true);
                info!("aadhaar verified");
                Ok(parse_lenient(&text))
            }
            Err(e) if is_already_verified(&e) => {
                self.ctx.state.write().await.set_user_verified(true);
                Err(Error::AlreadyVerified)
            }
            Err(e) => Err(e),
        }
    }

    /// End the session: the token leaves the store and the storage.
    pub async fn logout(&self) -> Result<()> {
        self.ctx.state.write().await.clear_session();
        self.ctx
            .storage
            .remove_item(&self.ctx.options.storage_key)
            .await?;
        info!("session cleared");
        Ok(())
    }

    /// Rehydrate a persisted token. Expired or unreadable tokens are
    /// discarded.
    pub async fn restore_session(&self) -> Result<Option<Session>> {
        let key = &self.ctx.options.storage_key;
        let raw = match self.ctx.storage.get_item(key).await? {
            Some(raw) => raw,
            None => return Ok(None),
        };

        let session = match Session::decode(&raw) {
            Ok(session) if !session.is_expired() => session,
            Ok(_) | Err(_) => {
                warn!("discarding unusable persisted session");
                self.ctx.storage.remove_item(key).await?;
                return Ok(None);
            }
        };

        self.ctx
            .state
            .write()
            .await
            .set_token(Some(session.access_token.clone()));
        info!("session restored");
        Ok(Some(session))
    }

    /// Get the current session
    pub async fn get_session(&self) -> Option<Session> {
        self.ctx.state.read().await.token().map(Session::new)
    }

    /// Set the session, persisting it when enabled
    pub async fn set_session(&self, session: Session) -> Result<()> {
        if self.ctx.options.persist_session {
            self.ctx
                .storage
                .set_item(&self.ctx.options.storage_key, &session.encode()?)
                .await?;
        }
        self.ctx
            .state
            .write()
            .await
            .set_token(Some(session.access_token));
        Ok(())
    }
}

fn is_already_verified(err: &Error) -> bool {
    let message = match err {
        Error::Validation(m) | Error::Unauthorized(m) => m,
        Error::Api { message, .. } | Error::Server { message, .. } => message,
        _ => return false,
    };
    let message = message.to_ascii_lowercase();
    message == "aadhaar verified" || message.contains("already verified")
}

/// JSON when the body is JSON, otherwise the text as a JSON string.
fn parse_lenient(text: &str) -> serde_json::Value {
    serde_json::from_str(text).unwrap_or_else(|_| serde_json::Value::String(text.to_string()))
}
