//! Digital Address Rust Client Library
//!
//! A Rust client for the digital address backend: account and Aadhaar
//! verification, digital address records, consent-gated resolution through
//! the Address Information Unit (AIU), and field verification through AAVA.

pub mod aava;
pub mod address;
pub mod aiu;
pub mod auth;
pub mod config;
pub mod error;
pub mod fetch;
pub mod geolocation;
pub mod store;
pub mod validate;

use reqwest::Client;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::aava::AavaClient;
use crate::address::AddressClient;
use crate::aiu::AiuClient;
use crate::auth::{Auth, FileStorage, MemoryStorage, TokenStorage};
use crate::config::{ClientConfig, ClientOptions};
use crate::error::Result;
use crate::fetch::FetchBuilder;
use crate::store::{AppState, InFlight};

/// State shared by every service client.
pub(crate) struct ClientContext {
    pub base_url: String,
    pub http: Client,
    pub options: ClientOptions,
    pub state: Arc<RwLock<AppState>>,
    pub storage: Arc<dyn TokenStorage>,
    pub in_flight: InFlight,
}

impl ClientContext {
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn require_token(&self) -> Result<String> {
        self.state.read().await.require_token()
    }

    /// Adds the bearer header when a session exists.
    pub async fn with_optional_auth<'a>(&self, builder: FetchBuilder<'a>) -> FetchBuilder<'a> {
        match self.state.read().await.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

/// The main entry point for the client
pub struct DigitalAddressClient {
    ctx: Arc<ClientContext>,
    auth: Auth,
}

impl DigitalAddressClient {
    /// Create a new client with an in-memory session
    ///
    /// # Example
    ///
    /// ```
    /// use digital_address_rust::DigitalAddressClient;
    ///
    /// let client = DigitalAddressClient::new("https://api.example.com");
    /// ```
    pub fn new(api_url: &str) -> Self {
        Self::new_with_options(api_url, ClientOptions::default())
    }

    /// Create a new client with custom options
    pub fn new_with_options(api_url: &str, options: ClientOptions) -> Self {
        Self::with_storage(api_url, options, Arc::new(MemoryStorage::new()))
    }

    /// Create a new client that persists its session in `storage`.
    ///
    /// Call [`Auth::restore_session`] afterwards to pick up a token saved by
    /// an earlier run.
    pub fn with_storage(
        api_url: &str,
        options: ClientOptions,
        storage: Arc<dyn TokenStorage>,
    ) -> Self {
        let mut builder = Client::builder();
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().unwrap_or_else(|_| Client::new());

        let ctx = Arc::new(ClientContext {
            base_url: api_url.trim_end_matches('/').to_string(),
            http,
            options,
            state: Arc::new(RwLock::new(AppState::default())),
            storage,
            in_flight: InFlight::default(),
        });
        let auth = Auth::new(ctx.clone());

        Self { ctx, auth }
    }

    /// Builds a client from [`ClientConfig`] and restores any persisted
    /// session.
    pub async fn from_config(config: ClientConfig, options: ClientOptions) -> Result<Self> {
        let storage: Arc<dyn TokenStorage> = match &config.token_file {
            Some(path) => Arc::new(FileStorage::new(path)),
            None => Arc::new(MemoryStorage::new()),
        };
        let client = Self::with_storage(&config.base_url(), options, storage);
        client.auth.restore_session().await?;
        Ok(client)
    }

    /// Get a reference to the auth client
    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    /// Client for the user's digital address records
    pub fn addresses(&self) -> AddressClient {
        AddressClient::new(self.ctx.clone())
    }

    /// Client for the partner-facing AIU endpoints
    pub fn aiu(&self) -> AiuClient {
        AiuClient::new(self.ctx.clone())
    }

    /// Client for agent verification
    pub fn aava(&self) -> AavaClient {
        AavaClient::new(self.ctx.clone())
    }

    /// Shared application state
    pub fn state(&self) -> Arc<RwLock<AppState>> {
        self.ctx.state.clone()
    }

    pub fn options(&self) -> &ClientOptions {
        &self.ctx.options
    }

    pub fn base_url(&self) -> &str {
        &self.ctx.base_url
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::address::{AddressUpdate, ConsentType, DigitalAddress, NewAddress};
    pub use crate::aiu::{AiuRecord, FeedbackRequest, FulfillmentStatus};
    pub use crate::config::{ClientConfig, ClientOptions};
    pub use crate::error::Error;
    pub use crate::geolocation::{FixedLocation, LocationProvider};
    pub use crate::DigitalAddressClient;
}
