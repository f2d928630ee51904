//! Configuration options for the digital address client

use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::error::{Error, Result};

/// Key under which the bearer token is persisted.
pub const TOKEN_STORAGE_KEY: &str = "JWT_TOKEN";

/// Suffix used when a new address does not name one.
pub const DEFAULT_SUFFIX: &str = "home.add";

/// Configuration options for the client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Whether the bearer token is written to token storage
    pub persist_session: bool,

    /// The request timeout
    pub request_timeout: Option<Duration>,

    /// How long to wait for a location fix
    pub geolocation_timeout: Duration,

    /// Storage key for the bearer token
    pub storage_key: String,

    /// Suffix for new addresses
    pub default_suffix: String,

    /// Consent duration sent when none is given
    pub default_consent_duration_days: u32,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            persist_session: true,
            request_timeout: Some(Duration::from_secs(30)),
            geolocation_timeout: Duration::from_secs(10),
            storage_key: TOKEN_STORAGE_KEY.to_string(),
            default_suffix: DEFAULT_SUFFIX.to_string(),
            default_consent_duration_days: 365,
        }
    }
}

impl ClientOptions {
    /// Set whether to persist the session
    pub fn with_persist_session(mut self, value: bool) -> Self {
        self.persist_session = value;
        self
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the geolocation timeout
    pub fn with_geolocation_timeout(mut self, value: Duration) -> Self {
        self.geolocation_timeout = value;
        self
    }

    /// Set the token storage key
    pub fn with_storage_key(mut self, value: &str) -> Self {
        self.storage_key = value.to_string();
        self
    }

    /// Set the default address suffix
    pub fn with_default_suffix(mut self, value: &str) -> Self {
        self.default_suffix = value.to_string();
        self
    }

    /// Set the default consent duration
    pub fn with_default_consent_duration_days(mut self, value: u32) -> Self {
        self.default_consent_duration_days = value;
        self
    }
}

/// Where the backend lives and where the session is kept.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: Url,
    pub token_file: Option<PathBuf>,
}

impl ClientConfig {
    /// Creates a new configuration, validating the URL.
    pub fn new(api_url: &str) -> Result<Self> {
        let api_url = Url::parse(api_url)?;
        if api_url.cannot_be_a_base() {
            return Err(Error::config("api url cannot be used as a base"));
        }
        Ok(Self {
            api_url,
            token_file: None,
        })
    }

    pub fn with_token_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_file = Some(path.into());
        self
    }

    /// Reads `DIGITAL_ADDRESS_API_URL` and the optional
    /// `DIGITAL_ADDRESS_TOKEN_FILE`.
    pub fn from_env() -> Result<Self> {
        let url = std::env::var("DIGITAL_ADDRESS_API_URL").map_err(|_| {
            Error::config("DIGITAL_ADDRESS_API_URL environment variable not found")
        })?;
        let mut config = Self::new(&url)?;
        if let Ok(path) = std::env::var("DIGITAL_ADDRESS_TOKEN_FILE") {
            config = config.with_token_file(path);
        }
        Ok(config)
    }

    /// Base URL as a string without a trailing slash.
    pub fn base_url(&self) -> String {
        self.api_url.as_str().trim_end_matches('/').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dotenv::dotenv;

    #[test]
    fn defaults() {
        let options = ClientOptions::default();
        assert_eq!(options.storage_key, "JWT_TOKEN");
        assert_eq!(options.geolocation_timeout, Duration::from_secs(10));
        assert_eq!(options.default_suffix, "home.add");
        assert_eq!(options.default_consent_duration_days, 365);
        assert!(options.persist_session);
    }

    #[test]
    fn builder_overrides() {
        let options = ClientOptions::default()
            .with_persist_session(false)
            .with_storage_key("TOKEN")
            .with_default_consent_duration_days(30);
        assert!(!options.persist_session);
        assert_eq!(options.storage_key, "TOKEN");
        assert_eq!(options.default_consent_duration_days, 30);
    }

    #[test]
    fn config_new_valid() {
        let config = ClientConfig::new("http://localhost:8080").unwrap();
        assert_eq!(config.api_url.to_string(), "http://localhost:8080/");
        assert_eq!(config.base_url(), "http://localhost:8080");
    }

    #[test]
    fn config_new_invalid_url() {
        match ClientConfig::new("not a valid url") {
            Err(Error::Url(_)) => {}
            other => panic!("Expected Url error, got {:?}", other),
        }
        assert!(matches!(
            ClientConfig::new("mailto:someone@example.com"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn config_from_env() {
        dotenv().ok();
        std::env::set_var("DIGITAL_ADDRESS_API_URL", "http://localhost:9090");
        std::env::set_var("DIGITAL_ADDRESS_TOKEN_FILE", "/tmp/digiaddr-token.json");
        let config = ClientConfig::from_env().unwrap();
        assert_eq!(config.base_url(), "http://localhost:9090");
        assert_eq!(
            config.token_file,
            Some(PathBuf::from("/tmp/digiaddr-token.json"))
        );
    }
}
