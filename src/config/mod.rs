//! Configuration types for the Gist storage backend.

use crate::errors::{GistError, GistErrorKind};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

/// Default GitHub API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// Default GitHub API version (date-based).
pub const DEFAULT_API_VERSION: &str = "2022-11-28";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default User-Agent header.
pub const DEFAULT_USER_AGENT: &str = "gist-storage/0.1.0";

/// Configuration for the Gist storage backend.
///
/// A valid configuration names either an existing gist (`gist_id`) or
/// enables `auto_create`, in which case the gist is created lazily on the
/// first write and its id must be retrieved and persisted by the caller.
#[derive(Debug, Clone)]
pub struct GistConfig {
    /// API base URL.
    pub base_url: String,
    /// API version header.
    pub api_version: String,
    /// GitHub personal access token with "gist" scope.
    pub token: SecretString,
    /// Id of the backing gist, if it already exists.
    pub gist_id: Option<String>,
    /// Create a new gist on first write when no gist id is configured.
    pub auto_create: bool,
    /// Whether a newly created gist is public (applies on create only).
    pub public: bool,
    /// Description applied to the backing gist.
    pub description: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Connect timeout.
    pub connect_timeout: Duration,
    /// User-Agent header.
    pub user_agent: String,
}

impl GistConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> GistConfigBuilder {
        GistConfigBuilder::new()
    }

    /// Validates the configuration.
    ///
    /// Runs before any network call: a missing token or a missing gist id
    /// with auto-create disabled fails here, never mid-operation.
    pub fn validate(&self) -> Result<(), GistError> {
        if self.token.expose_secret().trim().is_empty() {
            return Err(GistError::new(
                GistErrorKind::MissingToken,
                "A GitHub token with gist scope is required",
            ));
        }

        if self.gist_id.is_none() && !self.auto_create {
            return Err(GistError::new(
                GistErrorKind::MissingGistId,
                "A gist_id is required unless auto_create is enabled",
            ));
        }

        if self.base_url.is_empty() {
            return Err(GistError::new(
                GistErrorKind::InvalidBaseUrl,
                "Base URL cannot be empty",
            ));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(GistError::new(
                GistErrorKind::InvalidBaseUrl,
                "Base URL must start with http:// or https://",
            ));
        }

        if self.user_agent.is_empty() {
            return Err(GistError::configuration(
                "User-Agent is required by the GitHub API",
            ));
        }

        Ok(())
    }
}

/// Builder for GistConfig.
#[derive(Debug, Default)]
pub struct GistConfigBuilder {
    base_url: Option<String>,
    api_version: Option<String>,
    token: Option<SecretString>,
    gist_id: Option<String>,
    auto_create: bool,
    public: bool,
    description: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl GistConfigBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the API version.
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    /// Sets the GitHub token.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(SecretString::new(token.into()));
        self
    }

    /// Sets the id of an existing backing gist.
    pub fn gist_id(mut self, id: impl Into<String>) -> Self {
        self.gist_id = Some(id.into());
        self
    }

    /// Enables creating a new gist on the first write.
    pub fn auto_create(mut self, enabled: bool) -> Self {
        self.auto_create = enabled;
        self
    }

    /// Sets whether a newly created gist is public.
    pub fn public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }

    /// Sets the gist description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets the User-Agent header.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> Result<GistConfig, GistError> {
        let config = GistConfig {
            base_url: self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_version: self
                .api_version
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            token: self
                .token
                .unwrap_or_else(|| SecretString::new(String::new())),
            gist_id: self.gist_id,
            auto_create: self.auto_create,
            public: self.public,
            description: self.description.unwrap_or_default(),
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            connect_timeout: self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT),
            user_agent: self.user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = GistConfig::builder()
            .token("ghp_xxxx")
            .gist_id("a1b2c3d4e5")
            .description("Uploaded files")
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap();

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.gist_id.as_deref(), Some("a1b2c3d4e5"));
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert!(!config.public);
    }

    #[test]
    fn test_missing_token() {
        let result = GistConfig::builder().gist_id("a1b2c3").build();
        let error = result.unwrap_err();
        assert_eq!(*error.kind(), GistErrorKind::MissingToken);
    }

    #[test]
    fn test_missing_gist_id_without_auto_create() {
        let result = GistConfig::builder().token("ghp_xxxx").build();
        let error = result.unwrap_err();
        assert_eq!(*error.kind(), GistErrorKind::MissingGistId);
    }

    #[test]
    fn test_auto_create_allows_missing_gist_id() {
        let config = GistConfig::builder()
            .token("ghp_xxxx")
            .auto_create(true)
            .build()
            .unwrap();

        assert!(config.gist_id.is_none());
        assert!(config.auto_create);
    }

    #[test]
    fn test_invalid_base_url() {
        let result = GistConfig::builder()
            .token("ghp_xxxx")
            .gist_id("a1b2c3")
            .base_url("invalid-url")
            .build();

        assert!(result.is_err());
    }
}
