//! Connection settings for the credentials service.
//!
//! Learner credentials (certificates for programs) are issued by a separate
//! service; this config says where it lives and which features use it.

use url::Url;
use validator::Validate;

use crate::config::{env_var, parse_or, required};
use crate::error::CoreError;

/// Credentials service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct CredentialsApiConfig {
    pub enabled: bool,
    #[validate(range(min = 1))]
    pub api_version_number: u32,
    /// Base URL used for server-to-server calls.
    #[validate(url)]
    pub internal_service_url: String,
    /// Base URL handed to browsers.
    #[validate(url)]
    pub public_service_url: String,
    pub enable_learner_credentials: bool,
    pub enable_studio_credentials: bool,
}

impl CredentialsApiConfig {
    /// Load from environment variables.
    ///
    /// | Env Var                                  | Default  |
    /// |------------------------------------------|----------|
    /// | `CREDENTIALS_ENABLED`                    | `false`  |
    /// | `CREDENTIALS_API_VERSION`                | `2`      |
    /// | `CREDENTIALS_INTERNAL_SERVICE_URL`       | required |
    /// | `CREDENTIALS_PUBLIC_SERVICE_URL`         | required |
    /// | `CREDENTIALS_ENABLE_LEARNER_CREDENTIALS` | `false`  |
    /// | `CREDENTIALS_ENABLE_STUDIO_CREDENTIALS`  | `false`  |
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(env_var)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            enabled: parse_or(&lookup, "CREDENTIALS_ENABLED", false)?,
            api_version_number: parse_or(&lookup, "CREDENTIALS_API_VERSION", 2)?,
            internal_service_url: required(&lookup, "CREDENTIALS_INTERNAL_SERVICE_URL")?,
            public_service_url: required(&lookup, "CREDENTIALS_PUBLIC_SERVICE_URL")?,
            enable_learner_credentials: parse_or(
                &lookup,
                "CREDENTIALS_ENABLE_LEARNER_CREDENTIALS",
                false,
            )?,
            enable_studio_credentials: parse_or(
                &lookup,
                "CREDENTIALS_ENABLE_STUDIO_CREDENTIALS",
                false,
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn internal_api_url(&self) -> Result<String, CoreError> {
        self.api_url(&self.internal_service_url)
    }

    pub fn public_api_url(&self) -> Result<String, CoreError> {
        self.api_url(&self.public_service_url)
    }

    /// `base` with its path replaced by `/api/v{n}/`.
    fn api_url(&self, base: &str) -> Result<String, CoreError> {
        let base = Url::parse(base)
            .map_err(|e| CoreError::Validation(format!("Invalid service URL '{base}': {e}")))?;
        let joined = base
            .join(&format!("/api/v{}/", self.api_version_number))
            .map_err(|e| CoreError::Validation(format!("Cannot build API URL: {e}")))?;
        Ok(joined.to_string())
    }

    pub fn is_learner_issuance_enabled(&self) -> bool {
        self.enabled && self.enable_learner_credentials
    }

    pub fn is_studio_authoring_enabled(&self) -> bool {
        self.enabled && self.enable_studio_credentials
    }
}
