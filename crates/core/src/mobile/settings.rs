//! Mobile API settings: feature switch, video profile priority list, and
//! the lifetime of cached upgrade lookups.

use validator::Validate;

use crate::config::{env_var, parse_or};
use crate::error::CoreError;
use crate::mobile::upgrade::DEFAULT_CACHE_TTL_SECS;

/// Mobile API settings.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct MobileApiSettings {
    /// Whether the mobile API is switched on.
    pub enabled: bool,
    /// Comma-separated video profile names, highest priority first.
    pub video_profiles: String,
    /// How long upgrade lookups stay cached, in seconds.
    #[validate(range(min = 1))]
    pub version_cache_ttl_secs: u64,
}

impl Default for MobileApiSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            video_profiles: String::new(),
            version_cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
        }
    }
}

impl MobileApiSettings {
    /// Load settings from environment variables with defaults.
    ///
    /// | Env Var                        | Default |
    /// |--------------------------------|---------|
    /// | `MOBILE_API_ENABLED`           | `false` |
    /// | `MOBILE_VIDEO_PROFILES`        | empty   |
    /// | `MOBILE_VERSION_CACHE_TTL_SECS`| `3600`  |
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(env_var)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let settings = Self {
            enabled: parse_or(&lookup, "MOBILE_API_ENABLED", false)?,
            video_profiles: lookup("MOBILE_VIDEO_PROFILES").unwrap_or_default(),
            version_cache_ttl_secs: parse_or(
                &lookup,
                "MOBILE_VERSION_CACHE_TTL_SECS",
                DEFAULT_CACHE_TTL_SECS,
            )?,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Video profile names in priority order, trimmed, empties dropped.
    pub fn video_profiles(&self) -> Vec<String> {
        self.video_profiles
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn video_profiles_keep_priority_order() {
        let settings = MobileApiSettings {
            video_profiles: "mobile_high, mobile_low,,youtube ".to_string(),
            ..Default::default()
        };
        assert_eq!(
            settings.video_profiles(),
            vec!["mobile_high", "mobile_low", "youtube"]
        );
    }

    #[test]
    fn empty_profiles_give_empty_list() {
        assert!(MobileApiSettings::default().video_profiles().is_empty());
    }

    #[test]
    fn from_lookup_applies_defaults() {
        let settings = MobileApiSettings::from_lookup(|_| None).unwrap();
        assert_eq!(settings, MobileApiSettings::default());
    }

    #[test]
    fn from_lookup_reads_values() {
        let settings = MobileApiSettings::from_lookup(|name| match name {
            "MOBILE_API_ENABLED" => Some("true".into()),
            "MOBILE_VIDEO_PROFILES" => Some("mobile_low".into()),
            "MOBILE_VERSION_CACHE_TTL_SECS" => Some("60".into()),
            _ => None,
        })
        .unwrap();
        assert!(settings.enabled);
        assert_eq!(settings.video_profiles(), vec!["mobile_low"]);
        assert_eq!(settings.version_cache_ttl_secs, 60);
    }

    #[test]
    fn zero_ttl_is_rejected() {
        let result = MobileApiSettings::from_lookup(|name| {
            (name == "MOBILE_VERSION_CACHE_TTL_SECS").then(|| "0".to_string())
        });
        assert_matches!(result, Err(CoreError::Validation(_)));
    }

    #[test]
    fn bad_flag_is_rejected() {
        let result = MobileApiSettings::from_lookup(|name| {
            (name == "MOBILE_API_ENABLED").then(|| "yes".to_string())
        });
        assert_matches!(result, Err(CoreError::Config(_)));
    }
}
