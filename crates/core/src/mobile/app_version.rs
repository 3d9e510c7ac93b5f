//! Mobile app version configuration.
//!
//! Operators record one row per released app version, optionally with an
//! expiry after which that version (and anything older) must upgrade. Rows
//! are keyed by (platform, version); a newer row for the same key supersedes
//! older ones, so only the "current set" is ever consulted.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::mobile::platform::MobilePlatform;
use crate::mobile::version::AppVersion;
use crate::types::Timestamp;

/// One configured app version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct AppVersionConfig {
    pub platform: MobilePlatform,
    #[validate(length(min = 1, max = 50))]
    pub version: String,
    pub major_version: u32,
    pub minor_version: u32,
    pub patch_version: u32,
    pub expire_at: Option<Timestamp>,
    pub enabled: bool,
    pub change_date: Timestamp,
}

impl AppVersionConfig {
    /// Build a row, splitting `version` into its numeric components.
    pub fn new(
        platform: MobilePlatform,
        version: &str,
        expire_at: Option<Timestamp>,
        enabled: bool,
        change_date: Timestamp,
    ) -> Result<Self, CoreError> {
        let parsed = AppVersion::parse(version)?;
        let config = Self {
            platform,
            version: version.to_string(),
            major_version: parsed.major,
            minor_version: parsed.minor,
            patch_version: parsed.patch,
            expire_at,
            enabled,
            change_date,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn app_version(&self) -> AppVersion {
        AppVersion::new(self.major_version, self.minor_version, self.patch_version)
    }
}

/// The newest row for each (platform, version) key.
pub fn current_set(configs: &[AppVersionConfig]) -> Vec<&AppVersionConfig> {
    let mut newest: HashMap<(MobilePlatform, &str), &AppVersionConfig> = HashMap::new();
    for config in configs {
        let key = (config.platform, config.version.as_str());
        match newest.get(&key) {
            Some(existing) if existing.change_date >= config.change_date => {}
            _ => {
                newest.insert(key, config);
            }
        }
    }
    newest.into_values().collect()
}

/// Enabled current rows for `platform`, sorted by ascending version.
fn active_for_platform(
    configs: &[AppVersionConfig],
    platform: MobilePlatform,
) -> Vec<&AppVersionConfig> {
    let mut active: Vec<&AppVersionConfig> = current_set(configs)
        .into_iter()
        .filter(|c| c.platform == platform && c.enabled)
        .collect();
    active.sort_by_key(|c| (c.app_version(), c.version.clone()));
    active
}

/// The newest enabled version configured for `platform`.
pub fn latest_version(configs: &[AppVersionConfig], platform: MobilePlatform) -> Option<String> {
    active_for_platform(configs, platform)
        .last()
        .map(|c| c.version.clone())
}

/// The date after which `version` is no longer supported on `platform`.
///
/// Scans enabled rows that carry an expiry, oldest version first, and returns
/// the expiry of the first one at or above `version`.
pub fn last_supported_date(
    configs: &[AppVersionConfig],
    platform: MobilePlatform,
    version: &str,
) -> Result<Option<Timestamp>, CoreError> {
    let parsed = AppVersion::parse(version)?;
    Ok(active_for_platform(configs, platform)
        .into_iter()
        .filter(|c| c.expire_at.is_some())
        .find(|c| c.app_version() >= parsed)
        .and_then(|c| c.expire_at))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
