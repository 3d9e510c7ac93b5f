//! Forced-upgrade policy for the native mobile apps.
//!
//! Pure logic: the HTTP layer passes in the request's user agent, the app
//! version rows and the current time, then turns the result into a
//! `426 Upgrade Required` response or extra response headers.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::mobile::app_version::{self, AppVersionConfig};
use crate::mobile::platform::{DetectedApp, MobilePlatform};
use crate::mobile::settings::MobileApiSettings;
use crate::mobile::version::AppVersion;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Response header carrying the newest available app version.
pub const LATEST_VERSION_HEADER: &str = "EDX-APP-LATEST-VERSION";

/// Response header carrying the date the caller's version stops working.
pub const UPGRADE_DEADLINE_HEADER: &str = "EDX-APP-UPGRADE-DATE";

/// Default lifetime of cached lookups, in seconds.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

// ---------------------------------------------------------------------------
// Version info
// ---------------------------------------------------------------------------

/// Upgrade-relevant facts about one app request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    pub platform: MobilePlatform,
    pub user_app_version: String,
    /// `None` when the caller's version has no configured expiry.
    pub last_supported_date: Option<Timestamp>,
    /// `None` when no version is configured for the platform.
    pub latest_version: Option<String>,
}

impl VersionInfo {
    /// True once the caller's version is past its last supported date.
    pub fn should_reject(&self, now: Timestamp) -> bool {
        matches!(self.last_supported_date, Some(deadline) if now > deadline)
    }

    /// Headers to attach to a successful response.
    pub fn response_headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = Vec::new();

        if let Some(deadline) = self.last_supported_date {
            headers.push((UPGRADE_DEADLINE_HEADER, deadline.to_rfc3339()));
        }

        if let Some(latest) = &self.latest_version {
            match (
                AppVersion::parse(&self.user_app_version),
                AppVersion::parse(latest),
            ) {
                (Ok(user), Ok(newest)) if user < newest => {
                    headers.push((LATEST_VERSION_HEADER, latest.clone()));
                }
                (Ok(_), Ok(_)) => {}
                _ => {
                    tracing::warn!(
                        user_app_version = %self.user_app_version,
                        latest_version = %latest,
                        "Cannot compare app versions, skipping latest-version header",
                    );
                }
            }
        }

        headers
    }
}

/// What the HTTP layer should do with a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpgradeDecision {
    /// Respond with `426 Upgrade Required` instead of handling the request.
    pub upgrade_required: bool,
    pub headers: Vec<(&'static str, String)>,
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct CacheEntry<T> {
    value: T,
    stored_at: DateTime<Utc>,
}

/// Caches deadline lookups per user agent and latest-version lookups per
/// platform, each for a fixed time-to-live.
#[derive(Debug)]
pub struct VersionInfoCache {
    ttl: chrono::Duration,
    deadlines: HashMap<String, CacheEntry<Option<Timestamp>>>,
    latest: HashMap<MobilePlatform, CacheEntry<Option<String>>>,
}

impl VersionInfoCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX),
            deadlines: HashMap::new(),
            latest: HashMap::new(),
        }
    }

    fn is_fresh<T>(&self, entry: &CacheEntry<T>, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(entry.stored_at) < self.ttl
    }

    fn deadline(&self, user_agent: &str, now: DateTime<Utc>) -> Option<Option<Timestamp>> {
        self.deadlines
            .get(user_agent)
            .filter(|e| self.is_fresh(e, now))
            .map(|e| e.value)
    }

    fn latest(&self, platform: MobilePlatform, now: DateTime<Utc>) -> Option<Option<String>> {
        self.latest
            .get(&platform)
            .filter(|e| self.is_fresh(e, now))
            .map(|e| e.value.clone())
    }

    fn store_deadline(
        &mut self,
        user_agent: &str,
        value: Option<Timestamp>,
        now: DateTime<Utc>,
    ) {
        self.purge_expired(now);
        self.deadlines.insert(
            user_agent.to_string(),
            CacheEntry {
                value,
                stored_at: now,
            },
        );
    }

    fn store_latest(
        &mut self,
        platform: MobilePlatform,
        value: Option<String>,
        now: DateTime<Utc>,
    ) {
        self.purge_expired(now);
        self.latest.insert(
            platform,
            CacheEntry {
                value,
                stored_at: now,
            },
        );
    }

    /// Remove entries older than the TTL. Runs on every store, so the map
    /// never holds more than one TTL's worth of user agents.
    pub fn purge_expired(&mut self, now: DateTime<Utc>) {
        let ttl = self.ttl;
        let fresh = |stored_at: DateTime<Utc>| now.signed_duration_since(stored_at) < ttl;
        self.deadlines.retain(|_, e| fresh(e.stored_at));
        self.latest.retain(|_, e| fresh(e.stored_at));
    }

    /// Drop every cached lookup, e.g. after the version rows change.
    pub fn clear(&mut self) {
        self.deadlines.clear();
        self.latest.clear();
    }

    pub fn len(&self) -> usize {
        self.deadlines.len() + self.latest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for VersionInfoCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_CACHE_TTL_SECS))
    }
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Evaluates app requests against the configured versions.
#[derive(Debug, Default)]
pub struct UpgradePolicy {
    cache: VersionInfoCache,
}

impl UpgradePolicy {
    pub fn new(cache_ttl: Duration) -> Self {
        Self {
            cache: VersionInfoCache::new(cache_ttl),
        }
    }

    pub fn from_settings(settings: &MobileApiSettings) -> Self {
        Self::new(Duration::from_secs(settings.version_cache_ttl_secs))
    }

    pub fn cache(&self) -> &VersionInfoCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut VersionInfoCache {
        &mut self.cache
    }

    /// Version info for a request, or `None` if it is not from a supported
    /// app (or carries no user agent).
    pub fn version_info(
        &mut self,
        user_agent: Option<&str>,
        configs: &[AppVersionConfig],
        now: Timestamp,
    ) -> Option<VersionInfo> {
        let user_agent = user_agent.filter(|ua| !ua.is_empty())?;
        let DetectedApp { platform, version } = MobilePlatform::detect(user_agent)?;

        let last_supported_date = match self.cache.deadline(user_agent, now) {
            Some(cached) => cached,
            None => {
                let deadline =
                    match app_version::last_supported_date(configs, platform, &version) {
                        Ok(deadline) => deadline,
                        Err(e) => {
                            tracing::warn!(
                                error = %e,
                                platform = %platform,
                                "Unparseable app version in user agent, skipping upgrade check",
                            );
                            return None;
                        }
                    };
                tracing::debug!(
                    platform = %platform,
                    version = %version,
                    "Cached upgrade deadline",
                );
                self.cache.store_deadline(user_agent, deadline, now);
                deadline
            }
        };

        let latest_version = match self.cache.latest(platform, now) {
            Some(cached) => cached,
            None => {
                let latest = app_version::latest_version(configs, platform);
                tracing::debug!(
                    platform = %platform,
                    latest = ?latest,
                    "Cached latest app version",
                );
                self.cache.store_latest(platform, latest.clone(), now);
                latest
            }
        };

        Some(VersionInfo {
            platform,
            user_app_version: version,
            last_supported_date,
            latest_version,
        })
    }

    /// Full decision for one request.
    pub fn evaluate(
        &mut self,
        user_agent: Option<&str>,
        configs: &[AppVersionConfig],
        now: Timestamp,
    ) -> UpgradeDecision {
        let Some(info) = self.version_info(user_agent, configs, now) else {
            return UpgradeDecision::default();
        };

        let upgrade_required = info.should_reject(now);
        if upgrade_required {
            tracing::info!(
                platform = %info.platform,
                user_app_version = %info.user_app_version,
                "Rejecting request from unsupported app version",
            );
        }

        UpgradeDecision {
            upgrade_required,
            headers: info.response_headers(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const IOS_UA: &str = "edX/org.edx.mobile (1.0.1; OS Version 9.2 (Build 13C75))";

    fn at(y: i32, m: u32, d: u32) -> Timestamp {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn row(version: &str, expire_at: Option<Timestamp>) -> AppVersionConfig {
        AppVersionConfig::new(MobilePlatform::Ios, version, expire_at, true, at(2024, 1, 1))
            .unwrap()
    }

    fn info(deadline: Option<Timestamp>, latest: Option<&str>) -> VersionInfo {
        VersionInfo {
            platform: MobilePlatform::Ios,
            user_app_version: "1.0.1".to_string(),
            last_supported_date: deadline,
            latest_version: latest.map(str::to_string),
        }
    }

    // -- VersionInfo ----------------------------------------------------------

    #[test]
    fn rejects_only_after_deadline() {
        let info = info(Some(at(2024, 6, 1)), None);
        assert!(!info.should_reject(at(2024, 5, 31)));
        assert!(!info.should_reject(at(2024, 6, 1)));
        assert!(info.should_reject(at(2024, 6, 2)));
    }

    #[test]
    fn no_deadline_never_rejects() {
        assert!(!info(None, None).should_reject(at(2099, 1, 1)));
    }

    #[test]
    fn headers_include_deadline_and_newer_version() {
        let headers = info(Some(at(2024, 6, 1)), Some("2.0.0")).response_headers();
        assert_eq!(
            headers,
            vec![
                (UPGRADE_DEADLINE_HEADER, "2024-06-01T00:00:00+00:00".to_string()),
                (LATEST_VERSION_HEADER, "2.0.0".to_string()),
            ]
        );
    }

    #[test]
    fn headers_skip_latest_when_up_to_date() {
        assert!(info(None, Some("1.0.1")).response_headers().is_empty());
    }

    // -- UpgradePolicy --------------------------------------------------------

    #[test]
    fn non_app_request_has_no_info() {
        let mut policy = UpgradePolicy::default();
        assert!(policy.version_info(None, &[], at(2024, 1, 1)).is_none());
        assert!(policy.version_info(Some(""), &[], at(2024, 1, 1)).is_none());
        assert!(policy
            .version_info(Some("Mozilla/5.0"), &[], at(2024, 1, 1))
            .is_none());
        assert!(policy.cache().is_empty());
    }

    #[test]
    fn evaluate_requires_upgrade_past_deadline() {
        let configs = vec![row("1.5.0", Some(at(2024, 6, 1))), row("2.0.0", None)];
        let mut policy = UpgradePolicy::default();
        let decision = policy.evaluate(Some(IOS_UA), &configs, at(2024, 7, 1));
        assert!(decision.upgrade_required);
        assert!(decision
            .headers
            .contains(&(LATEST_VERSION_HEADER, "2.0.0".to_string())));
    }

    #[test]
    fn evaluate_allows_before_deadline() {
        let configs = vec![row("1.5.0", Some(at(2024, 6, 1)))];
        let mut policy = UpgradePolicy::default();
        let decision = policy.evaluate(Some(IOS_UA), &configs, at(2024, 5, 1));
        assert!(!decision.upgrade_required);
        assert_eq!(decision.headers.len(), 2);
    }

    #[test]
    fn cached_lookups_ignore_config_changes_until_expiry() {
        let mut policy = UpgradePolicy::new(Duration::from_secs(60));
        let now = at(2024, 5, 1);
        let first = policy.version_info(Some(IOS_UA), &[], now).unwrap();
        assert_eq!(first.latest_version, None);

        let configs = vec![row("2.0.0", Some(at(2024, 6, 1)))];
        let cached = policy.version_info(Some(IOS_UA), &configs, now).unwrap();
        assert_eq!(cached.latest_version, None);
        assert_eq!(cached.last_supported_date, None);

        let later = now + chrono::Duration::seconds(61);
        let refreshed = policy.version_info(Some(IOS_UA), &configs, later).unwrap();
        assert_eq!(refreshed.latest_version.as_deref(), Some("2.0.0"));
        assert_eq!(refreshed.last_supported_date, Some(at(2024, 6, 1)));
    }

    #[test]
    fn expired_entries_are_evicted_on_store() {
        let mut policy = UpgradePolicy::new(Duration::from_secs(60));
        let now = at(2024, 5, 1);
        for build in 0..200 {
            let ua = format!(
                "Dalvik/2.1.0 (Linux; U; Android 5.1; Phone {build} Build/LMY47I) \
                 edX/org.edx.mobile/1.0.0"
            );
            assert!(policy.version_info(Some(&ua), &[], now).is_some());
        }
        assert_eq!(policy.cache().len(), 201);

        let later = now + chrono::Duration::days(30);
        policy.version_info(Some(IOS_UA), &[], later);
        assert_eq!(policy.cache().len(), 2);
    }

    #[test]
    fn purge_keeps_fresh_entries() {
        let mut policy = UpgradePolicy::new(Duration::from_secs(60));
        let now = at(2024, 5, 1);
        policy.version_info(Some(IOS_UA), &[], now);
        policy
            .cache_mut()
            .purge_expired(now + chrono::Duration::seconds(59));
        assert_eq!(policy.cache().len(), 2);
        policy
            .cache_mut()
            .purge_expired(now + chrono::Duration::seconds(60));
        assert!(policy.cache().is_empty());
    }

    #[test]
    fn clearing_cache_forces_refresh() {
        let mut policy = UpgradePolicy::default();
        let now = at(2024, 5, 1);
        policy.version_info(Some(IOS_UA), &[], now);
        assert_eq!(policy.cache().len(), 2);
        policy.cache_mut().clear();
        let configs = vec![row("2.0.0", None)];
        let info = policy.version_info(Some(IOS_UA), &configs, now).unwrap();
        assert_eq!(info.latest_version.as_deref(), Some("2.0.0"));
    }
}
