//! Detection of the native mobile apps from their `User-Agent` header.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// iOS app, e.g. `edX/org.edx.mobile (2.2.0; OS Version 9.2 (Build 13C75))`.
const IOS_USER_AGENT_PATTERN: &str = concat!(
    r"\((?P<version>[0-9]+.[0-9]+.[0-9]+(.[0-9a-zA-Z]*)?); ",
    r"OS Version [0-9.]+ \(Build [0-9a-zA-Z]*\)\)",
);

/// Android app, e.g.
/// `Dalvik/2.1.0 (Linux; U; Android 5.1; Nexus 5 Build/LMY47I) edX/org.edx.mobile/2.0.0`.
const ANDROID_USER_AGENT_PATTERN: &str = concat!(
    r"Dalvik/[.0-9]+ \(Linux; U; Android [.0-9]+; (.*) Build/[0-9a-zA-Z]*\) ",
    r"(.*)/(?P<version>[0-9]+.[0-9]+.[0-9]+(.[0-9a-zA-Z]*)?)",
);

static IOS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(IOS_USER_AGENT_PATTERN).expect("valid regex"));
static ANDROID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(ANDROID_USER_AGENT_PATTERN).expect("valid regex"));

/// A supported mobile platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MobilePlatform {
    #[serde(rename = "iOS")]
    Ios,
    #[serde(rename = "Android")]
    Android,
}

/// A recognised app request: which platform, and the app version it reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedApp {
    pub platform: MobilePlatform,
    pub version: String,
}

impl MobilePlatform {
    /// All supported platforms, in detection order.
    pub const ALL: [MobilePlatform; 2] = [MobilePlatform::Ios, MobilePlatform::Android];

    pub fn name(&self) -> &'static str {
        match self {
            MobilePlatform::Ios => "iOS",
            MobilePlatform::Android => "Android",
        }
    }

    fn user_agent_regex(&self) -> &'static Regex {
        match self {
            MobilePlatform::Ios => &*IOS_RE,
            MobilePlatform::Android => &*ANDROID_RE,
        }
    }

    /// The app version if `user_agent` belongs to this platform's app.
    pub fn match_user_agent(&self, user_agent: &str) -> Option<String> {
        self.user_agent_regex()
            .captures(user_agent)
            .and_then(|caps| caps.name("version"))
            .map(|m| m.as_str().to_string())
    }

    /// Identify the platform and app version from a user agent.
    pub fn detect(user_agent: &str) -> Option<DetectedApp> {
        Self::ALL.iter().find_map(|platform| {
            platform.match_user_agent(user_agent).map(|version| DetectedApp {
                platform: *platform,
                version,
            })
        })
    }
}

impl fmt::Display for MobilePlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MobilePlatform {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Unknown mobile platform '{s}'. Must be one of: iOS, Android"
                ))
            })
    }
}

/// Whether the request comes from one of the native apps.
pub fn is_mobile_app_user_agent(user_agent: &str) -> bool {
    MobilePlatform::detect(user_agent).is_some()
}
