//! Mobile app version strings (`X.Y.Z` with an optional `.suffix`).

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\.(\d+)\.(\d+)(?:\.[0-9A-Za-z]*)?$").expect("valid regex")
});

/// The numeric part of an app version. Ordering compares major, then minor,
/// then patch; any trailing build suffix is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AppVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl AppVersion {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse a version such as `2.1.0` or `2.1.0.rc1`.
    pub fn parse(version: &str) -> Result<Self, CoreError> {
        let invalid = || CoreError::InvalidVersion(version.to_string());
        let caps = VERSION_RE.captures(version.trim()).ok_or_else(invalid)?;
        let component = |i: usize| -> Result<u32, CoreError> {
            caps.get(i)
                .and_then(|m| m.as_str().parse().ok())
                .ok_or_else(invalid)
        };
        Ok(Self::new(component(1)?, component(2)?, component(3)?))
    }
}

impl FromStr for AppVersion {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for AppVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
