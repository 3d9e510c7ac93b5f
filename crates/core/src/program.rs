//! Program summary shown on the learner dashboard.
//!
//! Built from the catalog service's program payload; picks the three banner
//! renditions and attaches the fixed layout breakpoints.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Banner rendition keys in the catalog payload.
pub const BANNER_SMALL_KEY: &str = "w348h116";
pub const BANNER_MEDIUM_KEY: &str = "w435h145";
pub const BANNER_LARGE_KEY: &str = "w726h242";

pub const BREAKPOINT_SMALL: &str = "348px";
pub const BREAKPOINT_MEDIUM: &str = "768px";
pub const BREAKPOINT_LARGE: &str = "980px";

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// A program as returned by the catalog service.
#[derive(Debug, Clone, Deserialize)]
pub struct ProgramPayload {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub organizations: Vec<ProgramOrganization>,
    pub marketing_url: String,
    #[serde(default)]
    pub banner_image_urls: serde_json::Map<String, serde_json::Value>,
}

/// An organization offering the program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramOrganization {
    pub display_name: String,
    pub key: String,
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Maximum widths for each banner rendition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakpointWidths {
    pub small: String,
    pub medium: String,
    pub large: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Breakpoints {
    pub max: BreakpointWidths,
}

impl Default for Breakpoints {
    fn default() -> Self {
        Self {
            max: BreakpointWidths {
                small: BREAKPOINT_SMALL.to_string(),
                medium: BREAKPOINT_MEDIUM.to_string(),
                large: BREAKPOINT_LARGE.to_string(),
            },
        }
    }
}

/// Dashboard card data for one program.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramSummary {
    pub name: String,
    pub category: String,
    pub subtitle: String,
    pub organizations: Vec<ProgramOrganization>,
    pub marketing_url: String,
    pub small_banner_url: String,
    pub medium_banner_url: String,
    pub large_banner_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakpoints: Option<Breakpoints>,
}

impl ProgramSummary {
    /// Build a summary from an optional catalog payload.
    ///
    /// `None` yields an empty summary without breakpoints. A payload missing
    /// any banner rendition is rejected.
    pub fn from_payload(payload: Option<ProgramPayload>) -> Result<Self, CoreError> {
        let Some(payload) = payload else {
            return Ok(Self::default());
        };

        let banner = |key: &str| -> Result<String, CoreError> {
            payload
                .banner_image_urls
                .get(key)
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .ok_or_else(|| {
                    CoreError::Validation(format!(
                        "Program '{}' has no '{key}' banner image",
                        payload.name
                    ))
                })
        };

        let small_banner_url = banner(BANNER_SMALL_KEY)?;
        let medium_banner_url = banner(BANNER_MEDIUM_KEY)?;
        let large_banner_url = banner(BANNER_LARGE_KEY)?;

        Ok(Self {
            name: payload.name,
            category: payload.category,
            subtitle: payload.subtitle,
            organizations: payload.organizations,
            marketing_url: payload.marketing_url,
            small_banner_url,
            medium_banner_url,
            large_banner_url,
            breakpoints: Some(Breakpoints::default()),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
