//! Environment-variable helpers shared by the settings structs.
//!
//! Every settings type exposes `from_env()` for production and
//! `from_lookup(..)` so tests can supply variables without touching the
//! process environment.

use std::str::FromStr;

use crate::error::CoreError;

/// Read a variable from the process environment.
pub fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Read `name` through `lookup` and parse it, falling back to `default` when
/// unset or blank.
pub fn parse_or<T, F>(lookup: &F, name: &str, default: T) -> Result<T, CoreError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(raw) if !raw.trim().is_empty() => raw.trim().parse().map_err(|_| {
            CoreError::Config(format!("{name} has an invalid value '{raw}'"))
        }),
        _ => Ok(default),
    }
}

/// Read a required variable through `lookup`.
pub fn required<F>(lookup: &F, name: &str) -> Result<String, CoreError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| CoreError::Config(format!("{name} environment variable is required")))
}
