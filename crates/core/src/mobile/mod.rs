//! Mobile app support: platform detection, app version configuration, and
//! the forced-upgrade policy applied to requests from the native apps.

pub mod app_version;
pub mod platform;
pub mod settings;
pub mod upgrade;
pub mod version;
