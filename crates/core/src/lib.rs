//! Core models and pure logic for the course authoring back office.
//!
//! Everything here is free of I/O: callers load records and configuration,
//! pass them in, and act on the returned values.

pub mod config;
pub mod course_update;
pub mod credentials;
pub mod date_format;
pub mod error;
pub mod mobile;
pub mod program;
pub mod types;
