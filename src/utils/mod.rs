//! Shared utilities.
//!
//! - [`app_data`] - configuration file and per-dataset index locations
//! - [`progress`] - spinner shim over `indicatif`

pub mod app_data;
pub mod progress;

pub use app_data::*;
