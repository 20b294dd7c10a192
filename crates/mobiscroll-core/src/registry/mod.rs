//! Mobiscroll registry integration
//!
//! This module provides:
//! - The license/version HTTP API client (`api`)
//! - Registry login/logout and .npmrc credential management (`auth`)

pub mod api;
pub mod auth;

pub use api::{ApiClient, LicenseApi, RemoteLicenseInfo};
