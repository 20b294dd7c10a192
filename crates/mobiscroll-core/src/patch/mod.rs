//! Idempotent config-file patching
//!
//! This module provides:
//! - Structural JSON patching (package.json, angular.json, .angular-cli.json)
//! - Regex-based text patching with duplicate-injection protection
//! - Angular bootstrap injection (module imports, trial api key)
//!
//! Every operation is safe to re-run: a previously applied patch is either
//! recognized and skipped, or removed and cleanly re-applied, so switching
//! between package variants (trial/licensed/lite) never stacks content.

pub mod bootstrap;
pub mod json;
pub mod text;

pub use bootstrap::{inject_api_key, inject_module_import, remove_api_key};
pub use json::{patch_json, push_unique, remove_matching};
pub use text::{patch_text, Insertion, TextEdit};
