//! Mobiscroll Core - library behind the `mobiscroll` CLI
//!
//! Installs the Mobiscroll UI library into an existing web/mobile project
//! (Angular, Ionic, React, Vue, plain JS) and wires it into the project's
//! configuration files.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Core Operations** - file patching (`patch`), framework
//!   detection (`project`), package resolution (`resolve`), package-manager
//!   invocation (`pm`), registry/license API (`registry`)
//! - **Layer 2: Workflow Orchestration** - `workflow` sequences
//!   detect -> resolve -> install -> patch, generic over the `Prompter`,
//!   `CommandRunner` and `LicenseApi` seams
//! - **Layer 3: CLI/TUI Interface** - cliclack-based prompts (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based prompts module

pub mod error;
pub mod options;
pub mod patch;
pub mod pm;
pub mod project;
pub mod prompt;
pub mod registry;
pub mod resolve;
pub mod workflow;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use error::{Error, Result};
pub use options::{InstallSettings, RunOptions};
pub use pm::{CommandRunner, PackageManager, ShellRunner};
pub use project::{FrameworkKind, PackageManifest, ProjectDescriptor};
pub use prompt::Prompter;
pub use registry::api::{ApiClient, LicenseApi, RemoteLicenseInfo};
pub use resolve::{LicenseDecision, ResolvedPackage};

/// CLI version - sent as the user agent to the license API
pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");
