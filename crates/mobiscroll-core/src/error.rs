//! Error taxonomy for the configuration workflow
//!
//! Every low-level I/O or network failure is translated into one of these
//! kinds at the point of the call, so the orchestrator can decide between
//! aborting the run and continuing with the remaining patch targets.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// No package.json in the working directory - nothing to configure.
    #[error("there is no package.json in {0}\nPlease run this command in the project's root directory!")]
    ManifestNotFound(PathBuf),

    /// A file the patcher wanted to mutate does not exist. Recoverable:
    /// the workflow warns and continues with independent patch targets.
    #[error("could not find {0}")]
    PatchTargetMissing(PathBuf),

    /// A shell command (install, pack, clone) exited nonzero.
    #[error("command failed: {command}\n\n{detail}")]
    InstallCommandFailed { command: String, detail: String },

    /// The user has no access to the requested package and declined the
    /// trial fallback.
    #[error("no access to the requested Mobiscroll package")]
    LicenseDenied,

    /// Registry login was rejected.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The license/version API could not be reached or answered garbage.
    #[error("Mobiscroll API request failed: {0}")]
    Api(#[from] reqwest::Error),

    /// The project cannot consume what the patcher would inject
    /// (e.g. TypeScript below the minimum supported version).
    #[error("{0}")]
    UnsupportedProject(String),

    /// User aborted at an interactive prompt.
    #[error("setup cancelled")]
    Cancelled,

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Terminal/prompt I/O outside of any particular file.
    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Error::Json {
            path: path.into(),
            source,
        }
    }

    /// Whether the workflow may continue with sibling patch steps.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::PatchTargetMissing(_))
    }
}
