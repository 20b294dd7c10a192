//! Package manager detection and invocation
//!
//! Shell execution goes through the `CommandRunner` seam so the workflow
//! can be exercised in tests with recorded commands instead of real npm.

use crate::error::{Error, Result};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Scoped registry the licensed/trial packages live in.
pub const REGISTRY_URL: &str = "https://npm.mobiscroll.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Npm,
    Yarn,
    Pnpm,
}

impl PackageManager {
    /// Pick the manager from the lockfile present in the project root.
    pub fn detect(root: &Path) -> Self {
        if root.join("yarn.lock").exists() {
            PackageManager::Yarn
        } else if root.join("pnpm-lock.yaml").exists() {
            PackageManager::Pnpm
        } else {
            PackageManager::Npm
        }
    }

    pub fn bin(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Yarn => "yarn",
            PackageManager::Pnpm => "pnpm",
        }
    }

    fn add_verb(&self) -> &'static str {
        match self {
            PackageManager::Npm => "install",
            PackageManager::Yarn | PackageManager::Pnpm => "add",
        }
    }

    /// Arguments for installing `spec` (a `name@version` or alias spec).
    pub fn install_args(&self, spec: &str, flags: &InstallFlags) -> Vec<String> {
        let mut args = vec![self.add_verb().to_string(), spec.to_string()];
        match self {
            PackageManager::Npm => {
                if flags.save {
                    args.push("--save".to_string());
                }
                if flags.legacy_peer_deps {
                    args.push("--legacy-peer-deps".to_string());
                }
            }
            PackageManager::Yarn | PackageManager::Pnpm => {}
        }
        if flags.scoped_registry {
            args.push(format!("--registry={}", REGISTRY_URL));
        }
        if let Some(proxy) = &flags.proxy {
            args.push(format!("--proxy={}", proxy));
        }
        args
    }

    /// Arguments for producing a distributable tarball from the cwd.
    pub fn pack_args(&self) -> Vec<String> {
        vec!["pack".to_string()]
    }

    /// Alias spec installing `target@version` under the stable name
    /// `import_name`, so downstream import paths don't depend on the
    /// trial/ivy variant actually installed.
    pub fn alias_spec(import_name: &str, target: &str, version: &str) -> String {
        format!("{}@npm:{}@{}", import_name, target, version)
    }
}

/// Flags applied to an install invocation.
#[derive(Debug, Clone, Default)]
pub struct InstallFlags {
    pub save: bool,
    pub legacy_peer_deps: bool,
    /// Address the Mobiscroll registry instead of the default one
    pub scoped_registry: bool,
    pub proxy: Option<String>,
}

/// Seam for shell execution.
pub trait CommandRunner {
    /// Run `program` with `args` in `cwd`, returning stdout. A nonzero
    /// exit becomes `Error::InstallCommandFailed` carrying stderr.
    fn run(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

/// Real runner backed by tokio's process API.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellRunner;

impl CommandRunner for ShellRunner {
    async fn run(&self, program: &str, args: &[String], cwd: &Path) -> Result<String> {
        let rendered = format!("{} {}", program, args.join(" "));
        let output = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| Error::InstallCommandFailed {
                command: rendered.clone(),
                detail: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(Error::InstallCommandFailed {
                command: rendered,
                detail: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Translate a raw registry refusal into a human hint.
pub fn access_denied_hint(detail: &str, user: &str, package: &str) -> Option<String> {
    if detail.contains("403 Forbidden") {
        Some(format!(
            "User {} has no access to package {}.",
            user, package
        ))
    } else {
        None
    }
}
