//! Package resolution and the trial/license decision
//!
//! Given the framework, license state and explicit overrides, computes the
//! exact package to install. Resolution is deterministic for identical
//! inputs and identical API responses.

use crate::error::{Error, Result};
use crate::pm::PackageManager;
use crate::prompt::Prompter;
use crate::registry::api::{LicenseApi, RemoteLicenseInfo};
use semver::Version;

/// Ivy builds exist from this package version on.
pub const IVY_MIN_VERSION: &str = "5.19.0";

/// Angular majors from here on consume the Ivy-compatible build.
pub const IVY_MIN_ANGULAR_MAJOR: u64 = 13;

/// Licensed versions below this are unsupported; those users are steered
/// onto the trial track instead of a broken install.
pub const MIN_SUPPORTED_VERSION: &str = "4.0.0";

/// The exact package an install run will produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPackage {
    /// Name downstream imports resolve against
    pub import_name: String,
    /// Spec handed to the package manager (may be an alias spec)
    pub install_spec: String,
    pub version: String,
    pub trial: bool,
    pub ivy: bool,
}

/// Outcome of the license check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LicenseDecision {
    InstallTrial,
    InstallLicensed,
    Abort,
}

/// A pin counts as concrete when it is a full semver; bare majors go to
/// the remote resolver.
pub fn is_full_semver(pin: &str) -> bool {
    Version::parse(pin).is_ok()
}

/// Turn the optional pin into a concrete version, asking the API when the
/// pin is absent or partial.
pub async fn resolve_version<A: LicenseApi>(
    api: &A,
    base_package: &str,
    pin: Option<&str>,
) -> Result<String> {
    match pin {
        Some(pin) if is_full_semver(pin) => Ok(pin.to_string()),
        other => api.resolve_version(base_package, other).await,
    }
}

/// Compute the package name/spec for the resolved version.
///
/// Suffix combination: base + `-ivy` when Ivy-eligible + `-trial` on the
/// trial track; `-lite` is its own tier and excludes the others. When trial
/// and Ivy both apply the package is installed under the non-trial name via
/// an npm alias so import paths stay stable across license states.
pub fn resolve_package(
    base: &str,
    version: &str,
    angular_major: Option<u64>,
    trial: bool,
    lite: bool,
) -> Result<ResolvedPackage> {
    if lite {
        let name = format!("@mobiscroll/{}-lite", base);
        return Ok(ResolvedPackage {
            install_spec: format!("{}@{}", name, version),
            import_name: name,
            version: version.to_string(),
            trial: false,
            ivy: false,
        });
    }

    let parsed = Version::parse(version).map_err(|e| {
        Error::UnsupportedProject(format!("invalid resolved version '{}': {}", version, e))
    })?;
    let ivy_min = Version::parse(IVY_MIN_VERSION).expect("static version");
    let ivy = base == "angular"
        && angular_major.is_some_and(|major| major >= IVY_MIN_ANGULAR_MAJOR)
        && parsed >= ivy_min;

    let mut name = format!("@mobiscroll/{}", base);
    if ivy {
        name.push_str("-ivy");
    }
    if trial {
        name.push_str("-trial");
    }

    let (import_name, install_spec) = if trial && ivy {
        let stable = format!("@mobiscroll/{}", base);
        let spec = PackageManager::alias_spec(&stable, &name, version);
        (stable, spec)
    } else {
        (name.clone(), format!("{}@{}", name, version))
    };

    Ok(ResolvedPackage {
        import_name,
        install_spec,
        version: version.to_string(),
        trial,
        ivy,
    })
}

/// The trial/license decision, run after login.
///
/// `CheckingAccess` is the license fetch done by the caller; this function
/// is the rest of the state machine. Denied access with a known license
/// tier asks the user whether to fall back to trial - even when the trial
/// was requested explicitly - and declining aborts with nothing installed.
/// Granted access still lands on trial when the resolved version predates
/// the supported range.
pub fn decide_license_track<P: Prompter>(
    info: &RemoteLicenseInfo,
    resolved_version: &str,
    trial_requested: bool,
    prompter: &P,
) -> Result<LicenseDecision> {
    if !info.has_access {
        if info.license.is_some() {
            prompter.warning(&format!(
                "Your {} license does not cover this package.",
                info.license.as_deref().unwrap_or("current")
            ));
            let fallback =
                prompter.confirm("Would you like to install the trial version instead?", true)?;
            return if fallback {
                Ok(LicenseDecision::InstallTrial)
            } else {
                Ok(LicenseDecision::Abort)
            };
        }
        // No license on record at all: trial account
        return Ok(LicenseDecision::InstallTrial);
    }

    if trial_requested {
        return Ok(LicenseDecision::InstallTrial);
    }

    let min = Version::parse(MIN_SUPPORTED_VERSION).expect("static version");
    match Version::parse(resolved_version) {
        Ok(v) if v < min => Ok(LicenseDecision::InstallTrial),
        _ => Ok(LicenseDecision::InstallLicensed),
    }
}
