//! Project inspection and framework detection

use crate::error::{Error, Result};
use semver::Version;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Minimum TypeScript version the injected bootstrap syntax compiles with.
pub const MIN_TYPESCRIPT_VERSION: &str = "2.2.0";

/// Parsed package.json - only the parts detection cares about.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PackageManifest {
    pub name: Option<String>,
    pub version: Option<String>,
    pub dependencies: BTreeMap<String, String>,
    pub dev_dependencies: BTreeMap<String, String>,
}

impl PackageManifest {
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join("package.json");
        if !path.exists() {
            return Err(Error::ManifestNotFound(root.to_path_buf()));
        }
        let raw = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        serde_json::from_str(&raw).map_err(|e| Error::json(&path, e))
    }

    /// Look up a dependency range in dependencies, then devDependencies.
    pub fn dep(&self, name: &str) -> Option<&str> {
        self.dependencies
            .get(name)
            .or_else(|| self.dev_dependencies.get(name))
            .map(String::as_str)
    }

    pub fn has_dep(&self, name: &str) -> bool {
        self.dep(name).is_some()
    }
}

/// Closed set of project classifications. Produced once by detection and
/// threaded through the rest of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameworkKind {
    /// Angular CLI application
    Angular,
    /// Ionic 4+ with Angular - structurally an Angular CLI app
    IonicAngular,
    /// Ionic 2/3 (`ionic-angular`), patched via the ionic_copy script
    IonicLegacy,
    /// Ionic with React
    IonicReact,
    React,
    Vue,
    /// Plain JavaScript or jQuery - guidance only
    PlainJs,
}

impl FrameworkKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            FrameworkKind::Angular => "Angular",
            FrameworkKind::IonicAngular => "Ionic (Angular)",
            FrameworkKind::IonicLegacy => "Ionic 2/3",
            FrameworkKind::IonicReact => "Ionic (React)",
            FrameworkKind::React => "React",
            FrameworkKind::Vue => "Vue",
            FrameworkKind::PlainJs => "JavaScript",
        }
    }

    /// Whether this project is configured through the Angular patch path
    /// (module/component injection + styles array).
    pub fn uses_angular_patching(&self) -> bool {
        matches!(
            self,
            FrameworkKind::Angular | FrameworkKind::IonicAngular | FrameworkKind::IonicLegacy
        )
    }

    /// Base name of the Mobiscroll package for this framework. The jQuery
    /// package is selected from the CLI argument since jQuery projects are
    /// indistinguishable from plain JS by manifest.
    pub fn base_package(&self, project_type_arg: &str) -> &'static str {
        match self {
            FrameworkKind::Angular | FrameworkKind::IonicAngular | FrameworkKind::IonicLegacy => {
                "angular"
            }
            FrameworkKind::IonicReact | FrameworkKind::React => "react",
            FrameworkKind::Vue => "vue",
            FrameworkKind::PlainJs => {
                if project_type_arg == "jquery" {
                    "jquery"
                } else {
                    "javascript"
                }
            }
        }
    }
}

/// Which build-tool config file carries the styles list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildConfigKind {
    /// angular.json (Angular CLI >= 6)
    AngularJson,
    /// .angular-cli.json (Angular CLI 1.x)
    AngularCliJson,
    /// package.json config.ionic_copy hook (Ionic 2/3)
    IonicCopyScript,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StylesheetFormat {
    Css,
    Scss,
}

/// Everything detection learned about the target project.
#[derive(Debug, Clone)]
pub struct ProjectDescriptor {
    pub root: PathBuf,
    pub manifest: PackageManifest,
    pub framework: FrameworkKind,
    /// Major version of the detected framework package, when parseable
    pub framework_major: Option<u64>,
    pub build_config: BuildConfigKind,
    pub stylesheet: StylesheetFormat,
    /// Angular only: the app component declares `standalone: true`, so the
    /// component file is the injection target instead of the module file.
    pub standalone: bool,
}

impl ProjectDescriptor {
    /// Inspect the project once. `stylesheet_override` comes from the
    /// --scss/--css flags and wins over auto-detection.
    pub fn detect(root: &Path, stylesheet_override: Option<StylesheetFormat>) -> Result<Self> {
        let manifest = PackageManifest::load(root)?;
        let framework = detect_framework(&manifest);
        let framework_major = framework_major(&manifest, framework);
        let build_config = detect_build_config(root, framework);
        let stylesheet =
            stylesheet_override.unwrap_or_else(|| detect_stylesheet(root, build_config));
        let standalone = framework.uses_angular_patching() && detect_standalone(root);

        Ok(Self {
            root: root.to_path_buf(),
            manifest,
            framework,
            framework_major,
            build_config,
            stylesheet,
            standalone,
        })
    }

    /// Fails if the project's TypeScript is too old to compile the typed
    /// imports the patcher injects. Only meaningful on Angular paths.
    pub fn check_typescript(&self) -> Result<()> {
        let Some(range) = self.manifest.dep("typescript") else {
            return Ok(());
        };
        let Some(found) = parse_loose_version(range) else {
            return Ok(());
        };
        let min = Version::parse(MIN_TYPESCRIPT_VERSION).expect("static version");
        if found < min {
            return Err(Error::UnsupportedProject(format!(
                "TypeScript {} is not supported (minimum is {}).\nPlease update the typescript package and run the config again!",
                found, MIN_TYPESCRIPT_VERSION
            )));
        }
        Ok(())
    }

    /// File receiving the MbscModule/FormsModule injection.
    pub fn bootstrap_file(&self) -> PathBuf {
        if self.standalone {
            self.root.join("src/app/app.component.ts")
        } else {
            self.root.join("src/app/app.module.ts")
        }
    }

    /// Decorator the api-key line is anchored in front of.
    pub fn decorator_anchor(&self) -> &'static str {
        if self.standalone {
            "@Component"
        } else {
            "@NgModule"
        }
    }
}

/// Classify the project from its manifest. First match wins.
pub fn detect_framework(manifest: &PackageManifest) -> FrameworkKind {
    if manifest.has_dep("@ionic/react") {
        return FrameworkKind::IonicReact;
    }
    if manifest.has_dep("@ionic/angular") {
        // Ionic >= 4 apps are structurally Angular CLI apps
        return FrameworkKind::IonicAngular;
    }
    if manifest.has_dep("ionic-angular") {
        return FrameworkKind::IonicLegacy;
    }
    if manifest.has_dep("@angular/core") {
        return FrameworkKind::Angular;
    }
    if manifest.has_dep("vue") {
        return FrameworkKind::Vue;
    }
    if manifest.has_dep("react") {
        return FrameworkKind::React;
    }
    FrameworkKind::PlainJs
}

fn framework_major(manifest: &PackageManifest, framework: FrameworkKind) -> Option<u64> {
    let package = match framework {
        FrameworkKind::Angular | FrameworkKind::IonicAngular => "@angular/core",
        FrameworkKind::IonicLegacy => "ionic-angular",
        FrameworkKind::IonicReact => "@ionic/react",
        FrameworkKind::React => "react",
        FrameworkKind::Vue => "vue",
        FrameworkKind::PlainJs => return None,
    };
    // Angular apps frequently only carry @angular/common at the top level
    let range = manifest
        .dep(package)
        .or_else(|| manifest.dep("@angular/common"))?;
    parse_major(range)
}

fn detect_build_config(root: &Path, framework: FrameworkKind) -> BuildConfigKind {
    if framework == FrameworkKind::IonicLegacy {
        return BuildConfigKind::IonicCopyScript;
    }
    if root.join("angular.json").exists() {
        BuildConfigKind::AngularJson
    } else if root.join(".angular-cli.json").exists() {
        BuildConfigKind::AngularCliJson
    } else {
        BuildConfigKind::None
    }
}

fn detect_stylesheet(root: &Path, build_config: BuildConfigKind) -> StylesheetFormat {
    let config = match build_config {
        BuildConfigKind::AngularJson => root.join("angular.json"),
        BuildConfigKind::AngularCliJson => root.join(".angular-cli.json"),
        _ => return StylesheetFormat::Css,
    };
    match fs::read_to_string(config) {
        Ok(raw) if raw.contains(".scss") => StylesheetFormat::Scss,
        _ => StylesheetFormat::Css,
    }
}

fn detect_standalone(root: &Path) -> bool {
    fs::read_to_string(root.join("src/app/app.component.ts"))
        .map(|s| s.contains("standalone: true"))
        .unwrap_or(false)
}

/// Leading major of a dependency range like `^14.0.0` or `~5.2`.
pub fn parse_major(range: &str) -> Option<u64> {
    let cleaned = range.trim_start_matches(['^', '~', '>', '=', 'v', ' ']);
    cleaned
        .split(['.', ' ', '-'])
        .next()?
        .parse()
        .ok()
}

/// Parse a dependency range into a comparable version, padding missing
/// minor/patch components with zeros.
pub fn parse_loose_version(range: &str) -> Option<Version> {
    let cleaned = range.trim_start_matches(['^', '~', '>', '=', 'v', ' ']);
    let core = cleaned.split(['-', ' ']).next()?;
    let mut parts = core.split('.');
    let major: u64 = parts.next()?.parse().ok()?;
    let minor: u64 = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    let patch: u64 = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    Some(Version::new(major, minor, patch))
}
