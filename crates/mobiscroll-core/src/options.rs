//! Run options and resolved install settings

use crate::project::StylesheetFormat;

/// Options for a single `config`/`start` run, constructed once from the
/// parsed CLI arguments and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Project type as typed on the command line
    /// (angular, ionic, react, vue, javascript, jquery)
    pub project_type: String,

    /// Install the trial package tier
    pub trial: bool,

    /// Install the reduced-feature lite tier (skips login entirely)
    pub lite: bool,

    /// Install from the Mobiscroll npm registry (false = --no-npm:
    /// repackage locally extracted assets instead)
    pub npm_source: bool,

    /// Skip MbscModule injection (Ionic lazy-loaded modules)
    pub lazy: bool,

    /// Explicit version pin - full semver or a bare major like "5"
    pub version_pin: Option<String>,

    /// Proxy URL for registry and API traffic
    pub proxy: Option<String>,

    /// Stylesheet format override; None = auto-detect from the build config
    pub stylesheet: Option<StylesheetFormat>,

    /// Auto-confirm all prompts (non-interactive mode)
    pub yes: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            project_type: String::new(),
            trial: false,
            lite: false,
            npm_source: true,
            lazy: false,
            version_pin: None,
            proxy: None,
            stylesheet: None,
            yes: false,
        }
    }
}

/// Everything the patch steps need, resolved exactly once per run.
///
/// Downstream steps only ever read from this snapshot - no patch step
/// re-derives a package name or asset path on its own.
#[derive(Debug, Clone)]
pub struct InstallSettings {
    /// Package name used in injected import statements
    /// (e.g. `@mobiscroll/angular-trial`)
    pub import_name: String,

    /// Concrete resolved version
    pub version: String,

    /// Module path for the bootstrap import - usually `import_name`, but a
    /// relative lib path in --no-npm mode
    pub js_module_path: String,

    /// Stylesheet entry to add to the build config's styles list
    pub css_path: String,

    /// Trial access token to embed into the host app, when on the trial track
    pub api_key: Option<String>,
}

impl InstallSettings {
    /// Settings for a registry-installed package with conventional
    /// node_modules asset paths.
    pub fn for_registry_package(
        import_name: &str,
        version: &str,
        use_scss: bool,
        api_key: Option<String>,
    ) -> Self {
        let css = if use_scss { "mobiscroll.scss" } else { "mobiscroll.min.css" };
        Self {
            import_name: import_name.to_string(),
            version: version.to_string(),
            js_module_path: import_name.to_string(),
            css_path: format!("node_modules/{}/dist/css/{}", import_name, css),
            api_key,
        }
    }
}
