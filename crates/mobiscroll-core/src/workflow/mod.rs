//! End-to-end configuration workflow
//!
//! Sequences detect -> resolve -> install -> patch per framework branch.
//! Steps run strictly one after another; no two file-mutating steps for
//! the same project are ever in flight at once.

pub mod angular;
pub mod guidance;
pub mod ionic;
pub mod local;

use crate::error::{Error, Result};
use crate::options::{InstallSettings, RunOptions};
use crate::pm::{self, CommandRunner, InstallFlags, PackageManager};
use crate::project::{FrameworkKind, ProjectDescriptor};
use crate::prompt::Prompter;
use crate::registry::api::LicenseApi;
use crate::registry::auth;
use crate::resolve::{self, LicenseDecision};
use std::path::Path;

/// Project types the config command accepts.
pub const SUPPORTED_TYPES: &[&str] =
    &["angular", "ionic", "react", "vue", "javascript", "jquery"];

/// Configure the project at `root` end to end.
pub async fn run_config<R, P, A>(
    root: &Path,
    opts: &RunOptions,
    runner: &R,
    prompter: &P,
    api: &A,
) -> Result<()>
where
    R: CommandRunner,
    P: Prompter,
    A: LicenseApi,
{
    if !SUPPORTED_TYPES.contains(&opts.project_type.as_str()) {
        return Err(Error::UnsupportedProject(format!(
            "unknown project type '{}'. Supported types: {}",
            opts.project_type,
            SUPPORTED_TYPES.join(", ")
        )));
    }

    let project = ProjectDescriptor::detect(root, opts.stylesheet)?;
    prompter.info("Mobiscroll configuration started.");

    // A too-old TypeScript can't compile the injected imports; bail before
    // anything is installed.
    if project.framework.uses_angular_patching() {
        project.check_typescript()?;
    }

    if !opts.npm_source {
        let (settings, stage) = local::prepare(&project, runner, prompter).await?;
        apply_patches(&project, &settings, opts, prompter)?;
        // cleanup only after the final patch step succeeded
        local::cleanup(&stage);
        prompter.success("Mobiscroll configuration ready.");
        return Ok(());
    }

    let base = project.framework.base_package(&opts.project_type);
    let use_scss = project.stylesheet == crate::project::StylesheetFormat::Scss;

    let settings = if opts.lite {
        // lite installs from the public registry, no login involved
        let version = resolve::resolve_version(api, base, opts.version_pin.as_deref()).await?;
        let resolved =
            resolve::resolve_package(base, &version, project.framework_major, false, true)?;
        install_package(&project, &resolved, opts, "", runner, prompter, false).await?;
        InstallSettings::for_registry_package(&resolved.import_name, &version, use_scss, None)
    } else {
        prompter.info("Checking logged in status...");
        let user = ensure_logged_in(root, opts, runner, prompter).await?;

        let version = resolve::resolve_version(api, base, opts.version_pin.as_deref()).await?;
        let info = api.license_info(&user).await?;

        let decision = resolve::decide_license_track(&info, &version, opts.trial, prompter)?;
        let trial = match decision {
            LicenseDecision::Abort => return Err(Error::LicenseDenied),
            LicenseDecision::InstallTrial => true,
            LicenseDecision::InstallLicensed => false,
        };

        let resolved =
            resolve::resolve_package(base, &version, project.framework_major, trial, false)?;
        install_package(&project, &resolved, opts, &user, runner, prompter, true).await?;

        let api_key = if trial { info.trial_code.clone() } else { None };
        InstallSettings::for_registry_package(&resolved.import_name, &version, use_scss, api_key)
    };

    apply_patches(&project, &settings, opts, prompter)?;
    prompter.success("Mobiscroll configuration ready.");
    Ok(())
}

/// Reuse the cached registry session or prompt for a login.
async fn ensure_logged_in<R: CommandRunner, P: Prompter>(
    root: &Path,
    opts: &RunOptions,
    runner: &R,
    prompter: &P,
) -> Result<String> {
    let whoami_args = vec![
        "whoami".to_string(),
        format!("--registry={}", pm::REGISTRY_URL),
    ];
    if let Ok(out) = runner.run("npm", &whoami_args, root).await {
        let user = out.trim();
        if !user.is_empty() {
            prompter.info(&format!("Logged in as {}", user));
            return Ok(user.to_string());
        }
    }

    prompter.info("Logging in to the Mobiscroll npm registry...");
    let client = http_client(opts.proxy.as_deref())?;
    auth::login(&client, prompter).await
}

async fn install_package<R: CommandRunner, P: Prompter>(
    project: &ProjectDescriptor,
    resolved: &resolve::ResolvedPackage,
    opts: &RunOptions,
    user: &str,
    runner: &R,
    prompter: &P,
    scoped_registry: bool,
) -> Result<()> {
    let pm = PackageManager::detect(&project.root);
    prompter.info(&format!("Installing {} ...", resolved.install_spec));

    let flags = InstallFlags {
        save: true,
        legacy_peer_deps: project.framework.uses_angular_patching(),
        scoped_registry,
        proxy: opts.proxy.clone(),
    };
    let args = pm.install_args(&resolved.install_spec, &flags);

    match runner.run(pm.bin(), &args, &project.root).await {
        Ok(_) => {
            prompter.success(&format!(
                "Mobiscroll for {} installed.",
                project.framework.display_name()
            ));
            Ok(())
        }
        Err(Error::InstallCommandFailed { command, detail }) => {
            let detail = pm::access_denied_hint(&detail, user, &resolved.import_name)
                .unwrap_or(detail);
            Err(Error::InstallCommandFailed { command, detail })
        }
        Err(err) => Err(err),
    }
}

/// Per-framework patch dispatch.
fn apply_patches<P: Prompter>(
    project: &ProjectDescriptor,
    settings: &InstallSettings,
    opts: &RunOptions,
    prompter: &P,
) -> Result<()> {
    match project.framework {
        FrameworkKind::Angular | FrameworkKind::IonicAngular => {
            angular::apply(project, settings, opts, prompter)
        }
        FrameworkKind::IonicLegacy => ionic::apply(project, settings, opts, prompter),
        FrameworkKind::IonicReact | FrameworkKind::React => guidance::react(project, settings),
        FrameworkKind::Vue => {
            guidance::vue(project, settings);
            Ok(())
        }
        FrameworkKind::PlainJs => {
            guidance::javascript(project, settings);
            Ok(())
        }
    }
}

/// Clone a starter template, then run the config flow inside it.
pub async fn run_start<R, P, A>(
    cwd: &Path,
    name: &str,
    opts: &RunOptions,
    runner: &R,
    prompter: &P,
    api: &A,
) -> Result<()>
where
    R: CommandRunner,
    P: Prompter,
    A: LicenseApi,
{
    let (repo, run_command) = starter_template(&opts.project_type)?;

    prompter.info(&format!("Cloning the {} starter...", opts.project_type));
    let args = vec!["clone".to_string(), repo.to_string(), name.to_string()];
    runner.run("git", &args, cwd).await?;

    let root = cwd.join(name);
    // Starter types are more specific than config types.
    let config_type = match opts.project_type.as_str() {
        "ionic-angular" => "ionic",
        "ionic-react" => "react",
        other => other,
    };
    let config_opts = RunOptions {
        project_type: config_type.to_string(),
        ..opts.clone()
    };
    run_config(&root, &config_opts, runner, prompter, api).await?;

    println!();
    println!("NEXT STEPS");
    println!();
    println!("  - Go to your newly created project: cd ./{}", name);
    println!("  - Run the app with the following command: {}", run_command);
    println!();
    Ok(())
}

fn starter_template(project_type: &str) -> Result<(&'static str, &'static str)> {
    match project_type {
        "angular" => Ok(("https://github.com/acidb/angular-starter", "npm start")),
        "ionic" | "ionic-angular" => {
            Ok(("https://github.com/acidb/ionic-starter", "ionic serve"))
        }
        "ionic-react" => Ok(("https://github.com/acidb/ionic-react-starter", "ionic serve")),
        "react" => Ok(("https://github.com/acidb/react-starter", "npm start")),
        other => Err(Error::UnsupportedProject(format!(
            "no starter template for project type '{}'",
            other
        ))),
    }
}

/// `mobiscroll login`
pub async fn run_login<P: Prompter>(prompter: &P, proxy: Option<&str>) -> Result<()> {
    if auth::has_credentials(&auth::npmrc_path()) {
        prompter.info("You are already logged in to the Mobiscroll npm registry!");
        return Ok(());
    }
    let client = http_client(proxy)?;
    auth::login(&client, prompter).await?;
    prompter.success("Successful login!");
    Ok(())
}

/// `mobiscroll logout`
pub fn run_logout<P: Prompter>(prompter: &P) -> Result<()> {
    if auth::remove_token(&auth::npmrc_path())? {
        prompter.success("Successful logout!");
    } else {
        prompter.info("You are not logged in to the Mobiscroll npm registry!");
    }
    Ok(())
}

fn http_client(proxy: Option<&str>) -> Result<reqwest::Client> {
    let mut builder =
        reqwest::Client::builder().user_agent(format!("mobiscroll-cli/{}", crate::CLI_VERSION));
    if let Some(proxy) = proxy {
        builder = builder.proxy(reqwest::Proxy::all(proxy)?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedPrompter;
    use crate::registry::api::RemoteLicenseInfo;
    use serde_json::Value;
    use std::fs;
    use std::sync::Mutex;

    struct MockApi {
        info: RemoteLicenseInfo,
        version: String,
    }

    impl LicenseApi for MockApi {
        async fn license_info(&self, _user: &str) -> Result<RemoteLicenseInfo> {
            Ok(self.info.clone())
        }

        async fn resolve_version(&self, _base: &str, _pin: Option<&str>) -> Result<String> {
            Ok(self.version.clone())
        }
    }

    /// Records commands; answers whoami and emulates pack by dropping a
    /// tarball into the cwd.
    struct MockRunner {
        calls: Mutex<Vec<String>>,
        whoami: Option<String>,
    }

    impl MockRunner {
        fn logged_in(user: &str) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                whoami: Some(user.to_string()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl CommandRunner for MockRunner {
        async fn run(&self, program: &str, args: &[String], cwd: &Path) -> Result<String> {
            let rendered = format!("{} {}", program, args.join(" "));
            self.calls.lock().unwrap().push(rendered.clone());

            match args.first().map(String::as_str) {
                Some("whoami") => self.whoami.clone().ok_or(Error::InstallCommandFailed {
                    command: rendered,
                    detail: "not logged in".to_string(),
                }),
                Some("pack") => {
                    let manifest: Value = serde_json::from_str(
                        &fs::read_to_string(cwd.join("package.json")).unwrap(),
                    )
                    .unwrap();
                    let tarball = format!(
                        "mobiscroll-angular-{}.tgz",
                        manifest["version"].as_str().unwrap()
                    );
                    fs::write(cwd.join(&tarball), b"tarball").unwrap();
                    Ok(format!("{}\n", tarball))
                }
                _ => Ok(String::new()),
            }
        }
    }

    const ANGULAR_JSON: &str = r#"{
    "projects": {
        "app": {
            "architect": {
                "build": {
                    "options": { "styles": ["src/styles.css"] }
                }
            }
        }
    }
}"#;

    const APP_MODULE: &str = "\
import { NgModule } from '@angular/core';

@NgModule({
  imports: [
    BrowserModule
  ],
})
export class AppModule {}
";

    fn angular_fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src/app")).unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{
    "name": "demo",
    "dependencies": { "@angular/common": "^14.0.0", "@angular/core": "^14.0.0" },
    "devDependencies": { "typescript": "~4.8.0" }
}"#,
        )
        .unwrap();
        fs::write(dir.path().join("angular.json"), ANGULAR_JSON).unwrap();
        fs::write(dir.path().join("src/app/app.module.ts"), APP_MODULE).unwrap();
        dir
    }

    fn licensed_api() -> MockApi {
        MockApi {
            info: RemoteLicenseInfo {
                has_access: true,
                license: Some("Complete".to_string()),
                ..Default::default()
            },
            version: "5.23.0".to_string(),
        }
    }

    fn config_opts() -> RunOptions {
        RunOptions {
            project_type: "angular".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn angular_14_full_run() {
        let dir = angular_fixture();
        let runner = MockRunner::logged_in("jane\n");
        let prompter = ScriptedPrompter::default();

        run_config(dir.path(), &config_opts(), &runner, &prompter, &licensed_api())
            .await
            .unwrap();

        // Angular 14 + 5.23.0 resolves to the ivy build, no trial suffix
        let calls = runner.calls();
        assert!(calls
            .iter()
            .any(|c| c.contains("install @mobiscroll/angular-ivy@5.23.0")));
        assert!(calls.iter().any(|c| c.contains("--legacy-peer-deps")));

        let doc: Value = serde_json::from_str(
            &fs::read_to_string(dir.path().join("angular.json")).unwrap(),
        )
        .unwrap();
        let styles = doc
            .pointer("/projects/app/architect/build/options/styles")
            .unwrap();
        assert_eq!(styles[0], "src/styles.css");
        assert_eq!(
            styles[1],
            "node_modules/@mobiscroll/angular-ivy/dist/css/mobiscroll.min.css"
        );

        let module = fs::read_to_string(dir.path().join("src/app/app.module.ts")).unwrap();
        assert!(module.contains("import { MbscModule } from '@mobiscroll/angular-ivy';"));
        assert!(module.contains("import { FormsModule } from '@angular/forms';"));
    }

    #[tokio::test]
    async fn second_run_is_a_no_op() {
        let dir = angular_fixture();
        let runner = MockRunner::logged_in("jane\n");
        let prompter = ScriptedPrompter::default();
        let api = licensed_api();
        let opts = config_opts();

        run_config(dir.path(), &opts, &runner, &prompter, &api)
            .await
            .unwrap();
        let module = fs::read_to_string(dir.path().join("src/app/app.module.ts")).unwrap();
        let angular_json = fs::read_to_string(dir.path().join("angular.json")).unwrap();
        let manifest = fs::read_to_string(dir.path().join("package.json")).unwrap();

        run_config(dir.path(), &opts, &runner, &prompter, &api)
            .await
            .unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join("src/app/app.module.ts")).unwrap(),
            module
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("angular.json")).unwrap(),
            angular_json
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("package.json")).unwrap(),
            manifest
        );
    }

    #[tokio::test]
    async fn declined_trial_fallback_aborts_before_install() {
        let dir = angular_fixture();
        let manifest_before = fs::read_to_string(dir.path().join("package.json")).unwrap();

        let runner = MockRunner::logged_in("jane\n");
        // access denied on a known license tier; user declines the fallback
        let api = MockApi {
            info: RemoteLicenseInfo {
                has_access: false,
                license: Some("Framework".to_string()),
                ..Default::default()
            },
            version: "5.23.0".to_string(),
        };
        let prompter = ScriptedPrompter {
            confirm_answer: false,
            ..Default::default()
        };

        let err = run_config(dir.path(), &config_opts(), &runner, &prompter, &api)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::LicenseDenied));

        assert!(!runner.calls().iter().any(|c| c.contains("install")));
        assert_eq!(
            fs::read_to_string(dir.path().join("package.json")).unwrap(),
            manifest_before
        );
    }

    #[tokio::test]
    async fn trial_user_gets_key_injected() {
        let dir = angular_fixture();
        let runner = MockRunner::logged_in("trialuser\n");
        let api = MockApi {
            info: RemoteLicenseInfo {
                has_access: false,
                trial_code: Some("tr-123".to_string()),
                ..Default::default()
            },
            version: "5.23.0".to_string(),
        };
        let prompter = ScriptedPrompter::default();

        run_config(dir.path(), &config_opts(), &runner, &prompter, &api)
            .await
            .unwrap();

        // trial + ivy installs under the stable alias
        assert!(runner.calls().iter().any(|c| {
            c.contains("install @mobiscroll/angular@npm:@mobiscroll/angular-ivy-trial@5.23.0")
        }));

        let module = fs::read_to_string(dir.path().join("src/app/app.module.ts")).unwrap();
        assert!(module.contains("import { MbscModule, mobiscroll } from '@mobiscroll/angular';"));
        assert!(module.contains("mobiscroll.apiKey = 'tr-123';"));
    }

    #[tokio::test]
    async fn no_npm_packs_and_rewires_the_manifest() {
        let dir = angular_fixture();
        fs::create_dir_all(dir.path().join("src/lib/mobiscroll/js")).unwrap();
        fs::create_dir_all(dir.path().join("src/lib/mobiscroll/css")).unwrap();
        fs::write(
            dir.path().join("src/lib/mobiscroll/js/mobiscroll.angular-5.23.0.js"),
            "/*! Mobiscroll v5.23.0 */\nexport {};\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("src/lib/mobiscroll/css/mobiscroll.angular-5.23.0.css"),
            ".mbsc {}\n",
        )
        .unwrap();

        let runner = MockRunner::logged_in("jane\n");
        let prompter = ScriptedPrompter::default();
        let opts = RunOptions {
            npm_source: false,
            ..config_opts()
        };

        run_config(dir.path(), &opts, &runner, &prompter, &licensed_api())
            .await
            .unwrap();

        let manifest: Value = serde_json::from_str(
            &fs::read_to_string(dir.path().join("package.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(
            manifest["dependencies"]["@mobiscroll/angular"],
            "file:./mobiscroll-angular-5.23.0.tgz"
        );
        assert!(dir.path().join("mobiscroll-angular-5.23.0.tgz").exists());
        // staging dir is cleaned up after the patches
        assert!(!dir.path().join(".mobiscroll-pack").exists());
        // no registry install, no login
        assert!(!runner.calls().iter().any(|c| c.contains("whoami")));
        assert!(!runner.calls().iter().any(|c| c.contains("install")));
    }

    #[tokio::test]
    async fn lite_skips_login_entirely() {
        let dir = angular_fixture();
        let runner = MockRunner::logged_in("jane\n");
        let prompter = ScriptedPrompter::default();
        let opts = RunOptions {
            lite: true,
            ..config_opts()
        };

        run_config(dir.path(), &opts, &runner, &prompter, &licensed_api())
            .await
            .unwrap();

        let calls = runner.calls();
        assert!(!calls.iter().any(|c| c.contains("whoami")));
        assert!(calls
            .iter()
            .any(|c| c.contains("install @mobiscroll/angular-lite@5.23.0")));
        // the public registry serves the lite tier
        assert!(!calls.iter().any(|c| c.contains("--registry=")));
    }

    #[tokio::test]
    async fn login_short_circuits_on_an_existing_token() {
        let home = tempfile::tempdir().unwrap();
        fs::write(
            home.path().join(".npmrc"),
            format!("{}tok\n", auth::AUTH_LINE_PREFIX),
        )
        .unwrap();
        std::env::set_var("HOME", home.path());
        std::env::set_var("USERPROFILE", home.path());

        // the scripted prompter has no credentials to offer, so reaching
        // the interactive login would fail the test
        run_login(&ScriptedPrompter::default(), None).await.unwrap();
    }

    #[tokio::test]
    async fn old_typescript_aborts_before_anything_runs() {
        let dir = angular_fixture();
        fs::write(
            dir.path().join("package.json"),
            r#"{
    "dependencies": { "@angular/core": "^4.0.0" },
    "devDependencies": { "typescript": "~2.1.6" }
}"#,
        )
        .unwrap();

        let runner = MockRunner::logged_in("jane\n");
        let err = run_config(
            dir.path(),
            &config_opts(),
            &runner,
            &ScriptedPrompter::default(),
            &licensed_api(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::UnsupportedProject(_)));
        assert!(runner.calls().is_empty());
    }
}
