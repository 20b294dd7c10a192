//! mobiscroll CLI - installs and configures Mobiscroll in web/mobile projects

use anyhow::Result;
use clap::{Args as ClapArgs, Parser, Subcommand};
use mobiscroll_core::project::StylesheetFormat;
use mobiscroll_core::{tui, RunOptions};

#[derive(Parser, Debug)]
#[command(name = "mobiscroll")]
#[command(about = "Installs and configures Mobiscroll in your project")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Install Mobiscroll and patch the project in the current directory
    Config(ConfigArgs),
    /// Log in to the Mobiscroll npm registry
    Login {
        /// Proxy URL for registry and API traffic
        #[arg(long)]
        proxy: Option<String>,
    },
    /// Remove the Mobiscroll registry credentials from ~/.npmrc
    Logout,
    /// Clone a starter app and configure it in one step
    Start(StartArgs),
}

#[derive(ClapArgs, Debug)]
pub struct ConfigArgs {
    /// Project type: angular, ionic, react, vue, javascript or jquery
    pub project_type: String,

    #[command(flatten)]
    pub flags: ConfigFlags,
}

#[derive(ClapArgs, Debug)]
pub struct StartArgs {
    /// Starter type: angular, ionic, ionic-angular, ionic-react or react
    pub project_type: String,

    /// Name of the directory to create
    pub name: String,

    #[command(flatten)]
    pub flags: ConfigFlags,
}

#[derive(ClapArgs, Debug)]
pub struct ConfigFlags {
    /// Install the trial package
    #[arg(short, long)]
    pub trial: bool,

    /// Install the reduced-feature lite package (no login required)
    #[arg(short, long, conflicts_with = "trial")]
    pub lite: bool,

    /// Repackage Mobiscroll from a local extracted download instead of
    /// installing from the registry
    #[arg(long = "no-npm")]
    pub no_npm: bool,

    /// Skip module injection (for lazy-loaded Ionic page modules)
    #[arg(long)]
    pub lazy: bool,

    /// Install a specific version (full semver or a bare major like "5")
    #[arg(short, long)]
    pub version: Option<String>,

    /// Proxy URL for registry and API traffic
    #[arg(long)]
    pub proxy: Option<String>,

    /// Add the scss stylesheet to the build config
    #[arg(long)]
    pub scss: bool,

    /// Add the css stylesheet to the build config
    #[arg(long, conflicts_with = "scss")]
    pub css: bool,

    /// Auto-confirm all prompts (non-interactive mode)
    #[arg(short, long)]
    pub yes: bool,
}

impl ConfigFlags {
    fn into_options(self, project_type: String) -> RunOptions {
        let stylesheet = if self.scss {
            Some(StylesheetFormat::Scss)
        } else if self.css {
            Some(StylesheetFormat::Css)
        } else {
            None
        };
        RunOptions {
            project_type,
            trial: self.trial,
            lite: self.lite,
            npm_source: !self.no_npm,
            lazy: self.lazy,
            version_pin: self.version,
            proxy: self.proxy,
            stylesheet,
            yes: self.yes,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let args = Args::parse();

    let result = match args.command {
        Command::Config(config) => {
            let opts = config.flags.into_options(config.project_type);
            tui::run_config(opts).await
        }
        Command::Login { proxy } => tui::run_login(proxy.as_deref()).await,
        Command::Logout => tui::run_logout().await,
        Command::Start(start) => {
            let opts = start.flags.into_options(start.project_type);
            tui::run_start(&start.name, opts).await
        }
    };

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    if let Err(err) = result {
        eprintln!("{}", error_line(&err));
        std::process::exit(1);
    }
    Ok(())
}

fn error_line(err: &mobiscroll_core::Error) -> String {
    console::style(format!("✖  {}", err)).red().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_errors_are_rendered_in_red() {
        console::set_colors_enabled(true);
        let line = error_line(&mobiscroll_core::Error::LicenseDenied);
        assert!(line.contains("\u{1b}[31m"));
        assert!(line.contains("no access to the requested Mobiscroll package"));
    }
}
