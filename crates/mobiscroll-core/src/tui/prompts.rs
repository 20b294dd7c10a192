//! Charm-style CLI prompts using cliclack

use crate::error::{Error, Result};
use crate::options::RunOptions;
use crate::pm::ShellRunner;
use crate::prompt::Prompter;
use crate::registry::api::ApiClient;
use crate::workflow;
use std::io::ErrorKind;

/// Terminal-backed prompter. With `yes` set, confirmations resolve to their
/// initial value without asking.
#[derive(Debug, Clone, Copy)]
pub struct CliPrompter {
    pub yes: bool,
}

fn interact_err(e: std::io::Error) -> Error {
    // cliclack signals Ctrl-C / Esc as an interrupted read
    if e.kind() == ErrorKind::Interrupted {
        Error::Cancelled
    } else {
        Error::Terminal(e)
    }
}

impl Prompter for CliPrompter {
    fn input(&self, message: &str) -> Result<String> {
        cliclack::input(message).interact().map_err(interact_err)
    }

    fn password(&self, message: &str) -> Result<String> {
        cliclack::password(message)
            .mask('*')
            .interact()
            .map_err(interact_err)
    }

    fn confirm(&self, message: &str, initial: bool) -> Result<bool> {
        if self.yes {
            return Ok(initial);
        }
        cliclack::confirm(message)
            .initial_value(initial)
            .interact()
            .map_err(interact_err)
    }

    fn info(&self, message: &str) {
        let _ = cliclack::log::info(message);
    }

    fn success(&self, message: &str) {
        let _ = cliclack::log::success(message);
    }

    fn warning(&self, message: &str) {
        let _ = cliclack::log::warning(message);
    }
}

/// `mobiscroll config` with interactive prompts.
pub async fn run_config(opts: RunOptions) -> Result<()> {
    cliclack::intro("Mobiscroll CLI")?;

    let prompter = CliPrompter { yes: opts.yes };
    let api = ApiClient::new(opts.proxy.as_deref())?;
    let root = std::env::current_dir()?;

    workflow::run_config(&root, &opts, &ShellRunner, &prompter, &api).await?;

    cliclack::outro("Happy coding!")?;
    Ok(())
}

/// `mobiscroll start` with interactive prompts.
pub async fn run_start(name: &str, opts: RunOptions) -> Result<()> {
    cliclack::intro("Mobiscroll CLI")?;

    let prompter = CliPrompter { yes: opts.yes };
    let api = ApiClient::new(opts.proxy.as_deref())?;
    let cwd = std::env::current_dir()?;

    workflow::run_start(&cwd, name, &opts, &ShellRunner, &prompter, &api).await?;

    cliclack::outro("Happy coding!")?;
    Ok(())
}

pub async fn run_login(proxy: Option<&str>) -> Result<()> {
    cliclack::intro("Mobiscroll CLI")?;
    let prompter = CliPrompter { yes: false };
    workflow::run_login(&prompter, proxy).await?;
    cliclack::outro("Logged in.")?;
    Ok(())
}

pub async fn run_logout() -> Result<()> {
    let prompter = CliPrompter { yes: false };
    workflow::run_logout(&prompter)
}
