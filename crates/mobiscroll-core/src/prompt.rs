//! Interactive prompt seam
//!
//! The workflow talks to the terminal exclusively through this trait so the
//! orchestration can be driven by cliclack in the binary and by canned
//! answers in tests.

use crate::error::Result;

pub trait Prompter {
    /// Free-text input.
    fn input(&self, message: &str) -> Result<String>;

    /// Masked input.
    fn password(&self, message: &str) -> Result<String>;

    /// Yes/no question.
    fn confirm(&self, message: &str, initial: bool) -> Result<bool>;

    // Progress reporting. Default to plain stderr lines so the workflow
    // stays usable without the tui feature.

    fn info(&self, message: &str) {
        eprintln!("  {}", message);
    }

    fn success(&self, message: &str) {
        eprintln!("  {}", message);
    }

    fn warning(&self, message: &str) {
        eprintln!("  Warning: {}", message);
    }
}

/// Scripted prompter for tests and --yes runs without a terminal.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompter {
    pub inputs: Vec<String>,
    pub confirm_answer: bool,
}

impl Prompter for ScriptedPrompter {
    fn input(&self, _message: &str) -> Result<String> {
        Ok(self.inputs.first().cloned().unwrap_or_default())
    }

    fn password(&self, _message: &str) -> Result<String> {
        Ok(self.inputs.get(1).cloned().unwrap_or_default())
    }

    fn confirm(&self, _message: &str, _initial: bool) -> Result<bool> {
        Ok(self.confirm_answer)
    }

    fn info(&self, _message: &str) {}
    fn success(&self, _message: &str) {}
    fn warning(&self, _message: &str) {}
}
