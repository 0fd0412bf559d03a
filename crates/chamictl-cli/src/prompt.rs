//! Interactive confirmation.
//!
//! Destructive operations ask before proceeding through [`Confirm`]. The
//! interactive implementation reads the terminal; `--force` and
//! `--no-confirm` substitute [`AssumeYes`].

use crate::error::{CliError, Result};

/// Yes/no confirmation.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> Result<bool>;
}

/// Asks on the terminal, defaulting to no.
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&self, prompt: &str) -> Result<bool> {
        dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(|e| CliError::Prompt(e.to_string()))
    }
}

/// Always yes.
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, _prompt: &str) -> Result<bool> {
        Ok(true)
    }
}

/// Ask `prompt`, turning a "no" into [`CliError::Declined`].
pub fn require(confirm: &dyn Confirm, prompt: &str) -> Result<()> {
    if confirm.confirm(prompt)? {
        tracing::debug!(prompt, "user confirmed");
        Ok(())
    } else {
        tracing::info!(prompt, "user declined");
        Err(CliError::Declined)
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::cell::RefCell;

    /// Scripted answers, recording every prompt.
    pub struct Scripted {
        pub answer: bool,
        pub prompts: RefCell<Vec<String>>,
    }

    impl Scripted {
        pub fn new(answer: bool) -> Self {
            Self {
                answer,
                prompts: RefCell::new(Vec::new()),
            }
        }
    }

    impl Confirm for Scripted {
        fn confirm(&self, prompt: &str) -> Result<bool> {
            self.prompts.borrow_mut().push(prompt.to_string());
            Ok(self.answer)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::Scripted;
    use super::*;

    #[test]
    fn test_require() {
        assert!(require(&AssumeYes, "Really?").is_ok());

        let no = Scripted::new(false);
        assert!(matches!(require(&no, "Really delete?"), Err(CliError::Declined)));
        assert_eq!(no.prompts.borrow().as_slice(), ["Really delete?"]);
    }
}
