use anyhow::{Context, Result};
use std::io::Write;

/// The confirm/deny decision point, injected into provisioning instead of
/// consulting a global flag at every branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmPolicy {
    /// Non-interactive mode: every prompt is answered yes
    AssumeYes,
    /// Ask on the terminal, defaulting to yes on empty input
    Interactive,
}

impl ConfirmPolicy {
    pub fn from_flag(assume_yes: bool) -> ConfirmPolicy {
        if assume_yes {
            ConfirmPolicy::AssumeYes
        } else {
            ConfirmPolicy::Interactive
        }
    }

    pub fn confirm(&self, question: &str) -> Result<bool> {
        match self {
            ConfirmPolicy::AssumeYes => {
                log::debug!("Auto-confirming: {}", question);
                Ok(true)
            }
            ConfirmPolicy::Interactive => {
                print!("{} [Y/n]: ", question);
                std::io::stdout().flush().context("Failed to flush stdout")?;

                let mut response = String::new();
                std::io::stdin()
                    .read_line(&mut response)
                    .context("Failed to read response")?;
                let response = response.trim().to_lowercase();

                Ok(response.is_empty() || response == "y" || response == "yes")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assume_yes_confirms_without_terminal() {
        let policy = ConfirmPolicy::from_flag(true);
        assert!(policy.confirm("Install things?").unwrap());
    }

    #[test]
    fn test_flag_selects_policy() {
        assert_eq!(ConfirmPolicy::from_flag(true), ConfirmPolicy::AssumeYes);
        assert_eq!(ConfirmPolicy::from_flag(false), ConfirmPolicy::Interactive);
    }
}
