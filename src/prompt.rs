//! Confirmation prompts for destructive operations.

use std::io::{BufRead, Write};

use inquire::Text;

use crate::error::{ArchiveError, Result};

/// Source of yes/no answers for destructive operations.
pub trait Prompter {
    /// Ask `question`; `true` only for an explicit affirmative answer.
    fn confirm(&self, question: &str) -> Result<bool>;
}

/// `y` or `yes` in any case; everything else, including an empty line, is a no.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Check if we're running in an interactive terminal
pub fn is_interactive() -> bool {
    atty::is(atty::Stream::Stdin) && atty::is(atty::Stream::Stdout)
}

/// Prompts on the terminal, or reads one line from stdin when it is piped.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn confirm(&self, question: &str) -> Result<bool> {
        let answer = if is_interactive() {
            match Text::new(question).with_help_message("[y/N]").prompt() {
                Ok(answer) => answer,
                // Esc and Ctrl-C both mean "no"
                Err(inquire::InquireError::OperationCanceled)
                | Err(inquire::InquireError::OperationInterrupted) => String::new(),
                Err(e) => {
                    return Err(ArchiveError::io(
                        "<terminal>",
                        std::io::Error::other(e.to_string()),
                    ))
                }
            }
        } else {
            print!("{question} [y/N] ");
            std::io::stdout()
                .flush()
                .map_err(|e| ArchiveError::io("<stdout>", e))?;
            read_answer(&mut std::io::stdin().lock())?
        };

        Ok(is_affirmative(&answer))
    }
}

fn read_answer(input: &mut impl BufRead) -> Result<String> {
    let mut line = String::new();
    input
        .read_line(&mut line)
        .map_err(|e| ArchiveError::io("<stdin>", e))?;
    Ok(line)
}
