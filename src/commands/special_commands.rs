//! Special commands parser for the interactive legal chat
//!
//! Special commands act on the session instead of being sent to the
//! model. They allow users to:
//! - Clear the conversation
//! - Review the messages so far
//! - Fill in a contractual complaint
//! - View session status and help
//! - Exit the session
//!
//! Commands are prefixed with `/` and are case-insensitive.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an argument it does not take
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },
}

/// Special commands that can be executed during interactive chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Clear messages and conversation memory together
    Reset,

    /// Print every message of the session so far
    History,

    /// Walk through the contractual complaint form
    Complaint,

    /// Show provider, index and memory status
    ShowStatus,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command
    ///
    /// The input should be answered as a legal question.
    None,
}

/// Parse a user input string into a special command
///
/// # Errors
///
/// Returns `CommandError::UnknownCommand` if input starts with "/" but is
/// not a known command, or `CommandError::UnsupportedArgument` if a known
/// command is followed by extra text.
///
/// # Examples
///
/// ```
/// use lawaid::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(parse_special_command("/reset").unwrap(), SpecialCommand::Reset);
/// assert_eq!(parse_special_command("What is IPC 420?").unwrap(), SpecialCommand::None);
/// assert!(parse_special_command("/unknown").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    // If input doesn't start with "/", it's a question (except exit/quit)
    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    let (command, arg) = match lower.split_once(char::is_whitespace) {
        Some((command, arg)) => (command, arg.trim()),
        None => (lower.as_str(), ""),
    };

    let parsed = match command {
        "/reset" | "/clear" => SpecialCommand::Reset,
        "/history" => SpecialCommand::History,
        "/complaint" => SpecialCommand::Complaint,
        "/status" => SpecialCommand::ShowStatus,
        "/help" | "/?" => SpecialCommand::Help,
        "exit" | "quit" | "/exit" | "/quit" => SpecialCommand::Exit,
        _ => return Err(CommandError::UnknownCommand(trimmed.to_string())),
    };

    if !arg.is_empty() {
        return Err(CommandError::UnsupportedArgument {
            command: command.to_string(),
            arg: arg.to_string(),
        });
    }

    Ok(parsed)
}

/// Display help text for special commands
pub fn print_help() {
    println!(
        r#"
Special Commands for LawAid Chat
================================

CONVERSATION:
  /reset          - Clear all messages and conversation memory
  /clear          - Same as /reset
  /history        - Show every message in this session

COMPLAINTS:
  /complaint      - Fill in a contractual complaint form

SESSION INFORMATION:
  /status         - Show provider, index and memory status
  /help           - Show this help message
  /?              - Same as /help

SESSION CONTROL:
  exit            - Exit interactive mode
  quit            - Same as exit

NOTES:
  - Commands are case-insensitive
  - Regular text (not starting with /) is answered as a legal question
  - Only the last two exchanges are remembered between questions
  - Answers may be inaccurate; consult a lawyer for advice on your case
"#
    );
}
