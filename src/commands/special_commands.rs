//! Special commands parser for the interactive tutor
//!
//! Special commands let the learner:
//! - Return to the lesson picker
//! - Start a lesson or a free conversation
//! - Replay the last tutor message aloud
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

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands that can be executed during the session
///
/// These commands change the mode or show information instead of being
/// sent to the tutor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Return to the lesson picker
    Home,

    /// List the lesson catalog
    ListLessons,

    /// Start the lesson with this id
    StartLesson(String),

    /// Start a free conversation
    StartChat,

    /// Speak the most recent tutor message
    Play,

    /// Display mode, lesson and transcript size
    ShowStatus,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command; the input is a message for the tutor
    None,
}

/// Parse a user input string into a special command
///
/// # Errors
///
/// Returns `CommandError::UnknownCommand` if input starts with "/" but is
/// not a valid command, `UnsupportedArgument` if a command that takes no
/// argument receives one, and `MissingArgument` for `/lesson` without an id.
///
/// # Examples
///
/// ```
/// use benoit::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(parse_special_command("/chat").unwrap(), SpecialCommand::StartChat);
/// assert_eq!(
///     parse_special_command("/lesson L2").unwrap(),
///     SpecialCommand::StartLesson("l2".to_string())
/// );
/// assert_eq!(parse_special_command("Bonjour").unwrap(), SpecialCommand::None);
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    let mut parts = lower.splitn(2, char::is_whitespace);
    let command = parts.next().unwrap_or_default();
    let arg = parts.next().map(str::trim).filter(|a| !a.is_empty());

    let simple = |cmd: SpecialCommand| match arg {
        Some(arg) => Err(CommandError::UnsupportedArgument {
            command: command.to_string(),
            arg: arg.to_string(),
        }),
        None => Ok(cmd),
    };

    match command {
        "/home" => simple(SpecialCommand::Home),
        "/lessons" => simple(SpecialCommand::ListLessons),
        "/chat" => simple(SpecialCommand::StartChat),
        "/play" | "/repeat" => simple(SpecialCommand::Play),
        "/status" => simple(SpecialCommand::ShowStatus),
        "/help" | "/?" => simple(SpecialCommand::Help),
        "exit" | "quit" | "/exit" | "/quit" => simple(SpecialCommand::Exit),

        "/lesson" => match arg {
            Some(id) => Ok(SpecialCommand::StartLesson(id.to_string())),
            None => Err(CommandError::MissingArgument {
                command: "/lesson".to_string(),
                usage: "/lesson <id>".to_string(),
            }),
        },

        _ => Err(CommandError::UnknownCommand(trimmed.to_string())),
    }
}

/// Display help information for special commands
pub fn print_help() {
    println!(
        r#"
Special Commands for the Tutor
==============================

LESSONS:
  /lessons        - Show the lesson catalog
  /lesson <id>    - Start a lesson (for example /lesson l1)
  /chat           - Start a free conversation with Benoît
  /home           - Leave the conversation and return home

AUDIO:
  /play           - Speak Benoît's last message again
  /repeat         - Same as /play

SESSION INFORMATION:
  /status         - Show current mode and lesson
  /help           - Show this help message
  /?              - Same as /help

SESSION CONTROL:
  exit            - Exit the tutor
  quit            - Same as exit

NOTES:
  - Commands are case-insensitive
  - Regular text (not starting with /) is sent to Benoît
  - Starting a lesson or a chat always begins a fresh conversation
  - Benoît reads his first replies aloud; use /play for later ones
"#
    );
}
