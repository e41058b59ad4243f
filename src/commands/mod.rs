/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes three top-level command modules:

- `chat`    - Interactive tutor session (free chat or a lesson)
- `lessons` - Lesson catalog listing
- `speak`   - One-off speech playback
*/

use crate::audio::{AudioPlayer, PlaybackReport};
use crate::config::Config;
use crate::error::{BenoitError, Result};
use crate::providers::create_backend;
use std::sync::Arc;

// Special commands parser for the interactive loop
pub mod special_commands;

/// Build the shared speech pipeline for `config`
fn build_player(config: &Config) -> Result<Arc<AudioPlayer>> {
    let backend = create_backend(&config.provider)?;
    Ok(Arc::new(AudioPlayer::new(backend, config.audio.clone())))
}

// Chat command handler
pub mod chat {
    //! Interactive tutor handler.
    //!
    //! Creates the backend, the speech pipeline and the session, then runs a
    //! readline loop that routes slash commands to the mode controller and
    //! everything else to the tutor.

    use super::*;
    use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
    use crate::mode::{AppMode, ModeController};
    use crate::providers::Role;
    use crate::session::{ConversationSession, Message, SubmitOutcome};
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Where the interactive session begins
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum StartMode {
        /// Open conversation
        FreeChat,
        /// The lesson with this id
        Lesson(String),
    }

    /// Start the interactive tutor
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration
    /// * `start` - Initial mode
    ///
    /// # Errors
    ///
    /// Returns error if credentials are missing, the starting lesson does
    /// not exist, or the terminal cannot be initialized
    pub async fn run_chat(config: Config, start: StartMode) -> Result<()> {
        tracing::info!("Starting interactive tutor session");

        let backend = create_backend(&config.provider)?;
        let player = Arc::new(AudioPlayer::new(Arc::clone(&backend), config.audio.clone()));
        let session = Arc::new(ConversationSession::new(
            backend,
            Some(Arc::clone(&player)),
            &config.tutor,
        ));
        let controller = ModeController::new(session);

        match &start {
            StartMode::FreeChat => controller.start_free_chat(),
            StartMode::Lesson(id) => {
                controller.start_lesson_by_id(id)?;
            }
        }

        let mut rl = DefaultEditor::new().map_err(BenoitError::Readline)?;

        print_welcome_banner(&controller);
        print_latest_reply(&controller);

        loop {
            let prompt = controller.format_colored_prompt();
            match rl.readline(&prompt) {
                Ok(line) => {
                    let Some(text) = submission_text(&line) else {
                        continue;
                    };
                    let trimmed = text.trim();
                    rl.add_history_entry(trimmed)
                        .map_err(BenoitError::Readline)?;

                    match parse_special_command(trimmed) {
                        Ok(SpecialCommand::Home) => {
                            controller.go_home();
                            print_home();
                            continue;
                        }
                        Ok(SpecialCommand::ListLessons) => {
                            super::lessons::print_lesson_table();
                            continue;
                        }
                        Ok(SpecialCommand::StartLesson(id)) => {
                            match controller.start_lesson_by_id(&id) {
                                Ok(_) => print_latest_reply(&controller),
                                Err(e) => eprintln!("{}\n", format!("Error: {}", e).red()),
                            }
                            continue;
                        }
                        Ok(SpecialCommand::StartChat) => {
                            controller.start_free_chat();
                            print_latest_reply(&controller);
                            continue;
                        }
                        Ok(SpecialCommand::Play) => {
                            replay_last_message(&controller, &player).await;
                            continue;
                        }
                        Ok(SpecialCommand::ShowStatus) => {
                            print_status_display(&controller, &player);
                            continue;
                        }
                        Ok(SpecialCommand::Help) => {
                            print_help();
                            continue;
                        }
                        Ok(SpecialCommand::Exit) => break,
                        Ok(SpecialCommand::None) => {
                            // A message for the tutor
                        }
                        Err(e) => {
                            eprintln!("{}\n", e.to_string().red());
                            continue;
                        }
                    }

                    if controller.mode() == AppMode::Home {
                        println!(
                            "{}\n",
                            "Pick a lesson with /lesson <id> or start a free chat with /chat."
                                .yellow()
                        );
                        continue;
                    }

                    println!("{}", "Benoît is thinking...".dimmed());
                    match controller.session().submit_user_message(text).await {
                        SubmitOutcome::Replied { message, playback } => {
                            print_message(&message);
                            if playback.is_some() {
                                tracing::debug!("Auto-play started for {}", message.id);
                            }
                        }
                        SubmitOutcome::Failed(_) => {
                            println!(
                                "{}\n",
                                "Benoît could not answer. Try again in a moment.".yellow()
                            );
                        }
                        SubmitOutcome::Stale | SubmitOutcome::Ignored => {}
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        println!("Au revoir !");
        Ok(())
    }

    /// The line as typed, or `None` when it is blank
    ///
    /// Commands are matched on the trimmed text, but tutor messages keep
    /// their surrounding whitespace.
    pub(crate) fn submission_text(line: &str) -> Option<&str> {
        if line.trim().is_empty() {
            None
        } else {
            Some(line)
        }
    }

    /// Speak the most recent tutor message
    async fn replay_last_message(controller: &ModeController, player: &AudioPlayer) {
        let Some(message) = controller.session().last_assistant_message() else {
            println!("{}\n", "Nothing to play yet.".yellow());
            return;
        };

        match player.play_audio(&message.content).await {
            PlaybackReport::Scheduled { duration, .. } => {
                println!("{}\n", format!("Playing {:.1}s of audio", duration.as_secs_f64()).cyan());
            }
            PlaybackReport::NoAudio => println!("{}\n", "No audio was returned.".yellow()),
            PlaybackReport::Failed(_) => println!("{}\n", "Audio playback failed.".yellow()),
        }
    }

    fn print_message(message: &Message) {
        match message.role {
            Role::Assistant => println!("\n{} {}\n", "Benoît 🤖".blue().bold(), message.content),
            Role::User => println!("{} {}", "Vous".green().bold(), message.content),
        }
    }

    fn print_latest_reply(controller: &ModeController) {
        if let Some(message) = controller.session().last_assistant_message() {
            print_message(&message);
        }
    }

    fn print_home() {
        println!("\n{}\n", "Choose a lesson or start a free conversation:".bold());
        super::lessons::print_lesson_table();
        println!("Type '/lesson <id>' to begin or '/chat' to talk freely\n");
    }

    /// Display welcome banner at the start of the session
    fn print_welcome_banner(controller: &ModeController) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║        Benoît - Seu robô professor de francês  🤖             ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        let mode = controller.mode();
        println!("Mode:   {} ({})", mode.colored_tag(), mode.description());
        if let Some(lesson) = controller.active_lesson() {
            println!("Lesson: {} {} {}", lesson.icon, lesson.title, lesson.level.colored_tag());
        }
        println!("\nType '/help' for available commands, 'exit' to quit\n");
    }

    /// Display detailed status information about the current session
    fn print_status_display(controller: &ModeController, player: &AudioPlayer) {
        let snapshot = controller.session().snapshot();

        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                     Benoît Session Status                    ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!(
            "Mode:              {} ({})",
            snapshot.mode.colored_tag(),
            snapshot.mode.description()
        );
        match snapshot.active_lesson {
            Some(lesson) => println!("Lesson:            {} {} [{}]", lesson.icon, lesson.title, lesson.id),
            None => println!("Lesson:            -"),
        }
        println!("Conversation Size: {} messages", snapshot.messages.len());
        println!(
            "Audio Output:      {}",
            player
                .output_description()
                .unwrap_or_else(|| "not opened yet".to_string())
        );
        println!("Prompt Format:     {}", controller.format_colored_prompt());
        println!();
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_submission_text_keeps_whitespace() {
            assert_eq!(submission_text("  Bonjour  "), Some("  Bonjour  "));
            assert_eq!(submission_text("Salut\t"), Some("Salut\t"));
        }

        #[test]
        fn test_submission_text_blank_line() {
            assert_eq!(submission_text(""), None);
            assert_eq!(submission_text("  \t "), None);
        }
    }
}

// Lesson catalog listing
pub mod lessons {
    //! Lesson catalog output as a table or JSON.

    use super::*;
    use crate::lessons::{Lesson, LESSONS};
    use prettytable::{row, Table};

    /// Print the catalog
    ///
    /// # Arguments
    ///
    /// * `json` - Print JSON instead of a table
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails
    pub fn list_lessons(json: bool) -> Result<()> {
        tracing::debug!("lessons::list_lessons flags - json: {}", json);
        if json {
            println!("{}", lessons_json(&LESSONS)?);
        } else {
            print_lesson_table();
        }
        Ok(())
    }

    /// Serialize lessons as pretty JSON
    pub fn lessons_json(lessons: &[Lesson]) -> Result<String> {
        Ok(serde_json::to_string_pretty(lessons).map_err(BenoitError::Serialization)?)
    }

    /// Print the catalog as a table
    pub fn print_lesson_table() {
        let mut table = Table::new();
        table.add_row(row!["Id", "Lesson", "Level", "Goal"]);
        for lesson in LESSONS.iter() {
            table.add_row(row![
                lesson.id,
                format!("{} {}", lesson.icon, lesson.title),
                lesson.level.to_string(),
                lesson.description
            ]);
        }
        println!();
        table.printstd();
        println!();
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_lessons_json_contains_catalog() {
            let json = lessons_json(&LESSONS).unwrap();
            let value: serde_json::Value = serde_json::from_str(&json).unwrap();
            let items = value.as_array().unwrap();
            assert_eq!(items.len(), LESSONS.len());
            assert_eq!(items[0]["id"], "l1");
            assert_eq!(items[0]["level"], "beginner");
        }

        #[test]
        fn test_lessons_json_empty() {
            assert_eq!(lessons_json(&[]).unwrap(), "[]");
        }
    }
}

// Speak command handler
pub mod speak {
    //! One-off speech playback.

    use super::*;
    use crate::config::AudioOutputKind;
    use colored::Colorize;

    /// Run the playback pipeline once for `text`
    ///
    /// With a live output device the call waits until the buffer has
    /// finished playing so the process does not exit mid-sentence.
    ///
    /// # Errors
    ///
    /// Returns error if credentials are missing, synthesis fails or the
    /// payload cannot be decoded
    pub async fn run_speak(config: Config, text: String) -> Result<()> {
        tracing::info!("Speaking {} characters", text.chars().count());

        let player = build_player(&config)?;
        match player.try_play_audio(&text).await? {
            PlaybackReport::Scheduled { samples, duration } => {
                println!(
                    "{}",
                    format!(
                        "Scheduled {} samples ({:.1}s) on {}",
                        samples,
                        duration.as_secs_f64(),
                        player
                            .output_description()
                            .unwrap_or_else(|| "unknown output".to_string())
                    )
                    .green()
                );
                if config.audio.output == AudioOutputKind::Device {
                    tokio::time::sleep(duration).await;
                }
            }
            PlaybackReport::NoAudio => println!("{}", "The service returned no audio.".yellow()),
            PlaybackReport::Failed(e) => println!("{}", format!("Playback failed: {}", e).red()),
        }
        Ok(())
    }
}
