//! Application modes and the controller that switches between them
//!
//! There are three modes:
//! - Home: lesson picker, no conversation
//! - Lesson: guided conversation about one lesson
//! - Chat: free conversation
//!
//! Every switch replaces the conversation wholesale, including any
//! completion still in flight.

use crate::error::{BenoitError, Result};
use crate::lessons::{self, Lesson};
use crate::session::ConversationSession;
use colored::Colorize;
use std::fmt;
use std::sync::Arc;

/// Top-level application mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppMode {
    /// Lesson picker
    #[default]
    Home,
    /// Guided lesson conversation
    Lesson,
    /// Free conversation
    Chat,
}

impl fmt::Display for AppMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Home => write!(f, "HOME"),
            Self::Lesson => write!(f, "LESSON"),
            Self::Chat => write!(f, "CHAT"),
        }
    }
}

impl AppMode {
    /// Parse a mode from a string
    ///
    /// # Examples
    ///
    /// ```
    /// use benoit::mode::AppMode;
    ///
    /// assert_eq!(AppMode::parse_str("Chat").unwrap(), AppMode::Chat);
    /// assert!(AppMode::parse_str("quiz").is_err());
    /// ```
    pub fn parse_str(s: &str) -> std::result::Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "home" => Ok(Self::Home),
            "lesson" => Ok(Self::Lesson),
            "chat" => Ok(Self::Chat),
            other => Err(format!("Unknown mode: {}", other)),
        }
    }

    /// Short description for `/status`
    pub fn description(&self) -> &'static str {
        match self {
            Self::Home => "Choose a lesson or start a free conversation",
            Self::Lesson => "Guided lesson with Benoît",
            Self::Chat => "Free conversation in French",
        }
    }

    /// Colored tag for the prompt
    pub fn colored_tag(&self) -> String {
        match self {
            Self::Home => format!("[{}]", "HOME".cyan()),
            Self::Lesson => format!("[{}]", "LESSON".purple()),
            Self::Chat => format!("[{}]", "CHAT".green()),
        }
    }
}

/// Owns the mode and the active lesson
///
/// Mode and lesson live inside the session so that a switch and the
/// transcript reset happen under one lock.
#[derive(Clone)]
pub struct ModeController {
    session: Arc<ConversationSession>,
}

impl ModeController {
    /// Wrap a session; the session starts in Home mode
    pub fn new(session: Arc<ConversationSession>) -> Self {
        Self { session }
    }

    /// The conversation owned by this controller
    pub fn session(&self) -> &Arc<ConversationSession> {
        &self.session
    }

    /// Current mode
    pub fn mode(&self) -> AppMode {
        self.session.mode()
    }

    /// Lesson in progress, if any
    pub fn active_lesson(&self) -> Option<&'static Lesson> {
        self.session.active_lesson()
    }

    /// Return to the lesson picker, clearing the conversation
    pub fn go_home(&self) {
        self.session.reset(AppMode::Home, None, None);
        tracing::info!("Returned to home");
    }

    /// Start `lesson` with a fresh transcript holding only its greeting
    pub fn start_lesson(&self, lesson: &'static Lesson) {
        self.session.reset(
            AppMode::Lesson,
            Some(lesson),
            Some(lessons::lesson_greeting(lesson)),
        );
        tracing::info!("Started lesson {} ({})", lesson.id, lesson.title);
    }

    /// Look up a lesson by id and start it
    ///
    /// # Errors
    ///
    /// Returns `UnknownLesson` if no lesson has that id; the current
    /// conversation is left untouched
    pub fn start_lesson_by_id(&self, id: &str) -> Result<&'static Lesson> {
        let lesson =
            lessons::find_lesson(id).ok_or_else(|| BenoitError::UnknownLesson(id.to_string()))?;
        self.start_lesson(lesson);
        Ok(lesson)
    }

    /// Start a free conversation with a fresh transcript
    pub fn start_free_chat(&self) {
        self.session.reset(
            AppMode::Chat,
            None,
            Some(lessons::FREE_CHAT_GREETING.to_string()),
        );
        tracing::info!("Started free conversation");
    }

    /// Plain prompt such as `[LESSON l1] >> `
    pub fn format_prompt(&self) -> String {
        match self.active_lesson() {
            Some(lesson) => format!("[{} {}] >> ", self.mode(), lesson.id),
            None => format!("[{}] >> ", self.mode()),
        }
    }

    /// Colored prompt for the terminal
    pub fn format_colored_prompt(&self) -> String {
        match self.active_lesson() {
            Some(lesson) => format!("{}[{}] >> ", self.mode().colored_tag(), lesson.id.yellow()),
            None => format!("{} >> ", self.mode().colored_tag()),
        }
    }

    /// Multi-line status for `/status`
    pub fn status(&self) -> String {
        let snapshot = self.session.snapshot();
        let mut lines = vec![format!(
            "Mode: {} ({})",
            snapshot.mode,
            snapshot.mode.description()
        )];
        if let Some(lesson) = snapshot.active_lesson {
            lines.push(format!(
                "Lesson: {} {} [{}]",
                lesson.icon, lesson.title, lesson.level
            ));
        }
        lines.push(format!("Messages: {}", snapshot.messages.len()));
        if snapshot.is_thinking {
            lines.push("Benoît is thinking...".to_string());
        }
        lines.join("\n")
    }
}
