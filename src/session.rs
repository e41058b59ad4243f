//! Conversation session
//!
//! Holds the ordered transcript, the active lesson, and the thinking flag,
//! and runs one request/reply cycle at a time against the backend.
//!
//! State sits behind a `std::sync::Mutex` that is never held across an
//! `.await`. Each reset bumps the session generation; a completion that
//! returns after a reset is discarded.

use crate::audio::{AudioPlayer, PlaybackReport};
use crate::config::TutorConfig;
use crate::lessons::{self, Lesson};
use crate::mode::AppMode;
use crate::providers::{Backend, Role, Turn};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use ulid::Ulid;

/// One conversational turn in the transcript
///
/// Messages are never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    /// Unique, increasing within a session
    pub id: Ulid,
    /// Author
    pub role: Role,
    /// Opaque text, possibly with an inline translation in parentheses
    pub content: String,
    /// Creation time
    pub timestamp: DateTime<Utc>,
}

impl Message {
    fn new(id: Ulid, role: Role, content: impl Into<String>) -> Self {
        Self {
            id,
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Role-tagged view for the backend
    pub fn to_turn(&self) -> Turn {
        Turn {
            role: self.role,
            content: self.content.clone(),
        }
    }
}

/// Result of `submit_user_message`
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Blank input, a request already in flight, or no conversation open
    Ignored,
    /// The reply was appended
    Replied {
        /// The appended assistant message
        message: Message,
        /// Detached auto-playback task, if one was started
        playback: Option<JoinHandle<PlaybackReport>>,
    },
    /// The completion failed; nothing was appended
    Failed(String),
    /// The session was reset while waiting; the reply was dropped
    Stale,
}

struct SessionState {
    mode: AppMode,
    active_lesson: Option<&'static Lesson>,
    messages: Vec<Message>,
    is_thinking: bool,
    generation: u64,
    pending_input: String,
    ids: ulid::Generator,
}

impl SessionState {
    fn next_id(&mut self) -> Ulid {
        self.ids.generate().unwrap_or_else(|_| Ulid::new())
    }
}

/// Point-in-time copy of the session for display
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    /// Current mode
    pub mode: AppMode,
    /// Lesson in progress, if any
    pub active_lesson: Option<&'static Lesson>,
    /// Transcript, oldest first
    pub messages: Vec<Message>,
    /// Whether a completion is outstanding
    pub is_thinking: bool,
    /// Reset counter
    pub generation: u64,
}

/// Releases the thinking flag on every exit path of a submission
struct ThinkingGuard<'a> {
    session: &'a ConversationSession,
    generation: u64,
}

impl Drop for ThinkingGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.session.lock();
        // a reset already cleared the flag for the new generation
        if state.generation == self.generation {
            state.is_thinking = false;
        }
    }
}

/// Transcript plus the request/reply cycle
pub struct ConversationSession {
    backend: Arc<dyn Backend>,
    player: Option<Arc<AudioPlayer>>,
    auto_play: bool,
    auto_play_threshold: usize,
    state: Mutex<SessionState>,
}

impl ConversationSession {
    /// Create a session in Home mode with an empty transcript
    ///
    /// # Arguments
    ///
    /// * `backend` - Generative backend for replies
    /// * `player` - Speech pipeline used for auto-play; `None` disables speech
    /// * `tutor` - Auto-play settings
    pub fn new(
        backend: Arc<dyn Backend>,
        player: Option<Arc<AudioPlayer>>,
        tutor: &TutorConfig,
    ) -> Self {
        Self {
            backend,
            player,
            auto_play: tutor.auto_play,
            auto_play_threshold: tutor.auto_play_threshold,
            state: Mutex::new(SessionState {
                mode: AppMode::Home,
                active_lesson: None,
                messages: Vec::new(),
                is_thinking: false,
                generation: 0,
                pending_input: String::new(),
                ids: ulid::Generator::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the whole conversation state
    ///
    /// Only the mode controller calls this.
    pub(crate) fn reset(
        &self,
        mode: AppMode,
        active_lesson: Option<&'static Lesson>,
        greeting: Option<String>,
    ) {
        let mut state = self.lock();
        state.generation += 1;
        state.mode = mode;
        state.active_lesson = active_lesson;
        state.is_thinking = false;
        state.pending_input.clear();
        state.messages.clear();
        if let Some(greeting) = greeting {
            let id = state.next_id();
            state
                .messages
                .push(Message::new(id, Role::Assistant, greeting));
        }
        tracing::debug!(
            generation = state.generation,
            mode = %state.mode,
            "Session reset"
        );
    }

    /// Current mode
    pub fn mode(&self) -> AppMode {
        self.lock().mode
    }

    /// Lesson in progress, if any
    pub fn active_lesson(&self) -> Option<&'static Lesson> {
        self.lock().active_lesson
    }

    /// Copy of the transcript
    pub fn messages(&self) -> Vec<Message> {
        self.lock().messages.clone()
    }

    /// Transcript length
    pub fn len(&self) -> usize {
        self.lock().messages.len()
    }

    /// Whether the transcript is empty
    pub fn is_empty(&self) -> bool {
        self.lock().messages.is_empty()
    }

    /// Whether a completion is outstanding
    pub fn is_thinking(&self) -> bool {
        self.lock().is_thinking
    }

    /// Number of resets so far
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Text typed but not yet submitted
    pub fn pending_input(&self) -> String {
        self.lock().pending_input.clone()
    }

    /// Replace the pending input buffer
    pub fn set_pending_input(&self, text: impl Into<String>) {
        self.lock().pending_input = text.into();
    }

    /// Most recent tutor message
    pub fn last_assistant_message(&self) -> Option<Message> {
        self.lock()
            .messages
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant)
            .cloned()
    }

    /// Everything at once, under a single lock
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.lock();
        SessionSnapshot {
            mode: state.mode,
            active_lesson: state.active_lesson,
            messages: state.messages.clone(),
            is_thinking: state.is_thinking,
            generation: state.generation,
        }
    }

    /// Speech pipeline, if speech is enabled
    pub fn player(&self) -> Option<&Arc<AudioPlayer>> {
        self.player.as_ref()
    }

    /// Submit the pending input buffer
    pub async fn submit_pending_input(&self) -> SubmitOutcome {
        let text = self.pending_input();
        self.submit_user_message(&text).await
    }

    /// Run one request/reply cycle for `text`
    ///
    /// Ignored when `text` is blank, when a completion is already
    /// outstanding, or in Home mode. Backend failures are logged and
    /// reported as `Failed`; they never append a message.
    pub async fn submit_user_message(&self, text: &str) -> SubmitOutcome {
        let (history, context, generation, prior_len) = {
            let mut state = self.lock();
            if text.trim().is_empty() || state.is_thinking || state.mode == AppMode::Home {
                return SubmitOutcome::Ignored;
            }

            let prior_len = state.messages.len();
            let id = state.next_id();
            state.messages.push(Message::new(id, Role::User, text));
            state.pending_input.clear();
            state.is_thinking = true;

            let context = match state.active_lesson {
                Some(lesson) => lessons::lesson_context(lesson),
                None => lessons::FREE_CHAT_CONTEXT.to_string(),
            };
            let history: Vec<Turn> = state.messages.iter().map(Message::to_turn).collect();

            (history, context, state.generation, prior_len)
        };

        let thinking = ThinkingGuard {
            session: self,
            generation,
        };

        let instruction = lessons::system_instruction_with_context(&context);
        tracing::debug!(
            generation,
            turns = history.len(),
            "Requesting completion"
        );

        let reply = match self
            .backend
            .complete_conversation(&history, &instruction)
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!("Completion failed: {:#}", e);
                return SubmitOutcome::Failed(e.to_string());
            }
        };

        let content = if reply.is_empty() {
            tracing::warn!("Completion returned no text, using fallback reply");
            lessons::FALLBACK_REPLY.to_string()
        } else {
            reply
        };

        let appended = {
            let mut state = self.lock();
            if state.generation == generation {
                let id = state.next_id();
                let message = Message::new(id, Role::Assistant, content);
                state.messages.push(message.clone());
                Some(message)
            } else {
                None
            }
        };
        drop(thinking);

        let Some(message) = appended else {
            tracing::warn!(generation, "Session was reset during completion, dropping reply");
            return SubmitOutcome::Stale;
        };

        let playback = if self.auto_play && prior_len < self.auto_play_threshold {
            self.player
                .as_ref()
                .map(|player| player.spawn_playback(message.content.clone()))
        } else {
            None
        };

        SubmitOutcome::Replied { message, playback }
    }
}
