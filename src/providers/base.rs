//! Backend trait and common conversation types for Benoît
//!
//! This module defines the `Backend` trait every generative service must
//! implement, along with the role-tagged turns passed to it.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Author of a conversational turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The learner
    User,
    /// The tutor
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// One role-tagged turn of history as seen by a backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Who said it
    pub role: Role,
    /// What was said
    pub content: String,
}

impl Turn {
    /// Creates a user turn
    ///
    /// # Examples
    ///
    /// ```
    /// use benoit::providers::{Role, Turn};
    ///
    /// let turn = Turn::user("Bonjour");
    /// assert_eq!(turn.role, Role::User);
    /// ```
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Creates an assistant turn
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Generative backend used by the tutor
///
/// Implementations are stateless request/response wrappers. Every call is
/// attempted once; failures are returned to the caller, which decides
/// whether to discard them.
///
/// # Examples
///
/// ```no_run
/// use benoit::providers::{Backend, Turn};
/// use benoit::error::Result;
/// use async_trait::async_trait;
///
/// struct Echo;
///
/// #[async_trait]
/// impl Backend for Echo {
///     async fn complete_conversation(
///         &self,
///         history: &[Turn],
///         _system_instruction: &str,
///     ) -> Result<String> {
///         Ok(history.last().map(|t| t.content.clone()).unwrap_or_default())
///     }
///
///     async fn synthesize_speech(&self, _text: &str) -> Result<Option<String>> {
///         Ok(None)
///     }
/// }
/// ```
#[async_trait]
pub trait Backend: Send + Sync {
    /// Produce the tutor's next reply
    ///
    /// # Arguments
    ///
    /// * `history` - Ordered conversation, oldest first, ending with the learner's turn
    /// * `system_instruction` - Persona rules and current context
    ///
    /// # Returns
    ///
    /// The top candidate's text, or an empty string if the service returned none
    ///
    /// # Errors
    ///
    /// Returns error on network failure, non-success status or malformed response
    async fn complete_conversation(
        &self,
        history: &[Turn],
        system_instruction: &str,
    ) -> Result<String>;

    /// Synthesize speech for `text`
    ///
    /// # Returns
    ///
    /// Base64-encoded 16-bit PCM, or `None` if the response carried no audio
    ///
    /// # Errors
    ///
    /// Returns error on network failure, non-success status or malformed response
    async fn synthesize_speech(&self, text: &str) -> Result<Option<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_display() {
        assert_eq!(Role::User.to_string(), "user");
        assert_eq!(Role::Assistant.to_string(), "assistant");
    }

    #[test]
    fn test_turn_constructors() {
        assert_eq!(Turn::user("a").role, Role::User);
        assert_eq!(Turn::assistant("b").content, "b");
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&Role::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
    }
}
