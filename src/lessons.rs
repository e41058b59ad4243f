//! Lesson catalog and tutor prompt templates
//!
//! The catalog and every fixed string the tutor sends or shows live here
//! as immutable configuration data. Lessons are addressed by id and
//! handed around as `&'static Lesson`.

use colored::Colorize;
use serde::Serialize;
use std::fmt;

/// Difficulty of a lesson
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LessonLevel {
    /// Débutant
    Beginner,
    /// Intermédiaire
    Intermediate,
    /// Avancé
    Advanced,
}

impl fmt::Display for LessonLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Beginner => write!(f, "Débutant"),
            Self::Intermediate => write!(f, "Intermédiaire"),
            Self::Advanced => write!(f, "Avancé"),
        }
    }
}

impl LessonLevel {
    /// Colored badge for terminal listings
    pub fn colored_tag(&self) -> String {
        match self {
            Self::Beginner => format!("[{}]", self.to_string().green()),
            _ => format!("[{}]", self.to_string().yellow()),
        }
    }
}

/// A structured lesson from the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lesson {
    /// Stable identifier used on the command line
    pub id: &'static str,
    /// Lesson title, quoted in the greeting and in the prompt context
    pub title: &'static str,
    /// Difficulty
    pub level: LessonLevel,
    /// Goal of the lesson
    pub description: &'static str,
    /// Display icon
    pub icon: &'static str,
}

/// The fixed lesson catalog
pub static LESSONS: [Lesson; 4] = [
    Lesson {
        id: "l1",
        title: "Saudações & Apresentações",
        level: LessonLevel::Beginner,
        description: "Aprenda a dizer \"Bonjour\" e se apresentar corretamente.",
        icon: "👋",
    },
    Lesson {
        id: "l2",
        title: "No Restaurante",
        level: LessonLevel::Beginner,
        description: "Como pedir um croissant e um café au lait sem medo.",
        icon: "☕",
    },
    Lesson {
        id: "l3",
        title: "Direções & Viagem",
        level: LessonLevel::Intermediate,
        description: "Encontre o caminho para a Torre Eiffel!",
        icon: "📍",
    },
    Lesson {
        id: "l4",
        title: "Falando sobre Hobbies",
        level: LessonLevel::Intermediate,
        description: "Fale sobre o que você gosta de fazer no tempo livre.",
        icon: "🎨",
    },
];

/// Persona and teaching rules sent with every completion
pub const SYSTEM_INSTRUCTION: &str = "Você é \"Benoît\", um robô amigável e entusiasmado que ensina francês.
Suas regras:
1. Responda primariamente em francês, mas sempre forneça a tradução em português entre parênteses para frases complexas.
2. Seja pedagógico: se o usuário errar, corrija gentilmente.
3. Use emojis de robô (🤖, ⚙️, 🔋) ocasionalmente.
4. Mantenha as respostas curtas e focadas na conversa.
5. Se estiver em uma lição específica, foque no vocabulário dessa lição.
6. Incentive o usuário a repetir frases.";

/// Shown in place of an empty reply
pub const FALLBACK_REPLY: &str = "Désolé, j'ai un bug! 🤖 (Desculpe, eu tive um erro!)";

/// Opening message of a free conversation
pub const FREE_CHAT_GREETING: &str =
    "Bonjour ! Je suis Benoît. Vamos conversar um pouco em francês? Sobre o que você quer falar hoje? 🤖✨";

/// Context sentence used outside lessons
pub const FREE_CHAT_CONTEXT: &str = "Conversa livre em francês.";

/// Look up a lesson by id
///
/// # Examples
///
/// ```
/// use benoit::lessons::find_lesson;
///
/// assert_eq!(find_lesson("l2").unwrap().title, "No Restaurante");
/// assert!(find_lesson("nope").is_none());
/// ```
pub fn find_lesson(id: &str) -> Option<&'static Lesson> {
    LESSONS.iter().find(|l| l.id.eq_ignore_ascii_case(id.trim()))
}

/// Opening message of a lesson
pub fn lesson_greeting(lesson: &Lesson) -> String {
    format!(
        "Salut ! Enchanté ! 🤖 Hoje vamos começar a lição: **{}**. Você está pronto? (Vous êtes prêt ?)",
        lesson.title
    )
}

/// Context sentence naming the active lesson and its goal
pub fn lesson_context(lesson: &Lesson) -> String {
    format!(
        "Atenção: Estamos na lição \"{}\". O objetivo é {}.",
        lesson.title, lesson.description
    )
}

/// Full system instruction for a turn: persona rules plus context
pub fn system_instruction_with_context(context: &str) -> String {
    format!("{}\n\nContexto Atual: {}", SYSTEM_INSTRUCTION, context)
}
