//! Command-line interface definition for Benoît
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for free chat, lessons, the lesson catalog and
//! one-off speech playback.

use crate::config::AudioOutputKind;
use clap::{Parser, Subcommand};

/// Benoît - your robot French tutor
///
/// Practice French in the terminal through structured lessons or free
/// conversation, with optional spoken replies.
#[derive(Parser, Debug, Clone)]
#[command(name = "benoit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Override the audio output (device, wav, none)
    #[arg(long, global = true, value_parser = AudioOutputKind::parse_str)]
    pub audio: Option<AudioOutputKind>,

    /// Never speak replies automatically
    #[arg(long, global = true)]
    pub no_auto_play: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Benoît
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an open conversation
    Chat,

    /// Start a structured lesson
    Lesson {
        /// Lesson identifier (see `benoit lessons`)
        id: String,
    },

    /// List the lesson catalog
    Lessons {
        /// Print the catalog as JSON
        #[arg(long)]
        json: bool,
    },

    /// Speak a sentence through the synthesis pipeline
    Speak {
        /// Text to speak
        text: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
