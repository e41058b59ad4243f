//! Audio support: payload decoding, output sinks and the playback pipeline

pub mod decode;
pub mod output;
pub mod playback;

pub use decode::{decode_audio, decode_base64, decode_pcm16, encode_audio, DecodedAudio};
pub use output::{open_sink, AudioSink, NullSink, WavSink};
pub use playback::{strip_markdown, AudioPlayer, PlaybackReport};

/// Sample rate of synthesized speech
pub const SPEECH_SAMPLE_RATE: u32 = 24_000;

/// Channel count of synthesized speech
pub const SPEECH_CHANNELS: u16 = 1;
