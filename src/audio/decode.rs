//! Speech payload decoding
//!
//! Synthesized speech arrives as base64 text wrapping raw interleaved
//! signed 16-bit little-endian PCM. Decoding normalizes each sample to
//! `f32` in [-1.0, 1.0] by dividing by 32768.

use crate::error::{BenoitError, Result};
use base64::Engine;
use std::time::Duration;

/// Normalization divisor for signed 16-bit samples
const PCM16_SCALE: f32 = 32768.0;

/// A decoded, playable buffer
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    /// Interleaved samples in [-1.0, 1.0]
    pub samples: Vec<f32>,
    /// Frames per second
    pub sample_rate: u32,
    /// Interleaved channel count
    pub channels: u16,
}

impl DecodedAudio {
    /// Number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1) as usize
    }

    /// Playback length
    ///
    /// # Examples
    ///
    /// ```
    /// use benoit::audio::DecodedAudio;
    /// use std::time::Duration;
    ///
    /// let audio = DecodedAudio { samples: vec![0.0; 24_000], sample_rate: 24_000, channels: 1 };
    /// assert_eq!(audio.duration(), Duration::from_secs(1));
    /// ```
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames() as f64 / self.sample_rate as f64)
    }

    /// Mono view of the buffer, averaging channels per frame
    pub fn to_mono(&self) -> Vec<f32> {
        let channels = self.channels.max(1) as usize;
        if channels == 1 {
            return self.samples.clone();
        }
        self.samples
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    }

    /// Quantize back to signed 16-bit samples
    pub fn to_pcm16(&self) -> Vec<i16> {
        self.samples.iter().map(|&s| quantize(s)).collect()
    }
}

/// Convert one normalized sample to signed 16-bit
fn quantize(sample: f32) -> i16 {
    (sample * PCM16_SCALE)
        .round()
        .clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

/// Decode a base64 payload into raw bytes
///
/// # Errors
///
/// Returns `AudioDecode` if the input is not valid standard base64
pub fn decode_base64(payload: &str) -> Result<Vec<u8>> {
    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| BenoitError::AudioDecode(format!("invalid base64 payload: {}", e)).into())
}

/// Interpret raw bytes as interleaved signed 16-bit little-endian PCM
///
/// # Errors
///
/// Returns `AudioDecode` if the byte count is not a whole number of frames
/// or the channel count is zero
pub fn decode_pcm16(bytes: &[u8], sample_rate: u32, channels: u16) -> Result<DecodedAudio> {
    if channels == 0 {
        return Err(BenoitError::AudioDecode("channel count must be at least 1".to_string()).into());
    }

    let frame_bytes = 2 * channels as usize;
    if bytes.len() % frame_bytes != 0 {
        return Err(BenoitError::AudioDecode(format!(
            "{} bytes is not a whole number of {}-channel 16-bit frames",
            bytes.len(),
            channels
        ))
        .into());
    }

    let samples = bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / PCM16_SCALE)
        .collect();

    Ok(DecodedAudio {
        samples,
        sample_rate,
        channels,
    })
}

/// Decode a base64 PCM16 payload into a normalized buffer
///
/// # Examples
///
/// ```
/// use benoit::audio::decode_audio;
///
/// // two samples: 0 and -32768
/// let audio = decode_audio("AAAAgA==", 24_000, 1).unwrap();
/// assert_eq!(audio.samples, vec![0.0, -1.0]);
/// ```
pub fn decode_audio(payload: &str, sample_rate: u32, channels: u16) -> Result<DecodedAudio> {
    let bytes = decode_base64(payload)?;
    decode_pcm16(&bytes, sample_rate, channels)
}

/// Encode normalized samples as base64 PCM16, the inverse of `decode_audio`
pub fn encode_audio(samples: &[f32]) -> String {
    let bytes: Vec<u8> = samples
        .iter()
        .flat_map(|&s| quantize(s).to_le_bytes())
        .collect();
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_known_samples() {
        let bytes: Vec<u8> = [0i16, 16384, -16384, i16::MAX, i16::MIN]
            .iter()
            .flat_map(|s| s.to_le_bytes())
            .collect();
        let audio = decode_pcm16(&bytes, 24_000, 1).unwrap();
        assert_eq!(audio.samples[0], 0.0);
        assert_eq!(audio.samples[1], 0.5);
        assert_eq!(audio.samples[2], -0.5);
        assert_eq!(audio.samples[3], 32767.0 / 32768.0);
        assert_eq!(audio.samples[4], -1.0);
        assert!(audio.samples.iter().all(|s| (-1.0..=1.0).contains(s)));
    }

    #[test]
    fn test_round_trip_is_quantization_bounded() {
        let original: Vec<f32> = (0..480)
            .map(|i| (i as f32 * 2.0 * std::f32::consts::PI / 48.0).sin() * 0.9)
            .collect();
        let decoded = decode_audio(&encode_audio(&original), 24_000, 1).unwrap();

        assert_eq!(decoded.samples.len(), original.len());
        for (a, b) in original.iter().zip(decoded.samples.iter()) {
            assert!((a - b).abs() <= 1.0 / 32768.0, "{} vs {}", a, b);
        }
    }

    #[test]
    fn test_decode_rejects_invalid_base64() {
        let err = decode_audio("not base64!!", 24_000, 1).unwrap_err();
        assert!(err.to_string().contains("invalid base64"));
    }

    #[test]
    fn test_decode_rejects_odd_byte_count() {
        let err = decode_pcm16(&[0, 0, 1], 24_000, 1).unwrap_err();
        assert!(err.to_string().contains("whole number"));
    }

    #[test]
    fn test_decode_rejects_partial_stereo_frame() {
        assert!(decode_pcm16(&[0, 0, 0, 0, 0, 0], 24_000, 2).is_err());
        assert!(decode_pcm16(&[0, 0, 0, 0], 24_000, 2).is_ok());
    }

    #[test]
    fn test_decode_rejects_zero_channels() {
        assert!(decode_pcm16(&[0, 0], 24_000, 0).is_err());
    }

    #[test]
    fn test_empty_payload_decodes_to_empty_buffer() {
        let audio = decode_audio("", 24_000, 1).unwrap();
        assert!(audio.samples.is_empty());
        assert_eq!(audio.duration(), Duration::ZERO);
    }

    #[test]
    fn test_to_mono_averages_channels() {
        let audio = DecodedAudio {
            samples: vec![0.5, -0.5, 1.0, 0.0],
            sample_rate: 24_000,
            channels: 2,
        };
        assert_eq!(audio.frames(), 2);
        assert_eq!(audio.to_mono(), vec![0.0, 0.5]);
    }
}
