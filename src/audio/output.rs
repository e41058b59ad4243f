//! Audio output sinks
//!
//! The sink is the process-wide audio output context: opened once on first
//! playback and reused for the rest of the process. Every `play` call is a
//! new independent source; overlapping utterances mix.

use crate::audio::DecodedAudio;
use crate::config::{AudioConfig, AudioOutputKind};
use crate::error::{BenoitError, Result};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Destination for decoded speech
///
/// `play` schedules the buffer and returns immediately; it never waits for
/// playback to finish.
pub trait AudioSink: Send + Sync {
    /// Schedule a buffer for immediate playback
    fn play(&self, audio: DecodedAudio) -> Result<()>;

    /// Short human-readable description for logs and `/status`
    fn describe(&self) -> String;
}

/// Open the sink selected by configuration
///
/// May block while a device is opened; call from a blocking context.
///
/// # Errors
///
/// Returns `AudioOutput` if the sink cannot be created
pub fn open_sink(config: &AudioConfig) -> Result<Box<dyn AudioSink>> {
    let sink: Box<dyn AudioSink> = match config.output {
        AudioOutputKind::None => Box::new(NullSink),
        AudioOutputKind::Wav => Box::new(WavSink::new(config.wav_dir.clone())?),
        #[cfg(feature = "audio-io")]
        AudioOutputKind::Device => {
            Box::new(device::DeviceSink::open(crate::audio::SPEECH_SAMPLE_RATE)?)
        }
        #[cfg(not(feature = "audio-io"))]
        AudioOutputKind::Device => {
            return Err(BenoitError::AudioOutput(
                "device output requires the audio-io feature".to_string(),
            )
            .into())
        }
    };

    tracing::info!("Opened audio output: {}", sink.describe());
    Ok(sink)
}

/// Discards audio after logging what would have played
#[derive(Debug, Default)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn play(&self, audio: DecodedAudio) -> Result<()> {
        tracing::info!(
            "Audio output disabled, dropping {:.2}s of speech",
            audio.duration().as_secs_f64()
        );
        Ok(())
    }

    fn describe(&self) -> String {
        "none".to_string()
    }
}

/// Writes each utterance to its own WAV file
#[derive(Debug)]
pub struct WavSink {
    dir: PathBuf,
    counter: AtomicUsize,
}

impl WavSink {
    /// Create the sink, creating `dir` if needed
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created
    pub fn new(dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&dir).map_err(|e| {
            BenoitError::AudioOutput(format!("Failed to create {}: {}", dir.display(), e))
        })?;
        Ok(Self {
            dir,
            counter: AtomicUsize::new(0),
        })
    }

    fn next_path(&self) -> PathBuf {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S");
        self.dir.join(format!("benoit-{}-{:04}.wav", stamp, n))
    }
}

impl AudioSink for WavSink {
    fn play(&self, audio: DecodedAudio) -> Result<()> {
        let path = self.next_path();
        let spec = hound::WavSpec {
            channels: audio.channels,
            sample_rate: audio.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let map_err =
            |e: hound::Error| BenoitError::AudioOutput(format!("{}: {}", path.display(), e));

        let mut writer = hound::WavWriter::create(&path, spec).map_err(map_err)?;
        for sample in audio.to_pcm16() {
            writer.write_sample(sample).map_err(map_err)?;
        }
        writer.finalize().map_err(map_err)?;

        tracing::info!(
            "Wrote {:.2}s of speech to {}",
            audio.duration().as_secs_f64(),
            path.display()
        );
        Ok(())
    }

    fn describe(&self) -> String {
        format!("wav ({})", self.dir.display())
    }
}

#[cfg(feature = "audio-io")]
mod device {
    //! Live playback on the default output device.
    //!
    //! The cpal stream lives on a dedicated thread for the rest of the
    //! process; the sink only pushes voices into a shared mixer.

    use super::AudioSink;
    use crate::audio::DecodedAudio;
    use crate::error::{BenoitError, Result};
    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
    use cpal::{SampleFormat, SampleRate, StreamConfig};
    use std::sync::{mpsc, Arc, Mutex};

    /// One scheduled utterance
    struct Voice {
        samples: Vec<f32>,
        position: f64,
        step: f64,
    }

    type Mixer = Arc<Mutex<Vec<Voice>>>;

    pub struct DeviceSink {
        mixer: Mixer,
        device_rate: u32,
        name: String,
    }

    impl DeviceSink {
        pub fn open(preferred_rate: u32) -> Result<Self> {
            let mixer: Mixer = Arc::new(Mutex::new(Vec::new()));
            let stream_mixer = Arc::clone(&mixer);
            let (ready_tx, ready_rx) = mpsc::channel::<std::result::Result<(u32, String), String>>();

            std::thread::Builder::new()
                .name("benoit-audio".to_string())
                .spawn(move || {
                    let stream = match build_stream(preferred_rate, stream_mixer) {
                        Ok((stream, rate, name)) => {
                            let _ = ready_tx.send(Ok((rate, name)));
                            stream
                        }
                        Err(e) => {
                            let _ = ready_tx.send(Err(e));
                            return;
                        }
                    };
                    // keep the stream alive for the process lifetime
                    let _stream = stream;
                    loop {
                        std::thread::park();
                    }
                })
                .map_err(|e| BenoitError::AudioOutput(format!("Failed to spawn audio thread: {}", e)))?;

            let (device_rate, name) = ready_rx
                .recv()
                .map_err(|_| BenoitError::AudioOutput("Audio thread exited".to_string()))?
                .map_err(BenoitError::AudioOutput)?;

            Ok(Self {
                mixer,
                device_rate,
                name,
            })
        }
    }

    fn build_stream(
        preferred_rate: u32,
        mixer: Mixer,
    ) -> std::result::Result<(cpal::Stream, u32, String), String> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| "No output device available".to_string())?;
        let name = device.name().unwrap_or_else(|_| "Unknown".to_string());

        let preferred = device
            .supported_output_configs()
            .map_err(|e| format!("Failed to query output configs: {}", e))?
            .filter(|range| range.sample_format() == SampleFormat::F32)
            .find(|range| {
                range.min_sample_rate().0 <= preferred_rate
                    && range.max_sample_rate().0 >= preferred_rate
            })
            .map(|range| range.with_sample_rate(SampleRate(preferred_rate)));

        let supported = match preferred {
            Some(config) => config,
            None => device
                .default_output_config()
                .map_err(|e| format!("Failed to get output config: {}", e))?,
        };
        let config: StreamConfig = supported.config();
        let channels = config.channels as usize;
        let rate = config.sample_rate.0;

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    data.fill(0.0);
                    let mut voices = match mixer.lock() {
                        Ok(guard) => guard,
                        Err(poisoned) => poisoned.into_inner(),
                    };
                    for frame in data.chunks_mut(channels) {
                        let mut mixed = 0.0f32;
                        for voice in voices.iter_mut() {
                            if let Some(sample) = voice.samples.get(voice.position as usize) {
                                mixed += *sample;
                                voice.position += voice.step;
                            }
                        }
                        let mixed = mixed.clamp(-1.0, 1.0);
                        frame.iter_mut().for_each(|s| *s = mixed);
                    }
                    voices.retain(|v| (v.position as usize) < v.samples.len());
                },
                |err| tracing::error!("Audio output stream error: {}", err),
                None,
            )
            .map_err(|e| format!("Failed to build output stream: {}", e))?;

        stream
            .play()
            .map_err(|e| format!("Failed to start output stream: {}", e))?;

        Ok((stream, rate, name))
    }

    impl AudioSink for DeviceSink {
        fn play(&self, audio: DecodedAudio) -> Result<()> {
            let step = audio.sample_rate as f64 / self.device_rate as f64;
            let voice = Voice {
                samples: audio.to_mono(),
                position: 0.0,
                step,
            };
            match self.mixer.lock() {
                Ok(mut voices) => voices.push(voice),
                Err(poisoned) => poisoned.into_inner().push(voice),
            }
            Ok(())
        }

        fn describe(&self) -> String {
            format!("device ({} @ {} Hz)", self.name, self.device_rate)
        }
    }
}
