//! Narration of a transcript using kokoro-tiny.
//!
//! Every utterance becomes one WAV segment; the segments are joined into a
//! single narration track and each utterance gets `start_ms`/`end_ms` from
//! the measured segment lengths.

use std::path::{Path, PathBuf};

use kokoro_tiny::TtsEngine;
use tracing::{debug, info};

use crate::config::VoicesConfig;
use crate::error::DebateError;
use crate::transcript::Transcript;

/// Kokoro output sample rate.
pub const SAMPLE_RATE: u32 = 24_000;

/// Kokoro has a strict limit on text length per call.
const MAX_CHUNK_CHARS: usize = 200;

/// Text-to-speech engine producing mono f32 samples.
pub trait SpeechEngine {
    fn sample_rate(&self) -> u32;

    fn synthesize(&mut self, text: &str, voice_id: &str) -> Result<Vec<f32>, DebateError>;
}

/// Local TTS via kokoro-tiny (downloads the model on first run).
pub struct KokoroSpeech {
    engine: TtsEngine,
    available_voices: Vec<String>,
}

impl KokoroSpeech {
    pub async fn new() -> Result<Self, DebateError> {
        let engine = TtsEngine::new()
            .await
            .map_err(|e| DebateError::Speech(format!("Failed to initialize TTS: {}", e)))?;

        let available_voices = engine.voices();

        Ok(Self {
            engine,
            available_voices,
        })
    }

    /// Get list of available voice IDs.
    pub fn available_voices(&self) -> &[String] {
        &self.available_voices
    }

    /// Validate that a voice ID exists.
    pub fn validate_voice(&self, voice_id: &str) -> Result<(), DebateError> {
        if voice_id.is_empty() || !self.available_voices.iter().any(|v| v == voice_id) {
            return Err(DebateError::Speech(format!(
                "Unknown voice '{}'. Available voices:\n{}",
                voice_id,
                self.format_available_voices()
            )));
        }
        Ok(())
    }

    /// Validate all configured voices.
    pub fn validate_voices(&self, voices: &VoicesConfig) -> Result<(), DebateError> {
        voices
            .all()
            .into_iter()
            .try_for_each(|voice| self.validate_voice(voice))
    }

    /// English voices, for error messages.
    fn format_available_voices(&self) -> String {
        let mut english_voices: Vec<&String> = self
            .available_voices
            .iter()
            .filter(|v| ["af_", "am_", "bf_", "bm_"].iter().any(|p| v.starts_with(p)))
            .collect();
        english_voices.sort();

        english_voices
            .iter()
            .map(|v| format!("  - {}", v))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl SpeechEngine for KokoroSpeech {
    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn synthesize(&mut self, text: &str, voice_id: &str) -> Result<Vec<f32>, DebateError> {
        self.validate_voice(voice_id)?;

        let mut all_samples = Vec::new();
        for chunk in split_into_chunks(text, MAX_CHUNK_CHARS) {
            let samples = self
                .engine
                .synthesize(&chunk, Some(voice_id))
                .map_err(|e| DebateError::Speech(format!("Synthesis failed: {}", e)))?;
            all_samples.extend(samples);

            // 0.3 s pause between chunks prevents clipped word endings.
            all_samples.extend(silence(0.3, SAMPLE_RATE));
        }

        // 0.5 s trailing pad so the last word is not cut off.
        all_samples.extend(silence(0.5, SAMPLE_RATE));
        Ok(all_samples)
    }
}

/// Split text into chunks that are safe for TTS synthesis.
pub fn split_into_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    let mut flush = |current: &mut String| {
        let chunk = current.trim();
        if !chunk.is_empty() {
            chunks.push(chunk.to_string());
        }
        current.clear();
    };

    for sentence in text.split_inclusive(['.', '!', '?', ';']) {
        let sentence = sentence.trim();
        if sentence.is_empty() {
            continue;
        }

        if current.len() + sentence.len() > max_chars {
            flush(&mut current);
        }

        if sentence.len() > max_chars {
            // A single long sentence is split at commas instead.
            for part in sentence.split_inclusive(',') {
                if current.len() + part.len() > max_chars {
                    flush(&mut current);
                }
                if part.trim().len() > max_chars {
                    // No usable commas either, fall back to word boundaries.
                    for word in part.split_whitespace() {
                        if current.len() + word.len() > max_chars {
                            flush(&mut current);
                        }
                        current.push_str(word);
                        current.push(' ');
                    }
                } else {
                    current.push_str(part.trim());
                    current.push(' ');
                }
            }
        } else {
            current.push_str(sentence);
            current.push(' ');
        }
    }
    flush(&mut current);

    chunks
}

fn silence(seconds: f32, sample_rate: u32) -> Vec<f32> {
    vec![0.0; (seconds * sample_rate as f32) as usize]
}

/// Length of `samples` in whole milliseconds.
pub fn duration_ms(samples: usize, sample_rate: u32) -> u64 {
    samples as u64 * 1000 / u64::from(sample_rate)
}

/// Write mono f32 samples as a WAV file.
pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> Result<(), DebateError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let wav_error = |e: hound::Error| {
        DebateError::Speech(format!("Failed to write WAV {}: {}", path.display(), e))
    };

    let mut writer = hound::WavWriter::create(path, spec).map_err(wav_error)?;
    for &sample in samples {
        writer.write_sample(sample).map_err(wav_error)?;
    }
    writer.finalize().map_err(wav_error)
}

/// Playback length of a WAV file on disk.
pub fn wav_duration_ms(path: &Path) -> Result<u64, DebateError> {
    let reader = hound::WavReader::open(path).map_err(|e| {
        DebateError::Speech(format!("Failed to read WAV {}: {}", path.display(), e))
    })?;
    Ok(duration_ms(
        reader.duration() as usize,
        reader.spec().sample_rate,
    ))
}

/// Voice every utterance, attach timings to `transcript`, and return the
/// path of the joined narration track.
pub fn narrate(
    transcript: &mut Transcript,
    engine: &mut dyn SpeechEngine,
    voices: &VoicesConfig,
    out_dir: &Path,
) -> Result<PathBuf, DebateError> {
    let audio_dir = out_dir.join("audio");
    let segment_dir = audio_dir.join("segments");
    let sample_rate = engine.sample_rate();

    let mut track = Vec::new();
    let mut cursor_ms = 0;
    for index in 0..transcript.utterances.len() {
        let (role, samples) = {
            let utterance = &transcript.utterances[index];
            let voice = voices.for_role(utterance.role);
            debug!(index, role = %utterance.role, voice, "synthesizing utterance");
            (utterance.role, engine.synthesize(&utterance.text, voice)?)
        };

        let segment_path = segment_dir.join(format!("{:03}_{}.wav", index + 1, role));
        write_wav(&segment_path, &samples, sample_rate)?;
        let length_ms = wav_duration_ms(&segment_path)?;

        transcript.attach_audio(
            index,
            Some(segment_path.display().to_string()),
            cursor_ms,
            cursor_ms + length_ms,
        )?;
        cursor_ms += length_ms;
        track.extend(samples);
    }

    let track_path = audio_dir.join("debate_audio.wav");
    write_wav(&track_path, &track, sample_rate)?;
    info!(
        path = %track_path.display(),
        segments = transcript.utterances.len(),
        duration_ms = cursor_ms,
        "narration written"
    );
    Ok(track_path)
}
