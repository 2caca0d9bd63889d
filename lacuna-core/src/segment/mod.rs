//! Phrase segmentation: a single forward scan that turns silence gaps into
//! phrase boundaries.
//!
//! ## Algorithm
//!
//! Two states over channel-0 samples, **Voiced** and **Silent**:
//!
//! 1. Voiced + `abs(sample) < threshold` → enter Silent, remember where the
//!    run began.
//! 2. Silent + `abs(sample) >= threshold` → the run is closed. If it was at
//!    least `min_silence_duration` long *and* the pending phrase is at least
//!    `min_phrase_duration` long, emit the phrase and start the next one at
//!    the run's end. Otherwise the pending phrase simply extends across the
//!    gap.
//! 3. After the scan, a trailing phrase is emitted only if the remainder
//!    reaches `min_phrase_duration`; shorter tails are dropped.
//!
//! Only *closed* runs are tested against the pause rule — a run still open
//! at end-of-signal never qualifies, so trailing silence cannot invent a
//! boundary. Emitted phrases are never re-opened.

pub mod split;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::SignalStats;
use crate::buffer::PcmBuffer;

/// Default amplitude below which a sample counts as silence.
pub const DEFAULT_SILENCE_THRESHOLD: f32 = 0.01;

/// Default minimum gap length that qualifies as a pause, in seconds.
pub const DEFAULT_MIN_SILENCE_SECS: f64 = 0.3;

/// Default minimum phrase length, in seconds.
pub const DEFAULT_MIN_PHRASE_SECS: f64 = 5.0;

/// Floor applied to the minimum-silence setting when it is derived from
/// measured gap statistics rather than set by hand.
pub const AUTO_MIN_SILENCE_FLOOR_SECS: f64 = 0.4;

/// A contiguous span of voiced audio between two qualifying silences
/// (or file boundaries). Times are seconds from the start of the source.
///
/// Produced in increasing `start` order, pairwise non-overlapping, and
/// never mutated after creation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phrase {
    pub start: f64,
    pub end: f64,
    pub duration: f64,
}

impl Phrase {
    /// Build a phrase from its boundaries; `duration` is derived.
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            start,
            end,
            duration: end - start,
        }
    }
}

/// Tuning knobs for one segmentation pass. Plain immutable input — the
/// segmenter holds no state across calls.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionConfig {
    /// Amplitude below which a sample counts as silence.
    pub silence_threshold: f32,
    /// Minimum gap length that qualifies as a pause, in seconds.
    pub min_silence_duration: f64,
    /// Minimum phrase length, in seconds. Shorter spans extend across gaps.
    pub min_phrase_duration: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            silence_threshold: DEFAULT_SILENCE_THRESHOLD,
            min_silence_duration: DEFAULT_MIN_SILENCE_SECS,
            min_phrase_duration: DEFAULT_MIN_PHRASE_SECS,
        }
    }
}

impl DetectionConfig {
    /// Seed a config from a stats pass.
    ///
    /// The measured shortest gap becomes the minimum-silence setting,
    /// floored at [`AUTO_MIN_SILENCE_FLOOR_SECS`]; absent stats fall back to
    /// [`DEFAULT_MIN_SILENCE_SECS`]. The threshold keeps its default and
    /// `min_phrase_duration` stays a user knob.
    pub fn from_stats(stats: &SignalStats, min_phrase_duration: f64) -> Self {
        let min_silence_duration = stats
            .min_silence_duration
            .map(|measured| measured.max(AUTO_MIN_SILENCE_FLOOR_SECS))
            .unwrap_or(DEFAULT_MIN_SILENCE_SECS);

        Self {
            silence_threshold: DEFAULT_SILENCE_THRESHOLD,
            min_silence_duration,
            min_phrase_duration,
        }
    }
}

/// Scan state: either inside voiced audio, or inside a silence run that
/// began at the recorded sample index.
#[derive(Debug, Clone, Copy)]
enum ScanState {
    Voiced,
    Silent { run_start: usize },
}

/// Locate silence gaps in `pcm`'s channel 0 and emit the phrases between
/// them.
///
/// Deterministic and pure: identical input and config always yield the
/// identical phrase list. An input with no qualifying phrase returns an
/// empty vec — that is a valid result, not an error.
pub fn detect_phrases(pcm: &PcmBuffer, cfg: &DetectionConfig) -> Vec<Phrase> {
    let samples = pcm.analysis_channel();
    let rate = pcm.sample_rate() as f64;
    let min_silence_samples = cfg.min_silence_duration * rate;

    let mut phrases = Vec::new();
    let mut state = ScanState::Voiced;
    let mut last_phrase_start = 0.0f64;

    for (i, &sample) in samples.iter().enumerate() {
        let amplitude = sample.abs();

        match state {
            ScanState::Voiced => {
                if amplitude < cfg.silence_threshold {
                    state = ScanState::Silent { run_start: i };
                }
            }
            ScanState::Silent { run_start } => {
                if amplitude >= cfg.silence_threshold {
                    let run_len = (i - run_start) as f64;

                    if run_len >= min_silence_samples {
                        let phrase_end = run_start as f64 / rate;
                        let phrase_duration = phrase_end - last_phrase_start;

                        if phrase_duration >= cfg.min_phrase_duration {
                            phrases.push(Phrase::new(last_phrase_start, phrase_end));
                            // The pause's end becomes the next phrase's start.
                            last_phrase_start = i as f64 / rate;
                        }
                    }

                    state = ScanState::Voiced;
                }
            }
        }
    }

    // Trailing phrase, if enough audio remains past the last boundary.
    let audio_duration = pcm.duration_secs();
    if audio_duration - last_phrase_start >= cfg.min_phrase_duration {
        phrases.push(Phrase::new(last_phrase_start, audio_duration));
    }

    debug!(
        phrases = phrases.len(),
        duration_secs = audio_duration,
        "segmentation pass complete"
    );

    phrases
}
