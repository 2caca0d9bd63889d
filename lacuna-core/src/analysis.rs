//! Signal statistics pass used to auto-tune detection parameters.
//!
//! ## Algorithm
//!
//! 1. Restrict the scan to the first `max_analysis_secs` of channel 0
//!    (whole files are rarely needed to estimate levels).
//! 2. Track running min/max of `abs(sample)`.
//! 3. Track contiguous sub-threshold runs; on exiting a run, record its
//!    duration against the running min/max pause length.
//! 4. A run still open at the end of the window is flushed as a final run.
//!
//! When no silence run is ever observed, the pause fields stay `None` and
//! the caller must fall back to the documented defaults.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::buffer::PcmBuffer;

/// Amplitude threshold used when scanning for statistics.
///
/// Deliberately looser than the segmentation default so quiet-but-voiced
/// material still registers as signal.
pub const ANALYSIS_SILENCE_THRESHOLD: f32 = 0.03;

/// How much of the input the stats pass looks at, in seconds.
pub const MAX_ANALYSIS_SECS: f64 = 120.0;

/// Amplitude range and silence-gap spread of one input file.
///
/// Derived once per file, used only to seed `DetectionConfig`; never feeds
/// assembly settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalStats {
    /// Smallest `abs(sample)` observed in the window.
    pub min_amplitude: f32,
    /// Largest `abs(sample)` observed in the window.
    pub max_amplitude: f32,
    /// Shortest closed silence run, in seconds. `None` when no run was seen.
    pub min_silence_duration: Option<f64>,
    /// Longest closed silence run, in seconds. `None` when no run was seen.
    pub max_silence_duration: Option<f64>,
}

/// Scan a prefix of `pcm`'s channel 0 and report its amplitude range and
/// silence-gap durations.
///
/// Pure read — the buffer is never modified, and any non-empty buffer
/// produces a result.
pub fn analyze(pcm: &PcmBuffer, silence_threshold: f32, max_analysis_secs: f64) -> SignalStats {
    let samples = pcm.analysis_channel();
    let rate = pcm.sample_rate() as f64;
    let window = ((rate * max_analysis_secs) as usize).min(samples.len());

    let mut min_amplitude = 1.0f32;
    let mut max_amplitude = 0.0f32;

    let mut current_run = 0usize;
    let mut min_pause: Option<f64> = None;
    let mut max_pause: Option<f64> = None;

    for &sample in &samples[..window] {
        let amplitude = sample.abs();

        if amplitude < min_amplitude {
            min_amplitude = amplitude;
        }
        if amplitude > max_amplitude {
            max_amplitude = amplitude;
        }

        if amplitude < silence_threshold {
            current_run += 1;
        } else if current_run > 0 {
            record_run(current_run as f64 / rate, &mut min_pause, &mut max_pause);
            current_run = 0;
        }
    }

    // Signal ended while still inside a run.
    if current_run > 0 {
        record_run(current_run as f64 / rate, &mut min_pause, &mut max_pause);
    }

    debug!(
        min_amplitude,
        max_amplitude,
        min_pause = ?min_pause,
        max_pause = ?max_pause,
        window,
        "signal stats computed"
    );

    SignalStats {
        min_amplitude,
        max_amplitude,
        min_silence_duration: min_pause,
        max_silence_duration: max_pause,
    }
}

fn record_run(duration: f64, min_pause: &mut Option<f64>, max_pause: &mut Option<f64>) {
    if min_pause.map_or(true, |current| duration < current) {
        *min_pause = Some(duration);
    }
    if max_pause.map_or(true, |current| duration > current) {
        *max_pause = Some(duration);
    }
}
