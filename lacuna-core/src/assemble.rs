//! Re-assembly: phrase samples copied verbatim, separated by silence scaled
//! to a percentage of each phrase's own length.
//!
//! Output is mono at the source sample rate — multi-channel inputs are
//! reduced to channel 0. Every phrase and pause is resolved to an integer
//! sample span up front, so the output length is exact before any copying
//! happens.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::buffer::PcmBuffer;
use crate::error::{LacunaError, Result};
use crate::segment::Phrase;

/// Pause insertion settings for re-assembly.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssemblyConfig {
    /// Silence appended after each phrase, as a percentage of that phrase's
    /// duration. 100 doubles each phrase's footprint; 0 removes all pauses.
    pub pause_percent: f64,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            pause_percent: 100.0,
        }
    }
}

/// Integer sample footprint of one phrase in the output.
struct Span {
    start: usize,
    len: usize,
    pause: usize,
}

/// Build a new mono buffer containing each phrase's samples followed by
/// `pause_percent` percent of that phrase's duration in silence.
///
/// # Errors
/// `LacunaError::NothingToAssemble` when the phrase list or the source
/// buffer is empty — distinct from success so callers never mistake a
/// no-op for a valid (if silent) output file.
pub fn combine_phrases(
    pcm: &PcmBuffer,
    phrases: &[Phrase],
    pause_percent: f64,
) -> Result<PcmBuffer> {
    if phrases.is_empty() || pcm.is_empty() {
        return Err(LacunaError::NothingToAssemble);
    }

    let rate = pcm.sample_rate() as f64;
    let source = pcm.analysis_channel();

    let spans: Vec<Span> = phrases
        .iter()
        .map(|phrase| {
            let start = ((phrase.start * rate).floor() as usize).min(source.len());
            let end = ((phrase.end * rate).floor() as usize).min(source.len());
            let pause = (phrase.duration * (pause_percent / 100.0) * rate).floor() as usize;
            Span {
                start,
                len: end.saturating_sub(start),
                pause,
            }
        })
        .collect();

    let total: usize = spans.iter().map(|span| span.len + span.pause).sum();
    let mut output = vec![0.0f32; total];

    let mut offset = 0;
    for span in &spans {
        output[offset..offset + span.len]
            .copy_from_slice(&source[span.start..span.start + span.len]);
        offset += span.len;

        output[offset..offset + span.pause].fill(0.0);
        offset += span.pause;
    }
    debug_assert_eq!(offset, total);

    debug!(
        phrases = phrases.len(),
        samples = total,
        pause_percent,
        "assembled output buffer"
    );

    Ok(PcmBuffer::mono(output, pcm.sample_rate()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn ramp_buffer(secs: usize, rate: usize) -> PcmBuffer {
        // Strictly increasing values make copy offsets visible.
        let samples: Vec<f32> = (0..secs * rate).map(|i| (i % 1000) as f32 * 1e-3).collect();
        PcmBuffer::mono(samples, rate as u32)
    }

    #[test]
    fn full_pause_doubles_the_duration() {
        let pcm = ramp_buffer(10, 8000);
        let out = combine_phrases(&pcm, &[Phrase::new(0.0, 5.0)], 100.0).unwrap();

        assert_eq!(out.channel_count(), 1);
        assert_eq!(out.frame_count(), 80_000); // 5 s phrase + 5 s silence
        assert_abs_diff_eq!(out.duration_secs(), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn output_length_is_the_sum_of_spans() {
        let pcm = ramp_buffer(10, 8000);
        let phrases = vec![Phrase::new(0.0, 2.0), Phrase::new(3.0, 4.5), Phrase::new(6.0, 9.0)];
        let pause_percent = 50.0;

        let out = combine_phrases(&pcm, &phrases, pause_percent).unwrap();

        let expected: usize = phrases
            .iter()
            .map(|p| {
                let len = (p.end * 8000.0).floor() as usize - (p.start * 8000.0).floor() as usize;
                let pause = (p.duration * 0.5 * 8000.0).floor() as usize;
                len + pause
            })
            .sum();
        assert_eq!(out.frame_count(), expected);
    }

    #[test]
    fn phrase_samples_are_copied_verbatim() {
        let pcm = ramp_buffer(4, 8000);
        let out = combine_phrases(&pcm, &[Phrase::new(1.0, 2.0)], 100.0).unwrap();

        let source = pcm.analysis_channel();
        let copied = &out.analysis_channel()[..8000];
        assert_eq!(copied, &source[8000..16000]);
    }

    #[test]
    fn pause_region_is_silent() {
        let pcm = ramp_buffer(4, 8000);
        let out = combine_phrases(&pcm, &[Phrase::new(1.0, 2.0)], 100.0).unwrap();

        assert!(out.analysis_channel()[8000..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn zero_pause_concatenates_phrases() {
        let pcm = ramp_buffer(4, 8000);
        let phrases = vec![Phrase::new(0.0, 1.0), Phrase::new(2.0, 3.0)];
        let out = combine_phrases(&pcm, &phrases, 0.0).unwrap();
        assert_eq!(out.frame_count(), 16_000);
    }

    #[test]
    fn multi_channel_input_reduces_to_channel_zero() {
        let left = vec![0.25f32; 8000];
        let right = vec![-0.75f32; 8000];
        let pcm = PcmBuffer::new(vec![left, right], 8000);

        let out = combine_phrases(&pcm, &[Phrase::new(0.0, 1.0)], 0.0).unwrap();
        assert_eq!(out.channel_count(), 1);
        assert!(out.analysis_channel().iter().all(|&s| s == 0.25));
    }

    #[test]
    fn empty_phrase_list_is_a_distinct_error() {
        let pcm = ramp_buffer(1, 8000);
        let err = combine_phrases(&pcm, &[], 100.0).unwrap_err();
        assert!(matches!(err, LacunaError::NothingToAssemble));
    }

    #[test]
    fn empty_source_buffer_is_a_distinct_error() {
        let pcm = PcmBuffer::mono(vec![], 8000);
        let err = combine_phrases(&pcm, &[Phrase::new(0.0, 1.0)], 100.0).unwrap_err();
        assert!(matches!(err, LacunaError::NothingToAssemble));
    }

    #[test]
    fn source_buffer_is_untouched() {
        let pcm = ramp_buffer(2, 8000);
        let before = pcm.analysis_channel().to_vec();
        let _ = combine_phrases(&pcm, &[Phrase::new(0.0, 1.0)], 100.0).unwrap();
        assert_eq!(pcm.analysis_channel(), &before[..]);
    }
}
