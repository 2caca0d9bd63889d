//! `LacunaEngine` — top-level pipeline controller.
//!
//! ## Lifecycle
//!
//! ```text
//! LacunaEngine::new(config)
//!     └─► load(bytes, decoder)     → decode, [auto-tune], segment
//!         └─► recalculate(cfg)     → re-segment the held buffer
//!             └─► render(assembly) → [cap] → assemble → WAV bytes
//! ```
//!
//! Every stage is a pure pass over in-memory buffers, so `recalculate` and
//! `render` may be re-run any number of times on the same source. Runs are
//! sequenced, not overlapped: a busy flag rejects a trigger that arrives
//! while another run is in flight, so the stored phrase list always
//! reflects exactly one complete pass.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tracing::info;

use crate::{
    analysis::{self, SignalStats},
    assemble::{self, AssemblyConfig},
    buffer::PcmBuffer,
    decode::AudioDecoder,
    error::{LacunaError, Result},
    segment::{self, split, DetectionConfig, Phrase},
    wav,
};

/// Configuration for `LacunaEngine`.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Segmentation knobs applied on `load` and kept until `recalculate`.
    pub detection: DetectionConfig,
    /// Hard cap on a single phrase's length at render time, in seconds.
    /// `None` disables splitting.
    pub max_phrase_duration: Option<f64>,
    /// Derive `detection` from a stats pass over each loaded file.
    pub auto_tune: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            detection: DetectionConfig::default(),
            max_phrase_duration: None,
            auto_tune: false,
        }
    }
}

/// The top-level engine handle.
///
/// All fields use interior mutability, so one `LacunaEngine` can be shared
/// behind an `Arc` between a UI thread and worker tasks.
pub struct LacunaEngine {
    config: Mutex<EngineConfig>,
    /// Decoded source audio; `None` until the first successful `load`.
    source: Mutex<Option<PcmBuffer>>,
    /// Result of the most recent segmentation pass.
    phrases: Mutex<Vec<Phrase>>,
    /// Stats from the most recent auto-tune pass, if any.
    stats: Mutex<Option<SignalStats>>,
    /// `true` while a pipeline run is in flight.
    busy: AtomicBool,
}

impl LacunaEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config: Mutex::new(config),
            source: Mutex::new(None),
            phrases: Mutex::new(Vec::new()),
            stats: Mutex::new(None),
            busy: AtomicBool::new(false),
        }
    }

    /// Decode `bytes` with the supplied decoder and run one segmentation
    /// pass with the current config.
    ///
    /// With `auto_tune` set, a stats pass runs first and reseeds the
    /// detection settings (the user's minimum phrase length is preserved).
    ///
    /// # Errors
    /// - `LacunaError::Busy` if another run is in flight.
    /// - Decode errors propagate as-is; no partial phrase list is stored.
    pub fn load(&self, bytes: &[u8], decoder: &dyn AudioDecoder) -> Result<Vec<Phrase>> {
        self.acquire()?;
        let result = self.load_inner(bytes, decoder);
        self.release();
        result
    }

    /// Re-run segmentation on the held buffer with updated settings.
    ///
    /// # Errors
    /// - `LacunaError::Busy` if another run is in flight.
    /// - `LacunaError::NotLoaded` before the first successful `load`.
    pub fn recalculate(&self, detection: DetectionConfig) -> Result<Vec<Phrase>> {
        self.acquire()?;
        let result = self.recalculate_inner(detection);
        self.release();
        result
    }

    /// Assemble the current phrase list into a WAV byte blob.
    ///
    /// Applies the optional max-phrase cap, then pause-scaled assembly,
    /// then encoding.
    ///
    /// # Errors
    /// - `LacunaError::Busy` / `LacunaError::NotLoaded` as above.
    /// - `LacunaError::NothingToAssemble` when segmentation found nothing.
    pub fn render(&self, assembly: &AssemblyConfig) -> Result<Vec<u8>> {
        self.acquire()?;
        let result = self.render_inner(assembly);
        self.release();
        result
    }

    /// Snapshot of the current phrase list, in seconds — the boundary an
    /// external player uses to seek-and-play ranges of the original audio.
    pub fn phrases(&self) -> Vec<Phrase> {
        self.phrases.lock().clone()
    }

    /// Stats from the most recent auto-tune pass, if one ran.
    pub fn stats(&self) -> Option<SignalStats> {
        *self.stats.lock()
    }

    /// Current detection settings (reflects auto-tune adjustments).
    pub fn detection(&self) -> DetectionConfig {
        self.config.lock().detection
    }

    /// Duration of the loaded source in seconds, once loaded.
    pub fn source_duration(&self) -> Option<f64> {
        self.source.lock().as_ref().map(PcmBuffer::duration_secs)
    }

    // ── Internal helpers ─────────────────────────────────────────────────

    fn acquire(&self) -> Result<()> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(LacunaError::Busy);
        }
        Ok(())
    }

    fn release(&self) {
        self.busy.store(false, Ordering::SeqCst);
    }

    fn load_inner(&self, bytes: &[u8], decoder: &dyn AudioDecoder) -> Result<Vec<Phrase>> {
        let pcm = decoder.decode(bytes)?;
        info!(
            sample_rate = pcm.sample_rate(),
            channels = pcm.channel_count(),
            duration_secs = pcm.duration_secs(),
            "audio decoded"
        );

        let mut config = self.config.lock();
        if config.auto_tune {
            let stats = analysis::analyze(
                &pcm,
                analysis::ANALYSIS_SILENCE_THRESHOLD,
                analysis::MAX_ANALYSIS_SECS,
            );
            config.detection =
                DetectionConfig::from_stats(&stats, config.detection.min_phrase_duration);
            *self.stats.lock() = Some(stats);
        }
        let detection = config.detection;
        drop(config);

        let phrases = segment::detect_phrases(&pcm, &detection);
        *self.source.lock() = Some(pcm);
        *self.phrases.lock() = phrases.clone();
        Ok(phrases)
    }

    fn recalculate_inner(&self, detection: DetectionConfig) -> Result<Vec<Phrase>> {
        let source = self.source.lock();
        let pcm = source.as_ref().ok_or(LacunaError::NotLoaded)?;

        self.config.lock().detection = detection;
        let phrases = segment::detect_phrases(pcm, &detection);
        *self.phrases.lock() = phrases.clone();
        Ok(phrases)
    }

    fn render_inner(&self, assembly: &AssemblyConfig) -> Result<Vec<u8>> {
        let source = self.source.lock();
        let pcm = source.as_ref().ok_or(LacunaError::NotLoaded)?;

        let mut phrases = self.phrases.lock().clone();
        if let Some(max_duration) = self.config.lock().max_phrase_duration {
            phrases = split::cap_phrase_durations(&phrases, max_duration);
        }

        let combined = assemble::combine_phrases(pcm, &phrases, assembly.pause_percent)?;
        info!(
            phrases = phrases.len(),
            output_secs = combined.duration_secs(),
            "render complete"
        );
        Ok(wav::encode(&combined))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Decoder that ignores its input and hands back a canned buffer.
    struct StubDecoder {
        pcm: PcmBuffer,
    }

    impl AudioDecoder for StubDecoder {
        fn decode(&self, _bytes: &[u8]) -> Result<PcmBuffer> {
            Ok(self.pcm.clone())
        }
    }

    /// 10 s at 8 kHz with one 0.5 s gap at 4.0 s.
    fn gap_decoder() -> StubDecoder {
        let rate = 8000usize;
        let mut samples = vec![0.5f32; rate * 10];
        samples[rate * 4..rate * 4 + rate / 2].fill(0.0);
        StubDecoder {
            pcm: PcmBuffer::mono(samples, rate as u32),
        }
    }

    fn engine(min_phrase: f64) -> LacunaEngine {
        LacunaEngine::new(EngineConfig {
            detection: DetectionConfig {
                silence_threshold: 0.01,
                min_silence_duration: 0.3,
                min_phrase_duration: min_phrase,
            },
            ..EngineConfig::default()
        })
    }

    #[test]
    fn load_segments_and_snapshots() {
        let engine = engine(1.0);
        let phrases = engine.load(b"irrelevant", &gap_decoder()).unwrap();

        assert_eq!(phrases.len(), 2);
        assert_eq!(engine.phrases(), phrases);
        assert_eq!(engine.source_duration(), Some(10.0));
    }

    #[test]
    fn recalculate_before_load_is_rejected() {
        let engine = engine(1.0);
        let err = engine.recalculate(DetectionConfig::default()).unwrap_err();
        assert!(matches!(err, LacunaError::NotLoaded));

        // The busy flag must be released after a failed run.
        let err = engine.recalculate(DetectionConfig::default()).unwrap_err();
        assert!(matches!(err, LacunaError::NotLoaded));
    }

    #[test]
    fn recalculate_applies_new_settings() {
        let engine = engine(1.0);
        engine.load(b"", &gap_decoder()).unwrap();

        // A pause minimum longer than the gap collapses the split.
        let phrases = engine
            .recalculate(DetectionConfig {
                silence_threshold: 0.01,
                min_silence_duration: 1.0,
                min_phrase_duration: 1.0,
            })
            .unwrap();
        assert_eq!(phrases.len(), 1);
        assert_eq!(engine.phrases().len(), 1);
    }

    #[test]
    fn render_produces_a_wav_blob() {
        let engine = engine(1.0);
        engine.load(b"", &gap_decoder()).unwrap();

        let bytes = engine.render(&AssemblyConfig::default()).unwrap();
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
        assert!(bytes.len() > 44);
    }

    #[test]
    fn render_without_phrases_reports_nothing_to_assemble() {
        // Minimum phrase length far above the file duration → no phrases.
        let engine = engine(60.0);
        let phrases = engine.load(b"", &gap_decoder()).unwrap();
        assert!(phrases.is_empty());

        let err = engine.render(&AssemblyConfig::default()).unwrap_err();
        assert!(matches!(err, LacunaError::NothingToAssemble));
    }

    #[test]
    fn auto_tune_floors_the_derived_minimum_silence() {
        let engine = LacunaEngine::new(EngineConfig {
            detection: DetectionConfig {
                min_phrase_duration: 1.0,
                ..DetectionConfig::default()
            },
            max_phrase_duration: None,
            auto_tune: true,
        });
        engine.load(b"", &gap_decoder()).unwrap();

        // Measured shortest gap is 0.5 s — above the 0.4 s floor it stays.
        let detection = engine.detection();
        assert_eq!(detection.min_silence_duration, 0.5);
        assert!(engine.stats().is_some());
        assert_eq!(detection.min_phrase_duration, 1.0);
    }

    #[test]
    fn max_phrase_cap_splits_at_render_time() {
        let engine = LacunaEngine::new(EngineConfig {
            detection: DetectionConfig {
                silence_threshold: 0.01,
                min_silence_duration: 0.3,
                min_phrase_duration: 1.0,
            },
            max_phrase_duration: Some(2.0),
            auto_tune: false,
        });
        engine.load(b"", &gap_decoder()).unwrap();

        // Capping happens during render only — the snapshot stays unsplit.
        assert_eq!(engine.phrases().len(), 2);
        let bytes = engine.render(&AssemblyConfig { pause_percent: 0.0 }).unwrap();
        // 9.5 s of voiced audio survive unchanged, pauses removed.
        let data_len = bytes.len() - 44;
        assert_eq!(data_len / 2, 76_000);
    }
}
