//! # lacuna-core
//!
//! Phrase segmentation and pause-stretching audio engine.
//!
//! ## Architecture
//!
//! ```text
//! bytes → AudioDecoder::decode → PcmBuffer
//!                                    │
//!                      analysis::analyze (optional auto-tune)
//!                                    │
//!                      segment::detect_phrases → Vec<Phrase>
//!                                    │
//!                      [segment::split — max-length cap]
//!                                    │
//!                      assemble::combine_phrases → PcmBuffer (mono)
//!                                    │
//!                      wav::encode → RIFF/WAVE bytes
//! ```
//!
//! Every stage is a synchronous pure pass over in-memory buffers; source
//! buffers are never mutated, so any stage may be re-run idempotently.
//! `LacunaEngine` wires the stages together and sequences re-runs.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod analysis;
pub mod assemble;
pub mod buffer;
pub mod decode;
pub mod engine;
pub mod error;
pub mod segment;
pub mod wav;

// Convenience re-exports for downstream crates
pub use analysis::SignalStats;
pub use assemble::{combine_phrases, AssemblyConfig};
pub use buffer::PcmBuffer;
pub use decode::AudioDecoder;
pub use engine::{EngineConfig, LacunaEngine};
pub use error::{LacunaError, Result};
pub use segment::{detect_phrases, DetectionConfig, Phrase};

#[cfg(feature = "decode-symphonia")]
pub use decode::SymphoniaDecoder;
