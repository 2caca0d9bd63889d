//! Audio decode capability.
//!
//! The `AudioDecoder` trait is the seam between the engine and whatever
//! turns container bytes into PCM. It is an explicitly passed service
//! object — there is no ambient decode context, and each call stands
//! alone. Swap in `SymphoniaDecoder` (default) or any future backend
//! without touching the pipeline.

#[cfg(feature = "decode-symphonia")]
pub mod symphonia;

#[cfg(feature = "decode-symphonia")]
pub use self::symphonia::SymphoniaDecoder;

use crate::buffer::PcmBuffer;
use crate::error::Result;

/// Contract for audio decode backends.
pub trait AudioDecoder {
    /// Decode compressed or container audio bytes into a planar PCM buffer
    /// with known sample rate and channel count.
    ///
    /// # Errors
    /// `LacunaError::Decode` when the bytes are corrupt or the format is
    /// unsupported; `LacunaError::NoAudioTrack` when the container holds no
    /// audio stream. A failed decode produces no partial result.
    fn decode(&self, bytes: &[u8]) -> Result<PcmBuffer>;
}
