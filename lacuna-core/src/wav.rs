//! Uncompressed RIFF/WAVE serialization.
//!
//! ## Layout
//!
//! 44-byte header — `RIFF` size, `fmt ` subchunk (PCM format code 1,
//! channel count, sample rate, byte rate, block align, 16 bits per
//! sample), `data` subchunk — followed by interleaved little-endian
//! signed 16-bit samples. No extension chunks.
//!
//! Float samples are clamped to [-1, 1] and scaled asymmetrically:
//! negatives by 32768, non-negatives by 32767, matching the signed-16
//! range exactly.

use crate::buffer::PcmBuffer;

/// Serialize a PCM buffer into WAV bytes.
///
/// Pure and total: any buffer — zero-length included — encodes to a
/// structurally valid container.
pub fn encode(pcm: &PcmBuffer) -> Vec<u8> {
    let channels = pcm.channel_count() as u16;
    let frame_count = pcm.frame_count();
    let sample_rate = pcm.sample_rate();

    let data_len = frame_count * channels as usize * 2;
    let byte_rate = sample_rate * channels as u32 * 2;
    let block_align = channels * 2;

    let mut out = Vec::with_capacity(44 + data_len);

    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&((36 + data_len) as u32).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // linear PCM
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes());

    out.extend_from_slice(b"data");
    out.extend_from_slice(&(data_len as u32).to_le_bytes());

    for frame in 0..frame_count {
        for ch in 0..channels as usize {
            let sample = pcm.channel(ch).map_or(0.0, |c| c[frame]);
            out.extend_from_slice(&sample_to_i16(sample).to_le_bytes());
        }
    }

    out
}

fn sample_to_i16(sample: f32) -> i16 {
    let s = sample.clamp(-1.0, 1.0);
    if s < 0.0 {
        (s * 32768.0) as i16
    } else {
        (s * 32767.0) as i16
    }
}
