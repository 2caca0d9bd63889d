//! Symphonia-backed decode: probe the container, decode the first audio
//! track packet-by-packet, de-interleave into planar f32.

use std::io::Cursor;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

use crate::buffer::PcmBuffer;
use crate::decode::AudioDecoder;
use crate::error::{LacunaError, Result};

/// Decodes any format symphonia's enabled feature set understands
/// (WAV/PCM, MP3, AAC, FLAC, OGG/Vorbis).
#[derive(Debug, Default)]
pub struct SymphoniaDecoder;

impl SymphoniaDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl AudioDecoder for SymphoniaDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<PcmBuffer> {
        let cursor = Cursor::new(bytes.to_vec());
        let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

        let probed = symphonia::default::get_probe()
            .format(
                &Hint::new(),
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| LacunaError::Decode(format!("format probe: {e}")))?;

        let mut format = probed.format;
        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or(LacunaError::NoAudioTrack)?;

        let track_id = track.id;
        let mut sample_rate = track.codec_params.sample_rate.unwrap_or(44100);

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| LacunaError::Decode(format!("decoder init: {e}")))?;

        let mut channels: Vec<Vec<f32>> = Vec::new();
        let mut sample_buf: Option<SampleBuffer<f32>> = None;

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(e) => return Err(LacunaError::Decode(format!("packet read: {e}"))),
            };

            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => {
                    if sample_buf.is_none() {
                        let spec = *decoded.spec();
                        sample_rate = spec.rate;
                        channels = vec![Vec::new(); spec.channels.count()];
                        sample_buf = Some(SampleBuffer::new(decoded.capacity() as u64, spec));
                    }

                    if let Some(buf) = sample_buf.as_mut() {
                        buf.copy_interleaved_ref(decoded);
                        let channel_count = channels.len();
                        for (i, &sample) in buf.samples().iter().enumerate() {
                            channels[i % channel_count].push(sample);
                        }
                    }
                }
                // Malformed packets are recoverable — keep going.
                Err(SymphoniaError::DecodeError(e)) => {
                    warn!("skipping undecodable packet: {e}");
                }
                Err(e) => return Err(LacunaError::Decode(e.to_string())),
            }
        }

        if channels.iter().all(Vec::is_empty) {
            return Err(LacunaError::Decode("no audio frames decoded".into()));
        }

        let pcm = PcmBuffer::new(channels, sample_rate);
        debug!(
            sample_rate,
            channels = pcm.channel_count(),
            frames = pcm.frame_count(),
            "decode complete"
        );
        Ok(pcm)
    }
}
