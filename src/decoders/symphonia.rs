//! Symphonia-backed decoder for compressed formats
//!
//! FLAC, MP3, and Ogg/Vorbis bitstreams are decoded entirely by the
//! symphonia collaborator; this adapter only probes the container, drives
//! the packet loop, and populates the canonical record with interleaved
//! float32 samples.

use super::{read_audio_file, BaseDecoder};
use crate::audio::{AudioData, PcmFormat};
use crate::error::{Error, Result};
use std::io::Cursor;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Decoder delegating bitstream work to symphonia
pub struct SymphoniaDecoder;

impl SymphoniaDecoder {
    fn decode_source(
        &self,
        data: &mut AudioData,
        source: Box<dyn MediaSource>,
        extension_hint: Option<&str>,
    ) -> Result<()> {
        let mss = MediaSourceStream::new(source, Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = extension_hint {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| Error::decode(format!("failed to probe stream: {}", e)))?;

        let mut reader = probed.format;

        let track = reader
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| Error::decode("no supported audio track found"))?;
        let track_id = track.id;

        let codec_params = track.codec_params.clone();
        let sample_rate = codec_params
            .sample_rate
            .ok_or_else(|| Error::decode("stream does not declare a sample rate"))?;
        let channels = codec_params
            .channels
            .map(|c| c.count() as u32)
            .ok_or_else(|| Error::decode("stream does not declare a channel layout"))?;
        if channels == 0 {
            return Err(Error::decode("stream declares zero channels"));
        }

        // Best-effort original precision; lossy codecs land on 16 bits
        let bits = codec_params.bits_per_sample.unwrap_or(16);
        data.source_format = match PcmFormat::from_bits(bits, false, true) {
            PcmFormat::Invalid => PcmFormat::I16,
            fmt => fmt,
        };
        data.channel_count = channels;
        data.sample_rate = sample_rate;
        data.frame_size = channels as usize * bits as usize / 8;

        let mut decoder = symphonia::default::get_codecs()
            .make(&codec_params, &DecoderOptions::default())
            .map_err(|e| Error::decode(format!("failed to instantiate decoder: {}", e)))?;

        let mut sample_buf: Option<SampleBuffer<f32>> = None;
        data.samples.clear();

        loop {
            let packet = match reader.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(SymphoniaError::ResetRequired) => break,
                Err(e) => return Err(Error::decode(format!("failed to read packet: {}", e))),
            };

            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => {
                    let buf = sample_buf.get_or_insert_with(|| {
                        SampleBuffer::new(decoded.capacity() as u64, *decoded.spec())
                    });
                    buf.copy_interleaved_ref(decoded);
                    data.samples.extend_from_slice(buf.samples());
                }
                Err(SymphoniaError::DecodeError(e)) => {
                    // A single bad packet is recoverable; skip it
                    tracing::warn!(error = e, "skipping undecodable packet");
                }
                Err(e) => return Err(Error::decode(format!("decode failed: {}", e))),
            }
        }

        data.length_seconds =
            data.samples.len() as f64 / f64::from(channels) / f64::from(sample_rate);

        Ok(())
    }
}

impl BaseDecoder for SymphoniaDecoder {
    fn name(&self) -> &'static str {
        "symphonia"
    }

    fn load_from_path(&self, data: &mut AudioData, path: &Path) -> Result<()> {
        let buffer = read_audio_file(path)?;
        let hint = path.extension().and_then(|e| e.to_str()).map(str::to_owned);
        self.decode_source(data, Box::new(Cursor::new(buffer)), hint.as_deref())
    }

    fn load_from_buffer(&self, data: &mut AudioData, buffer: &[u8]) -> Result<()> {
        self.decode_source(data, Box::new(Cursor::new(buffer.to_vec())), None)
    }

    fn supported_extensions(&self) -> &'static [&'static str] {
        &["flac", "mp3", "ogg"]
    }
}
