//! Opus encoder with a minimal Ogg muxer
//!
//! Compresses the canonical float32 record with libopus and wraps the
//! packets in an Ogg stream by hand: identification and comment header
//! pages first, then one audio packet per page. The muxer implements only
//! what an Opus stream needs, so every packet fits a single page.

use super::EncoderParams;
use crate::audio::AudioData;
use crate::error::{Error, Result};
use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Samples per channel in one 20 ms packet, in 48 kHz granule units.
const GRANULE_PER_FRAME: u64 = 960;
/// Pre-skip advertised in the identification header, in 48 kHz samples.
const PRE_SKIP: u16 = 3840;
const MAX_PACKET_BYTES: usize = 8192;

const PAGE_BOS: u8 = 0x02;
const PAGE_EOS: u8 = 0x04;

/// Ogg page CRC: polynomial 0x04C11DB7, zero initial value, no final xor,
/// computed over the page with the checksum field zeroed.
fn ogg_page_crc(page: &[u8]) -> u32 {
    let mut crc: u32 = 0;
    for &byte in page {
        crc ^= u32::from(byte) << 24;
        for _ in 0..8 {
            crc = if crc & 0x8000_0000 != 0 {
                (crc << 1) ^ 0x04C1_1DB7
            } else {
                crc << 1
            };
        }
    }
    crc
}

/// Single-logical-stream Ogg page writer.
struct OggWriter<W: Write> {
    sink: W,
    serial: u32,
    sequence: u32,
}

impl<W: Write> OggWriter<W> {
    fn new(sink: W) -> Self {
        OggWriter {
            sink,
            serial: rand::random(),
            sequence: 0,
        }
    }

    /// Emit one packet as one page. `packet` must be small enough that its
    /// lacing fits the 255-segment limit.
    fn write_page(&mut self, packet: &[u8], granule: u64, flags: u8) -> Result<()> {
        let full_segments = packet.len() / 255;
        let segments = full_segments + 1;
        if segments > 255 {
            return Err(Error::encode(format!(
                "packet too large for a single page: {} bytes",
                packet.len()
            )));
        }

        let mut page = Vec::with_capacity(27 + segments + packet.len());
        page.write_all(b"OggS")?;
        page.write_u8(0)?; // stream structure version
        page.write_u8(flags)?;
        page.write_u64::<LittleEndian>(granule)?;
        page.write_u32::<LittleEndian>(self.serial)?;
        page.write_u32::<LittleEndian>(self.sequence)?;
        page.write_u32::<LittleEndian>(0)?; // checksum, patched below
        page.write_u8(segments as u8)?;
        for _ in 0..full_segments {
            page.write_u8(255)?;
        }
        page.write_u8((packet.len() % 255) as u8)?;
        page.write_all(packet)?;

        let crc = ogg_page_crc(&page);
        page[22..26].copy_from_slice(&crc.to_le_bytes());

        self.sink.write_all(&page)?;
        self.sequence += 1;
        Ok(())
    }
}

fn opus_head(channels: u8, input_rate: u32) -> Vec<u8> {
    let mut head = Vec::with_capacity(19);
    head.extend_from_slice(b"OpusHead");
    head.push(1); // version
    head.push(channels);
    head.extend_from_slice(&PRE_SKIP.to_le_bytes());
    head.extend_from_slice(&input_rate.to_le_bytes());
    head.extend_from_slice(&0i16.to_le_bytes()); // output gain
    head.push(0); // channel mapping family
    head
}

fn opus_tags() -> Vec<u8> {
    let vendor = b"resound";
    let mut tags = Vec::with_capacity(8 + 4 + vendor.len() + 4);
    tags.extend_from_slice(b"OpusTags");
    tags.extend_from_slice(&(vendor.len() as u32).to_le_bytes());
    tags.extend_from_slice(vendor);
    tags.extend_from_slice(&0u32.to_le_bytes()); // comment count
    tags
}

/// Write `data` to `path` as an Ogg Opus file.
///
/// Opus accepts only its native sample rates, mono or stereo, and fixed
/// 20 ms packets; a trailing partial frame is dropped. `params.dither` is
/// ignored since the codec consumes float input directly.
pub fn encode_opus_to_disk(
    params: EncoderParams,
    data: &AudioData,
    path: impl AsRef<Path>,
) -> Result<()> {
    let channels = match params.channel_count {
        1 => opus::Channels::Mono,
        2 => opus::Channels::Stereo,
        n => {
            return Err(Error::unsupported(format!(
                "opus supports mono or stereo, not {} channels",
                n
            )))
        }
    };
    if params.channel_count != data.channel_count {
        return Err(Error::unsupported(
            "channel mixing is not performed for opus output",
        ));
    }
    match data.sample_rate {
        8000 | 12000 | 16000 | 24000 | 48000 => {}
        rate => {
            return Err(Error::unsupported(format!(
                "opus does not accept a {} Hz input rate",
                rate
            )))
        }
    }
    if data.samples.is_empty() {
        return Err(Error::invalid_input("no sample data to encode"));
    }

    let mut encoder = opus::Encoder::new(data.sample_rate, channels, opus::Application::Audio)
        .map_err(|e| Error::encode(format!("failed to create opus encoder: {}", e)))?;

    // 20 ms of input per packet
    let frame_samples = (data.sample_rate / 50) as usize * params.channel_count as usize;
    let frames: Vec<&[f32]> = data.samples.chunks_exact(frame_samples).collect();
    if frames.is_empty() {
        return Err(Error::invalid_input(format!(
            "fewer samples than one opus frame: {}",
            data.samples.len()
        )));
    }

    let file = std::fs::File::create(path.as_ref())?;
    let mut writer = OggWriter::new(BufWriter::new(file));

    writer.write_page(&opus_head(params.channel_count as u8, data.sample_rate), 0, PAGE_BOS)?;
    writer.write_page(&opus_tags(), 0, 0)?;

    let mut packet = vec![0u8; MAX_PACKET_BYTES];
    let mut granule: u64 = 0;
    let last = frames.len() - 1;
    for (i, frame) in frames.iter().enumerate() {
        let written = encoder
            .encode_float(frame, &mut packet)
            .map_err(|e| Error::encode(format!("opus encode failed: {}", e)))?;
        granule += GRANULE_PER_FRAME;
        let flags = if i == last { PAGE_EOS } else { 0 };
        writer.write_page(&packet[..written], granule, flags)?;
    }

    writer.sink.flush()?;
    tracing::debug!(
        path = %path.as_ref().display(),
        packets = frames.len(),
        rate = data.sample_rate,
        "wrote ogg opus file"
    );
    Ok(())
}
