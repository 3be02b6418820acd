//! RIFF/WAVE container parser
//!
//! Walks the `fmt `, `fact`, `bext`, and `data` chunks of a WAV buffer,
//! selects the decode path (raw PCM vs IMA ADPCM), and populates the
//! canonical audio record. Parsing is fail-fast: any malformed header,
//! missing mandatory chunk, or unexpected chunk size aborts the decode.

use super::{read_audio_file, BaseDecoder};
use crate::audio::{AudioData, PcmFormat};
use crate::error::{Error, Result};
use crate::riff::adpcm::decode_ima_adpcm;
use crate::riff::{chunk_code, scan_for_chunk};
use crate::util::{i16_to_float32, pcm_to_float32};
use byteorder::{ByteOrder, LittleEndian};
use std::path::Path;

/// WAV format tag identifying the payload encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatTag {
    /// PCM (uncompressed)
    Pcm,
    /// IEEE float
    IeeeFloat,
    /// IMA ADPCM (4:1 nibble-compressed)
    ImaAdpcm,
    /// Extensible format with a sub-format GUID
    Extensible,
    /// Unknown format
    Unknown(u16),
}

impl From<u16> for FormatTag {
    fn from(val: u16) -> Self {
        match val {
            0x0001 => FormatTag::Pcm,
            0x0003 => FormatTag::IeeeFloat,
            0x0011 => FormatTag::ImaAdpcm,
            0xFFFE => FormatTag::Extensible,
            other => FormatTag::Unknown(other),
        }
    }
}

/// Parsed 16-byte `fmt ` chunk body
#[derive(Debug, Clone)]
struct WavFormat {
    format_tag: FormatTag,
    channels: u16,
    sample_rate: u32,
    block_align: u16,
    bits_per_sample: u16,
}

impl WavFormat {
    fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < 16 {
            return Err(Error::format("fmt chunk body too small"));
        }
        let format = WavFormat {
            format_tag: LittleEndian::read_u16(&data[0..]).into(),
            channels: LittleEndian::read_u16(&data[2..]),
            sample_rate: LittleEndian::read_u32(&data[4..]),
            block_align: LittleEndian::read_u16(&data[12..]),
            bits_per_sample: LittleEndian::read_u16(&data[14..]),
        };
        if format.channels == 0 {
            return Err(Error::format("invalid channel count: 0"));
        }
        if format.sample_rate == 0 {
            return Err(Error::format("invalid sample rate: 0"));
        }
        if format.block_align == 0 {
            return Err(Error::format("invalid block alignment: 0"));
        }
        Ok(format)
    }
}

/// WAV decoder
pub struct WavDecoder;

impl WavDecoder {
    fn parse(&self, data: &mut AudioData, memory: &[u8]) -> Result<()> {
        if memory.len() < 12 {
            return Err(Error::format("buffer too small for a RIFF header"));
        }

        let riff_code = LittleEndian::read_u32(&memory[0..]);
        if riff_code != chunk_code(b'R', b'I', b'F', b'F') {
            // Recognize the big-endian variants so they fail with a
            // distinct error instead of a generic header complaint
            if riff_code == chunk_code(b'R', b'I', b'F', b'X')
                || riff_code == chunk_code(b'F', b'F', b'I', b'R')
            {
                return Err(Error::unsupported("big-endian RIFX/FFIR files"));
            }
            return Err(Error::format("bad RIFF file header"));
        }

        if LittleEndian::read_u32(&memory[8..]) != chunk_code(b'W', b'A', b'V', b'E') {
            return Err(Error::format("bad WAVE header"));
        }

        // The RIFF size field excludes the 8 bytes of its own header
        let declared = LittleEndian::read_u32(&memory[4..]) as i64;
        if memory.len() as i64 - declared != 8 {
            return Err(Error::format(format!(
                "declared file size {} does not match buffer of {} bytes",
                declared,
                memory.len()
            )));
        }

        let fmt_loc = scan_for_chunk(memory, chunk_code(b'f', b'm', b't', b' '))
            .ok_or_else(|| Error::format("couldn't find fmt chunk"))?;

        if !matches!(fmt_loc.size, 16 | 18 | 20 | 40) {
            return Err(Error::format(format!(
                "unexpected fmt chunk size: {}",
                fmt_loc.size
            )));
        }
        if fmt_loc.offset + 16 > memory.len() {
            return Err(Error::format("fmt chunk truncated"));
        }

        let fmt = WavFormat::from_bytes(&memory[fmt_loc.offset..])?;

        data.channel_count = u32::from(fmt.channels);
        data.sample_rate = fmt.sample_rate;
        data.frame_size = usize::from(fmt.block_align);

        data.source_format = match fmt.bits_per_sample {
            // IMA ADPCM: 4-bit codes decode to 16-bit PCM
            4 => PcmFormat::I16,
            8 => PcmFormat::U8,
            16 => PcmFormat::I16,
            24 => PcmFormat::I24,
            32 | 64 => PcmFormat::from_bits(
                u32::from(fmt.bits_per_sample),
                fmt.format_tag == FormatTag::IeeeFloat,
                true,
            ),
            other => {
                return Err(Error::format(format!(
                    "unsupported bit depth: {}",
                    other
                )))
            }
        };

        let mut scan_for_fact = false;
        let mut grab_extensible_data = false;
        let mut adpcm_encoded = false;

        match fmt.format_tag {
            FormatTag::Pcm => {}
            FormatTag::IeeeFloat => {
                scan_for_fact = true;
            }
            FormatTag::ImaAdpcm => {
                adpcm_encoded = true;
                scan_for_fact = true;
            }
            FormatTag::Extensible => {
                // Used when PCM data has more than 16 bits, more than two
                // channels, or an explicit speaker mapping
                scan_for_fact = true;
                grab_extensible_data = true;
            }
            FormatTag::Unknown(tag) => {
                return Err(Error::format(format!("unknown wave format tag: {:#06x}", tag)));
            }
        }

        let mut fact_sample_length: Option<u32> = None;
        if scan_for_fact {
            if let Some(fact_loc) = scan_for_chunk(memory, chunk_code(b'f', b'a', b'c', b't')) {
                if fact_loc.size >= 4 && fact_loc.offset + 4 <= memory.len() {
                    fact_sample_length =
                        Some(LittleEndian::read_u32(&memory[fact_loc.offset..]));
                }
            }
        }

        if grab_extensible_data {
            // Sub-block follows the base fmt struct: extension size,
            // valid bits, channel mask, sub-format GUID. Read and validated
            // for bounds but not yet surfaced to the canonical record.
            let ext_at = fmt_loc.offset + 16;
            if fmt_loc.size < 40 || ext_at + 24 > memory.len() {
                return Err(Error::format("extensible fmt chunk truncated"));
            }
            let valid_bits = LittleEndian::read_u16(&memory[ext_at + 2..]);
            let channel_mask = LittleEndian::read_u32(&memory[ext_at + 4..]);
            tracing::debug!(valid_bits, channel_mask, "extensible format sub-block");
        }

        // bext (broadcast extension) metadata is recognized but discarded
        if let Some(bext_loc) = scan_for_chunk(memory, chunk_code(b'b', b'e', b'x', b't')) {
            tracing::debug!(size = bext_loc.size, "bext chunk present, not surfaced");
        }

        let data_loc = scan_for_chunk(memory, chunk_code(b'd', b'a', b't', b'a'))
            .ok_or_else(|| Error::format("couldn't find data chunk"))?;

        let data_size = data_loc.size as usize;
        if data_loc.offset + data_size > memory.len() {
            return Err(Error::format("data chunk extends past end of buffer"));
        }
        let payload = &memory[data_loc.offset..data_loc.offset + data_size];

        let channels = usize::from(fmt.channels);
        let frame_size = usize::from(fmt.block_align);

        if adpcm_encoded {
            let samples_per_channel = fact_sample_length
                .ok_or_else(|| Error::format("fact chunk required for adpcm data"))?;
            if frame_size <= 4 * channels {
                return Err(Error::format("adpcm block align too small for headers"));
            }

            let total_samples = samples_per_channel as usize * channels;

            // Each compressed frame decodes to twice its byte count in
            // samples, so the staging buffer is double the nominal size
            let mut pcm16 = vec![0i16; total_samples * 2];

            let frame_count = data_size / frame_size;
            let advance = frame_size * 2 - 8 * channels;
            let mut frame_offset = 0usize;

            for i in 0..frame_count {
                let block = &payload[i * frame_size..(i + 1) * frame_size];
                if frame_offset >= pcm16.len() {
                    break;
                }
                decode_ima_adpcm(block, channels, &mut pcm16[frame_offset..])?;
                frame_offset += advance;
            }

            data.length_seconds =
                (total_samples as f64 / f64::from(fmt.sample_rate)) / channels as f64;
            data.samples.resize(total_samples, 0.0);
            i16_to_float32(&mut data.samples, &pcm16, total_samples, data.source_format)?;
        } else {
            let total_samples = (data_size / frame_size) * channels;
            data.length_seconds =
                (data_size as f64 / f64::from(fmt.sample_rate)) / frame_size as f64;
            data.samples.resize(total_samples, 0.0);
            pcm_to_float32(&mut data.samples, payload, total_samples, data.source_format)?;
        }

        Ok(())
    }
}

impl BaseDecoder for WavDecoder {
    fn name(&self) -> &'static str {
        "wav"
    }

    fn load_from_path(&self, data: &mut AudioData, path: &Path) -> Result<()> {
        let buffer = read_audio_file(path)?;
        self.load_from_buffer(data, &buffer)
    }

    fn load_from_buffer(&self, data: &mut AudioData, buffer: &[u8]) -> Result<()> {
        self.parse(data, buffer)
    }

    fn supported_extensions(&self) -> &'static [&'static str] {
        &["wav", "wave"]
    }
}
