//! Canonical audio record and sample format definitions

use std::fmt;

/// Encoding precision of a PCM sample buffer.
///
/// Every concrete sample buffer is homogeneously one format; mixed-format
/// buffers are never represented. `Invalid` is the sentinel returned by
/// [`PcmFormat::from_bits`] for unmappable combinations and must be checked
/// by callers before use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PcmFormat {
    /// Unsigned 8-bit
    U8,
    /// Signed 8-bit
    S8,
    /// Signed 16-bit
    I16,
    /// Signed 24-bit (packed, 3 bytes)
    I24,
    /// Signed 32-bit
    I32,
    /// Signed 64-bit
    I64,
    /// 32-bit IEEE float
    F32,
    /// 64-bit IEEE float
    F64,
    /// Unknown or unmappable format
    Invalid,
}

impl PcmFormat {
    /// Bit width of one sample, 0 for `Invalid`.
    pub fn bits_per_sample(&self) -> u32 {
        match self {
            PcmFormat::U8 | PcmFormat::S8 => 8,
            PcmFormat::I16 => 16,
            PcmFormat::I24 => 24,
            PcmFormat::I32 | PcmFormat::F32 => 32,
            PcmFormat::I64 | PcmFormat::F64 => 64,
            PcmFormat::Invalid => 0,
        }
    }

    /// Map a bit width back to a format.
    ///
    /// Non-standard bit counts (or float widths other than 32/64) yield
    /// `Invalid`.
    pub fn from_bits(bits: u32, is_float: bool, is_signed: bool) -> Self {
        match (bits, is_float) {
            (8, false) => {
                if is_signed {
                    PcmFormat::S8
                } else {
                    PcmFormat::U8
                }
            }
            (16, false) => PcmFormat::I16,
            (24, false) => PcmFormat::I24,
            (32, false) => PcmFormat::I32,
            (64, false) => PcmFormat::I64,
            (32, true) => PcmFormat::F32,
            (64, true) => PcmFormat::F64,
            _ => PcmFormat::Invalid,
        }
    }
}

impl fmt::Display for PcmFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PcmFormat::U8 => "u8",
            PcmFormat::S8 => "s8",
            PcmFormat::I16 => "s16",
            PcmFormat::I24 => "s24",
            PcmFormat::I32 => "s32",
            PcmFormat::I64 => "s64",
            PcmFormat::F32 => "f32",
            PcmFormat::F64 => "f64",
            PcmFormat::Invalid => "invalid",
        };
        write!(f, "{}", name)
    }
}

impl Default for PcmFormat {
    fn default() -> Self {
        PcmFormat::Invalid
    }
}

/// Canonical decode result: interleaved float32 samples plus format metadata.
///
/// The caller allocates the record (typically via `Default`), passes it by
/// mutable reference into a decoder, and owns it afterwards; decoders fully
/// populate it in one call and retain no reference to it.
///
/// `source_format` records the precision of the *original* encoding even
/// though samples are always materialized as float32 — re-encoders use it to
/// pick lossy/lossless re-quantization paths.
#[derive(Debug, Clone, Default)]
pub struct AudioData {
    /// Number of interleaved channels
    pub channel_count: u32,
    /// Samples per second
    pub sample_rate: u32,
    /// Duration in seconds, derived from the frame count
    pub length_seconds: f64,
    /// Bytes per multi-channel frame (informational)
    pub frame_size: usize,
    /// Original encoding precision
    pub source_format: PcmFormat,
    /// Interleaved samples; length is always a multiple of `channel_count`
    pub samples: Vec<f32>,
}

impl AudioData {
    /// Frames per channel currently held.
    pub fn frames_per_channel(&self) -> usize {
        if self.channel_count == 0 {
            0
        } else {
            self.samples.len() / self.channel_count as usize
        }
    }
}
