//! PCM format conversion engine
//!
//! Bidirectional conversion between integer/float PCM encodings and the
//! canonical interleaved float32 representation, plus triangular dithering
//! and the mono/stereo mixing helpers used by the encoders.
//!
//! Scaling conventions: the 16/24/32-bit paths divide and multiply by the
//! full signed range (32768, 8388608, 2147483648) in both directions, with
//! saturation at positive full scale, so same-depth round trips are
//! byte-exact. The 8-bit paths use 127 as the divisor for both the signed
//! and unsigned variants; `int8 127` therefore maps to exactly 1.0. This
//! asymmetry is intentional and pinned by tests.

use crate::audio::PcmFormat;
use crate::error::{Error, Result};
use crate::util::endian::{pack_i24, unpack_i24};
use byteorder::{ByteOrder, LittleEndian};
use rand::Rng;

const BYTE_TO_FLOAT: f32 = 1.0 / 127.0;
const INT16_SCALE: f32 = 32768.0;
const INT24_SCALE: f32 = 8_388_608.0;
const INT32_SCALE: f32 = 2_147_483_648.0;
const INT64_SCALE: f64 = 9_223_372_036_854_775_808.0;

/// Dither applied when quantizing float32 down to an integer format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DitherMode {
    /// Straight rounding, no noise
    None,
    /// Triangular-PDF dither with first-order noise shaping
    Triangular,
}

/// Triangular dither state: a fresh PRNG per conversion call plus the
/// previous noise value, applied as `sample + new - previous` for mean-zero,
/// high-pass-shaped noise.
struct TriangularDither {
    rng: rand::rngs::ThreadRng,
    previous: f32,
}

impl TriangularDither {
    fn new() -> Self {
        TriangularDither {
            rng: rand::thread_rng(),
            previous: 0.0,
        }
    }

    /// Dither one sample already scaled to integer range (1 LSB amplitude).
    fn apply(&mut self, scaled: f32) -> f32 {
        let noise: f32 = self.rng.gen_range(-0.5..0.5);
        let out = scaled + noise - self.previous;
        self.previous = noise;
        out
    }
}

// f32::round is round-half-away-from-zero, which is the rounding rule the
// quantizer wants.
fn quantize(x: f32, dither: &mut Option<TriangularDither>) -> f32 {
    match dither {
        Some(d) => d.apply(x).round(),
        None => x.round(),
    }
}

/// Convert `count` samples of byte-aligned PCM data to normalized float32.
///
/// `src` is interpreted per `format`; it must hold at least
/// `count * format.bits_per_sample() / 8` bytes and `dst` at least `count`
/// samples.
pub fn pcm_to_float32(dst: &mut [f32], src: &[u8], count: usize, format: PcmFormat) -> Result<()> {
    let bytes_needed = count * format.bits_per_sample() as usize / 8;
    if src.len() < bytes_needed {
        return Err(Error::format(format!(
            "source buffer too small: need {} bytes, have {}",
            bytes_needed,
            src.len()
        )));
    }
    if dst.len() < count {
        return Err(Error::format("destination buffer too small"));
    }

    match format {
        PcmFormat::U8 => {
            for i in 0..count {
                dst[i] = (src[i] as f32 - 128.0) * BYTE_TO_FLOAT;
            }
        }
        PcmFormat::S8 => {
            for i in 0..count {
                dst[i] = (src[i] as i8) as f32 * BYTE_TO_FLOAT;
            }
        }
        PcmFormat::I16 => {
            for i in 0..count {
                dst[i] = LittleEndian::read_i16(&src[i * 2..]) as f32 / INT16_SCALE;
            }
        }
        PcmFormat::I24 => {
            for i in 0..count {
                let at = i * 3;
                dst[i] = pack_i24(src[at], src[at + 1], src[at + 2]) as f32 / INT24_SCALE;
            }
        }
        PcmFormat::I32 => {
            for i in 0..count {
                dst[i] = LittleEndian::read_i32(&src[i * 4..]) as f32 / INT32_SCALE;
            }
        }
        PcmFormat::I64 => {
            for i in 0..count {
                dst[i] = (LittleEndian::read_i64(&src[i * 8..]) as f64 / INT64_SCALE) as f32;
            }
        }
        PcmFormat::F32 => {
            for i in 0..count {
                dst[i] = LittleEndian::read_f32(&src[i * 4..]);
            }
        }
        PcmFormat::F64 => {
            for i in 0..count {
                dst[i] = LittleEndian::read_f64(&src[i * 8..]) as f32;
            }
        }
        PcmFormat::Invalid => {
            return Err(Error::unsupported("cannot convert from invalid PCM format"));
        }
    }

    Ok(())
}

/// Convert `count` samples staged in 32-bit slots to normalized float32.
///
/// Some decode paths stage every sample in an `i32` regardless of its true
/// width; `format` says how wide the value really is.
pub fn i32_to_float32(dst: &mut [f32], src: &[i32], count: usize, format: PcmFormat) -> Result<()> {
    if src.len() < count || dst.len() < count {
        return Err(Error::format("buffer too small for i32 conversion"));
    }

    let scale = match format {
        PcmFormat::U8 | PcmFormat::S8 => 127.0,
        PcmFormat::I16 => INT16_SCALE,
        PcmFormat::I24 => INT24_SCALE,
        PcmFormat::I32 => INT32_SCALE,
        _ => {
            return Err(Error::unsupported(format!(
                "cannot widen {} samples from 32-bit slots",
                format
            )))
        }
    };

    for i in 0..count {
        dst[i] = src[i] as f32 / scale;
    }
    Ok(())
}

/// Convert `count` decoded 16-bit samples (the ADPCM output staging) to
/// normalized float32.
pub fn i16_to_float32(dst: &mut [f32], src: &[i16], count: usize, format: PcmFormat) -> Result<()> {
    if format != PcmFormat::I16 {
        return Err(Error::unsupported(format!(
            "16-bit staging buffer cannot hold {} samples",
            format
        )));
    }
    if src.len() < count || dst.len() < count {
        return Err(Error::format("buffer too small for i16 conversion"));
    }
    for i in 0..count {
        dst[i] = src[i] as f32 / INT16_SCALE;
    }
    Ok(())
}

/// Quantize `count` float32 samples into `dst` per `format`, little-endian.
///
/// Inverse of [`pcm_to_float32`] up to quantization. 64-bit integer output
/// is not supported.
pub fn float32_to_pcm(
    dst: &mut [u8],
    src: &[f32],
    count: usize,
    format: PcmFormat,
    dither_mode: DitherMode,
) -> Result<()> {
    let bytes_needed = count * format.bits_per_sample() as usize / 8;
    if dst.len() < bytes_needed {
        return Err(Error::format(format!(
            "destination buffer too small: need {} bytes, have {}",
            bytes_needed,
            dst.len()
        )));
    }
    if src.len() < count {
        return Err(Error::format("source buffer too small"));
    }

    let mut dither = match dither_mode {
        DitherMode::Triangular => Some(TriangularDither::new()),
        DitherMode::None => None,
    };

    match format {
        PcmFormat::U8 => {
            for i in 0..count {
                let v = quantize(src[i] * 127.0, &mut dither) + 128.0;
                dst[i] = v.clamp(0.0, 255.0) as u8;
            }
        }
        PcmFormat::S8 => {
            for i in 0..count {
                let v = quantize(src[i] * 127.0, &mut dither);
                dst[i] = (v.clamp(-128.0, 127.0) as i8) as u8;
            }
        }
        PcmFormat::I16 => {
            for i in 0..count {
                let v = quantize(src[i] * INT16_SCALE, &mut dither);
                LittleEndian::write_i16(&mut dst[i * 2..], v.clamp(-32768.0, 32767.0) as i16);
            }
        }
        PcmFormat::I24 => {
            for i in 0..count {
                let v = quantize(src[i] * INT24_SCALE, &mut dither);
                let s = v.clamp(-8_388_608.0, 8_388_607.0) as i32;
                let (a, b, c) = unpack_i24(s);
                let at = i * 3;
                dst[at] = a;
                dst[at + 1] = b;
                dst[at + 2] = c;
            }
        }
        PcmFormat::I32 => {
            for i in 0..count {
                let v = quantize(src[i] * INT32_SCALE, &mut dither);
                let s = (v as f64).clamp(-2_147_483_648.0, 2_147_483_647.0) as i32;
                LittleEndian::write_i32(&mut dst[i * 4..], s);
            }
        }
        PcmFormat::F32 => {
            for i in 0..count {
                LittleEndian::write_f32(&mut dst[i * 4..], src[i]);
            }
        }
        PcmFormat::F64 => {
            for i in 0..count {
                LittleEndian::write_f64(&mut dst[i * 8..], src[i] as f64);
            }
        }
        PcmFormat::I64 | PcmFormat::Invalid => {
            return Err(Error::unsupported(format!(
                "cannot quantize float32 to {}",
                format
            )));
        }
    }

    Ok(())
}

/// Duplicate a mono signal into interleaved stereo.
///
/// `dst` must hold `2 * src.len()` samples.
pub fn mono_to_stereo(src: &[f32], dst: &mut [f32]) {
    for (i, &s) in src.iter().enumerate() {
        dst[2 * i] = s;
        dst[2 * i + 1] = s;
    }
}

/// Average interleaved stereo down to mono.
///
/// `dst` must hold `src.len() / 2` samples.
pub fn stereo_to_mono(src: &[f32], dst: &mut [f32]) {
    for (i, frame) in src.chunks_exact(2).enumerate() {
        dst[i] = (frame[0] + frame[1]) * 0.5;
    }
}
