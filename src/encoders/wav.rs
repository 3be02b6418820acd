//! WAV file writer
//!
//! Serializes the canonical float32 record into a RIFF/WAVE file, with
//! optional requantization to an integer target format. The chunk layout is
//! fixed: `fmt `, a `fact` chunk when the payload is float, then `data`.

use super::EncoderParams;
use crate::audio::{AudioData, PcmFormat};
use crate::error::{Error, Result};
use crate::util::{float32_to_pcm, mono_to_stereo, stereo_to_mono};
use byteorder::{LittleEndian, WriteBytesExt};
use std::borrow::Cow;
use std::io::Write;
use std::path::Path;

const FORMAT_TAG_PCM: u16 = 0x0001;
const FORMAT_TAG_IEEE_FLOAT: u16 = 0x0003;

/// Remap the source channel layout to the requested one.
///
/// Only the identity and the mono/stereo mixes are supported; anything else
/// would need a mixing matrix this writer does not carry.
fn mix_channels(data: &AudioData, target_channels: u32) -> Result<Cow<'_, [f32]>> {
    match (data.channel_count, target_channels) {
        (a, b) if a == b => Ok(Cow::Borrowed(&data.samples)),
        (1, 2) => {
            let mut mixed = vec![0.0f32; data.samples.len() * 2];
            mono_to_stereo(&data.samples, &mut mixed);
            Ok(Cow::Owned(mixed))
        }
        (2, 1) => {
            let mut mixed = vec![0.0f32; data.samples.len() / 2];
            stereo_to_mono(&data.samples, &mut mixed);
            Ok(Cow::Owned(mixed))
        }
        (a, b) => Err(Error::unsupported(format!(
            "cannot mix {} channels to {}",
            a, b
        ))),
    }
}

/// Write `data` to `path` as a WAV file.
///
/// Fewer than 33 samples is rejected as insufficient material, as is any
/// channel count outside 1..=8. Targets wider than 32 bits are not written;
/// a target wider than the source's original precision falls back to a
/// float32 payload rather than padding with fabricated resolution.
pub fn encode_wav_to_disk(
    params: EncoderParams,
    data: &AudioData,
    path: impl AsRef<Path>,
) -> Result<()> {
    if data.samples.len() <= 32 {
        return Err(Error::invalid_input(format!(
            "insufficient sample data: {} samples",
            data.samples.len()
        )));
    }
    if params.channel_count < 1 || params.channel_count > 8 {
        return Err(Error::unsupported(format!(
            "unsupported channel count: {}",
            params.channel_count
        )));
    }

    let target_bits = params.target_format.bits_per_sample();
    match params.target_format {
        PcmFormat::Invalid => {
            return Err(Error::invalid_input("invalid target format"));
        }
        _ if target_bits > 32 => {
            return Err(Error::unsupported(format!(
                "cannot write {}-bit samples",
                target_bits
            )));
        }
        _ => {}
    }

    let samples = mix_channels(data, params.channel_count)?;

    // Requantize only when the target is integer and no wider than the
    // source's original precision; otherwise keep full float32.
    let requantize = params.target_format != PcmFormat::F32
        && target_bits <= data.source_format.bits_per_sample();
    let write_format = if requantize {
        params.target_format
    } else {
        PcmFormat::F32
    };

    let bytes_per_sample = write_format.bits_per_sample() as usize / 8;
    let mut payload = vec![0u8; samples.len() * bytes_per_sample];
    float32_to_pcm(
        &mut payload,
        &samples,
        samples.len(),
        write_format,
        params.dither,
    )?;

    let channels = params.channel_count;
    let block_align = channels * write_format.bits_per_sample() / 8;
    let is_float = write_format == PcmFormat::F32;

    let mut buf: Vec<u8> = Vec::with_capacity(payload.len() + 64);
    buf.write_all(b"RIFF")?;
    buf.write_u32::<LittleEndian>(0)?; // patched below
    buf.write_all(b"WAVE")?;

    buf.write_all(b"fmt ")?;
    buf.write_u32::<LittleEndian>(16)?;
    buf.write_u16::<LittleEndian>(if is_float {
        FORMAT_TAG_IEEE_FLOAT
    } else {
        FORMAT_TAG_PCM
    })?;
    buf.write_u16::<LittleEndian>(channels as u16)?;
    buf.write_u32::<LittleEndian>(data.sample_rate)?;
    buf.write_u32::<LittleEndian>(data.sample_rate * block_align)?;
    buf.write_u16::<LittleEndian>(block_align as u16)?;
    buf.write_u16::<LittleEndian>(write_format.bits_per_sample() as u16)?;

    if is_float {
        // Float payloads carry a fact chunk with the per-channel frame count
        buf.write_all(b"fact")?;
        buf.write_u32::<LittleEndian>(4)?;
        buf.write_u32::<LittleEndian>((samples.len() / channels as usize) as u32)?;
    }

    buf.write_all(b"data")?;
    buf.write_u32::<LittleEndian>(payload.len() as u32)?;
    buf.write_all(&payload)?;
    if payload.len() % 2 != 0 {
        buf.push(0);
    }

    let riff_size = (buf.len() - 8) as u32;
    buf[4..8].copy_from_slice(&riff_size.to_le_bytes());

    tracing::debug!(
        path = %path.as_ref().display(),
        format = %write_format,
        channels,
        bytes = buf.len(),
        "writing wav file"
    );
    std::fs::write(path, &buf)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoders::{BaseDecoder, WavDecoder};
    use crate::util::DitherMode;

    fn test_data(channels: u32, count: usize) -> AudioData {
        AudioData {
            channel_count: channels,
            sample_rate: 44100,
            length_seconds: count as f64 / f64::from(channels) / 44100.0,
            frame_size: channels as usize * 2,
            source_format: PcmFormat::I16,
            samples: (0..count).map(|i| (i as f32 / count as f32) * 0.5).collect(),
        }
    }

    #[test]
    fn test_rejects_insufficient_samples() {
        let data = test_data(1, 32);
        let dir = tempfile::tempdir().unwrap();
        let err = encode_wav_to_disk(
            EncoderParams::new(1, PcmFormat::I16, DitherMode::None),
            &data,
            dir.path().join("out.wav"),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_rejects_bad_channel_counts() {
        let data = test_data(1, 100);
        let dir = tempfile::tempdir().unwrap();
        for channels in [0u32, 9] {
            let err = encode_wav_to_disk(
                EncoderParams::new(channels, PcmFormat::I16, DitherMode::None),
                &data,
                dir.path().join("out.wav"),
            )
            .unwrap_err();
            assert!(matches!(err, Error::Unsupported(_)));
        }
    }

    #[test]
    fn test_rejects_wide_targets() {
        let data = test_data(1, 100);
        let dir = tempfile::tempdir().unwrap();
        for format in [PcmFormat::I64, PcmFormat::F64] {
            let err = encode_wav_to_disk(
                EncoderParams::new(1, format, DitherMode::None),
                &data,
                dir.path().join("out.wav"),
            )
            .unwrap_err();
            assert!(matches!(err, Error::Unsupported(_)));
        }
    }

    #[test]
    fn test_rejects_unsupported_mix() {
        let data = test_data(1, 100);
        let dir = tempfile::tempdir().unwrap();
        let err = encode_wav_to_disk(
            EncoderParams::new(4, PcmFormat::I16, DitherMode::None),
            &data,
            dir.path().join("out.wav"),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Unsupported(_)));
    }

    #[test]
    fn test_encode_decode_roundtrip_i16() {
        let data = test_data(1, 100);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        encode_wav_to_disk(
            EncoderParams::new(1, PcmFormat::I16, DitherMode::None),
            &data,
            &path,
        )
        .unwrap();

        let mut decoded = AudioData::default();
        WavDecoder.load_from_path(&mut decoded, &path).unwrap();
        assert_eq!(decoded.channel_count, 1);
        assert_eq!(decoded.sample_rate, 44100);
        assert_eq!(decoded.source_format, PcmFormat::I16);
        assert_eq!(decoded.samples.len(), 100);
        for (a, b) in decoded.samples.iter().zip(data.samples.iter()) {
            assert!((a - b).abs() < 1.0 / 32768.0, "{} vs {}", a, b);
        }
    }

    #[test]
    fn test_float_target_writes_fact_chunk() {
        let data = test_data(1, 100);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        encode_wav_to_disk(
            EncoderParams::new(1, PcmFormat::F32, DitherMode::None),
            &data,
            &path,
        )
        .unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let fact = crate::riff::scan_for_chunk(&bytes, crate::riff::chunk_code(b'f', b'a', b'c', b't'))
            .expect("fact chunk present");
        assert_eq!(fact.size, 4);
        assert_eq!(
            u32::from_le_bytes(bytes[fact.offset..fact.offset + 4].try_into().unwrap()),
            100
        );

        // float payload survives untouched
        let mut decoded = AudioData::default();
        WavDecoder.load_from_path(&mut decoded, &path).unwrap();
        assert_eq!(decoded.source_format, PcmFormat::F32);
        assert_eq!(decoded.samples, data.samples);
    }

    #[test]
    fn test_mono_to_stereo_mix() {
        let data = test_data(1, 100);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        encode_wav_to_disk(
            EncoderParams::new(2, PcmFormat::I16, DitherMode::None),
            &data,
            &path,
        )
        .unwrap();

        let mut decoded = AudioData::default();
        WavDecoder.load_from_path(&mut decoded, &path).unwrap();
        assert_eq!(decoded.channel_count, 2);
        assert_eq!(decoded.samples.len(), 200);
        for frame in decoded.samples.chunks_exact(2) {
            assert_eq!(frame[0], frame[1]);
        }
    }

    #[test]
    fn test_riff_size_is_patched() {
        let data = test_data(1, 100);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        encode_wav_to_disk(
            EncoderParams::new(1, PcmFormat::I16, DitherMode::None),
            &data,
            &path,
        )
        .unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let declared = u32::from_le_bytes(bytes[4..8].try_into().unwrap()) as usize;
        assert_eq!(bytes.len() - declared, 8);
    }

    #[test]
    fn test_odd_payload_gets_pad_byte() {
        let mut data = test_data(1, 101);
        data.source_format = PcmFormat::U8;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        encode_wav_to_disk(
            EncoderParams::new(1, PcmFormat::U8, DitherMode::None),
            &data,
            &path,
        )
        .unwrap();

        let bytes = std::fs::read(&path).unwrap();
        // 101 payload bytes declared, file padded to even length
        let data_loc = crate::riff::scan_for_chunk(&bytes, crate::riff::chunk_code(b'd', b'a', b't', b'a'))
            .expect("data chunk present");
        assert_eq!(data_loc.size, 101);
        assert_eq!(bytes.len() % 2, 0);
    }
}
