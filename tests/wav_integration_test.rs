//! End-to-end tests driving the public API: registry dispatch, WAV decode,
//! and re-encode fidelity.

use resound::riff::{chunk_code, scan_for_chunk};
use resound::{
    encode_wav_to_disk, AudioData, DecoderRegistry, DitherMode, EncoderParams, Error, PcmFormat,
};
use std::io::Write;

/// Minimal mono/stereo PCM WAV around the given payload bytes.
fn synth_wav(channels: u16, sample_rate: u32, bits: u16, payload: &[u8]) -> Vec<u8> {
    let block_align = channels * bits / 8;
    let mut buf = Vec::new();
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&(36 + payload.len() as u32).to_le_bytes());
    buf.extend_from_slice(b"WAVE");
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes());
    buf.extend_from_slice(&1u16.to_le_bytes());
    buf.extend_from_slice(&channels.to_le_bytes());
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&(sample_rate * u32::from(block_align)).to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&bits.to_le_bytes());
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    buf.extend_from_slice(payload);
    buf
}

fn ramp_payload(count: i16) -> Vec<u8> {
    (0..count).flat_map(|s| (s * 300).to_le_bytes()).collect()
}

#[test]
fn load_wav_from_path_via_registry() {
    let payload = ramp_payload(100);
    let bytes = synth_wav(1, 44100, 16, &payload);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ramp.wav");
    std::fs::File::create(&path)
        .unwrap()
        .write_all(&bytes)
        .unwrap();

    let registry = DecoderRegistry::new().unwrap();
    let mut data = AudioData::default();
    registry.load(&mut data, &path).unwrap();

    assert_eq!(data.channel_count, 1);
    assert_eq!(data.sample_rate, 44100);
    assert_eq!(data.source_format, PcmFormat::I16);
    assert_eq!(data.samples.len(), 100);
    assert!((data.length_seconds - 100.0 / 44100.0).abs() < 1e-9);
}

#[test]
fn load_wav_from_buffer_with_and_without_hint() {
    let bytes = synth_wav(1, 22050, 16, &ramp_payload(64));
    let registry = DecoderRegistry::new().unwrap();

    let mut hinted = AudioData::default();
    registry
        .load_from_buffer(&mut hinted, &bytes, Some("wav"))
        .unwrap();

    let mut sniffed = AudioData::default();
    registry.load_from_buffer(&mut sniffed, &bytes, None).unwrap();

    assert_eq!(hinted.samples, sniffed.samples);
    assert_eq!(sniffed.sample_rate, 22050);
}

#[test]
fn decode_reencode_preserves_payload_bytes() {
    // A 16-bit payload decoded to float32 and written back at 16 bits must
    // reproduce the original data chunk byte for byte.
    let payload = ramp_payload(100);
    let bytes = synth_wav(1, 44100, 16, &payload);

    let registry = DecoderRegistry::new().unwrap();
    let mut data = AudioData::default();
    registry.load_from_buffer(&mut data, &bytes, None).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reencoded.wav");
    encode_wav_to_disk(
        EncoderParams::new(1, PcmFormat::I16, DitherMode::None),
        &data,
        &path,
    )
    .unwrap();

    let written = std::fs::read(&path).unwrap();
    let chunk = scan_for_chunk(&written, chunk_code(b'd', b'a', b't', b'a')).unwrap();
    assert_eq!(chunk.size as usize, payload.len());
    assert_eq!(&written[chunk.offset..chunk.offset + payload.len()], &payload[..]);
}

#[test]
fn mono_source_encoded_as_stereo_duplicates_channels() {
    let bytes = synth_wav(1, 44100, 16, &ramp_payload(50));

    let registry = DecoderRegistry::new().unwrap();
    let mut data = AudioData::default();
    registry.load_from_buffer(&mut data, &bytes, None).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stereo.wav");
    encode_wav_to_disk(
        EncoderParams::new(2, PcmFormat::I16, DitherMode::None),
        &data,
        &path,
    )
    .unwrap();

    let mut decoded = AudioData::default();
    registry.load(&mut decoded, &path).unwrap();
    assert_eq!(decoded.channel_count, 2);
    assert_eq!(decoded.samples.len(), 100);
    for i in 0..50 {
        assert_eq!(decoded.samples[2 * i], decoded.samples[2 * i + 1]);
        assert_eq!(decoded.samples[2 * i], data.samples[i]);
    }
}

#[test]
fn sniffing_identifies_untyped_buffers() {
    let wav = synth_wav(1, 44100, 16, &ramp_payload(64));
    assert_eq!(resound::registry::sniff_extension(&wav), Some("wav"));
    assert_eq!(resound::registry::sniff_extension(b"fLaC\x00\x00"), Some("flac"));
    assert_eq!(resound::registry::sniff_extension(&[0u8; 16]), None);
}

#[test]
fn unknown_extension_is_a_typed_error() {
    let registry = DecoderRegistry::new().unwrap();
    let mut data = AudioData::default();
    let err = registry.load(&mut data, "session.aiff").unwrap_err();
    assert!(matches!(err, Error::UnsupportedExtension(ext) if ext == "aiff"));
}

#[test]
fn sniffable_but_unregistered_format_is_rejected() {
    // WavPack magic is recognized by the sniffer but no decoder claims it
    let mut buf = b"wvpk".to_vec();
    buf.extend_from_slice(&[0u8; 60]);

    let registry = DecoderRegistry::new().unwrap();
    let mut data = AudioData::default();
    let err = registry.load_from_buffer(&mut data, &buf, None).unwrap_err();
    assert!(matches!(err, Error::UnsupportedExtension(ext) if ext == "wv"));
}
