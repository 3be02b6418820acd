//! Decoder registry and dispatch
//!
//! Maps file extensions and magic-byte signatures to decoder
//! implementations. The table is built once at construction and is
//! read-only afterwards, so concurrent lookups from multiple threads are
//! safe; construction itself is not synchronized.

use crate::audio::AudioData;
use crate::decoders::{BaseDecoder, SymphoniaDecoder, WavDecoder};
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Extract the substring after the last `.` of a path string.
///
/// No case normalization is performed; callers that want case-insensitive
/// matching must lowercase the result themselves. A path without a dot
/// yields the empty string (which will simply fail table lookup).
pub fn parse_extension(path: &str) -> &str {
    match path.rfind('.') {
        Some(at) => &path[at + 1..],
        None => "",
    }
}

fn is_wav(header: &[u8]) -> bool {
    // RIFF....WAVE — the four size bytes are wildcards
    header.len() >= 12 && &header[0..4] == b"RIFF" && &header[8..12] == b"WAVE"
}

fn is_flac(header: &[u8]) -> bool {
    header.len() >= 4 && &header[0..4] == b"fLaC"
}

fn is_wavpack(header: &[u8]) -> bool {
    header.len() >= 4 && &header[0..4] == b"wvpk"
}

fn is_musepack(header: &[u8]) -> bool {
    (header.len() >= 4 && &header[0..4] == b"MPCK") || (header.len() >= 3 && &header[0..3] == b"MP+")
}

fn is_ogg(header: &[u8]) -> bool {
    header.len() >= 4 && &header[0..4] == b"OggS"
}

fn is_mp3(header: &[u8]) -> bool {
    // ID3v2 tag, or a bare frame sync
    (header.len() >= 3 && &header[0..3] == b"ID3")
        || (header.len() >= 2 && header[0] == 0xFF && (header[1] & 0xE0) == 0xE0)
}

fn contains(window: &[u8], needle: &[u8]) -> bool {
    window.windows(needle.len()).any(|w| w == needle)
}

/// Identify a buffer's format from its magic bytes.
///
/// The match order is an explicit precedence list, strongest signature
/// first; the bare MP3 frame sync comes last because a single 0xFF byte is
/// the weakest magic in the table. First match wins. Ogg streams are
/// disambiguated into `opus` vs `ogg` (Vorbis) by searching the first 64
/// bytes for the codec's identification string.
pub fn sniff_extension(buffer: &[u8]) -> Option<&'static str> {
    if is_wav(buffer) {
        Some("wav")
    } else if is_flac(buffer) {
        Some("flac")
    } else if is_wavpack(buffer) {
        Some("wv")
    } else if is_musepack(buffer) {
        Some("mpc")
    } else if is_ogg(buffer) {
        let window = &buffer[..buffer.len().min(64)];
        if contains(window, b"OpusHead") {
            Some("opus")
        } else if contains(window, b"vorbis") {
            Some("ogg")
        } else {
            Some("ogg")
        }
    } else if is_mp3(buffer) {
        Some("mp3")
    } else {
        None
    }
}

/// Registry of decoders keyed by lowercase file extension.
///
/// Built once, immutable thereafter. Each extension maps to exactly one
/// decoder; a duplicate claim is a construction-time error rather than a
/// silent overwrite, so two decoders can never shadow each other.
pub struct DecoderRegistry {
    table: HashMap<&'static str, Arc<dyn BaseDecoder>>,
}

impl std::fmt::Debug for DecoderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecoderRegistry").finish_non_exhaustive()
    }
}

impl DecoderRegistry {
    /// Build the default registry: the WAV parser plus the symphonia
    /// collaborator for compressed formats.
    pub fn new() -> Result<Self> {
        Self::with_decoders(vec![Arc::new(WavDecoder), Arc::new(SymphoniaDecoder)])
    }

    /// Build a registry from an explicit decoder set.
    pub fn with_decoders(decoders: Vec<Arc<dyn BaseDecoder>>) -> Result<Self> {
        let mut table: HashMap<&'static str, Arc<dyn BaseDecoder>> = HashMap::new();
        for decoder in decoders {
            for ext in decoder.supported_extensions() {
                if table.insert(*ext, decoder.clone()).is_some() {
                    return Err(Error::DuplicateExtension((*ext).to_string()));
                }
            }
        }
        Ok(DecoderRegistry { table })
    }

    /// Whether a decoder is registered for the path's extension.
    pub fn is_supported(&self, path: &str) -> bool {
        self.table.contains_key(parse_extension(path))
    }

    fn decoder_for(&self, extension: &str) -> Result<&Arc<dyn BaseDecoder>> {
        if self.table.is_empty() {
            return Err(Error::NoDecodersRegistered);
        }
        self.table
            .get(extension)
            .ok_or_else(|| Error::UnsupportedExtension(extension.to_string()))
    }

    /// Decode the file at `path` into the caller-owned record.
    ///
    /// The decoder is resolved by file extension. Decoder-internal failures
    /// are logged with the failing path and propagated unchanged, so the
    /// caller always sees a definitive failure rather than a corrupted
    /// success.
    pub fn load(&self, data: &mut AudioData, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let path_str = path.to_string_lossy();
        let extension = parse_extension(&path_str).to_string();

        let decoder = self.decoder_for(&extension)?;
        tracing::debug!(path = %path.display(), decoder = decoder.name(), "loading audio file");

        decoder.load_from_path(data, path).map_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "decode failed");
            e
        })
    }

    /// Decode raw file bytes into the caller-owned record.
    ///
    /// When `extension` is `None`, the format is sniffed from the buffer's
    /// magic bytes.
    pub fn load_from_buffer(
        &self,
        data: &mut AudioData,
        buffer: &[u8],
        extension: Option<&str>,
    ) -> Result<()> {
        let extension = match extension {
            Some(ext) => ext.to_string(),
            None => sniff_extension(buffer)
                .ok_or_else(|| Error::UnsupportedExtension("<unrecognized magic>".to_string()))?
                .to_string(),
        };

        let decoder = self.decoder_for(&extension)?;
        tracing::debug!(%extension, decoder = decoder.name(), "loading audio buffer");

        decoder.load_from_buffer(data, buffer).map_err(|e| {
            tracing::error!(%extension, error = %e, "decode failed");
            e
        })
    }
}
