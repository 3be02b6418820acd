//! Decoder implementations and the capability contract they share

pub mod symphonia;
pub mod wav;

pub use self::symphonia::SymphoniaDecoder;
pub use self::wav::WavDecoder;

use crate::audio::AudioData;
use crate::error::{Error, Result};
use std::io::Read;
use std::path::Path;

/// Capability contract every decoder implements.
///
/// A decoder fully populates the caller-owned record in one call and keeps
/// no reference to it afterwards. Decoders that support only one loading
/// direction return the matching capability error for the other.
pub trait BaseDecoder: Send + Sync {
    /// Short name used in capability errors and logs.
    fn name(&self) -> &'static str;

    /// Decode the file at `path` into `data`.
    fn load_from_path(&self, data: &mut AudioData, path: &Path) -> Result<()>;

    /// Decode the raw file bytes in `buffer` into `data`.
    fn load_from_buffer(&self, data: &mut AudioData, buffer: &[u8]) -> Result<()>;

    /// Lowercase file extensions this decoder claims.
    fn supported_extensions(&self) -> &'static [&'static str];
}

/// Read a whole audio file into memory.
///
/// The handle is scoped to this call. Zero-byte reads and files under 64
/// bytes (too small to hold any supported header) are rejected.
pub fn read_audio_file(path: &Path) -> Result<Vec<u8>> {
    let mut file = std::fs::File::open(path)?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)?;

    if buffer.len() < 64 {
        return Err(Error::invalid_input(format!(
            "file too small to be an audio file: {} bytes",
            buffer.len()
        )));
    }

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_rejects_missing_file() {
        let err = read_audio_file(Path::new("/nonexistent/file.wav")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_read_rejects_tiny_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"RIFF").unwrap();
        let err = read_audio_file(f.path()).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
