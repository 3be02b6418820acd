//! resound - An audio file ingestion library written in Rust
//!
//! resound turns audio files of mixed formats into one canonical in-memory
//! representation: interleaved float32 samples plus the stream's shape
//! (channel count, sample rate, duration, original precision). Decoding is
//! dispatched through a registry keyed by file extension, with magic-byte
//! sniffing for untyped buffers.
//!
//! # Architecture
//!
//! resound is organized into several key modules:
//!
//! - `registry`: Extension and magic-byte dispatch to decoders
//! - `decoders`: The decoder contract, the native WAV parser, and the
//!   symphonia-backed decoder for compressed formats
//! - `encoders`: WAV and Ogg Opus writers
//! - `riff`: RIFF chunk scanning and IMA ADPCM block decoding
//! - `audio`: The canonical sample record and format descriptors
//! - `util`: Sample format conversion, dithering, and endian helpers
//!
//! # Example
//!
//! ```no_run
//! use resound::{AudioData, DecoderRegistry};
//!
//! let registry = DecoderRegistry::new()?;
//! let mut data = AudioData::default();
//! registry.load(&mut data, "track.flac")?;
//! println!("{} Hz, {} channels, {:.2} s", data.sample_rate, data.channel_count, data.length_seconds);
//! # Ok::<(), resound::Error>(())
//! ```

pub mod audio;
pub mod decoders;
pub mod encoders;
pub mod error;
pub mod registry;
pub mod riff;
pub mod util;

pub use audio::{AudioData, PcmFormat};
pub use decoders::BaseDecoder;
pub use encoders::{encode_opus_to_disk, encode_wav_to_disk, EncoderParams};
pub use error::{Error, Result};
pub use registry::DecoderRegistry;
pub use util::DitherMode;

/// resound version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
