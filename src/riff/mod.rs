//! RIFF chunk utilities
//!
//! A RIFF-family file is a sequence of tagged, length-prefixed chunks. The
//! scanner here does a linear sweep of a whole byte buffer for a FourCC,
//! stepping two bytes at a time the way chunk codes are aligned in
//! well-formed files. Every call restarts from byte 0; files are scanned at
//! most a handful of times per decode, so no index is cached.

pub mod adpcm;

use byteorder::{ByteOrder, LittleEndian};

/// Location of a chunk body inside a scanned buffer. Ephemeral: produced and
/// consumed within a single parse pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkLocation {
    /// Byte offset of the first body byte, 8 bytes past the chunk code
    pub offset: usize,
    /// Declared chunk size in bytes
    pub size: u32,
}

/// Pack a FourCC into the little-endian u32 the scanner compares against.
pub fn chunk_code(a: u8, b: u8, c: u8, d: u8) -> u32 {
    u32::from_le_bytes([a, b, c, d])
}

/// Linearly scan `buffer` for the first chunk tagged `code`.
///
/// Returns the chunk body location, or `None` when no match exists before
/// the end of the buffer. An explicit `Option` is used rather than a
/// `{0, 0}` sentinel so that a zero-sized chunk at offset 0 stays
/// distinguishable from "not found". Worst case O(n) over the buffer.
pub fn scan_for_chunk(buffer: &[u8], code: u32) -> Option<ChunkLocation> {
    let words = buffer.len() / 2;
    for i in 0..words {
        let at = i * 2;
        if at + 8 > buffer.len() {
            break;
        }
        if LittleEndian::read_u32(&buffer[at..]) == code {
            let size = LittleEndian::read_u32(&buffer[at + 4..]);
            return Some(ChunkLocation {
                offset: at + 8,
                size,
            });
        }
    }
    None
}
