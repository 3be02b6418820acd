//! IMA ADPCM block decoder
//!
//! Reconstructs 16-bit PCM from 4:1 compressed blocks. Each block carries a
//! 4-byte header per channel (initial predictor, step index, reserved zero
//! byte) followed by interleaved 4-byte data words, each word holding 8
//! nibble-coded samples for one channel. The per-channel carried state is
//! exactly `(predictor, step_index)` and is re-initialized from every
//! block's header.

use crate::error::{Error, Result};

/// Step-index adjustment per nibble value.
const INDEX_TABLE: [i32; 16] = [
    -1, -1, -1, -1, // +0 / +3 : - the step
    2, 4, 6, 8, //     +4 / +7 : + the step
    -1, -1, -1, -1, // -0 / -3 : - the step
    2, 4, 6, 8, //     -4 / -7 : + the step
];

/// Quantizer step sizes indexed by step index 0..=88.
const STEP_TABLE: [i32; 89] = [
    7, 8, 9, 10, 11, 12, 13, 14, 16, 17, 19, 21, 23, 25, 28, 31, 34, 37, 41, 45, 50, 55, 60, 66,
    73, 80, 88, 97, 107, 118, 130, 143, 157, 173, 190, 209, 230, 253, 279, 307, 337, 371, 408,
    449, 494, 544, 598, 658, 724, 796, 876, 963, 1060, 1166, 1282, 1411, 1552, 1707, 1878, 2066,
    2272, 2499, 2749, 3024, 3327, 3660, 4026, 4428, 4871, 5358, 5894, 6484, 7132, 7845, 8630,
    9493, 10442, 11487, 12635, 13899, 15289, 16818, 18500, 20350, 22385, 24623, 27086, 29794,
    32767,
];

/// Decode one 4-bit code against the carried `(predictor, step_index)` state
/// and emit the reconstructed sample.
fn decode_nibble(nibble: u8, predictor: &mut i32, step_index: &mut i32) -> i16 {
    let step = STEP_TABLE[*step_index as usize];

    let mut diff = step >> 3;
    if nibble & 4 != 0 {
        diff += step;
    }
    if nibble & 2 != 0 {
        diff += step >> 1;
    }
    if nibble & 1 != 0 {
        diff += step >> 2;
    }
    if nibble & 8 != 0 {
        diff = -diff;
    }

    *predictor = (*predictor + diff).clamp(-32768, 32767);
    *step_index = (*step_index + INDEX_TABLE[nibble as usize]).clamp(0, 88);

    *predictor as i16
}

/// Decode one compressed block into interleaved 16-bit PCM.
///
/// `block` is the full frame (`block_align` bytes); `out` receives
/// `(block.len() - 4 * channels) * 2` interleaved samples. A non-zero
/// reserved byte in any channel header means the input is corrupt and the
/// decode fails.
pub fn decode_ima_adpcm(block: &[u8], channels: usize, out: &mut [i16]) -> Result<()> {
    if channels == 0 {
        return Err(Error::format("adpcm block with zero channels"));
    }
    let header_bytes = 4 * channels;
    if block.len() < header_bytes {
        return Err(Error::format("adpcm block shorter than channel headers"));
    }
    let decoded = (block.len() - header_bytes) * 2;
    if out.len() < decoded {
        return Err(Error::format(format!(
            "adpcm output buffer too small: need {}, have {}",
            decoded,
            out.len()
        )));
    }

    for ch in 0..channels {
        let at = ch * 4;

        // Header: predictor low byte, predictor high byte, step index, reserved
        let mut predictor = i16::from_le_bytes([block[at], block[at + 1]]) as i32;
        let mut step_index = (block[at + 2] as i32).clamp(0, 88);

        if block[at + 3] != 0 {
            return Err(Error::decode("adpcm reserved header byte is non-zero"));
        }

        // First data word for this channel sits after all channel headers
        let mut byte_idx = header_bytes + at;
        let mut idx = ch;

        while byte_idx + 4 <= block.len() {
            for _ in 0..4 {
                let byte = block[byte_idx];
                out[idx] = decode_nibble(byte & 0xf, &mut predictor, &mut step_index);
                idx += channels;
                out[idx] = decode_nibble(byte >> 4, &mut predictor, &mut step_index);
                idx += channels;
                byte_idx += 1;
            }
            // Jump past the other channels' words to this channel's next word
            byte_idx += (channels - 1) * 4;
        }
    }

    Ok(())
}
