//! Byte-swap and multi-byte packing helpers
//!
//! Buffer reads and writes elsewhere in the crate go through `byteorder`
//! with an explicit byte order; the helpers here cover the remaining cases
//! where values are assembled from individual bytes, notably the
//! sign-extending 24-bit pack used by the PCM conversion engine.

/// Reverse the byte order of a 16-bit value.
pub fn swap16(value: u16) -> u16 {
    value.swap_bytes()
}

/// Reverse the byte order of the low 24 bits; the result is masked to 24 bits.
pub fn swap24(value: u32) -> u32 {
    (((value & 0x00ff_0000) >> 16) | (value & 0x0000_ff00) | ((value & 0x0000_00ff) << 16))
        & 0x00ff_ffff
}

/// Reverse the byte order of a 32-bit value.
pub fn swap32(value: u32) -> u32 {
    value.swap_bytes()
}

/// Reverse the byte order of a 64-bit value.
pub fn swap64(value: u64) -> u64 {
    value.swap_bytes()
}

/// Combine two bytes into a 16-bit value, `a` in the low byte.
pub fn pack_u8(a: u8, b: u8) -> u16 {
    u16::from_le_bytes([a, b])
}

/// Combine two 16-bit values into a 32-bit value, `a` in the low half.
pub fn pack_u16(a: u16, b: u16) -> u32 {
    (u32::from(b) << 16) | u32::from(a)
}

/// Combine three bytes into a signed 32-bit value, `a` lowest.
///
/// Bit 23 is sign-extended into bits 24..=31 so packed 24-bit samples decode
/// as signed integers.
pub fn pack_i24(a: u8, b: u8, c: u8) -> i32 {
    let x = (i32::from(c) << 16) | (i32::from(b) << 8) | i32::from(a);
    if x & 0x0080_0000 != 0 {
        x | !0x00ff_ffff
    } else {
        x
    }
}

/// Exact inverse of [`pack_i24`]: split a sign-extended 24-bit value back
/// into its three source bytes, lowest first.
pub fn unpack_i24(x: i32) -> (u8, u8, u8) {
    let bytes = x.to_le_bytes();
    (bytes[0], bytes[1], bytes[2])
}
