//! Common utilities

pub mod convert;
pub mod endian;

pub use convert::{
    float32_to_pcm, i16_to_float32, i32_to_float32, mono_to_stereo, pcm_to_float32,
    stereo_to_mono, DitherMode,
};
pub use endian::{pack_i24, pack_u16, pack_u8, swap16, swap24, swap32, swap64, unpack_i24};
