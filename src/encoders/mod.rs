//! Encoders writing canonical float32 audio back to disk

pub mod opus;
pub mod wav;

pub use self::opus::encode_opus_to_disk;
pub use self::wav::encode_wav_to_disk;

use crate::audio::PcmFormat;
use crate::util::DitherMode;

/// Caller-specified target layout for an encode.
#[derive(Debug, Clone, Copy)]
pub struct EncoderParams {
    /// Channel count of the written file. May differ from the source by a
    /// mono/stereo mix; any other mismatch is rejected.
    pub channel_count: u32,
    /// Sample format of the written payload.
    pub target_format: PcmFormat,
    /// Dither applied when requantizing to an integer format.
    pub dither: DitherMode,
}

impl EncoderParams {
    pub fn new(channel_count: u32, target_format: PcmFormat, dither: DitherMode) -> Self {
        EncoderParams {
            channel_count,
            target_format,
            dither,
        }
    }
}
