//! Four-character codec tags.

use std::fmt::{Display, Formatter, Result as FmtResult};

use ffmpeg_next::codec::Id;

use crate::error::FramerollError;

/// A four-character codec identifier such as `mp4v`.
///
/// Output videos are always written with [`FourCc::MP4V`]; the type exists so
/// the tag travels through logs, reports and errors in its familiar form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FourCc([u8; 4]);

impl FourCc {
    /// MPEG-4 Part 2 video, the tag every output stream uses.
    pub const MP4V: FourCc = FourCc(*b"mp4v");

    /// Build a tag from four ASCII bytes.
    pub const fn new(code: [u8; 4]) -> Self {
        FourCc(code)
    }

    /// Resolve the FFmpeg codec that encodes this tag.
    pub(crate) fn codec_id(self) -> Result<Id, FramerollError> {
        match &self.0 {
            b"mp4v" | b"MP4V" => Ok(Id::MPEG4),
            _ => Err(FramerollError::UnsupportedCodec(self.to_string())),
        }
    }
}

impl Display for FourCc {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for &byte in &self.0 {
            if byte.is_ascii_graphic() || byte == b' ' {
                write!(f, "{}", byte as char)?;
            } else {
                write!(f, "\\x{byte:02x}")?;
            }
        }
        Ok(())
    }
}
