//! Error types for the `frameroll` crate.
//!
//! This module defines [`FramerollError`], the unified error type returned by
//! all fallible operations in the crate. Errors carry the path, frame index or
//! frame size involved so that a failure deep inside an encode can be traced
//! back to the image that caused it.

use std::{io::Error as IoError, path::PathBuf};

use image::ImageError;
use thiserror::Error;

/// The unified error type for all `frameroll` operations.
///
/// Every public method that can fail returns `Result<T, FramerollError>`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FramerollError {
    /// The input directory could not be listed.
    #[error("Failed to read directory {path}: {source}")]
    DirectoryRead {
        /// Directory (or entry inside it) that could not be read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: IoError,
    },

    /// An enumerated image could not be decoded.
    #[error("Failed to decode image {path}: {source}")]
    ImageDecode {
        /// Image file that failed to decode.
        path: PathBuf,
        /// Decoder error reported by the `image` crate.
        #[source]
        source: ImageError,
    },

    /// The directory holds fewer images than the reference frame requires.
    #[error(
        "Not enough images in {directory}: found {found}, need at least {required} \
         to read the frame size"
    )]
    NotEnoughImages {
        /// Directory that was enumerated.
        directory: PathBuf,
        /// Number of images found.
        found: usize,
        /// Number of images needed to reach the reference frame.
        required: usize,
    },

    /// A frame does not match the size of the output stream.
    #[error("Frame {path} is {actual:?} but the video stream is {expected:?} (width, height)")]
    FrameSizeMismatch {
        /// Image whose size differs.
        path: PathBuf,
        /// Stream frame size as `(width, height)`.
        expected: (u32, u32),
        /// Decoded frame size as `(width, height)`.
        actual: (u32, u32),
    },

    /// The frame rate is zero, negative, or not finite.
    #[error("Invalid frame rate: {0} (must be a finite value greater than zero)")]
    InvalidFrameRate(f64),

    /// The fourcc does not name a codec this crate can encode.
    #[error("Unsupported codec tag: {0}")]
    UnsupportedCodec(String),

    /// The video encoder could not be configured or failed while encoding.
    #[error("Video encoding error: {0}")]
    VideoEncodeError(String),

    /// The output container could not be opened or written.
    #[error("Video write error: {0}")]
    VideoWriteError(String),

    /// A video file could not be opened for probing.
    #[error("Failed to open video file at {path}: {reason}")]
    FileOpen {
        /// Path passed to [`crate::VideoProbe::probe`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The probed file does not contain a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// The operation was cancelled via a [`CancellationToken`](crate::CancellationToken).
    #[error("Operation cancelled")]
    Cancelled,
}
