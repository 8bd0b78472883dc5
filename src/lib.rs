//! # frameroll
//!
//! Roll a directory of still images into an MP4 video.
//!
//! `frameroll` lists the images in a directory (by file extension), sorts
//! them by path, decodes each one with the [`image`] crate and encodes them
//! as consecutive frames of an MPEG-4 Part 2 (`mp4v`) video through FFmpeg,
//! via the [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate.
//!
//! ## Quick Start
//!
//! ### Encode a directory
//!
//! ```no_run
//! // Writes shots/video.mp4 at 10 fps.
//! let video = frameroll::make_movie("shots", None, 10.0)?;
//! println!("wrote {}", video.display());
//! # Ok::<(), frameroll::FramerollError>(())
//! ```
//!
//! ### Configure the encode
//!
//! ```no_run
//! use frameroll::{EncodeOptions, FrameEncoder, SizeMismatchPolicy};
//!
//! let options = EncodeOptions::new()
//!     .with_fps(24.0)
//!     .with_output("timelapse.mp4")
//!     .with_size_mismatch(SizeMismatchPolicy::Resize);
//! let report = FrameEncoder::new(options).encode("shots")?;
//! println!("{} frames, {}x{}", report.frames, report.width, report.height);
//! # Ok::<(), frameroll::FramerollError>(())
//! ```
//!
//! ### List the images that would be used
//!
//! ```no_run
//! for path in frameroll::image_files("shots")? {
//!     println!("{}", path.display());
//! }
//! # Ok::<(), frameroll::FramerollError>(())
//! ```
//!
//! ## Features
//!
//! - **Extension-based filtering** — files whose extension maps to an
//!   `image/*` MIME type, sorted by path
//! - **Streaming encode** — images are decoded and written one at a time
//! - **Fixed frame size** — taken from the first image (or a chosen
//!   reference image); other sizes are rejected or resized
//! - **Clean failure** — a failed encode removes its half-written output
//! - **Progress & cancellation** — callbacks and a `CancellationToken`
//! - **Probing** — frame count, size and rate of a written video
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod config;
pub mod encode;
pub mod enumerate;
pub mod error;
pub mod ffmpeg;
pub mod fourcc;
pub mod mime;
pub mod probe;
pub mod progress;
pub mod stream;
mod utilities;

pub use config::{DEFAULT_FRAME_RATE, DEFAULT_OUTPUT_NAME, EncodeOptions, SizeMismatchPolicy};
pub use encode::{EncodeReport, FrameEncoder, make_movie};
pub use enumerate::image_files;
pub use error::FramerollError;
pub use ffmpeg::{FfmpegLogLevel, get_ffmpeg_log_level, set_ffmpeg_log_level};
pub use fourcc::FourCc;
pub use mime::{guess_mime_type, is_image};
pub use probe::{VideoProbe, VideoSummary};
pub use progress::{CancellationToken, ProgressCallback, ProgressInfo};
pub use stream::VideoStream;
