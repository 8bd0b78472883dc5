//! Encode configuration.
//!
//! [`EncodeOptions`] is a builder that carries the frame rate, output path,
//! frame-size rules, progress callback and cancellation token through an
//! encode without polluting every function signature.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use frameroll::{CancellationToken, EncodeOptions, ProgressCallback, ProgressInfo};
//!
//! struct LogProgress;
//! impl ProgressCallback for LogProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         println!("{} frames written", info.current);
//!     }
//! }
//!
//! let token = CancellationToken::new();
//! let options = EncodeOptions::new()
//!     .with_fps(12.0)
//!     .with_output("timelapse.mp4")
//!     .with_progress(Arc::new(LogProgress))
//!     .with_cancellation(token.clone())
//!     .with_batch_size(10);
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::progress::{CancellationToken, NoOpProgress, ProgressCallback};

/// Frame rate used when none is given.
pub const DEFAULT_FRAME_RATE: f64 = 25.0;

/// File stem of the output written inside the input directory when no output
/// path is given. The `.mp4` extension is appended.
pub const DEFAULT_OUTPUT_NAME: &str = "video";

/// What to do with a frame whose size differs from the stream's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeMismatchPolicy {
    /// Fail with [`FramerollError::FrameSizeMismatch`](crate::FramerollError::FrameSizeMismatch).
    #[default]
    Error,
    /// Resize the frame to the stream size (Lanczos3), ignoring aspect ratio.
    Resize,
}

/// Configuration for [`FrameEncoder`](crate::FrameEncoder).
///
/// A default-constructed value encodes at 25 fps into `<dir>/video.mp4`,
/// takes the frame size from the first image and rejects images of any
/// other size.
#[derive(Clone)]
pub struct EncodeOptions {
    pub(crate) fps: f64,
    pub(crate) output: Option<PathBuf>,
    pub(crate) reference_frame: usize,
    pub(crate) size_mismatch: SizeMismatchPolicy,
    pub(crate) bitrate: Option<usize>,
    pub(crate) keep_partial_output: bool,
    pub(crate) progress: Arc<dyn ProgressCallback>,
    pub(crate) cancellation: Option<CancellationToken>,
    pub(crate) batch_size: u64,
}

impl Debug for EncodeOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("EncodeOptions")
            .field("fps", &self.fps)
            .field("output", &self.output)
            .field("reference_frame", &self.reference_frame)
            .field("size_mismatch", &self.size_mismatch)
            .field("bitrate", &self.bitrate)
            .field("keep_partial_output", &self.keep_partial_output)
            .field("has_cancellation", &self.cancellation.is_some())
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl EncodeOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self {
            fps: DEFAULT_FRAME_RATE,
            output: None,
            reference_frame: 0,
            size_mismatch: SizeMismatchPolicy::Error,
            bitrate: None,
            keep_partial_output: false,
            progress: Arc::new(NoOpProgress),
            cancellation: None,
            batch_size: 1,
        }
    }

    /// Set the output frame rate in frames per second.
    ///
    /// Must be finite and greater than zero; checked when the encode starts.
    #[must_use]
    pub fn with_fps(mut self, fps: f64) -> Self {
        self.fps = fps;
        self
    }

    /// Write the video to `path` instead of `<dir>/video.mp4`.
    ///
    /// The path is used verbatim; the container is chosen from its extension.
    #[must_use]
    pub fn with_output<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output = Some(path.into());
        self
    }

    /// Take the output frame size from the image at `index` (in sorted
    /// order) instead of the first one.
    ///
    /// The directory must then hold at least `index + 1` images.
    #[must_use]
    pub fn with_reference_frame(mut self, index: usize) -> Self {
        self.reference_frame = index;
        self
    }

    /// Choose how frames of a different size are handled.
    #[must_use]
    pub fn with_size_mismatch(mut self, policy: SizeMismatchPolicy) -> Self {
        self.size_mismatch = policy;
        self
    }

    /// Set the target bitrate in bits per second. Unset uses the encoder
    /// default.
    #[must_use]
    pub fn with_bitrate(mut self, bitrate: usize) -> Self {
        self.bitrate = Some(bitrate);
        self
    }

    /// Keep a half-written output file when the encode fails instead of
    /// deleting it.
    #[must_use]
    pub fn with_keep_partial_output(mut self, keep: bool) -> Self {
        self.keep_partial_output = keep;
        self
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Attach a cancellation token.
    ///
    /// When the token is cancelled the encode stops before the next frame
    /// and returns [`FramerollError::Cancelled`](crate::FramerollError::Cancelled).
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Set how often the progress callback fires, clamped to at least 1.
    #[must_use]
    pub fn with_batch_size(mut self, size: u64) -> Self {
        self.batch_size = size.max(1);
        self
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    pub fn reference_frame(&self) -> usize {
        self.reference_frame
    }

    pub fn size_mismatch(&self) -> SizeMismatchPolicy {
        self.size_mismatch
    }

    /// Resolve where the video for `directory` is written.
    pub fn resolve_output(&self, directory: &Path) -> PathBuf {
        match &self.output {
            Some(path) => path.clone(),
            None => directory.join(format!("{DEFAULT_OUTPUT_NAME}.mp4")),
        }
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
    }
}
