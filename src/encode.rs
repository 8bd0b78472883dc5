//! Image-directory encoder.
//!
//! [`FrameEncoder`] enumerates a directory with
//! [`image_files`](crate::image_files), decodes each image and writes it to a
//! [`VideoStream`] in sorted order. Images are decoded one at a time; only
//! the images up to the reference frame are held in memory before the stream
//! can be opened.
//!
//! # Example
//!
//! ```no_run
//! use frameroll::{EncodeOptions, FrameEncoder, SizeMismatchPolicy};
//!
//! let report = FrameEncoder::new(
//!     EncodeOptions::new()
//!         .with_fps(10.0)
//!         .with_size_mismatch(SizeMismatchPolicy::Resize),
//! )
//! .encode("shots")?;
//! println!("{} frames -> {}", report.frames, report.output.display());
//! # Ok::<(), frameroll::FramerollError>(())
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use image::DynamicImage;

use crate::config::EncodeOptions;
use crate::enumerate::image_files;
use crate::error::FramerollError;
use crate::fourcc::FourCc;
use crate::progress::ProgressTracker;
use crate::stream::VideoStream;
use crate::utilities::frame_rate_to_rational;

/// Outcome of a successful encode.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct EncodeReport {
    /// Path the video was written to.
    pub output: PathBuf,
    /// Number of frames written.
    pub frames: u64,
    /// Frame width in pixels, taken from the reference image.
    pub width: u32,
    /// Frame height in pixels, taken from the reference image.
    pub height: u32,
    /// Frame rate the stream was opened with.
    pub fps: f64,
    /// Codec tag of the video stream.
    pub fourcc: FourCc,
    /// Wall-clock time spent decoding and encoding.
    pub elapsed: Duration,
}

/// Encodes every image in a directory into one video.
#[derive(Debug, Clone, Default)]
pub struct FrameEncoder {
    options: EncodeOptions,
}

impl FrameEncoder {
    pub fn new(options: EncodeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &EncodeOptions {
        &self.options
    }

    /// Encode the images in `directory` and return what was written.
    ///
    /// The output goes to the configured path, or `<directory>/video.mp4`.
    /// An existing file there is overwritten.
    ///
    /// # Errors
    ///
    /// - [`FramerollError::InvalidFrameRate`] before any I/O if the frame rate
    ///   is not finite and positive, or has no close rational approximation.
    /// - [`FramerollError::DirectoryRead`] if the directory cannot be listed.
    /// - [`FramerollError::NotEnoughImages`] if the directory holds fewer
    ///   images than the reference frame index needs.
    /// - [`FramerollError::ImageDecode`] for an image that fails to decode.
    /// - [`FramerollError::FrameSizeMismatch`] for an image whose size
    ///   differs from the reference image, unless resizing is enabled.
    /// - [`FramerollError::Cancelled`] if the cancellation token fires.
    /// - Stream errors from [`VideoStream`].
    ///
    /// On any error after the stream was opened the partial output is
    /// removed, unless `keep_partial_output` is set.
    pub fn encode<P: AsRef<Path>>(&self, directory: P) -> Result<EncodeReport, FramerollError> {
        let directory = directory.as_ref();
        let options = &self.options;
        frame_rate_to_rational(options.fps)?;

        let files = image_files(directory)?;
        let not_enough = |required| FramerollError::NotEnoughImages {
            directory: directory.to_path_buf(),
            found: files.len(),
            required,
        };
        let required = options
            .reference_frame
            .checked_add(1)
            .ok_or_else(|| not_enough(usize::MAX))?;
        if files.len() < required {
            return Err(not_enough(required));
        }

        let output = options.resolve_output(directory);
        log::info!(
            "Encoding {} image(s) from {} to {} ({} fps)",
            files.len(),
            directory.display(),
            output.display(),
            options.fps,
        );

        let mut tracker = ProgressTracker::new(
            options.progress.clone(),
            Some(files.len() as u64),
            options.batch_size,
        );

        let (leading, rest) = files.split_at(required);
        let mut buffered = Vec::with_capacity(required);
        for path in leading {
            self.check_cancelled()?;
            buffered.push(decode(path)?);
        }
        let (width, height) = match buffered.get(options.reference_frame) {
            Some(reference) => (reference.width(), reference.height()),
            None => return Err(not_enough(required)),
        };

        let mut stream = VideoStream::create_with_bitrate(
            &output,
            FourCc::MP4V,
            options.fps,
            width,
            height,
            options.bitrate,
        )?
        .size_mismatch(options.size_mismatch)
        .keep_partial_output(options.keep_partial_output);

        for (path, image) in leading.iter().zip(buffered) {
            self.check_cancelled()?;
            stream.write(path, &image)?;
            tracker.advance(path);
        }

        for path in rest {
            self.check_cancelled()?;
            let image = decode(path)?;
            stream.write(path, &image)?;
            tracker.advance(path);
        }

        let frames = stream.finish()?;
        tracker.finish();

        let report = EncodeReport {
            output,
            frames,
            width,
            height,
            fps: options.fps,
            fourcc: FourCc::MP4V,
            elapsed: tracker.elapsed(),
        };
        log::info!(
            "Wrote {} frame(s) ({}x{}) to {} in {:.2?}",
            report.frames,
            report.width,
            report.height,
            report.output.display(),
            report.elapsed,
        );
        Ok(report)
    }

    fn check_cancelled(&self) -> Result<(), FramerollError> {
        if self.options.is_cancelled() {
            log::info!("Encode cancelled");
            return Err(FramerollError::Cancelled);
        }
        Ok(())
    }
}

/// Encode the images in `directory` at `fps` and return the output path.
///
/// With `output` set to `None` the video is written to
/// `<directory>/video.mp4`; otherwise `output` is used verbatim. The frame
/// size comes from the first image and every image must share it.
///
/// # Example
///
/// ```no_run
/// let video = frameroll::make_movie("shots", None, 10.0)?;
/// assert!(video.ends_with("video.mp4"));
/// # Ok::<(), frameroll::FramerollError>(())
/// ```
pub fn make_movie<P: AsRef<Path>>(
    directory: P,
    output: Option<&Path>,
    fps: f64,
) -> Result<PathBuf, FramerollError> {
    let mut options = EncodeOptions::new().with_fps(fps);
    if let Some(output) = output {
        options = options.with_output(output);
    }
    FrameEncoder::new(options)
        .encode(directory)
        .map(|report| report.output)
}

fn decode(path: &Path) -> Result<DynamicImage, FramerollError> {
    image::open(path).map_err(|source| FramerollError::ImageDecode {
        path: path.to_path_buf(),
        source,
    })
}
