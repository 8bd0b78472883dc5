//! Lightweight video probing.
//!
//! [`VideoProbe`] opens a video, reads its best video stream and counts its
//! packets, then closes the demuxer. It is how the tests and the `probe`
//! command check what an encode produced.

use std::path::Path;
use std::time::Duration;

use ffmpeg_next::codec::context::Context as CodecContext;
use ffmpeg_next::media::Type;

use crate::error::FramerollError;
use crate::utilities::rational_to_f64;

/// Summary of a video file's main video stream.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct VideoSummary {
    /// Container format name (e.g. `"mov,mp4,m4a,3gp,3g2,mj2"`).
    pub format: String,
    /// Codec name (e.g. `"mpeg4"`).
    pub codec: String,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Average frames per second.
    pub frames_per_second: f64,
    /// Number of video frames, counted from the stream's packets.
    pub frame_count: u64,
    /// Container duration.
    pub duration: Duration,
}

/// Video file probe.
pub struct VideoProbe;

impl VideoProbe {
    /// Probe a video file.
    ///
    /// # Errors
    ///
    /// - [`FramerollError::FileOpen`] if the file cannot be opened or parsed.
    /// - [`FramerollError::NoVideoStream`] if it has no video stream.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use frameroll::VideoProbe;
    ///
    /// let summary = VideoProbe::probe("shots/video.mp4")?;
    /// println!("{} frames at {} fps", summary.frame_count, summary.frames_per_second);
    /// # Ok::<(), frameroll::FramerollError>(())
    /// ```
    pub fn probe<P: AsRef<Path>>(path: P) -> Result<VideoSummary, FramerollError> {
        let path = path.as_ref();
        let open_error = |reason: String| FramerollError::FileOpen {
            path: path.to_path_buf(),
            reason,
        };

        crate::ffmpeg::init()?;
        let mut input = ffmpeg_next::format::input(&path).map_err(|e| open_error(e.to_string()))?;

        let (stream_index, width, height, codec, frames_per_second) = {
            let stream = input
                .streams()
                .best(Type::Video)
                .ok_or(FramerollError::NoVideoStream)?;
            let decoder = CodecContext::from_parameters(stream.parameters())
                .and_then(|context| context.decoder().video())
                .map_err(|e| open_error(format!("cannot read video codec parameters: {e}")))?;
            let codec = decoder
                .codec()
                .map(|codec| codec.name().to_string())
                .unwrap_or_else(|| "unknown".to_string());

            let mut frames_per_second = rational_to_f64(stream.avg_frame_rate());
            if frames_per_second == 0.0 {
                frames_per_second = rational_to_f64(stream.rate());
            }
            (
                stream.index(),
                decoder.width(),
                decoder.height(),
                codec,
                frames_per_second,
            )
        };

        let format = input.format().name().to_string();
        let duration = u64::try_from(input.duration())
            .map(Duration::from_micros)
            .unwrap_or(Duration::ZERO);

        let frame_count = input
            .packets()
            .filter(|(stream, _)| stream.index() == stream_index)
            .count() as u64;

        log::debug!(
            "Probed {}: {width}x{height} {codec}, {frame_count} frame(s)",
            path.display()
        );

        Ok(VideoSummary {
            format,
            codec,
            width,
            height,
            frames_per_second,
            frame_count,
            duration,
        })
    }
}
