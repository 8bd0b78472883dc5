//! Scoped video output stream.
//!
//! [`VideoStream`] owns the FFmpeg output context, the opened encoder and the
//! RGB → YUV scaler for one output file. Frames go in with
//! [`write`](VideoStream::write); [`finish`](VideoStream::finish) flushes the
//! encoder and writes the container trailer.
//!
//! A stream dropped without `finish` (an error or panic part-way through an
//! encode) releases its FFmpeg handles and deletes the half-written file, or
//! leaves it in place with a warning when
//! [`keep_partial_output`](VideoStream::keep_partial_output) is set.

use std::fs;
use std::path::{Path, PathBuf};

use ffmpeg_next::codec::Codec;
use ffmpeg_next::codec::context::Context as CodecContext;
use ffmpeg_next::codec::encoder::video::Encoder as OpenedVideoEncoder;
use ffmpeg_next::format::context::Output;
use ffmpeg_next::format::{Flags as FormatFlags, Pixel};
use ffmpeg_next::frame::Video as VideoFrame;
use ffmpeg_next::software::scaling::{Context as ScalingContext, Flags as ScalingFlags};
use ffmpeg_next::{Packet, Rational};
use image::DynamicImage;
use image::imageops::FilterType;

use crate::config::SizeMismatchPolicy;
use crate::error::FramerollError;
use crate::fourcc::FourCc;
use crate::utilities::{even_dimension, frame_rate_to_rational, rgb_image_to_frame};

/// Pixel format handed to the encoder.
const ENCODER_PIXEL_FORMAT: Pixel = Pixel::YUV420P;

/// An open video file accepting frames of one fixed size.
///
/// # Example
///
/// ```no_run
/// use frameroll::{FourCc, VideoStream};
///
/// let image = image::open("shots/0001.png")?;
/// let mut stream = VideoStream::create("out.mp4", FourCc::MP4V, 25.0, image.width(), image.height())?;
/// stream.write("shots/0001.png", &image)?;
/// let frames = stream.finish()?;
/// assert_eq!(frames, 1);
/// # Ok::<(), frameroll::FramerollError>(())
/// ```
pub struct VideoStream {
    output: Option<Output>,
    encoder: OpenedVideoEncoder,
    scaler: ScalingContext,
    stream_index: usize,
    encoder_time_base: Rational,
    stream_time_base: Rational,
    path: PathBuf,
    frame_size: (u32, u32),
    size_mismatch: SizeMismatchPolicy,
    keep_partial_output: bool,
    frames_written: u64,
    finished: bool,
}

impl VideoStream {
    /// Open `path` for writing frames of `width` × `height` at `fps`.
    ///
    /// The container is chosen from the file extension. An existing file is
    /// overwritten. Odd dimensions are rounded down to even for the encoded
    /// picture; frames are still matched against `width` × `height`.
    ///
    /// # Errors
    ///
    /// - [`FramerollError::InvalidFrameRate`] if `fps` is not finite and
    ///   positive, or cannot be expressed as a frame rate.
    /// - [`FramerollError::UnsupportedCodec`] if `fourcc` has no encoder.
    /// - [`FramerollError::VideoWriteError`] if the file cannot be created.
    /// - [`FramerollError::VideoEncodeError`] if the encoder cannot be opened.
    pub fn create<P: AsRef<Path>>(
        path: P,
        fourcc: FourCc,
        fps: f64,
        width: u32,
        height: u32,
    ) -> Result<Self, FramerollError> {
        Self::create_with_bitrate(path, fourcc, fps, width, height, None)
    }

    /// Like [`create`](VideoStream::create), with an optional target bitrate
    /// in bits per second.
    pub fn create_with_bitrate<P: AsRef<Path>>(
        path: P,
        fourcc: FourCc,
        fps: f64,
        width: u32,
        height: u32,
        bitrate: Option<usize>,
    ) -> Result<Self, FramerollError> {
        let path = path.as_ref();
        let frame_rate = frame_rate_to_rational(fps)?;

        let encoded_width = even_dimension(width);
        let encoded_height = even_dimension(height);
        if encoded_width == 0 || encoded_height == 0 {
            return Err(FramerollError::VideoEncodeError(format!(
                "frame size {width}x{height} is too small to encode"
            )));
        }

        crate::ffmpeg::init()?;

        let codec_id = fourcc.codec_id()?;
        let encoder_time_base = frame_rate.invert();

        log::debug!(
            "Opening {} ({fourcc}, {fps} fps = {frame_rate}, {encoded_width}x{encoded_height})",
            path.display(),
        );

        let encoder_codec = ffmpeg_next::encoder::find(codec_id).ok_or_else(|| {
            FramerollError::VideoEncodeError(format!("codec {codec_id:?} not available"))
        })?;

        let scaler = ScalingContext::get(
            Pixel::RGB24,
            width,
            height,
            ENCODER_PIXEL_FORMAT,
            encoded_width,
            encoded_height,
            ScalingFlags::BILINEAR,
        )
        .map_err(|e| FramerollError::VideoWriteError(format!("cannot create scaler: {e}")))?;

        let mut output = ffmpeg_next::format::output(&path)
            .map_err(|e| FramerollError::VideoWriteError(format!("cannot open output: {e}")))?;

        let settings = EncoderSettings {
            codec: encoder_codec,
            width: encoded_width,
            height: encoded_height,
            frame_rate,
            time_base: encoder_time_base,
            bitrate,
        };
        let (encoder, stream_index, stream_time_base) =
            match prepare_output(&mut output, &settings) {
                Ok(prepared) => prepared,
                Err(error) => {
                    drop(output);
                    if let Err(remove_error) = fs::remove_file(path) {
                        log::warn!("Could not remove {}: {remove_error}", path.display());
                    }
                    return Err(error);
                }
            };

        Ok(Self {
            output: Some(output),
            encoder,
            scaler,
            stream_index,
            encoder_time_base,
            stream_time_base,
            path: path.to_path_buf(),
            frame_size: (width, height),
            size_mismatch: SizeMismatchPolicy::Error,
            keep_partial_output: false,
            frames_written: 0,
            finished: false,
        })
    }

    /// Set how frames of a different size are handled. Defaults to
    /// [`SizeMismatchPolicy::Error`].
    #[must_use]
    pub fn size_mismatch(mut self, policy: SizeMismatchPolicy) -> Self {
        self.size_mismatch = policy;
        self
    }

    /// Leave the half-written file on disk if the stream is dropped without
    /// [`finish`](VideoStream::finish).
    #[must_use]
    pub fn keep_partial_output(mut self, keep: bool) -> Self {
        self.keep_partial_output = keep;
        self
    }

    /// Encode one frame. `source` names the image for error messages.
    ///
    /// # Errors
    ///
    /// - [`FramerollError::FrameSizeMismatch`] if the image differs from the
    ///   size the stream was created with and the policy is `Error`.
    /// - [`FramerollError::VideoEncodeError`] / [`FramerollError::VideoWriteError`]
    ///   on encoder or muxer failure.
    pub fn write<P: AsRef<Path>>(
        &mut self,
        source: P,
        image: &DynamicImage,
    ) -> Result<(), FramerollError> {
        let (width, height) = self.frame_size;
        let actual = (image.width(), image.height());

        let rgb = if actual == self.frame_size {
            image.to_rgb8()
        } else {
            match self.size_mismatch {
                SizeMismatchPolicy::Error => {
                    return Err(FramerollError::FrameSizeMismatch {
                        path: source.as_ref().to_path_buf(),
                        expected: self.frame_size,
                        actual,
                    });
                }
                SizeMismatchPolicy::Resize => {
                    log::debug!(
                        "Resizing {} from {}x{} to {width}x{height}",
                        source.as_ref().display(),
                        actual.0,
                        actual.1,
                    );
                    image.resize_exact(width, height, FilterType::Lanczos3).to_rgb8()
                }
            }
        };

        let mut source_frame = VideoFrame::new(Pixel::RGB24, width, height);
        rgb_image_to_frame(&rgb, &mut source_frame);

        let mut encoded_frame = VideoFrame::empty();
        self.scaler
            .run(&source_frame, &mut encoded_frame)
            .map_err(|e| FramerollError::VideoWriteError(format!("scaling failed: {e}")))?;
        encoded_frame.set_pts(Some(self.frames_written as i64));

        self.encoder
            .send_frame(&encoded_frame)
            .map_err(|e| FramerollError::VideoEncodeError(format!("send_frame failed: {e}")))?;
        self.drain_packets()?;

        self.frames_written += 1;
        log::trace!(
            "Wrote frame {} from {}",
            self.frames_written,
            source.as_ref().display()
        );
        Ok(())
    }

    /// Flush the encoder, write the container trailer and close the file.
    ///
    /// Returns the number of frames written.
    pub fn finish(mut self) -> Result<u64, FramerollError> {
        self.encoder
            .send_eof()
            .map_err(|e| FramerollError::VideoEncodeError(format!("send_eof failed: {e}")))?;
        self.drain_packets()?;

        let mut output = self
            .output
            .take()
            .ok_or_else(|| FramerollError::VideoWriteError("stream already closed".to_string()))?;
        let trailer = output
            .write_trailer()
            .map_err(|e| FramerollError::VideoWriteError(format!("cannot write trailer: {e}")));
        drop(output);
        trailer?;

        self.finished = true;
        log::debug!(
            "Finalized {} with {} frame(s)",
            self.path.display(),
            self.frames_written
        );
        Ok(self.frames_written)
    }

    fn drain_packets(&mut self) -> Result<(), FramerollError> {
        let output = self
            .output
            .as_mut()
            .ok_or_else(|| FramerollError::VideoWriteError("stream already closed".to_string()))?;

        let mut packet = Packet::empty();
        while self.encoder.receive_packet(&mut packet).is_ok() {
            packet.set_stream(self.stream_index);
            if packet.duration() == 0 {
                packet.set_duration(1);
            }
            packet.rescale_ts(self.encoder_time_base, self.stream_time_base);
            packet
                .write_interleaved(output)
                .map_err(|e| FramerollError::VideoWriteError(format!("write packet failed: {e}")))?;
        }
        Ok(())
    }
}

struct EncoderSettings {
    codec: Codec,
    width: u32,
    height: u32,
    frame_rate: Rational,
    time_base: Rational,
    bitrate: Option<usize>,
}

/// Add the video stream to `output`, open its encoder and write the
/// container header.
///
/// Returns the opened encoder, the stream index and the stream time base
/// chosen by the muxer.
fn prepare_output(
    output: &mut Output,
    settings: &EncoderSettings,
) -> Result<(OpenedVideoEncoder, usize, Rational), FramerollError> {
    // Read before add_stream borrows the context mutably.
    let needs_global_header = output.format().flags().contains(FormatFlags::GLOBAL_HEADER);

    let mut stream = output
        .add_stream(settings.codec)
        .map_err(|e| FramerollError::VideoWriteError(format!("cannot add stream: {e}")))?;
    let stream_index = stream.index();

    let mut encoder = CodecContext::from_parameters(stream.parameters())
        .map_err(|e| FramerollError::VideoEncodeError(format!("cannot create codec context: {e}")))?
        .encoder()
        .video()
        .map_err(|e| FramerollError::VideoEncodeError(format!("cannot open video encoder: {e}")))?;

    encoder.set_width(settings.width);
    encoder.set_height(settings.height);
    encoder.set_format(ENCODER_PIXEL_FORMAT);
    encoder.set_time_base(settings.time_base);
    encoder.set_frame_rate(Some(settings.frame_rate));
    if let Some(bitrate) = settings.bitrate {
        encoder.set_bit_rate(bitrate);
    }

    if needs_global_header {
        unsafe {
            (*encoder.as_mut_ptr()).flags |= ffmpeg_sys_next::AV_CODEC_FLAG_GLOBAL_HEADER as i32;
        }
    }

    let encoder = encoder
        .open_as(settings.codec)
        .map_err(|e| FramerollError::VideoEncodeError(format!("cannot open encoder: {e}")))?;

    stream.set_parameters(&encoder);
    stream.set_time_base(settings.time_base);

    output
        .write_header()
        .map_err(|e| FramerollError::VideoWriteError(format!("cannot write header: {e}")))?;

    // The muxer may pick its own time base while writing the header.
    let stream_time_base = output
        .stream(stream_index)
        .map(|stream| stream.time_base())
        .ok_or_else(|| FramerollError::VideoWriteError("output stream vanished".to_string()))?;

    Ok((encoder, stream_index, stream_time_base))
}

impl Drop for VideoStream {
    fn drop(&mut self) {
        if self.finished {
            return;
        }

        // Close the file before touching it on disk.
        drop(self.output.take());

        if self.keep_partial_output {
            log::warn!(
                "Encode did not finish; partial video left at {}",
                self.path.display()
            );
            return;
        }

        match fs::remove_file(&self.path) {
            Ok(()) => log::warn!(
                "Encode did not finish; removed partial video {}",
                self.path.display()
            ),
            Err(error) => log::warn!(
                "Encode did not finish; could not remove partial video {}: {error}",
                self.path.display()
            ),
        }
    }
}
