//! Internal utility functions.
//!
//! Helpers for pixel-data copying and frame-rate conversion shared by the
//! stream writer and the probe.

use ffmpeg_next::{Rational, frame::Video as VideoFrame};
use image::RgbImage;

use crate::error::FramerollError;

/// Largest time-base denominator MPEG-4 Part 2 accepts.
const MAX_TIME_BASE_DENOMINATOR: i32 = 65535;

/// Largest relative error tolerated between a requested frame rate and its
/// rational approximation.
const MAX_FRAME_RATE_ERROR: f64 = 1e-3;

/// Copy a tightly-packed RGB image into an FFmpeg `RGB24` frame.
///
/// FFmpeg frames frequently carry per-row padding (stride > width × 3), so
/// rows are copied one at a time unless the strides match.
pub fn rgb_image_to_frame(image: &RgbImage, frame: &mut VideoFrame) {
    let row_length = image.width() as usize * 3;
    let height = image.height() as usize;
    let stride = frame.stride(0);
    let source = image.as_raw();
    let destination = frame.data_mut(0);

    if stride == row_length {
        destination[..row_length * height].copy_from_slice(&source[..row_length * height]);
    } else {
        for row in 0..height {
            let source_start = row * row_length;
            let destination_start = row * stride;
            destination[destination_start..destination_start + row_length]
                .copy_from_slice(&source[source_start..source_start + row_length]);
        }
    }
}

/// Convert a frames-per-second value to the closest rational FFmpeg can use
/// as a frame rate, with numerator and denominator no larger than 65535.
///
/// Rates that are not finite and positive, or that have no close enough
/// rational in that range (far above 65535 or near zero), are rejected with
/// [`FramerollError::InvalidFrameRate`].
pub fn frame_rate_to_rational(fps: f64) -> Result<Rational, FramerollError> {
    if !fps.is_finite() || fps <= 0.0 {
        return Err(FramerollError::InvalidFrameRate(fps));
    }
    let rational: Rational =
        unsafe { ffmpeg_sys_next::av_d2q(fps, MAX_TIME_BASE_DENOMINATOR) }.into();
    let rational = rational.reduce();
    if rational.numerator() <= 0 || rational.denominator() <= 0 {
        return Err(FramerollError::InvalidFrameRate(fps));
    }
    if ((rational_to_f64(rational) - fps) / fps).abs() > MAX_FRAME_RATE_ERROR {
        return Err(FramerollError::InvalidFrameRate(fps));
    }
    Ok(rational)
}

/// Convert an FFmpeg rational to a floating-point rate, treating a zero
/// denominator as "unknown" (0.0).
pub fn rational_to_f64(rational: Rational) -> f64 {
    if rational.denominator() == 0 {
        0.0
    } else {
        rational.numerator() as f64 / rational.denominator() as f64
    }
}

/// Round a dimension down to the nearest even value. 4:2:0 chroma
/// subsampling needs even frame sizes.
pub fn even_dimension(value: u32) -> u32 {
    value & !1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_frame_rates_are_exact() {
        let rate = frame_rate_to_rational(25.0).unwrap();
        assert_eq!((rate.numerator(), rate.denominator()), (25, 1));
        let rate = frame_rate_to_rational(10.0).unwrap();
        assert_eq!((rate.numerator(), rate.denominator()), (10, 1));
    }

    #[test]
    fn fractional_frame_rates_stay_within_limit() {
        let rate = frame_rate_to_rational(29.97).unwrap();
        assert!(rate.denominator() <= MAX_TIME_BASE_DENOMINATOR);
        assert!((rational_to_f64(rate) - 29.97).abs() < 1e-6);

        let rate = frame_rate_to_rational(1.0 / 3.0).unwrap();
        assert!(rate.denominator() <= MAX_TIME_BASE_DENOMINATOR);
        assert!((rational_to_f64(rate) - 1.0 / 3.0).abs() < 1e-4);
    }

    #[test]
    fn unrepresentable_frame_rates_are_rejected() {
        for fps in [0.0, -1.0, f64::NAN, f64::INFINITY, 1e-6, 100_000.0, 1e12] {
            assert!(
                matches!(
                    frame_rate_to_rational(fps),
                    Err(FramerollError::InvalidFrameRate(_))
                ),
                "{fps} should be rejected"
            );
        }
    }

    #[test]
    fn extreme_but_representable_rates_are_kept() {
        let rate = frame_rate_to_rational(65535.0).unwrap();
        assert_eq!((rate.numerator(), rate.denominator()), (65535, 1));
        let rate = frame_rate_to_rational(0.001).unwrap();
        assert!((rational_to_f64(rate) - 0.001).abs() < 1e-6);
    }

    #[test]
    fn zero_denominator_is_unknown_rate() {
        assert_eq!(rational_to_f64(Rational::new(30, 0)), 0.0);
    }

    #[test]
    fn even_dimension_rounds_down() {
        assert_eq!(even_dimension(100), 100);
        assert_eq!(even_dimension(101), 100);
        assert_eq!(even_dimension(1), 0);
    }
}
