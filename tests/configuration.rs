//! EncodeOptions, progress and cancellation tests.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use ffmpeg_next::codec::Id;
use frameroll::{
    CancellationToken, DEFAULT_FRAME_RATE, EncodeOptions, FrameEncoder, ProgressCallback,
    ProgressInfo, SizeMismatchPolicy,
};
use image::{Rgb, RgbImage};

// ── EncodeOptions builder ───────────────────────────────────────

#[test]
fn options_defaults() {
    let options = EncodeOptions::new();
    assert_eq!(options.fps(), DEFAULT_FRAME_RATE);
    assert_eq!(options.output(), None);
    assert_eq!(options.reference_frame(), 0);
    assert_eq!(options.size_mismatch(), SizeMismatchPolicy::Error);

    let debug = format!("{options:?}");
    assert!(debug.contains("EncodeOptions"));
    assert!(debug.contains("has_cancellation: false"));
    assert!(debug.contains("batch_size: 1"));
}

#[test]
fn options_with_batch_size_clamps_zero() {
    let debug = format!("{:?}", EncodeOptions::new().with_batch_size(0));
    assert!(debug.contains("batch_size: 1"));
}

#[test]
fn options_with_cancellation_is_visible_in_debug() {
    let options = EncodeOptions::new().with_cancellation(CancellationToken::new());
    assert!(format!("{options:?}").contains("has_cancellation: true"));
}

#[test]
fn default_output_lives_in_input_directory() {
    let options = EncodeOptions::new();
    assert_eq!(
        options.resolve_output(Path::new("/tmp/imgs")),
        PathBuf::from("/tmp/imgs/video.mp4")
    );
}

#[test]
fn explicit_output_is_not_rewritten() {
    let options = EncodeOptions::new().with_output("relative/clip.mkv");
    assert_eq!(
        options.resolve_output(Path::new("/tmp/imgs")),
        PathBuf::from("relative/clip.mkv")
    );
}

// ── CancellationToken ──────────────────────────────────────────────

#[test]
fn cancellation_token_clone_shares_state() {
    let token = CancellationToken::new();
    let clone = token.clone();
    assert!(!clone.is_cancelled());

    token.cancel();
    assert!(clone.is_cancelled());
}

#[test]
fn cancellation_token_default_not_cancelled() {
    assert!(!CancellationToken::default().is_cancelled());
}

// ── Progress during an encode ─────────────────────────────────────

#[derive(Default)]
struct Recorder {
    reports: Mutex<Vec<ProgressInfo>>,
}

impl ProgressCallback for Recorder {
    fn on_progress(&self, info: &ProgressInfo) {
        self.reports.lock().unwrap().push(info.clone());
    }
}

#[test]
fn progress_reports_follow_batch_size() {
    if ffmpeg_next::init().is_err() || ffmpeg_next::encoder::find(Id::MPEG4).is_none() {
        eprintln!("Skipping: MPEG-4 encoder not available");
        return;
    }

    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    for index in 0..5 {
        RgbImage::from_pixel(16, 16, Rgb([index * 40, 0, 0]))
            .save(directory.path().join(format!("{index}.png")))
            .unwrap();
    }

    let recorder = Arc::new(Recorder::default());
    let options = EncodeOptions::new()
        .with_progress(recorder.clone())
        .with_batch_size(2);
    FrameEncoder::new(options)
        .encode(directory.path())
        .expect("encode");

    let reports = recorder.reports.lock().unwrap();
    let currents: Vec<u64> = reports.iter().map(|info| info.current).collect();
    assert_eq!(currents, vec![2, 4, 5]);
    assert!(reports.iter().all(|info| info.total == Some(5)));

    let last = reports.last().unwrap();
    assert_eq!(last.percentage, Some(100.0));
    assert_eq!(
        last.current_file.as_deref(),
        Some(directory.path().join("4.png").as_path())
    );
}
