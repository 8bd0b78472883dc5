//! FFmpeg initialisation and log level configuration.
//!
//! FFmpeg has its own logging, separate from the Rust [`log`] facade, and by
//! default prints warnings from the MPEG-4 encoder and muxer to stderr. This
//! module lets callers tune that output without importing `ffmpeg-next`.
//!
//! # Example
//!
//! ```no_run
//! use frameroll::FfmpegLogLevel;
//!
//! frameroll::set_ffmpeg_log_level(FfmpegLogLevel::Error);
//! let level: FfmpegLogLevel = "quiet".parse().unwrap();
//! frameroll::set_ffmpeg_log_level(level);
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use ffmpeg_next::util::log::Level;

use crate::error::FramerollError;

/// FFmpeg internal log verbosity level, most quiet first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FfmpegLogLevel {
    Quiet,
    Panic,
    Fatal,
    Error,
    /// FFmpeg's default.
    Warning,
    Info,
    Verbose,
    Debug,
    Trace,
}

const LEVELS: [(FfmpegLogLevel, &str, Level); 9] = [
    (FfmpegLogLevel::Quiet, "quiet", Level::Quiet),
    (FfmpegLogLevel::Panic, "panic", Level::Panic),
    (FfmpegLogLevel::Fatal, "fatal", Level::Fatal),
    (FfmpegLogLevel::Error, "error", Level::Error),
    (FfmpegLogLevel::Warning, "warning", Level::Warning),
    (FfmpegLogLevel::Info, "info", Level::Info),
    (FfmpegLogLevel::Verbose, "verbose", Level::Verbose),
    (FfmpegLogLevel::Debug, "debug", Level::Debug),
    (FfmpegLogLevel::Trace, "trace", Level::Trace),
];

impl FfmpegLogLevel {
    /// Lower-case name accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        LEVELS
            .iter()
            .find(|(level, _, _)| *level == self)
            .map_or("warning", |(_, name, _)| name)
    }

    fn to_ffmpeg_level(self) -> Level {
        LEVELS
            .iter()
            .find(|(level, _, _)| *level == self)
            .map_or(Level::Warning, |(_, _, ffmpeg)| *ffmpeg)
    }

    fn from_ffmpeg_level(ffmpeg: Level) -> Option<Self> {
        LEVELS
            .iter()
            .find(|(_, _, candidate)| *candidate == ffmpeg)
            .map(|(level, _, _)| *level)
    }
}

impl Display for FfmpegLogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.name())
    }
}

impl FromStr for FfmpegLogLevel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let lowered = value.trim().to_ascii_lowercase();
        let lowered = if lowered == "warn" { "warning".to_string() } else { lowered };
        LEVELS
            .iter()
            .find(|(_, name, _)| *name == lowered)
            .map(|(level, _, _)| *level)
            .ok_or_else(|| format!("unknown FFmpeg log level: {value}"))
    }
}

/// Set FFmpeg's own stderr verbosity. Does not affect the `log` facade.
pub fn set_ffmpeg_log_level(level: FfmpegLogLevel) {
    ffmpeg_next::util::log::set_level(level.to_ffmpeg_level());
}

/// Current FFmpeg log level, if it maps to a known variant.
pub fn get_ffmpeg_log_level() -> Option<FfmpegLogLevel> {
    ffmpeg_next::util::log::get_level()
        .ok()
        .and_then(FfmpegLogLevel::from_ffmpeg_level)
}

/// Initialise FFmpeg. Safe to call repeatedly.
pub(crate) fn init() -> Result<(), FramerollError> {
    ffmpeg_next::init()
        .map_err(|error| FramerollError::FfmpegError(format!("initialisation failed: {error}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_aliases() {
        assert_eq!("quiet".parse(), Ok(FfmpegLogLevel::Quiet));
        assert_eq!("WARN".parse(), Ok(FfmpegLogLevel::Warning));
        assert_eq!(" Debug ".parse(), Ok(FfmpegLogLevel::Debug));
        assert!("loud".parse::<FfmpegLogLevel>().is_err());
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for (level, name, _) in LEVELS {
            assert_eq!(level.to_string(), name);
            assert_eq!(name.parse(), Ok(level));
        }
    }
}
