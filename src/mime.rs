//! File-name based MIME type lookup.
//!
//! The enumerator decides whether a file is an image by looking at its
//! extension only; file contents are never read. The table below maps
//! lower-case extensions to MIME types and covers the usual image formats
//! plus the common non-image types that tend to sit next to them (sidecar
//! text, videos, archives), so that those resolve to a type whose major
//! component is not `image`.

use std::path::Path;

/// Extension → MIME type, sorted by extension for binary search.
const MIME_TABLE: &[(&str, &str)] = &[
    ("7z", "application/x-7z-compressed"),
    ("aac", "audio/aac"),
    ("avi", "video/x-msvideo"),
    ("avif", "image/avif"),
    ("bmp", "image/bmp"),
    ("csv", "text/csv"),
    ("dds", "image/vnd-ms.dds"),
    ("exr", "image/x-exr"),
    ("ff", "image/x-farbfeld"),
    ("flac", "audio/flac"),
    ("gif", "image/gif"),
    ("gz", "application/gzip"),
    ("hdr", "image/vnd.radiance"),
    ("heic", "image/heic"),
    ("heif", "image/heif"),
    ("htm", "text/html"),
    ("html", "text/html"),
    ("ico", "image/vnd.microsoft.icon"),
    ("ief", "image/ief"),
    ("jpe", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("jpg", "image/jpeg"),
    ("json", "application/json"),
    ("md", "text/markdown"),
    ("mkv", "video/x-matroska"),
    ("mov", "video/quicktime"),
    ("mp3", "audio/mpeg"),
    ("mp4", "video/mp4"),
    ("pbm", "image/x-portable-bitmap"),
    ("pdf", "application/pdf"),
    ("pgm", "image/x-portable-graymap"),
    ("png", "image/png"),
    ("pnm", "image/x-portable-anymap"),
    ("ppm", "image/x-portable-pixmap"),
    ("qoi", "image/qoi"),
    ("ras", "image/x-cmu-raster"),
    ("rgb", "image/x-rgb"),
    ("svg", "image/svg+xml"),
    ("tar", "application/x-tar"),
    ("tga", "image/x-tga"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("toml", "application/toml"),
    ("txt", "text/plain"),
    ("wav", "audio/x-wav"),
    ("webm", "video/webm"),
    ("webp", "image/webp"),
    ("xbm", "image/x-xbitmap"),
    ("xml", "text/xml"),
    ("xpm", "image/x-xpixmap"),
    ("xwd", "image/x-xwindowdump"),
    ("zip", "application/zip"),
];

/// Guess the MIME type of a file from its extension.
///
/// The lookup is case-insensitive. Returns `None` when the path has no
/// extension or the extension is not in the table.
///
/// # Example
///
/// ```
/// assert_eq!(frameroll::guess_mime_type("shots/001.JPG"), Some("image/jpeg"));
/// assert_eq!(frameroll::guess_mime_type("notes.txt"), Some("text/plain"));
/// assert_eq!(frameroll::guess_mime_type("Makefile"), None);
/// ```
pub fn guess_mime_type<P: AsRef<Path>>(path: P) -> Option<&'static str> {
    let extension = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
    MIME_TABLE
        .binary_search_by(|(key, _)| (*key).cmp(extension.as_str()))
        .ok()
        .map(|index| MIME_TABLE[index].1)
}

/// Returns `true` if the guessed MIME type's major component is `image`.
pub fn is_image<P: AsRef<Path>>(path: P) -> bool {
    guess_mime_type(path)
        .and_then(|mime| mime.split('/').next())
        .is_some_and(|major| major == "image")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sorted_for_binary_search() {
        assert!(MIME_TABLE.windows(2).all(|pair| pair[0].0 < pair[1].0));
    }

    #[test]
    fn lookup_ignores_case() {
        assert_eq!(guess_mime_type("a.PNG"), Some("image/png"));
        assert_eq!(guess_mime_type("a.JpEg"), Some("image/jpeg"));
    }

    #[test]
    fn lookup_uses_last_extension_only() {
        assert_eq!(guess_mime_type("frame.png.txt"), Some("text/plain"));
        assert_eq!(guess_mime_type("archive.tar.gz"), Some("application/gzip"));
    }

    #[test]
    fn missing_or_unknown_extension() {
        assert_eq!(guess_mime_type("README"), None);
        assert_eq!(guess_mime_type("frame.xyz"), None);
        assert_eq!(guess_mime_type(".png"), None);
    }

    #[test]
    fn image_major_type() {
        assert!(is_image("x.jpg"));
        assert!(is_image("x.svg"));
        assert!(is_image("dir/x.tiff"));
        assert!(!is_image("x.mp4"));
        assert!(!is_image("x.txt"));
        assert!(!is_image("x"));
    }
}
