//! Directory enumeration.
//!
//! [`image_files`] lists the images in a directory in the order they will
//! appear in the video: ascending by path.

use std::fs;
use std::io::Error as IoError;
use std::path::{Path, PathBuf};

use crate::error::FramerollError;
use crate::mime;

/// List the image files in `directory`, sorted ascending by path.
///
/// Only regular files are considered (symlinks are followed); subdirectories
/// are skipped and the scan is not recursive. A file counts as an image when
/// its extension maps to an `image/*` MIME type, see
/// [`guess_mime_type`](crate::guess_mime_type). Contents are never read.
///
/// A directory without images yields an empty vector.
///
/// # Errors
///
/// Returns [`FramerollError::DirectoryRead`] if the directory does not exist
/// or cannot be listed. Entries that cannot be inspected (dangling or looping
/// symlinks, unreadable targets) are skipped.
///
/// # Example
///
/// ```no_run
/// for path in frameroll::image_files("shots")? {
///     println!("{}", path.display());
/// }
/// # Ok::<(), frameroll::FramerollError>(())
/// ```
pub fn image_files<P: AsRef<Path>>(directory: P) -> Result<Vec<PathBuf>, FramerollError> {
    let directory = directory.as_ref();
    let mut files = Vec::new();
    for entry in fs::read_dir(directory).map_err(read_error(directory))? {
        let entry = entry.map_err(read_error(directory))?;
        let path = entry.path();

        // fs::metadata follows symlinks, unlike DirEntry::file_type.
        let metadata = match fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(error) => {
                log::debug!("Skipping {}: {error}", path.display());
                continue;
            }
        };
        if !metadata.is_file() {
            continue;
        }

        if mime::is_image(&path) {
            files.push(path);
        } else {
            log::trace!("Skipping non-image file {}", path.display());
        }
    }

    files.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
    log::debug!("Found {} image(s) in {}", files.len(), directory.display());
    Ok(files)
}

fn read_error(path: &Path) -> impl FnOnce(IoError) -> FramerollError {
    let path = path.to_path_buf();
    move |source| FramerollError::DirectoryRead { path, source }
}
