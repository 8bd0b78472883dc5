//! Directory enumeration integration tests.

use std::fs;
use std::path::{Path, PathBuf};

use frameroll::{FramerollError, image_files};

fn touch(directory: &Path, name: &str) -> PathBuf {
    let path = directory.join(name);
    fs::write(&path, b"").expect("Failed to create file");
    path
}

#[test]
fn empty_directory_yields_nothing() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    assert!(image_files(directory.path()).unwrap().is_empty());
}

#[test]
fn non_image_files_yield_nothing() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    for name in ["notes.txt", "clip.mp4", "data.json", "Makefile", "archive.tar.gz"] {
        touch(directory.path(), name);
    }
    assert!(image_files(directory.path()).unwrap().is_empty());
}

#[test]
fn mixed_directory_yields_sorted_images_only() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let c = touch(directory.path(), "c.jpg");
    let a = touch(directory.path(), "a.png");
    touch(directory.path(), "b.txt");
    let d = touch(directory.path(), "d.TIFF");
    touch(directory.path(), "video.mp4");
    let b = touch(directory.path(), "b.gif");

    assert_eq!(image_files(directory.path()).unwrap(), vec![a, b, c, d]);
}

#[test]
fn ordering_is_by_byte_string() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let lower = touch(directory.path(), "a.png");
    let upper = touch(directory.path(), "B.png");
    let ten = touch(directory.path(), "frame10.png");
    let two = touch(directory.path(), "frame2.png");

    // Not a natural sort: "frame10" precedes "frame2", "B" precedes "a".
    assert_eq!(image_files(directory.path()).unwrap(), vec![upper, lower, ten, two]);
}

#[test]
fn subdirectories_are_skipped_even_with_image_names() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    fs::create_dir(directory.path().join("nested.png")).unwrap();
    touch(&directory.path().join("nested.png"), "inner.png");
    let top = touch(directory.path(), "top.png");

    assert_eq!(image_files(directory.path()).unwrap(), vec![top]);
}

#[test]
fn contents_are_not_inspected() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let fake = directory.path().join("fake.jpg");
    fs::write(&fake, b"plain text, not a jpeg").unwrap();
    fs::write(directory.path().join("real.txt"), [0x89, b'P', b'N', b'G']).unwrap();

    assert_eq!(image_files(directory.path()).unwrap(), vec![fake]);
}

#[test]
fn missing_directory_is_an_error() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let missing = directory.path().join("does_not_exist");

    let error = image_files(&missing).unwrap_err();
    match &error {
        FramerollError::DirectoryRead { path, .. } => assert_eq!(path, &missing),
        other => panic!("Expected DirectoryRead, got {other:?}"),
    }
    assert!(error.to_string().contains("Failed to read directory"));
}

#[test]
fn file_instead_of_directory_is_an_error() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let file = touch(directory.path(), "a.png");
    assert!(matches!(
        image_files(&file),
        Err(FramerollError::DirectoryRead { .. })
    ));
}

#[cfg(unix)]
#[test]
fn symlinks_are_followed_and_dangling_ones_skipped() {
    use std::os::unix::fs::symlink;

    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let elsewhere = tempfile::tempdir().expect("Failed to create temp dir");
    let target = touch(elsewhere.path(), "target.png");

    let link = directory.path().join("linked.png");
    symlink(&target, &link).unwrap();
    symlink(elsewhere.path().join("gone.png"), directory.path().join("dangling.png")).unwrap();
    symlink(elsewhere.path(), directory.path().join("dir_link.png")).unwrap();

    assert_eq!(image_files(directory.path()).unwrap(), vec![link]);
}

#[cfg(unix)]
#[test]
fn self_referential_symlink_is_skipped() {
    use std::os::unix::fs::symlink;

    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let image = touch(directory.path(), "a.png");
    let looping = directory.path().join("loop.png");
    symlink(&looping, &looping).unwrap();

    assert_eq!(image_files(directory.path()).unwrap(), vec![image]);
}
