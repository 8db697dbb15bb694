use std::path::{Path, PathBuf};

use image::{GrayImage, Luma};
use oledpack_desktop::{
    animation::AnimationInfo,
    convert::acquire,
    output::{SIDECAR_NAME, write_sidecar},
    source::{collect_inputs, load_frame, load_frames},
};

fn write_png(path: &Path, value: u8) {
    let image = GrayImage::from_pixel(4, 2, Luma([value]));
    image.save(path).unwrap();
}

fn names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn directory_expands_in_natural_order() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["frame10.png", "frame2.png", "frame1.png"] {
        write_png(&dir.path().join(name), 0);
    }
    std::fs::write(dir.path().join("notes.txt"), "skip me").unwrap();

    let paths = collect_inputs(&[dir.path().to_path_buf()]).unwrap();
    assert_eq!(names(&paths), ["frame1.png", "frame2.png", "frame10.png"]);
}

#[test]
fn explicit_files_keep_their_order() {
    let dir = tempfile::tempdir().unwrap();
    let b = dir.path().join("b.png");
    let a = dir.path().join("a.png");
    write_png(&a, 0);
    write_png(&b, 0);
    let paths = collect_inputs(&[b.clone(), a.clone()]).unwrap();
    assert_eq!(paths, [b, a]);
}

#[test]
fn failed_inputs_are_skipped_and_reported() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.png");
    let bad = dir.path().join("bad.png");
    write_png(&good, 200);
    std::fs::write(&bad, b"not a png").unwrap();
    let missing = dir.path().join("missing.png");

    let acquired = load_frames(&[missing, good, bad]);
    assert_eq!(acquired.frames.len(), 1);
    assert_eq!(acquired.failures.len(), 2);
    assert_eq!(acquired.frames[0].source(), Some("good.png"));
    assert_eq!(acquired.frames[0].to_luma(), vec![200; 8]);
}

#[test]
fn grayscale_files_load_as_single_channel() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gray.png");
    write_png(&path, 7);
    let frame = load_frame(&path).unwrap();
    assert!(frame.is_grayscale());
    assert_eq!((frame.width(), frame.height()), (4, 2));
}

#[test]
fn frame_folder_sidecar_supplies_the_delay() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..3 {
        write_png(&dir.path().join(format!("frame_{i:03}.png")), 255);
    }
    let info = AnimationInfo {
        frame_count: 3,
        duration_ms: 40,
    };
    write_sidecar(dir.path(), &info).unwrap();
    assert!(dir.path().join(SIDECAR_NAME).exists());

    let input = acquire(&[dir.path().to_path_buf()], None).unwrap();
    assert_eq!(input.frames.len(), 3);
    assert_eq!(input.detected_delay_ms, Some(40));
}
