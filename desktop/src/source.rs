use std::{
    cmp::Ordering,
    path::{Path, PathBuf},
};

use log::{info, warn};
use oledpack_core::RasterFrame;

use crate::{Error, Result, raster::frame_from_image};

pub const IMAGE_EXTENSIONS: &[&str] = &["png", "bmp", "jpg", "jpeg", "gif", "webp"];

pub fn is_image(path: &Path) -> bool {
    has_extension(path, IMAGE_EXTENSIONS)
}

pub fn is_gif(path: &Path) -> bool {
    has_extension(path, &["gif"])
}

fn has_extension(path: &Path, known: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| known.iter().any(|k| ext.eq_ignore_ascii_case(k)))
}

/// Expand the command line into an ordered file list.
///
/// Files keep the given order; a directory contributes its images in natural order.
pub fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }
        let entries = std::fs::read_dir(path).map_err(|source| Error::Read {
            path: path.clone(),
            source,
        })?;
        let mut images = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| Error::Read {
                path: path.clone(),
                source,
            })?;
            let entry_path = entry.path();
            if entry_path.is_file() && is_image(&entry_path) {
                images.push(entry_path);
            }
        }
        images.sort_by(|a, b| natural_cmp(&file_name(a), &file_name(b)));
        info!("{}: {} images", path.display(), images.len());
        files.extend(images);
    }
    Ok(files)
}

pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// `frame2` before `frame10`; text compares case-insensitively.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (mut a, mut b) = (a, b);
    loop {
        match (a.is_empty(), b.is_empty()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => {}
        }
        let (chunk_a, rest_a) = split_chunk(a);
        let (chunk_b, rest_b) = split_chunk(b);
        let a_digit = chunk_a.starts_with(|c: char| c.is_ascii_digit());
        let b_digit = chunk_b.starts_with(|c: char| c.is_ascii_digit());
        let ordering = match (a_digit, b_digit) {
            (true, true) => compare_digits(chunk_a, chunk_b),
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => chunk_a.to_lowercase().cmp(&chunk_b.to_lowercase()),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
        a = rest_a;
        b = rest_b;
    }
}

fn split_chunk(s: &str) -> (&str, &str) {
    let digit = s.starts_with(|c: char| c.is_ascii_digit());
    let end = s.find(|c: char| c.is_ascii_digit() != digit);
    s.split_at(end.unwrap_or(s.len()))
}

fn compare_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

pub fn load_frame(path: &Path) -> Result<RasterFrame> {
    let image = image::ImageReader::open(path)
        .map_err(|source| Error::Load {
            path: path.to_path_buf(),
            source: image::ImageError::IoError(source),
        })?
        .with_guessed_format()
        .map_err(|source| Error::Load {
            path: path.to_path_buf(),
            source: image::ImageError::IoError(source),
        })?
        .decode()
        .map_err(|source| Error::Load {
            path: path.to_path_buf(),
            source,
        })?;
    let frame = frame_from_image(image).map_err(|source| Error::Frame {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(frame.with_source(file_name(path)))
}

/// Frames that loaded, plus the inputs that did not.
#[derive(Debug, Default)]
pub struct Acquired {
    pub frames: Vec<RasterFrame>,
    pub failures: Vec<Error>,
}

/// Load every path in order. A file that fails is logged and skipped.
pub fn load_frames(paths: &[PathBuf]) -> Acquired {
    let mut acquired = Acquired::default();
    for path in paths {
        match load_frame(path) {
            Ok(frame) => acquired.frames.push(frame),
            Err(err) => {
                warn!("Skipping {}: {err}", path.display());
                acquired.failures.push(err);
            }
        }
    }
    acquired
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn natural_order() {
        let mut names = vec!["a10.png", "A2.png", "a1.png", "a_b.png", "a02.png"];
        names.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(names, ["a1.png", "A2.png", "a02.png", "a10.png", "a_b.png"]);
    }

    #[test]
    fn natural_order_prefixes() {
        assert_eq!(natural_cmp("a", "a1"), Ordering::Less);
        assert_eq!(natural_cmp("1", "a"), Ordering::Less);
        assert_eq!(natural_cmp("img007", "img7"), Ordering::Equal);
        let (small, big) = ("x99999999999999999999", "x100000000000000000000");
        assert_eq!(natural_cmp(small, big), Ordering::Less);
    }

    #[test]
    fn image_extensions() {
        assert!(is_image(Path::new("a/B.PNG")));
        assert!(is_image(Path::new("x.jpeg")));
        assert!(!is_image(Path::new("notes.txt")));
        assert!(!is_image(Path::new("noext")));
        assert!(is_gif(Path::new("anim.GIF")));
    }
}
