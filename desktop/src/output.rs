use std::{
    io::Write,
    path::{Path, PathBuf},
};

use log::{debug, info};
use oledpack_core::RasterFrame;
use tempfile::NamedTempFile;

use crate::{
    Error, Result,
    animation::{AnimationInfo, GifFrames},
    raster::frame_to_image,
};

pub const SIDECAR_NAME: &str = "frame_info.txt";

/// Replace `path` with `contents` in one step: a temporary file next to it is
/// written, flushed and renamed over the target.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let write_error = |source| Error::Write {
        path: path.to_path_buf(),
        source,
    };
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(parent).map_err(write_error)?;
    file.write_all(contents).map_err(write_error)?;
    file.as_file().sync_all().map_err(write_error)?;
    file.persist(path).map_err(|err| write_error(err.error))?;
    info!("Wrote {} ({} bytes)", path.display(), contents.len());
    Ok(())
}

pub fn write_sidecar(dir: &Path, info: &AnimationInfo) -> Result<PathBuf> {
    let path = dir.join(SIDECAR_NAME);
    let text = format!(
        "Total frames: {}\nFrame duration: {}ms\n",
        info.frame_count, info.duration_ms
    );
    write_atomic(&path, text.as_bytes())?;
    Ok(path)
}

/// `None` when the directory has no sidecar or it is unreadable as one.
pub fn read_sidecar(dir: &Path) -> Option<AnimationInfo> {
    let path = dir.join(SIDECAR_NAME);
    let text = std::fs::read_to_string(&path).ok()?;
    let info = parse_sidecar(&text);
    if info.is_none() {
        debug!("Ignoring malformed {}", path.display());
    }
    info
}

fn parse_sidecar(text: &str) -> Option<AnimationInfo> {
    let mut frame_count = None;
    let mut duration_ms = None;
    for line in text.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "Total frames" => frame_count = value.parse().ok(),
            "Frame duration" => duration_ms = value.trim_end_matches("ms").trim().parse().ok(),
            _ => {}
        }
    }
    Some(AnimationInfo {
        frame_count: frame_count?,
        duration_ms: duration_ms?,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameFormats {
    pub bmp: bool,
}

/// Save `frame_{index:03}.png`, plus a `.bmp` twin when asked. Returns the PNG path.
pub fn save_frame(
    dir: &Path,
    index: usize,
    frame: &RasterFrame,
    formats: FrameFormats,
) -> Result<PathBuf> {
    let image = frame_to_image(frame);
    let png = dir.join(format!("frame_{index:03}.png"));
    image.save(&png).map_err(|source| Error::Save {
        path: png.clone(),
        source,
    })?;
    if formats.bmp {
        let bmp = png.with_extension("bmp");
        image
            .save(&bmp)
            .map_err(|source| Error::Save { path: bmp, source })?;
    }
    debug!("Saved {}", png.display());
    Ok(png)
}

/// Save every frame of `frames` into `dir` and describe them in a sidecar.
///
/// `stop` is polled before each frame. The sidecar always describes the
/// frames actually on disk, also when decoding fails partway; the decode
/// error is returned after it is written.
pub fn save_animation(
    mut frames: GifFrames,
    dir: &Path,
    formats: FrameFormats,
    stop: impl Fn() -> bool,
) -> Result<AnimationInfo> {
    let mut saved = 0;
    let mut failure = None;
    for (index, frame) in frames.by_ref().enumerate() {
        if stop() {
            info!("Stopped after {index} frames");
            break;
        }
        match frame {
            Ok(frame) => {
                save_frame(dir, index, &frame, formats)?;
                saved += 1;
            }
            Err(err) => failure = Some(err),
        }
    }

    let info = AnimationInfo {
        frame_count: saved,
        ..frames.info()
    };
    if saved > 0 {
        write_sidecar(dir, &info)?;
    }
    match failure {
        Some(err) => Err(err),
        None if saved == 0 => Err(Error::NoInput),
        None => Ok(info),
    }
}
