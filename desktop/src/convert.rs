//! Runs a batch on a worker thread and reports progress back to the caller.

use std::{
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc,
    },
    thread,
};

use log::{debug, info, warn};
use oledpack_core::{
    BatchPipeline, ConversionConfig, ExportDocument, ExportOptions, Progress, RasterFrame, emit,
};

use crate::{
    Error, Result,
    animation::{GifOptions, decompose_all},
    output::{read_sidecar, write_atomic},
    raster::LanczosResize,
    source::{collect_inputs, is_gif, load_frames},
};

/// Set by the Ctrl+C handler; checked before every frame.
static CANCEL_REQUESTED: AtomicBool = AtomicBool::new(false);

pub fn cancel_requested() -> bool {
    CANCEL_REQUESTED.load(Ordering::SeqCst)
}

/// Install the Ctrl+C handler. Call once at startup.
pub fn setup_ctrlc_handler() -> core::result::Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || {
        CANCEL_REQUESTED.store(true, Ordering::SeqCst);
        eprintln!("\nReceived Ctrl+C, stopping after the current frame...");
    })
}

/// Frames gathered from the command line.
#[derive(Debug, Default)]
pub struct Input {
    pub frames: Vec<RasterFrame>,
    /// Frame delay declared by a GIF or a `frame_info.txt` sidecar.
    pub detected_delay_ms: Option<u32>,
}

/// A single GIF is decomposed (resampled to `resize` on the way); anything
/// else is treated as an ordered image list. Unreadable images are skipped.
///
/// A GIF that breaks partway still yields the frames decoded before the
/// break. It is an error only when not a single frame could be decoded.
pub fn acquire(inputs: &[PathBuf], resize: Option<(u32, u32)>) -> Result<Input> {
    match inputs {
        [] => Err(Error::NoInput),
        [gif] if is_gif(gif) => {
            let options = GifOptions {
                resize,
                prebinarize: None,
            };
            let decomposed = decompose_all(gif, options, |index, frame| {
                debug!(
                    "Decoded frame {index}: {}x{}",
                    frame.width(),
                    frame.height()
                );
            });
            let decomposition = match decomposed {
                Ok(decomposition) => decomposition,
                Err(partial) if partial.decomposition.frames.is_empty() => {
                    return Err(partial.error);
                }
                Err(partial) => {
                    warn!(
                        "{}; keeping the {} frames decoded before it",
                        partial.error,
                        partial.decomposition.frames.len()
                    );
                    partial.decomposition
                }
            };
            Ok(Input {
                frames: decomposition.frames,
                detected_delay_ms: Some(decomposition.info.duration_ms),
            })
        }
        _ => {
            let detected_delay_ms = match inputs {
                [dir] if dir.is_dir() => read_sidecar(dir).map(|info| info.duration_ms),
                _ => None,
            };
            let paths = collect_inputs(inputs)?;
            let acquired = load_frames(&paths);
            if !acquired.failures.is_empty() {
                warn!(
                    "{} of {} inputs skipped",
                    acquired.failures.len(),
                    paths.len()
                );
            }
            Ok(Input {
                frames: acquired.frames,
                detected_delay_ms,
            })
        }
    }
}

pub fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Convert `frames` in order on a worker thread.
///
/// `on_progress` runs on the calling thread, once per converted frame, in
/// order. The worker never waits on it.
pub fn run_batch(
    frames: Vec<RasterFrame>,
    config: ConversionConfig,
    mut export: ExportOptions,
    mut on_progress: impl FnMut(&Progress),
) -> Result<ExportDocument> {
    if frames.is_empty() {
        return Err(Error::NoInput);
    }
    if export.timestamp.is_none() {
        export.timestamp = Some(timestamp());
    }
    info!("Converting {} frames on a worker thread", frames.len());

    let (sender, receiver) = mpsc::channel();
    let worker = thread::Builder::new()
        .name("oledpack-convert".into())
        .spawn(move || {
            BatchPipeline::new(&config, &export, LanczosResize)
                .with_cancel(&CANCEL_REQUESTED)
                .run(frames, |progress| {
                    // The receiver only goes away if the caller is gone.
                    let _ = sender.send(progress);
                })
        })
        .map_err(|_| Error::Worker)?;

    for progress in receiver {
        on_progress(&progress);
    }

    match worker.join() {
        Ok(result) => Ok(result?),
        Err(_) => {
            warn!("Conversion worker panicked");
            Err(Error::Worker)
        }
    }
}

/// Default progress sink: one log line per frame.
pub fn log_progress(progress: &Progress) {
    info!("[{:>3.0}%] {}", progress.fraction * 100.0, progress.label);
}

pub fn write_document(document: &ExportDocument, path: &Path) -> Result<()> {
    let text = emit(document);
    write_atomic(path, text.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_batch_is_rejected() {
        let config = ConversionConfig::default();
        let export = ExportOptions::default();
        let result = run_batch(Vec::new(), config, export, |_| {});
        assert!(matches!(result, Err(Error::NoInput)));
    }

    #[test]
    fn progress_arrives_in_order() {
        let frames = (0..5)
            .map(|i| RasterFrame::from_luma(8, 2, vec![i * 50; 16]).unwrap())
            .collect();
        let config = ConversionConfig::default();
        let export = ExportOptions::default();
        let mut seen = Vec::new();
        let record = |p: &Progress| seen.push((p.index, p.total));
        let document = run_batch(frames, config, export, record).unwrap();
        assert_eq!(seen, (0..5).map(|i| (i, 5)).collect::<Vec<_>>());
        assert_eq!(document.bitmaps.len(), 5);
        assert!(document.timestamp.is_some());
        assert_eq!(document.bitmaps[4].bitmap.bytes(), &[0xFF, 0xFF]);
        assert_eq!(document.bitmaps[0].bitmap.bytes(), &[0x00, 0x00]);
    }
}
