use std::{
    path::PathBuf,
    process::ExitCode,
    sync::{Arc, mpsc},
    thread,
    time::Duration,
};

use argh::FromArgs;
use log::{error, info, warn};
use oledpack_core::{
    Layout, PackedBitmap,
    playback::{FrameInterval, Playback},
};
use oledpack_desktop::{
    Error, Result,
    cli::{self, Overrides},
    convert::{acquire, log_progress, run_batch, setup_ctrlc_handler},
};

use crate::preview_window::{Command, PreviewWindow};

mod preview_window;

const SPEED_STEP_MS: i32 = 10;

#[derive(FromArgs)]
/// Convert images or a GIF and play the packed frames in a window
struct Args {
    /// input images, folders (natural order) or a single GIF
    #[argh(positional)]
    inputs: Vec<PathBuf>,

    /// settings file to start from
    #[argh(option, short = 's')]
    settings: Option<PathBuf>,

    /// brightness threshold, pixels at or above it are lit
    #[argh(option, short = 't')]
    threshold: Option<u8>,

    /// invert the lit/unlit decision
    #[argh(switch, short = 'i')]
    invert: bool,

    /// byte layout: horizontal or vertical
    #[argh(option, short = 'm', from_str_fn(parse_layout))]
    mode: Option<Layout>,

    /// resize every frame to WIDTHxHEIGHT
    #[argh(option, from_str_fn(parse_size))]
    size: Option<(u32, u32)>,

    /// keep every frame at its original size
    #[argh(switch)]
    no_resize: bool,

    /// initial frame delay in milliseconds
    #[argh(option, short = 'd')]
    delay: Option<u32>,
}

fn parse_size(value: &str) -> core::result::Result<(u32, u32), String> {
    cli::parse_size(value)
}

fn parse_layout(value: &str) -> core::result::Result<Layout, String> {
    cli::parse_layout(value)
}

fn main() -> ExitCode {
    cli::init_logging();
    let args: Args = argh::from_env();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    if let Err(err) = setup_ctrlc_handler() {
        warn!("Ctrl+C handler not installed: {err}");
    }

    let mut settings = cli::load_settings(args.settings.as_deref())?;
    Overrides {
        threshold: args.threshold,
        invert: args.invert,
        layout: args.mode,
        size: args.size,
        no_resize: args.no_resize,
        delay_ms: args.delay,
        ..Default::default()
    }
    .apply(&mut settings);
    let config = settings.conversion_config()?;
    info!("Settings: {}", settings.describe());

    let input = acquire(&args.inputs, config.resize)?;
    if input.frames.is_empty() {
        return Err(Error::NoInput);
    }
    let delay = match (args.delay, input.detected_delay_ms) {
        (None, Some(detected)) => detected,
        _ => settings.speed,
    };

    let export = settings.export_options("preview");
    let document = run_batch(input.frames, config, export, log_progress)?;
    let bitmaps: Vec<PackedBitmap> = document.bitmaps.into_iter().map(|b| b.bitmap).collect();
    play(&bitmaps, delay)
}

/// Window loop. Frames advance on ticks from a timer thread that sleeps for
/// the current interval between ticks.
fn play(bitmaps: &[PackedBitmap], delay_ms: u32) -> Result<()> {
    let (width, height) = bitmaps.iter().fold((0, 0), |(w, h), bitmap| {
        (w.max(bitmap.width()), h.max(bitmap.height()))
    });
    let mut window = PreviewWindow::new("oledpack preview", width, height)?;
    let mut playback = Playback::new(bitmaps.len());
    let interval = Arc::new(FrameInterval::new(delay_ms));

    let (ticks, tick_receiver) = mpsc::channel();
    let ticker_interval = Arc::clone(&interval);
    thread::spawn(move || {
        loop {
            thread::sleep(Duration::from_millis(u64::from(ticker_interval.get())));
            if ticks.send(()).is_err() {
                break;
            }
        }
    });

    let mut dirty = true;
    while window.is_open() {
        for command in window.commands() {
            match command {
                Command::TogglePlay => {
                    playback.toggle();
                }
                Command::StepBack => playback.step_back(),
                Command::StepForward => playback.step_forward(),
                Command::Faster => {
                    interval.adjust(-SPEED_STEP_MS);
                }
                Command::Slower => {
                    interval.adjust(SPEED_STEP_MS);
                }
            }
            dirty = true;
        }
        for _ in tick_receiver.try_iter() {
            dirty |= playback.tick();
        }

        if dirty {
            let state = if playback.is_playing() {
                "play"
            } else {
                "pause"
            };
            let status = format!(
                "{}/{} {}ms {state}",
                playback.current() + 1,
                playback.len(),
                interval.get()
            );
            window.draw(&bitmaps[playback.current()], &status);
            window.present()?;
            dirty = false;
        } else {
            window.update();
        }
    }
    info!("Preview closed");
    Ok(())
}
