use std::{path::PathBuf, process::ExitCode};

use argh::FromArgs;
use log::{error, info, warn};
use oledpack_desktop::{
    Error, Result,
    animation::{GifOptions, decompose},
    cli,
    convert::{cancel_requested, setup_ctrlc_handler},
    output::{FrameFormats, save_animation},
};

#[derive(FromArgs)]
/// Split a GIF into numbered frame images plus a frame_info.txt
struct Args {
    /// input GIF
    #[argh(positional)]
    input: PathBuf,

    /// output folder, created if missing
    #[argh(option, short = 'o')]
    output: PathBuf,

    /// resize every frame to WIDTHxHEIGHT
    #[argh(option, from_str_fn(parse_size))]
    size: Option<(u32, u32)>,

    /// save frames as black/white using this threshold
    #[argh(option, short = 't')]
    threshold: Option<u8>,

    /// also save a BMP copy of every frame
    #[argh(switch)]
    bmp: bool,
}

fn parse_size(value: &str) -> core::result::Result<(u32, u32), String> {
    cli::parse_size(value)
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
    std::fs::create_dir_all(&args.output).map_err(|source| Error::Write {
        path: args.output.clone(),
        source,
    })?;

    let options = GifOptions {
        resize: args.size,
        prebinarize: args.threshold,
    };
    let formats = FrameFormats { bmp: args.bmp };
    let frames = decompose(&args.input, options)?;
    let info = save_animation(frames, &args.output, formats, cancel_requested)?;
    info!(
        "{} frames at {}ms saved to {}",
        info.frame_count,
        info.duration_ms,
        args.output.display()
    );
    Ok(())
}
