use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use argh::FromArgs;
use log::{error, info, warn};
use oledpack_core::{FrameError, RasterFrame, Resize};
use oledpack_desktop::{
    Error, Result, cli,
    raster::{LanczosResize, frame_to_image, prebinarize},
    source::{collect_inputs, load_frame},
};

#[derive(FromArgs)]
/// Batch image utilities
struct Args {
    #[argh(subcommand)]
    command: Command,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Command {
    Resize(ResizeArgs),
    Bw(BwArgs),
}

#[derive(FromArgs)]
/// Resize every input to one size
#[argh(subcommand, name = "resize")]
struct ResizeArgs {
    /// target size as WIDTHxHEIGHT
    #[argh(option, from_str_fn(parse_size))]
    size: (u32, u32),

    /// output folder
    #[argh(option, short = 'o')]
    output: PathBuf,

    /// input images or folders
    #[argh(positional)]
    inputs: Vec<PathBuf>,
}

#[derive(FromArgs)]
/// Convert every input to pure black and white
#[argh(subcommand, name = "bw")]
struct BwArgs {
    /// brightness threshold, pixels at or above it turn white
    #[argh(option, short = 't', default = "128")]
    threshold: u8,

    /// output folder
    #[argh(option, short = 'o')]
    output: PathBuf,

    /// input images or folders
    #[argh(positional)]
    inputs: Vec<PathBuf>,
}

fn parse_size(value: &str) -> core::result::Result<(u32, u32), String> {
    cli::parse_size(value)
}

fn main() -> ExitCode {
    cli::init_logging();
    let args: Args = argh::from_env();
    let result = match args.command {
        Command::Resize(args) => {
            let (width, height) = args.size;
            process(&args.inputs, &args.output, |frame| {
                LanczosResize.resize(frame, width, height)
            })
        }
        Command::Bw(args) => process(&args.inputs, &args.output, |frame| {
            prebinarize(frame, args.threshold)
        }),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

/// Apply `transform` to every input and save it under the same name in `output`.
/// Failed items are reported and skipped.
fn process(
    inputs: &[PathBuf],
    output: &Path,
    transform: impl Fn(&RasterFrame) -> core::result::Result<RasterFrame, FrameError>,
) -> Result<()> {
    let paths = collect_inputs(inputs)?;
    if paths.is_empty() {
        return Err(Error::NoInput);
    }
    std::fs::create_dir_all(output).map_err(|source| Error::Write {
        path: output.to_path_buf(),
        source,
    })?;

    let mut failed = 0;
    for (index, path) in paths.iter().enumerate() {
        match process_one(path, output, &transform) {
            Ok(target) => info!("[{}/{}] {}", index + 1, paths.len(), target.display()),
            Err(err) => {
                warn!("[{}/{}] {err}", index + 1, paths.len());
                failed += 1;
            }
        }
    }

    let done = paths.len() - failed;
    info!("{done} of {} images processed", paths.len());
    if failed > 0 {
        return Err(Error::Incomplete {
            failed,
            total: paths.len(),
        });
    }
    Ok(())
}

fn process_one(
    path: &Path,
    output: &Path,
    transform: impl Fn(&RasterFrame) -> core::result::Result<RasterFrame, FrameError>,
) -> Result<PathBuf> {
    let frame = load_frame(path)?;
    let frame = transform(&frame).map_err(|source| Error::Frame {
        path: path.to_path_buf(),
        source,
    })?;
    let target = output.join(path.file_name().unwrap_or(path.as_os_str()));
    frame_to_image(&frame)
        .save(&target)
        .map_err(|source| Error::Save {
            path: target.clone(),
            source,
        })?;
    Ok(target)
}
