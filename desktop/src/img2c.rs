use std::{path::PathBuf, process::ExitCode};

use argh::FromArgs;
use log::{error, info, warn};
use oledpack_core::Layout;
use oledpack_desktop::{
    Error, Result,
    cli::{self, Overrides},
    convert::{acquire, log_progress, run_batch, setup_ctrlc_handler, write_document},
};

#[derive(FromArgs)]
/// Convert images, an image folder or a GIF into a C array source or header
struct Args {
    /// input images, folders (natural order) or a single GIF
    #[argh(positional)]
    inputs: Vec<PathBuf>,

    /// output .c or .h file
    #[argh(option, short = 'o')]
    output: PathBuf,

    /// settings file to start from
    #[argh(option, short = 's')]
    settings: Option<PathBuf>,

    /// write the effective settings to this file
    #[argh(option)]
    save_settings: Option<PathBuf>,

    /// identifier prefix (default "frame")
    #[argh(option, short = 'p')]
    prefix: Option<String>,

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

    /// emit extern declarations instead of data
    #[argh(switch)]
    header: bool,

    /// leave out the pointer and dimension tables
    #[argh(switch)]
    no_table: bool,

    /// frame delay in milliseconds
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

    let overrides = Overrides {
        prefix: args.prefix,
        threshold: args.threshold,
        invert: args.invert,
        layout: args.mode,
        size: args.size,
        no_resize: args.no_resize,
        header: args.header,
        no_table: args.no_table,
        delay_ms: args.delay,
    };
    let mut settings = cli::load_settings(args.settings.as_deref())?;
    overrides.apply(&mut settings);
    if let Some(path) = &args.save_settings {
        cli::save_settings(path, &settings)?;
    }
    let config = settings.conversion_config()?;
    info!("Settings: {}", settings.describe());

    let input = acquire(&args.inputs, config.resize)?;
    if input.frames.is_empty() {
        return Err(Error::NoInput);
    }

    let mut export = settings.export_options(&cli::document_name(&args.output));
    if args.delay.is_none()
        && let Some(delay) = input.detected_delay_ms
    {
        info!("Using detected frame delay of {delay}ms");
        export.frame_delay_ms = Some(delay);
    }

    let document = run_batch(input.frames, config, export, log_progress)?;
    write_document(&document, &args.output)?;
    info!(
        "{} bitmaps written to {}",
        document.bitmaps.len(),
        args.output.display()
    );
    Ok(())
}
