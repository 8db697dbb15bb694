//! Helpers shared by the command-line tools.

use std::path::Path;

use log::info;
use oledpack_core::{Layout, Settings};

use crate::{Error, Result, output::write_atomic};

pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

/// Parse `WIDTHxHEIGHT`, e.g. `128x64`. Both sides must be positive.
pub fn parse_size(value: &str) -> core::result::Result<(u32, u32), String> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {value:?}"))?;
    let parse = |side: &str| match side.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("invalid dimension {side:?} in {value:?}")),
    };
    Ok((parse(width)?, parse(height)?))
}

/// `horizontal` or `vertical`, any case.
pub fn parse_layout(value: &str) -> core::result::Result<Layout, String> {
    value
        .parse()
        .map_err(|_| format!("unknown layout {value:?} (expected horizontal or vertical)"))
}

/// Command-line values that override the settings file when present.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub prefix: Option<String>,
    pub threshold: Option<u8>,
    pub invert: bool,
    pub layout: Option<Layout>,
    pub size: Option<(u32, u32)>,
    pub no_resize: bool,
    pub header: bool,
    pub no_table: bool,
    pub delay_ms: Option<u32>,
}

impl Overrides {
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(prefix) = &self.prefix {
            settings.prefix = prefix.clone();
        }
        if let Some(threshold) = self.threshold {
            settings.threshold = threshold;
        }
        settings.invert |= self.invert;
        if let Some(layout) = self.layout {
            settings.mode = layout;
        }
        if let Some((width, height)) = self.size {
            settings.resize = true;
            settings.width = width;
            settings.height = height;
        }
        if self.no_resize {
            settings.resize = false;
        }
        settings.header |= self.header;
        if self.no_table {
            settings.array = false;
        }
        if let Some(delay) = self.delay_ms {
            settings.speed = delay;
        }
    }
}

/// Defaults when `path` is `None` or does not exist yet.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };
    if !path.exists() {
        info!("{} not found, using defaults", path.display());
        return Ok(Settings::default());
    }
    let text = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Settings::parse(&text).map_err(|source| Error::Settings {
        path: path.to_path_buf(),
        source,
    })
}

pub fn save_settings(path: &Path, settings: &Settings) -> Result<()> {
    write_atomic(path, settings.render().as_bytes())
}

/// File stem used for the header guard.
pub fn document_name(output: &Path) -> String {
    output
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
