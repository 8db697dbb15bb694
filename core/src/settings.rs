//! Persisted tool settings: a flat `key=value` list under a `[Settings]` header.

use alloc::{
    format,
    string::{String, ToString},
};
use core::{fmt::Write, str::FromStr};

use crate::{
    config::{ConfigError, ConversionConfig, DEFAULT_PREFIX, ExportOptions},
    pack::Layout,
};

const SECTION: &str = "[Settings]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub prefix: String,
    pub threshold: u8,
    pub invert: bool,
    pub resize: bool,
    pub width: u32,
    pub height: u32,
    pub mode: Layout,
    pub header: bool,
    pub array: bool,
    /// Frame delay in milliseconds.
    pub speed: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            threshold: 128,
            invert: false,
            resize: true,
            width: 128,
            height: 64,
            mode: Layout::Horizontal,
            header: false,
            array: true,
            speed: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsError {
    pub line: usize,
    pub key: String,
    pub value: String,
}

impl core::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "line {}: invalid value {:?} for {}",
            self.line, self.value, self.key
        )
    }
}

impl core::error::Error for SettingsError {}

impl Settings {
    /// Apply every recognized `key=value` line of `text`.
    ///
    /// Unknown keys are ignored and missing keys keep their current value.
    /// On error nothing is applied.
    pub fn apply(&mut self, text: &str) -> Result<(), SettingsError> {
        let mut staged = self.clone();
        for (number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('[') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let (key, value) = (key.trim(), value.trim());
            staged.set(key, value).map_err(|()| SettingsError {
                line: number + 1,
                key: key.to_string(),
                value: value.to_string(),
            })?;
        }
        *self = staged;
        Ok(())
    }

    pub fn parse(text: &str) -> Result<Self, SettingsError> {
        let mut settings = Self::default();
        settings.apply(text)?;
        Ok(settings)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ()> {
        match key {
            "prefix" => self.prefix = value.to_string(),
            "threshold" => self.threshold = value.parse().map_err(|_| ())?,
            "invert" => self.invert = parse_flag(value)?,
            "resize" => self.resize = parse_flag(value)?,
            "width" => self.width = parse_positive(value)?,
            "height" => self.height = parse_positive(value)?,
            "mode" => self.mode = Layout::from_str(value).map_err(|_| ())?,
            "header" => self.header = parse_flag(value)?,
            "array" => self.array = parse_flag(value)?,
            "speed" => self.speed = parse_positive(value)?,
            _ => log::debug!("Ignoring unknown setting {key}"),
        }
        Ok(())
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let flag = |on: bool| if on { 1 } else { 0 };
        let _ = writeln!(out, "{SECTION}");
        let _ = writeln!(out, "prefix={}", self.prefix);
        let _ = writeln!(out, "threshold={}", self.threshold);
        let _ = writeln!(out, "invert={}", flag(self.invert));
        let _ = writeln!(out, "resize={}", flag(self.resize));
        let _ = writeln!(out, "width={}", self.width);
        let _ = writeln!(out, "height={}", self.height);
        let _ = writeln!(out, "mode={}", self.mode);
        let _ = writeln!(out, "header={}", flag(self.header));
        let _ = writeln!(out, "array={}", flag(self.array));
        let _ = writeln!(out, "speed={}", self.speed);
        out
    }

    pub fn conversion_config(&self) -> Result<ConversionConfig, ConfigError> {
        let name_prefix = if self.prefix.is_empty() {
            DEFAULT_PREFIX.to_string()
        } else {
            self.prefix.clone()
        };
        let config = ConversionConfig {
            threshold: self.threshold,
            invert: self.invert,
            layout: self.mode,
            resize: self.resize.then_some((self.width, self.height)),
            name_prefix,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn export_options(&self, name: &str) -> ExportOptions {
        ExportOptions {
            name: name.to_string(),
            emit_header: self.header,
            emit_pointer_table: self.array,
            frame_delay_ms: Some(self.speed),
            timestamp: None,
        }
    }

    /// One-line summary for logs.
    pub fn describe(&self) -> String {
        let size = if self.resize {
            format!("{}x{}", self.width, self.height)
        } else {
            "original size".to_string()
        };
        format!(
            "{} layout, threshold {}{}, {}, prefix {}",
            self.mode,
            self.threshold,
            if self.invert { " (inverted)" } else { "" },
            size,
            self.prefix
        )
    }
}

fn parse_flag(value: &str) -> Result<bool, ()> {
    match value {
        "0" => Ok(false),
        "1" => Ok(true),
        _ => Err(()),
    }
}

fn parse_positive(value: &str) -> Result<u32, ()> {
    match value.parse::<u32>() {
        Ok(0) | Err(_) => Err(()),
        Ok(v) => Ok(v),
    }
}
