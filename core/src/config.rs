use alloc::string::{String, ToString};

use crate::{frame::MAX_DIMENSION, pack::Layout};

pub const DEFAULT_PREFIX: &str = "frame";

/// Per-batch conversion parameters. Read-only while a batch runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionConfig {
    pub threshold: u8,
    pub invert: bool,
    pub layout: Layout,
    pub resize: Option<(u32, u32)>,
    pub name_prefix: String,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            threshold: 128,
            invert: false,
            layout: Layout::Horizontal,
            resize: None,
            name_prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidPrefix(String),
    InvalidSize { width: u32, height: u32 },
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::InvalidPrefix(prefix) => {
                write!(f, "name prefix {prefix:?} is not a C identifier")
            }
            ConfigError::InvalidSize { width, height } => write!(
                f,
                "resize {width}x{height} must be between 1x1 and {MAX_DIMENSION}x{MAX_DIMENSION}"
            ),
        }
    }
}

impl core::error::Error for ConfigError {}

impl ConversionConfig {
    /// Check that generated identifiers and resize targets are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_identifier(&self.name_prefix) {
            return Err(ConfigError::InvalidPrefix(self.name_prefix.clone()));
        }
        if let Some((width, height)) = self.resize {
            if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
                return Err(ConfigError::InvalidSize { width, height });
            }
        }
        Ok(())
    }

    /// `{prefix}_{index:03}`
    pub fn identifier(&self, index: usize) -> String {
        alloc::format!("{}_{:03}", self.name_prefix, index)
    }
}

/// Document-level switches for the generated source.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExportOptions {
    /// Header-guard base, normally the output file stem.
    pub name: String,
    pub emit_header: bool,
    pub emit_pointer_table: bool,
    pub frame_delay_ms: Option<u32>,
    pub timestamp: Option<String>,
}

pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn identifiers_are_zero_padded() {
        let config = ConversionConfig::default();
        assert_eq!(config.identifier(0), "frame_000");
        assert_eq!(config.identifier(42), "frame_042");
        assert_eq!(config.identifier(1234), "frame_1234");
    }

    #[test]
    fn validate_prefix() {
        let mut config = ConversionConfig::default();
        assert!(config.validate().is_ok());
        for bad in ["", "1frame", "my-frame", "frame x"] {
            config.name_prefix = bad.to_string();
            let expected = ConfigError::InvalidPrefix(bad.to_string());
            assert_eq!(config.validate(), Err(expected));
        }
        config.name_prefix = "_logo2".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_resize() {
        let mut config = ConversionConfig::default();
        config.resize = Some((128, 0));
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidSize {
                width: 128,
                height: 0,
            })
        );
        config.resize = Some((128, 64));
        assert!(config.validate().is_ok());
    }
}
