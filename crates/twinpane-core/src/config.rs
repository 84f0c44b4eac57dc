//! List and formatting configuration.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// How sizes are rendered in display labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SizeFormat {
    /// IEC units (KiB, MiB, ...).
    #[default]
    Binary,
    /// SI units (kB, MB, ...).
    Decimal,
    /// Raw byte count.
    Bytes,
}

/// How permission bits are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModeFormat {
    /// Octal digits, e.g. `755`.
    #[default]
    Octal,
    /// `rwxr-xr-x` style string.
    Textual,
}

/// Formatting configuration threaded into label and sort-key code.
///
/// An explicit value rather than process-wide cached state so two lists can
/// render with different settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatConfig {
    /// strftime-style format for the time column.
    pub time_format: String,
    /// Size column units.
    pub size_format: SizeFormat,
    /// Mode column rendering.
    pub mode_format: ModeFormat,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            time_format: "%Y-%m-%d %H:%M".to_string(),
            size_format: SizeFormat::Binary,
            mode_format: ModeFormat::Octal,
        }
    }
}

/// Configuration for a file list instance.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ListConfig {
    /// Show entries normally excluded by the hidden-entry policy.
    #[builder(default = "false")]
    #[serde(default)]
    pub show_hidden: bool,

    /// Names always shown regardless of the hidden-entry policy.
    #[builder(default)]
    #[serde(default)]
    pub always_visible: Vec<String>,

    /// Number of entries buffered before the loader flushes a batch.
    #[builder(default = "100")]
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Formatting settings for labels and numeric sort keys.
    #[builder(default)]
    #[serde(default)]
    pub format: FormatConfig,
}

fn default_batch_size() -> usize {
    100
}

impl ListConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(size) = self.batch_size {
            if size == 0 {
                return Err("Batch size must be at least 1".to_string());
            }
        }
        Ok(())
    }
}

impl ListConfig {
    /// Create a new config builder.
    pub fn builder() -> ListConfigBuilder {
        ListConfigBuilder::default()
    }
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            show_hidden: false,
            always_visible: Vec::new(),
            batch_size: 100,
            format: FormatConfig::default(),
        }
    }
}
