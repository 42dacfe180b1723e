//! CLI configuration
//!
//! Loaded from environment variables with sensible defaults; command-line
//! flags override the environment.

use clap::ValueEnum;

/// Default limit on bytes read from an input file (1 MiB).
pub const DEFAULT_MAX_INPUT_BYTES: usize = 1024 * 1024;

/// When to emit ANSI colors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    fn from_env_value(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "always" => Some(Self::Always),
            "never" => Some(Self::Never),
            _ => None,
        }
    }

    /// Apply to the global `colored` state. `Auto` leaves tty detection on.
    pub fn apply(self) {
        match self {
            Self::Auto => colored::control::unset_override(),
            Self::Always => colored::control::set_override(true),
            Self::Never => colored::control::set_override(false),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum input file size in bytes (default: 1 MiB)
    pub max_input_bytes: usize,
    /// Color output (default: auto)
    pub color: ColorChoice,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            color: ColorChoice::Auto,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `ATTSTMT_MAX_INPUT_BYTES` - input file size limit (default: 1048576)
    /// - `ATTSTMT_COLOR` - `auto`, `always` or `never` (default: auto)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let max_input_bytes = lookup("ATTSTMT_MAX_INPUT_BYTES")
            .and_then(|v| v.trim().parse().ok())
            .filter(|&n: &usize| n > 0)
            .unwrap_or(defaults.max_input_bytes);

        let color = lookup("ATTSTMT_COLOR")
            .as_deref()
            .and_then(ColorChoice::from_env_value)
            .unwrap_or(defaults.color);

        Self {
            max_input_bytes,
            color,
        }
    }

    /// Command-line flags take precedence over the environment.
    pub fn with_color(mut self, color: Option<ColorChoice>) -> Self {
        if let Some(color) = color {
            self.color = color;
        }
        self
    }
}
