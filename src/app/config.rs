//! Configuration for the exporter.
//!
//! Follows the usual precedence chain: CLI arguments > environment
//! variables > config file > defaults. The input and output directories are
//! CLI-only; everything else can also live in a TOML config file.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::archive::timestamp::{Date, UtcOffset};
use crate::document::PageSize;
use crate::shape::DEFAULT_MAX_LINE_WIDTH;

/// CLI arguments.
#[derive(Parser, Debug, Clone)]
#[command(name = "chat2html")]
#[command(version)]
#[command(
    about = "Convert a Google Takeout chat archive into printable HTML transcripts",
    long_about = None
)]
pub struct CliArgs {
    /// Google Chat folder within the Google Takeout folder
    #[arg(short = 'i', long, value_name = "DIR")]
    pub in_dir: PathBuf,

    /// Folder where chat transcripts will be saved
    #[arg(short = 'o', long, value_name = "DIR")]
    pub out_dir: PathBuf,

    /// Path to custom config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Only include messages on or after this date (YYYY-MM-DD)
    #[arg(short, long, value_name = "DATE")]
    pub start_date: Option<String>,

    /// Only include messages on or before this date (YYYY-MM-DD)
    #[arg(short, long, value_name = "DATE")]
    pub end_date: Option<String>,

    /// Display time zone: UTC or a fixed offset like +02:00
    #[arg(short = 'z', long, value_name = "ZONE")]
    pub time_zone: Option<String>,

    /// Paper size for printing (a4, letter)
    #[arg(short = 'p', long, value_name = "SIZE")]
    pub page_size: Option<String>,

    /// Maximum output filename length
    #[arg(short = 'm', long, value_name = "LEN")]
    pub max_filename_len: Option<usize>,

    /// Also save chats the exporting user never wrote in
    #[arg(short = 'a', long = "all")]
    pub include_all: bool,

    /// Maximum embedded thumbnail height in inches
    #[arg(long, value_name = "INCHES")]
    pub max_img_height: Option<f32>,

    /// Maximum display-line width for reshaped Hebrew text, in characters
    #[arg(long, value_name = "CHARS")]
    pub max_line_width: Option<usize>,
}

/// Exporter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Google Chat folder within the Takeout folder (CLI-only).
    #[serde(skip)]
    pub in_dir: PathBuf,

    /// Output folder (CLI-only).
    #[serde(skip)]
    pub out_dir: PathBuf,

    /// Inclusive start of the date filter, ISO `YYYY-MM-DD`.
    #[serde(default)]
    pub start_date: Option<String>,

    /// Inclusive end of the date filter, ISO `YYYY-MM-DD`.
    #[serde(default)]
    pub end_date: Option<String>,

    /// Display time zone: `UTC` or a fixed `±HH:MM` offset.
    #[serde(default = "default_time_zone")]
    pub time_zone: String,

    /// Paper size: `a4` or `letter`.
    #[serde(default = "default_page_size")]
    pub page_size: String,

    /// Maximum output filename length, in grapheme clusters.
    #[serde(default = "default_max_filename_len")]
    pub max_filename_len: usize,

    /// Also save chats the exporting user never wrote in.
    #[serde(default)]
    pub include_all: bool,

    /// Maximum embedded thumbnail height, inches.
    #[serde(default = "default_max_img_height_in")]
    pub max_img_height_in: f32,

    /// Maximum display-line width for reshaped Hebrew text, in characters.
    #[serde(default = "default_max_line_width")]
    pub max_line_width: usize,
}

fn default_time_zone() -> String {
    "UTC".to_string()
}
fn default_page_size() -> String {
    "a4".to_string()
}
fn default_max_filename_len() -> usize {
    127
}
fn default_max_img_height_in() -> f32 {
    2.0
}
fn default_max_line_width() -> usize {
    DEFAULT_MAX_LINE_WIDTH
}

impl Default for Config {
    fn default() -> Self {
        Config {
            in_dir: PathBuf::new(),
            out_dir: PathBuf::new(),
            start_date: None,
            end_date: None,
            time_zone: default_time_zone(),
            page_size: default_page_size(),
            max_filename_len: default_max_filename_len(),
            include_all: false,
            max_img_height_in: default_max_img_height_in(),
            max_line_width: default_max_line_width(),
        }
    }
}

/// Configuration error.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub message: String,
    pub field: Option<String>,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(field) = &self.field {
            write!(f, "Config error in '{}': {}", field, self.message)
        } else {
            write!(f, "Config error: {}", self.message)
        }
    }
}

impl std::error::Error for ConfigError {}

fn field_err(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError {
        message: message.into(),
        field: Some(field.to_string()),
    }
}

impl Config {
    /// Load configuration with full precedence:
    /// CLI args > environment variables > config file > defaults.
    pub fn load_with_args(args: &CliArgs) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        let config_path = args.config.clone().or_else(Self::default_config_path);
        if let Some(path) = &config_path {
            if path.exists() {
                match Self::load_from_file(path) {
                    Ok(file_config) => config = file_config,
                    Err(e) => {
                        log::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        config.apply_env_vars();
        config.apply_cli_args(args);
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &PathBuf) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            message: format!("Failed to read config file: {}", e),
            field: None,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError {
            message: format!("Failed to parse config file: {}", e),
            field: None,
        })
    }

    fn apply_env_vars(&mut self) {
        if let Ok(val) = env::var("CHAT2HTML_TIME_ZONE") {
            self.time_zone = val;
        }
        if let Ok(val) = env::var("CHAT2HTML_PAGE_SIZE") {
            self.page_size = val;
        }
        if let Ok(val) = env::var("CHAT2HTML_MAX_LINE_WIDTH") {
            if let Ok(width) = val.parse() {
                self.max_line_width = width;
            }
        }
    }

    fn apply_cli_args(&mut self, args: &CliArgs) {
        self.in_dir = args.in_dir.clone();
        self.out_dir = args.out_dir.clone();
        if let Some(date) = &args.start_date {
            self.start_date = Some(date.clone());
        }
        if let Some(date) = &args.end_date {
            self.end_date = Some(date.clone());
        }
        if let Some(zone) = &args.time_zone {
            self.time_zone = zone.clone();
        }
        if let Some(size) = &args.page_size {
            self.page_size = size.clone();
        }
        if let Some(len) = args.max_filename_len {
            self.max_filename_len = len;
        }
        if args.include_all {
            self.include_all = true;
        }
        if let Some(height) = args.max_img_height {
            self.max_img_height_in = height;
        }
        if let Some(width) = args.max_line_width {
            self.max_line_width = width;
        }
    }

    /// Validate the final configuration. Invalid values fail fast and are
    /// never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_line_width < 1 {
            return Err(field_err(
                "max_line_width",
                "Max line width must be at least 1",
            ));
        }
        if self.max_filename_len < 16 {
            return Err(field_err(
                "max_filename_len",
                "Max filename length must be at least 16",
            ));
        }
        if !(self.max_img_height_in > 0.0) || self.max_img_height_in > 20.0 {
            return Err(field_err(
                "max_img_height_in",
                "Max image height must be between 0 and 20 inches",
            ));
        }
        if PageSize::from_str(&self.page_size).is_none() {
            return Err(field_err(
                "page_size",
                format!(
                    "Unknown page size '{}'. Expected a4 or letter",
                    self.page_size
                ),
            ));
        }
        if self.time_zone.parse::<UtcOffset>().is_err() {
            return Err(field_err(
                "time_zone",
                format!(
                    "Unknown time zone '{}'. Expected UTC or a ±HH:MM offset",
                    self.time_zone
                ),
            ));
        }
        for (field, value) in [
            ("start_date", &self.start_date),
            ("end_date", &self.end_date),
        ] {
            if let Some(raw) = value {
                if raw.parse::<Date>().is_err() {
                    return Err(field_err(
                        field,
                        format!("Invalid date '{raw}'. Expected YYYY-MM-DD"),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("chat2html").join("config.toml"))
    }

    // Typed accessors for validated fields.

    pub fn effective_time_zone(&self) -> UtcOffset {
        self.time_zone.parse().unwrap_or(UtcOffset::UTC)
    }

    pub fn effective_page_size(&self) -> PageSize {
        PageSize::from_str(&self.page_size).unwrap_or_default()
    }

    pub fn effective_start_date(&self) -> Option<Date> {
        self.start_date.as_ref().and_then(|d| d.parse().ok())
    }

    pub fn effective_end_date(&self) -> Option<Date> {
        self.end_date.as_ref().and_then(|d| d.parse().ok())
    }

    /// Thumbnail height cap in CSS pixels (96 per inch).
    pub fn max_img_height_px(&self) -> u32 {
        (self.max_img_height_in * 96.0).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.time_zone, "UTC");
        assert_eq!(config.page_size, "a4");
        assert_eq!(config.max_filename_len, 127);
        assert_eq!(config.max_line_width, 60);
        assert!(!config.include_all);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_toml_parsing() {
        let toml_str = r#"
            time_zone = "+02:00"
            page_size = "letter"
            max_line_width = 72
            include_all = true
            start_date = "2024-01-01"
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.effective_time_zone().minutes(), 120);
        assert_eq!(config.effective_page_size(), PageSize::Letter);
        assert_eq!(config.max_line_width, 72);
        assert!(config.include_all);
        assert_eq!(
            config.effective_start_date().unwrap().to_string(),
            "2024-01-01"
        );
    }

    #[test]
    fn test_validation_rejects_zero_line_width() {
        let mut config = Config::default();
        config.max_line_width = 0;
        let err = config.validate().unwrap_err();
        assert_eq!(err.field.as_deref(), Some("max_line_width"));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = Config::default();
        config.page_size = "legal".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.time_zone = "Asia/Jerusalem".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.start_date = Some("01/02/2024".to_string());
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.max_img_height_in = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.max_filename_len = 5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cli_args_override() {
        let args = CliArgs::parse_from([
            "chat2html",
            "-i",
            "in",
            "-o",
            "out",
            "-z",
            "+03:00",
            "--max-line-width",
            "40",
            "--all",
        ]);
        let mut config = Config::default();
        config.apply_cli_args(&args);
        assert_eq!(config.in_dir, PathBuf::from("in"));
        assert_eq!(config.out_dir, PathBuf::from("out"));
        assert_eq!(config.effective_time_zone().minutes(), 180);
        assert_eq!(config.max_line_width, 40);
        assert!(config.include_all);
    }

    #[test]
    fn test_img_height_px() {
        let config = Config::default();
        assert_eq!(config.max_img_height_px(), 192);
    }
}
