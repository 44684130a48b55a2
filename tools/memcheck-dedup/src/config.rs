//! Run configuration with sane defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::EngineError;

/// Display name used for stdin in error context.
pub const STDIN_NAME: &str = "<stdin>";

/// Resolved, read-only settings for one run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Number of leading canonical lines that form a block's signature (0 = all).
  pub signature_depth: usize,
  /// Only the region after the last marker survives; no marker means no output.
  pub trim_enabled: bool,
  /// Strip addresses, dangling `at :`/`by :` fragments and `???` runs from emitted text.
  pub scrub_raw: bool,
  /// Substring that marks an epoch boundary.
  pub marker: String,
  /// Process line by line instead of materializing the whole input.
  pub stream_mode: bool,
  /// Input file; `None` reads stdin.
  pub input: Option<PathBuf>,
  /// Output file; `None` writes stdout.
  pub output: Option<PathBuf>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      signature_depth: 0,
      trim_enabled: false,
      scrub_raw: false,
      marker: "DEDUP_MARKER".to_string(),
      stream_mode: false,
      input: None,
      output: None,
    }
  }
}

impl Config {
  /// Load a JSON config file. Missing keys keep their defaults.
  pub fn from_file(path: &Path) -> Result<Self, EngineError> {
    let contents = fs::read_to_string(path)
      .map_err(|e| EngineError::io(format!("cannot read config {}", path.display()), e))?;
    let config: Config = serde_json::from_str(&contents)?;
    Ok(config)
  }

  pub fn validate(&self) -> Result<(), EngineError> {
    if self.marker.is_empty() {
      return Err(EngineError::config("marker", "must not be empty"));
    }
    Ok(())
  }

  /// Name of the input for error messages.
  pub fn input_name(&self) -> String {
    match &self.input {
      Some(path) => path.display().to_string(),
      None => STDIN_NAME.to_string(),
    }
  }
}
