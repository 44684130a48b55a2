//! Structured error types for the dedup engine.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
  #[error("{input}:{line}: line is {size} bytes, limit is {limit}")]
  LineTooLong {
    input: String,
    line: usize,
    size: usize,
    limit: usize,
  },

  #[error("{input}:{line}: block grew to {size} bytes without a boundary, limit is {limit}")]
  BlockTooLarge {
    input: String,
    line: usize,
    size: usize,
    limit: usize,
  },

  #[error("{input}:{line}: {size} blocks pending without a marker, limit is {limit}")]
  TooManyPendingBlocks {
    input: String,
    line: usize,
    size: usize,
    limit: usize,
  },

  #[error("config: {field}: {reason}")]
  Config { field: String, reason: String },

  #[error("usage: {0}")]
  Usage(String),

  #[error("{context}: {source}")]
  Io {
    context: String,
    #[source]
    source: std::io::Error,
  },

  #[error("json: {0}")]
  Json(#[from] serde_json::Error),
}

impl EngineError {
  pub fn config(field: &str, reason: &str) -> Self {
    Self::Config {
      field: field.to_string(),
      reason: reason.to_string(),
    }
  }

  pub fn usage(msg: impl Into<String>) -> Self {
    Self::Usage(msg.into())
  }

  pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
    Self::Io {
      context: context.into(),
      source,
    }
  }

  /// True for the resource-guard violations.
  pub fn is_guard(&self) -> bool {
    matches!(
      self,
      Self::LineTooLong { .. } | Self::BlockTooLarge { .. } | Self::TooManyPendingBlocks { .. }
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn guard_message_names_limit_and_location() {
    let err = EngineError::LineTooLong {
      input: "vg.log".into(),
      line: 12,
      size: 2048,
      limit: 1024,
    };
    let msg = err.to_string();
    assert!(msg.starts_with("vg.log:12:"));
    assert!(msg.contains("2048"));
    assert!(msg.contains("1024"));
    assert!(err.is_guard());
  }

  #[test]
  fn config_error_is_not_a_guard() {
    let err = EngineError::config("marker", "must not be empty");
    assert_eq!(err.to_string(), "config: marker: must not be empty");
    assert!(!err.is_guard());
  }
}
