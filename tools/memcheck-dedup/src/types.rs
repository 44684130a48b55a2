//! Core types shared across the engine.

use serde::Serialize;

// ---------------------------------------------------------------------------
// Signature key
// ---------------------------------------------------------------------------

/// Digest of a block's canonical signature lines. Only used for index lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignatureKey(pub blake3::Hash);

impl SignatureKey {
  /// Digest the first `depth` lines (all of them when `depth == 0`).
  pub fn from_lines(lines: &[Vec<u8>], depth: usize) -> Self {
    let take = if depth == 0 { lines.len() } else { depth };
    let mut hasher = blake3::Hasher::new();
    for line in lines.iter().take(take) {
      hasher.update(line);
      hasher.update(b"\n");
    }
    Self(hasher.finalize())
  }

  pub fn to_hex(&self) -> String {
    self.0.to_hex().to_string()
  }
}

// ---------------------------------------------------------------------------
// Processing mode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
  Batch,
  Stream,
}

// ---------------------------------------------------------------------------
// Run summary
// ---------------------------------------------------------------------------

/// Counters for one run, reported at end of input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunStats {
  pub mode: Mode,
  pub vocabulary: &'static str,
  pub lines_read: u64,
  pub tagged_lines: u64,
  /// Non-empty blocks flushed.
  pub blocks: u64,
  /// Blocks written to the output.
  pub emitted: u64,
  /// Blocks dropped because their signature was already in the index.
  pub duplicates: u64,
  pub epoch_resets: u64,
  pub marker_seen: bool,
}

impl RunStats {
  pub fn new(mode: Mode, vocabulary: &'static str) -> Self {
    Self {
      mode,
      vocabulary,
      lines_read: 0,
      tagged_lines: 0,
      blocks: 0,
      emitted: 0,
      duplicates: 0,
      epoch_resets: 0,
      marker_seen: false,
    }
  }
}
