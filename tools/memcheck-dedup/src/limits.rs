//! Hard resource ceilings. Not configurable; violation aborts the run.

/// Longest single input line, in bytes (excluding the line terminator).
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

/// Largest raw text a single block may accumulate before a boundary.
pub const MAX_BLOCK_BYTES: usize = 16 * 1024 * 1024;

/// Most blocks stream mode may hold while waiting for end of input.
pub const MAX_PENDING_BLOCKS: usize = 250_000;

/// The guard ceilings an engine enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
  pub max_line_bytes: usize,
  pub max_block_bytes: usize,
  pub max_pending_blocks: usize,
}

impl Default for Limits {
  fn default() -> Self {
    Self {
      max_line_bytes: MAX_LINE_BYTES,
      max_block_bytes: MAX_BLOCK_BYTES,
      max_pending_blocks: MAX_PENDING_BLOCKS,
    }
  }
}
