//! In-progress diagnostic block: raw text plus canonical signature lines.

use crate::classify::trim;
use crate::types::SignatureKey;

/// A completed block ready for the dedup decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlushedBlock {
  /// Raw lines, each terminated by `\n`.
  pub raw: Vec<u8>,
  pub key: SignatureKey,
}

/// Accumulates one block. Raw text and signature lines are always cleared together.
#[derive(Debug, Default)]
pub struct BlockAccumulator {
  raw: Vec<u8>,
  signature_lines: Vec<Vec<u8>>,
}

impl BlockAccumulator {
  pub fn new() -> Self {
    Self::default()
  }

  /// Add a line to the block. Blank candidates are ignored.
  ///
  /// Returns whether the line was taken.
  pub fn append(&mut self, raw_line: &[u8], canonical_line: Vec<u8>) -> bool {
    if trim(raw_line).is_empty() || canonical_line.is_empty() {
      return false;
    }
    self.raw.extend_from_slice(raw_line);
    self.raw.push(b'\n');
    self.signature_lines.push(canonical_line);
    true
  }

  /// Size the raw text would reach after appending `raw_line`.
  pub fn projected_len(&self, raw_line: &[u8]) -> usize {
    self.raw.len() + raw_line.len() + 1
  }

  /// Close the block. Empty blocks yield nothing; state is reset either way.
  pub fn flush(&mut self, depth: usize) -> Option<FlushedBlock> {
    if self.raw.is_empty() {
      self.clear();
      return None;
    }
    let key = SignatureKey::from_lines(&self.signature_lines, depth);
    let raw = std::mem::take(&mut self.raw);
    self.signature_lines.clear();
    Some(FlushedBlock { raw, key })
  }

  pub fn clear(&mut self) {
    self.raw.clear();
    self.signature_lines.clear();
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::canonicalize::canonicalize;

  impl BlockAccumulator {
    fn is_empty(&self) -> bool {
      self.raw.is_empty()
    }

    fn raw_len(&self) -> usize {
      self.raw.len()
    }

    fn line_count(&self) -> usize {
      self.signature_lines.len()
    }
  }

  fn push(acc: &mut BlockAccumulator, line: &str) -> bool {
    acc.append(line.as_bytes(), canonicalize(line.as_bytes()))
  }

  #[test]
  fn empty_flush_returns_none() {
    let mut acc = BlockAccumulator::new();
    assert!(acc.flush(0).is_none());
    assert!(acc.is_empty());
  }

  #[test]
  fn blank_lines_are_not_appended() {
    let mut acc = BlockAccumulator::new();
    assert!(!push(&mut acc, "   "));
    assert!(!push(&mut acc, ""));
    assert!(acc.is_empty());
    assert_eq!(acc.line_count(), 0);
  }

  #[test]
  fn flush_returns_raw_and_clears() {
    let mut acc = BlockAccumulator::new();
    assert!(push(&mut acc, "Invalid read of size 4"));
    assert!(push(&mut acc, "at 0x4C2BBAF: f (a.c:12)"));
    assert_eq!(acc.line_count(), 2);

    let block = acc.flush(0).unwrap();
    assert_eq!(block.raw, b"Invalid read of size 4\nat 0x4C2BBAF: f (a.c:12)\n");
    assert!(acc.is_empty());
    assert_eq!(acc.line_count(), 0);
    assert!(acc.flush(0).is_none());
  }

  #[test]
  fn volatile_parts_do_not_change_key() {
    let mut a = BlockAccumulator::new();
    push(&mut a, "Invalid read of size 4");
    push(&mut a, "at 0x4C2BBAF: f (a.c:12)");
    let mut b = BlockAccumulator::new();
    push(&mut b, "Invalid read of size 4");
    push(&mut b, "at 0x1111: f (a.c:99)");
    assert_eq!(a.flush(0).unwrap().key, b.flush(0).unwrap().key);
  }

  #[test]
  fn projected_len_counts_terminator() {
    let mut acc = BlockAccumulator::new();
    push(&mut acc, "abc");
    assert_eq!(acc.raw_len(), 4);
    assert_eq!(acc.projected_len(b"de"), 7);
  }
}
