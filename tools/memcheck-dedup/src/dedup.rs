//! Epoch-scoped set of seen signature keys.

use std::collections::HashSet;

use crate::types::SignatureKey;

#[derive(Debug, Default)]
pub struct DedupIndex {
  seen: HashSet<SignatureKey>,
}

impl DedupIndex {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn contains(&self, key: &SignatureKey) -> bool {
    self.seen.contains(key)
  }

  /// Record `key`. Returns `true` if it was not seen before in this epoch.
  pub fn insert(&mut self, key: SignatureKey) -> bool {
    self.seen.insert(key)
  }

  pub fn len(&self) -> usize {
    self.seen.len()
  }

  pub fn is_empty(&self) -> bool {
    self.seen.is_empty()
  }

  /// Forget everything; called on epoch reset.
  pub fn clear(&mut self) {
    self.seen.clear();
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn key(s: &str) -> SignatureKey {
    SignatureKey::from_lines(&[s.as_bytes().to_vec()], 0)
  }

  #[test]
  fn first_insert_is_new_second_is_not() {
    let mut index = DedupIndex::new();
    assert!(!index.contains(&key("a")));
    assert!(index.insert(key("a")));
    assert!(index.contains(&key("a")));
    assert!(!index.insert(key("a")));
    assert_eq!(index.len(), 1);
  }

  #[test]
  fn clear_forgets_keys() {
    let mut index = DedupIndex::new();
    index.insert(key("a"));
    index.insert(key("b"));
    index.clear();
    assert!(index.is_empty());
    assert!(!index.contains(&key("a")));
  }
}
