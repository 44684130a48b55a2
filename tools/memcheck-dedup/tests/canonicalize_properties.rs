use memcheck_dedup::{canonicalize, LineClassifier};
use proptest::prelude::*;

/// Bytes biased toward the characters the canonicalizer reacts to.
fn noisy_line() -> impl Strategy<Value = Vec<u8>> {
  let interesting = prop::sample::select(vec![
    b'0', b'1', b'9', b'x', b'a', b'F', b'A', b'D', b'R', b':', b'[', b']', b'<', b'>', b' ', b'\t', b'?',
  ]);
  prop::collection::vec(interesting, 0..96)
}

proptest! {
  #[test]
  fn canonicalize_is_idempotent_on_noisy_input(line in noisy_line()) {
    let once = canonicalize(&line);
    prop_assert_eq!(canonicalize(&once), once);
  }

  #[test]
  fn canonicalize_is_idempotent_on_arbitrary_bytes(line in prop::collection::vec(any::<u8>(), 0..256)) {
    let once = canonicalize(&line);
    prop_assert_eq!(canonicalize(&once), once);
  }

  #[test]
  fn canonical_form_is_trimmed_and_single_spaced(line in noisy_line()) {
    let out = canonicalize(&line);
    prop_assert!(out.first().map_or(true, |b| !b.is_ascii_whitespace()));
    prop_assert!(out.last().map_or(true, |b| !b.is_ascii_whitespace()));
    prop_assert!(!out.windows(2).any(|w| w[0].is_ascii_whitespace() && w[1].is_ascii_whitespace()));
  }

  #[test]
  fn classifier_never_panics(line in prop::collection::vec(any::<u8>(), 0..256)) {
    let c = LineClassifier::default();
    let stripped = c.strip_tag(&line);
    let _ = c.is_tagged(&line);
    let _ = c.starts_new_block(stripped);
    let _ = c.is_size_summary_header(stripped);
    let scrubbed = c.scrub(stripped);
    prop_assert!(scrubbed.len() <= stripped.len());
  }

  #[test]
  fn tag_prefix_does_not_change_signature(pid in 1u32..99999, body in "[ -~]{0,80}") {
    let c = LineClassifier::default();
    let tagged = format!("=={}== {}", pid, body);
    prop_assert!(c.is_tagged(tagged.as_bytes()));
    let stripped = c.strip_tag(tagged.as_bytes());
    prop_assert_eq!(canonicalize(stripped), canonicalize(body.as_bytes()));
  }
}
