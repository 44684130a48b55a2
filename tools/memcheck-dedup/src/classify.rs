//! Line classification: tags, block boundaries, size headers, raw scrubbing.
//!
//! All helpers are byte-level scanners over a single line; none of them keep
//! state between calls.

use crate::canonicalize::hex_run;

/// Versioned table of substrings that open a new diagnostic block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vocabulary {
  pub version: &'static str,
  pub block_starts: &'static [&'static str],
}

impl Vocabulary {
  /// Keywords observed in Valgrind Memcheck reports.
  pub const MEMCHECK_V1: Vocabulary = Vocabulary {
    version: "memcheck-v1",
    block_starts: &[
      "Invalid read",
      "Invalid write",
      "Invalid free",
      "Syscall param",
      "uninitialised",
      "definitely lost",
      "indirectly lost",
      "possibly lost",
      "still reachable",
      "Process terminating",
    ],
  };
}

impl Default for Vocabulary {
  fn default() -> Self {
    Self::MEMCHECK_V1
  }
}

/// Stateless predicates over one line, built once per run.
#[derive(Debug, Clone)]
pub struct LineClassifier {
  vocabulary: Vocabulary,
}

impl LineClassifier {
  pub fn new(vocabulary: Vocabulary) -> Self {
    Self { vocabulary }
  }

  pub fn vocabulary(&self) -> &Vocabulary {
    &self.vocabulary
  }

  /// `==<digits>==` at the very start of the line.
  pub fn is_tagged(&self, line: &[u8]) -> bool {
    tag_len(line).is_some()
  }

  /// Remove the tag and the whitespace after it. Untagged lines come back unchanged.
  pub fn strip_tag<'a>(&self, line: &'a [u8]) -> &'a [u8] {
    match tag_len(line) {
      Some(n) => trim_start(&line[n..]),
      None => line,
    }
  }

  /// Does this (tag-stripped) line open a new report?
  pub fn starts_new_block(&self, line: &[u8]) -> bool {
    self
      .vocabulary
      .block_starts
      .iter()
      .any(|kw| contains(line, kw.as_bytes()))
      || find_size_phrase(line).is_some()
  }

  /// Exactly `<N> bytes in <M> blocks`, nothing else on the line.
  pub fn is_size_summary_header(&self, line: &[u8]) -> bool {
    let line = trim(line);
    matches!(find_size_phrase(line), Some((0, end)) if end == line.len())
  }

  /// Remove addresses, dangling `at : ` / `by : ` fragments and `???` runs.
  pub fn scrub(&self, line: &[u8]) -> Vec<u8> {
    let out = strip_addresses(line);
    let out = strip_dangling_frames(&out);
    strip_question_runs(&out)
  }
}

impl Default for LineClassifier {
  fn default() -> Self {
    Self::new(Vocabulary::default())
  }
}

fn tag_len(line: &[u8]) -> Option<usize> {
  let rest = line.strip_prefix(b"==")?;
  let digits = rest.iter().take_while(|b| b.is_ascii_digit()).count();
  if digits == 0 || !rest[digits..].starts_with(b"==") {
    return None;
  }
  Some(2 + digits + 2)
}

fn trim_start(s: &[u8]) -> &[u8] {
  let n = s.iter().take_while(|b| b.is_ascii_whitespace()).count();
  &s[n..]
}

pub(crate) fn trim(s: &[u8]) -> &[u8] {
  let s = trim_start(s);
  let n = s.iter().rev().take_while(|b| b.is_ascii_whitespace()).count();
  &s[..s.len() - n]
}

pub(crate) fn contains(haystack: &[u8], needle: &[u8]) -> bool {
  find(haystack, needle, 0).is_some()
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
  if needle.is_empty() || from > haystack.len() {
    return None;
  }
  haystack[from..]
    .windows(needle.len())
    .position(|w| w == needle)
    .map(|p| p + from)
}

/// Memcheck prints counts with `,` thousands separators.
fn is_count_byte(b: u8) -> bool {
  b.is_ascii_digit() || b == b','
}

/// Locate `<N> bytes in <M> blocks` and return its byte span.
fn find_size_phrase(line: &[u8]) -> Option<(usize, usize)> {
  const MID: &[u8] = b" bytes in ";
  const TAIL: &[u8] = b" blocks";

  let mut from = 0;
  while let Some(at) = find(line, MID, from) {
    from = at + 1;

    let start = at - line[..at].iter().rev().take_while(|&&b| is_count_byte(b)).count();
    if start == at || !line[start].is_ascii_digit() {
      continue;
    }

    let m_start = at + MID.len();
    let m_len = line[m_start..].iter().take_while(|&&b| is_count_byte(b)).count();
    if m_len == 0 || !line[m_start].is_ascii_digit() {
      continue;
    }

    let tail = m_start + m_len;
    if line[tail..].starts_with(TAIL) {
      return Some((start, tail + TAIL.len()));
    }
  }
  None
}

fn strip_addresses(s: &[u8]) -> Vec<u8> {
  let mut out = Vec::with_capacity(s.len());
  let mut i = 0;
  while i < s.len() {
    if s[i] == b'0' && s.get(i + 1) == Some(&b'x') {
      let n = hex_run(&s[i + 2..]);
      if n > 0 {
        i += 2 + n;
        continue;
      }
    }
    out.push(s[i]);
    i += 1;
  }
  out
}

/// `at 0x4C2B: foo` becomes `at : foo` once the address is gone; drop the stub.
fn strip_dangling_frames(s: &[u8]) -> Vec<u8> {
  let mut out = Vec::with_capacity(s.len());
  let mut i = 0;
  while i < s.len() {
    let at_word_start = i == 0 || !s[i - 1].is_ascii_alphanumeric();
    if at_word_start && (s[i..].starts_with(b"at : ") || s[i..].starts_with(b"by : ")) {
      i += 5;
      continue;
    }
    out.push(s[i]);
    i += 1;
  }
  out
}

fn strip_question_runs(s: &[u8]) -> Vec<u8> {
  let mut out = Vec::with_capacity(s.len());
  let mut i = 0;
  while i < s.len() {
    let n = s[i..].iter().take_while(|&&b| b == b'?').count();
    if n >= 3 {
      i += n;
    } else if n > 0 {
      out.extend_from_slice(&s[i..i + n]);
      i += n;
    } else {
      out.push(s[i]);
      i += 1;
    }
  }
  out
}
