//! Canonicalize a diagnostic line so reruns of the same report compare equal.
//!
//! Lines are treated as opaque bytes; nothing here assumes valid UTF-8.
//! Substitutions are applied in a fixed order:
//!
//! 1. `0x<hex>` -> `0xADDR`
//! 2. `:<digits>` -> `:LINE`
//! 3. `[<digits>]` -> `[]`
//! 4. `<...>` (no `>` inside) -> `<T>`
//! 5. whitespace runs -> one space
//! 6. trim
//!
//! The result is a fixed point: canonicalizing it again changes nothing.

const ADDR: &[u8] = b"ADDR";
const LINE: &[u8] = b"LINE";

pub fn canonicalize(line: &[u8]) -> Vec<u8> {
  let out = replace_addresses(line);
  let out = replace_line_numbers(&out);
  let out = replace_indices(&out);
  let out = replace_type_params(&out);
  collapse_whitespace(&out)
}

/// Length of the hex-digit run at the start of `s`.
pub(crate) fn hex_run(s: &[u8]) -> usize {
  s.iter().take_while(|b| b.is_ascii_hexdigit()).count()
}

fn digit_run(s: &[u8]) -> usize {
  s.iter().take_while(|b| b.is_ascii_digit()).count()
}

fn replace_addresses(s: &[u8]) -> Vec<u8> {
  let mut out = Vec::with_capacity(s.len());
  let mut i = 0;
  while i < s.len() {
    if s[i] == b'0' && s.get(i + 1) == Some(&b'x') {
      let rest = &s[i + 2..];
      // An existing placeholder stays as-is, otherwise "ADD" would be read as hex.
      let skip = if rest.starts_with(ADDR) {
        ADDR.len()
      } else {
        hex_run(rest)
      };
      if skip > 0 {
        out.extend_from_slice(b"0x");
        out.extend_from_slice(ADDR);
        i += 2 + skip;
        continue;
      }
    }
    out.push(s[i]);
    i += 1;
  }
  out
}

fn replace_line_numbers(s: &[u8]) -> Vec<u8> {
  let mut out = Vec::with_capacity(s.len());
  let mut i = 0;
  while i < s.len() {
    if s[i] == b':' {
      let n = digit_run(&s[i + 1..]);
      if n > 0 {
        out.push(b':');
        out.extend_from_slice(LINE);
        i += 1 + n;
        continue;
      }
    }
    out.push(s[i]);
    i += 1;
  }
  out
}

fn replace_indices(s: &[u8]) -> Vec<u8> {
  let mut out = Vec::with_capacity(s.len());
  let mut i = 0;
  while i < s.len() {
    if s[i] == b'[' {
      let n = digit_run(&s[i + 1..]);
      if n > 0 && s.get(i + 1 + n) == Some(&b']') {
        out.extend_from_slice(b"[]");
        i += n + 2;
        continue;
      }
    }
    out.push(s[i]);
    i += 1;
  }
  out
}

fn replace_type_params(s: &[u8]) -> Vec<u8> {
  let mut out = Vec::with_capacity(s.len());
  let mut i = 0;
  while i < s.len() {
    if s[i] == b'<' {
      if let Some(close) = s[i + 1..].iter().position(|&b| b == b'>') {
        out.extend_from_slice(b"<T>");
        i += close + 2;
        continue;
      }
      // No closing bracket anywhere after this point.
      out.extend_from_slice(&s[i..]);
      break;
    }
    out.push(s[i]);
    i += 1;
  }
  out
}

fn collapse_whitespace(s: &[u8]) -> Vec<u8> {
  let mut out = Vec::with_capacity(s.len());
  for word in s.split(|b| b.is_ascii_whitespace()).filter(|w| !w.is_empty()) {
    if !out.is_empty() {
      out.push(b' ');
    }
    out.extend_from_slice(word);
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  fn canon(s: &str) -> String {
    String::from_utf8(canonicalize(s.as_bytes())).unwrap()
  }

  #[test]
  fn addresses_and_lines() {
    assert_eq!(
      canon("   at 0x4C2BBAF: malloc (vg_replace_malloc.c:299)"),
      "at 0xADDR: malloc (vg_replace_malloc.c:LINE)"
    );
    assert_eq!(canon("by 0x40057E: main (leak.c:12)"), "by 0xADDR: main (leak.c:LINE)");
  }

  #[test]
  fn indices_and_templates() {
    assert_eq!(canon("buf[42] of std::vector<int, alloc<int>>"), "buf[] of std::vector<T>>");
    assert_eq!(canon("a[x1]"), "a[x1]");
    assert_eq!(canon("a < b"), "a < b");
  }

  #[test]
  fn whitespace_collapsed_and_trimmed() {
    assert_eq!(canon("\t Invalid   read\tof size 4  "), "Invalid read of size 4");
    assert_eq!(canon("   "), "");
  }

  #[test]
  fn existing_placeholders_are_stable() {
    for s in ["0xADDR", "0xADDRR", "0x12ADDR", ":LINE", "[]", "<T>", "0x0xADDR", ":0x1"] {
      let once = canonicalize(s.as_bytes());
      assert_eq!(canonicalize(&once), once, "input {:?}", s);
    }
  }

  #[test]
  fn bare_prefix_left_alone() {
    assert_eq!(canon("0x"), "0x");
    assert_eq!(canon("ratio 0xg"), "ratio 0xg");
    assert_eq!(canon("key:"), "key:");
  }

  #[test]
  fn invalid_utf8_passes_through() {
    let line = [0xff, b' ', 0xe2, 0x82, b':', b'7'];
    assert_eq!(canonicalize(&line), vec![0xff, b' ', 0xe2, 0x82, b':', b'L', b'I', b'N', b'E']);
  }
}
