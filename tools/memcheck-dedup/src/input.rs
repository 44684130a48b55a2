//! Line sources: bounded incremental reads for stream mode, full reads for batch mode.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::Path;

use crate::error::EngineError;

/// Reads one line at a time, never buffering more than `max_line + 1` bytes of it.
///
/// An over-long line is returned truncated to `max_line + 1` bytes so the
/// engine can report it; the remainder is never read.
pub struct LineSource<R> {
  reader: R,
  name: String,
  max_line: usize,
  buf: Vec<u8>,
}

impl<R: BufRead> LineSource<R> {
  pub fn new(reader: R, name: impl Into<String>, max_line: usize) -> Self {
    Self {
      reader,
      name: name.into(),
      max_line,
      buf: Vec::new(),
    }
  }

  /// Next line without its terminator, or `None` at end of input.
  pub fn next_line(&mut self) -> Result<Option<&[u8]>, EngineError> {
    self.buf.clear();
    // Room for the line, its `\n` and one extra byte to detect overflow.
    let cap = self.max_line.saturating_add(2) as u64;
    let n = (&mut self.reader)
      .take(cap)
      .read_until(b'\n', &mut self.buf)
      .map_err(|e| EngineError::io(format!("cannot read {}", self.name), e))?;
    if n == 0 {
      return Ok(None);
    }
    Ok(Some(strip_terminator(&self.buf)))
  }
}

/// Materialize the whole input as lines (terminators stripped).
pub fn read_all_lines<R: Read>(mut reader: R, name: &str) -> Result<Vec<Vec<u8>>, EngineError> {
  let mut data = Vec::new();
  reader
    .read_to_end(&mut data)
    .map_err(|e| EngineError::io(format!("cannot read {}", name), e))?;
  Ok(split_lines(&data))
}

/// Split a buffer into lines. A trailing terminator does not produce an empty last line.
pub fn split_lines(data: &[u8]) -> Vec<Vec<u8>> {
  if data.is_empty() {
    return Vec::new();
  }
  let body = data.strip_suffix(b"\n").unwrap_or(data);
  body.split(|&b| b == b'\n').map(|l| strip_terminator(l).to_vec()).collect()
}

/// Open the run's input and output, in that order.
///
/// The output file is only created once the input is known to be readable,
/// and never when it names the input file itself.
pub fn open_streams(
  input: Option<&Path>,
  output: Option<&Path>,
) -> Result<(Box<dyn BufRead>, Box<dyn Write>), EngineError> {
  let reader: Box<dyn BufRead> = match input {
    Some(path) => {
      let file = File::open(path).map_err(|e| EngineError::io(format!("cannot open {}", path.display()), e))?;
      Box::new(BufReader::new(file))
    }
    None => Box::new(io::stdin().lock()),
  };

  let writer: Box<dyn Write> = match output {
    Some(path) => {
      if let Some(input) = input {
        if same_file(input, path) {
          return Err(EngineError::usage(format!(
            "output {} is the input file; refusing to overwrite it",
            path.display()
          )));
        }
      }
      let file = File::create(path).map_err(|e| EngineError::io(format!("cannot create {}", path.display()), e))?;
      Box::new(file)
    }
    None => Box::new(io::stdout().lock()),
  };
  Ok((reader, writer))
}

/// A path that does not exist yet cannot be the same file as anything.
#[cfg(unix)]
fn same_file(a: &Path, b: &Path) -> bool {
  use std::os::unix::fs::MetadataExt;
  match (fs::metadata(a), fs::metadata(b)) {
    (Ok(a), Ok(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
    _ => false,
  }
}

#[cfg(not(unix))]
fn same_file(a: &Path, b: &Path) -> bool {
  match (fs::canonicalize(a), fs::canonicalize(b)) {
    (Ok(a), Ok(b)) => a == b,
    _ => false,
  }
}

fn strip_terminator(line: &[u8]) -> &[u8] {
  let line = line.strip_suffix(b"\n").unwrap_or(line);
  line.strip_suffix(b"\r").unwrap_or(line)
}
