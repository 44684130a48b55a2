//! Core engine: routes lines into blocks, deduplicates them per epoch, emits survivors.

use std::borrow::Cow;
use std::io::{BufRead, Read, Write};

use tracing::{debug, info, trace, warn};

use crate::block::BlockAccumulator;
use crate::canonicalize::canonicalize;
use crate::classify::{contains, trim, LineClassifier, Vocabulary};
use crate::config::Config;
use crate::dedup::DedupIndex;
use crate::error::EngineError;
use crate::input::{read_all_lines, LineSource};
use crate::limits::Limits;
use crate::types::*;

/// The dedup engine for a single run. Owns all per-run state; borrows the config.
///
/// Batch mode writes each surviving block as soon as it is decided. Stream mode
/// holds survivors until end of input, because a later marker discards them.
pub struct Engine<'a> {
  config: &'a Config,
  classifier: LineClassifier,
  limits: Limits,
  input_name: String,
  block: BlockAccumulator,
  index: DedupIndex,
  pending: Vec<Vec<u8>>,
  stats: RunStats,
  line_no: usize,
}

impl<'a> Engine<'a> {
  pub fn new(config: &'a Config) -> Self {
    Self::with_limits(config, Limits::default())
  }

  pub fn with_limits(config: &'a Config, limits: Limits) -> Self {
    let classifier = LineClassifier::new(Vocabulary::MEMCHECK_V1);
    let mode = if config.stream_mode { Mode::Stream } else { Mode::Batch };
    let stats = RunStats::new(mode, classifier.vocabulary().version);
    Self {
      config,
      classifier,
      limits,
      input_name: config.input_name(),
      block: BlockAccumulator::new(),
      index: DedupIndex::new(),
      pending: Vec::new(),
      stats,
      line_no: 0,
    }
  }

  /// Process `reader` in the mode the config asks for.
  pub fn run<R: BufRead, W: Write>(self, reader: R, out: &mut W) -> Result<RunStats, EngineError> {
    if self.config.stream_mode {
      self.run_stream(reader, out)
    } else {
      self.run_batch_reader(reader, out)
    }
  }

  /// Materialize `reader` and process it in batch mode.
  pub fn run_batch_reader<R: Read, W: Write>(self, reader: R, out: &mut W) -> Result<RunStats, EngineError> {
    let lines = read_all_lines(reader, &self.input_name)?;
    self.run_batch(&lines, out)
  }

  /// Batch mode over a fully materialized input.
  ///
  /// With trimming on, only the lines after the last marker are processed, and
  /// an input without any marker produces no output at all.
  pub fn run_batch<W: Write>(mut self, lines: &[Vec<u8>], out: &mut W) -> Result<RunStats, EngineError> {
    self.stats.mode = Mode::Batch;
    self.stats.lines_read = lines.len() as u64;
    for (i, line) in lines.iter().enumerate() {
      self.line_no = i + 1;
      self.check_line(line)?;
    }

    let start = if self.config.trim_enabled {
      let marker = self.config.marker.as_bytes();
      match lines.iter().rposition(|l| contains(l, marker)) {
        Some(at) => {
          debug!(line = at + 1, "processing region after last marker");
          self.stats.marker_seen = true;
          at + 1
        }
        None => {
          warn!(marker = %self.config.marker, "trim requested but no marker found; emitting nothing");
          return Ok(self.finish());
        }
      }
    } else {
      0
    };

    for (offset, line) in lines[start..].iter().enumerate() {
      self.line_no = start + offset + 1;
      self.ingest(line, out)?;
    }
    self.flush_block(out)?;
    Ok(self.finish())
  }

  /// Stream mode: one line at a time, markers reset the epoch.
  pub fn run_stream<R: BufRead, W: Write>(mut self, reader: R, out: &mut W) -> Result<RunStats, EngineError> {
    self.stats.mode = Mode::Stream;
    let mut source = LineSource::new(reader, self.input_name.clone(), self.limits.max_line_bytes);

    while let Some(line) = source.next_line()? {
      self.line_no += 1;
      self.stats.lines_read += 1;
      self.check_line(line)?;

      if self.config.trim_enabled && contains(line, self.config.marker.as_bytes()) {
        self.reset_epoch();
        continue;
      }
      self.ingest(line, out)?;
    }
    self.flush_block(out)?;

    if !self.config.trim_enabled || self.stats.marker_seen {
      for raw in std::mem::take(&mut self.pending) {
        self.write_block(&raw, out)?;
      }
    } else {
      warn!(
        marker = %self.config.marker,
        discarded = self.pending.len(),
        "trim requested but no marker found; emitting nothing"
      );
      self.pending.clear();
    }
    Ok(self.finish())
  }

  /// Route one line: ignore untagged noise, split blocks, accumulate content.
  fn ingest<W: Write>(&mut self, line: &[u8], out: &mut W) -> Result<(), EngineError> {
    if !self.classifier.is_tagged(line) {
      return Ok(());
    }
    self.stats.tagged_lines += 1;
    let stripped = self.classifier.strip_tag(line);

    if self.classifier.starts_new_block(stripped) {
      self.flush_block(out)?;
      if self.classifier.is_size_summary_header(stripped) {
        return Ok(());
      }
    }

    let raw: Cow<[u8]> = if self.config.scrub_raw {
      Cow::Owned(self.classifier.scrub(stripped))
    } else {
      Cow::Borrowed(stripped)
    };
    if trim(&raw).is_empty() {
      return Ok(());
    }

    let projected = self.block.projected_len(&raw);
    if projected > self.limits.max_block_bytes {
      return Err(EngineError::BlockTooLarge {
        input: self.input_name.clone(),
        line: self.line_no,
        size: projected,
        limit: self.limits.max_block_bytes,
      });
    }
    self.block.append(&raw, canonicalize(stripped));
    Ok(())
  }

  /// Close the current block and apply the dedup decision.
  fn flush_block<W: Write>(&mut self, out: &mut W) -> Result<(), EngineError> {
    let Some(block) = self.block.flush(self.config.signature_depth) else {
      return Ok(());
    };
    self.stats.blocks += 1;

    if self.index.contains(&block.key) {
      self.stats.duplicates += 1;
      debug!(line = self.line_no, key = %block.key.to_hex(), "duplicate block suppressed");
      return Ok(());
    }
    self.index.insert(block.key);
    self.emit(block.raw, out)
  }

  fn emit<W: Write>(&mut self, raw: Vec<u8>, out: &mut W) -> Result<(), EngineError> {
    match self.stats.mode {
      Mode::Batch => self.write_block(&raw, out),
      Mode::Stream => {
        if self.pending.len() >= self.limits.max_pending_blocks {
          return Err(EngineError::TooManyPendingBlocks {
            input: self.input_name.clone(),
            line: self.line_no,
            size: self.pending.len() + 1,
            limit: self.limits.max_pending_blocks,
          });
        }
        self.pending.push(raw);
        Ok(())
      }
    }
  }

  fn write_block<W: Write>(&mut self, raw: &[u8], out: &mut W) -> Result<(), EngineError> {
    out
      .write_all(raw)
      .and_then(|_| out.write_all(b"\n"))
      .map_err(|e| EngineError::io("cannot write output", e))?;
    self.stats.emitted += 1;
    trace!(bytes = raw.len(), "block emitted");
    Ok(())
  }

  /// Marker seen: everything accumulated so far in this epoch is void.
  fn reset_epoch(&mut self) {
    debug!(
      line = self.line_no,
      dropped_pending = self.pending.len(),
      known_keys = self.index.len(),
      "marker found, starting new epoch"
    );
    self.index.clear();
    self.pending.clear();
    self.block.clear();
    self.stats.epoch_resets += 1;
    self.stats.marker_seen = true;
  }

  fn check_line(&self, line: &[u8]) -> Result<(), EngineError> {
    if line.len() > self.limits.max_line_bytes {
      return Err(EngineError::LineTooLong {
        input: self.input_name.clone(),
        line: self.line_no,
        size: line.len(),
        limit: self.limits.max_line_bytes,
      });
    }
    Ok(())
  }

  fn finish(self) -> RunStats {
    info!(
      mode = ?self.stats.mode,
      lines = self.stats.lines_read,
      blocks = self.stats.blocks,
      emitted = self.stats.emitted,
      duplicates = self.stats.duplicates,
      epoch_resets = self.stats.epoch_resets,
      "run complete"
    );
    self.stats
  }
}
