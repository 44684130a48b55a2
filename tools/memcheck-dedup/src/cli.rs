//! Command-line parsing into a resolved configuration.
//!
//! Flags are layered on top of the config file (if any), which is layered on
//! top of the defaults.

use std::path::PathBuf;

use crate::config::Config;
use crate::error::EngineError;

pub const USAGE: &str = "\
Usage: memcheck-dedup [OPTIONS] [INPUT]

Reads Memcheck output from INPUT (or stdin, or `-`) and writes each distinct
report once, in first-seen order, followed by a blank line.

Options:
  -o, --output <FILE>   write to FILE instead of stdout
  -d, --depth <N>       signature depth in lines (0 = whole report)
  -t, --trim            keep only reports after the last marker
                        (no marker in the input means NO output)
  -s, --scrub           strip addresses, dangling frames and ??? from output
  -m, --marker <TEXT>   marker substring (default DEDUP_MARKER)
      --stream          process line by line instead of loading the input
  -c, --config <FILE>   JSON config file, applied before other flags
      --stats           print a JSON run summary on stderr
  -h, --help            show this help";

/// What the binary should do.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
  Run(Invocation),
  Help,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
  pub config: Config,
  pub print_stats: bool,
}

#[derive(Debug, Default)]
struct Flags {
  config_file: Option<PathBuf>,
  output: Option<PathBuf>,
  input: Option<PathBuf>,
  depth: Option<usize>,
  marker: Option<String>,
  trim: bool,
  scrub: bool,
  stream: bool,
  stats: bool,
}

/// Parse arguments (without the program name).
pub fn parse<I, S>(args: I) -> Result<Command, EngineError>
where
  I: IntoIterator<Item = S>,
  S: Into<String>,
{
  let mut flags = Flags::default();
  let mut args = args.into_iter().map(Into::<String>::into);

  while let Some(arg) = args.next() {
    match arg.as_str() {
      "-h" | "--help" => return Ok(Command::Help),
      "-t" | "--trim" => flags.trim = true,
      "-s" | "--scrub" => flags.scrub = true,
      "--stream" => flags.stream = true,
      "--stats" => flags.stats = true,
      "-o" | "--output" => flags.output = Some(PathBuf::from(value(&mut args, &arg)?)),
      "-c" | "--config" => flags.config_file = Some(PathBuf::from(value(&mut args, &arg)?)),
      "-m" | "--marker" => flags.marker = Some(value(&mut args, &arg)?),
      "-d" | "--depth" => {
        let raw = value(&mut args, &arg)?;
        let depth = raw
          .parse()
          .map_err(|_| EngineError::usage(format!("{} expects a non-negative integer, got {:?}", arg, raw)))?;
        flags.depth = Some(depth);
      }
      "-" => set_input(&mut flags, None)?,
      other if other.starts_with('-') => {
        return Err(EngineError::usage(format!("unknown option {}", other)));
      }
      path => set_input(&mut flags, Some(PathBuf::from(path)))?,
    }
  }

  let mut config = match &flags.config_file {
    Some(path) => Config::from_file(path)?,
    None => Config::default(),
  };
  if let Some(depth) = flags.depth {
    config.signature_depth = depth;
  }
  if let Some(marker) = flags.marker {
    config.marker = marker;
  }
  config.trim_enabled |= flags.trim;
  config.scrub_raw |= flags.scrub;
  config.stream_mode |= flags.stream;
  if flags.input.is_some() {
    config.input = flags.input;
  }
  if flags.output.is_some() {
    config.output = flags.output;
  }
  config.validate()?;

  Ok(Command::Run(Invocation {
    config,
    print_stats: flags.stats,
  }))
}

fn value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, EngineError> {
  args
    .next()
    .ok_or_else(|| EngineError::usage(format!("{} requires a value", flag)))
}

fn set_input(flags: &mut Flags, input: Option<PathBuf>) -> Result<(), EngineError> {
  if flags.input.is_some() {
    return Err(EngineError::usage("more than one input given"));
  }
  flags.input = input;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn run(args: &[&str]) -> Invocation {
    match parse(args.iter().copied()).unwrap() {
      Command::Run(inv) => inv,
      Command::Help => panic!("unexpected help"),
    }
  }

  #[test]
  fn no_args_is_defaults() {
    let inv = run(&[]);
    assert_eq!(inv.config.signature_depth, 0);
    assert!(!inv.config.trim_enabled);
    assert!(inv.config.input.is_none());
    assert!(!inv.print_stats);
  }

  #[test]
  fn all_flags() {
    let inv = run(&[
      "-d", "6", "--trim", "-s", "--stream", "-m", "=== RESET ===", "-o", "out.txt", "--stats", "vg.log",
    ]);
    assert_eq!(inv.config.signature_depth, 6);
    assert!(inv.config.trim_enabled);
    assert!(inv.config.scrub_raw);
    assert!(inv.config.stream_mode);
    assert_eq!(inv.config.marker, "=== RESET ===");
    assert_eq!(inv.config.output, Some(PathBuf::from("out.txt")));
    assert_eq!(inv.config.input, Some(PathBuf::from("vg.log")));
    assert!(inv.print_stats);
  }

  #[test]
  fn dash_means_stdin() {
    let inv = run(&["-"]);
    assert!(inv.config.input.is_none());
  }

  #[test]
  fn help_short_circuits() {
    assert!(parse(["--bogus-after", "-h"].iter().copied()).is_err());
    assert_eq!(parse(["-h", "--bogus-after"].iter().copied()).unwrap(), Command::Help);
  }

  #[test]
  fn bad_depth_is_usage_error() {
    let err = parse(["-d", "-1"].iter().copied()).unwrap_err();
    assert!(matches!(err, EngineError::Usage(_)));
  }

  #[test]
  fn missing_value_is_usage_error() {
    let err = parse(["--marker"].iter().copied()).unwrap_err();
    assert!(err.to_string().contains("--marker requires a value"));
  }

  #[test]
  fn empty_marker_rejected() {
    let err = parse(["-m", ""].iter().copied()).unwrap_err();
    assert!(matches!(err, EngineError::Config { .. }));
  }

  #[test]
  fn two_inputs_rejected() {
    let err = parse(["a.log", "b.log"].iter().copied()).unwrap_err();
    assert!(err.to_string().contains("more than one input"));
  }
}
