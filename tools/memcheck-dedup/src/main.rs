//! Binary entrypoint: read Memcheck output, write deduplicated reports.
//!
//! Exit codes: 0 on success, 1 when the run fails (resource guard, I/O),
//! 2 for usage or configuration errors.

use std::io::{self, BufWriter, Write};
use std::process;

use memcheck_dedup::cli::{self, Command, Invocation};
use memcheck_dedup::input::open_streams;
use memcheck_dedup::{Engine, EngineError, RunStats};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
  init_logging();

  let invocation = match cli::parse(std::env::args().skip(1)) {
    Ok(Command::Run(inv)) => inv,
    Ok(Command::Help) => {
      println!("{}", cli::USAGE);
      return;
    }
    Err(e) => {
      let _ = writeln!(io::stderr(), "memcheck-dedup: {}", e);
      let _ = writeln!(io::stderr(), "{}", cli::USAGE);
      process::exit(2);
    }
  };

  match run(&invocation) {
    Ok(stats) => {
      if invocation.print_stats {
        match serde_json::to_string(&stats) {
          Ok(json) => {
            let _ = writeln!(io::stderr(), "{}", json);
          }
          Err(e) => tracing::error!("cannot encode run summary: {}", e),
        }
      }
    }
    Err(e) => {
      let _ = writeln!(io::stderr(), "memcheck-dedup: {}", e);
      let code = match e {
        EngineError::Usage(_) | EngineError::Config { .. } => 2,
        _ => 1,
      };
      process::exit(code);
    }
  }
}

/// Logs go to stderr; stdout carries the filtered reports.
fn init_logging() {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "memcheck_dedup=warn".into()),
    )
    .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
    .init();
}

fn run(invocation: &Invocation) -> Result<RunStats, EngineError> {
  let config = &invocation.config;
  tracing::debug!(?config, "starting run");

  let (reader, writer) = open_streams(config.input.as_deref(), config.output.as_deref())?;
  let mut out = BufWriter::new(writer);
  let stats = Engine::new(config).run(reader, &mut out)?;

  out
    .flush()
    .map_err(|e| EngineError::io("cannot write output", e))?;
  Ok(stats)
}
