//! Memcheck log deduplicator: deterministic, block-based canonicalization.
//!
//! Reads Valgrind Memcheck output, groups tagged lines into one block per
//! report, canonicalizes volatile details (addresses, line numbers, indices,
//! template arguments) and writes each distinct report once, in first-seen
//! order. An optional marker trims the output to the last region of the log.
//!
//! No network, no persistent state; pure computation + bounded in-memory state.

pub mod block;
pub mod canonicalize;
pub mod classify;
pub mod cli;
pub mod config;
pub mod dedup;
pub mod engine;
pub mod error;
pub mod input;
pub mod limits;
pub mod types;

pub use canonicalize::canonicalize;
pub use classify::{LineClassifier, Vocabulary};
pub use config::Config;
pub use engine::Engine;
pub use error::EngineError;
pub use limits::Limits;
pub use types::{Mode, RunStats, SignatureKey};
