//! lockfile-lint core library.
//!
//! This crate exposes programmatic APIs for auditing npm and yarn lockfiles
//! against a fixed set of security policies.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Discovery and effective configuration resolution.
//! - `parser`: Lockfile parsing into normalized dependency records.
//! - `validators`: The built-in policies and their dispatch.
//! - `registry`: Selection of active validators from configuration.
//! - `lint`: Run orchestration and per-lockfile summaries.
//! - `models`: Data models for records, outcomes and summaries.
//! - `output`: Pretty/plain/JSON printers and exit status.
//! - `error`: The fatal error taxonomy.
pub mod cli;
pub mod config;
pub mod error;
pub mod lint;
pub mod models;
pub mod output;
pub mod parser;
pub mod registry;
pub mod validators;

pub use error::{LintError, Result};
