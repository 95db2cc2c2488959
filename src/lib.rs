//! `issuedeck` - Command-line driver for the IssueDeck entity store
//!
//! This crate is the composition root for the `deck` binary: it resolves
//! configuration, builds exactly one [`deck_core::Store`], runs the
//! seed-then-hydrate initialization and dispatches commands against it.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - [`cli`] - Command-line interface using clap
//! - [`config`] - YAML configuration and environment overrides
//! - [`format`] - Output formatting (text, JSON)
//! - [`logging`] - tracing subscriber setup
//!
//! The store itself (schema, seed, persistence, derived views) lives in the
//! `deck-core` crate.

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod format;
pub mod logging;

/// Run the CLI application.
///
/// This is the main entry point called from `main()`.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded or the command fails.
pub fn run() -> anyhow::Result<()> {
    cli::run()
}
