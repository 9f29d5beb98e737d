//! CLI glue: argument parsing, configuration loading, logging setup, and
//! wiring `tg-scan` + `tg-serializer` together (§10 "tg-cli").
//!
//! Kept as a library with a thin `src/bin/tg.rs` wrapper so the driver
//! itself is unit-testable without spawning a process, the same shape
//! `tsz-cli` uses for its own multiple binaries.

pub mod args;
pub mod config;
pub mod logging;
pub mod manifest;
pub mod run;
