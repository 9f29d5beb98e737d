//! Serializer (C9, §4.8) - walks the materialized graph and produces a
//! deterministic, reference-vs-inline JSON tree (§6 "Output (produced)").
//!
//! Kept deliberately decoupled from `tg-scan`: it consumes the four tables
//! a scan produces (`TypeGraph`, `ValueTable`, `PackageRegistry`,
//! `BasicRegistry`) rather than a `tg_scan::ScanningResult`, so `tg-cli` can
//! sit between the two without `tg-serializer` depending on the
//! orchestrator crate.

mod body;
mod tree;
pub mod writer;

pub use tree::serialize;
