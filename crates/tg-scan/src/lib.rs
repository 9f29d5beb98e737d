//! Scan Orchestrator (C8, §4.5) plus the pieces the spec names only
//! through an interface and SPEC_FULL.md asks this crate to make concrete:
//! the cancellation token (§5), the `Processor` plug-in trait (§1), and
//! the on-disk cache envelope (§6 "Cache file").
//!
//! `tg-graph`/`tg-resolver` own *what* a scan produces; this crate owns
//! *how* a scan runs - worker pool, fixed-point loop, cache I/O.

pub mod cache;
pub mod cancellation;
pub mod fixed_point;
pub mod orchestrator;
pub mod processor;
pub mod provider;

pub use cancellation::CancellationToken;
pub use orchestrator::{scan, ScanningResult};
pub use processor::{merged_scan_mode, Processor};
pub use provider::MapProvider;
