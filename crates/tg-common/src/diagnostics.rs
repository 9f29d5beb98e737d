//! Error taxonomy (§7) and the scan-level error type.
//!
//! Ground: `tsz-common::diagnostics::Diagnostic` (category/code/message
//! shape) for the general approach of a small, explicit enum rather than a
//! single opaque error string; `tsz-cli` uses `anyhow` at its own boundary,
//! which `tg-cli` mirrors on top of `ScanError`.

pub use crate::options::OutOfScopeAction;
use std::fmt;

/// Top-level error returned by `tg_scan::scan`.
///
/// Per §7's propagation policy: "Errors during a per-package worker
/// short-circuit that worker and bubble up to the orchestrator, which
/// cancels remaining workers and returns the first error." Loader failures
/// and unresolvable references are *not* represented here - they are local
/// `Option`/`Result` values inside `tg-resolver`/`tg-graph` that surface
/// only as logged diagnostics (see `tracing::warn!` call sites).
#[derive(Debug)]
pub enum ScanError {
    /// Invalid include/exclude pattern or unknown option. Raised before any
    /// work starts.
    Config(String),
    /// The front-end failed to load or type-check a package; propagated
    /// verbatim as a fatal scan error.
    FrontEnd {
        package: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// An external reference exceeded `max_distance` and `out_of_scope` was
    /// set to `error`.
    OutOfScope { identifier: String, distance: u32 },
    /// The scan was cancelled via the external cancellation token before it
    /// could complete.
    Cancelled,
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanError::Config(msg) => write!(f, "invalid configuration: {msg}"),
            ScanError::FrontEnd { package, source } => {
                write!(f, "front-end failure in package {package}: {source}")
            }
            ScanError::OutOfScope {
                identifier,
                distance,
            } => write!(
                f,
                "reference to {identifier} exceeds max_distance (distance {distance})"
            ),
            ScanError::Cancelled => write!(f, "scan cancelled"),
        }
    }
}

impl std::error::Error for ScanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScanError::FrontEnd { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}
