//! Local error taxonomy for the resolver (§7).
//!
//! "Unresolvable reference" and "Placeholder retraction" never escape as a
//! fatal [`tg_common::ScanError`]: `resolve` returns `None` and the caller
//! logs at debug level and skips the slot. Only loader failures (bounded by
//! [`tg_graph::Loader`]'s retry budget) and out-of-scope references are
//! surfaced any further, and even those stay local unless `out_of_scope` is
//! set to `error` (handled by `tg-scan`, which does see `ScanError`).

use tg_common::OutOfScopeAction;

#[derive(Debug)]
pub enum ResolveOutcome {
    Resolved,
    /// §7 "Unresolvable reference": the front-end handed back a non-nil
    /// source type that the resolver could not map to a descriptor.
    Unresolvable { reason: String },
    /// §7 "External-reference out-of-scope": exceeded `max_distance`.
    OutOfScope { identifier: String, distance: u32, action: OutOfScopeAction },
}
