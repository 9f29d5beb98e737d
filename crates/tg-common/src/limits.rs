//! Centralized limits and thresholds (ground: `tsz-common::limits`).

/// Default number of retries for a transient loader failure (§5 Retry,
/// §7 "Loader failure").
pub const DEFAULT_LOADER_RETRY_COUNT: u32 = 3;

/// Guard against runaway recursion when resolving deeply nested or
/// pathologically cyclic type expressions that slip past the graph's own
/// cycle-breaking (§4.6). This is a belt-and-suspenders cap, not something
/// any well-formed input should ever hit.
pub const MAX_RESOLUTION_DEPTH: usize = 4096;

/// Magic bytes identifying the on-disk cache envelope (§6 "Cache file").
pub const CACHE_MAGIC: &[u8; 8] = b"TGCACHE1";

/// Current cache envelope format version. Bump on any incompatible change
/// to the serialized graph shape.
pub const CACHE_VERSION: u32 = 1;
