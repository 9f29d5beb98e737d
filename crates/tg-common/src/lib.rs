//! Common types shared across the typegraph crates.
//!
//! This crate sits at the bottom of the workspace dependency graph so that
//! `tg-graph`, `tg-resolver`, `tg-scan` and `tg-serializer` can all share the
//! same span, comment, diagnostic and option types without creating cycles.

pub mod comments;
pub mod diagnostics;
pub mod limits;
pub mod options;
pub mod position;
pub mod span;

pub use comments::{field_decl_key, method_decl_key, Comment, CommentPlacement, PACKAGE_DOC_KEY};
pub use diagnostics::{OutOfScopeAction, ScanError};
pub use limits::{CACHE_MAGIC, CACHE_VERSION, DEFAULT_LOADER_RETRY_COUNT, MAX_RESOLUTION_DEPTH};
pub use options::{ExternalPackagesOptions, LogLevel, ScanMode, ScanOptions, Visibility};
pub use position::{Location, Position};
pub use span::Span;
