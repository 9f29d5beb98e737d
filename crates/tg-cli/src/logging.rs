//! Tracing subscriber setup (§11 LOGGING).
//!
//! Mirrors `tsz-cli`'s use of `tracing_subscriber` + an `EnvFilter`, with a
//! `tracing-tree` layer swapped in for `--trace-tree` so nested spans
//! (per-package processing, per-descriptor loading) render indented for a
//! human reading the run directly; the flat formatter stays the default
//! since that's what plain `RUST_LOG`-driven tooling expects.

use tg_common::LogLevel;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

/// Builds and installs the global subscriber for `log_level`. Must be
/// called once, before the scan starts, since every component logs
/// through the `tracing` facade rather than printing directly.
pub fn init(level: LogLevel, tree: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_filter_str()));

    if tree {
        let registry = Registry::default()
            .with(filter)
            .with(tracing_tree::HierarchicalLayer::new(2).with_targets(true));
        let _ = registry.try_init();
    } else {
        let registry = Registry::default().with(filter).with(tracing_subscriber::fmt::layer());
        let _ = registry.try_init();
    }
}
