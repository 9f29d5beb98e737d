//! Processor plug-ins (§1 "Processor plug-ins": "opaque visitors that
//! influence the effective scan mode and may observe each produced type").
//!
//! Named only through its interface in spec.md; SPEC_FULL.md §15 asks for
//! the trait itself since the rest of the orchestrator already needs a
//! concrete type to merge scan modes over and to notify after processing.

use tg_common::ScanMode;
use tg_graph::Descriptor;

/// An opaque visitor installed into a scan. Two hooks, both optional:
/// widening the effective scan mode (§4.5 step 2: "Merge the maximum
/// scan-mode across configured mode and every installed processor"), and
/// observing each type as it is published to the graph.
pub trait Processor: Send + Sync {
    /// The scan mode this processor needs in order to do its job, merged
    /// (bitwise-OR) into the configured mode before any package is
    /// processed. Defaults to requiring nothing beyond what's configured.
    fn effective_scan_mode(&self) -> ScanMode {
        ScanMode::NONE
    }

    /// Called once for every descriptor newly published to the graph,
    /// after its heavy payload (if any) has been force-loaded to fixed
    /// point. Purely observational - a processor cannot mutate the graph
    /// through this hook.
    fn on_type_materialized(&self, _descriptor: &Descriptor) {}
}

/// Folds the configured mode with every installed processor's effective
/// mode (§4.5 step 2).
pub fn merged_scan_mode(configured: ScanMode, processors: &[std::sync::Arc<dyn Processor>]) -> ScanMode {
    processors
        .iter()
        .fold(configured, |mode, p| mode.max(p.effective_scan_mode()))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NeedsDocs;
    impl Processor for NeedsDocs {
        fn effective_scan_mode(&self) -> ScanMode {
            ScanMode::DOCS
        }
    }

    #[test]
    fn merged_mode_widens_with_processor_requirements() {
        let processors: Vec<std::sync::Arc<dyn Processor>> = vec![std::sync::Arc::new(NeedsDocs)];
        let merged = merged_scan_mode(ScanMode::BASIC, &processors);
        assert!(merged.contains(ScanMode::DOCS));
        assert!(merged.contains(ScanMode::TYPES));
    }

    #[test]
    fn no_processors_keeps_configured_mode() {
        let merged = merged_scan_mode(ScanMode::BASIC, &[]);
        assert_eq!(merged, ScanMode::BASIC);
    }
}
