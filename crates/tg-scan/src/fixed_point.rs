//! Fixed-point lazy-load expansion (§4.5 step 5).
//!
//! "After all packages finish, iterate: collect all graph identifiers not
//! yet loaded, sort lexicographically, and force-load each in parallel; a
//! successful load may discover new types that get added to the graph;
//! repeat until a pass finds no new identifiers."

use std::sync::Arc;

use rayon::prelude::*;
use tg_common::DEFAULT_LOADER_RETRY_COUNT;
use tg_graph::TypeGraph;

use crate::cancellation::CancellationToken;

/// Runs the fixed-point loop to completion (or until cancelled). Returns
/// the number of passes performed, mostly useful for tests/diagnostics.
pub fn run_to_fixed_point(graph: &Arc<TypeGraph>, cancellation: &CancellationToken) -> usize {
    let mut passes = 0;
    loop {
        if cancellation.is_cancelled() {
            tracing::warn!("fixed-point loading stopped: scan cancelled");
            break;
        }

        // Snapshot + sort lexicographically before this pass's worklist, so
        // the order loaders run in - and thus which new ids a given pass
        // can discover - is deterministic across runs (P1).
        let mut pending: Vec<String> = graph
            .ids_in_order()
            .into_iter()
            .filter(|id| graph.get(id).is_some_and(|d| !d.is_loaded()))
            .collect();
        pending.sort_unstable();

        if pending.is_empty() {
            break;
        }

        pending.par_iter().for_each(|id| {
            if cancellation.is_cancelled() {
                return;
            }
            if let Some(descriptor) = graph.get(id) {
                if let Err(err) = descriptor.force_load(DEFAULT_LOADER_RETRY_COUNT) {
                    tracing::error!(id = %id, %err, "descriptor loaded with partial payload");
                }
            }
        });

        passes += 1;
    }
    passes
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tg_graph::{Descriptor, DescriptorData, Loader, StructBody, TypeKind};

    #[test]
    fn fully_loaded_graph_takes_zero_passes() {
        let graph = Arc::new(TypeGraph::new());
        let token = CancellationToken::new();
        assert_eq!(run_to_fixed_point(&graph, &token), 0);
    }

    #[test]
    fn loads_every_struct_placeholder_and_discovers_chained_entries() {
        let graph = Arc::new(TypeGraph::new());
        let calls = Arc::new(AtomicU32::new(0));

        let graph_for_second = graph.clone();
        let second_loader: Arc<Loader<Arc<StructBody>>> = Arc::new(Loader::new(move |_| {
            Ok(Arc::new(StructBody {
                embeds: Vec::new(),
                fields: Vec::new(),
                methods: Vec::new(),
                type_params: Vec::new(),
            }))
        }));
        let _ = &graph_for_second;

        let calls_clone = calls.clone();
        let graph_clone = graph.clone();
        let first_loader: Arc<Loader<Arc<StructBody>>> = Arc::new(Loader::new(move |_| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
            let second = Arc::new(Descriptor::new(
                "pkg.Second".into(),
                "Second".into(),
                TypeKind::Struct,
                Some("pkg".into()),
                true,
                0,
                Vec::new(),
                Vec::new(),
                None,
                DescriptorData::Struct(second_loader.clone()),
            ));
            graph_clone.set("pkg.Second".into(), second);
            Ok(Arc::new(StructBody {
                embeds: Vec::new(),
                fields: Vec::new(),
                methods: Vec::new(),
                type_params: Vec::new(),
            }))
        }));

        let first = Arc::new(Descriptor::new(
            "pkg.First".into(),
            "First".into(),
            TypeKind::Struct,
            Some("pkg".into()),
            true,
            0,
            Vec::new(),
            Vec::new(),
            None,
            DescriptorData::Struct(first_loader),
        ));
        graph.set("pkg.First".into(), first);

        let token = CancellationToken::new();
        let passes = run_to_fixed_point(&graph, &token);
        assert!(passes >= 2, "expected at least two passes to pick up the discovered Second entry");
        assert!(graph.get("pkg.First").unwrap().is_loaded());
        assert!(graph.get("pkg.Second").unwrap().is_loaded());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
