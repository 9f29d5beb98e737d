//! Scan Orchestrator (C8, §4.5 "Scan orchestration").
//!
//! Owns the one thing none of the lower crates are allowed to know about:
//! the order operations run in. Everything it calls - `tg_resolver`'s
//! `process_package`, `tg_graph`'s lazy loaders - is pure with respect to
//! scheduling; this module is where parallelism, cancellation and the
//! fixed-point loop actually live.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tg_common::{ScanError, ScanOptions};
use tg_graph::{BasicRegistry, TypeGraph, ValueTable};
use tg_resolver::{process_package, PackageProvider, PackageRegistry, Resolver};
use tg_source::Package;

use crate::cancellation::CancellationToken;
use crate::fixed_point::run_to_fixed_point;
use crate::processor::{merged_scan_mode, Processor};

/// Everything a completed scan produced, ready for `tg-serializer` to walk
/// (§6 "Output (produced)").
pub struct ScanningResult {
    pub graph: Arc<TypeGraph>,
    pub values: Arc<ValueTable>,
    pub packages: Arc<PackageRegistry>,
    pub basics: Arc<BasicRegistry>,
}

/// Runs one scan to completion per §4.5's numbered steps:
///
/// 1. Build the basic-type registry, graph, value table and package
///    registry.
/// 2. Merge the configured scan mode with every installed processor's
///    effective mode.
/// 3. Register every root package named in `options.packages` at distance
///    0.
/// 4. Process every root package in parallel, bounded by
///    `options.max_concurrency` and the cancellation token; imported
///    packages register themselves lazily, at `1 + min(referrer distance)`,
///    the first time something in them is actually referenced (C4).
/// 5. Run the fixed-point lazy-load loop until every struct/interface/
///    instantiated-generic placeholder is loaded.
/// 6. Notify every processor of every materialized descriptor.
///
/// Returns `Err` the moment any worker hits a front-end failure, the scan
/// is cancelled, or a reference crossed `max_distance` with
/// `out_of_scope = error` (§7).
pub fn scan(
    options: ScanOptions,
    provider: Arc<dyn PackageProvider>,
    roots: &FxHashMap<String, Arc<dyn Package>>,
    processors: &[Arc<dyn Processor>],
    cancellation: &CancellationToken,
) -> Result<ScanningResult, ScanError> {
    let graph = Arc::new(TypeGraph::new());
    let values = Arc::new(ValueTable::new());
    let basics = Arc::new(BasicRegistry::new());
    let packages = Arc::new(PackageRegistry::new());

    let mut effective_options = options;
    effective_options.scan_mode = merged_scan_mode(effective_options.scan_mode, processors);

    let resolver = Arc::new(Resolver::new(
        graph.clone(),
        values.clone(),
        basics.clone(),
        packages.clone(),
        provider,
        effective_options.clone(),
    ));

    let mut root_entries = Vec::with_capacity(roots.len());
    for (path, pkg) in roots {
        if cancellation.is_cancelled() {
            return Err(ScanError::Cancelled);
        }
        let entry = packages.register_root(pkg.as_ref());
        root_entries.push((path.clone(), pkg.clone(), entry));
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(effective_options.max_concurrency)
        .build()
        .map_err(|err| ScanError::Config(format!("failed to build worker pool: {err}")))?;

    let failure: std::sync::Mutex<Option<ScanError>> = std::sync::Mutex::new(None);
    pool.install(|| {
        use rayon::prelude::*;
        root_entries.par_iter().for_each(|(path, pkg, entry)| {
            if cancellation.is_cancelled() || failure.lock().expect("poisoned").is_some() {
                return;
            }
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                process_package(&resolver, pkg, entry);
            }));
            if let Err(panic) = result {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "front-end panicked while processing package".to_string());
                let mut guard = failure.lock().expect("poisoned");
                if guard.is_none() {
                    *guard = Some(ScanError::FrontEnd {
                        package: path.clone(),
                        source: Box::<dyn std::error::Error + Send + Sync>::from(message),
                    });
                }
            }
        });
    });

    if let Some(err) = failure.into_inner().expect("poisoned") {
        return Err(err);
    }
    if cancellation.is_cancelled() {
        return Err(ScanError::Cancelled);
    }
    if let Some((identifier, distance)) = resolver.out_of_scope_abort() {
        return Err(ScanError::OutOfScope { identifier, distance });
    }

    run_to_fixed_point(&graph, cancellation);

    if cancellation.is_cancelled() {
        return Err(ScanError::Cancelled);
    }
    if let Some((identifier, distance)) = resolver.out_of_scope_abort() {
        return Err(ScanError::OutOfScope { identifier, distance });
    }

    for id in graph.ids_in_order() {
        if let Some(descriptor) = graph.get(&id) {
            for processor in processors {
                processor.on_type_materialized(&descriptor);
            }
        }
    }

    Ok(ScanningResult {
        graph,
        values,
        packages,
        basics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tg_common::ScanMode;
    use tg_source::testkit::{named_type, PackageBuilder};
    use tg_source::{FieldDecl, SourceType, StructDecl};

    struct NoopProvider;
    impl PackageProvider for NoopProvider {
        fn package(&self, _path: &str) -> Option<Arc<dyn Package>> {
            None
        }
    }

    #[test]
    fn scans_a_single_root_package_with_one_struct() {
        let pkg = PackageBuilder::new("example.com/mod/pkg", "pkg")
            .named_type(named_type(
                "Widget",
                SourceType::Struct(StructDecl {
                    fields: vec![FieldDecl {
                        name: "Name".into(),
                        ty: SourceType::Basic("string".into()),
                        tag: String::new(),
                        embedded: false,
                        exported: true,
                        doc: None,
                        comment: None,
                    }],
                    type_params: Vec::new(),
                }),
                true,
            ))
            .build();
        let pkg: Arc<dyn Package> = Arc::new(pkg);

        let mut roots = FxHashMap::default();
        roots.insert("example.com/mod/pkg".to_string(), pkg);

        let mut options = ScanOptions::default();
        options.packages = vec!["example.com/mod/pkg".to_string()];
        options.scan_mode = ScanMode::FULL;

        let result = scan(
            options,
            Arc::new(NoopProvider),
            &roots,
            &[],
            &CancellationToken::new(),
        )
        .expect("scan should succeed");

        assert!(result.graph.has("example.com/mod/pkg.Widget"));
        let widget = result.graph.get("example.com/mod/pkg.Widget").unwrap();
        assert!(widget.is_loaded());
    }

    #[test]
    fn already_cancelled_token_short_circuits_before_processing() {
        let options = ScanOptions::default();
        let token = CancellationToken::new();
        token.cancel();
        let result = scan(options, Arc::new(NoopProvider), &FxHashMap::default(), &[], &token);
        assert!(matches!(result, Err(ScanError::Cancelled)));
    }
}
