//! The concrete `PackageProvider` used by [`crate::orchestrator::scan`].
//!
//! The front-end itself is out of scope (§1 "named only through its
//! interface"); what `tg-scan` needs from it is just "hand me every
//! already-loaded package by path", which a plain map over whatever the
//! caller resolved from `ScanOptions::packages` satisfies.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tg_resolver::PackageProvider;
use tg_source::Package;

/// Wraps a pre-loaded `path -> Package` map so the resolver can pull in
/// packages it discovers transitively (via imports) without the caller
/// having to predict the full transitive closure up front.
pub struct MapProvider {
    packages: FxHashMap<String, Arc<dyn Package>>,
}

impl MapProvider {
    pub fn new(packages: FxHashMap<String, Arc<dyn Package>>) -> Self {
        Self { packages }
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }
}

impl PackageProvider for MapProvider {
    fn package(&self, path: &str) -> Option<Arc<dyn Package>> {
        self.packages.get(path).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tg_source::testkit::PackageBuilder;

    #[test]
    fn returns_known_packages_and_none_for_unknown() {
        let pkg = Arc::new(PackageBuilder::new("example.com/mod/pkg", "pkg").build());
        let mut map: FxHashMap<String, Arc<dyn Package>> = FxHashMap::default();
        map.insert(pkg.path().to_string(), pkg.clone());
        let provider = MapProvider::new(map);

        assert!(provider.package("example.com/mod/pkg").is_some());
        assert!(provider.package("example.com/mod/missing").is_none());
        assert_eq!(provider.paths().count(), 1);
    }
}
