//! Package Registry (C4, §4.4).
//!
//! Per-package bookkeeping: files, the comment index built by [`crate::comments`],
//! and the package's distance (§3 "distance: ... `1 + min(distance of any
//! package that references it)`"). Shares the insertion-order,
//! reader-writer-synchronized shape used by `tg-graph`'s `TypeGraph`/
//! `ValueTable` (§5), since the serializer's `packages` section must also
//! iterate deterministically.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, RwLock};

use indexmap::IndexMap;
use tg_source::Package;

use crate::comments::{index_comments, CommentIndex};

pub struct PackageFile {
    pub path: String,
    pub file_comments: Vec<String>,
}

pub struct PackageEntry {
    pub path: String,
    pub short_name: String,
    pub files: Vec<PackageFile>,
    pub comments_by_decl: CommentIndex,
    distance: AtomicU32,
}

impl PackageEntry {
    fn from_package(pkg: &dyn Package, distance: u32) -> Self {
        Self {
            path: pkg.path().to_string(),
            short_name: pkg.short_name().to_string(),
            files: pkg
                .files()
                .iter()
                .map(|f| PackageFile {
                    path: f.path.clone(),
                    file_comments: f.file_comments.clone(),
                })
                .collect(),
            comments_by_decl: index_comments(pkg),
            distance: AtomicU32::new(distance),
        }
    }

    pub fn distance(&self) -> u32 {
        self.distance.load(Ordering::Acquire)
    }

    pub fn lower_distance_to(&self, candidate: u32) {
        let mut current = self.distance.load(Ordering::Acquire);
        while candidate < current {
            match self.distance.compare_exchange_weak(
                current,
                candidate,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(observed) => current = observed,
            }
        }
    }
}

#[derive(Default)]
pub struct PackageRegistry {
    entries: RwLock<IndexMap<String, Arc<PackageEntry>>>,
}

impl PackageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<Arc<PackageEntry>> {
        self.entries.read().expect("package registry lock poisoned").get(path).cloned()
    }

    /// Registers a scanned root package at distance 0 (§4.5 step 3).
    pub fn register_root(&self, pkg: &dyn Package) -> Arc<PackageEntry> {
        self.get_or_insert(pkg, 0)
    }

    /// Registers (or updates the distance of) a package reached only
    /// through a reference from `referring_distance` (§4.6 "Package-distance
    /// propagation"). Distance only ever moves downward on later, shorter
    /// paths, via compare-and-set.
    pub fn register_referenced(&self, pkg: &dyn Package, referring_distance: u32) -> Arc<PackageEntry> {
        let candidate = referring_distance.saturating_add(1);
        let entry = self.get_or_insert(pkg, candidate);
        entry.lower_distance_to(candidate);
        entry
    }

    fn get_or_insert(&self, pkg: &dyn Package, distance: u32) -> Arc<PackageEntry> {
        if let Some(existing) = self.get(pkg.path()) {
            return existing;
        }
        let mut write_guard = self.entries.write().expect("package registry lock poisoned");
        write_guard
            .entry(pkg.path().to_string())
            .or_insert_with(|| Arc::new(PackageEntry::from_package(pkg, distance)))
            .clone()
    }

    pub fn entries_in_order(&self) -> Vec<(String, Arc<PackageEntry>)> {
        self.entries
            .read()
            .expect("package registry lock poisoned")
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().expect("package registry lock poisoned").len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tg_source::testkit::PackageBuilder;

    #[test]
    fn root_package_gets_distance_zero() {
        let registry = PackageRegistry::new();
        let pkg = PackageBuilder::new("example.com/mod/pkg", "pkg").build();
        let entry = registry.register_root(&pkg);
        assert_eq!(entry.distance(), 0);
    }

    #[test]
    fn referenced_package_distance_only_ever_decreases() {
        let registry = PackageRegistry::new();
        let pkg = PackageBuilder::new("example.com/mod/other", "other").build();
        registry.register_referenced(&pkg, 4);
        let entry = registry.get("example.com/mod/other").unwrap();
        assert_eq!(entry.distance(), 5);

        registry.register_referenced(&pkg, 1);
        assert_eq!(entry.distance(), 2);

        registry.register_referenced(&pkg, 9);
        assert_eq!(entry.distance(), 2);
    }
}
