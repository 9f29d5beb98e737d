//! Type Graph.
//!
//! Keyed map from identifier to descriptor. Operations: `get`, `set`
//! (idempotent; writing the same identifier twice retains the first),
//! `has`, `delete` (only used to retract early placeholders that fail to
//! resolve), iteration in insertion order for the serializer. Writes are
//! thread-safe.
//!
//! `IndexMap` is the one standard map that preserves insertion order under
//! mutation, which a plain `HashMap`/`DashMap` does not - and the
//! serializer's determinism depends on iterating `types` in the order
//! entries were first published. Wrapped in a `RwLock`: `get` is a
//! lock-free-fast read, `set` takes the writer.

use std::sync::{Arc, RwLock};

use indexmap::IndexMap;

use crate::descriptor::Descriptor;

#[derive(Default)]
pub struct TypeGraph {
    entries: RwLock<IndexMap<String, Arc<Descriptor>>>,
}

impl TypeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<Arc<Descriptor>> {
        self.entries.read().expect("type graph lock poisoned").get(id).cloned()
    }

    pub fn has(&self, id: &str) -> bool {
        self.entries.read().expect("type graph lock poisoned").contains_key(id)
    }

    /// Inserts `descriptor` under `id` unless an entry already exists, in
    /// which case the existing entry is kept and returned (idempotent set:
    /// any two entries sharing an identifier always refer to the identical
    /// descriptor).
    pub fn set(&self, id: String, descriptor: Arc<Descriptor>) -> Arc<Descriptor> {
        {
            let read_guard = self.entries.read().expect("type graph lock poisoned");
            if let Some(existing) = read_guard.get(&id) {
                return existing.clone();
            }
        }
        let mut write_guard = self.entries.write().expect("type graph lock poisoned");
        write_guard
            .entry(id)
            .or_insert(descriptor)
            .clone()
    }

    /// Retracts a placeholder that failed to resolve: if the loader later
    /// cannot obtain the underlying composite, the placeholder is retracted
    /// with `delete`.
    pub fn delete(&self, id: &str) {
        self.entries
            .write()
            .expect("type graph lock poisoned")
            .shift_remove(id);
    }

    pub fn len(&self) -> usize {
        self.entries.read().expect("type graph lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of identifiers in insertion order, for the fixed-point load
    /// pass and the serializer.
    pub fn ids_in_order(&self) -> Vec<String> {
        self.entries
            .read()
            .expect("type graph lock poisoned")
            .keys()
            .cloned()
            .collect()
    }

    /// All entries in insertion order, for the serializer.
    pub fn entries_in_order(&self) -> Vec<(String, Arc<Descriptor>)> {
        self.entries
            .read()
            .expect("type graph lock poisoned")
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{DescriptorData, TypeKind};

    fn basic(id: &str) -> Arc<Descriptor> {
        Arc::new(Descriptor::new(
            id.to_string(),
            id.to_string(),
            TypeKind::Basic,
            None,
            true,
            0,
            Vec::new(),
            Vec::new(),
            None,
            DescriptorData::Basic,
        ))
    }

    #[test]
    fn set_is_idempotent_and_keeps_first_writer() {
        let graph = TypeGraph::new();
        let first = graph.set("pkg.T".into(), basic("pkg.T"));
        let second = graph.set("pkg.T".into(), basic("pkg.T"));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn preserves_insertion_order() {
        let graph = TypeGraph::new();
        graph.set("pkg.B".into(), basic("pkg.B"));
        graph.set("pkg.A".into(), basic("pkg.A"));
        graph.set("pkg.C".into(), basic("pkg.C"));
        assert_eq!(graph.ids_in_order(), vec!["pkg.B", "pkg.A", "pkg.C"]);
    }

    #[test]
    fn delete_retracts_a_placeholder() {
        let graph = TypeGraph::new();
        graph.set("pkg.T".into(), basic("pkg.T"));
        assert!(graph.has("pkg.T"));
        graph.delete("pkg.T");
        assert!(!graph.has("pkg.T"));
    }
}
