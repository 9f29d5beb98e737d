//! The constant/variable value table, kept separate from the type graph
//! since constants and variables are values rather than types.
//!
//! Shares the same insertion-order, reader-writer-synchronized shape as
//! [`crate::graph::TypeGraph`], but keyed entries are [`ValueEntry`]
//! rather than [`crate::descriptor::Descriptor`] since constants/variables
//! never carry a lazy-loaded heavy payload or get referenced from inside
//! another descriptor's body the way a named type does.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, RwLock};

use indexmap::IndexMap;
use tg_common::Comment;

use crate::descriptor::TypeHandle;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    Constant,
    Variable,
}

pub struct ValueEntry {
    pub id: String,
    pub name: String,
    pub kind: ValueKind,
    pub package: String,
    pub exported: bool,
    distance: AtomicU32,
    pub ty: TypeHandle,
    /// Opaque literal payload; `None` for variables, which carry no
    /// compile-time value.
    pub value: Option<serde_json::Value>,
    pub comments: Vec<Comment>,
    pub doc: Option<String>,
}

impl ValueEntry {
    pub fn new(
        id: String,
        name: String,
        kind: ValueKind,
        package: String,
        exported: bool,
        distance: u32,
        ty: TypeHandle,
        value: Option<serde_json::Value>,
        comments: Vec<Comment>,
        doc: Option<String>,
    ) -> Self {
        Self {
            id,
            name,
            kind,
            package,
            exported,
            distance: AtomicU32::new(distance),
            ty,
            value,
            comments,
            doc,
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
pub struct ValueTable {
    entries: RwLock<IndexMap<String, Arc<ValueEntry>>>,
}

impl ValueTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<Arc<ValueEntry>> {
        self.entries.read().expect("value table lock poisoned").get(id).cloned()
    }

    pub fn set(&self, id: String, entry: Arc<ValueEntry>) -> Arc<ValueEntry> {
        {
            let read_guard = self.entries.read().expect("value table lock poisoned");
            if let Some(existing) = read_guard.get(&id) {
                return existing.clone();
            }
        }
        let mut write_guard = self.entries.write().expect("value table lock poisoned");
        write_guard.entry(id).or_insert(entry).clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().expect("value table lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn entries_in_order(&self) -> Vec<(String, Arc<ValueEntry>)> {
        self.entries
            .read()
            .expect("value table lock poisoned")
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_is_idempotent() {
        let table = ValueTable::new();
        let a = table.set(
            "pkg.MaxSize".into(),
            Arc::new(ValueEntry::new(
                "pkg.MaxSize".into(),
                "MaxSize".into(),
                ValueKind::Constant,
                "pkg".into(),
                true,
                0,
                TypeHandle::Ref("int".into()),
                Some(serde_json::json!(64)),
                Vec::new(),
                None,
            )),
        );
        let b = table.set(
            "pkg.MaxSize".into(),
            Arc::new(ValueEntry::new(
                "pkg.MaxSize".into(),
                "MaxSize".into(),
                ValueKind::Constant,
                "pkg".into(),
                true,
                0,
                TypeHandle::Ref("int".into()),
                Some(serde_json::json!(999)),
                Vec::new(),
                None,
            )),
        );
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.value, Some(serde_json::json!(64)));
    }
}
