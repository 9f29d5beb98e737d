//! Basic-Type Registry.
//!
//! A fixed table built once at scan start: primitives, the predeclared
//! sentinels, and the untyped-constant normalization table. Basics are
//! singletons shared across the whole graph - looking one up never mutates
//! anything, so a plain `HashMap` built once and handed out by immutable
//! reference is enough; no `RwLock` needed here unlike the type graph or
//! package registry.

use std::collections::HashMap;
use std::sync::Arc;

use crate::descriptor::{Descriptor, DescriptorData, TypeKind};

const PRIMITIVES: &[&str] = &[
    "bool",
    "int",
    "int8",
    "int16",
    "int32",
    "int64",
    "uint",
    "uint8",
    "uint16",
    "uint32",
    "uint64",
    "uintptr",
    "float32",
    "float64",
    "complex64",
    "complex128",
    "byte",
    "rune",
    "string",
];

const SENTINELS: &[&str] = &["error", "comparable", "any"];

/// Untyped-constant default types: an untyped constant is normalized to
/// its default typed form before lookup.
fn normalize_untyped(name: &str) -> &str {
    match name {
        "untyped int" => "int",
        "untyped float" => "float64",
        "untyped complex" => "complex128",
        "untyped string" => "string",
        "untyped bool" => "bool",
        "untyped rune" => "int32",
        "untyped nil" => "any",
        other => other,
    }
}

pub struct BasicRegistry {
    entries: HashMap<&'static str, Arc<Descriptor>>,
}

impl BasicRegistry {
    pub fn new() -> Self {
        let mut entries = HashMap::with_capacity(PRIMITIVES.len() + SENTINELS.len());
        for name in PRIMITIVES.iter().chain(SENTINELS.iter()) {
            entries.insert(
                *name,
                Arc::new(Descriptor::new(
                    (*name).to_string(),
                    (*name).to_string(),
                    TypeKind::Basic,
                    None,
                    true,
                    0,
                    Vec::new(),
                    Vec::new(),
                    None,
                    DescriptorData::Basic,
                )),
            );
        }
        Self { entries }
    }

    /// Looks up `name`, normalizing an untyped-constant spelling first.
    pub fn get(&self, name: &str) -> Option<Arc<Descriptor>> {
        self.entries.get(normalize_untyped(name)).cloned()
    }

    pub fn is_basic(&self, name: &str) -> bool {
        self.entries.contains_key(normalize_untyped(name))
    }
}

impl Default for BasicRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_primitives_and_sentinels() {
        let reg = BasicRegistry::new();
        assert!(reg.get("int").is_some());
        assert!(reg.get("error").is_some());
        assert!(reg.get("comparable").is_some());
        assert!(reg.get("nonexistent").is_none());
    }

    #[test]
    fn normalizes_untyped_constants_before_lookup() {
        let reg = BasicRegistry::new();
        let resolved = reg.get("untyped int").unwrap();
        assert_eq!(resolved.id, "int");
        let resolved = reg.get("untyped string").unwrap();
        assert_eq!(resolved.id, "string");
    }

    #[test]
    fn basics_are_singletons() {
        let reg = BasicRegistry::new();
        let a = reg.get("int").unwrap();
        let b = reg.get("int").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
