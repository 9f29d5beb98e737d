//! Canonical Name Service.
//!
//! Every named entry in the graph is keyed by the string this module
//! produces. Unnamed composites never go through here: the resolver mints
//! their identifier directly from the monotonic [`UnnamedCounter`].

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Mutex;

/// `<pkg>.<name>`, or `<pkg>.<name>[<arg1>,<arg2>,...]` for an instantiated
/// generic. Package qualifier is always the full import path, never the
/// short package alias.
pub fn canonical_named(package: &str, name: &str) -> String {
    format!("{package}.{name}")
}

/// The fully qualified identifier for an instantiated generic, e.g.
/// `pkg.List[pkg2.Foo]`. `args` are already-canonicalized argument
/// identifiers, in declaration order.
pub fn canonical_instantiated(package: &str, name: &str, args: &[String]) -> String {
    let mut id = canonical_named(package, name);
    id.push('[');
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            id.push(',');
        }
        id.push_str(arg);
    }
    id.push(']');
    id
}

/// `<parent_id>#<member_name>` for fields and methods.
pub fn member_id(parent_id: &str, member_name: &str) -> String {
    let mut id = String::with_capacity(parent_id.len() + member_name.len() + 1);
    id.push_str(parent_id);
    id.push('#');
    id.push_str(member_name);
    id
}

/// `<parent_id>.<param_name>` for a type-parameter descriptor.
pub fn type_param_id(parent_id: &str, param_name: &str) -> String {
    format!("{parent_id}.{param_name}")
}

/// Generator for unnamed-composite identifiers:
/// `__unnamed_<kind>__<owner>#<n>__`. `owner` is the canonical id of the
/// nearest enclosing named declaration (struct, interface, alias, function,
/// signature, ...) whose own resolution synchronously mints every composite
/// nested inside it, in stable source-declaration order. Keeping a counter
/// per owner rather than one global counter means the sequence assigned
/// within any one owner never depends on how root packages or lazy loader
/// bodies happen to interleave across worker threads - only on that
/// owner's own (already order-stable) field/param iteration.
#[derive(Default)]
pub struct UnnamedCounter {
    next: Mutex<HashMap<String, u64>>,
}

impl UnnamedCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self, kind: &str, owner: &str) -> String {
        let n = {
            let mut table = self.next.lock().expect("unnamed counter mutex poisoned");
            let counter = table.entry(owner.to_string()).or_insert(0);
            let n = *counter;
            *counter += 1;
            n
        };
        let mut id = String::with_capacity(kind.len() + owner.len() + 16);
        let _ = write!(id, "__unnamed_{kind}__{owner}#{n}__");
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_named_joins_package_and_name() {
        assert_eq!(canonical_named("example.com/mod/pkg", "Widget"), "example.com/mod/pkg.Widget");
    }

    #[test]
    fn canonical_instantiated_includes_bracketed_args() {
        let id = canonical_instantiated("pkg", "List", &["int".to_string()]);
        assert_eq!(id, "pkg.List[int]");
    }

    #[test]
    fn unnamed_counter_is_monotonic_and_unique_per_owner() {
        let counter = UnnamedCounter::new();
        let a = counter.next("struct", "pkg.Holder");
        let b = counter.next("struct", "pkg.Holder");
        assert_ne!(a, b);
        assert!(a.starts_with("__unnamed_struct__pkg.Holder#"));
    }

    #[test]
    fn unnamed_counter_sequences_are_independent_per_owner() {
        let counter = UnnamedCounter::new();
        let a0 = counter.next("pointer", "pkg.A");
        let b0 = counter.next("pointer", "pkg.B");
        let a1 = counter.next("pointer", "pkg.A");
        assert_eq!(a0, "__unnamed_pointer__pkg.A#0__");
        assert_eq!(b0, "__unnamed_pointer__pkg.B#0__");
        assert_eq!(a1, "__unnamed_pointer__pkg.A#1__");
    }
}
