//! Top-level output tree assembly (§6 "Output (produced): a structured tree
//! with top-level sections `types`, `values`, `packages`").

use serde_json::{json, Map, Value};

use tg_graph::{BasicRegistry, TypeGraph, ValueKind, ValueTable};
use tg_resolver::PackageRegistry;

use crate::body::serialize_handle;

fn serialize_value_kind(kind: ValueKind) -> &'static str {
    match kind {
        ValueKind::Constant => "constant",
        ValueKind::Variable => "variable",
    }
}

/// Walks the graph, value table and package registry and produces the
/// deterministic `{ types, values, packages }` tree (§4.8, §6). Iteration
/// follows each table's own insertion order (P1 determinism), except
/// `commentsByDecl` keys, which are sorted since `comments_by_decl` itself
/// is an unordered map.
pub fn serialize(
    graph: &TypeGraph,
    values: &ValueTable,
    packages: &PackageRegistry,
    basics: &BasicRegistry,
) -> Value {
    let mut types = Map::new();
    for (id, descriptor) in graph.entries_in_order() {
        types.insert(id, crate::body::serialize_body(&descriptor, graph, basics));
    }

    let mut values_out = Map::new();
    for (id, entry) in values.entries_in_order() {
        values_out.insert(
            id,
            json!({
                "id": entry.id,
                "name": entry.name,
                "kind": serialize_value_kind(entry.kind),
                "package": entry.package,
                "exported": entry.exported,
                "distance": entry.distance(),
                "type": serialize_handle(&entry.ty, graph, basics),
                "value": entry.value,
                "comments": serde_json::to_value(&entry.comments).unwrap_or(Value::Null),
                "doc": entry.doc,
            }),
        );
    }

    let mut packages_out = Map::new();
    for (path, entry) in packages.entries_in_order() {
        let files: Vec<Value> = entry
            .files
            .iter()
            .map(|f| {
                json!({
                    "path": f.path,
                    "fileComments": f.file_comments,
                })
            })
            .collect();

        let mut decl_keys: Vec<&String> = entry.comments_by_decl.keys().collect();
        decl_keys.sort();
        let mut comments_by_decl = Map::new();
        for key in decl_keys {
            let comments = &entry.comments_by_decl[key];
            comments_by_decl.insert(key.clone(), serde_json::to_value(comments).unwrap_or(Value::Null));
        }

        packages_out.insert(
            path,
            json!({
                "path": entry.path,
                "shortName": entry.short_name,
                "files": files,
                "commentsByDecl": Value::Object(comments_by_decl),
                "distance": entry.distance(),
            }),
        );
    }

    json!({
        "types": Value::Object(types),
        "values": Value::Object(values_out),
        "packages": Value::Object(packages_out),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tg_graph::{Descriptor, DescriptorData, TypeKind};

    #[test]
    fn empty_graph_serializes_to_empty_sections() {
        let graph = TypeGraph::new();
        let values = ValueTable::new();
        let packages = PackageRegistry::new();
        let basics = BasicRegistry::new();

        let tree = serialize(&graph, &values, &packages, &basics);
        assert_eq!(tree["types"], json!({}));
        assert_eq!(tree["values"], json!({}));
        assert_eq!(tree["packages"], json!({}));
    }

    #[test]
    fn basic_reference_carries_id_as_name() {
        let graph = TypeGraph::new();
        let values = ValueTable::new();
        let packages = PackageRegistry::new();
        let basics = BasicRegistry::new();

        let descriptor = Arc::new(Descriptor::new(
            "pkg.Alias".into(),
            "Alias".into(),
            TypeKind::Alias,
            Some("pkg".into()),
            true,
            0,
            Vec::new(),
            Vec::new(),
            None,
            DescriptorData::Alias {
                underlying: tg_graph::TypeHandle::Ref("int".into()),
            },
        ));
        graph.set("pkg.Alias".into(), descriptor);

        let tree = serialize(&graph, &values, &packages, &basics);
        let underlying = &tree["types"]["pkg.Alias"]["underlying"];
        assert_eq!(underlying["id"], "int");
        assert_eq!(underlying["isNamed"], false);
    }
}
