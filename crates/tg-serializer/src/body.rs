//! Per-descriptor JSON bodies (§4.8 "Each descriptor produces either an
//! inline serialized form ... or a reference serialized form").

use serde_json::{json, Map, Value};

use tg_common::DEFAULT_LOADER_RETRY_COUNT;
use tg_graph::{
    BasicRegistry, ChanDirection, Descriptor, DescriptorData, FieldEntry, MethodEntry, ParamSlot,
    ResultSlot, SignaturePayload, TypeGraph, TypeHandle, TypeKind,
};

/// Looks a handle's target up wherever it actually lives: named types and
/// instantiated generics are graph-resident, basics are registry-resident
/// and never published to the graph (§4.2 "Basic descriptors ... are
/// shared across the whole graph (singleton)", never inserted by
/// `make_basic`).
fn lookup(graph: &TypeGraph, basics: &BasicRegistry, id: &str) -> Option<std::sync::Arc<Descriptor>> {
    graph.get(id).or_else(|| basics.get(id))
}

/// A reference serialized form: identifier, display name, kind, is-named,
/// owning package (§4.8 "identifier + display name + kind + is-named +
/// package").
fn serialize_reference(descriptor: &Descriptor) -> Value {
    json!({
        "id": descriptor.id,
        "displayName": descriptor.display_name,
        "kind": descriptor.kind.as_str(),
        "isNamed": !matches!(descriptor.kind, TypeKind::Basic),
        "package": descriptor.package,
    })
}

/// Dispatches one `TypeHandle` to its reference or inline form: an
/// `Inline` handle always serializes inline at its point of use (it has no
/// other home); a `Ref` handle serializes as a reference, since the only
/// place its target serializes inline is its own top-level `types` slot.
pub(crate) fn serialize_handle(handle: &TypeHandle, graph: &TypeGraph, basics: &BasicRegistry) -> Value {
    match handle {
        TypeHandle::Inline(descriptor) => serialize_body(descriptor, graph, basics),
        TypeHandle::Ref(id) => match lookup(graph, basics, id) {
            Some(descriptor) => serialize_reference(&descriptor),
            None => json!({ "id": id, "kind": "unresolved" }),
        },
    }
}

fn direction_str(direction: ChanDirection) -> &'static str {
    match direction {
        ChanDirection::Send => "send",
        ChanDirection::Recv => "recv",
        ChanDirection::Both => "both",
    }
}

fn comments_json(comments: &[tg_common::Comment]) -> Value {
    serde_json::to_value(comments).unwrap_or(Value::Null)
}

fn serialize_param(param: &ParamSlot, graph: &TypeGraph, basics: &BasicRegistry) -> Value {
    json!({
        "name": param.name,
        "type": serialize_handle(&param.ty, graph, basics),
        "variadic": param.variadic,
    })
}

fn serialize_result(result: &ResultSlot, graph: &TypeGraph, basics: &BasicRegistry) -> Value {
    json!({
        "name": result.name,
        "type": serialize_handle(&result.ty, graph, basics),
    })
}

fn serialize_signature(sig: &SignaturePayload, graph: &TypeGraph, basics: &BasicRegistry) -> Value {
    json!({
        "params": sig.params.iter().map(|p| serialize_param(p, graph, basics)).collect::<Vec<_>>(),
        "results": sig.results.iter().map(|r| serialize_result(r, graph, basics)).collect::<Vec<_>>(),
        "variadic": sig.variadic,
        "typeParams": sig.type_params,
    })
}

fn serialize_field(field: &FieldEntry, graph: &TypeGraph, basics: &BasicRegistry) -> Value {
    json!({
        "id": field.id,
        "name": field.name,
        "type": serialize_handle(&field.ty, graph, basics),
        "tag": field.tag,
        "embedded": field.embedded,
        "exported": field.exported,
        "promotedFrom": field.promoted_from,
        "parent": field.parent,
        "comments": comments_json(&field.comments),
        "doc": field.doc,
    })
}

fn serialize_method(method: &MethodEntry, graph: &TypeGraph, basics: &BasicRegistry) -> Value {
    json!({
        "id": method.id,
        "name": method.name,
        "exported": method.exported,
        "signature": serialize_signature(&method.signature, graph, basics),
        "receiver": method.receiver,
        "pointerReceiver": method.pointer_receiver,
        "promotedFrom": method.promoted_from,
        "comments": comments_json(&method.comments),
        "doc": method.doc,
    })
}

fn ref_handle(id: &str) -> TypeHandle {
    TypeHandle::Ref(id.to_string())
}

/// Builds a descriptor's full, kind-specific inline payload - what it
/// serializes to when visited as the top-level entry of its own identifier
/// slot in the `types` map, or as an unnamed composite at its point of use.
///
/// Struct/interface/instantiated-generic loaders are force-loaded here
/// (harmlessly idempotent - by the time a scan reaches serialization the
/// fixed-point phase has already loaded every graph entry) rather than
/// assumed pre-loaded, so this function also works against a graph built
/// directly in a test without going through `tg_scan::scan`.
pub(crate) fn serialize_body(descriptor: &Descriptor, graph: &TypeGraph, basics: &BasicRegistry) -> Value {
    let mut map = Map::new();
    map.insert("id".into(), json!(descriptor.id));
    map.insert("name".into(), json!(descriptor.display_name));
    map.insert("kind".into(), json!(descriptor.kind.as_str()));
    map.insert("isNamed".into(), json!(!matches!(descriptor.kind, TypeKind::Basic)));
    map.insert("package".into(), json!(descriptor.package));
    map.insert("exported".into(), json!(descriptor.exported));
    map.insert("distance".into(), json!(descriptor.distance()));
    map.insert("files".into(), json!(descriptor.files));
    map.insert("comments".into(), comments_json(&descriptor.comments));
    map.insert("doc".into(), json!(descriptor.doc));
    if !descriptor.type_params.is_empty() {
        map.insert("typeParams".into(), json!(descriptor.type_params));
    }

    match &descriptor.data {
        DescriptorData::Basic => {}
        DescriptorData::Pointer { element, depth } => {
            map.insert("element".into(), serialize_handle(element, graph, basics));
            map.insert("depth".into(), json!(depth));
        }
        DescriptorData::Slice { element } => {
            map.insert("element".into(), serialize_handle(element, graph, basics));
        }
        DescriptorData::Array { element, length } => {
            map.insert("element".into(), serialize_handle(element, graph, basics));
            map.insert("length".into(), json!(length));
        }
        DescriptorData::Map { key, value } => {
            map.insert("key".into(), serialize_handle(key, graph, basics));
            map.insert("value".into(), serialize_handle(value, graph, basics));
        }
        DescriptorData::Chan { element, direction } => {
            map.insert("element".into(), serialize_handle(element, graph, basics));
            map.insert("direction".into(), json!(direction_str(*direction)));
        }
        DescriptorData::Alias { underlying } => {
            map.insert("underlying".into(), serialize_handle(underlying, graph, basics));
        }
        DescriptorData::Function(signature) => {
            map.insert("signature".into(), serialize_signature(signature, graph, basics));
        }
        DescriptorData::Interface(loader) => match loader.load(DEFAULT_LOADER_RETRY_COUNT) {
            Ok(body) => {
                map.insert(
                    "embeds".into(),
                    json!(body
                        .embeds
                        .iter()
                        .map(|id| serialize_handle(&ref_handle(id), graph, basics))
                        .collect::<Vec<_>>()),
                );
                map.insert(
                    "methods".into(),
                    json!(body.methods.iter().map(|m| serialize_method(m, graph, basics)).collect::<Vec<_>>()),
                );
                map.insert("typeParams".into(), json!(body.type_params));
            }
            Err(err) => {
                map.insert("loadError".into(), json!(err.to_string()));
            }
        },
        DescriptorData::Struct(loader) => match loader.load(DEFAULT_LOADER_RETRY_COUNT) {
            Ok(body) => {
                map.insert(
                    "embeds".into(),
                    json!(body
                        .embeds
                        .iter()
                        .map(|id| serialize_handle(&ref_handle(id), graph, basics))
                        .collect::<Vec<_>>()),
                );
                map.insert(
                    "fields".into(),
                    json!(body.fields.iter().map(|f| serialize_field(f, graph, basics)).collect::<Vec<_>>()),
                );
                map.insert(
                    "methods".into(),
                    json!(body.methods.iter().map(|m| serialize_method(m, graph, basics)).collect::<Vec<_>>()),
                );
                map.insert("typeParams".into(), json!(body.type_params));
            }
            Err(err) => {
                map.insert("loadError".into(), json!(err.to_string()));
            }
        },
        DescriptorData::TypeParameter { index, constraint } => {
            map.insert("index".into(), json!(index));
            map.insert("constraint".into(), serialize_handle(constraint, graph, basics));
        }
        DescriptorData::InstantiatedGeneric(loader) => match loader.load(DEFAULT_LOADER_RETRY_COUNT) {
            Ok(body) => {
                map.insert("origin".into(), serialize_handle(&ref_handle(&body.origin), graph, basics));
                map.insert(
                    "args".into(),
                    json!(body
                        .args
                        .iter()
                        .map(|a| json!({
                            "paramName": a.param_name,
                            "index": a.index,
                            "type": serialize_handle(&a.ty, graph, basics),
                        }))
                        .collect::<Vec<_>>()),
                );
            }
            Err(err) => {
                map.insert("loadError".into(), json!(err.to_string()));
            }
        },
        DescriptorData::Union { terms } => {
            map.insert(
                "terms".into(),
                json!(terms
                    .iter()
                    .map(|t| json!({
                        "type": serialize_handle(&t.ty, graph, basics),
                        "approximation": t.approximation,
                    }))
                    .collect::<Vec<_>>()),
            );
        }
    }

    Value::Object(map)
}
