//! Struct materialization (§3 "struct", §4.6 "Cycle breaking", "Embedding
//! and promotion").
//!
//! A struct's descriptor is published to the graph (named case) or handed
//! back as an inline handle (anonymous case) *before* its field/method
//! payload is computed: the payload lives behind a [`Loader`] so a
//! self-referential field (`type Node struct { next *Node }`) resolves the
//! `*Node` reference against an already-present placeholder instead of
//! recursing forever.

use std::sync::Arc;

use tg_common::{field_decl_key, method_decl_key, Comment, DEFAULT_LOADER_RETRY_COUNT};
use tg_graph::{
    ident, Descriptor, DescriptorData, FieldEntry, LoadError, Loader, MethodEntry, StructBody,
    TypeHandle, TypeKind,
};
use tg_source::{FieldDecl, NamedTypeDecl, Package, StructDecl};

use crate::resolver::{resolve_type_expr, ResolveScope, Resolver};
use crate::resolver_func::{process_signature, resolve_with_pointer_collapse, unwrap_pointer_depth};

/// Context available only for a named struct: the owning package (for
/// `methods_of`) and the declared type name (for comment-key lookups).
struct NamedContext {
    pkg: Arc<dyn Package>,
    type_name: String,
}

/// Materializes a named struct type, installs its placeholder in the graph
/// immediately, and returns its id.
pub fn make_struct_decl(
    resolver: &Arc<Resolver>,
    pkg: &Arc<dyn Package>,
    scope: &ResolveScope,
    own_id: &str,
    decl: &NamedTypeDecl,
    body: &StructDecl,
    comments: Vec<Comment>,
) -> String {
    let type_param_ids: Vec<String> = decl
        .type_params
        .iter()
        .map(|p| ident::type_param_id(own_id, &p.name))
        .collect();

    let resolver_c = resolver.clone();
    let scope_c = scope.clone();
    let own_id_owned = own_id.to_string();
    let fields_decl = body.fields.clone();
    let ctx = NamedContext {
        pkg: pkg.clone(),
        type_name: decl.name.clone(),
    };
    let type_param_ids_for_body = type_param_ids.clone();

    let loader: Arc<Loader<Arc<StructBody>>> = Arc::new(Loader::new(move |_attempt| {
        build_struct_body(
            &resolver_c,
            &scope_c,
            &own_id_owned,
            Some(&ctx),
            &fields_decl,
            type_param_ids_for_body.clone(),
        )
    }));

    let descriptor = Arc::new(Descriptor::new(
        own_id.to_string(),
        decl.name.clone(),
        TypeKind::Struct,
        Some(pkg.path().to_string()),
        decl.exported,
        scope.package.distance(),
        Vec::new(),
        comments,
        decl.doc.clone(),
        DescriptorData::Struct(loader),
    ));
    resolver.graph.set(own_id.to_string(), descriptor);
    own_id.to_string()
}

/// Materializes an anonymous struct literal type (`struct{...}`). Built
/// eagerly since it has no name to be the target of a recursive reference,
/// and - unlike the named case - never published to the graph: §3
/// "Unnamed composites ... are owned by their immediate container ...
/// they are never inserted into the global graph." Still wrapped in an
/// (already-resolved) [`Loader`] purely to share [`DescriptorData::Struct`]'s
/// shape with the named case, so the serializer can treat both uniformly.
pub fn make_anonymous_struct(
    resolver: &Arc<Resolver>,
    scope: &ResolveScope,
    id: &str,
    body: &StructDecl,
) -> Arc<Descriptor> {
    let result = build_struct_body(resolver, scope, id, None, &body.fields, Vec::new());
    let loader: Arc<Loader<Arc<StructBody>>> = Arc::new(Loader::new(move |_attempt| result.clone()));
    Arc::new(Descriptor::new(
        id.to_string(),
        "struct{...}".to_string(),
        TypeKind::Struct,
        Some(scope.package.path.clone()),
        true,
        scope.package.distance(),
        Vec::new(),
        Vec::new(),
        None,
        DescriptorData::Struct(loader),
    ))
}

fn build_struct_body(
    resolver: &Arc<Resolver>,
    scope: &ResolveScope,
    own_id: &str,
    ctx: Option<&NamedContext>,
    fields_decl: &[FieldDecl],
    type_params: Vec<String>,
) -> Result<Arc<StructBody>, LoadError> {
    let mut fields = Vec::new();
    let mut embeds = Vec::new();
    let mut promoted_fields = Vec::new();
    let mut promoted_methods = Vec::new();
    let fields_mode = resolver
        .scan_mode_for(scope.package.distance())
        .contains(tg_common::ScanMode::FIELDS);

    let visibility = resolver.visibility_for(scope.package.distance());

    if fields_mode {
        for field in fields_decl {
            // Embedding still needs to be walked even when the embedded
            // field's own visibility would hide it as a regular field,
            // since its promoted members have their own (independently
            // filtered) visibility; the embedded field itself is never
            // added to `fields` either way (§4.6 field materialization:
            // "the embedded field itself is NOT added to fields").
            if field.embedded {
                let (element, _depth) = unwrap_pointer_depth(&field.ty);
                let mut embed_scope = scope.nested();
                if let Some(embed_handle) = resolve_type_expr(resolver, &mut embed_scope, element) {
                    embeds.push(embed_handle.id().to_string());
                    promote_from(resolver, &embed_handle, own_id, &mut promoted_fields, &mut promoted_methods);
                }
                continue;
            }

            if !visibility.admits(field.exported) {
                continue;
            }

            let mut field_scope = scope.nested();
            let Some(ty) = resolve_with_pointer_collapse(resolver, &mut field_scope, &field.ty) else {
                tracing::debug!(field = %field.name, parent = %own_id, "unresolvable field type");
                continue;
            };

            let comments = ctx
                .map(|c| resolver.comments_for(&scope.package, &field_decl_key(&c.type_name, &field.name)))
                .unwrap_or_default();

            fields.push(FieldEntry {
                id: ident::member_id(own_id, &field.name),
                name: field.name.clone(),
                ty: ty.clone(),
                tag: field.tag.clone(),
                embedded: false,
                exported: field.exported,
                promoted_from: None,
                parent: own_id.to_string(),
                comments,
                doc: field.doc.clone(),
            });
        }
    }

    let mut methods = Vec::new();
    if resolver
        .scan_mode_for(scope.package.distance())
        .contains(tg_common::ScanMode::METHODS)
    {
        if let Some(ctx) = ctx {
            for method in ctx.pkg.methods_of(&ctx.type_name) {
                if !resolver.visibility_for(scope.package.distance()).admits(method.exported) {
                    continue;
                }
                let mut method_scope = scope.nested();
                let signature = process_signature(resolver, &mut method_scope, &method.signature);
                methods.push(MethodEntry {
                    id: ident::member_id(own_id, &method.name),
                    name: method.name.clone(),
                    exported: method.exported,
                    signature,
                    receiver: own_id.to_string(),
                    pointer_receiver: method.pointer_receiver,
                    promoted_from: None,
                    comments: resolver.comments_for(&scope.package, &method_decl_key(&ctx.type_name, &method.name)),
                    doc: method.doc.clone(),
                });
            }
        }
    }

    fields.extend(promoted_fields);
    methods.extend(promoted_methods);

    Ok(Arc::new(StructBody {
        embeds,
        fields,
        methods,
        type_params,
    }))
}

/// Promotes an embedded type's own fields/methods onto the embedding
/// struct (§4.6 scenario "embedding promotes fields/methods"; I7/P8).
/// Works for both struct and interface embeds - an interface has no
/// fields, only methods.
pub(crate) fn promote_from(
    resolver: &Arc<Resolver>,
    embed_handle: &TypeHandle,
    own_id: &str,
    promoted_fields: &mut Vec<FieldEntry>,
    promoted_methods: &mut Vec<MethodEntry>,
) {
    let Some(descriptor) = fetch_descriptor(resolver, embed_handle) else {
        return;
    };

    match &descriptor.data {
        DescriptorData::Struct(loader) => {
            let Ok(body) = loader.load(DEFAULT_LOADER_RETRY_COUNT) else {
                return;
            };
            for f in &body.fields {
                promoted_fields.push(FieldEntry {
                    id: ident::member_id(own_id, &f.name),
                    name: f.name.clone(),
                    ty: f.ty.clone(),
                    tag: f.tag.clone(),
                    embedded: false,
                    exported: f.exported,
                    promoted_from: Some(descriptor.id.clone()),
                    parent: own_id.to_string(),
                    comments: f.comments.clone(),
                    doc: f.doc.clone(),
                });
            }
            for m in &body.methods {
                promoted_methods.push(promoted_method(m, own_id, &descriptor.id));
            }
        }
        DescriptorData::Interface(loader) => {
            let Ok(body) = loader.load(DEFAULT_LOADER_RETRY_COUNT) else {
                return;
            };
            for m in &body.methods {
                promoted_methods.push(promoted_method(m, own_id, &descriptor.id));
            }
        }
        _ => {}
    }
}

fn promoted_method(m: &MethodEntry, own_id: &str, origin_id: &str) -> MethodEntry {
    MethodEntry {
        id: ident::member_id(own_id, &m.name),
        name: m.name.clone(),
        exported: m.exported,
        signature: m.signature.clone(),
        // I6/P7: receiver is the owning struct/interface by identity, and a
        // promoted method is now owned by `own_id` (mirrors the promoted
        // field's `parent: own_id` just above) - not the embedded type that
        // originally declared it, which `promoted_from` already records.
        receiver: own_id.to_string(),
        pointer_receiver: m.pointer_receiver,
        promoted_from: Some(origin_id.to_string()),
        comments: m.comments.clone(),
        doc: m.doc.clone(),
    }
}

fn fetch_descriptor(resolver: &Arc<Resolver>, handle: &TypeHandle) -> Option<Arc<Descriptor>> {
    match handle {
        TypeHandle::Ref(id) => resolver.graph.get(id),
        TypeHandle::Inline(d) => Some(d.clone()),
    }
}
