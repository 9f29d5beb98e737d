//! Interface materialization (§3 "interface", §4.6 "Cycle breaking",
//! "Embedding and promotion"). Mirrors `resolver_struct`'s placeholder-then-
//! lazy-body pattern; interfaces carry methods and embeds but no fields.

use std::sync::Arc;

use tg_common::{method_decl_key, Comment, DEFAULT_LOADER_RETRY_COUNT};
use tg_graph::{ident, Descriptor, DescriptorData, FieldEntry, InterfaceBody, LoadError, Loader, MethodEntry, TypeKind};
use tg_source::{InterfaceDecl, NamedTypeDecl, Package};

use crate::resolver::{resolve_type_expr, ResolveScope, Resolver};
use crate::resolver_func::process_signature;
use crate::resolver_struct::promote_from;

struct NamedContext {
    type_name: String,
}

pub fn make_interface_decl(
    resolver: &Arc<Resolver>,
    pkg: &Arc<dyn Package>,
    scope: &ResolveScope,
    own_id: &str,
    decl: &NamedTypeDecl,
    body: &InterfaceDecl,
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
    let body_decl = body.clone();
    let ctx = NamedContext {
        type_name: decl.name.clone(),
    };
    let type_param_ids_for_body = type_param_ids.clone();

    let loader: Arc<Loader<Arc<InterfaceBody>>> = Arc::new(Loader::new(move |_attempt| {
        build_interface_body(&resolver_c, &scope_c, &own_id_owned, Some(&ctx), &body_decl, type_param_ids_for_body.clone())
    }));

    let descriptor = Arc::new(Descriptor::new(
        own_id.to_string(),
        decl.name.clone(),
        TypeKind::Interface,
        Some(pkg.path().to_string()),
        decl.exported,
        scope.package.distance(),
        Vec::new(),
        comments,
        decl.doc.clone(),
        DescriptorData::Interface(loader),
    ));
    resolver.graph.set(own_id.to_string(), descriptor);
    own_id.to_string()
}

/// Mirrors [`crate::resolver_struct::make_anonymous_struct`]: built eagerly,
/// never published to the graph (§3 "Unnamed composites ... never inserted
/// into the global graph").
pub fn make_anonymous_interface(
    resolver: &Arc<Resolver>,
    scope: &ResolveScope,
    id: &str,
    body: &InterfaceDecl,
) -> Arc<Descriptor> {
    let result = build_interface_body(resolver, scope, id, None, body, Vec::new());
    let loader: Arc<Loader<Arc<InterfaceBody>>> = Arc::new(Loader::new(move |_attempt| result.clone()));
    Arc::new(Descriptor::new(
        id.to_string(),
        "interface{...}".to_string(),
        TypeKind::Interface,
        Some(scope.package.path.clone()),
        true,
        scope.package.distance(),
        Vec::new(),
        Vec::new(),
        None,
        DescriptorData::Interface(loader),
    ))
}

fn build_interface_body(
    resolver: &Arc<Resolver>,
    scope: &ResolveScope,
    own_id: &str,
    ctx: Option<&NamedContext>,
    body: &InterfaceDecl,
    type_params: Vec<String>,
) -> Result<Arc<InterfaceBody>, LoadError> {
    let mut embeds = Vec::new();
    let mut promoted_fields: Vec<FieldEntry> = Vec::new();
    let mut promoted_methods = Vec::new();

    for embed in &body.embeds {
        let mut embed_scope = scope.nested();
        if let Some(embed_handle) = resolve_type_expr(resolver, &mut embed_scope, embed) {
            embeds.push(embed_handle.id().to_string());
            promote_from(resolver, &embed_handle, own_id, &mut promoted_fields, &mut promoted_methods);
        }
    }

    let mut methods = Vec::new();
    if resolver
        .scan_mode_for(scope.package.distance())
        .contains(tg_common::ScanMode::METHODS)
    {
        for method in &body.methods {
            let exported = name_is_exported(&method.name);
            if !resolver.visibility_for(scope.package.distance()).admits(exported) {
                continue;
            }
            let mut method_scope = scope.nested();
            let signature = process_signature(resolver, &mut method_scope, &method.signature);
            let comments = ctx
                .map(|c| resolver.comments_for(&scope.package, &method_decl_key(&c.type_name, &method.name)))
                .unwrap_or_default();
            methods.push(MethodEntry {
                id: ident::member_id(own_id, &method.name),
                name: method.name.clone(),
                exported,
                signature,
                receiver: own_id.to_string(),
                pointer_receiver: false,
                promoted_from: None,
                comments,
                doc: method.doc.clone(),
            });
        }
    }

    methods.extend(promoted_methods);

    Ok(Arc::new(InterfaceBody {
        embeds,
        methods,
        type_params,
    }))
}

fn name_is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_uppercase())
}
