//! Generics (§4.1 "Generics", §4.6 "Type-parameter installation",
//! "Instantiated generics").
//!
//! Two distinct jobs live here: materializing a declaration's own
//! type-parameter descriptors (used by struct/interface/signature
//! processing alike), and resolving one concrete instantiation of a
//! generic named type (`List[int]`) to its own `instantiated-generic`
//! descriptor.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tg_graph::{
    ident, Descriptor, DescriptorData, Loader, TypeArgSlot, TypeHandle, TypeKind,
};
use tg_source::{SourceType, TypeParamDecl};

use crate::resolver::{resolve_named, ResolveScope, Resolver};
use crate::resolver_func::resolve_with_pointer_collapse;

/// Builds one graph-resident `type-parameter` descriptor per entry in
/// `type_params`, keyed `<parent_id>.<param_name>` (§4.6), and returns the
/// name -> handle map a nested scope should install. Constraints resolve in
/// a scope that already sees the type parameters declared before them, so
/// `[T any, S Container[T]]`-style mutual references work left to right.
pub fn install_type_param_scope(
    resolver: &Arc<Resolver>,
    scope: &ResolveScope,
    parent_id: &str,
    type_params: &[TypeParamDecl],
) -> FxHashMap<String, TypeHandle> {
    let mut local_scope = scope.clone();
    let mut result = FxHashMap::default();

    for (index, param) in type_params.iter().enumerate() {
        let id = ident::type_param_id(parent_id, &param.name);
        let constraint = resolve_constraint(resolver, &mut local_scope, &param.constraint)
            .unwrap_or_else(|| TypeHandle::Ref("any".to_string()));

        let descriptor = Arc::new(Descriptor::new(
            id.clone(),
            param.name.clone(),
            TypeKind::TypeParameter,
            Some(local_scope.package.path.clone()),
            true,
            local_scope.package.distance(),
            Vec::new(),
            Vec::new(),
            None,
            DescriptorData::TypeParameter { index, constraint },
        ));
        resolver.graph.set(id.clone(), descriptor);

        let handle = TypeHandle::Ref(id);
        result.insert(param.name.clone(), handle.clone());
        local_scope.type_params.insert(param.name.clone(), handle);
    }

    result
}

/// `install_type_param_scope`, but for a signature's own type parameters
/// (method/function-local generics): mints a synthetic anchor id since a
/// signature has no declaration id of its own, installs the resulting
/// handles into `scope` directly, and returns their ids in declaration
/// order for `SignaturePayload::type_params`.
pub fn process_type_params(
    resolver: &Arc<Resolver>,
    scope: &mut ResolveScope,
    type_params: &[TypeParamDecl],
    anchor_label: &str,
) -> Vec<String> {
    if type_params.is_empty() {
        return Vec::new();
    }
    let anchor = resolver.unnamed.next(anchor_label, &scope.owner);
    let installed = install_type_param_scope(resolver, scope, &anchor, type_params);
    let ids = type_params
        .iter()
        .filter_map(|p| installed.get(&p.name).map(|h| h.id().to_string()))
        .collect();
    scope.type_params.extend(installed);
    ids
}

/// A constraint written as a single-embed, zero-method interface
/// (`interface{ Ordered }`) exposes the embedded term directly rather than
/// materializing a pointless wrapper interface descriptor (§4.6 "a
/// constraint that is itself just one embedded interface/union is
/// unwrapped to expose that term directly").
fn resolve_constraint(
    resolver: &Arc<Resolver>,
    scope: &mut ResolveScope,
    ty: &SourceType,
) -> Option<TypeHandle> {
    if let SourceType::Interface(body) = ty {
        if body.embeds.len() == 1 && body.methods.is_empty() {
            return resolve_with_pointer_collapse(resolver, scope, &body.embeds[0]);
        }
    }
    resolve_with_pointer_collapse(resolver, scope, ty)
}

/// Resolves one concrete instantiation `package.name[type_args]` (§4.1,
/// §4.6 "Instantiated generics"): resolves every argument, resolves the
/// generic's own (uninstantiated) definition to learn its type-parameter
/// names, and materializes an `instantiated-generic` descriptor zipping
/// parameter names to argument handles.
pub fn resolve_instantiated_generic(
    resolver: &Arc<Resolver>,
    scope: &ResolveScope,
    package: &str,
    name: &str,
    type_args: &[SourceType],
) -> Option<TypeHandle> {
    let mut arg_scope = scope.clone();
    let mut resolved_args = Vec::with_capacity(type_args.len());
    for arg in type_args {
        resolved_args.push(resolve_with_pointer_collapse(resolver, &mut arg_scope, arg)?);
    }
    let arg_ids: Vec<String> = resolved_args.iter().map(|h| h.id().to_string()).collect();
    let own_id = ident::canonical_instantiated(package, name, &arg_ids);

    if resolver.graph.has(&own_id) {
        return Some(TypeHandle::Ref(own_id));
    }

    let origin_handle = resolve_named(resolver, scope, package, name, &[])?;

    let owner_entry = resolver.register_package(package, Some(scope.package.distance()))?;
    let owner_pkg = resolver.provider.package(package)?;
    let decl = owner_pkg.types().iter().find(|d| d.name == name)?;

    let param_names: Vec<String> = decl.type_params.iter().map(|p| p.name.clone()).collect();
    let display_args: Vec<String> = resolved_args
        .iter()
        .map(crate::resolver::display_name_of)
        .collect();
    let display_name = format!("{name}[{}]", display_args.join(","));

    let origin_id = origin_handle.id().to_string();
    let args_for_body = resolved_args;
    let loader = Arc::new(Loader::new(move |_attempt| {
        let args = param_names
            .iter()
            .cloned()
            .zip(args_for_body.iter().cloned())
            .enumerate()
            .map(|(index, (param_name, ty))| TypeArgSlot {
                param_name,
                index,
                ty,
            })
            .collect();
        Ok(Arc::new(tg_graph::InstantiatedGenericBody {
            origin: origin_id.clone(),
            args,
        }))
    }));

    let descriptor = Arc::new(Descriptor::new(
        own_id.clone(),
        display_name,
        TypeKind::InstantiatedGeneric,
        Some(owner_entry.path.clone()),
        decl.exported,
        owner_entry.distance(),
        Vec::new(),
        Vec::new(),
        None,
        DescriptorData::InstantiatedGeneric(loader),
    ));
    resolver.graph.set(own_id.clone(), descriptor);
    Some(TypeHandle::Ref(own_id))
}
