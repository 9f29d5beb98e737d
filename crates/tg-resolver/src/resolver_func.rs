//! Shared helpers used by every constructor: pointer-depth collapse and
//! signature processing (§4.6 "Pointer depth collapse", "Signature
//! processing (shared by functions and methods)").

use std::sync::Arc;

use tg_graph::{ParamSlot, ResultSlot, SignaturePayload, TypeHandle};
use tg_source::{ParamDecl, ResultDecl, SignatureDecl, SourceType};

use crate::resolver::{resolve_type_expr, ResolveScope, Resolver};

/// Unwraps nested `Pointer` wrappers and returns `(final_element, depth)`
/// (§4.6 "A helper unwraps nested pointers and returns `(final_element,
/// depth)`"; I5 "pointers never wrap pointers").
pub fn unwrap_pointer_depth(ty: &SourceType) -> (&SourceType, u32) {
    let mut depth = 0u32;
    let mut current = ty;
    while let SourceType::Pointer(inner) = current {
        depth += 1;
        current = inner;
    }
    (current, depth)
}

/// Resolves `ty`, collapsing any leading pointer depth into a single
/// pointer descriptor wrapping the resolved element (§4.6 "unwrap pointer
/// depth, resolve the element, wrap back in a pointer descriptor of the
/// same depth").
pub fn resolve_with_pointer_collapse(
    resolver: &Arc<Resolver>,
    scope: &mut ResolveScope,
    ty: &SourceType,
) -> Option<TypeHandle> {
    let (element, depth) = unwrap_pointer_depth(ty);
    let mut inner_scope = scope.nested();
    let resolved = resolve_type_expr(resolver, &mut inner_scope, element)?;
    if depth == 0 {
        return Some(resolved);
    }
    Some(TypeHandle::Inline(std::sync::Arc::new(
        resolver.make_pointer(scope, resolved, depth),
    )))
}

pub fn process_signature(
    resolver: &Arc<Resolver>,
    scope: &mut ResolveScope,
    sig: &SignatureDecl,
) -> SignaturePayload {
    let type_params =
        crate::resolver_generic::process_type_params(resolver, scope, &sig.type_params, "signature");

    let params = sig
        .params
        .iter()
        .map(|p: &ParamDecl| ParamSlot {
            name: p.name.clone(),
            ty: resolve_with_pointer_collapse(resolver, scope, &p.ty)
                .unwrap_or_else(|| TypeHandle::Ref("any".to_string())),
            variadic: p.variadic,
        })
        .collect();

    let results = sig
        .results
        .iter()
        .map(|r: &ResultDecl| ResultSlot {
            name: r.name.clone(),
            ty: resolve_with_pointer_collapse(resolver, scope, &r.ty)
                .unwrap_or_else(|| TypeHandle::Ref("any".to_string())),
        })
        .collect();

    SignaturePayload {
        params,
        results,
        variadic: sig.is_variadic(),
        type_params,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwrap_pointer_depth_counts_indirections() {
        let ty = SourceType::Pointer(Box::new(SourceType::Pointer(Box::new(SourceType::Pointer(
            Box::new(SourceType::Basic("int".into())),
        )))));
        let (element, depth) = unwrap_pointer_depth(&ty);
        assert_eq!(depth, 3);
        assert_eq!(element, &SourceType::Basic("int".into()));
    }

    #[test]
    fn zero_depth_for_non_pointer() {
        let ty = SourceType::Basic("string".into());
        let (element, depth) = unwrap_pointer_depth(&ty);
        assert_eq!(depth, 0);
        assert_eq!(element, &ty);
    }
}
