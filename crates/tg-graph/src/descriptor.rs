//! Type descriptors and the handles that let one descriptor point at
//! another without ever holding it by value - every reference between
//! descriptors goes through an identifier-keyed lookup into a global owned
//! map instead of a pointer or reference, so cyclic type graphs never need
//! unsafe or reference-counted cycles.
//!
//! `field` and `method` are kinds the serializer emits, but they are owned
//! by their parent struct/interface rather than the graph, so they are
//! modeled here as plain entries embedded in [`StructBody`]/[`InterfaceBody`]
//! rather than as top-level [`Descriptor`] variants. `package` and `file`
//! are likewise reported kinds but materialize as `tg-resolver`'s package
//! registry, not as graph entries - see `DESIGN.md`.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use tg_common::Comment;

use crate::loader::Loader;

/// The closed set of kinds a [`Descriptor`] can take, minus `package`
/// and `file` (see module docs).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeKind {
    Basic,
    Pointer,
    Slice,
    Array,
    Map,
    Chan,
    Alias,
    Function,
    Interface,
    Struct,
    TypeParameter,
    InstantiatedGeneric,
    Union,
    Constant,
    Variable,
}

impl TypeKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            TypeKind::Basic => "basic",
            TypeKind::Pointer => "pointer",
            TypeKind::Slice => "slice",
            TypeKind::Array => "array",
            TypeKind::Map => "map",
            TypeKind::Chan => "chan",
            TypeKind::Alias => "alias",
            TypeKind::Function => "function",
            TypeKind::Interface => "interface",
            TypeKind::Struct => "struct",
            TypeKind::TypeParameter => "type-parameter",
            TypeKind::InstantiatedGeneric => "instantiated-generic",
            TypeKind::Union => "union",
            TypeKind::Constant => "constant",
            TypeKind::Variable => "variable",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChanDirection {
    Send,
    Recv,
    Both,
}

/// A pointer to another type, either owned inline (unnamed composites) or
/// by reference into the graph/basic registry (named types, instantiated
/// generics, basics, type parameters).
///
/// `Inline` holds an `Arc` rather than a `Box` so `TypeHandle` can derive
/// `Clone` without requiring `Descriptor: Clone` - `Descriptor` carries an
/// `AtomicU32` for its distance and isn't itself cloneable.
#[derive(Clone, Debug)]
pub enum TypeHandle {
    Ref(String),
    Inline(Arc<Descriptor>),
}

impl TypeHandle {
    pub fn id(&self) -> &str {
        match self {
            TypeHandle::Ref(id) => id,
            TypeHandle::Inline(d) => &d.id,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ParamSlot {
    pub name: Option<String>,
    pub ty: TypeHandle,
    pub variadic: bool,
}

#[derive(Clone, Debug)]
pub struct ResultSlot {
    pub name: Option<String>,
    pub ty: TypeHandle,
}

#[derive(Clone, Debug, Default)]
pub struct SignaturePayload {
    pub params: Vec<ParamSlot>,
    pub results: Vec<ResultSlot>,
    pub variadic: bool,
    /// Ids of this signature's own type-parameter descriptors, if generic.
    pub type_params: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct FieldEntry {
    pub id: String,
    pub name: String,
    pub ty: TypeHandle,
    pub tag: String,
    pub embedded: bool,
    pub exported: bool,
    /// Non-empty iff this field was promoted from an embedded type.
    pub promoted_from: Option<String>,
    pub parent: String,
    pub comments: Vec<Comment>,
    pub doc: Option<String>,
}

#[derive(Clone, Debug)]
pub struct MethodEntry {
    pub id: String,
    pub name: String,
    pub exported: bool,
    pub signature: SignaturePayload,
    /// Owning struct/interface descriptor id: the receiver equals the
    /// owning struct/interface descriptor by identity, enforced by every
    /// method of `T` carrying `T`'s own id here.
    pub receiver: String,
    pub pointer_receiver: bool,
    pub promoted_from: Option<String>,
    pub comments: Vec<Comment>,
    pub doc: Option<String>,
}

#[derive(Clone, Debug)]
pub struct StructBody {
    pub embeds: Vec<String>,
    pub fields: Vec<FieldEntry>,
    pub methods: Vec<MethodEntry>,
    pub type_params: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct InterfaceBody {
    pub embeds: Vec<String>,
    pub methods: Vec<MethodEntry>,
    pub type_params: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct TypeArgSlot {
    pub param_name: String,
    pub index: usize,
    pub ty: TypeHandle,
}

#[derive(Clone, Debug)]
pub struct InstantiatedGenericBody {
    pub origin: String,
    pub args: Vec<TypeArgSlot>,
}

#[derive(Clone, Debug)]
pub struct UnionTermEntry {
    pub ty: TypeHandle,
    pub approximation: bool,
}

/// Kind-specific payload. Struct/interface/instantiated-generic wrap their
/// body behind a [`Loader`] so the descriptor can be published to the
/// graph before its heavy payload is computed, breaking self-referential
/// cycles; every other kind is fully built at
/// construction time since it cannot itself be the target of a cycle that
/// isn't already broken by the struct/interface it is reached through.
pub enum DescriptorData {
    Basic,
    Pointer {
        element: TypeHandle,
        depth: u32,
    },
    Slice {
        element: TypeHandle,
    },
    Array {
        element: TypeHandle,
        length: u64,
    },
    Map {
        key: TypeHandle,
        value: TypeHandle,
    },
    Chan {
        element: TypeHandle,
        direction: ChanDirection,
    },
    Alias {
        underlying: TypeHandle,
    },
    Function(SignaturePayload),
    Interface(Arc<Loader<Arc<InterfaceBody>>>),
    Struct(Arc<Loader<Arc<StructBody>>>),
    TypeParameter {
        index: usize,
        constraint: TypeHandle,
    },
    InstantiatedGeneric(Arc<Loader<Arc<InstantiatedGenericBody>>>),
    Union {
        terms: Vec<UnionTermEntry>,
    },
}

/// One materialized type, plus the header attributes common to every kind.
pub struct Descriptor {
    pub id: String,
    pub display_name: String,
    pub kind: TypeKind,
    /// Owning package path; `None` for basics/predeclared sentinels.
    pub package: Option<String>,
    pub exported: bool,
    distance: AtomicU32,
    pub files: Vec<String>,
    pub comments: Vec<Comment>,
    pub doc: Option<String>,
    /// Ids of this descriptor's own type-parameter descriptors, for named
    /// generic kinds that have no loader-backed body of their own to carry
    /// them (struct/interface carry theirs on `StructBody`/`InterfaceBody`
    /// instead, and leave this empty).
    pub type_params: Vec<String>,
    pub data: DescriptorData,
}

impl Descriptor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: String,
        display_name: String,
        kind: TypeKind,
        package: Option<String>,
        exported: bool,
        distance: u32,
        files: Vec<String>,
        comments: Vec<Comment>,
        doc: Option<String>,
        data: DescriptorData,
    ) -> Self {
        Self {
            id,
            display_name,
            kind,
            package,
            exported,
            distance: AtomicU32::new(distance),
            files,
            comments,
            doc,
            type_params: Vec::new(),
            data,
        }
    }

    /// Attaches a type-parameter id list to a descriptor built via [`new`],
    /// for named generic kinds other than struct/interface.
    pub fn with_type_params(mut self, type_params: Vec<String>) -> Self {
        self.type_params = type_params;
        self
    }

    pub fn distance(&self) -> u32 {
        self.distance.load(Ordering::Acquire)
    }

    /// Compare-and-set "take the minimum": only ever lowers the distance,
    /// never raises it, so concurrent updates converge regardless of order.
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

    /// Whether this descriptor's heavy payload (if it has one) has already
    /// run its loader. Basics and every unnamed/non-lazy kind are always
    /// "loaded" - there is nothing deferred about them; only struct,
    /// interface and instantiated-generic entries ever need a force-load
    /// pass.
    pub fn is_loaded(&self) -> bool {
        match &self.data {
            DescriptorData::Struct(loader) => loader.is_loaded(),
            DescriptorData::Interface(loader) => loader.is_loaded(),
            DescriptorData::InstantiatedGeneric(loader) => loader.is_loaded(),
            _ => true,
        }
    }

    /// Force this descriptor's heavy payload to materialize, as part of the
    /// fixed-point expansion pass. Returns `Ok(())` on success or after the
    /// loader's own retry budget is exhausted and the descriptor has been
    /// marked loaded with a partial payload; `Err` only for a kind that
    /// genuinely has no loader to run, which callers should never hit since
    /// they only call this on ids already filtered by `is_loaded`.
    pub fn force_load(&self, max_retries: u32) -> Result<(), crate::loader::LoadError> {
        match &self.data {
            DescriptorData::Struct(loader) => loader.load(max_retries).map(|_| ()),
            DescriptorData::Interface(loader) => loader.load(max_retries).map(|_| ()),
            DescriptorData::InstantiatedGeneric(loader) => loader.load(max_retries).map(|_| ()),
            _ => Ok(()),
        }
    }
}

impl std::fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Descriptor")
            .field("id", &self.id)
            .field("kind", &self.kind.as_str())
            .field("distance", &self.distance())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic_descriptor(id: &str, distance: u32) -> Descriptor {
        Descriptor::new(
            id.to_string(),
            id.to_string(),
            TypeKind::Basic,
            None,
            true,
            distance,
            Vec::new(),
            Vec::new(),
            None,
            DescriptorData::Basic,
        )
    }

    #[test]
    fn lower_distance_to_only_moves_downward() {
        let d = basic_descriptor("pkg.T", 5);
        d.lower_distance_to(8);
        assert_eq!(d.distance(), 5);
        d.lower_distance_to(2);
        assert_eq!(d.distance(), 2);
        d.lower_distance_to(3);
        assert_eq!(d.distance(), 2);
    }
}
