//! The canonical name service, basic-type registry, type graph and lazy
//! loader runtime that together hold the materialized result of a scan.
//!
//! This crate owns the materialized shape of the graph but not the policy
//! that builds it: `tg-graph` never looks at a `tg_source::Package`. That
//! belongs to `tg-resolver`, which depends on this crate plus `tg-source`.

pub mod basic;
pub mod descriptor;
pub mod graph;
pub mod ident;
pub mod loader;
pub mod values;

pub use basic::BasicRegistry;
pub use descriptor::{
    ChanDirection, Descriptor, DescriptorData, FieldEntry, InstantiatedGenericBody,
    InterfaceBody, MethodEntry, ParamSlot, ResultSlot, SignaturePayload, StructBody, TypeArgSlot,
    TypeHandle, TypeKind, UnionTermEntry,
};
pub use graph::TypeGraph;
pub use ident::UnnamedCounter;
pub use loader::{LoadError, Loader};
pub use values::{ValueEntry, ValueKind, ValueTable};
