//! Type Resolver (C4-C6, §4.4-§4.6): package registry, comment attachor,
//! and the recursive `resolve(source_type) -> descriptor` dispatch that
//! drives the whole scan. `tg-scan` owns the worker pool and fixed-point
//! lazy-load phase that call into this crate; this crate owns the policy
//! for what one package's declarations turn into in the graph.

pub mod comments;
pub mod errors;
pub mod package_registry;
pub mod resolver;
pub mod resolver_func;
pub mod resolver_generic;
pub mod resolver_iface;
pub mod resolver_struct;

pub use errors::ResolveOutcome;
pub use package_registry::{PackageEntry, PackageFile, PackageRegistry};
pub use resolver::{process_package, PackageProvider, ResolveScope, Resolver};
pub use resolver_func::{process_signature, resolve_with_pointer_collapse, unwrap_pointer_depth};
pub use resolver_generic::{install_type_param_scope, resolve_instantiated_generic};
