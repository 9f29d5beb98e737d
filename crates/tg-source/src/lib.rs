//! The source loading front-end's contract.
//!
//! Obtaining a parsed syntax tree, a type-checked scope, a documentation
//! view, an import graph and file positions for a package is explicitly out
//! of scope for this system - the front-end is named only through its
//! interface. This crate is that interface - the [`Package`] trait - plus
//! the concrete [`SourceType`] shape a package's type-checked scope is
//! expected to expose declarations in.
//!
//! The `testkit` module ships an in-memory implementation used by every
//! other crate's test suite, standing in for a real parser/type-checker.

pub mod testkit;
pub mod types;

pub use tg_common::Span;
pub use types::*;

/// One loaded, type-checked package, as handed to the resolver by the
/// front-end. Everything here is read-only data: the front-end has already
/// done the parsing and type-checking; the resolver only walks it.
pub trait Package: Send + Sync {
    /// Full import path, e.g. `"example.com/mod/pkg"`.
    fn path(&self) -> &str;

    /// Short package name as it would appear in a `package` clause.
    fn short_name(&self) -> &str;

    /// Ordered source files making up this package.
    fn files(&self) -> &[SourceFile];

    /// Top-level named type declarations (structs, interfaces, aliases,
    /// named basics).
    fn types(&self) -> &[NamedTypeDecl];

    /// Top-level function declarations (not methods).
    fn functions(&self) -> &[FunctionDecl];

    /// Top-level constant declarations.
    fn constants(&self) -> &[ConstantDecl];

    /// Top-level variable declarations.
    fn variables(&self) -> &[VariableDecl];

    /// Methods declared with a receiver of the named type `type_name`
    /// (both value- and pointer-receiver).
    fn methods_of(&self, type_name: &str) -> &[MethodDecl];

    /// Import graph edges: full paths of packages this package imports.
    fn imports(&self) -> &[String];

    /// Aggregated package-level doc comment, if any file in the package
    /// carries one on its `package` clause. When more than one file
    /// contributes, the front-end is expected to have already joined them
    /// in file order; `Package` implementations that haven't pre-joined can
    /// return the first file's doc and let callers fall back to
    /// `files()[..].package_doc` for the rest.
    fn package_doc(&self) -> Option<&str>;
}
