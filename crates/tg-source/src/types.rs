//! Concrete shapes the front-end's type-checked scope is expected to
//! expose. `SourceType` is the source type node that `tg_resolver::resolve`
//! consumes: a recursive, owned representation of one type expression as
//! the front-end's type checker would have already resolved it (no further
//! type inference happens in this crate or in the resolver).

use serde_json::Value as JsonValue;
use tg_common::Span;

/// Channel direction, mirrored 1:1 onto the `chan` descriptor's `direction`
/// field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChanDirection {
    Send,
    Recv,
    Both,
}

/// One type expression as resolved by the front-end's type checker.
///
/// This is deliberately *not* an AST node: it has already been through
/// whatever type-checking the front-end performs (type checking beyond
/// what the front-end already provides is out of scope here), so e.g. an
/// identifier referring to a type parameter already arrives as
/// `TypeParamRef`, not as a generic `Named`.
#[derive(Clone, Debug, PartialEq)]
pub enum SourceType {
    /// A primitive type by its canonical primage name (`"int"`, `"string"`,
    /// ...) or a predeclared sentinel (`"error"`, `"comparable"`, `"any"`).
    /// Untyped constant kinds are included here too (e.g. `"untyped int"`)
    /// and are normalized by the basic-type registry before lookup.
    Basic(String),

    /// A reference to a named type declared somewhere (possibly in another
    /// package). `type_args` is empty for a bare reference to a
    /// (potentially generic) definition, and non-empty for an instantiated
    /// generic with concrete type arguments.
    Named {
        package: String,
        name: String,
        type_args: Vec<SourceType>,
    },

    /// A type alias: `type A = <aliased>`. Distinguished from `Named`
    /// because an alias to an instantiated generic needs special handling
    /// at resolve time (§4.6 special case 1).
    Alias {
        package: String,
        name: String,
        aliased: Box<SourceType>,
    },

    Pointer(Box<SourceType>),
    Slice(Box<SourceType>),
    Array(Box<SourceType>, u64),
    Map {
        key: Box<SourceType>,
        value: Box<SourceType>,
    },
    Chan {
        element: Box<SourceType>,
        direction: ChanDirection,
    },
    Signature(SignatureDecl),
    Interface(InterfaceDecl),
    Struct(StructDecl),

    /// A reference to a type parameter in scope (by name), used inside a
    /// generic definition's own body.
    TypeParamRef(String),

    Union(Vec<UnionTerm>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct UnionTerm {
    pub ty: SourceType,
    /// `~T`-style approximation term.
    pub approximation: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypeParamDecl {
    pub name: String,
    pub constraint: SourceType,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldDecl {
    pub name: String,
    pub ty: SourceType,
    pub tag: String,
    pub embedded: bool,
    pub exported: bool,
    pub doc: Option<String>,
    pub comment: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StructDecl {
    pub fields: Vec<FieldDecl>,
    pub type_params: Vec<TypeParamDecl>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InterfaceMethodDecl {
    pub name: String,
    pub signature: SignatureDecl,
    pub doc: Option<String>,
    pub comment: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InterfaceDecl {
    pub embeds: Vec<SourceType>,
    pub methods: Vec<InterfaceMethodDecl>,
    pub type_params: Vec<TypeParamDecl>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParamDecl {
    pub name: Option<String>,
    pub ty: SourceType,
    pub variadic: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ResultDecl {
    pub name: Option<String>,
    pub ty: SourceType,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SignatureDecl {
    pub params: Vec<ParamDecl>,
    pub results: Vec<ResultDecl>,
    pub type_params: Vec<TypeParamDecl>,
}

impl SignatureDecl {
    pub fn is_variadic(&self) -> bool {
        self.params.last().is_some_and(|p| p.variadic)
    }
}

/// A top-level named type declaration (`type Name ...`).
#[derive(Clone, Debug, PartialEq)]
pub struct NamedTypeDecl {
    pub name: String,
    pub exported: bool,
    pub type_params: Vec<TypeParamDecl>,
    /// The unwrapped shape: `Struct`, `Interface`, `Basic` (named basic),
    /// `Alias`, or any other composite for a named type over e.g. a slice.
    pub underlying: SourceType,
    pub doc: Option<String>,
    pub comment: Option<String>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MethodDecl {
    pub name: String,
    pub exported: bool,
    pub receiver_type: String,
    pub pointer_receiver: bool,
    pub signature: SignatureDecl,
    pub doc: Option<String>,
    pub comment: Option<String>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDecl {
    pub name: String,
    pub exported: bool,
    pub signature: SignatureDecl,
    pub doc: Option<String>,
    pub comment: Option<String>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConstantDecl {
    pub name: String,
    pub exported: bool,
    pub ty: SourceType,
    /// Opaque constant value payload (§3 "constant: ... opaque constant
    /// value"). Stored as JSON so any literal kind (int/float/string/bool)
    /// round-trips without the core needing a bespoke value enum.
    pub value: JsonValue,
    pub doc: Option<String>,
    pub comment: Option<String>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VariableDecl {
    pub name: String,
    pub exported: bool,
    pub ty: SourceType,
    pub doc: Option<String>,
    pub comment: Option<String>,
    pub span: Span,
}

/// One source file of a package.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceFile {
    /// Module-relative path, e.g. `"mod/pkg/file.go"`.
    pub path: String,
    /// Comments between the `package` clause and the first
    /// declaration/import, already excluding any attached to the first
    /// declaration (§4.4 "File-level comments").
    pub file_comments: Vec<String>,
    /// This file's own package-clause doc comment, if any.
    pub package_doc: Option<String>,
}

impl SourceFile {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            file_comments: Vec::new(),
            package_doc: None,
        }
    }
}
