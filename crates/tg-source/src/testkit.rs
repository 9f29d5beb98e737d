//! In-memory `Package` implementation for tests.
//!
//! Every other crate's test suite builds its fixtures through
//! [`PackageBuilder`] rather than hand-rolling a `Package` impl, building
//! small synthetic packages directly instead of driving a real
//! parser/type-checker from disk.

use std::collections::HashMap;

use tg_common::Span;

use crate::{
    ConstantDecl, FunctionDecl, MethodDecl, NamedTypeDecl, Package, SourceFile, SourceType,
    VariableDecl,
};

/// A fully in-memory package. Constructed via [`PackageBuilder`].
pub struct MemoryPackage {
    path: String,
    short_name: String,
    files: Vec<SourceFile>,
    types: Vec<NamedTypeDecl>,
    functions: Vec<FunctionDecl>,
    constants: Vec<ConstantDecl>,
    variables: Vec<VariableDecl>,
    methods: HashMap<String, Vec<MethodDecl>>,
    imports: Vec<String>,
    package_doc: Option<String>,
}

impl Package for MemoryPackage {
    fn path(&self) -> &str {
        &self.path
    }

    fn short_name(&self) -> &str {
        &self.short_name
    }

    fn files(&self) -> &[SourceFile] {
        &self.files
    }

    fn types(&self) -> &[NamedTypeDecl] {
        &self.types
    }

    fn functions(&self) -> &[FunctionDecl] {
        &self.functions
    }

    fn constants(&self) -> &[ConstantDecl] {
        &self.constants
    }

    fn variables(&self) -> &[VariableDecl] {
        &self.variables
    }

    fn methods_of(&self, type_name: &str) -> &[MethodDecl] {
        self.methods.get(type_name).map_or(&[], Vec::as_slice)
    }

    fn imports(&self) -> &[String] {
        &self.imports
    }

    fn package_doc(&self) -> Option<&str> {
        self.package_doc.as_deref()
    }
}

/// Builds a [`MemoryPackage`] one declaration at a time.
#[derive(Default)]
pub struct PackageBuilder {
    path: String,
    short_name: String,
    files: Vec<SourceFile>,
    types: Vec<NamedTypeDecl>,
    functions: Vec<FunctionDecl>,
    constants: Vec<ConstantDecl>,
    variables: Vec<VariableDecl>,
    methods: HashMap<String, Vec<MethodDecl>>,
    imports: Vec<String>,
    package_doc: Option<String>,
}

impl PackageBuilder {
    pub fn new(path: impl Into<String>, short_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            short_name: short_name.into(),
            ..Default::default()
        }
    }

    pub fn file(mut self, file: SourceFile) -> Self {
        self.files.push(file);
        self
    }

    pub fn package_doc(mut self, doc: impl Into<String>) -> Self {
        self.package_doc = Some(doc.into());
        self
    }

    pub fn import(mut self, path: impl Into<String>) -> Self {
        self.imports.push(path.into());
        self
    }

    pub fn named_type(mut self, decl: NamedTypeDecl) -> Self {
        self.types.push(decl);
        self
    }

    pub fn function(mut self, decl: FunctionDecl) -> Self {
        self.functions.push(decl);
        self
    }

    pub fn constant(mut self, decl: ConstantDecl) -> Self {
        self.constants.push(decl);
        self
    }

    pub fn variable(mut self, decl: VariableDecl) -> Self {
        self.variables.push(decl);
        self
    }

    pub fn method(mut self, decl: MethodDecl) -> Self {
        self.methods
            .entry(decl.receiver_type.clone())
            .or_default()
            .push(decl);
        self
    }

    pub fn build(self) -> MemoryPackage {
        MemoryPackage {
            path: self.path,
            short_name: self.short_name,
            files: self.files,
            types: self.types,
            functions: self.functions,
            constants: self.constants,
            variables: self.variables,
            methods: self.methods,
            imports: self.imports,
            package_doc: self.package_doc,
        }
    }
}

/// Minimal helper for building a [`NamedTypeDecl`] in tests without naming
/// every field at every call site.
pub fn named_type(name: impl Into<String>, underlying: SourceType, exported: bool) -> NamedTypeDecl {
    NamedTypeDecl {
        name: name.into(),
        exported,
        type_params: Vec::new(),
        underlying,
        doc: None,
        comment: None,
        span: Span::dummy(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StructDecl;

    #[test]
    fn builder_groups_methods_by_receiver_type() {
        let pkg = PackageBuilder::new("example.com/mod/pkg", "pkg")
            .named_type(named_type(
                "Widget",
                SourceType::Struct(StructDecl {
                    fields: Vec::new(),
                    type_params: Vec::new(),
                }),
                true,
            ))
            .method(MethodDecl {
                name: "Name".into(),
                exported: true,
                receiver_type: "Widget".into(),
                pointer_receiver: false,
                signature: Default::default(),
                doc: None,
                comment: None,
                span: Span::dummy(),
            })
            .build();

        assert_eq!(pkg.types().len(), 1);
        assert_eq!(pkg.methods_of("Widget").len(), 1);
        assert!(pkg.methods_of("Other").is_empty());
    }
}
