//! JSON package manifest loading.
//!
//! The source loading front-end itself is out of scope (§1, §6): a real
//! deployment plugs in a parser/type-checker that implements
//! `tg_source::Package` directly. For a standalone CLI, that front-end is
//! swapped for a flat JSON description of a package's already-resolved
//! declarations - the same shape `tg_source::testkit::PackageBuilder`
//! builds for tests - so the binary has something concrete to scan without
//! this crate growing a parser of its own.

use std::path::Path;

use serde::Deserialize;
use tg_common::{ScanError, Span};
use tg_source::testkit::{MemoryPackage, PackageBuilder};
use tg_source::{
    ChanDirection, ConstantDecl, FieldDecl, FunctionDecl, InterfaceDecl, InterfaceMethodDecl,
    MethodDecl, NamedTypeDecl, ParamDecl, ResultDecl, SignatureDecl, SourceFile, SourceType,
    StructDecl, TypeParamDecl, UnionTerm, VariableDecl,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManifestFile {
    path: String,
    #[serde(default)]
    file_comments: Vec<String>,
    #[serde(default)]
    package_doc: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
enum ManifestType {
    Basic {
        name: String,
    },
    Named {
        package: String,
        name: String,
        #[serde(default)]
        type_args: Vec<ManifestType>,
    },
    Alias {
        package: String,
        name: String,
        aliased: Box<ManifestType>,
    },
    Pointer {
        element: Box<ManifestType>,
    },
    Slice {
        element: Box<ManifestType>,
    },
    Array {
        element: Box<ManifestType>,
        length: u64,
    },
    Map {
        key: Box<ManifestType>,
        value: Box<ManifestType>,
    },
    Chan {
        element: Box<ManifestType>,
        #[serde(default)]
        direction: ManifestChanDirection,
    },
    Signature(ManifestSignature),
    Interface(ManifestInterface),
    Struct(ManifestStruct),
    TypeParamRef {
        name: String,
    },
    Union {
        terms: Vec<ManifestUnionTerm>,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ManifestChanDirection {
    Send,
    Recv,
    #[default]
    Both,
}

#[derive(Debug, Deserialize)]
struct ManifestUnionTerm {
    #[serde(rename = "type")]
    ty: ManifestType,
    #[serde(default)]
    approximation: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ManifestTypeParam {
    name: String,
    constraint: Option<ManifestType>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ManifestParam {
    name: Option<String>,
    #[serde(rename = "type")]
    ty: Option<ManifestType>,
    variadic: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ManifestResult {
    name: Option<String>,
    #[serde(rename = "type")]
    ty: Option<ManifestType>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ManifestSignature {
    params: Vec<ManifestParam>,
    results: Vec<ManifestResult>,
    type_params: Vec<ManifestTypeParam>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ManifestField {
    name: String,
    #[serde(rename = "type")]
    ty: Option<ManifestType>,
    tag: String,
    embedded: bool,
    exported: bool,
    doc: Option<String>,
    comment: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ManifestStruct {
    fields: Vec<ManifestField>,
    type_params: Vec<ManifestTypeParam>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ManifestInterfaceMethod {
    name: String,
    signature: ManifestSignature,
    doc: Option<String>,
    comment: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ManifestInterface {
    embeds: Vec<ManifestType>,
    methods: Vec<ManifestInterfaceMethod>,
    type_params: Vec<ManifestTypeParam>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManifestNamedType {
    name: String,
    #[serde(default)]
    exported: bool,
    #[serde(default)]
    type_params: Vec<ManifestTypeParam>,
    underlying: ManifestType,
    #[serde(default)]
    doc: Option<String>,
    #[serde(default)]
    comment: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManifestFunction {
    name: String,
    #[serde(default)]
    exported: bool,
    #[serde(default)]
    signature: ManifestSignature,
    #[serde(default)]
    doc: Option<String>,
    #[serde(default)]
    comment: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManifestMethod {
    name: String,
    #[serde(default)]
    exported: bool,
    receiver_type: String,
    #[serde(default)]
    pointer_receiver: bool,
    #[serde(default)]
    signature: ManifestSignature,
    #[serde(default)]
    doc: Option<String>,
    #[serde(default)]
    comment: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManifestConstant {
    name: String,
    #[serde(default)]
    exported: bool,
    #[serde(rename = "type")]
    ty: ManifestType,
    #[serde(default = "serde_json::Value::default")]
    value: serde_json::Value,
    #[serde(default)]
    doc: Option<String>,
    #[serde(default)]
    comment: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManifestVariable {
    name: String,
    #[serde(default)]
    exported: bool,
    #[serde(rename = "type")]
    ty: ManifestType,
    #[serde(default)]
    doc: Option<String>,
    #[serde(default)]
    comment: Option<String>,
}

/// Top-level shape of one manifest file: exactly one package's already
/// resolved declarations.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManifestPackage {
    path: String,
    short_name: String,
    #[serde(default)]
    files: Vec<ManifestFile>,
    #[serde(default)]
    imports: Vec<String>,
    #[serde(default)]
    package_doc: Option<String>,
    #[serde(default)]
    types: Vec<ManifestNamedType>,
    #[serde(default)]
    functions: Vec<ManifestFunction>,
    #[serde(default)]
    constants: Vec<ManifestConstant>,
    #[serde(default)]
    variables: Vec<ManifestVariable>,
    #[serde(default)]
    methods: Vec<ManifestMethod>,
}

fn convert_direction(direction: ManifestChanDirection) -> ChanDirection {
    match direction {
        ManifestChanDirection::Send => ChanDirection::Send,
        ManifestChanDirection::Recv => ChanDirection::Recv,
        ManifestChanDirection::Both => ChanDirection::Both,
    }
}

fn convert_type_param(param: ManifestTypeParam) -> TypeParamDecl {
    TypeParamDecl {
        name: param.name,
        constraint: param
            .constraint
            .map(convert_type)
            .unwrap_or(SourceType::Basic("any".to_string())),
    }
}

fn convert_type(ty: ManifestType) -> SourceType {
    match ty {
        ManifestType::Basic { name } => SourceType::Basic(name),
        ManifestType::Named {
            package,
            name,
            type_args,
        } => SourceType::Named {
            package,
            name,
            type_args: type_args.into_iter().map(convert_type).collect(),
        },
        ManifestType::Alias {
            package,
            name,
            aliased,
        } => SourceType::Alias {
            package,
            name,
            aliased: Box::new(convert_type(*aliased)),
        },
        ManifestType::Pointer { element } => SourceType::Pointer(Box::new(convert_type(*element))),
        ManifestType::Slice { element } => SourceType::Slice(Box::new(convert_type(*element))),
        ManifestType::Array { element, length } => {
            SourceType::Array(Box::new(convert_type(*element)), length)
        }
        ManifestType::Map { key, value } => SourceType::Map {
            key: Box::new(convert_type(*key)),
            value: Box::new(convert_type(*value)),
        },
        ManifestType::Chan { element, direction } => SourceType::Chan {
            element: Box::new(convert_type(*element)),
            direction: convert_direction(direction),
        },
        ManifestType::Signature(sig) => SourceType::Signature(convert_signature(sig)),
        ManifestType::Interface(iface) => SourceType::Interface(InterfaceDecl {
            embeds: iface.embeds.into_iter().map(convert_type).collect(),
            methods: iface
                .methods
                .into_iter()
                .map(|m| InterfaceMethodDecl {
                    name: m.name,
                    signature: convert_signature(m.signature),
                    doc: m.doc,
                    comment: m.comment,
                })
                .collect(),
            type_params: iface.type_params.into_iter().map(convert_type_param).collect(),
        }),
        ManifestType::Struct(s) => SourceType::Struct(StructDecl {
            fields: s
                .fields
                .into_iter()
                .map(|f| FieldDecl {
                    name: f.name,
                    ty: f.ty.map(convert_type).unwrap_or(SourceType::Basic("any".to_string())),
                    tag: f.tag,
                    embedded: f.embedded,
                    exported: f.exported,
                    doc: f.doc,
                    comment: f.comment,
                })
                .collect(),
            type_params: s.type_params.into_iter().map(convert_type_param).collect(),
        }),
        ManifestType::TypeParamRef { name } => SourceType::TypeParamRef(name),
        ManifestType::Union { terms } => SourceType::Union(
            terms
                .into_iter()
                .map(|t| UnionTerm {
                    ty: convert_type(t.ty),
                    approximation: t.approximation,
                })
                .collect(),
        ),
    }
}

fn convert_signature(sig: ManifestSignature) -> SignatureDecl {
    SignatureDecl {
        params: sig
            .params
            .into_iter()
            .map(|p| ParamDecl {
                name: p.name,
                ty: p.ty.map(convert_type).unwrap_or(SourceType::Basic("any".to_string())),
                variadic: p.variadic,
            })
            .collect(),
        results: sig
            .results
            .into_iter()
            .map(|r| ResultDecl {
                name: r.name,
                ty: r.ty.map(convert_type).unwrap_or(SourceType::Basic("any".to_string())),
            })
            .collect(),
        type_params: sig.type_params.into_iter().map(convert_type_param).collect(),
    }
}

fn convert_named_type(decl: ManifestNamedType) -> NamedTypeDecl {
    NamedTypeDecl {
        name: decl.name,
        exported: decl.exported,
        type_params: decl.type_params.into_iter().map(convert_type_param).collect(),
        underlying: convert_type(decl.underlying),
        doc: decl.doc,
        comment: decl.comment,
        span: Span::dummy(),
    }
}

/// Parses one manifest file's JSON text into a [`MemoryPackage`] ready to
/// hand to `tg_scan::scan` as a root (or, via `tg_scan::MapProvider`, as a
/// transitively-imported package).
pub fn parse(text: &str) -> Result<MemoryPackage, ScanError> {
    let manifest: ManifestPackage = serde_json::from_str(text)
        .map_err(|err| ScanError::Config(format!("invalid package manifest: {err}")))?;

    let mut builder = PackageBuilder::new(manifest.path, manifest.short_name);
    if let Some(doc) = manifest.package_doc {
        builder = builder.package_doc(doc);
    }
    for import in manifest.imports {
        builder = builder.import(import);
    }
    for file in manifest.files {
        let mut source_file = SourceFile::new(file.path);
        source_file.file_comments = file.file_comments;
        source_file.package_doc = file.package_doc;
        builder = builder.file(source_file);
    }
    for ty in manifest.types {
        builder = builder.named_type(convert_named_type(ty));
    }
    for function in manifest.functions {
        builder = builder.function(FunctionDecl {
            name: function.name,
            exported: function.exported,
            signature: convert_signature(function.signature),
            doc: function.doc,
            comment: function.comment,
            span: Span::dummy(),
        });
    }
    for constant in manifest.constants {
        builder = builder.constant(ConstantDecl {
            name: constant.name,
            exported: constant.exported,
            ty: convert_type(constant.ty),
            value: constant.value,
            doc: constant.doc,
            comment: constant.comment,
            span: Span::dummy(),
        });
    }
    for variable in manifest.variables {
        builder = builder.variable(VariableDecl {
            name: variable.name,
            exported: variable.exported,
            ty: convert_type(variable.ty),
            doc: variable.doc,
            comment: variable.comment,
            span: Span::dummy(),
        });
    }
    for method in manifest.methods {
        builder = builder.method(MethodDecl {
            name: method.name,
            exported: method.exported,
            receiver_type: method.receiver_type,
            pointer_receiver: method.pointer_receiver,
            signature: convert_signature(method.signature),
            doc: method.doc,
            comment: method.comment,
            span: Span::dummy(),
        });
    }

    Ok(builder.build())
}

/// Reads and parses a manifest file from disk.
pub fn load(path: &Path) -> Result<MemoryPackage, ScanError> {
    let text = std::fs::read_to_string(path)
        .map_err(|err| ScanError::Config(format!("failed to read {}: {err}", path.display())))?;
    parse(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tg_source::Package;

    #[test]
    fn parses_a_self_referential_struct() {
        let text = r#"
        {
            "path": "example.com/mod/p",
            "shortName": "p",
            "types": [
                {
                    "name": "N",
                    "exported": true,
                    "underlying": {
                        "kind": "struct",
                        "fields": [
                            {
                                "name": "Next",
                                "type": {
                                    "kind": "pointer",
                                    "element": { "kind": "named", "package": "example.com/mod/p", "name": "N" }
                                },
                                "exported": true
                            }
                        ]
                    }
                }
            ]
        }
        "#;
        let pkg = parse(text).expect("manifest should parse");
        assert_eq!(pkg.path(), "example.com/mod/p");
        assert_eq!(pkg.types().len(), 1);
        assert_eq!(pkg.types()[0].name, "N");
    }

    #[test]
    fn rejects_malformed_json() {
        let err = parse("{ not json").unwrap_err();
        assert!(matches!(err, ScanError::Config(_)));
    }
}
