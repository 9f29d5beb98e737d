//! End-to-end coverage for the concrete scenarios spec.md §8 calls out by
//! name (self-reference, instantiated generics, embedded promotion,
//! pointer-depth collapse, interface method promotion, unexported
//! filtering). Each test drives `tg_scan::scan` over an in-memory
//! `tg_source::testkit` package exactly the way a real front-end would
//! hand packages to the orchestrator, then inspects the resulting graph.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tg_common::{ScanMode, ScanOptions, Visibility, DEFAULT_LOADER_RETRY_COUNT};
use tg_graph::{DescriptorData, TypeHandle, TypeKind};
use tg_scan::cancellation::CancellationToken;
use tg_scan::MapProvider;
use tg_source::testkit::{named_type, PackageBuilder};
use tg_source::{
    FieldDecl, InterfaceDecl, InterfaceMethodDecl, MethodDecl, Package, SignatureDecl, SourceType,
    StructDecl, TypeParamDecl,
};

const PKG: &str = "example.com/mod/p";

/// Mirrors `tg-cli::run`'s wiring: the same `path -> Package` map backs
/// both the root set handed to `scan` and the `PackageProvider` it
/// consults for lazily-discovered references (including a reference back
/// into a root package itself, e.g. `List[int]` resolving `List`'s own
/// declaration through the provider).
fn run(pkg: impl Package + 'static, scan_mode: ScanMode, visibility: Visibility) -> tg_scan::ScanningResult {
    let pkg: Arc<dyn Package> = Arc::new(pkg);
    let mut roots = FxHashMap::default();
    roots.insert(PKG.to_string(), pkg);

    let mut options = ScanOptions::default();
    options.packages = vec![PKG.to_string()];
    options.scan_mode = scan_mode;
    options.visibility = visibility;

    let provider = Arc::new(MapProvider::new(roots.clone()));
    tg_scan::scan(options, provider, &roots, &[], &CancellationToken::new()).expect("scan should succeed")
}

fn named(package: &str, name: &str) -> SourceType {
    SourceType::Named {
        package: package.to_string(),
        name: name.to_string(),
        type_args: Vec::new(),
    }
}

/// Scenario 1 (§8): `package p; type N struct { Next *N }`.
#[test]
fn self_reference_terminates_with_one_entry() {
    let pkg = PackageBuilder::new(PKG, "p")
        .named_type(named_type(
            "N",
            SourceType::Struct(StructDecl {
                fields: vec![FieldDecl {
                    name: "Next".into(),
                    ty: SourceType::Pointer(Box::new(named(PKG, "N"))),
                    tag: String::new(),
                    embedded: false,
                    exported: true,
                    doc: None,
                    comment: None,
                }],
                type_params: Vec::new(),
            }),
            true,
        ))
        .build();

    let result = run(pkg, ScanMode::FULL, Visibility::Both);

    let id = format!("{PKG}.N");
    assert!(result.graph.has(&id), "exactly one entry for the self-referential type");
    let descriptor = result.graph.get(&id).unwrap();
    assert_eq!(descriptor.kind, TypeKind::Struct);

    let DescriptorData::Struct(loader) = &descriptor.data else {
        panic!("expected struct payload");
    };
    let body = loader.load(DEFAULT_LOADER_RETRY_COUNT).expect("struct loads");
    assert_eq!(body.fields.len(), 1);
    let next = &body.fields[0];
    assert_eq!(next.name, "Next");
    match &next.ty {
        TypeHandle::Inline(pointer) => {
            assert_eq!(pointer.kind, TypeKind::Pointer);
            let DescriptorData::Pointer { element, depth } = &pointer.data else {
                panic!("expected pointer payload");
            };
            assert_eq!(*depth, 1);
            assert_eq!(element.id(), id, "pointer element refers back to N itself, by identity");
        }
        other => panic!("expected an inline pointer descriptor, got {other:?}"),
    }
}

/// Scenario 2 (§8): `type List[T any] []T; type Ints = List[int]`.
#[test]
fn instantiated_generic_materializes_origin_and_arguments() {
    let pkg = PackageBuilder::new(PKG, "p")
        .named_type(tg_source::NamedTypeDecl {
            name: "List".into(),
            exported: true,
            type_params: vec![TypeParamDecl {
                name: "T".into(),
                constraint: SourceType::Basic("any".into()),
            }],
            underlying: SourceType::Slice(Box::new(SourceType::TypeParamRef("T".into()))),
            doc: None,
            comment: None,
            span: tg_common::Span::dummy(),
        })
        .named_type(tg_source::NamedTypeDecl {
            name: "Ints".into(),
            exported: true,
            type_params: Vec::new(),
            underlying: SourceType::Alias {
                package: PKG.into(),
                name: "Ints".into(),
                aliased: Box::new(SourceType::Named {
                    package: PKG.into(),
                    name: "List".into(),
                    type_args: vec![SourceType::Basic("int".into())],
                }),
            },
            doc: None,
            comment: None,
            span: tg_common::Span::dummy(),
        })
        .build();

    let result = run(pkg, ScanMode::FULL, Visibility::Both);

    let list_id = format!("{PKG}.List");
    assert!(result.graph.has(&list_id));
    let list = result.graph.get(&list_id).unwrap();
    // Generic dispatch on the underlying shape (§4.6): `p.List` is its own
    // `slice`-kind entry, not an `alias` wrapping one (scenario 2: "an
    // entry ... kind slice, with type-parameter T").
    assert_eq!(list.kind, TypeKind::Slice);
    match &list.data {
        DescriptorData::Slice { element } => {
            let TypeHandle::Ref(id) = element else {
                panic!("expected List's element to reference its own type parameter");
            };
            assert_eq!(id, &format!("{list_id}.T"));
        }
        other => panic!("expected List to carry a slice payload directly, got {other:?}"),
    }
    assert_eq!(list.type_params, vec![format!("{list_id}.T")]);

    let instantiated_id = format!("{PKG}.List[int]");
    assert!(result.graph.has(&instantiated_id), "List[int] gets its own entry");
    let instantiated = result.graph.get(&instantiated_id).unwrap();
    assert_eq!(instantiated.kind, TypeKind::InstantiatedGeneric);
    let DescriptorData::InstantiatedGeneric(loader) = &instantiated.data else {
        panic!("expected instantiated-generic payload");
    };
    let body = loader.load(DEFAULT_LOADER_RETRY_COUNT).expect("loads");
    assert_eq!(body.origin, list_id);
    assert_eq!(body.args.len(), 1);
    assert_eq!(body.args[0].param_name, "T");
    assert_eq!(body.args[0].index, 0);
    assert_eq!(body.args[0].ty.id(), "int");

    // `Ints` itself never gets a graph entry: it resolves straight through
    // to `List[int]` (§4.6 special case 1; scenario 2's "Ints itself
    // appears as a reference to p.List[int]").
    assert!(!result.graph.has(&format!("{PKG}.Ints")));
}

/// Scenario 3 (§8): `type A struct { X int }; func (A) M() {}; type B
/// struct { A; Y string }`.
#[test]
fn embedded_struct_promotes_fields_and_methods() {
    let pkg = PackageBuilder::new(PKG, "p")
        .named_type(named_type(
            "A",
            SourceType::Struct(StructDecl {
                fields: vec![FieldDecl {
                    name: "X".into(),
                    ty: SourceType::Basic("int".into()),
                    tag: String::new(),
                    embedded: false,
                    exported: true,
                    doc: None,
                    comment: None,
                }],
                type_params: Vec::new(),
            }),
            true,
        ))
        .method(MethodDecl {
            name: "M".into(),
            exported: true,
            receiver_type: "A".into(),
            pointer_receiver: false,
            signature: SignatureDecl::default(),
            doc: None,
            comment: None,
            span: tg_common::Span::dummy(),
        })
        .named_type(named_type(
            "B",
            SourceType::Struct(StructDecl {
                fields: vec![
                    FieldDecl {
                        name: "A".into(),
                        ty: named(PKG, "A"),
                        tag: String::new(),
                        embedded: true,
                        exported: true,
                        doc: None,
                        comment: None,
                    },
                    FieldDecl {
                        name: "Y".into(),
                        ty: SourceType::Basic("string".into()),
                        tag: String::new(),
                        embedded: false,
                        exported: true,
                        doc: None,
                        comment: None,
                    },
                ],
                type_params: Vec::new(),
            }),
            true,
        ))
        .build();

    let result = run(pkg, ScanMode::FULL, Visibility::Both);

    let a_id = format!("{PKG}.A");
    let b_id = format!("{PKG}.B");
    let b = result.graph.get(&b_id).unwrap();
    let DescriptorData::Struct(loader) = &b.data else {
        panic!("expected struct payload");
    };
    let body = loader.load(DEFAULT_LOADER_RETRY_COUNT).expect("loads");

    assert_eq!(body.embeds, vec![a_id.clone()]);

    assert!(
        !body.fields.iter().any(|f| f.name == "A"),
        "the embedded field itself is not added to fields (only its promoted members)"
    );
    let y = body.fields.iter().find(|f| f.name == "Y").expect("Y is a direct field");
    assert!(y.promoted_from.is_none());

    let x = body.fields.iter().find(|f| f.name == "X").expect("X is promoted from A");
    assert_eq!(x.promoted_from.as_deref(), Some(a_id.as_str()));
    assert_eq!(x.parent, b_id);

    let m = body.methods.iter().find(|m| m.name == "M").expect("M is promoted from A");
    assert_eq!(m.promoted_from.as_deref(), Some(a_id.as_str()));
    // I6/P7: a promoted method's receiver is the struct it is now owned by,
    // not the type that originally declared it.
    assert_eq!(m.receiver, b_id);
}

/// Scenario 4 (§8): `type P = ***int`.
#[test]
fn pointer_depth_collapses_to_one_descriptor() {
    let pkg = PackageBuilder::new(PKG, "p")
        .named_type(tg_source::NamedTypeDecl {
            name: "P".into(),
            exported: true,
            type_params: Vec::new(),
            underlying: SourceType::Alias {
                package: PKG.into(),
                name: "P".into(),
                aliased: Box::new(SourceType::Pointer(Box::new(SourceType::Pointer(Box::new(
                    SourceType::Pointer(Box::new(SourceType::Basic("int".into()))),
                ))))),
            },
            doc: None,
            comment: None,
            span: tg_common::Span::dummy(),
        })
        .build();

    let result = run(pkg, ScanMode::FULL, Visibility::Both);

    let p_id = format!("{PKG}.P");
    let p = result.graph.get(&p_id).unwrap();
    assert_eq!(p.kind, TypeKind::Alias);
    let DescriptorData::Alias { underlying } = &p.data else {
        panic!("expected alias payload");
    };
    let TypeHandle::Inline(pointer) = underlying else {
        panic!("expected a single inline pointer descriptor");
    };
    assert_eq!(pointer.kind, TypeKind::Pointer);
    let DescriptorData::Pointer { element, depth } = &pointer.data else {
        panic!("expected pointer payload");
    };
    assert_eq!(*depth, 3, "*** collapses to one pointer descriptor of depth 3");
    assert_eq!(element.id(), "int");
    assert!(
        !matches!(element, TypeHandle::Inline(d) if d.kind == TypeKind::Pointer),
        "I5: a pointer never wraps another pointer"
    );
}

/// Scenario 5 (§8): `type R interface { Read() int }; type RW interface {
/// R; Write() }`.
#[test]
fn interface_embedding_promotes_methods() {
    let pkg = PackageBuilder::new(PKG, "p")
        .named_type(named_type(
            "R",
            SourceType::Interface(InterfaceDecl {
                embeds: Vec::new(),
                methods: vec![InterfaceMethodDecl {
                    name: "Read".into(),
                    signature: SignatureDecl {
                        results: vec![tg_source::ResultDecl {
                            name: None,
                            ty: SourceType::Basic("int".into()),
                        }],
                        ..Default::default()
                    },
                    doc: None,
                    comment: None,
                }],
                type_params: Vec::new(),
            }),
            true,
        ))
        .named_type(named_type(
            "RW",
            SourceType::Interface(InterfaceDecl {
                embeds: vec![named(PKG, "R")],
                methods: vec![InterfaceMethodDecl {
                    name: "Write".into(),
                    signature: SignatureDecl::default(),
                    doc: None,
                    comment: None,
                }],
                type_params: Vec::new(),
            }),
            true,
        ))
        .build();

    let result = run(pkg, ScanMode::FULL, Visibility::Both);

    let r_id = format!("{PKG}.R");
    let rw_id = format!("{PKG}.RW");
    let rw = result.graph.get(&rw_id).unwrap();
    let DescriptorData::Interface(loader) = &rw.data else {
        panic!("expected interface payload");
    };
    let body = loader.load(DEFAULT_LOADER_RETRY_COUNT).expect("loads");

    assert_eq!(body.embeds, vec![r_id.clone()]);

    let write = body.methods.iter().find(|m| m.name == "Write").expect("Write is original");
    assert!(write.promoted_from.is_none());
    assert_eq!(write.receiver, rw_id);

    let read = body.methods.iter().find(|m| m.name == "Read").expect("Read is promoted from R");
    assert_eq!(read.promoted_from.as_deref(), Some(r_id.as_str()));
    assert_eq!(read.receiver, rw_id);
}

/// Scenario 6 (§8): `type S struct { X int; y int }` with `visibility =
/// exported`.
#[test]
fn unexported_fields_are_filtered_by_visibility() {
    let pkg = PackageBuilder::new(PKG, "p")
        .named_type(named_type(
            "S",
            SourceType::Struct(StructDecl {
                fields: vec![
                    FieldDecl {
                        name: "X".into(),
                        ty: SourceType::Basic("int".into()),
                        tag: String::new(),
                        embedded: false,
                        exported: true,
                        doc: None,
                        comment: None,
                    },
                    FieldDecl {
                        name: "y".into(),
                        ty: SourceType::Basic("int".into()),
                        tag: String::new(),
                        embedded: false,
                        exported: false,
                        doc: None,
                        comment: None,
                    },
                ],
                type_params: Vec::new(),
            }),
            true,
        ))
        .build();

    let result = run(pkg, ScanMode::FULL, Visibility::Exported);

    let s_id = format!("{PKG}.S");
    let s = result.graph.get(&s_id).unwrap();
    let DescriptorData::Struct(loader) = &s.data else {
        panic!("expected struct payload");
    };
    let body = loader.load(DEFAULT_LOADER_RETRY_COUNT).expect("loads");

    assert_eq!(body.fields.len(), 1);
    assert_eq!(body.fields[0].name, "X");
}

/// P5 (§8): "for every non-root package Q, distance(Q) = 1 + min{distance(P)
/// : P imports Q}". A scanned root `p` at distance 0 references a type in a
/// second package `q` it never names as a root itself; `q` is only reachable
/// through `p`'s own `PackageProvider` lookup, the same way a real front-end
/// would hand over an imported (but not directly scanned) package.
#[test]
fn referenced_package_gets_distance_one_from_a_root() {
    const OTHER: &str = "example.com/mod/q";

    let q = PackageBuilder::new(OTHER, "q")
        .named_type(named_type(
            "Widget",
            SourceType::Struct(StructDecl {
                fields: Vec::new(),
                type_params: Vec::new(),
            }),
            true,
        ))
        .build();

    let p = PackageBuilder::new(PKG, "p")
        .import(OTHER)
        .named_type(named_type(
            "Holder",
            SourceType::Struct(StructDecl {
                fields: vec![FieldDecl {
                    name: "W".into(),
                    ty: named(OTHER, "Widget"),
                    tag: String::new(),
                    embedded: false,
                    exported: true,
                    doc: None,
                    comment: None,
                }],
                type_params: Vec::new(),
            }),
            true,
        ))
        .build();

    let p: Arc<dyn Package> = Arc::new(p);
    let q: Arc<dyn Package> = Arc::new(q);

    let mut roots = FxHashMap::default();
    roots.insert(PKG.to_string(), p);

    let mut provider_packages = roots.clone();
    provider_packages.insert(OTHER.to_string(), q);

    let mut options = ScanOptions::default();
    options.packages = vec![PKG.to_string()];
    options.scan_mode = ScanMode::FULL;
    options.visibility = Visibility::Both;

    let provider = Arc::new(MapProvider::new(provider_packages));
    let result = tg_scan::scan(options, provider, &roots, &[], &CancellationToken::new())
        .expect("scan should succeed");

    let p_entry = result.packages.get(PKG).expect("root package registered");
    assert_eq!(p_entry.distance(), 0);

    let q_entry = result
        .packages
        .get(OTHER)
        .expect("q gets registered once Widget is referenced from p");
    assert_eq!(q_entry.distance(), 1, "q is one hop away from the only root that references it");

    assert!(result.graph.has(&format!("{OTHER}.Widget")));
}
