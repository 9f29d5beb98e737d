//! Manifest loading exercised against real files on disk, covering a
//! couple of the concrete scenarios from spec §8 end-to-end through the
//! CLI's own JSON front-end stand-in.

use std::io::Write;

use tg_cli::manifest;
use tg_source::{Package, SourceType};

fn write_manifest(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

#[test]
fn loads_an_instantiated_generic_alias_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_manifest(
        &dir,
        "pkg.json",
        r#"
        {
            "path": "example.com/mod/p",
            "shortName": "p",
            "types": [
                {
                    "name": "List",
                    "exported": true,
                    "typeParams": [ { "name": "T", "constraint": { "kind": "basic", "name": "any" } } ],
                    "underlying": { "kind": "slice", "element": { "kind": "typeParamRef", "name": "T" } }
                },
                {
                    "name": "Ints",
                    "exported": true,
                    "underlying": {
                        "kind": "alias",
                        "package": "example.com/mod/p",
                        "name": "Ints",
                        "aliased": {
                            "kind": "named",
                            "package": "example.com/mod/p",
                            "name": "List",
                            "typeArgs": [ { "kind": "basic", "name": "int" } ]
                        }
                    }
                }
            ]
        }
        "#,
    );

    let pkg = manifest::load(&path).unwrap();
    assert_eq!(pkg.types().len(), 2);
    let list = &pkg.types()[0];
    assert!(matches!(list.underlying, SourceType::Slice(_)));
    let ints = &pkg.types()[1];
    assert!(matches!(ints.underlying, SourceType::Alias { .. }));
}

#[test]
fn loads_embedded_promotion_fixture_with_methods() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_manifest(
        &dir,
        "pkg.json",
        r#"
        {
            "path": "example.com/mod/p",
            "shortName": "p",
            "types": [
                {
                    "name": "A",
                    "exported": true,
                    "underlying": { "kind": "struct", "fields": [
                        { "name": "X", "type": { "kind": "basic", "name": "int" }, "exported": true }
                    ] }
                },
                {
                    "name": "B",
                    "exported": true,
                    "underlying": { "kind": "struct", "fields": [
                        { "name": "A", "type": { "kind": "named", "package": "example.com/mod/p", "name": "A" }, "embedded": true, "exported": true },
                        { "name": "Y", "type": { "kind": "basic", "name": "string" }, "exported": true }
                    ] }
                }
            ],
            "methods": [
                { "name": "M", "receiverType": "A", "exported": true }
            ]
        }
        "#,
    );

    let pkg = manifest::load(&path).unwrap();
    assert_eq!(pkg.methods_of("A").len(), 1);
    assert_eq!(pkg.methods_of("B").len(), 0);
}
