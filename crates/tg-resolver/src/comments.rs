//! Comment Attachor (C5, §4.4).
//!
//! The front-end has already split each declaration's doc comment from its
//! trailing inline comment (§6 "a documentation view: per type, method,
//! function, constant, variable, a doc text"); this module's job is to
//! assemble those into the ordered `comments_by_decl` index keyed the way
//! §4.4 specifies, applying the union/fallback rule:
//!
//! "A declaration's comments are the union of: its doc comment (above), its
//! inline comment (trailing on the same line), and its enclosing
//! declaration's doc (if it has none of its own)."

use rustc_hash::FxHashMap;
use tg_common::{method_decl_key, field_decl_key, Comment, PACKAGE_DOC_KEY};
use tg_source::Package;

pub type CommentIndex = FxHashMap<String, Vec<Comment>>;

fn push_own(comments: &mut Vec<Comment>, doc: Option<&str>, inline: Option<&str>) -> bool {
    let mut had_own = false;
    if let Some(doc) = doc {
        comments.push(Comment::above(doc));
        had_own = true;
    }
    if let Some(inline) = inline {
        comments.push(Comment::inline(inline));
        had_own = true;
    }
    had_own
}

fn with_fallback(doc: Option<&str>, inline: Option<&str>, enclosing_doc: Option<&str>) -> Vec<Comment> {
    let mut comments = Vec::new();
    let had_own = push_own(&mut comments, doc, inline);
    if !had_own {
        if let Some(enclosing) = enclosing_doc {
            comments.push(Comment::above(enclosing));
        }
    }
    comments
}

/// Builds the full `comments_by_decl` index for one package (§4.4).
pub fn index_comments(pkg: &dyn Package) -> CommentIndex {
    let mut index = CommentIndex::default();

    for ty in pkg.types() {
        let mut own = Vec::new();
        push_own(&mut own, ty.doc.as_deref(), ty.comment.as_deref());
        if !own.is_empty() {
            index.insert(ty.name.clone(), own);
        }

        match &ty.underlying {
            tg_source::SourceType::Struct(s) => {
                for field in &s.fields {
                    let key = field_decl_key(&ty.name, &field.name);
                    let comments =
                        with_fallback(field.doc.as_deref(), field.comment.as_deref(), ty.doc.as_deref());
                    if !comments.is_empty() {
                        index.insert(key, comments);
                    }
                }
            }
            tg_source::SourceType::Interface(iface) => {
                for method in &iface.methods {
                    let key = method_decl_key(&ty.name, &method.name);
                    let comments = with_fallback(
                        method.doc.as_deref(),
                        method.comment.as_deref(),
                        ty.doc.as_deref(),
                    );
                    if !comments.is_empty() {
                        index.insert(key, comments);
                    }
                }
            }
            _ => {}
        }

        for method in pkg.methods_of(&ty.name) {
            let key = method_decl_key(&ty.name, &method.name);
            let comments =
                with_fallback(method.doc.as_deref(), method.comment.as_deref(), ty.doc.as_deref());
            if !comments.is_empty() {
                index.insert(key, comments);
            }
        }
    }

    for func in pkg.functions() {
        let mut own = Vec::new();
        push_own(&mut own, func.doc.as_deref(), func.comment.as_deref());
        if !own.is_empty() {
            index.insert(func.name.clone(), own);
        }
    }

    for constant in pkg.constants() {
        let mut own = Vec::new();
        push_own(&mut own, constant.doc.as_deref(), constant.comment.as_deref());
        if !own.is_empty() {
            index.insert(constant.name.clone(), own);
        }
    }

    for variable in pkg.variables() {
        let mut own = Vec::new();
        push_own(&mut own, variable.doc.as_deref(), variable.comment.as_deref());
        if !own.is_empty() {
            index.insert(variable.name.clone(), own);
        }
    }

    let package_doc: Vec<&str> = pkg
        .files()
        .iter()
        .filter_map(|f| f.package_doc.as_deref())
        .chain(pkg.package_doc())
        .collect();
    if !package_doc.is_empty() {
        let joined = package_doc.join("\n");
        index.insert(PACKAGE_DOC_KEY.to_string(), vec![Comment::package(joined)]);
    }

    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use tg_source::testkit::{named_type, PackageBuilder};
    use tg_source::{ConstantDecl, FieldDecl, MethodDecl, SignatureDecl, SourceType, StructDecl};
    use tg_common::Span;

    #[test]
    fn field_without_own_doc_falls_back_to_struct_doc() {
        let pkg = PackageBuilder::new("example.com/mod/pkg", "pkg")
            .named_type({
                let mut decl = named_type(
                    "Point",
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
                );
                decl.doc = Some("Point is a 2D coordinate.".into());
                decl
            })
            .build();

        let index = index_comments(&pkg);
        let field_comments = index.get("Point.X").expect("fallback comment recorded");
        assert_eq!(field_comments[0].text, "Point is a 2D coordinate.");
    }

    #[test]
    fn method_own_doc_wins_over_fallback() {
        let pkg = PackageBuilder::new("example.com/mod/pkg", "pkg")
            .named_type({
                let mut decl = named_type(
                    "Widget",
                    SourceType::Struct(StructDecl {
                        fields: Vec::new(),
                        type_params: Vec::new(),
                    }),
                    true,
                );
                decl.doc = Some("Widget doc.".into());
                decl
            })
            .method(MethodDecl {
                name: "Name".into(),
                exported: true,
                receiver_type: "Widget".into(),
                pointer_receiver: false,
                signature: SignatureDecl::default(),
                doc: Some("Name returns the widget's name.".into()),
                comment: None,
                span: Span::dummy(),
            })
            .build();

        let index = index_comments(&pkg);
        let comments = index.get("Widget.Name").unwrap();
        assert_eq!(comments[0].text, "Name returns the widget's name.");
    }

    #[test]
    fn constants_get_their_own_doc_only() {
        let pkg = PackageBuilder::new("example.com/mod/pkg", "pkg")
            .constant(ConstantDecl {
                name: "MaxRetries".into(),
                exported: true,
                ty: SourceType::Basic("int".into()),
                value: serde_json::json!(3),
                doc: Some("MaxRetries bounds loader retries.".into()),
                comment: None,
                span: Span::dummy(),
            })
            .build();

        let index = index_comments(&pkg);
        assert_eq!(index.get("MaxRetries").unwrap()[0].text, "MaxRetries bounds loader retries.");
    }
}
