//! Comment model shared by the comment attachor and the serializer.
//!
//! Every descriptor carries an ordered sequence of `(text, placement)`
//! pairs. `Comment` is that pair; `CommentPlacement` is the closed set of
//! placements a comment can have relative to the declaration it is
//! attached to.

use serde::{Deserialize, Serialize};

/// Where a comment sits relative to the declaration it documents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentPlacement {
    /// Doc comment directly above the declaration.
    Above,
    /// Trailing comment on the same line as the declaration.
    Inline,
    /// Aggregated package-level doc comment (keyed by `#PACKAGE_DOC`).
    Package,
    /// Comment found among the import block of a file.
    Imports,
    /// File-level comment between the package clause and the first
    /// declaration/import.
    File,
}

/// A single comment attached to a declaration, in source order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub text: String,
    pub placement: CommentPlacement,
}

impl Comment {
    pub fn new(text: impl Into<String>, placement: CommentPlacement) -> Self {
        Self {
            text: text.into(),
            placement,
        }
    }

    pub fn above(text: impl Into<String>) -> Self {
        Self::new(text, CommentPlacement::Above)
    }

    pub fn inline(text: impl Into<String>) -> Self {
        Self::new(text, CommentPlacement::Inline)
    }

    pub fn package(text: impl Into<String>) -> Self {
        Self::new(text, CommentPlacement::Package)
    }

    pub fn file(text: impl Into<String>) -> Self {
        Self::new(text, CommentPlacement::File)
    }

    pub fn imports(text: impl Into<String>) -> Self {
        Self::new(text, CommentPlacement::Imports)
    }
}

/// Sentinel declaration key used for aggregated package-level doc comments.
pub const PACKAGE_DOC_KEY: &str = "#PACKAGE_DOC";

/// Build the declaration key for a method (`<recv_type_name>.<method_name>`
/// or `<type_name>.<method_name>` for interface methods).
pub fn method_decl_key(owner: &str, method: &str) -> String {
    format!("{owner}.{method}")
}

/// Build the declaration key for a struct field (`<type_name>.<field_name>`).
pub fn field_decl_key(type_name: &str, field: &str) -> String {
    format!("{type_name}.{field}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decl_keys_join_owner_and_member_names() {
        assert_eq!(method_decl_key("Reader", "Read"), "Reader.Read");
        assert_eq!(field_decl_key("Point", "X"), "Point.X");
    }
}
