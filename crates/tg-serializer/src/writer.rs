//! Output formatting (SPEC_FULL.md §15 "Deterministic JSON output
//! formatting": "every comparable CLI in the pack (tsz, loctree) exposes
//! both [a compact and a pretty-printed writer] for humans vs. tooling").
//!
//! Both writers walk the same [`serde_json::Value`] tree produced by
//! [`crate::serialize`]; `serde_json`'s own `Map` preserves insertion order
//! (the workspace enables `preserve_order` on `serde_json`), so neither
//! writer needs to re-sort anything to stay deterministic (P1).

use std::io::Write;

use serde_json::Value;

#[derive(Debug)]
pub struct WriteError(pub serde_json::Error);

impl std::fmt::Display for WriteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to write serialized graph: {}", self.0)
    }
}

impl std::error::Error for WriteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl From<serde_json::Error> for WriteError {
    fn from(err: serde_json::Error) -> Self {
        WriteError(err)
    }
}

/// Compact, single-line JSON - the default for piping into other tooling.
pub fn to_compact_string(tree: &Value) -> Result<String, WriteError> {
    Ok(serde_json::to_string(tree)?)
}

/// Two-space indented JSON - for a human reading the output directly.
pub fn to_pretty_string(tree: &Value) -> Result<String, WriteError> {
    Ok(serde_json::to_string_pretty(tree)?)
}

pub fn write_compact<W: Write>(writer: &mut W, tree: &Value) -> Result<(), WriteError> {
    serde_json::to_writer(writer, tree)?;
    Ok(())
}

pub fn write_pretty<W: Write>(writer: &mut W, tree: &Value) -> Result<(), WriteError> {
    serde_json::to_writer_pretty(writer, tree)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn compact_has_no_embedded_newlines() {
        let tree = json!({"types": {"pkg.T": {"kind": "struct"}}});
        let s = to_compact_string(&tree).unwrap();
        assert!(!s.contains('\n'));
    }

    #[test]
    fn pretty_indents_with_two_spaces() {
        let tree = json!({"types": {}});
        let s = to_pretty_string(&tree).unwrap();
        assert!(s.contains('\n'));
    }

    #[test]
    fn both_writers_round_trip_to_the_same_value() {
        let tree = json!({"a": 1, "b": [1, 2, 3]});
        let compact = to_compact_string(&tree).unwrap();
        let pretty = to_pretty_string(&tree).unwrap();
        let parsed_compact: Value = serde_json::from_str(&compact).unwrap();
        let parsed_pretty: Value = serde_json::from_str(&pretty).unwrap();
        assert_eq!(parsed_compact, tree);
        assert_eq!(parsed_pretty, tree);
    }
}
