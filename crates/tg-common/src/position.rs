//! Module-relative file positions.
//!
//! The front-end (out of scope, see §6 of SPEC_FULL.md) is the authority on
//! line/column conversion; the core only needs to carry the already-resolved
//! file path and, where useful for diagnostics, a line/column pair.

use serde::{Deserialize, Serialize};

/// A 0-indexed line/column position, as handed to us by the front-end's
/// position-to-file-path resolver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub const fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// A module-relative file path plus the position of some point of interest
/// within it (e.g. a declaration's start, or a comment's start).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub position: Position,
}

impl Location {
    pub fn new(file: impl Into<String>, position: Position) -> Self {
        Self {
            file: file.into(),
            position,
        }
    }
}
