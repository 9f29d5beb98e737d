//! Source spans - byte ranges within a source file.
//!
//! Spans are small (8 bytes) and cheap to copy. They are used to attribute
//! comments, declarations and diagnostics to a location, but the resolver
//! itself is position-agnostic: spans only ever flow through from the
//! front-end into descriptors and comments.

use serde::{Deserialize, Serialize};

/// A half-open byte range `[start, end)` within a single source file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }

    #[inline]
    pub const fn dummy() -> Self {
        Span {
            start: u32::MAX,
            end: u32::MAX,
        }
    }

    #[inline]
    pub const fn is_dummy(&self) -> bool {
        self.start == u32::MAX && self.end == u32::MAX
    }

    #[inline]
    pub const fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Number of source lines between `self.end` and `other.start`, where
    /// `lines` is the full source text. Used by the comment attachor to
    /// decide whether a comment is "adjacent" to a declaration.
    pub fn blank_lines_before(&self, other: Span, source: &str) -> usize {
        if other.start < self.end {
            return 0;
        }
        let start = self.end as usize;
        let end = (other.start as usize).min(source.len());
        source
            .get(start..end)
            .unwrap_or("")
            .bytes()
            .filter(|&b| b == b'\n')
            .count()
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dummy_round_trips() {
        assert!(Span::dummy().is_dummy());
        assert!(!Span::new(0, 1).is_dummy());
    }

    #[test]
    fn blank_lines_before_counts_newlines_between() {
        let source = "a\n\n\nb";
        let a = Span::new(0, 1);
        let b = Span::new(4, 5);
        assert_eq!(a.blank_lines_before(b, source), 3);
    }
}
