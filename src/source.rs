use serde::{Deserialize, Serialize};

/// `SourceRange` addresses a span of source text as a byte offset plus a
/// byte length. The end is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRange {
    pub offset: usize,
    pub length: usize,
}

impl SourceRange {
    pub fn new(offset: usize, length: usize) -> Self {
        SourceRange { offset, length }
    }

    /// Range spanning `start..end`.
    pub fn between(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        SourceRange {
            offset: start,
            length: end - start,
        }
    }

    #[inline]
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Whether `other` lies entirely within this range.
    pub fn covers(&self, other: SourceRange) -> bool {
        self.offset <= other.offset && other.end() <= self.end()
    }

    /// Smallest range containing both `self` and `other`.
    pub fn cover(&self, other: SourceRange) -> SourceRange {
        SourceRange::between(self.offset.min(other.offset), self.end().max(other.end()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_and_empty() {
        let r = SourceRange::new(4, 5);
        assert_eq!(r.end(), 9);
        assert!(!r.is_empty());
        assert!(SourceRange::new(4, 0).is_empty());
        assert_eq!(SourceRange::between(4, 9), r);
    }

    #[test]
    fn test_covers() {
        let outer = SourceRange::new(2, 10);
        assert!(outer.covers(SourceRange::new(2, 10)));
        assert!(outer.covers(SourceRange::new(4, 3)));
        assert!(outer.covers(SourceRange::new(12, 0)));
        assert!(!outer.covers(SourceRange::new(1, 3)));
        assert!(!outer.covers(SourceRange::new(11, 2)));
    }

    #[test]
    fn test_cover() {
        let a = SourceRange::new(2, 3);
        let b = SourceRange::new(8, 4);
        assert_eq!(a.cover(b), SourceRange::between(2, 12));
        assert_eq!(b.cover(a), SourceRange::between(2, 12));
    }
}
