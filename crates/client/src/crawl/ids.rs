//! The genre id space.

/// Lazy ascending walk over genre ids in `[start, end)`.
///
/// Cloning snapshots the position, so a crawl can be restarted from wherever
/// an earlier iterator stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenreIds {
    next: i64,
    end: i64,
}

impl GenreIds {
    pub fn new(start: i64, end: i64) -> Self {
        Self { next: start, end: end.max(start) }
    }

    /// The id the next call to `next()` yields, if any remain.
    pub fn peek(&self) -> Option<i64> {
        (self.next < self.end).then_some(self.next)
    }
}

impl Iterator for GenreIds {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        let id = self.peek()?;
        self.next += 1;
        Some(id)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.end - self.next).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for GenreIds {}
