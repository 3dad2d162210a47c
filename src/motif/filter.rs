use super::BitapMatcher;

/// Drops hits that a neighbouring hit explains with one error less.
///
/// An indel matcher reports the positions next to a true occurrence too,
/// each paying one extra error. The filter keeps a window of three
/// consecutive hits and suppresses the middle one when an adjacent position
/// on either side is one error cheaper.
pub struct BitapMatcherFilter<M: BitapMatcher> {
    inner: M,
    positions: [Option<usize>; 3],
    errors: [usize; 3],
}

impl<M: BitapMatcher> BitapMatcherFilter<M> {
    pub fn new(inner: M) -> Self {
        let mut filter = Self {
            inner,
            positions: [None; 3],
            errors: [0; 3],
        };
        filter.shift();
        filter
    }

    fn shift(&mut self) {
        self.positions.rotate_left(1);
        self.errors.rotate_left(1);
        self.positions[2] = self.inner.find_next();
        self.errors[2] = if self.positions[2].is_some() {
            self.inner.number_of_errors()
        } else {
            0
        };
    }

    fn adjacent(a: Option<usize>, b: Option<usize>) -> bool {
        matches!((a, b), (Some(a), Some(b)) if a.abs_diff(b) == 1)
    }
}

impl<M: BitapMatcher> BitapMatcher for BitapMatcherFilter<M> {
    fn find_next(&mut self) -> Option<usize> {
        loop {
            self.shift();
            let current = self.positions[1]?;
            if Self::adjacent(self.positions[0], Some(current)) && self.errors[0] + 1 == self.errors[1] {
                continue;
            }
            if Self::adjacent(Some(current), self.positions[2]) && self.errors[1] == self.errors[2] + 1 {
                continue;
            }
            return Some(current);
        }
    }

    fn number_of_errors(&self) -> usize {
        self.errors[1]
    }
}
