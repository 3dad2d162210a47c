//! Half-open intervals with an orientation flag.
//!
//! A [`Range`] always stores `lower <= upper`; `lower` is inclusive and
//! `upper` exclusive whatever the orientation. A reversed range reads from
//! `upper` down to `lower`, so `from()` and `to()` swap.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::{invalid, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Range {
    lower: i32,
    upper: i32,
    reversed: bool,
}

impl Range {
    /// Range from `from` to `to`; reversed when `from > to`.
    pub fn new(from: i32, to: i32) -> Self {
        if from > to {
            Self {
                lower: to,
                upper: from,
                reversed: true,
            }
        } else {
            Self {
                lower: from,
                upper: to,
                reversed: false,
            }
        }
    }

    /// Range with explicit bounds and orientation.
    pub fn checked(lower: i32, upper: i32, reversed: bool) -> Result<Self> {
        if lower > upper {
            return invalid(format!("range lower {lower} exceeds upper {upper}"));
        }
        Ok(Self {
            lower,
            upper,
            reversed,
        })
    }

    /// Forward range over `0..len`.
    pub fn of_length(len: usize) -> Self {
        Self::new(0, len as i32)
    }

    /// Inclusive lower bound, whatever the orientation.
    pub fn lower(&self) -> i32 {
        self.lower
    }

    /// Exclusive upper bound.
    pub fn upper(&self) -> i32 {
        self.upper
    }

    /// Start in reading order: `upper` for a reversed range.
    pub fn from(&self) -> i32 {
        if self.reversed {
            self.upper
        } else {
            self.lower
        }
    }

    /// End in reading order: `lower` for a reversed range.
    pub fn to(&self) -> i32 {
        if self.reversed {
            self.lower
        } else {
            self.upper
        }
    }

    /// Number of positions covered.
    pub fn length(&self) -> i32 {
        self.upper - self.lower
    }

    /// True when `lower == upper`.
    pub fn is_empty(&self) -> bool {
        self.lower == self.upper
    }

    /// True when the range reads from `upper` down to `lower`.
    pub fn is_reverse(&self) -> bool {
        self.reversed
    }

    /// Same bounds with the given orientation.
    pub fn with_reversed(&self, reversed: bool) -> Self {
        Self { reversed, ..*self }
    }

    /// Same bounds, opposite orientation.
    pub fn inverse(&self) -> Self {
        self.with_reversed(!self.reversed)
    }

    /// True when `point` lies in `[lower, upper)`.
    pub fn contains(&self, point: i32) -> bool {
        point >= self.lower && point < self.upper
    }

    /// Like [`Range::contains`] but also accepts `upper`, the boundary
    /// after the last position.
    pub fn contains_boundary(&self, point: i32) -> bool {
        point >= self.lower && point <= self.upper
    }

    /// True when `other` lies entirely inside this range. Orientation is
    /// ignored.
    pub fn contains_range(&self, other: &Range) -> bool {
        other.lower >= self.lower && other.upper <= self.upper
    }

    /// True when the two ranges share at least one position.
    pub fn intersects_with(&self, other: &Range) -> bool {
        other.lower < self.upper && self.lower < other.upper
    }

    /// True when the ranges overlap or one ends exactly where the other
    /// starts.
    pub fn intersects_with_or_touches(&self, other: &Range) -> bool {
        self.contains(other.lower)
            || self.contains(other.upper - 1)
            || (other.upper > self.upper && other.lower < self.lower)
            || other.lower == self.upper
            || other.upper == self.lower
    }

    /// Overlap of two ranges, keeping this range's orientation.
    pub fn intersection(&self, other: &Range) -> Option<Range> {
        if !self.intersects_with(other) {
            return None;
        }
        Some(Self {
            lower: self.lower.max(other.lower),
            upper: self.upper.min(other.upper),
            reversed: self.reversed,
        })
    }

    /// Like [`Range::intersection`], but touching ranges give an empty range.
    pub fn intersection_with_touch(&self, other: &Range) -> Option<Range> {
        if !self.intersects_with_or_touches(other) {
            return None;
        }
        Some(Self {
            lower: self.lower.max(other.lower),
            upper: self.upper.min(other.upper),
            reversed: self.reversed,
        })
    }

    /// Union of overlapping or touching ranges.
    pub fn try_merge(&self, other: &Range) -> Option<Range> {
        if !self.intersects_with_or_touches(other) {
            return None;
        }
        Some(self.merge(other))
    }

    /// Smallest range spanning both.
    pub fn merge(&self, other: &Range) -> Range {
        Self {
            lower: self.lower.min(other.lower),
            upper: self.upper.max(other.upper),
            reversed: self.reversed,
        }
    }

    /// Parts of this range not covered by `other`.
    pub fn without(&self, other: &Range) -> Vec<Range> {
        if !self.intersects_with(other) {
            return vec![*self];
        }
        let mut parts = Vec::with_capacity(2);
        if other.lower > self.lower {
            parts.push(Self {
                lower: self.lower,
                upper: other.lower,
                reversed: self.reversed,
            });
        }
        if other.upper < self.upper {
            parts.push(Self {
                lower: other.upper,
                upper: self.upper,
                reversed: self.reversed,
            });
        }
        parts
    }

    /// Shifts both bounds by `offset`.
    pub fn move_by(&self, offset: i32) -> Range {
        if offset == 0 {
            return *self;
        }
        Self {
            lower: self.lower + offset,
            upper: self.upper + offset,
            reversed: self.reversed,
        }
    }

    /// Grows the range by `left` positions below and `right` above. Negative
    /// values shrink it; shrinking past empty is an error.
    pub fn expand(&self, left: i32, right: i32) -> Result<Range> {
        Self::checked(self.lower - left, self.upper + right, self.reversed)
    }

    /// Index of `absolute` when the range is read in its own orientation.
    pub fn convert_point_to_relative(&self, absolute: i32) -> Result<i32> {
        if !self.contains(absolute) {
            return invalid(format!("point {absolute} outside {self}"));
        }
        Ok(if self.reversed {
            self.upper - 1 - absolute
        } else {
            absolute - self.lower
        })
    }

    /// Inverse of [`Range::convert_point_to_relative`].
    pub fn convert_point_to_absolute(&self, relative: i32) -> Result<i32> {
        if relative < 0 || relative >= self.length() {
            return invalid(format!("relative point {relative} outside {self}"));
        }
        Ok(if self.reversed {
            self.upper - 1 - relative
        } else {
            relative + self.lower
        })
    }

    /// Boundary version of [`Range::convert_point_to_relative`]: both `lower`
    /// and `upper` are valid inputs, and a reversed range counts boundaries
    /// from `upper`.
    pub fn convert_boundary_to_relative(&self, absolute: i32) -> Result<i32> {
        if !self.contains_boundary(absolute) {
            return invalid(format!("boundary {absolute} outside {self}"));
        }
        Ok(if self.reversed {
            self.upper - absolute
        } else {
            absolute - self.lower
        })
    }

    /// Inverse of [`Range::convert_boundary_to_relative`].
    pub fn convert_boundary_to_absolute(&self, relative: i32) -> Result<i32> {
        if relative < 0 || relative > self.length() {
            return invalid(format!("relative boundary {relative} outside {self}"));
        }
        Ok(if self.reversed {
            self.upper - relative
        } else {
            relative + self.lower
        })
    }

    /// `range` expressed in coordinates relative to this range.
    pub fn relative_range_of(&self, range: &Range) -> Result<Range> {
        if !self.contains_range(range) {
            return invalid(format!("{range} is not inside {self}"));
        }
        Ok(Range::new(
            self.convert_boundary_to_relative(range.from())?,
            self.convert_boundary_to_relative(range.to())?,
        ))
    }

    /// Inverse of [`Range::relative_range_of`].
    pub fn absolute_range_for(&self, relative: &Range) -> Result<Range> {
        Ok(Range::new(
            self.convert_boundary_to_absolute(relative.from())?,
            self.convert_boundary_to_absolute(relative.to())?,
        ))
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.from(), self.to())
    }
}

impl Serialize for Range {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        (self.from(), self.to()).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Range {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let (from, to) = <(i32, i32)>::deserialize(deserializer)?;
        Ok(Range::new(from, to))
    }
}
