//! Score matrices the dynamic programs run on.
//!
//! Both layouts address cells by `(i, j)`, `0 <= i <= len1`, `0 <= j <= len2`.
//! [`BandedMatrix`] stores only a diagonal corridor; reads outside it give
//! [`NEG_INF`], writes outside it are a bug and abort.

/// Score of an unreachable cell. Leaves head-room for a few additions.
pub const NEG_INF: i32 = i32::MIN / 2;

pub trait DpMatrix: Clone {
    fn get(&self, i: usize, j: usize) -> i32;

    fn set(&mut self, i: usize, j: usize, value: i32);

    /// Inclusive span of columns stored in row `i`.
    fn columns(&self, i: usize) -> (usize, usize);

    fn rows(&self) -> usize;
}

/// Dense `(len1 + 1) x (len2 + 1)` matrix.
#[derive(Clone, Debug)]
pub struct FullMatrix {
    cols: usize,
    data: Vec<i32>,
}

impl FullMatrix {
    pub fn new(len1: usize, len2: usize) -> Self {
        Self {
            cols: len2 + 1,
            data: vec![NEG_INF; (len1 + 1) * (len2 + 1)],
        }
    }
}

impl DpMatrix for FullMatrix {
    #[inline]
    fn get(&self, i: usize, j: usize) -> i32 {
        self.data[i * self.cols + j]
    }

    #[inline]
    fn set(&mut self, i: usize, j: usize, value: i32) {
        self.data[i * self.cols + j] = value;
    }

    fn columns(&self, _i: usize) -> (usize, usize) {
        (0, self.cols - 1)
    }

    fn rows(&self) -> usize {
        self.data.len() / self.cols
    }
}

/// Diagonal band of half-width `width` around the main diagonal, widened by
/// the length difference so that both corners are always inside.
///
/// Row `i` holds columns `j` with `-column_delta <= j - i <= row_factor -
/// column_delta`.
#[derive(Clone, Debug)]
pub struct BandedMatrix {
    rows: usize,
    cols: usize,
    row_factor: usize,
    column_delta: usize,
    data: Vec<i32>,
}

impl BandedMatrix {
    pub fn new(len1: usize, len2: usize, width: usize) -> Self {
        let width = width.min(len1).min(len2);
        let row_factor = 2 * width + len1.abs_diff(len2);
        let column_delta = len1.saturating_sub(len2) + width;
        Self {
            rows: len1 + 1,
            cols: len2 + 1,
            row_factor,
            column_delta,
            data: vec![NEG_INF; (len1 + 1) * (row_factor + 1)],
        }
    }

    pub fn row_factor(&self) -> usize {
        self.row_factor
    }

    pub fn column_delta(&self) -> usize {
        self.column_delta
    }

    #[inline]
    pub fn in_band(&self, i: usize, j: usize) -> bool {
        i < self.rows && j < self.cols && j + self.column_delta >= i && j + self.column_delta - i <= self.row_factor
    }

    #[inline]
    fn index(&self, i: usize, j: usize) -> usize {
        i * (self.row_factor + 1) + (j + self.column_delta - i)
    }
}

impl DpMatrix for BandedMatrix {
    #[inline]
    fn get(&self, i: usize, j: usize) -> i32 {
        if self.in_band(i, j) {
            self.data[self.index(i, j)]
        } else {
            NEG_INF
        }
    }

    #[inline]
    fn set(&mut self, i: usize, j: usize, value: i32) {
        assert!(
            self.in_band(i, j),
            "cell ({i}, {j}) is outside the band (row factor {}, column delta {})",
            self.row_factor,
            self.column_delta
        );
        let idx = self.index(i, j);
        self.data[idx] = value;
    }

    fn columns(&self, i: usize) -> (usize, usize) {
        let lo = i.saturating_sub(self.column_delta);
        let hi = (i + self.row_factor - self.column_delta).min(self.cols - 1);
        (lo, hi)
    }

    fn rows(&self) -> usize {
        self.rows
    }
}
