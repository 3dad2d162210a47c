use proptest::prelude::*;
use seqalign::aligner::{align_left_added, align_right_added, align_semi_local_left, align_semi_local_right};
use seqalign::alignment::calculate_score;
use seqalign::{
    AlignmentScoring, BandedAlignerParameters, BioSequence, LinearGapAlignmentScoring, NucleotideSequence, Range,
};

const MATCH: i64 = 5;
const MISMATCH: i64 = -4;
const GAP: i64 = -5;
const NEG: i64 = -(1 << 40);

fn nt(text: &str) -> NucleotideSequence {
    text.parse().unwrap()
}

fn params(width: usize, stop_penalty: i32) -> BandedAlignerParameters<NucleotideSequence> {
    BandedAlignerParameters::builder(LinearGapAlignmentScoring::nucleotide_blast())
        .with_width(width)
        .with_stop_penalty(stop_penalty)
        .build()
}

/// Plain `(len1 + 1) x (len2 + 1)` table; cells off the band stay at `NEG`.
struct Table {
    cells: Vec<Vec<i64>>,
    width: usize,
    delta: usize,
}

impl Table {
    fn new(a: &[u8], b: &[u8], width: usize) -> Self {
        let width = width.min(a.len()).min(b.len());
        let delta = a.len().saturating_sub(b.len()) + width;
        let mut table = Self {
            cells: vec![vec![NEG; b.len() + 1]; a.len() + 1],
            width: 2 * width + a.len().abs_diff(b.len()),
            delta,
        };
        for i in 0..=a.len() {
            for j in 0..=b.len() {
                if (i == 0 || j == 0) && table.in_band(i, j) {
                    table.cells[i][j] = GAP * (i + j) as i64;
                }
            }
        }
        table
    }

    fn in_band(&self, i: usize, j: usize) -> bool {
        j + self.delta >= i && j + self.delta - i <= self.width
    }

    fn fill(&mut self, a: &[u8], b: &[u8], i: usize, j: usize) -> i64 {
        let s = if a[i - 1] == b[j - 1] { MATCH } else { MISMATCH };
        let v = (self.cells[i - 1][j - 1] + s)
            .max(self.cells[i][j - 1] + GAP)
            .max(self.cells[i - 1][j] + GAP);
        self.cells[i][j] = v;
        v
    }
}

/// Row-by-row extension keeping the first cell that beats the best so far,
/// stopping once row `i` trails `(i - 1)` perfect matches by more than
/// `stop_penalty`. Returns `(stop1, stop2, score)`.
fn naive_semi_local(a: &[u8], b: &[u8], width: usize, stop_penalty: i64) -> (i32, i32, i64) {
    let mut table = Table::new(a, b, width);
    let mut best = (0i64, 0usize, 0usize);
    for i in 1..=a.len() {
        let mut row_max: Option<i64> = None;
        for j in 1..=b.len() {
            if !table.in_band(i, j) {
                continue;
            }
            let v = table.fill(a, b, i, j);
            if v > best.0 {
                best = (v, i, j);
            }
            row_max = Some(row_max.map_or(v, |m| m.max(v)));
        }
        match row_max {
            Some(m) if m - (i as i64 - 1) * MATCH >= stop_penalty => {}
            _ => break,
        }
    }
    (best.1 as i32 - 1, best.2 as i32 - 1, best.0)
}

/// Best end over the last `added1` rows of the last column, then the last
/// `added2` columns of the last row, both scanned upward; first maximum wins.
fn naive_added(a: &[u8], added1: usize, b: &[u8], added2: usize, width: usize) -> (usize, usize, i64) {
    let mut table = Table::new(a, b, width);
    for i in 1..=a.len() {
        for j in 1..=b.len() {
            if table.in_band(i, j) {
                table.fill(a, b, i, j);
            }
        }
    }
    let (l1, l2) = (a.len(), b.len());
    let mut best: Option<(i64, usize, usize)> = None;
    let column = (l1 - added1.min(l1)..=l1).map(|i| (i, l2));
    let row = (l2 - added2.min(l2)..=l2).map(|j| (l1, j));
    for (i, j) in column.chain(row) {
        let v = table.cells[i][j];
        if best.map_or(true, |(b, _, _)| v > b) {
            best = Some((v, i, j));
        }
    }
    let (v, i, j) = best.unwrap();
    (i, j, v)
}

fn reversed(text: &str) -> String {
    text.chars().rev().collect()
}

#[test]
fn fixed_extensions() {
    for (a, b, width, stop, expected) in [
        ("ACA", "AGA", 2, -8, (2, 2, 6)),
        ("ACCAAA", "AGGAAA", 2, -8, (0, 0, 5)),
        ("ATTAGACAGCGCGCGCGC", "ATTAGACATATATATATA", 3, -30, (7, 7, 40)),
        ("GGGG", "CCCC", 3, -30, (-1, -1, 0)),
    ] {
        let r = align_semi_local_left(&params(width, stop), &nt(a), Range::of_length(a.len()), &nt(b), Range::of_length(b.len()))
            .unwrap();
        assert_eq!((r.sequence1_stop, r.sequence2_stop, r.score), expected, "{a} / {b}");
        assert_eq!(naive_semi_local(a.as_bytes(), b.as_bytes(), width, i64::from(stop)), (expected.0, expected.1, i64::from(expected.2)));
    }
}

proptest! {
    #[test]
    fn semi_local_left_matches_naive_table(
        a in "[ACGT]{0,24}",
        b in "[ACGT]{0,24}",
        width in 0usize..8,
        stop in -40i32..0,
    ) {
        let (s1, s2) = (nt(&a), nt(&b));
        let r = align_semi_local_left(&params(width, stop), &s1, Range::of_length(s1.size()), &s2, Range::of_length(s2.size()))
            .unwrap();
        let (stop1, stop2, score) = naive_semi_local(a.as_bytes(), b.as_bytes(), width, i64::from(stop));
        prop_assert_eq!((r.sequence1_stop, r.sequence2_stop), (stop1, stop2));
        prop_assert_eq!(i64::from(r.score), score);

        let part1 = s1.get_range(0, (stop1 + 1) as usize).unwrap();
        let part2 = s2.get_range(0, (stop2 + 1) as usize).unwrap();
        prop_assert_eq!(r.mutations.mutate(&part1).unwrap(), part2);
        let scoring = AlignmentScoring::Linear(LinearGapAlignmentScoring::nucleotide_blast());
        prop_assert_eq!(calculate_score(&scoring, part1.size(), &r.mutations).unwrap(), r.score);
    }

    #[test]
    fn semi_local_right_mirrors_left(
        a in "[ACGT]{0,24}",
        b in "[ACGT]{0,24}",
        width in 0usize..8,
        stop in -40i32..0,
    ) {
        let (s1, s2) = (nt(&a), nt(&b));
        let r = align_semi_local_right(&params(width, stop), &s1, Range::of_length(s1.size()), &s2, Range::of_length(s2.size()))
            .unwrap();
        let (stop1, stop2, score) =
            naive_semi_local(reversed(&a).as_bytes(), reversed(&b).as_bytes(), width, i64::from(stop));
        prop_assert_eq!(r.sequence1_stop, a.len() as i32 - 1 - stop1);
        prop_assert_eq!(r.sequence2_stop, b.len() as i32 - 1 - stop2);
        prop_assert_eq!(i64::from(r.score), score);
    }

    #[test]
    fn added_ends_match_naive_table(
        a in "[ACGT]{1,20}",
        b in "[ACGT]{1,20}",
        added1 in 0usize..6,
        added2 in 0usize..6,
        width in 0usize..8,
    ) {
        let (s1, s2) = (nt(&a), nt(&b));
        let p = params(width, -30);
        let right = align_right_added(&p, &s1, Range::of_length(s1.size()), added1, &s2, Range::of_length(s2.size()), added2)
            .unwrap();
        let (end1, end2, score) = naive_added(a.as_bytes(), added1, b.as_bytes(), added2, width);
        prop_assert_eq!(right.sequence1_range(), Range::new(0, end1 as i32));
        prop_assert_eq!(right.sequence2_range(), Range::new(0, end2 as i32));
        prop_assert_eq!(i64::from(right.score() as i32), score);

        let left = align_left_added(&p, &s1, Range::of_length(s1.size()), added1, &s2, Range::of_length(s2.size()), added2)
            .unwrap();
        let (len1, len2, score) = naive_added(reversed(&a).as_bytes(), added1, reversed(&b).as_bytes(), added2, width);
        prop_assert_eq!(left.sequence1_range(), Range::new((a.len() - len1) as i32, a.len() as i32));
        prop_assert_eq!(left.sequence2_range(), Range::new((b.len() - len2) as i32, b.len() as i32));
        prop_assert_eq!(i64::from(left.score() as i32), score);
    }
}
