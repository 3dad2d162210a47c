//! Small numeric helpers shared across modules.

/// Jenkins-Wang 64-bit integer mix.
///
/// Used to derive a reproducible basic letter from a wildcard and a seed.
#[inline]
pub fn jenkins_wang_64(mut key: i64) -> i64 {
    key = (!key).wrapping_add(key.wrapping_shl(21));
    key ^= ((key as u64) >> 24) as i64;
    key = key.wrapping_add(key.wrapping_shl(3)).wrapping_add(key.wrapping_shl(8));
    key ^= ((key as u64) >> 14) as i64;
    key = key.wrapping_add(key.wrapping_shl(2)).wrapping_add(key.wrapping_shl(4));
    key ^= ((key as u64) >> 28) as i64;
    key = key.wrapping_add(key.wrapping_shl(31));
    key
}

/// Band half-width that comfortably covers `expected_edits` indels.
///
/// Never returns zero; the length difference of the inputs is always
/// covered by the banded matrix itself.
#[inline]
pub fn default_band_width(expected_edits: usize) -> usize {
    (expected_edits + expected_edits / 2).max(1)
}
