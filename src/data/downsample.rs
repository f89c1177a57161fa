//! Fixed-stride row sampling.
//!
//! The sampled rows are `0, stride, 2 * stride, ...`, so a given file, budget
//! and row count always yield the same subsequence.

/// Row-skip interval that keeps a load within `max_points` (+1) samples.
pub fn compute_stride(total_rows: usize, max_points: usize) -> usize {
    if max_points == 0 {
        return 1;
    }
    (total_rows / max_points).max(1)
}

/// Data-row indices visited for a given stride.
pub fn sampled_rows(total_rows: usize, stride: usize) -> impl Iterator<Item = usize> {
    (0..total_rows).step_by(stride.max(1))
}

/// How many rows `sampled_rows` yields.
pub fn sample_count(total_rows: usize, stride: usize) -> usize {
    total_rows.div_ceil(stride.max(1))
}

/// Whether data-row `index` is part of the sample.
pub fn is_sampled(index: usize, stride: usize) -> bool {
    index % stride.max(1) == 0
}
