//! Percentile ranking of tree counts.

use heat_map_models::TractRecord;

/// Percentile rank of each value, ascending, with ties sharing their
/// average rank.
///
/// The result is `average_rank / len`, so every entry is in `(0, 1]` and
/// the largest value always ranks `1.0`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn percentile_rank(values: &[u64]) -> Vec<f64> {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by_key(|&i| values[i]);

    let mut ranks = vec![0.0; n];
    let mut start = 0;
    while start < n {
        let value = values[order[start]];
        let mut end = start;
        while end + 1 < n && values[order[end + 1]] == value {
            end += 1;
        }

        // One-based ranks start+1..=end+1 averaged.
        let average = (start + end + 2) as f64 / 2.0;
        let pct = average / n as f64;
        for &i in &order[start..=end] {
            ranks[i] = pct;
        }

        start = end + 1;
    }

    ranks
}

/// Recomputes `risk_index` for every record from the current
/// `tree_count` column.
pub fn assign_risk_index(records: &mut [TractRecord]) {
    let counts: Vec<u64> = records.iter().map(|r| r.tree_count).collect();
    for (record, rank) in records.iter_mut().zip(percentile_rank(&counts)) {
        record.risk_index = rank;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-12, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn ranks_distinct_values() {
        assert_close(&percentile_rank(&[30, 10, 20, 40]), &[0.75, 0.25, 0.5, 1.0]);
    }

    #[test]
    fn ties_share_average_rank() {
        // Ranks 1,2 tie -> 1.5; ranks 3,4,5 tie -> 4.
        assert_close(
            &percentile_rank(&[0, 7, 0, 7, 7]),
            &[0.3, 0.8, 0.3, 0.8, 0.8],
        );
    }

    #[test]
    fn all_equal_values_rank_together() {
        assert_close(&percentile_rank(&[5, 5, 5, 5]), &[0.625, 0.625, 0.625, 0.625]);
    }

    #[test]
    fn empty_input_yields_empty_ranks() {
        assert!(percentile_rank(&[]).is_empty());
    }

    #[test]
    fn rank_is_monotonic_in_value() {
        let values = [3, 0, 12, 0, 5, 5, 1, 40, 12, 0];
        let ranks = percentile_rank(&values);
        for i in 0..values.len() {
            assert!(ranks[i] > 0.0 && ranks[i] <= 1.0);
            for j in 0..values.len() {
                if values[i] < values[j] {
                    assert!(ranks[i] < ranks[j]);
                } else if values[i] == values[j] {
                    assert!((ranks[i] - ranks[j]).abs() < f64::EPSILON);
                }
            }
        }
    }
}
