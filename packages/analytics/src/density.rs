//! Tree counting and the tract join.

use std::collections::BTreeMap;

use heat_map_models::{TractRecord, TractStatistics, TreePoint};

/// Counts trees per tract identifier.
///
/// Tracts without trees do not appear in the result.
#[must_use]
pub fn count_trees_by_tract(trees: &[TreePoint]) -> BTreeMap<String, u64> {
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for tree in trees {
        *counts.entry(tree.tract.clone()).or_default() += 1;
    }
    counts
}

/// Left-joins per-tract tree counts onto the statistics table by
/// `tract_2010`.
///
/// Every statistics row is kept; rows with no matching trees get a count
/// of zero. `risk_index` is left at zero for the ranking pass.
#[must_use]
pub fn join_tree_counts(
    tracts: Vec<TractStatistics>,
    counts: &BTreeMap<String, u64>,
) -> Vec<TractRecord> {
    tracts
        .into_iter()
        .map(|tract| TractRecord {
            tree_count: counts.get(&tract.tract_2010).copied().unwrap_or(0),
            risk_index: 0.0,
            geoid: tract.geoid,
            tract_2010: tract.tract_2010,
            statistics: tract.statistics,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(tract: &str) -> TreePoint {
        TreePoint {
            latitude: 40.7,
            longitude: -73.9,
            tract: tract.to_string(),
        }
    }

    #[test]
    fn counts_trees_per_tract() {
        let trees = vec![tree("000100"), tree("000100"), tree("000300"), tree("000100")];
        let counts = count_trees_by_tract(&trees);
        assert_eq!(counts.len(), 2);
        assert_eq!(counts["000100"], 3);
        assert_eq!(counts["000300"], 1);
    }

    #[test]
    fn unmatched_tracts_get_zero() {
        let trees = vec![tree("000100"), tree("000100"), tree("000100")];
        let tracts = vec![
            TractStatistics::new("1400000US36005000100", BTreeMap::new()),
            TractStatistics::new("1400000US36005000200", BTreeMap::new()),
        ];

        let records = join_tree_counts(tracts, &count_trees_by_tract(&trees));
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].tract_2010, "000100");
        assert_eq!(records[0].tree_count, 3);
        assert_eq!(records[1].tract_2010, "000200");
        assert_eq!(records[1].tree_count, 0);
    }

    #[test]
    fn duplicate_suffixes_each_receive_the_count() {
        let trees = vec![tree("000100")];
        let tracts = vec![
            TractStatistics::new("36005000100", BTreeMap::new()),
            TractStatistics::new("36061000100", BTreeMap::new()),
        ];
        let records = join_tree_counts(tracts, &count_trees_by_tract(&trees));
        assert!(records.iter().all(|r| r.tree_count == 1));
    }
}
