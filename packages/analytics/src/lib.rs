#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Tract-level tree density and heat risk ranking.
//!
//! Trees are counted per tract, joined onto the tract statistics table
//! with zero fill, and each tract gets a `risk_index`: the percentile rank
//! of its tree count. Tracts below the priority threshold (the lowest
//! quartile by default) are the high-priority view.

pub mod density;
pub mod rank;

use std::collections::{BTreeMap, BTreeSet};

use heat_map_models::{AnalysisSummary, TractPreview, TractRecord, TractStatistics, TreePoint};
use thiserror::Error;

pub use density::{count_trees_by_tract, join_tree_counts};
pub use rank::{assign_risk_index, percentile_rank};

/// Default cutoff for the high-priority view.
pub const DEFAULT_PRIORITY_THRESHOLD: f64 = 0.25;

/// Rows shown in the summary preview.
pub const PREVIEW_ROWS: usize = 10;

/// Errors that can occur while building the tract analysis.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// Threshold outside `(0, 1]`.
    #[error("Priority threshold must be in (0, 1], got {threshold}")]
    InvalidThreshold {
        /// The rejected threshold.
        threshold: f64,
    },
}

/// Enriched tract table with its high-priority view.
#[derive(Debug, Clone)]
pub struct TractAnalysis {
    records: Vec<TractRecord>,
    tree_counts: BTreeMap<String, u64>,
    priority_threshold: f64,
}

impl TractAnalysis {
    /// Counts trees, joins them onto `tracts`, and ranks every tract.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::InvalidThreshold`] if `priority_threshold`
    /// is not in `(0, 1]`.
    pub fn build(
        tracts: Vec<TractStatistics>,
        trees: &[TreePoint],
        priority_threshold: f64,
    ) -> Result<Self, AnalyticsError> {
        if !(priority_threshold > 0.0 && priority_threshold <= 1.0) {
            return Err(AnalyticsError::InvalidThreshold {
                threshold: priority_threshold,
            });
        }

        let tree_counts = count_trees_by_tract(trees);
        let mut records = join_tree_counts(tracts, &tree_counts);
        assign_risk_index(&mut records);

        let analysis = Self {
            records,
            tree_counts,
            priority_threshold,
        };

        log::info!(
            "Ranked {} tracts ({} distinct tree tracts, {} high priority)",
            analysis.records.len(),
            analysis.tree_counts.len(),
            analysis.high_priority().count()
        );

        Ok(analysis)
    }

    /// Replaces the tree counts from a new set of trees and re-ranks the
    /// whole table.
    pub fn recount(&mut self, trees: &[TreePoint]) {
        self.tree_counts = count_trees_by_tract(trees);
        for record in &mut self.records {
            record.tree_count = self
                .tree_counts
                .get(&record.tract_2010)
                .copied()
                .unwrap_or(0);
        }
        assign_risk_index(&mut self.records);
    }

    /// All tract rows, in statistics-table order.
    #[must_use]
    pub fn records(&self) -> &[TractRecord] {
        &self.records
    }

    /// Consumes the analysis and returns the tract rows.
    #[must_use]
    pub fn into_records(self) -> Vec<TractRecord> {
        self.records
    }

    /// The configured priority cutoff.
    #[must_use]
    pub const fn priority_threshold(&self) -> f64 {
        self.priority_threshold
    }

    /// Tracts with `risk_index` strictly below the priority threshold.
    pub fn high_priority(&self) -> impl Iterator<Item = &TractRecord> {
        self.records
            .iter()
            .filter(move |r| r.risk_index < self.priority_threshold)
    }

    /// Headline numbers for display.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn summary(&self) -> AnalysisSummary {
        let total_tracts = self.records.len();
        let total_count: u64 = self.records.iter().map(|r| r.tree_count).sum();
        let mean_trees_per_tract = if total_tracts == 0 {
            0.0
        } else {
            total_count as f64 / total_tracts as f64
        };

        let known: BTreeSet<&str> = self.records.iter().map(|r| r.tract_2010.as_str()).collect();
        let (matched_trees, unmatched_trees) =
            self.tree_counts
                .iter()
                .fold((0u64, 0u64), |(matched, unmatched), (tract, count)| {
                    if known.contains(tract.as_str()) {
                        (matched + count, unmatched)
                    } else {
                        (matched, unmatched + count)
                    }
                });

        AnalysisSummary {
            total_tracts,
            mean_trees_per_tract,
            matched_trees,
            unmatched_trees,
            high_priority_tracts: self.high_priority().count(),
            preview: self
                .records
                .iter()
                .take(PREVIEW_ROWS)
                .map(|r| TractPreview {
                    tract_2010: r.tract_2010.clone(),
                    tree_count: r.tree_count,
                })
                .collect(),
        }
    }
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

    fn trees(per_tract: &[(&str, usize)]) -> Vec<TreePoint> {
        per_tract
            .iter()
            .flat_map(|&(tract, n)| std::iter::repeat_with(move || tree(tract)).take(n))
            .collect()
    }

    fn tracts(suffixes: &[&str]) -> Vec<TractStatistics> {
        suffixes
            .iter()
            .map(|s| TractStatistics::new(format!("1400000US36005{s}"), BTreeMap::new()))
            .collect()
    }

    #[test]
    fn zero_fills_and_ranks() {
        let analysis = TractAnalysis::build(
            tracts(&["000100", "000200"]),
            &trees(&[("000100", 3)]),
            DEFAULT_PRIORITY_THRESHOLD,
        )
        .unwrap();

        let records = analysis.records();
        assert_eq!(records[0].tree_count, 3);
        assert_eq!(records[1].tree_count, 0);
        assert!(records[1].risk_index < records[0].risk_index);
        assert!((records[0].risk_index - 1.0).abs() < f64::EPSILON);
        assert!((records[1].risk_index - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn high_priority_is_strictly_below_threshold() {
        let suffixes: Vec<String> = (1..=8).map(|i| format!("{:06}", i * 100)).collect();
        let suffix_refs: Vec<&str> = suffixes.iter().map(String::as_str).collect();
        let per_tract: Vec<(&str, usize)> = suffix_refs
            .iter()
            .enumerate()
            .map(|(i, s)| (*s, i * 2))
            .collect();

        let analysis = TractAnalysis::build(
            tracts(&suffix_refs),
            &trees(&per_tract),
            DEFAULT_PRIORITY_THRESHOLD,
        )
        .unwrap();

        // Ranks are 1/8..8/8; only 0.125 is below 0.25.
        let priority: Vec<&TractRecord> = analysis.high_priority().collect();
        assert_eq!(priority.len(), 1);
        assert_eq!(priority[0].tract_2010, "000100");
        assert!(priority.len() * 4 <= analysis.records().len());

        for record in analysis.records() {
            let in_view = priority.iter().any(|p| p.tract_2010 == record.tract_2010);
            assert_eq!(in_view, record.risk_index < 0.25);
        }
    }

    #[test]
    fn recount_rebuilds_ranks() {
        let mut analysis = TractAnalysis::build(
            tracts(&["000100", "000200"]),
            &trees(&[("000100", 3)]),
            DEFAULT_PRIORITY_THRESHOLD,
        )
        .unwrap();

        analysis.recount(&trees(&[("000200", 5)]));

        let records = analysis.records();
        assert_eq!(records[0].tree_count, 0);
        assert_eq!(records[1].tree_count, 5);
        assert!(records[0].risk_index < records[1].risk_index);
    }

    #[test]
    fn summary_reports_matches_and_mean() {
        let analysis = TractAnalysis::build(
            tracts(&["000100", "000200", "000300"]),
            &trees(&[("000100", 4), ("000300", 2), ("999999", 5)]),
            DEFAULT_PRIORITY_THRESHOLD,
        )
        .unwrap();

        let summary = analysis.summary();
        assert_eq!(summary.total_tracts, 3);
        assert!((summary.mean_trees_per_tract - 2.0).abs() < f64::EPSILON);
        assert_eq!(summary.matched_trees, 6);
        assert_eq!(summary.unmatched_trees, 5);
        assert_eq!(summary.preview.len(), 3);
        assert_eq!(summary.preview[1].tree_count, 0);
    }

    #[test]
    fn empty_tract_table_has_zero_mean() {
        let analysis =
            TractAnalysis::build(Vec::new(), &trees(&[("000100", 2)]), 0.25).unwrap();
        let summary = analysis.summary();
        assert_eq!(summary.total_tracts, 0);
        assert!(summary.mean_trees_per_tract.abs() < f64::EPSILON);
        assert_eq!(summary.high_priority_tracts, 0);
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        for threshold in [0.0, -0.1, 1.5, f64::NAN] {
            assert!(matches!(
                TractAnalysis::build(Vec::new(), &[], threshold),
                Err(AnalyticsError::InvalidThreshold { .. })
            ));
        }
    }
}
