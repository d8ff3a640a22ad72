//! Content-addressed memoization of pipeline runs.
//!
//! The pipeline itself keeps no state between runs. Callers that re-run it
//! against the same files (e.g. a dashboard refreshing) can hold a
//! [`PipelineCache`], which hashes the three inputs and reuses a previous
//! [`PipelineOutput`] when the contents are unchanged.

use std::collections::BTreeMap;
use std::sync::Arc;

use sha2::{Digest as _, Sha256};

use crate::{InputData, PipelineError, PipelineOptions, PipelineOutput};

/// SHA-256 digests of the three input tables.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InputFingerprint {
    /// Hex digest of the cooling sites bytes.
    pub cooling: String,
    /// Hex digest of the tree census bytes.
    pub trees: String,
    /// Hex digest of the tract statistics bytes.
    pub tracts: String,
}

impl InputFingerprint {
    /// Hashes the contents of each input.
    #[must_use]
    pub fn of(data: &InputData) -> Self {
        Self {
            cooling: sha256_hex(&data.cooling),
            trees: sha256_hex(&data.trees),
            tracts: sha256_hex(&data.tracts),
        }
    }

    /// A single digest covering all three inputs, in order.
    #[must_use]
    pub fn combined(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.cooling.as_bytes());
        hasher.update(self.trees.as_bytes());
        hasher.update(self.tracts.as_bytes());
        hex::encode(hasher.finalize())
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Caller-owned cache of pipeline outputs for one set of options.
#[derive(Debug)]
pub struct PipelineCache {
    options: PipelineOptions,
    entries: BTreeMap<InputFingerprint, Arc<PipelineOutput>>,
}

impl PipelineCache {
    /// Creates an empty cache. All runs through it use `options`.
    #[must_use]
    pub const fn new(options: PipelineOptions) -> Self {
        Self {
            options,
            entries: BTreeMap::new(),
        }
    }

    /// Returns the cached output for these input contents, running the
    /// pipeline on a miss.
    ///
    /// # Errors
    ///
    /// Propagates any [`PipelineError`] from the run. Failures are not
    /// cached.
    pub fn get_or_run(&mut self, data: &InputData) -> Result<Arc<PipelineOutput>, PipelineError> {
        let fingerprint = InputFingerprint::of(data);

        if let Some(output) = self.entries.get(&fingerprint) {
            log::debug!("Pipeline cache hit ({})", fingerprint.combined());
            return Ok(Arc::clone(output));
        }

        log::debug!("Pipeline cache miss ({})", fingerprint.combined());
        let output = Arc::new(crate::run(data, &self.options)?);
        self.entries.insert(fingerprint, Arc::clone(&output));
        Ok(output)
    }

    /// Number of cached outputs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every cached output.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn fingerprint_is_content_based() {
        let a = InputFingerprint::of(&fixtures::inputs());
        let mut relabelled = fixtures::inputs();
        relabelled.labels.cooling = "elsewhere.csv".to_string();
        let b = InputFingerprint::of(&relabelled);
        assert_eq!(a, b);
        assert_eq!(a.cooling.len(), 64);

        let mut changed = fixtures::inputs();
        changed.trees.extend_from_slice(b"6,40.7,-73.9,1000100,000100\n");
        let c = InputFingerprint::of(&changed);
        assert_ne!(a, c);
        assert_eq!(a.cooling, c.cooling);
        assert_ne!(a.combined(), c.combined());
    }

    #[test]
    fn known_digest() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn reuses_output_for_identical_inputs() {
        let mut cache = PipelineCache::new(PipelineOptions::default());
        assert!(cache.is_empty());

        let first = cache.get_or_run(&fixtures::inputs()).unwrap();
        let second = cache.get_or_run(&fixtures::inputs()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);

        let mut changed = fixtures::inputs();
        changed.trees.extend_from_slice(b"6,40.7,-73.9,1000100,000200\n");
        let third = cache.get_or_run(&changed).unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(cache.len(), 2);
        assert_eq!(third.tracts()[1].tree_count, 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn failures_are_not_cached() {
        let mut cache = PipelineCache::new(PipelineOptions::default());
        let bad = InputData::from_bytes(
            b"x,y\nabc,def\n".to_vec(),
            fixtures::TREES.as_bytes().to_vec(),
            fixtures::TRACTS.as_bytes().to_vec(),
        );
        assert!(cache.get_or_run(&bad).is_err());
        assert!(cache.is_empty());
    }
}
