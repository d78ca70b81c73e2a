//! Exact k-NN Hamming matching against an immutable descriptor index.
//!
//! The index is built once from the reference descriptors and shared
//! read-only across every candidate query, so the per-candidate cost is a
//! parallel linear scan. With 256-bit descriptors and a few hundred
//! reference entries an exact scan beats tree structures and keeps results
//! fully deterministic.

use crate::features::Descriptor;
use rayon::prelude::*;
use serde::Serialize;

/// Correspondence between a query descriptor and a reference descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptorMatch {
    /// Index into the query keypoint set.
    pub query_idx: usize,
    /// Index into the reference (trained) keypoint set.
    pub train_idx: usize,
    /// Hamming distance in bits.
    pub distance: u32,
}

/// Read-only search structure over a reference descriptor set.
#[derive(Clone, Debug, Default)]
pub struct DescriptorIndex {
    descriptors: Vec<Descriptor>,
}

impl DescriptorIndex {
    /// Build the index; a one-time blocking operation.
    pub fn build(descriptors: &[Descriptor]) -> Self {
        Self {
            descriptors: descriptors.to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// For each query descriptor, the `k` nearest reference descriptors in
    /// ascending distance order.
    ///
    /// Returns one inner vector per query (shorter than `k` when the
    /// reference set is smaller). An empty reference or query set produces
    /// an empty match list, not an error.
    pub fn knn(&self, queries: &[Descriptor], k: usize) -> Vec<Vec<DescriptorMatch>> {
        if self.descriptors.is_empty() || queries.is_empty() || k == 0 {
            return Vec::new();
        }
        queries
            .par_iter()
            .enumerate()
            .map(|(query_idx, query)| self.nearest(query_idx, query, k))
            .collect()
    }

    fn nearest(&self, query_idx: usize, query: &Descriptor, k: usize) -> Vec<DescriptorMatch> {
        let mut best: Vec<DescriptorMatch> = Vec::with_capacity(k + 1);
        for (train_idx, trained) in self.descriptors.iter().enumerate() {
            let distance = hamming(query, trained);
            if best.len() == k && distance >= best[k - 1].distance {
                continue;
            }
            let m = DescriptorMatch {
                query_idx,
                train_idx,
                distance,
            };
            // Strictly-less insertion keeps ties resolved by train order.
            let pos = best.partition_point(|b| b.distance <= distance);
            best.insert(pos, m);
            best.truncate(k);
        }
        best
    }
}

/// Hamming distance between two 256-bit descriptors.
#[inline]
pub fn hamming(a: &Descriptor, b: &Descriptor) -> u32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x ^ y).count_ones())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desc(fill: u8) -> Descriptor {
        [fill; 32]
    }

    #[test]
    fn hamming_counts_differing_bits() {
        assert_eq!(hamming(&desc(0x00), &desc(0x00)), 0);
        assert_eq!(hamming(&desc(0x00), &desc(0xff)), 256);
        assert_eq!(hamming(&desc(0x0f), &desc(0xff)), 128);
    }

    #[test]
    fn knn_returns_ascending_distances() {
        let index = DescriptorIndex::build(&[desc(0x00), desc(0xff), desc(0x0f)]);
        let matches = index.knn(&[desc(0x00)], 2);
        assert_eq!(matches.len(), 1);
        let pair = &matches[0];
        assert_eq!(pair.len(), 2);
        assert_eq!(pair[0].train_idx, 0);
        assert_eq!(pair[0].distance, 0);
        assert_eq!(pair[1].train_idx, 2);
        assert_eq!(pair[1].distance, 128);
        assert_eq!(pair[0].query_idx, 0);
    }

    #[test]
    fn empty_sets_yield_empty_match_lists() {
        let index = DescriptorIndex::build(&[]);
        assert!(index.knn(&[desc(0)], 2).is_empty());
        let index = DescriptorIndex::build(&[desc(0)]);
        assert!(index.knn(&[], 2).is_empty());
    }

    #[test]
    fn small_reference_sets_yield_short_lists() {
        let index = DescriptorIndex::build(&[desc(0x00)]);
        let matches = index.knn(&[desc(0x01)], 2);
        assert_eq!(matches[0].len(), 1);
    }

    #[test]
    fn equal_distances_prefer_the_earlier_reference() {
        let index = DescriptorIndex::build(&[desc(0x01), desc(0x01)]);
        let matches = index.knn(&[desc(0x00)], 2);
        assert_eq!(matches[0][0].train_idx, 0);
        assert_eq!(matches[0][1].train_idx, 1);
    }
}
