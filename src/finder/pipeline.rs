//! Finder pipeline running the full verification chain per candidate.
//!
//! Typical usage:
//! ```no_run
//! use target_finder::{FinderParams, TargetFinder};
//! use target_finder::types::CandidateRegion;
//! # fn example(model: target_finder::image::ImageU8, candidates: Vec<CandidateRegion>) {
//! let mut finder = TargetFinder::new(FinderParams::default());
//! finder.set_reference(&model);
//! let report = finder.find(&candidates);
//! if report.result.found {
//!     println!("score: {}", report.result.score);
//! }
//! # }
//! ```

use super::params::{FinderParams, MIN_MATCHES};
use super::reporting;
use crate::diagnostics::{CandidateStage, CandidateTrace, FindReport};
use crate::features::{FeatureExtractor, FeatureSet, Keypoint};
use crate::filtering::{vote_for_scale_and_orientation, vote_for_uniqueness, MatchMask};
use crate::homography::RansacHomography;
use crate::image::ImageU8;
use crate::matcher::{DescriptorIndex, DescriptorMatch};
use crate::types::CandidateRegion;
use log::debug;
use nalgebra::Matrix3;
use rayon::prelude::*;
use std::time::Instant;

/// Reference extraction shared read-only across candidates.
struct ReferenceModel {
    features: FeatureSet,
    index: DescriptorIndex,
}

/// Everything one candidate produced; consumed by the report assembly.
pub(super) struct CandidateOutcome {
    pub trace: CandidateTrace,
    pub keypoints: Vec<Keypoint>,
    pub matches: Vec<Vec<DescriptorMatch>>,
    pub mask: MatchMask,
    pub homography: Option<Matrix3<f64>>,
}

/// Stateless verification service: the reference image is threaded in
/// explicitly and all per-candidate state lives on the stack.
pub struct TargetFinder {
    params: FinderParams,
    extractor: FeatureExtractor,
    estimator: RansacHomography,
    reference: Option<ReferenceModel>,
}

impl TargetFinder {
    /// Create a finder with the supplied parameters and no reference yet.
    pub fn new(params: FinderParams) -> Self {
        Self {
            extractor: FeatureExtractor::new(params.extractor),
            estimator: RansacHomography::new(params.ransac),
            params,
            reference: None,
        }
    }

    pub fn params(&self) -> &FinderParams {
        &self.params
    }

    /// Extract reference features and build the descriptor index.
    ///
    /// A one-time blocking operation; the resulting index is immutable and
    /// reused by every subsequent `find`. A textureless reference is not an
    /// error — it simply makes every later `find` report "no match".
    pub fn set_reference(&mut self, image: &ImageU8<'_>) {
        let features = self.extractor.extract(image);
        let index = DescriptorIndex::build(&features.descriptors);
        debug!(
            "TargetFinder::set_reference {} keypoints indexed",
            features.len()
        );
        self.reference = Some(ReferenceModel { features, index });
    }

    /// Keypoints of the current reference, for visualization glue.
    pub fn reference_keypoints(&self) -> &[Keypoint] {
        self.reference
            .as_ref()
            .map(|r| r.features.keypoints.as_slice())
            .unwrap_or(&[])
    }

    /// Verify every candidate against the reference and pick the best.
    ///
    /// Candidates are processed in parallel; the selection pass runs over
    /// the collected outcomes in proposal order, keeping the first
    /// strictly-highest score. Without candidates, or without a usable
    /// reference, the report carries the zero-area sentinel region.
    pub fn find(&self, candidates: &[CandidateRegion<'_>]) -> FindReport {
        let total_start = Instant::now();

        let reference = match &self.reference {
            Some(r) if !r.features.is_empty() => r,
            _ => {
                debug!("TargetFinder::find no usable reference -> no match");
                return reporting::empty_report(total_start.elapsed());
            }
        };
        if candidates.is_empty() {
            debug!("TargetFinder::find no candidates proposed -> no match");
            return reporting::empty_report(total_start.elapsed());
        }

        let outcomes: Vec<CandidateOutcome> = candidates
            .par_iter()
            .enumerate()
            .map(|(index, candidate)| self.match_candidate(reference, index, candidate))
            .collect();

        reporting::assemble(outcomes, total_start.elapsed())
    }

    /// Run the per-candidate state machine:
    /// Extracted → Matched → UniquenessFiltered → ConsistencyFiltered →
    /// {HomographyEstimated | NoHomography}.
    ///
    /// Any failure short-circuits to a zero score; there are no retries.
    fn match_candidate(
        &self,
        reference: &ReferenceModel,
        index: usize,
        candidate: &CandidateRegion<'_>,
    ) -> CandidateOutcome {
        let match_start = Instant::now();
        let scene = self.extractor.extract(&candidate.image);
        let knn = reference.index.knn(&scene.descriptors, self.params.knn);
        // Extraction + matching only; filtering and estimation are not
        // part of this observable.
        let match_time_ms = match_start.elapsed().as_secs_f64() * 1000.0;

        let mut outcome = CandidateOutcome {
            trace: CandidateTrace {
                index,
                bbox: candidate.bbox,
                keypoints: scene.len(),
                knn_matches: knn.len(),
                after_uniqueness: 0,
                after_consistency: 0,
                inliers: 0,
                score: 0,
                stage: CandidateStage::Extracted,
                match_time_ms,
            },
            keypoints: scene.keypoints,
            matches: knn,
            mask: MatchMask::default(),
            homography: None,
        };

        if outcome.keypoints.is_empty() {
            return outcome;
        }
        if outcome.matches.is_empty() {
            outcome.trace.stage = CandidateStage::Matched;
            return outcome;
        }

        let mut mask = MatchMask::new(outcome.matches.len());
        let after_uniqueness = vote_for_uniqueness(
            &outcome.matches,
            self.params.uniqueness_threshold,
            &mut mask,
        );
        outcome.trace.after_uniqueness = after_uniqueness;
        if after_uniqueness < MIN_MATCHES {
            outcome.trace.stage = CandidateStage::UniquenessFiltered;
            outcome.mask = mask;
            return outcome;
        }

        let after_consistency = vote_for_scale_and_orientation(
            &reference.features.keypoints,
            &outcome.keypoints,
            &outcome.matches,
            &mut mask,
            self.params.scale_tolerance,
            self.params.orientation_tolerance_deg,
        );
        outcome.trace.after_consistency = after_consistency;
        if after_consistency < MIN_MATCHES {
            outcome.trace.stage = CandidateStage::ConsistencyFiltered;
            outcome.mask = mask;
            return outcome;
        }

        // Gather surviving correspondences: model space -> candidate space.
        let query_indices = mask.surviving_indices();
        let mut model_pts = Vec::with_capacity(query_indices.len());
        let mut scene_pts = Vec::with_capacity(query_indices.len());
        for &q in &query_indices {
            let best = outcome.matches[q][0];
            let r = &reference.features.keypoints[best.train_idx];
            let s = &outcome.keypoints[q];
            model_pts.push([r.x as f64, r.y as f64]);
            scene_pts.push([s.x as f64, s.y as f64]);
        }

        match self.estimator.estimate(&model_pts, &scene_pts) {
            Some(fit) => {
                // Narrow the mask once more so it reflects the consensus set.
                for (j, &q) in query_indices.iter().enumerate() {
                    if !fit.inliers[j] {
                        mask.reject(q);
                    }
                }
                outcome.trace.inliers = fit.inlier_count;
                outcome.trace.score = fit.inlier_count as u32;
                outcome.trace.stage = CandidateStage::HomographyEstimated;
                outcome.homography = Some(fit.homography);
            }
            None => {
                outcome.trace.stage = CandidateStage::NoHomography;
            }
        }
        outcome.mask = mask;
        outcome
    }
}
