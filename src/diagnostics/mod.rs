//! Diagnostics data model exposed by the finder.
//!
//! [`FindReport`] is the main entry point returned by
//! [`crate::TargetFinder::find`], bundling the coarse [`FindResult`] with
//! per-candidate traces, the winning candidate's match evidence, and a
//! timing breakdown.

use crate::features::Keypoint;
use crate::matcher::DescriptorMatch;
use crate::types::{BoundingBox, FindResult};
use nalgebra::Matrix3;
use serde::Serialize;

/// Terminal pipeline stage reached by one candidate.
///
/// Records the last stage that did meaningful work before the score was
/// fixed; anything short of `HomographyEstimated` means a zero score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum CandidateStage {
    /// Extraction produced too few keypoints to continue.
    Extracted,
    /// Matching produced no k-NN lists.
    Matched,
    /// Fewer than four matches survived the uniqueness test.
    UniquenessFiltered,
    /// Fewer than four matches survived the consistency vote.
    ConsistencyFiltered,
    /// The robust fit rejected every model.
    NoHomography,
    /// A homography was fitted and the candidate carries its inlier score.
    HomographyEstimated,
}

/// Per-candidate stage counters; cheap to serialize for offline debugging.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateTrace {
    pub index: usize,
    pub bbox: BoundingBox,
    pub keypoints: usize,
    pub knn_matches: usize,
    pub after_uniqueness: usize,
    pub after_consistency: usize,
    pub inliers: usize,
    pub score: u32,
    pub stage: CandidateStage,
    /// Extraction + matching wall time for this candidate.
    pub match_time_ms: f64,
}

/// Match evidence of the winning candidate, kept for visualization glue.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WinnerEvidence {
    pub index: usize,
    /// Scene keypoints of the winning candidate (candidate-local space).
    pub keypoints: Vec<Keypoint>,
    /// Raw k-NN lists, one per scene keypoint.
    pub matches: Vec<Vec<DescriptorMatch>>,
    /// Final mask after all filters and inlier classification.
    pub mask: Vec<bool>,
    pub homography: Matrix3<f64>,
}

/// Timing entry for a single pipeline stage.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTiming {
    pub label: String,
    pub elapsed_ms: f64,
}

/// Aggregated timing trace for one `find` invocation.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingBreakdown {
    pub total_ms: f64,
    pub stages: Vec<StageTiming>,
}

impl TimingBreakdown {
    pub fn push(&mut self, label: impl Into<String>, elapsed_ms: f64) {
        self.stages.push(StageTiming {
            label: label.into(),
            elapsed_ms,
        });
    }
}

/// Full report of one `find` invocation.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FindReport {
    pub result: FindResult,
    /// Present only when some candidate scored above zero.
    pub winner: Option<WinnerEvidence>,
    /// One trace per candidate, in proposal order.
    pub traces: Vec<CandidateTrace>,
    pub timing: TimingBreakdown,
}
