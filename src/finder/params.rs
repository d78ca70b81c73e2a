//! Parameter types configuring the finder stages.
//!
//! Defaults mirror the classic uniqueness/consistency thresholds for
//! feature-based object location; start tuning with the FAST threshold and
//! the RANSAC reprojection tolerance.

use crate::features::ExtractorParams;
use crate::homography::RansacParams;
use serde::{Deserialize, Serialize};

/// Correspondences required before a homography is attempted; also the
/// minimal sample size of the projective fit.
pub const MIN_MATCHES: usize = 4;

/// Finder-wide parameters controlling the per-candidate pipeline.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinderParams {
    /// Nearest neighbours retrieved per query descriptor; the uniqueness
    /// ratio test needs at least 2.
    pub knn: usize,
    /// Best-to-second-best distance ratio below which a match is unique.
    pub uniqueness_threshold: f32,
    /// Maximum relative scale deviation from the dominant mode (factor).
    pub scale_tolerance: f32,
    /// Maximum relative orientation deviation from the dominant mode.
    pub orientation_tolerance_deg: f32,
    /// Feature extraction configuration shared by reference and candidates.
    pub extractor: ExtractorParams,
    /// Robust homography estimation configuration.
    pub ransac: RansacParams,
}

impl Default for FinderParams {
    fn default() -> Self {
        Self {
            knn: 2,
            uniqueness_threshold: 0.80,
            scale_tolerance: 1.5,
            orientation_tolerance_deg: 20.0,
            extractor: ExtractorParams::default(),
            ransac: RansacParams::default(),
        }
    }
}
