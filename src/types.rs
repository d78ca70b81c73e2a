use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

use crate::image::ImageU8;

/// Axis-aligned region in frame pixel coordinates.
///
/// A zero-area box (`w == 0 || h == 0`) is the "no match" sentinel returned
/// when no candidate produced a valid homography.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl BoundingBox {
    pub fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// True for the zero-area "no match" sentinel.
    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Length of the box diagonal in pixels.
    pub fn diagonal(&self) -> f64 {
        ((self.w as f64).powi(2) + (self.h as f64).powi(2)).sqrt()
    }

    /// Whether a frame-space point falls inside the box (inclusive edges).
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x as f64
            && py >= self.y as f64
            && px <= (self.x as f64 + self.w as f64)
            && py <= (self.y as f64 + self.h as f64)
    }
}

/// Candidate sub-region proposed by an external detector.
///
/// `image` is a borrowed view into the frame (usually produced by
/// [`ImageU8::crop`]); it only needs to live for one `find` invocation.
#[derive(Clone, Debug)]
pub struct CandidateRegion<'a> {
    pub bbox: BoundingBox,
    pub image: ImageU8<'a>,
}

/// Final outcome of one [`crate::TargetFinder::find`] invocation.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FindResult {
    /// True when some candidate scored above zero.
    pub found: bool,
    /// Bounding box of the winning candidate, or the zero-area sentinel.
    pub region: BoundingBox,
    /// Homography inlier count of the winning candidate.
    pub score: u32,
    /// Model-to-candidate homography of the winning candidate.
    pub homography: Option<Matrix3<f64>>,
    /// Extraction + matching time summed over all candidates. Candidates
    /// run on parallel workers, so this aggregate can exceed
    /// `total_time_ms`.
    pub match_time_ms: f64,
    /// Wall time of the whole invocation.
    pub total_time_ms: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_box_is_the_no_match_sentinel() {
        let b = BoundingBox::default();
        assert!(b.is_empty());
        assert_eq!(b.diagonal(), 0.0);
    }

    #[test]
    fn contains_checks_inclusive_edges() {
        let b = BoundingBox::new(10, 20, 30, 40);
        assert!(b.contains(10.0, 20.0));
        assert!(b.contains(40.0, 60.0));
        assert!(!b.contains(9.9, 30.0));
        assert!(!b.contains(41.0, 30.0));
    }
}
