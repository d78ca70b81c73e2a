//! Scale/rotation-invariant keypoint extraction.
//!
//! The extractor runs FAST-9 on every pyramid level, assigns each corner an
//! intensity-centroid orientation, and computes a rotated BRIEF descriptor in
//! the level it was detected in. Keypoint positions are reported in level-0
//! coordinates with the level scale attached, so matched pairs can vote on
//! relative scale and orientation later in the pipeline.
//!
//! An empty [`FeatureSet`] is a valid outcome (flat or tiny input), never an
//! error.

pub mod brief;
pub mod fast;
pub mod orientation;

use crate::image::ImageU8;
use crate::pyramid::{Pyramid, PyramidOptions};
use log::debug;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Distinctive image location with scale and orientation metadata.
#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Keypoint {
    /// Position in level-0 (input image) coordinates.
    pub x: f32,
    pub y: f32,
    /// Scale of the pyramid level the keypoint was detected in (>= 1).
    pub scale: f32,
    /// Patch orientation in radians.
    pub angle: f32,
    /// FAST corner response; used only to rank keypoints.
    pub response: f32,
    /// Pyramid level index.
    pub octave: u8,
}

/// 256-bit binary descriptor.
pub type Descriptor = [u8; 32];

/// Keypoints with index-aligned descriptors (`descriptors[i]` belongs to
/// `keypoints[i]`).
#[derive(Clone, Debug, Default)]
pub struct FeatureSet {
    pub keypoints: Vec<Keypoint>,
    pub descriptors: Vec<Descriptor>,
}

impl FeatureSet {
    pub fn len(&self) -> usize {
        self.keypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }
}

/// Parameters for the pyramid FAST + rotated BRIEF extractor.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ExtractorParams {
    /// FAST intensity threshold in 8-bit units.
    pub fast_threshold: u8,
    /// Upper bound on keypoints kept per image, strongest first.
    pub max_keypoints: usize,
    /// Non-maximum suppression cell size in pixels.
    pub nms_radius: f32,
    /// Radius of the orientation patch in pixels.
    pub orientation_radius: i32,
    /// Pyramid construction options (levels, scale factor, pre-blur).
    pub pyramid: PyramidOptions,
}

impl Default for ExtractorParams {
    fn default() -> Self {
        Self {
            fast_threshold: 20,
            max_keypoints: 500,
            nms_radius: 5.0,
            orientation_radius: 7,
            pyramid: PyramidOptions::default(),
        }
    }
}

/// Stateless feature extractor; `extract` has no side effects beyond
/// allocating its output.
#[derive(Clone, Debug)]
pub struct FeatureExtractor {
    params: ExtractorParams,
}

impl FeatureExtractor {
    pub fn new(params: ExtractorParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ExtractorParams {
        &self.params
    }

    /// Extract keypoints and descriptors from a grayscale view.
    pub fn extract(&self, image: &ImageU8<'_>) -> FeatureSet {
        if image.is_empty() {
            return FeatureSet::default();
        }
        if image.w < self.params.pyramid.min_side || image.h < self.params.pyramid.min_side {
            debug!(
                "FeatureExtractor::extract input {}x{} below minimum patch size",
                image.w, image.h
            );
            return FeatureSet::default();
        }

        let threshold = self.params.fast_threshold as f32 / 255.0;
        let pyramid = Pyramid::build(image, self.params.pyramid);

        let mut entries: Vec<(Keypoint, Descriptor)> = Vec::new();
        for (octave, level) in pyramid.levels.iter().enumerate() {
            let corners = fast::detect(
                &level.image,
                threshold,
                self.params.nms_radius,
                self.params.max_keypoints,
            );
            for corner in corners {
                let angle = orientation::intensity_centroid_angle(
                    &level.image,
                    corner.x,
                    corner.y,
                    self.params.orientation_radius,
                );
                let descriptor =
                    brief::describe(&level.image, corner.x as f32, corner.y as f32, angle);
                entries.push((
                    Keypoint {
                        x: corner.x as f32 * level.scale,
                        y: corner.y as f32 * level.scale,
                        scale: level.scale,
                        angle,
                        response: corner.response,
                        octave: octave as u8,
                    },
                    descriptor,
                ));
            }
        }

        // Strongest keypoints across all levels, descriptors kept aligned.
        entries.sort_by(|a, b| {
            b.0.response
                .partial_cmp(&a.0.response)
                .unwrap_or(Ordering::Equal)
        });
        entries.truncate(self.params.max_keypoints);

        let mut set = FeatureSet {
            keypoints: Vec::with_capacity(entries.len()),
            descriptors: Vec::with_capacity(entries.len()),
        };
        for (kp, desc) in entries {
            set.keypoints.push(kp);
            set.descriptors.push(desc);
        }
        debug!(
            "FeatureExtractor::extract {} keypoints over {} levels",
            set.len(),
            pyramid.levels.len()
        );
        set
    }
}
