//! Match-pruning stages between the k-NN matcher and the homography fit.
//!
//! Both stages narrow a shared [`MatchMask`]: entries start true and can only
//! turn false, so the surviving set after the consistency vote is always a
//! subset of the set after the uniqueness test.

mod histogram;

use crate::features::Keypoint;
use crate::matcher::DescriptorMatch;
use histogram::ModeHistogram;
use log::debug;

/// One flag per query keypoint; true while its best match is still alive.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MatchMask(Vec<bool>);

impl MatchMask {
    /// All-true mask for `len` query keypoints.
    pub fn new(len: usize) -> Self {
        Self(vec![true; len])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn get(&self, idx: usize) -> bool {
        self.0[idx]
    }

    /// Masks can only narrow; there is deliberately no way to set an entry
    /// back to true.
    #[inline]
    pub fn reject(&mut self, idx: usize) {
        self.0[idx] = false;
    }

    pub fn surviving(&self) -> usize {
        self.0.iter().filter(|&&alive| alive).count()
    }

    /// Indices of surviving query keypoints, ascending.
    pub fn surviving_indices(&self) -> Vec<usize> {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(i, &alive)| alive.then_some(i))
            .collect()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }
}

/// Uniqueness ratio test (Lowe-style) over k-NN match lists.
///
/// A query keypoint survives only when its best distance is strictly below
/// `ratio` times its second-best distance; queries with fewer than two
/// candidate matches cannot establish uniqueness and are rejected. Returns
/// the surviving count.
pub fn vote_for_uniqueness(
    matches: &[Vec<DescriptorMatch>],
    ratio: f32,
    mask: &mut MatchMask,
) -> usize {
    debug_assert_eq!(matches.len(), mask.len());
    for (i, knn) in matches.iter().enumerate() {
        if !mask.get(i) {
            continue;
        }
        if knn.len() < 2 {
            mask.reject(i);
            continue;
        }
        let best = knn[0].distance as f32;
        let second = knn[1].distance as f32;
        if best >= ratio * second {
            mask.reject(i);
        }
    }
    let surviving = mask.surviving();
    debug!("vote_for_uniqueness kept {surviving}/{} matches", mask.len());
    surviving
}

/// Scale/orientation consistency vote over the surviving best matches.
///
/// A true planar-object match implies one global scale and rotation between
/// reference and scene, so the dominant mode of the relative log-scale and
/// relative orientation distributions is found first, and every match
/// deviating from it by more than `scale_tolerance`× or
/// `angle_tolerance_deg` degrees is rejected. Returns the surviving count.
pub fn vote_for_scale_and_orientation(
    reference: &[Keypoint],
    query: &[Keypoint],
    matches: &[Vec<DescriptorMatch>],
    mask: &mut MatchMask,
    scale_tolerance: f32,
    angle_tolerance_deg: f32,
) -> usize {
    debug_assert_eq!(matches.len(), mask.len());
    debug_assert_eq!(query.len(), mask.len());

    let pi = std::f32::consts::PI;
    // Tolerances come straight from user config; degenerate values are
    // clamped to the smallest usable window instead of panicking mid-find.
    let log_tol = scale_tolerance.max(1.001).log2();
    let angle_tol = angle_tolerance_deg.max(0.1).to_radians();

    // Log-scale range covers any ratio the pyramid can produce.
    let mut scale_hist = ModeHistogram::new(-6.0, 6.0, log_tol, false);
    let mut angle_hist = ModeHistogram::new(-pi, pi, angle_tol, true);

    let pairs: Vec<(usize, f32, f32)> = matches
        .iter()
        .enumerate()
        .filter(|(i, knn)| mask.get(*i) && !knn.is_empty())
        .map(|(i, knn)| {
            let best = knn[0];
            let r = &reference[best.train_idx];
            let q = &query[i];
            let log_scale = (q.scale / r.scale).log2();
            let d_angle = wrap_angle(q.angle - r.angle);
            (i, log_scale, d_angle)
        })
        .collect();

    for &(_, log_scale, d_angle) in &pairs {
        scale_hist.accumulate(log_scale, 1.0);
        angle_hist.accumulate(d_angle, 1.0);
    }
    scale_hist.smooth_121();
    angle_hist.smooth_121();

    match (scale_hist.mode(), angle_hist.mode()) {
        (Some(scale_mode), Some(angle_mode)) => {
            for (i, log_scale, d_angle) in pairs {
                let scale_ok = (log_scale - scale_mode).abs() <= log_tol;
                let angle_ok = wrap_angle(d_angle - angle_mode).abs() <= angle_tol;
                if !(scale_ok && angle_ok) {
                    mask.reject(i);
                }
            }
        }
        _ => {
            // No votes at all: reject everything still alive.
            for i in 0..mask.len() {
                if mask.get(i) {
                    mask.reject(i);
                }
            }
        }
    }

    let surviving = mask.surviving();
    debug!(
        "vote_for_scale_and_orientation kept {surviving}/{} matches",
        mask.len()
    );
    surviving
}

/// Normalize an angle difference into `(-π, π]`.
#[inline]
fn wrap_angle(a: f32) -> f32 {
    let pi = std::f32::consts::PI;
    let mut a = a % (2.0 * pi);
    if a <= -pi {
        a += 2.0 * pi;
    } else if a > pi {
        a -= 2.0 * pi;
    }
    a
}
