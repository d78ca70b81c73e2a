//! Seeded RANSAC homography estimation.
//!
//! Minimal 4-point samples are fitted with a normalized DLT, scored by
//! forward reprojection error against a pixel threshold, and the
//! consensus winner is refitted over all of its inliers. The RNG is seeded
//! from the parameters, so identical inputs always produce identical fits.

use log::debug;
use nalgebra::{DMatrix, Matrix3, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Minimum correspondences for a projective fit.
pub const MIN_SAMPLE: usize = 4;

/// Parameters of the consensus-sampling estimator.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RansacParams {
    /// Upper bound on sampling iterations; adaptive termination may stop
    /// earlier once the inlier ratio supports it.
    pub max_iterations: usize,
    /// Reprojection error tolerance in pixels for inlier classification.
    pub reproj_threshold: f64,
    /// RNG seed; fixed so repeated runs select the same model.
    pub seed: u64,
}

impl Default for RansacParams {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            reproj_threshold: 2.0,
            seed: 0x5EED,
        }
    }
}

/// A fitted homography with its consensus set.
#[derive(Clone, Debug)]
pub struct HomographyFit {
    /// Model-space to scene-space transform, normalized so `h[(2,2)] == 1`.
    pub homography: Matrix3<f64>,
    /// One flag per input correspondence.
    pub inliers: Vec<bool>,
    pub inlier_count: usize,
}

/// Robust projective-fit estimator mapping model points to scene points.
#[derive(Clone, Copy, Debug)]
pub struct RansacHomography {
    params: RansacParams,
}

impl RansacHomography {
    pub fn new(params: RansacParams) -> Self {
        Self { params }
    }

    /// Fit a homography from `model_pts[i] → scene_pts[i]`.
    ///
    /// Returns `None` for fewer than four correspondences or when every
    /// sampled configuration is degenerate (e.g. collinear points).
    pub fn estimate(
        &self,
        model_pts: &[[f64; 2]],
        scene_pts: &[[f64; 2]],
    ) -> Option<HomographyFit> {
        assert_eq!(
            model_pts.len(),
            scene_pts.len(),
            "correspondence arrays must align"
        );
        let n = model_pts.len();
        if n < MIN_SAMPLE {
            return None;
        }

        let mut rng = StdRng::seed_from_u64(self.params.seed);
        let threshold_sq = self.params.reproj_threshold * self.params.reproj_threshold;

        let mut best_count = 0usize;
        let mut best_inliers: Vec<bool> = Vec::new();
        let mut best_h: Option<Matrix3<f64>> = None;
        let mut max_iterations = self.params.max_iterations;

        let mut iteration = 0usize;
        while iteration < max_iterations {
            iteration += 1;
            let sample = sample_indices(&mut rng, n);
            if !sample_is_nondegenerate(model_pts, &sample)
                || !sample_is_nondegenerate(scene_pts, &sample)
            {
                continue;
            }
            let Some(h) = fit_dlt(model_pts, scene_pts, &sample) else {
                continue;
            };
            if !is_well_conditioned(&h) {
                continue;
            }

            let (count, inliers) = classify(&h, model_pts, scene_pts, threshold_sq);
            if count > best_count {
                best_count = count;
                best_inliers = inliers;
                best_h = Some(h);

                // Standard adaptive bound: stop once enough iterations have
                // run to hit an all-inlier sample with 99% confidence.
                let inlier_ratio = count as f64 / n as f64;
                let p_good = inlier_ratio.powi(MIN_SAMPLE as i32);
                if p_good > 0.0 {
                    let needed = ((1.0f64 - 0.99).ln() / (1.0 - p_good).max(1e-12).ln()).ceil();
                    if needed.is_finite() && (needed as usize) < max_iterations {
                        max_iterations = (needed as usize).max(iteration);
                    }
                }
            }
        }

        let mut h = best_h?;
        if best_count < MIN_SAMPLE {
            return None;
        }

        // Least-squares refit over the full consensus set; kept only when it
        // does not shrink the consensus.
        let consensus: Vec<usize> = best_inliers
            .iter()
            .enumerate()
            .filter_map(|(i, &ok)| ok.then_some(i))
            .collect();
        if let Some(refit) = fit_dlt(model_pts, scene_pts, &consensus) {
            if is_well_conditioned(&refit) {
                let (count, inliers) = classify(&refit, model_pts, scene_pts, threshold_sq);
                if count >= best_count {
                    best_count = count;
                    best_inliers = inliers;
                    h = refit;
                }
            }
        }

        debug!(
            "RansacHomography::estimate {} inliers of {} after {} iterations",
            best_count, n, iteration
        );
        Some(HomographyFit {
            homography: h,
            inliers: best_inliers,
            inlier_count: best_count,
        })
    }
}

/// Draw four distinct indices from `0..n`.
fn sample_indices(rng: &mut StdRng, n: usize) -> Vec<usize> {
    let mut sample = Vec::with_capacity(MIN_SAMPLE);
    while sample.len() < MIN_SAMPLE {
        let idx = rng.gen_range(0..n);
        if !sample.contains(&idx) {
            sample.push(idx);
        }
    }
    sample
}

/// A 4-point sample is unusable when any three of its points are (nearly)
/// collinear; the DLT null space then has more than one dimension and the
/// returned vector is arbitrary.
fn sample_is_nondegenerate(pts: &[[f64; 2]], sample: &[usize]) -> bool {
    for i in 0..sample.len() {
        for j in (i + 1)..sample.len() {
            for k in (j + 1)..sample.len() {
                let a = pts[sample[i]];
                let b = pts[sample[j]];
                let c = pts[sample[k]];
                let cross = (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0]);
                if cross.abs() < 1e-6 {
                    return false;
                }
            }
        }
    }
    true
}

/// Count correspondences whose reprojection error is within the threshold.
fn classify(
    h: &Matrix3<f64>,
    model_pts: &[[f64; 2]],
    scene_pts: &[[f64; 2]],
    threshold_sq: f64,
) -> (usize, Vec<bool>) {
    let mut inliers = vec![false; model_pts.len()];
    let mut count = 0usize;
    for (i, (m, s)) in model_pts.iter().zip(scene_pts).enumerate() {
        let v = h * Vector3::new(m[0], m[1], 1.0);
        if !v[2].is_finite() || v[2].abs() < 1e-12 {
            continue;
        }
        let dx = v[0] / v[2] - s[0];
        let dy = v[1] / v[2] - s[1];
        if dx * dx + dy * dy <= threshold_sq {
            inliers[i] = true;
            count += 1;
        }
    }
    (count, inliers)
}

/// Reject fits whose determinant collapsed or exploded; catches the
/// near-singular solutions produced by (almost) collinear samples.
fn is_well_conditioned(h: &Matrix3<f64>) -> bool {
    let det = h.determinant().abs();
    det.is_finite() && det > 1e-6 && det < 1e6
}

/// Direct linear transform over the given correspondence indices, with
/// Hartley normalization of both point sets.
fn fit_dlt(
    model_pts: &[[f64; 2]],
    scene_pts: &[[f64; 2]],
    indices: &[usize],
) -> Option<Matrix3<f64>> {
    let n = indices.len();
    if n < MIN_SAMPLE {
        return None;
    }

    let t_model = normalizing_transform(model_pts, indices)?;
    let t_scene = normalizing_transform(scene_pts, indices)?;

    let mut a = DMatrix::<f64>::zeros(2 * n, 9);
    for (row, &idx) in indices.iter().enumerate() {
        let m = transform_point(&t_model, model_pts[idx]);
        let s = transform_point(&t_scene, scene_pts[idx]);
        let (x1, y1) = (m[0], m[1]);
        let (x2, y2) = (s[0], s[1]);

        a[(2 * row, 0)] = -x1;
        a[(2 * row, 1)] = -y1;
        a[(2 * row, 2)] = -1.0;
        a[(2 * row, 6)] = x2 * x1;
        a[(2 * row, 7)] = x2 * y1;
        a[(2 * row, 8)] = x2;

        a[(2 * row + 1, 3)] = -x1;
        a[(2 * row + 1, 4)] = -y1;
        a[(2 * row + 1, 5)] = -1.0;
        a[(2 * row + 1, 6)] = y2 * x1;
        a[(2 * row + 1, 7)] = y2 * y1;
        a[(2 * row + 1, 8)] = y2;
    }

    // The solution of Ah = 0 is the eigenvector of A^T A for the smallest
    // eigenvalue. A thin SVD of A cannot provide it: a minimal 4-point
    // sample gives an 8x9 matrix whose thin V holds only 8 vectors.
    let ata = a.transpose() * &a;
    let eigen = ata.symmetric_eigen();
    let mut min_idx = 0;
    for i in 1..eigen.eigenvalues.len() {
        if eigen.eigenvalues[i] < eigen.eigenvalues[min_idx] {
            min_idx = i;
        }
    }
    let h_col = eigen.eigenvectors.column(min_idx);

    let mut h_norm = Matrix3::<f64>::zeros();
    for r in 0..3 {
        for c in 0..3 {
            h_norm[(r, c)] = h_col[3 * r + c];
        }
    }

    // Undo the normalization: H = T_scene^-1 * Hn * T_model.
    let h = t_scene.try_inverse()? * h_norm * t_model;
    let scale = h[(2, 2)];
    if !scale.is_finite() || scale.abs() < 1e-12 {
        return None;
    }
    Some(h / scale)
}

/// Similarity transform moving the centroid to the origin and the mean
/// distance to sqrt(2) (Hartley conditioning).
fn normalizing_transform(pts: &[[f64; 2]], indices: &[usize]) -> Option<Matrix3<f64>> {
    let n = indices.len() as f64;
    let (mut cx, mut cy) = (0.0f64, 0.0f64);
    for &idx in indices {
        cx += pts[idx][0];
        cy += pts[idx][1];
    }
    cx /= n;
    cy /= n;

    let mut mean_dist = 0.0f64;
    for &idx in indices {
        let dx = pts[idx][0] - cx;
        let dy = pts[idx][1] - cy;
        mean_dist += (dx * dx + dy * dy).sqrt();
    }
    mean_dist /= n;
    if mean_dist < 1e-12 {
        return None;
    }
    let s = std::f64::consts::SQRT_2 / mean_dist;
    Some(Matrix3::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0))
}

#[inline]
fn transform_point(t: &Matrix3<f64>, p: [f64; 2]) -> [f64; 2] {
    [
        t[(0, 0)] * p[0] + t[(0, 2)],
        t[(1, 1)] * p[1] + t[(1, 2)],
    ]
}
