//! Projective transforms: application helpers and robust estimation.

pub mod ransac;

pub use ransac::{HomographyFit, RansacHomography, RansacParams};

use nalgebra::{Matrix3, Vector3};

const EPS: f64 = 1e-12;

/// Map points through a homography, returning `None` on a degenerate
/// projection (point at infinity or non-finite output).
pub fn apply_homography_points(h: &Matrix3<f64>, pts: &[[f64; 2]]) -> Option<Vec<[f64; 2]>> {
    let mut out = Vec::with_capacity(pts.len());
    for &p in pts {
        let v = h * Vector3::new(p[0], p[1], 1.0);
        let w = v[2];
        if !w.is_finite() || w.abs() <= EPS || !v[0].is_finite() || !v[1].is_finite() {
            return None;
        }
        out.push([v[0] / w, v[1] / w]);
    }
    Some(out)
}

/// Project the four corners of a `w × h` model rectangle into scene space.
///
/// Corner order: top-left, top-right, bottom-right, bottom-left. Used by
/// visualization glue to draw the located object outline and by tests to
/// check that the reprojected model lands inside the winning region.
pub fn project_region(h: &Matrix3<f64>, w: u32, height: u32) -> Option<[[f64; 2]; 4]> {
    let (fw, fh) = (w as f64, height as f64);
    let corners = [[0.0, 0.0], [fw, 0.0], [fw, fh], [0.0, fh]];
    let projected = apply_homography_points(h, &corners)?;
    Some([projected[0], projected[1], projected[2], projected[3]])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_maps_points_onto_themselves() {
        let pts = [[1.0, 2.0], [-3.5, 4.0]];
        let out = apply_homography_points(&Matrix3::identity(), &pts).unwrap();
        assert_eq!(out, pts.to_vec());
    }

    #[test]
    fn translation_shifts_the_region_corners() {
        let mut h = Matrix3::identity();
        h[(0, 2)] = 10.0;
        h[(1, 2)] = -5.0;
        let corners = project_region(&h, 20, 30).unwrap();
        assert_eq!(corners[0], [10.0, -5.0]);
        assert_eq!(corners[2], [30.0, 25.0]);
    }

    #[test]
    fn degenerate_projection_is_rejected() {
        // Maps every finite point to the plane at infinity.
        let h = Matrix3::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0);
        assert!(apply_homography_points(&h, &[[1.0, 1.0]]).is_none());
    }
}
