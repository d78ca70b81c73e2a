//! Intensity-centroid keypoint orientation.
//!
//! The dominant direction of a circular patch is the angle of the vector
//! from the patch centre to its intensity centroid. Rotating the BRIEF
//! pattern by this angle is what makes the descriptors rotation invariant.

use crate::image::ImageF32;

/// Orientation of the circular patch of `radius` centred at `(x, y)`.
///
/// Returns an angle in `(-π, π]`; a perfectly symmetric patch yields 0.
pub fn intensity_centroid_angle(img: &ImageF32, x: usize, y: usize, radius: i32) -> f32 {
    let r2 = radius * radius;
    let mut m01 = 0.0f32;
    let mut m10 = 0.0f32;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy > r2 {
                continue;
            }
            let p = img.get_clamped(x as i32 + dx, y as i32 + dy);
            m10 += dx as f32 * p;
            m01 += dy as f32 * p;
        }
    }
    // f32 summation leaves small residues on a constant patch; a near-zero
    // centroid vector carries no direction.
    if m01 * m01 + m10 * m10 < 1e-6 {
        return 0.0;
    }
    m01.atan2(m10)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symmetric_patch_has_zero_angle() {
        let mut img = ImageF32::new(16, 16);
        for v in img.data.iter_mut() {
            *v = 0.4;
        }
        let angle = intensity_centroid_angle(&img, 8, 8, 7);
        assert!(angle.abs() < 1e-3, "expected ~0 rad, got {angle}");
    }

    #[test]
    fn bright_right_half_points_along_positive_x() {
        let mut img = ImageF32::new(32, 32);
        for y in 0..32 {
            for x in 16..32 {
                img.set(x, y, 1.0);
            }
        }
        let angle = intensity_centroid_angle(&img, 16, 16, 7);
        assert!(angle.abs() < 0.2, "expected ~0 rad, got {angle}");
    }

    #[test]
    fn rotated_patch_rotates_the_angle() {
        let mut img = ImageF32::new(32, 32);
        for y in 16..32 {
            for x in 0..32 {
                img.set(x, y, 1.0);
            }
        }
        let angle = intensity_centroid_angle(&img, 16, 16, 7);
        assert!(
            (angle - std::f32::consts::FRAC_PI_2).abs() < 0.2,
            "expected ~π/2 rad, got {angle}"
        );
    }
}
