//! Fractional-scale grayscale pyramid used by the feature extractor.
//!
//! Level 0 converts the 8-bit input to [`ImageF32`] in `[0, 1]`; every
//! further level shrinks the previous one by a fixed factor (1.2× by
//! default) with bilinear resampling. An optional separable pre-blur can be
//! applied before the first few decimation steps to suppress aliasing.
//! Construction stops early once a level would fall below the minimum side
//! length required by the detector.

pub mod filters;

use crate::image::{ImageF32, ImageU8};
use filters::{apply as apply_filter, StaticSeparableFilter, GAUSSIAN_5TAP};
use serde::{Deserialize, Serialize};

/// One pyramid level together with its scale relative to level 0.
#[derive(Clone, Debug)]
pub struct PyramidLevel {
    pub image: ImageF32,
    /// Multiply level coordinates by this factor to reach level-0 space.
    pub scale: f32,
}

#[derive(Clone, Debug)]
pub struct Pyramid {
    pub levels: Vec<PyramidLevel>,
}

/// Options controlling pyramid construction.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct PyramidOptions {
    /// Maximum number of levels (>= 1); fewer are built for small inputs.
    pub levels: usize,
    /// Shrink factor between consecutive levels (> 1).
    pub scale_factor: f32,
    /// Number of initial downscale steps that apply the separable pre-blur.
    pub blur_levels: usize,
    /// Minimum side length of the coarsest level, in pixels.
    pub min_side: usize,
    /// Filter used for the pre-blur stage.
    #[serde(skip, default = "default_filter")]
    pub filter: StaticSeparableFilter,
}

fn default_filter() -> StaticSeparableFilter {
    GAUSSIAN_5TAP
}

impl Default for PyramidOptions {
    fn default() -> Self {
        Self {
            levels: 8,
            scale_factor: 1.2,
            blur_levels: 1,
            min_side: 32,
            filter: GAUSSIAN_5TAP,
        }
    }
}

impl Pyramid {
    /// Build a pyramid from an 8-bit grayscale view.
    pub fn build(gray: &ImageU8<'_>, options: PyramidOptions) -> Self {
        assert!(options.levels >= 1, "pyramid requires at least one level");
        assert!(
            options.scale_factor > 1.0,
            "pyramid scale factor must shrink"
        );

        let mut levels = Vec::with_capacity(options.levels);
        levels.push(PyramidLevel {
            image: ImageF32::from_u8(gray),
            scale: 1.0,
        });

        for lvl in 1..options.levels {
            let prev = levels.last().expect("previous level available");
            let scale = prev.scale * options.scale_factor;
            let nw = (gray.w as f32 / scale).round() as usize;
            let nh = (gray.h as f32 / scale).round() as usize;
            if nw < options.min_side || nh < options.min_side {
                break;
            }

            let blurred;
            let src = if lvl <= options.blur_levels {
                blurred = apply_filter(&options.filter, &prev.image);
                &blurred
            } else {
                &prev.image
            };

            levels.push(PyramidLevel {
                image: resample(src, nw, nh),
                scale,
            });
        }

        Self { levels }
    }
}

/// Bilinear resample onto a `nw × nh` grid.
fn resample(src: &ImageF32, nw: usize, nh: usize) -> ImageF32 {
    let mut out = ImageF32::new(nw, nh);
    let sx = src.w as f32 / nw as f32;
    let sy = src.h as f32 / nh as f32;
    for y in 0..nh {
        let fy = (y as f32 + 0.5) * sy - 0.5;
        for x in 0..nw {
            let fx = (x as f32 + 0.5) * sx - 0.5;
            out.set(x, y, src.sample_bilinear(fx, fy));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_view(data: &[u8], w: usize, h: usize) -> ImageU8<'_> {
        ImageU8 {
            w,
            h,
            stride: w,
            data,
        }
    }

    #[test]
    fn levels_shrink_by_the_scale_factor() {
        let data = vec![128u8; 120 * 90];
        let img = flat_view(&data, 120, 90);
        let pyr = Pyramid::build(
            &img,
            PyramidOptions {
                levels: 4,
                scale_factor: 1.5,
                ..Default::default()
            },
        );
        assert!(pyr.levels.len() >= 2);
        assert_eq!(pyr.levels[0].image.w, 120);
        assert_eq!(pyr.levels[1].image.w, 80);
        assert!((pyr.levels[1].scale - 1.5).abs() < 1e-6);
    }

    #[test]
    fn small_images_stop_at_the_minimum_side() {
        let data = vec![0u8; 40 * 40];
        let img = flat_view(&data, 40, 40);
        let pyr = Pyramid::build(&img, PyramidOptions::default());
        for level in &pyr.levels {
            assert!(level.image.w >= 32 && level.image.h >= 32);
        }
        assert!(pyr.levels.len() < 8);
    }
}
