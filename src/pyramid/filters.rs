//! Separable 1D filters applied before pyramid decimation.

use crate::image::ImageF32;

/// Trait implemented by separable 1D filters used for pyramid construction.
pub trait SeparableFilter {
    /// The 1D taps in left-to-right order; assumed centred on the middle tap.
    fn taps(&self) -> &[f32];
}

/// Simple wrapper around a static filter kernel.
#[derive(Clone, Copy, Debug)]
pub struct StaticSeparableFilter {
    taps: &'static [f32],
}

impl Default for StaticSeparableFilter {
    fn default() -> Self {
        GAUSSIAN_5TAP
    }
}

impl StaticSeparableFilter {
    pub const fn new(taps: &'static [f32]) -> Self {
        Self { taps }
    }
}

impl SeparableFilter for StaticSeparableFilter {
    #[inline]
    fn taps(&self) -> &[f32] {
        self.taps
    }
}

/// Normalised 5-tap Gaussian filter `[1, 4, 6, 4, 1] / 16`.
pub const GAUSSIAN_5TAP: StaticSeparableFilter =
    StaticSeparableFilter::new(&[0.0625, 0.25, 0.375, 0.25, 0.0625]);

/// Run the filter horizontally then vertically, clamping at the borders.
pub fn apply(filter: &dyn SeparableFilter, src: &ImageF32) -> ImageF32 {
    let taps = filter.taps();
    let half = (taps.len() / 2) as i32;
    let (w, h) = (src.w, src.h);

    let mut horiz = ImageF32::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0.0f32;
            for (t, &k) in taps.iter().enumerate() {
                let sx = x as i32 + t as i32 - half;
                acc += k * src.get_clamped(sx, y as i32);
            }
            horiz.set(x, y, acc);
        }
    }

    let mut out = ImageF32::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0.0f32;
            for (t, &k) in taps.iter().enumerate() {
                let sy = y as i32 + t as i32 - half;
                acc += k * horiz.get_clamped(x as i32, sy);
            }
            out.set(x, y, acc);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blur_preserves_a_constant_image() {
        let mut img = ImageF32::new(8, 8);
        for v in img.data.iter_mut() {
            *v = 0.5;
        }
        let blurred = apply(&GAUSSIAN_5TAP, &img);
        for &v in &blurred.data {
            assert!((v - 0.5).abs() < 1e-5);
        }
    }
}
