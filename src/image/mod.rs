//! Grayscale image containers used throughout the pipeline.
//!
//! - [`ImageU8`] – borrowed, stride-aware 8-bit view; the only input type the
//!   finder accepts. Supports zero-copy cropping for candidate regions.
//! - [`GrayImageU8`] – owned 8-bit buffer with a borrowed-view conversion.
//! - [`ImageF32`] – owned float buffer in `[0, 1]` used by the pyramid and
//!   the feature detector.

pub mod io;

pub use io::GrayImageU8;

use crate::types::BoundingBox;

/// Borrowed 8-bit grayscale view with row stride.
#[derive(Clone, Debug)]
pub struct ImageU8<'a> {
    pub w: usize,
    pub h: usize,
    /// Bytes between consecutive rows; `>= w`.
    pub stride: usize,
    pub data: &'a [u8],
}

impl<'a> ImageU8<'a> {
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.stride + x]
    }

    #[inline]
    pub fn row(&self, y: usize) -> &'a [u8] {
        let start = y * self.stride;
        &self.data[start..start + self.w]
    }

    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Zero-copy sub-view of `bbox`, sharing the parent stride.
    ///
    /// Returns `None` when the box is empty, has a negative origin, or
    /// extends past the image bounds.
    pub fn crop(&self, bbox: BoundingBox) -> Option<ImageU8<'a>> {
        if bbox.is_empty() || bbox.x < 0 || bbox.y < 0 {
            return None;
        }
        let (x, y) = (bbox.x as usize, bbox.y as usize);
        let (w, h) = (bbox.w as usize, bbox.h as usize);
        if x + w > self.w || y + h > self.h {
            return None;
        }
        let start = y * self.stride + x;
        let end = start + (h - 1) * self.stride + w;
        Some(ImageU8 {
            w,
            h,
            stride: self.stride,
            data: &self.data[start..end],
        })
    }
}

/// Owned single-channel f32 image, row-major, `stride == w`.
#[derive(Clone, Debug)]
pub struct ImageF32 {
    pub w: usize,
    pub h: usize,
    pub data: Vec<f32>,
}

impl ImageF32 {
    /// Zero-initialized buffer of size `w × h`.
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            data: vec![0.0; w * h],
        }
    }

    /// Convert an 8-bit view into `[0, 1]` floats, dropping the stride.
    pub fn from_u8(src: &ImageU8<'_>) -> Self {
        let mut out = Self::new(src.w, src.h);
        for y in 0..src.h {
            let row = src.row(y);
            let dst = &mut out.data[y * src.w..(y + 1) * src.w];
            for (d, &s) in dst.iter_mut().zip(row) {
                *d = s as f32 / 255.0;
            }
        }
        out
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.w + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, v: f32) {
        self.data[y * self.w + x] = v;
    }

    #[inline]
    pub fn row(&self, y: usize) -> &[f32] {
        &self.data[y * self.w..(y + 1) * self.w]
    }

    /// Clamped integer sampling; out-of-range coordinates stick to the edge.
    #[inline]
    pub fn get_clamped(&self, x: i32, y: i32) -> f32 {
        let cx = x.clamp(0, self.w as i32 - 1) as usize;
        let cy = y.clamp(0, self.h as i32 - 1) as usize;
        self.get(cx, cy)
    }

    /// Bilinear sample at a fractional position, clamping at the borders.
    pub fn sample_bilinear(&self, x: f32, y: f32) -> f32 {
        let x0 = x.floor();
        let y0 = y.floor();
        let dx = x - x0;
        let dy = y - y0;
        let x0 = x0 as i32;
        let y0 = y0 as i32;
        let p00 = self.get_clamped(x0, y0);
        let p10 = self.get_clamped(x0 + 1, y0);
        let p01 = self.get_clamped(x0, y0 + 1);
        let p11 = self.get_clamped(x0 + 1, y0 + 1);
        let top = p00 * (1.0 - dx) + p10 * dx;
        let bottom = p01 * (1.0 - dx) + p11 * dx;
        top * (1.0 - dy) + bottom * dy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(w: usize, h: usize) -> Vec<u8> {
        (0..w * h).map(|i| (i % 251) as u8).collect()
    }

    #[test]
    fn crop_shares_parent_stride() {
        let data = ramp(16, 12);
        let img = ImageU8 {
            w: 16,
            h: 12,
            stride: 16,
            data: &data,
        };
        let sub = img.crop(BoundingBox::new(4, 2, 8, 6)).unwrap();
        assert_eq!(sub.w, 8);
        assert_eq!(sub.h, 6);
        assert_eq!(sub.stride, 16);
        assert_eq!(sub.get(0, 0), img.get(4, 2));
        assert_eq!(sub.get(7, 5), img.get(11, 7));
    }

    #[test]
    fn crop_rejects_out_of_bounds_boxes() {
        let data = ramp(8, 8);
        let img = ImageU8 {
            w: 8,
            h: 8,
            stride: 8,
            data: &data,
        };
        assert!(img.crop(BoundingBox::new(-1, 0, 4, 4)).is_none());
        assert!(img.crop(BoundingBox::new(6, 6, 4, 4)).is_none());
        assert!(img.crop(BoundingBox::new(0, 0, 0, 4)).is_none());
    }

    #[test]
    fn bilinear_interpolates_between_pixels() {
        let mut img = ImageF32::new(2, 1);
        img.set(0, 0, 0.0);
        img.set(1, 0, 1.0);
        let mid = img.sample_bilinear(0.5, 0.0);
        assert!((mid - 0.5).abs() < 1e-6);
    }
}
