//! FAST-9 corner detection with a cardinal-point pre-check and grid NMS.

use crate::image::ImageF32;
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Bresenham circle of radius 3 used by the segment test, clockwise from
/// twelve o'clock.
const RING: [(i32, i32); 16] = [
    (0, -3),
    (1, -3),
    (2, -2),
    (3, -1),
    (3, 0),
    (3, 1),
    (2, 2),
    (1, 3),
    (0, 3),
    (-1, 3),
    (-2, 2),
    (-3, 1),
    (-3, 0),
    (-3, -1),
    (-2, -2),
    (-1, -3),
];

/// Contiguous ring pixels required for a positive segment test.
const ARC_LEN: usize = 9;

/// Raw corner in level coordinates, before orientation assignment.
#[derive(Clone, Copy, Debug)]
pub struct Corner {
    pub x: usize,
    pub y: usize,
    pub response: f32,
}

/// Detect FAST-9 corners above `threshold` (intensity units in `[0, 1]`).
///
/// Rows are scanned in parallel; the result is deduplicated with a
/// grid-based non-maximum suppression of cell size `nms_radius` and capped
/// at `max_corners`, strongest first.
pub fn detect(img: &ImageF32, threshold: f32, nms_radius: f32, max_corners: usize) -> Vec<Corner> {
    if img.w < 7 || img.h < 7 {
        return Vec::new();
    }

    let corners: Vec<Corner> = (3..img.h - 3)
        .into_par_iter()
        .flat_map_iter(|y| {
            let row = img.row(y);
            (3..img.w - 3).filter_map(move |x| {
                let center = row[x];
                if !pre_check(img, x, y, center, threshold) {
                    return None;
                }
                segment_test(img, x, y, center, threshold).map(|response| Corner { x, y, response })
            })
        })
        .collect();

    suppress_grid(corners, nms_radius, max_corners)
}

/// Quick rejection on the 4 cardinal ring pixels. A contiguous arc of 9
/// covers at least 2 cardinals, so fewer than 2 deviating pixels cannot
/// produce a corner.
#[inline]
fn pre_check(img: &ImageF32, x: usize, y: usize, center: f32, threshold: f32) -> bool {
    let cardinals = [
        img.get(x, y - 3),
        img.get(x + 3, y),
        img.get(x, y + 3),
        img.get(x - 3, y),
    ];
    let bright = cardinals.iter().filter(|&&p| p > center + threshold).count();
    let dark = cardinals.iter().filter(|&&p| p < center - threshold).count();
    bright >= 2 || dark >= 2
}

/// Full 16-pixel segment test; returns the corner response on success.
fn segment_test(img: &ImageF32, x: usize, y: usize, center: f32, threshold: f32) -> Option<f32> {
    let mut bright = [false; 16];
    let mut dark = [false; 16];
    let mut response = 0.0f32;
    for (i, &(dx, dy)) in RING.iter().enumerate() {
        let p = img.get((x as i32 + dx) as usize, (y as i32 + dy) as usize);
        let diff = p - center;
        if diff > threshold {
            bright[i] = true;
            response += diff - threshold;
        } else if diff < -threshold {
            dark[i] = true;
            response += -diff - threshold;
        }
    }
    if has_arc(&bright) || has_arc(&dark) {
        Some(response)
    } else {
        None
    }
}

/// Whether the flag ring contains `ARC_LEN` contiguous set entries (wrapping).
fn has_arc(flags: &[bool; 16]) -> bool {
    let mut run = 0usize;
    for i in 0..16 + ARC_LEN {
        if flags[i % 16] {
            run += 1;
            if run >= ARC_LEN {
                return true;
            }
        } else {
            run = 0;
        }
    }
    false
}

/// Grid-based non-maximum suppression: strongest corner claims its cell and
/// the 3×3 neighbourhood around it.
fn suppress_grid(mut corners: Vec<Corner>, radius: f32, max_corners: usize) -> Vec<Corner> {
    if corners.is_empty() {
        return corners;
    }
    corners.sort_by(|a, b| {
        b.response
            .partial_cmp(&a.response)
            .unwrap_or(Ordering::Equal)
    });

    let mut occupied: HashSet<(i32, i32)> = HashSet::new();
    let mut selected = Vec::new();
    for corner in corners {
        let gx = (corner.x as f32 / radius) as i32;
        let gy = (corner.y as f32 / radius) as i32;
        let clear = (-1..=1)
            .flat_map(|dy| (-1..=1).map(move |dx| (gx + dx, gy + dy)))
            .all(|cell| !occupied.contains(&cell));
        if clear {
            occupied.insert((gx, gy));
            selected.push(corner);
            if selected.len() >= max_corners {
                break;
            }
        }
    }
    selected
}
