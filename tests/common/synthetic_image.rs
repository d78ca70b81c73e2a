/// Deterministic pseudo-random block texture; every `cell`-sized block gets
/// one hashed intensity, which gives FAST plenty of corners and BRIEF
/// locally distinctive patches.
pub fn block_noise_u8(width: usize, height: usize, cell: usize, seed: u32) -> Vec<u8> {
    assert!(width > 0 && height > 0, "image dimensions must be positive");
    assert!(cell > 0, "cell size must be positive");

    let mut img = vec![0u8; width * height];
    for y in 0..height {
        for x in 0..width {
            let mut s = seed
                .wrapping_add((x / cell) as u32)
                .wrapping_mul(747796405)
                .wrapping_add((y / cell) as u32)
                .wrapping_mul(2891336453);
            s ^= s >> 16;
            s = s.wrapping_mul(2654435769);
            img[y * width + x] = (s >> 8) as u8;
        }
    }
    img
}

/// Smooth vertical gradient; too flat for any FAST corner to fire.
pub fn gradient_u8(width: usize, height: usize) -> Vec<u8> {
    let mut img = vec![0u8; width * height];
    for y in 0..height {
        let v = (y * 255 / height.max(1)) as u8;
        img[y * width..(y + 1) * width].fill(v);
    }
    img
}

/// Gradient frame with a block-noise target pasted at `(x, y, w, h)`.
pub fn frame_with_target(
    frame_w: usize,
    frame_h: usize,
    x: usize,
    y: usize,
    w: usize,
    h: usize,
    seed: u32,
) -> Vec<u8> {
    assert!(x + w <= frame_w && y + h <= frame_h, "target must fit");
    let mut frame = gradient_u8(frame_w, frame_h);
    let patch = block_noise_u8(w, h, 6, seed);
    for row in 0..h {
        let dst = (y + row) * frame_w + x;
        frame[dst..dst + w].copy_from_slice(&patch[row * w..(row + 1) * w]);
    }
    frame
}

/// Copy a sub-rectangle out of a tightly packed buffer.
pub fn crop_owned(
    src: &[u8],
    src_w: usize,
    x: usize,
    y: usize,
    w: usize,
    h: usize,
) -> Vec<u8> {
    let mut out = vec![0u8; w * h];
    for row in 0..h {
        let s = (y + row) * src_w + x;
        out[row * w..(row + 1) * w].copy_from_slice(&src[s..s + w]);
    }
    out
}
