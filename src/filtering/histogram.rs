//! Fixed-range histogram used to find the dominant mode of a vote.

/// Histogram over `[min, max)` with uniform bins, optionally circular.
///
/// Used by the consistency vote to locate the dominant relative scale and
/// orientation between matched keypoint pairs.
pub(crate) struct ModeHistogram {
    bins: Vec<f32>,
    min: f32,
    bin_width: f32,
    circular: bool,
}

impl ModeHistogram {
    pub(crate) fn new(min: f32, max: f32, bin_width: f32, circular: bool) -> Self {
        assert!(max > min && bin_width > 0.0, "invalid histogram range");
        let num_bins = ((max - min) / bin_width).ceil().max(1.0) as usize;
        ModeHistogram {
            bins: vec![0.0; num_bins],
            min,
            bin_width,
            circular,
        }
    }

    pub(crate) fn accumulate(&mut self, value: f32, weight: f32) {
        if !value.is_finite() {
            return;
        }
        let mut idx = ((value - self.min) / self.bin_width) as isize;
        if self.circular {
            idx = idx.rem_euclid(self.bins.len() as isize);
        } else {
            idx = idx.clamp(0, self.bins.len() as isize - 1);
        }
        self.bins[idx as usize] += weight.max(0.0);
    }

    /// Applies a [1, 2, 1]/4 smoothing kernel to reduce bin quantization
    /// noise; wraps around for circular histograms, clamps otherwise.
    pub(crate) fn smooth_121(&mut self) {
        let n = self.bins.len();
        if n <= 1 {
            return;
        }
        let mut smoothed = vec![0.0f32; n];
        for (i, dst) in smoothed.iter_mut().enumerate() {
            let prev = if self.circular {
                self.bins[(i + n - 1) % n]
            } else {
                self.bins[i.saturating_sub(1)]
            };
            let next = if self.circular {
                self.bins[(i + 1) % n]
            } else {
                self.bins[(i + 1).min(n - 1)]
            };
            *dst = (prev + 2.0 * self.bins[i] + next) * 0.25;
        }
        self.bins = smoothed;
    }

    /// Centre of the heaviest bin, or `None` when nothing was accumulated.
    pub(crate) fn mode(&self) -> Option<f32> {
        let (idx, &weight) = self
            .bins
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))?;
        if weight <= 0.0 {
            return None;
        }
        Some(self.min + (idx as f32 + 0.5) * self.bin_width)
    }
}
