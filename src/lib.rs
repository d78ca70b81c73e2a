#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod diagnostics;
pub mod finder;
pub mod homography;
pub mod image;
pub mod proposal;
pub mod types;

// “Expert” modules – still public, but considered unstable internals.
pub mod config;
pub mod features;
pub mod filtering;
pub mod matcher;
pub mod pyramid;

// --- High-level re-exports -------------------------------------------------

// Main entry points: finder + results.
pub use crate::finder::{FinderParams, TargetFinder, MIN_MATCHES};
pub use crate::types::{BoundingBox, CandidateRegion, FindResult};

// High-level diagnostics returned by the finder.
pub use crate::diagnostics::{CandidateStage, CandidateTrace, FindReport};

// Convenience homography helpers that are generally useful.
pub use crate::homography::{apply_homography_points, project_region};

// Region proposal seam for detector glue.
pub use crate::proposal::{RegionProposal, StaticProposal};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use target_finder::prelude::*;
///
/// # fn main() {
/// let model = GrayImageU8::new(64, 96, vec![0u8; 64 * 96]);
/// let mut finder = TargetFinder::new(FinderParams::default());
/// finder.set_reference(&model.as_view());
/// let report = finder.find(&[]);
/// println!(
///     "found={} total_ms={:.3}",
///     report.result.found, report.result.total_time_ms
/// );
/// # }
/// ```
pub mod prelude {
    pub use crate::image::{GrayImageU8, ImageU8};
    pub use crate::{
        BoundingBox, CandidateRegion, FindReport, FindResult, FinderParams, RegionProposal,
        StaticProposal, TargetFinder,
    };
}
