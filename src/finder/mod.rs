//! Target finder orchestrating the per-candidate verification pipeline.
//!
//! Overview
//! - Extracts reference features once per `set_reference` call and builds an
//!   immutable descriptor index reused by every candidate.
//! - For each candidate region: extract features, k-NN match against the
//!   reference index, prune with the uniqueness ratio test and the
//!   scale/orientation consistency vote, then fit a seeded RANSAC
//!   homography over the survivors.
//! - Scores each candidate by its homography inlier count and keeps the
//!   strictly best one; ties keep the earliest-proposed candidate.
//! - Candidates run in parallel; outcomes are reduced in proposal order so
//!   the result is deterministic.
//!
//! Modules
//! - [`params`] – configuration types used by the finder and the demo CLI.
//! - `pipeline` – the main [`TargetFinder`] implementation.
//! - `reporting` – assembly of [`crate::diagnostics::FindReport`].

pub mod params;
mod pipeline;
mod reporting;

pub use params::{FinderParams, MIN_MATCHES};
pub use pipeline::TargetFinder;
