//! Assembly of the final [`FindReport`] from per-candidate outcomes.

use super::pipeline::CandidateOutcome;
use crate::diagnostics::{FindReport, TimingBreakdown, WinnerEvidence};
use crate::types::{BoundingBox, FindResult};
use std::time::Duration;

/// Report for invocations that never reached candidate processing.
pub(super) fn empty_report(total: Duration) -> FindReport {
    let total_ms = total.as_secs_f64() * 1000.0;
    FindReport {
        result: FindResult {
            total_time_ms: total_ms,
            ..FindResult::default()
        },
        winner: None,
        traces: Vec::new(),
        timing: TimingBreakdown {
            total_ms,
            stages: Vec::new(),
        },
    }
}

/// Reduce the outcomes in proposal order: strict `>` on the score keeps the
/// earliest candidate on ties; a zero best score yields the sentinel region.
pub(super) fn assemble(outcomes: Vec<CandidateOutcome>, total: Duration) -> FindReport {
    let total_ms = total.as_secs_f64() * 1000.0;
    let match_time_ms: f64 = outcomes.iter().map(|o| o.trace.match_time_ms).sum();

    let mut best: Option<usize> = None;
    let mut best_score = 0u32;
    for (i, outcome) in outcomes.iter().enumerate() {
        if outcome.trace.score > best_score {
            best_score = outcome.trace.score;
            best = Some(i);
        }
    }

    let mut result = FindResult {
        found: false,
        region: BoundingBox::default(),
        score: 0,
        homography: None,
        match_time_ms,
        total_time_ms: total_ms,
    };

    let winner = best.map(|i| {
        let outcome = &outcomes[i];
        result.found = true;
        result.region = outcome.trace.bbox;
        result.score = outcome.trace.score;
        result.homography = outcome.homography;
        WinnerEvidence {
            index: i,
            keypoints: outcome.keypoints.clone(),
            matches: outcome.matches.clone(),
            mask: outcome.mask.as_slice().to_vec(),
            homography: outcome
                .homography
                .expect("winning candidate always carries a homography"),
        }
    });

    let mut timing = TimingBreakdown {
        total_ms,
        stages: Vec::new(),
    };
    // Summed over parallel workers; not a wall-clock sub-span of total_ms.
    timing.push("extract+match", match_time_ms);

    FindReport {
        result,
        winner,
        traces: outcomes.into_iter().map(|o| o.trace).collect(),
        timing,
    }
}
