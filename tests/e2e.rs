mod common;

use common::synthetic_image::{block_noise_u8, crop_owned, frame_with_target};
use target_finder::image::GrayImageU8;
use target_finder::types::CandidateRegion;
use target_finder::{project_region, BoundingBox, CandidateStage, FinderParams, TargetFinder};

const FRAME_W: usize = 320;
const FRAME_H: usize = 240;
const TARGET: BoundingBox = BoundingBox {
    x: 40,
    y: 30,
    w: 64,
    h: 96,
};
const BACKGROUND: BoundingBox = BoundingBox {
    x: 200,
    y: 100,
    w: 64,
    h: 96,
};

fn scene_frame() -> GrayImageU8 {
    let data = frame_with_target(
        FRAME_W,
        FRAME_H,
        TARGET.x as usize,
        TARGET.y as usize,
        TARGET.w as usize,
        TARGET.h as usize,
        42,
    );
    GrayImageU8::new(FRAME_W, FRAME_H, data)
}

fn model_image(frame: &GrayImageU8) -> GrayImageU8 {
    let view = frame.as_view();
    let data = crop_owned(
        view.data,
        FRAME_W,
        TARGET.x as usize,
        TARGET.y as usize,
        TARGET.w as usize,
        TARGET.h as usize,
    );
    GrayImageU8::new(TARGET.w as usize, TARGET.h as usize, data)
}

fn candidate<'a>(frame: &'a GrayImageU8, bbox: BoundingBox) -> CandidateRegion<'a> {
    CandidateRegion {
        bbox,
        image: frame.as_view().crop(bbox).expect("candidate box fits"),
    }
}

#[test]
fn locates_the_textured_target_among_candidates() {
    let _ = env_logger::builder().is_test(true).try_init();
    let frame = scene_frame();
    let model = model_image(&frame);

    let mut finder = TargetFinder::new(FinderParams::default());
    finder.set_reference(&model.as_view());

    let candidates = vec![candidate(&frame, TARGET), candidate(&frame, BACKGROUND)];
    let report = finder.find(&candidates);

    assert!(report.result.found, "expected the target crop to match");
    assert_eq!(report.result.region, TARGET);
    assert!(
        report.result.score >= 4,
        "score below the minimal consensus: {}",
        report.result.score
    );
    assert_eq!(report.traces.len(), 2);
    assert_eq!(
        report.traces[1].score, 0,
        "the background crop must not match"
    );

    // Reproject the model rectangle and check it lands inside the winning
    // box, with 5% of the diagonal as slack.
    let homography = report.result.homography.expect("winner has a homography");
    let corners = project_region(&homography, TARGET.w, TARGET.h).expect("projection is finite");
    let slack = TARGET.diagonal() * 0.05;
    let expanded = BoundingBox {
        x: TARGET.x - slack as i32,
        y: TARGET.y - slack as i32,
        w: TARGET.w + 2 * slack as u32,
        h: TARGET.h + 2 * slack as u32,
    };
    for corner in corners {
        let fx = corner[0] + TARGET.x as f64;
        let fy = corner[1] + TARGET.y as f64;
        assert!(
            expanded.contains(fx, fy),
            "projected corner ({fx:.1}, {fy:.1}) escaped the winning region"
        );
    }

    let winner = report.winner.expect("winner evidence present");
    assert_eq!(winner.index, 0);
    assert_eq!(winner.mask.len(), winner.keypoints.len());

    // match_time_ms aggregates the per-candidate extraction + matching
    // spans; it is not bounded by the wall-clock total.
    let aggregate: f64 = report.traces.iter().map(|t| t.match_time_ms).sum();
    assert!((report.result.match_time_ms - aggregate).abs() < 1e-9);
    assert_eq!(report.timing.stages.len(), 1);
    assert_eq!(report.timing.stages[0].label, "extract+match");
}

#[test]
fn repeated_runs_are_deterministic() {
    let frame = scene_frame();
    let model = model_image(&frame);

    let mut finder = TargetFinder::new(FinderParams::default());
    finder.set_reference(&model.as_view());
    let candidates = vec![candidate(&frame, TARGET), candidate(&frame, BACKGROUND)];

    let first = finder.find(&candidates);
    let second = finder.find(&candidates);
    assert_eq!(first.result.region, second.result.region);
    assert_eq!(first.result.score, second.result.score);
    assert_eq!(first.result.found, second.result.found);
}

#[test]
fn tie_break_prefers_the_earliest_candidate() {
    let frame = scene_frame();
    let model = model_image(&frame);

    let mut finder = TargetFinder::new(FinderParams::default());
    finder.set_reference(&model.as_view());

    // Identical pixel content declared at two different frame positions:
    // both candidates score the same, the first must win.
    let decoy = BoundingBox {
        x: 150,
        y: 40,
        ..TARGET
    };
    let first = CandidateRegion {
        bbox: TARGET,
        image: frame.as_view().crop(TARGET).unwrap(),
    };
    let second = CandidateRegion {
        bbox: decoy,
        image: frame.as_view().crop(TARGET).unwrap(),
    };
    let report = finder.find(&[first, second]);

    assert!(report.result.found);
    assert_eq!(report.traces[0].score, report.traces[1].score);
    assert_eq!(report.result.region, TARGET);
    assert_eq!(report.winner.unwrap().index, 0);
}

#[test]
fn textureless_inputs_yield_no_match() {
    let model = GrayImageU8::new(64, 96, vec![0u8; 64 * 96]);
    let frame = GrayImageU8::new(FRAME_W, FRAME_H, vec![0u8; FRAME_W * FRAME_H]);

    let mut finder = TargetFinder::new(FinderParams::default());
    finder.set_reference(&model.as_view());

    let bbox = BoundingBox::new(10, 10, 64, 96);
    let report = finder.find(&[candidate(&frame, bbox)]);

    assert!(!report.result.found);
    assert!(report.result.region.is_empty());
    assert_eq!(report.result.score, 0);
    assert!(report.winner.is_none());
}

#[test]
fn textured_reference_with_flat_candidate_scores_zero() {
    let frame = scene_frame();
    let model = model_image(&frame);

    let mut finder = TargetFinder::new(FinderParams::default());
    finder.set_reference(&model.as_view());

    let report = finder.find(&[candidate(&frame, BACKGROUND)]);
    assert!(!report.result.found);
    assert_eq!(report.traces.len(), 1);
    assert_eq!(report.traces[0].stage, CandidateStage::Extracted);
}

#[test]
fn no_candidates_returns_the_sentinel_immediately() {
    let frame = scene_frame();
    let model = model_image(&frame);

    let mut finder = TargetFinder::new(FinderParams::default());
    finder.set_reference(&model.as_view());

    let report = finder.find(&[]);
    assert!(!report.result.found);
    assert!(report.result.region.is_empty());
    assert!(report.traces.is_empty());
}

#[test]
fn true_target_outscores_unrelated_texture() {
    let frame = scene_frame();
    let model = model_image(&frame);

    // A different-seed texture: plenty of keypoints, no geometric agreement
    // with the reference. Deliberately placed first so the selection has to
    // beat it on score, not on order.
    let unrelated = GrayImageU8::new(64, 96, block_noise_u8(64, 96, 6, 977));
    let decoy = CandidateRegion {
        bbox: BoundingBox::new(0, 0, 64, 96),
        image: unrelated.as_view(),
    };

    let mut finder = TargetFinder::new(FinderParams::default());
    finder.set_reference(&model.as_view());

    let report = finder.find(&[decoy, candidate(&frame, TARGET)]);
    assert!(report.result.found);
    assert_eq!(report.result.region, TARGET);
    assert!(
        report.traces[0].score < report.traces[1].score,
        "unrelated texture scored {} vs target {}",
        report.traces[0].score,
        report.traces[1].score
    );
}

#[test]
fn winner_mask_is_a_subset_of_the_uniqueness_survivors() {
    let frame = scene_frame();
    let model = model_image(&frame);

    let mut finder = TargetFinder::new(FinderParams::default());
    finder.set_reference(&model.as_view());

    let report = finder.find(&[candidate(&frame, TARGET)]);
    let winner = report.winner.expect("target crop matches");
    let trace = &report.traces[0];

    let final_survivors = winner.mask.iter().filter(|&&alive| alive).count();
    assert!(final_survivors <= trace.after_consistency);
    assert!(trace.after_consistency <= trace.after_uniqueness);
    assert!(trace.after_uniqueness <= trace.keypoints);
    assert_eq!(final_survivors, trace.inliers);
}
