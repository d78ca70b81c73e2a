use std::env;
use std::path::Path;

use target_finder::config::{load_config, RuntimeConfig};
use target_finder::image::io::{load_grayscale_image, save_grayscale_u8, write_json_file};
use target_finder::image::GrayImageU8;
use target_finder::proposal::{RegionProposal, StaticProposal};
use target_finder::types::CandidateRegion;
use target_finder::{BoundingBox, FindReport, TargetFinder};

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args()
        .nth(1)
        .ok_or_else(|| "usage: find_demo <config.json>".to_string())?;
    let config: RuntimeConfig = load_config(Path::new(&config_path))?;

    let model = load_grayscale_image(&config.model_path)?;
    let scene = load_grayscale_image(&config.scene_path)?;
    let frame = scene.as_view();

    let mut finder = TargetFinder::new(config.finder_params);
    finder.set_reference(&model.as_view());

    let boxes = if config.regions.is_empty() {
        vec![BoundingBox::new(0, 0, frame.w as u32, frame.h as u32)]
    } else {
        StaticProposal::new(config.regions.clone()).propose(&frame)
    };
    let candidates: Vec<CandidateRegion> = boxes
        .iter()
        .filter_map(|&bbox| frame.crop(bbox).map(|image| CandidateRegion { bbox, image }))
        .collect();

    let report = finder.find(&candidates);
    print_text_summary(&report);

    if let Some(path) = &config.output.json_out {
        write_json_file(path, &report)?;
        println!("\nJSON report written to {}", path.display());
    }
    if let Some(path) = &config.output.crop_out {
        // The sentinel region never crops, so a miss writes nothing.
        if let Some(view) = frame.crop(report.result.region) {
            save_grayscale_u8(&GrayImageU8::from_view(&view), path)?;
            println!("Winning crop written to {}", path.display());
        }
    }
    Ok(())
}

fn print_text_summary(report: &FindReport) {
    let res = &report.result;
    println!("Find summary");
    println!("  found: {}", res.found);
    println!("  score: {}", res.score);
    println!(
        "  region: x={} y={} w={} h={}",
        res.region.x, res.region.y, res.region.w, res.region.h
    );
    println!("  match_time_ms: {:.3}", res.match_time_ms);
    println!("  total_time_ms: {:.3}", res.total_time_ms);
    if let Some(h) = &res.homography {
        println!(
            "  homography:\n    [{:.4} {:.4} {:.4}]\n    [{:.4} {:.4} {:.4}]\n    [{:.4} {:.4} {:.4}]",
            h[(0, 0)],
            h[(0, 1)],
            h[(0, 2)],
            h[(1, 0)],
            h[(1, 1)],
            h[(1, 2)],
            h[(2, 0)],
            h[(2, 1)],
            h[(2, 2)]
        );
    }
    for trace in &report.traces {
        println!(
            "  candidate {}: keypoints={} uniq={} consist={} inliers={} score={} stage={:?}",
            trace.index,
            trace.keypoints,
            trace.after_uniqueness,
            trace.after_consistency,
            trace.inliers,
            trace.score,
            trace.stage
        );
    }
}
