//! `analyze`: rate a GPX route

use crate::context::{print_json, Context};
use anyhow::{Context as _, Result};
use grvlfinder_analysis::{
    EvaluatorConfig, RouteAnalysis, RouteEvaluator, DECENT_ROADS, EXCELLENT_ROADS, NO_ROAD_DATA,
    POOR_ROADS,
};
use grvlfinder_cli::output::{format_distance_km, format_percent, score_badge, Status};
use grvlfinder_cli::progress::{finish_error, finish_success, percent_bar};
use grvlfinder_scoring::{BikeType, ScoreClass};
use owo_colors::OwoColorize;
use std::path::Path;

pub async fn run(
    ctx: &Context,
    file: &Path,
    bike_type: Option<BikeType>,
    fetch_elevation: bool,
) -> Result<()> {
    let route = grvlfinder_gpx::parse_file(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let mut profile = ctx.profile()?;
    if let Some(bike_type) = bike_type {
        profile.set_bike_type(bike_type);
    }

    let client = ctx.client()?;
    let elevation = client.elevation();
    let finder = ctx.road_finder(&client, profile.clone())?;
    let config = EvaluatorConfig::from_settings(&ctx.config.schema.analysis)
        .with_force_elevation(fetch_elevation);
    let evaluator = RouteEvaluator::new(finder).with_config(config);

    let pb = (!ctx.is_json()).then(|| percent_bar("Analyzing route"));
    let result = evaluator
        .evaluate(&route.points, &profile, Some(&elevation), |percent| {
            if let Some(pb) = &pb {
                pb.set_position(u64::from(percent));
            }
        })
        .await;

    let analysis = match result {
        Ok(analysis) => {
            if let Some(pb) = &pb {
                finish_success(pb, "Analysis complete");
            }
            analysis
        }
        Err(e) => {
            if let Some(pb) = &pb {
                finish_error(pb, &e.user_message());
            }
            return Err(e.into());
        }
    };

    if ctx.is_json() {
        return print_json(&analysis);
    }
    print_report(route.name.as_deref(), &analysis);
    Ok(())
}

fn print_report(name: Option<&str>, a: &RouteAnalysis) {
    Status::header(&format!(
        "Route analysis: {} ({})",
        name.unwrap_or("unnamed route"),
        a.bike_type.display_name()
    ));
    println!("  Distance:  {}", format_distance_km(a.total_distance_km));

    for (class, km, percent) in [
        (ScoreClass::Green, a.green_km, a.green_percent),
        (ScoreClass::Yellow, a.yellow_km, a.yellow_percent),
        (ScoreClass::Red, a.red_km, a.red_percent),
    ] {
        println!(
            "  {:<20} {:>8}  {:>6}",
            score_badge(class),
            format_distance_km(km),
            format_percent(percent)
        );
    }
    println!(
        "  {:<20} {:>8}  {:>6}",
        "○ no data".dimmed(),
        format_distance_km(a.unknown_km),
        format_percent(a.unknown_percent)
    );
    println!(
        "  Coverage:  {} of {} segments ({})",
        a.segments_with_road_data,
        a.total_segments,
        format_percent(a.coverage_percent)
    );

    let surfaces: Vec<_> = a
        .surface_breakdown_km
        .iter()
        .filter(|(key, _)| ![EXCELLENT_ROADS, DECENT_ROADS, POOR_ROADS, NO_ROAD_DATA].contains(&key.as_str()))
        .collect();
    if !surfaces.is_empty() {
        Status::header("Surfaces");
        for (surface, km) in surfaces {
            println!("  {:<16} {}", surface, format_distance_km(*km));
        }
    }

    println!();
    println!("  {}", a.quality_assessment().bold());
    println!("  {}", a.elevation_assessment());
    if a.has_elevation && a.steepest_point.is_some() {
        println!("  Steepest section at {}", a.steepest_location);
    }
}
