//! `draw`: join tapped points along the road network

use super::split_output;
use crate::context::{print_json, Context};
use anyhow::{Context as _, Result};
use grvlfinder_cli::output::{format_count, format_distance_km, Status};
use grvlfinder_cli::progress::{finish_success, spinner};
use grvlfinder_geo::{path_length_meters, BoundingBox, Coordinate};
use grvlfinder_gpx::{export_to_file, ExportOptions};
use grvlfinder_routing::RouteDrawer;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Serialize)]
struct DrawOutput<'a> {
    points: &'a [Coordinate],
    distance_km: f64,
    snapped: Vec<Coordinate>,
    output: Option<PathBuf>,
}

pub async fn run(ctx: &Context, taps: &[Coordinate], undo: usize, output: Option<PathBuf>) -> Result<()> {
    let mut drawer = RouteDrawer::from_settings(&ctx.config.schema.routing);

    if let Some(area) = BoundingBox::from_points(taps) {
        let area = area.expanded(ctx.config.schema.analysis.bbox_buffer_deg);
        let client = ctx.client()?;
        let finder = ctx.road_finder(&client, ctx.profile()?)?;
        let pb = (!ctx.is_json()).then(|| spinner("Loading roads..."));
        match finder.find(&area).await {
            Ok(roads) => {
                if let Some(pb) = &pb {
                    finish_success(pb, &format_count(roads.len(), "road", "roads"));
                }
                drawer.set_roads(roads);
            }
            Err(e) => {
                if let Some(pb) = &pb {
                    pb.finish_and_clear();
                }
                Status::warning(&format!("Roads unavailable ({}), drawing straight lines", e.user_message()));
            }
        }
    }

    let snapped: Vec<Coordinate> = taps.iter().map(|tap| drawer.add_point(tap)).collect();
    for _ in 0..undo {
        drawer.undo();
    }
    if !drawer.has_route() {
        return Err(grvlfinder_core::Error::validation("Route is empty, nothing to save")
            .with_suggestion("Undo fewer stretches or add more --point values")
            .into());
    }

    let points = drawer.points();
    let written = match output {
        Some(path) if !points.is_empty() => {
            let (dir, name) = split_output(&path);
            let options = ExportOptions::default().with_track_name("Drawn route");
            Some(export_to_file(points, &dir, name.as_deref(), &options).context("Failed to write GPX")?)
        }
        _ => None,
    };

    let distance_km = path_length_meters(points) / 1000.0;
    if ctx.is_json() {
        return print_json(&DrawOutput {
            points,
            distance_km,
            snapped,
            output: written,
        });
    }

    Status::header("Drawn route");
    println!("  {}, {}", format_count(points.len(), "point", "points"), format_distance_km(distance_km));
    for (tap, snap) in taps.iter().zip(&snapped) {
        if tap != snap {
            println!("  {tap} snapped to {snap}");
        }
    }
    if let Some(path) = written {
        Status::success(&format!("Saved {}", path.display()));
    }
    Ok(())
}
