//! `route`: plan a route between two points

use super::split_output;
use crate::context::{print_json, Context};
use anyhow::{Context as _, Result};
use clap::ValueEnum;
use grvlfinder_cli::output::{format_distance_km, Status};
use grvlfinder_cli::progress::{finish_success, spinner};
use grvlfinder_geo::Coordinate;
use grvlfinder_gpx::{export_to_file, ExportOptions};
use grvlfinder_routing::{RouteMetrics, SmartRoute, SmartRouter};
use serde::Serialize;
use std::path::PathBuf;
use tracing::warn;

/// Routing engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RouteMode {
    /// A* over scored OpenStreetMap roads, OSRM when that fails
    #[default]
    Smart,
    /// OSRM bike profile
    Osrm,
}

#[derive(Serialize)]
struct RouteOutput<'a> {
    engine: &'a str,
    points: &'a [Coordinate],
    metrics: &'a RouteMetrics,
    output: Option<PathBuf>,
}

pub async fn run(
    ctx: &Context,
    from: Coordinate,
    to: Coordinate,
    mode: RouteMode,
    output: Option<PathBuf>,
) -> Result<()> {
    let client = ctx.client()?;
    let pb = (!ctx.is_json()).then(|| spinner("Planning route..."));

    let smart = match mode {
        RouteMode::Smart => match smart_route(ctx, &client, &from, &to).await {
            Ok(route) => Some(route),
            Err(e) => {
                warn!(error = %e, "Smart routing failed, falling back to OSRM");
                if !ctx.is_json() {
                    Status::warning(&format!("Smart routing failed ({e}), using OSRM"));
                }
                None
            }
        },
        RouteMode::Osrm => None,
    };

    let (engine, route) = match smart {
        Some(route) => ("smart", route),
        None => {
            let points = client.osrm().route_or_direct(&from, &to).await;
            let metrics = RouteMetrics::calculate(&points, &[]);
            ("osrm", SmartRoute { points, metrics })
        }
    };
    if let Some(pb) = &pb {
        finish_success(pb, &format!("Route ready ({engine})"));
    }

    let written = match output {
        Some(path) => {
            let (dir, name) = split_output(&path);
            let options = ExportOptions::default().with_track_name("Gravel route");
            Some(
                export_to_file(&route.points, &dir, name.as_deref(), &options)
                    .context("Failed to write GPX")?,
            )
        }
        None => None,
    };

    if ctx.is_json() {
        return print_json(&RouteOutput {
            engine,
            points: &route.points,
            metrics: &route.metrics,
            output: written,
        });
    }

    Status::header(&format!("Route {from} → {to}"));
    for line in route.metrics.summary().lines() {
        println!("  {line}");
    }
    if let Some(steepest) = route.metrics.steepest_point {
        println!("  Steepest at {steepest}");
    }
    println!(
        "  {} points, {}",
        route.points.len(),
        format_distance_km(route.metrics.total_distance_km)
    );
    if let Some(path) = written {
        Status::success(&format!("Saved {}", path.display()));
    }
    Ok(())
}

async fn smart_route(
    ctx: &Context,
    client: &grvlfinder_api_client::GrvlClient,
    from: &Coordinate,
    to: &Coordinate,
) -> Result<SmartRoute> {
    let profile = ctx.profile()?;
    let finder = ctx.road_finder(client, profile)?;
    let roads = finder.find(&SmartRouter::search_area(from, to)).await?;
    let router = SmartRouter::from_settings(&ctx.config.schema.routing);
    Ok(router.route(from, to, &roads)?)
}
