//! `find`: score the roads of an area

use super::AreaArgs;
use crate::context::{print_json, Context};
use anyhow::Result;
use grvlfinder_cli::output::{format_count, format_distance_km, score_badge, Status};
use grvlfinder_cli::progress::{finish_error, finish_success, spinner};
use grvlfinder_scoring::{BikeType, ScoreClass, ScoreFilter};
use owo_colors::OwoColorize;
use serde::Serialize;

/// `find` options
pub struct FindOptions {
    pub area: AreaArgs,
    pub bike_type: Option<BikeType>,
    pub elevation: bool,
    /// `None` keeps the saved profile setting
    pub weather: Option<bool>,
    pub hide: Vec<ScoreClass>,
    pub limit: usize,
}

#[derive(Serialize)]
struct RoadRow<'a> {
    score: i32,
    class: ScoreClass,
    name: Option<&'a str>,
    highway: Option<&'a str>,
    surface: Option<&'a str>,
    length_m: f64,
    max_slope_percent: Option<f64>,
    weather_warning: Option<String>,
}

pub async fn run(ctx: &Context, opts: FindOptions) -> Result<()> {
    let bbox = opts.area.resolve()?;
    let mut profile = ctx.profile()?;
    if let Some(bike_type) = opts.bike_type {
        profile.set_bike_type(bike_type);
    }
    if opts.elevation {
        profile.set_elevation_data_enabled(true);
    }
    if let Some(enabled) = opts.weather {
        profile.set_weather_enabled(enabled);
    }

    let client = ctx.client()?;
    let mut finder = ctx.road_finder(&client, profile.clone())?;

    if profile.weather_enabled() {
        match client.weather().recent_conditions_for_area(&bbox).await {
            Ok(condition) => finder = finder.with_weather(condition),
            Err(e) => Status::warning(&format!("Weather unavailable: {}", e.user_message())),
        }
    }

    let pb = (!ctx.is_json()).then(|| spinner("Fetching roads..."));
    let roads = match finder.find(&bbox).await {
        Ok(roads) => {
            if let Some(pb) = &pb {
                finish_success(pb, &format!("{} scored", format_count(roads.len(), "road", "roads")));
            }
            roads
        }
        Err(e) => {
            if let Some(pb) = &pb {
                finish_error(pb, &e.user_message());
            }
            return Err(e.into());
        }
    };

    let filter = opts
        .hide
        .iter()
        .fold(ScoreFilter::default(), |f, class| f.hiding(*class));
    let rows: Vec<RoadRow<'_>> = filter
        .apply(&roads)
        .into_iter()
        .take(opts.limit)
        .map(|road| RoadRow {
            score: road.score,
            class: road.score_class(),
            name: road.tag("name"),
            highway: road.tag("highway"),
            surface: road.surface(),
            length_m: road.length_m(),
            max_slope_percent: road.max_slope_percent,
            weather_warning: finder.calculator().weather_warning(&road.tags),
        })
        .collect();

    if ctx.is_json() {
        return print_json(&rows);
    }

    Status::header(&format!(
        "{} {} roads in {}",
        profile.bike_type().emoji(),
        profile.bike_type().display_name(),
        bbox
    ));
    if rows.is_empty() {
        Status::info("No roads match the current filter");
        return Ok(());
    }

    for row in &rows {
        let label = row.name.or(row.highway).unwrap_or("unnamed");
        let surface = row.surface.unwrap_or("unknown surface");
        let slope = row
            .max_slope_percent
            .map(|s| format!(", max {s:.1}%"))
            .unwrap_or_default();
        println!(
            "  {} {:>4}  {} ({}, {}{})",
            score_badge(row.class),
            row.score.bold(),
            label,
            surface.dimmed(),
            format_distance_km(row.length_m / 1000.0),
            slope
        );
        if let Some(warning) = &row.weather_warning {
            println!("        {}", warning.yellow());
        }
    }

    if roads.len() > rows.len() {
        Status::info(&format!(
            "Showing {} of {}",
            rows.len(),
            format_count(roads.len(), "road", "roads")
        ));
    }
    Ok(())
}
