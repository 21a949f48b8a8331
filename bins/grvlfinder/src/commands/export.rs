//! `export`: rewrite a GPX file in the export format

use crate::context::{print_json, Context};
use anyhow::{Context as _, Result};
use grvlfinder_analysis::enrich_route_elevation;
use grvlfinder_cli::output::{format_count, Status};
use grvlfinder_gpx::{export_to_file, ExportOptions};
use std::path::{Path, PathBuf};

pub async fn run(
    ctx: &Context,
    input: &Path,
    name: Option<&str>,
    output_dir: Option<PathBuf>,
    elevation: bool,
) -> Result<()> {
    let total = if elevation { 3 } else { 2 };
    let step = |n: usize, message: &str| {
        if !ctx.is_json() {
            Status::step(n, total, message);
        }
    };

    step(1, &format!("Reading {}", input.display()));
    let mut route = grvlfinder_gpx::parse_file(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    if elevation {
        step(2, "Looking up elevation");
        let client = ctx.client()?;
        match enrich_route_elevation(&mut route.points, &client.elevation()).await {
            Ok(true) => Status::info("Elevation added from lookup service"),
            Ok(false) => Status::info("Route already has elevation data"),
            Err(e) => Status::warning(&format!("Elevation lookup failed: {}", e.user_message())),
        }
    }

    let export = &ctx.config.schema.export;
    let dir = output_dir
        .or_else(|| export.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    let file_name = name.unwrap_or(&export.default_file_name);
    let options = ExportOptions::default().with_track_name(route.name.as_deref().unwrap_or("Route"));

    step(total, "Writing GPX");
    let path = export_to_file(&route.points, &dir, Some(file_name), &options)
        .with_context(|| format!("Failed to export {}", input.display()))?;

    if ctx.is_json() {
        return print_json(&serde_json::json!({
            "path": path,
            "points": route.points.len(),
            "has_elevation": route.has_elevation_data(),
        }));
    }
    Status::success(&format!(
        "Exported {} to {}",
        format_count(route.points.len(), "point", "points"),
        path.display()
    ));
    Ok(())
}
