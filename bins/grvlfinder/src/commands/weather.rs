//! `weather`: recent rainfall and mud risk

use crate::context::{print_json, Context};
use anyhow::Result;
use grvlfinder_cli::output::Status;
use grvlfinder_cli::progress::{finish_success, spinner};
use grvlfinder_geo::{BoundingBox, Coordinate};
use owo_colors::OwoColorize;

pub async fn run(ctx: &Context, at: Option<Coordinate>, bbox: Option<BoundingBox>) -> Result<()> {
    let client = ctx.client()?;
    let weather = client.weather();
    let pb = (!ctx.is_json()).then(|| spinner("Checking recent weather..."));

    let (place, condition) = match (at, bbox) {
        (Some(at), _) => (at, weather.recent_conditions(&at).await),
        (None, Some(bbox)) => (bbox.center(), weather.recent_conditions_for_area(&bbox).await),
        (None, None) => {
            return Err(grvlfinder_core::Error::validation("Specify a location with --at or --bbox")
                .with_suggestion("For example: --at 50.88,4.70")
                .into());
        }
    };
    let condition = condition.map_err(|e| {
        let message = e.user_message();
        anyhow::Error::from(e).context(message)
    })?;
    if let Some(pb) = &pb {
        finish_success(pb, "Weather loaded");
    }

    if ctx.is_json() {
        return print_json(&condition);
    }

    Status::header(&format!("Weather near {place}"));
    if condition.is_muddy {
        println!("  {}", condition.warning_message().yellow());
    } else {
        println!("  {}", condition.warning_message().green());
    }
    println!();
    for line in condition.detailed_report().lines() {
        println!("  {line}");
    }
    Ok(())
}
