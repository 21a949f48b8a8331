//! `profile`: inspect and persist the rider profile

use crate::context::{print_json, Context};
use anyhow::Result;
use clap::{Subcommand, ValueEnum};
use grvlfinder_cli::output::Status;
use grvlfinder_scoring::{BikeProfile, BikeType, Criterion};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    fn enabled(self) -> bool {
        self == Toggle::On
    }
}

#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// Show the active profile and its weights
    Show,
    /// List bike types
    List,
    /// Select a bike type
    Set {
        /// Bike type (gravel, gravel-bikepacking, race-road, race-bikepacking, custom)
        bike_type: BikeType,
    },
    /// Set a weight of the custom profile
    Weight {
        /// Criterion (surface, smoothness, tracktype, bicycle, length, highway, slope)
        criterion: Criterion,
        /// Weight value
        #[arg(allow_hyphen_values = true)]
        value: i32,
    },
    /// Fetch elevation data for profiles that do not require it
    Elevation {
        #[arg(value_enum)]
        state: Toggle,
    },
    /// Adjust scores for recent rainfall
    Weather {
        #[arg(value_enum)]
        state: Toggle,
    },
}

#[derive(Serialize)]
struct ProfileView {
    bike_type: BikeType,
    name: &'static str,
    description: &'static str,
    weights: BTreeMap<String, i32>,
    elevation_data_enabled: bool,
    fetches_elevation: bool,
    penalizes_slopes: bool,
    weather_enabled: bool,
}

impl ProfileView {
    fn new(profile: &BikeProfile) -> Self {
        let bike_type = profile.bike_type();
        Self {
            bike_type,
            name: bike_type.display_name(),
            description: bike_type.description(),
            weights: profile.current_weights().to_map(),
            elevation_data_enabled: profile.elevation_data_enabled(),
            fetches_elevation: profile.should_fetch_elevation_data(),
            penalizes_slopes: profile.should_penalize_slopes(),
            weather_enabled: profile.weather_enabled(),
        }
    }
}

pub fn run(ctx: &mut Context, command: ProfileCommand) -> Result<()> {
    let mut profile = ctx.profile()?;

    match command {
        ProfileCommand::Show => return show(ctx, &profile),
        ProfileCommand::List => return list(ctx, profile.bike_type()),
        ProfileCommand::Set { bike_type } => {
            profile.set_bike_type(bike_type);
            ctx.save_profile(&profile)?;
            Status::success(&format!("Bike type set to {}", bike_type.full_display_name()));
        }
        ProfileCommand::Weight { criterion, value } => {
            profile.set_custom_weight(criterion, value);
            ctx.save_profile(&profile)?;
            Status::success(&format!("Custom weight {criterion} = {value}"));
            if profile.bike_type() != BikeType::Custom {
                Status::info("Custom weights apply once the custom bike type is selected");
            }
        }
        ProfileCommand::Elevation { state } => {
            profile.set_elevation_data_enabled(state.enabled());
            ctx.save_profile(&profile)?;
            Status::success(&format!("Elevation data {}", on_off(state.enabled())));
            if profile.bike_type().is_bikepacking() {
                Status::info("Bikepacking profiles always fetch elevation data");
            }
        }
        ProfileCommand::Weather { state } => {
            profile.set_weather_enabled(state.enabled());
            ctx.save_profile(&profile)?;
            Status::success(&format!("Weather adjustment {}", on_off(state.enabled())));
        }
    }
    Ok(())
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "enabled"
    } else {
        "disabled"
    }
}

fn show(ctx: &Context, profile: &BikeProfile) -> Result<()> {
    let view = ProfileView::new(profile);
    if ctx.is_json() {
        return print_json(&view);
    }

    Status::header(&profile.bike_type().full_display_name());
    println!("  {}", view.description.dimmed());
    println!();
    for (criterion, weight) in &view.weights {
        println!("  {criterion:<12} {weight:>4}");
    }
    println!();
    println!("  Elevation data: {}", on_off(view.fetches_elevation));
    println!("  Slope penalty:  {}", on_off(view.penalizes_slopes));
    println!("  Weather:        {}", on_off(view.weather_enabled));
    Ok(())
}

fn list(ctx: &Context, current: BikeType) -> Result<()> {
    if ctx.is_json() {
        let types: Vec<_> = BikeType::ALL
            .iter()
            .map(|t| {
                serde_json::json!({
                    "id": t.as_str(),
                    "name": t.display_name(),
                    "description": t.description(),
                    "selected": *t == current,
                })
            })
            .collect();
        return print_json(&types);
    }

    Status::header("Bike types");
    for bike_type in BikeType::ALL {
        let marker = if bike_type == current { "●".green().to_string() } else { " ".to_string() };
        println!(
            "  {marker} {:<20} {}",
            bike_type.full_display_name(),
            bike_type.as_str().dimmed()
        );
        println!("      {}", bike_type.description().dimmed());
    }
    Ok(())
}
