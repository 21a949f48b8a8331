//! grvlfinder - gravel ride finder
//!
//! Scores OpenStreetMap roads for a bike type, rates GPX routes, plans routes over
//! well-scored roads and exports GPX.

use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod context;
mod logging;

use commands::cache::CacheCommand;
use commands::config::ConfigCommand;
use commands::find::FindOptions;
use commands::profile::ProfileCommand;
use commands::route::RouteMode;
use commands::{parse_score_class, weather_override, AreaArgs};
use context::{Context, OutputFormat};
use grvlfinder_geo::{BoundingBox, Coordinate};
use grvlfinder_scoring::{BikeType, ScoreClass};
use logging::LogFormat;

/// Find and rate gravel roads and routes
#[derive(Parser)]
#[command(name = "grvlfinder")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Log line format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Configuration file
    #[arg(short, long, global = true, env = "GRVLFINDER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score the roads of an area
    Find {
        #[command(flatten)]
        area: AreaArgs,

        /// Bike type for this search (defaults to the saved profile)
        #[arg(short, long)]
        bike_type: Option<BikeType>,

        /// Fetch elevation data and penalise steep roads
        #[arg(long)]
        elevation: bool,

        /// Adjust scores for recent rainfall (defaults to the saved profile)
        #[arg(long, conflicts_with = "no_weather")]
        weather: bool,

        /// Ignore recent rainfall for this search
        #[arg(long)]
        no_weather: bool,

        /// Score classes to hide, comma separated (green,yellow,red)
        #[arg(long, value_delimiter = ',', value_parser = parse_score_class)]
        hide: Vec<ScoreClass>,

        /// Maximum roads to list
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },

    /// Rate a GPX route
    Analyze {
        /// GPX file
        file: PathBuf,

        /// Bike type for this analysis (defaults to the saved profile)
        #[arg(short, long)]
        bike_type: Option<BikeType>,

        /// Look up elevation even when the profile does not ask for it
        #[arg(long)]
        fetch_elevation: bool,
    },

    /// Plan a route between two points
    Route {
        /// Start as lat,lon
        #[arg(long, allow_hyphen_values = true)]
        from: Coordinate,

        /// Destination as lat,lon
        #[arg(long, allow_hyphen_values = true)]
        to: Coordinate,

        /// Routing engine
        #[arg(short, long, value_enum, default_value_t = RouteMode::Smart)]
        mode: RouteMode,

        /// Write the route to this GPX file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build a route from tapped points, following roads between them
    Draw {
        /// Point as lat,lon; repeat in drawing order
        #[arg(long = "point", required = true, allow_hyphen_values = true)]
        points: Vec<Coordinate>,

        /// Undo the last N drawn stretches
        #[arg(long, default_value_t = 0)]
        undo: usize,

        /// Write the route to this GPX file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Recent rainfall and mud risk
    Weather {
        /// Location as lat,lon
        #[arg(long, allow_hyphen_values = true, conflicts_with = "bbox")]
        at: Option<Coordinate>,

        /// Area as south,west,north,east
        #[arg(long, allow_hyphen_values = true)]
        bbox: Option<BoundingBox>,
    },

    /// Show or change the rider profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommand,
    },

    /// Rewrite a GPX file in the export format
    Export {
        /// GPX file to read
        input: PathBuf,

        /// Output file name
        #[arg(short, long)]
        name: Option<String>,

        /// Output directory (defaults to the configured export directory)
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Add elevation from the lookup service when the file has none
        #[arg(long)]
        elevation: bool,
    },

    /// Manage cached map data
    Cache {
        #[command(subcommand)]
        command: CacheCommand,
    },

    /// Show or create the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose, cli.log_format) {
        eprintln!("{} {e}", "Warning:".yellow().bold());
    }

    let format = cli.format;
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            let core = find_cause::<grvlfinder_core::Error>(&e);
            if format == OutputFormat::Json {
                if let Some(report) = core.map(grvlfinder_core::Error::to_report) {
                    if let Ok(json) = serde_json::to_string(&report) {
                        eprintln!("{json}");
                    }
                }
            }
            ExitCode::from(exit_code(&e, core))
        }
    }
}

fn find_cause<'a, T: std::error::Error + 'static>(e: &'a anyhow::Error) -> Option<&'a T> {
    e.chain().find_map(|cause| cause.downcast_ref::<T>())
}

/// Exit status for a failed command
fn exit_code(e: &anyhow::Error, core: Option<&grvlfinder_core::Error>) -> u8 {
    use grvlfinder_core::error::{exit_codes, ErrorCategory};

    let code = match core.map(grvlfinder_core::Error::category) {
        Some(category @ (ErrorCategory::Configuration | ErrorCategory::Validation)) => category.exit_code(),
        _ if find_cause::<grvlfinder_api_client::ApiError>(e).is_some() => exit_codes::SERVICE_ERROR,
        Some(category) => category.exit_code(),
        None => exit_codes::FAILURE,
    };
    u8::try_from(code).unwrap_or(1)
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut ctx = Context::load(cli.config.as_deref(), cli.format)?;

    match cli.command {
        Commands::Find {
            area,
            bike_type,
            elevation,
            weather,
            no_weather,
            hide,
            limit,
        } => {
            let opts = FindOptions {
                area,
                bike_type,
                elevation,
                weather: weather_override(weather, no_weather),
                hide,
                limit,
            };
            commands::find::run(&ctx, opts).await
        }

        Commands::Analyze {
            file,
            bike_type,
            fetch_elevation,
        } => commands::analyze::run(&ctx, &file, bike_type, fetch_elevation).await,

        Commands::Route {
            from,
            to,
            mode,
            output,
        } => commands::route::run(&ctx, from, to, mode, output).await,

        Commands::Draw {
            points,
            undo,
            output,
        } => commands::draw::run(&ctx, &points, undo, output).await,

        Commands::Weather { at, bbox } => commands::weather::run(&ctx, at, bbox).await,

        Commands::Profile { command } => commands::profile::run(&mut ctx, command),

        Commands::Export {
            input,
            name,
            output_dir,
            elevation,
        } => commands::export::run(&ctx, &input, name.as_deref(), output_dir, elevation).await,

        Commands::Cache { command } => commands::cache::run(&ctx, &command),

        Commands::Config { command } => commands::config::run(&ctx, command),
    }
}
