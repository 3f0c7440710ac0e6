//! Tether CLI
//!
//! Replay select scenarios and inspect overlay placements.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tether_core::geometry::{compute_placement_with, PlacementStyle, Rect, Size, Viewport};
use tether_core::TetherConfig;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod scenario;

use scenario::Scenario;

#[derive(Parser)]
#[command(name = "tether")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Floating select overlay toolkit", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (tether.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a scenario file against a select or multi-select
    Run {
        /// Scenario file
        scenario: PathBuf,
    },

    /// Compute where a panel would be placed
    Place {
        /// Trigger rectangle as x,y,width,height
        #[arg(long, value_parser = parse_rect)]
        trigger: Rect,

        /// Viewport as width,height
        #[arg(long, value_parser = parse_pair)]
        viewport: (f32, f32),

        /// Panel size as width,height
        #[arg(long, value_parser = parse_pair)]
        size: (f32, f32),

        /// Use context-menu placement (right-aligned, own width)
        #[arg(long)]
        menu: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Run { scenario } => cmd_run(&scenario, &config, cli.format),
        Commands::Place {
            trigger,
            viewport,
            size,
            menu,
        } => cmd_place(trigger, viewport, size, menu, &config, cli.format),
    }
}

fn load_config(path: Option<&Path>) -> Result<TetherConfig> {
    match path {
        Some(path) => TetherConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(TetherConfig::default()),
    }
}

fn cmd_run(path: &Path, config: &TetherConfig, format: OutputFormat) -> Result<()> {
    let scenario = Scenario::load(path)?;
    info!(
        "Replaying {} ({} options, {} steps)",
        path.display(),
        scenario.options.len(),
        scenario.steps.len()
    );

    let report = scenario::run(&scenario, config)?;
    match format {
        OutputFormat::Text => print!("{}", scenario::render_text(&report)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

fn cmd_place(
    trigger: Rect,
    (vw, vh): (f32, f32),
    (w, h): (f32, f32),
    menu: bool,
    config: &TetherConfig,
    format: OutputFormat,
) -> Result<()> {
    let style = if menu {
        PlacementStyle::ContextMenu
    } else {
        PlacementStyle::Select
    };
    let placement = compute_placement_with(
        trigger,
        Size::new(w, h),
        Viewport::new(vw, vh),
        style,
        config.placement_options(style),
    );

    match format {
        OutputFormat::Text => println!(
            "top={:.1} left={:.1} width={:.1} side={:?}",
            placement.top, placement.left, placement.width, placement.side
        ),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&placement)?),
    }
    Ok(())
}

fn parse_numbers<const N: usize>(s: &str) -> std::result::Result<[f32; N], String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != N {
        return Err(format!("expected {} comma-separated numbers, got '{}'", N, s));
    }
    let mut out = [0.0; N];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = part
            .parse()
            .map_err(|_| format!("'{}' is not a number", part))?;
    }
    Ok(out)
}

fn parse_rect(s: &str) -> std::result::Result<Rect, String> {
    let [x, y, w, h] = parse_numbers::<4>(s)?;
    Ok(Rect::new(x, y, w, h))
}

fn parse_pair(s: &str) -> std::result::Result<(f32, f32), String> {
    let [a, b] = parse_numbers::<2>(s)?;
    Ok((a, b))
}
