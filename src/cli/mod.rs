//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to the inspect and
//! export implementations.

mod inspect;
mod render;

use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::config::{load_config, merge_cli_overrides, CliOverrides, SlpRenderConfig};
use crate::palette::{Palette, PaletteError};
use crate::palettes::{default_palette, get_builtin};

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// slp-render - Render SLP sprite frames to PNG
#[derive(Parser, Debug)]
#[command(name = "slp-render")]
#[command(about = "Render the frames of an SLP sprite container to PNG files, or inspect its frame table")]
#[command(version)]
pub struct Cli {
    /// SLP container file
    pub container: PathBuf,

    /// Directory the frames are written to as {index}.png
    #[arg(required_unless_present = "inspect")]
    pub out_dir: Option<PathBuf>,

    /// Print the container's header and frame table instead of exporting
    #[arg(long)]
    pub inspect: bool,

    /// Machine-readable output: JSON report with --inspect, JSON progress lines otherwise
    #[arg(long)]
    pub json: bool,

    /// JASC-PAL palette file, or @units / @grayscale for a built-in palette
    #[arg(long, value_name = "FILE")]
    pub palette: Option<String>,

    /// In-game player color (1-8, default: 1)
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=8))]
    pub player: Option<u8>,

    /// Draw the unit outline instead of its body
    #[arg(long)]
    pub draw_outline: bool,

    /// Number of frames exported in parallel (default: 1)
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..=256))]
    pub jobs: Option<u64>,

    /// Export every frame even after a failure
    #[arg(long)]
    pub keep_going: bool,

    /// Explicit slp-render.toml to load instead of searching for one
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print every written frame and enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Config values supplied on the command line.
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            palette: self.palette.clone(),
            player: self.player,
            draw_outline: self.draw_outline.then_some(true),
            jobs: self.jobs.map(|j| j as usize),
            fail_fast: self.keep_going.then_some(false),
        }
    }
}

/// Run an already parsed command line.
pub fn run(cli: Cli) -> ExitCode {
    if cli.inspect {
        return inspect::run_inspect(&cli.container, cli.json);
    }

    // clap enforces OUT_DIR whenever --inspect is absent
    let Some(out_dir) = cli.out_dir.as_deref() else {
        eprintln!("Error: missing output directory");
        return ExitCode::from(EXIT_INVALID_ARGS);
    };

    let settings = match resolve_settings(&cli) {
        Ok(settings) => settings,
        Err(message) => {
            eprintln!("Error: {}", message);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    render::run_export(&cli.container, out_dir, &settings, cli.json, cli.verbose)
}

/// Load the config file and apply command-line overrides.
fn resolve_settings(cli: &Cli) -> Result<SlpRenderConfig, String> {
    let mut config = load_config(cli.config.as_deref()).map_err(|e| e.to_string())?;
    merge_cli_overrides(&mut config, &cli.overrides());

    let errors = config.validate();
    if !errors.is_empty() {
        let lines: Vec<String> = errors.iter().map(|e| format!("  - {}", e)).collect();
        return Err(format!("invalid settings:\n{}", lines.join("\n")));
    }

    tracing::debug!(?config, "resolved settings");
    Ok(config)
}

/// Resolve a palette argument: `@name` for a built-in, otherwise a JASC-PAL file.
///
/// With no argument the bundled default palette is used.
pub fn load_palette(spec: Option<&str>) -> Result<Palette, PaletteError> {
    match spec {
        None => default_palette(),
        Some(spec) => match spec.strip_prefix('@') {
            Some(name) => get_builtin(name),
            None => Palette::load(Path::new(spec)),
        },
    }
}
