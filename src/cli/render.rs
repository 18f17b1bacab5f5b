//! Export command implementation

use std::path::Path;
use std::process::ExitCode;

use crate::config::SlpRenderConfig;
use crate::export::{ExportOptions, Exporter};
use crate::progress::{ConsoleProgress, JsonProgress, ProgressReporter};
use crate::slp::Slp;

use super::{load_palette, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Render every frame of a container into `out_dir`
pub fn run_export(
    container: &Path,
    out_dir: &Path,
    settings: &SlpRenderConfig,
    json: bool,
    verbose: bool,
) -> ExitCode {
    let palette = match load_palette(settings.render.palette.as_deref()) {
        Ok(palette) => palette,
        Err(e) => {
            eprintln!("Error: Cannot load palette: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let slp = match Slp::open(container) {
        Ok(slp) => slp,
        Err(e) => {
            eprintln!("Error: Cannot read '{}': {}", container.display(), e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let options = ExportOptions {
        player: settings.render.player,
        draw_outline: settings.render.draw_outline,
        jobs: settings.export.jobs,
        fail_fast: settings.export.fail_fast,
    };

    let progress: Box<dyn ProgressReporter> = if json {
        Box::new(JsonProgress::new())
    } else {
        Box::new(ConsoleProgress::new().with_verbose(verbose))
    };

    let exporter =
        Exporter::new(&slp, &palette).with_options(options).with_progress(progress.as_ref());

    match exporter.export(out_dir) {
        // Failed frames were already reported through the progress output
        Ok(summary) if summary.is_success() => ExitCode::from(EXIT_SUCCESS),
        Ok(_) => ExitCode::from(EXIT_ERROR),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
