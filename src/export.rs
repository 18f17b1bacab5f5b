//! Batch frame export.
//!
//! Renders every frame of a [`SpriteSource`], flips the alpha polarity and
//! writes each frame to `{out_dir}/{index}.png`.
//!
//! # How It Works
//!
//! 1. If the container has no frames, return without touching the filesystem
//! 2. Create the output directory (and its parents) once
//! 3. Export frames in index order, sequentially or on a bounded thread pool
//! 4. Collect per-frame outcomes and report them in index order
//!
//! # Example
//!
//! ```no_run
//! use slp_render::export::{ExportOptions, Exporter};
//! use slp_render::palettes::default_palette;
//! use slp_render::slp::Slp;
//! use std::path::Path;
//!
//! let slp = Slp::open(Path::new("graphics/2.slp"))?;
//! let palette = default_palette()?;
//! let options = ExportOptions { player: 3, ..Default::default() };
//!
//! let summary = Exporter::new(&slp, &palette).with_options(options).export(Path::new("archer"))?;
//! println!("wrote {} frames", summary.written.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::alpha::invert_alpha;
use crate::models::RenderOptions;
use crate::output::{frame_output_path, frame_to_image, save_png, OutputError};
use crate::palette::Palette;
use crate::player::DEFAULT_PLAYER;
use crate::progress::{NullProgress, ProgressEvent, ProgressReporter};
use crate::renderer::RenderError;
use crate::source::SpriteSource;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

static NULL_PROGRESS: NullProgress = NullProgress;

/// Why a single frame could not be exported
#[derive(Debug, Error)]
pub enum FrameError {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Export failure
#[derive(Debug, Error)]
pub enum ExportError {
    /// The output directory could not be created
    #[error("failed to create output directory '{}': {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A frame failed and the export stopped
    #[error("frame {index}: {source}")]
    Frame {
        index: usize,
        #[source]
        source: FrameError,
    },
    /// The worker pool could not be started
    #[error("failed to start export workers: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Export settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// In-game player number (1-8); remapped to an SLP slot before rendering
    pub player: u8,
    /// Draw outlines instead of unit bodies
    pub draw_outline: bool,
    /// Number of frames exported concurrently
    pub jobs: usize,
    /// Stop scheduling frames after the first failure
    pub fail_fast: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self { player: DEFAULT_PLAYER, draw_outline: false, jobs: 1, fail_fast: true }
    }
}

impl ExportOptions {
    /// Per-frame render options derived from these settings.
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions::for_player(self.player).with_outline(self.draw_outline)
    }
}

/// Shared flag that stops an export from scheduling further frames.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Frames already being written still finish.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A frame that failed while the export kept going.
#[derive(Debug)]
pub struct FrameFailure {
    pub index: usize,
    pub error: FrameError,
}

/// Result of an export run.
#[derive(Debug, Default)]
pub struct ExportSummary {
    /// Written files, in frame order
    pub written: Vec<PathBuf>,
    /// Failed frames, in frame order (only populated without fail-fast)
    pub failures: Vec<FrameFailure>,
    /// Whether cancellation stopped the export early
    pub cancelled: bool,
    /// Wall-clock duration of the export
    pub duration: Duration,
}

impl ExportSummary {
    /// True if nothing failed and the export was not cancelled.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && !self.cancelled
    }
}

/// What happened to one frame slot
enum FrameOutcome {
    Written(PathBuf),
    Failed(FrameError),
    Skipped,
}

/// Exports every frame of a container to numbered PNG files.
pub struct Exporter<'a> {
    source: &'a dyn SpriteSource,
    palette: &'a Palette,
    options: ExportOptions,
    cancel: CancelToken,
    progress: &'a dyn ProgressReporter,
}

impl<'a> Exporter<'a> {
    /// Create an exporter with default options.
    pub fn new(source: &'a dyn SpriteSource, palette: &'a Palette) -> Self {
        Self {
            source,
            palette,
            options: ExportOptions::default(),
            cancel: CancelToken::new(),
            progress: &NULL_PROGRESS,
        }
    }

    pub fn with_options(mut self, options: ExportOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_progress(mut self, progress: &'a dyn ProgressReporter) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Export all frames into `out_dir`.
    ///
    /// The directory is created only when the container has at least one
    /// frame. With fail-fast enabled the first failing frame (lowest index)
    /// is returned as [`ExportError::Frame`]; otherwise failures are collected
    /// into the summary.
    pub fn export(&self, out_dir: &Path) -> Result<ExportSummary, ExportError> {
        let start = Instant::now();
        let count = self.source.num_frames();
        self.progress.report(ProgressEvent::ExportStarted { total_frames: count });

        let mut summary = ExportSummary::default();

        if count == 0 {
            tracing::info!("container has no frames, nothing to export");
            summary.duration = start.elapsed();
            self.report_completed(&summary);
            return Ok(summary);
        }

        std::fs::create_dir_all(out_dir)
            .map_err(|source| ExportError::CreateDir { path: out_dir.to_path_buf(), source })?;

        let render_options = self.options.render_options();
        let failed = AtomicBool::new(false);
        let jobs = self.options.jobs.max(1).min(count);
        tracing::debug!(frames = count, jobs, player = render_options.player, "exporting frames");

        let outcomes: Vec<FrameOutcome> = if jobs == 1 {
            (0..count).map(|index| self.run_slot(index, out_dir, &render_options, &failed)).collect()
        } else {
            let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;
            pool.install(|| {
                (0..count)
                    .into_par_iter()
                    .map(|index| self.run_slot(index, out_dir, &render_options, &failed))
                    .collect()
            })
        };

        for (index, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                FrameOutcome::Written(path) => summary.written.push(path),
                FrameOutcome::Failed(error) => summary.failures.push(FrameFailure { index, error }),
                FrameOutcome::Skipped => summary.cancelled |= self.cancel.is_cancelled(),
            }
        }

        summary.duration = start.elapsed();
        self.report_completed(&summary);

        if self.options.fail_fast && !summary.failures.is_empty() {
            let FrameFailure { index, error } = summary.failures.swap_remove(0);
            return Err(ExportError::Frame { index, source: error });
        }
        Ok(summary)
    }

    /// Export one frame unless the run has been stopped.
    fn run_slot(
        &self,
        index: usize,
        out_dir: &Path,
        options: &RenderOptions,
        failed: &AtomicBool,
    ) -> FrameOutcome {
        if self.cancel.is_cancelled() || (self.options.fail_fast && failed.load(Ordering::SeqCst))
        {
            return FrameOutcome::Skipped;
        }

        let start = Instant::now();
        match self.export_frame(index, out_dir, options) {
            Ok(path) => {
                self.progress.report(ProgressEvent::FrameWritten {
                    index,
                    path: path.clone(),
                    duration_ms: start.elapsed().as_millis() as u64,
                });
                FrameOutcome::Written(path)
            }
            Err(error) => {
                failed.store(true, Ordering::SeqCst);
                tracing::debug!(index, %error, "frame export failed");
                self.progress
                    .report(ProgressEvent::FrameFailed { index, message: error.to_string() });
                FrameOutcome::Failed(error)
            }
        }
    }

    /// Render, convert alpha to opacity and write one frame.
    fn export_frame(
        &self,
        index: usize,
        out_dir: &Path,
        options: &RenderOptions,
    ) -> Result<PathBuf, FrameError> {
        let mut frame = self.source.render_frame(index, self.palette, options)?;
        invert_alpha(&mut frame.buffer);

        let path = frame_output_path(out_dir, index);
        let image = frame_to_image(frame)?;
        save_png(&image, &path)?;
        Ok(path)
    }

    fn report_completed(&self, summary: &ExportSummary) {
        self.progress.report(ProgressEvent::ExportCompleted {
            success: summary.is_success(),
            duration_ms: summary.duration.as_millis() as u64,
            written: summary.written.len(),
            failed: summary.failures.len(),
            cancelled: summary.cancelled,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FrameDescriptor, RenderedFrame};
    use image::Rgb;
    use std::sync::atomic::AtomicUsize;
    use tempfile::TempDir;

    /// In-memory source: frame `i` is solid palette color `i`, transparency 0
    struct FakeSource {
        frames: Vec<FrameDescriptor>,
        fail_on: Option<usize>,
        renders: AtomicUsize,
        cancel_after_first: Option<CancelToken>,
    }

    impl FakeSource {
        fn with_sizes(sizes: &[(u32, u32)]) -> Self {
            let frames = sizes
                .iter()
                .map(|&(width, height)| FrameDescriptor {
                    width,
                    height,
                    hotspot_x: 0,
                    hotspot_y: 0,
                    properties: 0,
                })
                .collect();
            Self { frames, fail_on: None, renders: AtomicUsize::new(0), cancel_after_first: None }
        }
    }

    impl SpriteSource for FakeSource {
        fn version(&self) -> &str {
            "2.0N"
        }

        fn comment(&self) -> &str {
            "fake"
        }

        fn frames(&self) -> &[FrameDescriptor] {
            &self.frames
        }

        fn render_frame(
            &self,
            index: usize,
            palette: &Palette,
            _options: &RenderOptions,
        ) -> Result<RenderedFrame, RenderError> {
            self.renders.fetch_add(1, Ordering::SeqCst);
            if let Some(token) = &self.cancel_after_first {
                token.cancel();
            }
            let descriptor = self.frame(index)?;
            if self.fail_on == Some(index) {
                return Err(RenderError::PaletteIndexOutOfRange {
                    index: 300,
                    palette_len: palette.len(),
                });
            }
            let rgb = palette.get(index).unwrap_or(Rgb([0, 0, 0]));
            let pixel = [rgb.0[0], rgb.0[1], rgb.0[2], 0];
            Ok(RenderedFrame {
                width: descriptor.width,
                height: descriptor.height,
                buffer: pixel.repeat(descriptor.pixel_count()),
            })
        }
    }

    fn palette() -> Palette {
        crate::palettes::get_builtin("grayscale").unwrap()
    }

    #[test]
    fn test_render_options_from_export_options() {
        let options = ExportOptions { player: 6, draw_outline: true, ..Default::default() };
        assert_eq!(options.render_options(), RenderOptions { player: 7, draw_outline: true });
    }

    #[test]
    fn test_empty_container_creates_nothing() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("nested").join("out");
        let source = FakeSource::with_sizes(&[]);
        let palette = palette();

        let summary = Exporter::new(&source, &palette).export(&out).unwrap();

        assert!(summary.written.is_empty());
        assert!(summary.is_success());
        assert!(!out.exists());
        assert!(!temp.path().join("nested").exists());
    }

    #[test]
    fn test_exports_numbered_files_with_frame_sizes() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("a").join("b");
        let source = FakeSource::with_sizes(&[(3, 2), (5, 4), (1, 1)]);
        let palette = palette();

        let summary = Exporter::new(&source, &palette).export(&out).unwrap();

        assert_eq!(summary.written, vec![out.join("0.png"), out.join("1.png"), out.join("2.png")]);
        for (path, (w, h)) in summary.written.iter().zip([(3, 2), (5, 4), (1, 1)]) {
            let image = image::open(path).unwrap().to_rgba8();
            assert_eq!(image.dimensions(), (w, h));
        }
        assert_eq!(std::fs::read_dir(&out).unwrap().count(), 3);
    }

    #[test]
    fn test_alpha_is_inverted_before_writing() {
        let temp = TempDir::new().unwrap();
        let source = FakeSource::with_sizes(&[(1, 1), (1, 1)]);
        let palette = palette();

        Exporter::new(&source, &palette).export(temp.path()).unwrap();

        let image = image::open(temp.path().join("1.png")).unwrap().to_rgba8();
        assert_eq!(image.get_pixel(0, 0).0, [1, 1, 1, 255]);
    }

    #[test]
    fn test_fail_fast_reports_frame_index() {
        let temp = TempDir::new().unwrap();
        let mut source = FakeSource::with_sizes(&[(1, 1), (1, 1), (1, 1), (1, 1)]);
        source.fail_on = Some(1);
        let palette = palette();

        let err = Exporter::new(&source, &palette).export(temp.path()).unwrap_err();

        assert!(matches!(err, ExportError::Frame { index: 1, .. }));
        assert!(err.to_string().starts_with("frame 1:"));
        assert!(temp.path().join("0.png").exists());
        assert!(!temp.path().join("2.png").exists());
        assert_eq!(source.renders.load(Ordering::SeqCst), 2);
    }

    /// Records every event it receives
    #[derive(Default)]
    struct RecordingProgress {
        events: std::sync::Mutex<Vec<ProgressEvent>>,
    }

    impl ProgressReporter for RecordingProgress {
        fn report(&self, event: ProgressEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    #[test]
    fn test_fail_fast_still_reports_completion() {
        let temp = TempDir::new().unwrap();
        let mut source = FakeSource::with_sizes(&[(1, 1), (1, 1), (1, 1)]);
        source.fail_on = Some(1);
        let palette = palette();
        let progress = RecordingProgress::default();

        let err = Exporter::new(&source, &palette)
            .with_progress(&progress)
            .export(temp.path())
            .unwrap_err();
        assert!(matches!(err, ExportError::Frame { index: 1, .. }));

        let events = progress.events.into_inner().unwrap();
        assert!(matches!(events.first(), Some(ProgressEvent::ExportStarted { total_frames: 3 })));
        assert!(matches!(
            events.last(),
            Some(ProgressEvent::ExportCompleted { success: false, written: 1, failed: 1, .. })
        ));
    }

    #[test]
    fn test_keep_going_collects_failures() {
        let temp = TempDir::new().unwrap();
        let mut source = FakeSource::with_sizes(&[(1, 1), (1, 1), (1, 1)]);
        source.fail_on = Some(0);
        let palette = palette();
        let options = ExportOptions { fail_fast: false, ..Default::default() };

        let summary =
            Exporter::new(&source, &palette).with_options(options).export(temp.path()).unwrap();

        assert!(!summary.is_success());
        assert_eq!(summary.written.len(), 2);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].index, 0);
        assert!(matches!(
            summary.failures[0].error,
            FrameError::Render(RenderError::PaletteIndexOutOfRange { .. })
        ));
    }

    #[test]
    fn test_parallel_export_matches_sequential_layout() {
        let temp = TempDir::new().unwrap();
        let sizes: Vec<(u32, u32)> = (1..=12).map(|i| (i, 13 - i)).collect();
        let source = FakeSource::with_sizes(&sizes);
        let palette = palette();
        let options = ExportOptions { jobs: 4, ..Default::default() };

        let summary =
            Exporter::new(&source, &palette).with_options(options).export(temp.path()).unwrap();

        let expected: Vec<PathBuf> =
            (0..12).map(|i| temp.path().join(format!("{}.png", i))).collect();
        assert_eq!(summary.written, expected);
        let image = image::open(temp.path().join("11.png")).unwrap();
        assert_eq!((image.width(), image.height()), (12, 1));
    }

    #[test]
    fn test_parallel_fail_fast_returns_lowest_failure() {
        let temp = TempDir::new().unwrap();
        let mut source = FakeSource::with_sizes(&[(1, 1); 8]);
        source.fail_on = Some(5);
        let palette = palette();
        let options = ExportOptions { jobs: 3, ..Default::default() };

        let err = Exporter::new(&source, &palette)
            .with_options(options)
            .export(temp.path())
            .unwrap_err();
        assert!(matches!(err, ExportError::Frame { index: 5, .. }));
    }

    #[test]
    fn test_cancel_stops_scheduling() {
        let temp = TempDir::new().unwrap();
        let token = CancelToken::new();
        let mut source = FakeSource::with_sizes(&[(1, 1); 5]);
        source.cancel_after_first = Some(token.clone());
        let palette = palette();

        let summary =
            Exporter::new(&source, &palette).with_cancel(token).export(temp.path()).unwrap();

        assert!(summary.cancelled);
        assert!(!summary.is_success());
        assert_eq!(summary.written, vec![temp.path().join("0.png")]);
        assert_eq!(source.renders.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_create_dir_failure() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("file");
        std::fs::write(&blocker, b"not a directory").unwrap();
        let source = FakeSource::with_sizes(&[(1, 1)]);
        let palette = palette();

        let err = Exporter::new(&source, &palette).export(&blocker.join("out")).unwrap_err();
        assert!(matches!(err, ExportError::CreateDir { .. }));
    }
}
