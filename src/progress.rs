//! Export progress reporting.
//!
//! Supports console output (with colors) and JSON lines, plus a reporter that
//! discards everything for library use.
//!
//! # Example
//!
//! ```
//! use slp_render::progress::{ConsoleProgress, ProgressEvent, ProgressReporter};
//!
//! let reporter = ConsoleProgress::with_output(std::io::sink());
//! reporter.report(ProgressEvent::ExportStarted { total_frames: 10 });
//! ```

use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Events reported during an export.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Export started
    ExportStarted {
        /// Number of frames in the container
        total_frames: usize,
    },
    /// A frame was written
    FrameWritten {
        /// Frame index
        index: usize,
        /// File the frame was written to
        path: PathBuf,
        /// Render and write time in milliseconds
        duration_ms: u64,
    },
    /// A frame failed to render or write
    FrameFailed {
        /// Frame index
        index: usize,
        /// Error message
        message: String,
    },
    /// Export finished
    ExportCompleted {
        /// Whether every frame was written
        success: bool,
        /// Total duration in milliseconds
        duration_ms: u64,
        /// Frames written
        written: usize,
        /// Frames that failed
        failed: usize,
        /// Whether the export was cancelled before all frames were scheduled
        cancelled: bool,
    },
}

/// Trait for progress reporters.
pub trait ProgressReporter: Send + Sync {
    /// Report a progress event.
    fn report(&self, event: ProgressEvent);
}

/// A progress reporter that discards all events.
#[derive(Debug, Default)]
pub struct NullProgress;

impl NullProgress {
    /// Create a new null progress reporter.
    pub fn new() -> Self {
        Self
    }
}

impl ProgressReporter for NullProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Console progress reporter with optional colors.
pub struct ConsoleProgress {
    /// Whether to use colors
    use_colors: bool,
    /// Whether to print every written frame
    verbose: bool,
    /// Frames finished so far
    current: AtomicUsize,
    /// Total frame count
    total: AtomicUsize,
    /// Output writer (for testing)
    output: Mutex<Box<dyn Write + Send>>,
}

impl std::fmt::Debug for ConsoleProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleProgress")
            .field("use_colors", &self.use_colors)
            .field("verbose", &self.verbose)
            .field("current", &self.current)
            .field("total", &self.total)
            .finish()
    }
}

impl ConsoleProgress {
    /// Create a new console progress reporter writing to stderr.
    pub fn new() -> Self {
        Self {
            use_colors: true,
            verbose: false,
            current: AtomicUsize::new(0),
            total: AtomicUsize::new(0),
            output: Mutex::new(Box::new(std::io::stderr())),
        }
    }

    /// Create a console progress reporter that writes to a custom output.
    pub fn with_output<W: Write + Send + 'static>(output: W) -> Self {
        Self {
            use_colors: false, // Disable colors for custom output
            verbose: false,
            current: AtomicUsize::new(0),
            total: AtomicUsize::new(0),
            output: Mutex::new(Box::new(output)),
        }
    }

    /// Set whether to use colors.
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// Set verbose mode.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn color(&self, text: &str, color: &str) -> String {
        if self.use_colors {
            format!("{}{}\x1b[0m", color, text)
        } else {
            text.to_string()
        }
    }

    fn green(&self, text: &str) -> String {
        self.color(text, "\x1b[32m")
    }

    fn yellow(&self, text: &str) -> String {
        self.color(text, "\x1b[33m")
    }

    fn red(&self, text: &str) -> String {
        self.color(text, "\x1b[31m")
    }

    fn cyan(&self, text: &str) -> String {
        self.color(text, "\x1b[36m")
    }

    fn writeln(&self, line: &str) {
        if let Ok(mut output) = self.output.lock() {
            let _ = writeln!(output, "{}", line);
        }
    }

    /// Bump the finished-frame counter and return `(current, total)`.
    fn advance(&self) -> (usize, usize) {
        let current = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        (current, self.total.load(Ordering::SeqCst))
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for ConsoleProgress {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::ExportStarted { total_frames } => {
                self.total.store(total_frames, Ordering::SeqCst);
                self.current.store(0, Ordering::SeqCst);
                if total_frames > 0 {
                    self.writeln(&format!(
                        "{} Exporting {} frame{}...",
                        self.cyan("[export]"),
                        total_frames,
                        if total_frames == 1 { "" } else { "s" }
                    ));
                }
            }
            ProgressEvent::FrameWritten { index, path, duration_ms } => {
                let (current, total) = self.advance();
                if self.verbose {
                    self.writeln(&format!(
                        "{} [{}/{}] {} frame {} -> {} ({})",
                        self.cyan("[export]"),
                        current,
                        total,
                        self.green("ok"),
                        index,
                        path.display(),
                        format_duration(duration_ms)
                    ));
                }
            }
            ProgressEvent::FrameFailed { index, message } => {
                let (current, total) = self.advance();
                self.writeln(&format!(
                    "{} [{}/{}] {} frame {}",
                    self.cyan("[export]"),
                    current,
                    total,
                    self.red("FAILED"),
                    index
                ));
                self.writeln(&format!("        {}", self.red(&message)));
            }
            ProgressEvent::ExportCompleted { success, duration_ms, written, failed, cancelled } => {
                let duration_str = format_duration(duration_ms);
                if cancelled {
                    self.writeln(&format!(
                        "{} Export cancelled after {} frame{} in {}",
                        self.yellow("[cancelled]"),
                        written,
                        if written == 1 { "" } else { "s" },
                        duration_str
                    ));
                } else if success {
                    self.writeln(&format!(
                        "{} {} frame{} written in {}",
                        self.green("[done]"),
                        written,
                        if written == 1 { "" } else { "s" },
                        duration_str
                    ));
                } else {
                    self.writeln(&format!(
                        "{} Export failed: {} written, {} {} in {}",
                        self.red("[error]"),
                        written,
                        failed,
                        if failed == 1 { "failure" } else { "failures" },
                        duration_str
                    ));
                }
            }
        }
    }
}

/// JSON lines progress reporter for machine-readable output.
pub struct JsonProgress {
    output: Mutex<Box<dyn Write + Send>>,
}

impl std::fmt::Debug for JsonProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonProgress").finish()
    }
}

impl JsonProgress {
    /// Create a new JSON progress reporter writing to stderr.
    pub fn new() -> Self {
        Self { output: Mutex::new(Box::new(std::io::stderr())) }
    }

    /// Create a JSON progress reporter that writes to a custom output.
    pub fn with_output<W: Write + Send + 'static>(output: W) -> Self {
        Self { output: Mutex::new(Box::new(output)) }
    }

    fn write_json(&self, value: serde_json::Value) {
        if let Ok(mut output) = self.output.lock() {
            let _ = writeln!(output, "{}", value);
        }
    }
}

impl Default for JsonProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for JsonProgress {
    fn report(&self, event: ProgressEvent) {
        let value = match event {
            ProgressEvent::ExportStarted { total_frames } => {
                serde_json::json!({ "event": "export_started", "total_frames": total_frames })
            }
            ProgressEvent::FrameWritten { index, path, duration_ms } => serde_json::json!({
                "event": "frame_written",
                "index": index,
                "path": path.display().to_string(),
                "duration_ms": duration_ms,
            }),
            ProgressEvent::FrameFailed { index, message } => serde_json::json!({
                "event": "frame_failed",
                "index": index,
                "error": message,
            }),
            ProgressEvent::ExportCompleted { success, duration_ms, written, failed, cancelled } => {
                serde_json::json!({
                    "event": "export_completed",
                    "success": success,
                    "duration_ms": duration_ms,
                    "written": written,
                    "failed": failed,
                    "cancelled": cancelled,
                })
            }
        };
        self.write_json(value);
    }
}

/// Format a duration in milliseconds to a human-readable string.
fn format_duration(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.1}s", ms as f64 / 1000.0)
    } else {
        let minutes = ms / 60_000;
        let seconds = (ms % 60_000) / 1000;
        format!("{}m {}s", minutes, seconds)
    }
}
