//! Terminal Logging Module
//!
//! Provides:
//! - Structured logging to a daily rolling JSON file and pretty stdout (tracing)
//! - Error reports with help text (miette)
//! - Progress bars for corpus builds and batch resolution (indicatif)
//! - Styled summary panels (console)
//! - Automatic terminal capability detection

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use console::{style, Term};
use flate2::write::GzEncoder;
use flate2::Compression;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use miette::Diagnostic;
use supports_color::Stream;
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Layer};

use crate::core::lexicon::paths::get_user_data_dir;

const LOG_FILENAME: &str = "etymon.log";

// ============================================================================
// Global State
// ============================================================================

static TERMINAL_CAPS: OnceLock<TerminalCapabilities> = OnceLock::new();

fn get_terminal_caps() -> &'static TerminalCapabilities {
    TERMINAL_CAPS.get_or_init(TerminalCapabilities::detect)
}

// ============================================================================
// Terminal Capability Detection
// ============================================================================

/// Terminal color support levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorLevel {
    /// 24-bit TrueColor (16.7M colors)
    TrueColor,
    /// 256-color palette
    Ansi256,
    /// 16 ANSI colors
    Ansi16,
    /// No color support
    NoColor,
}

/// Detected terminal capabilities
#[derive(Debug, Clone)]
pub struct TerminalCapabilities {
    pub color_level: ColorLevel,
    pub supports_unicode: bool,
    pub is_interactive: bool,
    pub width: u16,
}

impl TerminalCapabilities {
    /// Detect terminal capabilities from environment
    pub fn detect() -> Self {
        use is_terminal::IsTerminal;

        let color_level = match supports_color::on(Stream::Stdout) {
            Some(support) if support.has_16m => ColorLevel::TrueColor,
            Some(support) if support.has_256 => ColorLevel::Ansi256,
            Some(support) if support.has_basic => ColorLevel::Ansi16,
            _ => ColorLevel::NoColor,
        };

        let is_interactive = io::stdout().is_terminal();
        let width = Term::stdout().size().1;

        // Greek output needs UTF-8; fall back to ASCII borders otherwise
        let supports_unicode = std::env::var("TERM")
            .map(|t| !t.contains("dumb"))
            .unwrap_or(true)
            && std::env::var("LANG")
                .map(|l| l.contains("UTF-8") || l.contains("utf8"))
                .unwrap_or(true);

        Self {
            color_level,
            supports_unicode,
            is_interactive,
            width,
        }
    }

    /// Check if colors should be used
    pub fn should_colorize(&self) -> bool {
        self.is_interactive && self.color_level != ColorLevel::NoColor
    }
}

// ============================================================================
// Logging Initialization
// ============================================================================

/// Directory rolling log files are written to.
pub fn log_dir() -> PathBuf {
    get_user_data_dir()
        .map(|d| d.join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

/// Initialize the logging system.
///
/// This sets up:
/// 1. A stdout logger (pretty formatted with colors).
/// 2. A file logger (JSON formatted) in the app data directory.
/// 3. Redirects standard `log` crate events to `tracing`.
/// 4. Configures miette for error reporting.
///
/// Returns a `WorkerGuard` which must be kept alive for the duration of the
/// run so buffered logs are flushed on shutdown.
pub fn init() -> WorkerGuard {
    let log_dir = log_dir();

    if !log_dir.exists() {
        if let Err(e) = fs::create_dir_all(&log_dir) {
            eprintln!("Failed to create logs directory: {}", e);
        }
    }

    // Daily rotation, no size limit
    let file_appender = tracing_appender::rolling::daily(&log_dir, LOG_FILENAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // File Layer: JSON format for later analysis of a batch
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .json()
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_target(true)
        .with_filter(env_filter.clone());

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout)
        .pretty()
        .with_filter(env_filter);

    let subscriber = tracing_subscriber::registry()
        .with(file_layer)
        .with(stdout_layer);
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to install tracing subscriber: {}", e);
    }

    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("Failed to initialize LogTracer: {}", e);
    }

    init_miette();

    // After init so the compressor's log macros are captured
    let log_dir_clone = log_dir.clone();
    std::thread::spawn(move || {
        compress_old_logs(&log_dir_clone);
    });

    log::info!(
        "Logging initialized. Writing to: {:?} (daily rolling)",
        log_dir.join(LOG_FILENAME)
    );

    guard
}

/// Whether `name` is a rotated log from an earlier day that still needs
/// compressing.
fn is_stale_log(name: &str, today_suffix: &str) -> bool {
    name.starts_with(&format!("{LOG_FILENAME}."))
        && !name.ends_with(today_suffix)
        && !name.ends_with(".gz")
}

/// Compress old log files in the background
fn compress_old_logs(log_dir: &Path) {
    let today_suffix = chrono::Local::now().format("%Y-%m-%d").to_string();

    let Ok(entries) = fs::read_dir(log_dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !is_stale_log(name, &today_suffix) {
            continue;
        }
        match compress_file(&path) {
            Ok(()) => log::info!("Compressed old log: {:?}", path),
            Err(e) => log::warn!("Failed to compress old log {:?}: {}", path, e),
        }
    }
}

fn compress_file(path: &Path) -> io::Result<()> {
    let file = fs::File::open(path)?;
    let mut reader = io::BufReader::new(file);

    let mut gz_path_name = path
        .file_name()
        .ok_or_else(|| io::Error::other("No filename"))?
        .to_os_string();
    gz_path_name.push(".gz");
    let parent_dir = path
        .parent()
        .ok_or_else(|| io::Error::other("No parent directory"))?;
    let gz_path = parent_dir.join(gz_path_name);

    if gz_path.exists() {
        return Ok(());
    }

    let output = fs::File::create(&gz_path)?;
    let mut encoder = GzEncoder::new(output, Compression::default());

    io::copy(&mut reader, &mut encoder)?;
    encoder.finish()?;

    fs::remove_file(path)?;

    Ok(())
}

fn init_miette() {
    let caps = get_terminal_caps();

    miette::set_hook(Box::new(move |_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(caps.color_level == ColorLevel::TrueColor)
                .unicode(caps.supports_unicode)
                .context_lines(3)
                .tab_width(4)
                .break_words(true)
                .color(caps.should_colorize())
                .build(),
        )
    }))
    .ok(); // Ignore if already set
}

// ============================================================================
// Progress Bars (Indicatif Integration)
// ============================================================================

/// Progress bar styles for different operations
pub struct ProgressStyles;

impl ProgressStyles {
    /// Standard progress bar with percentage and ETA
    pub fn default_bar() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) | ETA: {eta}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    /// Spinner for indeterminate operations
    pub fn spinner() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    /// One pipeline stage, e.g. volume parsing
    pub fn pipeline_stage(label: &str) -> ProgressStyle {
        ProgressStyle::default_bar()
            .template(&format!(
                "  {} [{{bar:30.green/white}}] {{pos}}/{{len}} | {{per_sec}} {{msg}}",
                style(label).bold()
            ))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }
}

/// Manager for multiple progress bars. Draws nothing when stdout is not a
/// terminal.
pub struct ProgressManager {
    multi: MultiProgress,
    overall: Option<ProgressBar>,
}

impl ProgressManager {
    pub fn new() -> Self {
        let caps = get_terminal_caps();
        let multi = MultiProgress::new();
        if !caps.is_interactive {
            multi.set_draw_target(ProgressDrawTarget::hidden());
        }

        Self {
            multi,
            overall: None,
        }
    }

    /// A manager that never draws, for tests and piped runs.
    pub fn hidden() -> Self {
        Self {
            multi: MultiProgress::with_draw_target(ProgressDrawTarget::hidden()),
            overall: None,
        }
    }

    /// Set up overall progress tracking
    pub fn set_total(&mut self, total: u64, message: &str) {
        let pb = self.multi.add(ProgressBar::new(total));
        pb.set_style(ProgressStyles::default_bar());
        pb.set_message(message.to_string());
        self.overall = Some(pb);
    }

    /// Add a sub-task progress bar
    pub fn add_task(&self, name: &str, total: u64) -> ProgressBar {
        let pb = self.multi.add(ProgressBar::new(total));
        pb.set_style(ProgressStyles::pipeline_stage(name));
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    /// Add a spinner for indeterminate work
    pub fn add_spinner(&self, message: &str) -> ProgressBar {
        let pb = self.multi.add(ProgressBar::new_spinner());
        pb.set_style(ProgressStyles::spinner());
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    pub fn inc_overall(&self) {
        if let Some(pb) = &self.overall {
            pb.inc(1);
        }
    }

    pub fn finish(&self, message: &str) {
        if let Some(pb) = &self.overall {
            pb.finish_with_message(message.to_string());
        }
    }
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Diagnostic Error Types (miette integration)
// ============================================================================

/// A run-ending failure, shown with a recovery hint.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code("ETYMON::FATAL"))]
pub struct FatalError {
    message: String,

    #[help]
    help_text: Option<String>,
}

impl FatalError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            help_text: None,
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help_text = Some(help.into());
        self
    }

    pub fn help_text(&self) -> Option<&str> {
        self.help_text.as_deref()
    }
}

// ============================================================================
// Console Output Utilities
// ============================================================================

/// Print a styled panel with title and content
pub fn print_panel(title: &str, content: &str) {
    let caps = get_terminal_caps();
    let width = (caps.width as usize).clamp(20, 80);

    let border_char = if caps.supports_unicode { "─" } else { "-" };
    let corner_tl = if caps.supports_unicode { "╭" } else { "+" };
    let corner_tr = if caps.supports_unicode { "╮" } else { "+" };
    let corner_bl = if caps.supports_unicode { "╰" } else { "+" };
    let corner_br = if caps.supports_unicode { "╯" } else { "+" };
    let side = if caps.supports_unicode { "│" } else { "|" };

    let title_display = format!(" {} ", title);
    let border_len = width
        .saturating_sub(console::measure_text_width(&title_display))
        .saturating_sub(2)
        .max(1);
    let top = format!(
        "{}{}{}{}",
        style(corner_tl).cyan(),
        style(&title_display).cyan().bold(),
        style(border_char.repeat(border_len)).cyan(),
        style(corner_tr).cyan()
    );

    let bottom_border_len = width.saturating_sub(2).max(1);
    let bottom = format!(
        "{}{}{}",
        style(corner_bl).cyan(),
        style(border_char.repeat(bottom_border_len)).cyan(),
        style(corner_br).cyan()
    );

    println!("{}", top);
    let content_width = width.saturating_sub(4).max(1);
    for line in content.lines() {
        let padded = console::pad_str(line, content_width, console::Alignment::Left, None);
        println!("{} {} {}", style(side).cyan(), padded, style(side).cyan());
    }
    println!("{}", bottom);
}

fn prefix(unicode: &'static str, ascii: &'static str) -> &'static str {
    if get_terminal_caps().supports_unicode {
        unicode
    } else {
        ascii
    }
}

pub fn print_success(message: &str) {
    println!("{} {}", style(prefix("✓", "[OK]")).green(), style(message).green());
}

pub fn print_warning(message: &str) {
    println!(
        "{} {}",
        style(prefix("⚠", "[WARN]")).yellow(),
        style(message).yellow().bold()
    );
}

pub fn print_info(message: &str) {
    println!("{} {}", style(prefix("ℹ", "[INFO]")).blue(), style(message).blue());
}

// ============================================================================
// Tests
// ============================================================================
