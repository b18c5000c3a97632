//! Rolling file logs for the portal process.
//!
//! # Responsibility
//! - Start one size-rotated flexi_logger backend per process.
//! - Route panics through the log with sanitized payloads.
//!
//! # Invariants
//! - Repeating `init_logging` with the directory already in use is a no-op.
//! - Any other second initialization fails with `AlreadyActive`.
//! - Initialization never panics.

use flexi_logger::{
    Cleanup, Criterion, FileSpec, FlexiLoggerError, Logger, LoggerHandle, Naming, WriteMode,
};
use log::{error, info, LevelFilter};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "hr_portal";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;
const MAX_PANIC_PAYLOAD_CHARS: usize = 160;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();

struct ActiveLogger {
    log_dir: PathBuf,
    _handle: LoggerHandle,
}

pub type LoggingResult<T> = Result<T, LoggingError>;

#[derive(Debug)]
pub enum LoggingError {
    InvalidLevel(String),
    RelativeDir(PathBuf),
    CreateDir { dir: PathBuf, source: std::io::Error },
    Backend(FlexiLoggerError),
    AlreadyActive { active: PathBuf, requested: PathBuf },
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected trace|debug|info|warn|error"
            ),
            Self::RelativeDir(dir) => {
                write!(f, "log directory must be absolute, got `{}`", dir.display())
            }
            Self::CreateDir { dir, source } => {
                write!(f, "failed to create log directory `{}`: {source}", dir.display())
            }
            Self::Backend(err) => write!(f, "failed to start logger: {err}"),
            Self::AlreadyActive { active, requested } => write!(
                f,
                "logging already writes to `{}`; refusing `{}`",
                active.display(),
                requested.display()
            ),
        }
    }
}

impl Error for LoggingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateDir { source, .. } => Some(source),
            Self::Backend(err) => Some(err),
            _ => None,
        }
    }
}

impl From<FlexiLoggerError> for LoggingError {
    fn from(value: FlexiLoggerError) -> Self {
        Self::Backend(value)
    }
}

/// Starts file logging under `log_dir` at `level`.
///
/// # Errors
/// - `InvalidLevel` / `RelativeDir` for bad arguments.
/// - `CreateDir` / `Backend` when the directory or logger cannot be set up.
/// - `AlreadyActive` when logging already writes to another directory.
pub fn init_logging(level: &str, log_dir: &Path) -> LoggingResult<()> {
    let level = parse_level(level)?;
    if !log_dir.is_absolute() {
        return Err(LoggingError::RelativeDir(log_dir.to_path_buf()));
    }

    let active = ACTIVE.get_or_try_init(|| start_logger(level, log_dir))?;
    if active.log_dir != log_dir {
        return Err(LoggingError::AlreadyActive {
            active: active.log_dir.clone(),
            requested: log_dir.to_path_buf(),
        });
    }
    Ok(())
}

/// Level used when the caller does not pick one.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn parse_level(level: &str) -> LoggingResult<LevelFilter> {
    match level.trim().parse::<LevelFilter>() {
        Ok(LevelFilter::Off) | Err(_) => Err(LoggingError::InvalidLevel(level.trim().to_string())),
        Ok(filter) => Ok(filter),
    }
}

fn start_logger(level: LevelFilter, log_dir: &Path) -> LoggingResult<ActiveLogger> {
    std::fs::create_dir_all(log_dir).map_err(|source| LoggingError::CreateDir {
        dir: log_dir.to_path_buf(),
        source,
    })?;

    let handle = Logger::try_with_str(level.to_string().to_ascii_lowercase())?
        .log_to_file(
            FileSpec::default()
                .directory(log_dir)
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()?;

    install_panic_hook();
    info!(
        "event=logging_init module=logging status=ok level={level} log_dir={} version={}",
        log_dir.display(),
        env!("CARGO_PKG_VERSION")
    );

    Ok(ActiveLogger {
        log_dir: log_dir.to_path_buf(),
        _handle: handle,
    })
}

// Runs at most once: only the first successful `start_logger` reaches it.
fn install_panic_hook() {
    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        // Payloads may echo form input.
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = panic_info
            .payload()
            .downcast_ref::<&str>()
            .map(|message| (*message).to_string())
            .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        error!(
            "event=panic_captured module=logging status=error location={location} payload={}",
            sanitize_message(&payload, MAX_PANIC_PAYLOAD_CHARS)
        );
        previous_hook(panic_info);
    }));
}

/// Flattens line breaks and truncates `value` to `max_chars` characters.
fn sanitize_message(value: &str, max_chars: usize) -> String {
    let flattened = value.replace(['\n', '\r'], " ");
    let mut truncated = flattened.chars().take(max_chars).collect::<String>();
    if flattened.chars().count() > max_chars {
        truncated.push_str("...");
    }
    truncated
}

#[cfg(test)]
mod tests {
    use super::{init_logging, parse_level, sanitize_message, LoggingError};
    use log::LevelFilter;
    use std::path::Path;

    #[test]
    fn levels_parse_case_insensitively_and_off_is_refused() {
        assert_eq!(parse_level(" WARN ").expect("warn parses"), LevelFilter::Warn);
        assert!(matches!(parse_level("verbose"), Err(LoggingError::InvalidLevel(_))));
        assert!(matches!(parse_level("off"), Err(LoggingError::InvalidLevel(_))));
    }

    #[test]
    fn panic_payloads_are_flattened_and_capped() {
        let sanitized = sanitize_message("line1\nline2\rline3", 8);
        assert_eq!(sanitized, "line1 li...");
        assert_eq!(sanitize_message("short", 8), "short");
    }

    #[test]
    fn relative_directory_is_rejected_before_init() {
        let err = init_logging("info", Path::new("logs/dev")).expect_err("relative dir");
        assert!(matches!(err, LoggingError::RelativeDir(_)));
    }

    #[test]
    fn second_init_only_accepts_the_active_directory() {
        let log_dir = tempfile::tempdir().expect("temp dir");
        let other_dir = tempfile::tempdir().expect("second temp dir");

        init_logging("info", log_dir.path()).expect("first init should succeed");
        init_logging("debug", log_dir.path()).expect("same directory is a no-op");

        let err = init_logging("info", other_dir.path()).expect_err("other directory");
        assert!(matches!(err, LoggingError::AlreadyActive { .. }));
        assert!(err.to_string().contains("refusing"));
    }
}
