use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "m3u8dl_task_builder=info";

/// File written under the log directory with `local-logging`
pub const LOG_FILE_NAME: &str = "backend.log";

pub fn local_logging_enabled() -> bool {
    cfg!(feature = "local-logging")
}

pub fn resolve_log_dir() -> Result<PathBuf, String> {
    let cwd = std::env::current_dir()
        .map_err(|e| format!("Failed to resolve current directory: {e}"))?;
    Ok(cwd.join("log"))
}

/// Crate filter for a configured level such as `debug`
pub fn filter_for_level(level: &str) -> String {
    format!("m3u8dl_task_builder={}", level.trim().to_lowercase())
}

/// Install the global tracing subscriber; later calls are ignored
pub fn init_tracing() {
    init_tracing_with(DEFAULT_LOG_FILTER);
}

/// Like [`init_tracing`], with a fallback filter used when `RUST_LOG` is unset
pub fn init_tracing_with(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    #[cfg(feature = "local-logging")]
    {
        if let Err(err) = init_file_logging(filter) {
            eprintln!("{err}");
        }
    }

    #[cfg(not(feature = "local-logging"))]
    init_stdout_logging(filter);
}

fn init_stdout_logging(filter: EnvFilter) {
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Log to `./log/backend.log`, falling back to stdout when the directory is unusable
#[cfg(feature = "local-logging")]
fn init_file_logging(filter: EnvFilter) -> Result<(), String> {
    use std::sync::OnceLock;
    use tracing_appender::non_blocking::WorkerGuard;

    static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

    let log_dir = match resolve_log_dir() {
        Ok(dir) => dir,
        Err(err) => {
            init_stdout_logging(filter);
            return Err(err);
        }
    };

    if let Err(err) = std::fs::create_dir_all(&log_dir) {
        init_stdout_logging(filter);
        return Err(format!("Failed to create log directory: {err}"));
    }

    let file_appender = tracing_appender::rolling::never(&log_dir, LOG_FILE_NAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .try_init();
    Ok(())
}
