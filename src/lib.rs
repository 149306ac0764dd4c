//! M3U8 Download Task Builder - Core Library
//!
//! Turns a single m3u8/mpd locator or a batch txt file of `name,url` lines into
//! ready-to-run argument lists for the N_m3u8DL-RE downloader.

pub mod core;
pub mod parsers;
pub mod utils;

// Re-export commonly used types
pub use crate::core::{
    config::{AdvancedConfig, AppConfig, DownloadConfig},
    dispatcher::{DownloadService, SubmissionOutcome, TaskSubmitter},
    error_handling::{BatchParseError, BuildResult, TaskBuildError},
    input_classifier::{classify_input, ExtensionLocatorSupport, InputMode, LocatorSupport},
    models::{DownloadTaskSpec, StreamChoices, StreamInfo, StreamSelector, TaskRequest},
    notice::{Notice, NoticeAction, NoticeLevel},
    task_builder::{BuilderConfig, TaskBuildReport, TaskOptionBuilder, ThreadCountRange},
};

pub use utils::file_utils::sanitize_filename;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Initialize the library with default settings
pub fn init() -> anyhow::Result<()> {
    // 重复初始化会被忽略
    utils::logging::init_tracing();

    tracing::info!("📚 {} v{} initialized", NAME, VERSION);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init() {
        assert!(init().is_ok());
        assert!(init().is_ok());
    }

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert!(!NAME.is_empty());
    }
}
