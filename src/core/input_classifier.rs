//! 输入分类
//!
//! 判断用户输入是可直接下载的媒体地址（m3u8/mpd），还是批量任务 txt 文件，
//! 并提供下载按钮可用性判断与拖放文件的接收规则。

use crate::utils::validation::REMOTE_SCHEMES;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;
use url::Url;

/// Suffix of a batch manifest file
pub const BATCH_FILE_SUFFIX: &str = ".txt";

/// Decides whether a string can be handed to the downloader as-is
pub trait LocatorSupport: Send + Sync {
    fn is_supported(&self, locator: &str) -> bool;
}

impl<F> LocatorSupport for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_supported(&self, locator: &str) -> bool {
        self(locator)
    }
}

/// Accepts remote URLs and local paths whose path ends with a known media extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionLocatorSupport {
    extensions: Vec<String>,
}

impl Default for ExtensionLocatorSupport {
    fn default() -> Self {
        Self::new(["m3u8", "mpd"])
    }
}

impl ExtensionLocatorSupport {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|ext| ext.as_ref().trim().trim_start_matches('.').to_lowercase())
                .filter(|ext| !ext.is_empty())
                .collect(),
        }
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    fn has_supported_extension(&self, path: &str) -> bool {
        let path = path.to_lowercase();
        self.extensions
            .iter()
            .any(|ext| path.ends_with(&format!(".{}", ext)))
    }
}

impl LocatorSupport for ExtensionLocatorSupport {
    fn is_supported(&self, locator: &str) -> bool {
        let locator = locator.trim();
        if locator.is_empty() {
            return false;
        }

        match Url::parse(locator) {
            // 单字母 scheme 是 Windows 盘符，按本地路径处理
            Ok(url) if url.scheme().len() > 1 => {
                REMOTE_SCHEMES.contains(&url.scheme()) && self.has_supported_extension(url.path())
            }
            _ => {
                let path = locator.split(|c| c == '?' || c == '#').next().unwrap_or("");
                self.has_supported_extension(path)
            }
        }
    }
}

/// How an input string is turned into tasks
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum InputMode {
    /// A single m3u8/mpd locator
    Single,
    /// A txt file of `name,url` lines
    Batch,
    /// Neither; no task can be produced
    Invalid,
}

pub fn is_direct_media_locator(input: &str, support: &dyn LocatorSupport) -> bool {
    let input = input.trim();
    !input.is_empty() && support.is_supported(input)
}

pub fn is_batch_manifest_path(input: &str) -> bool {
    input
        .trim()
        .to_lowercase()
        .ends_with(BATCH_FILE_SUFFIX)
}

/// 判断输入模式：直链优先，其次是 txt 批量文件
pub fn classify_input(input: &str, support: &dyn LocatorSupport) -> InputMode {
    let mode = if is_direct_media_locator(input, support) {
        InputMode::Single
    } else if is_batch_manifest_path(input) {
        InputMode::Batch
    } else {
        InputMode::Invalid
    };

    debug!("输入分类: {:?} -> {:?}", input.trim(), mode);
    mode
}

/// 下载按钮是否可用：直链需要同时填写文件名，txt 文件则不需要
pub fn can_submit(input: &str, file_name: &str, support: &dyn LocatorSupport) -> bool {
    (is_direct_media_locator(input, support) && !file_name.is_empty())
        || is_batch_manifest_path(input)
}

/// 接收拖放的文件：只接受已存在的 txt 文件，返回其绝对路径
pub fn accept_dropped_path(path: &Path) -> Option<String> {
    if !path.is_file() {
        return None;
    }

    // 不解析符号链接，按拖入的路径本身判断后缀
    let absolute = std::path::absolute(path).ok()?;
    let absolute = absolute.to_string_lossy().into_owned();
    if is_batch_manifest_path(&absolute) {
        Some(absolute)
    } else {
        None
    }
}
