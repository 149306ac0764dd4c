//! 下载任务构建
//!
//! 将用户输入（单个媒体地址或批量 txt 文件）转换为有序的 [`DownloadTaskSpec`] 列表，
//! 每个任务都带有一组确定的下载器命令行参数。
//!
//! 构建过程不持有可变状态，同样的输入总是得到同样的结果。

use crate::core::batch_parser::{BatchFileParser, ParseStats};
use crate::core::error_handling::{BatchParseError, BuildResult, TaskBuildError};
use crate::core::input_classifier::{classify_input, ExtensionLocatorSupport, InputMode, LocatorSupport};
use crate::core::models::{DownloadTaskSpec, StreamSelector, TaskRequest};
use crate::utils::file_utils::sanitize_filename;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Inclusive range of allowed downloader thread counts
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ThreadCountRange {
    pub min: u32,
    pub max: u32,
}

impl ThreadCountRange {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: u32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Settings shared by every task of one build
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuilderConfig {
    pub save_directory: String,
    pub thread_count: u32,
    pub thread_count_range: ThreadCountRange,
}

impl BuilderConfig {
    pub fn new(
        save_directory: impl Into<String>,
        thread_count: u32,
        thread_count_range: ThreadCountRange,
    ) -> Self {
        Self {
            save_directory: save_directory.into(),
            thread_count,
            thread_count_range,
        }
    }

    /// Validate the config and return the thread count to use.
    ///
    /// An out-of-range thread count is clamped, the same way the thread spin box
    /// bounds its value.
    pub fn validate(&self) -> BuildResult<u32> {
        if self.save_directory.trim().is_empty() {
            return Err(TaskBuildError::config(
                "save directory must not be empty",
                "save_directory",
            ));
        }

        let range = self.thread_count_range;
        if range.min == 0 || range.min > range.max {
            return Err(TaskBuildError::config(
                format!("invalid thread count range {}..={}", range.min, range.max),
                "thread_count_range",
            ));
        }

        if range.contains(self.thread_count) {
            Ok(self.thread_count)
        } else {
            let clamped = self.thread_count.clamp(range.min, range.max);
            warn!(
                "线程数 {} 超出范围 {}..={}，已调整为 {}",
                self.thread_count, range.min, range.max, clamped
            );
            Ok(clamped)
        }
    }
}

/// Outcome of one build: the tasks plus whatever was skipped on the way
#[derive(Debug, Clone, PartialEq)]
pub struct TaskBuildReport {
    pub mode: InputMode,
    pub tasks: Vec<DownloadTaskSpec>,
    /// Batch lines that were not turned into tasks
    pub skipped: Vec<BatchParseError>,
    /// Batch file statistics, present in batch mode
    pub stats: Option<ParseStats>,
}

impl TaskBuildReport {
    fn empty(mode: InputMode) -> Self {
        Self {
            mode,
            tasks: Vec::new(),
            skipped: Vec::new(),
            stats: None,
        }
    }

    /// No task could be produced; callers show a "no tasks found" warning
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Argument lists in task order
    pub fn argument_lists(&self) -> Vec<Vec<String>> {
        self.tasks.iter().map(DownloadTaskSpec::to_args).collect()
    }
}

/// 任务构建器
pub struct TaskOptionBuilder<L = ExtensionLocatorSupport> {
    support: L,
}

impl Default for TaskOptionBuilder<ExtensionLocatorSupport> {
    fn default() -> Self {
        Self::new(ExtensionLocatorSupport::default())
    }
}

impl<L: LocatorSupport> TaskOptionBuilder<L> {
    pub fn new(support: L) -> Self {
        Self { support }
    }

    pub fn support(&self) -> &L {
        &self.support
    }

    pub fn classify(&self, input: &str) -> InputMode {
        classify_input(input, &self.support)
    }

    /// 构建下载任务
    ///
    /// - 配置无效（保存目录为空、线程范围非法）时立即失败，不产生任何任务
    /// - 批量文件无法读取时返回 [`TaskBuildError::FileAccess`]
    /// - 输入既不是媒体地址也不是 txt 文件时返回空报告
    pub fn build_tasks(
        &self,
        request: &TaskRequest,
        config: &BuilderConfig,
    ) -> BuildResult<TaskBuildReport> {
        let thread_count = config.validate()?;
        let stream_selector = StreamSelector::from_stream(request.selected_stream.as_ref());
        debug!("视频流选择: {:?}", stream_selector.as_arg());

        let make_task = |locator: &str, raw_name: &str| DownloadTaskSpec {
            source_locator: locator.to_string(),
            output_file_name: sanitize_filename(raw_name),
            save_directory: config.save_directory.clone(),
            thread_count,
            stream_selector: stream_selector.clone(),
        };

        let input = request.input.trim();
        let mode = self.classify(input);

        let report = match mode {
            InputMode::Single => TaskBuildReport {
                tasks: vec![make_task(input, &request.file_name)],
                ..TaskBuildReport::empty(mode)
            },
            InputMode::Batch => {
                let parsed = BatchFileParser::new(&self.support).parse_file(input)?;
                let tasks = parsed
                    .entries
                    .iter()
                    .map(|entry| make_task(&entry.url, &entry.file_name))
                    .collect();

                TaskBuildReport {
                    mode,
                    tasks,
                    skipped: parsed.skipped,
                    stats: Some(parsed.stats),
                }
            }
            InputMode::Invalid => {
                warn!("输入既不是受支持的媒体地址，也不是 txt 文件: {:?}", input);
                TaskBuildReport::empty(mode)
            }
        };

        info!(
            "任务构建完成: 模式={:?}, 任务数={}, 跳过={}",
            report.mode,
            report.tasks.len(),
            report.skipped.len()
        );
        Ok(report)
    }
}
