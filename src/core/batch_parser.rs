//! 批量任务文件解析模块
//!
//! 解析用户提供的 txt 批量任务文件，每行一个任务，格式为 `文件名,URL`。
//!
//! ## 解析规则
//!
//! - **空行**: 去除首尾空白后为空的行直接跳过
//! - **首个逗号切分**: 只按第一个逗号切分，URL 中后续的逗号原样保留
//! - **无逗号行**: 整行是受支持的媒体地址时视为 URL，文件名取 URL 最后一段
//!   （去掉扩展名）；否则跳过并记录
//! - **编码检测**: 自动识别 UTF-8、UTF-16 (BOM)、GBK 等编码
//! - **顺序保持**: 条目按文件行序输出

use crate::core::error_handling::{BatchParseError, BuildResult, TaskBuildError};
use crate::core::input_classifier::LocatorSupport;
use crate::core::models::BatchEntry;
use crate::utils::encoding::EncodingDetector;
use crate::utils::validation::last_path_segment;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{self, BufRead, Lines, Seek, SeekFrom},
    path::Path,
    time::Instant,
};
use tracing::{debug, error, info, warn};

/// 解析结果统计信息
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParseStats {
    /// 总行数
    pub total_lines: usize,
    /// 成功解析的行数
    pub parsed_lines: usize,
    /// 跳过的行数（空行或错误行）
    pub skipped_lines: usize,
    /// 检测到的文件编码
    pub detected_encoding: String,
    /// 解析耗时（毫秒）
    pub parse_time_ms: u64,
}

/// 单行解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchLine {
    Entry(BatchEntry),
    Skipped(BatchParseError),
}

/// 文件解析结果
#[derive(Debug, Clone, PartialEq)]
pub struct BatchParseResult {
    /// 按行序排列的有效条目
    pub entries: Vec<BatchEntry>,
    /// 被跳过的非空行
    pub skipped: Vec<BatchParseError>,
    pub stats: ParseStats,
}

/// 解析单行内容，空行返回 `None`
pub fn parse_line(
    line: &str,
    line_number: usize,
    support: &dyn LocatorSupport,
) -> Option<Result<BatchEntry, BatchParseError>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let entry = match line.split_once(',') {
        Some((name, url)) => {
            let url = url.trim();
            if url.is_empty() {
                return Some(Err(BatchParseError::EmptyUrl { line_number }));
            }
            BatchEntry {
                file_name: name.trim().to_string(),
                url: url.to_string(),
                line_number,
            }
        }
        None => {
            if !support.is_supported(line) {
                return Some(Err(BatchParseError::UnsupportedLine {
                    line_number,
                    content: line.to_string(),
                }));
            }
            BatchEntry {
                file_name: derive_file_name(line),
                url: line.to_string(),
                line_number,
            }
        }
    };

    Some(Ok(entry))
}

/// 从 URL 最后一段推导文件名（去掉扩展名）
fn derive_file_name(url: &str) -> String {
    let segment = last_path_segment(url).unwrap_or_default();
    match segment.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => segment,
    }
}

/// 惰性逐行解析迭代器
///
/// 每个非空行产生一个 [`BatchLine`]；读取失败时产生 IO 错误并结束。
pub struct BatchEntries<'a, R> {
    lines: Lines<R>,
    support: &'a dyn LocatorSupport,
    line_number: usize,
    blank_lines: usize,
    failed: bool,
}

impl<'a, R: BufRead> BatchEntries<'a, R> {
    pub fn new(reader: R, support: &'a dyn LocatorSupport) -> Self {
        Self {
            lines: reader.lines(),
            support,
            line_number: 0,
            blank_lines: 0,
            failed: false,
        }
    }

    /// 已读取的行数
    pub fn lines_read(&self) -> usize {
        self.line_number
    }

    /// 已跳过的空行数
    pub fn blank_lines(&self) -> usize {
        self.blank_lines
    }
}

impl<R: BufRead> Iterator for BatchEntries<'_, R> {
    type Item = io::Result<BatchLine>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            };
            self.line_number += 1;

            let content = if self.line_number == 1 {
                line.trim_start_matches('\u{feff}')
            } else {
                line.as_str()
            };

            match parse_line(content, self.line_number, self.support) {
                Some(Ok(entry)) => return Some(Ok(BatchLine::Entry(entry))),
                Some(Err(e)) => return Some(Ok(BatchLine::Skipped(e))),
                None => self.blank_lines += 1,
            }
        }
    }
}

/// 批量任务文件解析器
pub struct BatchFileParser<'a> {
    support: &'a dyn LocatorSupport,
    encoding_detector: EncodingDetector,
}

impl<'a> BatchFileParser<'a> {
    /// 创建新的解析器
    pub fn new(support: &'a dyn LocatorSupport) -> Self {
        Self {
            support,
            encoding_detector: EncodingDetector::new(),
        }
    }

    pub fn with_encoding_detector(mut self, detector: EncodingDetector) -> Self {
        self.encoding_detector = detector;
        self
    }

    /// 对任意已解码的文本流进行惰性解析
    pub fn entries<R: BufRead>(&self, reader: R) -> BatchEntries<'a, R> {
        BatchEntries::new(reader, self.support)
    }

    /// 解析批量任务文件
    ///
    /// 文件无法打开或读取时返回 [`TaskBuildError::FileAccess`]，不会当作空文件处理。
    pub fn parse_file<P: AsRef<Path>>(&self, file_path: P) -> BuildResult<BatchParseResult> {
        let path = file_path.as_ref();
        info!("开始解析批量任务文件: {}", path.display());
        let start_time = Instant::now();

        let result = self.parse_file_inner(path, start_time);
        match &result {
            Ok(parsed) => info!(
                "批量任务文件解析完成: 总行数={}, 成功解析={}, 跳过={}, 耗时: {}ms",
                parsed.stats.total_lines,
                parsed.stats.parsed_lines,
                parsed.stats.skipped_lines,
                parsed.stats.parse_time_ms
            ),
            Err(e) => error!("批量任务文件解析失败: {}", e),
        }
        result
    }

    fn parse_file_inner(&self, path: &Path, start_time: Instant) -> BuildResult<BatchParseResult> {
        let access_error = |e: io::Error| TaskBuildError::file_access(path, e);

        let mut file = File::open(path).map_err(access_error)?;
        let encoding = self
            .encoding_detector
            .detect_reader(&mut file)
            .map_err(access_error)?;
        file.seek(SeekFrom::Start(0)).map_err(access_error)?;
        debug!("检测到文件编码: {}", encoding.name());

        let reader = self.encoding_detector.create_decode_reader(file, encoding);
        let mut lines = self.entries(reader);

        let mut entries = Vec::new();
        let mut skipped = Vec::new();

        for line in &mut lines {
            match line.map_err(access_error)? {
                BatchLine::Entry(entry) => {
                    debug!("第{}行: {} -> {}", entry.line_number, entry.file_name, entry.url);
                    entries.push(entry);
                }
                BatchLine::Skipped(e) => {
                    warn!("跳过无效行: {}", e);
                    skipped.push(e);
                }
            }
        }

        let stats = ParseStats {
            total_lines: lines.lines_read(),
            parsed_lines: entries.len(),
            skipped_lines: skipped.len() + lines.blank_lines(),
            detected_encoding: encoding.name().to_string(),
            parse_time_ms: start_time.elapsed().as_millis() as u64,
        };

        Ok(BatchParseResult {
            entries,
            skipped,
            stats,
        })
    }
}
