//! Core data models for the task builder

use serde::{Deserialize, Serialize};

/// Selector value that asks the downloader for the best available variant
pub const BEST_SELECTOR: &str = "best";

/// Video resolution reported by a master playlist

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]

pub struct Resolution {
    pub width: u64,

    pub height: u64,
}

/// Stream variant information produced by the manifest prober

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]

pub struct StreamInfo {
    pub resolution: Option<Resolution>,

    pub codecs: Option<String>,

    pub frame_rate: Option<f64>,
}

impl StreamInfo {
    /// Label shown for this variant in the stream picker
    pub fn label(&self) -> String {
        let mut texts = Vec::new();

        if let Some(resolution) = self.resolution {
            texts.push(format!(
                "Resolution: {} × {}",
                resolution.width, resolution.height
            ));
        }

        if let Some(codecs) = &self.codecs {
            texts.push(format!("Codecs: {}", codecs));
        }

        if let Some(frame_rate) = self.frame_rate {
            texts.push(format!("Fps: {:.1}", frame_rate));
        }

        texts.join("; ")
    }
}

/// Ordered stream choices offered to the user after probing

#[derive(Debug, Clone, Default, PartialEq)]

pub struct StreamChoices {
    streams: Vec<StreamInfo>,
}

impl StreamChoices {
    pub fn new(streams: Vec<StreamInfo>) -> Self {
        Self { streams }
    }

    /// Labels in display order; an empty probe result shows a single "Default" entry
    pub fn labels(&self) -> Vec<String> {
        if self.streams.is_empty() {
            return vec!["Default".to_string()];
        }
        self.streams.iter().map(StreamInfo::label).collect()
    }

    /// Number of picker entries, counting the "Default" placeholder
    pub fn len(&self) -> usize {
        self.streams.len().max(1)
    }

    /// No variant was found by the probe
    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    /// Stream to filter on for the given picker index.
    ///
    /// Only a picker with more than one entry yields a filter; a lone variant
    /// is fetched with the `best` selector.
    pub fn selected_stream(&self, index: usize) -> Option<&StreamInfo> {
        if self.streams.len() > 1 {
            self.streams.get(index)
        } else {
            None
        }
    }
}

/// Stream selection passed to the downloader's `--select-video` flag

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]

pub enum StreamSelector {
    Best,

    Filter(String),
}

impl StreamSelector {
    /// Build the selector for an optional chosen stream.
    ///
    /// A chosen stream without resolution or frame rate yields an empty filter,
    /// which is passed through unchanged.
    pub fn from_stream(stream: Option<&StreamInfo>) -> Self {
        let info = match stream {
            Some(info) => info,
            None => return Self::Best,
        };

        let mut clauses = Vec::new();

        if let Some(resolution) = info.resolution {
            clauses.push(format!("res=\"{}*\"", resolution.width));
        }

        let frame_rate = info
            .frame_rate
            .filter(|fps| fps.is_finite() && *fps != 0.0);
        if let Some(frame_rate) = frame_rate {
            clauses.push(format!("frame=\"{}*\"", frame_rate.trunc() as i64));
        }

        Self::Filter(clauses.join(":"))
    }

    pub fn as_arg(&self) -> &str {
        match self {
            Self::Best => BEST_SELECTOR,
            Self::Filter(expr) => expr,
        }
    }
}

/// Command line flags understood by the external downloader

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]

pub enum DownloaderFlag {
    SaveDir,

    TmpDir,

    ThreadCount,

    SelectVideo,

    SaveName,
}

impl DownloaderFlag {
    pub fn flag(&self) -> &'static str {
        match self {
            Self::SaveDir => "--save-dir",
            Self::TmpDir => "--tmp-dir",
            Self::ThreadCount => "--thread-count",
            Self::SelectVideo => "--select-video",
            Self::SaveName => "--save-name",
        }
    }

    /// Flag followed by its value, as two separate arguments
    pub fn command(&self, value: impl ToString) -> [String; 2] {
        [self.flag().to_string(), value.to_string()]
    }
}

/// One fully specified, ready-to-execute download request

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]

pub struct DownloadTaskSpec {
    pub source_locator: String,

    pub output_file_name: String,

    pub save_directory: String,

    pub thread_count: u32,

    pub stream_selector: StreamSelector,
}

impl DownloadTaskSpec {
    /// Argument list for one downloader invocation.
    ///
    /// The locator always comes first; flag order is fixed.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(11);
        args.push(self.source_locator.clone());
        args.extend(DownloaderFlag::SaveDir.command(&self.save_directory));
        args.extend(DownloaderFlag::TmpDir.command(&self.save_directory));
        args.extend(DownloaderFlag::ThreadCount.command(self.thread_count));
        args.extend(DownloaderFlag::SelectVideo.command(self.stream_selector.as_arg()));
        args.extend(DownloaderFlag::SaveName.command(&self.output_file_name));
        args
    }

    /// Printable command line, quoting arguments that contain whitespace or quotes
    pub fn display_command(&self, program: &str) -> String {
        std::iter::once(program.to_string())
            .chain(self.to_args())
            .map(|arg| quote_arg(&arg))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn quote_arg(arg: &str) -> String {
    if arg.is_empty() {
        return "''".to_string();
    }
    if arg.chars().any(|c| c.is_whitespace() || c == '"' || c == '\'') {
        format!("'{}'", arg.replace('\'', "'\\''"))
    } else {
        arg.to_string()
    }
}

/// One `name,url` line of a batch manifest

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]

pub struct BatchEntry {
    pub file_name: String,

    pub url: String,

    // 原始行号（用于错误定位）
    pub line_number: usize,
}

/// User input collected by the add-task form

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]

pub struct TaskRequest {
    /// m3u8/mpd locator or path of a batch txt file
    pub input: String,

    /// File name used in single-locator mode
    pub file_name: String,

    pub selected_stream: Option<StreamInfo>,
}

impl TaskRequest {
    pub fn new(input: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            file_name: file_name.into(),
            selected_stream: None,
        }
    }

    pub fn with_stream(mut self, stream: Option<StreamInfo>) -> Self {
        self.selected_stream = stream;
        self
    }
}
