//! User-facing notices raised by task submission

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// Follow-up offered next to a notice
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NoticeAction {
    /// Jump to the task list
    SwitchToTaskInterface,
    /// Open the downloader log
    ShowDownloadLog,
}

impl NoticeAction {
    /// Button text; both follow-ups share the same caption
    pub fn label(&self) -> &'static str {
        "Check"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,

    pub title: String,

    pub content: String,

    pub action: Option<NoticeAction>,
}

impl Notice {
    fn new(level: NoticeLevel, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            content: content.into(),
            action: None,
        }
    }

    pub fn success(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, title, content)
    }

    pub fn warning(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, title, content)
    }

    pub fn error(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, title, content)
    }

    pub fn with_action(mut self, action: NoticeAction) -> Self {
        self.action = Some(action);
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.level {
            NoticeLevel::Success => "SUCCESS",
            NoticeLevel::Warning => "WARNING",
            NoticeLevel::Error => "ERROR",
        };
        write!(f, "[{}] {}: {}", level, self.title, self.content)?;
        if let Some(action) = self.action {
            write!(f, " ({})", action.label())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_builders() {
        let notice = Notice::error("Task failed", "Please check the error log")
            .with_action(NoticeAction::ShowDownloadLog);
        assert!(notice.is_error());
        assert_eq!(notice.action, Some(NoticeAction::ShowDownloadLog));
        assert_eq!(
            notice.to_string(),
            "[ERROR] Task failed: Please check the error log (Check)"
        );

        let notice = Notice::warning("No task", "nothing");
        assert!(!notice.is_error());
        assert_eq!(notice.to_string(), "[WARNING] No task: nothing");
    }
}
