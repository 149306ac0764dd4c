//! 任务提交
//!
//! 检查下载器可用性、构建任务、逐个提交，并把结果汇总为一条 [`Notice`]。

use crate::core::config::AppConfig;
use crate::core::models::{DownloadTaskSpec, TaskRequest};
use crate::core::notice::{Notice, NoticeAction};
use crate::core::task_builder::TaskOptionBuilder;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

const TITLE_FAILED: &str = "Task failed";
const TITLE_CREATED: &str = "Task created";

/// Executes built tasks with the external downloader
#[async_trait]
pub trait DownloadService: Send + Sync {
    /// The downloader binary is configured and usable
    fn is_available(&self) -> bool;

    /// Start one download; returns whether it was accepted
    async fn download(&self, task: &DownloadTaskSpec) -> bool;
}

/// Result of one submission attempt
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubmissionOutcome {
    pub notice: Notice,

    /// Number of tasks handed to the service
    pub submitted: usize,

    /// Every submitted task was accepted
    pub succeeded: bool,

    pub close_dialog: bool,

    /// Clear the input and file name fields
    pub reset_inputs: bool,
}

impl SubmissionOutcome {
    fn rejected(notice: Notice) -> Self {
        Self {
            notice,
            submitted: 0,
            succeeded: false,
            close_dialog: false,
            reset_inputs: false,
        }
    }
}

/// 任务提交器
pub struct TaskSubmitter<S> {
    service: S,
}

impl<S: DownloadService> TaskSubmitter<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// 提交一次添加任务请求
    ///
    /// 所有任务都会被提交，即使前面的任务失败；整体成功当且仅当每个任务都成功。
    pub async fn submit(&self, request: &TaskRequest, config: &AppConfig) -> SubmissionOutcome {
        if !self.service.is_available() {
            warn!("下载器不可用，无法提交任务");
            return SubmissionOutcome::rejected(Notice::error(
                TITLE_FAILED,
                "Please choose N_m3u8DL-RE binary file in setting interface",
            ));
        }

        let builder = TaskOptionBuilder::new(config.locator_support());
        let report = match builder.build_tasks(request, &config.builder_config()) {
            Ok(report) => report,
            Err(e) => {
                error!("任务构建失败: {}", e);
                return SubmissionOutcome::rejected(Notice::error(TITLE_FAILED, e.to_string()));
            }
        };

        if report.is_empty() {
            return SubmissionOutcome::rejected(Notice::warning(
                TITLE_FAILED,
                "No available tasks found, please check the format of txt",
            ));
        }

        let mut succeeded = true;
        for task in &report.tasks {
            debug!("提交任务: {:?}", task.to_args());
            let accepted = self.service.download(task).await;
            if !accepted {
                warn!("任务提交失败: {}", task.source_locator);
            }
            succeeded = accepted && succeeded;
        }

        info!(
            "任务提交完成: 共 {} 个, 结果: {}",
            report.tasks.len(),
            if succeeded { "成功" } else { "失败" }
        );

        if succeeded {
            SubmissionOutcome {
                notice: Notice::success(TITLE_CREATED, "Please check the download task")
                    .with_action(NoticeAction::SwitchToTaskInterface),
                submitted: report.tasks.len(),
                succeeded,
                close_dialog: true,
                reset_inputs: config.download.auto_reset_link,
            }
        } else {
            SubmissionOutcome {
                notice: Notice::error(TITLE_FAILED, "Please check the error log")
                    .with_action(NoticeAction::ShowDownloadLog),
                submitted: report.tasks.len(),
                succeeded,
                close_dialog: false,
                reset_inputs: false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::notice::NoticeLevel;
    use std::sync::Mutex;

    struct FakeService {
        available: bool,
        fail_locators: Vec<String>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeService {
        fn new(available: bool) -> Self {
            Self {
                available,
                fail_locators: Vec::new(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl DownloadService for FakeService {
        fn is_available(&self) -> bool {
            self.available
        }

        async fn download(&self, task: &DownloadTaskSpec) -> bool {
            self.calls.lock().unwrap().push(task.source_locator.clone());
            !self.fail_locators.contains(&task.source_locator)
        }
    }

    fn config() -> AppConfig {
        let mut config = AppConfig::default();
        config.download.save_folder = "/d".to_string();
        config
    }

    #[tokio::test]
    async fn test_unavailable_service_rejects() {
        let submitter = TaskSubmitter::new(FakeService::new(false));
        let request = TaskRequest::new("https://x/video.m3u8", "clip");
        let outcome = submitter.submit(&request, &config()).await;

        assert_eq!(outcome.notice.level, NoticeLevel::Error);
        assert!(outcome.notice.content.contains("N_m3u8DL-RE"));
        assert_eq!(outcome.submitted, 0);
        assert!(submitter.service().calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_single_task_success() {
        let submitter = TaskSubmitter::new(FakeService::new(true));
        let request = TaskRequest::new("https://x/video.m3u8", "clip");
        let mut config = config();
        config.download.auto_reset_link = true;

        let outcome = submitter.submit(&request, &config).await;

        assert!(outcome.succeeded);
        assert_eq!(outcome.submitted, 1);
        assert_eq!(outcome.notice.level, NoticeLevel::Success);
        assert_eq!(
            outcome.notice.action,
            Some(NoticeAction::SwitchToTaskInterface)
        );
        assert!(outcome.close_dialog);
        assert!(outcome.reset_inputs);
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_remaining_tasks() {
        use std::io::Write;

        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        writeln!(file, "A,http://x/a.m3u8").unwrap();
        writeln!(file, "B,http://x/b.m3u8").unwrap();
        writeln!(file, "C,http://x/c.m3u8").unwrap();

        let mut service = FakeService::new(true);
        service.fail_locators = vec!["http://x/a.m3u8".to_string()];
        let submitter = TaskSubmitter::new(service);
        let request = TaskRequest::new(file.path().to_string_lossy(), "");

        let outcome = submitter.submit(&request, &config()).await;

        assert!(!outcome.succeeded);
        assert_eq!(outcome.submitted, 3);
        assert_eq!(outcome.notice.level, NoticeLevel::Error);
        assert_eq!(outcome.notice.action, Some(NoticeAction::ShowDownloadLog));
        assert!(!outcome.close_dialog);
        assert_eq!(
            *submitter.service().calls.lock().unwrap(),
            vec!["http://x/a.m3u8", "http://x/b.m3u8", "http://x/c.m3u8"]
        );
    }

    #[tokio::test]
    async fn test_invalid_input_warns() {
        let submitter = TaskSubmitter::new(FakeService::new(true));
        let request = TaskRequest::new("not a locator", "clip");
        let outcome = submitter.submit(&request, &config()).await;

        assert_eq!(outcome.notice.level, NoticeLevel::Warning);
        assert!(!outcome.close_dialog);
    }

    #[tokio::test]
    async fn test_build_error_is_reported() {
        let submitter = TaskSubmitter::new(FakeService::new(true));
        let request = TaskRequest::new("/definitely/missing/tasks.txt", "");
        let outcome = submitter.submit(&request, &config()).await;

        assert_eq!(outcome.notice.level, NoticeLevel::Error);
        assert!(outcome.notice.action.is_none());
        assert!(outcome.notice.content.contains("tasks.txt"));
    }

    #[test]
    fn test_empty_save_folder_is_reported() {
        let submitter = TaskSubmitter::new(FakeService::new(true));
        let request = TaskRequest::new("https://x/video.m3u8", "clip");
        let mut config = config();
        config.download.save_folder = String::new();

        let outcome = tokio_test::block_on(submitter.submit(&request, &config));
        assert_eq!(outcome.notice.level, NoticeLevel::Error);
        assert!(submitter.service().calls.lock().unwrap().is_empty());
    }
}
