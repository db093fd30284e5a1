//! 批量下载器 - 编排层
//!
//! ## 职责
//!
//! 把一组下载任务并发地交给 `PaperSource`，并按任务顺序收集结果。
//!
//! ## 设计特点
//!
//! - **并发控制**：先拿 Semaphore 许可再 spawn，同时在途的请求不超过上限
//! - **顺序确定**：每个任务的 JoinHandle 就是它的结果槽位，按任务顺序收集
//! - **失败即缺失**：超时、网络错误、非 200、内容不是 PDF 都记为缺失，不重试

use crate::config::Config;
use crate::error::{AppError, AppResult, FetchError};
use crate::infrastructure::{PaperSource, RawResponse};
use crate::models::paper::{FetchResult, FetchTask};
use crate::services::naming::PaperNaming;
use futures::future::join_all;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

/// PDF 文件头
pub const PDF_SIGNATURE: &[u8] = b"%PDF";

/// 批量下载器
pub struct BatchFetcher<S> {
    source: Arc<S>,
    naming: PaperNaming,
    concurrency: usize,
    timeout: Duration,
}

impl<S: PaperSource> BatchFetcher<S> {
    pub fn new(source: S, naming: PaperNaming, concurrency: usize, timeout: Duration) -> Self {
        Self {
            source: Arc::new(source),
            naming,
            concurrency: concurrency.max(1),
            timeout,
        }
    }

    pub fn from_config(source: S, config: &Config) -> Self {
        Self::new(
            source,
            PaperNaming::from_config(config),
            config.max_concurrent_downloads,
            config.request_timeout(),
        )
    }

    pub fn naming(&self) -> &PaperNaming {
        &self.naming
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// 下载全部任务
    ///
    /// 返回的结果与 `tasks` 一一对应、顺序相同
    pub async fn fetch_all(&self, tasks: &[FetchTask]) -> AppResult<Vec<FetchResult>> {
        let total = tasks.len();
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let completed = Arc::new(AtomicUsize::new(0));
        let mut slots = Vec::with_capacity(total);
        let mut handles = Vec::with_capacity(total);

        for task in tasks {
            let filename = self.naming.file_name(task);
            let url = self.naming.url_for_name(&filename);
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| AppError::Task(e.to_string()))?;

            let source = Arc::clone(&self.source);
            let completed = Arc::clone(&completed);
            let timeout = self.timeout;
            let progress_name = filename.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                let payload = fetch_one(source.as_ref(), &url, timeout).await;
                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                log_progress(done, total, &progress_name, payload.is_some());
                payload
            });
            slots.push((task.group_key(), filename));
            handles.push(handle);
        }

        // join_all 保持输入顺序
        let results = join_all(handles)
            .await
            .into_iter()
            .zip(slots)
            .map(|(joined, (key, filename))| {
                let payload = joined.unwrap_or_else(|e| {
                    error!("下载任务异常退出 {}: {}", filename, e);
                    None
                });
                FetchResult {
                    key,
                    filename,
                    payload,
                }
            })
            .collect();

        Ok(results)
    }
}

/// 下载单个文件，任何失败都返回 None
async fn fetch_one<S: PaperSource>(source: &S, url: &str, timeout: Duration) -> Option<Vec<u8>> {
    match tokio::time::timeout(timeout, source.get(url)).await {
        Ok(Ok(response)) => {
            let status = response.status;
            let payload = classify(response);
            if payload.is_none() {
                debug!("响应不是有效的 PDF: {} (状态码 {})", url, status);
            }
            payload
        }
        Ok(Err(e)) => {
            debug!("{}", e);
            None
        }
        Err(_) => {
            let e = FetchError::Timeout {
                url: url.to_string(),
                timeout_secs: timeout.as_secs(),
            };
            debug!("{}", e);
            None
        }
    }
}

/// 只有状态码 200 且内容以 `%PDF` 开头才算下载成功
pub fn classify(response: RawResponse) -> Option<Vec<u8>> {
    if response.status == 200 && response.body.starts_with(PDF_SIGNATURE) {
        Some(response.body)
    } else {
        None
    }
}

fn log_progress(done: usize, total: usize, filename: &str, success: bool) {
    if success {
        info!("[{}/{}] ✅ {}", done, total, filename);
    } else {
        warn!("[{}/{}] ⚠️ 无法下载 {}", done, total, filename);
    }
}
