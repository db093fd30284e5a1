//! 下载任务 - 编排层
//!
//! ## 职责
//!
//! 本模块是一次"下载 + 合并 + 打包"的入口，HTTP 路由和命令行都调用它。
//!
//! ## 核心流程
//!
//! 1. **展开任务**：年份 × 考试季 × 试卷编号
//! 2. **并发下载**：委托 `BatchFetcher`
//! 3. **准备装饰**：结束页、封面底图，缺失时只记录警告
//! 4. **合并打包**：在阻塞线程里合并 PDF 并写入 ZIP
//! 5. **运行日志**：追加一条记录，失败不影响结果
//!
//! ## 设计特点
//!
//! - **无全局状态**：所有资源都由 `PaperPilot` 持有
//! - **部分成功**：下载失败、合并失败、封面失败都不会让整个任务失败

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::infrastructure::{HttpPaperSource, PaperSource};
use crate::models::paper::{FetchResult, GroupKey};
use crate::models::request::DownloadRequest;
use crate::orchestrator::batch_fetcher::BatchFetcher;
use crate::orchestrator::merge_assembler::assemble;
use crate::services::cover_page::{subject_display, CoverBackground, CoverPageGenerator, CoverText};
use crate::services::archive::build_archive;
use crate::services::naming::{archive_name, entry_name};
use crate::services::pdf_merger::page_count;
use crate::services::run_log::{JsonRunLog, RunLogEntry, RunLogSink};
use crate::utils::logging::{log_job_start, print_final_stats};
use chrono::Local;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// 一次下载任务的结果
#[derive(Debug, Clone)]
pub struct DownloadOutcome {
    /// 压缩包文件名
    pub zip_name: String,
    pub zip_bytes: Vec<u8>,
    /// 压缩包中的条目名，按写入顺序
    pub entries: Vec<String>,
    /// 下载成功的远程文件名
    pub downloaded: Vec<String>,
    /// 下载失败的远程文件名
    pub failed: Vec<String>,
    /// 合并失败的分组及原因
    pub merge_failures: Vec<(GroupKey, String)>,
    /// 不影响结果的警告（缺少结束页、封面失败、运行日志写入失败等）
    pub warnings: Vec<String>,
}

impl DownloadOutcome {
    pub fn success_count(&self) -> usize {
        self.downloaded.len()
    }

    pub fn fail_count(&self) -> usize {
        self.failed.len()
    }

    /// 把压缩包写到 `dir/{zip_name}`，目录不存在时创建
    pub async fn save_to(&self, dir: &Path) -> AppResult<PathBuf> {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| AppError::create_dir_failed(dir.display().to_string(), e))?;
        let path = dir.join(&self.zip_name);
        tokio::fs::write(&path, &self.zip_bytes)
            .await
            .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
        Ok(path)
    }
}

/// 真题下载器
pub struct PaperPilot<S> {
    config: Config,
    fetcher: BatchFetcher<S>,
    covers: CoverPageGenerator,
    run_log: Option<Arc<dyn RunLogSink>>,
}

impl PaperPilot<HttpPaperSource> {
    /// 使用 HTTP 来源和 JSON 运行日志
    pub fn from_config(config: Config) -> AppResult<Self> {
        let source = HttpPaperSource::from_config(&config)?;
        let run_log = Arc::new(JsonRunLog::new(config.run_log_file.clone()));
        Ok(Self::new(config, source).with_run_log(run_log))
    }
}

impl<S: PaperSource> PaperPilot<S> {
    /// 不带运行日志
    pub fn new(config: Config, source: S) -> Self {
        let fetcher = BatchFetcher::from_config(source, &config);
        let covers = CoverPageGenerator::from_config(&config);
        Self {
            config,
            fetcher,
            covers,
            run_log: None,
        }
    }

    pub fn with_run_log(mut self, sink: Arc<dyn RunLogSink>) -> Self {
        self.run_log = Some(sink);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 执行一次下载任务
    ///
    /// 只有内部错误（任务崩溃、ZIP 写入失败）才返回 Err；
    /// 一个文件都没下到时返回空压缩包
    pub async fn run(&self, request: &DownloadRequest) -> AppResult<DownloadOutcome> {
        let tasks = request.expand_tasks();
        log_job_start(request, tasks.len(), self.fetcher.concurrency());

        let results = self.fetcher.fetch_all(&tasks).await?;
        let (downloaded, failed) = split_names(&results);

        let mut warnings = Vec::new();
        let decorate = !request.paper_type.is_grade_thresholds() && !downloaded.is_empty();
        let (trailer, background) = if decorate {
            (
                self.load_trailer(&mut warnings).await,
                self.load_background(request, &mut warnings),
            )
        } else {
            (None, None)
        };

        let level = request.level;
        let subject_code = request.subject_code.clone();
        let cover_template = CoverText {
            level_label: level.label().to_string(),
            subject_code: subject_code.clone(),
            subject_display: subject_display(&request.subject_name, request.alias.as_deref()),
            paper_id: String::new(),
        };

        // lopdf 和 zip 都是同步 CPU 密集操作
        let (report, zip_bytes, cover_warnings) = tokio::task::spawn_blocking(move || {
            let mut cover_warnings = Vec::new();
            let report = assemble(
                &results,
                |key| {
                    let background = background.as_ref()?;
                    let text = CoverText {
                        paper_id: key.as_str().to_string(),
                        ..cover_template.clone()
                    };
                    match background.render(&text) {
                        Ok(bytes) => Some(bytes),
                        Err(e) => {
                            warn!("⚠️ 试卷 {} 的封面生成失败: {}", key, e);
                            cover_warnings.push(format!("试卷 {} 的封面生成失败: {}", key, e));
                            None
                        }
                    }
                },
                trailer.as_deref(),
            );
            let zip = build_archive(&report.documents, |key| {
                entry_name(level, &subject_code, key)
            })?;
            Ok::<_, AppError>((report, zip, cover_warnings))
        })
        .await
        .map_err(|e| AppError::Task(e.to_string()))??;
        warnings.extend(cover_warnings);

        let entries = report
            .documents
            .iter()
            .map(|(key, _)| entry_name(level, &request.subject_code, key))
            .collect();
        let merge_failures = report
            .failures
            .into_iter()
            .map(|(key, e)| (key, e.to_string()))
            .collect();

        let mut outcome = DownloadOutcome {
            zip_name: archive_name(level, &request.subject_code),
            zip_bytes,
            entries,
            downloaded,
            failed,
            merge_failures,
            warnings,
        };

        if let Err(warning) = self.record_run(request, &outcome) {
            outcome.warnings.push(warning);
        }
        print_final_stats(&outcome);
        Ok(outcome)
    }

    /// 追加运行日志，失败时返回警告文本
    fn record_run(&self, request: &DownloadRequest, outcome: &DownloadOutcome) -> Result<(), String> {
        let Some(sink) = &self.run_log else {
            return Ok(());
        };
        let entry = RunLogEntry {
            timestamp: Local::now(),
            level: request.level.label().to_string(),
            subject_name: request.subject_name.clone(),
            subject_code: request.subject_code.clone(),
            papers_selected: request.papers_selected(),
            success_count: outcome.success_count(),
            fail_count: outcome.fail_count(),
        };
        sink.append(entry).map_err(|e| {
            warn!("⚠️ 写入运行日志失败: {}", e);
            format!("写入运行日志失败: {}", e)
        })?;
        info!("📝 运行日志已记录");
        Ok(())
    }

    /// 读取结束页；缺失或损坏时返回 None 并记录警告
    async fn load_trailer(&self, warnings: &mut Vec<String>) -> Option<Vec<u8>> {
        let path = &self.config.end_page_path;
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("⚠️ 未找到结束页 {}，跳过", path.display());
                warnings.push(format!("未找到结束页 {}", path.display()));
                return None;
            }
            Err(e) => {
                warn!("⚠️ 读取结束页 {} 失败: {}", path.display(), e);
                warnings.push(format!("读取结束页 {} 失败: {}", path.display(), e));
                return None;
            }
        };
        match page_count(&bytes) {
            Ok(pages) if pages > 0 => Some(bytes),
            Ok(_) => {
                warnings.push(format!("结束页 {} 没有页面", path.display()));
                None
            }
            Err(e) => {
                warn!("⚠️ 结束页 {} 不是有效的 PDF: {}", path.display(), e);
                warnings.push(format!("结束页 {} 不是有效的 PDF: {}", path.display(), e));
                None
            }
        }
    }

    /// 准备封面底图；没有模板或解码失败时返回 None 并记录警告
    fn load_background(
        &self,
        request: &DownloadRequest,
        warnings: &mut Vec<String>,
    ) -> Option<CoverBackground> {
        match self.covers.load_background(request.cover_image.as_deref()) {
            Ok(Some(background)) => Some(background),
            Ok(None) => {
                let path = self.covers.template_path().display();
                warn!("⚠️ 未找到封面模板 {}，跳过封面", path);
                warnings.push(format!("未找到封面模板 {}", path));
                None
            }
            Err(e) => {
                warn!("⚠️ 封面底图不可用: {}", e);
                warnings.push(format!("封面底图不可用: {}", e));
                None
            }
        }
    }
}

fn split_names(results: &[FetchResult]) -> (Vec<String>, Vec<String>) {
    let mut downloaded = Vec::new();
    let mut failed = Vec::new();
    for result in results {
        if result.is_success() {
            downloaded.push(result.filename.clone());
        } else {
            failed.push(result.filename.clone());
        }
    }
    (downloaded, failed)
}
