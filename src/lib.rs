//! # Paper Pilot
//!
//! 批量下载 CAIE 历年真题，按试卷编号合并成带封面的 PDF，并打包为 ZIP
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有 HTTP 客户端，只暴露能力
//! - `PaperSource` - "GET 一个 URL" 的抽象，测试中可替换
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，互相不调用
//! - `naming` - 远程文件名 / URL / 压缩包条目名
//! - `pdf_merger` - 按顺序拼接 PDF
//! - `cover_page` - 生成封面页
//! - `archive` - 写 ZIP
//! - `run_log` - 追加运行日志
//!
//! ### ③ 编排层（Orchestration）
//! - `orchestrator/batch_fetcher` - 并发下载，控制并发数量
//! - `orchestrator/merge_assembler` - 分组合并
//! - `orchestrator/download_job` - 一次完整的下载任务
//!
//! ### ④ 接口层
//! - `server/` - axum HTTP 接口
//! - `main.rs` - 命令行入口（TOML 请求文件）
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod server;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{HttpPaperSource, PaperSource, RawResponse};
pub use models::{load_download_request, DownloadForm, DownloadRequest, Level, PaperType, Session};
pub use orchestrator::{DownloadOutcome, PaperPilot};
pub use server::{router, serve};
