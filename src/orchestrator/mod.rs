//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责并发下载和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_fetcher` - 批量下载器
//! - 控制并发数量（Semaphore）
//! - 单个请求超时
//! - 按任务顺序收集结果
//!
//! ### `merge_assembler` - 合并装配
//! - 按分组键归组
//! - 封面 + 真题 + 结束页拼接
//! - 单个分组失败不影响其他分组
//!
//! ### `download_job` - 下载任务
//! - 持有配置、下载器、封面生成器、运行日志
//! - 串起下载、合并、打包、记录
//!
//! ## 层次关系
//!
//! ```text
//! download_job (处理 DownloadRequest)
//!     ↓
//! batch_fetcher / merge_assembler (处理 Vec<FetchTask> / Vec<FetchResult>)
//!     ↓
//! services (能力层：naming / pdf_merger / cover_page / archive / run_log)
//!     ↓
//! infrastructure (基础设施：PaperSource)
//! ```

pub mod batch_fetcher;
pub mod download_job;
pub mod merge_assembler;

// 重新导出主要类型
pub use batch_fetcher::BatchFetcher;
pub use download_job::{DownloadOutcome, PaperPilot};
pub use merge_assembler::{assemble, group_results, MergeReport};
