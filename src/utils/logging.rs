/// 日志工具模块
///
/// 提供日志初始化和格式化输出的辅助函数
use crate::config::Config;
use crate::models::request::DownloadRequest;
use crate::orchestrator::DownloadOutcome;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化 tracing
///
/// `RUST_LOG` 优先；未设置时按 `verbose` 选择 debug 或 info
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("paper_pilot={}", default_level)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 真题批量下载合并");
    info!("🌐 文件服务器: {}", config.paper_base_url);
    info!(
        "📊 最大并发数: {} / 单个请求超时: {} 秒",
        config.max_concurrent_downloads, config.request_timeout_secs
    );
    info!("{}", "=".repeat(60));
}

/// 记录任务开始信息
///
/// # 参数
/// - `request`: 已校验的下载请求
/// - `total`: 待下载文件数
/// - `max_concurrent`: 最大并发数
pub fn log_job_start(request: &DownloadRequest, total: usize, max_concurrent: usize) {
    info!("\n{}", "=".repeat(60));
    info!(
        "📦 {} {} ({})",
        request.level.label(),
        request.subject_name,
        request.subject_code
    );
    info!(
        "📅 {}-{} / 类型: {} / 试卷: {}",
        request.year_start,
        request.year_end,
        request.paper_type.label(),
        request.papers_selected().join(", ")
    );
    info!("📄 共 {} 个文件，最多同时下载 {} 个", total, max_concurrent);
    info!("{}", "=".repeat(60));
}

/// 打印最终统计信息
pub fn print_final_stats(outcome: &DownloadOutcome) {
    let total = outcome.success_count() + outcome.fail_count();
    info!("\n{}", "=".repeat(60));
    info!("📊 下载完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", outcome.success_count(), total);
    info!("❌ 失败: {}", outcome.fail_count());
    info!("🗂️ 合并文件: {}", outcome.entries.len());
    if !outcome.merge_failures.is_empty() {
        info!("⚠️ 合并失败: {}", outcome.merge_failures.len());
    }
    info!("{}", "=".repeat(60));
    info!("\n压缩包: {} ({} 字节)", outcome.zip_name, outcome.zip_bytes.len());
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("Mathematics", 4), "Math...");
        assert_eq!(truncate_text("数学", 4), "数学");
    }
}
