use anyhow::{Context, Result};
use paper_pilot::utils::logging;
use paper_pilot::{load_download_request, server, Config, PaperPilot};
use std::path::PathBuf;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env().context("配置无效")?;

    // 初始化日志
    logging::init(config.verbose_logging);
    logging::log_startup(&config);

    match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(request_file) => run_once(config, request_file).await,
        None => server::serve(config).await.context("HTTP 服务启动失败"),
    }
}

/// 命令行模式：执行一个 TOML 请求文件并把压缩包写到输出目录
async fn run_once(config: Config, request_file: PathBuf) -> Result<()> {
    let request = load_download_request(&request_file).await?;
    let output_dir = config.output_dir.clone();
    let pilot = PaperPilot::from_config(config)?;

    let outcome = pilot.run(&request).await?;
    for name in &outcome.failed {
        warn!("❌ 未下载: {}", name);
    }
    for (key, reason) in &outcome.merge_failures {
        warn!("❌ 试卷 {} 合并失败: {}", key, reason);
    }

    let zip_path = outcome.save_to(&output_dir).await?;
    info!("💾 压缩包已保存至: {}", zip_path.display());
    Ok(())
}
