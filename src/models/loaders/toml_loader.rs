use crate::models::request::{DownloadForm, DownloadRequest};
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

/// 从 TOML 文件加载下载表单
pub async fn load_download_form(toml_file_path: &Path) -> Result<DownloadForm> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取TOML文件: {}", toml_file_path.display()))?;

    let form: DownloadForm = toml::from_str(&content)
        .with_context(|| format!("无法解析TOML文件: {}", toml_file_path.display()))?;

    Ok(form)
}

/// 从 TOML 文件加载并校验下载请求
///
/// 表单里的相对封面路径以 TOML 文件所在目录为基准
pub async fn load_download_request(toml_file_path: &Path) -> Result<DownloadRequest> {
    let form = load_download_form(toml_file_path).await?;
    let request = DownloadRequest::from_form(&form)
        .with_context(|| format!("下载请求无效: {}", toml_file_path.display()))?;

    let cover_image = match &form.cover_image {
        Some(cover_path) => {
            let resolved = if cover_path.is_relative() {
                toml_file_path
                    .parent()
                    .map(|dir| dir.join(cover_path))
                    .unwrap_or_else(|| cover_path.clone())
            } else {
                cover_path.clone()
            };
            tracing::info!("使用自定义封面: {}", resolved.display());
            let bytes = fs::read(&resolved)
                .await
                .with_context(|| format!("无法读取封面图片: {}", resolved.display()))?;
            Some(bytes)
        }
        None => None,
    };

    Ok(request.with_cover_image(cover_image))
}
