//! 真题文件来源 - 基础设施层
//!
//! 持有 HTTP 客户端，只暴露"GET 一个 URL"的能力

use crate::config::Config;
use crate::error::FetchError;
use std::future::Future;
use std::time::Duration;

/// 一次 GET 的原始响应
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// 文件来源
///
/// 职责：
/// - 发起单个请求
/// - 不认识 FetchTask / 分组
/// - 不判断内容是否是 PDF
pub trait PaperSource: Send + Sync + 'static {
    fn get(&self, url: &str) -> impl Future<Output = Result<RawResponse, FetchError>> + Send;
}

/// 基于 reqwest 的文件来源
#[derive(Debug, Clone)]
pub struct HttpPaperSource {
    client: reqwest::Client,
}

impl HttpPaperSource {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::ClientBuildFailed(e.to_string()))?;
        Ok(Self { client })
    }

    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        Self::new(config.request_timeout())
    }
}

impl PaperSource for HttpPaperSource {
    async fn get(&self, url: &str) -> Result<RawResponse, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::request_failed(url, e))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::request_failed(url, e))?;
        Ok(RawResponse::new(status, body.to_vec()))
    }
}
