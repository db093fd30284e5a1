//! HTTP 接口
//!
//! 只做表单解析和响应组装，下载逻辑全部委托给 `PaperPilot`

mod form;
mod handlers;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::infrastructure::PaperSource;
use crate::orchestrator::PaperPilot;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tracing::info;

pub use form::read_download_form;

/// 上传封面图片的大小上限
const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

pub struct AppState<S> {
    pilot: Arc<PaperPilot<S>>,
}

// PaperPilot 本身不可 Clone，只复制 Arc
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            pilot: Arc::clone(&self.pilot),
        }
    }
}

pub fn router<S: PaperSource>(pilot: Arc<PaperPilot<S>>) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/api/subjects", get(handlers::subjects))
        .route("/api/papers/normalize", get(handlers::normalize))
        .route("/api/download", post(handlers::download::<S>))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(AppState { pilot })
}

/// 监听 `config.bind_addr` 直到进程退出
pub async fn serve(config: Config) -> AppResult<()> {
    let bind_addr = config.bind_addr.clone();
    let pilot = Arc::new(PaperPilot::from_config(config)?);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| AppError::Task(format!("无法监听 {}: {}", bind_addr, e)))?;
    info!("🌐 HTTP 服务已启动: http://{}", bind_addr);

    axum::serve(listener, router(pilot))
        .await
        .map_err(|e| AppError::Task(format!("HTTP 服务异常退出: {}", e)))
}
