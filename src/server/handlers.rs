use super::form::read_download_form;
use super::AppState;
use crate::error::{AppError, RequestError};
use crate::infrastructure::PaperSource;
use crate::models::request::{normalize_paper_numbers, DownloadRequest};
use crate::models::subject::{Level, SubjectInfo};
use crate::utils::logging::truncate_text;
use axum::extract::{Multipart, Query, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// 接口错误：校验失败 400，其余 500
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<RequestError> for ApiError {
    fn from(e: RequestError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: e.to_string(),
        }
    }
}

impl From<AppError> for ApiError {
    fn from(e: AppError) -> Self {
        let status = if e.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self {
            status,
            message: e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("❌ 请求处理失败: {}", self.message);
        } else {
            debug!("请求被拒绝: {}", self.message);
        }
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

pub async fn healthz() -> &'static str {
    "ok"
}

#[derive(Debug, Deserialize)]
pub struct SubjectsQuery {
    pub level: Option<String>,
}

pub async fn subjects(
    Query(query): Query<SubjectsQuery>,
) -> Result<Json<Vec<SubjectInfo>>, ApiError> {
    let raw = query
        .level
        .ok_or_else(|| RequestError::invalid_field("level", "缺少必填字段"))?;
    let level: Level = raw.parse()?;
    Ok(Json(level.subjects()))
}

#[derive(Debug, Deserialize)]
pub struct NormalizeQuery {
    #[serde(default)]
    pub raw: String,
}

pub async fn normalize(Query(query): Query<NormalizeQuery>) -> Json<Vec<String>> {
    debug!("规范化试卷编号: {}", truncate_text(&query.raw, 40));
    Json(normalize_paper_numbers(&query.raw))
}

pub async fn download<S: PaperSource>(
    State(state): State<AppState<S>>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let (form, cover) = read_download_form(multipart).await?;
    let request = DownloadRequest::from_form(&form)?.with_cover_image(cover);

    let outcome = state.pilot.run(&request).await?;
    if !outcome.failed.is_empty() {
        warn!("⚠️ {} 份文件未下载: {}", outcome.fail_count(), outcome.failed.join(", "));
    }
    for warning in &outcome.warnings {
        warn!("⚠️ {}", warning);
    }

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/zip"),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        header_value(format!("attachment; filename=\"{}\"", outcome.zip_name))?,
    );
    headers.insert("x-papers-downloaded", HeaderValue::from(outcome.success_count()));
    headers.insert("x-papers-failed", HeaderValue::from(outcome.fail_count()));
    headers.insert("x-papers-failed-names", json_header(&outcome.failed)?);
    let merge_failures: Vec<MergeFailureReport> = outcome
        .merge_failures
        .iter()
        .map(|(key, error)| MergeFailureReport {
            paper: key.as_str(),
            error,
        })
        .collect();
    headers.insert("x-merge-failures", json_header(&merge_failures)?);
    headers.insert("x-warnings", json_header(&outcome.warnings)?);

    Ok((StatusCode::OK, headers, outcome.zip_bytes).into_response())
}

/// 合并失败的分组，写进 `x-merge-failures`
#[derive(Debug, Serialize)]
struct MergeFailureReport<'a> {
    paper: &'a str,
    error: &'a str,
}

/// 序列化为只含 ASCII 的 JSON 响应头
///
/// 非 ASCII 字符只会出现在 JSON 字符串里，转成 `\uXXXX` 后仍是同一个 JSON
fn json_header<T: Serialize + ?Sized>(value: &T) -> Result<HeaderValue, ApiError> {
    let json = serde_json::to_string(value).map_err(|e| ApiError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: format!("序列化响应头失败: {}", e),
    })?;
    header_value(escape_non_ascii(&json))
}

fn escape_non_ascii(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{:04x}", unit));
            }
        }
    }
    out
}

fn header_value(value: String) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(&value).map_err(|e| ApiError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: format!("无效的响应头 {}: {}", value, e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_header_is_ascii_and_round_trips() {
        let warnings = vec!["未找到结束页 assets/end.pdf".to_string(), "Résumé 😀".to_string()];
        let value = json_header(&warnings).unwrap();

        let text = value.to_str().unwrap();
        assert!(text.is_ascii());
        let parsed: Vec<String> = serde_json::from_str(text).unwrap();
        assert_eq!(parsed, warnings);
    }

    #[test]
    fn test_empty_list_header() {
        let value = json_header::<[String]>(&[]).unwrap();
        assert_eq!(value, "[]");
    }
}
