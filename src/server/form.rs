//! multipart 表单解析

use crate::error::RequestError;
use crate::models::request::DownloadForm;
use axum::extract::Multipart;

/// 读取下载表单，返回表单和上传的封面图片
///
/// `sessions` 可以重复出现，也可以用逗号分隔
pub async fn read_download_form(
    mut multipart: Multipart,
) -> Result<(DownloadForm, Option<Vec<u8>>), RequestError> {
    let mut level = None;
    let mut subject = None;
    let mut alias = None;
    let mut year_start = None;
    let mut year_end = None;
    let mut sessions: Vec<String> = Vec::new();
    let mut paper_type = None;
    let mut papers = String::new();
    let mut cover = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| RequestError::invalid_field("multipart", e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "cover" {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| RequestError::invalid_field("cover", e.body_text()))?;
            cover = Some(bytes.to_vec());
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| RequestError::invalid_field(&name, e.body_text()))?;
        match name.as_str() {
            "level" => level = Some(value),
            "subject" => subject = Some(value),
            "alias" => alias = Some(value),
            "year_start" => year_start = Some(parse_year("year_start", &value)?),
            "year_end" => year_end = Some(parse_year("year_end", &value)?),
            "sessions" => sessions.extend(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
            ),
            "paper_type" => paper_type = Some(value),
            "papers" => papers = value,
            // 未知字段忽略
            _ => {}
        }
    }

    let form = DownloadForm {
        level: required("level", level)?,
        subject: required("subject", subject)?,
        alias,
        year_start: required("year_start", year_start)?,
        year_end: required("year_end", year_end)?,
        sessions,
        paper_type: paper_type.unwrap_or_else(|| "qp".to_string()),
        papers,
        cover_image: None,
    };
    Ok((form, cover))
}

fn parse_year(field: &str, value: &str) -> Result<u16, RequestError> {
    value
        .trim()
        .parse()
        .map_err(|_| RequestError::invalid_field(field, format!("'{}' 不是有效的年份", value)))
}

fn required<T>(field: &str, value: Option<T>) -> Result<T, RequestError> {
    value.ok_or_else(|| RequestError::invalid_field(field, "缺少必填字段"))
}
