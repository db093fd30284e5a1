//! 合并装配 - 编排层
//!
//! 把下载结果按分组键归组，每组拼成一份 PDF：
//! 封面（可选）+ 该组全部真题（按下载顺序）+ 结束页（可选）。
//! 评分标准（gt）组不加封面和结束页。

use crate::error::MergeError;
use crate::models::paper::{FetchResult, GroupKey};
use crate::services::pdf_merger::merge_documents;
use tracing::{debug, warn};

/// 合并结果
#[derive(Debug, Default)]
pub struct MergeReport {
    /// 成功合并的文档，按分组首次出现的顺序
    pub documents: Vec<(GroupKey, Vec<u8>)>,
    /// 合并失败的分组，不影响其他分组
    pub failures: Vec<(GroupKey, MergeError)>,
}

/// 按分组键归组，只保留下载成功的内容
///
/// 分组顺序为分组键在任务列表中首次出现的顺序（即用户选择试卷编号的顺序），
/// 与哪一份先下载成功无关；没有任何内容的分组被丢弃
pub fn group_results(results: &[FetchResult]) -> Vec<(GroupKey, Vec<&[u8]>)> {
    let mut groups: Vec<(GroupKey, Vec<&[u8]>)> = Vec::new();
    for result in results {
        let index = match groups.iter().position(|(key, _)| *key == result.key) {
            Some(index) => index,
            None => {
                groups.push((result.key.clone(), Vec::new()));
                groups.len() - 1
            }
        };
        if let Some(payload) = result.payload.as_deref() {
            groups[index].1.push(payload);
        }
    }
    groups.retain(|(_, parts)| !parts.is_empty());
    groups
}

/// 合并所有分组
///
/// `cover_for` 只会对非 gt 且至少有一份内容的分组调用
pub fn assemble<F>(results: &[FetchResult], mut cover_for: F, trailer: Option<&[u8]>) -> MergeReport
where
    F: FnMut(&GroupKey) -> Option<Vec<u8>>,
{
    let mut report = MergeReport::default();

    for (key, payloads) in group_results(results) {
        let decorated = !matches!(key, GroupKey::GradeThresholds);
        let cover = if decorated { cover_for(&key) } else { None };

        let mut parts: Vec<&[u8]> = Vec::with_capacity(payloads.len() + 2);
        if let Some(cover) = cover.as_deref() {
            parts.push(cover);
        }
        parts.extend(payloads);
        if decorated {
            if let Some(trailer) = trailer {
                parts.push(trailer);
            }
        }

        match merge_documents(&parts) {
            Ok(bytes) => {
                debug!("分组 {} 合并完成: {} 个部分", key, parts.len());
                report.documents.push((key, bytes));
            }
            Err(e) => {
                warn!("⚠️ 分组 {} 合并失败: {}", key, e);
                report.failures.push((key, e));
            }
        }
    }

    report
}
