//! 压缩包服务 - 业务能力层
//!
//! 把每份合并好的 PDF 写进同一个 ZIP，任何一步失败都不返回半成品

use crate::error::ArchiveError;
use crate::models::paper::GroupKey;
use std::io::{Cursor, Write};
use tracing::debug;
use zip::write::FileOptions;
use zip::CompressionMethod;

/// 写入压缩包
///
/// `entry_name` 决定每个分组在压缩包中的文件名，空文档跳过
pub fn build_archive<F>(
    documents: &[(GroupKey, Vec<u8>)],
    entry_name: F,
) -> Result<Vec<u8>, ArchiveError>
where
    F: Fn(&GroupKey) -> String,
{
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for (key, bytes) in documents {
        if bytes.is_empty() {
            continue;
        }
        let name = entry_name(key);
        debug!("写入压缩包条目: {} ({} 字节)", name, bytes.len());
        zip.start_file(name.as_str(), options)?;
        zip.write_all(bytes)
            .map_err(|source| ArchiveError::EntryFailed {
                entry: name.clone(),
                source,
            })?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}
