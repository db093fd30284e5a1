use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 请求参数错误
    #[error("请求错误: {0}")]
    Request(#[from] RequestError),
    /// 下载错误
    #[error("下载错误: {0}")]
    Fetch(#[from] FetchError),
    /// PDF 合并错误
    #[error("合并错误: {0}")]
    Merge(#[from] MergeError),
    /// 封面生成错误
    #[error("封面错误: {0}")]
    Cover(#[from] CoverError),
    /// 压缩包写入错误
    #[error("压缩包错误: {0}")]
    Archive(#[from] ArchiveError),
    /// 运行日志错误
    #[error("运行日志错误: {0}")]
    RunLog(#[from] RunLogError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 后台任务异常退出
    #[error("后台任务失败: {0}")]
    Task(String),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 取值不合法
    #[error("配置项 {name} 不合法: {reason}")]
    InvalidValue { name: String, reason: String },
}

/// 请求参数错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("未知的考试级别: {0}")]
    UnknownLevel(String),
    #[error("未知的科目: {subject} ({level})")]
    UnknownSubject { level: String, subject: String },
    #[error("未知的考试季: {0}")]
    UnknownSession(String),
    #[error("未知的试卷类型: {0}")]
    UnknownPaperType(String),
    #[error("年份 {0} 超出范围 [2000, 2030]")]
    YearOutOfRange(u16),
    #[error("起始年份 {start} 晚于结束年份 {end}")]
    InvertedYearRange { start: u16, end: u16 },
    #[error("至少需要选择一个考试季")]
    NoSessions,
    #[error("请至少输入一个试卷编号")]
    NoPaperNumbers,
    #[error("表单字段 {field} 无效: {reason}")]
    InvalidField { field: String, reason: String },
}

/// 单个文件下载错误（只用于日志，最终都归为"缺失"）
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("请求 {url} 失败: {source}")]
    RequestFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("请求 {url} 超时 ({timeout_secs} 秒)")]
    Timeout { url: String, timeout_secs: u64 },
    #[error("无法创建 HTTP 客户端: {0}")]
    ClientBuildFailed(String),
}

/// PDF 合并错误
#[derive(Debug, Error)]
pub enum MergeError {
    /// 输入的第 index 份文档无法解析
    #[error("第 {index} 份文档不是有效的 PDF: {source}")]
    InvalidPart {
        index: usize,
        #[source]
        source: lopdf::Error,
    },
    /// 输入文档缺少页面
    #[error("第 {index} 份文档不包含任何页面")]
    NoPages { index: usize },
    /// 写出合并结果失败
    #[error("写出合并文档失败: {0}")]
    WriteFailed(#[source] lopdf::Error),
    #[error("没有可合并的文档")]
    Empty,
}

/// 封面生成错误
#[derive(Debug, Error)]
pub enum CoverError {
    #[error("读取封面模板 {path} 失败: {source}")]
    TemplateReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("封面图片无法解码: {0}")]
    ImageDecodeFailed(#[source] lopdf::Error),
    #[error("封面图片缺少尺寸信息")]
    MissingDimensions,
    #[error("写出封面失败: {0}")]
    WriteFailed(#[source] lopdf::Error),
}

/// 压缩包写入错误
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("写入压缩包条目 {entry} 失败: {source}")]
    EntryFailed {
        entry: String,
        #[source]
        source: std::io::Error,
    },
    #[error("压缩包写入失败: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// 运行日志错误
#[derive(Debug, Error)]
pub enum RunLogError {
    #[error("读取运行日志 {path} 失败: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("写入运行日志 {path} 失败: {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("运行日志 {path} 格式错误: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("序列化运行日志失败: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 创建目录失败
    #[error("创建目录失败 ({path}): {source}")]
    CreateDirFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建目录错误
    pub fn create_dir_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::CreateDirFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source,
        })
    }

    /// 是否属于用户输入问题（HTTP 层据此返回 400）
    pub fn is_client_error(&self) -> bool {
        matches!(self, AppError::Request(_))
    }
}

impl FetchError {
    /// 创建请求失败错误
    pub fn request_failed(
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        FetchError::RequestFailed {
            url: url.into(),
            source: Box::new(source),
        }
    }
}

impl RequestError {
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        RequestError::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_error_is_client_error() {
        let err: AppError = RequestError::NoSessions.into();
        assert!(err.is_client_error());

        let err: AppError = MergeError::Empty.into();
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_error_message_contains_context() {
        let err = RequestError::InvertedYearRange {
            start: 2025,
            end: 2023,
        };
        let msg = err.to_string();
        assert!(msg.contains("2025"));
        assert!(msg.contains("2023"));
    }
}
