use crate::error::ConfigError;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 真题文件服务器地址（文件名直接拼在后面）
    pub paper_base_url: String,
    /// 同时进行的下载数量
    pub max_concurrent_downloads: usize,
    /// 单个请求超时（秒）
    pub request_timeout_secs: u64,
    /// 默认封面底图
    pub cover_template_path: PathBuf,
    /// 每份合并文件末尾追加的页面
    pub end_page_path: PathBuf,
    /// 运行日志（JSON）
    pub run_log_file: PathBuf,
    /// 命令行模式下的压缩包输出目录
    pub output_dir: PathBuf,
    /// HTTP 服务监听地址
    pub bind_addr: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paper_base_url:
                "https://pastpapers.papacambridge.com/directories/CAIE/CAIE-pastpapers/upload/"
                    .to_string(),
            max_concurrent_downloads: 12,
            request_timeout_secs: 8,
            cover_template_path: PathBuf::from("template_base.png"),
            end_page_path: PathBuf::from("end.pdf"),
            run_log_file: PathBuf::from("run_log.json"),
            output_dir: PathBuf::from("output"),
            bind_addr: "127.0.0.1:3000".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 从环境变量读取配置，未设置的项使用默认值
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 从任意键值来源读取配置
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();
        let config = Self {
            paper_base_url: lookup("PAPER_BASE_URL").unwrap_or(default.paper_base_url),
            max_concurrent_downloads: parse_var(
                &lookup,
                "MAX_CONCURRENT_DOWNLOADS",
                default.max_concurrent_downloads,
            )?,
            request_timeout_secs: parse_var(
                &lookup,
                "REQUEST_TIMEOUT_SECS",
                default.request_timeout_secs,
            )?,
            cover_template_path: lookup("COVER_TEMPLATE_PATH")
                .map(PathBuf::from)
                .unwrap_or(default.cover_template_path),
            end_page_path: lookup("END_PAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or(default.end_page_path),
            run_log_file: lookup("RUN_LOG_FILE")
                .map(PathBuf::from)
                .unwrap_or(default.run_log_file),
            output_dir: lookup("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.output_dir),
            bind_addr: lookup("BIND_ADDR").unwrap_or(default.bind_addr),
            verbose_logging: parse_var(&lookup, "VERBOSE_LOGGING", default.verbose_logging)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// 校验取值
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent_downloads == 0 {
            return Err(ConfigError::InvalidValue {
                name: "MAX_CONCURRENT_DOWNLOADS".to_string(),
                reason: "必须大于 0".to_string(),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                name: "REQUEST_TIMEOUT_SECS".to_string(),
                reason: "必须大于 0".to_string(),
            });
        }
        if self.paper_base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "PAPER_BASE_URL".to_string(),
                reason: "不能为空".to_string(),
            });
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: name.to_string(),
                value,
                expected_type: std::any::type_name::<T>().to_string(),
            }),
        None => Ok(default),
    }
}
