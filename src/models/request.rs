use crate::error::RequestError;
use crate::models::paper::{FetchTask, PaperType, Session};
use crate::models::subject::Level;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::OnceLock;

/// 允许的年份范围
pub const MIN_YEAR: u16 = 2000;
pub const MAX_YEAR: u16 = 2030;

/// 用户提交的原始表单（来自 TOML 文件或 HTTP 表单）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadForm {
    pub level: String,
    /// 科目名或科目代码
    pub subject: String,
    /// 封面上使用的简称
    #[serde(default)]
    pub alias: Option<String>,
    pub year_start: u16,
    pub year_end: u16,
    #[serde(default = "default_sessions")]
    pub sessions: Vec<String>,
    #[serde(default = "default_paper_type")]
    pub paper_type: String,
    /// 原始试卷编号输入，例如 "11 12 13" 或 "011213"
    #[serde(default)]
    pub papers: String,
    /// 自定义封面图片路径（仅 TOML）
    #[serde(default)]
    pub cover_image: Option<PathBuf>,
}

fn default_sessions() -> Vec<String> {
    vec!["s".to_string(), "w".to_string()]
}

fn default_paper_type() -> String {
    "qp".to_string()
}

/// 校验后的下载请求
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub level: Level,
    pub subject_name: String,
    pub subject_code: String,
    pub alias: Option<String>,
    pub year_start: u16,
    pub year_end: u16,
    pub sessions: Vec<Session>,
    pub paper_type: PaperType,
    /// 规范化后的两位试卷编号；gt 类型为空
    pub paper_numbers: Vec<String>,
    /// 上传的封面图片
    pub cover_image: Option<Vec<u8>>,
}

impl DownloadRequest {
    /// 校验表单并转换为下载请求
    ///
    /// 封面图片由调用方读取后通过 `with_cover_image` 传入
    pub fn from_form(form: &DownloadForm) -> Result<Self, RequestError> {
        let level: Level = form.level.parse()?;
        let subject = level
            .find_subject(&form.subject)
            .ok_or_else(|| RequestError::UnknownSubject {
                level: level.label().to_string(),
                subject: form.subject.trim().to_string(),
            })?;

        for year in [form.year_start, form.year_end] {
            if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
                return Err(RequestError::YearOutOfRange(year));
            }
        }
        if form.year_start > form.year_end {
            return Err(RequestError::InvertedYearRange {
                start: form.year_start,
                end: form.year_end,
            });
        }

        let mut sessions = Vec::new();
        for raw in &form.sessions {
            let session: Session = raw.parse()?;
            if !sessions.contains(&session) {
                sessions.push(session);
            }
        }
        if sessions.is_empty() {
            return Err(RequestError::NoSessions);
        }

        let paper_type: PaperType = form.paper_type.parse()?;
        let paper_numbers = if paper_type.is_grade_thresholds() {
            Vec::new()
        } else {
            let numbers = normalize_paper_numbers(&form.papers);
            if numbers.is_empty() {
                return Err(RequestError::NoPaperNumbers);
            }
            numbers
        };

        let alias = form
            .alias
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string);

        Ok(Self {
            level,
            subject_name: subject.name,
            subject_code: subject.code,
            alias,
            year_start: form.year_start,
            year_end: form.year_end,
            sessions,
            paper_type,
            paper_numbers,
            cover_image: None,
        })
    }

    pub fn with_cover_image(mut self, image: Option<Vec<u8>>) -> Self {
        self.cover_image = image.filter(|bytes| !bytes.is_empty());
        self
    }

    /// 展开为下载任务：年份 × 考试季 × 试卷编号（gt 不含试卷编号）
    pub fn expand_tasks(&self) -> Vec<FetchTask> {
        let mut tasks = Vec::new();
        for year in self.year_start..=self.year_end {
            for &session in &self.sessions {
                if self.paper_type.is_grade_thresholds() {
                    tasks.push(FetchTask::grade_thresholds(
                        &self.subject_code,
                        session,
                        year,
                    ));
                    continue;
                }
                for number in &self.paper_numbers {
                    tasks.push(FetchTask::paper(
                        &self.subject_code,
                        session,
                        year,
                        self.paper_type,
                        number,
                    ));
                }
            }
        }
        tasks
    }

    /// 运行日志中记录的"所选试卷"
    pub fn papers_selected(&self) -> Vec<String> {
        if self.paper_type.is_grade_thresholds() {
            vec![self.paper_type.code().to_string()]
        } else {
            self.paper_numbers.clone()
        }
    }
}

fn non_digit_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\D").expect("静态正则表达式"))
}

/// 规范化试卷编号输入
///
/// 去掉所有非数字字符后每两位一组，末尾多出的一位单独成组，重复编号只保留第一次出现
pub fn normalize_paper_numbers(raw: &str) -> Vec<String> {
    let digits = non_digit_regex().replace_all(raw, "");
    let mut numbers: Vec<String> = Vec::new();
    for chunk in digits.as_bytes().chunks(2) {
        // 只含 ASCII 数字，按字节切分安全
        let number = String::from_utf8_lossy(chunk).into_owned();
        if !numbers.contains(&number) {
            numbers.push(number);
        }
    }
    numbers
}
