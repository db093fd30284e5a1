use crate::error::RequestError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 考试季
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Session {
    /// 3 月（m）
    March,
    /// 夏季（s）
    Summer,
    /// 冬季（w）
    Winter,
}

impl Session {
    /// 文件名中使用的字母
    pub fn letter(self) -> char {
        match self {
            Session::March => 'm',
            Session::Summer => 's',
            Session::Winter => 'w',
        }
    }
}

impl FromStr for Session {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "m" | "march" => Ok(Session::March),
            "s" | "summer" => Ok(Session::Summer),
            "w" | "winter" => Ok(Session::Winter),
            other => Err(RequestError::UnknownSession(other.to_string())),
        }
    }
}

impl TryFrom<String> for Session {
    type Error = RequestError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Session> for String {
    fn from(session: Session) -> Self {
        session.letter().to_string()
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// 试卷类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PaperType {
    /// 试题（qp）
    QuestionPaper,
    /// 评分标准（ms）
    MarkScheme,
    /// 插页（in）
    Insert,
    /// 分数线（gt），按考试季而不是按试卷编号
    GradeThresholds,
}

impl PaperType {
    /// 文件名中使用的代码
    pub fn code(self) -> &'static str {
        match self {
            PaperType::QuestionPaper => "qp",
            PaperType::MarkScheme => "ms",
            PaperType::Insert => "in",
            PaperType::GradeThresholds => "gt",
        }
    }

    /// 表单上显示的名称
    pub fn label(self) -> &'static str {
        match self {
            PaperType::QuestionPaper => "qp (Question Paper)",
            PaperType::MarkScheme => "ms (Mark Scheme)",
            PaperType::Insert => "in (Insert)",
            PaperType::GradeThresholds => "gt (Grade Thresholds)",
        }
    }

    pub fn is_grade_thresholds(self) -> bool {
        self == PaperType::GradeThresholds
    }
}

impl FromStr for PaperType {
    type Err = RequestError;

    /// 支持 "qp" 这样的代码，也支持 "qp (Question Paper)" 这样的表单文本
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.split_whitespace().next().unwrap_or("").to_ascii_lowercase();
        match code.as_str() {
            "qp" => Ok(PaperType::QuestionPaper),
            "ms" => Ok(PaperType::MarkScheme),
            "in" => Ok(PaperType::Insert),
            "gt" => Ok(PaperType::GradeThresholds),
            _ => Err(RequestError::UnknownPaperType(s.trim().to_string())),
        }
    }
}

impl TryFrom<String> for PaperType {
    type Error = RequestError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PaperType> for String {
    fn from(paper_type: PaperType) -> Self {
        paper_type.code().to_string()
    }
}

impl fmt::Display for PaperType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// 分组键：试卷编号，或者统一的分数线分组
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GroupKey {
    Paper(String),
    GradeThresholds,
}

impl GroupKey {
    pub fn as_str(&self) -> &str {
        match self {
            GroupKey::Paper(number) => number,
            GroupKey::GradeThresholds => "gt",
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 一个下载任务
///
/// 只能通过构造函数创建，保证 gt 类型没有试卷编号、其他类型一定有
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTask {
    subject_code: String,
    session: Session,
    year_suffix: String,
    paper_type: PaperType,
    paper_number: Option<String>,
}

impl FetchTask {
    /// 普通试卷任务；传入 gt 时忽略试卷编号
    pub fn paper(
        subject_code: impl Into<String>,
        session: Session,
        year: u16,
        paper_type: PaperType,
        paper_number: impl Into<String>,
    ) -> Self {
        let paper_number = if paper_type.is_grade_thresholds() {
            None
        } else {
            Some(paper_number.into())
        };
        Self {
            subject_code: subject_code.into(),
            session,
            year_suffix: year_suffix(year),
            paper_type,
            paper_number,
        }
    }

    /// 分数线任务
    pub fn grade_thresholds(subject_code: impl Into<String>, session: Session, year: u16) -> Self {
        Self {
            subject_code: subject_code.into(),
            session,
            year_suffix: year_suffix(year),
            paper_type: PaperType::GradeThresholds,
            paper_number: None,
        }
    }

    pub fn subject_code(&self) -> &str {
        &self.subject_code
    }

    pub fn session(&self) -> Session {
        self.session
    }

    pub fn year_suffix(&self) -> &str {
        &self.year_suffix
    }

    pub fn paper_type(&self) -> PaperType {
        self.paper_type
    }

    pub fn paper_number(&self) -> Option<&str> {
        self.paper_number.as_deref()
    }

    /// 结果归属的分组
    pub fn group_key(&self) -> GroupKey {
        match &self.paper_number {
            Some(number) => GroupKey::Paper(number.clone()),
            None => GroupKey::GradeThresholds,
        }
    }
}

/// 单个任务的下载结果
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub key: GroupKey,
    pub filename: String,
    /// None 表示文件不存在、请求失败或内容不是 PDF
    pub payload: Option<Vec<u8>>,
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        self.payload.is_some()
    }
}

/// 年份取后两位
pub fn year_suffix(year: u16) -> String {
    format!("{:02}", year % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paper_type_parses_form_label() {
        assert_eq!(
            "qp (Question Paper)".parse::<PaperType>().unwrap(),
            PaperType::QuestionPaper
        );
        assert_eq!("MS".parse::<PaperType>().unwrap(), PaperType::MarkScheme);
        assert!("xx".parse::<PaperType>().is_err());
    }

    #[test]
    fn test_session_parse() {
        assert_eq!("s".parse::<Session>().unwrap(), Session::Summer);
        assert_eq!(" W ".parse::<Session>().unwrap(), Session::Winter);
        assert_eq!(
            "q".parse::<Session>().unwrap_err(),
            RequestError::UnknownSession("q".to_string())
        );
    }

    #[test]
    fn test_grade_threshold_task_has_no_paper_number() {
        let task = FetchTask::paper("0580", Session::Summer, 2024, PaperType::GradeThresholds, "11");
        assert_eq!(task.paper_number(), None);
        assert_eq!(task.group_key(), GroupKey::GradeThresholds);
        assert_eq!(task.group_key().to_string(), "gt");

        let task = FetchTask::paper("0580", Session::Summer, 2024, PaperType::QuestionPaper, "11");
        assert_eq!(task.paper_number(), Some("11"));
        assert_eq!(task.group_key(), GroupKey::Paper("11".to_string()));
    }

    #[test]
    fn test_year_suffix_is_two_digits() {
        assert_eq!(year_suffix(2023), "23");
        assert_eq!(year_suffix(2005), "05");
    }
}
