//! 文件命名服务 - 业务能力层
//!
//! 只负责"远程文件名 / URL / 压缩包条目名"的推导，纯函数，没有副作用

use crate::config::Config;
use crate::models::paper::{FetchTask, GroupKey, PaperType, Session};
use crate::models::subject::Level;

/// 推导远程文件名
///
/// - gt: `{科目}_{考试季}{年份}_gt.pdf`，忽略试卷编号
/// - 其他: `{科目}_{考试季}{年份}_{类型}_{编号}.pdf`
pub fn derive_name(
    subject_code: &str,
    session: Session,
    year_suffix: &str,
    paper_type: PaperType,
    paper_number: Option<&str>,
) -> String {
    match (paper_type, paper_number) {
        (PaperType::GradeThresholds, _) | (_, None) => format!(
            "{}_{}{}_{}.pdf",
            subject_code,
            session.letter(),
            year_suffix,
            paper_type.code()
        ),
        (_, Some(number)) => format!(
            "{}_{}{}_{}_{}.pdf",
            subject_code,
            session.letter(),
            year_suffix,
            paper_type.code(),
            number
        ),
    }
}

/// 压缩包中的条目名
pub fn entry_name(level: Level, subject_code: &str, key: &GroupKey) -> String {
    match key {
        GroupKey::Paper(number) => {
            format!("{}_{}_Paper_{}_merged.pdf", level.label(), subject_code, number)
        }
        GroupKey::GradeThresholds => {
            format!("{}_{}_Grade_Thresholds_merged.pdf", level.label(), subject_code)
        }
    }
}

/// 压缩包文件名
pub fn archive_name(level: Level, subject_code: &str) -> String {
    format!("{}_{}_merged_papers.zip", level.label(), subject_code)
}

/// 带服务器地址的命名器
#[derive(Debug, Clone)]
pub struct PaperNaming {
    base_url: String,
}

impl PaperNaming {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.paper_base_url.as_str())
    }

    pub fn file_name(&self, task: &FetchTask) -> String {
        derive_name(
            task.subject_code(),
            task.session(),
            task.year_suffix(),
            task.paper_type(),
            task.paper_number(),
        )
    }

    pub fn url_for_name(&self, file_name: &str) -> String {
        format!("{}/{}", self.base_url, file_name)
    }

    pub fn url(&self, task: &FetchTask) -> String {
        self.url_for_name(&self.file_name(task))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_name_question_paper() {
        assert_eq!(
            derive_name("0580", Session::Summer, "23", PaperType::QuestionPaper, Some("11")),
            "0580_s23_qp_11.pdf"
        );
        assert_eq!(
            derive_name("9702", Session::March, "05", PaperType::Insert, Some("42")),
            "9702_m05_in_42.pdf"
        );
    }

    #[test]
    fn test_derive_name_grade_thresholds_has_no_number() {
        assert_eq!(
            derive_name("0580", Session::Winter, "24", PaperType::GradeThresholds, Some("11")),
            "0580_w24_gt.pdf"
        );
        assert_eq!(
            derive_name("0580", Session::Winter, "24", PaperType::GradeThresholds, None),
            "0580_w24_gt.pdf"
        );
    }

    #[test]
    fn test_url_joins_with_single_slash() {
        let task = FetchTask::paper("0580", Session::Summer, 2023, PaperType::MarkScheme, "12");
        let with_slash = PaperNaming::new("https://files.example.org/upload/");
        let without_slash = PaperNaming::new("https://files.example.org/upload");
        assert_eq!(
            with_slash.url(&task),
            "https://files.example.org/upload/0580_s23_ms_12.pdf"
        );
        assert_eq!(with_slash.url(&task), without_slash.url(&task));
    }

    #[test]
    fn test_entry_and_archive_names() {
        assert_eq!(
            entry_name(Level::Igcse, "0580", &GroupKey::Paper("12".to_string())),
            "IGCSE_0580_Paper_12_merged.pdf"
        );
        assert_eq!(
            entry_name(Level::ALevel, "9709", &GroupKey::GradeThresholds),
            "A Level_9709_Grade_Thresholds_merged.pdf"
        );
        assert_eq!(archive_name(Level::Igcse, "0580"), "IGCSE_0580_merged_papers.zip");
    }
}
