use crate::error::RequestError;
use phf::phf_map;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 考试级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Level {
    Igcse,
    ALevel,
}

/// IGCSE 科目名 → 科目代码
static IGCSE_SUBJECTS: phf::Map<&'static str, &'static str> = phf_map! {
    "Accounting" => "0452",
    "Additional Mathematics" => "0606",
    "Art and Design" => "0400",
    "Biology" => "0610",
    "Business Studies" => "0450",
    "Chemistry" => "0620",
    "Combined Science" => "0653",
    "Computer Science" => "0478",
    "Co-ordinated Sciences (Double Award)" => "0654",
    "Economics" => "0455",
    "English - First Language" => "0500",
    "English as a Second Language (Speaking Endorsement)" => "0510",
    "Environmental Management" => "0680",
    "French - Foreign Language" => "0520",
    "Geography" => "0460",
    "Global Perspectives" => "0457",
    "History" => "0470",
    "Information and Communication Technology" => "0417",
    "Literature in English" => "0475",
    "Mathematics" => "0580",
    "Physical Education" => "0413",
    "Physics" => "0625",
    "Sociology" => "0495",
    "Travel and Tourism" => "0471",
};

/// A Level 科目名 → 科目代码
static ALEVEL_SUBJECTS: phf::Map<&'static str, &'static str> = phf_map! {
    "Accounting" => "9706",
    "Biology" => "9700",
    "Business" => "9609",
    "Chemistry" => "9701",
    "Computer Science" => "9618",
    "Economics" => "9708",
    "English General Paper" => "8021",
    "Environmental Management" => "8291",
    "Further Mathematics" => "9231",
    "Geography" => "9696",
    "Global Perspectives & Research" => "9239",
    "History" => "9489",
    "Information Technology" => "9626",
    "Law" => "9084",
    "Literature in English" => "9695",
    "Marine Science" => "9693",
    "Mathematics" => "9709",
    "Media Studies" => "9607",
    "Physics" => "9702",
    "Psychology" => "9990",
    "Sociology" => "9699",
    "Thinking Skills" => "9694",
};

/// 科目信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectInfo {
    pub name: String,
    pub code: String,
}

impl Level {
    /// 文件名和封面上使用的名称
    pub fn label(self) -> &'static str {
        match self {
            Level::Igcse => "IGCSE",
            Level::ALevel => "A Level",
        }
    }

    fn table(self) -> &'static phf::Map<&'static str, &'static str> {
        match self {
            Level::Igcse => &IGCSE_SUBJECTS,
            Level::ALevel => &ALEVEL_SUBJECTS,
        }
    }

    /// 按科目名排序的全部科目
    pub fn subjects(self) -> Vec<SubjectInfo> {
        let mut subjects: Vec<SubjectInfo> = self
            .table()
            .entries()
            .map(|(name, code)| SubjectInfo {
                name: name.to_string(),
                code: code.to_string(),
            })
            .collect();
        subjects.sort_by(|a, b| a.name.cmp(&b.name));
        subjects
    }

    /// 按科目名（不区分大小写）或科目代码查找
    pub fn find_subject(self, query: &str) -> Option<SubjectInfo> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }

        if let Some((name, code)) = self.table().get_entry(query) {
            return Some(SubjectInfo {
                name: name.to_string(),
                code: code.to_string(),
            });
        }

        self.table()
            .entries()
            .find(|(name, code)| name.eq_ignore_ascii_case(query) || **code == query)
            .map(|(name, code)| SubjectInfo {
                name: name.to_string(),
                code: code.to_string(),
            })
    }
}

impl FromStr for Level {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect();
        match normalized.as_str() {
            "igcse" => Ok(Level::Igcse),
            "alevel" => Ok(Level::ALevel),
            _ => Err(RequestError::UnknownLevel(s.trim().to_string())),
        }
    }
}

impl TryFrom<String> for Level {
    type Error = RequestError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Level> for String {
    fn from(level: Level) -> Self {
        level.label().to_string()
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
