//! 运行日志服务 - 业务能力层
//!
//! 每完成一次下载任务追加一条记录，不关心流程

use crate::error::RunLogError;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::debug;

/// 单次运行记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunLogEntry {
    pub timestamp: DateTime<Local>,
    pub level: String,
    pub subject_name: String,
    pub subject_code: String,
    pub papers_selected: Vec<String>,
    pub success_count: usize,
    pub fail_count: usize,
}

/// 日志文件整体结构
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunLog {
    pub total_runs: u64,
    pub logs: Vec<RunLogEntry>,
}

/// 只追加的运行日志接口
pub trait RunLogSink: Send + Sync {
    fn append(&self, entry: RunLogEntry) -> Result<(), RunLogError>;
}

/// 写入 JSON 文件的运行日志
///
/// 每次追加都读出整个文件再写回；同一进程内用锁串行化，多进程同时写不安全
pub struct JsonRunLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonRunLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// 读取当前日志，文件不存在或为空时返回空日志
    pub fn load(&self) -> Result<RunLog, RunLogError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(RunLog::default()),
            Err(source) => {
                return Err(RunLogError::ReadFailed {
                    path: self.path.display().to_string(),
                    source,
                })
            }
        };
        if content.trim().is_empty() {
            return Ok(RunLog::default());
        }
        serde_json::from_str(&content).map_err(|source| RunLogError::Corrupt {
            path: self.path.display().to_string(),
            source,
        })
    }
}

impl RunLogSink for JsonRunLog {
    fn append(&self, entry: RunLogEntry) -> Result<(), RunLogError> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut log = self.load()?;
        log.total_runs += 1;
        log.logs.push(entry);

        let json = serde_json::to_string_pretty(&log).map_err(RunLogError::Serialize)?;
        std::fs::write(&self.path, json).map_err(|source| RunLogError::WriteFailed {
            path: self.path.display().to_string(),
            source,
        })?;

        debug!("运行日志已更新: 共 {} 次运行", log.total_runs);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(success: usize, fail: usize) -> RunLogEntry {
        RunLogEntry {
            timestamp: Local::now(),
            level: "IGCSE".to_string(),
            subject_name: "Mathematics".to_string(),
            subject_code: "0580".to_string(),
            papers_selected: vec!["11".to_string(), "12".to_string()],
            success_count: success,
            fail_count: fail,
        }
    }

    #[test]
    fn test_append_creates_and_extends_file() {
        let dir = tempfile::tempdir().unwrap();
        let log = JsonRunLog::new(dir.path().join("run_log.json"));

        log.append(entry(3, 1)).unwrap();
        log.append(entry(0, 4)).unwrap();

        let loaded = log.load().unwrap();
        assert_eq!(loaded.total_runs, 2);
        assert_eq!(loaded.logs.len(), 2);
        assert_eq!(loaded.logs[0].success_count, 3);
        assert_eq!(loaded.logs[1].fail_count, 4);
    }

    #[test]
    fn test_empty_file_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run_log.json");
        std::fs::write(&path, "  \n").unwrap();

        let log = JsonRunLog::new(&path);
        log.append(entry(1, 0)).unwrap();
        assert_eq!(log.load().unwrap().total_runs, 1);
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run_log.json");
        std::fs::write(&path, "{ not json").unwrap();

        let log = JsonRunLog::new(&path);
        assert!(matches!(
            log.append(entry(1, 0)),
            Err(RunLogError::Corrupt { .. })
        ));
    }

    #[test]
    fn test_json_field_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run_log.json");
        let log = JsonRunLog::new(&path);
        log.append(entry(2, 2)).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["total_runs"], 1);
        assert_eq!(value["logs"][0]["subject_code"], "0580");
        assert_eq!(value["logs"][0]["papers_selected"][1], "12");
    }
}
