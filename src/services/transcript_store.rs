//! 成绩单存储服务 - 业务能力层
//!
//! 调用方使用的两级存储：进程内缓存 + 磁盘 JSON。核心流程只在两级都未命中时运行。

use crate::error::{AppError, AppResult, FileError};
use crate::models::StudentRecord;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, warn};

/// 成绩单存储
pub trait TranscriptStore: Send + Sync {
    fn lookup(&self, hall_ticket: &str) -> Option<StudentRecord>;
    fn store(&self, hall_ticket: &str, record: &StudentRecord) -> AppResult<()>;
}

/// 进程内缓存
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, StudentRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TranscriptStore for MemoryStore {
    fn lookup(&self, hall_ticket: &str) -> Option<StudentRecord> {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.get(hall_ticket).cloned()
    }

    fn store(&self, hall_ticket: &str, record: &StudentRecord) -> AppResult<()> {
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.insert(hall_ticket.to_string(), record.clone());
        Ok(())
    }
}

/// 磁盘存储：每个准考证号一个 JSON 文件
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, hall_ticket: &str) -> PathBuf {
        self.dir.join(format!("{}.json", hall_ticket))
    }
}

impl TranscriptStore for JsonFileStore {
    fn lookup(&self, hall_ticket: &str) -> Option<StudentRecord> {
        let path = self.path_for(hall_ticket);
        let content = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&content) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("⚠️ 存储文件损坏，忽略 ({}): {}", path.display(), e);
                None
            }
        }
    }

    fn store(&self, hall_ticket: &str, record: &StudentRecord) -> AppResult<()> {
        let dir = self.dir.display().to_string();
        fs::create_dir_all(&self.dir).map_err(|e| AppError::file_write_failed(&dir, e))?;

        let path = self.path_for(hall_ticket);
        let path_str = path.display().to_string();
        let json = serde_json::to_string_pretty(record).map_err(|e| FileError::JsonFailed {
            path: path_str.clone(),
            source: e,
        })?;
        fs::write(&path, json).map_err(|e| AppError::file_write_failed(&path_str, e))?;

        debug!("已写入存储: {}", path_str);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Attempt, SemesterResult, SubjectRecord};

    fn record() -> StudentRecord {
        StudentRecord {
            hall_ticket: "20B81A0501".to_string(),
            name: "RAVI KUMAR".to_string(),
            father_name: None,
            college_code: Some("B8".to_string()),
            college: None,
            branch: None,
            semesters: vec![SemesterResult {
                semester: "1-1".to_string(),
                subjects: vec![SubjectRecord {
                    subject_code: "CS101".to_string(),
                    subject_name: "PPS".to_string(),
                    exam_code: "1001".to_string(),
                    semester: "1-1".to_string(),
                    internal: Some("24".to_string()),
                    external: None,
                    total: None,
                    grade: "A".to_string(),
                    credits: 3.0,
                    attempt: Attempt::Regular,
                }],
            }],
        }
    }

    #[test]
    fn test_json_file_store_persists_records() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested"));

        assert!(store.lookup("20B81A0501").is_none());
        store.store("20B81A0501", &record()).unwrap();

        let reopened = JsonFileStore::new(dir.path().join("nested"));
        assert_eq!(reopened.lookup("20B81A0501"), Some(record()));
    }

    #[test]
    fn test_json_file_store_ignores_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("20B81A0501.json"), "{not json").unwrap();
        let store = JsonFileStore::new(dir.path());
        assert!(store.lookup("20B81A0501").is_none());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert!(store.lookup("20B81A0501").is_none());
        store.store("20B81A0501", &record()).unwrap();
        assert_eq!(store.lookup("20B81A0501").map(|r| r.name), Some("RAVI KUMAR".to_string()));
    }
}
