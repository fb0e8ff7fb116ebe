use serde::{Deserialize, Serialize};

use crate::error::IncompleteRecord;

/// 学生基本信息，所有字段都是可选的，按页面陆续补全
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentMeta {
    pub name: Option<String>,
    pub father_name: Option<String>,
    pub hall_ticket: Option<String>,
    pub college_code: Option<String>,
    pub college: Option<String>,
    pub branch: Option<String>,
}

impl StudentMeta {
    /// 逐字段合并：已有值的字段永远不会被覆盖，空白值视为缺失
    pub fn merge(&mut self, other: StudentMeta) {
        fill(&mut self.name, other.name);
        fill(&mut self.father_name, other.father_name);
        fill(&mut self.hall_ticket, other.hall_ticket);
        fill(&mut self.college_code, other.college_code);
        fill(&mut self.college, other.college);
        fill(&mut self.branch, other.branch);
    }

    pub fn is_empty(&self) -> bool {
        *self == StudentMeta::default()
    }
}

/// 先到先得：仅当 `slot` 为空且 `value` 非空白时写入
pub(crate) fn fill(slot: &mut Option<String>, value: Option<String>) {
    if slot.is_some() {
        return;
    }
    if let Some(v) = value {
        let v = v.trim();
        if !v.is_empty() {
            *slot = Some(v.to_string());
        }
    }
}

/// 一门科目的考试类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attempt {
    /// 正常考试
    Regular,
    /// 补考
    Supply,
    /// 复核 / 复评
    Revaluation,
}

impl std::fmt::Display for Attempt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Attempt::Regular => "regular",
            Attempt::Supply => "supply",
            Attempt::Revaluation => "revaluation",
        };
        write!(f, "{}", s)
    }
}

/// 页面中解析出的一行科目成绩（尚未标注学期与考试类型）
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectRow {
    pub subject_code: String,
    pub subject_name: String,
    pub internal: Option<String>,
    pub external: Option<String>,
    pub total: Option<String>,
    pub grade: String,
    pub credits: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectRecord {
    pub subject_code: String,
    pub subject_name: String,
    pub exam_code: String,
    pub semester: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<String>,
    pub grade: String,
    pub credits: f32,
    pub attempt: Attempt,
}

impl SubjectRecord {
    pub fn from_row(row: SubjectRow, semester: &str, exam_code: &str, attempt: Attempt) -> Self {
        Self {
            subject_code: row.subject_code,
            subject_name: row.subject_name,
            exam_code: exam_code.to_string(),
            semester: semester.to_string(),
            internal: row.internal,
            external: row.external,
            total: row.total,
            grade: row.grade,
            credits: row.credits,
            attempt,
        }
    }
}

/// 一个学期的成绩，科目顺序即任务下发顺序
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemesterResult {
    pub semester: String,
    pub subjects: Vec<SubjectRecord>,
}

/// 完整成绩单
///
/// 只能通过 [`StudentRecord::assemble`] 构造：至少一个非空学期且姓名已知。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub hall_ticket: String,
    pub name: String,
    pub father_name: Option<String>,
    pub college_code: Option<String>,
    pub college: Option<String>,
    pub branch: Option<String>,
    pub semesters: Vec<SemesterResult>,
}

impl StudentRecord {
    pub fn assemble(
        hall_ticket: &str,
        meta: StudentMeta,
        semesters: Vec<SemesterResult>,
    ) -> Result<Self, IncompleteRecord> {
        let semesters: Vec<SemesterResult> = semesters
            .into_iter()
            .filter(|s| !s.subjects.is_empty())
            .collect();
        if semesters.is_empty() {
            return Err(IncompleteRecord::NoSemesters);
        }
        let name = meta.name.ok_or(IncompleteRecord::MissingName)?;

        Ok(Self {
            hall_ticket: meta.hall_ticket.unwrap_or_else(|| hall_ticket.to_string()),
            name,
            father_name: meta.father_name,
            college_code: meta.college_code,
            college: meta.college,
            branch: meta.branch,
            semesters,
        })
    }

    pub fn subject_count(&self) -> usize {
        self.semesters.iter().map(|s| s.subjects.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(name: Option<&str>, branch: Option<&str>) -> StudentMeta {
        StudentMeta {
            name: name.map(str::to_string),
            branch: branch.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_merge_first_non_null_wins() {
        let mut merged = meta(Some("X"), None);
        merged.merge(meta(None, Some("CSE")));
        assert_eq!(merged, meta(Some("X"), Some("CSE")));

        // 后续页面不会覆盖已有字段
        merged.merge(meta(Some("Y"), Some("ECE")));
        assert_eq!(merged.name.as_deref(), Some("X"));
        assert_eq!(merged.branch.as_deref(), Some("CSE"));
    }

    #[test]
    fn test_merge_ignores_blank_values() {
        let mut fresh = StudentMeta::default();
        fresh.merge(meta(Some("  "), None));
        assert!(fresh.name.is_none());
        fresh.merge(meta(Some(" RAVI "), None));
        assert_eq!(fresh.name.as_deref(), Some("RAVI"));
    }

    fn subject(code: &str) -> SubjectRecord {
        SubjectRecord {
            subject_code: code.to_string(),
            subject_name: "MATHEMATICS".to_string(),
            exam_code: "1001".to_string(),
            semester: "1-1".to_string(),
            internal: None,
            external: None,
            total: None,
            grade: "A".to_string(),
            credits: 4.0,
            attempt: Attempt::Regular,
        }
    }

    #[test]
    fn test_assemble_rejects_empty_semesters() {
        let semesters = vec![SemesterResult {
            semester: "1-1".to_string(),
            subjects: vec![],
        }];
        let result = StudentRecord::assemble("20B81A0501", meta(Some("X"), None), semesters);
        assert_eq!(result, Err(IncompleteRecord::NoSemesters));

        let result = StudentRecord::assemble("20B81A0501", meta(Some("X"), None), vec![]);
        assert_eq!(result, Err(IncompleteRecord::NoSemesters));
    }

    #[test]
    fn test_assemble_requires_name() {
        let semesters = vec![SemesterResult {
            semester: "1-1".to_string(),
            subjects: vec![subject("CS101")],
        }];
        let result = StudentRecord::assemble("20B81A0501", meta(None, Some("CSE")), semesters);
        assert_eq!(result, Err(IncompleteRecord::MissingName));
    }

    #[test]
    fn test_assemble_serializes_camel_case() {
        let semesters = vec![
            SemesterResult {
                semester: "1-1".to_string(),
                subjects: vec![subject("CS101")],
            },
            SemesterResult {
                semester: "1-2".to_string(),
                subjects: vec![],
            },
        ];
        let record =
            StudentRecord::assemble("20B81A0501", meta(Some("X"), None), semesters).unwrap();
        assert_eq!(record.hall_ticket, "20B81A0501");
        assert_eq!(record.semesters.len(), 1);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["hallTicket"], "20B81A0501");
        assert_eq!(json["semesters"][0]["subjects"][0]["subjectCode"], "CS101");
        assert_eq!(json["semesters"][0]["subjects"][0]["attempt"], "regular");
        assert!(json["semesters"][0]["subjects"][0].get("internal").is_none());
    }
}
