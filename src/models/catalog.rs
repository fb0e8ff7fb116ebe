use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::ConfigError;

/// 一个学期及其对应的考试代码（按目录顺序）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemesterCodes {
    pub label: String,
    pub exam_codes: Vec<String>,
}

/// 结果变体：同一考试代码的不同请求形态
///
/// `query` 是查询串模板，支持 `{exam_code}`、`{degree}`、`{htno}` 占位符。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub name: String,
    pub query: String,
    /// 复核 / 复评专用变体，来自此变体的科目一律标记为 revaluation
    #[serde(default)]
    pub revaluation: bool,
}

impl Variant {
    pub fn new(name: &str, query: &str, revaluation: bool) -> Self {
        Self {
            name: name.to_string(),
            query: query.to_string(),
            revaluation,
        }
    }

    /// 填充查询模板
    pub fn render_query(&self, exam_code: &str, degree: &str, hall_ticket: &str) -> String {
        self.query
            .replace("{exam_code}", exam_code)
            .replace("{degree}", degree)
            .replace("{htno}", hall_ticket)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for placeholder in ["{exam_code}", "{htno}"] {
            if !self.query.contains(placeholder) {
                return Err(ConfigError::InvalidVariant {
                    name: self.name.clone(),
                    placeholder,
                });
            }
        }
        Ok(())
    }
}

/// 门户默认的变体顺序：r22 / r18 / r17 常规结果，最后是复核结果
pub fn default_variants() -> Vec<Variant> {
    vec![
        Variant::new(
            "r22",
            "examCode={exam_code}&degree={degree}&etype=r22&type=grade&htno={htno}",
            false,
        ),
        Variant::new(
            "r18",
            "examCode={exam_code}&degree={degree}&etype=r18&type=grade&htno={htno}",
            false,
        ),
        Variant::new(
            "r17",
            "examCode={exam_code}&degree={degree}&etype=r17&type=intgrade&htno={htno}",
            false,
        ),
        Variant::new(
            "rcrv",
            "examCode={exam_code}&degree={degree}&etype=r18&type=grade&result=gradercrv&htno={htno}",
            true,
        ),
    ]
}

/// 考试代码目录
///
/// TOML 中使用 `[[semesters]]` / `[[variants]]` 表数组，天然保持顺序。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamCodeCatalog {
    pub semesters: Vec<SemesterCodes>,
    #[serde(default = "default_variants")]
    pub variants: Vec<Variant>,
}

impl ExamCodeCatalog {
    pub fn new(semesters: Vec<SemesterCodes>, variants: Vec<Variant>) -> Self {
        Self {
            semesters,
            variants,
        }
    }

    pub fn validate(&self, path: &str) -> Result<(), ConfigError> {
        if self.semesters.is_empty() {
            return Err(ConfigError::EmptyCatalog {
                path: path.to_string(),
            });
        }
        if self.variants.is_empty() {
            return Err(ConfigError::NoVariants {
                path: path.to_string(),
            });
        }

        // 同一学期的考试代码必须写在同一个 [[semesters]] 中
        let mut labels = HashSet::new();
        if let Some(dup) = self.semesters.iter().find(|s| !labels.insert(s.label.as_str())) {
            return Err(ConfigError::DuplicateSemester {
                label: dup.label.clone(),
                path: path.to_string(),
            });
        }

        self.variants.iter().try_for_each(Variant::validate)
    }

    pub fn exam_code_count(&self) -> usize {
        self.semesters.iter().map(|s| s.exam_codes.len()).sum()
    }
}
