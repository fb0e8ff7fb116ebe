//! 任务规划器
//!
//! 把考试代码目录 × 变体展开为有序的抓取任务：先按目录顺序，再按变体顺序。
//! 不做去重，也不过滤不可能的组合（它们只会返回"无成绩"页面）。

use crate::config::Config;
use crate::models::{ExamCodeCatalog, FetchTask};

#[derive(Debug, Clone)]
pub struct TaskPlanner {
    base_url: String,
    degree: String,
}

impl TaskPlanner {
    pub fn new(base_url: impl Into<String>, degree: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            degree: degree.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.base_url, &config.degree)
    }

    pub fn plan(&self, catalog: &ExamCodeCatalog, hall_ticket: &str) -> Vec<FetchTask> {
        let mut tasks = Vec::with_capacity(catalog.exam_code_count() * catalog.variants.len());

        for semester in &catalog.semesters {
            for exam_code in &semester.exam_codes {
                for variant in &catalog.variants {
                    let query = variant.render_query(exam_code, &self.degree, hall_ticket);
                    tasks.push(FetchTask {
                        semester: semester.label.clone(),
                        exam_code: exam_code.clone(),
                        variant: variant.clone(),
                        url: format!("{}?{}", self.base_url, query),
                    });
                }
            }
        }

        tasks
    }
}
