use crate::error::FetchFailure;
use crate::models::catalog::Variant;

/// 一次抓取任务：(学期, 考试代码, 变体) 三元组及其 URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTask {
    pub semester: String,
    pub exam_code: String,
    pub variant: Variant,
    pub url: String,
}

impl FetchTask {
    pub fn is_revaluation(&self) -> bool {
        self.variant.revaluation
    }
}

impl std::fmt::Display for FetchTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.semester, self.exam_code, self.variant.name
        )
    }
}

/// 抓取结果：页面文本，或带原因的"缺失"
#[derive(Debug, Clone)]
pub struct PageResult {
    pub task: FetchTask,
    pub body: Result<String, FetchFailure>,
}

impl PageResult {
    pub fn page(task: FetchTask, html: impl Into<String>) -> Self {
        Self {
            task,
            body: Ok(html.into()),
        }
    }

    pub fn absent(task: FetchTask, reason: FetchFailure) -> Self {
        Self {
            task,
            body: Err(reason),
        }
    }
}
