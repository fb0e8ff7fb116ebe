//! 成绩单处理器 - 编排层
//!
//! 负责单个准考证号的一次完整运行：
//! 1. 规划全部抓取任务
//! 2. 按学期分组，逐个学期执行 SemesterFlow（学期内并发，学期间串行）
//! 3. 用参考数据补全学生信息
//! 4. 组装成绩单并输出统计

use crate::error::IncompleteRecord;
use crate::infrastructure::PageSource;
use crate::models::{ExamCodeCatalog, FetchTask, StudentRecord};
use crate::orchestrator::aggregator::{Aggregator, RunStats};
use crate::orchestrator::task_planner::TaskPlanner;
use crate::services::{PageParser, ReferenceResolvers};
use crate::utils::logging;
use crate::workflow::{SemesterCtx, SemesterFlow};
use std::sync::Arc;

/// 一次运行的结果
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    pub record: Result<StudentRecord, IncompleteRecord>,
    pub stats: RunStats,
}

pub struct TranscriptProcessor<S> {
    planner: TaskPlanner,
    catalog: Arc<ExamCodeCatalog>,
    flow: SemesterFlow<S>,
    references: Arc<ReferenceResolvers>,
    parser: PageParser,
}

impl<S: PageSource> TranscriptProcessor<S> {
    pub fn new(
        planner: TaskPlanner,
        catalog: Arc<ExamCodeCatalog>,
        source: S,
        references: Arc<ReferenceResolvers>,
    ) -> Self {
        Self {
            planner,
            catalog,
            flow: SemesterFlow::new(source),
            references,
            parser: PageParser::new(),
        }
    }

    /// 处理单个准考证号
    ///
    /// 任何单个请求 / 页面的失败都不会中断运行，只有最终无可用成绩单时 `record` 为 Err
    pub async fn process(&self, hall_ticket: &str) -> ProcessOutcome {
        let tasks = self.planner.plan(&self.catalog, hall_ticket);
        let semesters = group_by_semester(tasks);
        let total = semesters.len();

        let mut aggregator = Aggregator::new(self.parser.clone());
        for (idx, tasks) in semesters.into_iter().enumerate() {
            let ctx = SemesterCtx::new(hall_ticket, &tasks[0].semester, idx + 1, total);
            self.flow.run(&ctx, tasks, &mut aggregator).await;
        }

        let stats = aggregator.stats();
        if stats.subjects > 0 {
            self.references
                .enrich(hall_ticket, aggregator.meta_mut())
                .await;
        }

        let record = aggregator.finish(hall_ticket);
        logging::print_final_stats(hall_ticket, &stats, record.is_ok());

        ProcessOutcome { record, stats }
    }
}

/// 相邻的同学期任务归为一组，组内保持原顺序
fn group_by_semester(tasks: Vec<FetchTask>) -> Vec<Vec<FetchTask>> {
    let mut groups: Vec<Vec<FetchTask>> = Vec::new();
    for task in tasks {
        match groups.last_mut() {
            Some(group) if group[0].semester == task.semester => group.push(task),
            _ => groups.push(vec![task]),
        }
    }
    groups
}
