//! 学期处理流程 - 流程层
//!
//! 核心职责：定义"一个学期"的完整处理流程
//!
//! 流程顺序：
//! 1. 并发抓取本学期全部任务（输出保持提交顺序）
//! 2. 按顺序交给聚合器解析、去重、合并学生信息
//!
//! 本学期的全部请求结束后才会进入下一个学期。

use crate::infrastructure::PageSource;
use crate::models::FetchTask;
use crate::orchestrator::Aggregator;
use crate::utils::logging;
use crate::workflow::SemesterCtx;

/// 学期处理流程
///
/// - 不持有聚合状态，只借用聚合器
/// - 只依赖页面来源（PageSource）
pub struct SemesterFlow<S> {
    source: S,
}

impl<S: PageSource> SemesterFlow<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// 处理一个学期，返回保留的科目数
    pub async fn run(
        &self,
        ctx: &SemesterCtx,
        tasks: Vec<FetchTask>,
        aggregator: &mut Aggregator,
    ) -> usize {
        logging::log_semester_start(ctx, tasks.len());

        let pages = self.source.fetch_all(tasks).await;
        let subject_count = aggregator.absorb_semester(&ctx.label, pages);

        logging::log_semester_complete(ctx, subject_count);
        subject_count
    }
}
