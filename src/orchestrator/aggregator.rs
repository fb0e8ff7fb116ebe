//! 成绩聚合器
//!
//! 整个流程里唯一有状态的组件：
//! - 学生信息在整次运行内全局合并（先到先得），不按学期重置
//! - 每个学期按任务顺序拼接各页面的科目，单遍扫描标注考试类型：
//!   首次出现为 regular，重复出现为 supply，来自复核变体的一律为 revaluation
//! - 复核科目不占用 regular 名额

use crate::error::IncompleteRecord;
use crate::models::{
    Attempt, PageResult, SemesterResult, StudentMeta, StudentRecord, SubjectRecord,
};
use crate::services::{PageOutcome, PageParser};
use crate::utils::logging::truncate_text;
use std::collections::HashSet;
use tracing::{debug, warn};

/// 页面结果统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// 网络失败 / 超时
    pub absent: usize,
    /// 无成绩页面
    pub no_result: usize,
    /// 结构异常页面
    pub malformed: usize,
    /// 成功解析的页面
    pub parsed: usize,
    /// 最终保留的科目数
    pub subjects: usize,
}

impl RunStats {
    pub fn pages(&self) -> usize {
        self.absent + self.no_result + self.malformed + self.parsed
    }
}

pub struct Aggregator {
    parser: PageParser,
    meta: StudentMeta,
    semesters: Vec<SemesterResult>,
    stats: RunStats,
}

impl Aggregator {
    pub fn new(parser: PageParser) -> Self {
        Self {
            parser,
            meta: StudentMeta::default(),
            semesters: Vec::new(),
            stats: RunStats::default(),
        }
    }

    /// 吸收一个学期的全部页面（必须按任务提交顺序传入）
    ///
    /// 返回该学期保留的科目数。
    pub fn absorb_semester(&mut self, label: &str, pages: Vec<PageResult>) -> usize {
        let mut seen = HashSet::new();
        let mut subjects = Vec::new();

        for page in pages {
            let html = match page.body {
                Ok(html) => html,
                Err(_) => {
                    self.stats.absent += 1;
                    continue;
                }
            };

            let parsed = match self.parser.parse(&html) {
                PageOutcome::Parsed(parsed) => parsed,
                PageOutcome::NoResult => {
                    self.stats.no_result += 1;
                    continue;
                }
                PageOutcome::Malformed(reason) => {
                    warn!("[{}] ⚠️ 页面结构异常，已跳过: {}", page.task, reason);
                    debug!("[{}] 页面片段: {}", page.task, truncate_text(&html, 200));
                    self.stats.malformed += 1;
                    continue;
                }
            };

            self.stats.parsed += 1;
            if let Some(meta) = parsed.meta {
                self.meta.merge(meta);
            }

            debug!(
                "[{}] 解析到 {} 门科目 (丢弃 {} 行)",
                page.task,
                parsed.subjects.len(),
                parsed.dropped_rows
            );

            for row in parsed.subjects {
                let attempt = if page.task.is_revaluation() {
                    Attempt::Revaluation
                } else if seen.insert(row.subject_code.clone()) {
                    Attempt::Regular
                } else {
                    Attempt::Supply
                };
                subjects.push(SubjectRecord::from_row(
                    row,
                    label,
                    &page.task.exam_code,
                    attempt,
                ));
            }
        }

        let count = subjects.len();
        self.stats.subjects += count;
        if count > 0 {
            self.semesters.push(SemesterResult {
                semester: label.to_string(),
                subjects,
            });
        }
        count
    }

    pub fn meta(&self) -> &StudentMeta {
        &self.meta
    }

    pub fn meta_mut(&mut self) -> &mut StudentMeta {
        &mut self.meta
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    /// 组装最终成绩单；没有任何学期或缺少姓名时返回不完整原因
    pub fn finish(self, hall_ticket: &str) -> Result<StudentRecord, IncompleteRecord> {
        StudentRecord::assemble(hall_ticket, self.meta, self.semesters)
    }
}
