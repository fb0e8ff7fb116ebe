//! 学期处理上下文
//!
//! 封装"我正在处理哪个准考证号的第几个学期"这一信息

use std::fmt::Display;

/// 学期处理上下文
#[derive(Debug, Clone)]
pub struct SemesterCtx {
    /// 准考证号
    pub hall_ticket: String,

    /// 学期标签，例如 "1-1"
    pub label: String,

    /// 学期序号（从1开始，仅用于日志显示）
    pub index: usize,

    /// 学期总数
    pub total: usize,
}

impl SemesterCtx {
    pub fn new(hall_ticket: &str, label: &str, index: usize, total: usize) -> Self {
        Self {
            hall_ticket: hall_ticket.to_string(),
            label: label.to_string(),
            index,
            total,
        }
    }
}

impl Display for SemesterCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{} 学期 {} ({}/{})]",
            self.hall_ticket, self.label, self.index, self.total
        )
    }
}
