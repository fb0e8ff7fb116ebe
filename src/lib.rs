//! # JNTUH Results
//!
//! 从成绩公示门户还原学生完整成绩单的 Rust 应用程序。
//! 门户按 (学期, 考试代码, 结果变体) 分别提供 HTML 页面，没有统一接口。
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（HTTP 连接池），只暴露能力
//! - `Fetcher` - 唯一的 client owner，按提交顺序返回页面或"缺失"
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个页面 / 单条记录
//! - `PageParser` - 页面分类与表格提取
//! - `ReferenceResolvers` - 学院 / 专业对照
//! - `TranscriptStore` - 缓存与持久化
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个学期"的完整处理流程
//! - `SemesterCtx` - 上下文封装（准考证号 + 学期）
//! - `SemesterFlow` - 流程编排（fetch → aggregate）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/transcript_service` - 应用入口，分级查询
//! - `orchestrator/transcript_processor` - 单个准考证号的完整运行
//! - `orchestrator/aggregator` - 跨页面聚合与分类
//! - `orchestrator/task_planner` - 任务规划
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult, IncompleteRecord};
pub use infrastructure::{Fetcher, PageSource};
pub use models::{Attempt, SemesterResult, StudentMeta, StudentRecord, SubjectRecord};
pub use orchestrator::{App, Lookup, Source};
pub use workflow::{SemesterCtx, SemesterFlow};
