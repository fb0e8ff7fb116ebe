//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责任务规划、学期调度和结果聚合，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `task_planner` - 任务规划器
//! - 考试代码目录 × 变体 → 有序的抓取任务
//!
//! ### `aggregator` - 成绩聚合器
//! - 唯一有状态的组件
//! - 学期内按任务顺序去重、标注 regular / supply / revaluation
//! - 全局合并学生信息（先到先得）
//!
//! ### `transcript_processor` - 单个准考证号的处理器
//! - 按学期分组，逐个学期执行 SemesterFlow
//! - 补全参考数据，组装成绩单，输出统计
//!
//! ### `transcript_service` - 应用入口
//! - 初始化资源（目录、抓取器、参考数据、存储）
//! - 分级查询：缓存 → 存储 → 抓取
//!
//! ## 层次关系
//!
//! ```text
//! transcript_service (分级查询)
//!     ↓
//! transcript_processor (处理 Vec<学期>)
//!     ↓
//! workflow::SemesterFlow (处理单个学期)
//!     ↓
//! services (能力层：parser / reference / store)
//!     ↓
//! infrastructure (基础设施：Fetcher)
//! ```

pub mod aggregator;
pub mod task_planner;
pub mod transcript_processor;
pub mod transcript_service;

// 重新导出主要类型
pub use aggregator::{Aggregator, RunStats};
pub use task_planner::TaskPlanner;
pub use transcript_processor::{ProcessOutcome, TranscriptProcessor};
pub use transcript_service::{normalize_hall_ticket, App, Lookup, Source};
