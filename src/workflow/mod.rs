pub mod semester_ctx;
pub mod semester_flow;

pub use semester_ctx::SemesterCtx;
pub use semester_flow::SemesterFlow;
