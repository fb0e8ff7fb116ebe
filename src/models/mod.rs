pub mod catalog;
pub mod loaders;
pub mod record;
pub mod task;

pub use catalog::{default_variants, ExamCodeCatalog, SemesterCodes, Variant};
pub use loaders::{load_catalog, parse_catalog};
pub use record::{
    Attempt, SemesterResult, StudentMeta, StudentRecord, SubjectRecord, SubjectRow,
};
pub use task::{FetchTask, PageResult};
