use crate::error::{AppError, AppResult, FileError};
use crate::models::catalog::ExamCodeCatalog;
use std::path::Path;
use tokio::fs;

/// 从 TOML 字符串解析考试代码目录
pub fn parse_catalog(content: &str, source: &str) -> AppResult<ExamCodeCatalog> {
    let catalog: ExamCodeCatalog =
        toml::from_str(content).map_err(|e| FileError::TomlParseFailed {
            path: source.to_string(),
            source: e,
        })?;
    catalog.validate(source)?;
    Ok(catalog)
}

/// 从文件加载考试代码目录
pub async fn load_catalog(path: &Path) -> AppResult<ExamCodeCatalog> {
    let path_str = path.display().to_string();
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| AppError::file_read_failed(&path_str, e))?;

    let catalog = parse_catalog(&content, &path_str)?;

    tracing::info!(
        "成功加载考试代码目录: {} 个学期, {} 个考试代码, {} 个变体",
        catalog.semesters.len(),
        catalog.exam_code_count(),
        catalog.variants.len()
    );

    Ok(catalog)
}
