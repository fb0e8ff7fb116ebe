//! 参考数据服务 - 业务能力层
//!
//! - 学院代码 → 学院名称：从表格文档解析，进程内只加载一次
//! - 准考证号 → 专业名称：取准考证号固定位置的专业代码查静态表
//!
//! 查不到时一律返回 None，不会中断流程。

use crate::models::record::fill;
use crate::models::StudentMeta;
use crate::services::page_parser::table_grids;
use phf::phf_map;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, warn};

/// 准考证号第 7-8 位的专业代码
static BRANCH_CODES: phf::Map<&'static str, &'static str> = phf_map! {
    "01" => "CIVIL ENGINEERING",
    "02" => "ELECTRICAL AND ELECTRONICS ENGINEERING",
    "03" => "MECHANICAL ENGINEERING",
    "04" => "ELECTRONICS AND COMMUNICATION ENGINEERING",
    "05" => "COMPUTER SCIENCE AND ENGINEERING",
    "10" => "ELECTRONICS AND INSTRUMENTATION ENGINEERING",
    "12" => "INFORMATION TECHNOLOGY",
    "62" => "COMPUTER SCIENCE AND ENGINEERING (CYBER SECURITY)",
    "66" => "COMPUTER SCIENCE AND ENGINEERING (AI & ML)",
    "67" => "COMPUTER SCIENCE AND ENGINEERING (DATA SCIENCE)",
    "69" => "COMPUTER SCIENCE AND ENGINEERING (IOT)",
};

const HALL_TICKET_LEN: usize = 10;

/// 根据准考证号推断专业
pub fn branch_for_hall_ticket(hall_ticket: &str) -> Option<&'static str> {
    if hall_ticket.len() != HALL_TICKET_LEN {
        return None;
    }
    hall_ticket
        .get(6..8)
        .and_then(|code| BRANCH_CODES.get(code))
        .copied()
}

/// 准考证号第 3-4 位即学院代码
pub fn college_code_for_hall_ticket(hall_ticket: &str) -> Option<&str> {
    if hall_ticket.len() != HALL_TICKET_LEN {
        return None;
    }
    hall_ticket.get(2..4)
}

/// 学院代码对照表
#[derive(Debug, Clone, Default)]
pub struct CollegeDirectory {
    names: HashMap<String, String>,
}

impl CollegeDirectory {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut names = HashMap::new();
        for (code, name) in pairs {
            let code = code.as_ref().trim().to_uppercase();
            let name = name.as_ref().trim();
            if is_header_or_blank(&code) || name.is_empty() {
                continue;
            }
            names.entry(code).or_insert_with(|| name.to_string());
        }
        Self { names }
    }

    /// 解析对照表文档：HTML 表格（每行前两个单元格）或 `代码,名称` 文本行
    pub fn parse(document: &str) -> Self {
        if document.to_lowercase().contains("<table") {
            let pairs = table_grids(document)
                .into_iter()
                .flatten()
                .filter(|row| row.len() >= 2)
                .map(|row| (row[0].clone(), row[1].clone()))
                .collect::<Vec<_>>();
            Self::from_pairs(pairs)
        } else {
            Self::from_pairs(document.lines().filter_map(|line| {
                line.split_once(',')
                    .or_else(|| line.split_once('\t'))
            }))
        }
    }

    pub fn lookup(&self, code: &str) -> Option<&str> {
        self.names
            .get(&code.trim().to_uppercase())
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn is_header_or_blank(code: &str) -> bool {
    code.is_empty() || code.to_lowercase().contains("code")
}

/// 参考数据解析器
///
/// 对照表在第一次使用时加载，之后整个进程内只读共享。
/// 文件缺失或无法读取时退化为空表。
pub struct ReferenceResolvers {
    college_file: Option<PathBuf>,
    colleges: OnceCell<Arc<CollegeDirectory>>,
}

impl ReferenceResolvers {
    /// 从文件懒加载学院对照表
    pub fn new(college_file: impl Into<PathBuf>) -> Self {
        Self {
            college_file: Some(college_file.into()),
            colleges: OnceCell::new(),
        }
    }

    /// 使用已加载的学院对照表
    pub fn with_directory(directory: CollegeDirectory) -> Self {
        Self {
            college_file: None,
            colleges: OnceCell::from(Arc::new(directory)),
        }
    }

    pub async fn colleges(&self) -> Arc<CollegeDirectory> {
        self.colleges
            .get_or_init(|| self.load_colleges())
            .await
            .clone()
    }

    async fn load_colleges(&self) -> Arc<CollegeDirectory> {
        let Some(path) = &self.college_file else {
            return Arc::new(CollegeDirectory::default());
        };

        match tokio::fs::read_to_string(path).await {
            Ok(content) => {
                let directory = CollegeDirectory::parse(&content);
                info!(
                    "✓ 学院对照表加载完成: {} 所学院 ({})",
                    directory.len(),
                    path.display()
                );
                Arc::new(directory)
            }
            Err(e) => {
                warn!(
                    "⚠️ 学院对照表缺失，学院名称将为空 ({}): {}",
                    path.display(),
                    e
                );
                Arc::new(CollegeDirectory::default())
            }
        }
    }

    /// 用参考数据补全学生信息，页面上已有的字段不会被覆盖
    pub async fn enrich(&self, hall_ticket: &str, meta: &mut StudentMeta) {
        fill(&mut meta.hall_ticket, Some(hall_ticket.to_string()));
        fill(
            &mut meta.college_code,
            college_code_for_hall_ticket(hall_ticket).map(str::to_string),
        );

        if meta.college.is_none() {
            if let Some(code) = meta.college_code.as_deref() {
                let colleges = self.colleges().await;
                fill(&mut meta.college, colleges.lookup(code).map(str::to_string));
            }
        }

        fill(
            &mut meta.branch,
            branch_for_hall_ticket(hall_ticket).map(str::to_string),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLLEGES_HTML: &str = r#"
        <table>
          <tr><th>College Code</th><th>College Name</th></tr>
          <tr><td>B8</td><td>SAMPLE INSTITUTE OF TECHNOLOGY</td></tr>
          <tr><td>j1</td><td>SAMPLE COLLEGE OF ENGINEERING</td></tr>
          <tr><td>ZZ</td><td></td></tr>
        </table>
    "#;

    #[test]
    fn test_parse_html_directory() {
        let directory = CollegeDirectory::parse(COLLEGES_HTML);
        assert_eq!(directory.len(), 2);
        assert_eq!(
            directory.lookup("b8"),
            Some("SAMPLE INSTITUTE OF TECHNOLOGY")
        );
        assert_eq!(directory.lookup("J1"), Some("SAMPLE COLLEGE OF ENGINEERING"));
        assert_eq!(directory.lookup("ZZ"), None);
        assert_eq!(directory.lookup("XX"), None);
    }

    #[test]
    fn test_parse_delimited_directory() {
        let directory = CollegeDirectory::parse("code,name\nB8,SAMPLE INSTITUTE\nJ1\tOTHER\n");
        assert_eq!(directory.len(), 2);
        assert_eq!(directory.lookup("J1"), Some("OTHER"));
    }

    #[test]
    fn test_branch_for_hall_ticket() {
        assert_eq!(
            branch_for_hall_ticket("20B81A0501"),
            Some("COMPUTER SCIENCE AND ENGINEERING")
        );
        assert_eq!(branch_for_hall_ticket("20B81A9901"), None);
        assert_eq!(branch_for_hall_ticket("20B8"), None);
        assert_eq!(college_code_for_hall_ticket("20B81A0501"), Some("B8"));
    }

    #[tokio::test]
    async fn test_missing_reference_file_degrades_to_empty() {
        let resolvers = ReferenceResolvers::new("does/not/exist.html");
        assert!(resolvers.colleges().await.is_empty());

        let mut meta = StudentMeta::default();
        resolvers.enrich("20B81A0501", &mut meta).await;
        assert_eq!(meta.college, None);
        assert_eq!(meta.college_code.as_deref(), Some("B8"));
        assert_eq!(
            meta.branch.as_deref(),
            Some("COMPUTER SCIENCE AND ENGINEERING")
        );
        assert_eq!(meta.hall_ticket.as_deref(), Some("20B81A0501"));
    }

    #[tokio::test]
    async fn test_enrich_keeps_page_values() {
        let resolvers =
            ReferenceResolvers::with_directory(CollegeDirectory::parse(COLLEGES_HTML));
        let mut meta = StudentMeta {
            college_code: Some("J1".to_string()),
            branch: Some("CSE".to_string()),
            ..Default::default()
        };
        resolvers.enrich("20B81A0501", &mut meta).await;

        assert_eq!(meta.college_code.as_deref(), Some("J1"));
        assert_eq!(meta.college.as_deref(), Some("SAMPLE COLLEGE OF ENGINEERING"));
        assert_eq!(meta.branch.as_deref(), Some("CSE"));
    }

    #[tokio::test]
    async fn test_colleges_loaded_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("colleges.csv");
        std::fs::write(&path, "B8,FIRST\n").unwrap();

        let resolvers = ReferenceResolvers::new(&path);
        assert_eq!(resolvers.colleges().await.lookup("B8"), Some("FIRST"));

        // 文件变化不影响已缓存的对照表
        std::fs::write(&path, "B8,SECOND\n").unwrap();
        assert_eq!(resolvers.colleges().await.lookup("B8"), Some("FIRST"));
    }
}
