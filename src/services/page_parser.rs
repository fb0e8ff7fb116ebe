//! 成绩页面解析服务 - 业务能力层
//!
//! 只负责"把一个页面变成学生信息片段 + 科目行"，不关心学期、变体和去重。
//!
//! 页面分类：
//! 1. 表格少于两个，或第二个表格只有表头 → 该变体无成绩（正常情况）
//! 2. 科目表表头无法识别 / 有歧义 → 页面结构异常，拒绝解析，不猜测布局
//! 3. 其他 → 解析成功
//!
//! 学生信息优先按标签扫描（门户模板经常调整列位置），
//! 标签扫描一无所获时才退回固定位置，两者都失败则不报告学生信息。

use crate::error::ParseFailure;
use crate::models::record::fill;
use crate::models::{StudentMeta, SubjectRow};
use regex::Regex;
use scraper::{ElementRef, Html};
use std::sync::LazyLock;
use tracing::debug;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// 学生信息表的识别策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaLayout {
    /// 扫描标签单元格，取相邻单元格的值
    Labeled,
    /// 旧模板的固定位置
    Positional,
}

/// 单个页面的解析结果
#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    Parsed(ParsedPage),
    /// 该变体没有成绩（学生未参加此次考试）
    NoResult,
    /// 通过了表格数量检查，但结构无法识别
    Malformed(ParseFailure),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPage {
    pub meta: Option<StudentMeta>,
    /// 实际命中的学生信息策略
    pub meta_layout: Option<MetaLayout>,
    pub subjects: Vec<SubjectRow>,
    /// 因列不完整被丢弃的行数
    pub dropped_rows: usize,
}

/// 成绩页面解析器
///
/// 职责：
/// - 判断页面是否为有效成绩页
/// - 按策略提取学生信息
/// - 按表头定位列并提取科目行
/// - 无状态，同步执行
#[derive(Debug, Clone)]
pub struct PageParser {
    meta_layouts: Vec<MetaLayout>,
}

impl PageParser {
    /// 创建默认解析器（先标签扫描，后固定位置）
    pub fn new() -> Self {
        Self {
            meta_layouts: vec![MetaLayout::Labeled, MetaLayout::Positional],
        }
    }

    /// 使用自定义的学生信息策略顺序
    pub fn with_meta_layouts(layouts: Vec<MetaLayout>) -> Self {
        Self {
            meta_layouts: layouts,
        }
    }

    pub fn parse(&self, html: &str) -> PageOutcome {
        let document = Html::parse_document(html);
        let tables: Vec<ElementRef> = elements(document.root_element(), &["table"]).collect();

        if tables.len() < 2 {
            return PageOutcome::NoResult;
        }

        let subject_grid = table_grid(tables[1]);
        if subject_grid.len() <= 1 {
            return PageOutcome::NoResult;
        }

        let columns = match SubjectColumns::detect(&subject_grid[0]) {
            Ok(columns) => columns,
            Err(reason) => return PageOutcome::Malformed(reason),
        };

        let mut subjects = Vec::new();
        let mut dropped_rows = 0;
        for cells in &subject_grid[1..] {
            match columns.extract(cells) {
                Some(row) => subjects.push(row),
                None => {
                    debug!("丢弃不完整的科目行: {:?}", cells);
                    dropped_rows += 1;
                }
            }
        }

        let meta_grid = table_grid(tables[0]);
        let (meta, meta_layout) = self.extract_meta(&meta_grid);

        PageOutcome::Parsed(ParsedPage {
            meta,
            meta_layout,
            subjects,
            dropped_rows,
        })
    }

    fn extract_meta(&self, grid: &[Vec<String>]) -> (Option<StudentMeta>, Option<MetaLayout>) {
        for layout in &self.meta_layouts {
            let meta = match layout {
                MetaLayout::Labeled => labeled_meta(grid),
                MetaLayout::Positional => positional_meta(grid),
            };
            if let Some(meta) = meta {
                return (Some(meta), Some(*layout));
            }
        }
        (None, None)
    }
}

impl Default for PageParser {
    fn default() -> Self {
        Self::new()
    }
}

// ========== HTML 辅助函数 ==========

fn elements<'a>(
    parent: ElementRef<'a>,
    tags: &'static [&'static str],
) -> impl Iterator<Item = ElementRef<'a>> {
    parent
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(move |el| tags.contains(&el.value().name()))
}

fn cell_text(cell: ElementRef) -> String {
    let raw: String = cell.text().collect();
    WHITESPACE.replace_all(raw.trim(), " ").trim().to_string()
}

/// 把表格展开为"行 × 单元格文本"
fn table_grid(table: ElementRef) -> Vec<Vec<String>> {
    elements(table, &["tr"])
        .map(|row| elements(row, &["td", "th"]).map(cell_text).collect())
        .collect()
}

/// 文档中所有表格的单元格文本，按文档顺序
pub(crate) fn table_grids(html: &str) -> Vec<Vec<Vec<String>>> {
    let document = Html::parse_document(html);
    elements(document.root_element(), &["table"])
        .map(table_grid)
        .collect()
}

// ========== 学生信息 ==========

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MetaField {
    Name,
    FatherName,
    HallTicket,
    CollegeCode,
    College,
    Branch,
}

fn classify_label(cell: &str) -> Option<MetaField> {
    let label = cell
        .trim_end_matches(|c: char| c == ':' || c == '.' || c.is_whitespace())
        .to_lowercase();
    if label.is_empty() || label.split_whitespace().count() > 4 {
        return None;
    }

    // 只按整词匹配，避免 "NAMRATA" 之类的值被当成标签
    let words: Vec<&str> = label
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    let has = |word: &str| words.iter().any(|w| *w == word);

    if has("father") {
        Some(MetaField::FatherName)
    } else if (has("hall") && has("ticket")) || has("htno") || (has("roll") && has("no")) {
        Some(MetaField::HallTicket)
    } else if has("college") {
        if has("code") {
            Some(MetaField::CollegeCode)
        } else {
            Some(MetaField::College)
        }
    } else if has("branch") {
        Some(MetaField::Branch)
    } else if has("name") {
        Some(MetaField::Name)
    } else {
        None
    }
}

fn set_field(meta: &mut StudentMeta, field: MetaField, value: &str) {
    let value = Some(value.to_string());
    match field {
        MetaField::Name => fill(&mut meta.name, value),
        MetaField::FatherName => fill(&mut meta.father_name, value),
        MetaField::HallTicket => fill(&mut meta.hall_ticket, value.map(|v| v.to_uppercase())),
        MetaField::CollegeCode => fill(&mut meta.college_code, value),
        MetaField::College => fill(&mut meta.college, value),
        MetaField::Branch => fill(&mut meta.branch, value),
    }
}

/// 标签扫描：标签单元格之后紧邻的单元格即为值，值单元格不再参与标签匹配
fn labeled_meta(grid: &[Vec<String>]) -> Option<StudentMeta> {
    let mut meta = StudentMeta::default();

    for row in grid {
        let mut i = 0;
        while i < row.len() {
            match (classify_label(&row[i]), row.get(i + 1)) {
                (Some(field), Some(value)) => {
                    set_field(&mut meta, field, value);
                    i += 2;
                }
                _ => i += 1,
            }
        }
    }

    (!meta.is_empty()).then_some(meta)
}

/// 旧模板：第 0 行 [_, 准考证号, _, 姓名]，第 1 行 [_, 父亲姓名, _, 学院代码]，第 2 行 [_, _, _, 专业]
fn positional_meta(grid: &[Vec<String>]) -> Option<StudentMeta> {
    let cell = |r: usize, c: usize| grid.get(r).and_then(|row| row.get(c)).cloned();

    let mut meta = StudentMeta::default();
    fill(&mut meta.hall_ticket, cell(0, 1).map(|v| v.to_uppercase()));
    fill(&mut meta.name, cell(0, 3));
    fill(&mut meta.father_name, cell(1, 1));
    fill(&mut meta.college_code, cell(1, 3));
    fill(&mut meta.branch, cell(2, 3));

    (!meta.is_empty()).then_some(meta)
}

// ========== 科目表 ==========

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Code,
    Name,
    Internal,
    External,
    Total,
    Grade,
    Credits,
}

impl Column {
    fn label(self) -> &'static str {
        match self {
            Column::Code => "subject code",
            Column::Name => "subject name",
            Column::Internal => "internal",
            Column::External => "external",
            Column::Total => "total",
            Column::Grade => "grade",
            Column::Credits => "credits",
        }
    }

    fn classify(header: &str) -> Option<Self> {
        let h = header.to_lowercase();
        if h.contains("code") {
            Some(Column::Code)
        } else if h.contains("name") || h == "subject" {
            Some(Column::Name)
        } else if h.contains("internal") {
            Some(Column::Internal)
        } else if h.contains("external") {
            Some(Column::External)
        } else if h.contains("total") {
            Some(Column::Total)
        } else if h.contains("credit") {
            Some(Column::Credits)
        } else if h.contains("grade") && !h.contains("point") {
            Some(Column::Grade)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct SubjectColumns {
    code: usize,
    name: usize,
    grade: usize,
    credits: usize,
    internal: Option<usize>,
    external: Option<usize>,
    total: Option<usize>,
}

impl SubjectColumns {
    fn detect(header: &[String]) -> Result<Self, ParseFailure> {
        let mut slots: [Option<usize>; 7] = [None; 7];
        let mut recognized = false;

        for (idx, cell) in header.iter().enumerate() {
            let Some(column) = Column::classify(cell) else {
                continue;
            };
            recognized = true;
            let slot = &mut slots[column as usize];
            if slot.is_some() {
                return Err(ParseFailure::AmbiguousHeader(column.label()));
            }
            *slot = Some(idx);
        }

        if !recognized {
            return Err(ParseFailure::UnrecognizedHeader);
        }

        let required = |column: Column| {
            slots[column as usize].ok_or(ParseFailure::MissingRequiredColumn(column.label()))
        };

        Ok(Self {
            code: required(Column::Code)?,
            name: required(Column::Name)?,
            grade: required(Column::Grade)?,
            credits: required(Column::Credits)?,
            internal: slots[Column::Internal as usize],
            external: slots[Column::External as usize],
            total: slots[Column::Total as usize],
        })
    }

    /// 必需列缺失或为空的行返回 None
    fn extract(&self, cells: &[String]) -> Option<SubjectRow> {
        let required = |idx: usize| cells.get(idx).filter(|v| !v.is_empty()).cloned();
        let optional = |idx: Option<usize>| idx.and_then(required);

        Some(SubjectRow {
            subject_code: required(self.code)?.to_uppercase(),
            subject_name: required(self.name)?,
            internal: optional(self.internal),
            external: optional(self.external),
            total: optional(self.total),
            grade: required(self.grade)?,
            credits: required(self.credits)?.parse().ok()?,
        })
    }
}
