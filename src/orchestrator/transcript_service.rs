//! 成绩单服务 - 编排层入口
//!
//! ## 职责
//!
//! 1. **应用初始化**：加载考试代码目录、创建抓取器、准备参考数据和存储
//! 2. **准考证号校验**：去空白、转大写、拒绝非法字符
//! 3. **分级查询**：进程缓存 → 磁盘存储 → 抓取，抓取结果回写两级存储
//! 4. **结果映射**：不完整的成绩单映射为 `AppError::NotFound`

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::infrastructure::{Fetcher, PageSource};
use crate::models::{load_catalog, StudentRecord};
use crate::orchestrator::task_planner::TaskPlanner;
use crate::orchestrator::transcript_processor::TranscriptProcessor;
use crate::services::{JsonFileStore, MemoryStore, ReferenceResolvers, TranscriptStore};
use crate::utils::logging;
use regex::Regex;
use std::path::Path;
use std::sync::{Arc, LazyLock};
use tracing::{info, warn};

static HALL_TICKET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9A-Z]+$").unwrap());

/// 成绩单来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Cache,
    Store,
    Scraper,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Source::Cache => "cache",
            Source::Store => "store",
            Source::Scraper => "scraper",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone)]
pub struct Lookup {
    pub record: StudentRecord,
    pub source: Source,
}

/// 应用主结构
pub struct App<S = Fetcher> {
    processor: TranscriptProcessor<S>,
    cache: Arc<dyn TranscriptStore>,
    store: Arc<dyn TranscriptStore>,
}

impl App<Fetcher> {
    /// 初始化应用
    pub async fn initialize(config: Config) -> AppResult<Self> {
        logging::log_startup(&config);

        let catalog = load_catalog(Path::new(&config.exam_codes_file)).await?;
        let fetcher = Fetcher::new(&config)?;
        let references = ReferenceResolvers::new(&config.college_codes_file);

        let processor = TranscriptProcessor::new(
            TaskPlanner::from_config(&config),
            Arc::new(catalog),
            fetcher,
            Arc::new(references),
        );

        Ok(Self::new(
            processor,
            Arc::new(MemoryStore::new()),
            Arc::new(JsonFileStore::new(&config.store_dir)),
        ))
    }
}

impl<S: PageSource> App<S> {
    pub fn new(
        processor: TranscriptProcessor<S>,
        cache: Arc<dyn TranscriptStore>,
        store: Arc<dyn TranscriptStore>,
    ) -> Self {
        Self {
            processor,
            cache,
            store,
        }
    }

    /// 抓取并组装成绩单（不经过缓存）
    pub async fn resolve_transcript(&self, hall_ticket: &str) -> AppResult<StudentRecord> {
        let hall_ticket = normalize_hall_ticket(hall_ticket)?;
        self.resolve_normalized(&hall_ticket).await
    }

    async fn resolve_normalized(&self, hall_ticket: &str) -> AppResult<StudentRecord> {
        info!("\n🔍 [{}] 开始抓取成绩", hall_ticket);
        let outcome = self.processor.process(hall_ticket).await;

        outcome.record.map_err(|reason| AppError::NotFound {
            hall_ticket: hall_ticket.to_string(),
            reason,
        })
    }

    /// 分级查询：缓存 → 存储 → 抓取
    pub async fn lookup_or_resolve(&self, hall_ticket: &str) -> AppResult<Lookup> {
        let hall_ticket = normalize_hall_ticket(hall_ticket)?;

        if let Some(record) = self.cache.lookup(&hall_ticket) {
            info!("⚡ [{}] 命中缓存", hall_ticket);
            return Ok(Lookup {
                record,
                source: Source::Cache,
            });
        }

        if let Some(record) = self.store.lookup(&hall_ticket) {
            info!("💾 [{}] 命中存储", hall_ticket);
            self.save(&*self.cache, &hall_ticket, &record);
            return Ok(Lookup {
                record,
                source: Source::Store,
            });
        }

        let record = self.resolve_normalized(&hall_ticket).await?;
        self.save(&*self.store, &hall_ticket, &record);
        self.save(&*self.cache, &hall_ticket, &record);

        Ok(Lookup {
            record,
            source: Source::Scraper,
        })
    }

    /// 写入失败只记录日志，不影响本次查询结果
    fn save(&self, target: &dyn TranscriptStore, hall_ticket: &str, record: &StudentRecord) {
        if let Err(e) = target.store(hall_ticket, record) {
            warn!("⚠️ [{}] 保存成绩单失败: {}", hall_ticket, e);
        }
    }
}

/// 去空白并转大写；空值或含非字母数字字符时报错
pub fn normalize_hall_ticket(input: &str) -> AppResult<String> {
    let hall_ticket = input.trim().to_uppercase();
    if HALL_TICKET.is_match(&hall_ticket) {
        Ok(hall_ticket)
    } else {
        Err(AppError::InvalidHallTicket(input.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IncompleteRecord;
    use crate::orchestrator::transcript_processor::tests::{catalog, FixtureSource};
    use crate::services::CollegeDirectory;

    const REGULAR: &str = include_str!("../../tests/fixtures/result_regular.html");

    fn app(source: FixtureSource, store: Arc<dyn TranscriptStore>) -> App<FixtureSource> {
        let processor = TranscriptProcessor::new(
            TaskPlanner::new("http://portal/resultAction", "btech"),
            catalog(),
            source,
            Arc::new(ReferenceResolvers::with_directory(CollegeDirectory::default())),
        );
        App::new(processor, Arc::new(MemoryStore::new()), store)
    }

    #[test]
    fn test_normalize_hall_ticket() {
        assert_eq!(normalize_hall_ticket(" 20b81a0501 ").unwrap(), "20B81A0501");
        assert!(matches!(
            normalize_hall_ticket("   "),
            Err(AppError::InvalidHallTicket(_))
        ));
        assert!(matches!(
            normalize_hall_ticket("20B8/../x"),
            Err(AppError::InvalidHallTicket(_))
        ));
    }

    #[tokio::test]
    async fn test_resolve_not_found_when_every_fetch_fails() {
        let app = app(FixtureSource::default(), Arc::new(MemoryStore::new()));
        match app.resolve_transcript("20B81A0501").await {
            Err(AppError::NotFound {
                hall_ticket,
                reason,
            }) => {
                assert_eq!(hall_ticket, "20B81A0501");
                assert_eq!(reason, IncompleteRecord::NoSemesters);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_lookup_tiers() {
        let store: Arc<dyn TranscriptStore> = Arc::new(MemoryStore::new());
        let source = FixtureSource::default().with_page("1001", "r18", REGULAR);
        let app = app(source, store.clone());

        let first = app.lookup_or_resolve("20b81a0501").await.unwrap();
        assert_eq!(first.source, Source::Scraper);
        assert_eq!(first.record.name, "RAVI KUMAR");
        assert!(store.lookup("20B81A0501").is_some());

        let second = app.lookup_or_resolve("20B81A0501").await.unwrap();
        assert_eq!(second.source, Source::Cache);
        assert_eq!(second.record, first.record);
    }

    #[tokio::test]
    async fn test_lookup_backfills_cache_from_store() {
        let store: Arc<dyn TranscriptStore> = Arc::new(MemoryStore::new());
        let seeded = app(
            FixtureSource::default().with_page("1001", "r18", REGULAR),
            store.clone(),
        )
        .resolve_transcript("20B81A0501")
        .await
        .unwrap();
        store.store("20B81A0501", &seeded).unwrap();

        // 新实例：缓存为空，抓取源也没有任何页面
        let app = app(FixtureSource::default(), store);
        let hit = app.lookup_or_resolve("20B81A0501").await.unwrap();
        assert_eq!(hit.source, Source::Store);
        assert_eq!(hit.record, seeded);
        assert_eq!(
            app.lookup_or_resolve("20B81A0501").await.unwrap().source,
            Source::Cache
        );
    }

    #[tokio::test]
    async fn test_not_found_is_not_stored() {
        let store: Arc<dyn TranscriptStore> = Arc::new(MemoryStore::new());
        let app = app(FixtureSource::default(), store.clone());
        let err = app.lookup_or_resolve("20B81A0501").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(store.lookup("20B81A0501").is_none());
    }
}
