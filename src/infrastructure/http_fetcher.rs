//! HTTP 抓取器 - 基础设施层
//!
//! 持有唯一的 HTTP 客户端（连接池），只暴露"按顺序抓取一批页面"的能力

use crate::config::Config;
use crate::error::{AppResult, FetchFailure};
use crate::models::{FetchTask, PageResult};
use futures::stream::{self, StreamExt};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// 页面来源
///
/// 约定：输出与输入任务一一对应，且保持提交顺序。
pub trait PageSource {
    fn fetch_all(&self, tasks: Vec<FetchTask>) -> impl Future<Output = Vec<PageResult>> + Send;
}

impl<S: PageSource> PageSource for Arc<S> {
    fn fetch_all(&self, tasks: Vec<FetchTask>) -> impl Future<Output = Vec<PageResult>> + Send {
        (**self).fetch_all(tasks)
    }
}

/// HTTP 抓取器
///
/// 职责：
/// - 持有唯一的 reqwest Client
/// - 以固定并发上限发出请求，每个请求有独立的超时
/// - 任何失败只影响对应任务（返回缺失页面），不会中断其他任务
/// - 不认识页面内容
pub struct Fetcher {
    client: reqwest::Client,
    max_concurrent: usize,
    timeout: Duration,
}

impl Fetcher {
    /// 创建新的抓取器
    pub fn new(config: &Config) -> AppResult<Self> {
        let max_concurrent = config.max_concurrent_requests.max(1);
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout())
            .pool_max_idle_per_host(max_concurrent)
            // 门户证书链不完整
            .danger_accept_invalid_certs(true)
            .build()?;

        Ok(Self {
            client,
            max_concurrent,
            timeout: config.request_timeout(),
        })
    }

    /// 抓取一批任务，输出顺序与提交顺序一致
    ///
    /// `buffered` 最多同时驱动 `max_concurrent` 个请求，但按提交顺序产出结果，
    /// 先完成的请求会等待排在前面的请求。
    pub async fn fetch_all(&self, tasks: Vec<FetchTask>) -> Vec<PageResult> {
        stream::iter(tasks)
            .map(|task| self.fetch_one(task))
            .buffered(self.max_concurrent)
            .collect()
            .await
    }

    async fn fetch_one(&self, task: FetchTask) -> PageResult {
        match tokio::time::timeout(self.timeout, self.get_text(&task.url)).await {
            Ok(Ok(html)) => {
                debug!("[{}] ✓ 获取页面 {} 字节", task, html.len());
                PageResult::page(task, html)
            }
            Ok(Err(reason)) => {
                warn!("[{}] ⚠️ 请求失败: {}", task, reason);
                PageResult::absent(task, reason)
            }
            Err(_) => {
                warn!("[{}] ⚠️ 请求超时 ({:?})", task, self.timeout);
                PageResult::absent(task, FetchFailure::Timeout)
            }
        }
    }

    async fn get_text(&self, url: &str) -> Result<String, FetchFailure> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

impl PageSource for Fetcher {
    fn fetch_all(&self, tasks: Vec<FetchTask>) -> impl Future<Output = Vec<PageResult>> + Send {
        Fetcher::fetch_all(self, tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Variant;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn task(base: &str, exam_code: &str) -> FetchTask {
        FetchTask {
            semester: "1-1".to_string(),
            exam_code: exam_code.to_string(),
            variant: Variant::new("r18", "examCode={exam_code}&htno={htno}", false),
            url: format!("{}/resultAction?examCode={}", base, exam_code),
        }
    }

    fn fetcher(timeout_secs: u64) -> Fetcher {
        let config = Config {
            max_concurrent_requests: 4,
            request_timeout_secs: timeout_secs,
            ..Default::default()
        };
        Fetcher::new(&config).unwrap()
    }

    async fn mount(server: &MockServer, exam_code: &str, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path("/resultAction"))
            .and(query_param("examCode", exam_code))
            .respond_with(response)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_fetch_all_preserves_submission_order() {
        let server = MockServer::start().await;
        // 第一个请求最慢，但必须排在输出的第一位
        mount(
            &server,
            "1",
            ResponseTemplate::new(200)
                .set_body_string("first")
                .set_delay(Duration::from_millis(400)),
        )
        .await;
        mount(&server, "2", ResponseTemplate::new(200).set_body_string("second")).await;
        mount(&server, "3", ResponseTemplate::new(200).set_body_string("third")).await;

        let tasks = vec![
            task(&server.uri(), "1"),
            task(&server.uri(), "2"),
            task(&server.uri(), "3"),
        ];
        let results = fetcher(5).fetch_all(tasks).await;

        let codes: Vec<_> = results.iter().map(|r| r.task.exam_code.as_str()).collect();
        assert_eq!(codes, ["1", "2", "3"]);
        let bodies: Vec<_> = results
            .iter()
            .map(|r| r.body.as_deref().unwrap())
            .collect();
        assert_eq!(bodies, ["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_failures_are_isolated_per_task() {
        let server = MockServer::start().await;
        mount(&server, "1", ResponseTemplate::new(500)).await;
        mount(&server, "2", ResponseTemplate::new(200).set_body_string("ok")).await;
        mount(
            &server,
            "3",
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_secs(3)),
        )
        .await;

        let tasks = vec![
            task(&server.uri(), "1"),
            task(&server.uri(), "2"),
            task(&server.uri(), "3"),
            task("http://127.0.0.1:1", "4"),
        ];
        let results = fetcher(1).fetch_all(tasks).await;

        assert_eq!(results.len(), 4);
        assert_eq!(results[0].body, Err(FetchFailure::Status(500)));
        assert_eq!(results[1].body.as_deref(), Ok("ok"));
        assert_eq!(results[2].body, Err(FetchFailure::Timeout));
        assert!(results[3].body.is_err());
    }

    #[tokio::test]
    async fn test_fetch_all_respects_concurrency_cap() {
        let server = MockServer::start().await;
        let delay = Duration::from_millis(200);
        Mock::given(method("GET"))
            .and(path("/resultAction"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok").set_delay(delay))
            .mount(&server)
            .await;

        let config = Config {
            max_concurrent_requests: 2,
            request_timeout_secs: 5,
            ..Default::default()
        };
        let fetcher = Fetcher::new(&config).unwrap();
        let tasks = (1..=8)
            .map(|i| task(&server.uri(), &i.to_string()))
            .collect();

        let started = std::time::Instant::now();
        let results = fetcher.fetch_all(tasks).await;
        let elapsed = started.elapsed();

        assert_eq!(results.len(), 8);
        assert!(results.iter().all(|r| r.body.as_deref() == Ok("ok")));
        // 8 个请求、上限 2：至少需要 4 轮
        assert!(elapsed >= delay * 4, "elapsed {:?}", elapsed);
        assert_eq!(server.received_requests().await.unwrap_or_default().len(), 8);
    }

    #[tokio::test]
    async fn test_fetch_all_empty() {
        assert!(fetcher(1).fetch_all(Vec::new()).await.is_empty());
    }
}
