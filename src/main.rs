use anyhow::{bail, Result};
use jntuh_results::utils::logging;
use jntuh_results::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    logging::init(config.verbose_logging);

    let hall_tickets: Vec<String> = std::env::args().skip(1).collect();
    if hall_tickets.is_empty() {
        bail!("用法: jntuh_results <准考证号>...");
    }

    // 初始化应用
    let app = App::initialize(config).await?;

    let mut failed = 0;
    for hall_ticket in &hall_tickets {
        match app.lookup_or_resolve(hall_ticket).await {
            Ok(lookup) => {
                tracing::info!(
                    "[{}] 来源: {} | 科目: {}",
                    lookup.record.hall_ticket,
                    lookup.source,
                    lookup.record.subject_count()
                );
                println!("{}", serde_json::to_string_pretty(&lookup.record)?);
            }
            Err(e) => {
                tracing::error!("❌ {}", e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{}/{} 个准考证号查询失败", failed, hall_tickets.len());
    }

    Ok(())
}
