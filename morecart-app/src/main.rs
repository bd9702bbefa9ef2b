use anyhow::Result;
use morecart_catalog::CategoryRunner;
use morecart_common::observability::{LogConfig, init_logging};
use morecart_config::{MorecartConfig, MorecartConfigLoader};
use morecart_drivers::browser::driver::WebDriverSession;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Defaults, then ./morecart.yaml if present, then MORECART__* env.
    let cfg: MorecartConfig = MorecartConfigLoader::new()
        .with_optional_file("morecart.yaml")
        .load()?;

    let log_path = init_logging(LogConfig::default())?;
    info!(log = %log_path.display(), categories = cfg.site.categories.len(), "starting scrape");

    let session = WebDriverSession::connect(&cfg.browser).await?;
    let report = CategoryRunner::new(&cfg).run_and_close(session).await?;

    for category in &report.categories {
        info!(
            name = %category.name,
            rows = category.rows,
            clicks = category.clicks,
            skipped = category.skipped,
            end = ?category.end,
            output = %category.output.display(),
            "done"
        );
    }
    info!(total_rows = report.total_rows(), "scrape finished");
    Ok(())
}
