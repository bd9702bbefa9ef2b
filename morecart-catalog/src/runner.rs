use crate::export::write_listings_file;
use crate::paginate::{EndReason, Paginator};
use morecart_common::{Result, ScrapeError};
use morecart_config::MorecartConfig;
use morecart_drivers::browser::page::BrowserPage;
use std::path::PathBuf;
use tracing::{Instrument, info, info_span, warn};
use url::Url;

/// Outcome of one category.
#[derive(Debug, Clone)]
pub struct CategoryReport {
    pub name: String,
    pub url: Url,
    pub output: PathBuf,
    pub rows: usize,
    pub clicks: u32,
    pub end: EndReason,
    pub skipped: usize,
}

#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub categories: Vec<CategoryReport>,
}

impl RunReport {
    pub fn total_rows(&self) -> usize {
        self.categories.iter().map(|c| c.rows).sum()
    }
}

/// Scrapes every configured category in order and writes `<dir>/<name>.csv` for each.
///
/// Categories are not isolated: the first failure aborts the run and later
/// categories are not visited.
pub struct CategoryRunner<'a> {
    config: &'a MorecartConfig,
}

impl<'a> CategoryRunner<'a> {
    pub fn new(config: &'a MorecartConfig) -> Self {
        Self { config }
    }

    /// Run every category on `page`, leaving the session open.
    pub async fn run<P: BrowserPage>(&self, page: &mut P) -> Result<RunReport> {
        let targets = self
            .config
            .site
            .category_urls()
            .map_err(|e| ScrapeError::Config(format!("invalid site URL: {e}")))?;

        let dir = &self.config.output.dir;
        std::fs::create_dir_all(dir).map_err(|source| ScrapeError::Io {
            path: dir.clone(),
            source,
        })?;

        let paginator = Paginator::new(
            &self.config.pagination,
            &self.config.selectors,
            self.config.output.on_malformed,
        );

        let mut report = RunReport::default();
        for target in targets {
            let span = info_span!("category", name = %target.name, url = %target.url);
            let scrape = paginator
                .scrape(page, &target.url)
                .instrument(span.clone())
                .await?;

            let output = dir.join(format!("{}.csv", target.name));
            write_listings_file(&output, &scrape.listings)?;

            span.in_scope(|| {
                info!(
                    target: "catalog.runner",
                    rows = scrape.listings.len(),
                    clicks = scrape.clicks,
                    skipped = scrape.skipped,
                    output = %output.display(),
                    "category written"
                )
            });

            report.categories.push(CategoryReport {
                name: target.name,
                url: target.url,
                output,
                rows: scrape.listings.len(),
                clicks: scrape.clicks,
                end: scrape.end,
                skipped: scrape.skipped,
            });
        }
        Ok(report)
    }

    /// Run every category, then close the session whatever the outcome.
    ///
    /// A run error takes precedence over a close error, which is only logged.
    pub async fn run_and_close<P: BrowserPage>(&self, mut page: P) -> Result<RunReport> {
        let outcome = self.run(&mut page).await;
        let closed = page.close().await;

        match (outcome, closed) {
            (Ok(report), Ok(())) => Ok(report),
            (Ok(_), Err(e)) => Err(ScrapeError::Driver(
                e.context("failed to close browser session"),
            )),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(close_err)) => {
                warn!(
                    target: "catalog.runner",
                    error = %close_err,
                    "failed to close browser session after error"
                );
                Err(err)
            }
        }
    }
}
