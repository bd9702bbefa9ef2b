use crate::extract::FieldExtractor;
use crate::listing::ProductListing;
use morecart_common::{Result, ScrapeError};
use morecart_config::{MalformedListingPolicy, PaginationConfig, SelectorConfig};
use morecart_drivers::browser::page::{BrowserPage, ControlLookup};
use tokio::time::sleep;
use tracing::{debug, info, warn};
use url::Url;

/// Why the load-more loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The control never showed up within the wait.
    ControlAbsent,
    /// The control was there but never became clickable within the wait.
    ControlTimedOut,
    /// `max_clicks` was reached and the control was still clickable.
    ClickLimit,
}

/// Pagination states: `Loading` while more content may exist, `Done` once it cannot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationState {
    Loading,
    Done(EndReason),
}

/// Everything collected from one category page.
#[derive(Debug, Clone)]
pub struct PageScrape {
    /// Listings in document order, duplicates kept.
    pub listings: Vec<ProductListing>,
    pub clicks: u32,
    pub end: EndReason,
    /// Listings dropped under [`MalformedListingPolicy::SkipAndLog`].
    pub skipped: usize,
}

/// Drives a category page: click "load more" until it goes away, then extract.
pub struct Paginator<'a> {
    pagination: &'a PaginationConfig,
    selectors: &'a SelectorConfig,
    policy: MalformedListingPolicy,
}

impl<'a> Paginator<'a> {
    pub fn new(
        pagination: &'a PaginationConfig,
        selectors: &'a SelectorConfig,
        policy: MalformedListingPolicy,
    ) -> Self {
        Self {
            pagination,
            selectors,
            policy,
        }
    }

    /// Navigate to `url`, reveal every listing and extract them.
    pub async fn scrape<P: BrowserPage>(&self, page: &mut P, url: &Url) -> Result<PageScrape> {
        page.goto(url)
            .await
            .map_err(|source| ScrapeError::Navigation {
                url: url.to_string(),
                source,
            })?;

        let (clicks, end) = self.load_all(page).await?;
        let (listings, skipped) = self.collect(page).await?;

        Ok(PageScrape {
            listings,
            clicks,
            end,
            skipped,
        })
    }

    /// Run the state machine from `Loading` to `Done`, returning the click count.
    pub async fn load_all<P: BrowserPage>(&self, page: &P) -> Result<(u32, EndReason)> {
        let mut clicks = 0;
        loop {
            match self.advance(page, clicks).await? {
                PaginationState::Loading => clicks += 1,
                PaginationState::Done(end) => {
                    info!(target: "catalog.paginate", clicks, ?end, "no more products to load");
                    return Ok((clicks, end));
                }
            }
        }
    }

    /// One `Loading` step: look for the control and click it if possible.
    ///
    /// The click cap is checked only once the control is known to be clickable,
    /// so a control that went away after the last allowed click still ends as
    /// [`EndReason::ControlAbsent`].
    async fn advance<P: BrowserPage>(&self, page: &P, clicks: u32) -> Result<PaginationState> {
        let control = page
            .wait_for_clickable(
                &self.selectors.load_more,
                self.pagination.wait_timeout(),
                self.pagination.poll_interval(),
            )
            .await?;

        match control {
            ControlLookup::Clickable(_) if self.at_click_limit(clicks) => {
                warn!(
                    target: "catalog.paginate",
                    max_clicks = clicks,
                    "click limit reached with the control still present"
                );
                Ok(PaginationState::Done(EndReason::ClickLimit))
            }
            ControlLookup::Clickable(control) => {
                page.scroll_into_view(&control).await?;
                page.click_via_script(&control).await?;
                debug!(target: "catalog.paginate", iteration = clicks + 1, "clicked load more");
                sleep(self.pagination.settle()).await;
                Ok(PaginationState::Loading)
            }
            ControlLookup::NotFound => Ok(PaginationState::Done(EndReason::ControlAbsent)),
            ControlLookup::TimedOut => Ok(PaginationState::Done(EndReason::ControlTimedOut)),
        }
    }

    fn at_click_limit(&self, clicks: u32) -> bool {
        self.pagination.max_clicks.is_some_and(|max| clicks >= max)
    }

    /// Extract every listing currently in the document.
    pub async fn collect<P: BrowserPage>(&self, page: &P) -> Result<(Vec<ProductListing>, usize)> {
        let elements = page.find_all(&self.selectors.listing).await?;
        let extractor = FieldExtractor::new(self.selectors);

        let mut listings = Vec::with_capacity(elements.len());
        let mut skipped = 0;
        for (index, element) in elements.iter().enumerate() {
            match extractor.extract(element).await {
                Ok(listing) => listings.push(listing),
                Err(err)
                    if err.is_listing_fault()
                        && self.policy == MalformedListingPolicy::SkipAndLog =>
                {
                    warn!(target: "catalog.extract", index, error = %err, "skipping malformed listing");
                    skipped += 1;
                }
                Err(err) => return Err(err),
            }
        }
        Ok((listings, skipped))
    }
}
