use crate::browser::page::{BrowserPage, ControlLookup, PageElement};
use anyhow::{Context, Result};
use async_trait::async_trait;
use fantoccini::{elements::Element, Client, ClientBuilder, Locator};
use morecart_config::BrowserConfig;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::debug;
use url::Url;
use webdriver::capabilities::Capabilities;

const SCROLL_INTO_VIEW_JS: &str = "arguments[0].scrollIntoView({block: 'center'});";
const CLICK_JS: &str = "arguments[0].click();";

/// Construct Chrome command‑line arguments for the configured session.
pub fn build_chrome_arguments(config: &BrowserConfig) -> Vec<String> {
    let mut args = vec![
        "--disable-infobars".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--disable-extensions".to_string(),
        format!(
            "--window-size={},{}",
            config.window_size.width, config.window_size.height
        ),
    ];
    if config.headless {
        args.push("--headless".to_string());
        args.push("--disable-gpu".to_string());
    }
    args.extend(config.extra_args.iter().cloned());
    args
}

/// Thin wrapper around a `fantoccini` WebDriver client.
pub struct WebDriverSession {
    client: Client,
}

impl WebDriverSession {
    /// Open a new Chrome session on the WebDriver service at
    /// `config.webdriver_url` (chromedriver on `localhost:9515` by default).
    pub async fn connect(config: &BrowserConfig) -> Result<Self> {
        let mut caps = Capabilities::new();
        let mut chrome_opts = HashMap::new();
        chrome_opts.insert("args".to_string(), json!(build_chrome_arguments(config)));
        caps.insert("goog:chromeOptions".to_string(), json!(chrome_opts));

        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(&config.webdriver_url)
            .await
            .with_context(|| format!("failed to open WebDriver session at {}", config.webdriver_url))?;

        Ok(Self { client })
    }

    async fn first_match(&self, selector: &str) -> Result<Option<Element>> {
        Ok(self
            .client
            .find_all(Locator::Css(selector))
            .await?
            .into_iter()
            .next())
    }
}

async fn is_clickable(element: &Element) -> bool {
    // The element can go stale between polls; that simply counts as "not yet".
    matches!(element.is_displayed().await, Ok(true))
        && matches!(element.is_enabled().await, Ok(true))
}

#[async_trait]
impl BrowserPage for WebDriverSession {
    type Element = WebDriverElement;

    async fn goto(&mut self, url: &Url) -> Result<()> {
        self.client.goto(url.as_str()).await?;
        Ok(())
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<WebDriverElement>> {
        let elements = self.client.find_all(Locator::Css(selector)).await?;
        Ok(elements.into_iter().map(WebDriverElement::new).collect())
    }

    async fn wait_for_clickable(
        &self,
        selector: &str,
        timeout: Duration,
        poll: Duration,
    ) -> Result<ControlLookup<WebDriverElement>> {
        let deadline = Instant::now() + timeout;
        let mut seen = false;
        loop {
            if let Some(element) = self.first_match(selector).await? {
                seen = true;
                if is_clickable(&element).await {
                    return Ok(ControlLookup::Clickable(WebDriverElement::new(element)));
                }
            }
            if Instant::now() >= deadline {
                debug!(target: "browser.wait", %selector, seen, "gave up waiting for control");
                return Ok(if seen {
                    ControlLookup::TimedOut
                } else {
                    ControlLookup::NotFound
                });
            }
            sleep(poll).await;
        }
    }

    async fn scroll_into_view(&self, element: &WebDriverElement) -> Result<()> {
        let arg = serde_json::to_value(&element.element)?;
        self.client.execute(SCROLL_INTO_VIEW_JS, vec![arg]).await?;
        Ok(())
    }

    async fn click_via_script(&self, element: &WebDriverElement) -> Result<()> {
        let arg = serde_json::to_value(&element.element)?;
        self.client.execute(CLICK_JS, vec![arg]).await?;
        Ok(())
    }

    async fn close(self) -> Result<()> {
        self.client.close().await?;
        Ok(())
    }
}

/// Wrapper for WebDriver elements.
#[derive(Clone)]
pub struct WebDriverElement {
    pub element: Element,
}

impl WebDriverElement {
    pub fn new(element: Element) -> Self {
        Self { element }
    }
}

#[async_trait]
impl PageElement for WebDriverElement {
    async fn find_all(&self, selector: &str) -> Result<Vec<WebDriverElement>> {
        let elements = self.element.find_all(Locator::Css(selector)).await?;
        Ok(elements.into_iter().map(WebDriverElement::new).collect())
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>> {
        self.element.attr(name).await.map_err(anyhow::Error::from)
    }

    async fn text(&self) -> Result<String> {
        self.element.text().await.map_err(anyhow::Error::from)
    }
}
