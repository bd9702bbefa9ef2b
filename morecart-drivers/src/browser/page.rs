use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

/// Result of waiting for a control to become clickable.
///
/// Both `NotFound` and `TimedOut` mean "stop paginating"; they are kept apart
/// so logs can tell a finished listing grid from a stuck one.
#[derive(Debug)]
pub enum ControlLookup<E> {
    /// Present, displayed and enabled.
    Clickable(E),
    /// Never appeared before the deadline.
    NotFound,
    /// Appeared but never became clickable before the deadline.
    TimedOut,
}

impl<E> ControlLookup<E> {
    pub fn is_clickable(&self) -> bool {
        matches!(self, Self::Clickable(_))
    }
}

/// A DOM element the extractor can query.
#[async_trait]
pub trait PageElement: Send + Sync + Sized {
    /// Find zero or more descendants by CSS selector.
    async fn find_all(&self, selector: &str) -> Result<Vec<Self>>;

    /// First descendant matching `selector`, `None` when there is none.
    async fn find_first(&self, selector: &str) -> Result<Option<Self>> {
        Ok(self.find_all(selector).await?.into_iter().next())
    }

    /// Read an attribute value.
    async fn attribute(&self, name: &str) -> Result<Option<String>>;

    /// The element's visible text.
    async fn text(&self) -> Result<String>;
}

/// One browser tab, driven serially.
#[async_trait]
pub trait BrowserPage: Send + Sync {
    type Element: PageElement;

    /// Navigate to `url` and wait for the document to load.
    async fn goto(&mut self, url: &Url) -> Result<()>;

    /// Find zero or more elements in the document by CSS selector.
    async fn find_all(&self, selector: &str) -> Result<Vec<Self::Element>>;

    /// Poll every `poll` until the first element matching `selector` is
    /// clickable, giving up after `timeout`.
    async fn wait_for_clickable(
        &self,
        selector: &str,
        timeout: Duration,
        poll: Duration,
    ) -> Result<ControlLookup<Self::Element>>;

    /// Scroll `element` to the middle of the viewport.
    async fn scroll_into_view(&self, element: &Self::Element) -> Result<()>;

    /// Dispatch a click from script, bypassing hit-testing so overlays do not
    /// swallow it.
    async fn click_via_script(&self, element: &Self::Element) -> Result<()>;

    /// End the browser session.
    async fn close(self) -> Result<()>
    where
        Self: Sized;
}
