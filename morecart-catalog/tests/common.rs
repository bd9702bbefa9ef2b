#![allow(dead_code)]

//! In-memory page model standing in for a WebDriver session.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use morecart_config::SelectorConfig;
use morecart_drivers::browser::page::{BrowserPage, ControlLookup, PageElement};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Default)]
pub struct FakeElement {
    text: String,
    attrs: HashMap<String, String>,
    children: HashMap<String, Vec<FakeElement>>,
}

impl FakeElement {
    pub fn text_node(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Self::default()
        }
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_children(mut self, selector: &str, children: Vec<FakeElement>) -> Self {
        self.children.insert(selector.to_string(), children);
        self
    }

    pub fn without_children(mut self, selector: &str) -> Self {
        self.children.remove(selector);
        self
    }
}

#[async_trait]
impl PageElement for FakeElement {
    async fn find_all(&self, selector: &str) -> Result<Vec<FakeElement>> {
        Ok(self.children.get(selector).cloned().unwrap_or_default())
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>> {
        Ok(self.attrs.get(name).cloned())
    }

    async fn text(&self) -> Result<String> {
        Ok(self.text.clone())
    }
}

/// A well-formed listing card laid out with the default selectors.
pub fn listing(title: &str, description: &str, price: &str, stars: usize, reviews: &str) -> FakeElement {
    let sel = SelectorConfig::default();
    FakeElement::default()
        .with_children(
            &sel.title,
            vec![FakeElement::text_node("truncated...").with_attr(&sel.title_attribute, title)],
        )
        .with_children(&sel.description, vec![FakeElement::text_node(description)])
        .with_children(&sel.price, vec![FakeElement::text_node(price)])
        .with_children(&sel.rating_star, vec![FakeElement::default(); stars])
        .with_children(&sel.review_count, vec![FakeElement::text_node(reviews)])
}

/// Numbered listings `"{prefix} {i}"` priced at `$i.50` with `i % 6` stars.
pub fn batch(prefix: &str, count: usize) -> Vec<FakeElement> {
    (1..=count)
        .map(|i| {
            listing(
                &format!("{prefix} {i}"),
                &format!("{prefix} description {i}"),
                &format!("${i}.50"),
                i % 6,
                &format!("{i} reviews"),
            )
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlBehaviour {
    /// Offered while unrevealed batches remain.
    Normal,
    /// Present while unrevealed batches remain, never clickable.
    Stuck,
    /// Always clickable, never reveals anything.
    Endless,
}

/// Observable side effects, shared so tests can inspect them after `close`.
#[derive(Debug, Default)]
pub struct FakeLog {
    pub visited: Vec<String>,
    pub clicks: u32,
    pub scrolls: u32,
    pub lookups: u32,
    pub closed: bool,
}

pub struct FakePage {
    /// url -> batches; batch 0 is present on load, each click reveals the next.
    site: HashMap<String, Vec<Vec<FakeElement>>>,
    unreachable: HashSet<String>,
    behaviour: ControlBehaviour,
    listing_selector: String,
    load_more_selector: String,
    current: Option<String>,
    revealed: Mutex<usize>,
    fail_close: bool,
    log: Arc<Mutex<FakeLog>>,
}

impl FakePage {
    pub fn new() -> Self {
        let sel = SelectorConfig::default();
        Self {
            site: HashMap::new(),
            unreachable: HashSet::new(),
            behaviour: ControlBehaviour::Normal,
            listing_selector: sel.listing,
            load_more_selector: sel.load_more,
            current: None,
            revealed: Mutex::new(0),
            fail_close: false,
            log: Arc::new(Mutex::new(FakeLog::default())),
        }
    }

    pub fn with_page(mut self, url: &str, batches: Vec<Vec<FakeElement>>) -> Self {
        self.site.insert(url.to_string(), batches);
        self
    }

    pub fn with_unreachable(mut self, url: &str) -> Self {
        self.unreachable.insert(url.to_string());
        self
    }

    pub fn with_behaviour(mut self, behaviour: ControlBehaviour) -> Self {
        self.behaviour = behaviour;
        self
    }

    /// `close` still marks the session closed, then reports an error.
    pub fn with_close_failure(mut self) -> Self {
        self.fail_close = true;
        self
    }

    pub fn log(&self) -> Arc<Mutex<FakeLog>> {
        Arc::clone(&self.log)
    }

    fn batches(&self) -> &[Vec<FakeElement>] {
        self.current
            .as_ref()
            .and_then(|url| self.site.get(url))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn revealed(&self) -> usize {
        *self.revealed.lock().unwrap()
    }

    fn has_hidden_batches(&self) -> bool {
        self.revealed() + 1 < self.batches().len()
    }
}

#[async_trait]
impl BrowserPage for FakePage {
    type Element = FakeElement;

    async fn goto(&mut self, url: &Url) -> Result<()> {
        let url = url.to_string();
        if self.unreachable.contains(&url) {
            return Err(anyhow!("net::ERR_NAME_NOT_RESOLVED"));
        }
        self.log.lock().unwrap().visited.push(url.clone());
        self.current = Some(url);
        *self.revealed.get_mut().unwrap() = 0;
        Ok(())
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<FakeElement>> {
        if selector != self.listing_selector {
            return Ok(Vec::new());
        }
        Ok(self
            .batches()
            .iter()
            .take(self.revealed() + 1)
            .flatten()
            .cloned()
            .collect())
    }

    async fn wait_for_clickable(
        &self,
        selector: &str,
        _timeout: Duration,
        _poll: Duration,
    ) -> Result<ControlLookup<FakeElement>> {
        self.log.lock().unwrap().lookups += 1;
        if selector != self.load_more_selector {
            return Ok(ControlLookup::NotFound);
        }
        let lookup = match self.behaviour {
            ControlBehaviour::Endless => ControlLookup::Clickable(FakeElement::text_node("More")),
            ControlBehaviour::Stuck if self.has_hidden_batches() => ControlLookup::TimedOut,
            ControlBehaviour::Normal if self.has_hidden_batches() => {
                ControlLookup::Clickable(FakeElement::text_node("More"))
            }
            _ => ControlLookup::NotFound,
        };
        Ok(lookup)
    }

    async fn scroll_into_view(&self, _element: &FakeElement) -> Result<()> {
        self.log.lock().unwrap().scrolls += 1;
        Ok(())
    }

    async fn click_via_script(&self, _element: &FakeElement) -> Result<()> {
        self.log.lock().unwrap().clicks += 1;
        if self.behaviour != ControlBehaviour::Endless {
            *self.revealed.lock().unwrap() += 1;
        }
        Ok(())
    }

    async fn close(self) -> Result<()> {
        self.log.lock().unwrap().closed = true;
        if self.fail_close {
            return Err(anyhow!("invalid session id"));
        }
        Ok(())
    }
}
