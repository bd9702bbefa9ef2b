//! Driver layer for browser automation.
//!
//! This crate defines the narrow page/element surface the scraper needs and a
//! WebDriver-backed implementation of it.
//!
//! - [`browser::page::BrowserPage`] / [`browser::page::PageElement`]: the seam
//!   the catalog logic is written against
//! - [`browser::page::ControlLookup`]: outcome of waiting for a clickable control
//! - [`browser::driver::WebDriverSession`]: `fantoccini` client wrapper
pub mod browser;
