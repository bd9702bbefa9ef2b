//! Product catalog scraping for "load more" e-commerce listing pages.
//!
//! - Listing model and CSV layout (`listing`, `export`)
//! - Per-listing field extraction (`extract`)
//! - The load-more pagination state machine (`paginate`)
//! - Sequential per-category runs with scoped session release (`runner`)
//!
//! Everything is generic over [`morecart_drivers::browser::page::BrowserPage`],
//! so the same code drives a real WebDriver session or an in-memory page.

pub mod export;
pub mod extract;
pub mod listing;
pub mod paginate;
pub mod runner;

pub use listing::ProductListing;
pub use paginate::{EndReason, PageScrape, Paginator};
pub use runner::{CategoryReport, CategoryRunner, RunReport};
