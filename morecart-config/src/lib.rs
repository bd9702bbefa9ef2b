//! Loader for Morecart configuration with defaults, YAML and environment overlays.
//!
//! Every field has a default that targets the webscraper.io "load more"
//! e-commerce demo, so an empty configuration is a complete one. Sources are
//! merged in this order, later ones winning:
//!
//! 1. built-in defaults
//! 2. YAML files / inline snippets, in the order they were attached
//! 3. `MORECART__`-prefixed environment variables (`__` separates nesting,
//!    e.g. `MORECART__PAGINATION__MAX_CLICKS=20`)
//!
//! `${VAR}` references inside string values are expanded after merging.
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const ENV_PREFIX: &str = "MORECART";
const ENV_SEPARATOR: &str = "__";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MorecartConfig {
    pub site: SiteConfig,
    pub browser: BrowserConfig,
    pub pagination: PaginationConfig,
    pub selectors: SelectorConfig,
    pub output: OutputConfig,
}

/// Where the categories live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub base_url: String,
    /// Joined onto `base_url`; keep the trailing slash so category paths nest under it.
    pub home_path: String,
    pub categories: Vec<Category>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://webscraper.io/".into(),
            home_path: "test-sites/e-commerce/more/".into(),
            categories: vec![
                Category::new("home", ""),
                Category::new("computers", "computers"),
                Category::new("laptops", "computers/laptops"),
                Category::new("tablets", "computers/tablets"),
                Category::new("phones", "phones"),
                Category::new("touch", "phones/touch"),
            ],
        }
    }
}

/// A named category page. `name` doubles as the output file stem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    #[serde(default)]
    pub path: String,
}

impl Category {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// A category with its resolved absolute URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTarget {
    pub name: String,
    pub url: Url,
}

impl SiteConfig {
    /// Resolve every category against `base_url` + `home_path`.
    ///
    /// ```
    /// use morecart_config::SiteConfig;
    ///
    /// let targets = SiteConfig::default().category_urls().unwrap();
    /// assert_eq!(targets.len(), 6);
    /// assert_eq!(
    ///     targets[0].url.as_str(),
    ///     "https://webscraper.io/test-sites/e-commerce/more/"
    /// );
    /// assert_eq!(
    ///     targets[2].url.as_str(),
    ///     "https://webscraper.io/test-sites/e-commerce/more/computers/laptops"
    /// );
    /// ```
    pub fn category_urls(&self) -> Result<Vec<CategoryTarget>, url::ParseError> {
        let home = Url::parse(&self.base_url)?.join(&self.home_path)?;
        self.categories
            .iter()
            .map(|c| {
                Ok(CategoryTarget {
                    name: c.name.clone(),
                    url: home.join(&c.path)?,
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// WebDriver endpoint (chromedriver by default).
    pub webdriver_url: String,
    pub headless: bool,
    pub window_size: WindowSize,
    /// Passed to Chrome verbatim after the built-in arguments.
    pub extra_args: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".into(),
            headless: false,
            window_size: WindowSize::default(),
            extra_args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

impl Default for WindowSize {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

/// Timing and bounds of the "load more" loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// How long to wait for the control to become clickable.
    pub wait_timeout_ms: u64,
    /// Poll cadence while waiting.
    pub poll_interval_ms: u64,
    /// Pause after each click so new listings can render.
    pub settle_ms: u64,
    /// Upper bound on clicks per category; `None` loops until the control is gone.
    pub max_clicks: Option<u32>,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            wait_timeout_ms: 5_000,
            poll_interval_ms: 250,
            settle_ms: 500,
            max_clicks: Some(1_000),
        }
    }
}

impl PaginationConfig {
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

/// CSS selectors for the listing grid and the fields inside one listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub listing: String,
    pub load_more: String,
    pub title: String,
    pub title_attribute: String,
    pub description: String,
    pub price: String,
    pub rating_star: String,
    pub review_count: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            listing: ".card-body".into(),
            load_more: "a.btn.btn-lg.btn-block.btn-primary.ecomerce-items-scroll-more".into(),
            title: ".title".into(),
            title_attribute: "title".into(),
            description: ".description".into(),
            price: ".price".into(),
            rating_star: ".ratings span.ws-icon-star".into(),
            review_count: ".review-count".into(),
        }
    }
}

/// What to do with a listing whose fields cannot be extracted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedListingPolicy {
    /// Abort the whole category; nothing is written for it.
    #[default]
    FailFast,
    /// Drop the listing with a warning and keep its siblings.
    SkipAndLog,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving `<category>.csv`; created when missing.
    pub dir: PathBuf,
    pub on_malformed: MalformedListingPolicy,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            on_malformed: MalformedListingPolicy::default(),
        }
    }
}

impl MorecartConfig {
    /// Reject configurations the runner cannot act on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let site = &self.site;
        if site.categories.is_empty() {
            return Err(ConfigError::Message("site.categories must not be empty".into()));
        }

        let mut seen = HashSet::new();
        for category in &site.categories {
            let name = category.name.as_str();
            if name.is_empty() || name == "." || name == ".." {
                return Err(ConfigError::Message(format!(
                    "invalid category name {name:?}"
                )));
            }
            if name.contains(['/', '\\']) {
                return Err(ConfigError::Message(format!(
                    "category name {name:?} must not contain path separators"
                )));
            }
            if !seen.insert(name) {
                return Err(ConfigError::Message(format!(
                    "duplicate category name {name:?}"
                )));
            }
        }

        site.category_urls()
            .map_err(|e| ConfigError::Message(format!("invalid site URL: {e}")))?;

        if self.pagination.poll_interval_ms == 0 {
            return Err(ConfigError::Message(
                "pagination.poll_interval_ms must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct MorecartConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for MorecartConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl MorecartConfigLoader {
    /// Start from the built-in defaults; environment overrides apply at [`load`](Self::load).
    ///
    /// ```
    /// use morecart_config::{MorecartConfig, MorecartConfigLoader};
    ///
    /// let config = MorecartConfigLoader::new().load().expect("defaults are valid");
    /// assert_eq!(config, MorecartConfig::default());
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file that must exist; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is silently skipped when absent.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use morecart_config::{MalformedListingPolicy, MorecartConfigLoader};
    ///
    /// let cfg = MorecartConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// site:
    ///   base_url: "http://127.0.0.1:8080/"
    ///   home_path: "shop/"
    ///   categories:
    ///     - name: "phones"
    ///       path: "phones"
    /// output:
    ///   on_malformed: skip_and_log
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// let targets = cfg.site.category_urls().unwrap();
    /// assert_eq!(targets[0].url.as_str(), "http://127.0.0.1:8080/shop/phones");
    /// assert_eq!(cfg.output.on_malformed, MalformedListingPolicy::SkipAndLog);
    /// assert_eq!(cfg.pagination.wait_timeout_ms, 5_000);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    ///
    /// Environment variables are layered on top of every attached source, `${VAR}`
    /// placeholders are expanded, and the result is validated.
    pub fn load(self) -> Result<MorecartConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: MorecartConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;
        typed.validate()?;

        Ok(typed)
    }
}
