use crate::listing::ProductListing;
use morecart_common::{Result, ScrapeError};
use morecart_config::SelectorConfig;
use morecart_drivers::browser::page::PageElement;

/// Reads the five listing fields out of one listing container.
///
/// There is no fallback: a missing sub-element or unparsable number fails the
/// listing. What happens next is up to the caller's malformed-listing policy.
pub struct FieldExtractor<'a> {
    selectors: &'a SelectorConfig,
}

impl<'a> FieldExtractor<'a> {
    pub fn new(selectors: &'a SelectorConfig) -> Self {
        Self { selectors }
    }

    pub async fn extract<E: PageElement>(&self, listing: &E) -> Result<ProductListing> {
        let sel = self.selectors;

        let title = required_child(listing, "title", &sel.title)
            .await?
            .attribute(&sel.title_attribute)
            .await?
            .ok_or_else(|| ScrapeError::MissingAttribute {
                field: "title",
                attribute: sel.title_attribute.clone(),
            })?;

        let description = required_child(listing, "description", &sel.description)
            .await?
            .text()
            .await?;

        let price_text = required_child(listing, "price", &sel.price)
            .await?
            .text()
            .await?;
        let price = parse_price(&price_text)?;

        let stars = listing.find_all(&sel.rating_star).await?.len();
        let rating = u32::try_from(stars).unwrap_or(u32::MAX);

        let reviews_text = required_child(listing, "num_of_reviews", &sel.review_count)
            .await?
            .text()
            .await?;
        let num_of_reviews = parse_review_count(&reviews_text)?;

        Ok(ProductListing {
            title,
            description,
            price,
            rating,
            num_of_reviews,
        })
    }
}

async fn required_child<E: PageElement>(
    listing: &E,
    field: &'static str,
    selector: &str,
) -> Result<E> {
    listing
        .find_first(selector)
        .await?
        .ok_or_else(|| ScrapeError::Extraction {
            field,
            selector: selector.to_string(),
        })
}

/// Parse a currency-formatted price such as `"$1,139.54"`.
///
/// Leading currency symbols (`$`, `€`, `£`, ...) and `,` group separators are
/// dropped; words and anything else that is not part of a decimal number are
/// an error.
///
/// ```
/// use morecart_catalog::extract::parse_price;
///
/// assert_eq!(parse_price("$19.99").unwrap(), 19.99);
/// assert!(parse_price("free").is_err());
/// ```
pub fn parse_price(text: &str) -> Result<f64> {
    let fail = |reason: String| ScrapeError::Parse {
        field: "price",
        text: text.to_string(),
        reason,
    };

    let number: String = text
        .trim()
        .trim_start_matches(is_currency_symbol)
        .trim_start()
        .chars()
        .filter(|c| *c != ',')
        .collect();
    if number.is_empty() {
        return Err(fail("no digits".into()));
    }

    let value: f64 = number.parse().map_err(|e| fail(format!("{e}")))?;
    if !value.is_finite() {
        return Err(fail("not a finite number".into()));
    }
    Ok(value)
}

fn is_currency_symbol(c: char) -> bool {
    !(c.is_alphanumeric() || c.is_whitespace() || c == '.' || c == '-' || c == ',')
}

/// Parse the leading count out of review text such as `"14 reviews"`.
pub fn parse_review_count(text: &str) -> Result<u32> {
    let first = text.split_whitespace().next().ok_or_else(|| ScrapeError::Parse {
        field: "num_of_reviews",
        text: text.to_string(),
        reason: "empty".into(),
    })?;
    first.parse().map_err(|e| ScrapeError::Parse {
        field: "num_of_reviews",
        text: text.to_string(),
        reason: format!("{e}"),
    })
}
