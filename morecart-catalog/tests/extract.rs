mod common;

use common::{FakeElement, listing};
use morecart_catalog::ProductListing;
use morecart_catalog::extract::FieldExtractor;
use morecart_common::ScrapeError;
use morecart_config::SelectorConfig;

#[tokio::test]
async fn well_formed_listing_is_coerced() {
    let selectors = SelectorConfig::default();
    let extractor = FieldExtractor::new(&selectors);
    let card = listing("Apple MacBook Air 13\"", "Core i5, 8GB", "$19.99", 3, "5 reviews");

    let got = extractor.extract(&card).await.unwrap();
    assert_eq!(
        got,
        ProductListing {
            title: "Apple MacBook Air 13\"".into(),
            description: "Core i5, 8GB".into(),
            price: 19.99,
            rating: 3,
            num_of_reviews: 5,
        }
    );
}

#[tokio::test]
async fn title_comes_from_attribute_not_text() {
    let selectors = SelectorConfig::default();
    let card = listing("Full product name", "d", "$1.00", 0, "0 reviews");
    let got = FieldExtractor::new(&selectors).extract(&card).await.unwrap();
    assert_eq!(got.title, "Full product name");
    assert_eq!(got.rating, 0);
}

#[tokio::test]
async fn description_is_kept_verbatim() {
    let selectors = SelectorConfig::default();
    let card = listing("t", "  padded\ttext  ", "$1.00", 1, "1 review");
    let got = FieldExtractor::new(&selectors).extract(&card).await.unwrap();
    assert_eq!(got.description, "  padded\ttext  ");
}

#[tokio::test]
async fn missing_price_element_is_an_extraction_error() {
    let selectors = SelectorConfig::default();
    let card = listing("t", "d", "$1.00", 1, "1 review").without_children(&selectors.price);

    let err = FieldExtractor::new(&selectors).extract(&card).await.unwrap_err();
    match err {
        ScrapeError::Extraction { field, selector } => {
            assert_eq!(field, "price");
            assert_eq!(selector, ".price");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn title_without_attribute_is_rejected() {
    let selectors = SelectorConfig::default();
    let card = listing("t", "d", "$1.00", 1, "1 review")
        .with_children(&selectors.title, vec![FakeElement::text_node("visible only")]);

    let err = FieldExtractor::new(&selectors).extract(&card).await.unwrap_err();
    assert!(matches!(err, ScrapeError::MissingAttribute { field: "title", .. }));
}

#[tokio::test]
async fn malformed_numbers_are_parse_errors() {
    let selectors = SelectorConfig::default();
    let extractor = FieldExtractor::new(&selectors);

    let free = listing("t", "d", "free", 1, "1 review");
    let err = extractor.extract(&free).await.unwrap_err();
    assert!(matches!(err, ScrapeError::Parse { field: "price", .. }));

    let no_count = listing("t", "d", "$2.00", 1, "many reviews");
    let err = extractor.extract(&no_count).await.unwrap_err();
    assert!(matches!(err, ScrapeError::Parse { field: "num_of_reviews", .. }));
}
