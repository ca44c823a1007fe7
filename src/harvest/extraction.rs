//! Content extraction for listing and detail pages

use crate::config::SelectorConfig;
use crate::harvest::error::HarvestError;
use crate::record::RawShirt;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// Selectors compiled once per run and shared between detail tasks
#[derive(Debug)]
pub struct CompiledSelectors {
    listing_item: Selector,
    listing_link: Selector,
    detail_container: Selector,
    title: Selector,
    price: Selector,
    image: Selector,
}

impl CompiledSelectors {
    /// Parse every configured selector
    pub fn compile(config: &SelectorConfig) -> Result<Self, HarvestError> {
        Ok(Self {
            listing_item: parse_selector(&config.listing_item)?,
            listing_link: parse_selector(&config.listing_link)?,
            detail_container: parse_selector(&config.detail_container)?,
            title: parse_selector(&config.title)?,
            price: parse_selector(&config.price)?,
            image: parse_selector(&config.image)?,
        })
    }
}

fn parse_selector(selector: &str) -> Result<Selector, HarvestError> {
    Selector::parse(selector)
        .map_err(|e| HarvestError::Selector(format!("'{}': {}", selector, e)))
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Extract detail links from a listing page, in document order.
///
/// Product nodes without an anchor `href` are skipped.
pub fn extract_links(html: &str, selectors: &CompiledSelectors) -> Vec<String> {
    let document = Html::parse_document(html);

    document
        .select(&selectors.listing_item)
        .filter_map(|item| {
            let href = item
                .select(&selectors.listing_link)
                .next()
                .and_then(|anchor| anchor.value().attr("href"))
                .map(str::trim)
                .filter(|href| !href.is_empty());

            if href.is_none() {
                debug!("Skipping product node without a link");
            }
            href.map(String::from)
        })
        .collect()
}

/// Extract the raw title, price and image source from a detail page.
///
/// Fields are looked up inside the first detail container only.
pub fn extract_shirt(
    html: &str,
    url: &str,
    selectors: &CompiledSelectors,
) -> Result<RawShirt, HarvestError> {
    let document = Html::parse_document(html);
    let missing = |field| HarvestError::MissingField {
        url: url.to_string(),
        field,
    };

    let container = document
        .select(&selectors.detail_container)
        .next()
        .ok_or_else(|| missing("content container"))?;

    let title = container
        .select(&selectors.title)
        .next()
        .map(element_text)
        .ok_or_else(|| missing("title"))?;

    let price = container
        .select(&selectors.price)
        .next()
        .map(element_text)
        .ok_or_else(|| missing("price"))?;

    let image_src = container
        .select(&selectors.image)
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(|src| src.trim().to_string())
        .ok_or_else(|| missing("image"))?;

    Ok(RawShirt {
        title,
        price,
        image_src,
    })
}
