//! HTML parser for extracting product tiles
//!
//! This module turns one catalog page into product records:
//! - Locating every listing tile
//! - Pulling link, title, prices, review count and availability per tile
//! - Keeping only tiles whose availability matches the in-stock label

use crate::config::SelectorConfig;
use crate::ConfigError;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use url::Url;

/// One in-stock product extracted from a listing tile
///
/// Field order matches the CSV column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProductRecord {
    /// Product name with the characteristics suffix removed
    pub name: String,

    /// Absolute product detail URL
    pub link: Option<String>,

    /// Current price, digits only
    pub new_price: Option<String>,

    /// Pre-discount price, digits only
    pub old_price: Option<String>,

    /// Review count, digits only
    pub reviews: Option<String>,

    /// Parenthesised or slash-separated detail split out of the title
    pub characteristics: Option<String>,
}

/// Compiled selectors for one catalog layout
#[derive(Debug, Clone)]
pub struct TileSelectors {
    tile: Selector,
    link: Selector,
    title: Selector,
    old_price: Selector,
    new_price: Selector,
    reviews: Selector,
    availability: Selector,
    in_stock: String,
}

impl TileSelectors {
    /// Compiles every selector in the configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidSelector` naming the first field that
    /// does not parse as a CSS selector.
    pub fn new(config: &SelectorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            tile: compile("tile", &config.tile)?,
            link: compile("link", &config.link)?,
            title: compile("title", &config.title)?,
            old_price: compile("old-price", &config.old_price)?,
            new_price: compile("new-price", &config.new_price)?,
            reviews: compile("reviews", &config.reviews)?,
            availability: compile("availability", &config.availability)?,
            in_stock: config.in_stock.trim().to_string(),
        })
    }

    /// The availability label that marks a tile as in stock
    pub fn in_stock(&self) -> &str {
        &self.in_stock
    }
}

fn compile(field: &str, css: &str) -> Result<Selector, ConfigError> {
    Selector::parse(css).map_err(|e| ConfigError::InvalidSelector {
        field: field.to_string(),
        message: format!("{:?}", e),
    })
}

/// Extracts the in-stock products from a catalog page
///
/// Every field of a tile is extracted independently: a missing link, price
/// or review counter leaves only that field empty. Tiles whose availability
/// text is not exactly the in-stock label are dropped and not counted.
///
/// # Arguments
///
/// * `html` - The page body
/// * `page_url` - The page URL, used to resolve relative product links
/// * `selectors` - The compiled catalog selectors
///
/// # Example
///
/// ```
/// use catalog_scraper::config::SelectorConfig;
/// use catalog_scraper::crawler::{extract_products, TileSelectors};
/// use url::Url;
///
/// let html = r#"<ul><li class="catalog-grid__cell">
///     <span class="goods-tile__title">Laptop X1 (16GB/512GB)</span>
///     <div class="goods-tile__availability">Готовий до відправлення</div>
/// </li></ul>"#;
/// let selectors = TileSelectors::new(&SelectorConfig::default()).unwrap();
/// let page = Url::parse("https://shop.example.com/notebooks/").unwrap();
/// let products = extract_products(html, &page, &selectors);
/// assert_eq!(products[0].name, "Laptop X1");
/// ```
pub fn extract_products(
    html: &str,
    page_url: &Url,
    selectors: &TileSelectors,
) -> Vec<ProductRecord> {
    let document = Html::parse_document(html);

    document
        .select(&selectors.tile)
        .enumerate()
        .filter_map(|(index, tile)| extract_tile(tile, index, page_url, selectors))
        .collect()
}

/// Extracts a single tile, returning None if it is not in stock
///
/// All state is local to the call, so nothing from a previous tile can
/// end up in this record.
fn extract_tile(
    tile: ElementRef<'_>,
    index: usize,
    page_url: &Url,
    selectors: &TileSelectors,
) -> Option<ProductRecord> {
    let availability = first_text(tile, &selectors.availability);
    match availability.as_deref() {
        Some(text) if text == selectors.in_stock => {}
        Some(text) => {
            tracing::trace!(
                "Tile {} on {} skipped: availability '{}'",
                index,
                page_url,
                text
            );
            return None;
        }
        None => {
            tracing::debug!("Tile {} on {} has no availability label", index, page_url);
            return None;
        }
    }

    let link = tile
        .select(&selectors.link)
        .next()
        .and_then(|anchor| anchor.value().attr("href"))
        .and_then(|href| resolve_link(href, page_url));
    if link.is_none() {
        tracing::debug!("Tile {} on {}: no product link", index, page_url);
    }

    let (name, characteristics) = match first_text(tile, &selectors.title) {
        Some(title) => split_name(&title),
        None => {
            tracing::warn!("Tile {} on {}: no title element", index, page_url);
            (String::new(), None)
        }
    };

    let old_price = first_text(tile, &selectors.old_price).and_then(|t| digits_only(&t));
    let new_price = first_text(tile, &selectors.new_price).and_then(|t| digits_only(&t));
    if new_price.is_none() {
        tracing::debug!("Tile {} on {}: no price for '{}'", index, page_url, name);
    }
    let reviews = first_text(tile, &selectors.reviews).and_then(|t| digits_only(&t));

    Some(ProductRecord {
        name,
        link,
        new_price,
        old_price,
        reviews,
        characteristics,
    })
}

/// Returns the trimmed text of the first element matching `selector`
fn first_text(tile: ElementRef<'_>, selector: &Selector) -> Option<String> {
    tile.select(selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
}

/// Resolves a product href against the page it was found on
fn resolve_link(href: &str, page_url: &Url) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    page_url.join(href).ok().map(|url| url.to_string())
}

/// Splits a product title into a clean name and its characteristics
///
/// A title like `Laptop X1 (16GB/512GB)` splits at the first parenthesis;
/// without one, `Laptop X1/16GB` splits at the slash. Either way only the
/// second segment is kept, so `X (16GB) (Black)` yields `(16GB)`.
/// Whitespace runs in both parts are collapsed to single spaces.
pub fn split_name(title: &str) -> (String, Option<String>) {
    if title.contains('(') {
        let mut parts = title.split('(');
        let name = collapse_whitespace(parts.next().unwrap_or_default());
        let characteristics = parts
            .next()
            .map(collapse_whitespace)
            .and_then(non_empty)
            .map(|c| format!("({}", c));
        return (name, characteristics);
    }

    if title.contains('/') {
        let mut parts = title.split('/');
        let name = collapse_whitespace(parts.next().unwrap_or_default());
        let characteristics = parts.next().map(collapse_whitespace).and_then(non_empty);
        return (name, characteristics);
    }

    (collapse_whitespace(title), None)
}

/// Strips every non-digit character, e.g. `1 999 ₴` becomes `1999`
///
/// Only ASCII `0-9` count as digits. Other Unicode decimal digits are
/// dropped, so the result always parses as a plain integer.
pub fn digits_only(text: &str) -> Option<String> {
    non_empty(text.chars().filter(char::is_ascii_digit).collect())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
