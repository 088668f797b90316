use serde::Deserialize;

/// Main configuration structure for the catalog scraper
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub http: HttpConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
}

/// Which catalog to walk and how fast
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// First catalog page; may already carry a `page=N/` suffix
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Last page index to fetch (inclusive)
    #[serde(rename = "last-page")]
    pub last_page: u32,

    /// Fixed pause between consecutive page requests (seconds)
    #[serde(rename = "delay-seconds")]
    pub delay_seconds: u64,

    /// Explicit index of the first paginated page after the base URL
    #[serde(rename = "start-page", default)]
    pub start_page: Option<u32>,
}

/// HTTP client settings
///
/// The whole `[http]` section is optional.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HttpConfig {
    /// `User-Agent` header sent with every page request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Upper bound on one whole request, body included (seconds)
    #[serde(rename = "timeout-seconds")]
    pub timeout_seconds: u64,

    /// Upper bound on establishing the connection (seconds)
    #[serde(rename = "connect-timeout-seconds")]
    pub connect_timeout_seconds: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("catalog-scraper/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_seconds: 30,
            connect_timeout_seconds: 10,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the product CSV file
    #[serde(rename = "csv-path")]
    pub csv_path: String,

    /// Path to the list of page URLs that failed
    #[serde(rename = "errors-path", default = "default_errors_path")]
    pub errors_path: String,
}

fn default_errors_path() -> String {
    "errors_link.txt".to_string()
}

/// CSS selectors describing the catalog markup
///
/// Every field falls back to the catalog's stock markup when omitted.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SelectorConfig {
    /// One product tile in the listing grid
    pub tile: String,

    /// Anchor carrying the product detail link
    pub link: String,

    /// Element holding the product title
    pub title: String,

    /// Pre-discount price
    #[serde(rename = "old-price")]
    pub old_price: String,

    /// Current price
    #[serde(rename = "new-price")]
    pub new_price: String,

    /// Review counter
    pub reviews: String,

    /// Availability label
    pub availability: String,

    /// Availability text that marks a tile as in stock
    #[serde(rename = "in-stock")]
    pub in_stock: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            tile: "li.catalog-grid__cell".to_string(),
            link: "a.goods-tile__heading".to_string(),
            title: "span.goods-tile__title".to_string(),
            old_price: "div.goods-tile__price--old".to_string(),
            new_price: "div.goods-tile__price span.goods-tile__price-value".to_string(),
            reviews: "span.goods-tile__reviews-link".to_string(),
            availability: "div.goods-tile__availability".to_string(),
            in_stock: "Готовий до відправлення".to_string(),
        }
    }
}
