//! Catalog page URL construction
//!
//! Catalog pages live at `<root>page=<N>/`; page 1 is the bare root.

/// First paginated index fetched after the base URL
pub const DEFAULT_START_PAGE: u32 = 2;

/// Builds the URL of page `index` under `root`
///
/// # Examples
///
/// ```
/// use catalog_scraper::url::page_url;
///
/// assert_eq!(
///     page_url("https://shop.example.com/notebooks/c80004/", 3),
///     "https://shop.example.com/notebooks/c80004/page=3/"
/// );
/// ```
pub fn page_url(root: &str, index: u32) -> String {
    format!("{}page={}/", root, index)
}

/// Splits a URL into its catalog root and the page number it encodes
///
/// Returns `(url, None)` when the URL has no `page=<digits>` segment.
pub fn split_page_url(url: &str) -> (&str, Option<u32>) {
    let Some(position) = url.find("page=") else {
        return (url, None);
    };

    let digits: String = url[position + "page=".len()..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();

    match digits.parse::<u32>() {
        Ok(page) => (&url[..position], Some(page)),
        Err(_) => (url, None),
    }
}

/// The resolved walk over a catalog's pages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagePlan {
    /// URL fetched first; its failure ends the run
    pub first_url: String,

    /// Page index of `first_url` (1 unless the URL encodes one)
    pub first_page: u32,

    /// Prefix that page URLs are built from
    pub catalog_root: String,

    /// First index of the paginated loop
    pub start_page: u32,

    /// Last index of the paginated loop (inclusive)
    pub last_page: u32,
}

impl PagePlan {
    /// Resolves the plan for `base_url`
    ///
    /// An explicit `start_page` wins. Otherwise a base URL that already
    /// encodes `page=N/` resumes at `N + 1` under the stripped root, and a
    /// bare base URL starts at [`DEFAULT_START_PAGE`]. The loop never starts
    /// at or before the page the base URL points at, and is empty when the
    /// base URL already encodes `u32::MAX`.
    pub fn resolve(base_url: &str, last_page: u32, start_page: Option<u32>) -> Self {
        let (root, encoded) = split_page_url(base_url);
        let first_page = encoded.unwrap_or(1);

        let start_page = start_page
            .or_else(|| encoded.and_then(|page| page.checked_add(1)))
            .unwrap_or(DEFAULT_START_PAGE);
        let (start_page, last_page) = match first_page.checked_add(1) {
            Some(next) => (start_page.max(next), last_page),
            // No page can follow the last representable index
            None => (first_page, first_page - 1),
        };

        Self {
            first_url: base_url.to_string(),
            first_page,
            catalog_root: root.to_string(),
            start_page,
            last_page,
        }
    }

    /// Page indices and URLs of the paginated loop, in order
    pub fn paginated_urls(&self) -> impl Iterator<Item = (u32, String)> + '_ {
        (self.start_page..=self.last_page)
            .map(move |index| (index, page_url(&self.catalog_root, index)))
    }

    /// Total number of pages the plan will request
    pub fn total_pages(&self) -> u32 {
        1 + (self.start_page..=self.last_page).count() as u32
    }
}
