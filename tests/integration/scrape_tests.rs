//! Integration tests for the scraper
//!
//! These tests use wiremock to serve catalog pages and run the full
//! pagination loop end-to-end against a temporary output directory.

use catalog_scraper::config::{CatalogConfig, Config, HttpConfig, OutputConfig, SelectorConfig};
use catalog_scraper::crawler::{
    build_http_client, fetch_and_extract, run_scrape, Coordinator, PageFailure, PageResult,
    ProductRecord, ScrapeSettings, TileSelectors,
};
use catalog_scraper::output::{OutputResult, RecordSink};
use catalog_scraper::{RunState, ScrapeError};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const IN_STOCK: &str = "Готовий до відправлення";

/// Creates a test configuration writing into `dir`
fn create_test_config(base_url: &str, last_page: u32, dir: &Path) -> Config {
    Config {
        catalog: CatalogConfig {
            base_url: base_url.to_string(),
            last_page,
            delay_seconds: 0,
            start_page: None,
        },
        http: HttpConfig {
            user_agent: "TestBot/1.0".to_string(),
            ..HttpConfig::default()
        },
        output: OutputConfig {
            csv_path: dir.join("products.csv").display().to_string(),
            errors_path: dir.join("errors_link.txt").display().to_string(),
        },
        selectors: SelectorConfig::default(),
    }
}

/// Renders one listing tile
fn tile(name: &str, price: &str, availability: &str) -> String {
    format!(
        r#"<li class="catalog-grid__cell">
            <a class="goods-tile__heading" href="/p/{slug}/">{name}</a>
            <span class="goods-tile__title">{name}</span>
            <div class="goods-tile__price"><span class="goods-tile__price-value">{price}</span> ₴</div>
            <span class="goods-tile__reviews-link">3 відгуки</span>
            <div class="goods-tile__availability">{availability}</div>
        </li>"#,
        slug = name
            .to_lowercase()
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .collect::<String>(),
        name = name,
        price = price,
        availability = availability
    )
}

/// Renders a catalog page from its tiles
fn catalog_page(tiles: &[String]) -> String {
    format!(
        r#"<html><head><title>Notebooks</title></head><body>
        <ul class="catalog-grid">{}</ul>
        </body></html>"#,
        tiles.concat()
    )
}

async fn mount_page(server: &MockServer, page_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html"))
        .mount(server)
        .await;
}

async fn mount_status(server: &MockServer, page_path: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

fn read_rows(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::Reader::from_path(path).expect("Failed to open CSV");
    reader
        .records()
        .map(|r| r.expect("Bad CSV row").iter().map(str::to_string).collect())
        .collect()
}

#[tokio::test]
async fn test_full_scrape_three_pages() {
    let server = MockServer::start().await;
    let base_url = format!("{}/c1/", server.uri());

    mount_page(
        &server,
        "/c1/",
        catalog_page(&[
            tile("Laptop A (8GB/256GB)", "19 999", IN_STOCK),
            tile("Laptop B", "24 999", "Закінчився"),
            tile("Laptop C/16GB", "31 500", IN_STOCK),
        ]),
    )
    .await;
    mount_page(
        &server,
        "/c1/page=2/",
        catalog_page(&[tile("Laptop D", "9 999", IN_STOCK)]),
    )
    .await;
    mount_page(&server, "/c1/page=3/", catalog_page(&[])).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base_url, 3, dir.path());

    let summary = run_scrape(&config).await.expect("Scrape failed");

    assert_eq!(summary.pages_succeeded, 3);
    assert_eq!(summary.goods_found, 3);
    assert!(summary.failed_urls.is_empty());
    assert!(!summary.aborted);
    assert!(summary.finished_at.is_some());

    let content = std::fs::read_to_string(dir.path().join("products.csv")).unwrap();
    assert!(content.starts_with("name,link,new_price,old_price,reviews,characteristics\n"));

    let rows = read_rows(&dir.path().join("products.csv"));
    assert_eq!(rows.len(), 3);
    assert_eq!(
        rows[0],
        vec![
            "Laptop A".to_string(),
            format!("{}/p/laptopa8gb256gb/", server.uri()),
            "19999".to_string(),
            String::new(),
            "3".to_string(),
            "(8GB/256GB)".to_string(),
        ]
    );
    assert_eq!(rows[1][0], "Laptop C");
    assert_eq!(rows[1][5], "16GB");
    assert_eq!(rows[2][0], "Laptop D");

    // No failures, no failure log
    assert!(!dir.path().join("errors_link.txt").exists());
}

#[tokio::test]
async fn test_first_page_failure_is_fatal() {
    let server = MockServer::start().await;
    let base_url = format!("{}/c1/", server.uri());

    mount_status(&server, "/c1/", 404).await;

    // Later pages must not be requested
    Mock::given(method("GET"))
        .and(path("/c1/page=2/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("products.csv");
    std::fs::write(&csv_path, "previous,run\n").unwrap();

    let config = create_test_config(&base_url, 2, dir.path());
    let summary = run_scrape(&config).await.expect("Scrape failed");

    assert_eq!(summary.pages_succeeded, 0);
    assert_eq!(summary.goods_found, 0);
    assert_eq!(summary.failed_urls, vec![base_url.clone()]);

    // The existing CSV is left alone
    assert_eq!(std::fs::read_to_string(&csv_path).unwrap(), "previous,run\n");

    let errors = std::fs::read_to_string(dir.path().join("errors_link.txt")).unwrap();
    assert_eq!(errors, format!("{}\n", base_url));
}

#[tokio::test]
async fn test_first_page_failure_creates_no_csv() {
    let server = MockServer::start().await;
    let base_url = format!("{}/c1/", server.uri());
    mount_status(&server, "/c1/", 404).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base_url, 1, dir.path());
    let summary = run_scrape(&config).await.expect("Scrape failed");

    assert_eq!((summary.pages_succeeded, summary.goods_found), (0, 0));
    assert!(!dir.path().join("products.csv").exists());
}

#[tokio::test]
async fn test_later_page_failure_continues() {
    let server = MockServer::start().await;
    let base_url = format!("{}/c1/", server.uri());

    mount_page(
        &server,
        "/c1/",
        catalog_page(&[tile("Laptop A", "1 000", IN_STOCK)]),
    )
    .await;
    mount_status(&server, "/c1/page=2/", 500).await;
    mount_page(
        &server,
        "/c1/page=3/",
        catalog_page(&[
            tile("Laptop C", "3 000", IN_STOCK),
            tile("Laptop E", "5 000", IN_STOCK),
        ]),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base_url, 3, dir.path());
    let summary = run_scrape(&config).await.expect("Scrape failed");

    let failed_url = format!("{}page=2/", base_url);
    assert_eq!(summary.pages_succeeded, 2);
    assert_eq!(summary.goods_found, 3);
    assert_eq!(summary.failed_urls, vec![failed_url.clone()]);
    assert!(!summary.aborted);

    let rows = read_rows(&dir.path().join("products.csv"));
    let names: Vec<&str> = rows.iter().map(|r| r[0].as_str()).collect();
    assert_eq!(names, vec!["Laptop A", "Laptop C", "Laptop E"]);

    let errors = std::fs::read_to_string(dir.path().join("errors_link.txt")).unwrap();
    assert_eq!(errors, format!("{}\n", failed_url));
}

#[tokio::test]
async fn test_second_run_overwrites_csv() {
    let server = MockServer::start().await;
    let base_url = format!("{}/c1/", server.uri());

    mount_page(
        &server,
        "/c1/",
        catalog_page(&[tile("Laptop A", "1 000", IN_STOCK)]),
    )
    .await;
    mount_page(
        &server,
        "/c1/page=2/",
        catalog_page(&[tile("Laptop B", "2 000", IN_STOCK)]),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base_url, 2, dir.path());

    run_scrape(&config).await.expect("First scrape failed");
    let first = read_rows(&dir.path().join("products.csv"));

    run_scrape(&config).await.expect("Second scrape failed");
    let second = read_rows(&dir.path().join("products.csv"));

    assert_eq!(first.len(), 2);
    assert_eq!(first, second);

    let content = std::fs::read_to_string(dir.path().join("products.csv")).unwrap();
    assert_eq!(content.matches("name,link").count(), 1);
}

#[tokio::test]
async fn test_paged_base_url_resumes_after_its_page() {
    let server = MockServer::start().await;
    let base_url = format!("{}/c1/page=4/", server.uri());

    mount_page(
        &server,
        "/c1/page=4/",
        catalog_page(&[tile("Laptop D", "4 000", IN_STOCK)]),
    )
    .await;
    mount_page(
        &server,
        "/c1/page=5/",
        catalog_page(&[tile("Laptop E", "5 000", IN_STOCK)]),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base_url, 5, dir.path());
    let summary = run_scrape(&config).await.expect("Scrape failed");

    assert_eq!(summary.pages_succeeded, 2);
    let rows = read_rows(&dir.path().join("products.csv"));
    let names: Vec<&str> = rows.iter().map(|r| r[0].as_str()).collect();
    assert_eq!(names, vec!["Laptop D", "Laptop E"]);
}

#[tokio::test]
async fn test_fetch_classifies_non_html_as_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("{}", "application/json"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), 1, dir.path());
    let client = build_http_client(&config.http).unwrap();
    let selectors = TileSelectors::new(&SelectorConfig::default()).unwrap();

    let result = fetch_and_extract(&client, &format!("{}/api/", server.uri()), &selectors)
        .await
        .unwrap();

    assert!(matches!(
        result,
        PageResult::Failed(PageFailure::ContentMismatch(_))
    ));
}

#[tokio::test]
async fn test_fetch_reports_status() {
    let server = MockServer::start().await;
    mount_status(&server, "/gone/", 404).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), 1, dir.path());
    let client = build_http_client(&config.http).unwrap();
    let selectors = TileSelectors::new(&SelectorConfig::default()).unwrap();

    let result = fetch_and_extract(&client, &format!("{}/gone/", server.uri()), &selectors)
        .await
        .unwrap();

    assert_eq!(result, PageResult::Failed(PageFailure::Status(404)));
    assert_eq!(result.count(), 0);
}

#[tokio::test]
async fn test_fetch_classifies_undecodable_body_as_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/c1/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-encoding", "gzip")
                .set_body_raw(b"definitely not gzip".to_vec(), "text/html"),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), 1, dir.path());
    let client = build_http_client(&config.http).unwrap();
    let selectors = TileSelectors::new(&SelectorConfig::default()).unwrap();

    let result = fetch_and_extract(&client, &format!("{}/c1/", server.uri()), &selectors)
        .await
        .unwrap();

    assert!(matches!(result, PageResult::Failed(PageFailure::Body(_))));
}

#[tokio::test]
async fn test_timeout_on_later_page_aborts_run() {
    let server = MockServer::start().await;
    let base_url = format!("{}/c1/", server.uri());

    mount_page(
        &server,
        "/c1/",
        catalog_page(&[
            tile("Laptop A", "1 000", IN_STOCK),
            tile("Laptop B", "2 000", IN_STOCK),
        ]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/c1/page=2/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(catalog_page(&[]), "text/html")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/c1/page=3/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&base_url, 3, dir.path());
    config.http.timeout_seconds = 1;

    let mut coordinator = Coordinator::from_config(&config).unwrap();
    let summary = coordinator.run().await.expect("Scrape failed");

    let timed_out = format!("{}page=2/", base_url);
    assert!(summary.aborted);
    assert_eq!(coordinator.state(), RunState::Aborted);
    assert_eq!(summary.pages_succeeded, 1);
    assert_eq!(summary.failed_urls, vec![timed_out.clone()]);

    // Page 1 rows survive the abort
    let rows = read_rows(&dir.path().join("products.csv"));
    let names: Vec<&str> = rows.iter().map(|r| r[0].as_str()).collect();
    assert_eq!(names, vec!["Laptop A", "Laptop B"]);

    let errors = std::fs::read_to_string(dir.path().join("errors_link.txt")).unwrap();
    assert_eq!(errors, format!("{}\n", timed_out));
}

/// Sink that cannot even start its output
struct BrokenCreateSink;

impl RecordSink for BrokenCreateSink {
    fn create(&mut self, _records: &[ProductRecord]) -> OutputResult<()> {
        Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only").into())
    }

    fn append(&mut self, _records: &[ProductRecord]) -> OutputResult<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_first_write_failure_records_url_and_aborts() {
    let server = MockServer::start().await;
    let base_url = format!("{}/c1/", server.uri());

    mount_page(
        &server,
        "/c1/",
        catalog_page(&[tile("Laptop A", "1 000", IN_STOCK)]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/c1/page=2/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base_url, 2, dir.path());
    let settings = ScrapeSettings::from_config(&config).unwrap();
    let client = build_http_client(&config.http).unwrap();

    let mut coordinator = Coordinator::new(settings, client, BrokenCreateSink);
    let result = coordinator.run().await;

    assert!(matches!(result, Err(ScrapeError::Output(_))));
    assert_eq!(coordinator.state(), RunState::Aborted);

    let errors = std::fs::read_to_string(dir.path().join("errors_link.txt")).unwrap();
    assert_eq!(errors, format!("{}\n", base_url));
}

/// Sink whose appends always fail
#[derive(Default)]
struct BrokenAppendSink {
    created: Vec<ProductRecord>,
}

impl RecordSink for BrokenAppendSink {
    fn create(&mut self, records: &[ProductRecord]) -> OutputResult<()> {
        self.created = records.to_vec();
        Ok(())
    }

    fn append(&mut self, _records: &[ProductRecord]) -> OutputResult<()> {
        Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full").into())
    }
}

#[tokio::test]
async fn test_unexpected_error_aborts_remaining_pages() {
    let server = MockServer::start().await;
    let base_url = format!("{}/c1/", server.uri());

    mount_page(
        &server,
        "/c1/",
        catalog_page(&[tile("Laptop A", "1 000", IN_STOCK)]),
    )
    .await;
    mount_page(
        &server,
        "/c1/page=2/",
        catalog_page(&[tile("Laptop B", "2 000", IN_STOCK)]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/c1/page=3/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base_url, 3, dir.path());
    let settings = ScrapeSettings::from_config(&config).unwrap();
    let client = build_http_client(&config.http).unwrap();

    let mut coordinator = Coordinator::new(settings, client, BrokenAppendSink::default());
    let summary = coordinator.run().await.expect("Scrape failed");

    assert!(summary.aborted);
    assert_eq!(coordinator.state(), RunState::Aborted);
    assert_eq!(summary.pages_succeeded, 1);
    assert_eq!(summary.goods_found, 1);
    assert_eq!(summary.failed_urls, vec![format!("{}page=2/", base_url)]);
    assert_eq!(coordinator.sink().created.len(), 1);
}
