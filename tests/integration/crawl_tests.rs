//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use agent_atlas::config::{Config, CrawlerConfig, HttpConfig, OutputConfig, SiteConfig};
use agent_atlas::crawler::{
    build_http_client, Coordinator, Extractor, Fetcher, HeuristicExtractor, Pacer,
    PaginationWalker, Shutdown, StopReason,
};
use agent_atlas::record::{Category, DetailFields, DiscoverySource, PartialRecord};
use agent_atlas::storage::{JsonStore, SnapshotStore};
use agent_atlas::{Dataset, ScrapeError};
use scraper::Html;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with no politeness delay
fn create_test_config(root: &str, data_dir: &str) -> Config {
    Config {
        site: SiteConfig::new(root),
        crawler: CrawlerConfig {
            min_delay_ms: Some(0),
            max_delay_ms: Some(0),
            request_timeout_secs: Some(5),
            ..CrawlerConfig::default()
        },
        http: HttpConfig::default(),
        output: OutputConfig {
            data_dir: data_dir.to_string(),
            ..OutputConfig::default()
        },
    }
}

/// Listing page with one card per slug and an optional link to `next`
fn listing_page(base: &str, slugs: &[&str], next: Option<u32>) -> String {
    let mut html = String::from("<html><body><main>");
    for slug in slugs {
        html.push_str(&format!(
            r#"<div class="card"><a href="/agent/{0}"><h3>{0} title</h3></a>
               <p>{0} is an AI tool that helps teams ship faster</p><span>Free</span></div>"#,
            slug
        ));
    }
    if let Some(next) = next {
        html.push_str(&format!(r#"<a href="{}?page={}">Next</a>"#, base, next));
    }
    html.push_str("</main></body></html>");
    html
}

fn detail_page(slug: &str) -> String {
    format!(
        r#"<html><head>
            <meta name="description" content="{0} detail description">
            <meta property="og:title" content="{0} on the directory">
        </head><body>
            <h1>{0} heading</h1>
            <a href="https://{0}.example.org/">Website</a>
            <a href="/tags/productivity">productivity</a>
        </body></html>"#,
        slug
    )
}

async fn mount_listing(
    server: &MockServer,
    listing_path: &str,
    page: u32,
    body: String,
    expected_calls: u64,
) {
    let mock = Mock::given(method("GET")).and(path(listing_path));
    let (mock, priority) = if page > 1 {
        (mock.and(query_param("page", page.to_string())), 1)
    } else {
        (mock, 5)
    };
    mock.respond_with(ResponseTemplate::new(200).set_body_string(body))
        .with_priority(priority)
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn mount_details(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/agent/[^/]+$"))
        .respond_with(|request: &wiremock::Request| {
            let slug = request.url.path().trim_start_matches("/agent/").to_string();
            ResponseTemplate::new(200).set_body_string(detail_page(&slug))
        })
        .with_priority(5)
        .mount(server)
        .await;
}

fn slugs(prefix: &str, range: std::ops::RangeInclusive<u32>) -> Vec<String> {
    range.map(|i| format!("{}{}", prefix, i)).collect()
}

fn as_strs(values: &[String]) -> Vec<&str> {
    values.iter().map(String::as_str).collect()
}

fn load(dir: &TempDir, file: &str) -> Dataset {
    let text = std::fs::read_to_string(dir.path().join(file)).expect("file should exist");
    serde_json::from_str(&text).expect("valid dataset json")
}

struct WalkHarness {
    fetcher: Fetcher,
    extractor: HeuristicExtractor,
    pacer: Pacer,
    shutdown: Shutdown,
}

impl WalkHarness {
    fn new(server: &MockServer) -> Self {
        let client = build_http_client(&HttpConfig::default(), Duration::from_secs(5)).unwrap();
        Self {
            fetcher: Fetcher::new(client),
            extractor: HeuristicExtractor::new(&SiteConfig::new(server.uri())).unwrap(),
            pacer: Pacer::none(),
            shutdown: Shutdown::new(),
        }
    }

    fn walker(&self, max_pages: u32) -> PaginationWalker<'_> {
        PaginationWalker::new(&self.fetcher, &self.extractor, &self.pacer, &self.shutdown, max_pages)
    }
}

fn category(server: &MockServer, name: &str) -> Category {
    Category {
        name: name.to_string(),
        title: name.to_string(),
        url: format!("{}/categories/{}", server.uri(), name),
        count: None,
    }
}

#[tokio::test]
async fn test_two_page_category_stops_without_third_fetch() {
    let server = MockServer::start().await;
    let base = "/categories/writing";
    let first = slugs("w", 1..=5);
    let second = slugs("w", 6..=8);

    mount_listing(&server, base, 1, listing_page(base, &as_strs(&first), Some(2)), 1).await;
    mount_listing(&server, base, 2, listing_page(base, &as_strs(&second), None), 1).await;
    mount_listing(&server, base, 3, listing_page(base, &["never"], None), 0).await;

    let harness = WalkHarness::new(&server);
    let outcome = harness
        .walker(50)
        .scrape_category_pages(&category(&server, "writing"))
        .await;

    assert_eq!(outcome.records.len(), 8);
    assert_eq!(outcome.pages_fetched, 2);
    assert_eq!(outcome.stop, StopReason::NoNextPage);

    let pages: Vec<u32> = outcome.records.iter().map(|r| r.source.page).collect();
    assert_eq!(pages, vec![1, 1, 1, 1, 1, 2, 2, 2]);
    assert!(outcome
        .records
        .iter()
        .all(|r| r.category_hints == vec!["writing".to_string()]));
}

#[tokio::test]
async fn test_empty_page_stops_after_n_plus_one_fetches() {
    let server = MockServer::start().await;
    let base = "/categories/coding";

    mount_listing(&server, base, 1, listing_page(base, &["c1", "c2"], Some(2)), 1).await;
    mount_listing(&server, base, 2, listing_page(base, &["c3"], Some(3)), 1).await;
    mount_listing(&server, base, 3, listing_page(base, &[], Some(4)), 1).await;
    mount_listing(&server, base, 4, listing_page(base, &["never"], None), 0).await;

    let harness = WalkHarness::new(&server);
    let outcome = harness
        .walker(50)
        .scrape_category_pages(&category(&server, "coding"))
        .await;

    assert_eq!(outcome.pages_fetched, 3);
    assert_eq!(outcome.stop, StopReason::EmptyPage);
    assert_eq!(outcome.records.len(), 3);
}

#[tokio::test]
async fn test_page_ceiling_is_reported() {
    let server = MockServer::start().await;
    let base = "/categories/endless";

    for page in 1..=3 {
        let slug = format!("e{}", page);
        mount_listing(&server, base, page, listing_page(base, &[slug.as_str()], Some(page + 1)), 1).await;
    }
    mount_listing(&server, base, 4, listing_page(base, &["never"], Some(5)), 0).await;

    let harness = WalkHarness::new(&server);
    let outcome = harness
        .walker(3)
        .scrape_category_pages(&category(&server, "endless"))
        .await;

    assert_eq!(outcome.pages_fetched, 3);
    assert!(outcome.hit_ceiling());
    assert_eq!(outcome.records.len(), 3);
}

#[tokio::test]
async fn test_full_crawl_merges_roots_and_enriches() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body>
                <a href="/categories">All</a>
                <a href="/categories/writing">Writing 8 tools</a>
                <a href="/categories/coding">Coding</a>
            </body></html>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    mount_listing(&server, "/", 1, listing_page("/", &["m1", "m2", "w1"], None), 1).await;

    let writing = "/categories/writing";
    let first = slugs("w", 1..=5);
    let second = slugs("w", 6..=8);
    mount_listing(&server, writing, 1, listing_page(writing, &as_strs(&first), Some(2)), 1).await;
    mount_listing(&server, writing, 2, listing_page(writing, &as_strs(&second), None), 1).await;

    let coding = "/categories/coding";
    mount_listing(&server, coding, 1, listing_page(coding, &["w1", "c1"], None), 1).await;

    mount_details(&server).await;
    Mock::given(method("GET"))
        .and(path("/agent/w3"))
        .respond_with(ResponseTemplate::new(500))
        .with_priority(1)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server.uri(), &dir.path().display().to_string());
    config.crawler.checkpoint_every = 4;

    let mut coordinator = Coordinator::new(config, Shutdown::new()).unwrap();
    let report = coordinator.run().await.expect("crawl should succeed");

    // m1, m2, w1..w8, c1
    assert_eq!(report.statistics.total_agents, 11);
    assert_eq!(report.statistics.total_categories, 2);
    assert_eq!(report.pages_fetched, 4);
    assert!(report.ceiling_hits.is_empty());
    assert_eq!(report.enrichment.enriched, 10);
    assert_eq!(report.enrichment.failed, 1);

    let names: Vec<_> = coordinator.records().iter().map(|r| r.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["m1", "m2", "w1", "w2", "w3", "w4", "w5", "w6", "w7", "w8", "c1"]
    );

    let dataset = JsonStore::from_config(&OutputConfig {
        data_dir: dir.path().display().to_string(),
        ..OutputConfig::default()
    })
    .load_snapshot()
    .unwrap();
    assert_eq!(dataset.metadata.total_agents, 11);
    assert_eq!(dataset.metadata.source_url, server.uri());
    assert_eq!(dataset.categories[0].count, Some(8));

    let shared = dataset.records.iter().find(|r| r.name == "w1").unwrap();
    assert_eq!(shared.source, "main:page:1");
    assert_eq!(shared.title, "w1 title");
    assert_eq!(shared.categories, vec!["writing", "coding"]);
    assert_eq!(shared.pricing.as_deref(), Some("Free"));
    assert!(shared.enriched);
    assert_eq!(shared.tags, vec!["productivity"]);
    assert_eq!(shared.external_links, vec!["https://w1.example.org/"]);
    assert_eq!(shared.detail_metadata["detailed_title"], "w1 heading");
    assert_eq!(shared.detail_metadata["meta_og_title"], "w1 on the directory");

    let failed = dataset.records.iter().find(|r| r.name == "w3").unwrap();
    assert!(!failed.enriched);
    assert!(failed.tags.is_empty());

    // Checkpoints every 4 visited records: 4 and 8
    assert_eq!(load(&dir, "ai_agents_progress_4.json").metadata.total_agents, 4);
    assert_eq!(load(&dir, "ai_agents_progress_8.json").metadata.total_agents, 8);
    assert!(!dir.path().join("ai_agents_progress_12.json").exists());
    assert!(!dir.path().join("ai_agents_progress_interrupted.json").exists());
}

#[tokio::test]
async fn test_snapshot_omits_absent_fields() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/categories"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_listing(
        &server,
        "/",
        1,
        r#"<html><body><a href="/agent/bare">Bare</a></body></html>"#.to_string(),
        1,
    )
    .await;

    let mut config = create_test_config(&server.uri(), &dir.path().display().to_string());
    config.crawler.enrich_limit = 0;

    let mut coordinator = Coordinator::new(config, Shutdown::new()).unwrap();
    let report = coordinator.run().await.unwrap();
    assert_eq!(report.statistics.total_categories, 0);

    let text = std::fs::read_to_string(&report.database_path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();

    let agent = &json["agents"][0];
    assert_eq!(agent["title"], "Bare");
    assert_eq!(agent["enriched"], false);
    assert!(agent.get("description").is_none());
    assert!(agent.get("pricing").is_none());
    assert!(agent.get("tags").is_none());
    assert_eq!(json["metadata"]["total_agents"], 1);
    assert!(json["metadata"]["scraped_at"].is_string());
}

/// Where `InterruptingExtractor` requests shutdown
#[derive(Clone, Copy)]
enum InterruptAt {
    /// After this many listing pages have been extracted
    Listing(usize),
    /// After this many detail pages have been extracted
    Detail(usize),
}

/// Delegates to the heuristic extractor and requests shutdown once a fixed
/// number of pages of one kind have been seen
struct InterruptingExtractor {
    inner: HeuristicExtractor,
    shutdown: Shutdown,
    listings_seen: AtomicUsize,
    details_seen: AtomicUsize,
    interrupt_at: InterruptAt,
}

impl InterruptingExtractor {
    fn new(config: &Config, shutdown: &Shutdown, interrupt_at: InterruptAt) -> Self {
        Self {
            inner: HeuristicExtractor::new(&config.site).unwrap(),
            shutdown: shutdown.clone(),
            listings_seen: AtomicUsize::new(0),
            details_seen: AtomicUsize::new(0),
            interrupt_at,
        }
    }
}

impl Extractor for InterruptingExtractor {
    fn extract_categories(&self, document: &Html, page_url: &Url) -> Vec<Category> {
        self.inner.extract_categories(document, page_url)
    }

    fn extract_listing_items(
        &self,
        document: &Html,
        page_url: &Url,
        source: &DiscoverySource,
    ) -> Vec<PartialRecord> {
        let seen = self.listings_seen.fetch_add(1, Ordering::SeqCst) + 1;
        if let InterruptAt::Listing(limit) = self.interrupt_at {
            if seen == limit {
                self.shutdown.trigger();
            }
        }
        self.inner.extract_listing_items(document, page_url, source)
    }

    fn extract_detail(&self, document: &Html, page_url: &Url) -> DetailFields {
        let seen = self.details_seen.fetch_add(1, Ordering::SeqCst) + 1;
        if let InterruptAt::Detail(limit) = self.interrupt_at {
            if seen == limit {
                self.shutdown.trigger();
            }
        }
        self.inner.extract_detail(document, page_url)
    }

    fn has_next_page(&self, document: &Html, page_url: &Url, next_page: u32) -> bool {
        self.inner.has_next_page(document, page_url, next_page)
    }
}

#[tokio::test]
async fn test_interrupt_during_listing_checkpoints_aggregated_records() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body>
                <a href="/categories/writing">Writing</a>
                <a href="/categories/coding">Coding</a>
            </body></html>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;
    mount_listing(&server, "/", 1, listing_page("/", &["m1", "m2", "m3"], None), 1).await;

    let writing = "/categories/writing";
    mount_listing(&server, writing, 1, listing_page(writing, &["w1"], None), 0).await;
    let coding = "/categories/coding";
    mount_listing(&server, coding, 1, listing_page(coding, &["c1"], None), 0).await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/agent/[^/]+$"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), &dir.path().display().to_string());
    let shutdown = Shutdown::new();
    let extractor = InterruptingExtractor::new(&config, &shutdown, InterruptAt::Listing(1));

    let mut coordinator = Coordinator::new(config, shutdown)
        .unwrap()
        .with_extractor(Box::new(extractor));
    let result = coordinator.run().await;

    assert!(matches!(result, Err(ScrapeError::Interrupted)));
    assert!(!dir.path().join("ai_agents_database.json").exists());

    let checkpoint = load(&dir, "ai_agents_progress_interrupted.json");
    assert_eq!(checkpoint.metadata.total_agents, 3);
    let names: Vec<_> = checkpoint.records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["m1", "m2", "m3"]);
    assert!(checkpoint.records.iter().all(|r| !r.enriched));

    let categories: Vec<_> = checkpoint.categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(categories, vec!["writing", "coding"]);
}

#[tokio::test]
async fn test_interrupt_during_enrichment_checkpoints_visited_records() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;
    let items = slugs("a", 1..=6);
    mount_listing(&server, "/", 1, listing_page("/", &as_strs(&items), None), 1).await;
    mount_details(&server).await;

    let config = create_test_config(&server.uri(), &dir.path().display().to_string());
    let shutdown = Shutdown::new();
    let extractor = InterruptingExtractor::new(&config, &shutdown, InterruptAt::Detail(3));

    let mut coordinator = Coordinator::new(config, shutdown)
        .unwrap()
        .with_extractor(Box::new(extractor));
    let result = coordinator.run().await;

    assert!(matches!(result, Err(ScrapeError::Interrupted)));
    assert!(!dir.path().join("ai_agents_database.json").exists());

    let checkpoint = load(&dir, "ai_agents_progress_interrupted.json");
    assert_eq!(checkpoint.metadata.total_agents, 3);
    assert_eq!(checkpoint.records.len(), 3);
    assert!(checkpoint.records.iter().all(|r| r.enriched));
    assert_eq!(checkpoint.records[0].name, "a1");
}

#[tokio::test]
async fn test_persistence_failure_is_fatal() {
    let server = MockServer::start().await;
    let blocker = tempfile::NamedTempFile::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/categories"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_listing(&server, "/", 1, listing_page("/", &["a1", "a2"], None), 1).await;
    mount_details(&server).await;

    // A regular file where the data directory should be
    let mut config = create_test_config(&server.uri(), &blocker.path().display().to_string());
    config.crawler.checkpoint_every = 1;

    let mut coordinator = Coordinator::new(config, Shutdown::new()).unwrap();
    let result = coordinator.run().await;

    assert!(matches!(result, Err(ScrapeError::Persistence(_))));
}
