//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use crawly::config::Config;
use crawly::crawler::{CrawlReport, Crawler, SeedSource};
use std::collections::HashSet;
use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration writing everything under `dir`
fn create_test_config(dir: &Path) -> Config {
    let mut config = Config::default();
    config.crawler.fetchers = 2;
    config.crawler.extractors = 2;
    config.crawler.throttle_ms = 0;
    config.crawler.request_timeout_secs = 10;
    config.crawler.shutdown_grace_ms = 2000;
    config.user_agent.crawler_name = "TestBot".to_string();
    config.output.root = dir.join("mirror").to_string_lossy().into_owned();
    config
}

/// Mounts HEAD and GET responses for one path
async fn mount_resource(server: &MockServer, at: &str, content_type: &str, body: Vec<u8>) {
    Mock::given(method("HEAD"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", content_type))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", content_type)
                .set_body_bytes(body),
        )
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, at: &str, html: &str) {
    mount_resource(server, at, "text/html; charset=utf-8", html.as_bytes().to_vec()).await;
}

async fn run_crawl(crawler: Crawler) -> CrawlReport {
    tokio::time::timeout(Duration::from_secs(30), crawler.run())
        .await
        .expect("crawl did not finish in time")
        .expect("crawl failed")
}

fn set(items: &[&str]) -> HashSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_relative_link_discovered_with_referrer() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        r#"<html><body><a href="page1">Page 1</a></body></html>"#,
    )
    .await;
    mount_page(&server, "/page1", "<html><body>Leaf</body></html>").await;

    let crawler = Crawler::new(
        create_test_config(dir.path()),
        SeedSource::Urls(vec![format!("{}/", base)]),
    )
    .unwrap();
    let ledger = crawler.ledger();

    let report = run_crawl(crawler).await;

    assert!(report.drained);
    assert_eq!(report.stats.visited, 2);
    assert_eq!(report.stats.extracted, 2);
    assert_eq!(
        ledger.referrers_of(&format!("{}/page1", base)),
        set(&[&format!("{}/", base)])
    );
    assert_eq!(report.urls_seen, 2);
}

#[tokio::test]
async fn test_fan_in_fetched_once_with_all_referrers() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/a">A</a><a href="/b">B</a></body></html>"#,
    )
    .await;
    mount_page(&server, "/a", r#"<a href="/c">C from A</a>"#).await;
    mount_page(&server, "/b", r#"<a href="/c">C from B</a>"#).await;

    Mock::given(method("HEAD"))
        .and(path("/c"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "text/html"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/c"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string("<p>shared</p>"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let crawler = Crawler::new(
        create_test_config(dir.path()),
        SeedSource::Urls(vec![format!("{}/", base)]),
    )
    .unwrap();
    let ledger = crawler.ledger();

    let report = run_crawl(crawler).await;

    assert!(report.drained);
    assert_eq!(report.stats.visited, 4);
    assert!(report.stats.rejected >= 1);
    assert_eq!(
        ledger.referrers_of(&format!("{}/c", base)),
        set(&[&format!("{}/a", base), &format!("{}/b", base)])
    );

    server.verify().await;
}

#[tokio::test]
async fn test_unreachable_seed_does_not_stop_crawl() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();
    let visited_log = dir.path().join("visited.urls");

    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/next">Next</a></body></html>"#,
    )
    .await;
    mount_page(&server, "/next", "<p>end</p>").await;

    let mut config = create_test_config(dir.path());
    config.hooks.visitors = vec!["visited-log".to_string()];
    config.output.visited_log = Some(visited_log.to_string_lossy().into_owned());

    let crawler = Crawler::new(
        config,
        SeedSource::Urls(vec![
            "http://127.0.0.1:1/".to_string(),
            format!("{}/", base),
        ]),
    )
    .unwrap();

    let report = run_crawl(crawler).await;

    assert!(report.drained);
    assert_eq!(report.stats.fetch_failures, 1);
    assert_eq!(report.stats.visited, 3);

    let content = std::fs::read_to_string(&visited_log).unwrap();
    let lines: HashSet<String> = content.lines().map(str::to_string).collect();
    assert_eq!(
        lines,
        set(&[
            "http://127.0.0.1:1/",
            &format!("{}/", base),
            &format!("{}/next\t{}/", base, base),
        ])
    );
}

#[tokio::test]
async fn test_downloadable_is_persisted_not_extracted() {
    let server = MockServer::start().await;
    let base = server.uri();
    let port = url::Url::parse(&base).unwrap().port().unwrap();
    let dir = TempDir::new().unwrap();

    let jpeg: Vec<u8> = [0xff, 0xd8, 0xff, 0xe0]
        .into_iter()
        .chain((0..200_000u32).map(|i| (i % 251) as u8))
        .collect();

    mount_page(
        &server,
        "/",
        r#"<html><body><img src="/img/cat.jpg"></body></html>"#,
    )
    .await;
    mount_resource(&server, "/img/cat.jpg", "image/jpeg", jpeg.clone()).await;

    let mut config = create_test_config(dir.path());
    config.crawler.chunk_size = 4096;
    let crawler = Crawler::new(config, SeedSource::Urls(vec![format!("{}/", base)])).unwrap();

    let report = run_crawl(crawler).await;

    assert!(report.drained);
    assert_eq!(report.stats.extracted, 1);
    assert_eq!(report.stats.visited, 2);

    let stored = dir
        .path()
        .join("mirror")
        .join(format!("127.0.0.1_{}", port))
        .join("img")
        .join("cat.jpg");
    assert_eq!(std::fs::read(&stored).unwrap(), jpeg);

    // Hypertext is not mirrored by default
    assert!(!dir
        .path()
        .join("mirror")
        .join(format!("127.0.0.1_{}", port))
        .join("index.html")
        .exists());
}

#[tokio::test]
async fn test_shutdown_mid_crawl_is_bounded() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();

    let links: String = (0..10)
        .map(|i| format!(r#"<a href="/slow{}">slow</a>"#, i))
        .collect();
    mount_page(&server, "/", &format!("<html><body>{}</body></html>", links)).await;

    Mock::given(method("HEAD"))
        .and(path_regex("^/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_delay(Duration::from_secs(20)),
        )
        .mount(&server)
        .await;

    let mut config = create_test_config(dir.path());
    config.crawler.shutdown_grace_ms = 300;
    let crawler = Crawler::new(config, SeedSource::Urls(vec![format!("{}/", base)])).unwrap();
    let ledger = crawler.ledger();
    let handle = crawler.shutdown_handle();

    let started = Instant::now();
    let crawl = tokio::spawn(crawler.run());

    tokio::time::sleep(Duration::from_millis(500)).await;
    handle.request();

    let report = tokio::time::timeout(Duration::from_secs(5), crawl)
        .await
        .expect("shutdown did not complete within the grace period")
        .unwrap()
        .unwrap();

    assert!(!report.drained);
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(report.tasks.panicked, 0);

    // Everything in the ledger was admitted once; nothing half-recorded
    assert!(ledger.seen(&format!("{}/", base)));
    assert_eq!(ledger.len(), report.urls_seen);
    assert!(report.stats.visited < report.urls_seen as u64);
}

#[tokio::test]
async fn test_empty_seeds_drain_immediately() {
    let dir = TempDir::new().unwrap();
    let crawler = Crawler::new(create_test_config(dir.path()), SeedSource::Urls(Vec::new())).unwrap();

    let report = run_crawl(crawler).await;

    assert!(report.drained);
    assert_eq!(report.urls_seen, 0);
    assert_eq!(report.stats.discovered, 0);
}

#[tokio::test]
async fn test_error_status_is_visited() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/", r#"<a href="/missing">gone</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let crawler = Crawler::new(
        create_test_config(dir.path()),
        SeedSource::Urls(vec![format!("{}/", base)]),
    )
    .unwrap();

    let report = run_crawl(crawler).await;

    assert!(report.drained);
    assert_eq!(report.stats.fetched, 1);
    assert_eq!(report.stats.fetch_failures, 1);
    assert_eq!(report.stats.visited, 2);
}

#[tokio::test]
async fn test_same_host_acceptor_stays_on_host() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        r#"<a href="http://elsewhere.invalid/">away</a><a href="/local">here</a>"#,
    )
    .await;
    mount_page(&server, "/local", "<p>local</p>").await;

    let mut config = create_test_config(dir.path());
    config.hooks.acceptors = vec!["same-host".to_string(), "history".to_string()];

    let crawler = Crawler::new(config, SeedSource::Urls(vec![format!("{}/", base)])).unwrap();
    let ledger = crawler.ledger();

    let report = run_crawl(crawler).await;

    assert!(report.drained);
    assert_eq!(report.stats.fetched, 2);
    assert_eq!(report.stats.rejected, 1);
    assert!(!ledger.seen("http://elsewhere.invalid/"));
}

#[tokio::test]
async fn test_seed_file_and_srcset() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        "/gallery",
        r#"<img src="/small.png" srcset="/small.png 1x, /large.png 2x">"#,
    )
    .await;
    mount_resource(&server, "/small.png", "image/png", b"small".to_vec()).await;
    mount_resource(&server, "/large.png", "image/png", b"large".to_vec()).await;

    let seeds = dir.path().join("input");
    std::fs::write(&seeds, format!("# gallery seed\n\n{}/gallery\n", base)).unwrap();

    let mut config = create_test_config(dir.path());
    config.hooks.parsing_handlers = vec!["srcset".to_string()];

    let crawler = Crawler::new(config, SeedSource::File(seeds)).unwrap();
    let ledger = crawler.ledger();

    let report = run_crawl(crawler).await;

    assert!(report.drained);
    assert_eq!(report.stats.visited, 3);
    assert!(ledger.seen(&format!("{}/large.png", base)));
    assert_eq!(
        ledger.referrers_of(&format!("{}/small.png", base)),
        set(&[&format!("{}/gallery", base)])
    );
}

#[tokio::test]
async fn test_url_spellings_share_one_ledger_entry() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();

    Mock::given(method("HEAD"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "text/html"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string(format!(
                    r#"<a href="/">home</a><a href="{}">again</a>"#,
                    base.replacen("http://", "HTTP://", 1)
                )),
        )
        .expect(1)
        .mount(&server)
        .await;

    // Seeded without the trailing slash the page links back with
    let crawler = Crawler::new(
        create_test_config(dir.path()),
        SeedSource::Urls(vec![base.clone()]),
    )
    .unwrap();
    let ledger = crawler.ledger();

    let report = run_crawl(crawler).await;

    assert!(report.drained);
    assert_eq!(report.stats.fetched, 1);
    assert_eq!(report.stats.visited, 1);
    assert_eq!(report.stats.rejected, 2);
    assert_eq!(ledger.all_seen_urls(), vec![format!("{}/", base)]);
    assert_eq!(
        ledger.referrers_of(&format!("{}/", base)),
        set(&[&format!("{}/", base)])
    );

    server.verify().await;
}

#[tokio::test]
async fn test_unknown_kind_is_neither_extracted_nor_mirrored() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();

    // No usable metadata: the probe gets a 405 without a content type
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(405))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string(r#"<html><body><a href="/next">next</a></body></html>"#),
        )
        .mount(&server)
        .await;

    let crawler = Crawler::new(
        create_test_config(dir.path()),
        SeedSource::Urls(vec![format!("{}/", base)]),
    )
    .unwrap();
    let ledger = crawler.ledger();

    let report = run_crawl(crawler).await;

    assert!(report.drained);
    assert_eq!(report.stats.fetched, 1);
    assert_eq!(report.stats.extracted, 0);
    assert_eq!(report.stats.visited, 1);
    assert_eq!(report.stats.links_found, 0);
    assert!(!ledger.seen(&format!("{}/next", base)));

    let mirror = dir.path().join("mirror");
    let mirrored = std::fs::read_dir(&mirror)
        .map(|entries| entries.count())
        .unwrap_or(0);
    assert_eq!(mirrored, 0);
}
