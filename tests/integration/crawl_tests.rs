use image_scraper::config::{CrawlerConfig, DownloaderConfig, HttpConfig};
use image_scraper::{Downloader, Scraper};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a scraper with a small, fast configuration
fn create_test_scraper(concurrency: usize) -> Scraper {
    let config = CrawlerConfig {
        concurrency,
        inbox_capacity: 4,
    };
    let http = HttpConfig {
        timeout_secs: 10,
        ..HttpConfig::default()
    };
    Scraper::new(config, &http).expect("Failed to create scraper")
}

/// Mounts an HTML page that must be requested exactly once
async fn mount_page(server: &MockServer, page_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(server)
        .await;
}

fn seed(server: &MockServer) -> Url {
    Url::parse(&format!("{}/", server.uri())).expect("Failed to parse seed URL")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_full_crawl_with_downloads() {
    let site = MockServer::start().await;
    let other = MockServer::start().await;
    // Same machine, different host name: must not be followed
    let other_url = format!("http://localhost:{}/", other.address().port());

    mount_page(
        &site,
        "/",
        format!(
            r#"<html><body>
            <a href="/p2">Page 2</a>
            <a href="{}">Elsewhere</a>
            <img src="/i.jpg">
            </body></html>"#,
            other_url
        ),
    )
    .await;
    mount_page(
        &site,
        "/p2",
        r#"<html><body><a href="/">Home</a><img src="/i.jpg"></body></html>"#.to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/i.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"JPEGDATA".to_vec()))
        .expect(1)
        .mount(&site)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .expect(0)
        .mount(&other)
        .await;

    let dest = tempfile::TempDir::new().unwrap();
    let downloader = Arc::new(
        Downloader::new(
            &DownloaderConfig {
                concurrency: 4,
                queue_capacity: 8,
                dest_dir: Some(dest.path().to_path_buf()),
            },
            &HttpConfig::default(),
        )
        .expect("Failed to create downloader"),
    );

    let mut scraper = create_test_scraper(4);
    let queue = Arc::clone(&downloader);
    scraper.on_html_element("img", move |element| {
        if let Some(src) = element.absolute_attr("src") {
            queue.queue_blocking(&src).expect("Failed to queue download");
        }
    });

    let summary = scraper.scrape(&seed(&site)).await.expect("Crawl failed");
    let stats = downloader.stop().await;

    assert_eq!(summary.pages_crawled, 2);
    assert_eq!(summary.pages_failed, 0);
    assert_eq!(summary.urls_seen, 2);

    assert_eq!(stats.downloaded, 1);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.failed, 0);
    assert_eq!(
        std::fs::read(dest.path().join("i.jpg")).unwrap(),
        b"JPEGDATA".to_vec()
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_each_page_fetched_once_under_concurrency() {
    let site = MockServer::start().await;
    let pages: Vec<String> = (1..=10).map(|i| format!("/page{}", i)).collect();

    // Every page links to every page, including itself and the seed
    let mut links: String = pages
        .iter()
        .map(|p| format!(r#"<a href="{}">{}</a>"#, p, p))
        .collect();
    links.push_str(r#"<a href="/">home</a>"#);
    let body = format!("<html><body>{}</body></html>", links);

    mount_page(&site, "/", body.clone()).await;
    for page in &pages {
        mount_page(&site, page, body.clone()).await;
    }

    let summary = create_test_scraper(8)
        .scrape(&seed(&site))
        .await
        .expect("Crawl failed");

    assert_eq!(summary.pages_crawled, 11);
    assert_eq!(summary.urls_seen, 11);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_fetch_failures_do_not_abort_crawl() {
    let site = MockServer::start().await;

    mount_page(
        &site,
        "/",
        r#"<a href="/missing">broken</a><a href="/ok">fine</a>"#.to_string(),
    )
    .await;
    mount_page(&site, "/ok", r#"<a href="/ok/deeper">more</a>"#.to_string()).await;
    mount_page(&site, "/ok/deeper", "<p>end</p>".to_string()).await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&site)
        .await;

    let summary = create_test_scraper(2)
        .scrape(&seed(&site))
        .await
        .expect("Crawl failed");

    assert_eq!(summary.pages_crawled, 3);
    assert_eq!(summary.pages_failed, 1);
    assert_eq!(summary.urls_seen, 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_slow_pages_are_not_abandoned() {
    let site = MockServer::start().await;

    mount_page(&site, "/", r#"<a href="/slow">slow</a>"#.to_string()).await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"<a href="/after-slow">next</a>"#)
                .set_delay(Duration::from_millis(1500)),
        )
        .expect(1)
        .mount(&site)
        .await;
    mount_page(&site, "/after-slow", "<p>reached</p>".to_string()).await;

    let summary = create_test_scraper(3)
        .scrape(&seed(&site))
        .await
        .expect("Crawl failed");

    assert_eq!(summary.pages_crawled, 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_relative_resources_resolve_against_redirect_target() {
    let site = MockServer::start().await;

    mount_page(&site, "/", r#"<a href="/old">old</a>"#.to_string()).await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new/"))
        .mount(&site)
        .await;
    mount_page(&site, "/new/", r#"<img src="pic.png">"#.to_string()).await;

    let found = Arc::new(Mutex::new(Vec::new()));
    let sources = Arc::clone(&found);
    let mut scraper = create_test_scraper(2);
    scraper.on_html_element("img", move |element| {
        if let Some(src) = element.absolute_attr("src") {
            sources.lock().unwrap().push(src);
        }
    });

    scraper.scrape(&seed(&site)).await.expect("Crawl failed");

    assert_eq!(
        *found.lock().unwrap(),
        vec![format!("{}/new/pic.png", site.uri())]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_callbacks_see_links_outside_scope() {
    let site = MockServer::start().await;

    mount_page(
        &site,
        "/",
        r#"<a href="https://other.test/">out</a><a href="/in">in</a>"#.to_string(),
    )
    .await;
    mount_page(&site, "/in", "<p>inside</p>".to_string()).await;

    let found = Arc::new(Mutex::new(Vec::new()));
    let hrefs = Arc::clone(&found);
    let mut scraper = create_test_scraper(2);
    scraper.on_html_element("a", move |element| {
        if let Some(href) = element.absolute_attr("href") {
            hrefs.lock().unwrap().push(href);
        }
    });

    let summary = scraper.scrape(&seed(&site)).await.expect("Crawl failed");

    assert_eq!(summary.pages_crawled, 2);
    assert_eq!(
        *found.lock().unwrap(),
        vec![
            "https://other.test/".to_string(),
            format!("{}/in", site.uri())
        ]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cancellation_stops_running_crawl() {
    let site = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<p>never seen</p>")
                .set_delay(Duration::from_secs(30)),
        )
        .mount(&site)
        .await;

    let scraper = create_test_scraper(2);
    let cancel = scraper.cancellation_token();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        cancel.cancel();
    });

    let summary = tokio::time::timeout(Duration::from_secs(5), scraper.scrape(&seed(&site)))
        .await
        .expect("Cancelled crawl should return promptly")
        .expect("Crawl failed");

    assert_eq!(summary.pages_crawled, 0);
    assert_eq!(summary.urls_seen, 1);
}
