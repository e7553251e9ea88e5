//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use std::time::Duration;
use web_status_checker::config::Config;
use web_status_checker::crawler::run_crawl_with_config;
use web_status_checker::{CrawlRun, ExtractError, LinkRecord, LinkStatus, SourceType};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with short timeouts and no backoff to speak of
fn create_test_config() -> Config {
    let mut config = Config::default();
    config.crawler.request_timeout_secs = 2;
    config.crawler.extract_timeout_secs = 1;
    config.crawler.extract_attempts = 3;
    config.crawler.retries = 0;
    config.crawler.retry_backoff_ms = 10;
    config.crawler.max_concurrent_checks = 4;
    config
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<html><head><title>Test</title></head><body>{}</body></html>", body),
        "text/html",
    )
}

async fn mount_page(server: &MockServer, page: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(html(body))
        .mount(server)
        .await;
}

async fn mount_head(server: &MockServer, page: &str, status: u16) {
    Mock::given(method("HEAD"))
        .and(path(page))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

async fn crawl(start_url: &str, follow: bool, max_depth: u32, config: &Config) -> Vec<LinkRecord> {
    let run = CrawlRun::new(start_url, follow, max_depth).expect("valid start URL");
    run_crawl_with_config(run, config)
        .await
        .expect("start page should be readable")
}

fn find<'a>(records: &'a [LinkRecord], url: &str) -> &'a LinkRecord {
    records
        .iter()
        .find(|r| r.url == url)
        .unwrap_or_else(|| panic!("no record for {}; got {:?}", url, records))
}

#[tokio::test]
async fn test_two_anchors_without_following() {
    let site = MockServer::start().await;
    let external = MockServer::start().await;
    let base = site.uri();

    mount_page(
        &site,
        "/",
        &format!(
            r#"<a href="/about">About</a> <a href="{}/x">Broken</a>"#,
            external.uri()
        ),
    )
    .await;
    mount_head(&site, "/about", 200).await;
    mount_head(&external, "/x", 404).await;

    let records = crawl(&format!("{}/", base), false, 3, &create_test_config()).await;

    assert_eq!(records.len(), 2);

    let about = find(&records, &format!("{}/about", base));
    assert_eq!(about.status, LinkStatus::Http(200));
    assert_eq!(about.source_type, SourceType::Anchor);
    assert_eq!(about.source_url, format!("{}/", base));
    assert_eq!(about.redirect_count, 0);
    assert_eq!(about.final_url, about.url);

    let broken = find(&records, &format!("{}/x", external.uri()));
    assert_eq!(broken.status, LinkStatus::Http(404));
    assert_eq!(broken.note, "Not Found: The resource could not be found.");
}

#[tokio::test]
async fn test_redirect_is_recorded() {
    let site = MockServer::start().await;
    let base = site.uri();

    mount_page(&site, "/", r#"<a href="/old">Old</a>"#).await;
    Mock::given(method("HEAD"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/new"))
        .mount(&site)
        .await;
    mount_head(&site, "/new", 200).await;

    let records = crawl(&format!("{}/", base), false, 0, &create_test_config()).await;

    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.url, format!("{}/old", base));
    assert_eq!(record.status, LinkStatus::Http(200));
    assert_eq!(record.redirect_count, 1);
    assert_eq!(record.final_url, format!("{}/new", base));
    assert_eq!(
        record.redirect_chain,
        vec![format!("{}/old", base), format!("{}/new", base)]
    );
    assert!(record.note.contains("Redirected 1×"));
    assert!(record.note.contains(&format!("{}/new", base)));
}

#[tokio::test]
async fn test_redirect_loop_is_an_error() {
    let site = MockServer::start().await;
    let base = site.uri();

    mount_page(&site, "/", r#"<a href="/loop-a">Loop</a>"#).await;
    Mock::given(method("HEAD"))
        .and(path("/loop-a"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/loop-b"))
        .mount(&site)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/loop-b"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/loop-a"))
        .mount(&site)
        .await;

    let records = crawl(&format!("{}/", base), false, 0, &create_test_config()).await;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, LinkStatus::Error);
    assert_eq!(records[0].note, "RequestError:RedirectLoop");
    assert!(records[0].redirect_chain.is_empty());
    assert_eq!(records[0].redirect_count, 0);
}

#[tokio::test]
async fn test_start_page_timeout_fails_the_crawl() {
    let site = MockServer::start().await;
    let base = site.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<a href=\"/never\">x</a>").set_delay(Duration::from_secs(5)))
        .expect(3)
        .mount(&site)
        .await;

    let run = CrawlRun::new(&format!("{}/", base), true, 2).unwrap();
    let failure = run_crawl_with_config(run, &create_test_config())
        .await
        .unwrap_err();

    assert!(failure.records.is_empty());
    assert!(matches!(failure.error, ExtractError::Transport { .. }));
    assert!(failure.to_string().contains("Could not read start page"));
}

#[tokio::test]
async fn test_non_html_start_page_fails_the_crawl() {
    let site = MockServer::start().await;
    let base = site.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("%PDF-1.4", "application/pdf"))
        .mount(&site)
        .await;

    let run = CrawlRun::new(&format!("{}/", base), false, 0).unwrap();
    let failure = run_crawl_with_config(run, &create_test_config())
        .await
        .unwrap_err();

    assert_eq!(
        failure.error,
        ExtractError::NonHtmlContent {
            content_type: "application/pdf".to_string()
        }
    );
}

/// Mounts a chain of pages: / -> /a -> /b -> /c, every link answering HEAD with 200
async fn mount_chain(site: &MockServer) {
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200))
        .mount(site)
        .await;
    mount_page(site, "/", r#"<a href="/a">A</a>"#).await;
    mount_page(site, "/a", r#"<a href="/b">B</a>"#).await;
    mount_page(site, "/b", r#"<a href="/c">C</a>"#).await;
    mount_page(site, "/c", r#"<p>end</p>"#).await;
}

#[tokio::test]
async fn test_max_depth_zero_expands_nothing() {
    let site = MockServer::start().await;
    let base = site.uri();
    mount_chain(&site).await;

    let records = crawl(&format!("{}/", base), true, 0, &create_test_config()).await;

    let urls: Vec<_> = records.iter().map(|r| r.url.clone()).collect();
    assert_eq!(urls, vec![format!("{}/a", base)]);
}

#[tokio::test]
async fn test_max_depth_bounds_recursion() {
    let site = MockServer::start().await;
    let base = site.uri();
    mount_chain(&site).await;

    let records = crawl(&format!("{}/", base), true, 1, &create_test_config()).await;

    let urls: Vec<_> = records.iter().map(|r| r.url.clone()).collect();
    assert_eq!(urls, vec![format!("{}/a", base), format!("{}/b", base)]);

    let b = find(&records, &format!("{}/b", base));
    assert_eq!(b.source_url, format!("{}/a", base));
    assert_eq!(b.source_type, SourceType::Anchor);

    let deeper = crawl(&format!("{}/", base), true, 2, &create_test_config()).await;
    assert_eq!(deeper.len(), 3);
    assert_eq!(find(&deeper, &format!("{}/c", base)).source_url, format!("{}/b", base));
}

#[tokio::test]
async fn test_unreadable_page_does_not_stop_expansion() {
    let site = MockServer::start().await;
    let base = site.uri();

    mount_page(&site, "/", r#"<a href="/a">A</a> <a href="/b">B</a>"#).await;
    mount_head(&site, "/a", 200).await;
    mount_head(&site, "/b", 200).await;
    mount_head(&site, "/b/child", 200).await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4".to_vec(), "application/pdf"),
        )
        .mount(&site)
        .await;
    mount_page(&site, "/b", r#"<a href="/b/child">Child</a>"#).await;

    let run = CrawlRun::new(&format!("{}/", base), true, 1).unwrap();
    let result = run_crawl_with_config(run, &create_test_config()).await;
    assert!(result.is_ok());
    let records = result.unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(find(&records, &format!("{}/a", base)).status, LinkStatus::Http(200));

    let child = find(&records, &format!("{}/b/child", base));
    assert_eq!(child.status, LinkStatus::Http(200));
    assert_eq!(child.source_url, format!("{}/b", base));

    let a = format!("{}/a", base);
    assert!(records.iter().all(|r| r.source_url != a));
}

#[tokio::test]
async fn test_broken_links_are_not_expanded() {
    let site = MockServer::start().await;
    let base = site.uri();

    mount_page(&site, "/", r#"<a href="/gone">Gone</a>"#).await;
    mount_head(&site, "/gone", 404).await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(html(r#"<a href="/hidden">Hidden</a>"#))
        .expect(0)
        .mount(&site)
        .await;

    let records = crawl(&format!("{}/", base), true, 5, &create_test_config()).await;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, LinkStatus::Http(404));
}

#[tokio::test]
async fn test_sitemap_and_form_discovery_with_dedup() {
    let site = MockServer::start().await;
    let base = site.uri();

    mount_page(
        &site,
        "/",
        r#"
        <a href="/about">About</a>
        <a href="javascript:void(0)">Menu</a>
        <a href="">Empty</a>
        <form action="/about" method="post"></form>
        <form action="/subscribe" method="post"></form>
        "#,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>{0}/about</loc></url>
  <url><loc>{0}/pricing</loc></url>
</urlset>"#,
                base
            ),
            "application/xml",
        ))
        .mount(&site)
        .await;

    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&site)
        .await;

    let records = crawl(&format!("{}/", base), false, 0, &create_test_config()).await;

    assert_eq!(records.len(), 3);

    let about = find(&records, &format!("{}/about", base));
    assert_eq!(about.source_type, SourceType::Anchor);

    let pricing = find(&records, &format!("{}/pricing", base));
    assert_eq!(pricing.source_type, SourceType::Sitemap);
    assert_eq!(pricing.source_url, format!("{}/", base));

    let subscribe = find(&records, &format!("{}/subscribe", base));
    assert_eq!(subscribe.source_type, SourceType::Form);
    assert_eq!(subscribe.source_url, format!("{}/", base));

    assert!(records
        .iter()
        .all(|r| !r.url.is_empty() && !r.url.to_lowercase().starts_with("javascript:")));
}

#[tokio::test]
async fn test_missing_sitemap_is_ignored() {
    let site = MockServer::start().await;
    let base = site.uri();

    mount_page(&site, "/", r#"<a href="/ok">OK</a>"#).await;
    mount_head(&site, "/ok", 200).await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&site)
        .await;

    let records = crawl(&format!("{}/", base), false, 0, &create_test_config()).await;
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn test_urls_checked_once_across_depths() {
    let site = MockServer::start().await;
    let base = site.uri();

    Mock::given(method("HEAD"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&site)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/b"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&site)
        .await;
    mount_page(&site, "/", r#"<a href="/a">A</a><a href="/b">B</a>"#).await;
    mount_page(&site, "/a", r#"<a href="/b">B</a><a href="/">Home</a>"#).await;
    mount_page(&site, "/b", r#"<a href="/a">A</a>"#).await;

    let records = crawl(&format!("{}/", base), true, 3, &create_test_config()).await;

    let mut urls: Vec<_> = records.iter().map(|r| r.url.clone()).collect();
    urls.sort();
    assert_eq!(urls, vec![format!("{}/a", base), format!("{}/b", base)]);
}

#[tokio::test]
async fn test_head_not_allowed_falls_back_to_get() {
    let site = MockServer::start().await;
    let base = site.uri();

    mount_page(&site, "/", r#"<a href="/no-head">No HEAD</a>"#).await;
    mount_head(&site, "/no-head", 405).await;
    Mock::given(method("GET"))
        .and(path("/no-head"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&site)
        .await;

    let records = crawl(&format!("{}/", base), false, 0, &create_test_config()).await;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, LinkStatus::Http(200));
}

#[tokio::test]
async fn test_binary_links_use_head_only() {
    let site = MockServer::start().await;
    let base = site.uri();

    mount_page(
        &site,
        "/",
        r#"<a href="/files/report.PDF">Report</a><a href="/files/pic.png">Pic</a>"#,
    )
    .await;
    mount_head(&site, "/files/report.PDF", 405).await;
    mount_head(&site, "/files/pic.png", 200).await;
    Mock::given(method("GET"))
        .and(path("/files/report.PDF"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&site)
        .await;

    let records = crawl(&format!("{}/", base), true, 3, &create_test_config()).await;

    assert_eq!(records.len(), 2);
    let pdf = find(&records, &format!("{}/files/report.PDF", base));
    assert_eq!(pdf.status, LinkStatus::Http(405));
    assert!(pdf.note.ends_with("(binary file)"));

    let png = find(&records, &format!("{}/files/pic.png", base));
    assert_eq!(png.status, LinkStatus::Http(200));
    assert!(png.note.contains("(binary file)"));
}

#[tokio::test]
async fn test_gateway_error_is_retried_once() {
    let site = MockServer::start().await;
    let base = site.uri();

    mount_page(&site, "/", r#"<a href="/flaky">Flaky</a><a href="/down">Down</a>"#).await;
    Mock::given(method("HEAD"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(522))
        .up_to_n_times(1)
        .expect(1)
        .mount(&site)
        .await;
    mount_head(&site, "/flaky", 200).await;
    Mock::given(method("HEAD"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(520))
        .expect(2)
        .mount(&site)
        .await;

    let records = crawl(&format!("{}/", base), false, 0, &create_test_config()).await;

    assert_eq!(find(&records, &format!("{}/flaky", base)).status, LinkStatus::Http(200));

    let down = find(&records, &format!("{}/down", base));
    assert_eq!(down.status, LinkStatus::Http(520));
    assert_eq!(down.note, "Unexpected status code.");
}

#[tokio::test]
async fn test_unreachable_link_is_error_after_retries() {
    let site = MockServer::start().await;
    let base = site.uri();

    // Grab a free port and close it again so nothing is listening there
    let closed_port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let dead = format!("http://127.0.0.1:{}/dead", closed_port);

    mount_page(&site, "/", &format!(r#"<a href="{}">Dead</a>"#, dead)).await;

    let mut config = create_test_config();
    config.crawler.retries = 2;

    let records = crawl(&format!("{}/", base), false, 0, &config).await;

    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.url, dead);
    assert_eq!(record.status, LinkStatus::Error);
    assert_eq!(record.note, "RequestError:Connect");
    assert_eq!(record.final_url, dead);
    assert_eq!(record.redirect_count, 0);
    assert!(record.redirect_chain.is_empty());
}

#[tokio::test]
async fn test_cancellation_keeps_partial_results() {
    let site = MockServer::start().await;
    let base = site.uri();

    mount_page(&site, "/", r#"<a href="/fast">Fast</a><a href="/slow">Slow</a>"#).await;
    mount_head(&site, "/fast", 200).await;
    Mock::given(method("HEAD"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(10)))
        .mount(&site)
        .await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&site)
        .await;

    let mut config = create_test_config();
    config.crawler.request_timeout_secs = 30;

    let run = CrawlRun::new(&format!("{}/", base), true, 3).unwrap();
    let cancel = run.cancellation().clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        cancel.cancel();
    });

    let started = std::time::Instant::now();
    let records = run_crawl_with_config(run, &config).await.unwrap();
    assert!(started.elapsed() < Duration::from_secs(5));

    assert_eq!(records.len(), 2);
    assert_eq!(find(&records, &format!("{}/fast", base)).status, LinkStatus::Http(200));

    let slow = find(&records, &format!("{}/slow", base));
    assert_eq!(slow.status, LinkStatus::Error);
    assert_eq!(slow.note, "Cancelled");
}

#[tokio::test]
async fn test_run_crawl_default_entry_point() {
    let site = MockServer::start().await;
    let base = site.uri();

    mount_page(&site, "/", r#"<a href="/about">About</a>"#).await;
    mount_head(&site, "/about", 200).await;

    let records = web_status_checker::run_crawl(&format!("{}/", base), false, 0)
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, LinkStatus::Http(200));
    assert!(records[0].note.starts_with("OK"));
}
