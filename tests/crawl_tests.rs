//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use async_trait::async_trait;
use image_audit::config::Config;
use image_audit::crawler::{CardMatch, CardSelectors, CrawlOrchestrator, RenderContext, Renderer};
use image_audit::output::ProductRecord;
use image_audit::state::{CancellationToken, CrawlContext, ProgressEvent};
use image_audit::NavigationError;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc::error::TryRecvError;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn product_page(cards: &[(&str, Option<&str>)]) -> String {
    let cards: String = cards
        .iter()
        .map(|(name, src)| {
            let img = match src {
                Some(src) => format!(r#"<img src="{}">"#, src),
                None => "<img>".to_string(),
            };
            format!(
                r#"<div class="bpag-product-card">{}<h3 class="my-4 text-lg font-bold heading-font">{}</h3></div>"#,
                img, name
            )
        })
        .collect();
    format!("<html><head><title>Products</title></head><body>{}</body></html>", cards)
}

fn urlset(locs: &[String]) -> String {
    let entries: String = locs
        .iter()
        .map(|loc| format!("<url><loc>{}</loc></url>", loc))
        .collect();
    format!(
        r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{}</urlset>"#,
        entries
    )
}

async fn serve(server: &MockServer, route: &str, content_type: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", content_type),
        )
        .mount(server)
        .await;
}

fn drain(rx: &mut tokio::sync::mpsc::Receiver<ProgressEvent>) -> Vec<ProgressEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn parse_rows(csv: &str) -> Vec<ProductRecord> {
    csv::Reader::from_reader(csv.as_bytes())
        .deserialize::<ProductRecord>()
        .collect::<Result<_, _>>()
        .expect("Report is not valid CSV")
}

#[tokio::test]
async fn test_two_sitemaps_four_pages_all_missing() {
    let server = MockServer::start().await;
    let base = server.uri();

    serve(
        &server,
        "/post-sitemap.xml",
        "application/xml",
        urlset(&[format!("{base}/p1"), format!("{base}/p2")]),
    )
    .await;
    serve(
        &server,
        "/page-sitemap.xml",
        "application/xml",
        urlset(&[format!("{base}/p3"), format!("{base}/p4")]),
    )
    .await;
    for (route, name) in [("/p1", "One"), ("/p2", "Two"), ("/p3", "Three"), ("/p4", "Four")] {
        serve(&server, route, "text/html", product_page(&[(name, None)])).await;
    }

    let orchestrator =
        CrawlOrchestrator::from_config(&Config::default()).expect("Failed to build orchestrator");
    let ctx = CrawlContext::default();
    let mut rx = ctx.progress.subscribe();

    let sitemaps = vec![
        format!("{base}/post-sitemap.xml"),
        format!("{base}/page-sitemap.xml"),
    ];
    let csv = orchestrator
        .run_scraper(&sitemaps, &ctx)
        .await
        .expect("Crawl failed")
        .expect("Crawl was not expected to be cancelled");

    assert_eq!(csv.lines().count(), 5);
    assert_eq!(csv.lines().next(), Some("pageUrl,name,imageSrc,isMissing"));

    let rows = parse_rows(&csv);
    assert_eq!(rows.len(), 4);
    assert!(rows.iter().all(|r| r.is_missing && r.image_ref == "No Image"));
    assert_eq!(
        rows.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
        vec!["One", "Two", "Three", "Four"]
    );
    assert_eq!(rows[0].page_url, format!("{base}/p1"));

    // Progress: start, one event per page, completion
    let events = drain(&mut rx);
    let page_events: Vec<_> = events
        .iter()
        .filter(|e| e.message.starts_with("Scraping ") && e.message.contains("pages..."))
        .collect();
    assert_eq!(
        page_events.iter().map(|e| e.percent).collect::<Vec<_>>(),
        vec![25, 50, 75, 100]
    );
    assert_eq!(page_events[0].message, "Scraping 1/4 pages... (25%)");
    assert!(events.windows(2).all(|w| w[0].percent <= w[1].percent));
    assert_eq!(events.first().map(|e| e.message.as_str()), Some("Starting scraping..."));
    assert_eq!(events.last().map(|e| e.message.as_str()), Some("Scraping complete."));

    // The stream ends after the final event
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Disconnected)));
}

#[tokio::test]
async fn test_failing_page_does_not_stop_crawl() {
    let server = MockServer::start().await;
    let base = server.uri();

    serve(
        &server,
        "/page-sitemap.xml",
        "application/xml",
        urlset(&[
            format!("{base}/ok1"),
            format!("{base}/error"),
            format!("{base}/slow"),
            format!("{base}/ok2"),
        ]),
    )
    .await;
    serve(
        &server,
        "/ok1",
        "text/html",
        product_page(&[("Gate", Some("/gate.jpg")), ("Rail", Some(""))]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/error"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(product_page(&[("Late", None)]))
                .insert_header("content-type", "text/html")
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;
    serve(&server, "/ok2", "text/html", product_page(&[("Door", None)])).await;

    let mut config = Config::default();
    config.inspector.navigation_timeout_secs = 1;
    let orchestrator = CrawlOrchestrator::from_config(&config).unwrap();
    let ctx = CrawlContext::default();

    let run = orchestrator
        .crawl(&[format!("{base}/page-sitemap.xml")], &ctx)
        .await;

    assert!(!run.cancelled);
    assert_eq!(run.total_pages, 4);
    assert_eq!(run.failed_pages, 2);
    assert_eq!(
        run.results
            .iter()
            .map(|r| (r.name.as_str(), r.is_missing))
            .collect::<Vec<_>>(),
        vec![("Gate", false), ("Rail", true), ("Door", true)]
    );
}

#[tokio::test]
async fn test_page_without_cards_yields_placeholder() {
    let server = MockServer::start().await;
    let base = server.uri();

    serve(
        &server,
        "/page-sitemap.xml",
        "application/xml",
        urlset(&[format!("{base}/about")]),
    )
    .await;
    serve(&server, "/about", "text/html", product_page(&[])).await;

    let orchestrator = CrawlOrchestrator::from_config(&Config::default()).unwrap();
    let csv = orchestrator
        .run_scraper(&[format!("{base}/page-sitemap.xml")], &CrawlContext::default())
        .await
        .unwrap()
        .unwrap();

    let rows = parse_rows(&csv);
    assert_eq!(rows, vec![ProductRecord::placeholder()]);
}

/// Renderer that records visited URLs and can cancel or panic on demand
struct ScriptedRenderer {
    visits: Arc<Mutex<Vec<String>>>,
    cancel: Option<(CancellationToken, usize)>,
}

struct ScriptedContext {
    visits: Arc<Mutex<Vec<String>>>,
    cancel: Option<(CancellationToken, usize)>,
    url: Option<String>,
}

#[async_trait]
impl Renderer for ScriptedRenderer {
    async fn open(&self) -> Result<Box<dyn RenderContext>, NavigationError> {
        Ok(Box::new(ScriptedContext {
            visits: self.visits.clone(),
            cancel: self.cancel.clone(),
            url: None,
        }))
    }
}

#[async_trait]
impl RenderContext for ScriptedContext {
    async fn goto(&mut self, url: &str) -> Result<(), NavigationError> {
        if url.contains("boom") {
            panic!("renderer crashed on {}", url);
        }

        let visited = {
            let mut visits = self.visits.lock().unwrap();
            visits.push(url.to_string());
            visits.len()
        };
        if let Some((token, after)) = &self.cancel {
            if visited == *after {
                token.request_cancel();
            }
        }

        self.url = Some(url.to_string());
        Ok(())
    }

    fn current_url(&self) -> Option<String> {
        self.url.clone()
    }

    fn select_cards(&self, _selectors: &CardSelectors) -> Vec<CardMatch> {
        vec![CardMatch {
            name: Some("Card".to_string()),
            image_src: None,
        }]
    }

    async fn close(&mut self) {}
}

async fn serve_pages_sitemap(server: &MockServer, pages: &[&str]) -> String {
    let base = server.uri();
    let locs: Vec<String> = pages.iter().map(|p| format!("{base}/{p}")).collect();
    serve(server, "/page-sitemap.xml", "application/xml", urlset(&locs)).await;
    format!("{base}/page-sitemap.xml")
}

#[tokio::test]
async fn test_cancel_stops_before_next_page() {
    let server = MockServer::start().await;
    let sitemap = serve_pages_sitemap(&server, &["a", "b", "c", "d"]).await;

    let ctx = CrawlContext::default();
    let visits = Arc::new(Mutex::new(Vec::new()));
    let renderer = Arc::new(ScriptedRenderer {
        visits: visits.clone(),
        cancel: Some((ctx.cancel_handle(), 2)),
    });
    let orchestrator = CrawlOrchestrator::with_renderer(&Config::default(), renderer).unwrap();
    let mut rx = ctx.progress.subscribe();

    let result = orchestrator.run_scraper(&[sitemap], &ctx).await.unwrap();

    assert!(result.is_none(), "cancelled crawl must not produce a report");
    assert_eq!(visits.lock().unwrap().len(), 2);

    let events = drain(&mut rx);
    let last = events.last().unwrap();
    assert_eq!(last.message, "Scraping canceled.");
    assert_eq!(last.percent, 50);
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Disconnected)));
}

#[tokio::test]
async fn test_cancel_is_distinct_from_zero_results() {
    let server = MockServer::start().await;
    let sitemap = serve_pages_sitemap(&server, &["a"]).await;

    let ctx = CrawlContext::default();
    let visits = Arc::new(Mutex::new(Vec::new()));
    let renderer = Arc::new(ScriptedRenderer {
        visits: visits.clone(),
        cancel: Some((ctx.cancel_handle(), 1)),
    });
    let orchestrator = CrawlOrchestrator::with_renderer(&Config::default(), renderer).unwrap();

    // Cancelling during the last page lets the run complete
    let result = orchestrator.run_scraper(&[sitemap], &ctx).await.unwrap();
    assert!(result.is_some());
    assert_eq!(visits.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_panicking_inspection_is_contained() {
    let server = MockServer::start().await;
    let sitemap = serve_pages_sitemap(&server, &["first", "boom", "last"]).await;

    let visits = Arc::new(Mutex::new(Vec::new()));
    let renderer = Arc::new(ScriptedRenderer {
        visits: visits.clone(),
        cancel: None,
    });
    let orchestrator = CrawlOrchestrator::with_renderer(&Config::default(), renderer).unwrap();

    let run = orchestrator.crawl(&[sitemap], &CrawlContext::default()).await;

    assert!(!run.cancelled);
    assert_eq!(run.failed_pages, 1);
    assert_eq!(run.results.len(), 2);
    assert!(run.results[1].page_url.ends_with("/last"));
    assert_eq!(visits.lock().unwrap().len(), 2);
}
