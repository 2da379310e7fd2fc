//! Integration tests for serial-dl series downloads
//!
//! These drive the public library API against a local mock server, so they
//! need no network access.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serial_dl::{Error, FetchEvent, FetchOptions};
use tempfile::tempdir;
use wiremock::matchers::{method, path_regex};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn fast_options() -> FetchOptions {
    FetchOptions {
        attempt_delay: Duration::ZERO,
        ..Default::default()
    }
}

/// Serves `/book/pageNNNscan.png` with the request path as body, except
/// the numbers in `broken`, which always answer 500.
async fn start_series_server(broken: &'static [&'static str]) -> (MockServer, Arc<AtomicUsize>) {
    let server = MockServer::start().await;
    let requests = Arc::new(AtomicUsize::new(0));
    let requests_clone = Arc::clone(&requests);

    Mock::given(method("GET"))
        .and(path_regex(r"^/book/page\d+scan\.png$"))
        .respond_with(move |req: &Request| {
            requests_clone.fetch_add(1, Ordering::SeqCst);
            let path = req.url.path().to_string();
            if broken.iter().any(|n| path.contains(&format!("page{n}scan"))) {
                ResponseTemplate::new(500)
            } else {
                ResponseTemplate::new(200).set_body_bytes(path.into_bytes())
            }
        })
        .mount(&server)
        .await;

    (server, requests)
}

#[tokio::test]
async fn test_downloads_whole_series() {
    let (server, requests) = start_series_server(&[]).await;
    let out = tempdir().unwrap();
    let sample = format!("{}/book/page012scan.png", server.uri());

    serial_dl::download_series_with_options(&sample, "008", out.path(), fast_options())
        .await
        .unwrap();

    assert_eq!(requests.load(Ordering::SeqCst), 5);
    for n in ["008", "009", "010", "011", "012"] {
        let saved = std::fs::read(out.path().join(format!("{n}.png"))).unwrap();
        assert_eq!(saved, format!("/book/page{n}scan.png").into_bytes());
    }
}

#[tokio::test]
async fn test_broken_item_does_not_stop_the_run() {
    let (server, requests) = start_series_server(&["02"]).await;
    let out = tempdir().unwrap();
    let sample = format!("{}/book/page04scan.png", server.uri());

    let failures = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&failures);
    let options = FetchOptions {
        observer: Some(Arc::new(move |event: &FetchEvent| {
            if let FetchEvent::Failed { url, .. } = event {
                sink.lock().unwrap().push(url.clone());
            }
        })),
        ..fast_options()
    };

    serial_dl::download_series_with_options(&sample, "01", out.path(), options)
        .await
        .unwrap();

    // 3 good items once each, the broken one 1 + 3 retries
    assert_eq!(requests.load(Ordering::SeqCst), 3 + 4);
    assert!(out.path().join("01.png").exists());
    assert!(!out.path().join("02.png").exists());
    assert!(out.path().join("03.png").exists());
    assert!(out.path().join("04.png").exists());

    let failures = failures.lock().unwrap();
    assert_eq!(*failures, [format!("{}/book/page02scan.png", server.uri())]);
}

#[tokio::test]
async fn test_no_number_in_sample_is_fatal_before_any_request() {
    let (server, requests) = start_series_server(&[]).await;
    let root = tempdir().unwrap();
    let out = root.path().join("never-created");
    let sample = format!("{}/book/index.html", server.uri());

    let result = serial_dl::download_series_with_options(&sample, "1", &out, fast_options()).await;

    assert!(matches!(result, Err(Error::NoNumberFound(_))), "got {result:?}");
    assert_eq!(requests.load(Ordering::SeqCst), 0);
    assert!(!out.exists(), "Output directory must not be created on a fatal error");
}

#[tokio::test]
async fn test_start_after_end_fetches_nothing() {
    let (server, requests) = start_series_server(&[]).await;
    let out = tempdir().unwrap();
    let sample = format!("{}/book/page3scan.png", server.uri());

    serial_dl::download_series_with_options(&sample, "7", out.path(), fast_options())
        .await
        .unwrap();

    assert_eq!(requests.load(Ordering::SeqCst), 0);
    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
}

#[test]
fn test_plan_matches_expected_urls() {
    let spec = serial_dl::plan("https://example.com/dir5000/prefix500suffix.pdf", "001").unwrap();
    let urls: Vec<String> = spec.expand().map(|item| item.source_url).collect();

    assert_eq!(urls.len(), 500);
    assert_eq!(urls[0], "https://example.com/dir5000/prefix001suffix.pdf");
    assert_eq!(urls[41], "https://example.com/dir5000/prefix042suffix.pdf");
    assert_eq!(urls[499], "https://example.com/dir5000/prefix500suffix.pdf");
}
