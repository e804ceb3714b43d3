//! Integration tests for HttpImageFetcher and ImageCacheLoader using wiremock.

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use forecast_icons::{
    HttpImageFetcher, IconError, ImageCache, ImageCacheLoader, ImageFetcher, MemoryImageCache,
    RetryConfig,
};
use image::DynamicImage;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::new_rgba8(width, height)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageOutputFormat::Png)
        .unwrap();
    bytes
}

fn fetcher(retry: RetryConfig) -> HttpImageFetcher {
    HttpImageFetcher::new(Duration::from_secs(5), "forecast-tests", retry).unwrap()
}

fn icon_url(server: &MockServer, icon: &str) -> Url {
    Url::parse(&format!("{}/img/w/{}.png", server.uri(), icon)).unwrap()
}

#[tokio::test]
async fn test_fetch_png_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/img/w/01d.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/png")
                .set_body_bytes(png_bytes(50, 50)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let image = fetcher(RetryConfig::none())
        .fetch(&icon_url(&mock_server, "01d"))
        .await
        .unwrap();

    assert_eq!(image.width(), 50);
    assert_eq!(image.height(), 50);
}

#[tokio::test]
async fn test_fetch_not_found_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/img/w/zz.png"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = fetcher(RetryConfig::new(3, 1, 5))
        .fetch(&icon_url(&mock_server, "zz"))
        .await
        .unwrap_err();

    assert!(matches!(err, IconError::Status { status: 404, .. }), "{}", err);
}

#[tokio::test]
async fn test_fetch_server_error_then_success_is_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/img/w/10n.png"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/img/w/10n.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(png_bytes(2, 2)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let image = fetcher(RetryConfig::new(2, 1, 5))
        .fetch(&icon_url(&mock_server, "10n"))
        .await
        .unwrap();

    assert_eq!(image.width(), 2);
}

#[tokio::test]
async fn test_fetch_server_error_exhausts_retries() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/img/w/09d.png"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let err = fetcher(RetryConfig::new(2, 1, 5))
        .fetch(&icon_url(&mock_server, "09d"))
        .await
        .unwrap_err();

    assert!(matches!(err, IconError::Status { status: 500, .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_fetch_malformed_body_is_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/img/w/01d.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string("<html>maintenance</html>"),
        )
        .mount(&mock_server)
        .await;

    let err = fetcher(RetryConfig::none())
        .fetch(&icon_url(&mock_server, "01d"))
        .await
        .unwrap_err();

    assert!(matches!(err, IconError::Decode { .. }), "{}", err);
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_fetch_unreachable_host_is_network_error() {
    // Nothing listens on port 9 of localhost
    let url = Url::parse("http://127.0.0.1:9/img/w/01d.png").unwrap();

    let err = fetcher(RetryConfig::none()).fetch(&url).await.unwrap_err();

    assert!(matches!(err, IconError::Network { .. }), "{}", err);
}

#[tokio::test]
async fn test_loader_miss_fetch_store_scenario() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/img/w/01d.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(png_bytes(8, 8)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let loader = ImageCacheLoader::new(
        Arc::new(MemoryImageCache::new()),
        Arc::new(fetcher(RetryConfig::none())),
        tokio::runtime::Handle::current(),
    );
    assert!(loader.fetch_cached("01d").is_none());

    let calls = Arc::new(AtomicUsize::new(0));
    let received = Arc::new(Mutex::new(None));
    let handle = {
        let calls = Arc::clone(&calls);
        let received = Arc::clone(&received);
        loader.fetch(icon_url(&mock_server, "01d"), move |result| {
            calls.fetch_add(1, Ordering::SeqCst);
            *received.lock().unwrap() = Some(result);
        })
    };
    handle.await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let image = received.lock().unwrap().take().unwrap().unwrap();
    assert!(loader.fetch_cached("01d").is_none());

    loader.store("01d", image.clone());
    assert!(loader.fetch_cached("01d").unwrap().ptr_eq(&image));
    assert_eq!(loader.cache().len(), 1);
}

#[tokio::test]
async fn test_loader_failed_fetch_completes_with_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/img/w/01d.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let loader = ImageCacheLoader::new(
        Arc::new(MemoryImageCache::new()),
        Arc::new(fetcher(RetryConfig::none())),
        tokio::runtime::Handle::current(),
    );

    let calls = Arc::new(AtomicUsize::new(0));
    let handle = {
        let calls = Arc::clone(&calls);
        loader.fetch(icon_url(&mock_server, "01d"), move |result| {
            assert!(result.is_err());
            calls.fetch_add(1, Ordering::SeqCst);
        })
    };
    handle.await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(loader.fetch_cached("01d").is_none());
}
