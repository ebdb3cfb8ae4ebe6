//! reqwest transport against a local mock server.

use seo_analyzer::service::ReqwestTransport;
use seo_analyzer::{FetchOptions, HttpError, Transport};
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use url::Url;

fn options() -> FetchOptions {
    FetchOptions {
        timeout_secs: 5,
        max_redirects: 2,
        ..FetchOptions::default()
    }
}

#[tokio::test]
async fn test_fetch_follows_and_counts_redirects() {
    let mut server = mockito::Server::new_async().await;
    let _old = server
        .mock("GET", "/old")
        .with_status(301)
        .with_header("location", "/new")
        .create_async()
        .await;
    let _new = server
        .mock("GET", "/new")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body("<title>moved</title>")
        .create_async()
        .await;

    let options = options();
    let transport = ReqwestTransport::new(&options).unwrap();
    let url = Url::parse(&format!("{}/old", server.url())).unwrap();
    let response = transport.fetch(&url, &options).await.unwrap();

    assert_eq!(response.status_code, 200);
    assert_eq!(response.redirect_count, 1);
    assert_eq!(response.body, "<title>moved</title>");
    assert!(response.final_url.ends_with("/new"));
    assert_eq!(response.headers.get("content-type").map(String::as_str), Some("text/html"));
    assert!(response.load_time_ms > 0.0);
}

#[tokio::test]
async fn test_fetch_rejects_error_status() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/missing")
        .with_status(404)
        .create_async()
        .await;

    let options = options();
    let transport = ReqwestTransport::new(&options).unwrap();
    let url = Url::parse(&format!("{}/missing", server.url())).unwrap();
    let err = transport.fetch(&url, &options).await.unwrap_err();
    assert_eq!(err, HttpError::Status(404));
}

#[tokio::test]
async fn test_fetch_stops_on_redirect_loop() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/loop")
        .with_status(302)
        .with_header("location", "/loop")
        .expect_at_least(1)
        .create_async()
        .await;

    let options = options();
    let transport = ReqwestTransport::new(&options).unwrap();
    let url = Url::parse(&format!("{}/loop", server.url())).unwrap();
    let err = transport.fetch(&url, &options).await.unwrap_err();
    assert_eq!(err, HttpError::TooManyRedirects(2));
}

#[tokio::test]
async fn test_redirects_not_followed_when_disabled() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/old")
        .with_status(301)
        .with_header("location", "/new")
        .create_async()
        .await;

    let options = FetchOptions {
        follow_redirects: false,
        ..options()
    };
    let transport = ReqwestTransport::new(&options).unwrap();
    let url = Url::parse(&format!("{}/old", server.url())).unwrap();
    let err = transport.fetch(&url, &options).await.unwrap_err();
    assert_eq!(err, HttpError::Status(301));
}

#[tokio::test]
async fn test_unreachable_host_is_a_connection_error() {
    let options = options();
    let transport = ReqwestTransport::new(&options).unwrap();
    // Port 9 (discard) on localhost is closed on test machines
    let url = Url::parse("http://127.0.0.1:9/").unwrap();
    let err = transport.fetch(&url, &options).await.unwrap_err();
    assert!(matches!(err, HttpError::ConnectionFailed(_)), "{err:?}");
}

#[tokio::test]
async fn test_silent_server_times_out() {
    // Accepts connections and never answers
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        let mut open = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            open.push(socket);
        }
    });

    let options = FetchOptions {
        timeout_secs: 1,
        ..options()
    };
    let transport = ReqwestTransport::new(&options).unwrap();
    let url = Url::parse(&format!("http://{addr}/slow")).unwrap();
    let started = Instant::now();
    let err = transport.fetch(&url, &options).await.unwrap_err();

    assert_eq!(err, HttpError::Timeout(Duration::from_secs(1)));
    assert!(started.elapsed() < Duration::from_secs(5));
    server.abort();
}
