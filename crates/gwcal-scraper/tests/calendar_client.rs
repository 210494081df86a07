//! Integration tests for `CalendarClient::fetch_page`.
//!
//! Uses `wiremock` so no real network traffic is made.

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gwcal_scraper::{CalendarClient, ScraperError};

fn test_client() -> CalendarClient {
    CalendarClient::new(5, "gwcal-test/0.1").expect("failed to build test CalendarClient")
}

#[tokio::test]
async fn fetch_page_returns_body_and_sends_user_agent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/en/calendar/"))
        .and(header("user-agent", "gwcal-test/0.1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>calendar</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/en/calendar/", server.uri());
    let body = test_client().fetch_page(&url).await.unwrap();
    assert_eq!(body, "<html>calendar</html>");
}

#[tokio::test]
async fn fetch_page_does_not_retry_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/en/calendar/"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/en/calendar/", server.uri());
    let result = test_client().fetch_page(&url).await;
    assert!(
        matches!(result, Err(ScraperError::UnexpectedStatus { status: 503, .. })),
        "expected UnexpectedStatus(503), got: {result:?}"
    );
}

#[tokio::test]
async fn fetch_page_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(std::time::Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = CalendarClient::new(1, "gwcal-test/0.1").unwrap();
    let result = client.fetch_page(&server.uri()).await;
    match result {
        Err(ScraperError::Http(e)) => assert!(e.is_timeout(), "expected timeout, got: {e}"),
        other => panic!("expected Http timeout error, got: {other:?}"),
    }
}

#[tokio::test]
async fn fetch_page_rejects_invalid_url() {
    let result = test_client().fetch_page("not a url").await;
    assert!(matches!(result, Err(ScraperError::InvalidUrl { .. })));
}
