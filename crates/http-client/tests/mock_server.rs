use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use credits_http_client::{CreditsApi, CreditsClient};

#[derive(Clone, Default)]
struct Recorder {
    hits: Arc<AtomicUsize>,
    last_headers: Arc<Mutex<Option<HeaderMap>>>,
}

impl Recorder {
    fn record(&self, headers: HeaderMap) {
        self.hits.fetch_add(1, Ordering::SeqCst);
        *self.last_headers.lock().unwrap() = Some(headers);
    }

    fn header(&self, name: &str) -> Option<String> {
        self.last_headers
            .lock()
            .unwrap()
            .as_ref()
            .and_then(|h| h.get(name))
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn fetch_sends_cookie_and_parses_body() {
    let recorder = Recorder::default();
    let app = Router::new()
        .route(
            "/api/user/credits",
            get(|State(rec): State<Recorder>, headers: HeaderMap| async move {
                rec.record(headers);
                (
                    [("content-type", "application/json")],
                    r#"{"credits":1234,"plan":"MAX"}"#,
                )
            }),
        )
        .with_state(recorder.clone());
    let base = serve(app).await;

    let client = CreditsClient::new(&base).unwrap();
    let payload = client.fetch_credits("session=abc").await.unwrap();

    let summary = payload.summary().unwrap();
    assert_eq!(summary.credits, 1234);
    assert_eq!(summary.plan, models::Plan::Max);
    assert_eq!(recorder.hits.load(Ordering::SeqCst), 1);
    assert_eq!(recorder.header("cookie").as_deref(), Some("session=abc"));
    assert_eq!(
        recorder.header("accept").as_deref(),
        Some("application/json")
    );
    assert!(recorder
        .header("user-agent")
        .is_some_and(|ua| ua.starts_with("Mozilla/5.0")));
}

#[tokio::test]
async fn fetch_non_200_is_an_error() {
    let app = Router::new().route(
        "/api/user/credits",
        get(|| async { (StatusCode::UNAUTHORIZED, r#"{"error":"login"}"#) }),
    );
    let base = serve(app).await;

    let client = CreditsClient::new(&base).unwrap();
    let err = client.fetch_credits("session=expired").await.unwrap_err();
    assert!(err.to_string().contains("401"), "{err}");
}

#[tokio::test]
async fn fetch_invalid_json_is_an_error() {
    let app = Router::new().route(
        "/api/user/credits",
        get(|| async { "<html>maintenance</html>" }),
    );
    let base = serve(app).await;

    let client = CreditsClient::new(&base).unwrap();
    assert!(client.fetch_credits("session=abc").await.is_err());
}

#[tokio::test]
async fn fetch_non_object_body_is_an_error() {
    let app = Router::new().route(
        "/api/user/credits",
        get(|| async { ([("content-type", "application/json")], "null") }),
    );
    let base = serve(app).await;

    let client = CreditsClient::new(&base).unwrap();
    let err = client.fetch_credits("session=abc").await.unwrap_err();
    assert!(err.to_string().contains("not a json object"), "{err}");
}

#[tokio::test]
async fn fetch_times_out() {
    let app = Router::new().route(
        "/api/user/credits",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            r#"{"credits":1}"#
        }),
    );
    let base = serve(app).await;

    let client =
        CreditsClient::with_timeouts(&base, Duration::from_millis(100), Duration::from_secs(1))
            .unwrap();
    let err = client.fetch_credits("session=abc").await.unwrap_err();
    assert!(err.to_string().contains("timed out"), "{err}");
}

#[tokio::test]
async fn fetch_connection_refused_is_an_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = CreditsClient::new(&format!("http://{addr}")).unwrap();
    assert!(client.fetch_credits("session=abc").await.is_err());
}

#[tokio::test]
async fn reset_posts_once_and_reports_status() {
    let recorder = Recorder::default();
    let app = Router::new()
        .route(
            "/api/user/credit-reset",
            post(|State(rec): State<Recorder>, headers: HeaderMap| async move {
                rec.record(headers);
                StatusCode::OK.into_response()
            }),
        )
        .with_state(recorder.clone());
    let base = serve(app).await;

    let client = CreditsClient::new(&base).unwrap();
    assert!(client.trigger_reset("session=abc").await.unwrap());
    assert_eq!(recorder.hits.load(Ordering::SeqCst), 1);
    assert_eq!(recorder.header("cookie").as_deref(), Some("session=abc"));
    assert_eq!(recorder.header("priority").as_deref(), Some("u=1, i"));
}

#[tokio::test]
async fn reset_rejection_is_false_not_error() {
    let app = Router::new().route(
        "/api/user/credit-reset",
        post(|| async { StatusCode::TOO_MANY_REQUESTS }),
    );
    let base = serve(app).await;

    let client = CreditsClient::new(&base).unwrap();
    assert!(!client.trigger_reset("session=abc").await.unwrap());
}
