//! メトリクス送信のテスト

use auction_ocr::config::MetricsConfig;
use auction_ocr::error::PipelineError;
use auction_ocr::metrics::{MetricNames, MetricsSink, RemoteSink};
use auction_ocr_common::PricedRecord;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;
use chrono::{TimeZone, Utc};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
struct Received {
    authorization: Option<String>,
    user_agent: Option<String>,
    body: String,
}

type Store = Arc<Mutex<Vec<Received>>>;

async fn write_handler(State(store): State<Store>, headers: HeaderMap, body: String) -> StatusCode {
    let get = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    store.lock().unwrap().push(Received {
        authorization: get(header::AUTHORIZATION),
        user_agent: get(header::USER_AGENT),
        body,
    });
    StatusCode::NO_CONTENT
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn record() -> PricedRecord {
    PricedRecord {
        title: "Iron Ore".to_string(),
        amount: 3,
        price: 12.5,
    }
}

#[tokio::test]
async fn test_remote_sink_posts_line_protocol_with_auth() {
    let store: Store = Arc::default();
    let app = Router::new()
        .route("/api/v1/push/influx/write", post(write_handler))
        .with_state(store.clone());
    let base = serve(app).await;

    let config = MetricsConfig {
        username: Some("user".into()),
        password: Some("pass".into()),
        ..Default::default()
    };
    let sink = RemoteSink::new(&format!("{}/api/v1/push/influx/write", base), &config).unwrap();

    let timestamp = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    let observation = MetricNames::from(&config).observations(&record(), timestamp).remove(0);
    sink.write(&observation).await.unwrap();

    let received = store.lock().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(
        received[0].body,
        "new_world_auction_house_item_price,item_name=Iron\\ Ore value=12.5 1700000000000000000"
    );
    // "user:pass" のbase64
    assert_eq!(received[0].authorization.as_deref(), Some("Basic dXNlcjpwYXNz"));
    assert_eq!(received[0].user_agent.as_deref(), Some(config.user_agent.as_str()));
}

#[tokio::test]
async fn test_rejected_write_is_emission_failure() {
    let app = Router::new().route("/write", post(|| async { (StatusCode::UNAUTHORIZED, "invalid token") }));
    let base = serve(app).await;

    let config = MetricsConfig::default();
    let sink = RemoteSink::new(&format!("{}/write", base), &config).unwrap();
    let observation = MetricNames::from(&config)
        .observations(&record(), Utc::now())
        .remove(0);

    let err = sink.write(&observation).await.unwrap_err();
    assert!(matches!(err, PipelineError::EmissionFailed(_)));
    assert!(err.to_string().contains("401"));
}
