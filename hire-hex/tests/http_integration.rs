//! HTTP-level tests driving the router against the in-memory store.

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use hire_hex::{MarketService, inbound::HttpServer};
use hire_repo::MemoryRepo;
use serde_json::{Value, json};
use tower::ServiceExt;

fn app(requests_per_minute: u32) -> Router {
    let service = MarketService::new(MemoryRepo::default());
    HttpServer::with_rate_limit(service, requests_per_minute).router()
}

fn post(uri: &str, caller: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("Content-Type", "application/json");
    if let Some(caller) = caller {
        builder = builder.header("X-Account-Id", caller);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

async fn open(app: &Router, username: &str) -> String {
    let (status, body) = send(
        app,
        post("/api/accounts", None, json!({ "username": username })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

async fn fund(app: &Router, account: &str, amount: i64) {
    let (status, body) = send(
        app,
        post(
            "/api/wallet/top-up",
            Some(account),
            json!({ "account_id": account, "amount": amount }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "COMPLETED");
}

fn hire_body(player: &str, amount: i64, start_h: i64, end_h: i64) -> Value {
    let now = Utc::now();
    json!({
        "player_id": player,
        "amount": amount,
        "start_time": now + Duration::hours(start_h),
        "end_time": now + Duration::hours(end_h),
    })
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(&app(10), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_account_lookup_by_id_and_username() {
    let app = app(100);
    let id = open(&app, "alice").await;

    let (status, body) = send(&app, get(&format!("/api/accounts/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["balance"], 0);
    assert_eq!(body["currency"], "VND");

    let (status, body) = send(&app, get("/api/accounts/by-username/alice")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id.as_str());

    let (status, body) = send(&app, get("/api/accounts/not-a-uuid")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = send(
        &app,
        post("/api/accounts", None, json!({ "username": "alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_book_then_overlap_conflicts() {
    let app = app(100);
    let hirer = open(&app, "hirer").await;
    let rival = open(&app, "rival").await;
    let player = open(&app, "player").await;
    fund(&app, &hirer, 100_000).await;
    fund(&app, &rival, 100_000).await;

    let (status, receipt) = send(
        &app,
        post("/api/hires", Some(&hirer), hire_body(&player, 50_000, 1, 2)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(receipt["contract"]["effective_status"], "ACTIVE");
    assert_eq!(receipt["payment"]["kind"], "HIRE");

    let (_, body) = send(&app, get(&format!("/api/accounts/{hirer}"))).await;
    assert_eq!(body["balance"], 50_000);

    let (status, body) = send(
        &app,
        post("/api/hires", Some(&rival), hire_body(&player, 10_000, 1, 3)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "PLAYER_UNAVAILABLE");

    let (status, hires) = send(
        &app,
        get(&format!("/api/accounts/{player}/hires?role=player")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hires.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_cancel_by_non_hirer_is_forbidden() {
    let app = app(100);
    let hirer = open(&app, "hirer").await;
    let player = open(&app, "player").await;
    fund(&app, &hirer, 100_000).await;

    let (_, receipt) = send(
        &app,
        post("/api/hires", Some(&hirer), hire_body(&player, 50_000, 1, 2)),
    )
    .await;
    let contract_id = receipt["contract"]["id"].as_str().unwrap().to_string();
    let cancel = format!("/api/hires/{contract_id}/cancel");

    let (status, body) = send(&app, post(&cancel, Some(&player), json!({}))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    let (status, body) = send(&app, post(&cancel, Some(&hirer), json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["contract"]["status"], "CANCELED");
    assert_eq!(body["refund"]["kind"], "REFUND");

    let (_, body) = send(&app, get(&format!("/api/accounts/{hirer}"))).await;
    assert_eq!(body["balance"], 100_000);
}

#[tokio::test]
async fn test_withdraw_beyond_balance_is_unprocessable() {
    let app = app(100);
    let alice = open(&app, "alice").await;
    fund(&app, &alice, 1_000).await;

    let (status, body) = send(
        &app,
        post(
            "/api/wallet/withdraw",
            Some(&alice),
            json!({ "account_id": alice, "amount": 5_000 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "INSUFFICIENT_FUNDS");
}

#[tokio::test]
async fn test_reused_idempotency_key_conflicts() {
    let app = app(100);
    let alice = open(&app, "alice").await;
    let top_up = |amount: i64| {
        post(
            "/api/wallet/top-up",
            Some(&alice),
            json!({ "account_id": alice, "amount": amount, "idempotency_key": "k-1" }),
        )
    };

    let (status, first) = send(&app, top_up(1_000)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, again) = send(&app, top_up(1_000)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["id"], again["id"]);

    let (status, body) = send(&app, top_up(2_000)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "IDEMPOTENCY_KEY_REUSED");

    let (_, body) = send(&app, get(&format!("/api/accounts/{alice}"))).await;
    assert_eq!(body["balance"], 1_000);
}

#[tokio::test]
async fn test_moving_someone_elses_funds_is_forbidden() {
    let app = app(100);
    let alice = open(&app, "alice").await;
    let mallory = open(&app, "mallory").await;
    fund(&app, &alice, 1_000).await;

    let (status, _) = send(
        &app,
        post(
            "/api/wallet/withdraw",
            Some(&mallory),
            json!({ "account_id": alice, "amount": 500 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_pending_top_up_confirmation() {
    let app = app(100);
    let alice = open(&app, "alice").await;

    let (status, pending) = send(
        &app,
        post(
            "/api/wallet/top-up/pending",
            Some(&alice),
            json!({ "account_id": alice, "amount": 2_500, "payment_method": "MOMO" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(pending["status"], "PENDING");
    let id = pending["id"].as_str().unwrap();

    let (status, done) = send(
        &app,
        post(
            &format!("/api/payments/{id}/confirm"),
            None,
            json!({ "external_ref": "GW-42" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(done["status"], "COMPLETED");

    let (status, body) = send(
        &app,
        post(
            &format!("/api/payments/{id}/fail"),
            None,
            json!({ "reason": "too late" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INVALID_TRANSITION");

    let (status, entries) = send(
        &app,
        get(&format!("/api/accounts/{alice}/payments?status=COMPLETED")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(entries.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_missing_identity_header_is_bad_request() {
    let app = app(100);
    let player = open(&app, "player").await;

    let (status, body) = send(
        &app,
        post("/api/hires", None, hire_body(&player, 1_000, 1, 2)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("X-Account-Id"));
}

#[tokio::test]
async fn test_review_before_end_conflicts() {
    let app = app(100);
    let hirer = open(&app, "hirer").await;
    let player = open(&app, "player").await;
    fund(&app, &hirer, 10_000).await;
    let (_, receipt) = send(
        &app,
        post("/api/hires", Some(&hirer), hire_body(&player, 5_000, 1, 2)),
    )
    .await;
    let contract_id = receipt["contract"]["id"].as_str().unwrap();

    let (status, body) = send(
        &app,
        post(
            &format!("/api/hires/{contract_id}/review"),
            Some(&hirer),
            json!({ "rating": 5 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONTRACT_NOT_ENDED");

    let (status, stats) = send(&app, get(&format!("/api/players/{player}/stats?period=month"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_hires"], 1);
    assert!(stats["average_rating"].is_null());
}

#[tokio::test]
async fn test_rate_limit_per_caller() {
    let app = app(2);
    let caller = uuid::Uuid::new_v4().to_string();
    let request = || {
        Request::builder()
            .uri("/api/payments")
            .header("X-Account-Id", caller.as_str())
            .body(Body::empty())
            .unwrap()
    };

    for _ in 0..2 {
        let (status, _) = send(&app, request()).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, body) = send(&app, request()).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["retry_after_seconds"], 60);

    let other = Request::builder()
        .uri("/api/payments")
        .header("X-Account-Id", uuid::Uuid::new_v4().to_string())
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, other).await;
    assert_eq!(status, StatusCode::OK);

    for _ in 0..5 {
        let (status, _) = send(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
    }
}
