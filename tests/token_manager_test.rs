use std::{sync::Arc, time::Duration as StdDuration};

use chrono::{Duration, Utc};
use serde_json::json;
use sporltop::config::Config;
use sporltop::error::{Error, SpotifyError};
use sporltop::management::{MemoryTokenStore, TokenManager, TokenStore};
use sporltop::spotify::SpotifyClient;
use sporltop::types::TokenRecord;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn setup(server: &MockServer) -> (Arc<MemoryTokenStore>, TokenManager) {
    let config = Config::new("client-id", "client-secret", "http://localhost:8080/auth/callback")
        .with_endpoints(&server.uri(), &server.uri())
        .unwrap();
    let store = Arc::new(MemoryTokenStore::new());
    let manager = TokenManager::new(store.clone(), SpotifyClient::new(Arc::new(config)));
    (store, manager)
}

fn expired_record() -> TokenRecord {
    TokenRecord {
        access_token: "T1".to_string(),
        refresh_token: "R1".to_string(),
        expires_at: Utc::now() - Duration::seconds(5),
    }
}

fn token_json(access: &str, refresh: Option<&str>, expires_in: i64) -> serde_json::Value {
    let mut body = json!({
        "access_token": access,
        "token_type": "Bearer",
        "scope": "user-top-read user-read-email",
        "expires_in": expires_in,
    });
    if let Some(refresh) = refresh {
        body["refresh_token"] = json!(refresh);
    }
    body
}

async fn mount_refresh(server: &MockServer, response: ResponseTemplate, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=R1"))
        .and(body_string_contains("client_id=client-id"))
        .and(body_string_contains("client_secret=client-secret"))
        .respond_with(response)
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_authorize_stores_record_keyed_by_profile_id() {
    let server = MockServer::start().await;
    let (store, manager) = setup(&server);

    Mock::given(method("POST"))
        .and(path("/api/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=abc"))
        .and(body_string_contains("redirect_uri=http%3A%2F%2Flocalhost%3A8080%2Fauth%2Fcallback"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_json("T1", Some("R1"), 3600)))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("Authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "u1",
            "display_name": "User One",
            "email": "u1@example.com"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let before = Utc::now();
    let profile = manager.authorize("abc").await.unwrap();
    let after = Utc::now();

    assert_eq!(profile.id, "u1");
    assert_eq!(profile.email.as_deref(), Some("u1@example.com"));

    let record = store.get("u1").await.unwrap().expect("record stored");
    assert_eq!(record.access_token, "T1");
    assert_eq!(record.refresh_token, "R1");
    assert!(record.expires_at >= before + Duration::seconds(3570));
    assert!(record.expires_at <= after + Duration::seconds(3570));
}

#[tokio::test]
async fn test_authorize_overwrites_existing_record() {
    let server = MockServer::start().await;
    let (store, manager) = setup(&server);
    store.put("u1", expired_record()).await.unwrap();

    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_json("T5", Some("R5"), 3600)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "u1" })))
        .mount(&server)
        .await;

    manager.authorize("again").await.unwrap();

    let record = store.get("u1").await.unwrap().unwrap();
    assert_eq!(record.access_token, "T5");
    assert_eq!(record.refresh_token, "R5");
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_authorize_exchange_failure_stores_nothing() {
    let server = MockServer::start().await;
    let (store, manager) = setup(&server);

    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid authorization code"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "u1" })))
        .expect(0)
        .mount(&server)
        .await;

    let err = manager.authorize("bad").await.unwrap_err();

    match err {
        Error::UpstreamExchangeFailure(SpotifyError::Status { status, body }) => {
            assert_eq!(status.as_u16(), 400);
            assert!(body.contains("invalid_grant"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_authorize_profile_failure_stores_nothing() {
    let server = MockServer::start().await;
    let (store, manager) = setup(&server);

    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_json("T1", Some("R1"), 3600)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let err = manager.authorize("abc").await.unwrap_err();

    assert!(matches!(err, Error::UpstreamExchangeFailure(_)));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_authorize_without_refresh_token_fails() {
    let server = MockServer::start().await;
    let (store, manager) = setup(&server);

    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_json("T1", None, 3600)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "u1" })))
        .mount(&server)
        .await;

    let err = manager.authorize("abc").await.unwrap_err();

    assert!(matches!(
        err,
        Error::UpstreamExchangeFailure(SpotifyError::MissingField("refresh_token"))
    ));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_get_valid_token_unknown_user() {
    let server = MockServer::start().await;
    let (_store, manager) = setup(&server);

    mount_refresh(&server, ResponseTemplate::new(200), 0).await;

    let err = manager.get_valid_token("nobody").await.unwrap_err();
    assert!(matches!(err, Error::UnknownUser(ref id) if id == "nobody"));
}

#[tokio::test]
async fn test_get_valid_token_before_expiry_skips_refresh() {
    let server = MockServer::start().await;
    let (store, manager) = setup(&server);
    let record = TokenRecord {
        expires_at: Utc::now() + Duration::seconds(3570),
        ..expired_record()
    };
    store.put("u1", record.clone()).await.unwrap();

    mount_refresh(&server, ResponseTemplate::new(200), 0).await;

    assert_eq!(manager.get_valid_token("u1").await.unwrap(), "T1");
    assert_eq!(manager.get_valid_token("u1").await.unwrap(), "T1");
    assert_eq!(store.get("u1").await.unwrap(), Some(record));
}

#[tokio::test]
async fn test_get_valid_token_after_expiry_refreshes_once() {
    let server = MockServer::start().await;
    let (store, manager) = setup(&server);
    let old = expired_record();
    store.put("u1", old.clone()).await.unwrap();

    mount_refresh(
        &server,
        ResponseTemplate::new(200).set_body_json(token_json("T2", None, 3600)),
        1,
    )
    .await;

    let before = Utc::now();
    assert_eq!(manager.get_valid_token("u1").await.unwrap(), "T2");
    // Fresh now, served from the store
    assert_eq!(manager.get_valid_token("u1").await.unwrap(), "T2");

    let record = store.get("u1").await.unwrap().unwrap();
    assert_eq!(record.access_token, "T2");
    assert_eq!(record.refresh_token, "R1");
    assert!(record.expires_at > old.expires_at);
    assert!(record.expires_at >= before + Duration::seconds(3570));
}

#[tokio::test]
async fn test_get_valid_token_keeps_rotated_refresh_token() {
    let server = MockServer::start().await;
    let (store, manager) = setup(&server);
    store.put("u1", expired_record()).await.unwrap();

    mount_refresh(
        &server,
        ResponseTemplate::new(200).set_body_json(token_json("T2", Some("R2"), 3600)),
        1,
    )
    .await;

    manager.get_valid_token("u1").await.unwrap();

    let record = store.get("u1").await.unwrap().unwrap();
    assert_eq!(record.refresh_token, "R2");
}

#[tokio::test]
async fn test_get_valid_token_refresh_failure_leaves_record() {
    let server = MockServer::start().await;
    let (store, manager) = setup(&server);
    let old = expired_record();
    store.put("u1", old.clone()).await.unwrap();

    mount_refresh(
        &server,
        ResponseTemplate::new(400).set_body_json(json!({ "error": "invalid_grant" })),
        1,
    )
    .await;

    let err = manager.get_valid_token("u1").await.unwrap_err();

    assert!(matches!(err, Error::UpstreamExchangeFailure(_)));
    assert_eq!(store.get("u1").await.unwrap(), Some(old));
}

#[tokio::test]
async fn test_concurrent_refreshes_share_one_call() {
    let server = MockServer::start().await;
    let (store, manager) = setup(&server);
    store.put("u1", expired_record()).await.unwrap();

    mount_refresh(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(token_json("T2", None, 3600))
            .set_delay(StdDuration::from_millis(200)),
        1,
    )
    .await;

    let (a, b, c) = tokio::join!(
        manager.get_valid_token("u1"),
        manager.get_valid_token("u1"),
        manager.get_valid_token("u1"),
    );

    assert_eq!(a.unwrap(), "T2");
    assert_eq!(b.unwrap(), "T2");
    assert_eq!(c.unwrap(), "T2");
}

#[tokio::test]
async fn test_authorize_rejects_out_of_range_expiry() {
    let server = MockServer::start().await;
    let (store, manager) = setup(&server);

    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(token_json("T1", Some("R1"), 9_000_000_000_000)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "u1" })))
        .mount(&server)
        .await;

    let err = manager.authorize("abc").await.unwrap_err();

    assert!(matches!(
        err,
        Error::UpstreamExchangeFailure(SpotifyError::InvalidField("expires_in"))
    ));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_get_valid_token_rejects_out_of_range_expiry() {
    let server = MockServer::start().await;
    let (store, manager) = setup(&server);
    let old = expired_record();
    store.put("u1", old.clone()).await.unwrap();

    mount_refresh(
        &server,
        ResponseTemplate::new(200).set_body_json(token_json("T2", None, i64::MAX)),
        1,
    )
    .await;

    let err = manager.get_valid_token("u1").await.unwrap_err();

    assert!(matches!(
        err,
        Error::UpstreamExchangeFailure(SpotifyError::InvalidField("expires_in"))
    ));
    assert_eq!(store.get("u1").await.unwrap(), Some(old));
}
