mod auth_support;

use std::path::Path;
use std::sync::Arc;

use gauth::auth::{Credential, CredentialStore, FileSink, StoreOptions};
use gauth::error::GauthError;
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use auth_support::{credential, store, store_options, InMemorySink, TOKEN_PATH};

#[tokio::test]
async fn save_then_load_is_lossless() {
    let dir = TempDir::new().unwrap();
    let location = dir.path().join("creds.json");
    let original = Credential::new(
        "client",
        "secret",
        vec!["scope-a".to_string(), "scope-b".to_string()],
        "user@example.com",
        location.clone(),
        "access",
        "refresh",
    )
    .unwrap();

    let created = CredentialStore::create(original.clone()).unwrap();
    let loaded = CredentialStore::load(created.location()).unwrap();

    assert_eq!(loaded.credential(), original);
    assert_eq!(loaded.location(), location.as_path());
}

#[tokio::test]
async fn persisted_file_uses_fixed_field_names() {
    let server = MockServer::start().await;
    let sink = Arc::new(InMemorySink::new());

    store(&server, sink.clone(), "expired");

    let saved = sink.get_json(Path::new("creds.json")).unwrap();
    assert_eq!(
        saved,
        json!({
            "client_id": "c1",
            "client_secret": "s1",
            "scopes": ["a"],
            "email": "u@x.com",
            "filename": "creds.json",
            "access_token": "expired",
            "refresh_token": "r1"
        })
    );
}

#[tokio::test]
async fn create_propagates_sink_failure() {
    let server = MockServer::start().await;
    let sink = Arc::new(InMemorySink::new());
    sink.fail_writes(true);

    let result = CredentialStore::create_with(
        credential("creds.json", "access"),
        store_options(&server, sink),
    );

    assert!(matches!(result, Err(GauthError::Persistence { .. })));
}

#[tokio::test]
async fn load_missing_location_is_persistence_error() {
    let dir = TempDir::new().unwrap();
    let result = CredentialStore::load(dir.path().join("absent.json"));
    assert!(matches!(result, Err(GauthError::Persistence { .. })));
}

#[tokio::test]
async fn load_malformed_content_is_format_error() {
    let dir = TempDir::new().unwrap();
    let location = dir.path().join("creds.json");
    std::fs::write(&location, "{not-json").unwrap();

    let result = CredentialStore::load(&location);

    assert!(matches!(result, Err(GauthError::Format(_))));
}

#[tokio::test]
async fn load_rejects_empty_tokens() {
    let sink = Arc::new(InMemorySink::new());
    let location = Path::new("creds.json");
    sink.seed(
        location,
        r#"{"client_id":"c","client_secret":"s","scopes":[],"email":"e",
            "filename":"creds.json","access_token":"","refresh_token":"r"}"#,
    );
    let options = StoreOptions::builder().sink(sink).build();

    let result = CredentialStore::load_with(location, options);

    assert!(matches!(result, Err(GauthError::Format(_))));
}

#[tokio::test]
async fn load_does_not_rewrite_the_sink() {
    let sink = Arc::new(InMemorySink::new());
    let location = Path::new("elsewhere.json");
    let raw = r#"{"client_id":"c","client_secret":"s","scopes":["x"],"email":"e",
        "filename":"original.json","access_token":"a","refresh_token":"r"}"#;
    sink.seed(location, raw);
    let options = StoreOptions::builder().sink(sink.clone()).build();

    let store = CredentialStore::load_with(location, options).unwrap();

    assert_eq!(store.credential().filename, Path::new("elsewhere.json"));
    assert_eq!(sink.get(location).as_deref(), Some(raw));
}

#[tokio::test]
async fn refresh_posts_refresh_grant_and_saves_new_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=r1"))
        .and(body_string_contains("client_id=c1"))
        .and(body_string_contains("client_secret=s1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "new",
            "expires_in": 3600,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;
    let sink = Arc::new(InMemorySink::new());
    let store = store(&server, sink.clone(), "expired");

    let token = store.refresh().await.unwrap();

    assert_eq!(token, "new");
    assert_eq!(store.access_token(), "new");
    assert_eq!(store.credential().refresh_token, "r1");
    let saved = sink.get_json(Path::new("creds.json")).unwrap();
    assert_eq!(saved["access_token"], "new");
    assert_eq!(saved["refresh_token"], "r1");
}

#[tokio::test]
async fn refresh_rejection_surfaces_authorization_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Token has been expired or revoked."
        })))
        .expect(1)
        .mount(&server)
        .await;
    let sink = Arc::new(InMemorySink::new());
    let store = store(&server, sink.clone(), "expired");

    let result = store.refresh().await;

    match result {
        Err(GauthError::Authorization { status, body }) => {
            assert_eq!(status, 400);
            assert!(body.contains("invalid_grant"));
        }
        other => panic!("expected authorization error, got {other:?}"),
    }
    assert_eq!(store.access_token(), "expired");
    let saved = sink.get_json(Path::new("creds.json")).unwrap();
    assert_eq!(saved["access_token"], "expired");
}

#[tokio::test]
async fn refresh_with_malformed_payload_is_format_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token_type": "Bearer" })))
        .mount(&server)
        .await;
    let store = store(&server, Arc::new(InMemorySink::new()), "expired");

    let result = store.refresh().await;

    assert!(matches!(result, Err(GauthError::Format(_))));
    assert_eq!(store.access_token(), "expired");
}

#[tokio::test]
async fn refresh_that_cannot_be_saved_is_not_reported_as_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access_token": "new" })))
        .expect(1)
        .mount(&server)
        .await;
    let sink = Arc::new(InMemorySink::new());
    let store = store(&server, sink.clone(), "expired");
    sink.fail_writes(true);

    let result = store.refresh().await;

    assert!(matches!(result, Err(GauthError::Persistence { .. })));
    assert_eq!(store.access_token(), "expired");
    sink.fail_writes(false);
    let saved = sink.get_json(Path::new("creds.json")).unwrap();
    assert_eq!(saved["access_token"], "expired");
}

#[tokio::test]
async fn waiting_refresh_does_not_reuse_a_token_that_was_never_saved() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access_token": "new" })))
        .expect(2)
        .mount(&server)
        .await;
    let sink = Arc::new(InMemorySink::new());
    let store = store(&server, sink.clone(), "expired");
    sink.fail_writes(true);

    let (first, second) = tokio::join!(
        store.refresh_rejected("expired"),
        store.refresh_rejected("expired")
    );

    assert!(matches!(first, Err(GauthError::Persistence { .. })));
    assert!(matches!(second, Err(GauthError::Persistence { .. })));
    assert_eq!(store.access_token(), "expired");
}

#[tokio::test]
async fn refresh_rejected_skips_when_token_already_replaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access_token": "never" })))
        .expect(0)
        .mount(&server)
        .await;
    let store = store(&server, Arc::new(InMemorySink::new()), "current");

    let token = store.refresh_rejected("stale").await.unwrap();

    assert_eq!(token, "current");
    assert_eq!(store.access_token(), "current");
}

#[tokio::test]
async fn refreshed_token_survives_reload_from_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access_token": "new" })))
        .expect(1)
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let location = dir.path().join("creds.json");
    let options = StoreOptions::builder()
        .sink(Arc::new(FileSink))
        .endpoints(auth_support::endpoints(&server))
        .build();
    let store = CredentialStore::create_with(
        credential(location.to_str().unwrap(), "expired"),
        options.clone(),
    )
    .unwrap();

    store.refresh().await.unwrap();
    let reloaded = CredentialStore::load_with(&location, options).unwrap();

    assert_eq!(reloaded.access_token(), "new");
    assert_eq!(reloaded.credential(), store.credential());
}
