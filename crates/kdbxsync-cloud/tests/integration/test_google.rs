//! Google Drive provider against a mock OAuth server and Drive upload API

use chrono::Utc;
use kdbxsync_cloud::google::{GoogleDriveProvider, GoogleEndpoints};
use kdbxsync_core::ports::{CloudProvider, LogLevel};
use serde_json::json;
use wiremock::matchers::{any, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{self, TestEnv};

fn provider_for(env: &TestEnv, server: &MockServer) -> GoogleDriveProvider {
    GoogleDriveProvider::with_endpoints(
        env.store.clone(),
        env.console(),
        GoogleEndpoints::with_base_url(server.uri()),
    )
    .expect("http client")
}

fn session_opened(server: &MockServer, session: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).insert_header(
        "Location",
        format!("{}/session/{session}", server.uri()).as_str(),
    )
}

async fn mount_update_session(server: &MockServer, file_id: &str, times: u64) {
    Mock::given(method("PATCH"))
        .and(path(format!("/upload/drive/v3/files/{file_id}")))
        .and(query_param("uploadType", "resumable"))
        .and(header("authorization", "Bearer valid-token"))
        .respond_with(session_opened(server, "update"))
        .expect(times)
        .mount(server)
        .await;
}

async fn mount_create_session(server: &MockServer, token: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path("/upload/drive/v3/files"))
        .and(query_param("uploadType", "resumable"))
        .and(header("authorization", format!("Bearer {token}").as_str()))
        .and(body_string_contains("passwords.kdbx"))
        .and(body_string_contains("folder-1"))
        .respond_with(session_opened(server, "create"))
        .expect(times)
        .mount(server)
        .await;
}

async fn mount_session_put(server: &MockServer, session: &str, file_id: &str, times: u64) {
    Mock::given(method("PUT"))
        .and(path(format!("/session/{session}")))
        .and(body_string_contains("KDBX test database"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "kind": "drive#file",
            "id": file_id,
            "name": "passwords.kdbx"
        })))
        .expect(times)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_known_file_is_updated_in_place() {
    let server = MockServer::start().await;
    let env = TestEnv::new(&[]);
    let known = json!({ env.source.key(): "file-1" });
    env.seed(
        "google",
        common::google_record("valid-token", common::future_expiry(), known.clone()),
    )
    .await;
    let saved_at = env.store.lock().await.last_updated();

    mount_update_session(&server, "file-1", 1).await;
    mount_create_session(&server, "valid-token", 0).await;
    mount_session_put(&server, "update", "file-1", 1).await;

    let mut provider = provider_for(&env, &server);
    provider.run(&env.source).await;

    assert!(env.console.logged(LogLevel::Success, "Uploaded passwords.kdbx"));
    assert_eq!(env.record("google").await["knownRemoteFiles"], known);
    assert_eq!(env.store.lock().await.last_updated(), saved_at);
}

#[tokio::test]
async fn test_new_file_is_created_and_remembered() {
    let server = MockServer::start().await;
    let env = TestEnv::new(&[]);
    env.seed(
        "google",
        common::google_record("valid-token", common::future_expiry(), json!({})),
    )
    .await;

    mount_create_session(&server, "valid-token", 1).await;
    mount_session_put(&server, "create", "file-new", 1).await;

    let mut provider = provider_for(&env, &server);
    provider.run(&env.source).await;

    let stored = env.reopened_store().await.record("google").await.unwrap();
    assert_eq!(
        stored["knownRemoteFiles"],
        json!({ env.source.key(): "file-new" })
    );
}

#[tokio::test]
async fn test_stale_file_id_falls_back_to_create() {
    let server = MockServer::start().await;
    let env = TestEnv::new(&[]);
    env.seed(
        "google",
        common::google_record(
            "valid-token",
            common::future_expiry(),
            json!({ env.source.key(): "deleted-file" }),
        ),
    )
    .await;

    Mock::given(method("PATCH"))
        .and(path("/upload/drive/v3/files/deleted-file"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": 404, "message": "File not found: deleted-file."}
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_create_session(&server, "valid-token", 1).await;
    mount_session_put(&server, "create", "file-2", 1).await;

    let mut provider = provider_for(&env, &server);
    provider.run(&env.source).await;

    assert_eq!(
        env.record("google").await["knownRemoteFiles"][env.source.key()],
        json!("file-2")
    );
}

#[tokio::test]
async fn test_update_failure_keeps_known_id() {
    let server = MockServer::start().await;
    let env = TestEnv::new(&[]);
    let known = json!({ env.source.key(): "file-1" });
    env.seed(
        "google",
        common::google_record("valid-token", common::future_expiry(), known.clone()),
    )
    .await;

    Mock::given(method("PATCH"))
        .and(path("/upload/drive/v3/files/file-1"))
        .respond_with(ResponseTemplate::new(403).set_body_string("storageQuotaExceeded"))
        .expect(1)
        .mount(&server)
        .await;
    mount_create_session(&server, "valid-token", 0).await;

    let mut provider = provider_for(&env, &server);
    provider.run(&env.source).await;

    assert!(env.console.logged(LogLevel::Error, "storageQuotaExceeded"));
    assert_eq!(env.record("google").await["knownRemoteFiles"], known);
}

#[tokio::test]
async fn test_disabled_record_makes_no_network_calls() {
    let server = MockServer::start().await;
    let env = TestEnv::new(&[]);
    env.seed("google", provider_for(&env, &server).disabled_record())
        .await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let mut provider = provider_for(&env, &server);
    provider.run(&env.source).await;

    assert!(env.console.logged(LogLevel::Info, "Google Drive is disabled, skipped."));
}

#[tokio::test]
async fn test_refresh_keeps_refresh_token_and_caps_expiry() {
    let server = MockServer::start().await;
    let env = TestEnv::new(&[]);
    let known = json!({ env.source.key(): "file-1" });
    env.seed(
        "google",
        common::google_record("stale-token", common::past_expiry(), known),
    )
    .await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("client_secret=google-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_type": "Bearer",
            "access_token": "valid-token",
            "expires_in": 7200,
            "scope": "https://www.googleapis.com/auth/drive.file"
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_update_session(&server, "file-1", 1).await;
    mount_session_put(&server, "update", "file-1", 1).await;

    let before = Utc::now().timestamp();
    let mut provider = provider_for(&env, &server);
    provider.run(&env.source).await;
    let after = Utc::now().timestamp();

    let stored = env.record("google").await;
    assert_eq!(stored["accessToken"], json!("valid-token"));
    assert_eq!(stored["refreshToken"], json!("google-refresh"));
    let expiry = stored["tokenExpiry"].as_i64().unwrap();
    assert!(expiry >= before + 3600);
    assert!(expiry <= after + 3600);
}

async fn mount_device_code(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/device/code"))
        .and(body_string_contains("client_id=google-client"))
        .and(body_string_contains("scope=https"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "device_code": "dev-1",
            "user_code": "WXYZ-1234",
            "verification_url": "https://www.google.com/device",
            "expires_in": 1800,
            "interval": 0
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_device_flow_install_polls_until_approved() {
    let server = MockServer::start().await;
    let env = TestEnv::new(&["y", "google-client", "google-secret", "folder-1"]);

    mount_device_code(&server).await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("device_code=dev-1"))
        .respond_with(ResponseTemplate::new(428).set_body_json(json!({
            "error": "authorization_pending",
            "error_description": "Precondition Required"
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("device_code=dev-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_type": "Bearer",
            "access_token": "valid-token",
            "refresh_token": "google-refresh",
            "expires_in": 3599
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_create_session(&server, "valid-token", 1).await;
    mount_session_put(&server, "create", "file-1", 1).await;

    let mut provider = provider_for(&env, &server);
    provider.run(&env.source).await;

    assert!(env.console.logged(LogLevel::Tip, "https://www.google.com/device"));
    assert!(env.console.logged(LogLevel::Tip, "WXYZ-1234"));
    assert_eq!(env.console.remaining_answers(), 0);

    let stored = env.record("google").await;
    assert!(provider.is_record_complete(&stored));
    assert_eq!(stored["enabled"], json!(true));
    assert_eq!(stored["targetLocation"], json!("folder-1"));
    assert_eq!(
        stored["knownRemoteFiles"],
        json!({ env.source.key(): "file-1" })
    );
}

#[tokio::test]
async fn test_denied_device_flow_persists_nothing() {
    let server = MockServer::start().await;
    let env = TestEnv::new(&["y", "google-client", "google-secret", "folder-1"]);

    mount_device_code(&server).await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": "access_denied",
            "error_description": "Forbidden"
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_create_session(&server, "valid-token", 0).await;

    let mut provider = provider_for(&env, &server);
    provider.bootstrap(&env.source).await;

    assert!(env.store.record("google").await.is_none());
    assert!(env
        .console
        .logged(LogLevel::Error, "Google Drive authorization failed"));
}

#[tokio::test]
async fn test_refresh_with_failed_save_still_uploads() {
    let server = MockServer::start().await;
    let env = TestEnv::with_unwritable_store(&[]);
    let known = json!({ env.source.key(): "file-1" });
    env.seed_in_memory(
        "google",
        common::google_record("stale-token", common::past_expiry(), known.clone()),
    )
    .await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_type": "Bearer",
            "access_token": "valid-token",
            "expires_in": 3599
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_update_session(&server, "file-1", 1).await;
    mount_session_put(&server, "update", "file-1", 1).await;

    let mut provider = provider_for(&env, &server);
    provider.run(&env.source).await;

    assert!(env.console.logged(LogLevel::Error, "Could not save Google Drive settings"));
    assert!(env.console.logged(LogLevel::Success, "Uploaded passwords.kdbx"));
    let stored = env.record("google").await;
    assert_eq!(stored["accessToken"], json!("valid-token"));
    assert_eq!(stored["knownRemoteFiles"], known);
}

#[tokio::test]
async fn test_new_file_id_with_failed_save_is_kept_in_memory() {
    let server = MockServer::start().await;
    let env = TestEnv::with_unwritable_store(&[]);
    env.seed_in_memory(
        "google",
        common::google_record("valid-token", common::future_expiry(), json!({})),
    )
    .await;

    mount_create_session(&server, "valid-token", 1).await;
    mount_session_put(&server, "create", "file-new", 1).await;

    let mut provider = provider_for(&env, &server);
    provider.run(&env.source).await;

    assert!(env.console.logged(LogLevel::Error, "Could not save Google Drive settings"));
    assert!(env.console.logged(LogLevel::Success, "Uploaded passwords.kdbx"));
    assert_eq!(
        env.record("google").await["knownRemoteFiles"],
        json!({ env.source.key(): "file-new" })
    );
    assert!(!env.store.lock().await.exists());
}
