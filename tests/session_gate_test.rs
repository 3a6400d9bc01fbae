//! Integration tests for the admin login gate.

use std::sync::Arc;
use std::time::Duration;

use catalog_site::api::AdminClient;
use catalog_site::constants::storage_keys;
use catalog_site::session::gate::SERVER_ERROR;
use catalog_site::session::{
    CheckState, Destination, FileStorage, LoginTarget, MemoryStorage, RecordingNavigator, Role,
    SessionGate, SessionStore, SubmitState,
};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_login(server: &MockServer, role: &str) {
    Mock::given(method("POST"))
        .and(path("/api/admin-login"))
        .and(body_json(json!({ "username": "asha", "password": "s3cret" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "jwt-token",
            "role": role,
            "username": "asha",
            "id": 7
        })))
        .expect(1)
        .mount(server)
        .await;
}

async fn gate_with(
    server_uri: Option<String>,
    storage: MemoryStorage,
) -> (SessionGate, Arc<SessionStore>, Arc<RecordingNavigator>) {
    let store = Arc::new(SessionStore::init(storage).await.unwrap());
    let navigator = Arc::new(RecordingNavigator::new());
    let gate = SessionGate::new(
        AdminClient::new(reqwest::Client::new(), server_uri),
        store.clone(),
        navigator.clone(),
    );
    (gate, store, navigator)
}

#[tokio::test]
async fn test_privileged_roles_go_to_superadmin_dashboard() {
    for role in ["Admin", "SuperAdmin"] {
        let server = MockServer::start().await;
        mount_login(&server, role).await;

        let storage = MemoryStorage::new();
        let (gate, store, navigator) = gate_with(Some(server.uri()), storage.clone()).await;

        let state = gate
            .submit("asha", "s3cret", LoginTarget::Blogs("https://blog.example.com/".to_string()))
            .await;
        assert_eq!(state, SubmitState::Redirected(Destination::PrivilegedDashboard));
        assert_eq!(navigator.last().as_deref(), Some("/superadmin/dashboard"));

        let session = store.read().expect("session should be stored");
        assert_eq!(session.token, "jwt-token");
        assert_eq!(session.id, "7");
        assert!(session.role.is_privileged());
        assert_eq!(storage.snapshot().len(), 5);
    }
}

#[tokio::test]
async fn test_other_role_goes_to_standard_dashboard() {
    let server = MockServer::start().await;
    mount_login(&server, "Editor").await;

    let (gate, store, navigator) = gate_with(Some(server.uri()), MemoryStorage::new()).await;
    let state = gate.submit("asha", "s3cret", LoginTarget::Dashboard).await;

    assert_eq!(state, SubmitState::Redirected(Destination::StandardDashboard));
    assert_eq!(navigator.visited(), vec!["/dashboard".to_string()]);
    assert_eq!(store.read().unwrap().role, Role::Other("Editor".to_string()));
}

#[tokio::test]
async fn test_other_role_can_target_blogs() {
    let server = MockServer::start().await;
    mount_login(&server, "Editor").await;

    let (gate, _, navigator) = gate_with(Some(server.uri()), MemoryStorage::new()).await;
    let state = gate
        .submit("asha", "s3cret", LoginTarget::Blogs("https://blog.example.com/".to_string()))
        .await;

    assert_eq!(
        state,
        SubmitState::Redirected(Destination::External("https://blog.example.com/".to_string()))
    );
    assert_eq!(navigator.last().as_deref(), Some("https://blog.example.com/"));
}

#[tokio::test]
async fn test_wrong_credentials_show_backend_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/admin-login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Invalid credentials" })),
        )
        .mount(&server)
        .await;

    let (gate, store, navigator) = gate_with(Some(server.uri()), MemoryStorage::new()).await;
    let state = gate.submit("asha", "wrong", LoginTarget::Dashboard).await;

    assert_eq!(state, SubmitState::ShowError("Invalid credentials".to_string()));
    assert!(store.read().is_none());
    assert!(navigator.visited().is_empty());
}

#[tokio::test]
async fn test_rejection_without_message_uses_default() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/admin-login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({})))
        .mount(&server)
        .await;

    let (gate, _, _) = gate_with(Some(server.uri()), MemoryStorage::new()).await;
    let state = gate.submit("asha", "wrong", LoginTarget::Dashboard).await;
    assert_eq!(state, SubmitState::ShowError("Admin login failed".to_string()));
}

#[tokio::test]
async fn test_html_error_page_is_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/admin-login"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let (gate, store, navigator) = gate_with(Some(server.uri()), MemoryStorage::new()).await;
    let state = gate.submit("asha", "s3cret", LoginTarget::Dashboard).await;
    assert_eq!(state, SubmitState::ShowError(SERVER_ERROR.to_string()));
    assert!(store.read().is_none());
    assert!(navigator.visited().is_empty());
}

#[tokio::test]
async fn test_unreachable_backend_is_server_error() {
    // Nothing listens on the discard port.
    let (gate, store, _) = gate_with(Some("http://127.0.0.1:9".to_string()), MemoryStorage::new()).await;
    let state = gate.submit("asha", "s3cret", LoginTarget::Dashboard).await;
    assert_eq!(state, SubmitState::ShowError(SERVER_ERROR.to_string()));
    assert!(store.read().is_none());
}

#[tokio::test]
async fn test_unparsable_success_is_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/admin-login"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let (gate, _, _) = gate_with(Some(server.uri()), MemoryStorage::new()).await;
    let state = gate.submit("asha", "s3cret", LoginTarget::Dashboard).await;
    assert_eq!(state, SubmitState::ShowError(SERVER_ERROR.to_string()));
}

#[tokio::test]
async fn test_submit_publishes_submitting_then_outcome() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/admin-login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "token": "jwt-token",
                    "role": "Admin",
                    "username": "asha",
                    "id": "a1"
                }))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;

    let (gate, _, _) = gate_with(Some(server.uri()), MemoryStorage::new()).await;
    let mut rx = gate.subscribe_submit();
    assert_eq!(*rx.borrow(), SubmitState::Idle);

    let (state, seen) = tokio::join!(
        gate.submit("asha", "s3cret", LoginTarget::Dashboard),
        async {
            rx.changed().await.unwrap();
            rx.borrow_and_update().clone()
        }
    );

    assert_eq!(seen, SubmitState::Submitting);
    assert_eq!(state, SubmitState::Redirected(Destination::PrivilegedDashboard));
    assert_eq!(*rx.borrow(), state);
    assert_eq!(gate.submit_state(), state);
}

#[tokio::test]
async fn test_existing_session_redirects_on_check() {
    let storage = MemoryStorage::with_fields([
        (storage_keys::TOKEN, "tok"),
        (storage_keys::ROLE, "SuperAdmin"),
        (storage_keys::USERNAME, "root"),
        (storage_keys::ID, "1"),
        (storage_keys::LOGGED_IN, "true"),
    ]);
    let (gate, _, navigator) = gate_with(None, storage).await;

    assert_eq!(gate.check(), CheckState::Authenticated(Role::SuperAdmin));
    assert_eq!(navigator.visited(), vec!["/superadmin/dashboard".to_string()]);
}

#[tokio::test]
async fn test_session_survives_restart_in_file_storage() {
    let server = MockServer::start().await;
    mount_login(&server, "Admin").await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let file = dir.path().join("nested").join("session.json");

    {
        let store = Arc::new(SessionStore::init(FileStorage::new(&file)).await.unwrap());
        let gate = SessionGate::new(
            AdminClient::new(reqwest::Client::new(), Some(server.uri())),
            store,
            Arc::new(RecordingNavigator::new()),
        );
        gate.submit("asha", "s3cret", LoginTarget::Dashboard).await;
    }

    let raw: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&file).unwrap()).unwrap();
    assert_eq!(raw[storage_keys::LOGGED_IN], "true");
    assert_eq!(raw[storage_keys::ID], "7");

    let store = SessionStore::init(FileStorage::new(&file)).await.unwrap();
    assert_eq!(store.read().unwrap().username, "asha");

    store.clear().await.unwrap();
    assert!(!file.exists());
}

#[tokio::test]
async fn test_unreadable_session_file_starts_anonymous() {
    let server = MockServer::start().await;
    mount_login(&server, "Editor").await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let file = dir.path().join("session.json");
    std::fs::write(&file, r#"{"adminId": 7}"#).unwrap();

    let store = Arc::new(SessionStore::init(FileStorage::new(&file)).await.unwrap());
    assert!(store.read().is_none());
    assert!(!file.exists());

    let gate = SessionGate::new(
        AdminClient::new(reqwest::Client::new(), Some(server.uri())),
        store.clone(),
        Arc::new(RecordingNavigator::new()),
    );
    let state = gate.submit("asha", "s3cret", LoginTarget::Dashboard).await;
    assert_eq!(state, SubmitState::Redirected(Destination::StandardDashboard));
    assert!(file.exists());
    assert_eq!(store.read().unwrap().username, "asha");
}
