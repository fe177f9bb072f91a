//! Integration tests for the mirror endpoint and mirrored wizard sessions.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::api::MIRROR_PATH;
use crate::config::Config;
use crate::db::MemoryStore;
use crate::models::{EmployeeDraft, Gender, OwnerDetails, OwnersDocument, RegistrationRequest};
use crate::persistence::{HttpMirror, PersistentStore, RemoteMirror};
use crate::workflow::{LoginOutcome, Screen};
use crate::{create_router, open_session, MirrorState};

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    mirror_file: PathBuf,
    temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mirror_file = temp_dir.path().join("public").join("data").join("owners.json");

        let app = create_router(MirrorState::new(mirror_file.clone()));

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        // Spawn server
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(Duration::from_millis(100)).await;

        TestFixture {
            client: Client::new(),
            base_url,
            mirror_file,
            temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn mirror(&self) -> HttpMirror {
        HttpMirror::new(self.url(MIRROR_PATH), Duration::from_secs(2)).unwrap()
    }

    fn config(&self, db_name: &str) -> Config {
        Config {
            db_path: self.temp_dir.path().join(db_name),
            mirror_file: self.mirror_file.clone(),
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            mirror_url: Some(self.url(MIRROR_PATH)),
            mirror_timeout: Duration::from_secs(2),
            log_level: "warn".to_string(),
        }
    }

    /// Poll the mirror until `check` accepts the stored document.
    async fn wait_for_remote(&self, check: impl Fn(&OwnersDocument) -> bool) -> OwnersDocument {
        let mirror = self.mirror();
        for _ in 0..100 {
            if let Ok(document) = mirror.fetch().await {
                if check(&document) {
                    return document;
                }
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("Remote mirror never reached the expected state");
    }
}

fn owner_json(email: &str) -> Value {
    json!({
        "email": email,
        "firstName": "Ada",
        "lastName": "Lovelace",
        "businessName": "Engines",
        "phone": "555",
        "registeredAt": "2024-01-01T00:00:00.000Z",
        "employees": []
    })
}

fn registration(email: &str) -> RegistrationRequest {
    RegistrationRequest {
        email: email.to_string(),
        details: OwnerDetails {
            first_name: "A".to_string(),
            last_name: "B".to_string(),
            business_name: "C".to_string(),
            phone: "1".to_string(),
            email_template: None,
        },
    }
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_mirror_missing_document() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url(MIRROR_PATH))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_mirror_post_then_get() {
    let fixture = TestFixture::new().await;

    let post_resp = fixture
        .client
        .post(fixture.url(MIRROR_PATH))
        .json(&json!({ "owners": [owner_json("a@x.com"), owner_json("b@x.com")] }))
        .send()
        .await
        .unwrap();

    assert_eq!(post_resp.status(), 200);
    let post_body: Value = post_resp.json().await.unwrap();
    assert_eq!(post_body["success"], true);
    assert_eq!(post_body["data"]["ownerCount"], 2);

    let get_resp = fixture
        .client
        .get(fixture.url(MIRROR_PATH))
        .send()
        .await
        .unwrap();

    assert_eq!(get_resp.status(), 200);
    assert_eq!(
        get_resp.headers()["content-type"].to_str().unwrap(),
        "application/json"
    );
    let get_body: Value = get_resp.json().await.unwrap();
    assert_eq!(get_body["owners"][1]["email"], "b@x.com");

    // Stored pretty-printed and wrapped, as the dev server always did
    let on_disk = std::fs::read_to_string(&fixture.mirror_file).unwrap();
    assert!(on_disk.contains("\n  \"owners\""));
}

#[tokio::test]
async fn test_mirror_accepts_bare_array() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url(MIRROR_PATH))
        .json(&json!([owner_json("a@x.com")]))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let document = fixture.mirror().fetch().await.unwrap();
    assert_eq!(document.owners.len(), 1);
    assert_eq!(document.owners[0].email, "a@x.com");
}

#[tokio::test]
async fn test_mirror_rejects_malformed_body() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url(MIRROR_PATH))
        .header("content-type", "application/json")
        .body(r#"{"owners": [{"email": 42}]}"#)
        .send()
        .await
        .unwrap();

    assert!(resp.status().is_client_error());
    assert!(!fixture.mirror_file.exists());
}

#[tokio::test]
async fn test_http_mirror_round_trip() {
    let fixture = TestFixture::new().await;
    let mirror = fixture.mirror();

    assert!(mirror.fetch().await.is_err());

    let document: OwnersDocument =
        serde_json::from_value(json!({ "owners": [owner_json("a@x.com")] })).unwrap();
    mirror.push(&document).await.unwrap();

    assert_eq!(mirror.fetch().await.unwrap(), document);
}

#[tokio::test]
async fn test_store_adopts_remote_when_local_empty() {
    let fixture = TestFixture::new().await;
    let document: OwnersDocument =
        serde_json::from_value(json!({ "owners": [owner_json("remote@x.com")] })).unwrap();
    fixture.mirror().push(&document).await.unwrap();

    let store = PersistentStore::new(std::sync::Arc::new(MemoryStore::new()))
        .with_remote(std::sync::Arc::new(fixture.mirror()));

    let owners = store.load().await.owners;
    assert_eq!(owners.len(), 1);
    assert_eq!(owners[0].email, "remote@x.com");
}

#[tokio::test]
async fn test_wizard_session_mirrors_to_server() {
    let fixture = TestFixture::new().await;

    let mut session = open_session(&fixture.config("first.sqlite")).await.unwrap();
    // Startup writes the (empty) collection back through the mirror
    fixture.wait_for_remote(|_| true).await;

    assert_eq!(
        session.submit_login("owner@x.com").await.unwrap(),
        LoginOutcome::RegistrationRequired
    );
    session
        .submit_registration(registration("owner@x.com"))
        .await
        .unwrap();
    fixture.wait_for_remote(|doc| doc.owners.len() == 1).await;

    session
        .add_employee(&EmployeeDraft::new(
            "Jane",
            "Doe",
            "jane@x.com",
            Some(Gender::Female),
        ))
        .unwrap();
    let summary = session.submit_all().await.unwrap();
    assert_eq!(summary.employee_count, 1);
    assert_eq!(session.screen(), &Screen::Confirmation);

    let document = fixture
        .wait_for_remote(|doc| doc.owners.first().is_some_and(|o| o.employees.len() == 1))
        .await;
    assert_eq!(document.owners[0].employees[0].email, "jane@x.com");

    // A fresh local store picks the owner up from the mirror
    let mut second = open_session(&fixture.config("second.sqlite")).await.unwrap();
    assert_eq!(
        second.submit_login("owner@x.com").await.unwrap(),
        LoginOutcome::LoggedIn
    );
    assert_eq!(second.state().current_employees().len(), 1);
}

#[tokio::test]
async fn test_session_survives_unreachable_mirror() {
    let temp_dir = TempDir::new().unwrap();

    // Reserve a port, then close it so nothing is listening
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = Config {
        db_path: temp_dir.path().join("local.sqlite"),
        mirror_file: temp_dir.path().join("owners.json"),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        mirror_url: Some(format!("http://{}{}", addr, MIRROR_PATH)),
        mirror_timeout: Duration::from_millis(500),
        log_level: "warn".to_string(),
    };

    let mut session = open_session(&config).await.unwrap();
    session.submit_login("owner@x.com").await.unwrap();
    session
        .submit_registration(registration("owner@x.com"))
        .await
        .unwrap();
    drop(session);

    // Local storage alone carries the owner into the next session
    let mut reopened = open_session(&config).await.unwrap();
    assert_eq!(
        reopened.submit_login("owner@x.com").await.unwrap(),
        LoginOutcome::LoggedIn
    );
}
