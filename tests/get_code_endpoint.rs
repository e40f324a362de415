//! Integration tests for the `/get_code` HTTP contract.
//!
//! Each test spins up the axum router on a random loopback port and talks to
//! it over real HTTP.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rusqlite::Connection;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use imessage_otp::db::queries::datetime_to_cocoa;
use imessage_otp::db::source::{ChatDb, Message, MessageSource};
use imessage_otp::error::StoreError;
use imessage_otp::server::{code_routes, CodeService};
use imessage_otp::{CodeExtractor, KeywordSet};

/// Source that always returns the same message.
struct StubSource(Option<&'static str>);

impl MessageSource for StubSource {
    fn fetch_latest(&self, _window: Duration) -> Result<Option<Message>, StoreError> {
        Ok(self.0.map(|text| Message {
            text: text.to_string(),
            timestamp: Utc::now(),
        }))
    }
}

/// Start the router on a random port, return the port.
async fn start_server(service: CodeService) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, code_routes(service)).await.unwrap();
    });

    port
}

fn stub_service(text: Option<&'static str>) -> CodeService {
    CodeService::new(
        Arc::new(StubSource(text)),
        CodeExtractor::default(),
        Duration::from_secs(60),
    )
}

async fn get(port: u16, path: &str) -> (u16, Value) {
    let resp = reqwest::get(format!("http://127.0.0.1:{port}{path}"))
        .await
        .unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap())
}

#[tokio::test]
async fn test_code_found() {
    let port = start_server(stub_service(Some("您的验证码是123456,请勿泄露"))).await;
    let (status, body) = get(port, "/get_code").await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({"sms_code": "123456", "message": "Code found"}));
}

#[tokio::test]
async fn test_no_code_variants() {
    for text in ["Hello, how are you?", "您的校验码发送失败"] {
        let port = start_server(stub_service(Some(text))).await;
        let (status, body) = get(port, "/get_code").await;
        assert_eq!(status, 200);
        assert_eq!(body, json!({"sms_code": -1, "message": "No code found"}));
    }
}

#[tokio::test]
async fn test_no_message() {
    let port = start_server(stub_service(None)).await;
    let (status, body) = get(port, "/get_code").await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({"sms_code": -1, "message": "No message found"}));
}

#[tokio::test]
async fn test_missing_database_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let service = CodeService::new(
        Arc::new(ChatDb::new(dir.path().join("chat.db"))),
        CodeExtractor::default(),
        Duration::from_secs(60),
    );
    let port = start_server(service).await;

    let (status, body) = get(port, "/get_code").await;
    assert_eq!(status, 503);
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].as_str().unwrap().contains("not found"));
    assert!(body.get("sms_code").is_none());
}

#[tokio::test]
async fn test_reads_latest_message_from_chat_db() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chat.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE message (
            ROWID INTEGER PRIMARY KEY AUTOINCREMENT,
            text TEXT,
            attributedBody BLOB,
            date INTEGER
        );",
    )
    .unwrap();

    let now = Utc::now();
    for (text, secs_ago) in [
        ("Your code is 9999 (old)", 300),
        ("Your verification code is 4821", 10),
        ("see you soon", 20),
    ] {
        conn.execute(
            "INSERT INTO message (text, date) VALUES (?1, ?2)",
            rusqlite::params![text, datetime_to_cocoa(now - chrono::Duration::seconds(secs_ago))],
        )
        .unwrap();
    }

    let service = CodeService::new(
        Arc::new(ChatDb::new(&path)),
        CodeExtractor::new(KeywordSet::new(["verification code"])),
        Duration::from_secs(60),
    );
    let port = start_server(service).await;

    let (status, body) = get(port, "/get_code").await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({"sms_code": "4821", "message": "Code found"}));
}

#[tokio::test]
async fn test_health() {
    let port = start_server(stub_service(None)).await;
    let (status, body) = get(port, "/health").await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "imessage-otp");
}

#[tokio::test]
async fn test_unknown_route() {
    let port = start_server(stub_service(None)).await;
    let resp = reqwest::get(format!("http://127.0.0.1:{port}/get_codes"))
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);
}
