//! End-to-end tests of the HTTP surface over a loopback socket.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use relaypanel_hardware::mock::mock_connection;
use relaypanel_hardware::{DeviceManager, DeviceName, ManagerConfig, RelayState};
use relaypanel_server::http::{AppState, SharedState, router};
use relaypanel_storage::{Database, SqliteLabelStore};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

struct TestServer {
    addr: SocketAddr,
    state: SharedState,
    _db: Database,
    _static_dir: TempDir,
}

struct TestResponse {
    status: u16,
    head: String,
    body: String,
}

impl TestResponse {
    fn header(&self, name: &str) -> Option<String> {
        self.head.lines().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.eq_ignore_ascii_case(name)
                .then(|| value.trim().to_string())
        })
    }
}

async fn spawn_server() -> TestServer {
    let static_dir = TempDir::new().unwrap();
    std::fs::write(static_dir.path().join("index.html"), "<h1>relaypanel</h1>").unwrap();
    std::fs::write(static_dir.path().join("app.css"), "body{}").unwrap();

    let db = Database::in_memory().await.unwrap();
    let state = Arc::new(AppState {
        devices: DeviceManager::new(ManagerConfig::default()),
        labels: SqliteLabelStore::new(db.pool().clone()),
        tv: None,
        static_dir: static_dir.path().to_path_buf(),
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        addr,
        state,
        _db: db,
        _static_dir: static_dir,
    }
}

async fn send(addr: SocketAddr, method: &str, path: &str, extra: &str, body: &str) -> TestResponse {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!(
        "{method} {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n{extra}Content-Length: {}\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    let text = String::from_utf8_lossy(&raw).into_owned();
    let (head, body) = text.split_once("\r\n\r\n").unwrap();
    let status = head
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .unwrap();

    TestResponse {
        status,
        head: head.to_string(),
        body: body.to_string(),
    }
}

async fn get(addr: SocketAddr, path: &str) -> TestResponse {
    send(addr, "GET", path, "", "").await
}

#[tokio::test]
async fn test_status_with_and_without_trailing_slash() {
    let server = spawn_server().await;

    for path in ["/status", "/status/"] {
        let response = get(server.addr, path).await;
        assert_eq!(response.status, 200, "{path}");

        let json: serde_json::Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(
            json["devices"],
            serde_json::json!([
                {"name": "relays", "state": "disconnected"},
                {"name": "buzzer", "state": "disconnected"}
            ])
        );
        assert_eq!(json["relays"].as_array().unwrap().len(), 8);
    }
}

#[tokio::test]
async fn test_every_response_carries_request_id() {
    let server = spawn_server().await;

    let response = get(server.addr, "/relay/states").await;
    let generated = response.header("x-request-id").unwrap();
    assert_eq!(generated.len(), 36);

    let response = send(
        server.addr,
        "GET",
        "/relay/states",
        "X-Request-Id: abc-123\r\n",
        "",
    )
    .await;
    assert_eq!(response.header("x-request-id").as_deref(), Some("abc-123"));
}

#[tokio::test]
async fn test_toggle_relay_over_http() {
    let server = spawn_server().await;
    let (connection, device) = mock_connection("relays");
    server
        .state
        .devices
        .set_device(DeviceName::Relays, Some(connection));

    let response = get(server.addr, "/relay/5").await;
    assert_eq!(response.status, 200);
    let states: Vec<RelayState> = serde_json::from_str(&response.body).unwrap();
    assert_eq!(states.len(), 8);
    assert_eq!(device.written(), b"5".to_vec());

    let response = get(server.addr, "/relay/9").await;
    assert_eq!(response.status, 400);
    assert_eq!(device.written(), b"5".to_vec());
}

#[tokio::test]
async fn test_buzzer_unavailable_without_connection() {
    let server = spawn_server().await;

    let response = get(server.addr, "/door/buzz").await;
    assert_eq!(response.status, 503);
    assert!(response.body.contains("buzzer not connected"));
}

#[tokio::test]
async fn test_set_label_then_read_back() {
    let server = spawn_server().await;

    let response = send(
        server.addr,
        "POST",
        "/relay/setLabel/4",
        "Content-Type: application/json\r\n",
        r#"{"label":"heater"}"#,
    )
    .await;
    assert_eq!(response.status, 200);

    let response = get(server.addr, "/relay/states").await;
    let states: Vec<RelayState> = serde_json::from_str(&response.body).unwrap();
    assert_eq!(states[3], RelayState::new("heater", false));

    let response = send(server.addr, "POST", "/relay/setLabel/4", "", "{").await;
    assert_eq!(response.status, 400);
}

#[tokio::test]
async fn test_tv_routes() {
    let server = spawn_server().await;

    assert_eq!(get(server.addr, "/tv/eject").await.status, 404);
    assert_eq!(get(server.addr, "/tv/power").await.status, 503);
}

#[tokio::test]
async fn test_static_files() {
    let server = spawn_server().await;

    let response = get(server.addr, "/").await;
    assert_eq!(response.status, 200);
    assert_eq!(response.body, "<h1>relaypanel</h1>");
    assert!(
        response
            .header("content-type")
            .unwrap()
            .starts_with("text/html")
    );

    let response = get(server.addr, "/app.css").await;
    assert_eq!(response.status, 200);
    assert!(response.header("content-type").unwrap().starts_with("text/css"));

    assert_eq!(get(server.addr, "/missing.js").await.status, 404);
    assert!(Path::new(&server.state.static_dir).exists());
}
