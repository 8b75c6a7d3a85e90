use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use shipwright_http::{
    ApiResponse, CancellationToken, ExecutorConfig, Headers, HttpExecutor, HttpTransport, Method, Protocol,
    RequestBody, RequestDescriptor, TransportResponse,
};
use shipwright_release::{ReleaseError, ReleaseServerClient, ReleaseServerOptions, ReleaseServerPublisher};
use tempfile::tempdir;

#[derive(Debug, thiserror::Error)]
#[error("unexpected request")]
struct Unexpected;

#[derive(Debug, Clone)]
struct Seen {
    descriptor: RequestDescriptor,
    body:       Bytes,
}

/// Release server stand-in: replies are queued per `METHOD path`.
#[derive(Default)]
struct FakeServer {
    replies: Mutex<Vec<(String, VecDeque<(u16, &'static str)>)>>,
    seen:    Mutex<Vec<Seen>>,
}

impl FakeServer {
    fn reply(self, route: &str, status: u16, body: &'static str) -> Self {
        {
            let mut replies = self.replies.lock().unwrap();
            match replies.iter_mut().find(|(r, _)| r == route) {
                Some((_, queue)) => queue.push_back((status, body)),
                None => replies.push((route.to_string(), VecDeque::from([(status, body)]))),
            }
        }
        self
    }

    fn seen(&self) -> Vec<Seen> { self.seen.lock().unwrap().clone() }

    fn routes(&self) -> Vec<String> {
        self.seen()
            .iter()
            .map(|seen| format!("{} {}", seen.descriptor.method(), seen.descriptor.path()))
            .collect()
    }
}

impl HttpTransport for FakeServer {
    type Error = Unexpected;

    async fn send(&self, descriptor: &RequestDescriptor, body: RequestBody) -> Result<TransportResponse, Unexpected> {
        let body = match body {
            RequestBody::Empty => Bytes::new(),
            RequestBody::Bytes(bytes) => bytes,
            RequestBody::File { path, .. } => Bytes::from(tokio::fs::read(path).await.unwrap()),
        };
        self.seen.lock().unwrap().push(Seen {
            descriptor: descriptor.clone(),
            body,
        });

        let route = format!("{} {}", descriptor.method(), descriptor.path());
        let (status, text) = self
            .replies
            .lock()
            .unwrap()
            .iter_mut()
            .find(|(r, _)| *r == route)
            .and_then(|(_, queue)| queue.pop_front())
            .ok_or(Unexpected)?;

        let headers = Headers::new().with("Content-Type", "application/json");
        Ok(TransportResponse::from_bytes(status, "", headers, text))
    }
}

fn options() -> ReleaseServerOptions {
    ReleaseServerOptions::new("releases.example.com")
        .username("ci")
        .password("s3cret")
}

fn publisher(server: Arc<FakeServer>, version: &str) -> ReleaseServerPublisher<Arc<FakeServer>> {
    let executor = Arc::new(HttpExecutor::with_config(server, ExecutorConfig::default()));
    ReleaseServerPublisher::new(executor, options(), version, CancellationToken::new()).unwrap()
}

#[tokio::test]
async fn test_publish_creates_missing_version() {
    let server = Arc::new(
        FakeServer::default()
            .reply("POST /api/auth/login", 200, r#"{"token":"tok-1"}"#)
            .reply("GET /api/version/", 200, r#"[{"name":"0.9.0"}]"#)
            .reply("POST /api/version/", 201, r#"{"name":"1.0.0-beta.1"}"#)
            .reply("POST /api/asset/", 200, r#"{"id":"asset-1"}"#),
    );
    let dir = tempdir().unwrap();
    let file = dir.path().join("App-1.0.0-beta.1.zip");
    std::fs::write(&file, b"zip-binary").unwrap();

    let response = publisher(server.clone(), "1.0.0-beta.1").publish(&file).await.unwrap();

    assert_eq!(response, ApiResponse::Json(serde_json::json!({ "id": "asset-1" })));
    assert_eq!(
        server.routes(),
        ["POST /api/auth/login", "GET /api/version/", "POST /api/version/", "POST /api/asset/"]
    );

    let seen = server.seen();
    let login = &seen[0];
    assert_eq!(login.descriptor.protocol(), Some(Protocol::Https));
    assert_eq!(
        serde_json::from_slice::<serde_json::Value>(&login.body).unwrap(),
        serde_json::json!({ "username": "ci", "password": "s3cret" })
    );

    assert_eq!(seen[1].descriptor.headers().get("Authorization"), Some("Bearer tok-1"));

    assert_eq!(
        serde_json::from_slice::<serde_json::Value>(&seen[2].body).unwrap(),
        serde_json::json!({ "channel": { "name": "beta" }, "name": "1.0.0-beta.1", "notes": "" })
    );

    let upload = &seen[3];
    assert_eq!(upload.descriptor.method(), Method::Post);
    assert_eq!(upload.descriptor.headers().get("Authorization"), Some("Bearer tok-1"));
    assert_eq!(upload.descriptor.headers().get("Accept"), Some("application/json"));
    assert_eq!(upload.descriptor.headers().get("Content-Type"), Some("application/zip"));
    assert_eq!(upload.descriptor.headers().get("Content-Length"), Some("10"));
    assert_eq!(&upload.body[..], b"zip-binary");
}

#[tokio::test]
async fn test_existing_version_is_reused_and_login_cached() {
    let server = Arc::new(
        FakeServer::default()
            .reply("POST /api/auth/login", 200, r#"{"token":"tok-2"}"#)
            .reply("GET /api/version/", 200, r#"[{"name":"2.0.0","notes":"x"}]"#)
            .reply("GET /api/version/", 200, r#"[{"name":"2.0.0"}]"#)
            .reply("POST /api/asset/", 200, "{}")
            .reply("POST /api/asset/", 200, "{}"),
    );
    let dir = tempdir().unwrap();
    let zip = dir.path().join("app.zip");
    let yml = dir.path().join("latest.yml");
    std::fs::write(&zip, b"zip").unwrap();
    std::fs::write(&yml, b"version: 2.0.0").unwrap();

    let publisher = publisher(server.clone(), "2.0.0");
    publisher.publish(&zip).await.unwrap();
    publisher.publish(&yml).await.unwrap();

    assert_eq!(
        server.routes(),
        [
            "POST /api/auth/login",
            "GET /api/version/",
            "POST /api/asset/",
            "GET /api/version/",
            "POST /api/asset/",
        ]
    );
}

#[tokio::test]
async fn test_authentication_failure() {
    let server = Arc::new(FakeServer::default().reply("POST /api/auth/login", 401, r#"{"error":"bad password"}"#));
    let dir = tempdir().unwrap();
    let file = dir.path().join("app.zip");
    std::fs::write(&file, b"zip").unwrap();

    let err = publisher(server.clone(), "1.0.0").publish(&file).await.unwrap_err();

    assert!(matches!(err, ReleaseError::Authentication(ref source) if source.status() == Some(401)));
    assert_eq!(err.to_string(), "could not authenticate with release server");
    assert_eq!(server.routes(), ["POST /api/auth/login"]);
}

#[tokio::test]
async fn test_login_without_token() {
    let server = Arc::new(FakeServer::default().reply("POST /api/auth/login", 200, r#"{"user":"ci"}"#));
    let executor = Arc::new(HttpExecutor::new(server));
    let credentials = options().credentials().unwrap();
    let client = ReleaseServerClient::new(executor, options(), credentials);

    assert!(matches!(client.authenticate(None).await, Err(ReleaseError::MissingToken)));
}

#[tokio::test]
async fn test_upload_failure_names_file() {
    let server = Arc::new(FakeServer::default().reply("POST /api/asset/", 500, r#"{"error":"disk full"}"#));
    let executor = Arc::new(HttpExecutor::new(server));
    let credentials = options().credentials().unwrap();
    let client = ReleaseServerClient::new(executor, options(), credentials);

    let dir = tempdir().unwrap();
    let file = dir.path().join("app.exe");
    std::fs::write(&file, b"MZ").unwrap();

    let err = client.upload_asset("tok", &file, None).await.unwrap_err();

    assert!(matches!(err, ReleaseError::Upload { ref source, .. } if source.status() == Some(500)));
    assert!(err.to_string().contains("app.exe"));
}

#[test]
fn test_missing_credentials_fail_at_construction() {
    let executor = Arc::new(HttpExecutor::new(Arc::new(FakeServer::default())));
    let options = ReleaseServerOptions::new("releases.example.com").username("ci").password(" ");

    let publisher =
        ReleaseServerPublisher::with_credential_lookup(executor, options, "1.0.0", CancellationToken::new(), |_| None);

    match publisher {
        Err(err) => {
            assert!(matches!(
                err,
                ReleaseError::MissingCredential {
                    field: "password",
                    variable: shipwright_release::PASSWORD_ENV,
                }
            ));
        }
        Ok(publisher) => panic!("expected missing password, got {publisher:?}"),
    }
}

#[tokio::test]
async fn test_credential_lookup_fills_blank_password() {
    let server = Arc::new(
        FakeServer::default()
            .reply("POST /api/auth/login", 200, r#"{"token":"tok-env"}"#)
            .reply("GET /api/version/", 200, r#"[{"name":"1.0.0"}]"#)
            .reply("POST /api/asset/", 200, r#"{"id":"asset-env"}"#),
    );
    let executor = Arc::new(HttpExecutor::new(server.clone()));
    let options = ReleaseServerOptions::new("releases.example.com").username("ci").password(" ");
    let publisher = ReleaseServerPublisher::with_credential_lookup(
        executor,
        options,
        "1.0.0",
        CancellationToken::new(),
        |name| (name == shipwright_release::PASSWORD_ENV).then(|| "from-env".to_string()),
    )
    .unwrap();

    let dir = tempdir().unwrap();
    let file = dir.path().join("notes.txt");
    std::fs::write(&file, b"notes").unwrap();
    publisher.publish(&file).await.unwrap();

    assert_eq!(
        serde_json::from_slice::<serde_json::Value>(&server.seen()[0].body).unwrap(),
        serde_json::json!({ "username": "ci", "password": "from-env" })
    );
}
