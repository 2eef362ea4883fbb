//! Common test utilities for snowrest-rs integration tests.
//!
//! # Stub SQL API Server
//!
//! Integration tests run against [`StubServer`], a minimal HTTP server on a
//! loopback port. Tests enqueue canned responses per method and path, point
//! a client at [`StubServer::base_url`], and afterwards inspect the
//! recorded requests. No external service is required, so these tests run
//! everywhere `cargo test` does.
//!
//! The server intentionally speaks the smallest possible slice of
//! HTTP/1.1: one request per connection, `Connection: close` on every
//! response, bodies framed by `Content-Length`. That is all the client
//! ever needs from it.
//!
//! # Example
//!
//! ```ignore
//! let server = StubServer::start().await;
//! server.enqueue(
//!     "POST",
//!     "/api/v2/statements?async=true&nullable=true",
//!     CannedResponse::json(200, accepted_payload("handle-1")),
//! );
//!
//! let client = Client::new(test_config(&server.base_url())).unwrap();
//! ```

use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use snowrest_rs::ClientConfig;

// ============================================================================
// Test Fixtures
// ============================================================================

/// PKCS#8 RSA private key used by every test. Generated once for the test
/// suite; it authenticates nothing real.
pub const TEST_PRIVATE_KEY: &str = include_str!("../fixtures/rsa_test_key.pem");

/// Statement handle used by the canned payload helpers.
pub const TEST_HANDLE: &str = "01b2c3d4-0000-1111-2222-333344445555";

/// Build a client configuration pointed at a stub server.
pub fn test_config(base_url: &str) -> ClientConfig {
    ClientConfig::builder()
        .account("testorg-testaccount")
        .user("TESTUSER")
        .public_key_fingerprint("fp123=")
        .private_key_pem(TEST_PRIVATE_KEY)
        .warehouse("TEST_WH")
        .database("TEST_DB")
        .schema("PUBLIC")
        .base_url(base_url)
        .build()
        .expect("test config must build")
}

// ============================================================================
// Canned Payloads
// ============================================================================

/// Submission acceptance payload carrying a statement handle.
pub fn accepted_payload(handle: &str) -> serde_json::Value {
    json!({
        "code": "333334",
        "message": "Asynchronous execution in progress. Use provided query id to perform query monitoring and management.",
        "statementHandle": handle,
        "statementStatusUrl": format!("/api/v2/statements/{handle}?requestId=abc")
    })
}

/// Still-running payload returned while a statement executes.
pub fn pending_payload(handle: &str) -> serde_json::Value {
    json!({
        "code": "333334",
        "message": "Asynchronous execution in progress.",
        "statementHandle": handle
    })
}

/// Success payload with metadata and the first partition of rows.
///
/// `columns` pairs names with declared types; `partition_rows` gives the
/// row count of every partition, first included.
pub fn success_payload(
    columns: &[(&str, &str)],
    partition_rows: &[u64],
    data: serde_json::Value,
) -> serde_json::Value {
    let num_rows: u64 = partition_rows.iter().sum();
    let row_type: Vec<serde_json::Value> = columns
        .iter()
        .map(|(name, column_type)| json!({ "name": name, "type": column_type, "nullable": true }))
        .collect();
    let partition_info: Vec<serde_json::Value> = partition_rows
        .iter()
        .map(|rows| json!({ "rowCount": rows }))
        .collect();

    json!({
        "code": "090001",
        "message": "Statement executed successfully.",
        "statementHandle": TEST_HANDLE,
        "resultSetMetaData": {
            "numRows": num_rows,
            "format": "jsonv2",
            "partitionInfo": partition_info,
            "rowType": row_type
        },
        "data": data
    })
}

/// Follow-up partition payload: rows only, no metadata.
pub fn partition_payload(data: serde_json::Value) -> serde_json::Value {
    json!({
        "code": "090001",
        "data": data
    })
}

// ============================================================================
// Canned Responses
// ============================================================================

/// One prepared HTTP response.
#[derive(Debug, Clone)]
pub struct CannedResponse {
    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl CannedResponse {
    /// A JSON response with the given status.
    pub fn json(status: u16, payload: serde_json::Value) -> Self {
        Self {
            status,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: payload.to_string().into_bytes(),
        }
    }

    /// A gzip-compressed JSON response declaring `Content-Encoding: gzip`.
    pub fn gzip_json(status: u16, payload: serde_json::Value) -> Self {
        Self {
            status,
            headers: vec![
                ("content-type".to_string(), "application/json".to_string()),
                ("content-encoding".to_string(), "gzip".to_string()),
            ],
            body: gzip(payload.to_string().as_bytes()),
        }
    }

    /// A response with the given raw body and no content headers.
    pub fn raw(status: u16, body: Vec<u8>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body,
        }
    }

    /// A response with an empty body.
    pub fn empty(status: u16) -> Self {
        Self::raw(status, Vec::new())
    }

    /// Add a header to the response.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    fn to_bytes(&self) -> Vec<u8> {
        let reason = match self.status {
            200 => "OK",
            401 => "Unauthorized",
            404 => "Not Found",
            422 => "Unprocessable Entity",
            500 => "Internal Server Error",
            502 => "Bad Gateway",
            _ => "Response",
        };

        let mut head = format!("HTTP/1.1 {} {}\r\n", self.status, reason);
        for (name, value) in &self.headers {
            head.push_str(&format!("{name}: {value}\r\n"));
        }
        head.push_str(&format!("content-length: {}\r\n", self.body.len()));
        head.push_str("connection: close\r\n\r\n");

        let mut bytes = head.into_bytes();
        bytes.extend_from_slice(&self.body);
        bytes
    }
}

/// Gzip-compress a byte slice.
pub fn gzip(bytes: &[u8]) -> Vec<u8> {
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes).expect("gzip write");
    encoder.finish().expect("gzip finish")
}

/// Raw-DEFLATE-compress a byte slice (no gzip wrapper).
pub fn deflate(bytes: &[u8]) -> Vec<u8> {
    use flate2::write::DeflateEncoder;
    use flate2::Compression;
    use std::io::Write;

    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes).expect("deflate write");
    encoder.finish().expect("deflate finish")
}

// ============================================================================
// Recorded Requests
// ============================================================================

/// One request the stub server received, as parsed off the wire.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Request method, e.g. `GET`
    pub method: String,
    /// Path plus query string, e.g. `/api/v2/statements?async=true&nullable=true`
    pub path_and_query: String,
    /// Headers with lowercased names
    pub headers: HashMap<String, String>,
    /// Raw request body
    pub body: Vec<u8>,
}

impl RecordedRequest {
    /// Look up a header by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(|v| v.as_str())
    }

    /// The bearer token from the `Authorization` header, if present.
    pub fn bearer_token(&self) -> Option<&str> {
        self.header("authorization")?.strip_prefix("Bearer ")
    }

    /// Parse the body as JSON.
    pub fn json_body(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("request body must be JSON")
    }
}

// ============================================================================
// Stub Server
// ============================================================================

#[derive(Default)]
struct ServerState {
    routes: Mutex<HashMap<(String, String), VecDeque<CannedResponse>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ServerState {
    fn next_response(&self, request: &RecordedRequest) -> CannedResponse {
        let key = (request.method.clone(), request.path_and_query.clone());
        let mut routes = self.routes.lock().expect("routes lock");
        match routes.get_mut(&key).and_then(|queue| queue.pop_front()) {
            Some(response) => response,
            // An unrouted request is a test bug; make it loud.
            None => CannedResponse::json(
                500,
                json!({
                    "message": format!(
                        "no canned response for {} {}",
                        request.method, request.path_and_query
                    )
                }),
            ),
        }
    }
}

/// Minimal one-request-per-connection HTTP server for tests.
pub struct StubServer {
    addr: SocketAddr,
    state: Arc<ServerState>,
}

impl StubServer {
    /// Bind a loopback port and start serving in a background task.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub server");
        let addr = listener.local_addr().expect("stub server address");
        let state = Arc::new(ServerState::default());

        let accept_state = Arc::clone(&state);
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let state = Arc::clone(&accept_state);
                tokio::spawn(async move {
                    let _ = serve_connection(stream, state).await;
                });
            }
        });

        Self { addr, state }
    }

    /// Base URL clients should be configured with.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Queue a response for the next request matching `method` and
    /// `path_and_query`. Multiple responses on the same route are served
    /// in order, one per request.
    pub fn enqueue(&self, method: &str, path_and_query: &str, response: CannedResponse) {
        self.state
            .routes
            .lock()
            .expect("routes lock")
            .entry((method.to_string(), path_and_query.to_string()))
            .or_default()
            .push_back(response);
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().expect("requests lock").clone()
    }

    /// Requests whose path matches a predicate.
    pub fn requests_matching(&self, predicate: impl Fn(&RecordedRequest) -> bool) -> Vec<RecordedRequest> {
        self.requests().into_iter().filter(|r| predicate(r)).collect()
    }
}

async fn serve_connection(mut stream: TcpStream, state: Arc<ServerState>) -> std::io::Result<()> {
    let request = read_request(&mut stream).await?;
    let response = state.next_response(&request);
    state.requests.lock().expect("requests lock").push(request);

    stream.write_all(&response.to_bytes()).await?;
    stream.shutdown().await
}

async fn read_request(stream: &mut TcpStream) -> std::io::Result<RecordedRequest> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let read = stream.read(&mut chunk).await?;
        if read == 0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "connection closed before request head",
            ));
        }
        buffer.extend_from_slice(&chunk[..read]);
        if let Some(position) = find_subsequence(&buffer, b"\r\n\r\n") {
            break position;
        }
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
    let mut lines = head.split("\r\n");

    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path_and_query = parts.next().unwrap_or_default().to_string();

    let mut headers = HashMap::new();
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
        }
    }

    let content_length = headers
        .get("content-length")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0);

    let mut body = buffer[header_end + 4..].to_vec();
    while body.len() < content_length {
        let read = stream.read(&mut chunk).await?;
        if read == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..read]);
    }
    body.truncate(content_length);

    Ok(RecordedRequest {
        method,
        path_and_query,
        headers,
        body,
    })
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canned_response_wire_format() {
        let bytes = CannedResponse::json(200, json!({"ok": true})).to_bytes();
        let text = String::from_utf8_lossy(&bytes);

        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("content-type: application/json\r\n"));
        assert!(text.contains("connection: close\r\n"));
        assert!(text.ends_with("{\"ok\":true}"));
    }

    #[test]
    fn test_gzip_helper_produces_gzip_magic() {
        let compressed = gzip(b"{}");
        assert_eq!(&compressed[..2], &[0x1f, 0x8b]);
    }

    #[test]
    fn test_find_subsequence() {
        assert_eq!(find_subsequence(b"abc\r\n\r\ndef", b"\r\n\r\n"), Some(3));
        assert_eq!(find_subsequence(b"abcdef", b"\r\n\r\n"), None);
    }
}
