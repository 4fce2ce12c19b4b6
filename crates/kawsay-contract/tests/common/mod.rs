// crates/kawsay-contract/tests/common/mod.rs
// ============================================================================
// Module: Stub Predictor
// Description: In-process tiny_http predictor for hermetic engine tests.
// Purpose: Serve conforming and deliberately broken /bulk-predict behavior.
// Dependencies: tiny_http, serde_json
// ============================================================================

//! ## Overview
//! [`StubPredictor`] binds an ephemeral port and answers `/bulk-predict` and
//! `/health` on a background thread. The conforming behavior validates like
//! the real predictor (non-empty records, all fields present, grades within
//! [0, 100], known course ids) and scores from grades only. Other behaviors
//! break one part of the contract each.

#![allow(dead_code, reason = "Shared helpers are reused across multiple test files.")]
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only stub server uses panic-based setup."
)]

use std::io::ErrorKind;
use std::io::Read;
use std::io::Write;
use std::net::TcpListener;
use std::net::TcpStream;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use serde_json::Value;
use serde_json::json;
use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;
use url::Url;

// ============================================================================
// SECTION: Behavior
// ============================================================================

/// Course identifiers the stub accepts.
const KNOWN_COURSES: [i64; 5] = [2, 11, 21, 31, 41];

/// How the stub answers requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// Validates and scores like the real predictor.
    Conforming,
    /// Conforming, except confidence depends on the student id.
    KeysOnStudentId,
    /// Conforming, except predictions come back in reverse order.
    ReversesOrder,
    /// Returns 200 with an empty prediction list for every request.
    AcceptsEverything,
    /// Returns 200 with a body that is not JSON.
    MalformedBody,
    /// Reports a degraded model and rejects predictions with 503.
    Degraded,
}

/// Request observed by the stub.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method.
    pub method: String,
    /// Request URL (path and query).
    pub url: String,
    /// `Content-Type` header value.
    pub content_type: Option<String>,
    /// `Accept` header value.
    pub accept: Option<String>,
    /// Raw body.
    pub body: Vec<u8>,
}

// ============================================================================
// SECTION: Server
// ============================================================================

/// Running stub predictor; stops on drop.
pub struct StubPredictor {
    server: Arc<Server>,
    base_url: Url,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    handle: Option<JoinHandle<()>>,
}

impl StubPredictor {
    /// Starts a stub with the given behavior on an ephemeral port.
    pub fn start(behavior: Behavior) -> Self {
        let server = Arc::new(Server::http("127.0.0.1:0").unwrap());
        let addr = server.server_addr().to_ip().expect("ip listener");
        let base_url = Url::parse(&format!("http://{addr}")).unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let worker = Arc::clone(&server);
        let log = Arc::clone(&requests);
        let handle = thread::spawn(move || {
            while let Ok(mut request) = worker.recv() {
                let mut body = Vec::new();
                let _ = request.as_reader().read_to_end(&mut body);
                let header = |name: &'static str| {
                    request
                        .headers()
                        .iter()
                        .find(|header| header.field.equiv(name))
                        .map(|header| header.value.as_str().to_string())
                };
                let recorded = RecordedRequest {
                    method: request.method().as_str().to_string(),
                    url: request.url().to_string(),
                    content_type: header("Content-Type"),
                    accept: header("Accept"),
                    body,
                };
                let (status, payload) = respond(behavior, &recorded);
                log.lock().unwrap().push(recorded);
                let response = Response::from_string(payload)
                    .with_status_code(status)
                    .with_header(
                        Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap(),
                    );
                let _ = request.respond(response);
            }
        });

        Self {
            server,
            base_url,
            requests,
            handle: Some(handle),
        }
    }

    /// Returns the stub base URL.
    pub fn base_url(&self) -> Url {
        self.base_url.clone()
    }

    /// Returns every request observed so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for StubPredictor {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Returns a base URL on a port with no listener.
pub fn closed_port_url() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Url::parse(&format!("http://{addr}")).unwrap()
}

// ============================================================================
// SECTION: Raw Peer
// ============================================================================

/// Wire-level misbehavior that an HTTP server library will not produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawBehavior {
    /// Sends a 422 head announcing a 200-byte body, writes 5 bytes, then closes.
    TruncatedBody,
    /// Accepts connections and never writes a byte.
    Silent,
}

/// Plain TCP listener answering with [`RawBehavior`]; stops on drop.
pub struct RawPeer {
    base_url: Url,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl RawPeer {
    /// Starts a raw peer on an ephemeral port.
    pub fn start(behavior: RawBehavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let addr = listener.local_addr().unwrap();
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let handle = thread::spawn(move || {
            let mut held = Vec::new();
            while !flag.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((mut stream, _)) => {
                        stream.set_nonblocking(false).unwrap();
                        match behavior {
                            RawBehavior::TruncatedBody => {
                                drain_request(&mut stream);
                                let _ = stream.write_all(
                                    b"HTTP/1.1 422 Unprocessable Entity\r\n\
                                      Content-Type: application/json\r\n\
                                      Content-Length: 200\r\n\r\n{\"err",
                                );
                                let _ = stream.flush();
                            }
                            RawBehavior::Silent => held.push(stream),
                        }
                    }
                    Err(err) if err.kind() == ErrorKind::WouldBlock => {
                        thread::sleep(Duration::from_millis(10));
                    }
                    Err(_) => break,
                }
            }
        });
        Self {
            base_url: Url::parse(&format!("http://{addr}")).unwrap(),
            stop,
            handle: Some(handle),
        }
    }

    /// Returns the peer base URL.
    pub fn base_url(&self) -> Url {
        self.base_url.clone()
    }
}

impl Drop for RawPeer {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Reads one request head and its `Content-Length` body so closing is clean.
fn drain_request(stream: &mut TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let Ok(read) = stream.read(&mut chunk) else { return };
        if read == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..read]);
        let Some(head_end) = buf.windows(4).position(|window| window == b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&buf[..head_end]).to_ascii_lowercase();
        let length = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if buf.len() >= head_end + 4 + length {
            return;
        }
    }
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

fn respond(behavior: Behavior, request: &RecordedRequest) -> (u16, String) {
    if request.url == "/health" {
        return health(behavior);
    }
    if request.url != "/bulk-predict" || request.method != "POST" {
        return error(404, "NOT_FOUND", "unknown route", Vec::new());
    }
    match behavior {
        Behavior::AcceptsEverything => (200, json!({"predictions": []}).to_string()),
        Behavior::MalformedBody => (200, "<html>internal error</html>".to_string()),
        Behavior::Degraded => {
            error(503, "MODEL_NOT_LOADED", "model artifact not loaded", Vec::new())
        }
        Behavior::Conforming | Behavior::KeysOnStudentId | Behavior::ReversesOrder => {
            predict(behavior, &request.body)
        }
    }
}

fn health(behavior: Behavior) -> (u16, String) {
    let (status, model) =
        if behavior == Behavior::Degraded { ("degraded", "unavailable") } else { ("ok", "loaded") };
    (200, json!({"status": status, "services": {"model": model}}).to_string())
}

fn error(status: u16, code: &str, message: &str, details: Vec<Value>) -> (u16, String) {
    (status, json!({"error": {"code": code, "message": message, "details": details}}).to_string())
}

fn validation_error(field: String, issue: &str) -> (u16, String) {
    error(422, "VALIDATION_ERROR", "request validation failed", vec![json!({
        "field": field,
        "issue": issue
    })])
}

fn predict(behavior: Behavior, body: &[u8]) -> (u16, String) {
    let Ok(value) = serde_json::from_slice::<Value>(body) else {
        return validation_error("body".to_string(), "invalid JSON");
    };
    let Some(records) = value.get("records").and_then(Value::as_array) else {
        return validation_error("records".to_string(), "field required");
    };
    if records.is_empty() {
        return validation_error("records".to_string(), "must contain at least 1 item");
    }

    let mut predictions = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        let int = |name: &str| record.get(name).and_then(Value::as_i64);
        let grade = |name: &str| record.get(name).and_then(Value::as_f64);
        let (Some(student), Some(course), Some(semester)) =
            (int("studentId"), int("courseId"), int("semester"))
        else {
            return validation_error(format!("records.{index}"), "identifier field required");
        };
        let (Some(lab), Some(masterclass)) = (grade("grade_lab"), grade("grade_masterclass")) else {
            return validation_error(format!("records.{index}"), "grade field required");
        };
        if !(0.0..=100.0).contains(&lab) || !(0.0..=100.0).contains(&masterclass) {
            return validation_error(format!("records.{index}"), "grade must be within [0, 100]");
        }
        if !KNOWN_COURSES.contains(&course) {
            return validation_error(format!("records.{index}.courseId"), "unknown course");
        }
        predictions.push(score(behavior, student, course, semester, lab, masterclass));
    }
    if behavior == Behavior::ReversesOrder {
        predictions.reverse();
    }
    (200, json!({"predictions": predictions}).to_string())
}

fn score(
    behavior: Behavior,
    student: i64,
    course: i64,
    semester: i64,
    lab: f64,
    masterclass: f64,
) -> Value {
    let average = (lab + masterclass) / 2.0;
    let pass = lab >= 70.0 && masterclass >= 70.0;
    let mut confidence = if pass { 0.5 + average / 200.0 } else { 0.5 + (100.0 - average) / 200.0 };
    if behavior == Behavior::KeysOnStudentId {
        let offset = f64::from(u8::try_from(student % 50).unwrap_or(0)) / 1000.0;
        confidence = (confidence - offset).max(0.0);
    }
    let mut drivers = Vec::new();
    if pass {
        drivers.push("Strong overall grade (avg)".to_string());
    } else {
        drivers.push("Low overall grade".to_string());
        if lab < 70.0 {
            drivers.push("Low lab grade".to_string());
        }
        if masterclass < 70.0 {
            drivers.push("Low masterclass grade".to_string());
        }
    }
    json!({
        "studentId": student,
        "courseId": course,
        "semester": semester,
        "predictedOutcome": if pass { "PASS" } else { "FAIL" },
        "confidence": confidence,
        "drivers": drivers
    })
}
