//! Shared helpers for the integration tests: an in-process cleaner service
//! and RSA fixtures.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use sandeul_cleaner::client::CleanerClient;
use sandeul_cleaner::config::ClientConfig;

/// One multipart part received by `POST /clean`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedPart {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// What the mock service saw and what it answers with.
#[derive(Default)]
pub struct MockState {
    /// Path to (status, raw body); a hit short-circuits the handler.
    failures: Mutex<HashMap<String, (u16, String)>>,
    /// Ciphertexts keyed by student hash.
    encrypted: Mutex<HashMap<String, String>>,
    students: Mutex<Vec<Value>>,
    pub encrypted_requests: Mutex<Vec<Vec<String>>>,
    pub clean_requests: Mutex<Vec<Vec<ReceivedPart>>>,
    pub predict_requests: Mutex<Vec<Value>>,
    /// Query strings of the GET endpoints, `path?query`.
    pub queries: Mutex<Vec<String>>,
}

impl MockState {
    pub fn fail(&self, path: &str, status: u16, body: &str) {
        self.failures
            .lock()
            .unwrap()
            .insert(path.to_string(), (status, body.to_string()));
    }

    pub fn recover(&self, path: &str) {
        self.failures.lock().unwrap().remove(path);
    }

    pub fn set_encrypted(&self, student_hash: &str, payload: String) {
        self.encrypted
            .lock()
            .unwrap()
            .insert(student_hash.to_string(), payload);
    }

    pub fn set_students(&self, students: Vec<Value>) {
        *self.students.lock().unwrap() = students;
    }

    fn canned_failure(&self, path: &str) -> Option<Response> {
        let failures = self.failures.lock().unwrap();
        failures.get(path).map(|(status, body)| {
            (StatusCode::from_u16(*status).unwrap(), body.clone()).into_response()
        })
    }
}

pub struct MockService {
    pub base_url: String,
    pub state: Arc<MockState>,
}

impl MockService {
    pub fn client(&self) -> CleanerClient {
        CleanerClient::new(ClientConfig::with_base_url(self.base_url.clone())).unwrap()
    }
}

/// Starts the mock service on an ephemeral port.
pub async fn spawn_service() -> MockService {
    let state = Arc::new(MockState::default());
    let app = Router::new()
        .route("/clean", post(clean))
        .route("/predict", post(predict))
        .route("/analytics/correlation", get(correlation))
        .route("/students", get(students))
        .route("/students/encrypted", post(students_encrypted))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockService {
        base_url: format!("http://{}", addr),
        state,
    }
}

type Shared = Arc<MockState>;

async fn clean(State(state): State<Shared>, mut multipart: Multipart) -> Response {
    let mut parts = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.unwrap().to_vec();
        parts.push(ReceivedPart {
            name,
            file_name,
            content_type,
            bytes,
        });
    }

    let generation: u32 = parts
        .iter()
        .find(|p| p.name == "generation")
        .and_then(|p| std::str::from_utf8(&p.bytes).ok()?.parse().ok())
        .unwrap_or(0);
    let results: Vec<Value> = parts
        .iter()
        .filter_map(|p| p.name.strip_suffix("_file"))
        .map(|dataset| {
            json!({
                "dataset": dataset,
                "status": "ok",
                "processed_sheets": ["Sheet1"],
                "sqlite_rows": 12,
                "generation": generation,
            })
        })
        .collect();
    state.clean_requests.lock().unwrap().push(parts);

    if let Some(response) = state.canned_failure("/clean") {
        return response;
    }
    Json(json!({
        "request_id": "req-1",
        "results": results,
        "success": true,
        "generation": generation,
    }))
    .into_response()
}

async fn predict(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    state.predict_requests.lock().unwrap().push(body.clone());
    if let Some(response) = state.canned_failure("/predict") {
        return response;
    }
    Json(json!({
        "student": { "id": 42, "student_hash": body["student_hash"] },
        "prediction": "B",
        "probabilities": { "A": 0.25, "B": 0.6, "C": 0.15 },
        "generation": "3",
        "features_used": ["attendance_rate", "award_count"],
        "actual_label": null,
        "model_artifact": "model-v3.pkl",
    }))
    .into_response()
}

fn record_query(state: &MockState, path: &str, query: &HashMap<String, String>) {
    let mut pairs: Vec<String> = query.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
    pairs.sort();
    state
        .queries
        .lock()
        .unwrap()
        .push(format!("{}?{}", path, pairs.join("&")));
}

async fn correlation(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    record_query(&state, "/analytics/correlation", &query);
    if let Some(response) = state.canned_failure("/analytics/correlation") {
        return response;
    }
    Json(json!({
        "label": "grade_label",
        "rows_received": 40,
        "rows_used": 38,
        "features_analyzed": 2,
        "skipped_features": [],
        "correlations": [
            { "feature": "award_count", "pearson": 0.12, "absolute": 0.12, "overlap_rows": 38 },
            { "feature": "absences", "pearson": -0.58, "absolute": 0.58, "overlap_rows": 37 }
        ]
    }))
    .into_response()
}

async fn students(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    record_query(&state, "/students", &query);
    if let Some(response) = state.canned_failure("/students") {
        return response;
    }
    let wanted: Option<u64> = query.get("generation").and_then(|g| g.parse().ok());
    let students: Vec<Value> = state
        .students
        .lock()
        .unwrap()
        .iter()
        .filter(|s| wanted.is_none_or(|g| s["generation"].as_u64() == Some(g)))
        .cloned()
        .collect();
    Json(json!({
        "count": students.len(),
        "generation": wanted.map(Value::from).unwrap_or_else(|| Value::from("all")),
        "sort_by": ["generation", "student_hash"],
        "sort_dir": ["asc", "asc"],
        "students": students,
    }))
    .into_response()
}

async fn students_encrypted(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let requested: Vec<String> = body["student_hashes"]
        .as_array()
        .map(|a| a.iter().filter_map(|h| h.as_str().map(str::to_string)).collect())
        .unwrap_or_default();
    state.encrypted_requests.lock().unwrap().push(requested.clone());
    if let Some(response) = state.canned_failure("/students/encrypted") {
        return response;
    }

    let encrypted = state.encrypted.lock().unwrap();
    let items: Vec<Value> = requested
        .iter()
        .filter_map(|hash| {
            encrypted.get(hash).map(|payload| {
                json!({ "student_hash": hash, "encrypted_payload": payload })
            })
        })
        .collect();
    Json(json!({ "count": items.len(), "items": items })).into_response()
}

/// A `/students` entry with one grade row.
pub fn student(hash: &str, generation: u32) -> Value {
    json!({
        "student_hash": hash,
        "generation": generation,
        "datasets": [
            { "dataset": "grade", "rows": [{ "term": "1-1", "avg": 90.5 }] }
        ]
    })
}

#[cfg(feature = "reveal")]
pub mod keys {
    use base64::Engine;
    use rsa::pkcs1::EncodeRsaPrivateKey;
    use rsa::pkcs8::{EncodePrivateKey, LineEnding};
    use rsa::rand_core::OsRng;
    use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
    use sha2::Sha256;
    use std::sync::LazyLock;

    static KEY: LazyLock<RsaPrivateKey> =
        LazyLock::new(|| RsaPrivateKey::new(&mut OsRng, 1024).unwrap());

    /// PKCS#8 PEM of the fixture key.
    pub fn pem() -> String {
        KEY.to_pkcs8_pem(LineEnding::LF).unwrap().to_string()
    }

    /// The same key as a PKCS#1 `RSA PRIVATE KEY` document.
    pub fn pkcs1_pem() -> String {
        KEY.to_pkcs1_pem(LineEnding::LF).unwrap().to_string()
    }

    /// Base64 OAEP(SHA-256) ciphertext of `plaintext` under the fixture key.
    pub fn encrypt(plaintext: &str) -> String {
        let public = RsaPublicKey::from(&*KEY);
        let ciphertext = public
            .encrypt(&mut OsRng, Oaep::new::<Sha256>(), plaintext.as_bytes())
            .unwrap();
        base64::engine::general_purpose::STANDARD.encode(ciphertext)
    }

    /// Payload the service would produce for a student.
    pub fn student_payload(name: &str) -> String {
        encrypt(&serde_json::json!({ "name": name, "birth": "2008-03-02" }).to_string())
    }
}
