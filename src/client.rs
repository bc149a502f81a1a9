//! HTTP client for the cleaning/prediction service.
//!
//! Every call goes through [`CleanerClient`]. Non-2xx responses are turned into
//! [`Error::Api`] carrying the most readable message the service gave us, see
//! [`extract_error_message`].

pub mod provider;
mod response;

pub use provider::EncryptedPayloadSource;
pub use response::{ResponseFormat, extract_error_message};

use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ClientConfig;
use crate::contract::{
    CleanResponse, CorrelationResponse, EncryptedStudentsRequest, PredictionRequest,
    PredictionResponse, StudentsEncryptedResponse, StudentsResponse,
};
use crate::error::{Error, Result};
use crate::upload::CleanRequest;

/// Client for the cleaning/prediction service.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone, Debug)]
pub struct CleanerClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl CleanerClient {
    /// Creates a client for the service described by `config`.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { http, config })
    }

    /// Creates a client configured from `CLEANER_API_BASE` / `CLEANER_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// `POST /clean` with the active generation's files as multipart form data.
    pub async fn request_dataset_cleaning(&self, request: &CleanRequest) -> Result<CleanResponse> {
        let mut form = Form::new().text("generation", request.generation.to_string());
        for (field, files) in &request.files {
            for file in files {
                let part = Part::bytes(file.bytes.clone())
                    .file_name(file.file_name.clone())
                    .mime_str(&file.content_type)?;
                form = form.part(field.form_name(), part);
            }
        }

        let builder = self.http.post(self.config.url("/clean")).multipart(form);
        self.json("POST", "/clean", builder).await
    }

    /// `POST /predict` for a single student.
    pub async fn request_student_prediction(&self, student_hash: &str) -> Result<PredictionResponse> {
        let student_hash = student_hash.trim();
        if student_hash.is_empty() {
            return Err(Error::InvalidInput("student hash is required".to_string()));
        }
        let builder = self
            .http
            .post(self.config.url("/predict"))
            .json(&PredictionRequest { student_hash });
        self.json("POST", "/predict", builder).await
    }

    /// `GET /analytics/correlation`, optionally restricted to one generation.
    pub async fn fetch_correlations(&self, generation: Option<u32>) -> Result<CorrelationResponse> {
        let path = with_generation("/analytics/correlation", generation);
        let builder = self.http.get(self.config.url(&path));
        self.json("GET", &path, builder).await
    }

    /// `GET /students`, optionally restricted to one generation.
    pub async fn fetch_students(&self, generation: Option<u32>) -> Result<StudentsResponse> {
        let path = with_generation("/students", generation);
        let builder = self.http.get(self.config.url(&path));
        self.json("GET", &path, builder).await
    }

    /// `POST /students/encrypted` for exactly the given hashes.
    pub async fn fetch_encrypted_students(
        &self,
        student_hashes: &[String],
    ) -> Result<StudentsEncryptedResponse> {
        let builder = self
            .http
            .post(self.config.url("/students/encrypted"))
            .json(&EncryptedStudentsRequest { student_hashes });
        self.json("POST", "/students/encrypted", builder).await
    }

    /// `GET` returning the raw response body.
    pub async fn get_text(&self, path: &str) -> Result<String> {
        let builder = self.http.get(self.config.url(path));
        let body = self.execute("GET", path, builder, ResponseFormat::Text).await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    async fn json<T: DeserializeOwned>(
        &self,
        method: &str,
        path: &str,
        builder: reqwest::RequestBuilder,
    ) -> Result<T> {
        let body = self.execute(method, path, builder, ResponseFormat::Json).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn execute(
        &self,
        method: &str,
        path: &str,
        builder: reqwest::RequestBuilder,
        format: ResponseFormat,
    ) -> Result<Vec<u8>> {
        debug!(method, path, ?format, "sending request to cleaner service");
        let response = builder.send().await?;
        response::read_body(method, path, response).await
    }
}

fn with_generation(path: &str, generation: Option<u32>) -> String {
    match generation {
        Some(value) if value > 0 => format!("{}?generation={}", path, value),
        _ => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_query_only_for_positive_values() {
        assert_eq!(with_generation("/students", None), "/students");
        assert_eq!(with_generation("/students", Some(0)), "/students");
        assert_eq!(
            with_generation("/analytics/correlation", Some(3)),
            "/analytics/correlation?generation=3"
        );
    }

    #[tokio::test]
    async fn blank_prediction_hash_is_rejected_before_sending() {
        // Nothing listens on this port; the request must never be attempted.
        let client = CleanerClient::new(ClientConfig::with_base_url("http://127.0.0.1:9")).unwrap();
        let err = client.request_student_prediction("   ").await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
