//! Upload batching for `POST /clean`.
//!
//! Files are collected per generation and per dataset field. Submitting sends
//! the non-empty fields of the active generation only.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::info;

use crate::catalog::{DEFAULT_GENERATION, DatasetField, GENERATIONS};
use crate::client::CleanerClient;
use crate::contract::CleanResponse;
use crate::error::{Error, Result};

/// One selected file, held in memory until submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type_for(&file_name).to_string();
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    /// Reads a file from disk; the content type is inferred from its extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| Error::InvalidInput(format!("not a file path: {}", path.display())))?;
        Ok(Self::new(file_name, bytes))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

fn content_type_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("csv") => "text/csv",
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        Some("xls") => "application/vnd.ms-excel",
        _ => "application/octet-stream",
    }
}

/// What gets sent for one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanRequest {
    pub generation: u32,
    /// Non-empty fields only, in catalog order.
    pub files: Vec<(DatasetField, Vec<UploadFile>)>,
}

impl CleanRequest {
    pub fn file_count(&self) -> usize {
        self.files.iter().map(|(_, files)| files.len()).sum()
    }
}

type FieldBuckets = BTreeMap<DatasetField, Vec<UploadFile>>;

/// Per-generation, per-field file buckets with one active generation.
#[derive(Debug, Clone)]
pub struct UploadBuckets {
    active: u32,
    buckets: BTreeMap<u32, FieldBuckets>,
}

impl Default for UploadBuckets {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadBuckets {
    /// Empty buckets for every catalog generation; the latest one is active.
    pub fn new() -> Self {
        let buckets = GENERATIONS
            .iter()
            .map(|g| (g.value, empty_fields()))
            .collect();
        Self {
            active: DEFAULT_GENERATION,
            buckets,
        }
    }

    pub fn active_generation(&self) -> u32 {
        self.active
    }

    pub fn set_active_generation(&mut self, generation: u32) {
        self.buckets.entry(generation).or_insert_with(empty_fields);
        self.active = generation;
    }

    /// Appends files to a field's bucket. Nothing happens for an empty list.
    pub fn add_files(&mut self, generation: u32, field: DatasetField, files: Vec<UploadFile>) {
        if files.is_empty() {
            return;
        }
        self.field_mut(generation, field).extend(files);
    }

    /// Removes the file at `index`; out-of-range indexes are ignored.
    pub fn remove_file(&mut self, generation: u32, field: DatasetField, index: usize) -> Option<UploadFile> {
        let bucket = self.field_mut(generation, field);
        (index < bucket.len()).then(|| bucket.remove(index))
    }

    pub fn clear_field(&mut self, generation: u32, field: DatasetField) {
        self.field_mut(generation, field).clear();
    }

    pub fn clear_generation(&mut self, generation: u32) {
        self.buckets.insert(generation, empty_fields());
    }

    /// Clears every field of the active generation.
    pub fn clear_active(&mut self) {
        self.clear_generation(self.active);
    }

    pub fn files(&self, generation: u32, field: DatasetField) -> &[UploadFile] {
        self.buckets
            .get(&generation)
            .and_then(|fields| fields.get(&field))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of files selected for the active generation.
    pub fn total_files(&self) -> usize {
        self.buckets
            .get(&self.active)
            .map(|fields| fields.values().map(Vec::len).sum())
            .unwrap_or(0)
    }

    /// Packages the active generation's non-empty fields.
    pub fn build_request(&self) -> Result<CleanRequest> {
        let files: Vec<_> = self
            .buckets
            .get(&self.active)
            .into_iter()
            .flat_map(|fields| fields.iter())
            .filter(|(_, files)| !files.is_empty())
            .map(|(field, files)| (*field, files.clone()))
            .collect();

        if files.is_empty() {
            return Err(Error::NoFilesSelected(self.active));
        }

        Ok(CleanRequest {
            generation: self.active,
            files,
        })
    }

    /// Sends the active generation and clears it once the service accepts the upload.
    /// On failure the buckets are kept so the user can retry.
    pub async fn submit(&mut self, client: &CleanerClient) -> Result<CleanResponse> {
        let request = self.build_request()?;
        let response = client.request_dataset_cleaning(&request).await?;
        info!(
            request_id = %response.request_id,
            generation = response.generation,
            files = request.file_count(),
            "cleaning request accepted"
        );
        self.clear_generation(request.generation);
        Ok(response)
    }

    fn field_mut(&mut self, generation: u32, field: DatasetField) -> &mut Vec<UploadFile> {
        self.buckets
            .entry(generation)
            .or_insert_with(empty_fields)
            .entry(field)
            .or_default()
    }
}

fn empty_fields() -> FieldBuckets {
    DatasetField::ALL.into_iter().map(|f| (f, Vec::new())).collect()
}
