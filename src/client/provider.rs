//! Source of encrypted student payloads for the batch reveal flow.

use async_trait::async_trait;

use super::CleanerClient;
use crate::contract::EncryptedStudentPayload;
use crate::error::Result;

/// Anything that can fetch ciphertexts for a set of student hashes in one round trip.
///
/// [`CleanerClient`] is the production implementation; the reveal flow only
/// depends on this trait so it can be driven without a network.
#[async_trait]
pub trait EncryptedPayloadSource: Send + Sync {
    /// Fetches payloads for exactly `student_hashes`. Called at most once per batch.
    async fn fetch_encrypted(
        &self,
        student_hashes: &[String],
    ) -> Result<Vec<EncryptedStudentPayload>>;
}

#[async_trait]
impl EncryptedPayloadSource for CleanerClient {
    async fn fetch_encrypted(
        &self,
        student_hashes: &[String],
    ) -> Result<Vec<EncryptedStudentPayload>> {
        let response = self.fetch_encrypted_students(student_hashes).await?;
        Ok(response.items)
    }
}

#[async_trait]
impl<T: EncryptedPayloadSource + ?Sized> EncryptedPayloadSource for std::sync::Arc<T> {
    async fn fetch_encrypted(
        &self,
        student_hashes: &[String],
    ) -> Result<Vec<EncryptedStudentPayload>> {
        (**self).fetch_encrypted(student_hashes).await
    }
}
