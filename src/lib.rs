//! # sandeul-cleaner: client toolkit for the SANDEUL cleaner service
//!
//! `sandeul-cleaner` drives the school administration "cleaner" surface from
//! Rust: uploading raw attendance/grade/award sheets for cleaning, asking the
//! model for a student's prediction, browsing correlation results and cleaned
//! student datasets, and revealing student names from encrypted payloads with
//! a private key that never leaves the process.
//!
//! ## Core Concepts
//!
//! - **`CleanerClient`**: HTTP client for the cleaning/prediction service.
//! - **`UploadBuckets`**: files collected per generation and dataset field, submitted as one multipart request.
//! - **`StudentBrowser`**: state of the student dataset view, including the batch reveal.
//! - **`reveal_names`**: the batch reveal flow on its own (RSA-OAEP, SHA-256).
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sandeul_cleaner::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = CleanerClient::from_env()?;
//!
//!     let mut browser = StudentBrowser::new();
//!     browser.set_active_tab(GenerationTab::Generation(3));
//!     browser.refresh(&client).await?;
//!
//!     browser.set_private_key(std::fs::read_to_string("reveal-key.pem")?);
//!     browser.reveal(&client).await?;
//!     for student in browser.students() {
//!         println!("{} {:?}", student.student_hash, browser.display_name(&student.student_hash));
//!     }
//!     Ok(())
//! }
//! ```

pub mod browser;
pub mod catalog;
pub mod client;
pub mod config;
pub mod contract;
pub mod error;
pub mod insights;
pub mod reveal;
pub mod roster;
pub mod upload;

/// The version of the `sandeul-cleaner` crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// --- Prelude ---
// The types most callers need.
pub mod prelude {
    pub use crate::browser::StudentBrowser;
    pub use crate::catalog::{DatasetField, GenerationTab};
    pub use crate::client::{CleanerClient, EncryptedPayloadSource};
    pub use crate::config::ClientConfig;
    pub use crate::error::{Error, Result};
    pub use crate::reveal::{DecryptedNameMap, RevealCapability, RevealedName, reveal_names};
    pub use crate::upload::{UploadBuckets, UploadFile};
}
