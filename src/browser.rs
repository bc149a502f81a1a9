//! Student dataset browser: the state behind the `/students` view.
//!
//! [`StudentBrowser`] owns everything the view shows (active generation tab,
//! loaded students, revealed names and display toggles) and is mutated only
//! through its methods. Revealed names never outlive the student list they
//! were produced for.

pub mod table;

pub use table::{DatasetEntry, DatasetSummary, flatten, format_cell_value, summarize};

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::catalog::GenerationTab;
use crate::client::{CleanerClient, EncryptedPayloadSource};
use crate::contract::StudentRecord;
use crate::error::{Error, Result};
use crate::reveal::{self, DecryptedNameMap, RevealCapability};

pub struct StudentBrowser {
    capability: RevealCapability,
    active_tab: GenerationTab,
    students: Vec<StudentRecord>,
    decrypted: DecryptedNameMap,
    private_key: SecretString,
    /// Show the revealed-name column (only effective once something was revealed).
    pub show_decrypted: bool,
    pub show_hash: bool,
    /// One summary line per dataset instead of full tables.
    pub condensed: bool,
}

impl Default for StudentBrowser {
    fn default() -> Self {
        Self::new()
    }
}

impl StudentBrowser {
    /// A browser using the decrypt backend compiled into this build.
    pub fn new() -> Self {
        Self::with_capability(reveal::capability())
    }

    pub fn with_capability(capability: RevealCapability) -> Self {
        Self {
            capability,
            active_tab: GenerationTab::All,
            students: Vec::new(),
            decrypted: DecryptedNameMap::new(),
            private_key: SecretString::from(String::new()),
            show_decrypted: true,
            show_hash: false,
            condensed: true,
        }
    }

    pub fn active_tab(&self) -> GenerationTab {
        self.active_tab
    }

    /// Switching tabs drops revealed names.
    pub fn set_active_tab(&mut self, tab: GenerationTab) {
        if tab != self.active_tab {
            self.active_tab = tab;
            self.decrypted.clear();
        }
    }

    pub fn students(&self) -> &[StudentRecord] {
        &self.students
    }

    /// Replaces the student list. Revealed names are dropped when the number of students changes.
    pub fn load_students(&mut self, students: Vec<StudentRecord>) {
        if students.len() != self.students.len() {
            self.decrypted.clear();
        }
        self.students = students;
    }

    /// Fetches students for the active tab and loads them.
    pub async fn refresh(&mut self, client: &CleanerClient) -> Result<usize> {
        let response = client.fetch_students(self.active_tab.filter()).await?;
        debug!(count = response.students.len(), tab = %self.active_tab.label(), "students loaded");
        self.load_students(response.students);
        Ok(self.students.len())
    }

    pub fn total_datasets(&self) -> usize {
        self.students.iter().map(|s| s.datasets.len()).sum()
    }

    /// Stores the PEM the user typed; it is only read when revealing.
    pub fn set_private_key(&mut self, pem: String) {
        self.private_key = SecretString::from(pem);
    }

    /// Whether the reveal action should be offered at all.
    pub fn can_reveal(&self) -> bool {
        self.capability.is_available()
    }

    /// Reveals names for every loaded student.
    ///
    /// On success the previous names are replaced and the name column is
    /// switched on. On any batch error the names are cleared.
    pub async fn reveal<S>(&mut self, source: &S) -> Result<&DecryptedNameMap>
    where
        S: EncryptedPayloadSource + ?Sized,
    {
        if !self.can_reveal() {
            return Err(Error::CryptoUnavailable);
        }

        let hashes: Vec<String> = self.students.iter().map(|s| s.student_hash.clone()).collect();
        let result = reveal::reveal_names(source, self.private_key.expose_secret(), &hashes).await;
        match result {
            Ok(names) => {
                self.decrypted = names;
                self.show_decrypted = true;
                Ok(&self.decrypted)
            }
            Err(e) => {
                self.decrypted.clear();
                Err(e)
            }
        }
    }

    pub fn decrypted(&self) -> &DecryptedNameMap {
        &self.decrypted
    }

    pub fn decrypted_column_visible(&self) -> bool {
        self.show_decrypted && !self.decrypted.is_empty()
    }

    /// Revealed name or failure sentinel for a student, if a batch covered it.
    pub fn display_name(&self, student_hash: &str) -> Option<String> {
        self.decrypted.get(student_hash).map(|n| n.to_string())
    }

    /// Table model for the loaded students.
    pub fn entries(&self) -> Vec<DatasetEntry<'_>> {
        flatten(&self.students)
    }
}
