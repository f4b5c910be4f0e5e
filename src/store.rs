//! In-memory patient store, loaded once at startup.
//!
//! The dataset is a JSON array of patient records; lookups are by
//! `patient_id`. Read-only for the lifetime of the process — no reload,
//! no invalidation, no write-back from the age-update side channel.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::models::PatientRecord;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to read patient dataset {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse patient dataset: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Static mapping from patient id to record.
#[derive(Debug)]
pub struct PatientStore {
    index: HashMap<String, PatientRecord>,
}

impl PatientStore {
    /// Load the dataset from a JSON array file.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let raw = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let records: Vec<PatientRecord> = serde_json::from_str(&raw)?;
        tracing::info!(count = records.len(), "Patient store loaded");
        Ok(Self::from_records(records))
    }

    /// Build a store directly from records (tests, embedded fixtures).
    pub fn from_records(records: Vec<PatientRecord>) -> Self {
        let index = records
            .into_iter()
            .map(|r| (r.patient_id.clone(), r))
            .collect();
        Self { index }
    }

    /// Look up a patient. `None` is a data outcome, not an error — the
    /// answering function turns it into a "no patient found" answer.
    pub fn lookup(&self, patient_id: &str) -> Option<&PatientRecord> {
        self.index.get(patient_id)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
