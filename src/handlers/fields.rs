use std::collections::HashMap;

use csv::StringRecord;
use email_address::EmailAddress;
use serde::Deserialize;

use crate::domain::errors::{WorkerError, WorkerResult};

/// Per-import configuration carried in the job payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportConfig {
    /// CSV header name → target field name.
    pub column_mapping: HashMap<String, String>,
    #[serde(default)]
    pub duplicate_handling: DuplicateHandling,
}

impl ImportConfig {
    /// A missing or malformed payload is a configuration error that aborts
    /// the whole job before any row is touched.
    pub fn from_payload(payload: &serde_json::Value) -> WorkerResult<Self> {
        if payload.is_null() {
            return Err(WorkerError::Config("missing job payload".to_string()));
        }
        let config: ImportConfig = serde_json::from_value(payload.clone())
            .map_err(|e| WorkerError::Config(format!("invalid import payload: {}", e)))?;
        if config.column_mapping.is_empty() {
            return Err(WorkerError::Config("missing column mapping".to_string()));
        }
        Ok(config)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateHandling {
    #[default]
    Skip,
    Update,
}

/// One CSV row projected through the column mapping: target field name →
/// trimmed, non-empty cell value. Cells that are empty after trimming are
/// simply absent, which is what lets merge-updates leave stored values alone.
#[derive(Debug, Clone, Default)]
pub struct MappedRow {
    values: HashMap<String, String>,
}

impl MappedRow {
    pub fn from_record(
        headers: &StringRecord,
        record: &StringRecord,
        mapping: &HashMap<String, String>,
    ) -> Self {
        let mut values = HashMap::new();
        for (index, header) in headers.iter().enumerate() {
            if let Some(field) = mapping.get(header.trim()) {
                if let Some(cell) = record.get(index) {
                    let trimmed = cell.trim();
                    if !trimmed.is_empty() {
                        values.insert(field.clone(), trimmed.to_string());
                    }
                }
            }
        }
        Self { values }
    }

    /// True when every mapped cell was blank.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    pub fn get_owned(&self, field: &str) -> Option<String> {
        self.values.get(field).cloned()
    }

    pub fn require(&self, field: &str) -> WorkerResult<String> {
        self.get_owned(field)
            .ok_or_else(|| WorkerError::Validation(format!("Missing required field '{}'", field)))
    }

    /// Integer parse with comma stripping, for follower counts like "12,345".
    pub fn get_count(&self, field: &str) -> WorkerResult<Option<i64>> {
        match self.get(field) {
            None => Ok(None),
            Some(raw) => raw
                .replace(',', "")
                .parse::<i64>()
                .map(Some)
                .map_err(|_| {
                    WorkerError::Validation(format!("Invalid number for '{}': {}", field, raw))
                }),
        }
    }

    pub fn get_bool(&self, field: &str) -> WorkerResult<Option<bool>> {
        match self.get(field) {
            None => Ok(None),
            Some(raw) => match raw.to_ascii_lowercase().as_str() {
                "true" | "yes" | "y" | "1" => Ok(Some(true)),
                "false" | "no" | "n" | "0" => Ok(Some(false)),
                _ => Err(WorkerError::Validation(format!(
                    "Invalid boolean for '{}': {}",
                    field, raw
                ))),
            },
        }
    }

    /// Syntax-checked email, rejected with the operator-facing message the
    /// job logs surface verbatim.
    pub fn get_email(&self, field: &str) -> WorkerResult<Option<String>> {
        match self.get(field) {
            None => Ok(None),
            Some(raw) => {
                if EmailAddress::is_valid(raw) {
                    Ok(Some(raw.to_string()))
                } else {
                    Err(WorkerError::Validation(format!(
                        "Invalid email format: {}",
                        raw
                    )))
                }
            }
        }
    }
}
