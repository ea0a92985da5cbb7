//! Health records: visits, lab work and other medical documents

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::{Validate, require_text};

/// Collection holding health record documents
pub const HEALTH_RECORDS: &str = "health_records";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HealthRecordType {
    Checkup,
    LabWork,
    Specialist,
    Immunization,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Completed,
    Scheduled,
    Cancelled,
}

/// Medical visit or document, owned by one user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HealthRecord {
    pub id: String,
    pub user_id: String,
    pub title: String,
    #[serde(with = "docstore::timestamp")]
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub doctor: String,
    #[serde(rename = "type")]
    pub kind: HealthRecordType,
    pub status: RecordStatus,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(with = "docstore::timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Request body for creating a health record
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHealthRecord {
    pub title: String,
    #[serde(with = "docstore::timestamp")]
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub doctor: String,
    #[serde(rename = "type")]
    pub kind: HealthRecordType,
    pub status: RecordStatus,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub file_url: Option<String>,
}

impl Validate for NewHealthRecord {
    fn validate(&self) -> Result<(), String> {
        require_text("Title", &self.title)
    }
}

impl NewHealthRecord {
    pub fn into_record(self, user_id: &str) -> HealthRecord {
        HealthRecord {
            id: super::new_id(),
            user_id: user_id.to_string(),
            title: self.title,
            date: self.date,
            doctor: self.doctor,
            kind: self.kind,
            status: self.status,
            description: self.description,
            file_url: self.file_url.filter(|url| !url.is_empty()),
            created_at: docstore::timestamp::now(),
        }
    }
}
