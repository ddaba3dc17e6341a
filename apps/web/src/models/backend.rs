//! Response envelopes of the external backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::resume::{ContactInfo, ResumeDocument};
use crate::models::score::ScoreResult;

#[derive(Debug, Clone, Deserialize)]
pub struct ScoreEnvelope {
    pub data: ScoreResult,
}

/// `POST /resume/optimize` answer. Contact details may arrive beside or inside `data`.
#[derive(Debug, Clone, Deserialize)]
pub struct OptimizeEnvelope {
    pub data: ResumeDocument,
    #[serde(default)]
    pub contact_details: Option<ContactInfo>,
}

impl OptimizeEnvelope {
    /// Folds top-level contact details into the document when it has none of its own.
    pub fn into_document(self) -> ResumeDocument {
        let mut doc = self.data;
        if doc.contact_details.is_none() {
            doc.contact_details = self.contact_details;
        }
        doc
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverLetter {
    pub cover_letter: String,
}

/// A résumé stored server-side for a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeSummary {
    pub id: String,
    #[serde(default, alias = "filename")]
    pub title: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResumeListEnvelope {
    #[serde(default)]
    pub data: Vec<ResumeSummary>,
}
