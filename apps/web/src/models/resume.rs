use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

/// Structured résumé as returned by the optimizer. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeDocument {
    #[serde(default)]
    pub summary: Option<String>,
    /// Skill category → ordered skills. Categories keep the order the backend sent them in.
    #[serde(default)]
    pub skills: Option<IndexMap<String, Vec<String>>>,
    #[serde(default)]
    pub work_experience: Option<Vec<WorkItem>>,
    #[serde(default)]
    pub education: Option<Vec<EduItem>>,
    #[serde(default)]
    pub certifications: Option<Vec<String>>,
    #[serde(default)]
    pub projects: Option<Vec<Project>>,
    #[serde(default)]
    pub contact_details: Option<ContactInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub dates: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EduItem {
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub school: String,
    #[serde(default)]
    pub dates: String,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Always a list once deserialized; see [`normalize_technologies`].
    #[serde(default, deserialize_with = "deserialize_technologies")]
    pub technologies: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub github: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

impl ContactInfo {
    /// Labelled, non-empty contact fields in header order (name excluded).
    pub fn labelled_fields(&self) -> Vec<(&'static str, &str)> {
        [
            ("Email", &self.email),
            ("Phone", &self.phone),
            ("Location", &self.location),
            ("LinkedIn", &self.linkedin),
            ("GitHub", &self.github),
            ("Website", &self.website),
        ]
        .into_iter()
        .filter_map(|(label, value)| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| (label, v))
        })
        .collect()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Technologies normalization
// ────────────────────────────────────────────────────────────────────────────

const TECH_DELIMITERS: [char; 3] = [',', ';', '|'];

/// Normalizes a raw `technologies` value into a list.
///
/// A list keeps its string entries, a string is split on `,`, `;` or `|`. Anything else is
/// treated as empty.
pub fn normalize_technologies(raw: &Value) -> Vec<String> {
    match raw {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Value::String(s) => s
            .split(TECH_DELIMITERS)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Value::Null => Vec::new(),
        other => {
            debug!("Ignoring malformed technologies value: {other}");
            Vec::new()
        }
    }
}

fn deserialize_technologies<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(normalize_technologies(&raw))
}
