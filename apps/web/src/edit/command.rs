//! The complete update surface of the edit model, as data.
//!
//! Commands arrive as JSON from the browser, e.g.
//! `{"op": "update_work", "index": 0, "update": {"set": "bullet", "value": {"bullet": 1, "text": "..."}}}`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::models::resume::{EduItem, Project, ResumeDocument, WorkItem};

/// Top-level scalar fields, including the contact header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentField {
    Summary,
    Name,
    Email,
    Phone,
    Location,
    Linkedin,
    Github,
    Website,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "set", content = "value", rename_all = "snake_case")]
pub enum WorkUpdate {
    Title(String),
    Company(String),
    Dates(String),
    Location(Option<String>),
    Bullets(Vec<String>),
    Bullet { bullet: usize, text: String },
    AddBullet(String),
    RemoveBullet(usize),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "set", content = "value", rename_all = "snake_case")]
pub enum ProjectUpdate {
    Title(String),
    Description(String),
    Technologies(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditCommand {
    SetField {
        field: DocumentField,
        value: Option<String>,
    },
    SetSkills {
        category: String,
        skills: Vec<String>,
    },
    RemoveSkillCategory {
        category: String,
    },
    ReplaceSkills {
        skills: IndexMap<String, Vec<String>>,
    },
    UpdateWork {
        index: usize,
        update: WorkUpdate,
    },
    ReplaceWork {
        items: Vec<WorkItem>,
    },
    AddWork {
        item: WorkItem,
    },
    RemoveWork {
        index: usize,
    },
    UpdateProject {
        index: usize,
        update: ProjectUpdate,
    },
    RemoveProject {
        index: usize,
    },
    ReplaceProjects {
        items: Vec<Project>,
    },
    ReplaceEducation {
        items: Vec<EduItem>,
    },
    ReplaceCertifications {
        items: Vec<String>,
    },
    Reset {
        #[serde(default)]
        document: Option<ResumeDocument>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_command_wire_format() {
        let cmd: EditCommand = serde_json::from_value(json!({
            "op": "update_work",
            "index": 2,
            "update": {"set": "bullet", "value": {"bullet": 1, "text": "Shipped"}}
        }))
        .unwrap();
        assert_eq!(
            cmd,
            EditCommand::UpdateWork {
                index: 2,
                update: WorkUpdate::Bullet {
                    bullet: 1,
                    text: "Shipped".into()
                }
            }
        );
    }

    #[test]
    fn test_set_field_and_reset_parse() {
        let cmd: EditCommand = serde_json::from_value(json!({
            "op": "set_field", "field": "summary", "value": "New summary"
        }))
        .unwrap();
        assert_eq!(
            cmd,
            EditCommand::SetField {
                field: DocumentField::Summary,
                value: Some("New summary".into())
            }
        );

        let reset: EditCommand = serde_json::from_value(json!({"op": "reset"})).unwrap();
        assert_eq!(reset, EditCommand::Reset { document: None });
    }

    #[test]
    fn test_unknown_op_is_rejected() {
        let parsed = serde_json::from_value::<EditCommand>(json!({"op": "set_title"}));
        assert!(parsed.is_err());
    }
}
