//! Read/edit view models for every résumé section, derived from a document snapshot.
//!
//! Deriving views never fails: any missing or empty collection becomes a placeholder.

use serde::Serialize;

use crate::bindings::state::{EditModes, SectionKey};
use crate::models::resume::{EduItem, Project, ResumeDocument, WorkItem};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionView {
    pub title: &'static str,
    #[serde(flatten)]
    pub body: SectionBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SectionBody {
    Placeholder {
        key: SectionKey,
        editing: bool,
        message: &'static str,
    },
    Blocks {
        blocks: Vec<BlockView>,
    },
}

/// One editable unit inside a section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockView {
    pub key: SectionKey,
    pub editing: bool,
    pub content: BlockContent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockContent {
    Contact {
        name: Option<String>,
        fields: Vec<LabelledValue>,
    },
    Paragraph {
        text: String,
    },
    Skills {
        categories: Vec<SkillCategoryView>,
    },
    Work {
        title: String,
        company: String,
        dates: String,
        location: Option<String>,
        bullets: Vec<String>,
    },
    Project {
        title: String,
        description: String,
        technologies: Vec<String>,
    },
    Education {
        items: Vec<EduItem>,
    },
    Certifications {
        items: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelledValue {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillCategoryView {
    pub category: String,
    pub skills: Vec<String>,
}

/// Builds the ordered section views for `doc`.
pub fn render_views(doc: &ResumeDocument, modes: &EditModes) -> Vec<SectionView> {
    vec![
        contact_view(doc, modes),
        summary_view(doc, modes),
        skills_view(doc, modes),
        work_view(doc.work_experience.as_deref().unwrap_or_default(), modes),
        projects_view(doc.projects.as_deref().unwrap_or_default(), modes),
        education_view(doc.education.as_deref().unwrap_or_default(), modes),
        certifications_view(doc.certifications.as_deref().unwrap_or_default(), modes),
    ]
}

fn placeholder(title: &'static str, key: SectionKey, modes: &EditModes, message: &'static str) -> SectionView {
    SectionView {
        title,
        body: SectionBody::Placeholder {
            key,
            editing: modes.is_editing(key),
            message,
        },
    }
}

fn single_block(title: &'static str, key: SectionKey, modes: &EditModes, content: BlockContent) -> SectionView {
    SectionView {
        title,
        body: SectionBody::Blocks {
            blocks: vec![BlockView {
                key,
                editing: modes.is_editing(key),
                content,
            }],
        },
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn contact_view(doc: &ResumeDocument, modes: &EditModes) -> SectionView {
    let title = "Contact";
    let Some(contact) = doc.contact_details.as_ref() else {
        return placeholder(title, SectionKey::Contact, modes, "No contact details provided");
    };
    let name = non_blank(contact.name.as_deref());
    let fields: Vec<LabelledValue> = contact
        .labelled_fields()
        .into_iter()
        .map(|(label, value)| LabelledValue {
            label,
            value: value.trim().to_string(),
        })
        .collect();
    if name.is_none() && fields.is_empty() {
        return placeholder(title, SectionKey::Contact, modes, "No contact details provided");
    }
    single_block(title, SectionKey::Contact, modes, BlockContent::Contact { name, fields })
}

fn summary_view(doc: &ResumeDocument, modes: &EditModes) -> SectionView {
    let title = "Summary";
    match non_blank(doc.summary.as_deref()) {
        Some(text) => single_block(title, SectionKey::Summary, modes, BlockContent::Paragraph { text }),
        None => placeholder(title, SectionKey::Summary, modes, "No summary provided"),
    }
}

fn skills_view(doc: &ResumeDocument, modes: &EditModes) -> SectionView {
    let title = "Skills";
    let categories: Vec<SkillCategoryView> = doc
        .skills
        .iter()
        .flatten()
        .filter(|(_, skills)| !skills.is_empty())
        .map(|(category, skills)| SkillCategoryView {
            category: category.clone(),
            skills: skills.clone(),
        })
        .collect();
    if categories.is_empty() {
        return placeholder(title, SectionKey::Skills, modes, "No skills listed");
    }
    single_block(title, SectionKey::Skills, modes, BlockContent::Skills { categories })
}

fn work_view(items: &[WorkItem], modes: &EditModes) -> SectionView {
    let title = "Work Experience";
    if items.is_empty() {
        // Editing an empty list happens on the first item slot.
        return placeholder(title, SectionKey::Work(0), modes, "No work experience listed");
    }
    let blocks = items
        .iter()
        .enumerate()
        .map(|(i, item)| BlockView {
            key: SectionKey::Work(i),
            editing: modes.is_editing(SectionKey::Work(i)),
            content: BlockContent::Work {
                title: item.title.clone(),
                company: item.company.clone(),
                dates: item.dates.clone(),
                location: non_blank(item.location.as_deref()),
                bullets: item.bullets.clone(),
            },
        })
        .collect();
    SectionView {
        title,
        body: SectionBody::Blocks { blocks },
    }
}

fn projects_view(projects: &[Project], modes: &EditModes) -> SectionView {
    let title = "Projects";
    if projects.is_empty() {
        return placeholder(title, SectionKey::Project(0), modes, "No projects listed");
    }
    let blocks = projects
        .iter()
        .enumerate()
        .map(|(i, project)| BlockView {
            key: SectionKey::Project(i),
            editing: modes.is_editing(SectionKey::Project(i)),
            content: BlockContent::Project {
                title: project.title.clone(),
                description: project.description.clone(),
                technologies: project.technologies.clone(),
            },
        })
        .collect();
    SectionView {
        title,
        body: SectionBody::Blocks { blocks },
    }
}

fn education_view(items: &[EduItem], modes: &EditModes) -> SectionView {
    let title = "Education";
    if items.is_empty() {
        return placeholder(title, SectionKey::Education, modes, "No education listed");
    }
    single_block(
        title,
        SectionKey::Education,
        modes,
        BlockContent::Education {
            items: items.to_vec(),
        },
    )
}

fn certifications_view(items: &[String], modes: &EditModes) -> SectionView {
    let title = "Certifications";
    let items: Vec<String> = items
        .iter()
        .filter(|c| !c.trim().is_empty())
        .cloned()
        .collect();
    if items.is_empty() {
        return placeholder(title, SectionKey::Certifications, modes, "No certifications listed");
    }
    single_block(title, SectionKey::Certifications, modes, BlockContent::Certifications { items })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::ContactInfo;
    use pretty_assertions::assert_eq;

    fn titles(views: &[SectionView]) -> Vec<&'static str> {
        views.iter().map(|v| v.title).collect()
    }

    #[test]
    fn test_empty_document_is_all_placeholders() {
        let views = render_views(&ResumeDocument::default(), &EditModes::new());
        assert_eq!(
            titles(&views),
            vec![
                "Contact",
                "Summary",
                "Skills",
                "Work Experience",
                "Projects",
                "Education",
                "Certifications"
            ]
        );
        assert!(views
            .iter()
            .all(|v| matches!(v.body, SectionBody::Placeholder { .. })));
    }

    #[test]
    fn test_blank_summary_is_placeholder() {
        let doc = ResumeDocument {
            summary: Some("   ".into()),
            ..Default::default()
        };
        let views = render_views(&doc, &EditModes::new());
        assert!(matches!(
            views[1].body,
            SectionBody::Placeholder {
                message: "No summary provided",
                ..
            }
        ));
    }

    #[test]
    fn test_work_items_carry_their_own_edit_flag() {
        let doc = ResumeDocument {
            work_experience: Some(vec![
                WorkItem {
                    title: "A".into(),
                    ..Default::default()
                },
                WorkItem {
                    title: "B".into(),
                    location: Some(" ".into()),
                    ..Default::default()
                },
            ]),
            ..Default::default()
        };
        let mut modes = EditModes::new();
        modes.toggle(SectionKey::Work(1));
        let views = render_views(&doc, &modes);
        let SectionBody::Blocks { blocks } = &views[3].body else {
            panic!("work section should have blocks");
        };
        assert_eq!(blocks.len(), 2);
        assert!(!blocks[0].editing);
        assert!(blocks[1].editing);
        assert!(matches!(
            &blocks[1].content,
            BlockContent::Work { location: None, .. }
        ));
    }

    #[test]
    fn test_contact_view_lists_labelled_fields() {
        let doc = ResumeDocument {
            contact_details: Some(ContactInfo {
                name: Some("Ada".into()),
                email: Some("ada@example.com".into()),
                github: Some("ada".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let views = render_views(&doc, &EditModes::new());
        let SectionBody::Blocks { blocks } = &views[0].body else {
            panic!("contact should have blocks");
        };
        assert_eq!(
            blocks[0].content,
            BlockContent::Contact {
                name: Some("Ada".into()),
                fields: vec![
                    LabelledValue {
                        label: "Email",
                        value: "ada@example.com".into()
                    },
                    LabelledValue {
                        label: "GitHub",
                        value: "ada".into()
                    },
                ],
            }
        );
    }

    #[test]
    fn test_placeholder_section_can_be_in_edit_mode() {
        let mut modes = EditModes::new();
        modes.toggle(SectionKey::Skills);
        let views = render_views(&ResumeDocument::default(), &modes);
        assert!(matches!(
            views[2].body,
            SectionBody::Placeholder { editing: true, .. }
        ));
    }

    #[test]
    fn test_view_json_shape() {
        let doc = ResumeDocument {
            summary: Some("Hello".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&render_views(&doc, &EditModes::new())[1]).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "title": "Summary",
                "kind": "blocks",
                "blocks": [{
                    "key": {"section": "summary"},
                    "editing": false,
                    "content": {"type": "paragraph", "text": "Hello"}
                }]
            })
        );
    }
}
