//! In-memory working copy of a résumé for one editing session.
//!
//! Every update clones the current snapshot, changes the clone and swaps it in, so a
//! snapshot handed out earlier never changes underneath its holder. Updates that leave the
//! document unchanged keep the existing `Arc` and revision; callers may detect changes
//! with `Arc::ptr_eq` or by comparing revisions.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::edit::command::{DocumentField, EditCommand, ProjectUpdate, WorkUpdate};
use crate::models::resume::{ContactInfo, EduItem, Project, ResumeDocument, WorkItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListSection {
    WorkExperience,
    Bullets,
    Projects,
}

impl std::fmt::Display for ListSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ListSection::WorkExperience => "work_experience",
            ListSection::Bullets => "bullets",
            ListSection::Projects => "projects",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("{section} index {index} is out of bounds (length {len})")]
    IndexOutOfBounds {
        section: ListSection,
        index: usize,
        len: usize,
    },
}

pub struct EditModel {
    original: Arc<ResumeDocument>,
    current: Arc<ResumeDocument>,
    revision: u64,
}

impl EditModel {
    pub fn new(document: ResumeDocument) -> Self {
        let original = Arc::new(document);
        Self {
            current: Arc::clone(&original),
            original,
            revision: 0,
        }
    }

    pub fn current(&self) -> Arc<ResumeDocument> {
        Arc::clone(&self.current)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_dirty(&self) -> bool {
        *self.current != *self.original
    }

    /// Applies a single command. Only indexed updates can fail.
    pub fn apply(&mut self, command: EditCommand) -> Result<(), EditError> {
        match command {
            EditCommand::SetField { field, value } => self.update_field(field, value),
            EditCommand::SetSkills { category, skills } => self.update_skills(&category, skills),
            EditCommand::RemoveSkillCategory { category } => self.remove_skill_category(&category),
            EditCommand::ReplaceSkills { skills } => self.commit(|doc| doc.skills = Some(skills)),
            EditCommand::UpdateWork { index, update } => {
                return self.update_work_experience(index, update)
            }
            EditCommand::ReplaceWork { items } => self.replace_work_experience(items),
            EditCommand::AddWork { item } => self.add_work_item(item),
            EditCommand::RemoveWork { index } => return self.remove_work_item(index),
            EditCommand::UpdateProject { index, update } => {
                return self.update_project(index, update)
            }
            EditCommand::RemoveProject { index } => return self.remove_project(index),
            EditCommand::ReplaceProjects { items } => self.update_projects(items),
            EditCommand::ReplaceEducation { items } => self.replace_education(items),
            EditCommand::ReplaceCertifications { items } => self.replace_certifications(items),
            EditCommand::Reset { document } => self.reset_to_original(document),
        }
        Ok(())
    }

    pub fn update_field(&mut self, field: DocumentField, value: Option<String>) {
        self.commit(|doc| {
            let slot = match field {
                DocumentField::Summary => &mut doc.summary,
                DocumentField::Name => &mut contact_mut(doc).name,
                DocumentField::Email => &mut contact_mut(doc).email,
                DocumentField::Phone => &mut contact_mut(doc).phone,
                DocumentField::Location => &mut contact_mut(doc).location,
                DocumentField::Linkedin => &mut contact_mut(doc).linkedin,
                DocumentField::Github => &mut contact_mut(doc).github,
                DocumentField::Website => &mut contact_mut(doc).website,
            };
            *slot = value;
        });
    }

    /// Replaces one category's skills, creating the category at the end if absent.
    pub fn update_skills(&mut self, category: &str, skills: Vec<String>) {
        self.commit(|doc| {
            doc.skills
                .get_or_insert_with(Default::default)
                .insert(category.to_string(), skills);
        });
    }

    pub fn remove_skill_category(&mut self, category: &str) {
        self.commit(|doc| {
            if let Some(skills) = doc.skills.as_mut() {
                skills.shift_remove(category);
            }
        });
    }

    pub fn update_work_experience(
        &mut self,
        index: usize,
        update: WorkUpdate,
    ) -> Result<(), EditError> {
        let len = self.current.work_experience.as_ref().map_or(0, Vec::len);
        if index >= len {
            return Err(EditError::IndexOutOfBounds {
                section: ListSection::WorkExperience,
                index,
                len,
            });
        }
        let bullet_len = self
            .current
            .work_experience
            .as_ref()
            .and_then(|w| w.get(index))
            .map_or(0, |item| item.bullets.len());
        match &update {
            WorkUpdate::Bullet { bullet, .. } | WorkUpdate::RemoveBullet(bullet)
                if *bullet >= bullet_len =>
            {
                return Err(EditError::IndexOutOfBounds {
                    section: ListSection::Bullets,
                    index: *bullet,
                    len: bullet_len,
                });
            }
            _ => {}
        }

        self.commit(|doc| {
            let Some(item) = doc.work_experience.as_mut().and_then(|w| w.get_mut(index)) else {
                return;
            };
            match update {
                WorkUpdate::Title(v) => item.title = v,
                WorkUpdate::Company(v) => item.company = v,
                WorkUpdate::Dates(v) => item.dates = v,
                WorkUpdate::Location(v) => item.location = v,
                WorkUpdate::Bullets(v) => item.bullets = v,
                // An empty bullet stays in the list until it is removed explicitly.
                WorkUpdate::Bullet { bullet, text } => item.bullets[bullet] = text,
                WorkUpdate::AddBullet(text) => item.bullets.push(text),
                WorkUpdate::RemoveBullet(bullet) => {
                    item.bullets.remove(bullet);
                }
            }
        });
        Ok(())
    }

    pub fn replace_work_experience(&mut self, items: Vec<WorkItem>) {
        self.commit(|doc| doc.work_experience = Some(items));
    }

    pub fn add_work_item(&mut self, item: WorkItem) {
        self.commit(|doc| {
            doc.work_experience
                .get_or_insert_with(Default::default)
                .push(item)
        });
    }

    pub fn remove_work_item(&mut self, index: usize) -> Result<(), EditError> {
        let len = self.current.work_experience.as_ref().map_or(0, Vec::len);
        if index >= len {
            return Err(EditError::IndexOutOfBounds {
                section: ListSection::WorkExperience,
                index,
                len,
            });
        }
        self.commit(|doc| {
            if let Some(items) = doc.work_experience.as_mut() {
                items.remove(index);
            }
        });
        Ok(())
    }

    pub fn update_projects(&mut self, items: Vec<Project>) {
        self.commit(|doc| doc.projects = Some(items));
    }

    pub fn update_project(&mut self, index: usize, update: ProjectUpdate) -> Result<(), EditError> {
        let len = self.current.projects.as_ref().map_or(0, Vec::len);
        if index >= len {
            return Err(EditError::IndexOutOfBounds {
                section: ListSection::Projects,
                index,
                len,
            });
        }
        self.commit(|doc| {
            let Some(project) = doc.projects.as_mut().and_then(|p| p.get_mut(index)) else {
                return;
            };
            match update {
                ProjectUpdate::Title(v) => project.title = v,
                ProjectUpdate::Description(v) => project.description = v,
                ProjectUpdate::Technologies(v) => project.technologies = v,
            }
        });
        Ok(())
    }

    pub fn remove_project(&mut self, index: usize) -> Result<(), EditError> {
        let len = self.current.projects.as_ref().map_or(0, Vec::len);
        if index >= len {
            return Err(EditError::IndexOutOfBounds {
                section: ListSection::Projects,
                index,
                len,
            });
        }
        self.commit(|doc| {
            if let Some(projects) = doc.projects.as_mut() {
                projects.remove(index);
            }
        });
        Ok(())
    }

    pub fn replace_education(&mut self, items: Vec<EduItem>) {
        self.commit(|doc| doc.education = Some(items));
    }

    pub fn replace_certifications(&mut self, items: Vec<String>) {
        self.commit(|doc| doc.certifications = Some(items));
    }

    /// Replaces the working copy wholesale. `None` restores the session's original.
    pub fn reset_to_original(&mut self, document: Option<ResumeDocument>) {
        let next = match document {
            Some(doc) => Arc::new(doc),
            None => Arc::clone(&self.original),
        };
        if *next != *self.current {
            self.current = next;
            self.revision += 1;
        }
    }

    fn commit<F>(&mut self, mutate: F)
    where
        F: FnOnce(&mut ResumeDocument),
    {
        let mut next = ResumeDocument::clone(&self.current);
        mutate(&mut next);
        if next != *self.current {
            self.current = Arc::new(next);
            self.revision += 1;
        }
    }
}

fn contact_mut(doc: &mut ResumeDocument) -> &mut ContactInfo {
    doc.contact_details.get_or_insert_with(Default::default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn work(title: &str, bullets: &[&str]) -> WorkItem {
        WorkItem {
            title: title.into(),
            company: "Acme".into(),
            dates: "2020 - 2023".into(),
            location: None,
            bullets: bullets.iter().map(|b| b.to_string()).collect(),
        }
    }

    fn model() -> EditModel {
        EditModel::new(ResumeDocument {
            summary: Some("Backend engineer".into()),
            work_experience: Some(vec![work("A", &["a1", "a2"]), work("B", &["b1"])]),
            projects: Some(vec![Project {
                title: "P".into(),
                description: "desc".into(),
                technologies: vec!["Rust".into()],
            }]),
            ..Default::default()
        })
    }

    #[test]
    fn test_update_field_replaces_snapshot() {
        let mut m = model();
        let before = m.current();
        m.update_field(DocumentField::Summary, Some("Staff engineer".into()));
        let after = m.current();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(before.summary.as_deref(), Some("Backend engineer"));
        assert_eq!(after.summary.as_deref(), Some("Staff engineer"));
        assert_eq!(m.revision(), 1);
        assert!(m.is_dirty());
    }

    #[test]
    fn test_contact_field_creates_contact_details() {
        let mut m = model();
        m.update_field(DocumentField::Email, Some("a@b.c".into()));
        let contact = m.current().contact_details.clone().unwrap();
        assert_eq!(contact.email.as_deref(), Some("a@b.c"));
        assert!(contact.name.is_none());
    }

    #[test]
    fn test_update_skills_is_idempotent() {
        let mut m = model();
        m.update_skills("Languages", vec!["Rust".into(), "Go".into()]);
        let first = m.current();
        let rev = m.revision();
        m.update_skills("Languages", vec!["Rust".into(), "Go".into()]);
        assert_eq!(*first, *m.current());
        assert!(Arc::ptr_eq(&first, &m.current()));
        assert_eq!(m.revision(), rev);
    }

    #[test]
    fn test_update_skills_creates_category_in_order() {
        let mut m = model();
        m.update_skills("Languages", vec!["Rust".into()]);
        m.update_skills("Cloud", vec!["AWS".into()]);
        m.update_skills("Languages", vec!["Go".into()]);
        let doc = m.current();
        let skills = doc.skills.as_ref().unwrap();
        let keys: Vec<_> = skills.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Languages", "Cloud"]);
        assert_eq!(skills["Languages"], vec!["Go"]);
    }

    #[test]
    fn test_work_update_does_not_mutate_old_bullets() {
        let mut m = model();
        let before = m.current();
        m.update_work_experience(
            0,
            WorkUpdate::Bullet {
                bullet: 1,
                text: "a2 edited".into(),
            },
        )
        .unwrap();
        assert_eq!(before.work_experience.as_ref().unwrap()[0].bullets[1], "a2");
        assert_eq!(
            m.current().work_experience.as_ref().unwrap()[0].bullets[1],
            "a2 edited"
        );
    }

    #[test]
    fn test_empty_bullet_is_kept() {
        let mut m = model();
        m.update_work_experience(
            0,
            WorkUpdate::Bullet {
                bullet: 0,
                text: String::new(),
            },
        )
        .unwrap();
        let doc = m.current();
        let bullets = &doc.work_experience.as_ref().unwrap()[0].bullets;
        assert_eq!(bullets, &vec![String::new(), "a2".to_string()]);
    }

    #[test]
    fn test_out_of_bounds_work_index_is_error() {
        let mut m = model();
        let err = m
            .update_work_experience(5, WorkUpdate::Title("x".into()))
            .unwrap_err();
        assert_eq!(
            err,
            EditError::IndexOutOfBounds {
                section: ListSection::WorkExperience,
                index: 5,
                len: 2
            }
        );
        assert_eq!(m.revision(), 0);
    }

    #[test]
    fn test_out_of_bounds_bullet_is_error() {
        let mut m = model();
        let err = m
            .update_work_experience(1, WorkUpdate::RemoveBullet(3))
            .unwrap_err();
        assert!(matches!(
            err,
            EditError::IndexOutOfBounds {
                section: ListSection::Bullets,
                index: 3,
                len: 1
            }
        ));
    }

    #[test]
    fn test_remove_work_item_and_stale_index() {
        let mut m = model();
        m.remove_work_item(0).unwrap();
        assert_eq!(m.current().work_experience.as_ref().unwrap()[0].title, "B");
        assert!(m.update_work_experience(1, WorkUpdate::Title("stale".into())).is_err());
    }

    #[test]
    fn test_update_project_and_out_of_bounds() {
        let mut m = model();
        m.update_project(0, ProjectUpdate::Technologies(vec!["Go".into()]))
            .unwrap();
        assert_eq!(m.current().projects.as_ref().unwrap()[0].technologies, vec!["Go"]);
        assert!(m.update_project(1, ProjectUpdate::Title("x".into())).is_err());
    }

    #[test]
    fn test_remove_project() {
        let mut m = model();
        assert!(m.remove_project(3).is_err());
        m.apply(EditCommand::RemoveProject { index: 0 }).unwrap();
        assert!(m.current().projects.as_ref().unwrap().is_empty());
    }

    #[test]
    fn test_reset_to_original() {
        let mut m = model();
        m.update_field(DocumentField::Summary, None);
        m.apply(EditCommand::Reset { document: None }).unwrap();
        assert!(!m.is_dirty());
        assert_eq!(m.current().summary.as_deref(), Some("Backend engineer"));

        let replacement = ResumeDocument {
            summary: Some("Replaced".into()),
            ..Default::default()
        };
        m.reset_to_original(Some(replacement.clone()));
        assert_eq!(*m.current(), replacement);
    }

    #[test]
    fn test_apply_add_work_to_empty_document() {
        let mut m = EditModel::new(ResumeDocument::default());
        m.apply(EditCommand::AddWork {
            item: work("New", &[]),
        })
        .unwrap();
        assert_eq!(m.current().work_experience.as_ref().unwrap().len(), 1);
    }
}
