use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Identifies one independently editable region of the résumé.
///
/// Serialized as `{"section": "work", "index": 2}` / `{"section": "summary"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "section", content = "index", rename_all = "snake_case")]
pub enum SectionKey {
    Contact,
    Summary,
    Skills,
    Work(usize),
    Project(usize),
    Education,
    Certifications,
}

/// A pending bullet edit is addressed by work item and bullet position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BulletKey {
    pub item: usize,
    pub bullet: usize,
}

/// Shifts an index-addressed key after element `removed` left its list.
fn shift_after_removal(index: usize, removed: usize) -> Option<usize> {
    match index.cmp(&removed) {
        std::cmp::Ordering::Less => Some(index),
        std::cmp::Ordering::Equal => None,
        std::cmp::Ordering::Greater => Some(index - 1),
    }
}

impl BulletKey {
    pub fn new(item: usize, bullet: usize) -> Self {
        Self { item, bullet }
    }

    /// Where this key points after work item `removed` is deleted. `None` if it was
    /// one of that item's bullets.
    pub fn after_work_removed(self, removed: usize) -> Option<Self> {
        shift_after_removal(self.item, removed).map(|item| Self { item, ..self })
    }

    /// Where this key points after bullet `removed` of work item `item` is deleted.
    pub fn after_bullet_removed(self, item: usize, removed: usize) -> Option<Self> {
        if self.item != item {
            return Some(self);
        }
        shift_after_removal(self.bullet, removed).map(|bullet| Self { bullet, ..self })
    }
}

/// The set of sections currently shown with edit widgets. Toggling one key never
/// affects another.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EditModes {
    active: BTreeSet<SectionKey>,
}

impl EditModes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips `key` and returns whether it is now in edit mode.
    pub fn toggle(&mut self, key: SectionKey) -> bool {
        if self.active.remove(&key) {
            false
        } else {
            self.active.insert(key);
            true
        }
    }

    pub fn is_editing(&self, key: SectionKey) -> bool {
        self.active.contains(&key)
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }

    pub fn work_removed(&mut self, removed: usize) {
        self.remap(|key| match key {
            SectionKey::Work(i) => shift_after_removal(i, removed).map(SectionKey::Work),
            other => Some(other),
        });
    }

    pub fn project_removed(&mut self, removed: usize) {
        self.remap(|key| match key {
            SectionKey::Project(i) => shift_after_removal(i, removed).map(SectionKey::Project),
            other => Some(other),
        });
    }

    /// Drops item-level keys that no longer point into the document.
    pub fn retain_within(&mut self, work_len: usize, project_len: usize) {
        self.active.retain(|key| match *key {
            SectionKey::Work(i) => i < work_len,
            SectionKey::Project(i) => i < project_len,
            _ => true,
        });
    }

    fn remap(&mut self, f: impl Fn(SectionKey) -> Option<SectionKey>) {
        self.active = std::mem::take(&mut self.active)
            .into_iter()
            .filter_map(f)
            .collect();
    }
}
