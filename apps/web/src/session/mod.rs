//! In-memory edit sessions: one edit model, its edit modes and its pending bullet drafts
//! per browser editing session. Nothing here outlives the process, and sessions left idle
//! past the store's TTL are evicted by the sweeper.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::bindings::{render_views, BulletKey, EditModes, SectionKey, SectionView};
use crate::clock::Clock;
use crate::edit::command::WorkUpdate;
use crate::edit::debounce::Debouncer;
use crate::edit::model::ListSection;
use crate::edit::{EditCommand, EditError, EditModel};
use crate::models::resume::ResumeDocument;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Edit session {0} not found")]
    NotFound(Uuid),

    #[error(transparent)]
    Edit(#[from] EditError),
}

#[derive(Debug, Clone, Serialize)]
pub struct DraftView {
    pub item: usize,
    pub bullet: usize,
    pub text: String,
}

/// Everything the browser needs to redraw an editing session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub revision: u64,
    pub dirty: bool,
    pub document: ResumeDocument,
    pub views: Vec<SectionView>,
    pub drafts: Vec<DraftView>,
    pub edit_modes: EditModes,
}

struct EditSession {
    model: EditModel,
    modes: EditModes,
    drafts: Debouncer<BulletKey, String>,
    last_touched: Instant,
}

impl EditSession {
    fn snapshot(&self, session_id: Uuid) -> SessionSnapshot {
        let document = self.model.current();
        SessionSnapshot {
            session_id,
            revision: self.model.revision(),
            dirty: self.model.is_dirty(),
            views: render_views(&document, &self.modes),
            document: (*document).clone(),
            drafts: self
                .drafts
                .snapshot()
                .into_iter()
                .map(|(key, text)| DraftView {
                    item: key.item,
                    bullet: key.bullet,
                    text,
                })
                .collect(),
            edit_modes: self.modes.clone(),
        }
    }

    /// Applies `command`, then realigns drafts and edit modes with the new document.
    fn apply(&mut self, command: EditCommand) -> Result<(), EditError> {
        // Decided before `command` is moved into the model.
        let realign = Realign::for_command(&command);
        self.model.apply(command)?;

        match realign {
            Realign::None => {}
            Realign::WorkRemoved(removed) => {
                self.drafts.remap_keys(|key| key.after_work_removed(removed));
                self.modes.work_removed(removed);
            }
            Realign::BulletRemoved { item, bullet } => {
                self.drafts
                    .remap_keys(|key| key.after_bullet_removed(item, bullet));
            }
            Realign::BulletSet(target) => {
                self.drafts
                    .remap_keys(|key| (*key != target).then_some(*key));
            }
            Realign::BulletsReplaced(item) => {
                self.drafts.remap_keys(|key| (key.item != item).then_some(*key));
            }
            Realign::ProjectRemoved(removed) => self.modes.project_removed(removed),
            Realign::ListsReplaced => {
                self.drafts.discard_all();
                let doc = self.model.current();
                self.modes.retain_within(
                    doc.work_experience.as_ref().map_or(0, Vec::len),
                    doc.projects.as_ref().map_or(0, Vec::len),
                );
            }
            Realign::Reset => {
                self.drafts.discard_all();
                self.modes.clear();
            }
        }
        Ok(())
    }

    fn stage_draft(&mut self, key: BulletKey, text: String) -> Result<(), EditError> {
        let doc = self.model.current();
        let items = doc.work_experience.as_deref().unwrap_or_default();
        let item = items.get(key.item).ok_or(EditError::IndexOutOfBounds {
            section: ListSection::WorkExperience,
            index: key.item,
            len: items.len(),
        })?;
        if key.bullet >= item.bullets.len() {
            return Err(EditError::IndexOutOfBounds {
                section: ListSection::Bullets,
                index: key.bullet,
                len: item.bullets.len(),
            });
        }
        self.drafts.stage(key, text);
        Ok(())
    }

    /// Writes drafts into the document. Returns how many were committed.
    fn commit(&mut self, drafts: Vec<(BulletKey, String)>) -> usize {
        let mut committed = 0;
        for (key, text) in drafts {
            let update = WorkUpdate::Bullet {
                bullet: key.bullet,
                text,
            };
            match self.model.update_work_experience(key.item, update) {
                Ok(()) => committed += 1,
                Err(e) => warn!("Dropping stale bullet draft {key:?}: {e}"),
            }
        }
        committed
    }
}

/// How per-item UI state must follow a structural edit.
enum Realign {
    None,
    WorkRemoved(usize),
    BulletRemoved { item: usize, bullet: usize },
    BulletSet(BulletKey),
    BulletsReplaced(usize),
    ProjectRemoved(usize),
    ListsReplaced,
    Reset,
}

impl Realign {
    fn for_command(command: &EditCommand) -> Self {
        match command {
            EditCommand::RemoveWork { index } => Realign::WorkRemoved(*index),
            EditCommand::UpdateWork { index, update } => match update {
                WorkUpdate::RemoveBullet(bullet) => Realign::BulletRemoved {
                    item: *index,
                    bullet: *bullet,
                },
                WorkUpdate::Bullet { bullet, .. } => {
                    Realign::BulletSet(BulletKey::new(*index, *bullet))
                }
                WorkUpdate::Bullets(_) => Realign::BulletsReplaced(*index),
                _ => Realign::None,
            },
            EditCommand::RemoveProject { index } => Realign::ProjectRemoved(*index),
            EditCommand::ReplaceWork { .. } | EditCommand::ReplaceProjects { .. } => {
                Realign::ListsReplaced
            }
            EditCommand::Reset { .. } => Realign::Reset,
            _ => Realign::None,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Store
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<Uuid, EditSession>>>,
    debounce: Duration,
    idle_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl SessionStore {
    pub fn new(debounce: Duration, idle_ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            debounce,
            idle_ttl,
            clock,
        }
    }

    pub async fn create(&self, document: ResumeDocument) -> SessionSnapshot {
        let id = Uuid::new_v4();
        let session = EditSession {
            model: EditModel::new(document),
            modes: EditModes::new(),
            drafts: Debouncer::new(self.debounce, Arc::clone(&self.clock)),
            last_touched: self.clock.now(),
        };
        let snapshot = session.snapshot(id);
        self.sessions.lock().await.insert(id, session);
        info!("Created edit session {id}");
        snapshot
    }

    /// Runs `f` against one session under the store lock and marks it as touched.
    async fn with_session<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut EditSession) -> Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        let now = self.clock.now();
        let mut sessions = self.sessions.lock().await;
        let session = sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;
        session.last_touched = now;
        f(session)
    }

    pub async fn snapshot(&self, id: Uuid) -> Result<SessionSnapshot, SessionError> {
        self.with_session(id, |s| Ok(s.snapshot(id))).await
    }

    pub async fn apply(&self, id: Uuid, command: EditCommand) -> Result<SessionSnapshot, SessionError> {
        self.with_session(id, |s| {
            s.apply(command)?;
            Ok(s.snapshot(id))
        })
        .await
    }

    /// Stages a bullet edit; it reaches the document once the key has been idle for the
    /// debounce delay, or on flush/export.
    pub async fn stage_draft(
        &self,
        id: Uuid,
        key: BulletKey,
        text: String,
    ) -> Result<SessionSnapshot, SessionError> {
        self.with_session(id, |s| {
            s.stage_draft(key, text)?;
            Ok(s.snapshot(id))
        })
        .await
    }

    pub async fn toggle_edit_mode(
        &self,
        id: Uuid,
        key: SectionKey,
    ) -> Result<SessionSnapshot, SessionError> {
        self.with_session(id, |s| {
            let editing = s.modes.toggle(key);
            debug!("Session {id}: {key:?} edit mode {editing}");
            Ok(s.snapshot(id))
        })
        .await
    }

    /// Commits every pending draft immediately.
    pub async fn flush(&self, id: Uuid) -> Result<SessionSnapshot, SessionError> {
        self.with_session(id, |s| {
            let drafts = s.drafts.drain();
            s.commit(drafts);
            Ok(s.snapshot(id))
        })
        .await
    }

    /// Commits drafts whose debounce delay has passed, across all sessions.
    pub async fn flush_due(&self) -> usize {
        let mut sessions = self.sessions.lock().await;
        let committed: usize = sessions
            .values_mut()
            .filter(|s| !s.drafts.is_empty())
            .map(|s| {
                let due = s.drafts.take_due();
                s.commit(due)
            })
            .sum();
        if committed > 0 {
            debug!("Committed {committed} debounced bullet drafts");
        }
        committed
    }

    /// Drops sessions nobody has touched for the idle TTL. Returns how many went.
    pub async fn evict_idle(&self) -> usize {
        let now = self.clock.now();
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|id, s| {
            let keep = now.duration_since(s.last_touched) < self.idle_ttl;
            if !keep {
                info!("Evicted idle edit session {id}");
            }
            keep
        });
        before - sessions.len()
    }

    /// Discards drafts and edit modes and replaces the working copy.
    pub async fn reset(
        &self,
        id: Uuid,
        document: Option<ResumeDocument>,
    ) -> Result<SessionSnapshot, SessionError> {
        self.apply(id, EditCommand::Reset { document }).await
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.lock().await.remove(&id).is_some();
        if removed {
            info!("Discarded edit session {id}");
        }
        removed
    }

    /// The committed document, ignoring pending drafts.
    pub async fn document(&self, id: Uuid) -> Result<Arc<ResumeDocument>, SessionError> {
        self.with_session(id, |s| Ok(s.model.current())).await
    }

    /// Flushes pending drafts and returns the document to export.
    pub async fn export_document(&self, id: Uuid) -> Result<Arc<ResumeDocument>, SessionError> {
        self.with_session(id, |s| {
            let drafts = s.drafts.drain();
            s.commit(drafts);
            Ok(s.model.current())
        })
        .await
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}
