//! Cache of the backend's stored résumé list, per user and per credential.
//!
//! An entry is only served back to a caller presenting the same bearer token that
//! fetched it. Entries go stale after `ttl`; stale entries are treated as absent.
//! Anything that changes a user's stored résumés must call `invalidate_user`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::clock::Clock;
use crate::models::backend::ResumeSummary;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    user_id: String,
    token: String,
}

impl CacheKey {
    fn new(user_id: &str, token: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            token: token.to_string(),
        }
    }
}

struct CacheEntry {
    resumes: Vec<ResumeSummary>,
    stored_at: Instant,
}

#[derive(Clone)]
pub struct ResumeListCache {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: Arc<Mutex<HashMap<CacheKey, CacheEntry>>>,
}

impl ResumeListCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns the list `token` fetched for `user_id` if it is younger than the TTL.
    pub fn get(&self, user_id: &str, token: &str) -> Option<Vec<ResumeSummary>> {
        let key = CacheKey::new(user_id, token);
        let now = self.clock.now();
        let mut entries = self.lock();
        let entry = entries.get(&key)?;
        if now.duration_since(entry.stored_at) < self.ttl {
            return Some(entry.resumes.clone());
        }
        debug!(user_id, "Resume list cache entry is stale");
        entries.remove(&key);
        None
    }

    pub fn put(&self, user_id: &str, token: &str, resumes: Vec<ResumeSummary>) {
        let stored_at = self.clock.now();
        self.lock()
            .insert(CacheKey::new(user_id, token), CacheEntry { resumes, stored_at });
    }

    /// Drops the entry one credential holds for `user_id`.
    pub fn invalidate(&self, user_id: &str, token: &str) {
        if self.lock().remove(&CacheKey::new(user_id, token)).is_some() {
            debug!(user_id, "Resume list cache invalidated");
        }
    }

    /// Drops every entry for `user_id`, whichever credential fetched it.
    pub fn invalidate_user(&self, user_id: &str) {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|key, _| key.user_id != user_id);
        if entries.len() < before {
            debug!(user_id, "Resume list cache invalidated for all credentials");
        }
    }

    /// Drops every entry fetched with `token`.
    pub fn invalidate_token(&self, token: &str) {
        self.lock().retain(|key, _| key.token != token);
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, CacheEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
