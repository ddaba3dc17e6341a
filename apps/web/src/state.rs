use std::sync::Arc;

use crate::cache::ResumeListCache;
use crate::config::Config;
use crate::gateway::ResumeBackend;
use crate::layout::PageConfig;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Every call to the external backend goes through here. Tests swap in a fake.
    pub backend: Arc<dyn ResumeBackend>,
    pub sessions: SessionStore,
    pub resume_cache: ResumeListCache,
    pub config: Config,
    /// Page geometry and type sizes for PDF export.
    pub page_config: PageConfig,
}
