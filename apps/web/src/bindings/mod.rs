//! Presentation bindings: what the browser needs to draw each résumé section in read or
//! edit mode, plus the bookkeeping that keeps per-item UI state aligned with the document.

pub mod state;
pub mod views;

pub use state::{BulletKey, EditModes, SectionKey};
pub use views::{render_views, SectionView};
