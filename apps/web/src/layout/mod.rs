// Résumé layout: font metrics, wrapping, the section renderer and the PDF backend.
// Rendering is CPU-bound and must run inside tokio::task::spawn_blocking.

pub mod canvas;
pub mod font_metrics;
pub mod page_fill;
pub mod pdf;
pub mod renderer;
pub mod wrap;

pub use font_metrics::{default_page_config, PageConfig};
pub use pdf::RenderError;
pub use renderer::{render_pdf, render_preview, LayoutPreview, RenderedPdf};
