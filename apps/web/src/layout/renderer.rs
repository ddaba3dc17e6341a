//! Résumé layout — walks a `ResumeDocument` section by section and paints it on a canvas.
//!
//! # Section order
//! header → summary → skills → work experience → projects → education → certifications.
//!
//! # Cursor model
//! A single vertical cursor `y` (baseline of the next line) moves down the page. Nothing
//! paginates: the final cursor is handed to `page_fill` to detect overflow.
//!
//! # Limits
//! - summary: 4 wrapped lines
//! - work item: 4 bullets, each at most 2 wrapped lines
//! - project description: 2 lines; technologies: 1 line
//! - certifications: 3 entries, 1 line each

use serde::Serialize;
use tracing::{debug, warn};

use crate::layout::canvas::{Canvas, DrawOp, RecordingCanvas, Rgb};
use crate::layout::font_metrics::{get_metrics, FontFace, PageConfig};
use crate::layout::page_fill::{analyze_page_fill, PageFillAnalysis};
use crate::layout::pdf::{PdfCanvas, RenderError};
use crate::layout::wrap::{ellipsize, wrap_clipped};
use crate::models::resume::{ContactInfo, EduItem, Project, ResumeDocument, WorkItem};

const MAX_SUMMARY_LINES: usize = 4;
const MAX_BULLETS_PER_ITEM: usize = 4;
const MAX_LINES_PER_BULLET: usize = 2;
const MAX_DESCRIPTION_LINES: usize = 2;
const MAX_CERTIFICATIONS: usize = 3;

const SECTION_GAP: f32 = 10.0;
const CONTACT_SEPARATOR: &str = "  |  ";
const BULLET_GLYPH: &str = "•";
const BULLET_INDENT: f32 = 12.0;

const PILL_PADDING_X: f32 = 5.0;
const PILL_HEIGHT: f32 = 13.0;
const PILL_GAP: f32 = 5.0;
const PILL_ROW_HEIGHT: f32 = 17.0;

const ITEM_PADDING: f32 = 4.0;
const ITEM_GAP: f32 = 6.0;
const EDUCATION_GAP: f32 = 8.0;

pub const SECTION_TITLES: [&str; 6] = [
    "Summary",
    "Skills",
    "Work Experience",
    "Projects",
    "Education",
    "Certifications",
];

// ────────────────────────────────────────────────────────────────────────────
// Output types
// ────────────────────────────────────────────────────────────────────────────

pub struct RenderedPdf {
    pub bytes: Vec<u8>,
    pub page_fill: PageFillAnalysis,
}

/// Draw operations for an in-browser preview.
#[derive(Debug, Serialize)]
pub struct LayoutPreview {
    pub width_pt: f32,
    pub height_pt: f32,
    pub ops: Vec<DrawOp>,
    pub page_fill: PageFillAnalysis,
}

// ────────────────────────────────────────────────────────────────────────────
// Entry points
// ────────────────────────────────────────────────────────────────────────────

/// Lays out `doc` into a single-page PDF.
pub fn render_pdf(doc: &ResumeDocument, config: &PageConfig) -> Result<RenderedPdf, RenderError> {
    let mut canvas = PdfCanvas::new(config)?;
    let final_y = layout_document(doc, config, &mut canvas);
    let page_fill = analyze_page_fill(final_y, config);
    if let Some(overflow) = page_fill.overflow_pt() {
        warn!("Resume layout overflows the page by {overflow:.1}pt");
    }
    let bytes = canvas.finish()?;
    debug!("Rendered resume PDF ({} bytes)", bytes.len());
    Ok(RenderedPdf { bytes, page_fill })
}

/// Lays out `doc` onto a recording canvas.
pub fn render_preview(doc: &ResumeDocument, config: &PageConfig) -> LayoutPreview {
    let mut canvas = RecordingCanvas::new();
    let final_y = layout_document(doc, config, &mut canvas);
    LayoutPreview {
        width_pt: config.width_pt,
        height_pt: config.height_pt,
        ops: canvas.ops,
        page_fill: analyze_page_fill(final_y, config),
    }
}

/// Paints every section and returns the final cursor position.
pub fn layout_document<C: Canvas>(doc: &ResumeDocument, config: &PageConfig, canvas: &mut C) -> f32 {
    let mut layout = Layout {
        config,
        canvas,
        y: config.margin_pt,
    };
    layout.header(doc.contact_details.as_ref());
    layout.summary(doc.summary.as_deref());
    layout.skills(doc);
    layout.work_experience(doc.work_experience.as_deref().unwrap_or_default());
    layout.projects(doc.projects.as_deref().unwrap_or_default());
    layout.education(doc.education.as_deref().unwrap_or_default());
    layout.certifications(doc.certifications.as_deref().unwrap_or_default());
    layout.y
}

// ────────────────────────────────────────────────────────────────────────────
// Layout state
// ────────────────────────────────────────────────────────────────────────────

struct Layout<'a, C: Canvas> {
    config: &'a PageConfig,
    canvas: &'a mut C,
    /// Top of the next line to paint.
    y: f32,
}

impl<C: Canvas> Layout<'_, C> {
    fn measure(&self, face: FontFace, size: f32, text: &str) -> f32 {
        get_metrics(face).measure_str(text, size)
    }

    fn wrap(&self, face: FontFace, size: f32, text: &str, width: f32, max_lines: usize) -> Vec<String> {
        wrap_clipped(text, get_metrics(face), size, width, max_lines)
    }

    fn fit(&self, face: FontFace, size: f32, text: &str, width: f32) -> String {
        ellipsize(text, get_metrics(face), size, width)
    }

    /// Line advance for text at `size`, scaled from the body line height.
    fn line_height(&self, size: f32) -> f32 {
        size * self.config.line_height_pt / self.config.body_size_pt
    }

    /// Paints one line at the cursor and advances it by one line height.
    fn line_of_text(&mut self, x: f32, face: FontFace, size: f32, color: Rgb, text: &str) {
        self.canvas.set_font(face, size);
        self.canvas.set_fill_color(color);
        self.canvas.text(x, self.y + size, text);
        self.y += self.line_height(size);
    }

    /// Paints `right` flush with the right margin on the current line without advancing.
    fn right_aligned(&mut self, face: FontFace, size: f32, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        let x = self.config.right() - self.measure(face, size, text);
        self.canvas.set_font(face, size);
        self.canvas.set_fill_color(Rgb::TEXT_MUTED);
        self.canvas.text(x, self.y + size, text);
    }

    fn section_heading(&mut self, title: &str) {
        self.y += SECTION_GAP;
        let size = self.config.heading_size_pt;
        self.line_of_text(self.config.left(), FontFace::Bold, size, Rgb::ACCENT, title);
        self.canvas
            .line(self.config.left(), self.y, self.config.right(), self.y);
        self.y += 4.0;
    }

    fn placeholder(&mut self, text: &str) {
        let size = self.config.body_size_pt;
        self.line_of_text(self.config.left(), FontFace::Oblique, size, Rgb::TEXT_MUTED, text);
    }

    // ── Header ──────────────────────────────────────────────────────────────

    fn header(&mut self, contact: Option<&ContactInfo>) {
        let default_contact = ContactInfo::default();
        let contact = contact.unwrap_or(&default_contact);
        let name = contact
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or("Your Name");

        let name_size = self.config.name_size_pt;
        let name = self.fit(FontFace::Bold, name_size, name, self.config.content_width());
        let name_width = self.measure(FontFace::Bold, name_size, &name);
        let x = self.config.left() + (self.config.content_width() - name_width).max(0.0) / 2.0;
        self.line_of_text(x, FontFace::Bold, name_size, Rgb::BLACK, &name);
        self.y += 2.0;

        let size = self.config.small_size_pt + 1.0;
        let fields = contact.labelled_fields();
        if fields.is_empty() {
            self.placeholder("No contact details provided");
            return;
        }
        for row in self.pack_contact_rows(&fields, size) {
            self.line_of_text(self.config.left(), FontFace::Regular, size, Rgb::TEXT_MUTED, &row);
        }
    }

    /// Packs "Label: value" pairs left to right, starting a new row when the next pair
    /// would cross the right margin. A pair too wide for a row on its own is ellipsized.
    fn pack_contact_rows(&self, fields: &[(&str, &str)], size: f32) -> Vec<String> {
        let max_width = self.config.content_width();
        let mut rows: Vec<String> = Vec::new();
        let mut row = String::new();

        for (label, value) in fields {
            let piece = format!("{label}: {value}");
            let candidate = if row.is_empty() {
                piece.clone()
            } else {
                format!("{row}{CONTACT_SEPARATOR}{piece}")
            };
            if !row.is_empty() && self.measure(FontFace::Regular, size, &candidate) > max_width {
                rows.push(std::mem::replace(&mut row, piece));
            } else {
                row = candidate;
            }
        }
        if !row.is_empty() {
            rows.push(row);
        }
        rows.into_iter()
            .map(|row| self.fit(FontFace::Regular, size, &row, max_width))
            .collect()
    }

    // ── Summary ─────────────────────────────────────────────────────────────

    fn summary(&mut self, summary: Option<&str>) {
        self.section_heading(SECTION_TITLES[0]);
        let size = self.config.body_size_pt;
        let lines = self.wrap(
            FontFace::Regular,
            size,
            summary.unwrap_or_default(),
            self.config.content_width(),
            MAX_SUMMARY_LINES,
        );
        if lines.is_empty() {
            self.placeholder("No summary provided");
            return;
        }
        for line in lines {
            self.line_of_text(self.config.left(), FontFace::Regular, size, Rgb::BLACK, &line);
        }
    }

    // ── Skills ──────────────────────────────────────────────────────────────

    fn skills(&mut self, doc: &ResumeDocument) {
        self.section_heading(SECTION_TITLES[1]);
        let categories: Vec<(&String, &Vec<String>)> = doc
            .skills
            .iter()
            .flatten()
            .filter(|(_, skills)| skills.iter().any(|s| !s.trim().is_empty()))
            .collect();
        if categories.is_empty() {
            self.placeholder("No skills listed");
            return;
        }

        let label_size = self.config.body_size_pt;
        let pill_size = self.config.small_size_pt;
        for (category, skills) in categories {
            self.line_of_text(
                self.config.left(),
                FontFace::Bold,
                label_size,
                Rgb::BLACK,
                &format!("{category}:"),
            );
            self.y += 1.0;

            let max_label = self.config.content_width() - 2.0 * PILL_PADDING_X;
            let mut x = self.config.left();
            for skill in skills.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
                let skill = self.fit(FontFace::Regular, pill_size, skill, max_label);
                let width = self.measure(FontFace::Regular, pill_size, &skill) + 2.0 * PILL_PADDING_X;
                if x > self.config.left() && x + width > self.config.right() {
                    x = self.config.left();
                    self.y += PILL_ROW_HEIGHT;
                }
                self.canvas.set_fill_color(Rgb::PILL_FILL);
                self.canvas
                    .fill_rounded_rect(x, self.y, width, PILL_HEIGHT, PILL_HEIGHT / 2.0);
                self.canvas.set_font(FontFace::Regular, pill_size);
                self.canvas.set_fill_color(Rgb::BLACK);
                // Baseline centered in the pill.
                let baseline = self.y + (PILL_HEIGHT + pill_size * 0.7) / 2.0;
                self.canvas.text(x + PILL_PADDING_X, baseline, &skill);
                x += width + PILL_GAP;
            }
            self.y += PILL_ROW_HEIGHT + 2.0;
        }
    }

    // ── Work experience ─────────────────────────────────────────────────────

    fn work_experience(&mut self, items: &[WorkItem]) {
        self.section_heading(SECTION_TITLES[2]);
        if items.is_empty() {
            self.placeholder("No work experience listed");
            return;
        }
        for item in items {
            self.work_item(item);
        }
    }

    fn work_item(&mut self, item: &WorkItem) {
        let body = self.config.body_size_pt;
        let small = self.config.small_size_pt + 1.0;
        let bullet_width = self.config.content_width() - BULLET_INDENT;

        let bullets: Vec<Vec<String>> = item
            .bullets
            .iter()
            .filter(|b| !b.trim().is_empty())
            .take(MAX_BULLETS_PER_ITEM)
            .map(|b| self.wrap(FontFace::Regular, body, b, bullet_width, MAX_LINES_PER_BULLET))
            .collect();
        let bullet_lines: usize = bullets.iter().map(Vec::len).sum();

        // The background goes down first, so its height has to be known up front.
        let height = ITEM_PADDING * 2.0
            + self.line_height(body)
            + self.line_height(small)
            + bullet_lines as f32 * self.line_height(body);
        self.canvas.set_fill_color(Rgb::ITEM_BACKGROUND);
        self.canvas.fill_rect(
            self.config.left() - ITEM_PADDING,
            self.y,
            self.config.content_width() + 2.0 * ITEM_PADDING,
            height,
        );
        self.y += ITEM_PADDING;

        self.right_aligned(FontFace::Regular, small, &item.dates);
        let title = non_empty_or(&item.title, "Untitled role");
        self.line_of_text(self.config.left(), FontFace::Bold, body, Rgb::BLACK, title);

        let company = non_empty_or(&item.company, "Company not specified");
        let company_line = match item.location.as_deref().map(str::trim) {
            Some(location) if !location.is_empty() => format!("{company} | {location}"),
            _ => company.to_string(),
        };
        self.line_of_text(self.config.left(), FontFace::Oblique, small, Rgb::TEXT_MUTED, &company_line);

        for lines in bullets {
            for (i, line) in lines.iter().enumerate() {
                if i == 0 {
                    self.canvas.set_font(FontFace::Regular, body);
                    self.canvas.set_fill_color(Rgb::BLACK);
                    self.canvas.text(self.config.left() + 2.0, self.y + body, BULLET_GLYPH);
                }
                self.line_of_text(
                    self.config.left() + BULLET_INDENT,
                    FontFace::Regular,
                    body,
                    Rgb::BLACK,
                    line,
                );
            }
        }
        self.y += ITEM_PADDING + ITEM_GAP;
    }

    // ── Projects ────────────────────────────────────────────────────────────

    fn projects(&mut self, projects: &[Project]) {
        self.section_heading(SECTION_TITLES[3]);
        if projects.is_empty() {
            self.placeholder("No projects listed");
            return;
        }
        let body = self.config.body_size_pt;
        let small = self.config.small_size_pt + 1.0;
        for project in projects {
            let title = non_empty_or(&project.title, "Untitled project");
            self.line_of_text(self.config.left(), FontFace::Bold, body, Rgb::BLACK, title);

            let description = self.wrap(
                FontFace::Regular,
                body,
                &project.description,
                self.config.content_width(),
                MAX_DESCRIPTION_LINES,
            );
            for line in description {
                self.line_of_text(self.config.left(), FontFace::Regular, body, Rgb::BLACK, &line);
            }

            if !project.technologies.is_empty() {
                let label = "Technologies:";
                let label_width = self.measure(FontFace::Bold, small, label) + 4.0;
                let joined = project.technologies.join(", ");
                let line = self
                    .wrap(
                        FontFace::Regular,
                        small,
                        &joined,
                        self.config.content_width() - label_width,
                        1,
                    )
                    .into_iter()
                    .next()
                    .unwrap_or_default();
                self.canvas.set_font(FontFace::Bold, small);
                self.canvas.set_fill_color(Rgb::TEXT_MUTED);
                self.canvas.text(self.config.left(), self.y + small, label);
                self.line_of_text(
                    self.config.left() + label_width,
                    FontFace::Regular,
                    small,
                    Rgb::TEXT_MUTED,
                    &line,
                );
            }
            self.y += ITEM_GAP;
        }
    }

    // ── Education ───────────────────────────────────────────────────────────

    fn education(&mut self, items: &[EduItem]) {
        self.section_heading(SECTION_TITLES[4]);
        if items.is_empty() {
            self.placeholder("No education listed");
            return;
        }
        let body = self.config.body_size_pt;
        let small = self.config.small_size_pt + 1.0;
        for item in items {
            self.right_aligned(FontFace::Regular, small, &item.dates);
            let degree = non_empty_or(&item.degree, "Degree not specified");
            self.line_of_text(self.config.left(), FontFace::Bold, body, Rgb::BLACK, degree);

            self.right_aligned(FontFace::Regular, small, item.location.as_deref().unwrap_or_default());
            let school = non_empty_or(&item.school, "Institution not specified");
            self.line_of_text(self.config.left(), FontFace::Oblique, small, Rgb::TEXT_MUTED, school);
            self.y += EDUCATION_GAP;
        }
    }

    // ── Certifications ──────────────────────────────────────────────────────

    fn certifications(&mut self, certifications: &[String]) {
        self.section_heading(SECTION_TITLES[5]);
        let body = self.config.body_size_pt;
        let width = self.config.content_width() - BULLET_INDENT;
        let lines: Vec<String> = certifications
            .iter()
            .filter(|c| !c.trim().is_empty())
            .take(MAX_CERTIFICATIONS)
            .filter_map(|c| self.wrap(FontFace::Regular, body, c, width, 1).into_iter().next())
            .collect();
        if lines.is_empty() {
            self.placeholder("No certifications listed");
            return;
        }
        for line in lines {
            self.canvas.set_font(FontFace::Regular, body);
            self.canvas.set_fill_color(Rgb::BLACK);
            self.canvas.text(self.config.left() + 2.0, self.y + body, BULLET_GLYPH);
            self.line_of_text(self.config.left() + BULLET_INDENT, FontFace::Regular, body, Rgb::BLACK, &line);
        }
    }
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback
    } else {
        trimmed
    }
}
