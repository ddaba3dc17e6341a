//! Single-page PDF canvas backed by a lopdf content stream.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream, StringFormat};
use thiserror::Error;

use crate::layout::canvas::{Canvas, Rgb};
use crate::layout::font_metrics::{FontFace, PageConfig};

/// Bezier control-point factor for quarter circles.
const KAPPA: f32 = 0.552_284_8;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid page geometry: {0}")]
    InvalidPage(String),

    #[error("PDF encoding failed: {0}")]
    Encode(String),

    #[error("Render task failed: {0}")]
    Task(String),
}

pub struct PdfCanvas {
    config: PageConfig,
    operations: Vec<Operation>,
    font: Option<(FontFace, f32)>,
}

impl PdfCanvas {
    /// Fails when the page leaves no room for content.
    pub fn new(config: &PageConfig) -> Result<Self, RenderError> {
        let finite = [config.width_pt, config.height_pt, config.margin_pt]
            .iter()
            .all(|v| v.is_finite());
        if !finite || config.margin_pt < 0.0 {
            return Err(RenderError::InvalidPage(format!(
                "non-finite or negative dimensions: {config:?}"
            )));
        }
        if config.content_width() <= 0.0 || config.bottom() <= config.margin_pt {
            return Err(RenderError::InvalidPage(format!(
                "no content area on a {}x{}pt page with {}pt margins",
                config.width_pt, config.height_pt, config.margin_pt
            )));
        }
        Ok(Self {
            config: config.clone(),
            operations: Vec::new(),
            font: None,
        })
    }

    /// Converts a top-down `y` to PDF user space (bottom-up).
    fn flip(&self, y: f32) -> f32 {
        self.config.height_pt - y
    }

    /// Assembles the single-page document and serializes it.
    pub fn finish(self) -> Result<Vec<u8>, RenderError> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut fonts = Dictionary::new();
        for face in FontFace::ALL {
            let font_id = doc.add_object(Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Font".to_vec())),
                ("Subtype", Object::Name(b"Type1".to_vec())),
                ("BaseFont", Object::Name(face.base_font().as_bytes().to_vec())),
                ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
            ]));
            fonts.set(face.resource_name(), Object::Reference(font_id));
        }
        let resources_id = doc.add_object(Dictionary::from_iter(vec![(
            "Font",
            Object::Dictionary(fonts),
        )]));

        let content = Content {
            operations: self.operations,
        };
        let encoded = content
            .encode()
            .map_err(|e| RenderError::Encode(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(Dictionary::new(), encoded));

        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(self.config.width_pt),
                    Object::Real(self.config.height_pt),
                ]),
            ),
            ("Resources", Object::Reference(resources_id)),
            ("Contents", Object::Reference(content_id)),
        ]));

        let pages = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Count", Object::Integer(1)),
            ("Kids", Object::Array(vec![Object::Reference(page_id)])),
        ]);
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]));
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .map_err(|e| RenderError::Encode(e.to_string()))?;
        Ok(buffer)
    }
}

impl Canvas for PdfCanvas {
    fn set_font(&mut self, face: FontFace, size_pt: f32) {
        self.font = Some((face, size_pt));
    }

    fn set_fill_color(&mut self, color: Rgb) {
        self.operations.push(Operation::new(
            "rg",
            vec![Object::Real(color.0), Object::Real(color.1), Object::Real(color.2)],
        ));
    }

    fn text(&mut self, x: f32, y: f32, text: &str) {
        let (face, size) = self.font.unwrap_or((FontFace::Regular, self.config.body_size_pt));
        let baseline = self.flip(y);
        self.operations.extend([
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![
                    Object::Name(face.resource_name().as_bytes().to_vec()),
                    Object::Real(size),
                ],
            ),
            Operation::new("Td", vec![Object::Real(x), Object::Real(baseline)]),
            Operation::new(
                "Tj",
                vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ]);
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        // PDF rectangles grow upwards from their lower-left corner.
        let bottom = self.flip(y + height);
        self.operations.extend([
            Operation::new(
                "re",
                vec![
                    Object::Real(x),
                    Object::Real(bottom),
                    Object::Real(width),
                    Object::Real(height),
                ],
            ),
            Operation::new("f", vec![]),
        ]);
    }

    fn fill_rounded_rect(&mut self, x: f32, y: f32, width: f32, height: f32, radius: f32) {
        let r = radius.min(width / 2.0).min(height / 2.0).max(0.0);
        let k = r * KAPPA;
        let left = x;
        let right = x + width;
        let top = self.flip(y);
        let bottom = self.flip(y + height);

        let point = |op: &str, coords: &[f32]| {
            Operation::new(op, coords.iter().map(|&v| Object::Real(v)).collect())
        };

        self.operations.extend([
            point("m", &[left + r, bottom]),
            point("l", &[right - r, bottom]),
            point("c", &[right - r + k, bottom, right, bottom + r - k, right, bottom + r]),
            point("l", &[right, top - r]),
            point("c", &[right, top - r + k, right - r + k, top, right - r, top]),
            point("l", &[left + r, top]),
            point("c", &[left + r - k, top, left, top - r + k, left, top - r]),
            point("l", &[left, bottom + r]),
            point("c", &[left, bottom + r - k, left + r - k, bottom, left + r, bottom]),
            Operation::new("h", vec![]),
            Operation::new("f", vec![]),
        ]);
    }

    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        let (y1, y2) = (self.flip(y1), self.flip(y2));
        self.operations.extend([
            Operation::new(
                "RG",
                vec![
                    Object::Real(Rgb::RULE.0),
                    Object::Real(Rgb::RULE.1),
                    Object::Real(Rgb::RULE.2),
                ],
            ),
            Operation::new("w", vec![Object::Real(0.75)]),
            Operation::new("m", vec![Object::Real(x1), Object::Real(y1)]),
            Operation::new("l", vec![Object::Real(x2), Object::Real(y2)]),
            Operation::new("S", vec![]),
        ]);
    }
}

/// Encodes text for a WinAnsiEncoding font. Characters outside the encoding become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c as u8,
            '\u{A0}'..='\u{FF}' => c as u32 as u8,
            '€' => 0x80,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '…' => 0x85,
            '\t' => b' ',
            _ => b'?',
        })
        .collect()
}
