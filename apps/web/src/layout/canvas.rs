//! Drawing surface the renderer paints on.
//!
//! Coordinates are in points with the origin at the page's top-left corner and `y`
//! growing downwards. Text is positioned by its baseline.

use serde::Serialize;

use crate::layout::font_metrics::FontFace;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rgb(pub f32, pub f32, pub f32);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0.0, 0.0, 0.0);
    pub const TEXT_MUTED: Rgb = Rgb(0.45, 0.45, 0.45);
    pub const ACCENT: Rgb = Rgb(0.16, 0.32, 0.62);
    pub const ITEM_BACKGROUND: Rgb = Rgb(0.96, 0.96, 0.97);
    pub const PILL_FILL: Rgb = Rgb(0.89, 0.93, 0.99);
    pub const RULE: Rgb = Rgb(0.8, 0.8, 0.8);
}

pub trait Canvas {
    fn set_font(&mut self, face: FontFace, size_pt: f32);
    fn set_fill_color(&mut self, color: Rgb);
    fn text(&mut self, x: f32, y: f32, text: &str);
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32);
    fn fill_rounded_rect(&mut self, x: f32, y: f32, width: f32, height: f32, radius: f32);
    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    Font { face: FontFace, size_pt: f32 },
    Fill { color: Rgb },
    Text { x: f32, y: f32, text: String },
    Rect { x: f32, y: f32, width: f32, height: f32 },
    RoundedRect { x: f32, y: f32, width: f32, height: f32, radius: f32 },
    Line { x1: f32, y1: f32, x2: f32, y2: f32 },
}

/// Canvas that records every call. Used for previews and for inspecting layouts.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    pub ops: Vec<DrawOp>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// The painted strings in paint order.
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Canvas for RecordingCanvas {
    fn set_font(&mut self, face: FontFace, size_pt: f32) {
        self.ops.push(DrawOp::Font { face, size_pt });
    }

    fn set_fill_color(&mut self, color: Rgb) {
        self.ops.push(DrawOp::Fill { color });
    }

    fn text(&mut self, x: f32, y: f32, text: &str) {
        self.ops.push(DrawOp::Text {
            x,
            y,
            text: text.to_string(),
        });
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.ops.push(DrawOp::Rect {
            x,
            y,
            width,
            height,
        });
    }

    fn fill_rounded_rect(&mut self, x: f32, y: f32, width: f32, height: f32, radius: f32) {
        self.ops.push(DrawOp::RoundedRect {
            x,
            y,
            width,
            height,
            radius,
        });
    }

    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        self.ops.push(DrawOp::Line { x1, y1, x2, y2 });
    }
}
