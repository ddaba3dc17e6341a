//! Page Fill Analysis — checks whether the laid-out résumé stayed on its single page.
//!
//! The renderer does not paginate. Content that runs past the bottom margin is still
//! painted (and clipped by the viewer); this analysis measures by how much so callers
//! can surface it.

use serde::{Deserialize, Serialize};

use crate::layout::font_metrics::PageConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum PageFillVerdict {
    Fits,
    /// The last baseline sits `overflow_pt` below the bottom margin.
    Overflow { overflow_pt: f32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageFillAnalysis {
    pub used_pt: f32,
    pub available_pt: f32,
    /// Fraction of the content area used (> 1.0 on overflow).
    pub fill_ratio: f32,
    pub verdict: PageFillVerdict,
}

impl PageFillAnalysis {
    pub fn overflow_pt(&self) -> Option<f32> {
        match self.verdict {
            PageFillVerdict::Fits => None,
            PageFillVerdict::Overflow { overflow_pt } => Some(overflow_pt),
        }
    }
}

/// Analyzes the fill given the renderer's final cursor position.
pub fn analyze_page_fill(final_y: f32, config: &PageConfig) -> PageFillAnalysis {
    let available_pt = config.bottom() - config.margin_pt;
    let used_pt = (final_y - config.margin_pt).max(0.0);
    let fill_ratio = if available_pt > 0.0 {
        used_pt / available_pt
    } else {
        f32::INFINITY
    };

    let verdict = if final_y > config.bottom() {
        PageFillVerdict::Overflow {
            overflow_pt: final_y - config.bottom(),
        }
    } else {
        PageFillVerdict::Fits
    };

    PageFillAnalysis {
        used_pt,
        available_pt,
        fill_ratio,
        verdict,
    }
}
