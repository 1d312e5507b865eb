//! Result types returned by the conversion entry points.

use crate::error::ConversionWarning;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// One top-level child of the metadata document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub tag: String,
    /// Element text; `None` when the element is empty.
    pub text: Option<String>,
}

impl fmt::Display for MetadataEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.text {
            Some(text) => write!(f, "{}: {}", self.tag, text),
            None => write!(f, "{}: None", self.tag),
        }
    }
}

/// What one slide produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideResult {
    /// Source filename without extension; prefix of every output file.
    pub stem: String,
    /// Non-empty ink strokes parsed from the slide.
    pub stroke_count: usize,
    /// Whether the slide was split into pages.
    pub paginated: bool,
    /// SVG files written, in page order.
    pub files: Vec<PathBuf>,
}

impl SlideResult {
    /// Summary label: the stem, plus the page step count `k` for paginated
    /// slides. A paginated slide writes `k + 1` files.
    pub fn label(&self) -> String {
        if self.paginated {
            format!("{} ({})", self.stem, self.files.len().saturating_sub(1))
        } else {
            self.stem.clone()
        }
    }
}

/// Aggregate counters for a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionStats {
    pub total_slides: usize,
    pub generated_files: usize,
    pub total_strokes: usize,
    pub total_duration_ms: u64,
}

/// Everything a full archive conversion produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// Filename of the archive that was unpacked.
    pub archive_name: String,
    pub metadata: Vec<MetadataEntry>,
    pub slides: Vec<SlideResult>,
    pub warnings: Vec<ConversionWarning>,
    pub stats: ConversionStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_unpaginated() {
        let r = SlideResult {
            stem: "3".into(),
            stroke_count: 4,
            paginated: false,
            files: vec![PathBuf::from("3.svg")],
        };
        assert_eq!(r.label(), "3");
    }

    #[test]
    fn label_paginated() {
        let r = SlideResult {
            stem: "3".into(),
            stroke_count: 4,
            paginated: true,
            files: vec!["3-0.svg".into(), "3-1.svg".into(), "3-2.svg".into()],
        };
        assert_eq!(r.label(), "3 (2)");
    }

    #[test]
    fn metadata_display() {
        let e = MetadataEntry {
            tag: "Title".into(),
            text: Some("Board".into()),
        };
        assert_eq!(e.to_string(), "Title: Board");
        let e = MetadataEntry {
            tag: "Empty".into(),
            text: None,
        };
        assert_eq!(e.to_string(), "Empty: None");
    }
}
