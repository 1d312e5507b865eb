//! Vertical pagination of tall slides.
//!
//! A slide whose height exceeds `aspect_ratio × width` is cut into
//! `k + 1` windows of exactly `aspect_ratio × width` height, where
//! `k = floor(height / (width × aspect_ratio))`. The windows are spread
//! evenly from the top edge to the bottom edge, so neighbouring pages
//! overlap whenever the height is not an exact multiple of the page height.
//! Horizontal extent is never split.

use crate::error::Mhb2SvgError;
use crate::pipeline::bbox::BoundingBox;
use serde::{Deserialize, Serialize};

/// A window onto a slide, in source coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub min_x: f64,
    pub min_y: f64,
    pub width: f64,
    pub height: f64,
}

impl Page {
    /// Whether `y` lies strictly between the top and bottom edges.
    pub fn contains_y(&self, y: f64) -> bool {
        self.min_y < y && y < self.min_y + self.height
    }
}

/// How a slide is laid out on output pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PageLayout {
    /// The whole bounding box on one page.
    Single(Page),
    /// Two or more overlapping vertical windows.
    Paged(Vec<Page>),
}

impl PageLayout {
    pub fn pages(&self) -> &[Page] {
        match self {
            PageLayout::Single(page) => std::slice::from_ref(page),
            PageLayout::Paged(pages) => pages,
        }
    }

    pub fn is_paged(&self) -> bool {
        matches!(self, PageLayout::Paged(_))
    }
}

/// Upper bound on page steps for one slide.
///
/// A tall stroke whose x barely moves gives a near-zero width, and the step
/// count then grows without bound.
pub const MAX_PAGE_STEPS: usize = u16::MAX as usize;

/// Number of page steps `floor(height / (width × ratio))`.
///
/// Zero for a degenerate width or a non-finite quotient, which callers treat
/// as "fits on one page".
pub fn page_count(width: f64, height: f64, aspect_ratio: f64) -> usize {
    let page_height = width * aspect_ratio;
    if width.is_nan() || width <= 0.0 || page_height.is_nan() || page_height <= 0.0 {
        return 0;
    }
    let steps = (height / page_height).floor();
    if steps.is_finite() && steps >= 1.0 {
        steps as usize
    } else {
        0
    }
}

/// Lay out a slide's bounding box.
///
/// An empty box (no points) becomes a zero-size single page at the origin.
///
/// # Errors
/// [`Mhb2SvgError::TooManyPages`] when paging would need more than
/// [`MAX_PAGE_STEPS`] steps.
pub fn paginate(
    bbox: &BoundingBox,
    aspect_ratio: f64,
    paging: bool,
) -> Result<PageLayout, Mhb2SvgError> {
    if bbox.is_empty() {
        return Ok(PageLayout::Single(Page {
            min_x: 0.0,
            min_y: 0.0,
            width: 0.0,
            height: 0.0,
        }));
    }

    let width = bbox.width();
    let height = bbox.height();
    let full = Page {
        min_x: bbox.min_x,
        min_y: bbox.min_y,
        width,
        height,
    };

    let steps = page_count(width, height, aspect_ratio);
    if !paging || steps == 0 {
        return Ok(PageLayout::Single(full));
    }
    if steps > MAX_PAGE_STEPS {
        return Err(Mhb2SvgError::TooManyPages {
            steps,
            limit: MAX_PAGE_STEPS,
        });
    }

    let page_height = aspect_ratio * width;
    let dh = (height - page_height) / steps as f64;
    let pages = (0..=steps)
        .map(|i| Page {
            min_x: bbox.min_x,
            min_y: bbox.min_y + i as f64 * dh,
            width,
            height: page_height,
        })
        .collect();
    Ok(PageLayout::Paged(pages))
}
