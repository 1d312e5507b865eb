//! SVG rendering: one page window + a slide's strokes → SVG markup.
//!
//! The document is assembled as plain text. Every point is shifted by
//! `(padding − min_x, padding − min_y)` so the window's top-left corner
//! lands at `(padding, padding)` and the viewBox always starts at `0 0`.
//!
//! Strokes are never clipped or split. On a paginated slide a stroke is
//! drawn on a page only when its first point lies strictly inside that
//! page's vertical window, and it is then drawn in full even if it runs
//! past the page edge.

use crate::config::ConversionConfig;
use crate::error::Mhb2SvgError;
use crate::pipeline::ink::{Slide, Stroke};
use crate::pipeline::paginate::{paginate, Page, PageLayout};
use quick_xml::escape::escape;

const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Which strokes a page draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeFilter {
    /// Every stroke (single-page layout).
    All,
    /// Only strokes whose first point falls strictly inside the page window.
    FirstPointInside,
}

impl StrokeFilter {
    fn accepts(self, page: &Page, stroke: &Stroke) -> bool {
        match self {
            StrokeFilter::All => true,
            StrokeFilter::FirstPointInside => stroke
                .first_point()
                .is_some_and(|p| page.contains_y(p.y)),
        }
    }
}

/// One SVG document ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage {
    /// `<stem>.svg` or `<stem>-<index>.svg`.
    pub file_name: String,
    pub window: Page,
    pub svg: String,
}

/// Render a single page window.
pub fn render_page(
    page: &Page,
    strokes: &[Stroke],
    filter: StrokeFilter,
    config: &ConversionConfig,
) -> String {
    let pad = config.padding;
    let canvas_w = page.width + 2.0 * pad;
    let canvas_h = page.height + 2.0 * pad;

    let mut svg = format!(
        "<svg xmlns=\"{SVG_NS}\" version=\"1.1\" viewBox=\"0 0 {canvas_w} {canvas_h}\">\n"
    );

    if config.color {
        svg.push_str(&format!(
            "<rect x=\"0\" y=\"0\" width=\"{canvas_w}\" height=\"{canvas_h}\" fill=\"{}\"/>\n",
            escape(config.background_color.as_str())
        ));
    }

    let dx = pad - page.min_x;
    let dy = pad - page.min_y;
    for stroke in strokes.iter().filter(|s| filter.accepts(page, s)) {
        let points = stroke
            .points
            .iter()
            .map(|p| format!("{},{}", p.x + dx, p.y + dy))
            .collect::<Vec<_>>()
            .join(" ");
        svg.push_str(&format!(
            "<polyline points=\"{points}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\"/>\n",
            escape(stroke.color.as_str()),
            stroke.width
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

/// Lay out and render every page of a slide, in page order.
pub fn render_slide(
    slide: &Slide,
    config: &ConversionConfig,
) -> Result<(PageLayout, Vec<RenderedPage>), Mhb2SvgError> {
    let layout = paginate(&slide.bbox, config.aspect_ratio, config.paging)?;
    let rendered = match &layout {
        PageLayout::Single(page) => vec![RenderedPage {
            file_name: format!("{}.svg", slide.stem),
            window: *page,
            svg: render_page(page, &slide.strokes, StrokeFilter::All, config),
        }],
        PageLayout::Paged(pages) => pages
            .iter()
            .enumerate()
            .map(|(i, page)| RenderedPage {
                file_name: format!("{}-{}.svg", slide.stem, i),
                window: *page,
                svg: render_page(page, &slide.strokes, StrokeFilter::FirstPointInside, config),
            })
            .collect(),
    };
    Ok((layout, rendered))
}
