//! Stroke extraction: one ink-stroke XML document → [`Slide`].
//!
//! The document holds any number of `Ink` elements, each shaped like:
//!
//! ```xml
//! <Ink>
//!   <Thickness>2.5</Thickness>
//!   <ForegroundColor>#FFFFFF</ForegroundColor>
//!   <Points>
//!     <StylusPoint>10.5,20,0.5</StylusPoint>
//!     ...
//!   </Points>
//! </Ink>
//! ```
//!
//! The reader is a streaming quick-xml state machine: the only state kept is
//! the `Ink` element currently open and the field whose text is being
//! collected. Thickness, colour and points are looked up among the direct
//! children of `Ink` (first occurrence wins); points among the direct
//! children of the first `Points`.

use crate::config::ConversionConfig;
use crate::error::Mhb2SvgError;
use crate::pipeline::bbox::BoundingBox;
use crate::pipeline::xml;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// A sampled pen position. Pressure is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// One pen stroke with its style. Always holds at least one point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub points: Vec<Point>,
    pub color: String,
    /// Thickness with the configured stroke ratio already applied.
    pub width: f64,
}

impl Stroke {
    /// The point that decides which page a stroke lands on.
    pub fn first_point(&self) -> Option<Point> {
        self.points.first().copied()
    }
}

/// Every stroke of one slide plus their joint extent.
#[derive(Debug, Clone, PartialEq)]
pub struct Slide {
    /// Source filename without extension.
    pub stem: String,
    pub strokes: Vec<Stroke>,
    pub bbox: BoundingBox,
}

impl Slide {
    /// Read and parse an ink-stroke XML file.
    pub fn open(path: &Path, config: &ConversionConfig) -> Result<Self, Mhb2SvgError> {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let xml = xml::read_document(path)?;
        Self::from_xml(stem, &xml, path, config)
    }

    /// Parse ink-stroke XML already in memory. `source` is used in errors only.
    pub fn from_xml(
        stem: impl Into<String>,
        xml: &str,
        source: &Path,
        config: &ConversionConfig,
    ) -> Result<Self, Mhb2SvgError> {
        let (strokes, bbox) = extract_strokes(xml, source, config)?;
        Ok(Self {
            stem: stem.into(),
            strokes,
            bbox,
        })
    }

    /// Whether nothing drawable was found.
    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Thickness,
    Color,
    StylusPoint,
}

#[derive(Debug, Default)]
struct InkBuilder {
    depth: usize,
    thickness: Option<String>,
    color: Option<String>,
    points: Option<Vec<Point>>,
    /// Depth of the `Points` element while it is open.
    open_points: Option<usize>,
}

impl InkBuilder {
    fn finish(self, config: &ConversionConfig, source: &Path) -> Result<Option<Stroke>, Mhb2SvgError> {
        let points = match self.points {
            Some(points) if !points.is_empty() => points,
            _ => {
                debug!("Skipping ink without points in {}", source.display());
                return Ok(None);
            }
        };

        let width = match self.thickness.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            Some(t) => t.parse::<f64>().map_err(|e| Mhb2SvgError::XmlParse {
                path: source.to_path_buf(),
                detail: format!("invalid Thickness {t:?}: {e}"),
            })?,
            None => 1.0,
        } * config.stroke_ratio;

        let color = if config.color {
            self.color
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| config.ink_color.clone())
        } else {
            config.ink_color.clone()
        };

        Ok(Some(Stroke {
            points,
            color,
            width,
        }))
    }
}

/// Parse `"x,y,pressure"`; only x and y are required.
pub fn parse_stylus_point(text: &str) -> Result<Point, String> {
    let mut parts = text.split(',');
    let mut coord = |axis: &str| -> Result<f64, String> {
        let raw = parts.next().map(str::trim).unwrap_or_default();
        if raw.is_empty() {
            return Err(format!("missing {axis} coordinate"));
        }
        raw.parse::<f64>()
            .map_err(|e| format!("invalid {axis} coordinate {raw:?}: {e}"))
    };
    let x = coord("x")?;
    let y = coord("y")?;
    Ok(Point { x, y })
}

/// Extract every non-empty stroke and the bounding box of all their points.
pub fn extract_strokes(
    xml_text: &str,
    source: &Path,
    config: &ConversionConfig,
) -> Result<(Vec<Stroke>, BoundingBox), Mhb2SvgError> {
    let mut reader = Reader::from_str(xml_text);
    reader.config_mut().trim_text(true);

    let mut strokes = Vec::new();
    let mut bbox = BoundingBox::empty();
    let mut depth = 0usize;
    let mut ink: Option<InkBuilder> = None;
    let mut field: Option<(Field, usize)> = None;
    let mut text = String::new();

    loop {
        let (name, is_empty) = match reader.read_event() {
            Ok(Event::Start(e)) => (Some(e.local_name().as_ref().to_vec()), false),
            Ok(Event::Empty(e)) => (Some(e.local_name().as_ref().to_vec()), true),
            Ok(Event::End(_)) => (None, false),
            Ok(Event::Text(t)) => {
                if field.is_some() {
                    xml::push_text(&mut text, &t, source)?;
                }
                continue;
            }
            Ok(Event::CData(t)) => {
                if field.is_some() {
                    xml::push_text(&mut text, &t, source)?;
                }
                continue;
            }
            Ok(Event::GeneralRef(r)) => {
                if field.is_some() {
                    xml::push_reference(&mut text, &r);
                }
                continue;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml::parse_error(source, reader.buffer_position(), e)),
            _ => continue,
        };

        if let Some(name) = name {
            depth += 1;
            if open_element(&name, depth, &mut ink, &mut field) {
                text.clear();
            }
            if !is_empty {
                continue;
            }
        }

        // End tag, or the implicit end of an empty element.
        if let Some((kind, at)) = field {
            if at == depth {
                field = None;
                if let Some(current) = ink.as_mut() {
                    match kind {
                        Field::Thickness => {
                            current.thickness.get_or_insert_with(|| text.clone());
                        }
                        Field::Color => {
                            current.color.get_or_insert_with(|| text.clone());
                        }
                        Field::StylusPoint => {
                            let point = parse_stylus_point(&text).map_err(|detail| {
                                Mhb2SvgError::MalformedPoint {
                                    path: source.to_path_buf(),
                                    text: text.clone(),
                                    detail,
                                }
                            })?;
                            bbox.add_point(point.x, point.y);
                            if let Some(points) = current.points.as_mut() {
                                points.push(point);
                            }
                        }
                    }
                }
            }
        }

        if let Some(current) = ink.as_mut() {
            if current.open_points == Some(depth) {
                current.open_points = None;
            }
            if current.depth == depth {
                if let Some(finished) = ink.take() {
                    if let Some(stroke) = finished.finish(config, source)? {
                        strokes.push(stroke);
                    }
                }
            }
        }

        depth = depth.saturating_sub(1);
    }

    debug!(
        "Parsed {} strokes from {}",
        strokes.len(),
        source.display()
    );
    Ok((strokes, bbox))
}

/// Track an opening tag. Returns true when it starts a text field.
fn open_element(
    name: &[u8],
    depth: usize,
    ink: &mut Option<InkBuilder>,
    field: &mut Option<(Field, usize)>,
) -> bool {
    let Some(current) = ink.as_mut() else {
        if name == b"Ink" {
            *ink = Some(InkBuilder {
                depth,
                ..InkBuilder::default()
            });
        }
        return false;
    };
    if field.is_some() {
        return false;
    }

    if depth == current.depth + 1 {
        match name {
            b"Thickness" if current.thickness.is_none() => {
                *field = Some((Field::Thickness, depth));
            }
            b"ForegroundColor" if current.color.is_none() => {
                *field = Some((Field::Color, depth));
            }
            b"Points" if current.points.is_none() => {
                current.points = Some(Vec::new());
                current.open_points = Some(depth);
            }
            _ => {}
        }
    } else if current.open_points.map(|d| d + 1) == Some(depth) && name == b"StylusPoint" {
        *field = Some((Field::StylusPoint, depth));
    }
    field.is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(xml: &str, config: &ConversionConfig) -> Result<Slide, Mhb2SvgError> {
        Slide::from_xml("test", xml, Path::new("test.xml"), config)
    }

    const TWO_STROKES: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<InkCanvas>
  <Strokes>
    <Ink>
      <Thickness>3</Thickness>
      <ForegroundColor>#FFFFFF</ForegroundColor>
      <Points>
        <StylusPoint>0,0,0.5</StylusPoint>
        <StylusPoint>100,25,0.5</StylusPoint>
      </Points>
    </Ink>
    <Ink>
      <ForegroundColor>#FF0000</ForegroundColor>
      <Points>
        <StylusPoint>40,50,0.1</StylusPoint>
        <StylusPoint>60,10,0.1</StylusPoint>
      </Points>
    </Ink>
  </Strokes>
</InkCanvas>"#;

    #[test]
    fn parses_strokes_and_bbox() {
        let slide = parse(TWO_STROKES, &ConversionConfig::default()).unwrap();
        assert_eq!(slide.strokes.len(), 2);
        assert_eq!(slide.strokes[0].points[1], Point { x: 100.0, y: 25.0 });
        assert_eq!(slide.strokes[0].width, 3.0);
        assert_eq!(slide.strokes[1].width, 1.0);
        assert_eq!(slide.bbox.min_x, 0.0);
        assert_eq!(slide.bbox.min_y, 0.0);
        assert_eq!(slide.bbox.max_x, 100.0);
        assert_eq!(slide.bbox.max_y, 50.0);
    }

    #[test]
    fn monochrome_forces_ink_color() {
        let slide = parse(TWO_STROKES, &ConversionConfig::default()).unwrap();
        assert!(slide.strokes.iter().all(|s| s.color == "#000000"));
    }

    #[test]
    fn color_mode_keeps_document_color() {
        let config = ConversionConfig::builder().color(true).build().unwrap();
        let slide = parse(TWO_STROKES, &config).unwrap();
        assert_eq!(slide.strokes[0].color, "#FFFFFF");
        assert_eq!(slide.strokes[1].color, "#FF0000");
    }

    #[test]
    fn color_mode_without_color_falls_back_to_ink() {
        let xml = "<Root><Ink><Points><StylusPoint>1,2,0</StylusPoint></Points></Ink></Root>";
        let config = ConversionConfig::builder().color(true).build().unwrap();
        let slide = parse(xml, &config).unwrap();
        assert_eq!(slide.strokes[0].color, "#000000");
    }

    #[test]
    fn stroke_ratio_scales_thickness() {
        let config = ConversionConfig::builder().stroke_ratio(0.5).build().unwrap();
        let slide = parse(TWO_STROKES, &config).unwrap();
        assert_eq!(slide.strokes[0].width, 1.5);
        assert_eq!(slide.strokes[1].width, 0.5);
    }

    #[test]
    fn empty_thickness_defaults_to_one() {
        let xml = "<Root><Ink><Thickness/><Points><StylusPoint>1,2,0</StylusPoint></Points></Ink>\
                   <Ink><Thickness>  </Thickness><Points><StylusPoint>3,4,0</StylusPoint></Points></Ink></Root>";
        let slide = parse(xml, &ConversionConfig::default()).unwrap();
        assert_eq!(slide.strokes.len(), 2);
        assert!(slide.strokes.iter().all(|s| s.width == 1.0));
    }

    #[test]
    fn inks_without_points_are_skipped() {
        let xml = r#"<Root>
            <Ink><Thickness>2</Thickness></Ink>
            <Ink><Points/></Ink>
            <Ink><Points></Points></Ink>
            <Ink><Points><StylusPoint>5,6,0</StylusPoint></Points></Ink>
        </Root>"#;
        let slide = parse(xml, &ConversionConfig::default()).unwrap();
        assert_eq!(slide.strokes.len(), 1);
        assert_eq!(slide.bbox.min_x, 5.0);
        assert_eq!(slide.bbox.max_x, 5.0);
        assert_eq!(slide.bbox.min_y, 6.0);
        assert_eq!(slide.bbox.max_y, 6.0);
    }

    #[test]
    fn document_without_ink_is_empty() {
        let slide = parse("<Root/>", &ConversionConfig::default()).unwrap();
        assert!(slide.is_empty());
        assert!(slide.bbox.is_empty());
    }

    #[test]
    fn malformed_point_is_fatal() {
        let xml = "<Root><Ink><Points><StylusPoint>1.5,abc,0</StylusPoint></Points></Ink></Root>";
        let err = parse(xml, &ConversionConfig::default()).unwrap_err();
        match err {
            Mhb2SvgError::MalformedPoint { text, .. } => assert_eq!(text, "1.5,abc,0"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn point_missing_y_is_fatal() {
        let xml = "<Root><Ink><Points><StylusPoint>7</StylusPoint></Points></Ink></Root>";
        assert!(matches!(
            parse(xml, &ConversionConfig::default()),
            Err(Mhb2SvgError::MalformedPoint { .. })
        ));
    }

    #[test]
    fn broken_xml_is_parse_error() {
        let xml = "<Root><Ink><Points></Ink></Root>";
        assert!(matches!(
            parse(xml, &ConversionConfig::default()),
            Err(Mhb2SvgError::XmlParse { .. })
        ));
    }

    #[test]
    fn stylus_point_parsing() {
        assert_eq!(parse_stylus_point("1,2,3").unwrap(), Point { x: 1.0, y: 2.0 });
        assert_eq!(
            parse_stylus_point(" -1.25 , 4e2 ").unwrap(),
            Point { x: -1.25, y: 400.0 }
        );
        assert!(parse_stylus_point("").is_err());
        assert!(parse_stylus_point("x,1,0").is_err());
    }

    #[test]
    fn only_first_points_element_counts() {
        let xml = "<Root><Ink><Points><StylusPoint>1,1,0</StylusPoint></Points>\
                   <Points><StylusPoint>99,99,0</StylusPoint></Points></Ink></Root>";
        let slide = parse(xml, &ConversionConfig::default()).unwrap();
        assert_eq!(slide.strokes[0].points.len(), 1);
        assert_eq!(slide.bbox.max_x, 1.0);
    }
}
