//! # mhb2svg
//!
//! Convert MAXHUB whiteboard session archives to SVG.
//!
//! An archive (`.mhb`) is a zip holding a `Document.xml` metadata file and a
//! `Slides/` directory with one ink-stroke XML file per slide. Each slide is
//! rendered as a scalable vector image, optionally split into A-series pages
//! and optionally in the board's original colours.
//!
//! ## Pipeline Overview
//!
//! ```text
//! share link / .mhb
//!  │
//!  ├─ 1. Input     resolve s_id → download URL → archive (or use local file)
//!  ├─ 2. Archive   unzip into a scratch dir, read Document.xml, list Slides/*.xml
//!  ├─ 3. Ink       parse Ink elements → strokes + bounding box
//!  ├─ 4. Paginate  optional fixed-aspect vertical pages
//!  └─ 5. SVG       one <polyline> per stroke, one file per page
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mhb2svg::{convert, ArchiveSource, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder().color(true).paging(true).build()?;
//!     let source = ArchiveSource::File("meeting.mhb".into());
//!     let output = convert(&source, &config).await?;
//!     for slide in &output.slides {
//!         println!("{}", slide.label());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `mhb2svg` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ArchiveSource, ConversionConfig, ConversionConfigBuilder};
pub use convert::{convert, convert_slide, convert_sync, inspect};
pub use error::{ConversionWarning, Mhb2SvgError};
pub use output::{ConversionOutput, ConversionStats, MetadataEntry, SlideResult};
pub use pipeline::ink::{Point, Slide, Stroke};
pub use pipeline::paginate::{Page, PageLayout};
pub use pipeline::svg::{render_slide, RenderedPage};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
