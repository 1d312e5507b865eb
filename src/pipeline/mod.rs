//! Pipeline stages for whiteboard-archive conversion.
//!
//! Each submodule implements one step; the driver in [`crate::convert`]
//! chains them.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ archive ──▶ ink ──▶ paginate ──▶ svg
//! (link/path) (unzip)  (strokes)  (pages)   (markup)
//! ```
//!
//! 1. [`input`]    — resolve a share link to a download URL and fetch the
//!    archive, or validate a local path; the only stage with network I/O
//! 2. [`archive`]  — unpack the zip, read `Document.xml`, list `Slides/*.xml`
//! 3. [`ink`]      — parse one slide's `Ink` elements into strokes, folding
//!    every point into a [`bbox::BoundingBox`]
//! 4. [`paginate`] — split tall slides into fixed-aspect pages
//! 5. [`svg`]      — emit one SVG document per page

pub mod archive;
pub mod bbox;
pub mod ink;
pub mod input;
pub mod paginate;
pub mod svg;

mod xml;
