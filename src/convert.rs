//! Conversion entry points.
//!
//! [`convert`] drives the whole pipeline for one archive. Every temporary
//! file (the downloaded archive and its unpacked contents) lives in a
//! [`TempDir`] created at the start of the run; it is dropped, and the
//! directory removed, on every return path including errors.

use crate::config::{ArchiveSource, ConversionConfig};
use crate::error::{ConversionWarning, Mhb2SvgError};
use crate::output::{ConversionOutput, ConversionStats, MetadataEntry, SlideResult};
use crate::pipeline::ink::Slide;
use crate::pipeline::{archive, input, svg};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::TempDir;
use tracing::{debug, info, warn};

/// Scratch subdirectory a downloaded archive is written to.
const DOWNLOAD_DIR: &str = "download";

/// Scratch subdirectory the archive is unpacked into.
const UNPACK_DIR: &str = "unpacked";

/// Convert a whiteboard archive (local file or share link) to SVG files.
///
/// SVGs are written to [`ConversionConfig::output_dir`].
///
/// # Returns
/// `Ok(ConversionOutput)` on success, including runs that produced no SVG
/// because the archive had no slides (see `output.warnings`).
///
/// # Errors
/// Any fatal error aborts the whole run:
/// - missing `s_id` in a share link (reported before any network call)
/// - unreachable API, non-JSON response, no download URL
/// - download failure, non-zip archive
/// - malformed slide or metadata XML
pub async fn convert(
    source: &ArchiveSource,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Mhb2SvgError> {
    let total_start = Instant::now();
    info!("Starting conversion: {}", source);

    // ── Step 1: Validate input, then scratch space ───────────────────────
    input::validate_source(source)?;
    let scratch = scratch_dir(config)?;

    // ── Step 2: Resolve and unpack ───────────────────────────────────────
    let (archive_name, root) = unpack(source, &scratch, config).await?;

    // ── Step 3: Metadata ─────────────────────────────────────────────────
    let mut warnings = Vec::new();
    let metadata = load_metadata(&root, config, &mut warnings)?;
    if let Some(ref cb) = config.progress_callback {
        cb.on_metadata(&archive_name, &metadata);
    }

    // ── Step 4: Discover slides ──────────────────────────────────────────
    let (slide_files, warning) = archive::find_slides(&root.join(&config.slides_dir))?;
    warnings.extend(warning);

    if !slide_files.is_empty() {
        std::fs::create_dir_all(&config.output_dir).map_err(|e| {
            Mhb2SvgError::OutputWriteFailed {
                path: config.output_dir.clone(),
                source: e,
            }
        })?;
    }

    // ── Step 5: Convert each slide ───────────────────────────────────────
    let total = slide_files.len();
    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(total);
    }

    let mut slides = Vec::with_capacity(total);
    for (i, path) in slide_files.iter().enumerate() {
        let stem = slide_stem(path);
        if let Some(ref cb) = config.progress_callback {
            cb.on_slide_start(i + 1, total, &stem);
        }
        let result = convert_slide(path, config)?;
        if let Some(ref cb) = config.progress_callback {
            cb.on_slide_complete(i + 1, total, &stem, result.files.len());
        }
        slides.push(result);
    }

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(total);
    }

    // ── Step 6: Stats ────────────────────────────────────────────────────
    let stats = ConversionStats {
        total_slides: slides.len(),
        generated_files: slides.iter().map(|s| s.files.len()).sum(),
        total_strokes: slides.iter().map(|s| s.stroke_count).sum(),
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Conversion complete: {} slides, {} files, {}ms total",
        stats.total_slides, stats.generated_files, stats.total_duration_ms
    );

    Ok(ConversionOutput {
        archive_name,
        metadata,
        slides,
        warnings,
        stats,
    })
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    source: &ArchiveSource,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Mhb2SvgError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Mhb2SvgError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(source, config))
}

/// Read an archive's metadata without converting any slide.
pub async fn inspect(
    source: &ArchiveSource,
    config: &ConversionConfig,
) -> Result<Vec<MetadataEntry>, Mhb2SvgError> {
    input::validate_source(source)?;
    let scratch = scratch_dir(config)?;
    let (_, root) = unpack(source, &scratch, config).await?;
    load_metadata(&root, config, &mut Vec::new())
}

/// Convert one ink-stroke XML file, writing its SVG file(s) into
/// [`ConversionConfig::output_dir`].
///
/// Produces `<stem>.svg`, or `<stem>-0.svg … <stem>-k.svg` when the slide is
/// paginated.
pub fn convert_slide(
    xml_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<SlideResult, Mhb2SvgError> {
    let xml_path = xml_path.as_ref();
    let slide = Slide::open(xml_path, config)?;
    if slide.is_empty() {
        warn!("{} has no ink strokes", xml_path.display());
    }

    let (layout, pages) = svg::render_slide(&slide, config)?;
    let mut files = Vec::with_capacity(pages.len());
    for page in pages {
        let path = config.output_dir.join(&page.file_name);
        std::fs::write(&path, page.svg.as_bytes()).map_err(|e| {
            Mhb2SvgError::OutputWriteFailed {
                path: path.clone(),
                source: e,
            }
        })?;
        debug!("Wrote {}", path.display());
        files.push(path);
    }

    Ok(SlideResult {
        stem: slide.stem,
        stroke_count: slide.strokes.len(),
        paginated: layout.is_paged(),
        files,
    })
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn scratch_dir(config: &ConversionConfig) -> Result<TempDir, Mhb2SvgError> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("mhb2svg-");
    let dir = match &config.scratch_root {
        Some(root) => builder.tempdir_in(root),
        None => builder.tempdir(),
    }
    .map_err(|source| Mhb2SvgError::ScratchDir { source })?;
    debug!("Scratch directory: {}", dir.path().display());
    Ok(dir)
}

/// Fetch (if needed) and unpack the archive inside `scratch`.
///
/// Returns the archive's file name and the unpacked root directory.
async fn unpack(
    source: &ArchiveSource,
    scratch: &TempDir,
    config: &ConversionConfig,
) -> Result<(String, PathBuf), Mhb2SvgError> {
    let download_dir = scratch.path().join(DOWNLOAD_DIR);
    let archive_path = input::resolve_archive(source, &download_dir, config).await?;
    let archive_name = archive_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    info!("Unzipping archive...");
    let root = scratch.path().join(UNPACK_DIR);
    let dst = root.clone();
    tokio::task::spawn_blocking(move || archive::extract_archive(&archive_path, &dst))
        .await
        .map_err(|e| Mhb2SvgError::Internal(format!("Unpack task panicked: {}", e)))??;

    Ok((archive_name, root))
}

fn load_metadata(
    root: &Path,
    config: &ConversionConfig,
    warnings: &mut Vec<ConversionWarning>,
) -> Result<Vec<MetadataEntry>, Mhb2SvgError> {
    let path = root.join(&config.metadata_file);
    if !path.is_file() {
        warn!("Metadata document {} not found", path.display());
        warnings.push(ConversionWarning::MetadataMissing { path });
        return Ok(Vec::new());
    }
    archive::read_metadata(&path)
}

fn slide_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLIDE: &str = "<Root>\
        <Ink><Points><StylusPoint>0,0,0</StylusPoint><StylusPoint>100,50,0</StylusPoint></Points></Ink>\
        <Ink><Points/></Ink>\
        </Root>";

    #[test]
    fn convert_slide_writes_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let xml = dir.path().join("7.xml");
        std::fs::write(&xml, SLIDE).unwrap();
        let out = dir.path().join("out");
        std::fs::create_dir(&out).unwrap();

        let config = ConversionConfig::builder().output_dir(&out).build().unwrap();
        let result = convert_slide(&xml, &config).unwrap();

        assert_eq!(result.stem, "7");
        assert_eq!(result.stroke_count, 1);
        assert!(!result.paginated);
        assert_eq!(result.files, vec![out.join("7.svg")]);
        let svg = std::fs::read_to_string(out.join("7.svg")).unwrap();
        assert!(svg.contains("viewBox=\"0 0 120 70\""));
    }

    #[test]
    fn convert_slide_malformed_point_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let xml = dir.path().join("bad.xml");
        std::fs::write(&xml, "<Root><Ink><Points><StylusPoint>a,b,c</StylusPoint></Points></Ink></Root>")
            .unwrap();
        let config = ConversionConfig::builder()
            .output_dir(dir.path())
            .build()
            .unwrap();
        let err = convert_slide(&xml, &config).unwrap_err();
        assert!(matches!(err, Mhb2SvgError::MalformedPoint { .. }));
        assert!(!dir.path().join("bad.svg").exists());
    }

    #[test]
    fn slide_stem_strips_extension() {
        assert_eq!(slide_stem(Path::new("/a/b/12.xml")), "12");
    }
}
