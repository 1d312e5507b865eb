//! Archive handling: unpack the zip, find the slide XML files, read metadata.
//!
//! Expected layout of an unpacked archive:
//!
//! ```text
//! Document.xml        flat list of <Tag>text</Tag> metadata children
//! Slides/
//!   1.xml             ink strokes, one file per slide
//!   2.xml
//! ```

use crate::error::{ConversionWarning, Mhb2SvgError};
use crate::output::MetadataEntry;
use crate::pipeline::xml;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use zip::ZipArchive;

/// Unpack a zip archive into `dst`.
pub fn extract_archive(archive_path: &Path, dst: &Path) -> Result<(), Mhb2SvgError> {
    let invalid = |detail: String| Mhb2SvgError::InvalidArchive {
        path: archive_path.to_path_buf(),
        detail,
    };

    let file = File::open(archive_path).map_err(|e| invalid(e.to_string()))?;
    let mut zip = ZipArchive::new(file)
        .map_err(|e| invalid(format!("The file is not a valid archive ({e})")))?;
    debug!("Archive {} holds {} entries", archive_path.display(), zip.len());

    std::fs::create_dir_all(dst).map_err(|source| Mhb2SvgError::ScratchDir { source })?;
    zip.extract(dst).map_err(|e| invalid(e.to_string()))?;

    info!("Unpacked {} into {}", archive_path.display(), dst.display());
    Ok(())
}

/// List the `*.xml` files directly inside `slides_dir`, sorted by name.
///
/// A missing directory or an empty listing is reported as a warning, not an
/// error.
pub fn find_slides(
    slides_dir: &Path,
) -> Result<(Vec<PathBuf>, Option<ConversionWarning>), Mhb2SvgError> {
    if !slides_dir.is_dir() {
        warn!("{} does not exist. Skipping conversion.", slides_dir.display());
        return Ok((
            Vec::new(),
            Some(ConversionWarning::SlidesDirMissing {
                path: slides_dir.to_path_buf(),
            }),
        ));
    }

    let entries = std::fs::read_dir(slides_dir).map_err(|e| Mhb2SvgError::Internal(format!(
        "Failed to list {}: {e}",
        slides_dir.display()
    )))?;

    let mut slides: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "xml"))
        .collect();
    slides.sort();

    if slides.is_empty() {
        warn!("No XML files found in {}", slides_dir.display());
        return Ok((
            slides,
            Some(ConversionWarning::NoSlideFiles {
                path: slides_dir.to_path_buf(),
            }),
        ));
    }

    debug!("Found {} slide files", slides.len());
    Ok((slides, None))
}

/// Read the metadata document at `path`.
pub fn read_metadata(path: &Path) -> Result<Vec<MetadataEntry>, Mhb2SvgError> {
    let text = xml::read_document(path)?;
    parse_metadata(&text, path)
}

/// Collect `(tag, text)` for each child of the root element.
///
/// Only text directly inside a child is kept, trimmed; empty text becomes `None`.
pub fn parse_metadata(xml_text: &str, source: &Path) -> Result<Vec<MetadataEntry>, Mhb2SvgError> {
    let mut reader = Reader::from_str(xml_text);

    let mut entries = Vec::new();
    let mut current: Option<(String, String)> = None;
    let mut depth = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                depth += 1;
                if depth == 2 {
                    let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    current = Some((tag, String::new()));
                }
            }
            Ok(Event::Empty(e)) => {
                if depth == 1 {
                    entries.push(MetadataEntry {
                        tag: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
                        text: None,
                    });
                }
            }
            Ok(Event::Text(t)) => {
                if depth == 2 {
                    if let Some((_, text)) = current.as_mut() {
                        xml::push_text(text, &t, source)?;
                    }
                }
            }
            Ok(Event::CData(t)) => {
                if depth == 2 {
                    if let Some((_, text)) = current.as_mut() {
                        xml::push_text(text, &t, source)?;
                    }
                }
            }
            Ok(Event::GeneralRef(r)) => {
                if depth == 2 {
                    if let Some((_, text)) = current.as_mut() {
                        xml::push_reference(text, &r);
                    }
                }
            }
            Ok(Event::End(_)) => {
                if depth == 2 {
                    if let Some((tag, text)) = current.take() {
                        entries.push(MetadataEntry {
                            tag,
                            text: Some(text.trim().to_string()).filter(|t| !t.is_empty()),
                        });
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml::parse_error(source, reader.buffer_position(), e)),
            _ => {}
        }
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::{CompressionMethod, ZipWriter};

    fn write_zip(path: &Path, files: &[(&str, &str)]) {
        let file = File::create(path).unwrap();
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        for (name, body) in files {
            zip.start_file(*name, options).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn metadata_pairs_in_order() {
        let xml = r#"<?xml version="1.0"?>
<Document>
  <Title>Weekly sync</Title>
  <Author>R&amp;D</Author>
  <Empty/>
  <Blank></Blank>
  <Nested><Inner>x</Inner></Nested>
</Document>"#;
        let entries = parse_metadata(xml, Path::new("Document.xml")).unwrap();
        let pairs: Vec<(&str, Option<&str>)> = entries
            .iter()
            .map(|e| (e.tag.as_str(), e.text.as_deref()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("Title", Some("Weekly sync")),
                ("Author", Some("R&D")),
                ("Empty", None),
                ("Blank", None),
                ("Nested", None),
            ]
        );
    }

    #[test]
    fn metadata_malformed_is_error() {
        let err = parse_metadata("<Document><A></B></Document>", Path::new("Document.xml"));
        assert!(matches!(err, Err(Mhb2SvgError::XmlParse { .. })));
    }

    #[test]
    fn extract_and_find_slides() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("a.mhb");
        write_zip(
            &archive,
            &[
                ("Document.xml", "<Document/>"),
                ("Slides/2.xml", "<Root/>"),
                ("Slides/1.xml", "<Root/>"),
                ("Slides/notes.txt", "ignored"),
            ],
        );
        let out = dir.path().join("unpacked");
        extract_archive(&archive, &out).unwrap();
        assert!(out.join("Document.xml").is_file());

        let (slides, warning) = find_slides(&out.join("Slides")).unwrap();
        assert!(warning.is_none());
        let names: Vec<_> = slides
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["1.xml", "2.xml"]);
    }

    #[test]
    fn missing_slides_dir_is_warning() {
        let dir = tempfile::tempdir().unwrap();
        let (slides, warning) = find_slides(&dir.path().join("Slides")).unwrap();
        assert!(slides.is_empty());
        assert!(matches!(warning, Some(ConversionWarning::SlidesDirMissing { .. })));
    }

    #[test]
    fn empty_slides_dir_is_warning() {
        let dir = tempfile::tempdir().unwrap();
        let slides_dir = dir.path().join("Slides");
        std::fs::create_dir(&slides_dir).unwrap();
        let (_, warning) = find_slides(&slides_dir).unwrap();
        assert!(matches!(warning, Some(ConversionWarning::NoSlideFiles { .. })));
    }

    #[test]
    fn non_zip_is_invalid_archive() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("bogus.mhb");
        std::fs::write(&bogus, b"definitely not a zip file").unwrap();
        let err = extract_archive(&bogus, &dir.path().join("out")).unwrap_err();
        assert!(matches!(err, Mhb2SvgError::InvalidArchive { .. }));
    }
}
