//! Small helpers shared by the quick-xml readers in this crate.

use crate::error::Mhb2SvgError;
use quick_xml::events::BytesRef;
use std::path::Path;

/// Append the text an entity or character reference stands for.
///
/// Unknown named entities are kept verbatim (`&name;`) rather than dropped.
pub(crate) fn push_reference(out: &mut String, reference: &BytesRef<'_>) {
    let name = String::from_utf8_lossy(reference);
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => num.parse::<u32>().ok(),
        };
        if let Some(ch) = code.and_then(char::from_u32) {
            out.push(ch);
            return;
        }
    } else if let Some(s) = quick_xml::escape::resolve_predefined_entity(&name) {
        out.push_str(s);
        return;
    }
    out.push('&');
    out.push_str(&name);
    out.push(';');
}

/// Append raw text content, rejecting invalid UTF-8.
pub(crate) fn push_text(out: &mut String, bytes: &[u8], path: &Path) -> Result<(), Mhb2SvgError> {
    let text = std::str::from_utf8(bytes).map_err(|e| Mhb2SvgError::XmlParse {
        path: path.to_path_buf(),
        detail: format!("invalid UTF-8 in text content: {e}"),
    })?;
    out.push_str(text);
    Ok(())
}

pub(crate) fn parse_error(
    path: &Path,
    position: impl std::fmt::Display,
    err: quick_xml::Error,
) -> Mhb2SvgError {
    Mhb2SvgError::XmlParse {
        path: path.to_path_buf(),
        detail: format!("at byte {position}: {err}"),
    }
}

/// Read a whole XML file as UTF-8 text.
pub(crate) fn read_document(path: &Path) -> Result<String, Mhb2SvgError> {
    std::fs::read_to_string(path).map_err(|e| Mhb2SvgError::XmlParse {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })
}
