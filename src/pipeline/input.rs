//! Input resolution: turn a local path or a share link into an archive file.
//!
//! A share link carries the session id in its `s_id` query parameter. The
//! id is looked up through the resource API, which answers with a JSON array
//! whose first element holds the real download `url`. The archive is then
//! downloaded into the caller's scratch directory, whose lifetime bounds
//! every file fetched here.

use crate::config::{ArchiveSource, ConversionConfig};
use crate::error::Mhb2SvgError;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{CONTENT_DISPOSITION, USER_AGENT};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Resolve the source to a local archive path.
///
/// Local files are validated and used in place; share links are looked up
/// and downloaded into `download_dir`.
pub async fn resolve_archive(
    source: &ArchiveSource,
    download_dir: &Path,
    config: &ConversionConfig,
) -> Result<PathBuf, Mhb2SvgError> {
    match source {
        ArchiveSource::File(path) => resolve_local(path),
        ArchiveSource::Link(link) => {
            // Validated before any client is built.
            let sid = extract_sid(link)?;
            info!("Extracted SID: {}", sid);
            let client = http_client(config)?;
            let file_url = fetch_file_url(&client, &sid, config).await?;
            info!("File URL: {}", file_url);
            download_archive(&client, &file_url, download_dir, config).await
        }
    }
}

/// Check a source without touching the network or the scratch area.
///
/// Share links must carry an `s_id`; local files must exist and be readable.
pub fn validate_source(source: &ArchiveSource) -> Result<(), Mhb2SvgError> {
    match source {
        ArchiveSource::File(path) => resolve_local(path).map(|_| ()),
        ArchiveSource::Link(link) => extract_sid(link).map(|_| ()),
    }
}

/// Pull the `s_id` query parameter out of a share link.
///
/// Blank values count as missing.
pub fn extract_sid(link: &str) -> Result<String, Mhb2SvgError> {
    let url = reqwest::Url::parse(link.trim()).map_err(|e| Mhb2SvgError::InvalidLink {
        url: link.to_string(),
        reason: e.to_string(),
    })?;

    url.query_pairs()
        .find(|(k, v)| k == "s_id" && !v.trim().is_empty())
        .map(|(_, v)| v.into_owned())
        .ok_or_else(|| Mhb2SvgError::MissingSessionId {
            url: link.to_string(),
        })
}

/// Validate a local archive path: it must exist and be readable.
fn resolve_local(path: &Path) -> Result<PathBuf, Mhb2SvgError> {
    if !path.exists() {
        return Err(Mhb2SvgError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    match std::fs::File::open(path) {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Mhb2SvgError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(Mhb2SvgError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    }

    debug!("Resolved local archive: {}", path.display());
    Ok(path.to_path_buf())
}

fn http_client(config: &ConversionConfig) -> Result<reqwest::Client, Mhb2SvgError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.download_timeout_secs))
        .build()
        .map_err(|e| Mhb2SvgError::Internal(format!("Failed to build HTTP client: {e}")))
}

#[derive(Debug, Deserialize)]
struct ResourceEntry {
    url: Option<String>,
}

/// Look up the archive download URL for a session id.
pub async fn fetch_file_url(
    client: &reqwest::Client,
    sid: &str,
    config: &ConversionConfig,
) -> Result<String, Mhb2SvgError> {
    let api_url = config.api_url(sid);
    debug!("Querying resource API: {}", api_url);

    let request_failed = |e: reqwest::Error| {
        if e.is_timeout() {
            Mhb2SvgError::DownloadTimeout {
                url: api_url.clone(),
                secs: config.download_timeout_secs,
            }
        } else {
            Mhb2SvgError::ApiRequestFailed {
                url: api_url.clone(),
                reason: e.to_string(),
            }
        }
    };

    let response = client
        .get(&api_url)
        .header(USER_AGENT, config.user_agent.as_str())
        .send()
        .await
        .map_err(request_failed)?;

    if !response.status().is_success() {
        return Err(Mhb2SvgError::ApiRequestFailed {
            url: api_url.clone(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let body = response.bytes().await.map_err(request_failed)?;
    parse_resources(&api_url, &body, sid)
}

/// Take the first element's `url` from a resource API response body.
pub fn parse_resources(api_url: &str, body: &[u8], sid: &str) -> Result<String, Mhb2SvgError> {
    let entries: Vec<ResourceEntry> =
        serde_json::from_slice(body).map_err(|e| Mhb2SvgError::InvalidApiResponse {
            url: api_url.to_string(),
            detail: e.to_string(),
        })?;

    entries
        .into_iter()
        .next()
        .and_then(|entry| entry.url)
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| Mhb2SvgError::FileUrlMissing {
            sid: sid.to_string(),
        })
}

/// Download `url` into `dst_dir` (created if missing), returning the written
/// file's path.
pub async fn download_archive(
    client: &reqwest::Client,
    url: &str,
    dst_dir: &Path,
    config: &ConversionConfig,
) -> Result<PathBuf, Mhb2SvgError> {
    info!("Downloading archive from: {}", url);

    let download_failed = |e: reqwest::Error| {
        if e.is_timeout() {
            Mhb2SvgError::DownloadTimeout {
                url: url.to_string(),
                secs: config.download_timeout_secs,
            }
        } else {
            Mhb2SvgError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    };

    let response = client.get(url).send().await.map_err(download_failed)?;

    if !response.status().is_success() {
        return Err(Mhb2SvgError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let disposition = response
        .headers()
        .get(CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let filename = archive_file_name(url, disposition.as_deref(), &config.default_archive_name);
    let file_path = dst_dir.join(&filename);
    tokio::fs::create_dir_all(dst_dir)
        .await
        .map_err(|source| Mhb2SvgError::ScratchDir { source })?;

    let bytes = response.bytes().await.map_err(download_failed)?;

    tokio::fs::write(&file_path, &bytes)
        .await
        .map_err(|e| Mhb2SvgError::DownloadFailed {
            url: url.to_string(),
            reason: format!("failed to write {}: {e}", file_path.display()),
        })?;

    info!("Downloaded {} bytes to: {}", bytes.len(), file_path.display());
    Ok(file_path)
}

/// Pick a filename for a downloaded archive.
///
/// Order: `Content-Disposition` filename, last URL path segment, `default`.
/// The result is always a bare file name.
pub fn archive_file_name(url: &str, content_disposition: Option<&str>, default: &str) -> String {
    content_disposition
        .and_then(content_disposition_filename)
        .and_then(|name| sanitize_file_name(&name))
        .or_else(|| {
            reqwest::Url::parse(url)
                .ok()
                .and_then(|u| u.path_segments()?.next_back().map(str::to_owned))
                .and_then(|name| sanitize_file_name(&name))
        })
        .unwrap_or_else(|| default.to_string())
}

static RE_FILENAME_EXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)filename\*\s*=\s*(?:[A-Za-z0-9!#$&+.^_`|~-]*)'[^']*'([^;\s]+)"#).unwrap()
});

static RE_FILENAME_QUOTED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)(?:^|;)\s*filename\s*=\s*"([^"]*)""#).unwrap());

static RE_FILENAME_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)(?:^|;)\s*filename\s*=\s*([^";\s]+)"#).unwrap());

/// Filename hint from a `Content-Disposition` header value.
///
/// The RFC 5987 `filename*=charset''value` form wins over plain `filename=`.
pub fn content_disposition_filename(header: &str) -> Option<String> {
    if let Some(caps) = RE_FILENAME_EXT.captures(header) {
        let decoded = urlencoding::decode_binary(caps[1].as_bytes());
        return Some(String::from_utf8_lossy(&decoded).into_owned());
    }
    RE_FILENAME_QUOTED
        .captures(header)
        .or_else(|| RE_FILENAME_TOKEN.captures(header))
        .map(|caps| caps[1].to_string())
}

/// Reduce a server-supplied name to its final component.
fn sanitize_file_name(name: &str) -> Option<String> {
    let last = name.trim().rsplit(['/', '\\']).next()?.trim();
    if last.is_empty() || last == "." || last == ".." {
        None
    } else {
        Some(last.to_string())
    }
}
