//! Configuration types for whiteboard-archive conversion.
//!
//! Every knob that used to be a global constant (background colour, API
//! template, page aspect ratio, padding, stroke scale) lives in
//! [`ConversionConfig`], built via its [`ConversionConfigBuilder`]. Tests
//! override any of them without touching process state.

use crate::error::Mhb2SvgError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;

/// Resource lookup endpoint; `{sid}` is replaced by the session id.
pub const DEFAULT_API_TEMPLATE: &str =
    "https://res.maxhub.com/v3/clientairdisk/api/share/v2/{sid}/resources.json";

/// Background painted behind strokes in colour mode.
pub const DEFAULT_BACKGROUND_COLOR: &str = "#363b41";

/// Ink colour used in monochrome mode.
pub const DEFAULT_INK_COLOR: &str = "#000000";

/// Where the archive comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveSource {
    /// A local `.mhb` archive.
    File(PathBuf),
    /// A share link carrying an `s_id` query parameter.
    Link(String),
}

impl fmt::Display for ArchiveSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveSource::File(p) => write!(f, "{}", p.display()),
            ArchiveSource::Link(url) => f.write_str(url),
        }
    }
}

/// Configuration for an archive-to-SVG conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use mhb2svg::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .color(true)
///     .paging(true)
///     .padding(20.0)
///     .build()
///     .unwrap();
/// assert_eq!(config.padding, 20.0);
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Render document colours on a dark background. Default: false.
    ///
    /// Whiteboard ink is usually light on a dark board; without the
    /// background rectangle those strokes would be invisible, so colour and
    /// background always go together. Monochrome forces every stroke to
    /// [`ConversionConfig::ink_color`].
    pub color: bool,

    /// Split tall slides into pages of [`ConversionConfig::aspect_ratio`]. Default: false.
    pub paging: bool,

    /// Margin added on every side of the canvas. Default: 10.
    pub padding: f64,

    /// Multiplier applied to every stroke thickness. Default: 1.0.
    pub stroke_ratio: f64,

    /// Page height divided by page width. Default: √2 (A-series paper).
    pub aspect_ratio: f64,

    /// Background fill used in colour mode. Default: `#363b41`.
    pub background_color: String,

    /// Stroke colour in monochrome mode, and the fallback when a stroke has
    /// no colour of its own. Default: `#000000`.
    pub ink_color: String,

    /// Resource lookup URL template containing `{sid}`.
    pub api_template: String,

    /// `User-Agent` sent with the resource lookup. Default: `Mozilla/5.0`.
    ///
    /// The share API rejects requests without a browser-like agent.
    pub user_agent: String,

    /// Timeout for each HTTP request in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Download filename when neither headers nor URL provide one. Default: `archive.mhb`.
    pub default_archive_name: String,

    /// Metadata document at the archive root. Default: `Document.xml`.
    pub metadata_file: String,

    /// Directory holding per-slide ink XML. Default: `Slides`.
    pub slides_dir: String,

    /// Directory the SVG files are written to. Default: current directory.
    pub output_dir: PathBuf,

    /// Parent of the per-run scratch directory. Default: `None` (system temp dir).
    pub scratch_root: Option<PathBuf>,

    /// Optional per-slide progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            color: false,
            paging: false,
            padding: 10.0,
            stroke_ratio: 1.0,
            aspect_ratio: std::f64::consts::SQRT_2,
            background_color: DEFAULT_BACKGROUND_COLOR.to_string(),
            ink_color: DEFAULT_INK_COLOR.to_string(),
            api_template: DEFAULT_API_TEMPLATE.to_string(),
            user_agent: "Mozilla/5.0".to_string(),
            download_timeout_secs: 120,
            default_archive_name: "archive.mhb".to_string(),
            metadata_file: "Document.xml".to_string(),
            slides_dir: "Slides".to_string(),
            output_dir: PathBuf::from("."),
            scratch_root: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("color", &self.color)
            .field("paging", &self.paging)
            .field("padding", &self.padding)
            .field("stroke_ratio", &self.stroke_ratio)
            .field("aspect_ratio", &self.aspect_ratio)
            .field("background_color", &self.background_color)
            .field("ink_color", &self.ink_color)
            .field("api_template", &self.api_template)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("output_dir", &self.output_dir)
            .field("scratch_root", &self.scratch_root)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Resource lookup URL for a session id.
    pub fn api_url(&self, sid: &str) -> String {
        self.api_template.replace("{sid}", sid)
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn color(mut self, v: bool) -> Self {
        self.config.color = v;
        self
    }

    pub fn paging(mut self, v: bool) -> Self {
        self.config.paging = v;
        self
    }

    pub fn padding(mut self, padding: f64) -> Self {
        self.config.padding = padding;
        self
    }

    pub fn stroke_ratio(mut self, ratio: f64) -> Self {
        self.config.stroke_ratio = ratio;
        self
    }

    pub fn aspect_ratio(mut self, ratio: f64) -> Self {
        self.config.aspect_ratio = ratio;
        self
    }

    pub fn background_color(mut self, color: impl Into<String>) -> Self {
        self.config.background_color = color.into();
        self
    }

    pub fn ink_color(mut self, color: impl Into<String>) -> Self {
        self.config.ink_color = color.into();
        self
    }

    pub fn api_template(mut self, template: impl Into<String>) -> Self {
        self.config.api_template = template.into();
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn default_archive_name(mut self, name: impl Into<String>) -> Self {
        self.config.default_archive_name = name.into();
        self
    }

    pub fn metadata_file(mut self, name: impl Into<String>) -> Self {
        self.config.metadata_file = name.into();
        self
    }

    pub fn slides_dir(mut self, name: impl Into<String>) -> Self {
        self.config.slides_dir = name.into();
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn scratch_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.scratch_root = Some(dir.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Mhb2SvgError> {
        let c = &self.config;
        if !c.padding.is_finite() || c.padding < 0.0 {
            return Err(Mhb2SvgError::InvalidConfig(format!(
                "padding must be a finite number ≥ 0, got {}",
                c.padding
            )));
        }
        if !c.stroke_ratio.is_finite() || c.stroke_ratio <= 0.0 {
            return Err(Mhb2SvgError::InvalidConfig(format!(
                "stroke ratio must be a finite number > 0, got {}",
                c.stroke_ratio
            )));
        }
        if !c.aspect_ratio.is_finite() || c.aspect_ratio <= 0.0 {
            return Err(Mhb2SvgError::InvalidConfig(format!(
                "aspect ratio must be a finite number > 0, got {}",
                c.aspect_ratio
            )));
        }
        if !c.api_template.contains("{sid}") {
            return Err(Mhb2SvgError::InvalidConfig(format!(
                "API template must contain {{sid}}, got '{}'",
                c.api_template
            )));
        }
        if c.default_archive_name.trim().is_empty() {
            return Err(Mhb2SvgError::InvalidConfig(
                "default archive name must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}
