//! BI1 documentation core
//!
//! The documentation viewer for the BI1 serving robot renders a fixed set of
//! sections and can export the whole document as a paginated PDF. This crate
//! holds the parts with real behavior behind them:
//!
//! - **Section registry**: the static, ordered list of navigable sections
//! - **Surface capture**: rasterizes a rendered surface at a pixel density
//! - **Paginator**: slices one tall raster into fixed-size pages
//! - **Export**: runs capture, pagination and persistence as one async task
//!
//! # Example
//!
//! ```no_run
//! use bi1docs::{content::ContentSource, ExportConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ExportConfig {
//!     output_dir: "out".into(),
//!     ..Default::default()
//! };
//!
//! let exporter = bi1docs::new_exporter(config, &ContentSource::builtin())?;
//! let report = exporter.export().await?;
//! println!("wrote {} pages to {}", report.page_count, report.path.display());
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub mod error;
pub use error::{Error, Result};

pub mod content;
pub mod export;
pub mod pagination;
pub mod pdf;
pub mod persist;
pub mod registry;
pub mod rendering;
pub mod surface;

pub use export::{ExportReport, Exporter};
pub use pagination::{assemble, paginate, OutputDocument, PageFrame, PageGeometry};
pub use registry::{Glyph, SectionEntry, SectionRegistry};
pub use rendering::raster::{capture, CaptureOptions};
pub use rendering::RasterImage;
pub use surface::{DocumentSurface, RenderSurface, SurfaceSnapshot};

/// An RGBA color, 8 bits per channel
pub type Rgba = [u8; 4];

/// Opaque white, the page background used for exports
pub const WHITE: Rgba = [255, 255, 255, 255];

/// Name of the exported artifact
pub const DEFAULT_FILE_NAME: &str = "BI1_Bot_I_Documentation.pdf";

/// Configuration for document export
///
/// The defaults match the documentation viewer: 2x raster density, opaque
/// white background, embedded external content included, portrait pages of
/// 210 x 295 mm.
///
/// # Examples
///
/// ```
/// let cfg = bi1docs::ExportConfig::default();
/// assert_eq!(cfg.scale, 2);
/// assert_eq!(cfg.geometry.page_width, 210.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Device pixel multiplier used for capture
    pub scale: u32,
    /// Fill color for transparent regions of the surface
    pub background: Rgba,
    /// Whether cross-origin images embedded in the surface are rasterized
    pub allow_external_content: bool,
    /// Output page size in millimeters
    pub geometry: PageGeometry,
    /// File name of the exported document
    pub file_name: String,
    /// Directory the document is written to
    pub output_dir: PathBuf,
    /// Viewport of the interactive view (width also fixes the surface width)
    pub viewport: Viewport,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            scale: 2,
            background: WHITE,
            allow_external_content: true,
            geometry: PageGeometry::default(),
            file_name: DEFAULT_FILE_NAME.to_string(),
            output_dir: PathBuf::from("."),
            viewport: Viewport::default(),
        }
    }
}

impl ExportConfig {
    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigError(format!("{}: {}", path.display(), e)))?;
        let cfg: ExportConfig = serde_json::from_str(&raw)
            .map_err(|e| Error::ConfigError(format!("{}: {}", path.display(), e)))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.scale == 0 {
            return Err(Error::ConfigError("scale must be at least 1".into()));
        }
        if !(self.geometry.page_width > 0.0 && self.geometry.page_height > 0.0) {
            return Err(Error::ConfigError(format!(
                "page geometry must be positive, got {}x{}",
                self.geometry.page_width, self.geometry.page_height
            )));
        }
        if self.file_name.trim().is_empty() || self.file_name.contains(['/', '\\']) {
            return Err(Error::ConfigError(format!(
                "invalid file name '{}'",
                self.file_name
            )));
        }
        if self.viewport.width == 0 {
            return Err(Error::ConfigError("viewport width must be non-zero".into()));
        }
        Ok(())
    }

    /// Options passed to [`capture`]
    pub fn capture_options(&self) -> CaptureOptions {
        CaptureOptions {
            scale: self.scale,
            background: self.background,
            allow_external_content: self.allow_external_content,
        }
    }
}

/// Viewport dimensions in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800,
            height: 1000,
        }
    }
}

/// Build an exporter over the global section registry and the given content.
pub fn new_exporter(config: ExportConfig, content: &content::ContentSource) -> Result<Exporter> {
    config.validate()?;
    let surface = DocumentSurface::build(SectionRegistry::global(), content, config.viewport)?;
    Exporter::new(config, Arc::new(surface))
}
