//! Export entry point: capture, paginate and persist as one async task.
//!
//! Rasterization runs on a dedicated capture thread fed through a command
//! channel; the async side awaits a oneshot reply. An in-flight flag shared
//! by all clones of an [`Exporter`] allows one export at a time.

use crate::pagination::assemble;
use crate::persist::persist;
use crate::rendering::raster::{rasterize, CaptureOptions};
use crate::rendering::RasterImage;
use crate::surface::{RenderSurface, SurfaceSnapshot};
use crate::{Error, ExportConfig, Result};
use log::{error, info, warn};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread;
use tokio::sync::oneshot;

enum Command {
    Capture(
        Box<SurfaceSnapshot>,
        CaptureOptions,
        oneshot::Sender<Result<RasterImage>>,
    ),
}

/// Run `rasterize`, turning a panic into `CaptureError` so the capture
/// thread stays alive for later exports.
fn rasterize_caught(snapshot: &SurfaceSnapshot, options: &CaptureOptions) -> Result<RasterImage> {
    panic::catch_unwind(AssertUnwindSafe(|| rasterize(snapshot, options))).unwrap_or_else(|payload| {
        let msg = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        Err(Error::CaptureError(format!("rasterizer panicked: {}", msg)))
    })
}

/// Outcome of a successful export
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    /// Where the document was written
    pub path: PathBuf,
    pub page_count: usize,
    /// Per-page image offsets in document units
    pub page_offsets: Vec<f64>,
    /// Captured raster size in device pixels
    pub image_width: u32,
    pub image_height: u32,
}

/// Clears the in-flight flag when an export ends, however it ends.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| Error::ExportInFlight)?;
        Ok(Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Async export front-end backed by a dedicated capture thread.
///
/// Rasterization can take a long time for tall surfaces, so it runs on a
/// worker thread and the async caller only awaits the reply. At most one
/// export runs at a time across all clones of an `Exporter`.
#[derive(Clone)]
pub struct Exporter {
    config: ExportConfig,
    surface: Arc<dyn RenderSurface>,
    cmd_tx: Sender<Command>,
    in_flight: Arc<AtomicBool>,
}

impl Exporter {
    /// Create an exporter for `surface` (spawns the capture thread).
    pub fn new(config: ExportConfig, surface: Arc<dyn RenderSurface>) -> Result<Self> {
        config.validate()?;
        let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();

        thread::Builder::new()
            .name("bi1docs-capture".into())
            .spawn(move || {
                // Runs until every Exporter clone is dropped.
                while let Ok(cmd) = cmd_rx.recv() {
                    match cmd {
                        Command::Capture(snapshot, options, resp) => {
                            let _ = resp.send(rasterize_caught(&snapshot, &options));
                        }
                    }
                }
            })
            .map_err(|e| Error::CaptureError(format!("failed to spawn capture thread: {}", e)))?;

        Ok(Self {
            config,
            surface,
            cmd_tx,
            in_flight: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Whether an export is currently running; a UI should disable its control meanwhile.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    async fn capture(&self, snapshot: SurfaceSnapshot) -> Result<RasterImage> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Capture(
                Box::new(snapshot),
                self.config.capture_options(),
                tx,
            ))
            .map_err(|_| Error::CaptureError("capture thread is gone".into()))?;
        rx.await
            .map_err(|e| Error::CaptureError(format!("Capture canceled: {}", e)))?
    }

    /// Capture the surface, paginate it and write the document.
    ///
    /// Returns `Error::ExportInFlight` immediately if another export is running.
    pub async fn export(&self) -> Result<ExportReport> {
        let _guard = InFlightGuard::acquire(&self.in_flight)?;

        let snapshot = self.surface.snapshot()?;
        let image = Arc::new(self.capture(snapshot).await?);
        let document = assemble(image, self.config.geometry)?;
        info!(
            "paginated {}x{} capture into {} page(s) ({:.1} mm tall)",
            document.image.width,
            document.image.height,
            document.page_count(),
            document.image_height
        );

        let path = persist(&document, &self.config.output_dir, &self.config.file_name).await?;
        Ok(ExportReport {
            path,
            page_count: document.page_count(),
            page_offsets: document.offsets(),
            image_width: document.image.width,
            image_height: document.image.height,
        })
    }

    /// Entry point for the "Export" control. Failures are logged, never raised.
    pub async fn on_export_requested(&self) {
        match self.export().await {
            Ok(report) => info!(
                "exported {} page(s) to {}",
                report.page_count,
                report.path.display()
            ),
            Err(Error::ExportInFlight) => warn!("export already in progress; request ignored"),
            Err(e) => error!("Error generating PDF: {}", e),
        }
    }
}
