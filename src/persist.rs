//! Persisting an assembled document.
//!
//! The artifact is written to a temporary sibling and renamed into place, so
//! a failed write never leaves a partial file under the final name.

use crate::pagination::OutputDocument;
use crate::rendering::RasterImage;
use crate::{pdf, Error, Result};
use log::{debug, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Encode `doc` as PDF and write it to `dir/name`. Returns the final path.
pub async fn persist(doc: &OutputDocument, dir: &Path, name: &str) -> Result<PathBuf> {
    let doc = doc.clone();
    let bytes = tokio::task::spawn_blocking(move || pdf::render(&doc))
        .await
        .map_err(|e| Error::AssemblyError(format!("PDF encoder task failed: {}", e)))??;
    write_atomic(dir, name, &bytes).await
}

/// Write the raw capture as a PNG to `dir/name`, for inspecting what was paginated.
pub async fn persist_capture(image: Arc<RasterImage>, dir: &Path, name: &str) -> Result<PathBuf> {
    let bytes = tokio::task::spawn_blocking(move || image.encode_png())
        .await
        .map_err(|e| Error::CaptureError(format!("PNG encoder task failed: {}", e)))??;
    write_atomic(dir, name, &bytes).await
}

/// Write `bytes` to `dir/name` all-or-nothing.
pub async fn write_atomic(dir: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| Error::PersistError(format!("cannot create {}: {}", dir.display(), e)))?;

    let target = dir.join(name);
    let tmp = dir.join(format!(".{}.part", name));

    if let Err(e) = tokio::fs::write(&tmp, bytes).await {
        discard(&tmp).await;
        return Err(Error::PersistError(format!("cannot write {}: {}", tmp.display(), e)));
    }
    if let Err(e) = tokio::fs::rename(&tmp, &target).await {
        discard(&tmp).await;
        return Err(Error::PersistError(format!(
            "cannot move artifact to {}: {}",
            target.display(),
            e
        )));
    }
    debug!("wrote {} bytes to {}", bytes.len(), target.display());
    Ok(target)
}

async fn discard(tmp: &Path) {
    if let Err(e) = tokio::fs::remove_file(tmp).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!("failed to remove temporary file {}: {}", tmp.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("bi1docs-persist-{}-{}", tag, std::process::id()))
    }

    #[tokio::test]
    async fn write_atomic_leaves_only_the_target() {
        let dir = scratch("ok");
        let path = write_atomic(&dir, "doc.pdf", b"%PDF-1.5 test").await.unwrap();
        assert_eq!(path, dir.join("doc.pdf"));
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.5 test");
        assert!(!dir.join(".doc.pdf.part").exists());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn capture_is_written_as_png() {
        let dir = scratch("png");
        let raster = RasterImage::new(image::RgbaImage::from_pixel(3, 2, image::Rgba([0, 0, 0, 255])), 1);
        let path = persist_capture(Arc::new(raster), &dir, "capture.png").await.unwrap();
        let decoded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(decoded.get_pixel(2, 1).0, [0, 0, 0, 255]);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn unwritable_directory_is_persist_error() {
        let blocker = scratch("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();
        let res = write_atomic(&blocker.join("sub"), "doc.pdf", b"data").await;
        assert!(matches!(res, Err(Error::PersistError(_))));
        std::fs::remove_file(&blocker).ok();
    }
}
