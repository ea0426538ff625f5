//! Render surfaces: the visual region that gets captured on export.
//!
//! A [`RenderSurface`] hands out immutable [`SurfaceSnapshot`] values. The
//! capture stage only ever sees a snapshot, so view state such as the scroll
//! position can keep changing while a capture is running without affecting it.

use crate::content::ContentSource;
use crate::registry::SectionRegistry;
use crate::rendering::layout::{layout_document, Cover, DocumentLayout, SectionAnchor};
use crate::rendering::paint::{build_display_list, PaintCommand};
use crate::{Error, Result, Viewport};
use image::RgbaImage;
use log::debug;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use url::Url;

/// An immutable picture of a surface at one point in time
#[derive(Debug, Clone)]
pub struct SurfaceSnapshot {
    /// Width in CSS pixels
    pub width: u32,
    /// Height in CSS pixels, unbounded
    pub height: u32,
    /// Origin the surface was served from; images from other origins are external
    pub origin: Option<Url>,
    pub commands: Vec<PaintCommand>,
}

/// Anything that can be captured
pub trait RenderSurface: Send + Sync {
    /// Take a snapshot. Fails with `CaptureError` if the surface is no longer attached.
    fn snapshot(&self) -> Result<SurfaceSnapshot>;
}

/// The documentation page: cover, table of contents and all sections.
pub struct DocumentSurface {
    layout: DocumentLayout,
    resources: HashMap<String, Arc<RgbaImage>>,
    origin: Option<Url>,
    viewport: Viewport,
    scroll_y: AtomicU32,
    attached: AtomicBool,
}

impl DocumentSurface {
    /// Lay out every section of `registry` with the default cover.
    pub fn build(registry: &SectionRegistry, content: &ContentSource, viewport: Viewport) -> Result<Self> {
        Self::build_with_cover(registry, content, &Cover::default(), viewport)
    }

    pub fn build_with_cover(
        registry: &SectionRegistry,
        content: &ContentSource,
        cover: &Cover,
        viewport: Viewport,
    ) -> Result<Self> {
        let layout = layout_document(registry, content, cover, viewport.width)?;
        debug!(
            "document surface laid out: {}x{} px, {} nodes",
            layout.width,
            layout.height,
            layout.nodes.len()
        );
        Ok(Self {
            layout,
            resources: HashMap::new(),
            origin: None,
            viewport,
            scroll_y: AtomicU32::new(0),
            attached: AtomicBool::new(true),
        })
    }

    /// Set the origin used to classify embedded images as same- or cross-origin.
    pub fn with_origin(mut self, origin: Url) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Register decoded pixels for an image source referenced by the content.
    pub fn with_resource(mut self, source: &str, pixels: RgbaImage) -> Self {
        self.resources.insert(source.to_string(), Arc::new(pixels));
        self
    }

    pub fn width(&self) -> u32 {
        self.layout.width
    }

    pub fn height(&self) -> u32 {
        self.layout.height
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn anchors(&self) -> &[SectionAnchor] {
        &self.layout.anchors
    }

    /// Current vertical scroll offset of the viewport
    pub fn scroll_y(&self) -> u32 {
        self.scroll_y.load(Ordering::Relaxed)
    }

    /// Bring the section tagged `id` into view. Unknown ids leave the view unchanged.
    pub fn scroll_to(&self, id: &str) {
        let Some(y) = self.layout.anchor(id) else {
            debug!("scroll_to: no section '{}'", id);
            return;
        };
        let max_scroll = self.layout.height.saturating_sub(self.viewport.height);
        let target = y.min(max_scroll);
        self.scroll_y.store(target, Ordering::Relaxed);
        debug!("scrolled to '{}' at y={}", id, target);
    }

    /// Mark the surface as torn down; later snapshots fail.
    pub fn detach(&self) {
        self.attached.store(false, Ordering::Release);
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::Acquire)
    }
}

impl RenderSurface for DocumentSurface {
    fn snapshot(&self) -> Result<SurfaceSnapshot> {
        if !self.is_attached() {
            return Err(Error::CaptureError("surface is detached".into()));
        }
        Ok(SurfaceSnapshot {
            width: self.layout.width,
            height: self.layout.height,
            origin: self.origin.clone(),
            commands: build_display_list(&self.layout, &self.resources),
        })
    }
}
