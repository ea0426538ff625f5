/// Display list for the documentation surface

use crate::rendering::layout::{DocumentLayout, ElementType, LayoutNode};
use crate::Rgba;
use image::RgbaImage;
use std::collections::HashMap;
use std::sync::Arc;

const BRAND_BLUE: Rgba = [37, 99, 235, 255];
const PANEL_GRAY: Rgba = [249, 250, 251, 255];
const RULE_GRAY: Rgba = [229, 231, 235, 255];
const TEXT_STRONG: Rgba = [17, 24, 39, 255];
const TEXT_BODY: Rgba = [55, 65, 81, 255];
const TEXT_MUTED: Rgba = [75, 85, 99, 255];

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    SolidRect {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        rgba: Rgba,
    },
    Text {
        x: i32,
        y: i32,
        text: String,
        /// Glyph cell multiplier
        size: u32,
        rgba: Rgba,
    },
    /// An embedded bitmap. `pixels` is `None` when the resource could not be read.
    Image {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        source: String,
        pixels: Option<Arc<RgbaImage>>,
    },
}

fn text_color(kind: &ElementType) -> Rgba {
    match kind {
        ElementType::Title | ElementType::Heading => TEXT_STRONG,
        ElementType::TocEntry => TEXT_MUTED,
        _ => TEXT_BODY,
    }
}

fn paint_node(node: &LayoutNode, resources: &HashMap<String, Arc<RgbaImage>>, out: &mut Vec<PaintCommand>) {
    let r = &node.lb.rect;
    match node.elem_type {
        ElementType::CoverMark => out.push(PaintCommand::SolidRect {
            x: r.x,
            y: r.y,
            width: r.width,
            height: r.height,
            rgba: BRAND_BLUE,
        }),
        ElementType::Panel => out.push(PaintCommand::SolidRect {
            x: r.x,
            y: r.y,
            width: r.width,
            height: r.height,
            rgba: PANEL_GRAY,
        }),
        ElementType::Rule => out.push(PaintCommand::SolidRect {
            x: r.x,
            y: r.y,
            width: r.width,
            height: r.height.max(1),
            rgba: RULE_GRAY,
        }),
        ElementType::Image => out.push(PaintCommand::Image {
            x: r.x,
            y: r.y,
            width: r.width,
            height: r.height,
            source: node.text.clone(),
            pixels: resources.get(&node.text).cloned(),
        }),
        _ => {
            let pad = node.lb.box_model.padding as i32;
            out.push(PaintCommand::Text {
                x: r.x + pad,
                y: r.y + pad,
                text: node.text.clone(),
                size: node.scale,
                rgba: text_color(&node.elem_type),
            });
        }
    }
}

/// Turn laid-out nodes into paint commands, in painting order.
///
/// `resources` maps image sources to their decoded pixels; sources missing
/// from the map produce an `Image` command without pixels.
pub fn build_display_list(
    layout: &DocumentLayout,
    resources: &HashMap<String, Arc<RgbaImage>>,
) -> Vec<PaintCommand> {
    let mut out = Vec::with_capacity(layout.nodes.len());
    for node in &layout.nodes {
        paint_node(node, resources, &mut out);
    }
    out
}
