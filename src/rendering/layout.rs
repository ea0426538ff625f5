//! Block layout for the documentation surface
//!
//! Everything is stacked vertically in a single column: cover, table of
//! contents, then every registered section in registry order. The column
//! width is fixed, the height grows with the content.

use crate::content::ContentSource;
use crate::registry::SectionRegistry;
use crate::{Error, Result};
use scraper::{ElementRef, Html, Selector};

/// Width of one glyph cell at text scale 1
pub const CHAR_WIDTH: u32 = 8;
/// Height of one text line at text scale 1
pub const LINE_HEIGHT: u32 = 12;

const PAGE_MARGIN: u32 = 8;
const SECTION_GAP: u32 = 32;
const DEFAULT_IMAGE_HEIGHT: u32 = 120;
/// Tallest image a content fragment may request
const MAX_IMAGE_HEIGHT: u32 = 4096;

#[derive(Debug, Clone, PartialEq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxModel {
    pub margin: u32,
    pub border: u32,
    pub padding: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutBox {
    pub rect: Rect,
    pub box_model: BoxModel,
}

impl LayoutBox {
    pub fn content_width(&self) -> u32 {
        let total = self.box_model.border + self.box_model.padding;
        self.rect.width.saturating_sub(total * 2)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementType {
    /// Square brand mark at the top of the cover
    CoverMark,
    /// Document or section title
    Title,
    /// Heading inside a section fragment
    Heading,
    Paragraph,
    ListItem,
    TableRow,
    TocEntry,
    /// Background panel drawn behind the table of contents
    Panel,
    /// Horizontal separator between sections
    Rule,
    /// Embedded image; the node text holds the image source
    Image,
}

/// A layout node couples a `LayoutBox` with rendered text and element type.
#[derive(Debug, Clone)]
pub struct LayoutNode {
    pub lb: LayoutBox,
    pub text: String,
    pub elem_type: ElementType,
    pub scale: u32,
}

/// Vertical position of a section's first line on the surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionAnchor {
    pub id: String,
    pub y: u32,
}

/// Text shown on the cover block
#[derive(Debug, Clone)]
pub struct Cover {
    pub title: String,
    pub subtitle: String,
    pub version: String,
    pub date: Option<String>,
}

impl Default for Cover {
    fn default() -> Self {
        Self {
            title: "BI1 (Bot I)".to_string(),
            subtitle: "First-Generation Indoor Mobile Serving Robot".to_string(),
            version: "1.0".to_string(),
            date: None,
        }
    }
}

/// Result of laying out the whole document
#[derive(Debug, Clone)]
pub struct DocumentLayout {
    pub nodes: Vec<LayoutNode>,
    pub anchors: Vec<SectionAnchor>,
    pub width: u32,
    pub height: u32,
}

impl DocumentLayout {
    pub fn anchor(&self, id: &str) -> Option<u32> {
        self.anchors.iter().find(|a| a.id == id).map(|a| a.y)
    }
}

/// Greedy word wrap at `chars_per_line` characters.
pub fn wrap_text(text: &str, chars_per_line: usize) -> Vec<String> {
    let chars_per_line = chars_per_line.max(1);
    let mut lines = Vec::new();
    let mut cur = String::new();
    for word in text.split_whitespace() {
        if cur.chars().count() + word.chars().count() + 1 > chars_per_line && !cur.is_empty() {
            lines.push(cur);
            cur = word.to_string();
        } else {
            if !cur.is_empty() {
                cur.push(' ');
            }
            cur.push_str(word);
        }
    }
    if !cur.is_empty() {
        lines.push(cur);
    }
    lines
}

struct Column {
    width: u32,
    y: u32,
    nodes: Vec<LayoutNode>,
}

impl Column {
    fn inner_width(&self) -> u32 {
        self.width.saturating_sub(PAGE_MARGIN * 2)
    }

    fn push_text(&mut self, text: &str, elem_type: ElementType, scale: u32, indent: u32, margin: u32) {
        let padding = 6u32;
        let width = self.inner_width().saturating_sub(indent);
        let content_w = width.saturating_sub(padding * 2);
        let chars_per_line = (content_w / (CHAR_WIDTH * scale)) as usize;
        let lines = wrap_text(text, chars_per_line);
        if lines.is_empty() {
            return;
        }
        let box_h = lines.len() as u32 * LINE_HEIGHT * scale + padding * 2;
        let lb = LayoutBox {
            rect: Rect {
                x: (PAGE_MARGIN + indent) as i32,
                y: self.y as i32,
                width,
                height: box_h,
            },
            box_model: BoxModel {
                margin,
                border: 0,
                padding,
            },
        };
        self.nodes.push(LayoutNode {
            lb,
            text: lines.join("\n"),
            elem_type,
            scale,
        });
        self.advance(box_h, margin);
    }

    fn push_block(&mut self, elem_type: ElementType, x: u32, width: u32, height: u32, text: String, margin: u32) {
        let lb = LayoutBox {
            rect: Rect {
                x: x as i32,
                y: self.y as i32,
                width,
                height,
            },
            box_model: BoxModel {
                margin,
                border: 0,
                padding: 0,
            },
        };
        self.nodes.push(LayoutNode {
            lb,
            text,
            elem_type,
            scale: 1,
        });
        self.advance(height, margin);
    }

    fn advance(&mut self, height: u32, margin: u32) {
        self.y = self.y.saturating_add(height).saturating_add(margin);
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::CaptureError(format!("invalid selector '{}': {:?}", css, e)))
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn layout_cover(col: &mut Column, cover: &Cover) {
    let mark = 80u32;
    let x = (col.width.saturating_sub(mark)) / 2;
    col.push_block(ElementType::CoverMark, x, mark, mark, String::new(), 24);
    col.push_text(&cover.title, ElementType::Title, 3, 0, 16);
    col.push_text(&cover.subtitle, ElementType::Paragraph, 1, 0, 16);
    col.push_text(&format!("Version {}", cover.version), ElementType::Paragraph, 1, 0, 4);
    if let Some(date) = &cover.date {
        col.push_text(&format!("Date {}", date), ElementType::Paragraph, 1, 0, 4);
    }
    col.advance(SECTION_GAP * 2, 0);
}

fn layout_toc(col: &mut Column, registry: &SectionRegistry) {
    col.push_text("Table of Contents", ElementType::Title, 2, 0, 16);
    let panel_index = col.nodes.len();
    let panel_top = col.y;
    col.push_block(ElementType::Panel, PAGE_MARGIN, col.inner_width(), 0, String::new(), 0);
    col.advance(12, 0);
    for line in registry.numbered_titles() {
        col.push_text(&line, ElementType::TocEntry, 1, 12, 0);
    }
    col.advance(12, 0);
    // The panel height is only known once its entries are placed.
    col.nodes[panel_index].lb.rect.height = col.y - panel_top;
    col.advance(SECTION_GAP * 2, 0);
}

fn layout_fragment(col: &mut Column, html: &str) -> Result<()> {
    let fragment = Html::parse_fragment(html);
    let blocks = selector("h1, h2, h3, h4, p, li, tr, img")?;
    let cells = selector("th, td")?;
    for el in fragment.select(&blocks) {
        match el.value().name() {
            "h1" | "h2" | "h3" | "h4" => {
                col.push_text(&collapse(&text_of(el)), ElementType::Heading, 1, 0, 8)
            }
            "p" => col.push_text(&collapse(&text_of(el)), ElementType::Paragraph, 1, 0, 6),
            "li" => col.push_text(
                &format!("- {}", collapse(&text_of(el))),
                ElementType::ListItem,
                1,
                16,
                2,
            ),
            "tr" => {
                let row = el
                    .select(&cells)
                    .map(|c| collapse(&text_of(c)))
                    .collect::<Vec<_>>()
                    .join(" | ");
                col.push_text(&row, ElementType::TableRow, 1, 0, 0);
            }
            "img" => {
                let src = el.value().attr("src").unwrap_or_default().to_string();
                let max_w = col.inner_width();
                let width = el
                    .value()
                    .attr("width")
                    .and_then(|w| w.parse::<u32>().ok())
                    .unwrap_or(max_w)
                    .min(max_w);
                let height = el
                    .value()
                    .attr("height")
                    .and_then(|h| h.parse::<u32>().ok())
                    .unwrap_or(DEFAULT_IMAGE_HEIGHT)
                    .min(MAX_IMAGE_HEIGHT);
                col.push_block(ElementType::Image, PAGE_MARGIN, width, height, src, 8);
            }
            _ => {}
        }
    }
    Ok(())
}

fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>()
}

/// Lay out the cover, the table of contents and all sections of `registry`.
pub fn layout_document(
    registry: &SectionRegistry,
    content: &ContentSource,
    cover: &Cover,
    width: u32,
) -> Result<DocumentLayout> {
    let mut col = Column {
        width,
        y: PAGE_MARGIN,
        nodes: Vec::new(),
    };

    layout_cover(&mut col, cover);
    layout_toc(&mut col, registry);

    let mut anchors = Vec::with_capacity(registry.len());
    for (i, entry) in registry.list().iter().enumerate() {
        anchors.push(SectionAnchor {
            id: entry.id.clone(),
            y: col.y,
        });
        col.push_text(&format!("{}. {}", i + 1, entry.title), ElementType::Title, 2, 0, 12);
        if let Some(html) = content.fragment(&entry.id) {
            layout_fragment(&mut col, html)?;
        }
        col.advance(SECTION_GAP / 2, 0);
        col.push_block(ElementType::Rule, PAGE_MARGIN, col.inner_width(), 1, String::new(), SECTION_GAP / 2);
    }

    let height = col.y.saturating_add(PAGE_MARGIN);
    Ok(DocumentLayout {
        nodes: col.nodes,
        anchors,
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_document_places_cover_toc_and_sections_in_order() {
        let reg = SectionRegistry::global();
        let layout = layout_document(reg, &ContentSource::builtin(), &Cover::default(), 800).unwrap();
        assert_eq!(layout.nodes[0].elem_type, ElementType::CoverMark);
        assert_eq!(layout.anchors.len(), 12);
        for pair in layout.anchors.windows(2) {
            assert!(pair[0].y < pair[1].y);
        }
        assert!(layout.height > layout.anchors[11].y);
        let tocs = layout
            .nodes
            .iter()
            .filter(|n| n.elem_type == ElementType::TocEntry)
            .count();
        assert_eq!(tocs, 12);
    }

    #[test]
    fn table_rows_join_cells() {
        let mut content = ContentSource::new();
        content.insert("components", "<table><tr><td>Mega</td><td>Controller</td></tr></table>");
        let layout = layout_document(SectionRegistry::global(), &content, &Cover::default(), 800).unwrap();
        let row = layout
            .nodes
            .iter()
            .find(|n| n.elem_type == ElementType::TableRow)
            .unwrap();
        assert_eq!(row.text, "Mega | Controller");
    }

    #[test]
    fn toc_panel_wraps_its_entries() {
        let layout = layout_document(SectionRegistry::global(), &ContentSource::new(), &Cover::default(), 600).unwrap();
        let panel = layout.nodes.iter().find(|n| n.elem_type == ElementType::Panel).unwrap();
        let last_entry = layout
            .nodes
            .iter()
            .filter(|n| n.elem_type == ElementType::TocEntry)
            .last()
            .unwrap();
        assert!(panel.lb.rect.bottom() > last_entry.lb.rect.bottom());
    }

    #[test]
    fn wrap_text_respects_line_length() {
        let lines = wrap_text("alpha beta gamma delta", 11);
        assert_eq!(lines, vec!["alpha beta", "gamma delta"]);
        assert!(wrap_text("   ", 10).is_empty());
    }

    #[test]
    fn image_size_comes_from_attributes() {
        let mut content = ContentSource::new();
        content.insert("power", r#"<img src="/diagram.png" width="200" height="50">"#);
        let layout = layout_document(SectionRegistry::global(), &content, &Cover::default(), 800).unwrap();
        let img = layout.nodes.iter().find(|n| n.elem_type == ElementType::Image).unwrap();
        assert_eq!(img.text, "/diagram.png");
        assert_eq!(img.lb.rect.width, 200);
        assert_eq!(img.lb.rect.height, 50);
    }

    #[test]
    fn oversized_image_height_is_clamped() {
        let mut content = ContentSource::new();
        content.insert("power", r#"<img src="/a.png" height="4294967290">"#);
        let layout = layout_document(SectionRegistry::global(), &content, &Cover::default(), 800).unwrap();
        let img = layout.nodes.iter().find(|n| n.elem_type == ElementType::Image).unwrap();
        assert_eq!(img.lb.rect.height, MAX_IMAGE_HEIGHT);
        assert!(layout.height > img.lb.rect.bottom() as u32);
        for pair in layout.anchors.windows(2) {
            assert!(pair[0].y < pair[1].y);
        }
    }
}
