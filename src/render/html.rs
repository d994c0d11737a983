/*!
 * HTML rendering of documents for read-only display.
 *
 * The output is inserted into pages as trusted markup, so this renderer is
 * the sanitization boundary: it only emits tags and attributes it builds
 * itself from the typed model. Block text is always escaped, and image
 * sources are limited to web URLs.
 */

use log::warn;
use std::collections::BTreeSet;
use url::{ParseError, Url};

use crate::document::model::{Block, BlockType, Dimension, Document, EntityType, ImageData, InlineStyle};

/// Rendering options
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// URL schemes allowed for image sources
    pub image_schemes: Vec<String>,

    /// Whether relative image URLs (same-origin uploads) are allowed
    pub allow_relative_images: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            image_schemes: vec!["http".to_string(), "https".to_string()],
            allow_relative_images: true,
        }
    }
}

/// Renders documents to sanitized HTML
#[derive(Debug, Clone, Default)]
pub struct HtmlRenderer {
    options: RenderOptions,
}

/// A list element left open while consecutive list items are rendered
struct OpenList {
    tag: &'static str,
    depth: u32,
    item_open: bool,
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Render a whole document. An empty document renders to an empty string.
    pub fn render(&self, document: &Document) -> String {
        let mut out = String::new();
        let mut lists: Vec<OpenList> = Vec::new();

        for block in &document.blocks {
            let list_tag = match block.block_type {
                BlockType::UnorderedListItem => Some("ul"),
                BlockType::OrderedListItem => Some("ol"),
                _ => None,
            };

            match list_tag {
                Some(tag) => {
                    open_list_item(&mut out, &mut lists, tag, block.depth);
                    self.render_inline(block, document, &mut out);
                }
                None => {
                    while !lists.is_empty() {
                        close_list(&mut out, &mut lists);
                    }
                    self.render_block(block, document, &mut out);
                }
            }
        }

        while !lists.is_empty() {
            close_list(&mut out, &mut lists);
        }
        out
    }

    fn render_block(&self, block: &Block, document: &Document, out: &mut String) {
        if block.block_type == BlockType::Atomic {
            self.render_atomic(block, document, out);
            return;
        }

        let (open, close) = match block.block_type.text_align() {
            Some(align) => (format!("<div style=\"text-align: {};\">", align), "</div>"),
            None => ("<p>".to_string(), "</p>"),
        };

        out.push_str(&open);
        if block.text.is_empty() {
            out.push_str("<br>");
        } else {
            self.render_inline(block, document, out);
        }
        out.push_str(close);
    }

    fn render_atomic(&self, block: &Block, document: &Document, out: &mut String) {
        let image = block
            .entity_ranges
            .iter()
            .filter_map(|r| document.entity(&r.key))
            .find_map(|e| e.image());

        if let Some(img) = image.and_then(|i| self.image_tag(&i)) {
            out.push_str("<figure>");
            out.push_str(&img);
            out.push_str("</figure>");
        } else if !block.text.trim().is_empty() {
            out.push_str("<p>");
            push_escaped_text(out, &block.text);
            out.push_str("</p>");
        }
    }

    /// Render block text with style and entity ranges in one pass over the
    /// range boundaries, so emitted tags always nest properly.
    fn render_inline(&self, block: &Block, document: &Document, out: &mut String) {
        let chars: Vec<char> = block.text.chars().collect();
        let len = chars.len();

        let mut bounds: BTreeSet<usize> = BTreeSet::new();
        bounds.insert(0);
        bounds.insert(len);
        for r in &block.inline_style_ranges {
            bounds.insert(r.offset.min(len));
            bounds.insert(r.offset.saturating_add(r.length).min(len));
        }
        for r in &block.entity_ranges {
            bounds.insert(r.offset.min(len));
            bounds.insert(r.offset.saturating_add(r.length).min(len));
        }
        let bounds: Vec<usize> = bounds.into_iter().collect();

        let mut open: Vec<&'static str> = Vec::new();
        for window in bounds.windows(2) {
            let (start, end) = (window[0], window[1]);
            if start == end {
                continue;
            }

            let image_range = block.entity_ranges.iter().find(|r| {
                r.offset <= start
                    && start < r.offset.saturating_add(r.length)
                    && document
                        .entity(&r.key)
                        .is_some_and(|e| e.entity_type == EntityType::Image)
            });
            if let Some(range) = image_range {
                // The image replaces its placeholder text
                if range.offset == start {
                    let tag = document
                        .entity(&range.key)
                        .and_then(|e| e.image())
                        .and_then(|i| self.image_tag(&i));
                    if let Some(tag) = tag {
                        out.push_str(&tag);
                    }
                }
                continue;
            }

            let wanted = styles_at(block, start);
            let common = open
                .iter()
                .zip(wanted.iter())
                .take_while(|(a, b)| a == b)
                .count();
            while open.len() > common {
                if let Some(tag) = open.pop() {
                    out.push_str("</");
                    out.push_str(tag);
                    out.push('>');
                }
            }
            for &tag in &wanted[common..] {
                out.push('<');
                out.push_str(tag);
                out.push('>');
                open.push(tag);
            }

            let segment: String = chars[start..end].iter().collect();
            push_escaped_text(out, &segment);
        }

        while let Some(tag) = open.pop() {
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
    }

    fn image_tag(&self, image: &ImageData) -> Option<String> {
        let Some(src) = self.sanitize_url(&image.src) else {
            warn!("Dropping image with disallowed source: {}", image.src);
            return None;
        };

        let mut tag = String::from("<img src=\"");
        push_escaped_attr(&mut tag, &src);
        tag.push('"');
        if let Dimension::Pixels(width) = &image.width {
            tag.push_str(&format!(" width=\"{}\"", width));
        }
        if let Dimension::Pixels(height) = &image.height {
            tag.push_str(&format!(" height=\"{}\"", height));
        }
        tag.push_str(" alt=\"\">");
        Some(tag)
    }

    /// Allow web URLs and, when enabled, relative URLs. Everything else
    /// (`javascript:`, `data:` and friends) is refused.
    fn sanitize_url(&self, raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        match Url::parse(trimmed) {
            Ok(url) => self
                .options
                .image_schemes
                .iter()
                .any(|s| s == url.scheme())
                .then(|| url.to_string()),
            Err(ParseError::RelativeUrlWithoutBase) if self.options.allow_relative_images => {
                Some(trimmed.to_string())
            }
            Err(_) => None,
        }
    }
}

/// Render with default options.
pub fn render_html(document: &Document) -> String {
    HtmlRenderer::new().render(document)
}

/// Inline tags active at a character position, outermost first
fn styles_at(block: &Block, position: usize) -> Vec<&'static str> {
    let covers = |style: &InlineStyle| {
        block
            .inline_style_ranges
            .iter()
            .any(|r| &r.style == style && r.offset <= position && position < r.offset.saturating_add(r.length))
    };

    let mut tags = Vec::new();
    if covers(&InlineStyle::Bold) {
        tags.push("strong");
    }
    if covers(&InlineStyle::Italic) {
        tags.push("em");
    }
    tags
}

fn open_list_item(out: &mut String, lists: &mut Vec<OpenList>, tag: &'static str, depth: u32) {
    while let Some(top) = lists.last() {
        if top.depth > depth || (top.depth == depth && top.tag != tag) {
            close_list(out, lists);
        } else {
            break;
        }
    }

    let same_list = lists.last().is_some_and(|top| top.depth == depth);
    if same_list {
        if let Some(top) = lists.last_mut() {
            if top.item_open {
                out.push_str("</li>");
                top.item_open = false;
            }
        }
    } else {
        // A deeper list nests inside the parent's open item
        out.push('<');
        out.push_str(tag);
        out.push('>');
        lists.push(OpenList {
            tag,
            depth,
            item_open: false,
        });
    }

    out.push_str("<li>");
    if let Some(top) = lists.last_mut() {
        top.item_open = true;
    }
}

fn close_list(out: &mut String, lists: &mut Vec<OpenList>) {
    if let Some(list) = lists.pop() {
        if list.item_open {
            out.push_str("</li>");
        }
        out.push_str("</");
        out.push_str(list.tag);
        out.push('>');
    }
}

/// Escape text for element content and quoted attribute values. Soft line
/// breaks become `<br>`.
fn push_escaped_text(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '\n' => out.push_str("<br>"),
            '\r' => {}
            c => push_escaped_char(out, c),
        }
    }
}

/// Attribute values keep line breaks as character references
fn push_escaped_attr(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            c => push_escaped_char(out, c),
        }
    }
}

fn push_escaped_char(out: &mut String, c: char) {
    match c {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        '\'' => out.push_str("&#39;"),
        _ => out.push(c),
    }
}
