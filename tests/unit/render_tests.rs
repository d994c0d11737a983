/*!
 * Tests for HTML rendering and sanitization
 */

use ezhuthu::document::model::{Block, BlockType, Dimension, Document, Entity, ImageData, InlineStyle};
use ezhuthu::render::{HtmlRenderer, RenderOptions, render_html};

use crate::common::rich_document;

fn single(block: Block) -> Document {
    let mut doc = Document::new();
    doc.blocks.push(block);
    doc
}

#[test]
fn test_render_richDocument_shouldProduceExpectedMarkup() {
    let html = render_html(&rich_document());
    assert_eq!(
        html,
        concat!(
            "<p><strong>Monsoon</strong> <em>arrives</em></p>",
            "<ul><li>Umbrellas<ul><li>Boats</li></ul></li></ul>",
            "<div style=\"text-align: center;\">வணக்கம்</div>",
            "<figure><img src=\"https://cdn.example.com/rain.jpg\" width=\"640\" alt=\"\"></figure>",
        )
    );
}

#[test]
fn test_render_markupInText_shouldNeverBecomeTags() {
    let doc = single(
        Block::new("a", "<img src=x onerror=alert(1)>&", BlockType::Unstyled).with_style(0, 4, InlineStyle::Bold),
    );
    let html = render_html(&doc);
    assert_eq!(
        html,
        "<p><strong>&lt;img</strong> src=x onerror=alert(1)&gt;&amp;</p>"
    );
}

#[test]
fn test_render_orderedAfterUnordered_shouldStartNewList() {
    let mut doc = Document::new();
    doc.blocks.push(Block::new("a", "one", BlockType::UnorderedListItem));
    doc.blocks.push(Block::new("b", "two", BlockType::OrderedListItem));
    doc.blocks.push(Block::new("c", "three", BlockType::OrderedListItem));
    assert_eq!(
        render_html(&doc),
        "<ul><li>one</li></ul><ol><li>two</li><li>three</li></ol>"
    );
}

#[test]
fn test_render_dataImage_shouldBeDropped() {
    let mut doc = single(Block::new("a", " ", BlockType::Atomic).with_entity(0, 1, "0"));
    doc.entity_map.insert(
        "0".to_string(),
        Entity::new_image(ImageData::new(
            "data:text/html;base64,PHNjcmlwdD4=",
            Dimension::Auto,
            Dimension::Auto,
        )),
    );
    assert_eq!(render_html(&doc), "");
}

#[test]
fn test_render_relativeImage_shouldDependOnOptions() {
    let mut doc = single(Block::new("a", " ", BlockType::Atomic).with_entity(0, 1, "0"));
    doc.entity_map.insert(
        "0".to_string(),
        Entity::new_image(ImageData::new("/uploads/a.png", Dimension::Auto, Dimension::pixels(90))),
    );

    assert_eq!(
        render_html(&doc),
        "<figure><img src=\"/uploads/a.png\" height=\"90\" alt=\"\"></figure>"
    );

    let strict = HtmlRenderer::with_options(RenderOptions {
        allow_relative_images: false,
        ..RenderOptions::default()
    });
    assert_eq!(strict.render(&doc), "");
}

#[test]
fn test_render_tamilStyledRange_shouldSplitOnCodepoints() {
    let doc = single(
        Block::new("a", "வணக்கம் நண்பா", BlockType::AlignRight).with_style(8, 5, InlineStyle::Italic),
    );
    assert_eq!(
        render_html(&doc),
        "<div style=\"text-align: right;\">வணக்கம் <em>நண்பா</em></div>"
    );
}

#[test]
fn test_render_unknownStyle_shouldRenderPlainText() {
    let doc = single(
        Block::new("a", "plain", BlockType::Unstyled)
            .with_style(0, 5, InlineStyle::Other("UNDERLINE".to_string())),
    );
    assert_eq!(render_html(&doc), "<p>plain</p>");
}
