/*!
 * Tests for the document model and editing commands
 */

use ezhuthu::document::model::{Block, BlockType, Dimension, Document, EntityType, ImageData, InlineStyle, Mutability};
use ezhuthu::document::codec::deserialize;
use ezhuthu::document::{ATOMIC_PLACEHOLDER, Selection};

use crate::common::rich_document;

#[test]
fn test_commands_shouldNotMutateInput() {
    let original = rich_document();
    let snapshot = original.clone();

    let _ = original.apply_inline_style(&Selection::new("li1", 0, "li1", 9), InlineStyle::Bold);
    let _ = original.set_block_type(&Selection::collapsed("intro", 0), BlockType::AlignRight);
    let _ = original.adjust_list_depth(&Selection::collapsed("li1", 0), 1);

    assert_eq!(original, snapshot);
}

#[test]
fn test_applyInlineStyle_twice_shouldRestoreOriginalRanges() {
    let doc = rich_document();
    let selection = Selection::new("li1", 2, "li2", 3);
    let once = doc.apply_inline_style(&selection, InlineStyle::Italic);
    let twice = once.apply_inline_style(&selection, InlineStyle::Italic);

    assert_ne!(once, doc);
    assert_eq!(twice, doc);
}

#[test]
fn test_applyInlineStyle_adjacentRanges_shouldMerge() {
    let mut doc = Document::new();
    doc.blocks.push(Block::new("k", "abcdef", BlockType::Unstyled));
    let doc = doc
        .apply_inline_style(&Selection::new("k", 0, "k", 3), InlineStyle::Bold)
        .apply_inline_style(&Selection::new("k", 3, "k", 6), InlineStyle::Bold);

    assert_eq!(doc.blocks[0].inline_style_ranges.len(), 1);
    assert_eq!(doc.blocks[0].inline_style_ranges[0].length, 6);
}

#[test]
fn test_applyInlineStyle_tamilText_shouldCountCodepoints() {
    let mut doc = Document::new();
    doc.blocks.push(Block::new("t", "வணக்கம் நண்பா", BlockType::Unstyled));
    let styled = doc.apply_inline_style(&Selection::new("t", 0, "t", 7), InlineStyle::Bold);

    let range = &styled.blocks[0].inline_style_ranges[0];
    let covered: String = styled.blocks[0].text.chars().skip(range.offset).take(range.length).collect();
    assert_eq!(covered, "வணக்கம்");
}

#[test]
fn test_setBlockType_unknownSelection_shouldReturnSameDocument() {
    let doc = rich_document();
    let next = doc.set_block_type(&Selection::new("ghost", 0, "intro", 0), BlockType::OrderedListItem);
    assert_eq!(next, doc);
}

#[test]
fn test_createEntity_shouldAllocateUnusedKeys() {
    let doc = rich_document();
    let image = ImageData::new("https://cdn.example.com/b.png", Dimension::Auto, Dimension::Auto);
    let (doc, first) = doc.create_entity(EntityType::Image, Mutability::Immutable, image.to_data());
    let (doc, second) = doc.create_entity(EntityType::Image, Mutability::Immutable, image.to_data());

    assert_eq!(first, "1");
    assert_eq!(second, "2");
    assert_eq!(doc.entity_map.len(), 3);
}

#[test]
fn test_createEntity_afterMaximalStoredKey_shouldNotOverflow() {
    let raw = r#"{"blocks":[{"key":"a","text":" ","type":"atomic","entityRanges":[{"offset":0,"length":1,"key":18446744073709551615}]}],"entityMap":{"18446744073709551615":{"type":"IMAGE","mutability":"IMMUTABLE","data":{"src":"a.png"}}}}"#;
    let doc = deserialize(raw);
    assert!(doc.is_well_formed());

    let image = ImageData::new("https://cdn.example.com/b.png", Dimension::Auto, Dimension::Auto);
    let (doc, key) = doc.create_entity(EntityType::Image, Mutability::Immutable, image.to_data());
    assert_eq!(key, "0");
    assert_eq!(doc.entity_map.len(), 2);

    let next = doc.insert_atomic_block(&Selection::collapsed("a", 0), &key, None);
    assert!(next.is_well_formed());
    assert_eq!(next.blocks.len(), 2);
}

#[test]
fn test_applyInlineStyle_maximalStoredRange_shouldNotOverflow() {
    let mut doc = Document::new();
    doc.blocks
        .push(Block::new("a", "abcd", BlockType::Unstyled).with_style(2, usize::MAX, InlineStyle::Bold));

    let next = doc.apply_inline_style(&Selection::new("a", 0, "a", 2), InlineStyle::Bold);
    assert_eq!(next.blocks[0].inline_style_ranges.len(), 1);
    assert_eq!(next.blocks[0].inline_style_ranges[0].offset, 0);
    assert_eq!(next.blocks[0].inline_style_ranges[0].length, 4);
    assert!(next.is_well_formed());
}

#[test]
fn test_insertAtomicBlock_shouldUseFreshKeyAfterSelectionEnd() {
    let doc = rich_document();
    let image = ImageData::new("https://cdn.example.com/b.png", Dimension::pixels(10), Dimension::pixels(20));
    let (doc, key) = doc.create_entity(EntityType::Image, Mutability::Immutable, image.to_data());

    let next = doc.insert_atomic_block(&Selection::new("intro", 0, "li1", 2), &key, None);
    assert_eq!(next.blocks.len(), doc.blocks.len() + 1);
    assert_eq!(next.blocks[2].block_type, BlockType::Atomic);
    assert_eq!(next.blocks[2].text, ATOMIC_PLACEHOLDER);
    assert!(doc.block(&next.blocks[2].key).is_none());
    assert!(next.is_well_formed());
}

#[test]
fn test_excerpt_shouldSkipAtomicPlaceholders() {
    let excerpt = rich_document().excerpt(200).unwrap();
    assert_eq!(excerpt, "Monsoon arrives Umbrellas Boats வணக்கம்");
}
