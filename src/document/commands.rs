/*!
 * Editing commands over the document model.
 *
 * Every command takes the current document by reference and returns the
 * next version. A selection that names a block missing from the document is
 * a caller bug; commands log it and return the document unchanged in every
 * build profile.
 */

use log::warn;
use serde_json::{Map, Value};

use super::keys::{fresh_block_key, next_entity_key};
use super::model::{Block, BlockType, Document, Entity, EntityType, InlineStyle, InlineStyleRange, Mutability};

/// Placeholder text of atomic blocks, so the caret can land on them
pub const ATOMIC_PLACEHOLDER: &str = " ";

/// Deepest list nesting the editor allows
pub const MAX_LIST_DEPTH: u32 = 4;

/// Anchor/focus selection, in the same terms as the rich-text editor.
///
/// Anchor may come after focus (backwards selection).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub anchor_key: String,
    pub anchor_offset: usize,
    pub focus_key: String,
    pub focus_offset: usize,
}

impl Selection {
    pub fn new(
        anchor_key: impl Into<String>,
        anchor_offset: usize,
        focus_key: impl Into<String>,
        focus_offset: usize,
    ) -> Self {
        Self {
            anchor_key: anchor_key.into(),
            anchor_offset,
            focus_key: focus_key.into(),
            focus_offset,
        }
    }

    /// Caret at `offset` inside block `key`.
    pub fn collapsed(key: impl Into<String>, offset: usize) -> Self {
        let key = key.into();
        Self::new(key.clone(), offset, key, offset)
    }

    /// Whole text of one block.
    pub fn whole_block(block: &Block) -> Self {
        Self::new(block.key.clone(), 0, block.key.clone(), block.char_len())
    }

    /// Everything from the start of the first block to the end of the last.
    pub fn whole_document(document: &Document) -> Option<Self> {
        let first = document.blocks.first()?;
        let last = document.blocks.last()?;
        Some(Self::new(first.key.clone(), 0, last.key.clone(), last.char_len()))
    }

    /// Caret at the end of the last block.
    pub fn end_of(document: &Document) -> Option<Self> {
        let last = document.blocks.last()?;
        Some(Self::collapsed(last.key.clone(), last.char_len()))
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor_key == self.focus_key && self.anchor_offset == self.focus_offset
    }
}

/// Selection resolved to block indices in reading order
#[derive(Debug, Clone, Copy)]
struct SelectedRange {
    start_index: usize,
    start_offset: usize,
    end_index: usize,
    end_offset: usize,
}

impl SelectedRange {
    fn is_collapsed(&self) -> bool {
        self.start_index == self.end_index && self.start_offset == self.end_offset
    }
}

fn resolve(document: &Document, selection: &Selection) -> Option<SelectedRange> {
    let anchor = document.block_index(&selection.anchor_key)?;
    let focus = document.block_index(&selection.focus_key)?;

    let anchor_pos = (anchor, selection.anchor_offset.min(document.blocks[anchor].char_len()));
    let focus_pos = (focus, selection.focus_offset.min(document.blocks[focus].char_len()));
    let (start, end) = if anchor_pos <= focus_pos {
        (anchor_pos, focus_pos)
    } else {
        (focus_pos, anchor_pos)
    };

    Some(SelectedRange {
        start_index: start.0,
        start_offset: start.1,
        end_index: end.0,
        end_offset: end.1,
    })
}

fn resolve_or_warn(document: &Document, selection: &Selection, command: &str) -> Option<SelectedRange> {
    let resolved = resolve(document, selection);
    if resolved.is_none() {
        warn!(
            "Ignoring {} for selection on unknown block ({} / {})",
            command, selection.anchor_key, selection.focus_key
        );
    }
    resolved
}

/// Per-character flags telling whether `style` covers that character
fn style_mask(block: &Block, style: &InlineStyle) -> Vec<bool> {
    let len = block.char_len();
    let mut mask = vec![false; len];
    for range in block.inline_style_ranges.iter().filter(|r| &r.style == style) {
        let end = range.offset.saturating_add(range.length).min(len);
        for flag in mask.iter_mut().take(end).skip(range.offset) {
            *flag = true;
        }
    }
    mask
}

/// Replace all ranges of `style` with the minimal ranges covering `mask`
fn set_style_mask(block: &mut Block, style: &InlineStyle, mask: &[bool]) {
    block.inline_style_ranges.retain(|r| &r.style != style);

    let mut run_start: Option<usize> = None;
    for (i, styled) in mask.iter().copied().chain(std::iter::once(false)).enumerate() {
        match (styled, run_start) {
            (true, None) => run_start = Some(i),
            (false, Some(start)) => {
                block.inline_style_ranges.push(InlineStyleRange {
                    offset: start,
                    length: i - start,
                    style: style.clone(),
                });
                run_start = None;
            }
            _ => {}
        }
    }

    block.inline_style_ranges.sort_by_key(|r| r.offset);
}

impl Document {
    /// Toggle `style` over the selection.
    ///
    /// If every selected character already carries the style it is removed,
    /// otherwise it is applied to the whole selection. A collapsed selection
    /// changes nothing.
    pub fn apply_inline_style(&self, selection: &Selection, style: InlineStyle) -> Document {
        let Some(range) = resolve_or_warn(self, selection, "inline style") else {
            return self.clone();
        };
        if range.is_collapsed() {
            return self.clone();
        }

        let segments: Vec<(usize, usize, usize)> = (range.start_index..=range.end_index)
            .filter_map(|i| {
                let start = if i == range.start_index { range.start_offset } else { 0 };
                let end = if i == range.end_index {
                    range.end_offset
                } else {
                    self.blocks[i].char_len()
                };
                (start < end).then_some((i, start, end))
            })
            .collect();
        if segments.is_empty() {
            return self.clone();
        }

        let fully_styled = segments.iter().all(|&(i, start, end)| {
            style_mask(&self.blocks[i], &style)[start..end].iter().all(|styled| *styled)
        });

        let mut next = self.clone();
        for (i, start, end) in segments {
            let block = &mut next.blocks[i];
            let mut mask = style_mask(block, &style);
            mask[start..end].fill(!fully_styled);
            set_style_mask(block, &style, &mask);
        }
        next
    }

    /// Set the type of every block touched by the selection.
    ///
    /// A block has exactly one type, so a new alignment replaces a list type
    /// and the other way round. Depth is reset for non-list types.
    pub fn set_block_type(&self, selection: &Selection, block_type: BlockType) -> Document {
        let Some(range) = resolve_or_warn(self, selection, "block type") else {
            return self.clone();
        };

        let mut next = self.clone();
        for block in &mut next.blocks[range.start_index..=range.end_index] {
            block.block_type = block_type.clone();
            if !block_type.is_list() {
                block.depth = 0;
            }
        }
        next
    }

    /// Indent (positive delta) or outdent list items touched by the
    /// selection. Non-list blocks are left alone.
    pub fn adjust_list_depth(&self, selection: &Selection, delta: i32) -> Document {
        let Some(range) = resolve_or_warn(self, selection, "list depth") else {
            return self.clone();
        };

        let mut next = self.clone();
        for block in &mut next.blocks[range.start_index..=range.end_index] {
            if block.block_type.is_list() {
                let depth = (block.depth as i64 + delta as i64).clamp(0, MAX_LIST_DEPTH as i64);
                block.depth = depth as u32;
            }
        }
        next
    }

    /// Insert an atomic block right after the block where the selection
    /// ends. Its single entity range covers the placeholder text, which
    /// defaults to one space.
    ///
    /// An empty document accepts the block regardless of the selection.
    pub fn insert_atomic_block(
        &self,
        selection: &Selection,
        entity_key: &str,
        placeholder: Option<&str>,
    ) -> Document {
        if !self.entity_map.contains_key(entity_key) {
            warn!("Ignoring atomic block for unknown entity '{}'", entity_key);
            return self.clone();
        }

        let position = if self.blocks.is_empty() {
            0
        } else {
            match resolve_or_warn(self, selection, "atomic block") {
                Some(range) => range.end_index + 1,
                None => return self.clone(),
            }
        };

        let text = placeholder.filter(|p| !p.is_empty()).unwrap_or(ATOMIC_PLACEHOLDER);
        let block = Block::new(fresh_block_key(self), text, BlockType::Atomic)
            .with_entity(0, text.chars().count(), entity_key);

        let mut next = self.clone();
        next.blocks.insert(position, block);
        next
    }

    /// Store a new entity under a fresh key and return both the new
    /// document and the key.
    pub fn create_entity(
        &self,
        entity_type: EntityType,
        mutability: Mutability,
        data: Map<String, Value>,
    ) -> (Document, String) {
        let key = next_entity_key(self);
        let mut next = self.clone();
        next.entity_map.insert(
            key.clone(),
            Entity {
                entity_type,
                mutability,
                data,
            },
        );
        (next, key)
    }
}
