/*!
 * Core document model types for rich-text content.
 *
 * The JSON shape of these types is the raw rich-text editor format stored in
 * content records: `{"blocks": [...], "entityMap": {...}}`. Offsets and
 * lengths of ranges count Unicode scalar values, not bytes.
 */

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::{BTreeMap, HashSet};

/// Complete rich-text document: ordered blocks plus the entities they embed.
///
/// Documents are treated as values. Editing commands in
/// `document::commands` return a new document instead of mutating in place.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    /// Blocks in reading order
    pub blocks: Vec<Block>,

    /// Entities referenced from block entity ranges, by entity key
    #[serde(rename = "entityMap", default)]
    pub entity_map: BTreeMap<String, Entity>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap raw text into a single unstyled block without interpreting it.
    pub fn from_plain_text(text: &str) -> Self {
        let key = super::keys::generate_key(|_| false);
        Self {
            blocks: vec![Block::new(key, text, BlockType::Unstyled)],
            entity_map: BTreeMap::new(),
        }
    }

    /// True when the document has no blocks at all.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Position of a block in reading order.
    pub fn block_index(&self, key: &str) -> Option<usize> {
        self.blocks.iter().position(|b| b.key == key)
    }

    /// Look up a block by key.
    pub fn block(&self, key: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.key == key)
    }

    /// Look up an entity by key.
    pub fn entity(&self, key: &str) -> Option<&Entity> {
        self.entity_map.get(key)
    }

    /// All block keys currently in use.
    pub fn block_keys(&self) -> HashSet<&str> {
        self.blocks.iter().map(|b| b.key.as_str()).collect()
    }

    /// Text of every non-empty block joined with newlines.
    ///
    /// Styles and entities are dropped; atomic placeholder text is blank and
    /// therefore skipped.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .filter(|b| !b.text.trim().is_empty())
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Short single-line preview of the document, at most `max_chars`
    /// characters, used for listing cards.
    pub fn excerpt(&self, max_chars: usize) -> Option<String> {
        let normalized = self
            .plain_text()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        if normalized.is_empty() {
            return None;
        }

        if normalized.chars().count() <= max_chars {
            return Some(normalized);
        }

        let mut cut: String = normalized.chars().take(max_chars).collect();
        // Prefer ending on a word boundary when one is close
        if let Some(space) = cut.rfind(' ') {
            if space > cut.len() / 2 {
                cut.truncate(space);
            }
        }
        cut.push('…');
        Some(cut)
    }

    /// First image entity in reading order, if any.
    pub fn first_image(&self) -> Option<ImageData> {
        self.blocks
            .iter()
            .flat_map(|b| b.entity_ranges.iter())
            .filter_map(|r| self.entity_map.get(&r.key))
            .find_map(|e| e.image())
    }

    /// Check the document invariants: unique non-empty block keys and
    /// non-empty ranges that stay inside their block text, with every entity
    /// range resolvable. Exactly the documents that survive a round trip
    /// through the codec unchanged.
    pub fn is_well_formed(&self) -> bool {
        let mut seen = HashSet::new();
        self.blocks.iter().all(|block| {
            let len = block.char_len();
            let fits = |offset: usize, length: usize| length > 0 && offset.saturating_add(length) <= len;
            !block.key.is_empty()
                && seen.insert(block.key.as_str())
                && block
                    .entity_ranges
                    .iter()
                    .all(|r| self.entity_map.contains_key(&r.key) && fits(r.offset, r.length))
                && block.inline_style_ranges.iter().all(|r| fits(r.offset, r.length))
        })
    }
}

/// One paragraph, list item or embedded object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Unique key within the document
    pub key: String,

    /// Block text
    #[serde(default)]
    pub text: String,

    /// Block type
    #[serde(rename = "type", default)]
    pub block_type: BlockType,

    /// List nesting level, meaningful for list items only
    #[serde(default)]
    pub depth: u32,

    /// Inline style ranges
    #[serde(default)]
    pub inline_style_ranges: Vec<InlineStyleRange>,

    /// Entity ranges
    #[serde(default)]
    pub entity_ranges: Vec<EntityRange>,

    /// Free-form block metadata, preserved as-is
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl Block {
    /// Create an unstyled-range block with the given key, text and type.
    pub fn new(key: impl Into<String>, text: impl Into<String>, block_type: BlockType) -> Self {
        Self {
            key: key.into(),
            text: text.into(),
            block_type,
            depth: 0,
            inline_style_ranges: Vec::new(),
            entity_ranges: Vec::new(),
            data: Map::new(),
        }
    }

    /// Add an inline style range.
    pub fn with_style(mut self, offset: usize, length: usize, style: InlineStyle) -> Self {
        self.inline_style_ranges.push(InlineStyleRange { offset, length, style });
        self
    }

    /// Add an entity range.
    pub fn with_entity(mut self, offset: usize, length: usize, key: impl Into<String>) -> Self {
        self.entity_ranges.push(EntityRange {
            offset,
            length,
            key: key.into(),
        });
        self
    }

    /// Set the list depth.
    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    /// Length of the text in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Block type. Unknown stored types are preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BlockType {
    #[default]
    Unstyled,
    UnorderedListItem,
    OrderedListItem,
    AlignLeft,
    AlignCenter,
    AlignRight,
    AlignJustify,
    Atomic,
    Other(String),
}

/// Mutually exclusive groups of block types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockCategory {
    Text,
    List,
    Alignment,
    Atomic,
}

impl BlockType {
    /// Stored name of the block type.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Unstyled => "unstyled",
            Self::UnorderedListItem => "unordered-list-item",
            Self::OrderedListItem => "ordered-list-item",
            Self::AlignLeft => "left",
            Self::AlignCenter => "center",
            Self::AlignRight => "right",
            Self::AlignJustify => "justify",
            Self::Atomic => "atomic",
            Self::Other(name) => name.as_str(),
        }
    }

    pub fn category(&self) -> BlockCategory {
        match self {
            Self::UnorderedListItem | Self::OrderedListItem => BlockCategory::List,
            Self::AlignLeft | Self::AlignCenter | Self::AlignRight | Self::AlignJustify => {
                BlockCategory::Alignment
            }
            Self::Atomic => BlockCategory::Atomic,
            Self::Unstyled | Self::Other(_) => BlockCategory::Text,
        }
    }

    pub fn is_list(&self) -> bool {
        self.category() == BlockCategory::List
    }

    /// CSS `text-align` value for alignment block types.
    pub fn text_align(&self) -> Option<&'static str> {
        match self {
            Self::AlignLeft => Some("left"),
            Self::AlignCenter => Some("center"),
            Self::AlignRight => Some("right"),
            Self::AlignJustify => Some("justify"),
            _ => None,
        }
    }
}

impl From<String> for BlockType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "unstyled" => Self::Unstyled,
            "unordered-list-item" => Self::UnorderedListItem,
            "ordered-list-item" => Self::OrderedListItem,
            "left" => Self::AlignLeft,
            "center" => Self::AlignCenter,
            "right" => Self::AlignRight,
            "justify" => Self::AlignJustify,
            "atomic" => Self::Atomic,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for BlockType {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<BlockType> for String {
    fn from(value: BlockType) -> Self {
        value.as_str().to_string()
    }
}

/// Inline style tag. Unknown stored styles are preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InlineStyle {
    Bold,
    Italic,
    Other(String),
}

impl InlineStyle {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Bold => "BOLD",
            Self::Italic => "ITALIC",
            Self::Other(name) => name.as_str(),
        }
    }
}

impl From<String> for InlineStyle {
    fn from(value: String) -> Self {
        match value.as_str() {
            "BOLD" => Self::Bold,
            "ITALIC" => Self::Italic,
            _ => Self::Other(value),
        }
    }
}

impl From<InlineStyle> for String {
    fn from(value: InlineStyle) -> Self {
        value.as_str().to_string()
    }
}

/// `(offset, length, style)` triple over a block's text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineStyleRange {
    pub offset: usize,
    pub length: usize,
    pub style: InlineStyle,
}

/// `(offset, length, key)` triple referencing the entity map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRange {
    pub offset: usize,
    pub length: usize,
    #[serde(with = "entity_key")]
    pub key: String,
}

/// Entity keys are numbers in the raw editor format but strings in the
/// entity map. Accept both on input; write numeric keys back as numbers.
mod entity_key {
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S: Serializer>(key: &str, serializer: S) -> Result<S::Ok, S::Error> {
        match key.parse::<u64>() {
            Ok(number) if number.to_string() == key => serializer.serialize_u64(number),
            _ => serializer.serialize_str(key),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        struct KeyVisitor;

        impl Visitor<'_> for KeyVisitor {
            type Value = String;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an entity key as string or integer")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
                Ok(v.to_string())
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
                Ok(v.to_string())
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
                Ok(v.to_string())
            }
        }

        deserializer.deserialize_any(KeyVisitor)
    }
}

/// Non-text object embedded in a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(rename = "type")]
    pub entity_type: EntityType,

    #[serde(default)]
    pub mutability: Mutability,

    /// Type-specific payload, preserved as-is
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl Entity {
    /// Typed payload of an `IMAGE` entity.
    pub fn image(&self) -> Option<ImageData> {
        if self.entity_type != EntityType::Image {
            return None;
        }
        ImageData::from_data(&self.data)
    }

    /// Create an immutable image entity.
    pub fn new_image(data: ImageData) -> Self {
        Self {
            entity_type: EntityType::Image,
            mutability: Mutability::Immutable,
            data: data.to_data(),
        }
    }
}

/// Entity type. Only images are produced by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityType {
    Image,
    Other(String),
}

impl EntityType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Image => "IMAGE",
            Self::Other(name) => name.as_str(),
        }
    }
}

impl From<String> for EntityType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "IMAGE" | "image" => Self::Image,
            _ => Self::Other(value),
        }
    }
}

impl From<EntityType> for String {
    fn from(value: EntityType) -> Self {
        value.as_str().to_string()
    }
}

/// Entity mutability as understood by the rich-text editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mutability {
    Mutable,
    #[default]
    Immutable,
    Segmented,
}

/// Width or height of an embedded image
#[derive(Debug, Clone, PartialEq)]
pub enum Dimension {
    /// Size in CSS pixels
    Pixels(Number),
    /// Let the browser compute the size
    Auto,
}

impl Dimension {
    pub fn pixels(value: u32) -> Self {
        Self::Pixels(Number::from(value))
    }

    fn from_value(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Number(n)) => Self::Pixels(n.clone()),
            // Numeric strings show up in older records
            Some(Value::String(s)) => s
                .trim()
                .parse::<u64>()
                .map(|n| Self::Pixels(Number::from(n)))
                .unwrap_or(Self::Auto),
            _ => Self::Auto,
        }
    }

    fn to_value(&self) -> Value {
        match self {
            Self::Pixels(n) => Value::Number(n.clone()),
            Self::Auto => Value::String("auto".to_string()),
        }
    }
}

/// Typed view of an image entity payload
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    pub src: String,
    pub width: Dimension,
    pub height: Dimension,
}

impl ImageData {
    pub fn new(src: impl Into<String>, width: Dimension, height: Dimension) -> Self {
        Self {
            src: src.into(),
            width,
            height,
        }
    }

    /// Read an image payload; `None` when `src` is missing.
    pub fn from_data(data: &Map<String, Value>) -> Option<Self> {
        let src = data.get("src")?.as_str()?.to_string();
        Some(Self {
            src,
            width: Dimension::from_value(data.get("width")),
            height: Dimension::from_value(data.get("height")),
        })
    }

    pub fn to_data(&self) -> Map<String, Value> {
        let mut data = Map::new();
        data.insert("src".to_string(), Value::String(self.src.clone()));
        data.insert("width".to_string(), self.width.to_value());
        data.insert("height".to_string(), self.height.to_value());
        data
    }
}
