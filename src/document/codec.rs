/*!
 * Durable string form of documents.
 *
 * Writing always produces a single JSON encoding. Reading is forgiving:
 * stored values may be legacy plain text, a JSON document, or a JSON string
 * holding a JSON document (double-encoded by older writers). Reading never
 * fails; content that cannot be understood is shown as plain text.
 */

use log::{debug, error, info, warn};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};

use super::keys::generate_key;
use super::model::{
    Block, BlockType, Document, Entity, EntityRange, EntityType, InlineStyle, InlineStyleRange,
    Mutability,
};

/// How the stored value was interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceShape {
    /// Blank input, wrapped as one unstyled block like any other text
    Empty,
    /// Not JSON-shaped, wrapped as one unstyled block
    PlainText,
    /// A JSON document
    Json,
    /// A JSON string literal containing the document
    DoubleEncoded,
    /// Looked like JSON but could not be read; wrapped as plain text
    Fallback,
}

/// Something the decoder had to work around. None of these are errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeIssue {
    /// The value could not be read as a document and is shown as raw text
    ParseFallback { reason: String },
    /// The document was repaired to satisfy the model invariants
    ValidationHealed { detail: String },
}

/// Result of decoding a stored value
#[derive(Debug, Clone)]
pub struct Decoded {
    pub document: Document,
    pub shape: SourceShape,
    pub issues: Vec<DecodeIssue>,
}

impl Decoded {
    fn clean(document: Document, shape: SourceShape) -> Self {
        Self {
            document,
            shape,
            issues: Vec::new(),
        }
    }

    /// True when the value was shown as raw text after a failed parse.
    pub fn fell_back(&self) -> bool {
        self.issues
            .iter()
            .any(|i| matches!(i, DecodeIssue::ParseFallback { .. }))
    }

    /// True when any repair was applied.
    pub fn healed(&self) -> bool {
        self.issues
            .iter()
            .any(|i| matches!(i, DecodeIssue::ValidationHealed { .. }))
    }
}

/// Encode a document for storage. Always a single JSON encoding.
pub fn serialize(document: &Document) -> String {
    match serde_json::to_string(document) {
        Ok(json) => json,
        Err(e) => {
            // Only string map keys and plain values are involved, so this
            // is unreachable in practice
            error!("Failed to serialize document: {}", e);
            String::from(r#"{"blocks":[],"entityMap":{}}"#)
        }
    }
}

/// Decode a stored value into a document. Never fails.
pub fn deserialize(raw: &str) -> Document {
    decode(raw).document
}

/// Decode a stored value, reporting how it was read and what was repaired.
pub fn decode(raw: &str) -> Decoded {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Decoded::clean(Document::from_plain_text(raw), SourceShape::Empty);
    }

    // A double-encoded document starts with a quote rather than a brace
    if !trimmed.starts_with('{') && !trimmed.starts_with('"') {
        return Decoded::clean(Document::from_plain_text(raw), SourceShape::PlainText);
    }

    let value = match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => value,
        Err(e) => return fallback(raw, format!("invalid JSON: {}", e)),
    };

    let (value, shape) = match value {
        Value::String(inner) => match serde_json::from_str::<Value>(inner.trim()) {
            // Still a string after one unwrap: that string is the text
            Ok(Value::String(text)) => {
                return Decoded::clean(Document::from_plain_text(&text), SourceShape::PlainText);
            }
            Ok(value) => (value, SourceShape::DoubleEncoded),
            Err(e) => return fallback(raw, format!("invalid JSON inside string: {}", e)),
        },
        value => (value, SourceShape::Json),
    };

    let Value::Object(map) = value else {
        return fallback(raw, "JSON value is not an object".to_string());
    };
    let Some(Value::Array(blocks)) = map.get("blocks") else {
        return fallback(raw, "object has no blocks array".to_string());
    };

    if shape == SourceShape::DoubleEncoded {
        debug!("Unwrapped double-encoded document");
    }

    let mut issues = Vec::new();
    let entity_map = read_entity_map(map.get("entityMap"), &mut issues);
    let blocks = blocks
        .iter()
        .enumerate()
        .filter_map(|(index, value)| read_block(index, value, &mut issues))
        .collect();

    let mut document = Document { blocks, entity_map };
    heal(&mut document, &mut issues);

    if !issues.is_empty() {
        info!("Repaired stored document ({} fixes)", issues.len());
    }

    Decoded {
        document,
        shape,
        issues,
    }
}

fn fallback(raw: &str, reason: String) -> Decoded {
    warn!("Showing stored content as plain text: {}", reason);
    Decoded {
        document: Document::from_plain_text(raw),
        shape: SourceShape::Fallback,
        issues: vec![DecodeIssue::ParseFallback { reason }],
    }
}

fn healed(issues: &mut Vec<DecodeIssue>, detail: String) {
    debug!("Healed document: {}", detail);
    issues.push(DecodeIssue::ValidationHealed { detail });
}

fn read_entity_map(value: Option<&Value>, issues: &mut Vec<DecodeIssue>) -> BTreeMap<String, Entity> {
    let mut entities = BTreeMap::new();
    let Some(value) = value else {
        return entities;
    };
    let Some(map) = value.as_object() else {
        healed(issues, "entityMap is not an object".to_string());
        return entities;
    };

    for (key, value) in map {
        match read_entity(value) {
            Some(entity) => {
                entities.insert(key.clone(), entity);
            }
            None => healed(issues, format!("dropped unreadable entity '{}'", key)),
        }
    }
    entities
}

fn read_entity(value: &Value) -> Option<Entity> {
    let object = value.as_object()?;
    let entity_type = EntityType::from(object.get("type")?.as_str()?.to_string());
    let mutability = object
        .get("mutability")
        .and_then(|m| serde_json::from_value::<Mutability>(m.clone()).ok())
        .unwrap_or_default();
    let data = object
        .get("data")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    Some(Entity {
        entity_type,
        mutability,
        data,
    })
}

fn read_block(index: usize, value: &Value, issues: &mut Vec<DecodeIssue>) -> Option<Block> {
    let Some(object) = value.as_object() else {
        healed(issues, format!("dropped block #{} that is not an object", index));
        return None;
    };

    let key = match object.get("key") {
        Some(Value::String(key)) => key.clone(),
        Some(Value::Number(key)) => key.to_string(),
        _ => String::new(),
    };
    let text = object
        .get("text")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let block_type = object
        .get("type")
        .and_then(Value::as_str)
        .map(BlockType::from)
        .unwrap_or_default();
    let depth = object
        .get("depth")
        .and_then(Value::as_u64)
        .map(|d| d.min(u32::MAX as u64) as u32)
        .unwrap_or(0);
    let data = object
        .get("data")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_else(Map::new);

    let mut block = Block {
        key,
        text,
        block_type,
        depth,
        inline_style_ranges: Vec::new(),
        entity_ranges: Vec::new(),
        data,
    };

    if let Some(ranges) = object.get("inlineStyleRanges").and_then(Value::as_array) {
        for range in ranges {
            let parsed = range.as_object().and_then(|r| {
                Some(InlineStyleRange {
                    offset: r.get("offset")?.as_u64()? as usize,
                    length: r.get("length")?.as_u64()? as usize,
                    style: InlineStyle::from(r.get("style")?.as_str()?.to_string()),
                })
            });
            match parsed {
                Some(range) => block.inline_style_ranges.push(range),
                None => healed(issues, format!("dropped unreadable style range in block #{}", index)),
            }
        }
    }

    if let Some(ranges) = object.get("entityRanges").and_then(Value::as_array) {
        for range in ranges {
            let parsed = range.as_object().and_then(|r| {
                let key = match r.get("key")? {
                    Value::String(key) => key.clone(),
                    Value::Number(key) => key.to_string(),
                    _ => return None,
                };
                Some(EntityRange {
                    offset: r.get("offset")?.as_u64()? as usize,
                    length: r.get("length")?.as_u64()? as usize,
                    key,
                })
            });
            match parsed {
                Some(range) => block.entity_ranges.push(range),
                None => healed(issues, format!("dropped unreadable entity range in block #{}", index)),
            }
        }
    }

    Some(block)
}

/// Bring a freshly read document in line with the model invariants.
fn heal(document: &mut Document, issues: &mut Vec<DecodeIssue>) {
    let mut seen: HashSet<String> = HashSet::new();
    let all_keys: HashSet<String> = document.blocks.iter().map(|b| b.key.clone()).collect();

    for block in &mut document.blocks {
        if block.key.is_empty() || seen.contains(&block.key) {
            let fresh = generate_key(|k| seen.contains(k) || all_keys.contains(k));
            if block.key.is_empty() {
                healed(issues, format!("assigned key '{}' to block without key", fresh));
            } else {
                healed(issues, format!("rebound duplicate block key '{}' to '{}'", block.key, fresh));
            }
            block.key = fresh;
        }
        seen.insert(block.key.clone());

        let len = block.char_len();
        let block_key = block.key.clone();

        let before = block.entity_ranges.len();
        block
            .entity_ranges
            .retain(|r| document.entity_map.contains_key(&r.key));
        if block.entity_ranges.len() != before {
            healed(
                issues,
                format!("dropped entity ranges with unknown keys in block '{}'", block_key),
            );
        }

        let mut clamped = false;
        block.inline_style_ranges.retain_mut(|r| clamp_range(&mut r.offset, &mut r.length, len, &mut clamped));
        block.entity_ranges.retain_mut(|r| clamp_range(&mut r.offset, &mut r.length, len, &mut clamped));
        if clamped {
            healed(issues, format!("clamped ranges outside the text of block '{}'", block_key));
        }
    }
}

/// Clamp a range to `len`; returns false when nothing of it remains.
fn clamp_range(offset: &mut usize, length: &mut usize, len: usize, clamped: &mut bool) -> bool {
    if *length == 0 || *offset >= len {
        *clamped = true;
        return false;
    }
    if offset.saturating_add(*length) > len {
        *length = len - *offset;
        *clamped = true;
    }
    true
}
