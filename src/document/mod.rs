/*!
 * Rich-text document model, editing commands and durable encoding.
 */

pub mod codec;
pub mod commands;
pub mod keys;
pub mod model;

pub use codec::{DecodeIssue, Decoded, SourceShape, decode, deserialize, serialize};
pub use commands::{ATOMIC_PLACEHOLDER, MAX_LIST_DEPTH, Selection};
pub use model::{
    Block, BlockCategory, BlockType, Dimension, Document, Entity, EntityRange, EntityType,
    ImageData, InlineStyle, InlineStyleRange, Mutability,
};
