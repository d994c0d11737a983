/*!
 * Bilingual content records and their publication workflow.
 */

pub mod record;
pub mod workflow;

pub use record::{
    ContentRecord, ContentStatus, ContentUpdate, DisplayContent, NewContent, Slot, resolve_display,
};
