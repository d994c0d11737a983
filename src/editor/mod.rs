/*!
 * Editing sessions over stored content.
 */

pub mod controller;

pub use controller::EditorController;
