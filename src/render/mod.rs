/*!
 * Read-only rendering of documents.
 */

pub mod html;

pub use html::{HtmlRenderer, RenderOptions, render_html};
