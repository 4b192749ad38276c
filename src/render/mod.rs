//! Rendering of normalized fragment streams to flowing HTML.

mod html;
mod options;

pub use html::{to_document_html, to_merged_html, to_page_html, HtmlRenderer};
pub use options::RenderOptions;
