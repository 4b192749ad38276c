//! Data model for extracted document content.
//!
//! Fragments are the atomic unit; pages group fragments with layout hints;
//! documents group pages and optionally carry the cross-page merged view.

mod document;
mod fragment;
mod page;

pub use document::{Document, DocumentSummary, MergedView, PageSummary};
pub use fragment::{
    Alignment, FontSizeClass, Formatting, Fragment, FragmentId, FragmentKind, FragmentMetadata,
    Region,
};
pub use page::{LayoutHints, PageContent};
