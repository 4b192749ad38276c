//! Fragment types — the atomic unit of extracted page content.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Identifier assigned to a fragment by the extraction service.
///
/// Identifiers are optional on the wire. When absent, continuation matching
/// falls back to a synthesized positional identity (see
/// [`FragmentId::positional`]), so the ambiguity is visible in the type
/// rather than buried in a conditional.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FragmentId(pub String);

impl FragmentId {
    /// Create an identifier from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Synthesize an identifier from a fragment's page and order when the
    /// extraction service omitted one.
    ///
    /// This is the documented fallback-by-position rule: `page{N}_item{K}`.
    pub fn positional(page_num: u32, order: u32) -> Self {
        Self(format!("page{}_item{}", page_num, order))
    }

    /// Get the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FragmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FragmentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for FragmentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// The kind of content a fragment carries.
///
/// Closed variant set. Unknown kinds from upstream deserialize as
/// [`FragmentKind::Paragraph`], which is how the renderer treats anything it
/// does not recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentKind {
    /// A heading with an optional hierarchy level
    Header,
    /// A list; items are separated by embedded line breaks
    List,
    /// A table carrying serialized row/column markup
    Table,
    /// An image region with a description and optional resolved asset
    Image,
    /// A caption attached to a nearby table or image
    Caption,
    /// Running header repeated at the top of the page
    PageHeader,
    /// Running footer repeated at the bottom of the page
    PageFooter,
    /// Flowing body text (also the fallback for unrecognized kinds)
    #[serde(other)]
    Paragraph,
}

impl FragmentKind {
    /// Whether this kind carries free text (as opposed to markup or an asset).
    pub fn is_textual(&self) -> bool {
        !matches!(self, FragmentKind::Table | FragmentKind::Image)
    }

    fn default_kind() -> Self {
        FragmentKind::Paragraph
    }
}

/// A rectangle in page-relative percentage coordinates, all in [0, 100].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Left edge as a percentage of page width
    #[serde(default)]
    pub x_start: f32,
    /// Top edge as a percentage of page height
    #[serde(default)]
    pub y_start: f32,
    /// Right edge as a percentage of page width
    #[serde(default)]
    pub x_end: f32,
    /// Bottom edge as a percentage of page height
    #[serde(default)]
    pub y_end: f32,
}

impl Region {
    /// Create a region from its four edges.
    pub fn new(x_start: f32, y_start: f32, x_end: f32, y_end: f32) -> Self {
        Self {
            x_start,
            y_start,
            x_end,
            y_end,
        }
    }

    /// A region is degenerate when it is inverted, zero-area, or outside the
    /// percentage range. Position-dependent logic skips degenerate regions;
    /// the fragment itself is retained.
    pub fn is_degenerate(&self) -> bool {
        self.x_end <= self.x_start
            || self.y_end <= self.y_start
            || self.x_start < 0.0
            || self.y_start < 0.0
            || self.x_end > 100.0
            || self.y_end > 100.0
    }

    /// Height of the region in percentage points.
    pub fn height(&self) -> f32 {
        self.y_end - self.y_start
    }

    /// Vertical gap between this region's bottom edge and another region's
    /// top edge, as an absolute distance in percentage points.
    pub fn vertical_gap(&self, below: &Region) -> f32 {
        (below.y_start - self.y_end).abs()
    }
}

/// Horizontal alignment of a text fragment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Left alignment
    #[default]
    Left,
    /// Center alignment
    Center,
    /// Right alignment
    Right,
    /// Justified text
    Justify,
}

impl Alignment {
    /// CSS keyword for this alignment.
    pub fn as_css(&self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "justify",
        }
    }
}

/// Relative font-size class reported by the extraction service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSizeClass {
    /// Smaller than body text
    Small,
    /// Body text
    #[default]
    Normal,
    /// Larger than body text
    Large,
}

/// Cosmetic formatting flags. Never structural: the fixer and merger ignore
/// these entirely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Formatting {
    /// Bold text
    #[serde(default)]
    pub bold: bool,
    /// Italic text
    #[serde(default)]
    pub italic: bool,
    /// Underlined text
    #[serde(default)]
    pub underline: bool,
    /// Horizontal alignment
    #[serde(default)]
    pub alignment: Alignment,
    /// Relative font-size class
    #[serde(default)]
    pub size: FontSizeClass,
}

/// Kind-specific fragment attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FragmentMetadata {
    /// Header hierarchy level (1-6)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,

    /// Caption text for tables and images
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,

    /// Description of an image's visual content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Number of rows in a table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<usize>,

    /// Number of columns in a table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_count: Option<usize>,

    /// Column headers of a promoted key-value table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Vec<String>>,

    /// Whether this table was promoted from key-value text
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub converted_from_kv: bool,

    /// Original text preserved across a key-value promotion, so the
    /// transformation is auditable and reversible
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_text: Option<String>,

    /// Whether a list is ordered (numbered) rather than bulleted
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub list_ordered: bool,

    /// Which image on the page this is (1-indexed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_index: Option<usize>,

    /// Image classification (chart, diagram, photo, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_type: Option<String>,

    /// Whether the extraction service flagged this content as incomplete
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub partial_content: bool,
}

/// An atomic unit of extracted page content.
///
/// Fragments are created once by the extraction collaborator and flow through
/// the fixer, promoter, and merger stages as values: each stage returns new
/// fragments rather than mutating shared ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    /// Extraction-service identifier, used for continuation linking
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<FragmentId>,

    /// Reading-order hint. Advisory only: the renderer combines it with
    /// vertical position because the hint alone is occasionally wrong near
    /// page edges and columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,

    /// What kind of content this fragment carries
    #[serde(rename = "type", default = "FragmentKind::default_kind")]
    pub kind: FragmentKind,

    /// Textual content, or serialized table markup for tables
    #[serde(default)]
    pub content: String,

    /// Bounding rectangle in page-relative percentages
    #[serde(default)]
    pub position: Region,

    /// Cosmetic formatting flags
    #[serde(default)]
    pub formatting: Formatting,

    /// Kind-specific attributes
    #[serde(default)]
    pub metadata: FragmentMetadata,

    /// Whether this fragment continues content from a previous page
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub continuation: bool,

    /// Identifier of the fragment this one continues
    #[serde(
        rename = "continuation_of",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub continues_from: Option<FragmentId>,

    /// Whether this fragment's content continues on the next page
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub continues_next_page: bool,

    /// Resolved asset path for image fragments, filled during artifact
    /// linking. `None` renders as a described placeholder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<PathBuf>,

    /// Pages this fragment spans. Populated by the cross-page merger.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pages: Vec<u32>,
}

impl Fragment {
    /// Create a fragment of the given kind with content.
    pub fn new(kind: FragmentKind, content: impl Into<String>) -> Self {
        Self {
            id: None,
            order: None,
            kind,
            content: content.into(),
            position: Region::default(),
            formatting: Formatting::default(),
            metadata: FragmentMetadata::default(),
            continuation: false,
            continues_from: None,
            continues_next_page: false,
            image_path: None,
            pages: Vec::new(),
        }
    }

    /// Create a paragraph fragment.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new(FragmentKind::Paragraph, text)
    }

    /// Create a header fragment with a hierarchy level.
    pub fn header(text: impl Into<String>, level: u8) -> Self {
        let mut fragment = Self::new(FragmentKind::Header, text);
        fragment.metadata.level = Some(level);
        fragment
    }

    /// Create a table fragment from serialized markup.
    pub fn table(markup: impl Into<String>) -> Self {
        Self::new(FragmentKind::Table, markup)
    }

    /// Set the identifier and return self.
    pub fn with_id(mut self, id: impl Into<FragmentId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the order hint and return self.
    pub fn with_order(mut self, order: u32) -> Self {
        self.order = Some(order);
        self
    }

    /// Set the position and return self.
    pub fn with_position(mut self, position: Region) -> Self {
        self.position = position;
        self
    }

    /// Check if this fragment is a table.
    pub fn is_table(&self) -> bool {
        self.kind == FragmentKind::Table
    }

    /// The identity this fragment is registered under during cross-page
    /// merging: its own id, or the positional fallback.
    pub fn effective_id(&self, page_num: u32) -> FragmentId {
        self.id
            .clone()
            .unwrap_or_else(|| FragmentId::positional(page_num, self.order.unwrap_or(0)))
    }

    /// Sort key for reading-flow ordering: order hint first, vertical
    /// position second. Missing hints sort last.
    pub fn flow_key(&self) -> (u32, f32) {
        (self.order.unwrap_or(u32::MAX), self.position.y_start)
    }
}
