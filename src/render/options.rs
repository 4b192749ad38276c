//! Rendering options.

/// Options for rendering reconstructed content to HTML.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Embed the stylesheet in the output document
    pub include_styles: bool,

    /// Emit a page-number separator after each page
    pub page_numbers: bool,

    /// Document title for the HTML head
    pub title: Option<String>,
}

impl RenderOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the embedded stylesheet.
    pub fn with_styles(mut self, include: bool) -> Self {
        self.include_styles = include;
        self
    }

    /// Enable or disable page-number separators.
    pub fn with_page_numbers(mut self, include: bool) -> Self {
        self.page_numbers = include;
        self
    }

    /// Set the document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            include_styles: true,
            page_numbers: true,
            title: None,
        }
    }
}
