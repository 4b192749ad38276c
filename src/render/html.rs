//! HTML flow rendering.
//!
//! Produces an order-preserving, reading-flow document from normalized
//! fragments: no absolute positioning, no geometric overlap. The ordering
//! key combines the extraction-service order hint (primary) with vertical
//! position (secondary) — the hint alone is occasionally wrong near page
//! edges and columns, position alone cannot disambiguate same-row
//! multi-column content. The sort is stable, so equal keys preserve input
//! order.

use crate::error::Result;
use crate::markup;
use crate::model::{Document, Formatting, Fragment, FragmentKind, MergedView, PageContent};

use super::RenderOptions;

/// Render one page to a complete HTML document.
pub fn to_page_html(page: &PageContent, options: &RenderOptions) -> Result<String> {
    let renderer = HtmlRenderer::new(options.clone());
    Ok(renderer.render_page_document(page))
}

/// Render a document's pages to a single flowing HTML document.
pub fn to_document_html(doc: &Document, options: &RenderOptions) -> Result<String> {
    let renderer = HtmlRenderer::new(options.clone());
    Ok(renderer.render_document(doc))
}

/// Render the cross-page merged view as one logical document, without page
/// boundaries.
pub fn to_merged_html(view: &MergedView, options: &RenderOptions) -> Result<String> {
    let renderer = HtmlRenderer::new(options.clone());
    Ok(renderer.render_merged(view))
}

/// HTML renderer for normalized fragment streams.
pub struct HtmlRenderer {
    options: RenderOptions,
}

impl HtmlRenderer {
    /// Create a renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Render a fragment sequence in reading-flow order.
    pub fn render_flow(&self, fragments: &[Fragment]) -> String {
        let mut ordered: Vec<&Fragment> = fragments.iter().collect();
        ordered.sort_by(|a, b| {
            a.flow_key()
                .partial_cmp(&b.flow_key())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        ordered
            .iter()
            .map(|fragment| self.render_fragment(fragment))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render_fragment(&self, fragment: &Fragment) -> String {
        match fragment.kind {
            FragmentKind::Header => self.render_header(fragment),
            FragmentKind::Paragraph => self.render_paragraph(fragment),
            FragmentKind::List => self.render_list(fragment),
            FragmentKind::Table => self.render_table(fragment),
            FragmentKind::Image => self.render_image(fragment),
            FragmentKind::Caption => self.render_caption(fragment),
            FragmentKind::PageHeader => {
                format!(
                    "<div class=\"page-running-header\">{}</div>",
                    formatted_text(&fragment.content, &fragment.formatting)
                )
            }
            FragmentKind::PageFooter => {
                format!(
                    "<div class=\"page-running-footer\">{}</div>",
                    formatted_text(&fragment.content, &fragment.formatting)
                )
            }
        }
    }

    fn render_header(&self, fragment: &Fragment) -> String {
        let level = fragment.metadata.level.unwrap_or(1).clamp(1, 6);
        format!(
            "<h{level} style=\"text-align: {};\">{}</h{level}>",
            fragment.formatting.alignment.as_css(),
            formatted_text(&fragment.content, &fragment.formatting),
        )
    }

    fn render_paragraph(&self, fragment: &Fragment) -> String {
        format!(
            "<p style=\"text-align: {};\">{}</p>",
            fragment.formatting.alignment.as_css(),
            formatted_text(&fragment.content, &fragment.formatting),
        )
    }

    fn render_list(&self, fragment: &Fragment) -> String {
        let tag = if fragment.metadata.list_ordered {
            "ol"
        } else {
            "ul"
        };

        let items: Vec<String> = fragment
            .content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| format!("<li>{}</li>", formatted_text(line, &fragment.formatting)))
            .collect();

        format!("<{tag}>\n{}\n</{tag}>", items.join("\n"))
    }

    fn render_table(&self, fragment: &Fragment) -> String {
        let mut parts = vec!["<div class=\"table-container\">".to_string()];
        if let Some(caption) = &fragment.metadata.caption {
            parts.push(format!(
                "<div class=\"table-caption\">{}</div>",
                markup::escape(caption)
            ));
        }
        parts.push(fragment.content.clone());
        parts.push("</div>".to_string());
        parts.join("\n")
    }

    /// Images render as an embedded reference when a resolved asset path
    /// exists, and otherwise as a placeholder carrying the extracted
    /// description. Visual content is never fabricated.
    fn render_image(&self, fragment: &Fragment) -> String {
        let description = fragment
            .metadata
            .description
            .as_deref()
            .unwrap_or("Image");

        let mut parts = vec!["<div class=\"image-container\">".to_string()];

        match &fragment.image_path {
            Some(path) => {
                parts.push(format!(
                    "<img src=\"{}\" alt=\"{}\">",
                    markup::escape(&path.to_string_lossy()),
                    markup::escape(description)
                ));
            }
            None => {
                parts.push("<div class=\"image-placeholder\" data-unresolved=\"true\">".into());
                parts.push(format!(
                    "<p class=\"image-description\">{}</p>",
                    markup::escape(description)
                ));
                parts.push("</div>".to_string());
            }
        }

        if let Some(caption) = &fragment.metadata.caption {
            parts.push(format!(
                "<p class=\"image-caption\">{}</p>",
                markup::escape(caption)
            ));
        }

        parts.push("</div>".to_string());
        parts.join("\n")
    }

    fn render_caption(&self, fragment: &Fragment) -> String {
        format!(
            "<p class=\"caption\">{}</p>",
            formatted_text(&fragment.content, &fragment.formatting)
        )
    }

    /// Render one page as a standalone HTML document.
    pub fn render_page_document(&self, page: &PageContent) -> String {
        let title = self
            .options
            .title
            .clone()
            .unwrap_or_else(|| format!("Page {}", page.page_num));
        let body = format!(
            "<div class=\"page\">\n{}\n</div>",
            self.render_flow(&page.fragments)
        );
        self.wrap_document(&title, &body, page.layout.columns)
    }

    /// Render all pages as one flowing document with page separators.
    pub fn render_document(&self, doc: &Document) -> String {
        let title = self
            .options
            .title
            .clone()
            .unwrap_or_else(|| "Document".to_string());

        let mut body_parts = Vec::new();
        for page in &doc.pages {
            let mut page_parts = vec![
                "<div class=\"page\">".to_string(),
                self.render_flow(&page.fragments),
            ];
            if self.options.page_numbers {
                page_parts.push(format!(
                    "<div class=\"page-number\">&mdash; {} &mdash;</div>",
                    page.page_num
                ));
            }
            page_parts.push("</div>".to_string());
            body_parts.push(page_parts.join("\n"));
        }

        let columns = doc.pages.first().map(|p| p.layout.columns).unwrap_or(1);
        self.wrap_document(&title, &body_parts.join("\n"), columns)
    }

    /// Render the merged view as a single logical document.
    pub fn render_merged(&self, view: &MergedView) -> String {
        let title = self
            .options
            .title
            .clone()
            .unwrap_or_else(|| "Document".to_string());
        let body = format!(
            "<div class=\"page\">\n{}\n</div>",
            self.render_flow(&view.items)
        );
        self.wrap_document(&title, &body, 1)
    }

    fn wrap_document(&self, title: &str, body: &str, columns: u8) -> String {
        let mut parts = vec![
            "<!DOCTYPE html>".to_string(),
            "<html lang=\"en\">".to_string(),
            "<head>".to_string(),
            "<meta charset=\"UTF-8\">".to_string(),
            "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">"
                .to_string(),
            format!("<title>{}</title>", markup::escape(title)),
        ];
        if self.options.include_styles {
            parts.push(stylesheet(columns));
        }
        parts.push("</head>".to_string());
        parts.push("<body>".to_string());
        parts.push(body.to_string());
        parts.push("</body>".to_string());
        parts.push("</html>".to_string());
        parts.join("\n")
    }
}

/// Escape text and apply cosmetic formatting.
///
/// Embedded newlines become explicit `<br>` breaks — exactly one per source
/// newline. Collapsing them into spaces would be a lossy, irreversible
/// transformation of the source record.
fn formatted_text(text: &str, formatting: &Formatting) -> String {
    let mut result = markup::escape(text).replace('\n', "<br>");

    if formatting.bold {
        result = format!("<strong>{}</strong>", result);
    }
    if formatting.italic {
        result = format!("<em>{}</em>", result);
    }
    if formatting.underline {
        result = format!("<u>{}</u>", result);
    }

    result
}

fn stylesheet(columns: u8) -> String {
    let column_rules = if columns > 1 {
        format!(
            "column-count: {};\n    column-gap: 0.5in;\n",
            columns
        )
    } else {
        String::new()
    };

    format!(
        r#"<style>
* {{ margin: 0; padding: 0; box-sizing: border-box; }}
body {{
    font-family: Georgia, 'Times New Roman', serif;
    background-color: #f5f5f5;
    padding: 20px;
    line-height: 1.8;
    color: #333;
}}
.page {{
    background-color: white;
    max-width: 8.5in;
    margin: 0 auto 3em;
    padding: 1in;
    box-shadow: 0 2px 15px rgba(0,0,0,0.1);
    page-break-after: always;
    {column_rules}}}
h1, h2, h3, h4, h5, h6 {{
    font-weight: bold;
    margin-top: 1.5em;
    margin-bottom: 0.75em;
    line-height: 1.3;
}}
p {{ margin-bottom: 1.2em; }}
ul, ol {{ margin-left: 2.5em; margin-bottom: 1.2em; }}
.table-container {{ margin: 2em 0; overflow-x: auto; break-inside: avoid; }}
.table-caption {{ font-weight: 600; text-align: center; margin-bottom: 0.75em; }}
table {{ border-collapse: collapse; width: 100%; font-size: 0.9em; }}
th, td {{ border: 1px solid #333; padding: 10px 14px; text-align: left; vertical-align: top; }}
th {{ background-color: #f8f8f8; font-weight: bold; }}
.image-container {{ margin: 2em 0; text-align: center; break-inside: avoid; }}
.image-placeholder {{
    background: #f0f0f0;
    border: 2px dashed #999;
    min-height: 250px;
    display: flex;
    align-items: center;
    justify-content: center;
    border-radius: 4px;
}}
.image-description {{ color: #666; font-style: italic; padding: 30px; }}
.image-caption {{ font-style: italic; font-size: 0.9em; color: #444; margin-top: 0.5em; }}
.caption {{ font-style: italic; font-size: 0.9em; color: #666; text-align: center; }}
.page-running-header, .page-running-footer {{ font-size: 0.85em; color: #999; }}
.page-number {{
    text-align: center;
    font-size: 0.85em;
    color: #999;
    margin-top: 1.5em;
    padding-top: 1em;
    border-top: 1px solid #e0e0e0;
}}
@media print {{
    body {{ background-color: white; padding: 0; }}
    .page {{ box-shadow: none; max-width: none; }}
}}
</style>"#
    )
}
