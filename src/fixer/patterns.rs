//! Numbered-section pattern predicates.
//!
//! These are the single source of truth for what counts as a numbered
//! section heading. The extraction service orders fragments primarily by
//! vertical position, so these patterns drive both the section-before-table
//! reordering and hierarchy-level assignment.

use regex::Regex;

/// Compiled numbered-section patterns.
#[derive(Debug)]
pub struct SectionPatterns {
    roman: Regex,
    arabic: Regex,
}

impl SectionPatterns {
    /// Compile the fixed pattern set: a Roman numeral followed by a period
    /// ("II.") or an Arabic numeral followed by a period ("1.").
    pub fn new() -> Self {
        Self {
            roman: Regex::new(r"^[IVX]+\.").unwrap(),
            arabic: Regex::new(r"^\d+\.").unwrap(),
        }
    }

    /// Whether the text leads with a numbered-section marker.
    pub fn is_numbered_section(&self, text: &str) -> bool {
        let text = text.trim_start();
        self.roman.is_match(text) || self.arabic.is_match(text)
    }

    /// Hierarchy level implied by the leading numbering style:
    /// Roman-numeral sections are level 2, Arabic-numeral sections level 3.
    /// Anything else carries no implied level.
    pub fn section_level(&self, text: &str) -> Option<u8> {
        let text = text.trim_start();
        if self.roman.is_match(text) {
            Some(2)
        } else if self.arabic.is_match(text) {
            Some(3)
        } else {
            None
        }
    }
}

impl Default for SectionPatterns {
    fn default() -> Self {
        Self::new()
    }
}
