//! Per-page structural repairs.
//!
//! The extraction service orders fragments primarily by vertical position,
//! which produces two recurring defects this module repairs without touching
//! fragment content: tables extracted ahead of the section heading that
//! introduces them, and single tables split into adjacent fragments by the
//! service's output window. Header hierarchy levels are assigned on the same
//! pass.
//!
//! All three repairs are idempotent: running the fixer on already-fixed
//! output changes nothing.

mod patterns;

pub use patterns::SectionPatterns;

use crate::markup;
use crate::model::{Fragment, FragmentKind, PageContent};

/// Tunable repair policy.
///
/// The defaults mirror observed extractor behavior; neither constant is a
/// hard law.
#[derive(Debug, Clone)]
pub struct FixerOptions {
    /// How many fragments past a table to search for its section heading.
    /// Small by design: a bounded lookahead corrects common near-miss
    /// adjacency without claiming unrelated downstream headers.
    pub section_lookahead: usize,

    /// Maximum vertical gap, in percentage points of page height, between
    /// two adjacent tables for them to be treated as one split table.
    pub table_merge_gap: f32,
}

impl FixerOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the section lookahead window.
    pub fn with_lookahead(mut self, lookahead: usize) -> Self {
        self.section_lookahead = lookahead;
        self
    }

    /// Set the table merge gap threshold.
    pub fn with_merge_gap(mut self, gap: f32) -> Self {
        self.table_merge_gap = gap;
        self
    }
}

impl Default for FixerOptions {
    fn default() -> Self {
        Self {
            section_lookahead: 2,
            table_merge_gap: 5.0,
        }
    }
}

/// Repairs ordering and structural defects in a single page's fragments.
pub struct StructureFixer {
    options: FixerOptions,
    patterns: SectionPatterns,
}

impl StructureFixer {
    /// Create a fixer with default options.
    pub fn new() -> Self {
        Self::with_options(FixerOptions::default())
    }

    /// Create a fixer with custom options.
    pub fn with_options(options: FixerOptions) -> Self {
        Self {
            options,
            patterns: SectionPatterns::new(),
        }
    }

    /// Apply all repairs to a page, in order: section-table reordering,
    /// header hierarchy, split-table merging. Returns a new page.
    pub fn fix_page(&self, page: &PageContent) -> PageContent {
        let fragments = self.fix_section_table_order(&page.fragments);
        let fragments = self.fix_header_hierarchy(&fragments);
        let fragments = self.merge_split_tables(&fragments);
        page.with_fragments(fragments)
    }

    /// Move a numbered-section heading found shortly after a table to sit
    /// before it.
    ///
    /// For each table, the next `section_lookahead` fragments are searched
    /// for a header or paragraph leading with a numbered-section marker. On a
    /// match the local window is reordered: heading first, then any
    /// fragments that sat between the table and the heading, then the table.
    /// Nothing is dropped or duplicated. A table already introduced by a
    /// numbered-section fragment is left alone, which is what makes the
    /// repair idempotent.
    ///
    /// When two tables appear consecutively with the heading only after the
    /// second, the first table's window claims the heading; this is a known
    /// heuristic limitation.
    pub fn fix_section_table_order(&self, fragments: &[Fragment]) -> Vec<Fragment> {
        if fragments.len() < 2 {
            return fragments.to_vec();
        }

        let mut fixed = Vec::with_capacity(fragments.len());
        let mut i = 0;

        while i < fragments.len() {
            let current = &fragments[i];

            if current.is_table() && !self.preceded_by_section(&fixed) {
                let window_end = (i + 1 + self.options.section_lookahead).min(fragments.len());
                let heading_idx = (i + 1..window_end).find(|&j| {
                    matches!(
                        fragments[j].kind,
                        FragmentKind::Header | FragmentKind::Paragraph
                    ) && self.patterns.is_numbered_section(&fragments[j].content)
                });

                if let Some(j) = heading_idx {
                    log::debug!(
                        "moving section heading {:?} before table at index {}",
                        fragments[j].content.lines().next().unwrap_or(""),
                        i
                    );
                    fixed.push(fragments[j].clone());
                    fixed.extend(fragments[i + 1..j].iter().cloned());
                    fixed.push(current.clone());
                    i = j + 1;
                    continue;
                }
            }

            fixed.push(current.clone());
            i += 1;
        }

        fixed
    }

    fn preceded_by_section(&self, fixed: &[Fragment]) -> bool {
        fixed.last().is_some_and(|prev| {
            matches!(prev.kind, FragmentKind::Header | FragmentKind::Paragraph)
                && self.patterns.is_numbered_section(&prev.content)
        })
    }

    /// Assign header hierarchy levels from leading numbering style.
    ///
    /// Roman-numeral sections become level 2, Arabic-numeral sections level
    /// 3; anything else keeps its existing level or defaults to 1. A pure
    /// function of the leading text, independent of position.
    pub fn fix_header_hierarchy(&self, fragments: &[Fragment]) -> Vec<Fragment> {
        fragments
            .iter()
            .map(|fragment| {
                if fragment.kind != FragmentKind::Header {
                    return fragment.clone();
                }
                let mut fixed = fragment.clone();
                fixed.metadata.level = self
                    .patterns
                    .section_level(&fixed.content)
                    .or(fixed.metadata.level)
                    .or(Some(1));
                fixed
            })
            .collect()
    }

    /// Merge tables the extraction service split across its output window.
    ///
    /// Adjacent table fragments whose vertical gap is below
    /// `table_merge_gap` are combined: the first markup loses its closing
    /// tag, the second contributes its body, and the merged bottom edge is
    /// the second table's. A run of close tables collapses in a single pass,
    /// so re-running finds no adjacent pair within the threshold. Degenerate
    /// positions skip the merge; the fragments are kept as they are.
    pub fn merge_split_tables(&self, fragments: &[Fragment]) -> Vec<Fragment> {
        let mut fixed: Vec<Fragment> = Vec::with_capacity(fragments.len());

        for fragment in fragments {
            let mergeable = match fixed.last() {
                Some(prev) => {
                    prev.is_table()
                        && fragment.is_table()
                        && !prev.position.is_degenerate()
                        && !fragment.position.is_degenerate()
                        && prev.position.vertical_gap(&fragment.position)
                            < self.options.table_merge_gap
                }
                None => false,
            };

            if mergeable {
                let prev = fixed.last_mut().unwrap();
                log::debug!(
                    "merging split tables at y_end {:.1} / y_start {:.1}",
                    prev.position.y_end,
                    fragment.position.y_start
                );
                prev.content = format!(
                    "{}{}",
                    markup::strip_closing_table(&prev.content),
                    markup::continuation_body(&fragment.content)
                );
                prev.position.y_end = fragment.position.y_end;
                prev.metadata.row_count =
                    match (prev.metadata.row_count, fragment.metadata.row_count) {
                        (Some(a), Some(b)) => Some(a + b),
                        _ => None,
                    };
                prev.continues_next_page = fragment.continues_next_page;
            } else {
                fixed.push(fragment.clone());
            }
        }

        fixed
    }
}

impl Default for StructureFixer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Region;

    fn table_at(y_start: f32, y_end: f32, rows: &str) -> Fragment {
        Fragment::table(format!("<table><tbody>{}</tbody></table>", rows))
            .with_position(Region::new(5.0, y_start, 95.0, y_end))
    }

    #[test]
    fn test_section_moved_before_table() {
        let fixer = StructureFixer::new();
        let fragments = vec![
            Fragment::header("Title", 1),
            table_at(15.0, 35.0, "<tr><td>a</td></tr>"),
            Fragment::header("II. MINERAL OWNERSHIP:", 1),
        ];

        let fixed = fixer.fix_section_table_order(&fragments);
        assert_eq!(fixed.len(), 3);
        assert_eq!(fixed[0].content, "Title");
        assert_eq!(fixed[1].content, "II. MINERAL OWNERSHIP:");
        assert!(fixed[2].is_table());
    }

    #[test]
    fn test_in_between_fragments_relocated_not_dropped() {
        let fixer = StructureFixer::new();
        let fragments = vec![
            table_at(10.0, 30.0, "<tr><td>a</td></tr>"),
            Fragment::paragraph("stray caption"),
            Fragment::header("1. Overview", 1),
        ];

        let fixed = fixer.fix_section_table_order(&fragments);
        assert_eq!(fixed.len(), 3);
        assert_eq!(fixed[0].content, "1. Overview");
        assert_eq!(fixed[1].content, "stray caption");
        assert!(fixed[2].is_table());
    }

    #[test]
    fn test_heading_outside_window_left_alone() {
        let fixer = StructureFixer::new();
        let fragments = vec![
            table_at(10.0, 30.0, "<tr><td>a</td></tr>"),
            Fragment::paragraph("one"),
            Fragment::paragraph("two"),
            Fragment::header("II. TOO FAR:", 1),
        ];

        let fixed = fixer.fix_section_table_order(&fragments);
        assert!(fixed[0].is_table());
        assert_eq!(fixed[3].content, "II. TOO FAR:");
    }

    #[test]
    fn test_reorder_is_idempotent() {
        let fixer = StructureFixer::new();
        let fragments = vec![
            Fragment::header("Title", 1),
            table_at(15.0, 35.0, "<tr><td>a</td></tr>"),
            Fragment::header("II. MINERAL OWNERSHIP:", 1),
            Fragment::header("III. BASE LEASES:", 1),
        ];

        let once = fixer.fix_section_table_order(&fragments);
        let twice = fixer.fix_section_table_order(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_hierarchy_levels() {
        let fixer = StructureFixer::new();
        let fragments = vec![
            Fragment::header("I. INTRODUCTION", 1),
            Fragment::header("1. Overview", 1),
            Fragment::new(FragmentKind::Header, "Unnumbered"),
        ];

        let fixed = fixer.fix_header_hierarchy(&fragments);
        assert_eq!(fixed[0].metadata.level, Some(2));
        assert_eq!(fixed[1].metadata.level, Some(3));
        assert_eq!(fixed[2].metadata.level, Some(1));
    }

    #[test]
    fn test_hierarchy_keeps_existing_level() {
        let fixer = StructureFixer::new();
        let fragments = vec![Fragment::header("Appendix", 4)];
        let fixed = fixer.fix_header_hierarchy(&fragments);
        assert_eq!(fixed[0].metadata.level, Some(4));
    }

    #[test]
    fn test_split_tables_merge_within_gap() {
        let fixer = StructureFixer::new();
        let fragments = vec![
            table_at(10.0, 40.0, "<tr><td>1</td></tr>"),
            table_at(43.0, 60.0, "<tr><td>2</td></tr>"),
        ];

        let fixed = fixer.merge_split_tables(&fragments);
        assert_eq!(fixed.len(), 1);
        assert_eq!(markup::count_rows(&fixed[0].content), 2);
        assert!((fixed[0].position.y_end - 60.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_distant_tables_not_merged() {
        let fixer = StructureFixer::new();
        let fragments = vec![
            table_at(10.0, 30.0, "<tr><td>1</td></tr>"),
            table_at(50.0, 70.0, "<tr><td>2</td></tr>"),
        ];

        let fixed = fixer.merge_split_tables(&fragments);
        assert_eq!(fixed.len(), 2);
    }

    #[test]
    fn test_degenerate_positions_skip_merge() {
        let fixer = StructureFixer::new();
        let fragments = vec![
            Fragment::table("<table><tbody><tr><td>1</td></tr></tbody></table>"),
            Fragment::table("<table><tbody><tr><td>2</td></tr></tbody></table>"),
        ];

        let fixed = fixer.merge_split_tables(&fragments);
        assert_eq!(fixed.len(), 2);
    }

    #[test]
    fn test_table_run_collapses_in_one_pass() {
        let fixer = StructureFixer::new();
        let fragments = vec![
            table_at(10.0, 30.0, "<tr><td>1</td></tr>"),
            table_at(32.0, 50.0, "<tr><td>2</td></tr>"),
            table_at(53.0, 70.0, "<tr><td>3</td></tr>"),
        ];

        let once = fixer.merge_split_tables(&fragments);
        assert_eq!(once.len(), 1);
        assert_eq!(markup::count_rows(&once[0].content), 3);

        let twice = fixer.merge_split_tables(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_fix_page_idempotent() {
        let fixer = StructureFixer::new();
        let page = PageContent::new(
            2,
            vec![
                Fragment::header("Title", 1),
                table_at(15.0, 35.0, "<tr><td>a</td></tr>"),
                Fragment::header("II. MINERAL OWNERSHIP:", 1),
                table_at(40.0, 55.0, "<tr><td>b</td></tr>"),
                table_at(58.0, 70.0, "<tr><td>c</td></tr>"),
            ],
        );

        let once = fixer.fix_page(&page);
        let twice = fixer.fix_page(&once);
        assert_eq!(once.fragments, twice.fragments);
    }
}
