use std::collections::HashSet;

use crate::catalog::Catalog;
use crate::detector::text_index::TextIndex;
use crate::types::TermDefinition;

/// One whole-word occurrence of a catalog term.
#[derive(Debug, Clone, PartialEq)]
pub struct TermMatch<'c> {
    pub definition: &'c TermDefinition,
    /// Half-open character range.
    pub start: usize,
    pub end: usize,
    /// Text as it appears in the script.
    pub matched_text: String,
}

/// Finds every whole-word, case-insensitive occurrence of every catalog term.
///
/// Output is ordered by catalog entry first, then by position within the text.
/// Matches of different terms over the same span are all kept.
pub fn find_matches<'c>(catalog: &'c Catalog, index: &TextIndex<'_>) -> Vec<TermMatch<'c>> {
    let text = index.text();
    let mut matches = Vec::new();
    // (lowercased term, start) already emitted
    let mut seen: HashSet<(String, usize)> = HashSet::new();

    for entry in catalog.entries() {
        let term_key = entry.definition.term.to_lowercase();
        for m in entry.pattern().find_iter(text) {
            let start = index.char_at_byte(m.start());
            if !seen.insert((term_key.clone(), start)) {
                continue;
            }
            matches.push(TermMatch {
                definition: &entry.definition,
                start,
                end: index.char_at_byte(m.end()),
                matched_text: m.as_str().to_string(),
            });
        }
    }

    matches
}

/// Convenience wrapper building the index for a one-off scan.
pub fn scan<'c>(catalog: &'c Catalog, text: &str) -> Vec<TermMatch<'c>> {
    find_matches(catalog, &TextIndex::new(text))
}
