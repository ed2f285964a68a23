/// Maps between byte offsets (what `regex` reports) and character offsets
/// (what opportunities store).
pub struct TextIndex<'a> {
    text: &'a str,
    /// Byte offset of every char, ascending.
    char_starts: Vec<usize>,
}

impl<'a> TextIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            char_starts: text.char_indices().map(|(b, _)| b).collect(),
        }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn char_len(&self) -> usize {
        self.char_starts.len()
    }

    /// `byte` must lie on a char boundary. The end of the text maps to `char_len()`.
    pub fn char_at_byte(&self, byte: usize) -> usize {
        match self.char_starts.binary_search(&byte) {
            Ok(i) => i,
            Err(i) => i,
        }
    }

    /// Offsets at or past the end map to the text length in bytes.
    pub fn byte_at_char(&self, ch: usize) -> usize {
        self.char_starts.get(ch).copied().unwrap_or(self.text.len())
    }

    /// Substring over the half-open character range `[start, end)`.
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.text[self.byte_at_char(start)..self.byte_at_char(end)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_offsets_match_bytes() {
        let idx = TextIndex::new("hello");
        assert_eq!(idx.char_len(), 5);
        assert_eq!(idx.char_at_byte(3), 3);
        assert_eq!(idx.char_at_byte(5), 5);
        assert_eq!(idx.slice(1, 4), "ell");
    }

    #[test]
    fn multibyte_offsets() {
        // 'é' is two bytes
        let idx = TextIndex::new("café bar");
        assert_eq!(idx.char_len(), 8);
        assert_eq!(idx.char_at_byte(6), 5);
        assert_eq!(idx.byte_at_char(5), 6);
        assert_eq!(idx.slice(0, 4), "café");
        assert_eq!(idx.slice(5, 100), "bar");
    }
}
