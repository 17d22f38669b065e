//! Text with attached formatting spans.
//!
//! [`Str`] is what `Message.text` / `Message.caption` hold: the plain body
//! plus its position-ordered entity list.  All indexing is in UTF-16 code
//! units — the wire format's offset convention — never in bytes or chars.

use std::fmt;
use std::ops::{Deref, Range};

use crate::entities::MessageEntity;
use crate::parsers;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A string annotated with formatting-entity spans.
///
/// Constructed once during decode, immutable afterwards.  Derefs to `str`
/// for plain-text use; [`Str::markdown`] and [`Str::html`] re-serialize the
/// spans into the two markup dialects.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Str {
    text:     String,
    entities: Vec<MessageEntity>,
}

impl Str {
    /// Plain text with no spans.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), entities: Vec::new() }
    }

    /// Text with its span list (assumed position-ordered, as the decoder
    /// produces it).
    pub fn with_entities(text: impl Into<String>, entities: Vec<MessageEntity>) -> Self {
        Self { text: text.into(), entities }
    }

    /// The attached spans, in position order.
    pub fn entities(&self) -> &[MessageEntity] {
        &self.entities
    }

    /// Render with markdown delimiters.
    pub fn markdown(&self) -> String {
        parsers::generate_markdown(&self.text, &self.entities)
    }

    /// Render with HTML tags.
    pub fn html(&self) -> String {
        parsers::generate_html(&self.text, &self.entities)
    }

    /// Length in UTF-16 code units (the unit entity offsets count in).
    pub fn len_utf16(&self) -> usize {
        self.text.encode_utf16().count()
    }

    /// Sub-string by UTF-16 code-unit range.
    ///
    /// The range is clamped to the text; a cut through a surrogate pair
    /// replaces the orphaned half with U+FFFD rather than panicking.
    pub fn substr(&self, range: Range<usize>) -> String {
        let units: Vec<u16> = self.text.encode_utf16().collect();
        let start = range.start.min(units.len());
        let end   = range.end.min(units.len()).max(start);
        String::from_utf16_lossy(&units[start..end])
    }
}

impl Deref for Str {
    type Target = str;

    fn deref(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Str {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl PartialEq<str> for Str {
    fn eq(&self, other: &str) -> bool {
        self.text == other
    }
}

impl PartialEq<&str> for Str {
    fn eq(&self, other: &&str) -> bool {
        self.text == *other
    }
}

impl From<Str> for String {
    fn from(s: Str) -> String {
        s.text
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{MessageEntity, MessageEntityKind};

    #[test]
    fn utf16_length_counts_surrogate_pairs() {
        // '𝄞' is outside the BMP: one char, two UTF-16 code units.
        let s = Str::new("a𝄞b");
        assert_eq!(s.chars().count(), 3);
        assert_eq!(s.len_utf16(), 4);
    }

    #[test]
    fn substr_uses_utf16_units() {
        let s = Str::new("a𝄞b");
        assert_eq!(s.substr(0..1), "a");
        assert_eq!(s.substr(1..3), "𝄞");
        assert_eq!(s.substr(3..4), "b");
    }

    #[test]
    fn substr_clamps_out_of_range() {
        let s = Str::new("hi");
        assert_eq!(s.substr(0..10), "hi");
        assert_eq!(s.substr(5..9), "");
    }

    #[test]
    fn markdown_projection_keeps_span_boundaries() {
        let s = Str::with_entities(
            "hi #courier",
            vec![MessageEntity::plain(MessageEntityKind::Bold, 3, 8)],
        );
        assert_eq!(s.markdown(), "hi **#courier**");
    }

    #[test]
    fn derefs_to_str() {
        let s = Str::new("hello");
        assert!(s.starts_with("he"));
        assert_eq!(&s[..], "hello");
    }
}
