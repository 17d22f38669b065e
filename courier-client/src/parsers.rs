//! Text formatting parsers: HTML and Markdown ↔ [`MessageEntity`] spans.
//!
//! # Markdown (platform-flavoured)
//! Supported: `**bold**`, `__italic__`, `~~strike~~`, `||spoiler||`, `` `code` ``,
//! ` ```lang\npre``` `, `[text](url)`, `[text](tg://user?id=123)`
//!
//! # HTML
//! Supported tags: `<b>`, `<strong>`, `<i>`, `<em>`, `<u>`, `<s>`, `<del>`,
//! `<code>`, `<pre>`, `<blockquote>`, `<tg-spoiler>`, `<a href="url">`,
//! `<tg-emoji emoji-id="id">text</tg-emoji>`
//!
//! All span arithmetic is in UTF-16 code units, matching the wire format.

use crate::entities::{MessageEntity, MessageEntityKind};

// ─── Markdown ─────────────────────────────────────────────────────────────────

/// Parse platform-flavoured markdown into (plain_text, entities).
pub fn parse_markdown(text: &str) -> (String, Vec<MessageEntity>) {
    let mut out  = String::with_capacity(text.len());
    let mut ents = Vec::new();
    let chars: Vec<char> = text.chars().collect();
    let n = chars.len();
    let mut i = 0;

    // Stack of open tags: (kind, utf16 start offset).
    let mut open_stack: Vec<(MarkdownTag, i32)> = Vec::new();

    // Current output utf-16 offset
    let mut utf16_off: i32 = 0;

    macro_rules! push_char {
        ($c:expr) => {{
            let c: char = $c;
            out.push(c);
            utf16_off += c.len_utf16() as i32;
        }};
    }

    while i < n {
        // ── code block ```lang\n...``` ──────────────────────────────────────
        if i + 2 < n && chars[i] == '`' && chars[i+1] == '`' && chars[i+2] == '`' {
            let start = i + 3;
            let mut j = start;
            while j + 2 < n {
                if chars[j] == '`' && chars[j+1] == '`' && chars[j+2] == '`' { break; }
                j += 1;
            }
            if j + 2 < n {
                // extract optional lang on first line
                let block: String = chars[start..j].iter().collect();
                let (lang, code) = if let Some(nl) = block.find('\n') {
                    (block[..nl].trim().to_string(), block[nl+1..].to_string())
                } else {
                    (String::new(), block)
                };
                let code_off = utf16_off;
                let code_utf16: i32 = code.encode_utf16().count() as i32;
                let mut ent = MessageEntity::plain(MessageEntityKind::Pre, code_off, code_utf16);
                if !lang.is_empty() { ent.language = Some(lang); }
                ents.push(ent);
                for c in code.chars() { push_char!(c); }
                i = j + 3;
                continue;
            }
        }

        // ── inline code ─────────────────────────────────────────────────────
        if chars[i] == '`' {
            let start = i + 1;
            let mut j = start;
            while j < n && chars[j] != '`' { j += 1; }
            if j < n {
                let code: String = chars[start..j].iter().collect();
                let code_off = utf16_off;
                let code_utf16: i32 = code.encode_utf16().count() as i32;
                ents.push(MessageEntity::plain(MessageEntityKind::Code, code_off, code_utf16));
                for c in code.chars() { push_char!(c); }
                i = j + 1;
                continue;
            }
        }

        // ── [text](url) ─────────────────────────────────────────────────────
        if chars[i] == '[' {
            let text_start = i + 1;
            let mut j = text_start;
            let mut depth = 1i32;
            while j < n {
                if chars[j] == '[' { depth += 1; }
                if chars[j] == ']' { depth -= 1; if depth == 0 { break; } }
                j += 1;
            }
            if j < n && j + 1 < n && chars[j+1] == '(' {
                let link_start = j + 2;
                let mut k = link_start;
                while k < n && chars[k] != ')' { k += 1; }
                if k < n {
                    let inner_text: String = chars[text_start..j].iter().collect();
                    let url: String = chars[link_start..k].iter().collect();
                    const MENTION_PFX: &str = "tg://user?id=";
                    let ent_off = utf16_off;
                    for c in inner_text.chars() { push_char!(c); }
                    let ent_len = utf16_off - ent_off;
                    if let Some(id_str) = url.strip_prefix(MENTION_PFX) {
                        if id_str.parse::<i64>().is_ok() {
                            // Domain mention spans carry the resolved user,
                            // which a parser cannot supply; keep the link.
                            let mut ent = MessageEntity::plain(MessageEntityKind::TextLink, ent_off, ent_len);
                            ent.url = Some(url);
                            ents.push(ent);
                        }
                    } else {
                        let mut ent = MessageEntity::plain(MessageEntityKind::TextLink, ent_off, ent_len);
                        ent.url = Some(url);
                        ents.push(ent);
                    }
                    i = k + 1;
                    continue;
                }
            }
        }

        // ── two-char delimiters ──────────────────────────────────────────────
        let two: Option<MarkdownTag> = if i + 1 < n {
            match [chars[i], chars[i+1]] {
                ['*','*'] => Some(MarkdownTag::Bold),
                ['_','_'] => Some(MarkdownTag::Italic),
                ['~','~'] => Some(MarkdownTag::Strike),
                ['|','|'] => Some(MarkdownTag::Spoiler),
                _ => None,
            }
        } else { None };

        if let Some(tag) = two {
            // check if closing
            if let Some(pos) = open_stack.iter().rposition(|(t, _)| *t == tag) {
                let (_, start_off) = open_stack.remove(pos);
                let length = utf16_off - start_off;
                let kind = match tag {
                    MarkdownTag::Bold    => MessageEntityKind::Bold,
                    MarkdownTag::Italic  => MessageEntityKind::Italic,
                    MarkdownTag::Strike  => MessageEntityKind::Strikethrough,
                    MarkdownTag::Spoiler => MessageEntityKind::Spoiler,
                };
                if length > 0 {
                    ents.push(MessageEntity::plain(kind, start_off, length));
                }
            } else {
                open_stack.push((tag, utf16_off));
            }
            i += 2;
            continue;
        }

        // ── regular character ────────────────────────────────────────────────
        push_char!(chars[i]);
        i += 1;
    }

    (out, ents)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MarkdownTag { Bold, Italic, Strike, Spoiler }

/// Generate markdown from plain text + entities.
pub fn generate_markdown(text: &str, entities: &[MessageEntity]) -> String {
    use MessageEntityKind as K;

    // (utf16_pos, is_open, fragment); closes sort before opens at the same
    // position so adjacent link spans do not interleave.
    let mut markers: Vec<(i32, bool, String)> = Vec::new();

    for ent in entities {
        let (open, close): (String, String) = match ent.kind {
            K::Bold          => ("**".into(), "**".into()),
            K::Italic        => ("__".into(), "__".into()),
            K::Strikethrough => ("~~".into(), "~~".into()),
            K::Spoiler       => ("||".into(), "||".into()),
            K::Code          => ("`".into(), "`".into()),
            K::Pre => {
                let lang = ent.language.as_deref().unwrap_or("");
                (format!("```{lang}\n"), "```".into())
            }
            K::TextLink => match &ent.url {
                Some(url) => ("[".into(), format!("]({url})")),
                None      => continue,
            },
            K::TextMention => match &ent.user {
                Some(u) => ("[".into(), format!("](tg://user?id={})", u.id)),
                None    => continue,
            },
            _ => continue,
        };
        markers.push((ent.offset, true,  open));
        markers.push((ent.end(),  false, close));
    }
    markers.sort_by(|(a_pos, a_open, _), (b_pos, b_open, _)| {
        a_pos.cmp(b_pos).then_with(|| a_open.cmp(b_open))
    });

    // Insert markers at utf-16 positions
    let mut result = String::with_capacity(text.len() + markers.iter().map(|(_, _, s)| s.len()).sum::<usize>());
    let mut marker_idx = 0;
    let mut utf16_pos: i32 = 0;

    for ch in text.chars() {
        while marker_idx < markers.len() && markers[marker_idx].0 <= utf16_pos {
            result.push_str(&markers[marker_idx].2);
            marker_idx += 1;
        }
        result.push(ch);
        utf16_pos += ch.len_utf16() as i32;
    }
    while marker_idx < markers.len() {
        result.push_str(&markers[marker_idx].2);
        marker_idx += 1;
    }

    result
}

// ─── HTML parser ──────────────────────────────────────────────────────────────

/// Parse a platform-compatible HTML string into (plain_text, entities).
pub fn parse_html(html: &str) -> (String, Vec<MessageEntity>) {
    let mut out  = String::with_capacity(html.len());
    let mut ents = Vec::new();
    // stack of (tag, utf16_start)
    let mut stack: Vec<(HtmlTag, i32)> = Vec::new();
    let mut utf16_off: i32 = 0;

    let bytes = html.as_bytes();
    let len = bytes.len();
    let mut i = 0;

    while i < len {
        if bytes[i] == b'<' {
            // find end of tag
            let tag_start = i + 1;
            let mut j = tag_start;
            while j < len && bytes[j] != b'>' { j += 1; }
            let tag_content = &html[tag_start..j];
            i = j + 1;

            let is_close = tag_content.starts_with('/');
            let tag_str = if is_close { tag_content[1..].trim() } else { tag_content.trim() };

            // parse tag name and attributes
            let (tag_name, attrs) = parse_tag(tag_str);

            if is_close {
                // pop from stack
                if let Some(pos) = stack.iter().rposition(|(t, _)| t.name() == tag_name) {
                    let (htag, start_off) = stack.remove(pos);
                    let length = utf16_off - start_off;
                    if length > 0 {
                        let entity = match htag {
                            HtmlTag::Bold       => Some(MessageEntity::plain(MessageEntityKind::Bold, start_off, length)),
                            HtmlTag::Italic     => Some(MessageEntity::plain(MessageEntityKind::Italic, start_off, length)),
                            HtmlTag::Underline  => Some(MessageEntity::plain(MessageEntityKind::Underline, start_off, length)),
                            HtmlTag::Strike     => Some(MessageEntity::plain(MessageEntityKind::Strikethrough, start_off, length)),
                            HtmlTag::Spoiler    => Some(MessageEntity::plain(MessageEntityKind::Spoiler, start_off, length)),
                            HtmlTag::Code       => Some(MessageEntity::plain(MessageEntityKind::Code, start_off, length)),
                            HtmlTag::Blockquote => Some(MessageEntity::plain(MessageEntityKind::Blockquote, start_off, length)),
                            HtmlTag::Pre(lang)  => {
                                let mut ent = MessageEntity::plain(MessageEntityKind::Pre, start_off, length);
                                if let Some(l) = lang { ent.language = Some(l); }
                                Some(ent)
                            }
                            HtmlTag::Link(url) => {
                                let mut ent = MessageEntity::plain(MessageEntityKind::TextLink, start_off, length);
                                ent.url = Some(url);
                                Some(ent)
                            }
                            HtmlTag::CustomEmoji(id) => {
                                let mut ent = MessageEntity::plain(MessageEntityKind::CustomEmoji, start_off, length);
                                ent.custom_emoji_id = Some(id);
                                Some(ent)
                            }
                            HtmlTag::Unknown => None,
                        };
                        if let Some(e) = entity { ents.push(e); }
                    }
                }
            } else {
                // open tag
                let htag = match tag_name {
                    "b" | "strong" => HtmlTag::Bold,
                    "i" | "em"     => HtmlTag::Italic,
                    "u"            => HtmlTag::Underline,
                    "s" | "del" | "strike" => HtmlTag::Strike,
                    "tg-spoiler"   => HtmlTag::Spoiler,
                    "code"         => HtmlTag::Code,
                    "blockquote"   => HtmlTag::Blockquote,
                    "pre"          => {
                        let lang = attrs.iter()
                            .find(|(k, _)| k == "class")
                            .and_then(|(_, v)| v.strip_prefix("language-").map(str::to_string));
                        HtmlTag::Pre(lang)
                    }
                    "a"            => {
                        let href = attrs.iter()
                            .find(|(k, _)| k == "href")
                            .map(|(_, v)| v.clone())
                            .unwrap_or_default();
                        HtmlTag::Link(href)
                    }
                    "tg-emoji" => {
                        let id = attrs.iter()
                            .find(|(k, _)| k == "emoji-id")
                            .and_then(|(_, v)| v.parse::<i64>().ok())
                            .unwrap_or(0);
                        HtmlTag::CustomEmoji(id)
                    }
                    "br" => {
                        // Self-closing — emit newline
                        out.push('\n');
                        utf16_off += 1;
                        continue;
                    }
                    _ => HtmlTag::Unknown,
                };
                stack.push((htag, utf16_off));
            }
        } else {
            // Text (handle entities)
            let text_start = i;
            while i < len && bytes[i] != b'<' { i += 1; }
            let raw_text = &html[text_start..i];
            let decoded  = decode_html_entities(raw_text);
            for ch in decoded.chars() {
                out.push(ch);
                utf16_off += ch.len_utf16() as i32;
            }
        }
    }

    (out, ents)
}

fn decode_html_entities(s: &str) -> String {
    s.replace("&amp;", "&")
     .replace("&lt;",  "<")
     .replace("&gt;",  ">")
     .replace("&quot;", "\"")
     .replace("&#39;", "'")
     .replace("&nbsp;", "\u{00A0}")
}

fn parse_tag(s: &str) -> (&str, Vec<(String, String)>) {
    let mut parts = s.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or("").trim_end_matches('/');
    let rest = parts.next().unwrap_or("");
    let attrs = parse_attrs(rest);
    (name, attrs)
}

fn parse_attrs(s: &str) -> Vec<(String, String)> {
    let mut result = Vec::new();
    let mut rem = s.trim();
    while !rem.is_empty() {
        // find '='
        if let Some(eq) = rem.find('=') {
            let key = rem[..eq].trim().to_string();
            rem = rem[eq+1..].trim_start();
            let (val, rest) = if rem.starts_with('"') {
                let end = rem[1..].find('"').map(|p| p+1).unwrap_or(rem.len()-1);
                (rem[1..end].to_string(), &rem[end+1..])
            } else if rem.starts_with('\'') {
                let end = rem[1..].find('\'').map(|p| p+1).unwrap_or(rem.len()-1);
                (rem[1..end].to_string(), &rem[end+1..])
            } else {
                let end = rem.find(char::is_whitespace).unwrap_or(rem.len());
                (rem[..end].to_string(), &rem[end..])
            };
            result.push((key, val));
            rem = rest.trim_start();
        } else {
            break;
        }
    }
    result
}

#[derive(Debug, Clone)]
enum HtmlTag {
    Bold,
    Italic,
    Underline,
    Strike,
    Spoiler,
    Code,
    Pre(Option<String>),
    Blockquote,
    Link(String),
    CustomEmoji(i64),
    Unknown,
}

impl HtmlTag {
    fn name(&self) -> &str {
        match self {
            Self::Bold           => "b",
            Self::Italic         => "i",
            Self::Underline      => "u",
            Self::Strike         => "s",
            Self::Spoiler        => "tg-spoiler",
            Self::Code           => "code",
            Self::Pre(_)         => "pre",
            Self::Blockquote     => "blockquote",
            Self::Link(_)        => "a",
            Self::CustomEmoji(_) => "tg-emoji",
            Self::Unknown        => "",
        }
    }
}

/// Generate platform-compatible HTML from plain text + entities.
pub fn generate_html(text: &str, entities: &[MessageEntity]) -> String {
    use MessageEntityKind as K;

    // Build list of (utf16_pos, is_open, html_fragment)
    let mut markers: Vec<(i32, bool, String)> = Vec::new();

    for ent in entities {
        let (open, close): (String, String) = match ent.kind {
            K::Bold          => ("<b>".into(), "</b>".into()),
            K::Italic        => ("<i>".into(), "</i>".into()),
            K::Underline     => ("<u>".into(), "</u>".into()),
            K::Strikethrough => ("<s>".into(), "</s>".into()),
            K::Spoiler       => ("<tg-spoiler>".into(), "</tg-spoiler>".into()),
            K::Code          => ("<code>".into(), "</code>".into()),
            K::Blockquote    => ("<blockquote>".into(), "</blockquote>".into()),
            K::Pre => {
                let lang = match &ent.language {
                    Some(l) => format!(" class=\"language-{l}\""),
                    None    => String::new(),
                };
                (format!("<pre><code{lang}>"), "</code></pre>".into())
            }
            K::TextLink => match &ent.url {
                Some(url) => (format!("<a href=\"{}\">", escape_html(url)), "</a>".into()),
                None      => continue,
            },
            K::TextMention => match &ent.user {
                Some(u) => (format!("<a href=\"tg://user?id={}\">", u.id), "</a>".into()),
                None    => continue,
            },
            K::CustomEmoji => match ent.custom_emoji_id {
                Some(id) => (format!("<tg-emoji emoji-id=\"{id}\">"), "</tg-emoji>".into()),
                None     => continue,
            },
            _ => continue,
        };
        markers.push((ent.offset, true,  open));
        markers.push((ent.end(),  false, close));
    }

    // Sort: opens before closes at same position
    markers.sort_by(|(a_pos, a_open, _), (b_pos, b_open, _)| {
        a_pos.cmp(b_pos).then_with(|| b_open.cmp(a_open)) // open=true sorts before close=false
    });

    let mut result = String::with_capacity(text.len() + markers.iter().map(|(_, _, s)| s.len()).sum::<usize>());
    let mut marker_idx = 0;
    let mut utf16_pos: i32 = 0;

    for ch in text.chars() {
        while marker_idx < markers.len() && markers[marker_idx].0 <= utf16_pos {
            result.push_str(&markers[marker_idx].2);
            marker_idx += 1;
        }
        // Escape the character
        match ch {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            c   => result.push(c),
        }
        utf16_pos += ch.len_utf16() as i32;
    }
    while marker_idx < markers.len() {
        result.push_str(&markers[marker_idx].2);
        marker_idx += 1;
    }

    result
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_bold() {
        let (text, ents) = parse_markdown("Hello **world**!");
        assert_eq!(text, "Hello world!");
        assert_eq!(ents.len(), 1);
        assert_eq!(ents[0].kind, MessageEntityKind::Bold);
        assert_eq!(ents[0].offset, 6);
        assert_eq!(ents[0].length, 5);
    }

    #[test]
    fn markdown_inline_code() {
        let (text, ents) = parse_markdown("Use `foo()` to do it");
        assert_eq!(text, "Use foo() to do it");
        assert_eq!(ents[0].kind, MessageEntityKind::Code);
    }

    #[test]
    fn markdown_offsets_count_utf16_units() {
        let (text, ents) = parse_markdown("𝄞 **x**");
        assert_eq!(text, "𝄞 x");
        // The clef takes two UTF-16 units, so bold starts at 3.
        assert_eq!(ents[0].offset, 3);
        assert_eq!(ents[0].length, 1);
    }

    #[test]
    fn markdown_roundtrip() {
        let (text, ents) = parse_markdown("hi **#courier**");
        assert_eq!(text, "hi #courier");
        let back = generate_markdown(&text, &ents);
        assert_eq!(back, "hi **#courier**");
        let (text2, ents2) = parse_markdown(&back);
        assert_eq!(text2, text);
        assert_eq!(ents2, ents);
    }

    #[test]
    fn markdown_link_roundtrip() {
        let mut link = MessageEntity::plain(MessageEntityKind::TextLink, 4, 4);
        link.url = Some("https://example.com".into());
        let text = "see this";

        let back = generate_markdown(text, &[link.clone()]);
        assert_eq!(back, "see [this](https://example.com)");
        let (plain, ents) = parse_markdown(&back);
        assert_eq!(plain, text);
        assert_eq!(ents, vec![link]);
    }

    #[test]
    fn markdown_pre_roundtrip() {
        let mut pre = MessageEntity::plain(MessageEntityKind::Pre, 0, 8);
        pre.language = Some("rust".into());
        let text = "fn x() {";

        let back = generate_markdown(text, &[pre.clone()]);
        assert_eq!(back, "```rust\nfn x() {```");
        let (plain, ents) = parse_markdown(&back);
        assert_eq!(plain, text);
        assert_eq!(ents, vec![pre]);
    }

    #[test]
    fn html_bold_italic() {
        let (text, ents) = parse_html("<b>bold</b> and <i>italic</i>");
        assert_eq!(text, "bold and italic");
        assert_eq!(ents.len(), 2);
    }

    #[test]
    fn html_link() {
        let (text, ents) = parse_html("<a href=\"https://example.com\">click</a>");
        assert_eq!(text, "click");
        assert_eq!(ents[0].kind, MessageEntityKind::TextLink);
        assert_eq!(ents[0].url.as_deref(), Some("https://example.com"));
    }

    #[test]
    fn html_entities_decoded() {
        let (text, _) = parse_html("A &amp; B &lt;3&gt;");
        assert_eq!(text, "A & B <3>");
    }

    #[test]
    fn html_blockquote() {
        let (text, ents) = parse_html("<blockquote>wise words</blockquote>");
        assert_eq!(text, "wise words");
        assert_eq!(ents[0].kind, MessageEntityKind::Blockquote);
    }

    #[test]
    fn generate_html_roundtrip() {
        let original = "Hello world";
        let entities = vec![MessageEntity::plain(MessageEntityKind::Bold, 0, 5)];
        let html = generate_html(original, &entities);
        assert_eq!(html, "<b>Hello</b> world");
        let (back, ents2) = parse_html(&html);
        assert_eq!(back, original);
        assert_eq!(ents2, entities);
    }
}
