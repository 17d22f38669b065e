//! Domain formatting entities.
//!
//! Offsets and lengths count UTF-16 code units, matching the wire format.
//! Raw spans that cannot be interpreted are discarded, never surfaced as
//! errors.

use std::collections::HashMap;

use courier_raw::enums;

use crate::chat::User;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What a formatting span means.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MessageEntityKind {
    Mention,
    Hashtag,
    Cashtag,
    BotCommand,
    Url,
    Email,
    PhoneNumber,
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Spoiler,
    Code,
    Pre,
    TextLink,
    TextMention,
    CustomEmoji,
    Blockquote,
    BankCard,
}

/// One formatting span over a message body.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MessageEntity {
    pub kind:   MessageEntityKind,
    /// Start, in UTF-16 code units.
    pub offset: i32,
    /// Length, in UTF-16 code units.
    pub length: i32,
    /// Target of a [`MessageEntityKind::TextLink`].
    pub url: Option<String>,
    /// Mentioned user of a [`MessageEntityKind::TextMention`].
    pub user: Option<User>,
    /// Language hint of a [`MessageEntityKind::Pre`] block.
    pub language: Option<String>,
    /// Document id of a [`MessageEntityKind::CustomEmoji`].
    pub custom_emoji_id: Option<i64>,
}

impl MessageEntity {
    pub(crate) fn plain(kind: MessageEntityKind, offset: i32, length: i32) -> Self {
        Self {
            kind,
            offset,
            length,
            url: None,
            user: None,
            language: None,
            custom_emoji_id: None,
        }
    }

    /// Interpret one raw span. Unknown kinds yield `None`.
    pub fn from_raw(raw: &enums::MessageEntity, users: &HashMap<i64, enums::User>) -> Option<Self> {
        use enums::MessageEntity as E;
        use MessageEntityKind as K;

        Some(match raw {
            E::Unknown(_)    => return None,
            E::Mention(e)    => Self::plain(K::Mention, e.offset, e.length),
            E::Hashtag(e)    => Self::plain(K::Hashtag, e.offset, e.length),
            E::Cashtag(e)    => Self::plain(K::Cashtag, e.offset, e.length),
            E::BotCommand(e) => Self::plain(K::BotCommand, e.offset, e.length),
            E::Url(e)        => Self::plain(K::Url, e.offset, e.length),
            E::Email(e)      => Self::plain(K::Email, e.offset, e.length),
            E::Phone(e)      => Self::plain(K::PhoneNumber, e.offset, e.length),
            E::Bold(e)       => Self::plain(K::Bold, e.offset, e.length),
            E::Italic(e)     => Self::plain(K::Italic, e.offset, e.length),
            E::Underline(e)  => Self::plain(K::Underline, e.offset, e.length),
            E::Strike(e)     => Self::plain(K::Strikethrough, e.offset, e.length),
            E::Spoiler(e)    => Self::plain(K::Spoiler, e.offset, e.length),
            E::Code(e)       => Self::plain(K::Code, e.offset, e.length),
            E::BankCard(e)   => Self::plain(K::BankCard, e.offset, e.length),
            E::Pre(e) => {
                let mut ent = Self::plain(K::Pre, e.offset, e.length);
                if !e.language.is_empty() {
                    ent.language = Some(e.language.clone());
                }
                ent
            }
            E::TextUrl(e) => {
                let mut ent = Self::plain(K::TextLink, e.offset, e.length);
                ent.url = Some(e.url.clone());
                ent
            }
            E::MentionName(e) => {
                let mut ent = Self::plain(K::TextMention, e.offset, e.length);
                ent.user = User::from_table(users, e.user_id);
                ent
            }
            E::CustomEmoji(e) => {
                let mut ent = Self::plain(K::CustomEmoji, e.offset, e.length);
                ent.custom_emoji_id = Some(e.document_id);
                ent
            }
            E::Blockquote(e) => Self::plain(K::Blockquote, e.offset, e.length),
        })
    }

    /// One past the last UTF-16 code unit covered by the span.
    pub fn end(&self) -> i32 {
        self.offset + self.length
    }
}

/// Interpret a raw span list, discarding the uninterpretable and preserving
/// order.
pub fn parse_entities(
    raw:   &[enums::MessageEntity],
    users: &HashMap<i64, enums::User>,
) -> Vec<MessageEntity> {
    raw.iter()
        .filter_map(|e| MessageEntity::from_raw(e, users))
        .collect()
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use courier_raw::types::{MessageEntitySpan, MessageEntityTextUrl};

    #[test]
    fn unknown_spans_are_discarded_in_order() {
        let raw = vec![
            enums::MessageEntity::Bold(MessageEntitySpan { offset: 0, length: 2 }),
            enums::MessageEntity::Unknown(MessageEntitySpan { offset: 2, length: 1 }),
            enums::MessageEntity::Italic(MessageEntitySpan { offset: 3, length: 4 }),
        ];
        let parsed = parse_entities(&raw, &HashMap::new());
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].kind, MessageEntityKind::Bold);
        assert_eq!(parsed[1].kind, MessageEntityKind::Italic);
    }

    #[test]
    fn text_url_keeps_target() {
        let raw = enums::MessageEntity::TextUrl(MessageEntityTextUrl {
            offset: 0,
            length: 5,
            url: "https://example.com".into(),
        });
        let ent = MessageEntity::from_raw(&raw, &HashMap::new()).unwrap();
        assert_eq!(ent.kind, MessageEntityKind::TextLink);
        assert_eq!(ent.url.as_deref(), Some("https://example.com"));
        assert_eq!(ent.end(), 5);
    }
}
