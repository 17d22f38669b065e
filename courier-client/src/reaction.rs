//! Message reactions.

use courier_raw::{enums, types};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One reaction kind on a message, with its count.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Reaction {
    /// Unicode emoji, for plain emoji reactions.
    pub emoji: Option<String>,
    /// Document id, for custom-emoji reactions.
    pub custom_emoji_id: Option<i64>,
    /// `true` for the paid (star) reaction.
    pub is_paid: bool,
    pub count: i32,
    /// Position among the reactions the own account chose, if any.
    pub chosen_order: Option<i32>,
}

impl Reaction {
    fn from_count(rc: &types::ReactionCount) -> Option<Self> {
        let mut reaction = Self {
            emoji:           None,
            custom_emoji_id: None,
            is_paid:         false,
            count:           rc.count,
            chosen_order:    rc.chosen_order,
        };
        match &rc.reaction {
            enums::Reaction::Emoji(e)       => reaction.emoji = Some(e.emoticon.clone()),
            enums::Reaction::CustomEmoji(e) => reaction.custom_emoji_id = Some(e.document_id),
            enums::Reaction::Paid           => reaction.is_paid = true,
            enums::Reaction::Empty          => return None,
        }
        Some(reaction)
    }

    /// Interpret a raw reactions record. `None` when absent or empty.
    pub fn parse_list(raw: Option<&types::MessageReactions>) -> Option<Vec<Self>> {
        let results = &raw?.results;
        let list: Vec<Self> = results.iter().filter_map(Self::from_count).collect();
        if list.is_empty() { None } else { Some(list) }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_record_is_none() {
        assert_eq!(Reaction::parse_list(None), None);
        let raw = types::MessageReactions { min: false, can_see_list: false, results: vec![] };
        assert_eq!(Reaction::parse_list(Some(&raw)), None);
    }

    #[test]
    fn emoji_and_paid_kinds() {
        let raw = types::MessageReactions {
            min: false,
            can_see_list: false,
            results: vec![
                types::ReactionCount {
                    chosen_order: Some(0),
                    reaction: enums::Reaction::Emoji(types::ReactionEmoji { emoticon: "👍".into() }),
                    count: 3,
                },
                types::ReactionCount {
                    chosen_order: None,
                    reaction: enums::Reaction::Paid,
                    count: 1,
                },
            ],
        };
        let list = Reaction::parse_list(Some(&raw)).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].emoji.as_deref(), Some("👍"));
        assert_eq!(list[0].chosen_order, Some(0));
        assert!(list[1].is_paid);
    }
}
