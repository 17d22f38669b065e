//! Forum topics.

use chrono::{DateTime, Utc};
use courier_raw::{enums, types};

use crate::peers;
use crate::time::timestamp_to_datetime;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A named sub-thread of a forum supergroup.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ForumTopic {
    /// Topic id — equals the thread's root message id; `1` is the general
    /// topic.
    pub id:             i32,
    pub date:           Option<DateTime<Utc>>,
    pub title:          String,
    pub icon_color:     i32,
    pub icon_emoji_id:  Option<i64>,
    pub top_message_id: i32,
    pub is_closed:      bool,
    pub is_hidden:      bool,
    pub is_pinned:      bool,
    /// Marked id of whoever created the topic.
    pub creator_id:     i64,
}

impl ForumTopic {
    /// Build from a raw topic record. Deleted topics yield `None`.
    pub fn from_raw(raw: Option<&enums::ForumTopic>) -> Option<Self> {
        match raw? {
            enums::ForumTopic::Deleted(_) => None,
            enums::ForumTopic::Topic(t)   => Some(Self::from_record(t)),
        }
    }

    pub(crate) fn from_record(t: &types::ForumTopic) -> Self {
        Self {
            id:             t.id,
            date:           timestamp_to_datetime(t.date),
            title:          t.title.clone(),
            icon_color:     t.icon_color,
            icon_emoji_id:  t.icon_emoji_id,
            top_message_id: t.top_message,
            is_closed:      t.closed,
            is_hidden:      t.hidden,
            is_pinned:      t.pinned,
            creator_id:     peers::marked_peer_id(&t.from_id),
        }
    }
}
