//! Domain users and chats.
//!
//! Raw peer records arrive in side tables keyed by bare id; these
//! constructors turn them into the marked-id domain shapes the rest of the
//! pipeline uses.  A peer missing from its table degrades to an id-only
//! value — decoding never fails because a table was incomplete.

use std::collections::HashMap;

use courier_raw::{enums, types};

use crate::peers;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ─── User ─────────────────────────────────────────────────────────────────────

/// A user or bot account.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct User {
    pub id:                i64,
    pub is_self:           bool,
    pub is_contact:        bool,
    pub is_mutual_contact: bool,
    pub is_deleted:        bool,
    pub is_bot:            bool,
    pub is_verified:       bool,
    pub is_restricted:     bool,
    pub is_scam:           bool,
    pub is_fake:           bool,
    pub is_premium:        bool,
    pub is_support:        bool,
    pub first_name:        Option<String>,
    pub last_name:         Option<String>,
    pub username:          Option<String>,
    pub phone_number:      Option<String>,
    pub language_code:     Option<String>,
}

impl User {
    /// Build from a raw user record. `None` input and empty placeholder
    /// records both yield `None`.
    pub fn from_raw(raw: Option<&enums::User>) -> Option<Self> {
        match raw? {
            enums::User::Empty(_) => None,
            enums::User::User(u)  => Some(Self::from_record(u)),
        }
    }

    pub(crate) fn from_record(u: &types::User) -> Self {
        Self {
            id:                u.id,
            is_self:           u.is_self,
            is_contact:        u.contact,
            is_mutual_contact: u.mutual_contact,
            is_deleted:        u.deleted,
            is_bot:            u.bot,
            is_verified:       u.verified,
            is_restricted:     u.restricted,
            is_scam:           u.scam,
            is_fake:           u.fake,
            is_premium:        u.premium,
            is_support:        u.support,
            first_name:        u.first_name.clone(),
            last_name:         u.last_name.clone(),
            username:          u.username.clone(),
            phone_number:      u.phone.clone(),
            language_code:     u.lang_code.clone(),
        }
    }

    /// Look a user up in the side table by bare id.
    pub(crate) fn from_table(users: &HashMap<i64, enums::User>, id: i64) -> Option<Self> {
        Self::from_raw(users.get(&id))
    }

    /// First and last name joined, if either is set.
    pub fn full_name(&self) -> Option<String> {
        match (&self.first_name, &self.last_name) {
            (Some(f), Some(l)) => Some(format!("{f} {l}")),
            (Some(f), None)    => Some(f.clone()),
            (None, Some(l))    => Some(l.clone()),
            (None, None)       => None,
        }
    }
}

// ─── Chat ─────────────────────────────────────────────────────────────────────

/// Classification of a conversation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ChatType {
    /// 1:1 exchange with a user.
    Private,
    /// 1:1 exchange with a bot.
    Bot,
    /// Basic (legacy) group.
    Group,
    /// Megagroup.
    Supergroup,
    /// Broadcast channel.
    Channel,
}

/// The conversation a message belongs to (or was sent on behalf of).
///
/// `id` is always a *marked* id (see [`crate::peers`]).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Chat {
    pub id:            i64,
    pub kind:          ChatType,
    pub is_forum:      bool,
    pub is_verified:   bool,
    pub is_restricted: bool,
    pub is_scam:       bool,
    pub is_fake:       bool,
    pub title:         Option<String>,
    pub username:      Option<String>,
    pub first_name:    Option<String>,
    pub last_name:     Option<String>,
    pub members_count: Option<i32>,
}

impl Chat {
    fn bare(id: i64, kind: ChatType) -> Self {
        Self {
            id,
            kind,
            is_forum:      false,
            is_verified:   false,
            is_restricted: false,
            is_scam:       false,
            is_fake:       false,
            title:         None,
            username:      None,
            first_name:    None,
            last_name:     None,
            members_count: None,
        }
    }

    /// Resolve a peer against the side tables.
    ///
    /// Missing table entries degrade to an id-only chat of the right kind.
    pub fn from_peer(
        peer:  &enums::Peer,
        users: &HashMap<i64, enums::User>,
        chats: &HashMap<i64, enums::Chat>,
    ) -> Self {
        match peer {
            enums::Peer::User(p) => match users.get(&p.user_id) {
                Some(enums::User::User(u)) => Self::from_user_record(u),
                _ => Self::bare(p.user_id, ChatType::Private),
            },
            enums::Peer::Chat(p) => match chats.get(&p.chat_id) {
                Some(enums::Chat::Chat(c))      => Self::from_group_record(c),
                Some(enums::Chat::Forbidden(c)) => {
                    let mut chat = Self::bare(-c.id, ChatType::Group);
                    chat.title = Some(c.title.clone());
                    chat
                }
                _ => Self::bare(-p.chat_id, ChatType::Group),
            },
            enums::Peer::Channel(p) => match chats.get(&p.channel_id) {
                Some(enums::Chat::Channel(c)) => Self::from_channel_record(c),
                Some(enums::Chat::ChannelForbidden(c)) => {
                    let kind = if c.megagroup { ChatType::Supergroup } else { ChatType::Channel };
                    let mut chat = Self::bare(peers::channel_id(c.id), kind);
                    chat.title = Some(c.title.clone());
                    chat
                }
                _ => Self::bare(peers::channel_id(p.channel_id), ChatType::Channel),
            },
        }
    }

    pub(crate) fn from_user_record(u: &types::User) -> Self {
        Self {
            id:            u.id,
            kind:          if u.bot { ChatType::Bot } else { ChatType::Private },
            is_forum:      false,
            is_verified:   u.verified,
            is_restricted: u.restricted,
            is_scam:       u.scam,
            is_fake:       u.fake,
            title:         None,
            username:      u.username.clone(),
            first_name:    u.first_name.clone(),
            last_name:     u.last_name.clone(),
            members_count: None,
        }
    }

    fn from_group_record(c: &types::Chat) -> Self {
        let mut chat = Self::bare(-c.id, ChatType::Group);
        chat.title = Some(c.title.clone());
        chat.members_count = Some(c.participants_count);
        chat
    }

    pub(crate) fn from_channel_record(c: &types::Channel) -> Self {
        Self {
            id:            peers::channel_id(c.id),
            kind:          if c.megagroup { ChatType::Supergroup } else { ChatType::Channel },
            is_forum:      c.forum,
            is_verified:   c.verified,
            is_restricted: c.restricted,
            is_scam:       c.scam,
            is_fake:       c.fake,
            title:         Some(c.title.clone()),
            username:      c.username.clone(),
            first_name:    None,
            last_name:     None,
            members_count: c.participants_count,
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use courier_raw::types::{PeerChannel, PeerChat, PeerUser};

    fn user_record(id: i64, bot: bool) -> enums::User {
        enums::User::User(types::User {
            is_self: false, contact: false, mutual_contact: false,
            deleted: false, bot, verified: false, restricted: false,
            scam: false, fake: false, premium: false, support: false,
            id,
            access_hash: Some(1),
            first_name: Some("Ada".into()),
            last_name: None,
            username: Some("ada".into()),
            phone: None,
            lang_code: None,
        })
    }

    #[test]
    fn private_chat_from_user_table() {
        let mut users = HashMap::new();
        users.insert(7, user_record(7, false));
        let chat = Chat::from_peer(&enums::Peer::User(PeerUser { user_id: 7 }), &users, &HashMap::new());
        assert_eq!(chat.id, 7);
        assert_eq!(chat.kind, ChatType::Private);
        assert_eq!(chat.first_name.as_deref(), Some("Ada"));
    }

    #[test]
    fn bot_peer_classifies_as_bot_chat() {
        let mut users = HashMap::new();
        users.insert(8, user_record(8, true));
        let chat = Chat::from_peer(&enums::Peer::User(PeerUser { user_id: 8 }), &users, &HashMap::new());
        assert_eq!(chat.kind, ChatType::Bot);
    }

    #[test]
    fn missing_table_entry_degrades_to_id_only() {
        let chat = Chat::from_peer(
            &enums::Peer::Chat(PeerChat { chat_id: 55 }),
            &HashMap::new(),
            &HashMap::new(),
        );
        assert_eq!(chat.id, -55);
        assert_eq!(chat.kind, ChatType::Group);
        assert!(chat.title.is_none());
    }

    #[test]
    fn megagroup_is_supergroup_with_marked_id() {
        let mut chats = HashMap::new();
        chats.insert(9, enums::Chat::Channel(types::Channel {
            broadcast: false, megagroup: true, gigagroup: false, forum: true,
            verified: false, restricted: false, scam: false, fake: false,
            noforwards: false, signatures: false,
            id: 9, access_hash: Some(1), title: "lab".into(),
            username: None, date: 0, participants_count: Some(3),
        }));
        let chat = Chat::from_peer(&enums::Peer::Channel(PeerChannel { channel_id: 9 }), &HashMap::new(), &chats);
        assert_eq!(chat.kind, ChatType::Supergroup);
        assert_eq!(chat.id, crate::peers::channel_id(9));
        assert!(chat.is_forum);
    }
}
