//! Service-message payload types.
//!
//! A service message carries exactly one of these, selected by the decoder's
//! action dispatch; [`ServiceKind`] names which sub-field is populated.

use chrono::{DateTime, Utc};
use courier_raw as raw;
use std::collections::HashMap;

use crate::chat::{Chat, User};
use crate::message::Message;
use crate::peers;
use crate::time::timestamp_to_datetime;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

macro_rules! service_type {
    ($(#[$meta:meta])* pub struct $name:ident $body:tt) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        pub struct $name $body
    };
}

// ─── Tags ─────────────────────────────────────────────────────────────────────

/// Which service sub-field of a `Message` is populated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ServiceKind {
    NewChatMembers,
    LeftChatMembers,
    NewChatTitle,
    NewChatPhoto,
    DeleteChatPhoto,
    GroupChatCreated,
    ChannelChatCreated,
    MigrateToChatId,
    MigrateFromChatId,
    PinnedMessage,
    GameHighScore,
    CustomAction,
    ForumTopicCreated,
    ForumTopicEdited,
    ForumTopicClosed,
    ForumTopicReopened,
    GeneralTopicHidden,
    GeneralTopicUnhidden,
    VideoChatScheduled,
    VideoChatStarted,
    VideoChatEnded,
    VideoChatMembersInvited,
    PhoneCallStarted,
    PhoneCallEnded,
    WebAppData,
    GiveawayCreated,
    GiveawayCompleted,
    GiftCode,
    Gift,
    RequestedChat,
    SuccessfulPayment,
    RefundedPayment,
    ChatTtlChanged,
    BoostApply,
    ConnectedWebsite,
    WriteAccessAllowed,
    ScreenshotTaken,
    ContactRegistered,
}

/// How the new members of a `NewChatMembers` event joined.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ChatJoinType {
    /// Added by another member.
    ByAdd,
    /// Joined via an invite link.
    ByLink,
    /// Join request approved by an admin.
    ByRequest,
}

// ─── Forum topics ─────────────────────────────────────────────────────────────

service_type! {
    pub struct ForumTopicCreated {
        pub title:         String,
        pub icon_color:    i32,
        pub icon_emoji_id: Option<i64>,
    }
}

impl ForumTopicCreated {
    pub fn from_raw(action: &raw::types::MessageActionTopicCreate) -> Self {
        Self {
            title:         action.title.clone(),
            icon_color:    action.icon_color,
            icon_emoji_id: action.icon_emoji_id,
        }
    }
}

service_type! {
    pub struct ForumTopicEdited {
        pub title:         Option<String>,
        pub icon_emoji_id: Option<i64>,
    }
}

impl ForumTopicEdited {
    pub fn from_raw(action: &raw::types::MessageActionTopicEdit) -> Self {
        Self {
            title:         action.title.clone(),
            icon_emoji_id: action.icon_emoji_id,
        }
    }
}

service_type! { pub struct ForumTopicClosed {} }
service_type! { pub struct ForumTopicReopened {} }
service_type! { pub struct GeneralTopicHidden {} }
service_type! { pub struct GeneralTopicUnhidden {} }

// ─── Calls ────────────────────────────────────────────────────────────────────

service_type! {
    pub struct VideoChatScheduled {
        pub start_date: Option<DateTime<Utc>>,
    }
}

impl VideoChatScheduled {
    pub fn from_raw(action: &raw::types::MessageActionGroupCallScheduled) -> Self {
        Self { start_date: timestamp_to_datetime(action.schedule_date) }
    }
}

service_type! { pub struct VideoChatStarted {} }

service_type! {
    pub struct VideoChatEnded {
        /// Call length in seconds.
        pub duration: i32,
    }
}

service_type! {
    pub struct VideoChatMembersInvited {
        pub users: Vec<User>,
    }
}

impl VideoChatMembersInvited {
    pub fn from_raw(
        action: &raw::types::MessageActionInviteToGroupCall,
        users:  &HashMap<i64, raw::enums::User>,
    ) -> Self {
        Self {
            users: action.users.iter()
                .filter_map(|id| User::from_table(users, *id))
                .collect(),
        }
    }
}

service_type! {
    pub struct PhoneCallStarted {
        pub is_video: bool,
    }
}

/// Why a 1:1 call ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PhoneCallEndReason {
    Missed,
    Disconnected,
    Hungup,
    Busy,
}

service_type! {
    pub struct PhoneCallEnded {
        pub is_video: bool,
        pub reason:   Option<PhoneCallEndReason>,
        /// Call length in seconds.
        pub duration: Option<i32>,
    }
}

impl PhoneCallEnded {
    pub fn from_raw(action: &raw::types::MessageActionPhoneCall) -> Self {
        let reason = action.reason.as_ref().map(|r| match r {
            raw::enums::PhoneCallDiscardReason::Missed     => PhoneCallEndReason::Missed,
            raw::enums::PhoneCallDiscardReason::Disconnect => PhoneCallEndReason::Disconnected,
            raw::enums::PhoneCallDiscardReason::Hangup     => PhoneCallEndReason::Hungup,
            raw::enums::PhoneCallDiscardReason::Busy       => PhoneCallEndReason::Busy,
        });
        Self {
            is_video: action.video,
            reason,
            duration: action.duration,
        }
    }
}

// ─── Web apps / bots ──────────────────────────────────────────────────────────

service_type! {
    /// Data a web app sent back to the bot that opened it.
    pub struct WebAppData {
        pub data:        String,
        pub button_text: String,
    }
}

impl WebAppData {
    pub fn from_raw(action: &raw::types::MessageActionWebViewDataSentMe) -> Self {
        Self {
            data:        action.data.clone(),
            button_text: action.text.clone(),
        }
    }
}

service_type! {
    pub struct WriteAccessAllowed {
        pub from_request:         bool,
        pub from_attachment_menu: bool,
        pub web_app_name:         Option<String>,
    }
}

impl WriteAccessAllowed {
    pub fn from_raw(action: &raw::types::MessageActionBotAllowed) -> Self {
        Self {
            from_request:         action.from_request,
            from_attachment_menu: action.attach_menu,
            web_app_name:         action.app.clone(),
        }
    }
}

// ─── Giveaways / gifts ────────────────────────────────────────────────────────

service_type! {
    pub struct GiveawayCreated {
        pub star_count: Option<i64>,
    }
}

service_type! {
    /// A giveaway without public winners finished.
    pub struct GiveawayCompleted {
        pub winners_count:    i32,
        pub unclaimed_count:  i32,
        pub is_star_giveaway: bool,
        /// The launch message, when it could be resolved.
        pub giveaway_message: Option<Box<Message>>,
    }
}

impl GiveawayCompleted {
    pub fn from_raw(action: &raw::types::MessageActionGiveawayResults) -> Self {
        Self {
            winners_count:    action.winners_count,
            unclaimed_count:  action.unclaimed_count,
            is_star_giveaway: action.stars,
            giveaway_message: None,
        }
    }
}

service_type! {
    pub struct GiftCode {
        pub via_giveaway: bool,
        pub is_unclaimed: bool,
        /// Chat the boost goes to, when known.
        pub boost_chat: Option<Chat>,
        pub months:     i32,
        pub slug:       String,
        pub currency:   Option<String>,
        pub amount:     Option<i64>,
    }
}

impl GiftCode {
    pub fn from_raw(
        action: &raw::types::MessageActionGiftCode,
        users:  &HashMap<i64, raw::enums::User>,
        chats:  &HashMap<i64, raw::enums::Chat>,
    ) -> Self {
        Self {
            via_giveaway: action.via_giveaway,
            is_unclaimed: action.unclaimed,
            boost_chat:   action.boost_peer.as_ref().map(|p| Chat::from_peer(p, users, chats)),
            months:       action.months,
            slug:         action.slug.clone(),
            currency:     action.currency.clone(),
            amount:       action.amount,
        }
    }
}

service_type! {
    /// A star gift sent or received.
    pub struct Gift {
        pub id:                 i64,
        pub star_count:         i64,
        pub convert_star_count: i64,
        pub is_limited:         bool,
        pub is_sold_out:        bool,
        pub is_unique:          bool,
        pub is_name_hidden:     bool,
        pub is_saved:           bool,
        pub available_amount:   Option<i32>,
        pub total_amount:       Option<i32>,
        pub text:               Option<String>,
    }
}

impl Gift {
    fn from_record(gift: &raw::types::StarGift) -> Self {
        Self {
            id:                 gift.id,
            star_count:         gift.stars,
            convert_star_count: gift.convert_stars,
            is_limited:         gift.limited,
            is_sold_out:        gift.sold_out,
            is_unique:          false,
            is_name_hidden:     false,
            is_saved:           false,
            available_amount:   gift.availability_remains,
            total_amount:       gift.availability_total,
            text:               None,
        }
    }

    pub fn from_action(action: &raw::types::MessageActionStarGift) -> Self {
        let mut gift = Self::from_record(&action.gift);
        gift.is_name_hidden = action.name_hidden;
        gift.is_saved = action.saved;
        gift.text = action.message.clone();
        gift
    }

    pub fn from_unique_action(action: &raw::types::MessageActionStarGiftUnique) -> Self {
        let mut gift = Self::from_record(&action.gift);
        gift.is_unique = true;
        gift
    }
}

// ─── Requested peers ──────────────────────────────────────────────────────────

service_type! {
    /// Chats (or users) shared with the bot through a request-peer button.
    pub struct RequestedChats {
        pub button_id: i32,
        pub chats:     Vec<Chat>,
    }
}

impl RequestedChats {
    pub fn from_raw(
        action: &raw::types::MessageActionRequestedPeer,
        users:  &HashMap<i64, raw::enums::User>,
        chats:  &HashMap<i64, raw::enums::Chat>,
    ) -> Self {
        Self {
            button_id: action.button_id,
            chats:     action.peers.iter().map(|p| Chat::from_peer(p, users, chats)).collect(),
        }
    }

    pub fn from_sent_me(action: &raw::types::MessageActionRequestedPeerSentMe) -> Self {
        let chats = action.peers.iter().map(|p| match p {
            raw::enums::RequestedPeer::User(u) => {
                let mut chat = Chat::from_peer(
                    &raw::enums::Peer::User(raw::types::PeerUser { user_id: u.user_id }),
                    &HashMap::new(),
                    &HashMap::new(),
                );
                chat.first_name = u.first_name.clone();
                chat.last_name  = u.last_name.clone();
                chat.username   = u.username.clone();
                chat
            }
            raw::enums::RequestedPeer::Chat(c) => {
                let mut chat = Chat::from_peer(
                    &raw::enums::Peer::Chat(raw::types::PeerChat { chat_id: c.chat_id }),
                    &HashMap::new(),
                    &HashMap::new(),
                );
                chat.title = c.title.clone();
                chat
            }
            raw::enums::RequestedPeer::Channel(c) => {
                let mut chat = Chat::from_peer(
                    &raw::enums::Peer::Channel(raw::types::PeerChannel { channel_id: c.channel_id }),
                    &HashMap::new(),
                    &HashMap::new(),
                );
                chat.title    = c.title.clone();
                chat.username = c.username.clone();
                chat
            }
        }).collect();

        Self { button_id: action.button_id, chats }
    }
}

// ─── Payments ─────────────────────────────────────────────────────────────────

service_type! {
    pub struct SuccessfulPayment {
        pub currency:     String,
        pub total_amount: i64,
        pub invoice_slug: Option<String>,
        /// Provider charge id; only present on the bot's own copy.
        pub charge_id:    Option<String>,
    }
}

impl SuccessfulPayment {
    pub fn from_raw(action: &raw::types::MessageActionPaymentSent) -> Self {
        Self {
            currency:     action.currency.clone(),
            total_amount: action.total_amount,
            invoice_slug: action.invoice_slug.clone(),
            charge_id:    None,
        }
    }

    pub fn from_sent_me(action: &raw::types::MessageActionPaymentSentMe) -> Self {
        Self {
            currency:     action.currency.clone(),
            total_amount: action.total_amount,
            invoice_slug: None,
            charge_id:    Some(action.charge_id.clone()),
        }
    }
}

service_type! {
    pub struct RefundedPayment {
        pub currency:     String,
        pub total_amount: i64,
        pub charge_id:    String,
        /// Marked id of the refunded peer.
        pub peer_id:      i64,
    }
}

impl RefundedPayment {
    pub fn from_raw(action: &raw::types::MessageActionPaymentRefunded) -> Self {
        Self {
            currency:     action.currency.clone(),
            total_amount: action.total_amount,
            charge_id:    action.charge_id.clone(),
            peer_id:      peers::marked_peer_id(&action.peer),
        }
    }
}

// ─── Misc ─────────────────────────────────────────────────────────────────────

service_type! { pub struct ScreenshotTaken {} }
service_type! { pub struct ContactRegistered {} }

service_type! {
    /// Score set for a game message.
    pub struct GameHighScore {
        pub user:  Option<User>,
        pub score: i32,
    }
}

impl GameHighScore {
    /// Resolve the scoring user from the sender peer.
    pub fn from_action(
        action:  &raw::types::MessageActionGameScore,
        from_id: Option<&raw::enums::Peer>,
        users:   &HashMap<i64, raw::enums::User>,
    ) -> Self {
        let user = from_id
            .map(peers::raw_peer_id)
            .and_then(|id| User::from_table(users, id));
        Self { user, score: action.score }
    }
}
