//! Boxed types (tagged unions) as `enum`s.
//!
//! One variant per wire constructor.  Payload-less constructors are unit
//! variants; the rest wrap their [`crate::types`] record.

use crate::types;

#[cfg(feature = "impl-serde")]
use serde::{Deserialize, Serialize};

macro_rules! raw_union {
    ($(#[$meta:meta])* pub enum $name:ident $body:tt) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq)]
        #[cfg_attr(feature = "impl-serde", derive(Serialize, Deserialize))]
        pub enum $name $body
    };
}

// ─── Peer ─────────────────────────────────────────────────────────────────────

raw_union! {
    /// Any party a message can originate from or be addressed to.
    pub enum Peer {
        User(types::PeerUser),
        Chat(types::PeerChat),
        Channel(types::PeerChannel),
    }
}

raw_union! {
    pub enum User {
        User(types::User),
        Empty(types::UserEmpty),
    }
}

raw_union! {
    pub enum Chat {
        Chat(types::Chat),
        Empty(types::ChatEmpty),
        Forbidden(types::ChatForbidden),
        Channel(types::Channel),
        ChannelForbidden(types::ChannelForbidden),
    }
}

// ─── Message ──────────────────────────────────────────────────────────────────

raw_union! {
    /// The three shapes a message record can take on the wire.
    pub enum Message {
        Empty(types::MessageEmpty),
        Service(types::MessageService),
        Message(types::Message),
    }
}

impl Message {
    /// Message id, available on every shape.
    pub fn id(&self) -> i32 {
        match self {
            Self::Empty(m)   => m.id,
            Self::Service(m) => m.id,
            Self::Message(m) => m.id,
        }
    }
}

raw_union! {
    /// Reply header: either a message reply or a story reply.
    pub enum MessageReplyHeader {
        Message(types::MessageReplyHeader),
        Story(types::MessageReplyStoryHeader),
    }
}

// ─── Service actions ──────────────────────────────────────────────────────────

raw_union! {
    /// The structured chat-lifecycle event carried by a service message.
    pub enum MessageAction {
        ChatCreate(types::MessageActionChatCreate),
        ChatEditTitle(types::MessageActionChatEditTitle),
        ChatEditPhoto(types::MessageActionChatEditPhoto),
        ChatDeletePhoto,
        ChatAddUser(types::MessageActionChatAddUser),
        ChatDeleteUser(types::MessageActionChatDeleteUser),
        ChatJoinedByLink(types::MessageActionChatJoinedByLink),
        ChatJoinedByRequest,
        ChannelCreate(types::MessageActionChannelCreate),
        ChatMigrateTo(types::MessageActionChatMigrateTo),
        ChannelMigrateFrom(types::MessageActionChannelMigrateFrom),
        PinMessage,
        HistoryClear,
        GameScore(types::MessageActionGameScore),
        PaymentSent(types::MessageActionPaymentSent),
        PaymentSentMe(types::MessageActionPaymentSentMe),
        PaymentRefunded(types::MessageActionPaymentRefunded),
        PhoneCall(types::MessageActionPhoneCall),
        ScreenshotTaken,
        CustomAction(types::MessageActionCustomAction),
        BotAllowed(types::MessageActionBotAllowed),
        SetMessagesTtl(types::MessageActionSetMessagesTtl),
        GroupCallScheduled(types::MessageActionGroupCallScheduled),
        GroupCall(types::MessageActionGroupCall),
        InviteToGroupCall(types::MessageActionInviteToGroupCall),
        SetChatTheme(types::MessageActionSetChatTheme),
        TopicCreate(types::MessageActionTopicCreate),
        TopicEdit(types::MessageActionTopicEdit),
        WebViewDataSentMe(types::MessageActionWebViewDataSentMe),
        GiveawayLaunch(types::MessageActionGiveawayLaunch),
        GiveawayResults(types::MessageActionGiveawayResults),
        GiftCode(types::MessageActionGiftCode),
        RequestedPeer(types::MessageActionRequestedPeer),
        RequestedPeerSentMe(types::MessageActionRequestedPeerSentMe),
        BoostApply(types::MessageActionBoostApply),
        StarGift(types::MessageActionStarGift),
        StarGiftUnique(types::MessageActionStarGiftUnique),
        ContactSignUp,
    }
}

raw_union! {
    pub enum PhoneCallDiscardReason {
        Missed,
        Disconnect,
        Hangup,
        Busy,
    }
}

// ─── Media ────────────────────────────────────────────────────────────────────

raw_union! {
    /// Media attachment of a content message.
    pub enum MessageMedia {
        Empty,
        Photo(types::MessageMediaPhoto),
        Geo(types::MessageMediaGeo),
        Contact(types::MessageMediaContact),
        Venue(types::MessageMediaVenue),
        Game(types::MessageMediaGame),
        Giveaway(types::MessageMediaGiveaway),
        GiveawayResults(types::MessageMediaGiveawayResults),
        Invoice(types::MessageMediaInvoice),
        Story(types::MessageMediaStory),
        Document(types::MessageMediaDocument),
        WebPage(types::MessageMediaWebPage),
        Poll(types::MessageMediaPoll),
        Dice(types::MessageMediaDice),
        PaidMedia(types::MessageMediaPaidMedia),
        Unsupported,
    }
}

raw_union! {
    pub enum MessageExtendedMedia {
        Preview(types::MessageExtendedMediaPreview),
        Media(types::MessageExtendedMedia),
    }
}

raw_union! {
    pub enum Document {
        Document(types::Document),
        Empty(types::DocumentEmpty),
    }
}

raw_union! {
    pub enum DocumentAttribute {
        ImageSize(types::DocumentAttributeImageSize),
        Animated,
        Sticker(types::DocumentAttributeSticker),
        Video(types::DocumentAttributeVideo),
        Audio(types::DocumentAttributeAudio),
        Filename(types::DocumentAttributeFilename),
        HasStickers,
    }
}

raw_union! {
    pub enum Photo {
        Photo(types::Photo),
        Empty(types::PhotoEmpty),
    }
}

raw_union! {
    pub enum PhotoSize {
        Size(types::PhotoSize),
        Empty(types::PhotoSizeEmpty),
    }
}

raw_union! {
    pub enum GeoPoint {
        Point(types::GeoPoint),
        Empty,
    }
}

raw_union! {
    pub enum WebPage {
        Page(types::WebPage),
        Empty(types::WebPageEmpty),
        Pending(types::WebPagePending),
    }
}

// ─── Entities ─────────────────────────────────────────────────────────────────

raw_union! {
    /// An inline-formatting or semantic span over UTF-16 code units.
    pub enum MessageEntity {
        Unknown(types::MessageEntitySpan),
        Mention(types::MessageEntitySpan),
        Hashtag(types::MessageEntitySpan),
        Cashtag(types::MessageEntitySpan),
        BotCommand(types::MessageEntitySpan),
        Url(types::MessageEntitySpan),
        Email(types::MessageEntitySpan),
        Phone(types::MessageEntitySpan),
        Bold(types::MessageEntitySpan),
        Italic(types::MessageEntitySpan),
        Underline(types::MessageEntitySpan),
        Strike(types::MessageEntitySpan),
        Spoiler(types::MessageEntitySpan),
        Code(types::MessageEntitySpan),
        Pre(types::MessageEntityPre),
        TextUrl(types::MessageEntityTextUrl),
        MentionName(types::MessageEntityMentionName),
        CustomEmoji(types::MessageEntityCustomEmoji),
        Blockquote(types::MessageEntityBlockquote),
        BankCard(types::MessageEntitySpan),
    }
}

// ─── Reply markup ─────────────────────────────────────────────────────────────

raw_union! {
    pub enum ReplyMarkup {
        Inline(types::ReplyInlineMarkup),
        Keyboard(types::ReplyKeyboardMarkup),
        Hide(types::ReplyKeyboardHide),
        ForceReply(types::ReplyKeyboardForceReply),
    }
}

raw_union! {
    pub enum KeyboardButton {
        Button(types::KeyboardButton),
        Url(types::KeyboardButtonUrl),
        Callback(types::KeyboardButtonCallback),
        RequestPhone(types::KeyboardButtonRequestPhone),
        RequestGeoLocation(types::KeyboardButtonRequestGeoLocation),
        WebView(types::KeyboardButtonWebView),
    }
}

// ─── Reactions ────────────────────────────────────────────────────────────────

raw_union! {
    pub enum Reaction {
        Emoji(types::ReactionEmoji),
        CustomEmoji(types::ReactionCustomEmoji),
        Paid,
        Empty,
    }
}

// ─── Forum topics ─────────────────────────────────────────────────────────────

raw_union! {
    pub enum ForumTopic {
        Topic(types::ForumTopic),
        Deleted(types::ForumTopicDeleted),
    }
}

// ─── Requested peers ──────────────────────────────────────────────────────────

raw_union! {
    pub enum RequestedPeer {
        User(types::RequestedPeerUser),
        Chat(types::RequestedPeerChat),
        Channel(types::RequestedPeerChannel),
    }
}
