//! Concrete constructors (bare records) as `struct`s.
//!
//! Field order and naming follow the wire schema.  Optional (flag-gated)
//! fields are `Option`s; conditional flags with no payload are `bool`s.

use crate::enums;

#[cfg(feature = "impl-serde")]
use serde::{Deserialize, Serialize};

macro_rules! raw_record {
    ($(#[$meta:meta])* pub struct $name:ident $body:tt) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq)]
        #[cfg_attr(feature = "impl-serde", derive(Serialize, Deserialize))]
        pub struct $name $body
    };
}

// ─── Peers ────────────────────────────────────────────────────────────────────

raw_record! {
    /// A user, identified by its bare (unmarked) id.
    pub struct PeerUser { pub user_id: i64 }
}

raw_record! {
    /// A basic (legacy) group.
    pub struct PeerChat { pub chat_id: i64 }
}

raw_record! {
    /// A channel or supergroup.
    pub struct PeerChannel { pub channel_id: i64 }
}

// ─── Users ────────────────────────────────────────────────────────────────────

raw_record! {
    /// A full user record.
    pub struct User {
        pub is_self:        bool,
        pub contact:        bool,
        pub mutual_contact: bool,
        pub deleted:        bool,
        pub bot:            bool,
        pub verified:       bool,
        pub restricted:     bool,
        pub scam:           bool,
        pub fake:           bool,
        pub premium:        bool,
        pub support:        bool,
        pub id:             i64,
        pub access_hash:    Option<i64>,
        pub first_name:     Option<String>,
        pub last_name:      Option<String>,
        pub username:       Option<String>,
        pub phone:          Option<String>,
        pub lang_code:      Option<String>,
    }
}

raw_record! {
    /// Placeholder for a user the server would not materialize.
    pub struct UserEmpty { pub id: i64 }
}

// ─── Chats ────────────────────────────────────────────────────────────────────

raw_record! {
    /// A basic (legacy) group.
    pub struct Chat {
        pub deactivated:        bool,
        pub call_active:        bool,
        pub id:                 i64,
        pub title:              String,
        pub participants_count: i32,
        pub date:               i32,
        pub version:            i32,
    }
}

raw_record! {
    pub struct ChatEmpty { pub id: i64 }
}

raw_record! {
    /// A basic group the account was removed from.
    pub struct ChatForbidden {
        pub id:    i64,
        pub title: String,
    }
}

raw_record! {
    /// A channel (broadcast) or supergroup (megagroup).
    pub struct Channel {
        pub broadcast:          bool,
        pub megagroup:          bool,
        pub gigagroup:          bool,
        pub forum:              bool,
        pub verified:           bool,
        pub restricted:         bool,
        pub scam:               bool,
        pub fake:               bool,
        pub noforwards:         bool,
        pub signatures:         bool,
        pub id:                 i64,
        pub access_hash:        Option<i64>,
        pub title:              String,
        pub username:           Option<String>,
        pub date:               i32,
        pub participants_count: Option<i32>,
    }
}

raw_record! {
    /// A channel the account cannot access.
    pub struct ChannelForbidden {
        pub broadcast:   bool,
        pub megagroup:   bool,
        pub id:          i64,
        pub access_hash: i64,
        pub title:       String,
    }
}

// ─── Messages ─────────────────────────────────────────────────────────────────

raw_record! {
    /// A deleted or not-yet-existing message; carries only an id.
    pub struct MessageEmpty {
        pub id:      i32,
        pub peer_id: Option<enums::Peer>,
    }
}

raw_record! {
    /// A chat-lifecycle event (member joined, title changed, …).
    pub struct MessageService {
        pub out:        bool,
        pub mentioned:  bool,
        pub silent:     bool,
        pub post:       bool,
        pub legacy:     bool,
        pub id:         i32,
        pub from_id:    Option<enums::Peer>,
        pub peer_id:    enums::Peer,
        pub reply_to:   Option<enums::MessageReplyHeader>,
        pub date:       i32,
        pub action:     enums::MessageAction,
        pub ttl_period: Option<i32>,
    }
}

raw_record! {
    /// An ordinary content message.
    pub struct Message {
        pub out:                 bool,
        pub mentioned:           bool,
        pub media_unread:        bool,
        pub silent:              bool,
        pub post:                bool,
        pub from_scheduled:      bool,
        pub legacy:              bool,
        pub edit_hide:           bool,
        pub pinned:              bool,
        pub noforwards:          bool,
        pub invert_media:        bool,
        pub offline:             bool,
        pub video_processing_pending: bool,
        pub id:                  i32,
        pub from_id:             Option<enums::Peer>,
        pub peer_id:             enums::Peer,
        pub saved_peer_id:       Option<enums::Peer>,
        pub fwd_from:            Option<MessageFwdHeader>,
        pub via_bot_id:          Option<i64>,
        pub via_business_bot_id: Option<i64>,
        pub reply_to:            Option<enums::MessageReplyHeader>,
        pub date:                i32,
        pub message:             String,
        pub media:               Option<enums::MessageMedia>,
        pub reply_markup:        Option<enums::ReplyMarkup>,
        pub entities:            Vec<enums::MessageEntity>,
        pub views:               Option<i32>,
        pub forwards:            Option<i32>,
        pub edit_date:           Option<i32>,
        pub post_author:         Option<String>,
        pub grouped_id:          Option<i64>,
        pub reactions:           Option<MessageReactions>,
        pub ttl_period:          Option<i32>,
        pub effect:              Option<i64>,
        pub from_boosts_applied: Option<i32>,
    }
}

raw_record! {
    /// Header describing where a forwarded message originally came from.
    pub struct MessageFwdHeader {
        pub imported:          bool,
        pub saved_out:         bool,
        pub from_id:           Option<enums::Peer>,
        pub from_name:         Option<String>,
        pub date:              i32,
        pub channel_post:      Option<i32>,
        pub post_author:       Option<String>,
        pub saved_from_peer:   Option<enums::Peer>,
        pub saved_from_msg_id: Option<i32>,
        pub psa_type:          Option<String>,
    }
}

raw_record! {
    /// Header linking a message to the message it replies to.
    pub struct MessageReplyHeader {
        pub reply_to_scheduled: bool,
        pub forum_topic:        bool,
        pub quote:              bool,
        pub reply_to_msg_id:    Option<i32>,
        pub reply_to_peer_id:   Option<enums::Peer>,
        pub reply_to_top_id:    Option<i32>,
        pub quote_text:         Option<String>,
        pub quote_entities:     Vec<enums::MessageEntity>,
        pub quote_offset:       Option<i32>,
    }
}

raw_record! {
    /// Header linking a message to the story it replies to.
    pub struct MessageReplyStoryHeader {
        pub peer:     enums::Peer,
        pub story_id: i32,
    }
}

// ─── Reactions ────────────────────────────────────────────────────────────────

raw_record! {
    pub struct MessageReactions {
        pub min:          bool,
        pub can_see_list: bool,
        pub results:      Vec<ReactionCount>,
    }
}

raw_record! {
    pub struct ReactionCount {
        pub chosen_order: Option<i32>,
        pub reaction:     enums::Reaction,
        pub count:        i32,
    }
}

raw_record! {
    pub struct ReactionEmoji { pub emoticon: String }
}

raw_record! {
    pub struct ReactionCustomEmoji { pub document_id: i64 }
}

// ─── Service actions ──────────────────────────────────────────────────────────

raw_record! {
    pub struct MessageActionChatCreate {
        pub title: String,
        pub users: Vec<i64>,
    }
}

raw_record! {
    pub struct MessageActionChatEditTitle { pub title: String }
}

raw_record! {
    pub struct MessageActionChatEditPhoto { pub photo: enums::Photo }
}

raw_record! {
    pub struct MessageActionChatAddUser { pub users: Vec<i64> }
}

raw_record! {
    pub struct MessageActionChatDeleteUser { pub user_id: i64 }
}

raw_record! {
    pub struct MessageActionChatJoinedByLink { pub inviter_id: i64 }
}

raw_record! {
    pub struct MessageActionChannelCreate { pub title: String }
}

raw_record! {
    pub struct MessageActionChatMigrateTo { pub channel_id: i64 }
}

raw_record! {
    pub struct MessageActionChannelMigrateFrom {
        pub title:   String,
        pub chat_id: i64,
    }
}

raw_record! {
    pub struct MessageActionCustomAction { pub message: String }
}

raw_record! {
    pub struct MessageActionGameScore {
        pub game_id: i64,
        pub score:   i32,
    }
}

raw_record! {
    pub struct MessageActionPaymentSent {
        pub recurring_init: bool,
        pub recurring_used: bool,
        pub currency:       String,
        pub total_amount:   i64,
        pub invoice_slug:   Option<String>,
    }
}

raw_record! {
    /// Payment notification as delivered to the receiving bot.
    pub struct MessageActionPaymentSentMe {
        pub recurring_init: bool,
        pub recurring_used: bool,
        pub currency:       String,
        pub total_amount:   i64,
        pub payload:        Vec<u8>,
        pub charge_id:      String,
    }
}

raw_record! {
    pub struct MessageActionPaymentRefunded {
        pub peer:         enums::Peer,
        pub currency:     String,
        pub total_amount: i64,
        pub charge_id:    String,
    }
}

raw_record! {
    pub struct MessageActionPhoneCall {
        pub video:    bool,
        pub call_id:  i64,
        pub reason:   Option<enums::PhoneCallDiscardReason>,
        pub duration: Option<i32>,
    }
}

raw_record! {
    pub struct MessageActionBotAllowed {
        pub attach_menu:  bool,
        pub from_request: bool,
        pub domain:       Option<String>,
        pub app:          Option<String>,
    }
}

raw_record! {
    pub struct MessageActionSetMessagesTtl {
        pub period:            i32,
        pub auto_setting_from: Option<i64>,
    }
}

raw_record! {
    /// Reference to a group call; carried by the call-related actions.
    pub struct InputGroupCall {
        pub id:          i64,
        pub access_hash: i64,
    }
}

raw_record! {
    pub struct MessageActionGroupCallScheduled {
        pub call:          InputGroupCall,
        pub schedule_date: i32,
    }
}

raw_record! {
    /// Started when `duration` is absent, ended when present.
    pub struct MessageActionGroupCall {
        pub call:     InputGroupCall,
        pub duration: Option<i32>,
    }
}

raw_record! {
    pub struct MessageActionInviteToGroupCall {
        pub call:  InputGroupCall,
        pub users: Vec<i64>,
    }
}

raw_record! {
    pub struct MessageActionSetChatTheme { pub emoticon: String }
}

raw_record! {
    pub struct MessageActionTopicCreate {
        pub title:         String,
        pub icon_color:    i32,
        pub icon_emoji_id: Option<i64>,
    }
}

raw_record! {
    /// Every field is flag-gated; which ones are present decides the event.
    pub struct MessageActionTopicEdit {
        pub title:         Option<String>,
        pub icon_emoji_id: Option<i64>,
        pub closed:        Option<bool>,
        pub hidden:        Option<bool>,
    }
}

raw_record! {
    pub struct MessageActionWebViewDataSentMe {
        pub text: String,
        pub data: String,
    }
}

raw_record! {
    pub struct MessageActionGiveawayLaunch { pub stars: Option<i64> }
}

raw_record! {
    pub struct MessageActionGiveawayResults {
        pub stars:           bool,
        pub winners_count:   i32,
        pub unclaimed_count: i32,
    }
}

raw_record! {
    pub struct MessageActionGiftCode {
        pub via_giveaway: bool,
        pub unclaimed:    bool,
        pub boost_peer:   Option<enums::Peer>,
        pub months:       i32,
        pub slug:         String,
        pub currency:     Option<String>,
        pub amount:       Option<i64>,
    }
}

raw_record! {
    pub struct MessageActionRequestedPeer {
        pub button_id: i32,
        pub peers:     Vec<enums::Peer>,
    }
}

raw_record! {
    /// Shared-peer notification as delivered to the requesting bot, with
    /// inline display data instead of bare peers.
    pub struct MessageActionRequestedPeerSentMe {
        pub button_id: i32,
        pub peers:     Vec<enums::RequestedPeer>,
    }
}

raw_record! {
    pub struct MessageActionBoostApply { pub boosts: i32 }
}

raw_record! {
    pub struct StarGift {
        pub limited:              bool,
        pub sold_out:             bool,
        pub birthday:             bool,
        pub id:                   i64,
        pub stars:                i64,
        pub convert_stars:        i64,
        pub availability_remains: Option<i32>,
        pub availability_total:   Option<i32>,
    }
}

raw_record! {
    pub struct MessageActionStarGift {
        pub name_hidden:   bool,
        pub saved:         bool,
        pub converted:     bool,
        pub gift:          StarGift,
        pub message:       Option<String>,
        pub convert_stars: Option<i64>,
    }
}

raw_record! {
    pub struct MessageActionStarGiftUnique {
        pub upgrade:     bool,
        pub transferred: bool,
        pub gift:        StarGift,
    }
}

// ─── Requested peers (bot-side payload) ──────────────────────────────────────

raw_record! {
    pub struct RequestedPeerUser {
        pub user_id:    i64,
        pub first_name: Option<String>,
        pub last_name:  Option<String>,
        pub username:   Option<String>,
    }
}

raw_record! {
    pub struct RequestedPeerChat {
        pub chat_id: i64,
        pub title:   Option<String>,
    }
}

raw_record! {
    pub struct RequestedPeerChannel {
        pub channel_id: i64,
        pub title:      Option<String>,
        pub username:   Option<String>,
    }
}

// ─── Media ────────────────────────────────────────────────────────────────────

raw_record! {
    pub struct MessageMediaPhoto {
        pub spoiler:     bool,
        pub photo:       Option<enums::Photo>,
        pub ttl_seconds: Option<i32>,
    }
}

raw_record! {
    pub struct MessageMediaGeo { pub geo: enums::GeoPoint }
}

raw_record! {
    pub struct MessageMediaContact {
        pub phone_number: String,
        pub first_name:   String,
        pub last_name:    String,
        pub vcard:        String,
        pub user_id:      i64,
    }
}

raw_record! {
    pub struct MessageMediaVenue {
        pub geo:        enums::GeoPoint,
        pub title:      String,
        pub address:    String,
        pub provider:   String,
        pub venue_id:   String,
        pub venue_type: String,
    }
}

raw_record! {
    pub struct MessageMediaGame { pub game: Game }
}

raw_record! {
    pub struct MessageMediaGiveaway {
        pub only_new_subscribers: bool,
        pub winners_are_visible:  bool,
        pub channels:             Vec<i64>,
        pub countries_iso2:       Vec<String>,
        pub prize_description:    Option<String>,
        pub quantity:             i32,
        pub months:               Option<i32>,
        pub stars:                Option<i64>,
        pub until_date:           i32,
    }
}

raw_record! {
    pub struct MessageMediaGiveawayResults {
        pub only_new_subscribers:   bool,
        pub refunded:               bool,
        pub channel_id:             i64,
        pub additional_peers_count: Option<i32>,
        pub launch_msg_id:          i32,
        pub winners_count:          i32,
        pub unclaimed_count:        i32,
        pub winners:                Vec<i64>,
        pub months:                 Option<i32>,
        pub stars:                  Option<i64>,
        pub prize_description:      Option<String>,
        pub until_date:             i32,
    }
}

raw_record! {
    pub struct MessageMediaInvoice {
        pub shipping_address_requested: bool,
        pub test:                       bool,
        pub title:                      String,
        pub description:                String,
        pub currency:                   String,
        pub total_amount:               i64,
        pub start_param:                String,
        pub receipt_msg_id:             Option<i32>,
    }
}

raw_record! {
    pub struct MessageMediaStory {
        pub via_mention: bool,
        pub peer:        enums::Peer,
        pub id:          i32,
    }
}

raw_record! {
    pub struct MessageMediaDocument {
        pub nopremium:       bool,
        pub spoiler:         bool,
        pub document:        Option<enums::Document>,
        pub alt_documents:   Vec<enums::Document>,
        pub video_cover:     Option<enums::Photo>,
        pub video_timestamp: Option<i32>,
        pub ttl_seconds:     Option<i32>,
    }
}

raw_record! {
    pub struct MessageMediaWebPage {
        pub force_large_media: bool,
        pub force_small_media: bool,
        pub manual:            bool,
        pub safe:              bool,
        pub webpage:           enums::WebPage,
    }
}

raw_record! {
    pub struct MessageMediaPoll {
        pub poll:    Poll,
        pub results: PollResults,
    }
}

raw_record! {
    pub struct MessageMediaDice {
        pub value:    i32,
        pub emoticon: String,
    }
}

raw_record! {
    pub struct MessageMediaPaidMedia {
        pub stars_amount:   i64,
        pub extended_media: Vec<enums::MessageExtendedMedia>,
    }
}

raw_record! {
    pub struct MessageExtendedMediaPreview {
        pub w:              Option<i32>,
        pub h:              Option<i32>,
        pub video_duration: Option<i32>,
    }
}

raw_record! {
    pub struct MessageExtendedMedia { pub media: Box<enums::MessageMedia> }
}

// ─── Documents ────────────────────────────────────────────────────────────────

raw_record! {
    pub struct Document {
        pub id:             i64,
        pub access_hash:    i64,
        pub file_reference: Vec<u8>,
        pub date:           i32,
        pub mime_type:      String,
        pub size:           i64,
        pub dc_id:          i32,
        pub attributes:     Vec<enums::DocumentAttribute>,
    }
}

raw_record! {
    pub struct DocumentEmpty { pub id: i64 }
}

raw_record! {
    pub struct DocumentAttributeImageSize {
        pub w: i32,
        pub h: i32,
    }
}

raw_record! {
    pub struct DocumentAttributeSticker {
        pub mask:          bool,
        pub alt:           String,
        pub stickerset_id: Option<i64>,
    }
}

raw_record! {
    pub struct DocumentAttributeVideo {
        pub round_message:      bool,
        pub supports_streaming: bool,
        pub nosound:            bool,
        pub duration:           f64,
        pub w:                  i32,
        pub h:                  i32,
        pub preload_prefix_size: Option<i32>,
        pub video_start_ts:     Option<f64>,
    }
}

raw_record! {
    pub struct DocumentAttributeAudio {
        pub voice:     bool,
        pub duration:  i32,
        pub title:     Option<String>,
        pub performer: Option<String>,
        pub waveform:  Option<Vec<u8>>,
    }
}

raw_record! {
    pub struct DocumentAttributeFilename { pub file_name: String }
}

// ─── Photos ───────────────────────────────────────────────────────────────────

raw_record! {
    pub struct Photo {
        pub has_stickers:   bool,
        pub id:             i64,
        pub access_hash:    i64,
        pub file_reference: Vec<u8>,
        pub date:           i32,
        pub sizes:          Vec<enums::PhotoSize>,
        pub dc_id:          i32,
    }
}

raw_record! {
    pub struct PhotoEmpty { pub id: i64 }
}

raw_record! {
    pub struct PhotoSize {
        pub kind: String,
        pub w:    i32,
        pub h:    i32,
        pub size: i32,
    }
}

raw_record! {
    pub struct PhotoSizeEmpty { pub kind: String }
}

// ─── Geo ──────────────────────────────────────────────────────────────────────

raw_record! {
    pub struct GeoPoint {
        pub long:            f64,
        pub lat:             f64,
        pub access_hash:     i64,
        pub accuracy_radius: Option<i32>,
    }
}

// ─── Games ────────────────────────────────────────────────────────────────────

raw_record! {
    pub struct Game {
        pub id:          i64,
        pub access_hash: i64,
        pub short_name:  String,
        pub title:       String,
        pub description: String,
        pub photo:       enums::Photo,
        pub document:    Option<enums::Document>,
    }
}

// ─── Polls ────────────────────────────────────────────────────────────────────

raw_record! {
    pub struct Poll {
        pub id:              i64,
        pub closed:          bool,
        pub public_voters:   bool,
        pub multiple_choice: bool,
        pub quiz:            bool,
        pub question:        String,
        pub answers:         Vec<PollAnswer>,
        pub close_period:    Option<i32>,
        pub close_date:      Option<i32>,
    }
}

raw_record! {
    pub struct PollAnswer {
        pub text:   String,
        pub option: Vec<u8>,
    }
}

raw_record! {
    pub struct PollResults {
        pub min:          bool,
        pub results:      Vec<PollAnswerVoters>,
        pub total_voters: Option<i32>,
        pub solution:     Option<String>,
    }
}

raw_record! {
    pub struct PollAnswerVoters {
        pub chosen:  bool,
        pub correct: bool,
        pub option:  Vec<u8>,
        pub voters:  i32,
    }
}

// ─── Web pages ────────────────────────────────────────────────────────────────

raw_record! {
    pub struct WebPage {
        pub id:           i64,
        pub url:          String,
        pub display_url:  String,
        pub kind:         Option<String>,
        pub site_name:    Option<String>,
        pub title:        Option<String>,
        pub description:  Option<String>,
        pub photo:        Option<enums::Photo>,
        pub embed_url:    Option<String>,
        pub embed_type:   Option<String>,
        pub embed_width:  Option<i32>,
        pub embed_height: Option<i32>,
        pub duration:     Option<i32>,
        pub author:       Option<String>,
    }
}

raw_record! {
    pub struct WebPageEmpty { pub id: i64 }
}

raw_record! {
    /// Preview still being generated server-side.
    pub struct WebPagePending {
        pub id:   i64,
        pub date: i32,
    }
}

// ─── Entities ─────────────────────────────────────────────────────────────────

raw_record! {
    pub struct MessageEntitySpan {
        pub offset: i32,
        pub length: i32,
    }
}

raw_record! {
    pub struct MessageEntityPre {
        pub offset:   i32,
        pub length:   i32,
        pub language: String,
    }
}

raw_record! {
    pub struct MessageEntityTextUrl {
        pub offset: i32,
        pub length: i32,
        pub url:    String,
    }
}

raw_record! {
    pub struct MessageEntityMentionName {
        pub offset:  i32,
        pub length:  i32,
        pub user_id: i64,
    }
}

raw_record! {
    pub struct MessageEntityCustomEmoji {
        pub offset:      i32,
        pub length:      i32,
        pub document_id: i64,
    }
}

raw_record! {
    pub struct MessageEntityBlockquote {
        pub collapsed: bool,
        pub offset:    i32,
        pub length:    i32,
    }
}

// ─── Reply markup ─────────────────────────────────────────────────────────────

raw_record! {
    pub struct KeyboardButtonRow { pub buttons: Vec<enums::KeyboardButton> }
}

raw_record! {
    pub struct KeyboardButton { pub text: String }
}

raw_record! {
    pub struct KeyboardButtonUrl {
        pub text: String,
        pub url:  String,
    }
}

raw_record! {
    pub struct KeyboardButtonCallback {
        pub requires_password: bool,
        pub text:              String,
        pub data:              Vec<u8>,
    }
}

raw_record! {
    pub struct KeyboardButtonRequestPhone { pub text: String }
}

raw_record! {
    pub struct KeyboardButtonRequestGeoLocation { pub text: String }
}

raw_record! {
    pub struct KeyboardButtonWebView {
        pub text: String,
        pub url:  String,
    }
}

raw_record! {
    pub struct ReplyInlineMarkup { pub rows: Vec<KeyboardButtonRow> }
}

raw_record! {
    pub struct ReplyKeyboardMarkup {
        pub resize:      bool,
        pub single_use:  bool,
        pub selective:   bool,
        pub persistent:  bool,
        pub rows:        Vec<KeyboardButtonRow>,
        pub placeholder: Option<String>,
    }
}

raw_record! {
    pub struct ReplyKeyboardHide { pub selective: bool }
}

raw_record! {
    pub struct ReplyKeyboardForceReply {
        pub single_use:  bool,
        pub selective:   bool,
        pub placeholder: Option<String>,
    }
}

// ─── Forum topics ─────────────────────────────────────────────────────────────

raw_record! {
    pub struct ForumTopic {
        pub my:            bool,
        pub closed:        bool,
        pub pinned:        bool,
        pub hidden:        bool,
        pub id:            i32,
        pub date:          i32,
        pub title:         String,
        pub icon_color:    i32,
        pub icon_emoji_id: Option<i64>,
        pub top_message:   i32,
        pub from_id:       enums::Peer,
    }
}

raw_record! {
    pub struct ForumTopicDeleted { pub id: i32 }
}
