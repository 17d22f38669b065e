//! The `Message` domain entity and the raw→domain decoder.
//!
//! [`Decoder::decode`] is the single entry point: one raw wire record plus
//! side tables of known peers in, one fully-populated [`Message`] out.  It
//! never fails on malformed-but-well-typed input — unknown sub-variants
//! degrade to an absent tag, and unresolvable cross-references leave their
//! optional field unset.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};
use courier_raw as raw;

use crate::cache::MessageCache;
use crate::chat::{Chat, ChatType, User};
use crate::connector::Connector;
use crate::entities::{self, MessageEntity};
use crate::errors::InvocationError;
use crate::markup::ReplyMarkup;
use crate::media::{
    Animation, Audio, Contact, Dice, Document, Game, Giveaway, GiveawayWinners, Invoice, Location,
    MediaKind, PaidMediaInfo, Photo, Poll, Sticker, Story, Venue, Video, VideoNote, Voice, WebPage,
};
use crate::peers;
use crate::reaction::Reaction;
use crate::service::{
    ChatJoinType, ContactRegistered, ForumTopicClosed, ForumTopicCreated, ForumTopicEdited,
    ForumTopicReopened, GameHighScore, GeneralTopicHidden, GeneralTopicUnhidden, Gift, GiftCode,
    GiveawayCompleted, GiveawayCreated, PhoneCallEnded, PhoneCallStarted, RefundedPayment,
    RequestedChats, ScreenshotTaken, ServiceKind, SuccessfulPayment, VideoChatEnded,
    VideoChatMembersInvited, VideoChatScheduled, VideoChatStarted, WebAppData, WriteAccessAllowed,
};
use crate::text::Str;
use crate::time::{optional_timestamp, timestamp_to_datetime};
use crate::topic::ForumTopic;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ─── Message ──────────────────────────────────────────────────────────────────

/// A decoded message.
///
/// Most fields are optional and grouped into mutually exclusive clusters:
///
/// - **sender** — `from_user` XOR `sender_chat`;
/// - **service payload** — exactly one sub-field set when `service` is
///   `Some`, named by the [`ServiceKind`];
/// - **media payload** — exactly one sub-field set when `media` is `Some`,
///   named by the [`MediaKind`];
/// - **body** — `text`/`entities` XOR `caption`/`caption_entities`,
///   depending on whether non-preview media is attached;
/// - **reply linkage** — message-reply fields XOR story-reply fields.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Message {
    /// Unique message id inside its chat.
    pub id: i32,
    /// Set when the record was an empty placeholder (deleted or not yet
    /// existing); every other field is left at its default.
    pub empty: bool,
    pub chat: Option<Chat>,
    pub date: Option<DateTime<Utc>>,

    // Sender — `from_user` XOR `sender_chat`.
    pub from_user: Option<User>,
    pub sender_chat: Option<Chat>,
    pub sender_boost_count: Option<i32>,
    pub sender_business_bot: Option<User>,
    pub via_bot: Option<User>,

    // Forum-topic linkage.
    pub topic_message: bool,
    pub topic: Option<ForumTopic>,
    pub message_thread_id: Option<i32>,

    // Forward linkage.
    pub forward_from: Option<User>,
    pub forward_sender_name: Option<String>,
    pub forward_from_chat: Option<Chat>,
    pub forward_from_message_id: Option<i32>,
    pub forward_signature: Option<String>,
    pub forward_date: Option<DateTime<Utc>>,
    /// Channel post auto-forwarded to the linked discussion group.
    pub automatic_forward: bool,

    // Reply linkage — message reply XOR story reply.
    pub reply_to_message_id: Option<i32>,
    pub reply_to_top_message_id: Option<i32>,
    pub reply_to_message: Option<Box<Message>>,
    pub reply_to_story_id: Option<i32>,
    pub reply_to_story_user_id: Option<i64>,
    pub reply_to_story: Option<Story>,
    pub quote: bool,
    pub quote_text: Option<Str>,
    pub quote_entities: Option<Vec<MessageEntity>>,

    // Flags and counters.
    pub mentioned: bool,
    pub outgoing: bool,
    pub scheduled: bool,
    pub from_scheduled: bool,
    pub from_offline: bool,
    pub edit_date: Option<DateTime<Utc>>,
    /// Edited without showing the edit mark (e.g. a reaction arrived).
    pub edit_hidden: bool,
    pub media_group_id: Option<i64>,
    pub author_signature: Option<String>,
    pub has_protected_content: bool,
    pub has_media_spoiler: bool,
    pub show_caption_above_media: bool,
    pub views: Option<i32>,
    pub forwards: Option<i32>,
    pub effect_id: Option<i64>,
    pub business_connection_id: Option<String>,

    // Body — `text` XOR `caption`.
    pub text: Option<Str>,
    pub entities: Option<Vec<MessageEntity>>,
    pub caption: Option<Str>,
    pub caption_entities: Option<Vec<MessageEntity>>,

    // Media payload — exactly one set when `media` is `Some`.
    pub media: Option<MediaKind>,
    pub photo: Option<Photo>,
    pub audio: Option<Audio>,
    pub document: Option<Document>,
    pub sticker: Option<Sticker>,
    pub animation: Option<Animation>,
    pub game: Option<Game>,
    pub giveaway: Option<Giveaway>,
    pub giveaway_winners: Option<GiveawayWinners>,
    pub invoice: Option<Invoice>,
    pub story: Option<Story>,
    pub video: Option<Video>,
    pub video_processing_pending: bool,
    pub alternative_videos: Option<Vec<Video>>,
    pub voice: Option<Voice>,
    pub video_note: Option<VideoNote>,
    pub contact: Option<Contact>,
    pub location: Option<Location>,
    pub venue: Option<Venue>,
    pub web_page: Option<WebPage>,
    pub poll: Option<Poll>,
    pub dice: Option<Dice>,
    pub paid_media: Option<PaidMediaInfo>,

    // Service payload — exactly one set when `service` is `Some`.
    pub service: Option<ServiceKind>,
    pub new_chat_members: Option<Vec<User>>,
    pub chat_join_type: Option<ChatJoinType>,
    pub left_chat_member: Option<User>,
    pub new_chat_title: Option<String>,
    pub new_chat_photo: Option<Photo>,
    pub delete_chat_photo: bool,
    pub group_chat_created: bool,
    pub channel_chat_created: bool,
    pub migrate_to_chat_id: Option<i64>,
    pub migrate_from_chat_id: Option<i64>,
    pub pinned_message: Option<Box<Message>>,
    pub game_high_score: Option<GameHighScore>,
    pub forum_topic_created: Option<ForumTopicCreated>,
    pub forum_topic_edited: Option<ForumTopicEdited>,
    pub forum_topic_closed: Option<ForumTopicClosed>,
    pub forum_topic_reopened: Option<ForumTopicReopened>,
    pub general_topic_hidden: Option<GeneralTopicHidden>,
    pub general_topic_unhidden: Option<GeneralTopicUnhidden>,
    pub video_chat_scheduled: Option<VideoChatScheduled>,
    pub video_chat_started: Option<VideoChatStarted>,
    pub video_chat_ended: Option<VideoChatEnded>,
    pub video_chat_members_invited: Option<VideoChatMembersInvited>,
    pub phone_call_started: Option<PhoneCallStarted>,
    pub phone_call_ended: Option<PhoneCallEnded>,
    pub web_app_data: Option<WebAppData>,
    pub giveaway_created: Option<GiveawayCreated>,
    pub giveaway_completed: Option<GiveawayCompleted>,
    pub gift_code: Option<GiftCode>,
    pub gift: Option<Gift>,
    pub requested_chats: Option<RequestedChats>,
    pub successful_payment: Option<SuccessfulPayment>,
    pub refunded_payment: Option<RefundedPayment>,
    pub chat_ttl_period: Option<i32>,
    pub boosts_applied: Option<i32>,
    pub connected_website: Option<String>,
    pub write_access_allowed: Option<WriteAccessAllowed>,
    pub screenshot_taken: Option<ScreenshotTaken>,
    pub contact_registered: Option<ContactRegistered>,

    /// Inline keyboard, custom reply keyboard, keyboard removal or
    /// force-reply instruction attached to the message.
    pub reply_markup: Option<ReplyMarkup>,
    pub reactions: Option<Vec<Reaction>>,
    /// The raw record this message was decoded from.
    pub raw: Option<raw::enums::Message>,
}

impl Message {
    /// Deep link to this message. Only group, supergroup and channel
    /// messages are addressable.
    pub fn link(&self) -> Option<String> {
        let chat = self.chat.as_ref()?;
        match chat.kind {
            ChatType::Group | ChatType::Supergroup | ChatType::Channel => {}
            ChatType::Private | ChatType::Bot => return None,
        }
        match &chat.username {
            Some(username) => Some(format!("https://t.me/{}/{}", username, self.id)),
            None => Some(format!("https://t.me/c/{}/{}", peers::channel_id(chat.id), self.id)),
        }
    }

    /// The text or caption, whichever is populated.
    pub fn content(&self) -> Option<&Str> {
        self.text.as_ref().or(self.caption.as_ref())
    }
}

// ─── DecodeOptions ────────────────────────────────────────────────────────────

/// Per-call knobs for [`Decoder::decode`].
#[derive(Clone, Debug, Default)]
pub struct DecodeOptions<'a> {
    /// The record comes from the scheduled-messages box.
    pub is_scheduled: bool,
    /// How many reply hops may be resolved; `0` disables reply traversal
    /// entirely.  This counter is the sole termination mechanism for the
    /// recursive resolution.
    pub reply_depth: u8,
    /// Business connection the record was delivered through.
    pub business_connection_id: Option<String>,
    /// Raw reply target the caller already fetched; decoded in place of any
    /// lookup, with the depth counter exhausted.
    pub prefetched_reply: Option<&'a raw::enums::Message>,
}

impl DecodeOptions<'_> {
    /// One hop of reply resolution (the usual default).
    pub fn with_replies() -> Self {
        Self { reply_depth: 1, ..Self::default() }
    }
}

// ─── Decoder ──────────────────────────────────────────────────────────────────

/// Raw-to-domain message decoder.
///
/// Holds the [`Connector`] it issues lookups through and the
/// [`MessageCache`] it populates.  One `decode` call is one logical
/// operation; its suspension points are exactly the connector calls, awaited
/// sequentially.
pub struct Decoder<'a, C> {
    connector: &'a C,
    cache:     &'a MessageCache,
}

impl<'a, C: Connector> Decoder<'a, C> {
    pub fn new(connector: &'a C, cache: &'a MessageCache) -> Self {
        Self { connector, cache }
    }

    /// Decode one raw record against the caller-supplied peer tables.
    ///
    /// `users` may be *extended* by this call: when a private 1:1 exchange
    /// references peers missing from the table, they are fetched through
    /// the connector and merged in.
    pub async fn decode(
        &self,
        message: &raw::enums::Message,
        users:   &mut HashMap<i64, raw::enums::User>,
        chats:   &HashMap<i64, raw::enums::Chat>,
        topics:  Option<&HashMap<i32, raw::types::ForumTopic>>,
        opts:    DecodeOptions<'_>,
    ) -> Result<Message, InvocationError> {
        match message {
            raw::enums::Message::Empty(m) => Ok(Message {
                id: m.id,
                empty: true,
                business_connection_id: opts.business_connection_id.clone(),
                raw: Some(message.clone()),
                ..Message::default()
            }),
            raw::enums::Message::Service(m) => self.decode_service(m, users, chats, &opts).await,
            raw::enums::Message::Message(m) => {
                self.decode_content(m, users, chats, topics, &opts).await
            }
        }
    }

    /// Type-erased `decode`, used for the one bounded self-recursive call
    /// (prefetched reply targets).
    fn decode_boxed<'f>(
        &'f self,
        message: &'f raw::enums::Message,
        users:   &'f mut HashMap<i64, raw::enums::User>,
        chats:   &'f HashMap<i64, raw::enums::Chat>,
        topics:  Option<&'f HashMap<i32, raw::types::ForumTopic>>,
        opts:    DecodeOptions<'f>,
    ) -> Pin<Box<dyn Future<Output = Result<Message, InvocationError>> + 'f>> {
        Box::pin(self.decode(message, users, chats, topics, opts))
    }

    /// Merge unresolved private-exchange peers into `users`.
    ///
    /// Fires at most one `fetch_users` call, only when both ends of the
    /// exchange are user peers and either is missing from the table.
    async fn prefetch_private_peers(
        &self,
        from_id: Option<&raw::enums::Peer>,
        peer_id: &raw::enums::Peer,
        users:   &mut HashMap<i64, raw::enums::User>,
    ) -> Result<(), InvocationError> {
        let (Some(raw::enums::Peer::User(from)), raw::enums::Peer::User(to)) = (from_id, peer_id)
        else {
            return Ok(());
        };
        if users.contains_key(&from.user_id) && users.contains_key(&to.user_id) {
            return Ok(());
        }
        match self.connector.fetch_users(&[from.user_id, to.user_id]).await {
            Ok(fetched) => {
                for user in fetched {
                    let id = match &user {
                        raw::enums::User::User(u)  => u.id,
                        raw::enums::User::Empty(u) => u.id,
                    };
                    users.insert(id, user);
                }
            }
            // Only the peer-invalid kind is absorbed here; the wider decode
            // swallow set does not apply to this site.
            Err(e) if e.is("PEER_ID_INVALID") => {
                tracing::debug!("[decode] private-peer prefetch failed: {e}");
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    // ── Service records ──────────────────────────────────────────────────────

    async fn decode_service(
        &self,
        m:     &raw::types::MessageService,
        users: &mut HashMap<i64, raw::enums::User>,
        chats: &HashMap<i64, raw::enums::Chat>,
        opts:  &DecodeOptions<'_>,
    ) -> Result<Message, InvocationError> {
        use raw::enums::MessageAction as A;

        self.prefetch_private_peers(m.from_id.as_ref(), &m.peer_id, users).await?;

        let chat = Chat::from_peer(&m.peer_id, users, chats);
        let chat_id = chat.id;
        let (from_user, sender_chat) = resolve_sender(m.from_id.as_ref(), &m.peer_id, users, chats);

        let mut msg = Message {
            id: m.id,
            date: timestamp_to_datetime(m.date),
            chat: Some(chat),
            from_user,
            sender_chat,
            outgoing: m.out,
            mentioned: m.mentioned,
            business_connection_id: opts.business_connection_id.clone(),
            raw: Some(raw::enums::Message::Service(m.clone())),
            ..Message::default()
        };

        match &m.action {
            A::ChatAddUser(a) => {
                msg.new_chat_members = Some(
                    a.users.iter().filter_map(|id| User::from_table(users, *id)).collect(),
                );
                msg.chat_join_type = Some(ChatJoinType::ByAdd);
                msg.service = Some(ServiceKind::NewChatMembers);
            }
            A::ChatJoinedByLink(_) => {
                let joiner = m.from_id.as_ref()
                    .map(peers::raw_peer_id)
                    .and_then(|id| User::from_table(users, id));
                msg.new_chat_members = Some(joiner.into_iter().collect());
                msg.chat_join_type = Some(ChatJoinType::ByLink);
                msg.service = Some(ServiceKind::NewChatMembers);
            }
            A::ChatJoinedByRequest => {
                let joiner = m.from_id.as_ref()
                    .map(peers::raw_peer_id)
                    .and_then(|id| User::from_table(users, id));
                msg.new_chat_members = Some(joiner.into_iter().collect());
                msg.chat_join_type = Some(ChatJoinType::ByRequest);
                msg.service = Some(ServiceKind::NewChatMembers);
            }
            A::ChatDeleteUser(a) => {
                msg.left_chat_member = User::from_table(users, a.user_id);
                msg.service = Some(ServiceKind::LeftChatMembers);
            }
            A::ChatEditTitle(a) => {
                msg.new_chat_title = Some(a.title.clone());
                msg.service = Some(ServiceKind::NewChatTitle);
            }
            A::ChatEditPhoto(a) => {
                msg.new_chat_photo = Photo::from_raw(&a.photo, None);
                msg.service = Some(ServiceKind::NewChatPhoto);
            }
            A::ChatDeletePhoto => {
                msg.delete_chat_photo = true;
                msg.service = Some(ServiceKind::DeleteChatPhoto);
            }
            A::ChatMigrateTo(a) => {
                msg.migrate_to_chat_id = Some(peers::channel_id(a.channel_id));
                msg.service = Some(ServiceKind::MigrateToChatId);
            }
            A::ChannelMigrateFrom(a) => {
                msg.migrate_from_chat_id = Some(-a.chat_id);
                msg.service = Some(ServiceKind::MigrateFromChatId);
            }
            A::ChatCreate(_) => {
                msg.group_chat_created = true;
                msg.service = Some(ServiceKind::GroupChatCreated);
            }
            A::ChannelCreate(_) => {
                msg.channel_chat_created = true;
                msg.service = Some(ServiceKind::ChannelChatCreated);
            }
            A::CustomAction(a) => {
                msg.text = Some(Str::new(a.message.clone()));
                msg.service = Some(ServiceKind::CustomAction);
            }
            A::TopicCreate(a) => {
                msg.forum_topic_created = Some(ForumTopicCreated::from_raw(a));
                msg.service = Some(ServiceKind::ForumTopicCreated);
            }
            A::TopicEdit(a) => {
                if a.title.is_some() {
                    msg.forum_topic_edited = Some(ForumTopicEdited::from_raw(a));
                    msg.service = Some(ServiceKind::ForumTopicEdited);
                } else if a.hidden == Some(true) {
                    msg.general_topic_hidden = Some(GeneralTopicHidden {});
                    msg.service = Some(ServiceKind::GeneralTopicHidden);
                } else if a.closed == Some(true) {
                    msg.forum_topic_closed = Some(ForumTopicClosed {});
                    msg.service = Some(ServiceKind::ForumTopicClosed);
                } else if a.hidden == Some(true) {
                    msg.general_topic_unhidden = Some(GeneralTopicUnhidden {});
                    msg.service = Some(ServiceKind::GeneralTopicUnhidden);
                } else {
                    msg.forum_topic_reopened = Some(ForumTopicReopened {});
                    msg.service = Some(ServiceKind::ForumTopicReopened);
                }
            }
            A::GroupCallScheduled(a) => {
                msg.video_chat_scheduled = Some(VideoChatScheduled::from_raw(a));
                msg.service = Some(ServiceKind::VideoChatScheduled);
            }
            A::GroupCall(a) => {
                if let Some(duration) = a.duration {
                    msg.video_chat_ended = Some(VideoChatEnded { duration });
                    msg.service = Some(ServiceKind::VideoChatEnded);
                } else {
                    msg.video_chat_started = Some(VideoChatStarted {});
                    msg.service = Some(ServiceKind::VideoChatStarted);
                }
            }
            A::InviteToGroupCall(a) => {
                msg.video_chat_members_invited =
                    Some(VideoChatMembersInvited::from_raw(a, users));
                msg.service = Some(ServiceKind::VideoChatMembersInvited);
            }
            A::PhoneCall(a) => {
                if a.reason.is_some() {
                    msg.phone_call_ended = Some(PhoneCallEnded::from_raw(a));
                    msg.service = Some(ServiceKind::PhoneCallEnded);
                } else {
                    msg.phone_call_started = Some(PhoneCallStarted { is_video: a.video });
                    msg.service = Some(ServiceKind::PhoneCallStarted);
                }
            }
            A::WebViewDataSentMe(a) => {
                msg.web_app_data = Some(WebAppData::from_raw(a));
                msg.service = Some(ServiceKind::WebAppData);
            }
            A::GiveawayLaunch(a) => {
                msg.giveaway_created = Some(GiveawayCreated { star_count: a.stars });
                msg.service = Some(ServiceKind::GiveawayCreated);
            }
            A::GiveawayResults(a) => {
                let mut completed = GiveawayCompleted::from_raw(a);
                // The launch message is referenced through the reply header.
                let launch_id = match &m.reply_to {
                    Some(raw::enums::MessageReplyHeader::Message(h)) => h.reply_to_msg_id,
                    _ => None,
                };
                if let Some(id) = launch_id {
                    match self.connector.fetch_message(chat_id, id, 0).await {
                        Ok(launch) => completed.giveaway_message = Some(Box::new(launch)),
                        Err(e) if e.is_swallowed_by_decode() => {}
                        Err(e) => return Err(e),
                    }
                }
                msg.giveaway_completed = Some(completed);
                msg.service = Some(ServiceKind::GiveawayCompleted);
            }
            A::GiftCode(a) => {
                msg.gift_code = Some(GiftCode::from_raw(a, users, chats));
                msg.service = Some(ServiceKind::GiftCode);
            }
            A::RequestedPeer(a) => {
                msg.requested_chats = Some(RequestedChats::from_raw(a, users, chats));
                msg.service = Some(ServiceKind::RequestedChat);
            }
            A::RequestedPeerSentMe(a) => {
                msg.requested_chats = Some(RequestedChats::from_sent_me(a));
                msg.service = Some(ServiceKind::RequestedChat);
            }
            A::PaymentSent(a) => {
                msg.successful_payment = Some(SuccessfulPayment::from_raw(a));
                msg.service = Some(ServiceKind::SuccessfulPayment);
            }
            A::PaymentSentMe(a) => {
                msg.successful_payment = Some(SuccessfulPayment::from_sent_me(a));
                msg.service = Some(ServiceKind::SuccessfulPayment);
            }
            A::PaymentRefunded(a) => {
                msg.refunded_payment = Some(RefundedPayment::from_raw(a));
                msg.service = Some(ServiceKind::RefundedPayment);
            }
            A::SetMessagesTtl(a) => {
                msg.chat_ttl_period = Some(a.period);
                msg.service = Some(ServiceKind::ChatTtlChanged);
            }
            A::BoostApply(a) => {
                msg.boosts_applied = Some(a.boosts);
                msg.service = Some(ServiceKind::BoostApply);
            }
            A::StarGift(a) => {
                msg.gift = Some(Gift::from_action(a));
                msg.service = Some(ServiceKind::Gift);
            }
            A::StarGiftUnique(a) => {
                msg.gift = Some(Gift::from_unique_action(a));
                msg.service = Some(ServiceKind::Gift);
            }
            A::BotAllowed(a) => {
                if let Some(domain) = &a.domain {
                    msg.connected_website = Some(domain.clone());
                    msg.service = Some(ServiceKind::ConnectedWebsite);
                } else {
                    msg.write_access_allowed = Some(WriteAccessAllowed::from_raw(a));
                    msg.service = Some(ServiceKind::WriteAccessAllowed);
                }
            }
            A::ScreenshotTaken => {
                msg.screenshot_taken = Some(ScreenshotTaken {});
                msg.service = Some(ServiceKind::ScreenshotTaken);
            }
            A::ContactSignUp => {
                msg.contact_registered = Some(ContactRegistered {});
                msg.service = Some(ServiceKind::ContactRegistered);
            }
            // Pin and game-score are resolved after the base record exists.
            A::PinMessage | A::GameScore(_) => {}
            A::HistoryClear | A::SetChatTheme(_) => {
                tracing::debug!("[decode] unclassified service action, leaving tag absent");
            }
        }

        match &m.action {
            A::PinMessage => {
                match self.connector.fetch_pinned_message(chat_id).await {
                    Ok(pinned) => {
                        msg.pinned_message = Some(Box::new(pinned));
                        msg.service = Some(ServiceKind::PinnedMessage);
                    }
                    Err(e) if e.is_swallowed_by_decode() => {}
                    Err(e) => return Err(e),
                }
            }
            A::GameScore(a) => {
                msg.game_high_score =
                    Some(GameHighScore::from_action(a, m.from_id.as_ref(), users));
                if m.reply_to.is_some() && opts.reply_depth > 0 {
                    match self.connector.fetch_replied_message(chat_id, m.id, 0).await {
                        Ok(target) => {
                            msg.reply_to_message = Some(Box::new(target));
                            msg.service = Some(ServiceKind::GameHighScore);
                        }
                        Err(e) if e.is_swallowed_by_decode() => {}
                        Err(e) => return Err(e),
                    }
                }
            }
            _ => {}
        }

        if let Some(raw::enums::MessageReplyHeader::Message(h)) = &m.reply_to {
            if h.forum_topic {
                msg.topic_message = true;
                msg.message_thread_id = Some(thread_id_from_header(h));
            }
        }

        self.cache.insert((chat_id, msg.id), msg.clone());

        Ok(msg)
    }

    // ── Content records ──────────────────────────────────────────────────────

    async fn decode_content(
        &self,
        m:      &raw::types::Message,
        users:  &mut HashMap<i64, raw::enums::User>,
        chats:  &HashMap<i64, raw::enums::Chat>,
        topics: Option<&HashMap<i32, raw::types::ForumTopic>>,
        opts:   &DecodeOptions<'_>,
    ) -> Result<Message, InvocationError> {
        self.prefetch_private_peers(m.from_id.as_ref(), &m.peer_id, users).await?;

        let chat = Chat::from_peer(&m.peer_id, users, chats);
        let chat_id = chat.id;
        let (from_user, sender_chat) = resolve_sender(m.from_id.as_ref(), &m.peer_id, users, chats);

        let parsed_entities = entities::parse_entities(&m.entities, users);

        // Forward header.
        let mut forward_from = None;
        let mut forward_sender_name = None;
        let mut forward_from_chat = None;
        let mut forward_from_message_id = None;
        let mut forward_signature = None;
        let mut forward_date = None;

        if let Some(header) = &m.fwd_from {
            forward_date = timestamp_to_datetime(header.date);

            if let Some(peer) = &header.from_id {
                if peers::marked_peer_id(peer) > 0 {
                    forward_from = User::from_table(users, peers::raw_peer_id(peer));
                } else {
                    forward_from_chat = Some(Chat::from_peer(peer, users, chats));
                    forward_from_message_id = header.channel_post;
                    forward_signature = header.post_author.clone();
                }
            } else if let Some(name) = &header.from_name {
                forward_sender_name = Some(name.clone());
            }
        }

        // Media dispatch.
        let mut media_kind = None;
        let mut has_media_spoiler = false;
        let mut photo = None;
        let mut location = None;
        let mut contact = None;
        let mut venue = None;
        let mut game = None;
        let mut giveaway = None;
        let mut giveaway_winners = None;
        let mut invoice = None;
        let mut story = None;
        let mut audio = None;
        let mut voice = None;
        let mut animation = None;
        let mut video = None;
        let mut alternative_videos: Vec<Video> = Vec::new();
        let mut video_note = None;
        let mut sticker = None;
        let mut document = None;
        let mut web_page = None;
        let mut poll = None;
        let mut dice = None;
        let mut paid_media = None;

        if let Some(media) = &m.media {
            use raw::enums::MessageMedia as M;
            match media {
                M::Photo(mp) => {
                    photo = mp.photo.as_ref().and_then(|p| Photo::from_raw(p, mp.ttl_seconds));
                    if photo.is_some() {
                        media_kind = Some(MediaKind::Photo);
                        has_media_spoiler = mp.spoiler;
                    }
                }
                M::Geo(mg) => {
                    location = Location::from_raw(&mg.geo);
                    if location.is_some() {
                        media_kind = Some(MediaKind::Location);
                    }
                }
                M::Contact(mc) => {
                    contact = Some(Contact::from_raw(mc));
                    media_kind = Some(MediaKind::Contact);
                }
                M::Venue(mv) => {
                    venue = Some(Venue::from_raw(mv));
                    media_kind = Some(MediaKind::Venue);
                }
                M::Game(mg) => {
                    game = Some(Game::from_raw(&mg.game));
                    media_kind = Some(MediaKind::Game);
                }
                M::Giveaway(mg) => {
                    giveaway = Some(Giveaway::from_raw(mg));
                    media_kind = Some(MediaKind::Giveaway);
                }
                M::GiveawayResults(mg) => {
                    giveaway_winners = Some(GiveawayWinners::from_raw(mg, users));
                    media_kind = Some(MediaKind::GiveawayWinners);
                }
                M::Invoice(mi) => {
                    invoice = Some(Invoice::from_raw(mi));
                    media_kind = Some(MediaKind::Invoice);
                }
                M::Story(ms) => {
                    story = Some(Story::from_raw(ms));
                    media_kind = Some(MediaKind::Story);
                }
                M::Document(md) => {
                    if let Some(raw::enums::Document::Document(doc)) = md.document.as_ref() {
                        let attrs = DocumentAttrs::collect(doc);

                        if attrs.animated {
                            animation = Some(Animation::from_document(
                                doc,
                                attrs.video,
                                attrs.file_name.clone(),
                            ));
                            media_kind = Some(MediaKind::Animation);
                            has_media_spoiler = md.spoiler;
                        } else if let Some(sticker_attr) = attrs.sticker {
                            sticker = Some(Sticker::from_document(
                                doc,
                                sticker_attr,
                                attrs.image_size,
                                attrs.video,
                            ));
                            media_kind = Some(MediaKind::Sticker);
                        } else if let Some(video_attr) = attrs.video {
                            if video_attr.round_message {
                                video_note = Some(VideoNote::from_document(
                                    doc,
                                    video_attr,
                                    md.ttl_seconds,
                                ));
                                media_kind = Some(MediaKind::VideoNote);
                            } else {
                                let cover = md.video_cover.as_ref()
                                    .and_then(|p| Photo::from_raw(p, None));
                                video = Some(Video::from_document(
                                    doc,
                                    video_attr,
                                    attrs.file_name.clone(),
                                    md.ttl_seconds,
                                    cover,
                                    md.video_timestamp,
                                ));
                                media_kind = Some(MediaKind::Video);
                                has_media_spoiler = md.spoiler;

                                for alt in &md.alt_documents {
                                    let raw::enums::Document::Document(alt_doc) = alt else {
                                        continue;
                                    };
                                    let alt_attrs = DocumentAttrs::collect(alt_doc);
                                    if let Some(alt_video) = alt_attrs.video {
                                        alternative_videos.push(Video::from_document(
                                            alt_doc,
                                            alt_video,
                                            alt_attrs.file_name,
                                            None,
                                            None,
                                            None,
                                        ));
                                    }
                                }
                            }
                        } else if let Some(audio_attr) = attrs.audio {
                            if audio_attr.voice {
                                voice = Some(Voice::from_document(doc, audio_attr, md.ttl_seconds));
                                media_kind = Some(MediaKind::Voice);
                            } else {
                                audio = Some(Audio::from_document(
                                    doc,
                                    audio_attr,
                                    attrs.file_name.clone(),
                                ));
                                media_kind = Some(MediaKind::Audio);
                            }
                        } else {
                            document = Some(Document::from_document(doc, attrs.file_name.clone()));
                            media_kind = Some(MediaKind::Document);
                        }
                    }
                }
                M::WebPage(mw) => {
                    if let raw::enums::WebPage::Page(page) = &mw.webpage {
                        web_page = Some(WebPage::from_raw(page, mw));
                        media_kind = Some(MediaKind::WebPage);
                    }
                }
                M::Poll(mp) => {
                    poll = Some(Poll::from_raw(mp));
                    media_kind = Some(MediaKind::Poll);
                }
                M::Dice(md) => {
                    dice = Some(Dice::from_raw(md));
                    media_kind = Some(MediaKind::Dice);
                }
                M::PaidMedia(mp) => {
                    paid_media = Some(PaidMediaInfo::from_raw(mp));
                    media_kind = Some(MediaKind::PaidMedia);
                }
                M::Empty | M::Unsupported => {
                    tracing::debug!("[decode] unsupported media, leaving tag absent");
                }
            }
        }

        // Text/caption split: the body is text when there is no media, or
        // when the media is only a link preview; otherwise it is a caption.
        let body_is_text = media_kind.is_none() || web_page.is_some();
        let body = (!m.message.is_empty())
            .then(|| Str::with_entities(m.message.clone(), parsed_entities.clone()));
        let entity_list = (!parsed_entities.is_empty()).then(|| parsed_entities.clone());

        let (text, entities_field, caption, caption_entities) = if body_is_text {
            (body, entity_list, None, None)
        } else {
            (None, None, body, entity_list)
        };

        let mut msg = Message {
            id: m.id,
            date: timestamp_to_datetime(m.date),
            chat: Some(chat),
            from_user,
            sender_chat,
            sender_boost_count: m.from_boosts_applied,
            sender_business_bot: m.via_business_bot_id.and_then(|id| User::from_table(users, id)),
            via_bot: m.via_bot_id.and_then(|id| User::from_table(users, id)),
            text,
            entities: entities_field,
            caption,
            caption_entities,
            author_signature: m.post_author.clone(),
            has_protected_content: m.noforwards,
            has_media_spoiler,
            forward_from,
            forward_sender_name,
            forward_from_chat,
            forward_from_message_id,
            forward_signature,
            forward_date,
            mentioned: m.mentioned,
            outgoing: m.out,
            scheduled: opts.is_scheduled,
            from_scheduled: m.from_scheduled,
            from_offline: m.offline,
            media: media_kind,
            show_caption_above_media: m.invert_media,
            edit_date: optional_timestamp(m.edit_date),
            edit_hidden: m.edit_hide,
            media_group_id: m.grouped_id,
            effect_id: m.effect,
            photo,
            location,
            contact,
            venue,
            audio,
            voice,
            animation,
            game,
            giveaway,
            giveaway_winners,
            invoice,
            story,
            video,
            video_processing_pending: m.video_processing_pending,
            alternative_videos: (!alternative_videos.is_empty()).then_some(alternative_videos),
            video_note,
            sticker,
            document,
            web_page,
            poll,
            dice,
            paid_media,
            views: m.views,
            forwards: m.forwards,
            business_connection_id: opts.business_connection_id.clone(),
            reply_markup: m.reply_markup.as_ref().map(ReplyMarkup::from_raw),
            reactions: Reaction::parse_list(m.reactions.as_ref()),
            raw: Some(raw::enums::Message::Message(m.clone())),
            ..Message::default()
        };

        if m.entities.iter().any(|e| matches!(e, raw::enums::MessageEntity::Blockquote(_))) {
            msg.quote = true;
        }

        // A channel post relayed into the linked discussion group.
        if let Some(header) = &m.fwd_from {
            if let (Some(saved_peer), Some(_)) = (&header.saved_from_peer, header.saved_from_msg_id)
            {
                if let Some(raw::enums::Chat::Channel(channel)) =
                    chats.get(&peers::raw_peer_id(saved_peer))
                {
                    if !channel.megagroup {
                        msg.automatic_forward = true;
                    }
                }
            }
        }

        // Reply linkage.
        if let Some(reply) = &m.reply_to {
            match reply {
                raw::enums::MessageReplyHeader::Message(h) => {
                    msg.reply_to_message_id = h.reply_to_msg_id;
                    msg.reply_to_top_message_id = h.reply_to_top_id;

                    if h.forum_topic {
                        msg.topic_message = true;
                        let thread_id = thread_id_from_header(h);
                        msg.message_thread_id = Some(thread_id);
                        if let Some(topics) = topics {
                            msg.topic = topics.get(&thread_id).map(ForumTopic::from_record);
                        }
                    } else if h.quote {
                        let quote_entities = entities::parse_entities(&h.quote_entities, users);
                        msg.quote = true;
                        if body_is_text {
                            msg.quote_text = h.quote_text.as_ref()
                                .filter(|t| !t.is_empty())
                                .map(|t| Str::with_entities(t.clone(), quote_entities.clone()));
                            msg.quote_entities =
                                (!quote_entities.is_empty()).then_some(quote_entities);
                        }
                    }
                }
                raw::enums::MessageReplyHeader::Story(h) => {
                    msg.reply_to_story_id = Some(h.story_id);
                    msg.reply_to_story_user_id = Some(peers::marked_peer_id(&h.peer));
                }
            }

            if opts.reply_depth > 0 {
                if let Some(prefetched) = opts.prefetched_reply {
                    let nested = self
                        .decode_boxed(
                            prefetched,
                            users,
                            chats,
                            topics,
                            DecodeOptions {
                                is_scheduled: false,
                                reply_depth: 0,
                                business_connection_id: opts.business_connection_id.clone(),
                                prefetched_reply: None,
                            },
                        )
                        .await?;
                    msg.reply_to_message = Some(Box::new(nested));
                } else {
                    match reply {
                        raw::enums::MessageReplyHeader::Message(h) => {
                            // Cache key: the header's explicit origin peer if
                            // present, this chat otherwise.
                            let (key, by_explicit_id) = match &h.reply_to_peer_id {
                                Some(peer) => (
                                    (peers::marked_peer_id(peer), h.reply_to_msg_id.unwrap_or(0)),
                                    true,
                                ),
                                None => ((chat_id, h.reply_to_msg_id.unwrap_or(0)), false),
                            };

                            let mut target = self.cache.get(&key);
                            if target.is_none() {
                                let fetched = if by_explicit_id {
                                    self.connector
                                        .fetch_message(key.0, key.1, opts.reply_depth - 1)
                                        .await
                                } else {
                                    self.connector
                                        .fetch_replied_message(chat_id, m.id, opts.reply_depth - 1)
                                        .await
                                };
                                match fetched {
                                    Ok(t) => target = Some(t),
                                    Err(e) if e.is_swallowed_by_decode() => {}
                                    Err(e) => return Err(e),
                                }
                            }
                            msg.reply_to_message = target.map(Box::new);
                        }
                        raw::enums::MessageReplyHeader::Story(h) => {
                            if self.connector.is_bot() == Some(false) {
                                let story = self
                                    .connector
                                    .fetch_story(peers::marked_peer_id(&h.peer), h.story_id)
                                    .await?;
                                msg.reply_to_story = Some(story);
                            }
                        }
                    }
                }
            }
        }

        // Topic auto-resolution for regular users in forums.
        let chat_is_forum = msg.chat.as_ref().is_some_and(|c| c.is_forum);
        if msg.topic.is_none() && chat_is_forum && self.connector.is_bot() == Some(false) {
            let topic_id = msg.message_thread_id.unwrap_or(1);
            match self.connector.fetch_topic(chat_id, topic_id).await {
                Ok(topic) => msg.topic = Some(topic),
                Err(e) if e.is_swallowed_by_decode() => {}
                Err(e) => return Err(e),
            }
        }

        // Poll snapshots go stale; everything else is worth caching.
        if msg.poll.is_none() {
            self.cache.insert((chat_id, msg.id), msg.clone());
        }

        Ok(msg)
    }
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

/// A document's attribute set, split by kind for the media dispatch.
struct DocumentAttrs<'a> {
    file_name:  Option<String>,
    animated:   bool,
    sticker:    Option<&'a raw::types::DocumentAttributeSticker>,
    video:      Option<&'a raw::types::DocumentAttributeVideo>,
    audio:      Option<&'a raw::types::DocumentAttributeAudio>,
    image_size: Option<&'a raw::types::DocumentAttributeImageSize>,
}

impl<'a> DocumentAttrs<'a> {
    fn collect(doc: &'a raw::types::Document) -> Self {
        let mut attrs = Self {
            file_name:  None,
            animated:   false,
            sticker:    None,
            video:      None,
            audio:      None,
            image_size: None,
        };
        for attr in &doc.attributes {
            match attr {
                raw::enums::DocumentAttribute::Filename(f) => {
                    attrs.file_name = Some(f.file_name.clone());
                }
                raw::enums::DocumentAttribute::Animated      => attrs.animated = true,
                raw::enums::DocumentAttribute::Sticker(s)    => attrs.sticker = Some(s),
                raw::enums::DocumentAttribute::Video(v)      => attrs.video = Some(v),
                raw::enums::DocumentAttribute::Audio(a)      => attrs.audio = Some(a),
                raw::enums::DocumentAttribute::ImageSize(s)  => attrs.image_size = Some(s),
                raw::enums::DocumentAttribute::HasStickers   => {}
            }
        }
        attrs
    }
}

/// `from_user` XOR `sender_chat`: prefer the user-table entry for the sender
/// id, derive a chat from the sender peer otherwise.
fn resolve_sender(
    from_id: Option<&raw::enums::Peer>,
    peer_id: &raw::enums::Peer,
    users:   &HashMap<i64, raw::enums::User>,
    chats:   &HashMap<i64, raw::enums::Chat>,
) -> (Option<User>, Option<Chat>) {
    let sender_id = from_id.map(peers::raw_peer_id)
        .unwrap_or_else(|| peers::raw_peer_id(peer_id));
    let from_user = User::from_table(users, sender_id);
    if from_user.is_some() {
        return (from_user, None);
    }
    let sender_peer = from_id.unwrap_or(peer_id);
    (None, Some(Chat::from_peer(sender_peer, users, chats)))
}

/// Thread id of a forum-topic reply: the thread-top id, falling back to the
/// direct reply id, falling back to the general topic (`1`).
fn thread_id_from_header(h: &raw::types::MessageReplyHeader) -> i32 {
    h.reply_to_top_id
        .filter(|&id| id != 0)
        .or_else(|| h.reply_to_msg_id.filter(|&id| id != 0))
        .unwrap_or(1)
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn header(top_id: Option<i32>, msg_id: Option<i32>) -> raw::types::MessageReplyHeader {
        raw::types::MessageReplyHeader {
            reply_to_scheduled: false,
            forum_topic:        true,
            quote:              false,
            reply_to_msg_id:    msg_id,
            reply_to_peer_id:   None,
            reply_to_top_id:    top_id,
            quote_text:         None,
            quote_entities:     vec![],
            quote_offset:       None,
        }
    }

    #[test]
    fn thread_id_prefers_top_id() {
        assert_eq!(thread_id_from_header(&header(Some(40), Some(7))), 40);
    }

    #[test]
    fn thread_id_falls_back_to_direct_id_then_general() {
        assert_eq!(thread_id_from_header(&header(None, Some(7))), 7);
        assert_eq!(thread_id_from_header(&header(Some(0), Some(7))), 7);
        assert_eq!(thread_id_from_header(&header(None, None)), 1);
        assert_eq!(thread_id_from_header(&header(Some(0), Some(0))), 1);
    }

    #[test]
    fn link_requires_addressable_chat() {
        let mut msg = Message { id: 5, ..Message::default() };
        assert_eq!(msg.link(), None);

        let mut chat = Chat::from_peer(
            &raw::enums::Peer::Channel(raw::types::PeerChannel { channel_id: 99 }),
            &HashMap::new(),
            &HashMap::new(),
        );
        chat.username = Some("durov".into());
        msg.chat = Some(chat);
        assert_eq!(msg.link().as_deref(), Some("https://t.me/durov/5"));

        msg.chat.as_mut().unwrap().username = None;
        assert_eq!(msg.link().as_deref(), Some("https://t.me/c/99/5"));
    }
}
