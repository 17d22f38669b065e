//! End-to-end decoder tests against an in-memory connector.

use std::cell::Cell;
use std::collections::HashMap;

use courier_client::message::Message;
use courier_client::{
    ChatJoinType, Connector, DecodeOptions, Decoder, ForumTopic, InvocationError, MediaKind,
    MessageCache, RpcError, ServiceKind,
};
use courier_raw as raw;

// ─── MockConnector ────────────────────────────────────────────────────────────

/// Canned-response connector that counts every call.
#[derive(Default)]
struct MockConnector {
    is_bot: Option<bool>,

    users_response:  Vec<raw::enums::User>,
    message_response: Option<Message>,
    pinned_response:  Option<Message>,
    topic_response:   Option<ForumTopic>,

    /// RPC error names to fail with instead of answering.
    message_error: Option<&'static str>,
    pinned_error:  Option<&'static str>,
    topic_error:   Option<&'static str>,

    fetch_users_calls:   Cell<u32>,
    fetch_message_calls: Cell<u32>,
    fetch_replied_calls: Cell<u32>,
    fetch_pinned_calls:  Cell<u32>,
    fetch_topic_calls:   Cell<u32>,
    fetch_story_calls:   Cell<u32>,
    last_reply_depth:    Cell<u8>,
}

fn rpc(name: &str) -> InvocationError {
    InvocationError::Rpc(RpcError::from_wire(400, name))
}

impl Connector for MockConnector {
    async fn fetch_users(&self, _ids: &[i64]) -> Result<Vec<raw::enums::User>, InvocationError> {
        self.fetch_users_calls.set(self.fetch_users_calls.get() + 1);
        Ok(self.users_response.clone())
    }

    async fn fetch_message(
        &self,
        _chat_id:    i64,
        _message_id: i32,
        reply_depth: u8,
    ) -> Result<Message, InvocationError> {
        self.fetch_message_calls.set(self.fetch_message_calls.get() + 1);
        self.last_reply_depth.set(reply_depth);
        if let Some(name) = self.message_error {
            return Err(rpc(name));
        }
        self.message_response.clone().ok_or_else(|| rpc("MESSAGE_IDS_EMPTY"))
    }

    async fn fetch_replied_message(
        &self,
        _chat_id:    i64,
        _message_id: i32,
        reply_depth: u8,
    ) -> Result<Message, InvocationError> {
        self.fetch_replied_calls.set(self.fetch_replied_calls.get() + 1);
        self.last_reply_depth.set(reply_depth);
        if let Some(name) = self.message_error {
            return Err(rpc(name));
        }
        self.message_response.clone().ok_or_else(|| rpc("MESSAGE_IDS_EMPTY"))
    }

    async fn fetch_pinned_message(&self, _chat_id: i64) -> Result<Message, InvocationError> {
        self.fetch_pinned_calls.set(self.fetch_pinned_calls.get() + 1);
        if let Some(name) = self.pinned_error {
            return Err(rpc(name));
        }
        self.pinned_response.clone().ok_or_else(|| rpc("MESSAGE_IDS_EMPTY"))
    }

    async fn fetch_topic(&self, _chat_id: i64, _topic_id: i32) -> Result<ForumTopic, InvocationError> {
        self.fetch_topic_calls.set(self.fetch_topic_calls.get() + 1);
        if let Some(name) = self.topic_error {
            return Err(rpc(name));
        }
        self.topic_response.clone().ok_or_else(|| rpc("CHANNEL_FORUM_MISSING"))
    }

    async fn fetch_story(
        &self,
        _peer_id:  i64,
        _story_id: i32,
    ) -> Result<courier_client::media::Story, InvocationError> {
        self.fetch_story_calls.set(self.fetch_story_calls.get() + 1);
        Err(rpc("STORY_ID_INVALID"))
    }

    fn is_bot(&self) -> Option<bool> {
        self.is_bot
    }
}

// ─── Fixtures ─────────────────────────────────────────────────────────────────

const CHAT_PEER_ID: i64 = 99;
const MARKED_CHAT_ID: i64 = -99;

fn chat_peer() -> raw::enums::Peer {
    raw::enums::Peer::Chat(raw::types::PeerChat { chat_id: CHAT_PEER_ID })
}

fn content_message(id: i32) -> raw::types::Message {
    raw::types::Message {
        out:                      false,
        mentioned:                false,
        media_unread:             false,
        silent:                   false,
        post:                     false,
        from_scheduled:           false,
        legacy:                   false,
        edit_hide:                false,
        pinned:                   false,
        noforwards:               false,
        invert_media:             false,
        offline:                  false,
        video_processing_pending: false,
        id,
        from_id:                  None,
        peer_id:                  chat_peer(),
        saved_peer_id:            None,
        fwd_from:                 None,
        via_bot_id:               None,
        via_business_bot_id:      None,
        reply_to:                 None,
        date:                     1_700_000_000,
        message:                  String::new(),
        media:                    None,
        reply_markup:             None,
        entities:                 vec![],
        views:                    None,
        forwards:                 None,
        edit_date:                None,
        post_author:              None,
        grouped_id:               None,
        reactions:                None,
        ttl_period:               None,
        effect:                   None,
        from_boosts_applied:      None,
    }
}

fn service_message(id: i32, action: raw::enums::MessageAction) -> raw::types::MessageService {
    raw::types::MessageService {
        out:        false,
        mentioned:  false,
        silent:     false,
        post:       false,
        legacy:     false,
        id,
        from_id:    None,
        peer_id:    chat_peer(),
        reply_to:   None,
        date:       1_700_000_000,
        action,
        ttl_period: None,
    }
}

fn reply_header(msg_id: Option<i32>, top_id: Option<i32>, forum_topic: bool) -> raw::enums::MessageReplyHeader {
    raw::enums::MessageReplyHeader::Message(raw::types::MessageReplyHeader {
        reply_to_scheduled: false,
        forum_topic,
        quote:              false,
        reply_to_msg_id:    msg_id,
        reply_to_peer_id:   None,
        reply_to_top_id:    top_id,
        quote_text:         None,
        quote_entities:     vec![],
        quote_offset:       None,
    })
}

fn user_record(id: i64, first_name: &str) -> raw::enums::User {
    raw::enums::User::User(raw::types::User {
        is_self:        false,
        contact:        false,
        mutual_contact: false,
        deleted:        false,
        bot:            false,
        verified:       false,
        restricted:     false,
        scam:           false,
        fake:           false,
        premium:        false,
        support:        false,
        id,
        access_hash:    Some(1),
        first_name:     Some(first_name.into()),
        last_name:      None,
        username:       None,
        phone:          None,
        lang_code:      None,
    })
}

fn photo_media() -> raw::enums::MessageMedia {
    raw::enums::MessageMedia::Photo(raw::types::MessageMediaPhoto {
        spoiler: false,
        photo: Some(raw::enums::Photo::Photo(raw::types::Photo {
            has_stickers:   false,
            id:             11,
            access_hash:    12,
            file_reference: vec![],
            date:           1_700_000_000,
            sizes: vec![raw::enums::PhotoSize::Size(raw::types::PhotoSize {
                kind: "y".into(),
                w:    800,
                h:    600,
                size: 4096,
            })],
            dc_id: 2,
        })),
        ttl_seconds: None,
    })
}

fn voice_media() -> raw::enums::MessageMedia {
    raw::enums::MessageMedia::Document(raw::types::MessageMediaDocument {
        nopremium: false,
        spoiler:   false,
        document: Some(raw::enums::Document::Document(raw::types::Document {
            id:             7,
            access_hash:    8,
            file_reference: vec![],
            date:           1_700_000_000,
            mime_type:      "audio/ogg".into(),
            size:           1024,
            dc_id:          2,
            attributes: vec![raw::enums::DocumentAttribute::Audio(
                raw::types::DocumentAttributeAudio {
                    voice:     true,
                    duration:  3,
                    title:     None,
                    performer: None,
                    waveform:  None,
                },
            )],
        })),
        alt_documents:   vec![],
        video_cover:     None,
        video_timestamp: None,
        ttl_seconds:     None,
    })
}

fn poll_media() -> raw::enums::MessageMedia {
    raw::enums::MessageMedia::Poll(raw::types::MessageMediaPoll {
        poll: raw::types::Poll {
            id:              1,
            closed:          false,
            public_voters:   false,
            multiple_choice: false,
            quiz:            false,
            question:        "?".into(),
            answers:         vec![],
            close_period:    None,
            close_date:      None,
        },
        results: raw::types::PollResults {
            min:          false,
            results:      vec![],
            total_voters: None,
            solution:     None,
        },
    })
}

fn bold_span(offset: i32, length: i32) -> raw::enums::MessageEntity {
    raw::enums::MessageEntity::Bold(raw::types::MessageEntitySpan { offset, length })
}

async fn decode_one(
    connector: &MockConnector,
    cache:     &MessageCache,
    message:   raw::enums::Message,
    opts:      DecodeOptions<'_>,
) -> Result<Message, InvocationError> {
    let decoder = Decoder::new(connector, cache);
    let mut users = HashMap::new();
    let chats = HashMap::new();
    decoder.decode(&message, &mut users, &chats, None, opts).await
}

// ─── Empty records ────────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_record_decodes_to_placeholder() {
    let connector = MockConnector::default();
    let cache = MessageCache::new(16);
    let message = raw::enums::Message::Empty(raw::types::MessageEmpty { id: 3, peer_id: None });

    let decoded = decode_one(&connector, &cache, message, DecodeOptions::default())
        .await
        .unwrap();

    assert_eq!(decoded.id, 3);
    assert!(decoded.empty);
    assert!(decoded.chat.is_none());
    assert!(decoded.text.is_none());
    assert!(decoded.service.is_none());
    assert!(decoded.media.is_none());
    // Empty placeholders make no lookups and are not cached.
    assert!(cache.is_empty());
    assert_eq!(connector.fetch_users_calls.get(), 0);
}

// ─── Text / caption split ─────────────────────────────────────────────────────

#[tokio::test]
async fn body_without_media_is_text() {
    let connector = MockConnector::default();
    let cache = MessageCache::new(16);
    let mut m = content_message(1);
    m.message = "hello".into();

    let decoded = decode_one(&connector, &cache, raw::enums::Message::Message(m), DecodeOptions::default())
        .await
        .unwrap();

    assert_eq!(decoded.text.as_ref().unwrap(), &"hello");
    assert!(decoded.caption.is_none());
    assert!(decoded.entities.is_none());
    assert!(decoded.caption_entities.is_none());
}

#[tokio::test]
async fn body_with_photo_media_is_caption() {
    let connector = MockConnector::default();
    let cache = MessageCache::new(16);
    let mut m = content_message(1);
    m.message = "look".into();
    m.entities = vec![bold_span(0, 4)];
    m.media = Some(photo_media());

    let decoded = decode_one(&connector, &cache, raw::enums::Message::Message(m), DecodeOptions::default())
        .await
        .unwrap();

    assert_eq!(decoded.media, Some(MediaKind::Photo));
    assert!(decoded.photo.is_some());
    assert!(decoded.text.is_none());
    assert!(decoded.entities.is_none());
    assert_eq!(decoded.caption.as_ref().unwrap(), &"look");
    assert_eq!(decoded.caption_entities.as_ref().unwrap().len(), 1);
}

#[tokio::test]
async fn web_page_preview_keeps_body_as_text() {
    let connector = MockConnector::default();
    let cache = MessageCache::new(16);
    let mut m = content_message(1);
    m.message = "see https://example.com".into();
    m.media = Some(raw::enums::MessageMedia::WebPage(raw::types::MessageMediaWebPage {
        force_large_media: false,
        force_small_media: false,
        manual:            false,
        safe:              false,
        webpage: raw::enums::WebPage::Page(raw::types::WebPage {
            id:           5,
            url:          "https://example.com".into(),
            display_url:  "example.com".into(),
            kind:         None,
            site_name:    None,
            title:        None,
            description:  None,
            photo:        None,
            embed_url:    None,
            embed_type:   None,
            embed_width:  None,
            embed_height: None,
            duration:     None,
            author:       None,
        }),
    }));

    let decoded = decode_one(&connector, &cache, raw::enums::Message::Message(m), DecodeOptions::default())
        .await
        .unwrap();

    assert_eq!(decoded.media, Some(MediaKind::WebPage));
    assert!(decoded.web_page.is_some());
    assert!(decoded.text.is_some());
    assert!(decoded.caption.is_none());
}

#[tokio::test]
async fn pending_web_page_collapses_media_tag() {
    let connector = MockConnector::default();
    let cache = MessageCache::new(16);
    let mut m = content_message(1);
    m.message = "soon".into();
    m.media = Some(raw::enums::MessageMedia::WebPage(raw::types::MessageMediaWebPage {
        force_large_media: false,
        force_small_media: false,
        manual:            false,
        safe:              false,
        webpage: raw::enums::WebPage::Pending(raw::types::WebPagePending {
            id:   5,
            date: 1_700_000_000,
        }),
    }));

    let decoded = decode_one(&connector, &cache, raw::enums::Message::Message(m), DecodeOptions::default())
        .await
        .unwrap();

    assert!(decoded.media.is_none());
    assert!(decoded.web_page.is_none());
    assert!(decoded.text.is_some());
}

#[tokio::test]
async fn unsupported_media_collapses_to_absent() {
    let connector = MockConnector::default();
    let cache = MessageCache::new(16);
    let mut m = content_message(1);
    m.message = "still here".into();
    m.media = Some(raw::enums::MessageMedia::Unsupported);

    let decoded = decode_one(&connector, &cache, raw::enums::Message::Message(m), DecodeOptions::default())
        .await
        .unwrap();

    assert!(decoded.media.is_none());
    assert_eq!(decoded.text.as_ref().unwrap(), &"still here");
}

#[tokio::test]
async fn empty_body_is_none_not_empty_string() {
    let connector = MockConnector::default();
    let cache = MessageCache::new(16);
    let m = content_message(1);

    let decoded = decode_one(&connector, &cache, raw::enums::Message::Message(m), DecodeOptions::default())
        .await
        .unwrap();

    assert!(decoded.text.is_none());
    assert!(decoded.caption.is_none());
}

// ─── Entities ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn blockquote_entity_sets_quote_flag() {
    let connector = MockConnector::default();
    let cache = MessageCache::new(16);
    let mut m = content_message(1);
    m.message = "quoted".into();
    m.entities = vec![raw::enums::MessageEntity::Blockquote(
        raw::types::MessageEntityBlockquote { collapsed: false, offset: 0, length: 6 },
    )];

    let decoded = decode_one(&connector, &cache, raw::enums::Message::Message(m), DecodeOptions::default())
        .await
        .unwrap();

    assert!(decoded.quote);
}

#[tokio::test]
async fn bold_span_survives_markdown_projection() {
    let connector = MockConnector::default();
    let cache = MessageCache::new(16);
    let mut m = content_message(1);
    m.message = "hi #courier".into();
    m.entities = vec![bold_span(3, 8)];

    let decoded = decode_one(&connector, &cache, raw::enums::Message::Message(m), DecodeOptions::default())
        .await
        .unwrap();

    let text = decoded.text.unwrap();
    assert_eq!(text.markdown(), "hi **#courier**");

    // Re-parsing the projection reproduces the same text and span.
    let (plain, ents) = courier_client::parsers::parse_markdown(&text.markdown());
    assert_eq!(plain, "hi #courier");
    assert_eq!(ents.as_slice(), text.entities());
}

// ─── Media dispatch ───────────────────────────────────────────────────────────

#[tokio::test]
async fn voice_attribute_wins_over_audio() {
    let connector = MockConnector::default();
    let cache = MessageCache::new(16);
    let mut m = content_message(1);
    m.media = Some(voice_media());

    let decoded = decode_one(&connector, &cache, raw::enums::Message::Message(m), DecodeOptions::default())
        .await
        .unwrap();

    assert_eq!(decoded.media, Some(MediaKind::Voice));
    assert!(decoded.voice.is_some());
    assert!(decoded.audio.is_none());
    assert!(decoded.document.is_none());
}

#[tokio::test]
async fn alt_videos_collected_for_video_media() {
    let connector = MockConnector::default();
    let cache = MessageCache::new(16);

    let video_doc = |id: i64, w: i32| raw::types::Document {
        id,
        access_hash:    1,
        file_reference: vec![],
        date:           1_700_000_000,
        mime_type:      "video/mp4".into(),
        size:           1 << 20,
        dc_id:          2,
        attributes: vec![raw::enums::DocumentAttribute::Video(
            raw::types::DocumentAttributeVideo {
                round_message:       false,
                supports_streaming:  true,
                nosound:             false,
                duration:            10.0,
                w,
                h:                   w * 9 / 16,
                preload_prefix_size: None,
                video_start_ts:      None,
            },
        )],
    };

    let mut m = content_message(1);
    m.media = Some(raw::enums::MessageMedia::Document(raw::types::MessageMediaDocument {
        nopremium: false,
        spoiler:   false,
        document:  Some(raw::enums::Document::Document(video_doc(1, 1920))),
        alt_documents: vec![
            raw::enums::Document::Document(video_doc(2, 1280)),
            // A non-genuine document must be skipped silently.
            raw::enums::Document::Empty(raw::types::DocumentEmpty { id: 3 }),
        ],
        video_cover:     None,
        video_timestamp: None,
        ttl_seconds:     None,
    }));

    let decoded = decode_one(&connector, &cache, raw::enums::Message::Message(m), DecodeOptions::default())
        .await
        .unwrap();

    assert_eq!(decoded.media, Some(MediaKind::Video));
    assert_eq!(decoded.video.as_ref().unwrap().width, 1920);
    let alts = decoded.alternative_videos.unwrap();
    assert_eq!(alts.len(), 1);
    assert_eq!(alts[0].width, 1280);
}

// ─── Service dispatch ─────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_chat_photo_action() {
    let connector = MockConnector::default();
    let cache = MessageCache::new(16);
    let m = service_message(5, raw::enums::MessageAction::ChatDeletePhoto);

    let decoded = decode_one(&connector, &cache, raw::enums::Message::Service(m), DecodeOptions::default())
        .await
        .unwrap();

    assert_eq!(decoded.service, Some(ServiceKind::DeleteChatPhoto));
    assert!(decoded.delete_chat_photo);
    assert!(decoded.new_chat_title.is_none());
    assert!(decoded.new_chat_photo.is_none());
    assert!(decoded.gift.is_none());
    // Service messages are always cached.
    assert!(cache.get(&(MARKED_CHAT_ID, 5)).is_some());
}

#[tokio::test]
async fn member_added_resolves_users_and_join_type() {
    let connector = MockConnector::default();
    let cache = MessageCache::new(16);
    let m = service_message(
        6,
        raw::enums::MessageAction::ChatAddUser(raw::types::MessageActionChatAddUser {
            users: vec![7, 8],
        }),
    );

    let decoder = Decoder::new(&connector, &cache);
    let mut users = HashMap::from([(7, user_record(7, "Ada")), (8, user_record(8, "Grace"))]);
    let chats = HashMap::new();
    let decoded = decoder
        .decode(&raw::enums::Message::Service(m), &mut users, &chats, None, DecodeOptions::default())
        .await
        .unwrap();

    assert_eq!(decoded.service, Some(ServiceKind::NewChatMembers));
    assert_eq!(decoded.chat_join_type, Some(ChatJoinType::ByAdd));
    assert_eq!(decoded.new_chat_members.unwrap().len(), 2);
}

#[tokio::test]
async fn migration_ids_are_sign_adjusted() {
    let connector = MockConnector::default();
    let cache = MessageCache::new(16);

    let to = service_message(
        7,
        raw::enums::MessageAction::ChatMigrateTo(raw::types::MessageActionChatMigrateTo {
            channel_id: 4321,
        }),
    );
    let decoded = decode_one(&connector, &cache, raw::enums::Message::Service(to), DecodeOptions::default())
        .await
        .unwrap();
    assert_eq!(decoded.service, Some(ServiceKind::MigrateToChatId));
    assert_eq!(decoded.migrate_to_chat_id, Some(courier_client::peers::channel_id(4321)));

    let from = service_message(
        8,
        raw::enums::MessageAction::ChannelMigrateFrom(
            raw::types::MessageActionChannelMigrateFrom { title: "old".into(), chat_id: 1234 },
        ),
    );
    let decoded = decode_one(&connector, &cache, raw::enums::Message::Service(from), DecodeOptions::default())
        .await
        .unwrap();
    assert_eq!(decoded.service, Some(ServiceKind::MigrateFromChatId));
    assert_eq!(decoded.migrate_from_chat_id, Some(-1234));
}

#[tokio::test]
async fn topic_edit_dispatch_chain() {
    let connector = MockConnector::default();
    let cache = MessageCache::new(16);

    let edit = |title: Option<&str>, closed: Option<bool>, hidden: Option<bool>| {
        raw::enums::MessageAction::TopicEdit(raw::types::MessageActionTopicEdit {
            title:         title.map(str::to_string),
            icon_emoji_id: None,
            closed,
            hidden,
        })
    };

    let titled = decode_one(
        &connector, &cache,
        raw::enums::Message::Service(service_message(1, edit(Some("t"), None, None))),
        DecodeOptions::default(),
    ).await.unwrap();
    assert_eq!(titled.service, Some(ServiceKind::ForumTopicEdited));

    let hidden = decode_one(
        &connector, &cache,
        raw::enums::Message::Service(service_message(2, edit(None, None, Some(true)))),
        DecodeOptions::default(),
    ).await.unwrap();
    assert_eq!(hidden.service, Some(ServiceKind::GeneralTopicHidden));

    let closed = decode_one(
        &connector, &cache,
        raw::enums::Message::Service(service_message(3, edit(None, Some(true), None))),
        DecodeOptions::default(),
    ).await.unwrap();
    assert_eq!(closed.service, Some(ServiceKind::ForumTopicClosed));

    let reopened = decode_one(
        &connector, &cache,
        raw::enums::Message::Service(service_message(4, edit(None, None, None))),
        DecodeOptions::default(),
    ).await.unwrap();
    assert_eq!(reopened.service, Some(ServiceKind::ForumTopicReopened));
}

#[tokio::test]
async fn unclassified_action_leaves_service_absent() {
    let connector = MockConnector::default();
    let cache = MessageCache::new(16);
    let m = service_message(9, raw::enums::MessageAction::HistoryClear);

    let decoded = decode_one(&connector, &cache, raw::enums::Message::Service(m), DecodeOptions::default())
        .await
        .unwrap();

    assert!(decoded.service.is_none());
}

#[tokio::test]
async fn forum_topic_thread_id_fallback_on_service() {
    let connector = MockConnector::default();
    let cache = MessageCache::new(16);

    let mut m = service_message(10, raw::enums::MessageAction::ChatDeletePhoto);
    m.reply_to = Some(reply_header(Some(7), Some(0), true));
    let decoded = decode_one(&connector, &cache, raw::enums::Message::Service(m), DecodeOptions::default())
        .await
        .unwrap();
    assert!(decoded.topic_message);
    assert_eq!(decoded.message_thread_id, Some(7));

    let mut m = service_message(11, raw::enums::MessageAction::ChatDeletePhoto);
    m.reply_to = Some(reply_header(Some(0), Some(0), true));
    let decoded = decode_one(&connector, &cache, raw::enums::Message::Service(m), DecodeOptions::default())
        .await
        .unwrap();
    assert_eq!(decoded.message_thread_id, Some(1));
}

// ─── Pin resolution ───────────────────────────────────────────────────────────

#[tokio::test]
async fn pin_resolution_success_sets_service_and_target() {
    let connector = MockConnector {
        pinned_response: Some(Message { id: 77, ..Message::default() }),
        ..MockConnector::default()
    };
    let cache = MessageCache::new(16);
    let m = service_message(12, raw::enums::MessageAction::PinMessage);

    let decoded = decode_one(&connector, &cache, raw::enums::Message::Service(m), DecodeOptions::default())
        .await
        .unwrap();

    assert_eq!(decoded.service, Some(ServiceKind::PinnedMessage));
    assert_eq!(decoded.pinned_message.unwrap().id, 77);
    assert_eq!(connector.fetch_pinned_calls.get(), 1);
}

#[tokio::test]
async fn pin_resolution_failure_leaves_prior_state() {
    for error in ["MESSAGE_IDS_EMPTY", "CHANNEL_PRIVATE"] {
        let connector = MockConnector { pinned_error: Some(error), ..MockConnector::default() };
        let cache = MessageCache::new(16);
        let m = service_message(13, raw::enums::MessageAction::PinMessage);

        let decoded = decode_one(&connector, &cache, raw::enums::Message::Service(m), DecodeOptions::default())
            .await
            .unwrap();

        assert!(decoded.service.is_none(), "failed lookup must not set the tag");
        assert!(decoded.pinned_message.is_none());
    }
}

#[tokio::test]
async fn pin_resolution_unexpected_error_propagates() {
    let connector = MockConnector { pinned_error: Some("FLOOD_WAIT_30"), ..MockConnector::default() };
    let cache = MessageCache::new(16);
    let m = service_message(14, raw::enums::MessageAction::PinMessage);

    let result = decode_one(&connector, &cache, raw::enums::Message::Service(m), DecodeOptions::default()).await;
    assert!(matches!(result, Err(e) if e.is("FLOOD_WAIT")));
}

// ─── Reply resolution ─────────────────────────────────────────────────────────

#[tokio::test]
async fn depth_zero_never_fetches_replies() {
    let connector = MockConnector {
        message_response: Some(Message { id: 10, ..Message::default() }),
        ..MockConnector::default()
    };
    let cache = MessageCache::new(16);
    let mut m = content_message(20);
    m.reply_to = Some(reply_header(Some(10), None, false));

    let decoded = decode_one(
        &connector, &cache,
        raw::enums::Message::Message(m),
        DecodeOptions { reply_depth: 0, ..DecodeOptions::default() },
    ).await.unwrap();

    assert_eq!(decoded.reply_to_message_id, Some(10));
    assert!(decoded.reply_to_message.is_none());
    assert_eq!(connector.fetch_message_calls.get(), 0);
    assert_eq!(connector.fetch_replied_calls.get(), 0);
}

#[tokio::test]
async fn reply_fetch_decrements_depth() {
    let connector = MockConnector {
        message_response: Some(Message { id: 10, ..Message::default() }),
        ..MockConnector::default()
    };
    let cache = MessageCache::new(16);
    let mut m = content_message(20);
    m.reply_to = Some(reply_header(Some(10), None, false));

    let decoded = decode_one(
        &connector, &cache,
        raw::enums::Message::Message(m),
        DecodeOptions { reply_depth: 3, ..DecodeOptions::default() },
    ).await.unwrap();

    assert_eq!(decoded.reply_to_message.unwrap().id, 10);
    assert_eq!(connector.fetch_replied_calls.get(), 1);
    assert_eq!(connector.last_reply_depth.get(), 2);
}

#[tokio::test]
async fn reply_resolved_from_cache_without_fetch() {
    let connector = MockConnector::default();
    let cache = MessageCache::new(16);

    // Prime the cache with the reply target.
    let target = content_message(10);
    decode_one(&connector, &cache, raw::enums::Message::Message(target), DecodeOptions::default())
        .await
        .unwrap();

    let mut m = content_message(20);
    m.reply_to = Some(reply_header(Some(10), None, false));
    let decoded = decode_one(
        &connector, &cache,
        raw::enums::Message::Message(m),
        DecodeOptions::with_replies(),
    ).await.unwrap();

    assert_eq!(decoded.reply_to_message.unwrap().id, 10);
    assert_eq!(connector.fetch_message_calls.get(), 0);
    assert_eq!(connector.fetch_replied_calls.get(), 0);
}

#[tokio::test]
async fn reply_fetch_miss_is_swallowed() {
    let connector = MockConnector { message_error: Some("CHANNEL_PRIVATE"), ..MockConnector::default() };
    let cache = MessageCache::new(16);
    let mut m = content_message(20);
    m.reply_to = Some(reply_header(Some(10), None, false));

    let decoded = decode_one(
        &connector, &cache,
        raw::enums::Message::Message(m),
        DecodeOptions::with_replies(),
    ).await.unwrap();

    assert_eq!(decoded.reply_to_message_id, Some(10));
    assert!(decoded.reply_to_message.is_none());
}

#[tokio::test]
async fn prefetched_reply_is_decoded_with_exhausted_depth() {
    let connector = MockConnector::default();
    let cache = MessageCache::new(16);

    // The prefetched target itself replies to something; at depth 0 that
    // link must stay unresolved.
    let mut target = content_message(10);
    target.message = "original".into();
    target.reply_to = Some(reply_header(Some(5), None, false));
    let target = raw::enums::Message::Message(target);

    let mut m = content_message(20);
    m.reply_to = Some(reply_header(Some(10), None, false));

    let decoded = decode_one(
        &connector, &cache,
        raw::enums::Message::Message(m),
        DecodeOptions { reply_depth: 1, prefetched_reply: Some(&target), ..DecodeOptions::default() },
    ).await.unwrap();

    let nested = decoded.reply_to_message.unwrap();
    assert_eq!(nested.id, 10);
    assert_eq!(nested.text.as_ref().unwrap(), &"original");
    assert_eq!(nested.reply_to_message_id, Some(5));
    assert!(nested.reply_to_message.is_none());
    assert_eq!(connector.fetch_message_calls.get(), 0);
    assert_eq!(connector.fetch_replied_calls.get(), 0);
}

#[tokio::test]
async fn story_reply_records_ids_without_fetch_for_unknown_identity() {
    let connector = MockConnector::default(); // is_bot: None
    let cache = MessageCache::new(16);
    let mut m = content_message(21);
    m.reply_to = Some(raw::enums::MessageReplyHeader::Story(
        raw::types::MessageReplyStoryHeader {
            peer:     raw::enums::Peer::User(raw::types::PeerUser { user_id: 42 }),
            story_id: 9,
        },
    ));

    let decoded = decode_one(
        &connector, &cache,
        raw::enums::Message::Message(m),
        DecodeOptions::with_replies(),
    ).await.unwrap();

    assert_eq!(decoded.reply_to_story_id, Some(9));
    assert_eq!(decoded.reply_to_story_user_id, Some(42));
    assert!(decoded.reply_to_story.is_none());
    assert_eq!(connector.fetch_story_calls.get(), 0);
}

// ─── Private-exchange prefetch ────────────────────────────────────────────────

#[tokio::test]
async fn private_exchange_prefetch_merges_users() {
    let connector = MockConnector {
        users_response: vec![user_record(1, "Ada"), user_record(2, "Grace")],
        ..MockConnector::default()
    };
    let cache = MessageCache::new(16);

    let mut m = content_message(30);
    m.from_id = Some(raw::enums::Peer::User(raw::types::PeerUser { user_id: 1 }));
    m.peer_id = raw::enums::Peer::User(raw::types::PeerUser { user_id: 2 });
    m.message = "hi".into();

    let decoder = Decoder::new(&connector, &cache);
    let mut users = HashMap::new();
    let chats = HashMap::new();
    let decoded = decoder
        .decode(&raw::enums::Message::Message(m), &mut users, &chats, None, DecodeOptions::default())
        .await
        .unwrap();

    assert_eq!(connector.fetch_users_calls.get(), 1);
    assert_eq!(users.len(), 2, "fetched records must be merged into the table");
    assert_eq!(decoded.from_user.unwrap().first_name.as_deref(), Some("Ada"));
    assert!(decoded.sender_chat.is_none());
}

#[tokio::test]
async fn prefetch_skipped_when_users_known() {
    let connector = MockConnector::default();
    let cache = MessageCache::new(16);

    let mut m = content_message(31);
    m.from_id = Some(raw::enums::Peer::User(raw::types::PeerUser { user_id: 1 }));
    m.peer_id = raw::enums::Peer::User(raw::types::PeerUser { user_id: 2 });

    let decoder = Decoder::new(&connector, &cache);
    let mut users = HashMap::from([(1, user_record(1, "Ada")), (2, user_record(2, "Grace"))]);
    let chats = HashMap::new();
    decoder
        .decode(&raw::enums::Message::Message(m), &mut users, &chats, None, DecodeOptions::default())
        .await
        .unwrap();

    assert_eq!(connector.fetch_users_calls.get(), 0);
}

// ─── Forward linkage ──────────────────────────────────────────────────────────

#[tokio::test]
async fn automatic_forward_requires_broadcast_saved_peer() {
    let connector = MockConnector::default();
    let cache = MessageCache::new(16);

    let channel = raw::enums::Chat::Channel(raw::types::Channel {
        broadcast:          true,
        megagroup:          false,
        gigagroup:          false,
        forum:              false,
        verified:           false,
        restricted:         false,
        scam:               false,
        fake:               false,
        noforwards:         false,
        signatures:         false,
        id:                 500,
        access_hash:        Some(1),
        title:              "news".into(),
        username:           None,
        date:               0,
        participants_count: None,
    });

    let mut m = content_message(40);
    m.message = "post".into();
    m.fwd_from = Some(raw::types::MessageFwdHeader {
        imported:          false,
        saved_out:         false,
        from_id:           Some(raw::enums::Peer::Channel(raw::types::PeerChannel { channel_id: 500 })),
        from_name:         None,
        date:              1_700_000_000,
        channel_post:      Some(123),
        post_author:       Some("ed".into()),
        saved_from_peer:   Some(raw::enums::Peer::Channel(raw::types::PeerChannel { channel_id: 500 })),
        saved_from_msg_id: Some(123),
        psa_type:          None,
    });

    let decoder = Decoder::new(&connector, &cache);
    let mut users = HashMap::new();
    let chats = HashMap::from([(500, channel)]);
    let decoded = decoder
        .decode(&raw::enums::Message::Message(m), &mut users, &chats, None, DecodeOptions::default())
        .await
        .unwrap();

    assert!(decoded.automatic_forward);
    assert!(decoded.forward_from_chat.is_some());
    assert_eq!(decoded.forward_from_message_id, Some(123));
    assert_eq!(decoded.forward_signature.as_deref(), Some("ed"));
    assert!(decoded.forward_date.is_some());
}

#[tokio::test]
async fn hidden_sender_forward_uses_name() {
    let connector = MockConnector::default();
    let cache = MessageCache::new(16);
    let mut m = content_message(41);
    m.message = "fwd".into();
    m.fwd_from = Some(raw::types::MessageFwdHeader {
        imported:          false,
        saved_out:         false,
        from_id:           None,
        from_name:         Some("Someone".into()),
        date:              1_700_000_000,
        channel_post:      None,
        post_author:       None,
        saved_from_peer:   None,
        saved_from_msg_id: None,
        psa_type:          None,
    });

    let decoded = decode_one(&connector, &cache, raw::enums::Message::Message(m), DecodeOptions::default())
        .await
        .unwrap();

    assert_eq!(decoded.forward_sender_name.as_deref(), Some("Someone"));
    assert!(decoded.forward_from.is_none());
    assert!(decoded.forward_from_chat.is_none());
    assert!(!decoded.automatic_forward);
}

// ─── Caching ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn poll_messages_are_not_cached() {
    let connector = MockConnector::default();
    let cache = MessageCache::new(16);
    let mut m = content_message(50);
    m.media = Some(poll_media());

    let decoded = decode_one(&connector, &cache, raw::enums::Message::Message(m), DecodeOptions::default())
        .await
        .unwrap();

    assert_eq!(decoded.media, Some(MediaKind::Poll));
    assert!(cache.get(&(MARKED_CHAT_ID, 50)).is_none());

    let plain = content_message(51);
    decode_one(&connector, &cache, raw::enums::Message::Message(plain), DecodeOptions::default())
        .await
        .unwrap();
    assert!(cache.get(&(MARKED_CHAT_ID, 51)).is_some());
}

// ─── Idempotence ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn decoding_twice_with_fresh_caches_is_idempotent() {
    let mut m = content_message(60);
    m.message = "same".into();
    m.entities = vec![bold_span(0, 4)];
    let message = raw::enums::Message::Message(m);

    let connector = MockConnector::default();
    let first = decode_one(&connector, &MessageCache::new(16), message.clone(), DecodeOptions::default())
        .await
        .unwrap();
    let second = decode_one(&connector, &MessageCache::new(16), message, DecodeOptions::default())
        .await
        .unwrap();

    assert_eq!(first, second);
}

// ─── Topic auto-resolution ────────────────────────────────────────────────────

fn forum_chats() -> HashMap<i64, raw::enums::Chat> {
    HashMap::from([(300, raw::enums::Chat::Channel(raw::types::Channel {
        broadcast:          false,
        megagroup:          true,
        gigagroup:          false,
        forum:              true,
        verified:           false,
        restricted:         false,
        scam:               false,
        fake:               false,
        noforwards:         false,
        signatures:         false,
        id:                 300,
        access_hash:        Some(1),
        title:              "forum".into(),
        username:           None,
        date:               0,
        participants_count: None,
    }))])
}

fn forum_message(id: i32) -> raw::types::Message {
    let mut m = content_message(id);
    m.peer_id = raw::enums::Peer::Channel(raw::types::PeerChannel { channel_id: 300 });
    m.message = "in topic".into();
    m
}

#[tokio::test]
async fn topic_resolved_for_regular_user_in_forum() {
    let topic = ForumTopic {
        id:             1,
        date:           None,
        title:          "General".into(),
        icon_color:     0,
        icon_emoji_id:  None,
        top_message_id: 1,
        is_closed:      false,
        is_hidden:      false,
        is_pinned:      false,
        creator_id:     42,
    };
    let connector = MockConnector {
        is_bot: Some(false),
        topic_response: Some(topic),
        ..MockConnector::default()
    };
    let cache = MessageCache::new(16);

    let decoder = Decoder::new(&connector, &cache);
    let mut users = HashMap::new();
    let chats = forum_chats();
    let decoded = decoder
        .decode(&raw::enums::Message::Message(forum_message(70)), &mut users, &chats, None, DecodeOptions::default())
        .await
        .unwrap();

    assert_eq!(connector.fetch_topic_calls.get(), 1);
    assert_eq!(decoded.topic.unwrap().title, "General");
}

#[tokio::test]
async fn topic_resolution_skipped_for_bots_and_swallows_missing_forum() {
    // Bots never auto-resolve.
    let connector = MockConnector { is_bot: Some(true), ..MockConnector::default() };
    let cache = MessageCache::new(16);
    let decoder = Decoder::new(&connector, &cache);
    let mut users = HashMap::new();
    let chats = forum_chats();
    decoder
        .decode(&raw::enums::Message::Message(forum_message(71)), &mut users, &chats, None, DecodeOptions::default())
        .await
        .unwrap();
    assert_eq!(connector.fetch_topic_calls.get(), 0);

    // Regular users swallow the forum-missing failure.
    let connector = MockConnector {
        is_bot: Some(false),
        topic_error: Some("CHANNEL_FORUM_MISSING"),
        ..MockConnector::default()
    };
    let decoder = Decoder::new(&connector, &cache);
    let decoded = decoder
        .decode(&raw::enums::Message::Message(forum_message(72)), &mut users, &chats, None, DecodeOptions::default())
        .await
        .unwrap();
    assert_eq!(connector.fetch_topic_calls.get(), 1);
    assert!(decoded.topic.is_none());
}

#[tokio::test]
async fn supplied_topic_table_resolves_without_fetch() {
    let connector = MockConnector { is_bot: Some(false), ..MockConnector::default() };
    let cache = MessageCache::new(16);

    let mut m = forum_message(73);
    m.reply_to = Some(reply_header(Some(7), Some(40), true));

    let topics = HashMap::from([(40, raw::types::ForumTopic {
        my:            false,
        closed:        false,
        pinned:        false,
        hidden:        false,
        id:            40,
        date:          1_700_000_000,
        title:         "Releases".into(),
        icon_color:    0,
        icon_emoji_id: None,
        top_message:   40,
        from_id:       raw::enums::Peer::User(raw::types::PeerUser { user_id: 42 }),
    })]);

    let decoder = Decoder::new(&connector, &cache);
    let mut users = HashMap::new();
    let chats = forum_chats();
    let decoded = decoder
        .decode(&raw::enums::Message::Message(m), &mut users, &chats, Some(&topics), DecodeOptions::default())
        .await
        .unwrap();

    assert!(decoded.topic_message);
    assert_eq!(decoded.message_thread_id, Some(40));
    assert_eq!(decoded.topic.unwrap().title, "Releases");
    assert_eq!(connector.fetch_topic_calls.get(), 0);
}
