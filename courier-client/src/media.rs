//! Media-kind domain types and their raw→domain sub-decoders.
//!
//! Each constructor is a pure function over well-typed raw input.  Document
//! media is further classified by its attached attributes (animation,
//! sticker, video, audio, plain file); that secondary dispatch lives in the
//! decoder, which calls the `from_document` constructors here.

use chrono::{DateTime, Utc};
use courier_raw as raw;
use std::collections::HashMap;

use crate::chat::User;
use crate::peers;
use crate::time::timestamp_to_datetime;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

macro_rules! domain_type {
    ($(#[$meta:meta])* pub struct $name:ident $body:tt) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        pub struct $name $body
    };
    ($(#[$meta:meta])* pub enum $name:ident $body:tt) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        pub enum $name $body
    };
}

// ─── Media tag ────────────────────────────────────────────────────────────────

/// Which media sub-field of a `Message` is populated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MediaKind {
    Audio,
    Document,
    Photo,
    Sticker,
    Animation,
    Game,
    Giveaway,
    GiveawayWinners,
    Invoice,
    Story,
    Video,
    VideoNote,
    Voice,
    Contact,
    Location,
    Venue,
    WebPage,
    Dice,
    Poll,
    PaidMedia,
}

// ─── Photo ────────────────────────────────────────────────────────────────────

domain_type! {
    /// A photo, reduced to its largest size variant.
    pub struct Photo {
        pub id:           i64,
        pub width:        i32,
        pub height:       i32,
        pub file_size:    Option<i32>,
        pub date:         Option<DateTime<Utc>>,
        pub ttl_seconds:  Option<i32>,
        pub has_stickers: bool,
    }
}

impl Photo {
    /// `None` for empty placeholder records or records with no usable size.
    pub fn from_raw(photo: &raw::enums::Photo, ttl_seconds: Option<i32>) -> Option<Self> {
        let p = match photo {
            raw::enums::Photo::Empty(_) => return None,
            raw::enums::Photo::Photo(p) => p,
        };
        let best = p.sizes.iter()
            .filter_map(|s| match s {
                raw::enums::PhotoSize::Size(s) => Some(s),
                raw::enums::PhotoSize::Empty(_) => None,
            })
            .max_by_key(|s| s.w * s.h)?;
        Some(Self {
            id:           p.id,
            width:        best.w,
            height:       best.h,
            file_size:    Some(best.size),
            date:         timestamp_to_datetime(p.date),
            ttl_seconds,
            has_stickers: p.has_stickers,
        })
    }
}

// ─── Document family ──────────────────────────────────────────────────────────

domain_type! {
    /// A GIF-style soundless looping video.
    pub struct Animation {
        pub file_name: Option<String>,
        pub mime_type: String,
        pub file_size: i64,
        pub width:     i32,
        pub height:    i32,
        pub duration:  i32,
        pub date:      Option<DateTime<Utc>>,
    }
}

impl Animation {
    pub fn from_document(
        doc:        &raw::types::Document,
        video_attr: Option<&raw::types::DocumentAttributeVideo>,
        file_name:  Option<String>,
    ) -> Self {
        Self {
            file_name,
            mime_type: doc.mime_type.clone(),
            file_size: doc.size,
            width:     video_attr.map_or(0, |v| v.w),
            height:    video_attr.map_or(0, |v| v.h),
            duration:  video_attr.map_or(0, |v| v.duration as i32),
            date:      timestamp_to_datetime(doc.date),
        }
    }
}

domain_type! {
    pub struct Sticker {
        /// The emoji the sticker represents.
        pub emoji:       Option<String>,
        pub set_id:      Option<i64>,
        pub is_mask:     bool,
        pub is_animated: bool,
        pub is_video:    bool,
        pub width:       i32,
        pub height:      i32,
        pub file_size:   i64,
        pub date:        Option<DateTime<Utc>>,
    }
}

impl Sticker {
    pub fn from_document(
        doc:          &raw::types::Document,
        sticker_attr: &raw::types::DocumentAttributeSticker,
        image_size:   Option<&raw::types::DocumentAttributeImageSize>,
        video_attr:   Option<&raw::types::DocumentAttributeVideo>,
    ) -> Self {
        let (width, height) = match (image_size, video_attr) {
            (Some(s), _)    => (s.w, s.h),
            (None, Some(v)) => (v.w, v.h),
            (None, None)    => (512, 512),
        };
        Self {
            emoji:       if sticker_attr.alt.is_empty() { None } else { Some(sticker_attr.alt.clone()) },
            set_id:      sticker_attr.stickerset_id,
            is_mask:     sticker_attr.mask,
            is_animated: doc.mime_type == "application/x-tgsticker",
            is_video:    doc.mime_type == "video/webm",
            width,
            height,
            file_size:   doc.size,
            date:        timestamp_to_datetime(doc.date),
        }
    }
}

domain_type! {
    pub struct Video {
        pub file_name:          Option<String>,
        pub mime_type:          String,
        pub width:              i32,
        pub height:             i32,
        pub duration:           i32,
        pub supports_streaming: bool,
        pub file_size:          i64,
        pub date:               Option<DateTime<Utc>>,
        pub ttl_seconds:        Option<i32>,
        /// Cover photo, when the sender set one.
        pub cover:              Option<Photo>,
        /// Start offset of the preview frame, in seconds.
        pub start_timestamp:    Option<i32>,
    }
}

impl Video {
    pub fn from_document(
        doc:             &raw::types::Document,
        video_attr:      &raw::types::DocumentAttributeVideo,
        file_name:       Option<String>,
        ttl_seconds:     Option<i32>,
        cover:           Option<Photo>,
        start_timestamp: Option<i32>,
    ) -> Self {
        Self {
            file_name,
            mime_type:          doc.mime_type.clone(),
            width:              video_attr.w,
            height:             video_attr.h,
            duration:           video_attr.duration as i32,
            supports_streaming: video_attr.supports_streaming,
            file_size:          doc.size,
            date:               timestamp_to_datetime(doc.date),
            ttl_seconds,
            cover,
            start_timestamp,
        }
    }
}

domain_type! {
    /// A round video message.
    pub struct VideoNote {
        /// Diameter of the circle, in pixels.
        pub length:      i32,
        pub duration:    i32,
        pub mime_type:   String,
        pub file_size:   i64,
        pub date:        Option<DateTime<Utc>>,
        pub ttl_seconds: Option<i32>,
    }
}

impl VideoNote {
    pub fn from_document(
        doc:         &raw::types::Document,
        video_attr:  &raw::types::DocumentAttributeVideo,
        ttl_seconds: Option<i32>,
    ) -> Self {
        Self {
            length:      video_attr.w,
            duration:    video_attr.duration as i32,
            mime_type:   doc.mime_type.clone(),
            file_size:   doc.size,
            date:        timestamp_to_datetime(doc.date),
            ttl_seconds,
        }
    }
}

domain_type! {
    pub struct Voice {
        pub duration:    i32,
        pub waveform:    Option<Vec<u8>>,
        pub mime_type:   String,
        pub file_size:   i64,
        pub date:        Option<DateTime<Utc>>,
        pub ttl_seconds: Option<i32>,
    }
}

impl Voice {
    pub fn from_document(
        doc:         &raw::types::Document,
        audio_attr:  &raw::types::DocumentAttributeAudio,
        ttl_seconds: Option<i32>,
    ) -> Self {
        Self {
            duration:    audio_attr.duration,
            waveform:    audio_attr.waveform.clone(),
            mime_type:   doc.mime_type.clone(),
            file_size:   doc.size,
            date:        timestamp_to_datetime(doc.date),
            ttl_seconds,
        }
    }
}

domain_type! {
    pub struct Audio {
        pub duration:  i32,
        pub title:     Option<String>,
        pub performer: Option<String>,
        pub file_name: Option<String>,
        pub mime_type: String,
        pub file_size: i64,
        pub date:      Option<DateTime<Utc>>,
    }
}

impl Audio {
    pub fn from_document(
        doc:        &raw::types::Document,
        audio_attr: &raw::types::DocumentAttributeAudio,
        file_name:  Option<String>,
    ) -> Self {
        Self {
            duration:  audio_attr.duration,
            title:     audio_attr.title.clone(),
            performer: audio_attr.performer.clone(),
            file_name,
            mime_type: doc.mime_type.clone(),
            file_size: doc.size,
            date:      timestamp_to_datetime(doc.date),
        }
    }
}

domain_type! {
    /// A generic file with no recognized specialization.
    pub struct Document {
        pub file_name: Option<String>,
        pub mime_type: String,
        pub file_size: i64,
        pub date:      Option<DateTime<Utc>>,
    }
}

impl Document {
    pub fn from_document(doc: &raw::types::Document, file_name: Option<String>) -> Self {
        Self {
            file_name,
            mime_type: doc.mime_type.clone(),
            file_size: doc.size,
            date:      timestamp_to_datetime(doc.date),
        }
    }
}

// ─── Simple kinds ─────────────────────────────────────────────────────────────

domain_type! {
    pub struct Contact {
        pub phone_number: String,
        pub first_name:   String,
        pub last_name:    Option<String>,
        pub vcard:        Option<String>,
        pub user_id:      Option<i64>,
    }
}

impl Contact {
    pub fn from_raw(m: &raw::types::MessageMediaContact) -> Self {
        Self {
            phone_number: m.phone_number.clone(),
            first_name:   m.first_name.clone(),
            last_name:    if m.last_name.is_empty() { None } else { Some(m.last_name.clone()) },
            vcard:        if m.vcard.is_empty() { None } else { Some(m.vcard.clone()) },
            user_id:      if m.user_id == 0 { None } else { Some(m.user_id) },
        }
    }
}

domain_type! {
    pub struct Location {
        pub longitude:       f64,
        pub latitude:        f64,
        pub accuracy_radius: Option<i32>,
    }
}

impl Location {
    /// `None` for the empty placeholder point.
    pub fn from_raw(geo: &raw::enums::GeoPoint) -> Option<Self> {
        match geo {
            raw::enums::GeoPoint::Empty    => None,
            raw::enums::GeoPoint::Point(g) => Some(Self {
                longitude:       g.long,
                latitude:        g.lat,
                accuracy_radius: g.accuracy_radius,
            }),
        }
    }
}

domain_type! {
    pub struct Venue {
        pub location:   Option<Location>,
        pub title:      String,
        pub address:    String,
        pub provider:   Option<String>,
        pub venue_id:   Option<String>,
        pub venue_type: Option<String>,
    }
}

impl Venue {
    pub fn from_raw(m: &raw::types::MessageMediaVenue) -> Self {
        Self {
            location:   Location::from_raw(&m.geo),
            title:      m.title.clone(),
            address:    m.address.clone(),
            provider:   if m.provider.is_empty() { None } else { Some(m.provider.clone()) },
            venue_id:   if m.venue_id.is_empty() { None } else { Some(m.venue_id.clone()) },
            venue_type: if m.venue_type.is_empty() { None } else { Some(m.venue_type.clone()) },
        }
    }
}

domain_type! {
    pub struct Game {
        pub id:          i64,
        pub title:       String,
        pub short_name:  String,
        pub description: String,
        pub photo:       Option<Photo>,
    }
}

impl Game {
    pub fn from_raw(g: &raw::types::Game) -> Self {
        Self {
            id:          g.id,
            title:       g.title.clone(),
            short_name:  g.short_name.clone(),
            description: g.description.clone(),
            photo:       Photo::from_raw(&g.photo, None),
        }
    }
}

domain_type! {
    pub struct Giveaway {
        /// Marked ids of the channels taking part.
        pub chats:               Vec<i64>,
        pub quantity:            i32,
        pub months:              Option<i32>,
        pub star_count:          Option<i64>,
        pub prize_description:   Option<String>,
        pub until_date:          Option<DateTime<Utc>>,
        pub only_new_members:    bool,
        pub winners_are_visible: bool,
        pub country_codes:       Vec<String>,
    }
}

impl Giveaway {
    pub fn from_raw(m: &raw::types::MessageMediaGiveaway) -> Self {
        Self {
            chats:               m.channels.iter().map(|&id| peers::channel_id(id)).collect(),
            quantity:            m.quantity,
            months:              m.months,
            star_count:          m.stars,
            prize_description:   m.prize_description.clone(),
            until_date:          timestamp_to_datetime(m.until_date),
            only_new_members:    m.only_new_subscribers,
            winners_are_visible: m.winners_are_visible,
            country_codes:       m.countries_iso2.clone(),
        }
    }
}

domain_type! {
    /// Completed giveaway with its public winner list.
    pub struct GiveawayWinners {
        /// Marked id of the hosting channel.
        pub chat_id:             i64,
        pub giveaway_message_id: i32,
        pub winners_count:       i32,
        pub unclaimed_count:     i32,
        pub winners:             Vec<User>,
        pub months:              Option<i32>,
        pub star_count:          Option<i64>,
        pub prize_description:   Option<String>,
        pub until_date:          Option<DateTime<Utc>>,
        pub only_new_members:    bool,
        pub is_refunded:         bool,
    }
}

impl GiveawayWinners {
    pub fn from_raw(
        m:     &raw::types::MessageMediaGiveawayResults,
        users: &HashMap<i64, raw::enums::User>,
    ) -> Self {
        Self {
            chat_id:             peers::channel_id(m.channel_id),
            giveaway_message_id: m.launch_msg_id,
            winners_count:       m.winners_count,
            unclaimed_count:     m.unclaimed_count,
            winners:             m.winners.iter()
                                     .filter_map(|id| User::from_table(users, *id))
                                     .collect(),
            months:              m.months,
            star_count:          m.stars,
            prize_description:   m.prize_description.clone(),
            until_date:          timestamp_to_datetime(m.until_date),
            only_new_members:    m.only_new_subscribers,
            is_refunded:         m.refunded,
        }
    }
}

domain_type! {
    pub struct Invoice {
        pub title:                      String,
        pub description:                String,
        pub currency:                   String,
        pub total_amount:               i64,
        pub start_parameter:            Option<String>,
        pub is_test:                    bool,
        pub shipping_address_requested: bool,
        pub receipt_message_id:         Option<i32>,
    }
}

impl Invoice {
    pub fn from_raw(m: &raw::types::MessageMediaInvoice) -> Self {
        Self {
            title:                      m.title.clone(),
            description:                m.description.clone(),
            currency:                   m.currency.clone(),
            total_amount:               m.total_amount,
            start_parameter:            if m.start_param.is_empty() { None } else { Some(m.start_param.clone()) },
            is_test:                    m.test,
            shipping_address_requested: m.shipping_address_requested,
            receipt_message_id:         m.receipt_msg_id,
        }
    }
}

domain_type! {
    /// A reference to a story, as message media or as a reply target.
    pub struct Story {
        pub id: i32,
        /// Marked id of the story owner.
        pub peer_id: i64,
        pub via_mention: bool,
    }
}

impl Story {
    pub fn from_raw(m: &raw::types::MessageMediaStory) -> Self {
        Self {
            id:          m.id,
            peer_id:     peers::marked_peer_id(&m.peer),
            via_mention: m.via_mention,
        }
    }
}

domain_type! {
    /// A link preview.
    pub struct WebPage {
        pub id:                i64,
        pub url:               String,
        pub display_url:       String,
        pub kind:              Option<String>,
        pub site_name:         Option<String>,
        pub title:             Option<String>,
        pub description:       Option<String>,
        pub photo:             Option<Photo>,
        pub embed_url:         Option<String>,
        pub embed_type:        Option<String>,
        pub embed_width:       Option<i32>,
        pub embed_height:      Option<i32>,
        pub duration:          Option<i32>,
        pub author:            Option<String>,
        pub force_large_media: bool,
        pub force_small_media: bool,
        pub is_manual:         bool,
        pub is_safe:           bool,
    }
}

impl WebPage {
    pub fn from_raw(page: &raw::types::WebPage, media: &raw::types::MessageMediaWebPage) -> Self {
        Self {
            id:                page.id,
            url:               page.url.clone(),
            display_url:       page.display_url.clone(),
            kind:              page.kind.clone(),
            site_name:         page.site_name.clone(),
            title:             page.title.clone(),
            description:       page.description.clone(),
            photo:             page.photo.as_ref().and_then(|p| Photo::from_raw(p, None)),
            embed_url:         page.embed_url.clone(),
            embed_type:        page.embed_type.clone(),
            embed_width:       page.embed_width,
            embed_height:      page.embed_height,
            duration:          page.duration,
            author:            page.author.clone(),
            force_large_media: media.force_large_media,
            force_small_media: media.force_small_media,
            is_manual:         media.manual,
            is_safe:           media.safe,
        }
    }
}

// ─── Poll ─────────────────────────────────────────────────────────────────────

domain_type! {
    pub struct PollOption {
        pub text:        String,
        pub voter_count: i32,
        /// Opaque answer payload, used when voting.
        pub data:        Vec<u8>,
    }
}

domain_type! {
    pub struct Poll {
        pub id:                      i64,
        pub question:                String,
        pub options:                 Vec<PollOption>,
        pub total_voter_count:       i32,
        pub is_closed:               bool,
        pub is_anonymous:            bool,
        pub is_quiz:                 bool,
        pub allows_multiple_answers: bool,
        /// Index of the option the own account chose, if any.
        pub chosen_option:           Option<usize>,
    }
}

impl Poll {
    pub fn from_raw(m: &raw::types::MessageMediaPoll) -> Self {
        let mut chosen_option = None;
        let options = m.poll.answers.iter().enumerate().map(|(idx, answer)| {
            let votes = m.results.results.iter().find(|r| r.option == answer.option);
            if votes.is_some_and(|r| r.chosen) {
                chosen_option = Some(idx);
            }
            PollOption {
                text:        answer.text.clone(),
                voter_count: votes.map_or(0, |r| r.voters),
                data:        answer.option.clone(),
            }
        }).collect();

        Self {
            id:                      m.poll.id,
            question:                m.poll.question.clone(),
            options,
            total_voter_count:       m.results.total_voters.unwrap_or(0),
            is_closed:               m.poll.closed,
            is_anonymous:            !m.poll.public_voters,
            is_quiz:                 m.poll.quiz,
            allows_multiple_answers: m.poll.multiple_choice,
            chosen_option,
        }
    }
}

// ─── Dice ─────────────────────────────────────────────────────────────────────

domain_type! {
    pub struct Dice {
        pub emoji: String,
        pub value: i32,
    }
}

impl Dice {
    pub fn from_raw(m: &raw::types::MessageMediaDice) -> Self {
        Self { emoji: m.emoticon.clone(), value: m.value }
    }
}

// ─── Paid media ───────────────────────────────────────────────────────────────

domain_type! {
    /// One element of a paid-media album.
    pub enum PaidMedia {
        /// Blurred preview shown before purchase.
        Preview {
            width:    Option<i32>,
            height:   Option<i32>,
            duration: Option<i32>,
        },
        Photo(Photo),
        Video(Video),
    }
}

domain_type! {
    pub struct PaidMediaInfo {
        pub star_count: i64,
        pub paid_media: Vec<PaidMedia>,
    }
}

impl PaidMediaInfo {
    pub fn from_raw(m: &raw::types::MessageMediaPaidMedia) -> Self {
        let paid_media = m.extended_media.iter().filter_map(|em| match em {
            raw::enums::MessageExtendedMedia::Preview(p) => Some(PaidMedia::Preview {
                width:    p.w,
                height:   p.h,
                duration: p.video_duration,
            }),
            raw::enums::MessageExtendedMedia::Media(inner) => match inner.media.as_ref() {
                raw::enums::MessageMedia::Photo(p) => {
                    let photo = p.photo.as_ref().and_then(|ph| Photo::from_raw(ph, p.ttl_seconds))?;
                    Some(PaidMedia::Photo(photo))
                }
                raw::enums::MessageMedia::Document(d) => {
                    let doc = match d.document.as_ref()? {
                        raw::enums::Document::Document(doc) => doc,
                        raw::enums::Document::Empty(_) => return None,
                    };
                    let video_attr = doc.attributes.iter().find_map(|a| match a {
                        raw::enums::DocumentAttribute::Video(v) => Some(v),
                        _ => None,
                    })?;
                    Some(PaidMedia::Video(Video::from_document(
                        doc,
                        video_attr,
                        None,
                        d.ttl_seconds,
                        None,
                        None,
                    )))
                }
                _ => None,
            },
        }).collect();

        Self { star_count: m.stars_amount, paid_media }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
