//! # courier-client
//!
//! Raw-to-domain message decoding for a Telegram-style RPC client.
//!
//! The heart of the crate is [`Decoder::decode`]: it takes one raw wire
//! record (empty placeholder, service action, or content message) plus side
//! tables of known users/chats/topics, and produces one normalized
//! [`Message`] — service sub-kind resolved, media sub-kind resolved,
//! reply/forward linkage populated, formatting entities attached to the body
//! as a [`Str`].
//!
//! ## Behaviour contract
//!
//! - **Never fails on malformed-but-well-typed input.**  Unknown service
//!   actions, media kinds and document shapes degrade to "tag absent".
//! - **Swallows exactly two failure categories** at its guarded lookup
//!   sites (target not found, channel inaccessible); everything else
//!   propagates unchanged.  See [`errors::InvocationError`].
//! - **Reply recursion is bounded** by [`DecodeOptions::reply_depth`];
//!   `0` disables traversal entirely.
//! - **Caches what it decodes** in the injected [`MessageCache`] (except
//!   poll snapshots, whose live vote state would go stale) and resolves
//!   reply links cache-first.
//!
//! ## Example
//!
//! ```rust,no_run
//! # async fn demo<C: courier_client::Connector>(connector: C, raw_msg: courier_raw::enums::Message) -> Result<(), courier_client::InvocationError> {
//! use std::collections::HashMap;
//! use courier_client::{DecodeOptions, Decoder, MessageCache};
//!
//! let cache   = MessageCache::new(10_000);
//! let decoder = Decoder::new(&connector, &cache);
//!
//! let mut users = HashMap::new();
//! let chats     = HashMap::new();
//!
//! let message = decoder
//!     .decode(&raw_msg, &mut users, &chats, None, DecodeOptions::with_replies())
//!     .await?;
//!
//! if let Some(text) = &message.text {
//!     println!("{}", text.markdown());
//! }
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

pub mod cache;
pub mod chat;
pub mod connector;
pub mod entities;
pub mod errors;
pub mod markup;
pub mod media;
pub mod message;
pub mod parsers;
pub mod peers;
pub mod reaction;
pub mod service;
pub mod text;
pub mod topic;

mod time;

pub use cache::{MessageCache, MessageKey};
pub use chat::{Chat, ChatType, User};
pub use connector::Connector;
pub use entities::{MessageEntity, MessageEntityKind};
pub use errors::{InvocationError, RpcError};
pub use markup::ReplyMarkup;
pub use media::MediaKind;
pub use message::{DecodeOptions, Decoder, Message};
pub use reaction::Reaction;
pub use service::{ChatJoinType, ServiceKind};
pub use text::Str;
pub use topic::ForumTopic;
