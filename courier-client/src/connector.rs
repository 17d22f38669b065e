//! The decoder's view of the surrounding client.
//!
//! Every suspension point inside a decode call goes through this trait.
//! Implementations wrap the real RPC layer; tests substitute an in-memory
//! fake.  The decoder awaits these calls sequentially, never concurrently,
//! because later steps depend on earlier ones.

use courier_raw as raw;

use crate::errors::InvocationError;
use crate::media::Story;
use crate::message::Message;
use crate::topic::ForumTopic;

/// External lookups the decoder may perform while normalizing one record.
///
/// Failure contract: the decoder swallows the *not found* and
/// *inaccessible* categories (see
/// [`InvocationError::is_swallowed_by_decode`]) at its guarded call sites
/// and propagates everything else unchanged.
#[allow(async_fn_in_trait)]
pub trait Connector {
    /// Fetch full user records by bare id.
    ///
    /// Used once per decode at most, when a private 1:1 exchange references
    /// peers missing from the caller-supplied table.
    async fn fetch_users(&self, ids: &[i64]) -> Result<Vec<raw::enums::User>, InvocationError>;

    /// Fetch (and decode) a message by explicit id.
    ///
    /// `reply_depth` bounds how far the nested decode may itself chase
    /// reply links.
    async fn fetch_message(
        &self,
        chat_id:     i64,
        message_id:  i32,
        reply_depth: u8,
    ) -> Result<Message, InvocationError>;

    /// Fetch (and decode) the message that `message_id` replies to.
    async fn fetch_replied_message(
        &self,
        chat_id:     i64,
        message_id:  i32,
        reply_depth: u8,
    ) -> Result<Message, InvocationError>;

    /// Fetch (and decode) the chat's currently pinned message.
    async fn fetch_pinned_message(&self, chat_id: i64) -> Result<Message, InvocationError>;

    /// Fetch a forum topic by id.
    async fn fetch_topic(&self, chat_id: i64, topic_id: i32) -> Result<ForumTopic, InvocationError>;

    /// Fetch a story by its owner's marked id.
    async fn fetch_story(&self, peer_id: i64, story_id: i32) -> Result<Story, InvocationError>;

    /// Whether the logged-in account is a bot. `None` when identity is not
    /// yet known; topic auto-resolution and story fetches only run for
    /// `Some(false)`.
    fn is_bot(&self) -> Option<bool>;
}
