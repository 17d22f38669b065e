//! Peer-id resolution.
//!
//! The wire format carries *bare* ids (always positive, scoped to a peer
//! kind); the domain model uses *marked* ids where the kind is encoded in
//! the value: users stay positive, basic groups are negated, channels are
//! offset below [`MAX_CHANNEL_ID`].  Everything downstream of the decoder
//! (cache keys, reply linkage, chat ids) speaks marked ids.

use courier_raw::enums::Peer;

/// Lower bound of the marked channel-id range.
pub const MIN_CHANNEL_ID: i64 = -100_999_999_999_999;
/// Upper bound (exclusive) of the marked channel-id range; also the offset
/// used to convert between bare and marked channel ids.
pub const MAX_CHANNEL_ID: i64 = -1_000_000_000_000;
/// Lower bound of the marked basic-group range.
pub const MIN_CHAT_ID: i64 = -999_999_999_999;
/// Upper bound of the user-id range.
pub const MAX_USER_ID: i64 = 999_999_999_999;

/// The bare (unmarked) id carried inside a peer record.
pub fn raw_peer_id(peer: &Peer) -> i64 {
    match peer {
        Peer::User(p)    => p.user_id,
        Peer::Chat(p)    => p.chat_id,
        Peer::Channel(p) => p.channel_id,
    }
}

/// The marked id of a peer: positive for users, negated for basic groups,
/// channel-offset for channels.
pub fn marked_peer_id(peer: &Peer) -> i64 {
    match peer {
        Peer::User(p)    => p.user_id,
        Peer::Chat(p)    => -p.chat_id,
        Peer::Channel(p) => MAX_CHANNEL_ID - p.channel_id,
    }
}

/// Convert between a bare channel id and its marked form.
///
/// The conversion is its own inverse: `channel_id(channel_id(x)) == x`.
pub fn channel_id(id: i64) -> i64 {
    MAX_CHANNEL_ID - id
}

/// What kind of peer a marked id refers to, when it falls in a known range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PeerKind {
    User,
    Chat,
    Channel,
}

/// Classify a marked id. `None` for ids outside every known range.
pub fn peer_kind(marked_id: i64) -> Option<PeerKind> {
    if marked_id < 0 {
        if MIN_CHAT_ID <= marked_id {
            return Some(PeerKind::Chat);
        }
        if (MIN_CHANNEL_ID..MAX_CHANNEL_ID).contains(&marked_id) {
            return Some(PeerKind::Channel);
        }
    } else if 0 < marked_id && marked_id <= MAX_USER_ID {
        return Some(PeerKind::User);
    }
    None
}

// ─── Tests ────────────────────────────────────────────────────────────────────
