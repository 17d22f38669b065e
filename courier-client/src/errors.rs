//! Error types for courier-client.
//!
//! The decoder distinguishes exactly two swallowable failure categories —
//! *not found* and *inaccessible* — at its guarded lookup sites.  Everything
//! else propagates to the caller unmodified.

use std::{fmt, io};

// ─── RpcError ─────────────────────────────────────────────────────────────────

/// An error returned by the platform's servers in response to an RPC call.
///
/// Numeric values are stripped from the name and placed in [`RpcError::value`].
///
/// # Example
/// `FLOOD_WAIT_30` → `RpcError { code: 420, name: "FLOOD_WAIT", value: Some(30) }`
#[derive(Clone, Debug, PartialEq)]
pub struct RpcError {
    /// HTTP-like status code.
    pub code: i32,
    /// Error name in SCREAMING_SNAKE_CASE with digits removed.
    pub name: String,
    /// Numeric suffix extracted from the name, if any.
    pub value: Option<u32>,
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RPC {}: {}", self.code, self.name)?;
        if let Some(v) = self.value {
            write!(f, " (value: {v})")?;
        }
        Ok(())
    }
}

impl std::error::Error for RpcError {}

impl RpcError {
    /// Parse a raw server error message like `"FLOOD_WAIT_30"` into an `RpcError`.
    pub fn from_wire(code: i32, message: &str) -> Self {
        // Try to find a numeric suffix after the last underscore.
        // e.g. "FLOOD_WAIT_30" → name = "FLOOD_WAIT", value = Some(30)
        if let Some(idx) = message.rfind('_') {
            let suffix = &message[idx + 1..];
            if !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit()) {
                if let Ok(v) = suffix.parse::<u32>() {
                    let name = message[..idx].to_string();
                    return Self { code, name, value: Some(v) };
                }
            }
        }
        Self { code, name: message.to_string(), value: None }
    }

    /// Match on the error name, with optional wildcard prefix/suffix `'*'`.
    ///
    /// # Examples
    /// - `err.is("CHANNEL_PRIVATE")` — exact match
    /// - `err.is("PHONE_CODE_*")` — starts-with match
    /// - `err.is("*_INVALID")` — ends-with match
    pub fn is(&self, pattern: &str) -> bool {
        if let Some(prefix) = pattern.strip_suffix('*') {
            self.name.starts_with(prefix)
        } else if let Some(suffix) = pattern.strip_prefix('*') {
            self.name.ends_with(suffix)
        } else {
            self.name == pattern
        }
    }
}

// ─── InvocationError ──────────────────────────────────────────────────────────

/// The error type surfaced by every collaborator call the decoder makes.
#[derive(Debug)]
pub enum InvocationError {
    /// The server rejected the request.
    Rpc(RpcError),
    /// Network / I/O failure.
    Io(io::Error),
    /// Response deserialization failed.
    Deserialize(String),
    /// The request was dropped (e.g. sender task shut down).
    Dropped,
}

impl fmt::Display for InvocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rpc(e)         => write!(f, "{e}"),
            Self::Io(e)          => write!(f, "I/O error: {e}"),
            Self::Deserialize(s) => write!(f, "deserialize error: {s}"),
            Self::Dropped        => write!(f, "request dropped"),
        }
    }
}

impl std::error::Error for InvocationError {}

impl From<io::Error> for InvocationError {
    fn from(e: io::Error) -> Self { Self::Io(e) }
}

impl InvocationError {
    /// Returns `true` if this is the named RPC error (supports `'*'` wildcards).
    pub fn is(&self, pattern: &str) -> bool {
        match self {
            Self::Rpc(e) => e.is(pattern),
            _            => false,
        }
    }

    /// The referenced message, peer or topic does not exist.
    ///
    /// Decoder policy: swallow, leave the field unset.
    pub fn is_not_found(&self) -> bool {
        self.is("MESSAGE_IDS_EMPTY") || self.is("PEER_ID_INVALID")
    }

    /// The containing channel (or its forum) cannot be accessed.
    ///
    /// Decoder policy: swallow, leave the field unset.
    pub fn is_inaccessible(&self) -> bool {
        self.is("CHANNEL_PRIVATE") || self.is("CHANNEL_FORUM_MISSING")
    }

    /// `true` for the two failure categories the decoder absorbs at its
    /// guarded lookup sites.
    pub fn is_swallowed_by_decode(&self) -> bool {
        self.is_not_found() || self.is_inaccessible()
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_suffix_is_split_off() {
        let e = RpcError::from_wire(420, "FLOOD_WAIT_30");
        assert_eq!(e.name, "FLOOD_WAIT");
        assert_eq!(e.value, Some(30));
    }

    #[test]
    fn wildcard_matching() {
        let e = RpcError::from_wire(400, "PEER_ID_INVALID");
        assert!(e.is("PEER_ID_INVALID"));
        assert!(e.is("PEER_*"));
        assert!(e.is("*_INVALID"));
        assert!(!e.is("CHANNEL_PRIVATE"));
    }

    #[test]
    fn swallow_categories() {
        let not_found    = InvocationError::Rpc(RpcError::from_wire(400, "MESSAGE_IDS_EMPTY"));
        let inaccessible = InvocationError::Rpc(RpcError::from_wire(400, "CHANNEL_PRIVATE"));
        let other        = InvocationError::Rpc(RpcError::from_wire(420, "FLOOD_WAIT_30"));

        assert!(not_found.is_swallowed_by_decode());
        assert!(inaccessible.is_swallowed_by_decode());
        assert!(!other.is_swallowed_by_decode());
        assert!(!InvocationError::Dropped.is_swallowed_by_decode());
    }
}
