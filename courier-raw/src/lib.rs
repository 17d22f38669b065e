//! Raw Telegram wire-record types.
//!
//! These mirror the shapes the transport layer delivers, after TL
//! deserialization and before any domain interpretation.  The decoder in
//! `courier-client` consumes them read-only; nothing here owns behaviour.
//!
//! # Overview
//!
//! | Module    | Contents                                          |
//! |-----------|---------------------------------------------------|
//! | [`types`] | Concrete constructors (bare records) as `struct`s |
//! | [`enums`] | Boxed types (tagged unions) as `enum`s            |
//!
//! The split follows the TL convention: a union like `Message` is an enum in
//! [`enums`], each of its constructors (`messageEmpty`, `messageService`,
//! `message`) a struct in [`types`].
//!
//! Only the records the decoding pipeline reads are represented.  Wire
//! serialization belongs to the transport layer and is deliberately absent.

#![deny(unsafe_code)]
#![allow(clippy::large_enum_variant)]

pub mod enums;
pub mod types;
