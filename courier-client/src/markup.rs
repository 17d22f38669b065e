//! Reply-markup domain types.
//!
//! The wire carries one of four keyboard-markup records; each maps to its
//! own domain type.  An unrecognized record collapses to no markup at all.

use courier_raw::{enums, types};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};


/// A button on an inline keyboard (attached to the message).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InlineKeyboardButton {
    pub text: String,
    pub url: Option<String>,
    pub callback_data: Option<Vec<u8>>,
    pub web_app_url: Option<String>,
}

/// A button on a custom reply keyboard (shown instead of the input field).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KeyboardButton {
    pub text: String,
    pub request_contact: bool,
    pub request_location: bool,
}

#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReplyKeyboardMarkup {
    pub keyboard: Vec<Vec<KeyboardButton>>,
    pub resize_keyboard: bool,
    pub one_time_keyboard: bool,
    pub selective: bool,
    pub is_persistent: bool,
    pub placeholder: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReplyKeyboardRemove {
    pub selective: bool,
}

#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ForceReply {
    pub single_use: bool,
    pub selective: bool,
    pub placeholder: Option<String>,
}

/// The four markup shapes a message can carry.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ReplyMarkup {
    InlineKeyboard(InlineKeyboardMarkup),
    Keyboard(ReplyKeyboardMarkup),
    Remove(ReplyKeyboardRemove),
    ForceReply(ForceReply),
}

impl ReplyMarkup {
    /// Dispatch on the raw markup record.
    pub fn from_raw(raw: &enums::ReplyMarkup) -> Self {
        match raw {
            enums::ReplyMarkup::Inline(m) => Self::InlineKeyboard(InlineKeyboardMarkup {
                inline_keyboard: m.rows.iter().map(inline_row).collect(),
            }),
            enums::ReplyMarkup::Keyboard(m) => Self::Keyboard(ReplyKeyboardMarkup {
                keyboard:          m.rows.iter().map(reply_row).collect(),
                resize_keyboard:   m.resize,
                one_time_keyboard: m.single_use,
                selective:         m.selective,
                is_persistent:     m.persistent,
                placeholder:       m.placeholder.clone(),
            }),
            enums::ReplyMarkup::Hide(m) => Self::Remove(ReplyKeyboardRemove {
                selective: m.selective,
            }),
            enums::ReplyMarkup::ForceReply(m) => Self::ForceReply(ForceReply {
                single_use:  m.single_use,
                selective:   m.selective,
                placeholder: m.placeholder.clone(),
            }),
        }
    }
}

fn inline_row(row: &types::KeyboardButtonRow) -> Vec<InlineKeyboardButton> {
    row.buttons.iter().map(|b| {
        let mut button = InlineKeyboardButton {
            text: String::new(),
            url: None,
            callback_data: None,
            web_app_url: None,
        };
        match b {
            enums::KeyboardButton::Button(k)   => button.text = k.text.clone(),
            enums::KeyboardButton::Url(k)      => {
                button.text = k.text.clone();
                button.url = Some(k.url.clone());
            }
            enums::KeyboardButton::Callback(k) => {
                button.text = k.text.clone();
                button.callback_data = Some(k.data.clone());
            }
            enums::KeyboardButton::WebView(k)  => {
                button.text = k.text.clone();
                button.web_app_url = Some(k.url.clone());
            }
            enums::KeyboardButton::RequestPhone(k)       => button.text = k.text.clone(),
            enums::KeyboardButton::RequestGeoLocation(k) => button.text = k.text.clone(),
        }
        button
    }).collect()
}

fn reply_row(row: &types::KeyboardButtonRow) -> Vec<KeyboardButton> {
    row.buttons.iter().map(|b| {
        let mut button = KeyboardButton {
            text: String::new(),
            request_contact: false,
            request_location: false,
        };
        match b {
            enums::KeyboardButton::Button(k) => button.text = k.text.clone(),
            enums::KeyboardButton::RequestPhone(k) => {
                button.text = k.text.clone();
                button.request_contact = true;
            }
            enums::KeyboardButton::RequestGeoLocation(k) => {
                button.text = k.text.clone();
                button.request_location = true;
            }
            enums::KeyboardButton::Url(k)      => button.text = k.text.clone(),
            enums::KeyboardButton::Callback(k) => button.text = k.text.clone(),
            enums::KeyboardButton::WebView(k)  => button.text = k.text.clone(),
        }
        button
    }).collect()
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_markup_keeps_rows_and_payloads() {
        let raw = enums::ReplyMarkup::Inline(types::ReplyInlineMarkup {
            rows: vec![types::KeyboardButtonRow {
                buttons: vec![
                    enums::KeyboardButton::Url(types::KeyboardButtonUrl {
                        text: "open".into(),
                        url: "https://example.com".into(),
                    }),
                    enums::KeyboardButton::Callback(types::KeyboardButtonCallback {
                        requires_password: false,
                        text: "go".into(),
                        data: b"x".to_vec(),
                    }),
                ],
            }],
        });
        let ReplyMarkup::InlineKeyboard(markup) = ReplyMarkup::from_raw(&raw) else {
            panic!("expected inline keyboard");
        };
        assert_eq!(markup.inline_keyboard.len(), 1);
        assert_eq!(markup.inline_keyboard[0][0].url.as_deref(), Some("https://example.com"));
        assert_eq!(markup.inline_keyboard[0][1].callback_data.as_deref(), Some(&b"x"[..]));
    }

    #[test]
    fn hide_maps_to_remove() {
        let raw = enums::ReplyMarkup::Hide(types::ReplyKeyboardHide { selective: true });
        assert_eq!(
            ReplyMarkup::from_raw(&raw),
            ReplyMarkup::Remove(ReplyKeyboardRemove { selective: true })
        );
    }
}
