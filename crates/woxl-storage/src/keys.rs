//! Byte layouts of tree keys.
//!
//! All keys start with the big-endian chat id so a chat's rows can be read
//! with one prefix scan.

use woxl_common::{ChatId, UserId};

pub(crate) fn chat_key(chat: ChatId) -> [u8; 8] {
    chat.0.to_be_bytes()
}

pub(crate) fn member_key(chat: ChatId, user: UserId) -> [u8; 16] {
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&chat.0.to_be_bytes());
    key[8..].copy_from_slice(&user.0.to_be_bytes());
    key
}

pub(crate) fn record_key(chat: ChatId, id: u64) -> [u8; 16] {
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&chat.0.to_be_bytes());
    key[8..].copy_from_slice(&id.to_be_bytes());
    key
}
