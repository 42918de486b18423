// SPDX-FileCopyrightText: 2026 Promoscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram-style channel source adapter for the Promoscan harvester.
//!
//! Talks to a channel history gateway over HTTP and implements
//! [`promoscan_core::MessageSource`] with newest-first pagination and a
//! date-window early exit.

pub mod client;
pub mod source;

pub use client::{ChannelClient, ChannelPost, ChatInfo, HttpChannelClient};
pub use source::TelegramSource;
