// SPDX-FileCopyrightText: 2026 Promoscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! IMAP mailbox source adapter for the Promoscan harvester.
//!
//! Implements [`promoscan_core::MessageSource`] over async-imap with
//! rustls TLS, parsing fetched RFC 822 payloads via mail-parser into the
//! uniform raw message record.

pub mod message;
pub mod session;
pub mod source;

pub use message::{UNKNOWN_SENDER, parse_raw_message};
pub use source::{MailSource, MailSourceConfig};
