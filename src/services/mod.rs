//! Session services consumed by the presentation layer.
//!
//! ARCHITECTURE
//! ============
//! `session` is the state holder consumers write intents to, `echo` plays the
//! network peer behind it, and `activity` / `chatbot` are the read-side and
//! canned-response helpers the feed and chat widget render from.

pub mod activity;
pub mod chatbot;
pub mod echo;
pub mod session;
