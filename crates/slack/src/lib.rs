//! Slack outgoing-webhook interface for blockbot.
//!
//! - **Webhook** (`webhook`) - inbound form payload and the JSON reply envelope
//! - **Commands** (`commands`) - trigger-word stripping, classification, mention parsing, routing
//! - **Replies** (`replies`) - the text posted back to the channel
//!
//! ```text
//! POST / (form) → normalize_webhook → CommandRouter → BlockCommandService
//!                                          ↓
//!                              replies::* → WebhookReply (JSON)
//! ```

pub mod commands;
pub mod replies;
pub mod webhook;
