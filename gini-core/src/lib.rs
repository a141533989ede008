//! Webhook plumbing and view models for the Dr. Gini research chat.

pub mod blocks;
pub mod client;
pub mod config;
pub mod cooldown;
pub mod error;
pub mod format;
pub mod identity;
pub mod intent;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod status;
pub mod transcript;

pub use client::{WebhookClient, Webhooks};
pub use config::{Config, Endpoint};
pub use error::{Error, Result};
pub use identity::Identity;
