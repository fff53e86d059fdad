//! Notification sink

pub mod discord;
pub mod messages;

pub use discord::DiscordNotifier;
pub use messages::WebhookMessage;
