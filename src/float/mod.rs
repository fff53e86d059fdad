//! Float lookup sidecar client

pub mod client;
pub mod messages;

pub use client::FloatApiClient;
