// Network adapter for the public WebSocket clients.

pub mod client;

pub use client::{world_update_serializer, ws_handler};
