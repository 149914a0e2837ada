//! Server-side SDK for the SocketBus real-time broadcast service.
//!
//! Signs private and presence channel auth, optionally encrypts payloads
//! end-to-end before they leave the application, broadcasts events over
//! HTTP and validates inbound webhooks.

pub mod client;
pub mod config;
pub mod crypto;
pub mod error;
pub mod models;
pub mod services;

pub use client::{HttpTransport, SocketBus, Transport};
pub use config::{Config, Credentials};
pub use error::{AppError, AppResult};
pub use models::{AuthResponse, BroadcastResult, Channels, EncryptedEnvelope};
pub use services::ChannelAuthenticator;
