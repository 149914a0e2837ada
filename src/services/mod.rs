//! Socket authorization built on the signature and cipher primitives.

pub mod auth;

pub use auth::ChannelAuthenticator;
