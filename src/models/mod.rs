//! Wire models: auth responses, encrypted envelopes, broadcast and query payloads.

pub mod auth;
pub mod channel;
pub mod event;

pub use auth::*;
pub use channel::*;
pub use event::*;
