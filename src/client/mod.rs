//! REST client for the broadcast service.

pub mod http;
pub mod service;

pub use http::{HttpTransport, Transport};
pub use service::SocketBus;
