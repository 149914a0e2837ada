//! Signatures and payload encryption. Pure functions, no I/O.

pub mod cipher;
pub mod signature;

pub use cipher::{decrypt_payload, derive_app_password, derive_password, encrypt_payload};
pub use signature::{authorization_header, channel_auth_signature, webhook_signature};
