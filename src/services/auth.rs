//! Socket authorization for private and presence channels.

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde_json::Value;
use tracing::debug;

use crate::config::Credentials;
use crate::crypto::{
    channel_auth_signature, decrypt_payload, derive_app_password, derive_password, encrypt_payload,
};
use crate::error::{AppError, AppResult};
use crate::models::{AuthResponse, ChannelAuth, EncryptedEnvelope, PresenceAuth};

/// Answers "may socket S join channel C" with a signed token.
///
/// Signatures: `sha256(app_id:secret:socket_id:channel)`. When an encryption
/// key is configured every response also carries the channel's `e2e` password.
#[derive(Clone)]
pub struct ChannelAuthenticator {
    credentials: Arc<Credentials>,
}

impl ChannelAuthenticator {
    pub fn new(credentials: Credentials) -> Self {
        Self::from_shared(Arc::new(credentials))
    }

    pub fn from_shared(credentials: Arc<Credentials>) -> Self {
        Self { credentials }
    }

    /// Token for a private channel, or `noauth` when `authorized` is false.
    pub fn auth(&self, socket_id: &str, channel: &str, authorized: bool) -> AuthResponse {
        if !authorized {
            debug!(channel = %channel, socket_id = %socket_id, "socket not authorized");
            return AuthResponse::denied();
        }
        AuthResponse::Channel(self.sign(socket_id, channel))
    }

    /// Token for a presence channel with the member data sealed in `data`.
    ///
    /// Absent or falsy `presence_data` (`null`, `false`, `0`, `""`) yields `noauth`.
    /// `user_id` is not part of the signature.
    pub fn auth_presence(
        &self,
        socket_id: &str,
        channel: &str,
        user_id: &str,
        presence_data: Option<&Value>,
    ) -> AppResult<AuthResponse> {
        let data = match presence_data {
            Some(data) if !is_falsy(data) => data,
            _ => {
                debug!(channel = %channel, user_id = %user_id, "presence data missing, not authorized");
                return Ok(AuthResponse::denied());
            }
        };

        let sealed = self.seal_presence_data(channel, data)?;
        debug!(channel = %channel, user_id = %user_id, "presence auth issued");

        Ok(AuthResponse::Presence(PresenceAuth {
            channel: self.sign(socket_id, channel),
            data: sealed,
            presence: true,
        }))
    }

    /// Two-stage seal: the channel envelope (skipped without an encryption key),
    /// then the app-level envelope, base64 encoded.
    pub fn seal_presence_data(&self, channel: &str, data: &Value) -> AppResult<String> {
        let inner = self.inner_seal(channel, data)?;
        self.outer_seal(&inner)
    }

    /// Reverse of [`seal_presence_data`](Self::seal_presence_data).
    pub fn open_presence_data(&self, channel: &str, sealed: &str) -> AppResult<Value> {
        let inner = self.outer_open(sealed)?;
        match self.credentials.encryption_key() {
            Some(key) => {
                let envelope: EncryptedEnvelope = serde_json::from_str(&inner)?;
                decrypt_payload(&envelope, &derive_password(key, channel))
            }
            None => Ok(serde_json::from_str(&inner)?),
        }
    }

    fn sign(&self, socket_id: &str, channel: &str) -> ChannelAuth {
        let creds = &self.credentials;
        ChannelAuth {
            auth: channel_auth_signature(creds.app_id(), creds.secret(), socket_id, channel),
            e2e: creds.encryption_key().map(|key| derive_password(key, channel)),
        }
    }

    fn inner_seal(&self, channel: &str, data: &Value) -> AppResult<String> {
        match self.credentials.encryption_key() {
            Some(key) => {
                let envelope = encrypt_payload(data, &derive_password(key, channel))?;
                Ok(serde_json::to_string(&envelope)?)
            }
            None => Ok(serde_json::to_string(data)?),
        }
    }

    fn outer_seal(&self, inner: &str) -> AppResult<String> {
        let envelope = encrypt_payload(inner, &self.app_password())?;
        Ok(BASE64.encode(serde_json::to_string(&envelope)?))
    }

    fn outer_open(&self, sealed: &str) -> AppResult<String> {
        let raw = BASE64
            .decode(sealed)
            .map_err(|e| AppError::Crypto(format!("presence data: {}", e)))?;
        let envelope: EncryptedEnvelope = serde_json::from_slice(&raw)?;
        match decrypt_payload(&envelope, &self.app_password())? {
            Value::String(inner) => Ok(inner),
            other => Err(AppError::Crypto(format!(
                "presence data: expected sealed text, got {}",
                other
            ))),
        }
    }

    fn app_password(&self) -> String {
        derive_app_password(self.credentials.app_id(), self.credentials.secret())
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const APP_ID: &str = "s-1-J2PCu8g8sAejZeXx";
    const SECRET: &str = "cdKBpcruwYQ96kvIaYiorbTFxRDCbVfj";

    fn plain() -> ChannelAuthenticator {
        ChannelAuthenticator::new(Credentials::new(APP_ID, SECRET).unwrap())
    }

    fn encrypted() -> ChannelAuthenticator {
        ChannelAuthenticator::new(
            Credentials::new(APP_ID, SECRET)
                .unwrap()
                .with_encryption_key("My-test"),
        )
    }

    #[test]
    fn unauthorized_socket_gets_noauth() {
        for auth in [plain(), encrypted()] {
            let resp = auth.auth("socket-id", "some-channel", false);
            assert_eq!(serde_json::to_value(&resp).unwrap(), json!({"status": "noauth"}));
        }
    }

    #[test]
    fn auth_signature_is_64_hex() {
        let resp = encrypted().auth("socket-id", "some-channel", true);
        assert_eq!(
            resp.auth(),
            Some("de39fd4bb74d12511f67a63785c8a2e7f8428f56e24c02af8aa39fc01a9c70fd")
        );
        assert_eq!(resp.auth().map(str::len), Some(64));
    }

    #[test]
    fn e2e_only_when_key_configured() {
        assert_eq!(plain().auth("s", "some-channel", true).e2e(), None);
        assert_eq!(
            encrypted().auth("s", "some-channel", true).e2e(),
            Some("2c5e53cb2b4465f56fefe89b79c60549")
        );
    }

    #[test]
    fn presence_without_data_is_noauth() {
        let auth = encrypted();
        for data in [None, Some(json!(false)), Some(json!(null)), Some(json!(0)), Some(json!(""))] {
            let resp = auth
                .auth_presence("socket-id", "some-channel", "1", data.as_ref())
                .unwrap();
            assert!(!resp.is_authorized());
        }
    }

    #[test]
    fn presence_data_round_trips_through_both_stages() {
        let auth = encrypted();
        let data = json!({"user_id": 20});
        let resp = auth
            .auth_presence("socket-id", "presence-room", "1", Some(&data))
            .unwrap();

        let AuthResponse::Presence(presence) = &resp else {
            panic!("expected presence response, got {:?}", resp);
        };
        assert!(presence.presence);
        assert_eq!(presence.channel.e2e.as_deref().map(str::len), Some(32));
        assert_eq!(
            presence.channel.auth,
            channel_auth_signature(APP_ID, SECRET, "socket-id", "presence-room")
        );
        assert_eq!(auth.open_presence_data("presence-room", &presence.data).unwrap(), data);
    }

    #[test]
    fn inner_stage_is_channel_envelope() {
        let auth = encrypted();
        let sealed = auth.seal_presence_data("presence-room", &json!({"user_id": 20})).unwrap();

        let inner = auth.outer_open(&sealed).unwrap();
        let envelope: EncryptedEnvelope = serde_json::from_str(&inner).unwrap();
        let password = derive_password("My-test", "presence-room");
        assert_eq!(decrypt_payload(&envelope, &password).unwrap(), json!({"user_id": 20}));
    }

    #[test]
    fn without_key_only_outer_stage_applies() {
        let auth = plain();
        let sealed = auth.seal_presence_data("presence-room", &json!({"user_id": 7})).unwrap();
        assert_eq!(auth.outer_open(&sealed).unwrap(), r#"{"user_id":7}"#);
        assert_eq!(
            auth.open_presence_data("presence-room", &sealed).unwrap(),
            json!({"user_id": 7})
        );
    }

    #[test]
    fn presence_data_is_bound_to_channel() {
        let auth = encrypted();
        let sealed = auth.seal_presence_data("presence-a", &json!({"user_id": 1})).unwrap();
        let opened = auth.open_presence_data("presence-b", &sealed);
        assert!(opened.map(|v| v != json!({"user_id": 1})).unwrap_or(true));
    }

    #[test]
    fn garbage_presence_data_is_rejected() {
        assert!(plain().open_presence_data("presence-room", "%%%").is_err());
    }
}
