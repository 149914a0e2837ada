//! Channel auth responses and the encrypted payload envelope.

use serde::{Deserialize, Serialize};

/// Self-describing encrypted payload. Field names are part of the wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedEnvelope {
    /// Base64 AES-256-CBC ciphertext.
    pub ct: String,
    /// Hex IV.
    pub iv: String,
    /// Hex salt.
    pub s: String,
}

/// Token a client socket presents to join a private channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelAuth {
    pub auth: String,
    /// Channel password for end-to-end encryption, when enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e2e: Option<String>,
}

/// Presence channel token with the encrypted member data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceAuth {
    #[serde(flatten)]
    pub channel: ChannelAuth,
    pub data: String,
    pub presence: bool,
}

/// `{ "status": "noauth" }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoAuth {
    pub status: String,
}

impl Default for NoAuth {
    fn default() -> Self {
        Self {
            status: "noauth".to_string(),
        }
    }
}

/// Outcome of a socket auth decision, serialized exactly as the client library expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuthResponse {
    Presence(PresenceAuth),
    Channel(ChannelAuth),
    Denied(NoAuth),
}

impl AuthResponse {
    pub fn denied() -> Self {
        AuthResponse::Denied(NoAuth::default())
    }

    pub fn is_authorized(&self) -> bool {
        !matches!(self, AuthResponse::Denied(_))
    }

    /// The auth signature, if authorized.
    pub fn auth(&self) -> Option<&str> {
        match self {
            AuthResponse::Presence(p) => Some(&p.channel.auth),
            AuthResponse::Channel(c) => Some(&c.auth),
            AuthResponse::Denied(_) => None,
        }
    }

    pub fn e2e(&self) -> Option<&str> {
        match self {
            AuthResponse::Presence(p) => p.channel.e2e.as_deref(),
            AuthResponse::Channel(c) => c.e2e.as_deref(),
            AuthResponse::Denied(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn denied_serializes_as_noauth() {
        let v = serde_json::to_value(AuthResponse::denied()).unwrap();
        assert_eq!(v, json!({"status": "noauth"}));
    }

    #[test]
    fn channel_auth_omits_missing_e2e() {
        let resp = AuthResponse::Channel(ChannelAuth {
            auth: "abc".into(),
            e2e: None,
        });
        assert_eq!(serde_json::to_value(&resp).unwrap(), json!({"auth": "abc"}));
    }

    #[test]
    fn presence_auth_is_flat() {
        let resp = AuthResponse::Presence(PresenceAuth {
            channel: ChannelAuth {
                auth: "abc".into(),
                e2e: Some("pw".into()),
            },
            data: "blob".into(),
            presence: true,
        });
        let v = serde_json::to_value(&resp).unwrap();
        assert_eq!(
            v,
            json!({"auth": "abc", "e2e": "pw", "data": "blob", "presence": true})
        );
        let back: AuthResponse = serde_json::from_value(v).unwrap();
        assert_eq!(back, resp);
    }
}
