//! Service client: broadcast, read-only queries and webhook validation.

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, instrument, warn};

use super::http::{HttpTransport, Transport};
use crate::config::Credentials;
use crate::crypto::signature::verify_signature;
use crate::crypto::{derive_password, encrypt_payload, webhook_signature};
use crate::error::AppResult;
use crate::models::{
    BroadcastRequest, BroadcastResult, ChannelList, ChannelUsers, ChannelUsersCount, Channels,
    ServiceStatus,
};

/// Client for the broadcast service REST API.
pub struct SocketBus<T = HttpTransport> {
    credentials: Arc<Credentials>,
    transport: T,
}

impl SocketBus<HttpTransport> {
    pub fn new(credentials: Credentials) -> AppResult<Self> {
        let transport = HttpTransport::new(&credentials)?;
        Ok(Self::with_transport(credentials, transport))
    }
}

impl<T: Transport> SocketBus<T> {
    pub fn with_transport(credentials: Credentials, transport: T) -> Self {
        Self {
            credentials: Arc::new(credentials),
            transport,
        }
    }

    pub fn credentials(&self) -> Arc<Credentials> {
        self.credentials.clone()
    }

    /// Send `event` to every channel concurrently.
    ///
    /// Never fails as a whole: each channel gets its own `result`, and the
    /// returned entries are in completion order.
    #[instrument(skip(self, channels, data))]
    pub async fn broadcast(
        &self,
        channels: impl Into<Channels>,
        event: &str,
        data: &Value,
    ) -> Vec<BroadcastResult> {
        let channels = channels.into();
        let mut pending: FuturesUnordered<_> = channels
            .iter()
            .map(|channel| async move {
                let result = match self.broadcast_one(channel, event, data).await {
                    Ok(()) => true,
                    Err(e) => {
                        warn!(channel = %channel, error = %e, "broadcast failed");
                        false
                    }
                };
                BroadcastResult {
                    channel: channel.to_string(),
                    result,
                }
            })
            .collect();

        let mut results = Vec::with_capacity(channels.len());
        while let Some(result) = pending.next().await {
            results.push(result);
        }

        let delivered = results.iter().filter(|r| r.result).count();
        info!(channels = results.len(), delivered, "broadcast");
        results
    }

    async fn broadcast_one(&self, channel: &str, event: &str, data: &Value) -> AppResult<()> {
        let request = BroadcastRequest {
            event: event.to_string(),
            data: self.channel_payload(channel, data)?,
        };
        let body = serde_json::to_value(&request)?;
        self.transport
            .post(&format!("/api/channels/{}/broadcast", channel), &body)
            .await?;
        Ok(())
    }

    /// Payload as sent to `channel`: the JSON text of the channel envelope
    /// when encryption is enabled, the data untouched otherwise.
    pub fn channel_payload(&self, channel: &str, data: &Value) -> AppResult<Value> {
        match self.credentials.encryption_key() {
            Some(key) => {
                let envelope = encrypt_payload(data, &derive_password(key, channel))?;
                Ok(Value::String(serde_json::to_string(&envelope)?))
            }
            None => Ok(data.clone()),
        }
    }

    /// Total of users online.
    pub async fn get_status(&self) -> AppResult<ServiceStatus> {
        self.get("/api/status").await
    }

    /// Channels currently in use.
    pub async fn get_channels(&self) -> AppResult<ChannelList> {
        self.get("/api/channels").await
    }

    pub async fn get_count_users_in_channel(&self, channel: &str) -> AppResult<ChannelUsersCount> {
        self.get(&format!("/api/channels/{}", channel)).await
    }

    pub async fn get_users_in_channel(&self, channel: &str) -> AppResult<ChannelUsers> {
        self.get(&format!("/api/channels/{}/users", channel)).await
    }

    /// Whether an inbound webhook's `Authorization` header came from the service.
    pub fn auth_webhook(&self, authorization: &str) -> bool {
        let expected = webhook_signature(self.credentials.app_id(), self.credentials.secret());
        verify_signature(&expected, authorization)
    }

    async fn get<R: DeserializeOwned>(&self, path: &str) -> AppResult<R> {
        let value = self.transport.get(path).await?;
        Ok(serde_json::from_value(value)?)
    }
}
