//! Channel naming and broadcast targets.

use serde::{Deserialize, Serialize};

/// Kind of channel, inferred from its name prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelType {
    Public,
    /// `private-*`: sockets need a signed auth token.
    Private,
    /// `presence-*`: auth token plus member data.
    Presence,
}

impl ChannelType {
    pub fn from_name(name: &str) -> Self {
        if name.starts_with("presence-") {
            ChannelType::Presence
        } else if name.starts_with("private-") {
            ChannelType::Private
        } else {
            ChannelType::Public
        }
    }

    pub fn requires_auth(&self) -> bool {
        !matches!(self, ChannelType::Public)
    }
}

/// One or many channel names to broadcast to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Channels(Vec<String>);

impl Channels {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl From<&str> for Channels {
    fn from(channel: &str) -> Self {
        Channels(vec![channel.to_string()])
    }
}

impl From<String> for Channels {
    fn from(channel: String) -> Self {
        Channels(vec![channel])
    }
}

impl From<Vec<String>> for Channels {
    fn from(channels: Vec<String>) -> Self {
        Channels(channels)
    }
}

impl From<Vec<&str>> for Channels {
    fn from(channels: Vec<&str>) -> Self {
        channels.into_iter().collect()
    }
}

impl From<&[&str]> for Channels {
    fn from(channels: &[&str]) -> Self {
        channels.iter().copied().collect()
    }
}

impl<const N: usize> From<[&str; N]> for Channels {
    fn from(channels: [&str; N]) -> Self {
        channels.into_iter().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for Channels {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Channels(iter.into_iter().map(Into::into).collect())
    }
}
