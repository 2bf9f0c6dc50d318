use serde::{Deserialize, Serialize};

/// Events delivered by the chat network for one connected server.
///
/// `server` is the hostname of the connection the event arrived on.
/// Channel and nick fields keep whatever case the network sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ChatEvent {
    /// Registration finished; `nick` is the identity the bot ended up with
    Welcome { server: String, nick: String },

    /// A user joined a channel
    Join {
        server: String,
        channel: String,
        nick: String,
    },

    /// A user left a channel
    Part {
        server: String,
        channel: String,
        nick: String,
        #[serde(default)]
        reason: Option<String>,
    },

    /// A user was removed from a channel by someone else
    Kick {
        server: String,
        channel: String,
        nick: String,
        #[serde(default)]
        reason: Option<String>,
    },

    /// A user disconnected from the server
    Quit {
        server: String,
        nick: String,
        #[serde(default)]
        reason: Option<String>,
    },

    /// A user changed nickname
    Nick {
        server: String,
        old_nick: String,
        new_nick: String,
    },

    /// PRIVMSG. `channel` is the message target, which is the bot's own
    /// nick for private messages.
    Message {
        server: String,
        channel: String,
        nick: String,
        text: String,
    },

    /// NOTICE
    Notice {
        server: String,
        channel: String,
        nick: String,
        text: String,
    },

    /// CTCP ACTION (`/me`)
    Action {
        server: String,
        channel: String,
        nick: String,
        text: String,
    },

    /// RPL_NAMREPLY: a snapshot chunk of who is on a channel
    Names {
        server: String,
        channel: String,
        names: NameTokens,
    },

    /// A command already split out by the command layer
    Command {
        server: String,
        #[serde(default)]
        source: Option<String>,
        nick: String,
        name: String,
        #[serde(default)]
        params: Vec<String>,
    },
}

impl ChatEvent {
    /// Returns the server this event belongs to.
    pub fn server(&self) -> &str {
        match self {
            Self::Welcome { server, .. }
            | Self::Join { server, .. }
            | Self::Part { server, .. }
            | Self::Kick { server, .. }
            | Self::Quit { server, .. }
            | Self::Nick { server, .. }
            | Self::Message { server, .. }
            | Self::Notice { server, .. }
            | Self::Action { server, .. }
            | Self::Names { server, .. }
            | Self::Command { server, .. } => server,
        }
    }
}

/// Name-list payload. Some networks deliver one space-joined string, some
/// deliver one token per parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NameTokens {
    Joined(String),
    Split(Vec<String>),
}

impl NameTokens {
    /// Raw tokens with empty entries dropped. Prefixes are left in place.
    pub fn tokens(&self) -> Vec<&str> {
        match self {
            Self::Joined(line) => line.split(' ').filter(|t| !t.is_empty()).collect(),
            Self::Split(parts) => parts
                .iter()
                .map(String::as_str)
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }
}

/// A line the bot wants to send back to the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub server: String,
    pub target: String,
    pub text: String,
}
