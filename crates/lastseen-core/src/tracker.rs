use std::collections::HashMap;

use lastseen_types::events::NameTokens;
use tracing::debug;

/// Characters other than ASCII letters and digits that may start a nick.
const NICK_SPECIALS: &str = "[]\\`_^{|}";

/// Outcome of a single-channel membership change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// The event was about another user and has been applied.
    Member,
    /// The event was about the bot itself.
    Own,
}

/// Nicks on one channel, keyed by their folded form.
#[derive(Debug, Default)]
struct ChannelMembers {
    name: String,
    members: HashMap<String, String>,
}

impl ChannelMembers {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            members: HashMap::new(),
        }
    }

    fn insert(&mut self, nick: &str) {
        self.members.insert(fold(nick), nick.to_string());
    }

    fn remove(&mut self, nick: &str) -> bool {
        self.members.remove(&fold(nick)).is_some()
    }

    fn contains(&self, nick: &str) -> bool {
        self.members.contains_key(&fold(nick))
    }
}

/// Best-effort view of who is on each channel, rebuilt from observed
/// events. Server keys are expected to be lower-cased by the caller; channel
/// and nick lookups ignore ASCII case.
#[derive(Debug)]
pub struct MembershipTracker {
    default_nick: String,
    /// server -> bot nick on that server, once known
    identities: HashMap<String, String>,
    /// server -> folded channel -> members
    servers: HashMap<String, HashMap<String, ChannelMembers>>,
}

impl MembershipTracker {
    pub fn new(default_nick: impl Into<String>) -> Self {
        Self {
            default_nick: default_nick.into(),
            identities: HashMap::new(),
            servers: HashMap::new(),
        }
    }

    /// The bot's nick on `server`.
    pub fn identity(&self, server: &str) -> &str {
        self.identities
            .get(server)
            .map(String::as_str)
            .unwrap_or(self.default_nick.as_str())
    }

    pub fn set_identity(&mut self, server: &str, nick: &str) {
        self.identities.insert(server.to_string(), nick.to_string());
    }

    pub fn is_self(&self, server: &str, nick: &str) -> bool {
        self.identity(server).eq_ignore_ascii_case(nick)
    }

    pub fn record_join(&mut self, server: &str, channel: &str, nick: &str) -> Change {
        let own = self.is_self(server, nick);
        let channels = self.servers.entry(server.to_string()).or_default();

        if own {
            // Fresh snapshot follows via the name list
            debug!(server, channel, "Joined channel, resetting member list");
            channels.insert(fold(channel), ChannelMembers::new(channel));
            return Change::Own;
        }

        channels
            .entry(fold(channel))
            .or_insert_with(|| ChannelMembers::new(channel))
            .insert(nick);
        Change::Member
    }

    pub fn record_part(&mut self, server: &str, channel: &str, nick: &str) -> Change {
        self.remove_from_channel(server, channel, nick)
    }

    pub fn record_kick(&mut self, server: &str, channel: &str, nick: &str) -> Change {
        self.remove_from_channel(server, channel, nick)
    }

    fn remove_from_channel(&mut self, server: &str, channel: &str, nick: &str) -> Change {
        let own = self.is_self(server, nick);
        let Some(channels) = self.servers.get_mut(server) else {
            return if own { Change::Own } else { Change::Member };
        };

        if own {
            debug!(server, channel, "Removing channel");
            channels.remove(&fold(channel));
            return Change::Own;
        }

        if let Some(members) = channels.get_mut(&fold(channel)) {
            members.remove(nick);
        }
        Change::Member
    }

    /// Remove `nick` from every channel on `server`. Returns the channels
    /// it was removed from; empty when `nick` is the bot.
    pub fn record_quit(&mut self, server: &str, nick: &str) -> Vec<String> {
        if self.is_self(server, nick) {
            return Vec::new();
        }

        let Some(channels) = self.servers.get_mut(server) else {
            return Vec::new();
        };

        let mut affected = Vec::new();
        for members in channels.values_mut() {
            if members.remove(nick) {
                debug!(server, channel = %members.name, nick, "Removing user from channel");
                affected.push(members.name.clone());
            }
        }
        affected.sort();
        affected
    }

    /// Rename `old_nick` to `new_nick` on every channel of `server` where it
    /// is present. Returns the affected channels; empty when the bot itself
    /// changed nick, in which case only the identity is updated.
    pub fn record_nick_change(&mut self, server: &str, old_nick: &str, new_nick: &str) -> Vec<String> {
        let own = self.is_self(server, old_nick);
        let mut affected = Vec::new();

        if let Some(channels) = self.servers.get_mut(server) {
            for members in channels.values_mut() {
                if members.remove(old_nick) {
                    members.insert(new_nick);
                    affected.push(members.name.clone());
                }
            }
        }

        if own {
            self.set_identity(server, new_nick);
            return Vec::new();
        }

        affected.sort();
        affected
    }

    /// Add a name-list snapshot chunk, stripping mode prefixes.
    pub fn load_names(&mut self, server: &str, channel: &str, names: &NameTokens) {
        debug!(server, channel, "Adding names to channel");

        let members = self
            .servers
            .entry(server.to_string())
            .or_default()
            .entry(fold(channel))
            .or_insert_with(|| ChannelMembers::new(channel));

        for token in names.tokens() {
            let nick = strip_name_prefix(token);
            if !nick.is_empty() {
                members.insert(nick);
            }
        }
    }

    pub fn is_present(&self, server: &str, channel: &str, nick: &str) -> bool {
        self.servers
            .get(server)
            .and_then(|channels| channels.get(&fold(channel)))
            .is_some_and(|members| members.contains(nick))
    }

    /// Channels currently tracked on `server`, sorted.
    pub fn channels(&self, server: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .servers
            .get(server)
            .map(|channels| channels.values().map(|m| m.name.clone()).collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    /// Members of `channel` in their original case, sorted.
    pub fn members(&self, server: &str, channel: &str) -> Vec<String> {
        let mut nicks: Vec<String> = self
            .servers
            .get(server)
            .and_then(|channels| channels.get(&fold(channel)))
            .map(|m| m.members.values().cloned().collect())
            .unwrap_or_default();
        nicks.sort();
        nicks
    }
}

fn fold(name: &str) -> String {
    name.to_ascii_lowercase()
}

fn is_nick_start(c: char) -> bool {
    c.is_ascii_alphanumeric() || NICK_SPECIALS.contains(c)
}

/// Drop rank/mode markers such as `@`, `+` or `&@` from a name-list token.
pub fn strip_name_prefix(token: &str) -> &str {
    token.trim_start_matches(|c: char| !is_nick_start(c))
}
