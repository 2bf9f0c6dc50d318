use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, error};

use lastseen_db::Database;
use lastseen_types::events::{ChatEvent, OutboundMessage};
use lastseen_types::models::{ActivityRecord, RecordKind};

use crate::command::parse_command;
use crate::recorder::ActivityRecorder;
use crate::replies::Reply;
use crate::resolver::SeenResolver;
use crate::tracker::{Change, MembershipTracker};

const SEEN_COMMAND: &str = "seen";
const SEEN_HELP_COMMAND: &str = "seen.help";

#[derive(Debug, Clone)]
pub struct SeenConfig {
    /// Bot nick used until a server reports otherwise
    pub nickname: String,
    /// Channel messages starting with `<prefix>seen` run the seen command
    pub command_prefix: Option<String>,
    /// Wrap nicks and labels in IRC bold
    pub bold: bool,
}

impl Default for SeenConfig {
    fn default() -> Self {
        Self {
            nickname: "seenbot".to_string(),
            command_prefix: Some("!".to_string()),
            bold: true,
        }
    }
}

/// Applies inbound events to the membership tracker and the seen store,
/// and answers seen commands.
///
/// Each event is handled to completion under the tracker lock, so a QUIT or
/// NICK that touches several channels never interleaves with another event.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

struct DispatcherInner {
    tracker: Mutex<MembershipTracker>,
    recorder: ActivityRecorder,
    resolver: SeenResolver,
    config: SeenConfig,
}

impl Dispatcher {
    pub fn new(db: Arc<Database>, config: SeenConfig) -> Self {
        Self {
            inner: Arc::new(DispatcherInner {
                tracker: Mutex::new(MembershipTracker::new(config.nickname.clone())),
                recorder: ActivityRecorder::new(db.clone()),
                resolver: SeenResolver::new(db),
                config,
            }),
        }
    }

    /// Handle an event stamped with the current time.
    pub fn handle(&self, event: ChatEvent) -> Option<OutboundMessage> {
        self.handle_at(event, chrono::Utc::now().timestamp())
    }

    /// Handle an event that happened at `now` (seconds since the epoch).
    /// Returns the reply to send, if any.
    pub fn handle_at(&self, event: ChatEvent, now: i64) -> Option<OutboundMessage> {
        let mut tracker = self.tracker();

        match event {
            ChatEvent::Welcome { server, nick } => {
                debug!(server = %server, nick = %nick, "Registered");
                tracker.set_identity(&server.to_lowercase(), &nick);
                None
            }

            ChatEvent::Join { server, channel, nick } => {
                let server = server.to_lowercase();
                if tracker.record_join(&server, &channel, &nick) == Change::Own {
                    debug!(server = %server, channel = %channel, "Nickname of incoming JOIN is ours, ignoring");
                    return None;
                }

                debug!(server = %server, channel = %channel, nick = %nick, "Processing incoming JOIN");
                self.record(&server, &channel, &nick, RecordKind::Join, None, now);
                None
            }

            ChatEvent::Part { server, channel, nick, reason } => {
                let server = server.to_lowercase();
                if tracker.record_part(&server, &channel, &nick) == Change::Own {
                    return None;
                }

                debug!(server = %server, channel = %channel, nick = %nick, reason = ?reason, "Processing incoming PART");
                self.record(&server, &channel, &nick, RecordKind::Part, reason, now);
                None
            }

            ChatEvent::Kick { server, channel, nick, reason } => {
                let server = server.to_lowercase();
                if tracker.record_kick(&server, &channel, &nick) == Change::Own {
                    return None;
                }

                debug!(server = %server, channel = %channel, nick = %nick, reason = ?reason, "Processing incoming KICK");
                self.record(&server, &channel, &nick, RecordKind::Kick, reason, now);
                None
            }

            ChatEvent::Quit { server, nick, reason } => {
                let server = server.to_lowercase();
                debug!(server = %server, nick = %nick, reason = ?reason, "Processing incoming QUIT");

                for channel in tracker.record_quit(&server, &nick) {
                    self.record(&server, &channel, &nick, RecordKind::Quit, reason.clone(), now);
                }
                None
            }

            ChatEvent::Nick { server, old_nick, new_nick } => {
                let server = server.to_lowercase();
                debug!(server = %server, nick = %old_nick, new_nick = %new_nick, "Processing incoming NICK");

                for channel in tracker.record_nick_change(&server, &old_nick, &new_nick) {
                    self.record(
                        &server,
                        &channel,
                        &old_nick,
                        RecordKind::NickChange,
                        Some(new_nick.clone()),
                        now,
                    );
                }
                None
            }

            ChatEvent::Message { server, channel, nick, text } => {
                let lowered = server.to_lowercase();
                if is_private(&tracker, &lowered, &channel, &nick) {
                    debug!("Incoming PRIVMSG not in channel, ignoring");
                    return None;
                }

                debug!(server = %lowered, channel = %channel, nick = %nick, "Processing incoming PRIVMSG");
                self.record(&lowered, &channel, &nick, RecordKind::Message, Some(text.clone()), now);

                let prefix = self.inner.config.command_prefix.as_deref()?;
                let command = parse_command(&text, prefix)?;
                self.command(&tracker, &server, Some(&channel), &nick, &command.name, &command.params, now)
            }

            ChatEvent::Notice { server, channel, nick, text } => {
                let server = server.to_lowercase();
                if is_private(&tracker, &server, &channel, &nick) {
                    debug!("Incoming NOTICE not in channel, ignoring");
                    return None;
                }

                debug!(server = %server, channel = %channel, nick = %nick, "Processing incoming NOTICE");
                self.record(&server, &channel, &nick, RecordKind::Notice, Some(text), now);
                None
            }

            ChatEvent::Action { server, channel, nick, text } => {
                let server = server.to_lowercase();
                if is_private(&tracker, &server, &channel, &nick) {
                    debug!("Incoming CTCP ACTION not in channel, ignoring");
                    return None;
                }

                debug!(server = %server, channel = %channel, nick = %nick, "Processing incoming CTCP ACTION");
                self.record(&server, &channel, &nick, RecordKind::Action, Some(text), now);
                None
            }

            ChatEvent::Names { server, channel, names } => {
                tracker.load_names(&server.to_lowercase(), &channel, &names);
                None
            }

            ChatEvent::Command { server, source, nick, name, params } => {
                self.command(&tracker, &server, source.as_deref(), &nick, &name, &params, now)
            }
        }
    }

    /// Run a read-only closure against the membership tracker.
    pub fn with_tracker<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&MembershipTracker) -> T,
    {
        f(&*self.tracker())
    }

    fn tracker(&self) -> MutexGuard<'_, MembershipTracker> {
        // Membership is a best-effort cache, a poisoned lock still holds usable state
        self.inner.tracker.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Upsert one record, logging and absorbing any failure.
    fn record(
        &self,
        server: &str,
        channel: &str,
        nick: &str,
        kind: RecordKind,
        text: Option<String>,
        time: i64,
    ) {
        let record = ActivityRecord {
            server: server.to_string(),
            channel: channel.to_string(),
            nick: nick.to_string(),
            time,
            kind,
            text,
        };

        if let Err(e) = self.inner.recorder.record_event(&record) {
            error!(server, channel, nick, "{}", e);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn command(
        &self,
        tracker: &MembershipTracker,
        server: &str,
        source: Option<&str>,
        nick: &str,
        name: &str,
        params: &[String],
        now: i64,
    ) -> Option<OutboundMessage> {
        let help = name.eq_ignore_ascii_case(SEEN_HELP_COMMAND);
        if !help && !name.eq_ignore_ascii_case(SEEN_COMMAND) {
            return None;
        }

        let lowered = server.to_lowercase();
        let source = match source {
            Some(source) if !is_private(tracker, &lowered, source, nick) => source,
            _ => {
                debug!("Command request not in channel, ignoring");
                return None;
            }
        };

        let target = params.first().map(|t| t.trim()).filter(|t| !t.is_empty());
        let reply = match target {
            Some(target) if !help => {
                match self.inner.resolver.resolve(tracker, &lowered, source, target, now) {
                    Ok(Some(answer)) => Reply::Seen(answer),
                    Ok(None) => Reply::NotSeen {
                        target: target.to_string(),
                        channel: source.to_string(),
                    },
                    Err(e) => {
                        error!(server = %lowered, channel = %source, target = %target, "{}", e);
                        Reply::Failed(e)
                    }
                }
            }
            _ => Reply::Usage,
        };

        Some(OutboundMessage {
            server: server.to_string(),
            target: source.to_string(),
            text: reply.render(self.inner.config.bold),
        })
    }
}

/// A message addressed to the bot or to the sender is a private query, not
/// channel activity.
fn is_private(tracker: &MembershipTracker, server: &str, target: &str, nick: &str) -> bool {
    target.eq_ignore_ascii_case(nick) || tracker.is_self(server, target)
}
