use std::sync::Arc;

use lastseen_db::Database;
use lastseen_db::models::SeenRow;
use lastseen_types::models::{ActivityRecord, RecordKind};
use tracing::error;

use crate::ago::ago;
use crate::error::SeenError;
use crate::tracker::MembershipTracker;

/// A resolved "last seen" answer, ready to be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeenAnswer {
    /// Nick to display, in its recorded case
    pub nick: String,
    /// Whether the nick is believed to be on the channel right now
    pub present: bool,
    pub ago: String,
    /// What they were doing, e.g. "joining the channel."
    pub activity: String,
}

/// Answers "when was X last seen on this channel".
#[derive(Clone)]
pub struct SeenResolver {
    db: Arc<Database>,
}

impl SeenResolver {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Look up the latest record for `target` on `channel`, either under
    /// that nick or as the nick someone changed into. `Ok(None)` means the
    /// nick has never been seen there.
    pub fn resolve(
        &self,
        tracker: &MembershipTracker,
        server: &str,
        channel: &str,
        target: &str,
        now: i64,
    ) -> Result<Option<SeenAnswer>, SeenError> {
        let row = self
            .db
            .find_latest_seen(server, channel, target)
            .map_err(SeenError::StorageRead)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let record = decode_row(row)?;
        let (nick, activity) = describe(&record, target);
        let present = tracker.is_present(server, channel, &nick);

        Ok(Some(SeenAnswer {
            nick,
            present,
            ago: ago(record.time, now),
            activity,
        }))
    }
}

fn decode_row(row: SeenRow) -> Result<ActivityRecord, SeenError> {
    let kind = match RecordKind::try_from(row.kind) {
        Ok(kind) => kind,
        Err(code) => {
            error!(
                kind = code,
                time = row.time,
                server = %row.server,
                channel = %row.channel,
                nick = %row.nick,
                text = ?row.text,
                "Unknown record kind retrieved from database"
            );
            return Err(SeenError::UnknownRecordKind {
                kind: code,
                server: row.server,
                channel: row.channel,
                nick: row.nick,
            });
        }
    };

    Ok(ActivityRecord {
        server: row.server,
        channel: row.channel,
        nick: row.nick,
        time: row.time,
        kind,
        text: row.text,
    })
}

/// Pick the nick to display and describe the activity.
///
/// Every kind except a nick change displays the stored nick, whatever case
/// the query used. A nick change displays whichever side of the rename was
/// asked about.
pub fn describe(record: &ActivityRecord, target: &str) -> (String, String) {
    let text = record.text.as_deref().unwrap_or_default();

    let activity = match record.kind {
        RecordKind::Join => "joining the channel.".to_string(),
        RecordKind::Part => with_reason("leaving the channel", text),
        RecordKind::Kick => with_reason("being kicked from the channel", text),
        RecordKind::Quit => with_reason("disconnecting from IRC", text),
        RecordKind::Message => format!("saying: {}", text),
        RecordKind::Notice => format!("sending a notice: {}", text),
        RecordKind::Action => format!("saying: * {} {}", record.nick, text),
        RecordKind::NickChange => {
            return if target.eq_ignore_ascii_case(&record.nick) {
                (record.nick.clone(), format!("changing nick to {}.", text))
            } else {
                (text.to_string(), format!("changing nick from {}.", record.nick))
            };
        }
    };

    (record.nick.clone(), activity)
}

fn with_reason(phrase: &str, reason: &str) -> String {
    if reason.is_empty() {
        format!("{}.", phrase)
    } else {
        format!("{} ({})", phrase, reason)
    }
}
