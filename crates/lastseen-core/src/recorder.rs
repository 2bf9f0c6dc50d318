use std::sync::Arc;

use lastseen_db::Database;
use lastseen_db::models::SeenRow;
use lastseen_types::models::ActivityRecord;

use crate::error::SeenError;

/// Writes the latest activity for a (server, channel, nick) key.
#[derive(Clone)]
pub struct ActivityRecorder {
    db: Arc<Database>,
}

impl ActivityRecorder {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Upsert `record`, replacing whatever was stored for its key.
    pub fn record_event(&self, record: &ActivityRecord) -> Result<(), SeenError> {
        let row = SeenRow {
            time: record.time,
            server: record.server.clone(),
            channel: record.channel.clone(),
            nick: record.nick.clone(),
            kind: record.kind.code(),
            text: record.text.clone(),
        };

        self.db.upsert_seen(&row).map_err(SeenError::StorageWrite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lastseen_types::models::RecordKind;

    fn record(time: i64, nick: &str, kind: RecordKind, text: Option<&str>) -> ActivityRecord {
        ActivityRecord {
            server: "srv".to_string(),
            channel: "#c".to_string(),
            nick: nick.to_string(),
            time,
            kind,
            text: text.map(str::to_string),
        }
    }

    #[test]
    fn second_event_replaces_first() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let recorder = ActivityRecorder::new(db.clone());

        recorder.record_event(&record(10, "bob", RecordKind::Join, None)).unwrap();
        recorder
            .record_event(&record(20, "Bob", RecordKind::Message, Some("hello")))
            .unwrap();

        assert_eq!(db.count_seen().unwrap(), 1);
        let row = db.get_seen("srv", "#c", "bob").unwrap().unwrap();
        assert_eq!(row.time, 20);
        assert_eq!(row.nick, "Bob");
        assert_eq!(row.kind, RecordKind::Message.code());
        assert_eq!(row.text.as_deref(), Some("hello"));
    }

    #[test]
    fn write_failure_is_reported() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        db.with_conn(|conn| {
            conn.execute_batch("DROP TABLE seen")?;
            Ok(())
        })
        .unwrap();

        let recorder = ActivityRecorder::new(db);
        let err = recorder
            .record_event(&record(10, "bob", RecordKind::Join, None))
            .unwrap_err();
        assert!(matches!(err, SeenError::StorageWrite(_)));
    }
}
