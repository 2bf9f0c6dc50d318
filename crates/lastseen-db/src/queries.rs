use crate::models::SeenRow;
use crate::Database;
use anyhow::Result;
use lastseen_types::models::RecordKind;
use rusqlite::{Connection, OptionalExtension};

const SEEN_COLUMNS: &str = "time, server, channel, nick, kind, text";

impl Database {
    /// Insert the row, replacing any existing row with the same
    /// (server, channel, nick) key. The replacement takes the new row's
    /// nick case.
    pub fn upsert_seen(&self, row: &SeenRow) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO seen (time, server, channel, nick, kind, text)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    row.time,
                    row.server,
                    row.channel,
                    row.nick,
                    row.kind,
                    row.text
                ],
            )?;
            Ok(())
        })
    }

    /// Exact key lookup (case-insensitive).
    pub fn get_seen(&self, server: &str, channel: &str, nick: &str) -> Result<Option<SeenRow>> {
        self.with_conn(|conn| query_seen_by_key(conn, server, channel, nick))
    }

    /// Most recent row on `channel` that is either about `nick` or records
    /// somebody changing their nick to `nick`.
    pub fn find_latest_seen(
        &self,
        server: &str,
        channel: &str,
        nick: &str,
    ) -> Result<Option<SeenRow>> {
        self.with_conn(|conn| query_latest_seen(conn, server, channel, nick))
    }

    pub fn count_seen(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM seen", [], |row| row.get(0))?;
            Ok(count as u64)
        })
    }
}

fn map_seen_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SeenRow> {
    Ok(SeenRow {
        time: row.get(0)?,
        server: row.get(1)?,
        channel: row.get(2)?,
        nick: row.get(3)?,
        kind: row.get(4)?,
        text: row.get(5)?,
    })
}

fn query_seen_by_key(
    conn: &Connection,
    server: &str,
    channel: &str,
    nick: &str,
) -> Result<Option<SeenRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SEEN_COLUMNS} FROM seen WHERE server = ?1 AND channel = ?2 AND nick = ?3"
    ))?;

    let row = stmt
        .query_row([server, channel, nick], map_seen_row)
        .optional()?;

    Ok(row)
}

fn query_latest_seen(
    conn: &Connection,
    server: &str,
    channel: &str,
    nick: &str,
) -> Result<Option<SeenRow>> {
    // rowid breaks ties inside one second: INSERT OR REPLACE always
    // allocates a fresh rowid, so the later write wins.
    let mut stmt = conn.prepare(&format!(
        "SELECT {SEEN_COLUMNS}
         FROM seen
         WHERE server = ?1
           AND channel = ?2
           AND (nick = ?3 OR (kind = ?4 AND text = ?3))
         ORDER BY time DESC, rowid DESC
         LIMIT 1"
    ))?;

    let row = stmt
        .query_row(
            rusqlite::params![server, channel, nick, RecordKind::NickChange.code()],
            map_seen_row,
        )
        .optional()?;

    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(time: i64, server: &str, channel: &str, nick: &str, kind: RecordKind, text: Option<&str>) -> SeenRow {
        SeenRow {
            time,
            server: server.to_string(),
            channel: channel.to_string(),
            nick: nick.to_string(),
            kind: kind.code(),
            text: text.map(str::to_string),
        }
    }

    #[test]
    fn schema_has_expected_columns_and_index() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            let mut stmt = conn.prepare("PRAGMA table_info(seen)")?;
            let columns = stmt
                .query_map([], |r| r.get::<_, String>(1))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            assert_eq!(columns, ["time", "server", "channel", "nick", "kind", "text"]);

            let unique: i64 = conn.query_row(
                "SELECT \"unique\" FROM pragma_index_list('seen') WHERE name = 'seen_primary'",
                [],
                |r| r.get(0),
            )?;
            assert_eq!(unique, 1);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn plain_insert_violates_case_insensitive_key() {
        let db = Database::open_in_memory().unwrap();
        let result = db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO seen (time, server, channel, nick, kind, text)
                 VALUES (1234567890, 'nonexistent.server', '#nonexistent', 'NonExistentNick', 0, NULL)",
                [],
            )?;
            conn.execute(
                "INSERT INTO seen (time, server, channel, nick, kind, text)
                 VALUES (135792468, 'NONEXISTENT.SERVER', '#NonExistent', 'NONEXISTENTNICK', 1, 'Dummy text')",
                [],
            )?;
            Ok(())
        });
        assert!(result.is_err());
    }

    #[test]
    fn upsert_keeps_one_row_per_key() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_seen(&row(100, "srv", "#c", "bob", RecordKind::Join, None)).unwrap();
        db.upsert_seen(&row(200, "srv", "#C", "Bob", RecordKind::Part, Some("bye"))).unwrap();

        assert_eq!(db.count_seen().unwrap(), 1);
        let stored = db.get_seen("SRV", "#c", "BOB").unwrap().unwrap();
        assert_eq!(stored, row(200, "srv", "#C", "Bob", RecordKind::Part, Some("bye")));
    }

    #[test]
    fn latest_matches_nick_change_target() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_seen(&row(100, "srv", "#c", "Old", RecordKind::NickChange, Some("New")))
            .unwrap();

        let by_old = db.find_latest_seen("srv", "#c", "old").unwrap().unwrap();
        let by_new = db.find_latest_seen("srv", "#c", "NEW").unwrap().unwrap();
        assert_eq!(by_old, by_new);
        assert_eq!(by_old.nick, "Old");
    }

    #[test]
    fn latest_ignores_message_text_matching_nick() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_seen(&row(100, "srv", "#c", "Alice", RecordKind::Message, Some("Bob")))
            .unwrap();

        assert_eq!(db.find_latest_seen("srv", "#c", "Bob").unwrap(), None);
    }

    #[test]
    fn latest_prefers_newest_row() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_seen(&row(100, "srv", "#c", "Old", RecordKind::NickChange, Some("New")))
            .unwrap();
        db.upsert_seen(&row(300, "srv", "#c", "New", RecordKind::Message, Some("hi")))
            .unwrap();

        let latest = db.find_latest_seen("srv", "#c", "New").unwrap().unwrap();
        assert_eq!(latest.kind, RecordKind::Message.code());

        // Same second: the later write wins
        db.upsert_seen(&row(300, "srv", "#c", "Other", RecordKind::NickChange, Some("New")))
            .unwrap();
        let latest = db.find_latest_seen("srv", "#c", "New").unwrap().unwrap();
        assert_eq!(latest.nick, "Other");
    }

    #[test]
    fn lookups_are_scoped_to_server_and_channel() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_seen(&row(100, "srv", "#c", "Bob", RecordKind::Join, None)).unwrap();

        assert_eq!(db.find_latest_seen("other", "#c", "Bob").unwrap(), None);
        assert_eq!(db.find_latest_seen("srv", "#d", "Bob").unwrap(), None);
    }
}
