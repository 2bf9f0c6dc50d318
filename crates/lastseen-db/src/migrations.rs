use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS seen (
            time        INTEGER NOT NULL,
            server      TEXT NOT NULL COLLATE NOCASE,
            channel     TEXT NOT NULL COLLATE NOCASE,
            nick        TEXT NOT NULL COLLATE NOCASE,
            kind        INTEGER NOT NULL,
            text        TEXT COLLATE NOCASE
        );

        CREATE UNIQUE INDEX IF NOT EXISTS seen_primary
            ON seen(server, channel, nick);

        -- Lookups by the nick someone changed into
        CREATE INDEX IF NOT EXISTS seen_nick_change
            ON seen(server, channel, kind, text);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
