use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeenError {
    /// The store could not be opened or migrated. Nothing can be recorded
    /// or answered while this holds.
    #[error("seen store unavailable: {0:#}")]
    StorageUnavailable(anyhow::Error),

    #[error("failed to write seen record: {0:#}")]
    StorageWrite(anyhow::Error),

    #[error("failed to read seen records: {0:#}")]
    StorageRead(anyhow::Error),

    /// A stored row carries a kind code this build does not know.
    #[error("unknown record kind {kind} for {nick} in {channel} on {server}")]
    UnknownRecordKind {
        kind: i64,
        server: String,
        channel: String,
        nick: String,
    },
}
