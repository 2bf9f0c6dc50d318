//! Database row types — these map directly to SQLite rows.
//! `kind` stays a raw integer here; decoding it is the caller's business so
//! an unexpected value can be reported instead of silently coerced.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeenRow {
    pub time: i64,
    pub server: String,
    pub channel: String,
    pub nick: String,
    pub kind: i64,
    pub text: Option<String>,
}
