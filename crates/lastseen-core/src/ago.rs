/// Coarse "time ago" phrases. Months are a flat 30 days and years 365.25,
/// so output never matches a calendar exactly.
const UNITS: [(&str, f64); 6] = [
    ("year", 365.25 * 24.0 * 60.0 * 60.0),
    ("month", 30.0 * 24.0 * 60.0 * 60.0),
    ("week", 7.0 * 24.0 * 60.0 * 60.0),
    ("day", 24.0 * 60.0 * 60.0),
    ("hour", 60.0 * 60.0),
    ("minute", 60.0),
];

/// Describe how long before `now` the `origin` timestamp was, using only the
/// largest unit that fits.
pub fn ago(origin: i64, now: i64) -> String {
    let elapsed = now - origin;
    if elapsed < 60 {
        return "a moment ago".to_string();
    }

    for (unit, secs) in UNITS {
        let ratio = elapsed as f64 / secs;
        if ratio >= 1.0 {
            let n = ratio.round() as i64;
            return format!("{} {}{} ago", n, unit, if n > 1 { "s" } else { "" });
        }
    }

    // elapsed >= 60 always matches the minute unit
    "1 minute ago".to_string()
}
