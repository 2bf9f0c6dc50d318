use serde::{Deserialize, Serialize};

/// What a user was last seen doing. The discriminants are the values stored
/// in the `kind` column and must never be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i64)]
pub enum RecordKind {
    Join = 0,
    Part = 1,
    Kick = 2,
    Quit = 3,
    NickChange = 4,
    Message = 5,
    Notice = 6,
    Action = 7,
}

impl RecordKind {
    pub fn code(self) -> i64 {
        self as i64
    }
}

impl TryFrom<i64> for RecordKind {
    type Error = i64;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Join),
            1 => Ok(Self::Part),
            2 => Ok(Self::Kick),
            3 => Ok(Self::Quit),
            4 => Ok(Self::NickChange),
            5 => Ok(Self::Message),
            6 => Ok(Self::Notice),
            7 => Ok(Self::Action),
            other => Err(other),
        }
    }
}

/// The most recent activity of one nick on one channel of one server.
///
/// `text` holds the part/kick/quit reason, the message body, or for
/// `NickChange` the nick the user changed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub server: String,
    pub channel: String,
    pub nick: String,
    pub time: i64,
    pub kind: RecordKind,
    pub text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_survive_conversion() {
        for kind in [
            RecordKind::Join,
            RecordKind::Part,
            RecordKind::Kick,
            RecordKind::Quit,
            RecordKind::NickChange,
            RecordKind::Message,
            RecordKind::Notice,
            RecordKind::Action,
        ] {
            assert_eq!(RecordKind::try_from(kind.code()), Ok(kind));
        }
    }

    #[test]
    fn unknown_code_is_rejected() {
        assert_eq!(RecordKind::try_from(8), Err(8));
        assert_eq!(RecordKind::try_from(-1), Err(-1));
    }
}
