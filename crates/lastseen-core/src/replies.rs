use crate::error::SeenError;
use crate::resolver::SeenAnswer;

/// IRC bold toggle
const BOLD: char = '\x02';

/// Everything the seen command can say back.
#[derive(Debug)]
pub enum Reply {
    Seen(SeenAnswer),
    NotSeen { target: String, channel: String },
    Usage,
    Failed(SeenError),
}

impl Reply {
    pub fn render(&self, bold: bool) -> String {
        let em = |s: &str| {
            if bold {
                format!("{BOLD}{s}{BOLD}")
            } else {
                s.to_string()
            }
        };

        match self {
            Self::Seen(answer) => {
                let prefix = if answer.present {
                    format!("{} is currently in the channel! Last seen", em(&answer.nick))
                } else {
                    format!("{} was last seen", em(&answer.nick))
                };
                format!("{} {} {}", prefix, answer.ago, answer.activity)
            }
            Self::NotSeen { target, channel } => {
                format!("I haven't seen {} in {}!", em(target), channel)
            }
            Self::Usage => format!("{} seen <nickname>", em("Usage:")),
            // Kept generic; the details went to the log
            Self::Failed(SeenError::UnknownRecordKind { .. }) => {
                format!("{} A database error occurred.", em("Error:"))
            }
            Self::Failed(_) => format!("{} Could not retrieve data.", em("Error:")),
        }
    }
}
