/// A command typed in channel, e.g. `!seen Bob`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub name: String,
    pub params: Vec<String>,
}

/// Split `text` into a command when it starts with `prefix`.
pub fn parse_command(text: &str, prefix: &str) -> Option<CommandLine> {
    if prefix.is_empty() {
        return None;
    }

    let rest = text.strip_prefix(prefix)?;
    let mut words = rest.split_whitespace();
    let name = words.next()?;

    // "!! seen" is not a command, the name must follow the prefix directly
    if !rest.starts_with(name) {
        return None;
    }

    Some(CommandLine {
        name: name.to_string(),
        params: words.map(str::to_string).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_name_and_params() {
        assert_eq!(
            parse_command("!seen  Bob extra", "!"),
            Some(CommandLine {
                name: "seen".into(),
                params: vec!["Bob".into(), "extra".into()],
            })
        );
        assert_eq!(
            parse_command("!seen", "!"),
            Some(CommandLine {
                name: "seen".into(),
                params: vec![],
            })
        );
    }

    #[test]
    fn ignores_plain_text() {
        assert_eq!(parse_command("seen Bob", "!"), None);
        assert_eq!(parse_command("! seen Bob", "!"), None);
        assert_eq!(parse_command("!", "!"), None);
        assert_eq!(parse_command("!seen Bob", ""), None);
    }
}
