/// A `/command` split into its lowercase token and the raw argument string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub token: String,
    pub args: Option<String>,
}

impl ParsedCommand {
    /// Returns `None` for plain text and for commands addressed to another bot.
    pub fn parse(text: &str, bot_username: &str) -> Option<Self> {
        let text = text.trim();
        if !text.starts_with('/') {
            return None;
        }

        let (head, rest) = match text.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (text, ""),
        };

        let command = match head.split_once('@') {
            Some((command, mention)) if mention.eq_ignore_ascii_case(bot_username) => command,
            Some(_) => return None,
            None => head,
        };

        if command.len() < 2 {
            return None;
        }

        Some(Self {
            token: command.to_lowercase(),
            args: (!rest.is_empty()).then(|| rest.to_string()),
        })
    }
}
