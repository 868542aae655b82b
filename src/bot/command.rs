//! Slash command parsing.

/// `/name args` as sent by a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command<'a> {
    pub name: String,
    pub args: &'a str,
}

impl<'a> Command<'a> {
    /// Parse `/name[@bot] [args]`.
    ///
    /// Returns `None` for plain text and for commands addressed to another
    /// bot. The bot-name comparison ignores case, as Telegram usernames do.
    pub fn parse(text: &'a str, bot_username: &str) -> Option<Self> {
        let rest = text.trim_start().strip_prefix('/')?;
        let (head, args) = match rest.find(char::is_whitespace) {
            Some(index) => (&rest[..index], rest[index..].trim()),
            None => (rest, ""),
        };

        let (name, addressee) = match head.split_once('@') {
            Some((name, addressee)) => (name, Some(addressee)),
            None => (head, None),
        };
        if name.is_empty() {
            return None;
        }
        if let Some(addressee) = addressee {
            if !addressee.eq_ignore_ascii_case(bot_username) {
                return None;
            }
        }

        Some(Self {
            name: name.to_ascii_lowercase(),
            args,
        })
    }

    /// Whitespace-separated arguments.
    pub fn arg_list(&self) -> Vec<&'a str> {
        self.args.split_whitespace().collect()
    }
}
