pub mod http;

use regex::Regex;
use std::sync::LazyLock;

static TELEGRAM_HANDLE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]{1,31}$").unwrap());

/// Extracts a Telegram handle from the first word of `text`, with or without the `@`.
pub fn parse_handle(text: &str) -> Option<&str> {
    let word = text.split_whitespace().next()?;
    let handle = word.strip_prefix('@').unwrap_or(word);
    TELEGRAM_HANDLE_REGEX.is_match(handle).then_some(handle)
}
