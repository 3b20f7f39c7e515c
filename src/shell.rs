use crate::command::Output;
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// Prefix of every user-facing notice.
pub const BANNER: &str = "- [I.K.E.I.N.]";

static ALIAS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_.-]*$").expect("valid regex"));

/// Quote `word` for a POSIX shell, leaving it untouched when it needs no quoting.
pub fn quote(word: &str) -> Cow<'_, str> {
    shell_words::quote(word)
}

/// Shell text that prints a notice when run.
pub fn echo(message: &str) -> String {
    format!("echo {}", quote(&format!("{BANNER}: {message}")))
}

/// A notice for the user, never executed.
pub fn notice(message: impl AsRef<str>) -> Output {
    Output::Message(format!("{BANNER}: {}", message.as_ref()))
}

/// Whether `name` may be used as a goto/run alias.
pub fn is_valid_alias(name: &str) -> bool {
    ALIAS.is_match(name)
}
