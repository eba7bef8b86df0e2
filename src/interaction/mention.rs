//! Finds `#123` references in chat text.

use std::sync::LazyLock;

use regex::Regex;

static MENTION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#([0-9]+)").expect("mention pattern is valid"));

/// Returns the number of the first `#<digits>` token in `text`, if any.
///
/// Later mentions in the same text are ignored. A digit run too large to be an
/// issue number counts as no mention.
pub fn extract_mention(text: &str) -> Option<u64> {
    MENTION.captures(text).and_then(|captures| captures.get(1)).and_then(|digits| digits.as_str().parse().ok())
}

// Tests.
