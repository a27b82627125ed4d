//! Pure syntactic checks for user input. No network access.

use std::sync::OnceLock;

use regex::Regex;

pub const ALIAS_MIN_LEN: usize = 3;
pub const ALIAS_MAX_LEN: usize = 30;

static URL_RE: OnceLock<Regex> = OnceLock::new();
static ALIAS_RE: OnceLock<Regex> = OnceLock::new();

fn url_re() -> &'static Regex {
    URL_RE.get_or_init(|| {
        Regex::new(r"(?i)^https?://([a-z0-9-]+\.)+[a-z]{2,}(:\d+)?(/\S*)?$")
            .expect("valid url regex")
    })
}

fn alias_re() -> &'static Regex {
    ALIAS_RE.get_or_init(|| {
        Regex::new(&format!(r"^[A-Za-z0-9-]{{{ALIAS_MIN_LEN},{ALIAS_MAX_LEN}}}$"))
            .expect("valid alias regex")
    })
}

/// `http(s)://` + dotted domain (last label alphabetic, 2+ chars) + optional
/// `:port` + optional whitespace-free path.
pub fn is_valid_url(s: &str) -> bool {
    url_re().is_match(s)
}

/// 3-30 characters of ASCII letters, digits and `-`.
pub fn is_valid_alias(s: &str) -> bool {
    alias_re().is_match(s)
}
