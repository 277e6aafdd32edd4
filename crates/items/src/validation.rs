//! Field-level validation rules for item input.
//!
//! Rules collect every violation instead of stopping at the first one, so a
//! caller gets the full list of messages in one round trip. Lengths are counted
//! in characters, not bytes.

use std::sync::LazyLock;

use regex::Regex;

pub const NAME_MAX_CHARS: usize = 20;
pub const DESCRIPTION_MAX_CHARS: usize = 150;
pub const STATUS_MAX_CHARS: usize = 20;
pub const EMAIL_MAX_CHARS: usize = 50;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)*$",
    )
    .expect("email pattern compiles")
});

/// Accumulates violation messages in the order rules are checked.
#[derive(Debug, Default)]
pub struct Violations {
    messages: Vec<String>,
}

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    /// `value` must be present and contain a non-whitespace character.
    pub fn not_blank(&mut self, value: Option<&str>, label: &str) -> &mut Self {
        if value.is_none_or(is_blank) {
            self.messages.push(format!("{label} must not be blank"));
        }
        self
    }

    /// An absent value passes; a present one must fit in `max` characters.
    pub fn max_chars(&mut self, value: Option<&str>, max: usize, label: &str) -> &mut Self {
        if value.is_some_and(|v| v.chars().count() > max) {
            self.messages.push(format!("{label} cannot exceed {max} characters"));
        }
        self
    }

    /// Absent and blank values pass; blankness is the job of [`Self::not_blank`].
    pub fn email(&mut self, value: Option<&str>) -> &mut Self {
        if value.is_some_and(|v| !is_blank(v) && !is_valid_email(v)) {
            self.messages.push("Invalid email format".to_string());
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn into_messages(self) -> Vec<String> {
        self.messages
    }
}

pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}
