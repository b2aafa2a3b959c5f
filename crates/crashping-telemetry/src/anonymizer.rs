//! Text anonymization for crash fields
//!
//! Replaces the home directory and user name with placeholders before a
//! crash event is recorded.

use crashping_core::config::AnonymizeConfig;

/// Anonymizes text based on the provided configuration.
#[derive(Debug, Clone)]
pub struct Anonymizer {
    strip_paths: bool,
    strip_usernames: bool,
    home_dir: String,
    username: String,
}

impl Anonymizer {
    /// Creates a new `Anonymizer` from configuration and the current user.
    pub fn new(config: &AnonymizeConfig) -> Self {
        let home_dir = dirs::home_dir()
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_default();
        let username = std::env::var("USER")
            .or_else(|_| std::env::var("LOGNAME"))
            .unwrap_or_default();

        Self::with_identity(config, home_dir, username)
    }

    /// Creates an `Anonymizer` for an explicit home directory and user name.
    pub fn with_identity(
        config: &AnonymizeConfig,
        home_dir: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            strip_paths: config.strip_paths,
            strip_usernames: config.strip_usernames,
            home_dir: home_dir.into(),
            username: username.into(),
        }
    }

    /// An anonymizer that leaves text untouched
    pub fn disabled() -> Self {
        Self::with_identity(
            &AnonymizeConfig {
                strip_paths: false,
                strip_usernames: false,
            },
            "",
            "",
        )
    }

    /// Anonymize the given text by applying configured replacements.
    ///
    /// The home directory is replaced first since it usually contains
    /// the user name.
    pub fn anonymize(&self, text: &str) -> String {
        let mut result = text.to_string();

        // "/" alone would rewrite every separator
        if self.strip_paths && self.home_dir.len() > 1 {
            result = replace_bounded(&result, &self.home_dir, "<HOME>", is_path_char);
        }

        if self.strip_usernames && !self.username.is_empty() {
            result = replace_bounded(&result, &self.username, "<USER>", char::is_alphanumeric);
        }

        result
    }
}

/// Characters that continue a path component; `/` ends one.
fn is_path_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '-' | '_' | '.')
}

/// Replace `needle` only where it is not embedded in a longer run of
/// `is_part` characters on either side.
fn replace_bounded(
    text: &str,
    needle: &str,
    replacement: &str,
    is_part: fn(char) -> bool,
) -> String {
    let mut result = String::with_capacity(text.len());
    let mut copied = 0;

    for (start, _) in text.match_indices(needle) {
        let end = start + needle.len();
        let before = text[..start].chars().next_back();
        let after = text[end..].chars().next();
        if before.is_some_and(is_part) || after.is_some_and(is_part) {
            continue;
        }

        result.push_str(&text[copied..start]);
        result.push_str(replacement);
        copied = end;
    }

    result.push_str(&text[copied..]);
    result
}
