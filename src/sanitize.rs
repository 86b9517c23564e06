/// Characters accepted in a field path.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum KeyPolicy {
    /// Letters, digits, `_` and `.`.
    #[default]
    Strict,
    /// Additionally accepts the ASCII range between `Z` and `a`: `` [ \ ] ^ _ ` ``.
    Lenient,
}

impl KeyPolicy {
    pub fn accepts(&self, c: char) -> bool {
        match self {
            Self::Strict => c.is_ascii_alphanumeric() || c == '_' || c == '.',
            Self::Lenient => c.is_ascii_alphanumeric() || c == '.' || ('['..='`').contains(&c),
        }
    }

    pub fn sanitize(&self, raw: &str) -> String {
        raw.chars().filter(|c| self.accepts(*c)).collect()
    }
}

/// Remove all characters from a field path which are not letters, digits, `_` or `.`.
pub fn sanitize(raw: &str) -> String {
    KeyPolicy::Strict.sanitize(raw)
}
