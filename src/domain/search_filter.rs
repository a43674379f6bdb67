/// A non-empty, trimmed directory search term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilter(String);

impl SearchFilter {
    /// Returns `None` for a blank term, meaning "no filter".
    pub fn parse(term: impl AsRef<str>) -> Option<Self> {
        let term = term.as_ref().trim();
        if term.is_empty() {
            None
        } else {
            Some(Self(term.to_string()))
        }
    }

    pub fn from_optional(term: Option<&str>) -> Option<Self> {
        term.and_then(Self::parse)
    }

    /// Unanchored `LIKE` pattern with `\`, `%` and `_` escaped, for use with `ESCAPE '\'`.
    pub fn like_pattern(&self) -> String {
        let mut pattern = String::with_capacity(self.0.len() + 2);
        pattern.push('%');
        for c in self.0.chars() {
            if matches!(c, '\\' | '%' | '_') {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        pattern.push('%');
        pattern
    }

    /// Case-insensitive substring match, the in-process equivalent of `like_pattern`.
    pub fn matches(&self, haystack: &str) -> bool {
        haystack.to_lowercase().contains(&self.0.to_lowercase())
    }
}

impl AsRef<str> for SearchFilter {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
