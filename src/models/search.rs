/// A free-text filter as typed into one of the dashboard tables.
///
/// The same key is matched against names (case-insensitive substring) and,
/// when it parses as a number, against the numeric columns of the feed.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchKey {
    pub text: String,
    pub integer: Option<i32>,
    pub number: Option<f64>,
}

impl SearchKey {
    /// Returns `None` for a missing or blank key so callers skip filtering.
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        let text = raw?.trim();
        if text.is_empty() {
            return None;
        }

        Some(Self {
            text: text.to_string(),
            integer: text.parse::<i32>().ok(),
            number: text.parse::<f64>().ok().filter(|n| n.is_finite()),
        })
    }

    /// `ILIKE` pattern matching the key anywhere in a column.
    pub fn like_pattern(&self) -> String {
        format!("%{}%", escape_like(&self.text))
    }

    /// Cooler modes are stored uppercase.
    pub fn upper(&self) -> String {
        self.text.to_uppercase()
    }
}

/// Escapes the `LIKE` metacharacters so user input only matches literally.
pub fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_keys_disable_filtering() {
        assert_eq!(SearchKey::parse(None), None);
        assert_eq!(SearchKey::parse(Some("")), None);
        assert_eq!(SearchKey::parse(Some("   ")), None);
    }

    #[test]
    fn test_integer_key() {
        let key = SearchKey::parse(Some("42")).unwrap();
        assert_eq!(key.integer, Some(42));
        assert_eq!(key.number, Some(42.0));
        assert_eq!(key.like_pattern(), "%42%");
    }

    #[test]
    fn test_text_key_has_no_numeric_forms() {
        let key = SearchKey::parse(Some(" idle ")).unwrap();
        assert_eq!(key.text, "idle");
        assert_eq!(key.integer, None);
        assert_eq!(key.number, None);
    }

    #[test]
    fn test_partial_numbers_do_not_parse() {
        let key = SearchKey::parse(Some("42abc")).unwrap();
        assert_eq!(key.integer, None);
        assert_eq!(key.number, None);

        let key = SearchKey::parse(Some("nan")).unwrap();
        assert_eq!(key.number, None);
    }

    #[test]
    fn test_decimal_key_is_not_an_integer() {
        let key = SearchKey::parse(Some("23.5")).unwrap();
        assert_eq!(key.integer, None);
        assert_eq!(key.number, Some(23.5));
    }

    #[test]
    fn test_like_metacharacters_are_escaped() {
        let key = SearchKey::parse(Some("50%_off\\")).unwrap();
        assert_eq!(key.like_pattern(), "%50\\%\\_off\\\\%");
    }

    #[test]
    fn test_upper_for_mode_matching() {
        let key = SearchKey::parse(Some("manual")).unwrap();
        assert_eq!(key.upper(), "MANUAL");
    }
}
