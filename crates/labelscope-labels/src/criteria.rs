//! Label criteria parsing
//!
//! Criteria arrive as one flat string such as `env:production,build`.
//! Tokens are separated by `,`; each token is either `key:value` or a bare
//! `key`, which matches any value. Parsing never fails:
//! - a token is split on its first `:` only, so `a:b:c` means key `a`, value `b:c`
//! - tokens with an empty key (`a,,b`, `:x`) are dropped
//! - a repeated key keeps the last value

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::str::FromStr;

/// Parsed label criteria: key -> required value, where `""` accepts any value.
///
/// Empty criteria match every entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelCriteria {
    required: BTreeMap<String, String>,
}

impl LabelCriteria {
    /// Criteria that match everything
    pub fn any() -> Self {
        Self::default()
    }

    pub fn parse(raw: &str) -> Self {
        let mut required = BTreeMap::new();

        for token in raw.split(',') {
            let (key, value) = token.split_once(':').unwrap_or((token, ""));
            if key.is_empty() {
                continue;
            }
            required.insert(key.to_string(), value.to_string());
        }

        Self { required }
    }

    pub fn is_empty(&self) -> bool {
        self.required.is_empty()
    }

    pub fn len(&self) -> usize {
        self.required.len()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.required.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.required.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Whether a single label satisfies these criteria.
    ///
    /// The key must be named by the criteria and the value must either equal
    /// the required value or the required value must be empty.
    pub fn accepts(&self, key: &str, value: &str) -> bool {
        match self.required.get(key) {
            Some(required) => required.is_empty() || required == value,
            None => false,
        }
    }
}

impl FromStr for LabelCriteria {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl<K, V> FromIterator<(K, V)> for LabelCriteria
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let required = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(k, _): &(String, String)| !k.is_empty())
            .collect();
        Self { required }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(criteria: &LabelCriteria) -> Vec<(&str, &str)> {
        criteria.iter().collect()
    }

    #[test]
    fn test_empty_string_is_empty_criteria() {
        let criteria = LabelCriteria::parse("");
        assert!(criteria.is_empty());
        assert_eq!(criteria, LabelCriteria::any());
    }

    #[test]
    fn test_key_value_and_bare_keys() {
        let criteria = LabelCriteria::parse("env:production,build");
        assert_eq!(criteria.len(), 2);
        assert_eq!(criteria.get("env"), Some("production"));
        assert_eq!(criteria.get("build"), Some(""));
        assert_eq!(criteria.get("version"), None);
    }

    #[test]
    fn test_last_occurrence_wins() {
        let criteria = LabelCriteria::parse("env:dev,env:production");
        assert_eq!(pairs(&criteria), vec![("env", "production")]);

        let criteria = LabelCriteria::parse("env:dev,env");
        assert_eq!(pairs(&criteria), vec![("env", "")]);
    }

    #[test]
    fn test_extra_colons_stay_in_value() {
        let criteria = LabelCriteria::parse("url:http://example.com:8080");
        assert_eq!(criteria.get("url"), Some("http://example.com:8080"));
    }

    #[test]
    fn test_empty_keys_dropped() {
        let criteria = LabelCriteria::parse(",a,,:x,b:1,");
        assert_eq!(pairs(&criteria), vec![("a", ""), ("b", "1")]);
    }

    #[test]
    fn test_trailing_colon_means_any_value() {
        let criteria = LabelCriteria::parse("build:");
        assert_eq!(criteria.get("build"), Some(""));
        assert!(criteria.accepts("build", "16"));
    }

    #[test]
    fn test_whitespace_kept_verbatim() {
        let criteria = LabelCriteria::parse(" env : prod");
        assert_eq!(criteria.get(" env "), Some(" prod"));
        assert_eq!(criteria.get("env"), None);
    }

    #[test]
    fn test_accepts() {
        let criteria = LabelCriteria::parse("env:production,build");
        assert!(criteria.accepts("env", "production"));
        assert!(!criteria.accepts("env", "dev"));
        assert!(criteria.accepts("build", "16"));
        assert!(criteria.accepts("build", ""));
        assert!(!criteria.accepts("version", "v2"));
    }

    #[test]
    fn test_from_str_and_from_iter_agree() {
        let parsed: LabelCriteria = "a:1,b".parse().unwrap();
        let built: LabelCriteria = [("a", "1"), ("b", ""), ("", "dropped")]
            .into_iter()
            .collect();
        assert_eq!(parsed, built);
    }
}
