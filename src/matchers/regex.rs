use ::regex::Regex;

use super::{MatchResult, Matcher, Omnimatch, build_match};
use crate::error::{EstimateError, ensure_not_empty};
use crate::guesses::RECENT_YEAR;
use crate::types::{Match, Pattern, RegexPattern, sort_matches};

pub const DIGITS: &str = "digits";

/// A named pattern and the alphabet size it implies.
#[derive(Debug, Clone)]
pub struct RegexRule {
    name: String,
    regex: Regex,
    cardinality: usize,
    /// When true the match costs `cardinality ^ length`, otherwise `cardinality`.
    per_char: bool,
}

impl RegexRule {
    /// # Errors
    ///
    /// Returns [`EstimateError::InvalidRegex`] if `pattern` does not compile.
    pub fn new(
        name: impl Into<String>,
        pattern: &str,
        cardinality: usize,
        per_char: bool,
    ) -> Result<Self, EstimateError> {
        let name = name.into();
        let regex = Regex::new(pattern).map_err(|source| EstimateError::InvalidRegex {
            name: name.clone(),
            source,
        })?;
        Ok(Self {
            name,
            regex,
            cardinality,
            per_char,
        })
    }

    /// Runs of three or more digits, and four-digit years 1910 to 2029.
    pub fn builtin() -> Vec<Self> {
        [
            (DIGITS, "[0-9]{3,}", 10, true),
            (RECENT_YEAR, "19[1-9][0-9]|20[0-2][0-9]", 119, false),
        ]
        .into_iter()
        .map(|(name, pattern, cardinality, per_char)| {
            Self::new(name, pattern, cardinality, per_char).expect("built-in regex compiles")
        })
        .collect()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cardinality(&self) -> usize {
        self.cardinality
    }

    pub fn per_char(&self) -> bool {
        self.per_char
    }
}

/// Caller-configurable named regex patterns.
#[derive(Debug, Clone, Default)]
pub struct RegexMatcher {
    rules: Vec<RegexRule>,
}

impl RegexMatcher {
    pub fn new(rules: Vec<RegexRule>) -> Self {
        Self { rules }
    }

    pub(crate) fn with_rules(mut self, rules: Vec<RegexRule>) -> Self {
        self.rules.extend(rules);
        self
    }

    pub fn rules(&self) -> &[RegexRule] {
        &self.rules
    }
}

impl Matcher for RegexMatcher {
    fn name(&self) -> &'static str {
        "regex"
    }

    fn match_password(&self, password: &str, omnimatch: &Omnimatch) -> MatchResult {
        ensure_not_empty(password)?;
        let ctx = omnimatch.guess_context(password);
        let mut matches: Vec<Match> = Vec::new();

        for rule in &self.rules {
            for found in rule.regex.find_iter(password) {
                let length = found.as_str().chars().count();
                if length == 0 {
                    continue;
                }
                // byte offsets -> character indices
                let i = password[..found.start()].chars().count();
                let pattern = Pattern::Regex(RegexPattern {
                    regex_name: rule.name.clone(),
                    regex_match: found.as_str().to_string(),
                    per_char_cardinality: rule.per_char,
                });
                matches.push(build_match(
                    i,
                    i + length - 1,
                    found.as_str().to_string(),
                    Some(rule.cardinality),
                    pattern,
                    &ctx,
                ));
            }
        }

        sort_matches(&mut matches);
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matchers::tests::omnimatch;

    fn found(password: &str) -> Vec<(usize, usize, String)> {
        RegexMatcher::new(RegexRule::builtin())
            .match_password(password, &omnimatch())
            .unwrap()
            .into_iter()
            .map(|m| match m.pattern {
                Pattern::Regex(r) => (m.i, m.j, r.regex_name),
                other => panic!("unexpected pattern {:?}", other),
            })
            .collect()
    }

    #[test]
    fn test_digits_and_year() {
        assert_eq!(
            found("abc1991"),
            vec![
                (3, 6, DIGITS.to_string()),
                (3, 6, RECENT_YEAR.to_string()),
            ]
        );
    }

    #[test]
    fn test_short_digit_runs_ignored() {
        assert!(found("a12b").is_empty());
    }

    #[test]
    fn test_years_out_of_range() {
        assert_eq!(found("x1850"), vec![(1, 4, DIGITS.to_string())]);
        assert_eq!(found("x2035"), vec![(1, 4, DIGITS.to_string())]);
    }

    #[test]
    fn test_char_indices_after_multibyte() {
        assert_eq!(found("éé123"), vec![(2, 4, DIGITS.to_string())]);
    }

    #[test]
    fn test_custom_rule() {
        let rule = RegexRule::new("hex", "[0-9a-f]{6,}", 16, true).unwrap();
        let matches = RegexMatcher::new(vec![rule])
            .match_password("zz00ff00", &omnimatch())
            .unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].cardinality, Some(16));
        assert_eq!(matches[0].guesses, 16f64.powi(6));
    }

    #[test]
    fn test_invalid_rule() {
        let err = RegexRule::new("broken", "(unclosed", 10, false).unwrap_err();
        assert!(matches!(err, EstimateError::InvalidRegex { ref name, .. } if name == "broken"));
    }

    #[test]
    fn test_invalid_rule_keeps_regex_error_as_source() {
        let err = RegexRule::new("broken", "[a-", 10, false).unwrap_err();
        let source = std::error::Error::source(&err).expect("regex error is the source");
        assert!(source.downcast_ref::<::regex::Error>().is_some());
        assert!(err.to_string().starts_with("Invalid regex pattern for matcher 'broken': "));
    }
}
