//! Shared data model: matches, their pattern payloads and the evaluation report.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use secrecy::SecretString;

use crate::feedback::Feedback;
use crate::time_estimates::{CrackTimesDisplay, CrackTimesSeconds};

/// A candidate explanation of the password slice `[i, j]` (inclusive, character indices).
///
/// Matches are immutable once a matcher hands them out: `guesses` and `entropy` are
/// computed at construction for the password length the match was found in.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub i: usize,
    pub j: usize,
    /// The matched slice, case preserved.
    pub token: String,
    /// Size of the alphabet the match implies, when the pattern defines one.
    pub cardinality: Option<usize>,
    /// Legacy metric, bits.
    pub entropy: f64,
    /// Estimated attacker guesses, floored at the sub-match minimum.
    pub guesses: f64,
    pub pattern: Pattern,
}

impl Match {
    /// Number of characters covered by the match.
    pub fn span_len(&self) -> usize {
        self.j + 1 - self.i
    }

    pub fn guesses_log10(&self) -> f64 {
        self.guesses.log10()
    }

    pub fn is_bruteforce(&self) -> bool {
        matches!(self.pattern, Pattern::Bruteforce)
    }
}

/// Sorts by start index, then end index. Stable, so equal spans keep matcher order.
pub fn sort_matches(matches: &mut [Match]) {
    matches.sort_by_key(|m| (m.i, m.j));
}

/// Pattern-specific payload of a [`Match`].
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    Dictionary(DictionaryPattern),
    Spatial(SpatialPattern),
    Repeat(RepeatPattern),
    Sequence(SequencePattern),
    Regex(RegexPattern),
    Date(DatePattern),
    /// Filler for spans no matcher explains.
    Bruteforce,
}

impl Pattern {
    pub fn name(&self) -> &'static str {
        match self {
            Pattern::Dictionary(_) => "dictionary",
            Pattern::Spatial(_) => "spatial",
            Pattern::Repeat(_) => "repeat",
            Pattern::Sequence(_) => "sequence",
            Pattern::Regex(_) => "regex",
            Pattern::Date(_) => "date",
            Pattern::Bruteforce => "bruteforce",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DictionaryPattern {
    /// Lowercase dictionary key that matched (after l33t translation, if any).
    pub matched_word: String,
    pub rank: usize,
    pub dictionary_name: String,
    pub reversed: bool,
    pub l33t: bool,
    /// l33t character -> plain character, only the substitutions used in the token.
    pub sub: BTreeMap<char, char>,
    /// Human readable form of `sub`, e.g. `4 -> a, 0 -> o`.
    pub sub_display: String,
    pub uppercase_variations: f64,
    pub l33t_variations: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpatialPattern {
    pub graph: String,
    /// Direction changes along the walk; a straight row has none.
    pub turns: usize,
    pub shifted_count: usize,
    pub starting_positions: usize,
    pub average_degree: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RepeatPattern {
    pub base_token: String,
    pub base_guesses: f64,
    pub base_matches: Vec<Match>,
    pub repeat_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceKind {
    Lower,
    Upper,
    Digits,
    Symbols,
    Unicode,
}

impl SequenceKind {
    pub fn name(self) -> &'static str {
        match self {
            SequenceKind::Lower => "lower",
            SequenceKind::Upper => "upper",
            SequenceKind::Digits => "digits",
            SequenceKind::Symbols => "symbols",
            SequenceKind::Unicode => "unicode",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SequencePattern {
    pub kind: SequenceKind,
    pub sequence_space: usize,
    pub ascending: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegexPattern {
    pub regex_name: String,
    /// The raw text the regex matched.
    pub regex_match: String,
    pub per_char_cardinality: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatePattern {
    /// Empty when the date was written without separators.
    pub separator: String,
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

/// Strength score, 0 (guessable) to 6 (very unguessable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PasswordScore(u8);

impl PasswordScore {
    pub const MAX: u8 = 6;

    pub fn new(value: u8) -> Self {
        Self(value.min(Self::MAX))
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for PasswordScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0, Self::MAX)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordStrength {
    Weak,
    Medium,
    Strong,
    Epic,
    God,
}

impl From<PasswordScore> for PasswordStrength {
    fn from(score: PasswordScore) -> Self {
        match score.value() {
            0..=2 => PasswordStrength::Weak,
            3 => PasswordStrength::Medium,
            4 => PasswordStrength::Strong,
            5 => PasswordStrength::Epic,
            _ => PasswordStrength::God,
        }
    }
}

/// Full report for one evaluated password.
#[derive(Debug)]
pub struct PasswordEvaluation {
    pub password: SecretString,
    /// Legacy total, bits.
    pub entropy: f64,
    pub guesses: f64,
    pub guesses_log10: f64,
    /// The minimum-guesses covering sequence. Authoritative for scoring.
    pub sequence: Vec<Match>,
    /// The legacy minimum-entropy covering sequence.
    pub entropy_sequence: Vec<Match>,
    pub crack_times_seconds: CrackTimesSeconds,
    pub crack_times_display: CrackTimesDisplay,
    pub score: PasswordScore,
    pub feedback: Feedback,
    pub calc_time: Duration,
}

impl PasswordEvaluation {
    pub fn strength(&self) -> PasswordStrength {
        self.score.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bruteforce(i: usize, j: usize) -> Match {
        Match {
            i,
            j,
            token: "x".repeat(j + 1 - i),
            cardinality: Some(26),
            entropy: 0.0,
            guesses: 1.0,
            pattern: Pattern::Bruteforce,
        }
    }

    #[test]
    fn test_sort_matches_by_start_then_end() {
        let mut matches = vec![bruteforce(2, 4), bruteforce(0, 3), bruteforce(0, 1)];
        sort_matches(&mut matches);
        let spans: Vec<_> = matches.iter().map(|m| (m.i, m.j)).collect();
        assert_eq!(spans, vec![(0, 1), (0, 3), (2, 4)]);
    }

    #[test]
    fn test_score_is_capped() {
        assert_eq!(PasswordScore::new(9).value(), 6);
        assert_eq!(PasswordScore::new(3).to_string(), "3/6");
    }

    #[test]
    fn test_strength_from_score() {
        assert_eq!(PasswordStrength::from(PasswordScore::new(0)), PasswordStrength::Weak);
        assert_eq!(PasswordStrength::from(PasswordScore::new(2)), PasswordStrength::Weak);
        assert_eq!(PasswordStrength::from(PasswordScore::new(3)), PasswordStrength::Medium);
        assert_eq!(PasswordStrength::from(PasswordScore::new(6)), PasswordStrength::God);
    }
}
