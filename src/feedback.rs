//! Verbal feedback for weak passwords
//!
//! The warning explains what made the password guessable; suggestions say how to do better.
//! Both are picked from the longest match of the winning sequence.

use std::fmt;

use crate::dictionary::{ENGLISH, FEMALE_NAMES, MALE_NAMES, PASSWORDS, SURNAMES};
use crate::guesses::RECENT_YEAR;
use crate::matchers::regex::DIGITS;
use crate::time_estimates::entropy_to_score;
use crate::types::{DictionaryPattern, Match, PasswordScore, Pattern};

/// Scores above this get no feedback.
const FEEDBACK_SCORE_LIMIT: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Warning {
    StraightRow,
    ShortKeyboardPatterns,
    RepeatsLikeAaa,
    RepeatsLikeAbcAbc,
    SequenceAbc6543,
    RecentYears,
    Digits,
    Dates,
    Top10Password,
    Top100Password,
    VeryCommonPassword,
    SimilarToCommonPassword,
    WordByItself,
    NamesByThemselves,
    CommonNames,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Warning::StraightRow => "Straight rows of keys are easy to guess",
            Warning::ShortKeyboardPatterns => "Short keyboard patterns are easy to guess",
            Warning::RepeatsLikeAaa => "Repeats like \"aaa\" are easy to guess",
            Warning::RepeatsLikeAbcAbc => {
                "Repeats like \"abcabcabc\" are only slightly harder to guess than \"abc\""
            }
            Warning::SequenceAbc6543 => "Sequences like abc or 6543 are easy to guess",
            Warning::RecentYears => "Recent years are easy to guess",
            Warning::Digits => "Runs of digits are easy to guess",
            Warning::Dates => "Dates are often easy to guess",
            Warning::Top10Password => "This is a top-10 common password",
            Warning::Top100Password => "This is a top-100 common password",
            Warning::VeryCommonPassword => "This is a very common password",
            Warning::SimilarToCommonPassword => "This is similar to a commonly used password",
            Warning::WordByItself => "A word by itself is easy to guess",
            Warning::NamesByThemselves => "Names and surnames by themselves are easy to guess",
            Warning::CommonNames => "Common names and surnames are easy to guess",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Suggestion {
    UseFewWords,
    NoNeedForSymbols,
    AddAnotherWord,
    UseLongerKeyboardPattern,
    AvoidRepeatedWords,
    AvoidSequences,
    AvoidRecentYears,
    AvoidDates,
    CapitalizationDoesNotHelp,
    AllCapsEasy,
    ReversedWordsEasy,
    PredictableSubstitutions,
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Suggestion::UseFewWords => "Use a few words, avoid common phrases",
            Suggestion::NoNeedForSymbols => "No need for symbols, digits, or uppercase letters",
            Suggestion::AddAnotherWord => "Add another word or two. Uncommon words are better.",
            Suggestion::UseLongerKeyboardPattern => "Use a longer keyboard pattern with more turns",
            Suggestion::AvoidRepeatedWords => "Avoid repeated words and characters",
            Suggestion::AvoidSequences => "Avoid sequences",
            Suggestion::AvoidRecentYears => "Avoid recent years and years that are associated with you",
            Suggestion::AvoidDates => "Avoid dates and years that are associated with you",
            Suggestion::CapitalizationDoesNotHelp => "Capitalization doesn't help very much",
            Suggestion::AllCapsEasy => "All-uppercase is almost as easy to guess as all-lowercase",
            Suggestion::ReversedWordsEasy => "Reversed words aren't much harder to guess",
            Suggestion::PredictableSubstitutions => {
                "Predictable substitutions like '@' instead of 'a' don't help very much"
            }
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Feedback {
    pub warning: Option<Warning>,
    pub suggestions: Vec<Suggestion>,
}

impl Feedback {
    fn new(warning: Option<Warning>, suggestions: Vec<Suggestion>) -> Self {
        Self {
            warning,
            suggestions,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.warning.is_none() && self.suggestions.is_empty()
    }
}

/// Feedback for a password with `score` whose winning sequence is `sequence`.
pub fn get_feedback(score: PasswordScore, sequence: &[Match]) -> Feedback {
    let Some(first) = sequence.first() else {
        return Feedback::new(
            None,
            vec![Suggestion::UseFewWords, Suggestion::NoNeedForSymbols],
        );
    };

    if score.value() > FEEDBACK_SCORE_LIMIT {
        return Feedback::default();
    }

    // first of the longest wins
    let longest = sequence
        .iter()
        .fold(first, |longest, m| if m.span_len() > longest.span_len() { m } else { longest });

    match_feedback(longest, sequence.len() == 1)
}

fn match_feedback(m: &Match, is_sole_match: bool) -> Feedback {
    use Suggestion::*;

    match &m.pattern {
        Pattern::Dictionary(d) => dictionary_feedback(m, d, is_sole_match),
        Pattern::Spatial(s) => {
            let warning = if s.turns == 0 {
                Warning::StraightRow
            } else {
                Warning::ShortKeyboardPatterns
            };
            Feedback::new(Some(warning), vec![AddAnotherWord, UseLongerKeyboardPattern])
        }
        Pattern::Repeat(r) => {
            let warning = if r.base_token.chars().count() == 1 {
                Warning::RepeatsLikeAaa
            } else {
                Warning::RepeatsLikeAbcAbc
            };
            Feedback::new(Some(warning), vec![AddAnotherWord, AvoidRepeatedWords])
        }
        Pattern::Sequence(_) => Feedback::new(
            Some(Warning::SequenceAbc6543),
            vec![AddAnotherWord, AvoidSequences],
        ),
        Pattern::Regex(r) => match r.regex_name.as_str() {
            RECENT_YEAR => Feedback::new(
                Some(Warning::RecentYears),
                vec![AddAnotherWord, AvoidRecentYears],
            ),
            DIGITS => Feedback::new(Some(Warning::Digits), vec![AddAnotherWord]),
            _ => Feedback::new(None, vec![AddAnotherWord]),
        },
        Pattern::Date(_) => Feedback::new(Some(Warning::Dates), vec![AddAnotherWord, AvoidDates]),
        Pattern::Bruteforce => Feedback::new(None, vec![AddAnotherWord]),
    }
}

fn dictionary_feedback(m: &Match, d: &DictionaryPattern, is_sole_match: bool) -> Feedback {
    let warning = match d.dictionary_name.as_str() {
        PASSWORDS if is_sole_match && !d.l33t && !d.reversed => Some(match d.rank {
            0..=10 => Warning::Top10Password,
            11..=100 => Warning::Top100Password,
            _ => Warning::VeryCommonPassword,
        }),
        PASSWORDS if m.guesses_log10() <= 4.0 || entropy_to_score(m.entropy).value() <= 1 => {
            Some(Warning::SimilarToCommonPassword)
        }
        ENGLISH if is_sole_match => Some(Warning::WordByItself),
        SURNAMES | MALE_NAMES | FEMALE_NAMES if is_sole_match => Some(Warning::NamesByThemselves),
        SURNAMES | MALE_NAMES | FEMALE_NAMES => Some(Warning::CommonNames),
        _ => None,
    };

    let mut suggestions = vec![Suggestion::AddAnotherWord];
    let word = &m.token;
    if word.chars().next().is_some_and(|c| c.is_ascii_uppercase()) {
        suggestions.push(Suggestion::CapitalizationDoesNotHelp);
    } else if word.to_uppercase() == *word && word.to_lowercase() != *word {
        suggestions.push(Suggestion::AllCapsEasy);
    }
    if d.reversed && word.chars().count() >= 4 {
        suggestions.push(Suggestion::ReversedWordsEasy);
    }
    if d.l33t {
        suggestions.push(Suggestion::PredictableSubstitutions);
    }

    Feedback::new(warning, suggestions)
}
