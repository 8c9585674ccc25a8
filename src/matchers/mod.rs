//! Pattern matchers
//!
//! Each matcher scans a password and returns every candidate [`Match`] it recognizes.
//! Matchers hold only read-only tables, so one [`Omnimatch`] can serve any number of
//! concurrent evaluations.

pub mod date;
pub mod dictionary;
pub mod l33t;
pub mod regex;
pub mod repeat;
pub mod reversed;
pub mod sequence;
pub mod spatial;

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};

use crate::dictionary::{RankedDictionary, USER_INPUTS, builtin_dictionaries};
use crate::entropy::estimate_entropy;
use crate::error::{EstimateError, ensure_not_empty};
use crate::guesses::{GuessContext, estimate_guesses};
use crate::keyboard::{SpatialGraph, builtin_graphs};
use crate::types::{Match, Pattern, sort_matches};

pub use self::date::DateMatcher;
pub use self::dictionary::DictionaryMatcher;
pub use self::l33t::L33tMatcher;
pub use self::regex::{RegexMatcher, RegexRule};
pub use self::repeat::RepeatMatcher;
pub use self::reversed::ReversedMatcher;
pub use self::sequence::SequenceMatcher;
pub use self::spatial::SpatialMatcher;

pub type MatchResult = Result<Vec<Match>, EstimateError>;

pub trait Matcher: Send + Sync {
    fn name(&self) -> &'static str;

    /// Finds every candidate match in `password`.
    ///
    /// `omnimatch` gives access to the rest of the pipeline for matchers that build on
    /// other matchers (reversed and l33t reuse dictionary lookups, repeat analyses its base
    /// token recursively).
    fn match_password(&self, password: &str, omnimatch: &Omnimatch) -> MatchResult;
}

/// Completes a match: computes its guesses and legacy entropy for the password it was
/// found in.
pub(crate) fn build_match(
    i: usize,
    j: usize,
    token: String,
    cardinality: Option<usize>,
    pattern: Pattern,
    ctx: &GuessContext,
) -> Match {
    debug_assert!(i <= j, "match span ({}, {}) is reversed", i, j);
    let mut m = Match {
        i,
        j,
        token,
        cardinality,
        entropy: 0.0,
        guesses: 0.0,
        pattern,
    };
    m.guesses = estimate_guesses(&m, ctx);
    m.entropy = estimate_entropy(&m);
    m
}

/// Runs every matcher over a password and returns the union of their matches.
#[derive(Debug, Clone)]
pub struct Omnimatch {
    dictionary: DictionaryMatcher,
    l33t: L33tMatcher,
    spatial: SpatialMatcher,
    regex: RegexMatcher,
    reference_date: NaiveDate,
}

impl Omnimatch {
    pub fn new(
        dictionaries: Vec<RankedDictionary>,
        graphs: Vec<SpatialGraph>,
        regex_rules: Vec<RegexRule>,
        reference_date: NaiveDate,
    ) -> Self {
        Self {
            dictionary: DictionaryMatcher::new(dictionaries.into_iter().map(Arc::new).collect()),
            l33t: L33tMatcher::default(),
            spatial: SpatialMatcher::new(graphs.into_iter().map(Arc::new).collect()),
            regex: RegexMatcher::new(regex_rules),
            reference_date,
        }
    }

    /// The compiled-in dictionaries, keyboards and regex rules.
    pub fn builtin(reference_date: NaiveDate) -> Self {
        Self::new(
            builtin_dictionaries(),
            builtin_graphs(),
            RegexRule::builtin(),
            reference_date,
        )
    }

    /// A copy that also matches against `user_inputs` (names, e-mail, site name...).
    /// The shared tables are reference counted, only the new dictionary is built.
    pub fn with_user_inputs(&self, user_inputs: &[&str]) -> Self {
        if user_inputs.is_empty() {
            return self.clone();
        }
        let mut omnimatch = self.clone();
        omnimatch.dictionary = self
            .dictionary
            .with_dictionary(RankedDictionary::from_words(USER_INPUTS, user_inputs));
        omnimatch
    }

    pub fn with_regex_rules(mut self, rules: Vec<RegexRule>) -> Self {
        self.regex = self.regex.with_rules(rules);
        self
    }

    pub fn with_dictionary(mut self, dictionary: RankedDictionary) -> Self {
        self.dictionary = self.dictionary.with_dictionary(dictionary);
        self
    }

    pub fn with_reference_date(mut self, reference_date: NaiveDate) -> Self {
        self.reference_date = reference_date;
        self
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    pub fn dictionary_matcher(&self) -> &DictionaryMatcher {
        &self.dictionary
    }

    pub fn guess_context(&self, password: &str) -> GuessContext {
        GuessContext {
            password_len: password.chars().count(),
            reference_year: self.reference_date.year(),
        }
    }

    /// All candidate matches for `password`, sorted by `(i, j)`.
    pub fn omnimatch(&self, password: &str) -> MatchResult {
        ensure_not_empty(password)?;

        let matchers: [&dyn Matcher; 8] = [
            &self.dictionary,
            &ReversedMatcher,
            &self.l33t,
            &self.spatial,
            &RepeatMatcher,
            &SequenceMatcher,
            &self.regex,
            &DateMatcher,
        ];

        let mut matches = Vec::new();
        for matcher in matchers {
            let found = matcher.match_password(password, self)?;
            #[cfg(feature = "tracing")]
            tracing::trace!("{} matcher: {} candidates", matcher.name(), found.len());
            matches.extend(found);
        }
        sort_matches(&mut matches);
        Ok(matches)
    }
}
