use std::collections::BTreeMap;
use std::sync::Arc;

use super::{MatchResult, Matcher, Omnimatch, build_match};
use crate::error::ensure_not_empty;
use crate::dictionary::RankedDictionary;
use crate::guesses::uppercase_variations;
use crate::types::{DictionaryPattern, Pattern, sort_matches};

/// Looks every substring up, case-insensitively, in each ranked dictionary.
#[derive(Debug, Clone, Default)]
pub struct DictionaryMatcher {
    dictionaries: Vec<Arc<RankedDictionary>>,
}

impl DictionaryMatcher {
    pub fn new(dictionaries: Vec<Arc<RankedDictionary>>) -> Self {
        Self { dictionaries }
    }

    pub fn dictionaries(&self) -> &[Arc<RankedDictionary>] {
        &self.dictionaries
    }

    pub(crate) fn with_dictionary(&self, dictionary: RankedDictionary) -> Self {
        let mut dictionaries = self.dictionaries.clone();
        dictionaries.push(Arc::new(dictionary));
        Self { dictionaries }
    }
}

impl Matcher for DictionaryMatcher {
    fn name(&self) -> &'static str {
        "dictionary"
    }

    fn match_password(&self, password: &str, omnimatch: &Omnimatch) -> MatchResult {
        ensure_not_empty(password)?;
        let ctx = omnimatch.guess_context(password);
        let chars: Vec<char> = password.chars().collect();
        let lowered: Vec<String> = chars.iter().map(|c| c.to_lowercase().collect()).collect();
        let n = chars.len();

        let mut matches = Vec::new();
        for dictionary in &self.dictionaries {
            for i in 0..n {
                let end = n.min(i + dictionary.max_word_len());
                let mut candidate = String::new();
                for j in i..end {
                    candidate.push_str(&lowered[j]);
                    let Some(rank) = dictionary.rank(&candidate) else {
                        continue;
                    };

                    let token: String = chars[i..=j].iter().collect();
                    let pattern = Pattern::Dictionary(DictionaryPattern {
                        matched_word: candidate.clone(),
                        rank,
                        dictionary_name: dictionary.name().to_string(),
                        reversed: false,
                        l33t: false,
                        sub: BTreeMap::new(),
                        sub_display: String::new(),
                        uppercase_variations: uppercase_variations(&token),
                        l33t_variations: 1.0,
                    });
                    matches.push(build_match(i, j, token, Some(dictionary.len()), pattern, &ctx));
                }
            }
        }

        sort_matches(&mut matches);
        Ok(matches)
    }
}
