use std::collections::{BTreeMap, BTreeSet};

use super::{MatchResult, Matcher, Omnimatch, build_match};
use crate::error::ensure_not_empty;
use crate::guesses::{l33t_variations, uppercase_variations};
use crate::types::{Pattern, sort_matches};

/// Plain character -> l33t characters commonly typed in its place.
const DEFAULT_TABLE: [(char, &str); 12] = [
    ('a', "4@"),
    ('b', "8"),
    ('c', "({[<"),
    ('e', "3"),
    ('g', "69"),
    ('i', "1!|"),
    ('l', "1|7"),
    ('o', "0"),
    ('s', "$5"),
    ('t', "+7"),
    ('x', "%"),
    ('z', "2"),
];

/// A substitution map, l33t character -> plain character.
pub type Substitution = BTreeMap<char, char>;

/// Dictionary words with l33t substitutions (`p4ssw0rd`).
#[derive(Debug, Clone)]
pub struct L33tMatcher {
    table: BTreeMap<char, Vec<char>>,
}

impl Default for L33tMatcher {
    fn default() -> Self {
        Self {
            table: DEFAULT_TABLE
                .iter()
                .map(|(plain, subs)| (*plain, subs.chars().collect()))
                .collect(),
        }
    }
}

impl L33tMatcher {
    /// The part of the table whose l33t characters occur in `password`.
    fn relevant_table(&self, password: &str) -> BTreeMap<char, Vec<char>> {
        self.table
            .iter()
            .filter_map(|(plain, subs)| {
                let present: Vec<char> =
                    subs.iter().copied().filter(|c| password.contains(*c)).collect();
                (!present.is_empty()).then_some((*plain, present))
            })
            .collect()
    }

    /// Every way of reading the l33t characters of `table`.
    ///
    /// Each map translates every l33t character once. A character standing for several
    /// plain characters (`1` for `i` or `l`) forks the candidate set, one map per reading.
    /// Duplicates are removed through their sorted `(l33t, plain)` pairs.
    pub fn enumerate_substitutions(table: &BTreeMap<char, Vec<char>>) -> Vec<Substitution> {
        let mut subs: Vec<Substitution> = vec![Substitution::new()];
        for (&plain, l33t_chars) in table {
            for &l33t in l33t_chars {
                subs = subs
                    .into_iter()
                    .flat_map(|sub| {
                        let mut extended = sub.clone();
                        extended.insert(l33t, plain);
                        if sub.contains_key(&l33t) {
                            vec![sub, extended]
                        } else {
                            vec![extended]
                        }
                    })
                    .collect();
            }
        }

        let mut seen = BTreeSet::new();
        subs.into_iter()
            .filter(|sub| !sub.is_empty())
            .filter(|sub| seen.insert(sub.iter().map(|(k, v)| (*k, *v)).collect::<Vec<_>>()))
            .collect()
    }
}

fn translate(password: &str, sub: &Substitution) -> String {
    password
        .chars()
        .map(|c| sub.get(&c).copied().unwrap_or(c))
        .collect()
}

fn sub_display(sub: &Substitution) -> String {
    sub.iter()
        .map(|(l33t, plain)| format!("{} -> {}", l33t, plain))
        .collect::<Vec<_>>()
        .join(", ")
}

impl Matcher for L33tMatcher {
    fn name(&self) -> &'static str {
        "l33t"
    }

    fn match_password(&self, password: &str, omnimatch: &Omnimatch) -> MatchResult {
        ensure_not_empty(password)?;
        let ctx = omnimatch.guess_context(password);
        let chars: Vec<char> = password.chars().collect();
        let mut seen = BTreeSet::new();
        let mut matches = Vec::new();

        for sub in Self::enumerate_substitutions(&self.relevant_table(password)) {
            let translated = translate(password, &sub);
            for m in omnimatch
                .dictionary_matcher()
                .match_password(&translated, omnimatch)?
            {
                let Pattern::Dictionary(mut payload) = m.pattern else {
                    continue;
                };
                let token: String = chars[m.i..=m.j].iter().collect();
                // single characters like '1' for 'i' are noise
                if token.chars().count() <= 1 {
                    continue;
                }
                let used: Substitution = sub
                    .iter()
                    .filter(|(l33t, _)| token.contains(**l33t))
                    .map(|(l33t, plain)| (*l33t, *plain))
                    .collect();
                if used.is_empty() {
                    continue;
                }
                let key = (m.i, m.j, payload.dictionary_name.clone(), sub_display(&used));
                if !seen.insert(key) {
                    continue;
                }

                payload.l33t = true;
                payload.uppercase_variations = uppercase_variations(&token);
                payload.l33t_variations = l33t_variations(&token, &used);
                payload.sub_display = sub_display(&used);
                payload.sub = used;
                matches.push(build_match(
                    m.i,
                    m.j,
                    token,
                    m.cardinality,
                    Pattern::Dictionary(payload),
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
    use crate::types::DictionaryPattern;

    fn table(entries: &[(char, &str)]) -> BTreeMap<char, Vec<char>> {
        entries
            .iter()
            .map(|(plain, subs)| (*plain, subs.chars().collect()))
            .collect()
    }

    #[test]
    fn test_relevant_table() {
        let relevant = L33tMatcher::default().relevant_table("p4ssw0rd!");
        assert_eq!(relevant, table(&[('a', "4"), ('i', "!"), ('o', "0")]));
    }

    #[test]
    fn test_enumerate_single_readings() {
        let subs = L33tMatcher::enumerate_substitutions(&table(&[('a', "4"), ('o', "0")]));
        assert_eq!(subs, vec![Substitution::from([('4', 'a'), ('0', 'o')])]);
    }

    #[test]
    fn test_enumerate_ambiguous_character_forks() {
        let subs = L33tMatcher::enumerate_substitutions(&table(&[('i', "1"), ('l', "1")]));
        assert_eq!(
            subs,
            vec![Substitution::from([('1', 'i')]), Substitution::from([('1', 'l')])]
        );
    }

    #[test]
    fn test_enumerate_nothing_relevant() {
        assert!(L33tMatcher::enumerate_substitutions(&BTreeMap::new()).is_empty());
    }

    #[test]
    fn test_p4ssw0rd() {
        let omnimatch = omnimatch();
        let matches = L33tMatcher::default()
            .match_password("p4ssw0rd", &omnimatch)
            .unwrap();
        let m = matches.iter().find(|m| m.i == 0 && m.j == 7).unwrap();
        assert_eq!(m.token, "p4ssw0rd");
        let Pattern::Dictionary(DictionaryPattern {
            matched_word,
            l33t,
            sub,
            sub_display,
            l33t_variations,
            ..
        }) = &m.pattern
        else {
            panic!("expected dictionary pattern");
        };
        assert!(*l33t);
        assert_eq!(matched_word, "password");
        assert_eq!(*sub, Substitution::from([('4', 'a'), ('0', 'o')]));
        assert_eq!(sub_display, "0 -> o, 4 -> a");
        assert_eq!(*l33t_variations, 4.0);
        assert_eq!(m.guesses, 4.0);
    }

    #[test]
    fn test_unsubstituted_words_are_skipped() {
        let omnimatch = omnimatch();
        let matches = L33tMatcher::default()
            .match_password("password4", &omnimatch)
            .unwrap();
        assert!(matches.iter().all(|m| m.token.contains('4')));
    }

    #[test]
    fn test_single_character_matches_are_skipped() {
        let omnimatch = omnimatch();
        let matches = L33tMatcher::default().match_password("4", &omnimatch).unwrap();
        assert!(matches.is_empty());
    }
}
