//! Legacy entropy (bits) per match. Only feeds the auxiliary minimum-entropy sequence.

use crate::guesses::{n_ck, password_cardinality};
use crate::types::{Match, Pattern};

// Separated-date year range used by the legacy model.
const DATE_YEAR_SPAN: f64 = 9_999.0 - 100.0;

pub fn estimate_entropy(m: &Match) -> f64 {
    let token_len = m.token.chars().count();
    match &m.pattern {
        Pattern::Bruteforce => bruteforce_entropy(&m.token),
        Pattern::Dictionary(d) => {
            let mut bits = (d.rank as f64).log2() + uppercase_entropy(d.uppercase_variations);
            if d.l33t {
                bits += d.l33t_variations.log2().max(1.0);
            }
            if d.reversed {
                bits += 1.0;
            }
            bits
        }
        Pattern::Spatial(s) => {
            let segments = s.turns + 1;
            let mut possibilities = 0.0;
            for i in 2..=token_len {
                for j in 1..=segments.min(i - 1) {
                    possibilities += s.starting_positions as f64
                        * s.average_degree.powi(j as i32)
                        * n_ck(i - 1, j - 1);
                }
            }
            let mut bits = possibilities.log2();
            if s.shifted_count > 0 {
                let unshifted = token_len.saturating_sub(s.shifted_count);
                let shifted_space: f64 = (0..=s.shifted_count.min(unshifted))
                    .map(|i| n_ck(token_len, i))
                    .sum();
                bits += shifted_space.log2();
            }
            bits
        }
        Pattern::Repeat(_) => {
            ((password_cardinality(&m.token) * token_len) as f64).log2()
        }
        Pattern::Sequence(s) => {
            let first = m.token.chars().next().unwrap_or('a');
            let mut bits = if first == 'a' || first == '1' {
                1.0
            } else if first.is_ascii_digit() {
                10f64.log2()
            } else if first.is_ascii_lowercase() {
                26f64.log2()
            } else {
                26f64.log2() + 1.0
            };
            if !s.ascending {
                bits += 1.0;
            }
            bits + (token_len as f64).log2()
        }
        Pattern::Regex(r) => {
            let cardinality = m.cardinality.unwrap_or(1) as f64;
            if r.per_char_cardinality {
                token_len as f64 * cardinality.log2()
            } else {
                cardinality.log2()
            }
        }
        Pattern::Date(d) => {
            let years = if d.year < 100 { 100.0 } else { DATE_YEAR_SPAN };
            let bits = (years * 12.0 * 31.0).log2();
            if d.separator.is_empty() { bits } else { bits + 2.0 }
        }
    }
}

pub fn bruteforce_entropy(token: &str) -> f64 {
    token.chars().count() as f64 * (password_cardinality(token) as f64).log2()
}

fn uppercase_entropy(variations: f64) -> f64 {
    if variations <= 1.0 {
        0.0
    } else if variations <= 2.0 {
        1.0
    } else {
        (variations + 1.0).log2()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use crate::types::DictionaryPattern;

    #[test]
    fn test_bruteforce_entropy() {
        assert!((bruteforce_entropy("abcd") - 4.0 * 26f64.log2()).abs() < 1e-12);
    }

    #[test]
    fn test_bruteforce_entropy_control_characters() {
        let bits = bruteforce_entropy("\t\t");
        assert!(bits.is_finite());
        assert!((bits - 2.0 * 65f64.log2()).abs() < 1e-12);
    }

    #[test]
    fn test_dictionary_entropy_adds_case_and_reversal() {
        let m = Match {
            i: 0,
            j: 7,
            token: "Password".to_string(),
            cardinality: None,
            entropy: 0.0,
            guesses: 0.0,
            pattern: Pattern::Dictionary(DictionaryPattern {
                matched_word: "password".to_string(),
                rank: 8,
                dictionary_name: "passwords".to_string(),
                reversed: true,
                l33t: false,
                sub: BTreeMap::new(),
                sub_display: String::new(),
                uppercase_variations: 2.0,
                l33t_variations: 1.0,
            }),
        };
        assert_eq!(estimate_entropy(&m), 3.0 + 1.0 + 1.0);
    }
}
