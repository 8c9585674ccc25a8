use super::{MatchResult, Matcher, Omnimatch, build_match};
use crate::error::ensure_not_empty;
use crate::guesses::{GuessContext, UNICODE_PRINTABLE_CHARACTERS, is_ascii_symbol};
use crate::types::{Match, Pattern, SequenceKind, SequencePattern};

/// Largest code point step still read as a sequence (`acegi`, `97531`).
const MAX_DELTA: i64 = 5;

/// Runs with a constant code point step, ascending or descending (`abcd`, `9753`, `ΑΒΓΔ`).
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceMatcher;

fn classify(token: &[char]) -> (SequenceKind, usize) {
    if token.iter().all(char::is_ascii_lowercase) {
        (SequenceKind::Lower, 26)
    } else if token.iter().all(char::is_ascii_uppercase) {
        (SequenceKind::Upper, 26)
    } else if token.iter().all(char::is_ascii_digit) {
        (SequenceKind::Digits, 10)
    } else if token.iter().all(|c| is_ascii_symbol(*c)) {
        (SequenceKind::Symbols, 33)
    } else {
        (SequenceKind::Unicode, UNICODE_PRINTABLE_CHARACTERS)
    }
}

fn sequence_match(chars: &[char], i: usize, j: usize, delta: i64, ctx: &GuessContext) -> Option<Match> {
    // two characters only count as a sequence with a unit step
    if j - i <= 1 && delta.abs() != 1 {
        return None;
    }
    if delta == 0 || delta.abs() > MAX_DELTA {
        return None;
    }

    let token = &chars[i..=j];
    let (kind, sequence_space) = classify(token);
    let pattern = Pattern::Sequence(SequencePattern {
        kind,
        sequence_space,
        ascending: delta > 0,
    });
    Some(build_match(i, j, token.iter().collect(), None, pattern, ctx))
}

impl Matcher for SequenceMatcher {
    fn name(&self) -> &'static str {
        "sequence"
    }

    fn match_password(&self, password: &str, omnimatch: &Omnimatch) -> MatchResult {
        ensure_not_empty(password)?;
        let chars: Vec<char> = password.chars().collect();
        if chars.len() <= 1 {
            return Ok(Vec::new());
        }

        let ctx = omnimatch.guess_context(password);
        let delta_at = |k: usize| i64::from(u32::from(chars[k])) - i64::from(u32::from(chars[k - 1]));

        let mut matches = Vec::new();
        let mut i = 0;
        let mut last_delta = delta_at(1);
        for k in 2..chars.len() {
            let delta = delta_at(k);
            if delta == last_delta {
                continue;
            }
            let j = k - 1;
            matches.extend(sequence_match(&chars, i, j, last_delta, &ctx));
            i = j;
            last_delta = delta;
        }
        matches.extend(sequence_match(&chars, i, chars.len() - 1, last_delta, &ctx));

        Ok(matches)
    }
}
