//! Guess estimation - one formula per pattern kind.
//!
//! Every estimate is floored at the sub-match minimum and saturates at `f64::MAX`
//! so downstream comparisons stay well ordered.

use std::collections::BTreeMap;

use crate::types::{Match, Pattern};

pub const MIN_SUBMATCH_GUESSES_SINGLE_CHAR: f64 = 10.0;
pub const MIN_SUBMATCH_GUESSES_MULTI_CHAR: f64 = 50.0;
pub const MIN_GUESSES_BEFORE_GROWING_SEQUENCE: f64 = 10_000.0;
pub const MIN_YEAR_SPACE: i32 = 20;

// Named characters in Unicode 8.0
const UNICODE_CHARACTERS: usize = 120_672;

/// Printable code points outside ASCII: named characters minus ASCII, the line and
/// paragraph separators, C1 controls and the 161 `Cf` format characters.
pub const UNICODE_PRINTABLE_CHARACTERS: usize = UNICODE_CHARACTERS - (128 + 2 + 32 + 161);

/// `Cc` control characters: C0, DEL and C1.
pub const CONTROL_CHARACTERS: usize = 32 + 1 + 32;

/// Regex matcher name whose guesses depend on the distance to the reference year.
pub const RECENT_YEAR: &str = "recent_year";

/// What a guess estimate depends on besides the match itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuessContext {
    /// Length, in characters, of the password the match was found in.
    pub password_len: usize,
    pub reference_year: i32,
}

/// Replaces an overflowed product with the largest finite value.
pub fn saturate(value: f64) -> f64 {
    if value.is_infinite() { f64::MAX } else { value }
}

pub fn saturating_pow(base: f64, exponent: usize) -> f64 {
    saturate(base.powf(exponent as f64))
}

/// Binomial coefficient nCk, computed in floating point.
pub fn n_ck(n: usize, k: usize) -> f64 {
    if k > n {
        return 0.0;
    }
    if k == 0 {
        return 1.0;
    }
    let mut n = n as f64;
    let mut r = 1.0;
    for d in 1..=k {
        r *= n;
        r /= d as f64;
        n -= 1.0;
    }
    r.round()
}

pub fn is_ascii_symbol(c: char) -> bool {
    matches!(c, ' '..='/' | ':'..='@' | '['..='`' | '{'..='~')
}

/// Size of the smallest union of character classes covering `token`
/// (e.g. lowercase = 26, lowercase + digits = 36).
pub fn password_cardinality(token: &str) -> usize {
    let (mut lower, mut upper, mut digits, mut symbols, mut unicode, mut control) =
        (false, false, false, false, false, false);
    for c in token.chars() {
        match c {
            'a'..='z' => lower = true,
            'A'..='Z' => upper = true,
            '0'..='9' => digits = true,
            c if is_ascii_symbol(c) => symbols = true,
            c if c.is_control() => control = true,
            _ => unicode = true,
        }
    }

    let mut cardinality = 0;
    if lower {
        cardinality += 26;
    }
    if upper {
        cardinality += 26;
    }
    if digits {
        cardinality += 10;
    }
    if symbols {
        cardinality += 33;
    }
    if unicode {
        cardinality += UNICODE_PRINTABLE_CHARACTERS;
    }
    if control {
        cardinality += CONTROL_CHARACTERS;
    }
    cardinality
}

/// Floor applied to every match: the whole password may be a single guess,
/// sub-matches may not.
pub fn min_guesses(token_len: usize, password_len: usize) -> f64 {
    if token_len >= password_len {
        1.0
    } else if token_len == 1 {
        MIN_SUBMATCH_GUESSES_SINGLE_CHAR
    } else {
        MIN_SUBMATCH_GUESSES_MULTI_CHAR
    }
}

/// Number of ways to pick which of `a + b` characters belong to the smaller group.
/// Shared by the l33t and shifted-key ambiguity factors.
fn split_variations(a: usize, b: usize) -> f64 {
    if a == 0 || b == 0 {
        return 2.0;
    }
    (1..=a.min(b)).map(|i| n_ck(a + b, i)).sum()
}

/// Extra guesses from capitalization.
///
/// All-lowercase costs nothing; a leading or trailing capital or all caps doubles the
/// space; any other mix counts the ways to place the rarer case.
pub fn uppercase_variations(token: &str) -> f64 {
    let upper = token.chars().filter(|c| c.is_ascii_uppercase()).count();
    let lower = token.chars().filter(|c| c.is_ascii_lowercase()).count();
    if upper == 0 {
        return 1.0;
    }

    let chars: Vec<char> = token.chars().collect();
    let rest_has_upper = |slice: &[char]| slice.iter().any(|c| c.is_ascii_uppercase());
    let starts_only = chars[0].is_ascii_uppercase() && !rest_has_upper(&chars[1..]);
    let ends_only = chars[chars.len() - 1].is_ascii_uppercase()
        && !rest_has_upper(&chars[..chars.len() - 1]);
    if starts_only || ends_only || lower == 0 {
        return 2.0;
    }

    (1..=upper.min(lower)).map(|i| n_ck(upper + lower, i)).sum()
}

/// Extra guesses from l33t substitutions, multiplied over every substitution used.
pub fn l33t_variations(token: &str, sub: &BTreeMap<char, char>) -> f64 {
    let lowered = token.to_lowercase();
    sub.iter()
        .map(|(&subbed, &unsubbed)| {
            let subbed_count = lowered.chars().filter(|&c| c == subbed).count();
            let unsubbed_count = lowered.chars().filter(|&c| c == unsubbed).count();
            split_variations(subbed_count, unsubbed_count)
        })
        .product()
}

/// Keyboard-walk guesses. `turns` counts direction changes, so a walk has `turns + 1`
/// straight segments.
pub fn spatial_guesses(
    length: usize,
    turns: usize,
    shifted_count: usize,
    starting_positions: usize,
    average_degree: f64,
) -> f64 {
    let segments = turns + 1;
    let mut guesses = 0.0;
    for i in 2..=length {
        let possible_turns = segments.min(i - 1);
        for j in 1..=possible_turns {
            guesses += n_ck(i - 1, j - 1) * starting_positions as f64 * average_degree.powi(j as i32);
        }
    }

    if shifted_count > 0 {
        let unshifted_count = length.saturating_sub(shifted_count);
        guesses *= split_variations(shifted_count, unshifted_count);
    }
    saturate(guesses)
}

pub fn bruteforce_guesses(token: &str) -> f64 {
    let length = token.chars().count();
    let guesses = saturating_pow(password_cardinality(token) as f64, length);
    // One above the sub-match floor so a real pattern over the same span wins ties.
    let floor = if length == 1 {
        MIN_SUBMATCH_GUESSES_SINGLE_CHAR + 1.0
    } else {
        MIN_SUBMATCH_GUESSES_MULTI_CHAR + 1.0
    };
    guesses.max(floor)
}

pub fn year_space(year: i32, reference_year: i32) -> f64 {
    f64::from((year - reference_year).abs().max(MIN_YEAR_SPACE))
}

/// Kind-specific guesses for `m`, floored at the sub-match minimum.
pub fn estimate_guesses(m: &Match, ctx: &GuessContext) -> f64 {
    let token_len = m.token.chars().count();
    let guesses = match &m.pattern {
        Pattern::Bruteforce => bruteforce_guesses(&m.token),
        Pattern::Dictionary(d) => {
            let reversed = if d.reversed { 2.0 } else { 1.0 };
            d.rank as f64 * d.uppercase_variations * d.l33t_variations * reversed
        }
        Pattern::Spatial(s) => spatial_guesses(
            token_len,
            s.turns,
            s.shifted_count,
            s.starting_positions,
            s.average_degree,
        ),
        Pattern::Repeat(r) => r.base_guesses * r.repeat_count as f64,
        Pattern::Sequence(s) => {
            let base = if s.ascending {
                s.sequence_space as f64
            } else {
                s.sequence_space as f64 * 2.0
            };
            base * token_len as f64
        }
        Pattern::Regex(r) => {
            let cardinality = m.cardinality.unwrap_or(1) as f64;
            if r.regex_name == RECENT_YEAR {
                match r.regex_match.parse::<i32>() {
                    Ok(year) => year_space(year, ctx.reference_year),
                    Err(_) => f64::from(MIN_YEAR_SPACE),
                }
            } else if r.per_char_cardinality {
                saturating_pow(cardinality, token_len)
            } else {
                cardinality
            }
        }
        Pattern::Date(d) => {
            let guesses = year_space(d.year, ctx.reference_year) * 365.0;
            if d.separator.is_empty() { guesses } else { guesses * 4.0 }
        }
    };

    saturate(guesses).max(min_guesses(token_len, ctx.password_len))
}
