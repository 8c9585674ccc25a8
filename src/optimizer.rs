//! Match sequence search
//!
//! Picks the non-overlapping matches that cover the password with the fewest guesses,
//! filling uncovered spans with brute force. The search is a dynamic program over
//! `(end position, sequence length)`:
//!
//! ```text
//! g(sequence) = l! * product(m.guesses) + 10000^(l - 1)
//! ```
//!
//! The factorial accounts for the attacker not knowing the order of the patterns, the
//! additive term for not knowing how many patterns there are. A legacy minimum-entropy
//! search is kept alongside, see [`minimum_entropy_match_sequence`].

use std::collections::BTreeMap;

use crate::error::{EstimateError, ensure_not_empty};
use crate::guesses::{
    GuessContext, MIN_GUESSES_BEFORE_GROWING_SEQUENCE, password_cardinality, saturate,
};
use crate::matchers::build_match;
use crate::types::{Match, Pattern};

/// Winner of the minimum-guesses search.
#[derive(Debug, Clone, PartialEq)]
pub struct GuessSequence {
    /// Product of the guesses of the matches in `sequence`.
    pub guesses: f64,
    pub guesses_log10: f64,
    /// Covers the password exactly, ordered by position.
    pub sequence: Vec<Match>,
}

/// Winner of the legacy minimum-entropy search.
#[derive(Debug, Clone, PartialEq)]
pub struct EntropySequence {
    /// Total bits.
    pub entropy: f64,
    pub sequence: Vec<Match>,
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    /// Arena index of the last match of the sequence.
    m: usize,
    /// Product of guesses along the sequence.
    pi: f64,
    /// Overall score, lower is better.
    g: f64,
}

fn factorial(n: usize) -> f64 {
    saturate((2..=n).map(|k| k as f64).product())
}

fn bruteforce_match(chars: &[char], i: usize, j: usize, ctx: &GuessContext) -> Match {
    let token: String = chars[i..=j].iter().collect();
    let cardinality = password_cardinality(&token);
    build_match(i, j, token, Some(cardinality), Pattern::Bruteforce, ctx)
}

/// Search state for one password. Owns every match it may place in a sequence,
/// including the brute-force fillers it creates on the way.
struct Search<'a> {
    chars: Vec<char>,
    ctx: &'a GuessContext,
    exclude_additive: bool,
    arena: Vec<Match>,
    /// Per end position: sequence length -> best sequence of that length.
    optimal: Vec<BTreeMap<usize, Slot>>,
}

impl<'a> Search<'a> {
    fn new(password: &str, matches: Vec<Match>, ctx: &'a GuessContext, exclude_additive: bool) -> Self {
        let chars: Vec<char> = password.chars().collect();
        let optimal = vec![BTreeMap::new(); chars.len()];
        Self {
            chars,
            ctx,
            exclude_additive,
            arena: matches,
            optimal,
        }
    }

    /// Considers the best length `l - 1` sequence before match `m`, extended by `m`.
    fn update(&mut self, m: usize, l: usize) {
        let (i, k, guesses) = {
            let candidate = &self.arena[m];
            (candidate.i, candidate.j, candidate.guesses)
        };

        let mut pi = guesses;
        if l > 1 {
            let Some(previous) = self.optimal[i - 1].get(&(l - 1)) else {
                return;
            };
            pi = saturate(pi * previous.pi);
        }

        let mut g = saturate(factorial(l) * pi);
        if !self.exclude_additive {
            g = saturate(g + MIN_GUESSES_BEFORE_GROWING_SEQUENCE.powi(l as i32 - 1));
        }

        // a sequence that is no longer and no more expensive already ends here
        let dominated = self.optimal[k]
            .range(..=l)
            .any(|(_, competing)| competing.g <= g);
        if dominated {
            return;
        }
        self.optimal[k].insert(l, Slot { m, pi, g });
    }

    /// Brute force over every `[i, k]`, alone or appended to a sequence ending at `i - 1`.
    fn bruteforce_update(&mut self, k: usize) {
        let whole = bruteforce_match(&self.chars, 0, k, self.ctx);
        self.arena.push(whole);
        self.update(self.arena.len() - 1, 1);

        for i in 1..=k {
            let filler = bruteforce_match(&self.chars, i, k, self.ctx);
            self.arena.push(filler);
            let m = self.arena.len() - 1;

            let previous: Vec<(usize, usize)> = self.optimal[i - 1]
                .iter()
                .map(|(l, slot)| (*l, slot.m))
                .collect();
            for (l, last) in previous {
                // two adjacent brute-force spans are never better than one
                if self.arena[last].is_bruteforce() {
                    continue;
                }
                self.update(m, l + 1);
            }
        }
    }

    fn run(mut self) -> GuessSequence {
        let n = self.chars.len();
        let mut by_end: Vec<Vec<usize>> = vec![Vec::new(); n];
        for (index, m) in self.arena.iter().enumerate() {
            let in_bounds = m.i <= m.j && m.j < n;
            debug_assert!(in_bounds, "match span ({}, {}) outside password of length {}", m.i, m.j, n);
            if in_bounds {
                by_end[m.j].push(index);
            }
        }
        for indices in &mut by_end {
            indices.sort_by_key(|&index| self.arena[index].i);
        }

        for (k, indices) in by_end.iter().enumerate() {
            for &m in indices {
                let i = self.arena[m].i;
                if i > 0 {
                    let lengths: Vec<usize> = self.optimal[i - 1].keys().copied().collect();
                    for l in lengths {
                        self.update(m, l + 1);
                    }
                } else {
                    self.update(m, 1);
                }
            }
            self.bruteforce_update(k);
        }

        self.unwind()
    }

    fn unwind(self) -> GuessSequence {
        let n = self.chars.len();
        let mut best: Option<(usize, Slot)> = None;
        for (l, slot) in &self.optimal[n - 1] {
            if best.is_none_or(|(_, current)| slot.g < current.g) {
                best = Some((*l, *slot));
            }
        }

        let Some((mut l, winner)) = best else {
            return GuessSequence {
                guesses: 1.0,
                guesses_log10: 0.0,
                sequence: Vec::new(),
            };
        };

        let mut sequence = Vec::with_capacity(l);
        let mut k = n - 1;
        while let Some(slot) = self.optimal[k].get(&l) {
            let m = &self.arena[slot.m];
            sequence.push(m.clone());
            if m.i == 0 || l == 1 {
                break;
            }
            k = m.i - 1;
            l -= 1;
        }
        sequence.reverse();

        GuessSequence {
            guesses: winner.pi,
            guesses_log10: winner.pi.log10(),
            sequence,
        }
    }
}

/// Finds the minimum-guesses covering sequence of `password` among `matches`.
///
/// With `exclude_additive` the `10000^(l - 1)` term is left out of the score, which
/// stops the search from favouring short sequences.
///
/// # Errors
///
/// Returns [`EstimateError::EmptyPassword`] for an empty password.
pub fn most_guessable_match_sequence(
    password: &str,
    matches: Vec<Match>,
    ctx: &GuessContext,
    exclude_additive: bool,
) -> Result<GuessSequence, EstimateError> {
    ensure_not_empty(password)?;
    Ok(Search::new(password, matches, ctx, exclude_additive).run())
}

/// Legacy search: the covering sequence with the fewest total bits, where uncovered
/// characters cost `log2(cardinality(password))` each.
pub fn minimum_entropy_match_sequence(
    password: &str,
    matches: &[Match],
    ctx: &GuessContext,
) -> Result<EntropySequence, EstimateError> {
    ensure_not_empty(password)?;
    let chars: Vec<char> = password.chars().collect();
    let n = chars.len();

    let cardinality = password_cardinality(password);
    let char_bits = (cardinality as f64).log2();

    for m in matches {
        debug_assert!(
            m.i <= m.j && m.j < n,
            "match span ({}, {}) outside password of length {}",
            m.i,
            m.j,
            n
        );
    }

    let mut up_to: Vec<f64> = vec![0.0; n];
    let mut backpointers: Vec<Option<usize>> = vec![None; n];
    for k in 0..n {
        up_to[k] = if k > 0 { up_to[k - 1] } else { 0.0 } + char_bits;
        for (index, m) in matches.iter().enumerate().filter(|(_, m)| m.j == k && m.i <= m.j) {
            let candidate = if m.i > 0 { up_to[m.i - 1] } else { 0.0 } + m.entropy;
            if candidate < up_to[k] {
                up_to[k] = candidate;
                backpointers[k] = Some(index);
            }
        }
    }

    let mut chosen = Vec::new();
    let mut k = n;
    while k > 0 {
        match backpointers[k - 1] {
            Some(index) => {
                chosen.push(&matches[index]);
                k = matches[index].i;
            }
            None => k -= 1,
        }
    }
    chosen.reverse();

    let filler = |i: usize, j: usize| {
        let mut m = bruteforce_match(&chars, i, j, ctx);
        m.cardinality = Some(cardinality);
        m.entropy = (j + 1 - i) as f64 * char_bits;
        m
    };

    let mut sequence = Vec::with_capacity(chosen.len() * 2 + 1);
    let mut next = 0;
    for m in chosen {
        if m.i > next {
            sequence.push(filler(next, m.i - 1));
        }
        next = m.j + 1;
        sequence.push(m.clone());
    }
    if next < n {
        sequence.push(filler(next, n - 1));
    }

    Ok(EntropySequence {
        entropy: up_to[n - 1],
        sequence,
    })
}
