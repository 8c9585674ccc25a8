use super::{MatchResult, Matcher, Omnimatch, build_match};
use crate::error::ensure_not_empty;
use crate::optimizer::most_guessable_match_sequence;
use crate::types::{Pattern, RepeatPattern};

/// Repeated substrings (`aaa`, `abcabcabc`).
///
/// The repeated unit is itself analysed with the full pipeline, so `abcabc` costs
/// the guesses of the sequence `abc` times two.
#[derive(Debug, Clone, Copy, Default)]
pub struct RepeatMatcher;

/// Times `chars[start..start + unit]` occurs back to back from `start`.
fn repeat_count(chars: &[char], start: usize, unit: usize) -> usize {
    let base = &chars[start..start + unit];
    chars[start..]
        .chunks_exact(unit)
        .take_while(|chunk| *chunk == base)
        .count()
}

/// Longest unit repeated at least twice from `start`, with its repeat count.
fn greedy_repeat(chars: &[char], start: usize) -> Option<(usize, usize)> {
    let max_unit = (chars.len() - start) / 2;
    (1..=max_unit)
        .rev()
        .map(|unit| (unit, repeat_count(chars, start, unit)))
        .find(|(_, count)| *count >= 2)
}

/// Shortest unit repeated at least twice from `start`, with its repeat count.
fn lazy_repeat(chars: &[char], start: usize) -> Option<(usize, usize)> {
    let max_unit = (chars.len() - start) / 2;
    (1..=max_unit)
        .map(|unit| (unit, repeat_count(chars, start, unit)))
        .find(|(_, count)| *count >= 2)
}

/// Shortest unit whose repetition is exactly `span`.
fn minimal_period(span: &[char]) -> usize {
    let n = span.len();
    (1..=n / 2)
        .find(|&unit| n % unit == 0 && repeat_count(span, 0, unit) == n / unit)
        .unwrap_or(n)
}

impl Matcher for RepeatMatcher {
    fn name(&self) -> &'static str {
        "repeat"
    }

    fn match_password(&self, password: &str, omnimatch: &Omnimatch) -> MatchResult {
        ensure_not_empty(password)?;
        let ctx = omnimatch.guess_context(password);
        let chars: Vec<char> = password.chars().collect();
        let mut matches = Vec::new();
        let mut last_index = 0;

        while last_index < chars.len() {
            let Some((start, greedy, lazy)) = (last_index..chars.len()).find_map(|start| {
                let greedy = greedy_repeat(&chars, start)?;
                let lazy = lazy_repeat(&chars, start)?;
                Some((start, greedy, lazy))
            }) else {
                break;
            };

            let greedy_len = greedy.0 * greedy.1;
            let lazy_len = lazy.0 * lazy.1;
            // 'aabaab': greedy finds (aab)x2, lazy only (a)x2
            // 'aaaaa': lazy finds (a)x5, greedy only (aa)x2
            let (span_len, unit) = if greedy_len > lazy_len {
                let span = &chars[start..start + greedy_len];
                (greedy_len, minimal_period(span))
            } else {
                (lazy_len, lazy.0)
            };

            let i = start;
            let j = start + span_len - 1;
            let token: String = chars[i..=j].iter().collect();
            let base_token: String = chars[i..i + unit].iter().collect();

            let base_ctx = omnimatch.guess_context(&base_token);
            let base_analysis = most_guessable_match_sequence(
                &base_token,
                omnimatch.omnimatch(&base_token)?,
                &base_ctx,
                false,
            )?;

            let pattern = Pattern::Repeat(RepeatPattern {
                base_token,
                base_guesses: base_analysis.guesses,
                base_matches: base_analysis.sequence,
                repeat_count: span_len / unit,
            });
            matches.push(build_match(i, j, token, None, pattern, &ctx));
            last_index = j + 1;
        }

        Ok(matches)
    }
}
