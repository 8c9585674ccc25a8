use super::{MatchResult, Matcher, Omnimatch, build_match};
use crate::error::ensure_not_empty;
use crate::types::{Pattern, sort_matches};

/// Dictionary words typed backwards.
///
/// Runs the dictionary matcher over the reversed password and maps the spans back onto
/// the original; tokens are stored un-reversed, as they appear in the password.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReversedMatcher;

impl Matcher for ReversedMatcher {
    fn name(&self) -> &'static str {
        "reversed"
    }

    fn match_password(&self, password: &str, omnimatch: &Omnimatch) -> MatchResult {
        ensure_not_empty(password)?;
        let reversed: String = password.chars().rev().collect();
        let n = password.chars().count();
        let ctx = omnimatch.guess_context(password);

        let mut matches: Vec<_> = omnimatch
            .dictionary_matcher()
            .match_password(&reversed, omnimatch)?
            .into_iter()
            .filter_map(|m| {
                let Pattern::Dictionary(mut payload) = m.pattern else {
                    return None;
                };
                payload.reversed = true;
                let token: String = m.token.chars().rev().collect();
                Some(build_match(
                    n - 1 - m.j,
                    n - 1 - m.i,
                    token,
                    m.cardinality,
                    Pattern::Dictionary(payload),
                    &ctx,
                ))
            })
            .collect();

        sort_matches(&mut matches);
        Ok(matches)
    }
}
