use std::sync::Arc;

use super::{MatchResult, Matcher, Omnimatch, build_match};
use crate::error::ensure_not_empty;
use crate::guesses::GuessContext;
use crate::keyboard::SpatialGraph;
use crate::types::{Match, Pattern, SpatialPattern, sort_matches};

/// Runs of keys adjacent on a keyboard layout (`qwerty`, `zxcvbn`, `7894`).
#[derive(Debug, Clone, Default)]
pub struct SpatialMatcher {
    graphs: Vec<Arc<SpatialGraph>>,
}

impl SpatialMatcher {
    pub fn new(graphs: Vec<Arc<SpatialGraph>>) -> Self {
        Self { graphs }
    }

    fn match_graph(&self, chars: &[char], graph: &SpatialGraph, ctx: &GuessContext) -> Vec<Match> {
        let n = chars.len();
        let mut matches = Vec::new();
        let mut i = 0;

        while i + 1 < n {
            let mut j = i + 1;
            let mut last_direction = None;
            let mut turns = 0;
            // a shifted first key is only visible from the character itself
            let mut shifted_count = usize::from(graph.is_shifted(chars[i]));

            loop {
                let step = if j < n {
                    graph.adjacent_direction(chars[j - 1], chars[j])
                } else {
                    None
                };

                match step {
                    Some((direction, shifted)) => {
                        j += 1;
                        if shifted {
                            shifted_count += 1;
                        }
                        if last_direction != Some(direction) {
                            if last_direction.is_some() {
                                turns += 1;
                            }
                            last_direction = Some(direction);
                        }
                    }
                    None => {
                        // runs of three or more keys only
                        if j - i > 2 {
                            let pattern = Pattern::Spatial(SpatialPattern {
                                graph: graph.name().to_string(),
                                turns,
                                shifted_count,
                                starting_positions: graph.starting_positions(),
                                average_degree: graph.average_degree(),
                            });
                            let token: String = chars[i..j].iter().collect();
                            matches.push(build_match(i, j - 1, token, None, pattern, ctx));
                        }
                        i = j;
                        break;
                    }
                }
            }
        }

        matches
    }
}

impl Matcher for SpatialMatcher {
    fn name(&self) -> &'static str {
        "spatial"
    }

    fn match_password(&self, password: &str, omnimatch: &Omnimatch) -> MatchResult {
        ensure_not_empty(password)?;
        let ctx = omnimatch.guess_context(password);
        let chars: Vec<char> = password.chars().collect();
        let mut matches: Vec<Match> = self
            .graphs
            .iter()
            .flat_map(|graph| self.match_graph(&chars, graph, &ctx))
            .collect();
        sort_matches(&mut matches);
        Ok(matches)
    }
}
