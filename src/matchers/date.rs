use std::sync::LazyLock;

use ::regex::Regex;
use chrono::{Datelike, NaiveDate};

use super::{MatchResult, Matcher, Omnimatch, build_match};
use crate::error::ensure_not_empty;
use crate::guesses::GuessContext;
use crate::types::{DatePattern, Match, Pattern, sort_matches};

const DATE_MIN_YEAR: i32 = 1;
const DATE_MAX_YEAR: i32 = 9999;

/// Ways to cut a separator-less digit run into `(left, middle, right)` lengths,
/// indexed by run length - 4.
const DATE_SPLITS: [&[(usize, usize, usize)]; 5] = [
    // 1 1 91, 91 1 1
    &[(1, 1, 2), (2, 1, 1)],
    &[(1, 1, 3), (1, 2, 2), (2, 1, 2), (2, 2, 1), (3, 1, 1)],
    &[
        (1, 1, 4),
        (1, 2, 3),
        (2, 1, 3),
        (2, 2, 2),
        (3, 1, 2),
        (3, 2, 1),
        (4, 1, 1),
    ],
    &[(1, 2, 4), (2, 1, 4), (2, 2, 3), (3, 2, 2), (4, 1, 2), (4, 2, 1)],
    // 11 11 1991, 1991 11 11
    &[(2, 2, 4), (4, 2, 2)],
];

const SEPARATOR: &str = r"[\s/\\_.-]";

static DAY_MONTH_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^(?P<first>[0-9]{{1,2}})(?P<sep1>{SEPARATOR})(?P<second>[0-9]{{1,2}})(?P<sep2>{SEPARATOR})(?P<year>[0-9]{{2,4}})$"
    ))
    .expect("date regex compiles")
});

static YEAR_MONTH_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^(?P<year>[0-9]{{2,4}})(?P<sep1>{SEPARATOR})(?P<first>[0-9]{{1,2}})(?P<sep2>{SEPARATOR})(?P<second>[0-9]{{1,2}})$"
    ))
    .expect("date regex compiles")
});

/// Calendar dates, with or without separators (`13/02/1991`, `1991-2-13`, `130291`).
///
/// Two-digit years map to 1950-2049. When a token reads as several dates, the one
/// nearest the reference date wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateMatcher;

fn four_digit_year(year: i32) -> i32 {
    match year {
        100.. => year,
        50..=99 => 1900 + year,
        _ => 2000 + year,
    }
}

fn calendar_date(year: i32, month: i32, day: i32) -> Option<NaiveDate> {
    let year = four_digit_year(year);
    if !(DATE_MIN_YEAR..=DATE_MAX_YEAR).contains(&year) || month < 1 || day < 1 {
        return None;
    }
    NaiveDate::from_ymd_opt(year, u32::try_from(month).ok()?, u32::try_from(day).ok()?)
}

fn year_metric(year: i32, reference: NaiveDate) -> i32 {
    (four_digit_year(year) - reference.year()).abs()
}

/// Days between the date and `reference`; `i64::MAX` for impossible dates.
fn date_metric(year: i32, month: i32, day: i32, reference: NaiveDate) -> i64 {
    if month > 12 && day <= 12 {
        return i64::MAX;
    }
    calendar_date(year, month, day)
        .map(|date| (date - reference).num_days().abs())
        .unwrap_or(i64::MAX)
}

/// Reads `(month, day)` the other way round when that date is nearer `reference`.
fn swap_day_month_by_metric(year: i32, month: i32, day: i32, reference: NaiveDate) -> (i32, i32, i32) {
    if date_metric(year, day, month, reference) < date_metric(year, month, day, reference) {
        (year, day, month)
    } else {
        (year, month, day)
    }
}

/// Interprets three integers as a date, year first or year last.
///
/// Rejects tuples that cannot be a date: a middle value outside 1..=31, values beyond
/// the year range or between 100 and the minimum year, two values over 31, three over 12,
/// or two zeros.
fn map_ints_to_date(left: i32, middle: i32, right: i32, reference: NaiveDate) -> Option<NaiveDate> {
    if middle <= 0 || middle > 31 {
        return None;
    }

    let (mut over12, mut over31, mut under1) = (0, 0, 0);
    for value in [left, middle, right] {
        if (99 < value && value < DATE_MIN_YEAR) || value > DATE_MAX_YEAR {
            return None;
        }
        if value > 31 {
            over31 += 1;
        }
        if value > 12 {
            over12 += 1;
        }
        if value <= 0 {
            under1 += 1;
        }
    }
    if over31 >= 2 || over12 == 3 || under1 >= 2 {
        return None;
    }

    let year_first = swap_day_month_by_metric(left, middle, right, reference);
    let year_last = swap_day_month_by_metric(right, middle, left, reference);
    let mut candidates = if year_metric(left, reference) < year_metric(right, reference) {
        [year_first, year_last]
    } else {
        [year_last, year_first]
    };
    // a stable sort keeps the preferred orientation on ties
    candidates.sort_by_key(|(year, _, _)| year_metric(*year, reference));
    candidates
        .into_iter()
        .find_map(|(year, month, day)| calendar_date(year, month, day))
}

fn date_match(i: usize, j: usize, token: String, separator: &str, date: NaiveDate, ctx: &GuessContext) -> Match {
    let pattern = Pattern::Date(DatePattern {
        separator: separator.to_string(),
        year: date.year(),
        month: date.month(),
        day: date.day(),
    });
    build_match(i, j, token, None, pattern, ctx)
}

fn parse(digits: &[char]) -> Option<i32> {
    digits.iter().collect::<String>().parse().ok()
}

fn separator_less_matches(chars: &[char], reference: NaiveDate, ctx: &GuessContext) -> Vec<Match> {
    let n = chars.len();
    let mut matches = Vec::new();

    for i in 0..n.saturating_sub(3) {
        for j in (i + 3)..(i + 8).min(n) {
            let token = &chars[i..=j];
            if !token.iter().all(char::is_ascii_digit) {
                continue;
            }

            let mut best: Option<(NaiveDate, i64)> = None;
            for &(k, l, _) in DATE_SPLITS[token.len() - 4] {
                let (Some(left), Some(middle), Some(right)) = (
                    parse(&token[..k]),
                    parse(&token[k..k + l]),
                    parse(&token[k + l..]),
                ) else {
                    continue;
                };
                let Some(date) = map_ints_to_date(left, middle, right, reference) else {
                    continue;
                };
                let distance = (date - reference).num_days().abs();
                if best.is_none_or(|(_, best_distance)| distance < best_distance) {
                    best = Some((date, distance));
                }
            }

            if let Some((date, _)) = best {
                matches.push(date_match(i, j, token.iter().collect(), "", date, ctx));
            }
        }
    }

    matches
}

fn separated_matches(chars: &[char], reference: NaiveDate, ctx: &GuessContext) -> Vec<Match> {
    let n = chars.len();
    let mut matches: Vec<Match> = Vec::new();

    for i in 0..n.saturating_sub(5) {
        for j in (i + 5)..(i + 10).min(n) {
            let token: String = chars[i..=j].iter().collect();
            for regex in [&*DAY_MONTH_YEAR, &*YEAR_MONTH_DAY] {
                let Some(captures) = regex.captures(&token) else {
                    continue;
                };
                if captures["sep1"] != captures["sep2"] {
                    continue;
                }
                let (Ok(year), Ok(first), Ok(second)) = (
                    captures["year"].parse::<i32>(),
                    captures["first"].parse::<i32>(),
                    captures["second"].parse::<i32>(),
                ) else {
                    continue;
                };

                let (year, month, day) = swap_day_month_by_metric(year, first, second, reference);
                let Some(date) = calendar_date(year, month, day) else {
                    continue;
                };
                let m = date_match(i, j, token.clone(), &captures["sep1"], date, ctx);
                if !matches.contains(&m) {
                    matches.push(m);
                }
            }
        }
    }

    matches
}

impl Matcher for DateMatcher {
    fn name(&self) -> &'static str {
        "date"
    }

    fn match_password(&self, password: &str, omnimatch: &Omnimatch) -> MatchResult {
        ensure_not_empty(password)?;
        let ctx = omnimatch.guess_context(password);
        let reference = omnimatch.reference_date();
        let chars: Vec<char> = password.chars().collect();

        let mut candidates = separator_less_matches(&chars, reference, &ctx);
        candidates.extend(separated_matches(&chars, reference, &ctx));

        // '1991' inside '13/02/1991' adds nothing
        let mut matches: Vec<Match> = candidates
            .iter()
            .filter(|m| {
                !candidates.iter().any(|other| {
                    (other.i, other.j) != (m.i, m.j) && other.i <= m.i && other.j >= m.j
                })
            })
            .cloned()
            .collect();
        sort_matches(&mut matches);
        Ok(matches)
    }
}
