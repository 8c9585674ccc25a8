//! Guesses -> score and crack-time estimates.

use crate::types::PasswordScore;

// Added to every threshold so a guess count sitting exactly on a power of ten
// stays in the lower band.
const DELTA: f64 = 7.0;

/// Upper guess bounds for scores 0 through 5; anything above the last is a 6.
const SCORE_THRESHOLDS: [f64; 6] = [1e3, 1e6, 1e8, 1e10, 1e11, 1e12];

const MINUTE: f64 = 60.0;
const HOUR: f64 = MINUTE * 60.0;
const DAY: f64 = HOUR * 24.0;
const MONTH: f64 = DAY * 31.0;
const YEAR: f64 = DAY * 365.0;
const CENTURY: f64 = YEAR * 100.0;

/// Seconds to crack under four attacker profiles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrackTimesSeconds {
    /// Rate-limited online attack, 100 guesses per hour.
    pub online_throttling_100_per_hour: f64,
    /// Online attack without rate limiting, 10 guesses per second.
    pub online_no_throttling_10_per_second: f64,
    /// Offline attack on a slow hash (bcrypt, scrypt...), 10^4 guesses per second.
    pub offline_slow_hashing_1e4_per_second: f64,
    /// Offline attack on a fast hash with many cores, 10^10 guesses per second.
    pub offline_fast_hashing_1e10_per_second: f64,
}

/// [`CrackTimesSeconds`] rendered for humans (`instant`, `3 hours`, `centuries`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrackTimesDisplay {
    pub online_throttling_100_per_hour: String,
    pub online_no_throttling_10_per_second: String,
    pub offline_slow_hashing_1e4_per_second: String,
    pub offline_fast_hashing_1e10_per_second: String,
}

impl CrackTimesSeconds {
    pub fn from_guesses(guesses: f64) -> Self {
        Self {
            online_throttling_100_per_hour: guesses / (100.0 / 3600.0),
            online_no_throttling_10_per_second: guesses / 10.0,
            offline_slow_hashing_1e4_per_second: guesses / 1e4,
            offline_fast_hashing_1e10_per_second: guesses / 1e10,
        }
    }

    pub fn display(&self) -> CrackTimesDisplay {
        CrackTimesDisplay {
            online_throttling_100_per_hour: display_time(self.online_throttling_100_per_hour),
            online_no_throttling_10_per_second: display_time(self.online_no_throttling_10_per_second),
            offline_slow_hashing_1e4_per_second: display_time(self.offline_slow_hashing_1e4_per_second),
            offline_fast_hashing_1e10_per_second: display_time(
                self.offline_fast_hashing_1e10_per_second,
            ),
        }
    }
}

pub fn estimate_attack_times(guesses: f64) -> (CrackTimesSeconds, CrackTimesDisplay) {
    let seconds = CrackTimesSeconds::from_guesses(guesses);
    let display = seconds.display();
    (seconds, display)
}

/// Maps guesses to a score, 0 (< 10^3 guesses) to 6 (> 10^12).
pub fn guesses_to_score(guesses: f64) -> PasswordScore {
    let score = SCORE_THRESHOLDS
        .iter()
        .take_while(|threshold| guesses >= **threshold + DELTA)
        .count();
    PasswordScore::new(score as u8)
}

/// Seconds per guess in the legacy entropy model: 100 attackers at 0.01 s each.
const ENTROPY_SECONDS_PER_GUESS: f64 = 0.01 / 100.0;

/// Legacy score from bits: the average crack time (half the space at
/// [`ENTROPY_SECONDS_PER_GUESS`]) placed on the guess thresholds.
pub fn entropy_to_score(entropy: f64) -> PasswordScore {
    guesses_to_score(0.5 * entropy.exp2() * ENTROPY_SECONDS_PER_GUESS)
}

fn with_unit(value: f64, unit: &str) -> String {
    let value = value.round();
    if value == 1.0 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", value, unit)
    }
}

/// Human readable duration, rounded to the largest whole unit (months are 31 days).
pub fn display_time(seconds: f64) -> String {
    if seconds < 1.0 {
        "instant".to_string()
    } else if seconds < MINUTE {
        with_unit(seconds, "second")
    } else if seconds < HOUR {
        with_unit(seconds / MINUTE, "minute")
    } else if seconds < DAY {
        with_unit(seconds / HOUR, "hour")
    } else if seconds < MONTH {
        with_unit(seconds / DAY, "day")
    } else if seconds < YEAR {
        with_unit(seconds / MONTH, "month")
    } else if seconds < CENTURY {
        with_unit(seconds / YEAR, "year")
    } else {
        "centuries".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_thresholds() {
        assert_eq!(guesses_to_score(1.0).value(), 0);
        assert_eq!(guesses_to_score(1e3).value(), 0);
        assert_eq!(guesses_to_score(1e3 + 7.0).value(), 1);
        assert_eq!(guesses_to_score(5e7).value(), 2);
        assert_eq!(guesses_to_score(1e9).value(), 3);
        assert_eq!(guesses_to_score(5e10).value(), 4);
        assert_eq!(guesses_to_score(5e11).value(), 5);
        assert_eq!(guesses_to_score(1e13).value(), 6);
        assert_eq!(guesses_to_score(f64::MAX).value(), 6);
    }

    #[test]
    fn test_entropy_to_score() {
        assert_eq!(entropy_to_score(0.0).value(), 0);
        assert_eq!(entropy_to_score(20.0).value(), 0);
        // 2^34 / 2 * 1e-4 is just under 10^6
        assert_eq!(entropy_to_score(34.0).value(), 1);
        assert_eq!(entropy_to_score(35.0).value(), 2);
        assert_eq!(entropy_to_score(60.0).value(), 6);
        assert_eq!(entropy_to_score(f64::INFINITY).value(), 6);
    }

    #[test]
    fn test_crack_times() {
        let seconds = CrackTimesSeconds::from_guesses(1e4);
        assert!((seconds.online_throttling_100_per_hour - 360_000.0).abs() < 1e-6);
        assert_eq!(seconds.online_no_throttling_10_per_second, 1_000.0);
        assert_eq!(seconds.offline_slow_hashing_1e4_per_second, 1.0);
        assert_eq!(seconds.offline_fast_hashing_1e10_per_second, 1e-6);
    }

    #[test]
    fn test_display_time() {
        assert_eq!(display_time(0.5), "instant");
        assert_eq!(display_time(1.0), "1 second");
        assert_eq!(display_time(42.0), "42 seconds");
        assert_eq!(display_time(90.0), "2 minutes");
        assert_eq!(display_time(3.0 * HOUR), "3 hours");
        assert_eq!(display_time(DAY), "1 day");
        assert_eq!(display_time(2.0 * MONTH), "2 months");
        assert_eq!(display_time(10.0 * YEAR), "10 years");
        assert_eq!(display_time(1e20), "centuries");
    }

    #[test]
    fn test_estimate_attack_times() {
        let (seconds, display) = estimate_attack_times(1e4);
        assert_eq!(display.online_throttling_100_per_hour, "4 days");
        assert_eq!(display.offline_fast_hashing_1e10_per_second, "instant");
        assert_eq!(seconds.display(), display);
    }
}
