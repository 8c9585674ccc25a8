//! Password strength evaluator - main evaluation logic.

use std::sync::LazyLock;
use std::time::Instant;

use secrecy::{ExposeSecret, SecretString};

#[cfg(feature = "async")]
use tokio::sync::mpsc;

#[cfg(feature = "async")]
use tokio_util::sync::CancellationToken;

use crate::config::{ConfigError, EstimatorConfig};
use crate::error::{EstimateError, ensure_not_empty};
use crate::feedback::get_feedback;
use crate::guesses::bruteforce_guesses;
use crate::matchers::Omnimatch;
use crate::optimizer::{minimum_entropy_match_sequence, most_guessable_match_sequence};
use crate::time_estimates::{estimate_attack_times, guesses_to_score};
use crate::types::{PasswordEvaluation, PasswordScore};

static DEFAULT_ESTIMATOR: LazyLock<StrengthEstimator> = LazyLock::new(StrengthEstimator::builtin);

/// A configured evaluator: the matcher pipeline plus the limits it enforces.
///
/// Immutable once built; share it across threads by reference or `Arc`.
#[derive(Debug, Clone)]
pub struct StrengthEstimator {
    omnimatch: Omnimatch,
    config: EstimatorConfig,
}

impl Default for StrengthEstimator {
    fn default() -> Self {
        Self::builtin()
    }
}

impl StrengthEstimator {
    pub fn new(omnimatch: Omnimatch, config: EstimatorConfig) -> Self {
        Self { omnimatch, config }
    }

    /// Built-in dictionaries and layouts, default limits.
    ///
    /// No reference date is fixed, so each evaluation measures years and dates from
    /// the day it runs.
    pub fn builtin() -> Self {
        let config = EstimatorConfig::default();
        let omnimatch = Omnimatch::builtin(config.resolved_reference_date());
        Self::new(omnimatch, config)
    }

    /// Builds the built-in pipeline extended by `config`.
    ///
    /// # Errors
    ///
    /// Returns error if the configured dictionary file cannot be loaded.
    pub fn from_config(config: EstimatorConfig) -> Result<Self, ConfigError> {
        let mut omnimatch = Omnimatch::builtin(config.resolved_reference_date())
            .with_regex_rules(config.regex_rules().to_vec());
        if let Some(dictionary) = config.load_dictionary()? {
            omnimatch = omnimatch.with_dictionary(dictionary);
        }

        #[cfg(feature = "tracing")]
        tracing::info!(
            "Estimator ready: {} dictionaries, reference date {}",
            omnimatch.dictionary_matcher().dictionaries().len(),
            omnimatch.reference_date()
        );

        Ok(Self::new(omnimatch, config))
    }

    /// [`from_config`](Self::from_config) with [`EstimatorConfig::from_env`].
    ///
    /// # Errors
    ///
    /// Returns error if an environment variable is invalid or the dictionary cannot be loaded.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_config(EstimatorConfig::from_env()?)
    }

    pub fn omnimatch(&self) -> &Omnimatch {
        &self.omnimatch
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Evaluates `password`, treating `user_inputs` (user name, site name...) as an extra
    /// dictionary ranked by position.
    ///
    /// # Errors
    ///
    /// Returns error if the password is empty or longer than the configured maximum.
    pub fn evaluate(
        &self,
        password: &SecretString,
        user_inputs: &[&str],
    ) -> Result<PasswordEvaluation, EstimateError> {
        self.run(password, user_inputs, &|| false)
    }

    /// [`evaluate`](Self::evaluate), giving up with [`EstimateError::Cancelled`] if `token`
    /// fires before matching or before the sequence search.
    #[cfg(feature = "async")]
    pub fn evaluate_cancellable(
        &self,
        password: &SecretString,
        user_inputs: &[&str],
        token: Option<CancellationToken>,
    ) -> Result<PasswordEvaluation, EstimateError> {
        self.run(password, user_inputs, &|| {
            token.as_ref().is_some_and(CancellationToken::is_cancelled)
        })
    }

    /// Score only.
    ///
    /// # Errors
    ///
    /// Same as [`evaluate`](Self::evaluate).
    pub fn calculate_score(
        &self,
        password: &SecretString,
        user_inputs: &[&str],
    ) -> Result<PasswordScore, EstimateError> {
        self.evaluate(password, user_inputs).map(|evaluation| evaluation.score)
    }

    fn run(
        &self,
        password: &SecretString,
        user_inputs: &[&str],
        is_cancelled: &dyn Fn() -> bool,
    ) -> Result<PasswordEvaluation, EstimateError> {
        let start = Instant::now();
        let pwd = password.expose_secret();
        ensure_not_empty(pwd)?;

        let length = pwd.chars().count();
        if let Some(max) = self.config.password_length_limit().filter(|max| length > *max) {
            #[cfg(feature = "tracing")]
            tracing::warn!("Password rejected: {} characters, maximum is {}", length, max);
            return Err(EstimateError::PasswordTooLong { length, max });
        }

        if is_cancelled() {
            return Err(EstimateError::Cancelled);
        }
        let mut omnimatch = self.omnimatch.with_user_inputs(user_inputs);
        if self.config.fixed_reference_date().is_none() {
            omnimatch = omnimatch.with_reference_date(self.config.resolved_reference_date());
        }
        let matches = omnimatch.omnimatch(pwd)?;

        if is_cancelled() {
            return Err(EstimateError::Cancelled);
        }
        let ctx = omnimatch.guess_context(pwd);
        let entropy = minimum_entropy_match_sequence(pwd, &matches, &ctx)?;
        #[cfg(feature = "tracing")]
        let match_count = matches.len();
        let best = most_guessable_match_sequence(pwd, matches, &ctx, false)?;

        let score = guesses_to_score(best.guesses);
        let (crack_times_seconds, crack_times_display) = estimate_attack_times(best.guesses);
        let feedback = get_feedback(score, &best.sequence);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "Evaluated password of {} characters: {} candidates, {} in sequence, guesses_log10 {:.2}, score {}",
            length,
            match_count,
            best.sequence.len(),
            best.guesses_log10,
            score
        );

        Ok(PasswordEvaluation {
            password: SecretString::new(pwd.into()),
            entropy: entropy.entropy,
            guesses: best.guesses,
            guesses_log10: best.guesses_log10,
            sequence: best.sequence,
            entropy_sequence: entropy.sequence,
            crack_times_seconds,
            crack_times_display,
            score,
            feedback,
            calc_time: start.elapsed(),
        })
    }
}

/// Score of `password` as if no pattern applied: every character drawn from the
/// character classes it uses.
///
/// # Errors
///
/// Returns [`EstimateError::EmptyPassword`] for an empty password.
pub fn bruteforce_score(password: &SecretString) -> Result<PasswordScore, EstimateError> {
    let pwd = password.expose_secret();
    ensure_not_empty(pwd)?;
    Ok(guesses_to_score(bruteforce_guesses(pwd)))
}

/// Evaluates password strength with the built-in estimator.
///
/// The estimator is built once per process. Its reference date is not: dates and
/// years are measured from the local date of each call.
///
/// # Arguments
/// * `password` - The password to evaluate
/// * `user_inputs` - Words the password should not be built from (user name, site...)
///
/// # Returns
/// A `PasswordEvaluation` with guesses, score, crack times and feedback.
pub fn evaluate_password_strength(
    password: &SecretString,
    user_inputs: &[&str],
) -> Result<PasswordEvaluation, EstimateError> {
    DEFAULT_ESTIMATOR.evaluate(password, user_inputs)
}

/// Async version that sends evaluation result via channel.
///
/// Waits the configured debounce first; if `token` fires meanwhile, or during the
/// evaluation, nothing is sent.
#[cfg(feature = "async")]
pub async fn evaluate_password_strength_tx(
    estimator: &StrengthEstimator,
    password: &SecretString,
    user_inputs: &[&str],
    token: CancellationToken,
    tx: mpsc::Sender<PasswordEvaluation>,
) {
    #[cfg(feature = "tracing")]
    tracing::info!("evaluation is about to start...");

    tokio::select! {
        _ = token.cancelled() => {
            #[cfg(feature = "tracing")]
            tracing::debug!("evaluation cancelled before start");
            return;
        }
        _ = tokio::time::sleep(estimator.config().debounce_duration()) => {}
    }

    let evaluation = match estimator.evaluate_cancellable(password, user_inputs, Some(token)) {
        Ok(evaluation) => evaluation,
        Err(_e) => {
            #[cfg(feature = "tracing")]
            tracing::debug!("password evaluation not sent: {}", _e);
            return;
        }
    };

    if let Err(_e) = tx.send(evaluation).await {
        #[cfg(feature = "tracing")]
        tracing::error!("Failed to send password evaluation result: {}", _e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::{CUSTOM, PASSWORDS, USER_INPUTS};
    use crate::feedback::Warning;
    use crate::matchers::tests::reference_date;
    use crate::types::{Match, Pattern, PasswordStrength};
    use chrono::{Datelike, Local, NaiveDate};
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn estimator() -> StrengthEstimator {
        StrengthEstimator::from_config(EstimatorConfig::default().reference_date(reference_date()))
            .unwrap()
    }

    fn secret(password: &str) -> SecretString {
        SecretString::new(password.to_string().into())
    }

    fn evaluate(password: &str) -> PasswordEvaluation {
        estimator().evaluate(&secret(password), &[]).unwrap()
    }

    fn assert_tiles(sequence: &[Match], length: usize) {
        assert_eq!(sequence.first().map(|m| m.i), Some(0));
        assert_eq!(sequence.last().map(|m| m.j), Some(length - 1));
        for pair in sequence.windows(2) {
            assert_eq!(pair[0].j + 1, pair[1].i);
        }
    }

    #[test]
    fn test_evaluate_empty_password() {
        assert_eq!(
            estimator().evaluate(&secret(""), &[]).unwrap_err(),
            EstimateError::EmptyPassword
        );
    }

    #[test]
    fn test_evaluate_single_char() {
        let evaluation = evaluate("a");
        assert_eq!(evaluation.sequence.len(), 1);
        assert!(evaluation.sequence[0].is_bruteforce());
        assert_eq!((evaluation.sequence[0].i, evaluation.sequence[0].j), (0, 0));
        assert_eq!(evaluation.score.value(), 0);
        assert_eq!(evaluation.strength(), PasswordStrength::Weak);
    }

    #[test]
    fn test_evaluate_common_password() {
        let evaluation = evaluate("password");
        assert_eq!(evaluation.sequence.len(), 1);
        match &evaluation.sequence[0].pattern {
            Pattern::Dictionary(d) => {
                assert_eq!(d.rank, 1);
                assert_eq!(d.dictionary_name, PASSWORDS);
            }
            other => panic!("unexpected pattern {:?}", other),
        }
        assert_eq!(evaluation.score.value(), 0);
        assert_eq!(evaluation.guesses, 1.0);
        assert_eq!(evaluation.feedback.warning, Some(Warning::Top10Password));
    }

    #[test]
    fn test_evaluate_l33t_password() {
        let plain = evaluate("password");
        let evaluation = evaluate("p4ssw0rd");
        assert_eq!(evaluation.sequence.len(), 1);
        match &evaluation.sequence[0].pattern {
            Pattern::Dictionary(d) => {
                assert!(d.l33t);
                assert_eq!(d.matched_word, "password");
                assert_eq!(d.sub.get(&'4'), Some(&'a'));
                assert_eq!(d.sub.get(&'0'), Some(&'o'));
                assert!(d.l33t_variations > 1.0);
            }
            other => panic!("unexpected pattern {:?}", other),
        }
        assert!(evaluation.guesses > plain.guesses);
    }

    #[test]
    fn test_evaluate_repeat() {
        let evaluation = evaluate("abababab");
        assert_eq!(evaluation.sequence.len(), 1);
        let m = &evaluation.sequence[0];
        match &m.pattern {
            Pattern::Repeat(r) => {
                assert_eq!(r.base_token, "ab");
                assert_eq!(r.repeat_count, 4);
                assert_eq!(m.guesses, r.base_guesses * 4.0);
            }
            other => panic!("unexpected pattern {:?}", other),
        }
    }

    #[test]
    fn test_qwerty_is_a_straight_row() {
        let estimator = estimator();
        let matches = estimator.omnimatch().omnimatch("qwerty").unwrap();
        let straight = matches.iter().any(|m| {
            matches!(&m.pattern, Pattern::Spatial(s) if s.graph == "qwerty" && s.turns == 0 && m.i == 0 && m.j == 5)
        });
        assert!(straight);
    }

    #[test]
    fn test_evaluate_date() {
        let evaluation = evaluate("13/02/1991");
        assert_eq!(evaluation.sequence.len(), 1);
        match &evaluation.sequence[0].pattern {
            Pattern::Date(d) => {
                assert_eq!(d.separator, "/");
                assert_eq!((d.year, d.month, d.day), (1991, 2, 13));
            }
            other => panic!("unexpected pattern {:?}", other),
        }
        assert_eq!(evaluation.feedback.warning, Some(Warning::Dates));
    }

    #[test]
    fn test_sequences_tile_the_password() {
        let passwords = [
            "a",
            "zxcvbn",
            "Tr0ub4dour&3",
            "correcthorsebatterystaple",
            "1991-08-14qwerty",
            "aaaaabbbbb",
            "ĉu ŝi ŝatas la ĥoron?",
        ];
        for password in passwords {
            let evaluation = evaluate(password);
            let length = password.chars().count();
            assert_tiles(&evaluation.sequence, length);
            assert_tiles(&evaluation.entropy_sequence, length);
            assert!(evaluation.guesses >= 1.0, "{}", password);
        }
    }

    #[test]
    fn test_evaluate_is_deterministic() {
        let first = evaluate("Tr0ub4dour&3");
        let second = evaluate("Tr0ub4dour&3");
        assert_eq!(first.guesses, second.guesses);
        assert_eq!(first.entropy, second.entropy);
        assert_eq!(first.sequence, second.sequence);
        assert_eq!(first.entropy_sequence, second.entropy_sequence);
        assert_eq!(first.score, second.score);
        assert_eq!(first.crack_times_display, second.crack_times_display);
        assert_eq!(first.feedback, second.feedback);
    }

    #[test]
    fn test_score_follows_guesses() {
        let weak = evaluate("password");
        let strong = evaluate("Wz7#kQ!vR2x@Lp9$");
        assert!(strong.guesses > weak.guesses);
        assert!(strong.score > weak.score);
        assert!(strong.feedback.is_empty());
    }

    #[test]
    fn test_password_too_long() {
        let estimator = StrengthEstimator::from_config(
            EstimatorConfig::default()
                .reference_date(reference_date())
                .max_password_length(Some(8)),
        )
        .unwrap();
        assert_eq!(
            estimator.evaluate(&secret("abcdefghij"), &[]).unwrap_err(),
            EstimateError::PasswordTooLong { length: 10, max: 8 }
        );
        assert!(estimator.evaluate(&secret("abcdefgh"), &[]).is_ok());
    }

    #[test]
    fn test_user_inputs_lower_guesses() {
        let estimator = estimator();
        let password = secret("zorglubian");
        let without = estimator.evaluate(&password, &[]).unwrap();
        let with = estimator.evaluate(&password, &["Zorglubian"]).unwrap();
        assert!(with.guesses < without.guesses);
        match &with.sequence[0].pattern {
            Pattern::Dictionary(d) => assert_eq!(d.dictionary_name, USER_INPUTS),
            other => panic!("unexpected pattern {:?}", other),
        }
    }

    #[test]
    fn test_calculate_score() {
        let estimator = estimator();
        assert_eq!(estimator.calculate_score(&secret("password"), &[]).unwrap().value(), 0);
        assert_eq!(
            estimator.calculate_score(&secret(""), &[]),
            Err(EstimateError::EmptyPassword)
        );
    }

    #[test]
    fn test_bruteforce_score() {
        assert_eq!(bruteforce_score(&secret("a")).unwrap().value(), 0);
        assert_eq!(bruteforce_score(&secret("Wz7#kQ!vR2x@Lp9$")).unwrap().value(), 6);
        // patterns are ignored
        assert!(bruteforce_score(&secret("password")).unwrap().value() > 0);
        assert_eq!(bruteforce_score(&secret("")), Err(EstimateError::EmptyPassword));
    }

    #[test]
    fn test_evaluate_password_strength_default_estimator() {
        let evaluation = evaluate_password_strength(&secret("password"), &[]).unwrap();
        assert_eq!(evaluation.score.value(), 0);
    }

    #[test]
    fn test_control_characters_are_bruteforced() {
        let evaluation = evaluate(
            "\u{1}\u{7}\u{3}\u{11}\u{5}\u{1a}\u{2}\u{14}\u{9}\u{1e}\u{6}\u{18}\u{b}\u{1c}\u{4}\u{13}\u{8}\u{1f}\u{e}\u{16}",
        );
        assert!(evaluation.entropy.is_finite());
        assert!(evaluation.entropy > 100.0);
        assert!(evaluation.guesses > 1e30);
        assert_eq!(evaluation.score.value(), 6);
    }

    #[test]
    fn test_unfixed_reference_date_is_read_per_evaluation() {
        let stale = NaiveDate::from_ymd_opt(1991, 2, 14).unwrap();
        let tracking = StrengthEstimator::new(Omnimatch::builtin(stale), EstimatorConfig::default());
        let pinned = StrengthEstimator::new(
            Omnimatch::builtin(stale),
            EstimatorConfig::default().reference_date(stale),
        );

        let date_guesses = |estimator: &StrengthEstimator| {
            let evaluation = estimator.evaluate(&secret("13/02/1991"), &[]).unwrap();
            assert!(matches!(evaluation.sequence[0].pattern, Pattern::Date(_)));
            evaluation.sequence[0].guesses
        };

        let years_since = (Local::now().year() - 1991).max(20);
        assert_eq!(date_guesses(&tracking), f64::from(years_since) * 365.0 * 4.0);
        assert_eq!(date_guesses(&pinned), 20.0 * 365.0 * 4.0);
    }

    #[test]
    fn test_crack_times_follow_guesses() {
        let evaluation = evaluate("password");
        assert_eq!(evaluation.crack_times_display.offline_fast_hashing_1e10_per_second, "instant");
        assert_eq!(
            evaluation.crack_times_seconds.online_no_throttling_10_per_second,
            evaluation.guesses / 10.0
        );
    }

    #[test]
    fn test_custom_dictionary_catches_words_missing_from_builtin_lists() {
        let password = "Tr0ub4dour&3";
        let builtin = evaluate(password);

        let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
        writeln!(temp_file, "correct").expect("Failed to write");
        writeln!(temp_file, "troubadour").expect("Failed to write");
        let extended = StrengthEstimator::from_config(
            EstimatorConfig::default()
                .reference_date(reference_date())
                .dictionary_path(temp_file.path()),
        )
        .unwrap()
        .evaluate(&secret(password), &[])
        .unwrap();

        assert!(extended.sequence.iter().any(|m| matches!(
            &m.pattern,
            Pattern::Dictionary(d) if d.dictionary_name == CUSTOM && d.l33t
        )));
        assert!(extended.guesses < builtin.guesses);
        assert!(extended.score < builtin.score);
    }

    #[test]
    #[serial]
    fn test_from_env_custom_dictionary() {
        let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
        writeln!(temp_file, "grimblewort").expect("Failed to write");
        unsafe { std::env::set_var(crate::config::DICTIONARY_PATH_ENV, temp_file.path()); }

        let estimator = StrengthEstimator::from_env().unwrap();
        let evaluation = estimator.evaluate(&secret("grimblewort"), &[]).unwrap();
        match &evaluation.sequence[0].pattern {
            Pattern::Dictionary(d) => assert_eq!(d.dictionary_name, CUSTOM),
            other => panic!("unexpected pattern {:?}", other),
        }

        unsafe { std::env::remove_var(crate::config::DICTIONARY_PATH_ENV); }
    }
}
