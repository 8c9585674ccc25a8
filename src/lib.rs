//! Password strength estimation library
//!
//! Finds the human-memorable patterns in a password (dictionary words, l33t speak,
//! keyboard walks, repeats, sequences, years and dates), estimates how many guesses
//! an attacker needs for each, and picks the cheapest combination covering the
//! whole password. The result is a 0-6 score, crack-time estimates and feedback.
//!
//! # Features
//!
//! - `async` (default): Enables async evaluation with cancellation support
//! - `tracing`: Enables logging via tracing crate
//!
//! # Environment Variables
//!
//! Read by [`EstimatorConfig::from_env`]:
//!
//! - `PWD_DICTIONARY_PATH`: Extra word list, one word per line, most common first.
//!   The bundled lists hold a few hundred words each; production use should add a full one.
//! - `PWD_MAX_PASSWORD_LENGTH`: Longest accepted password (default: 256, `0` disables the cap)
//!
//! # Example
//!
//! ```rust,no_run
//! use pwd_guesses::{evaluate_password_strength, StrengthEstimator};
//! use secrecy::SecretString;
//!
//! let password = SecretString::new("MyP@ssw0rd!".to_string().into());
//!
//! // Built-in dictionaries and keyboard layouts
//! let evaluation = evaluate_password_strength(&password, &["alice", "example.com"])
//!     .expect("password is not empty");
//!
//! println!("Score: {}", evaluation.score);
//! println!("Strength: {:?}", evaluation.strength());
//! if let Some(warning) = evaluation.feedback.warning {
//!     println!("Warning: {}", warning);
//! }
//!
//! // Or a configured estimator
//! let estimator = StrengthEstimator::from_env().expect("Failed to load configuration");
//! let score = estimator.calculate_score(&password, &[]);
//! ```

pub mod config;
pub mod dictionary;
pub mod entropy;
mod error;
mod evaluator;
pub mod feedback;
pub mod guesses;
pub mod keyboard;
pub mod matchers;
pub mod optimizer;
pub mod time_estimates;
mod types;

pub use config::{ConfigError, EstimatorConfig};
pub use dictionary::{DictionaryError, RankedDictionary};
pub use error::EstimateError;
pub use evaluator::{StrengthEstimator, bruteforce_score, evaluate_password_strength};
pub use feedback::{Feedback, Suggestion, Warning};
pub use keyboard::{LayoutError, SpatialGraph};
pub use matchers::{Matcher, Omnimatch, RegexRule};
pub use time_estimates::{CrackTimesDisplay, CrackTimesSeconds};
pub use types::{
    DatePattern, DictionaryPattern, Match, PasswordEvaluation, PasswordScore, PasswordStrength,
    Pattern, RegexPattern, RepeatPattern, SequenceKind, SequencePattern, SpatialPattern,
};

#[cfg(feature = "async")]
pub use evaluator::evaluate_password_strength_tx;
