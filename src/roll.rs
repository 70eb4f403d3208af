//! Evaluation of dice expressions straight from their source text.

use tracing::debug;

#[cfg(feature = "fastrand")]
use crate::roller::FastRand;
use crate::{
	expr::Outcome,
	lex::{self, lex},
	parse::{self, parse},
	roller::Roller,
};

/// Error that can occur while rolling an expression with [`roll()`] or [`roll_with()`]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
	/// Unrecognized character in the expression
	#[error(transparent)]
	Lex(#[from] lex::Error),

	/// Tokens that don't form a valid expression
	#[error(transparent)]
	Parse(#[from] parse::Error),

	/// Expression that would roll more dice than allowed by [`Options::max_rolls()`]
	#[error("expression rolls {count} dice, but at most {max} are allowed")]
	TooManyRolls {
		/// Number of dice the expression would roll
		count: u64,

		/// Maximum number of dice that were allowed
		max: u64,
	},
}

/// Settings for a single call to [`roll_with()`]
///
/// # Examples
/// ```
/// use dice_notation::{roller::Max as MaxRoller, Options};
///
/// let options = Options::new(MaxRoller).max_rolls(100);
/// assert_eq!(options.limit(), Some(100));
/// ```
#[derive(Debug, Clone)]
pub struct Options<R> {
	/// Source of die faces
	roller: R,

	/// Maximum number of dice the expression may roll
	max_rolls: Option<u64>,
}

impl<R: Roller> Options<R> {
	/// Creates options that roll dice with the given roller and don't limit how many may be rolled.
	#[must_use]
	pub const fn new(roller: R) -> Self {
		Self { roller, max_rolls: None }
	}

	/// Limits how many dice an expression may roll. Expressions over the limit are rejected before anything is rolled.
	#[must_use]
	pub fn max_rolls(self, max: u64) -> Self {
		Self {
			max_rolls: Some(max),
			..self
		}
	}

	/// Replaces the roller, keeping all other settings.
	#[must_use]
	pub fn roller<T: Roller>(self, roller: T) -> Options<T> {
		Options {
			roller,
			max_rolls: self.max_rolls,
		}
	}

	/// Gets the maximum number of dice an expression may roll, if limited.
	#[must_use]
	pub const fn limit(&self) -> Option<u64> {
		self.max_rolls
	}
}

#[cfg(feature = "fastrand")]
impl Default for Options<FastRand> {
	/// Creates options that roll dice with system randomness and don't limit how many may be rolled.
	#[inline]
	fn default() -> Self {
		Self::new(FastRand::default())
	}
}

/// Rolls an expression using system randomness and no limit on the number of dice.
/// Requires the `fastrand` feature (enabled by default).
///
/// # Errors
/// See [`roll_with()`].
///
/// # Examples
/// ```
/// let outcome = dice_notation::roll("2d6 + 3")?;
/// assert!((5.0..=15.0).contains(&outcome.result));
/// assert_eq!(outcome.rolls, None);
/// assert_eq!(outcome.children[0].rolls.as_ref().map(Vec::len), Some(2));
/// # Ok::<(), dice_notation::Error>(())
/// ```
#[cfg(feature = "fastrand")]
pub fn roll(expression: &str) -> Result<Outcome, Error> {
	roll_with(expression, Options::default())
}

/// Lexes, parses, checks and evaluates an expression.
///
/// # Errors
/// If the expression can't be lexed or parsed, or it rolls more dice than the options allow, an error variant is
/// returned. Nothing is rolled in any of these cases.
///
/// # Examples
/// ```
/// use dice_notation::{roller::Iter as IterRoller, roll_with, Error, Options};
///
/// let outcome = roll_with("3d6kl2", Options::new(IterRoller::new([1, 2, 5])))?;
/// assert_eq!(outcome.result, 3.0);
/// assert_eq!(outcome.explanation, "[1 + 2 + 5]kl2");
///
/// let err = roll_with("10d6", Options::new(IterRoller::new([])).max_rolls(5)).unwrap_err();
/// assert_eq!(err, Error::TooManyRolls { count: 10, max: 5 });
/// # Ok::<(), dice_notation::Error>(())
/// ```
pub fn roll_with<R: Roller>(expression: &str, options: Options<R>) -> Result<Outcome, Error> {
	let Options { mut roller, max_rolls } = options;

	let tokens = lex(expression)?;
	let expr = parse(&tokens)?;

	if let Some(max) = max_rolls {
		let count = expr.count_rolls();
		if count > max {
			debug!(%expr, count, max, "rejecting expression over the roll limit");
			return Err(Error::TooManyRolls { count, max });
		}
	}

	debug!(%expr, deterministic = expr.is_deterministic(), "evaluating expression");
	Ok(expr.eval(&mut roller))
}
