//! AST-like data structures for dice expressions, and the evaluation of them into explained [`Outcome`]s.

use std::fmt;

use tracing::trace;

use crate::roller::Roller;

/// A set of one or more dice with a specific number of sides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[expect(clippy::exhaustive_structs, reason = "A dice term is only ever a count and a number of sides")]
pub struct Dice {
	/// Number of dice to roll
	pub count: u64,

	/// Number of sides for each die
	pub sides: u64,
}

impl Dice {
	/// Creates a new set of dice with a given count and number of sides.
	#[must_use]
	pub const fn new(count: u64, sides: u64) -> Self {
		Self { count, sides }
	}

	/// Rolls the dice, producing an outcome that lists every face in the order it was rolled.
	#[must_use]
	pub fn roll<R: Roller + ?Sized>(&self, roller: &mut R) -> Outcome {
		let rolls = roller.roll_dice(self);
		trace!(dice = %self, ?rolls, "rolled dice");

		let result = sum(&rolls);
		let explanation = format!("[{}]", join(&rolls, " + "));
		Outcome {
			result,
			rolls: Some(rolls),
			children: Vec::new(),
			explanation,
		}
	}
}

impl fmt::Display for Dice {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}d{}", self.count, self.sides)
	}
}

/// Individual elements of a full mathematical dice expression
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Expr {
	/// Standalone integer
	Num(u64),

	/// Dice literal
	Dice(Dice),

	/// Sum of two expressions
	Add(Box<Self>, Box<Self>),

	/// Difference of two expressions
	Sub(Box<Self>, Box<Self>),

	/// Product of two expressions
	Mul(Box<Self>, Box<Self>),

	/// Exact (non-truncating) quotient of two expressions
	Div(Box<Self>, Box<Self>),

	/// Sum of only the highest rolls of some dice, with the expression giving how many to keep
	KeepHigh(Dice, Box<Self>),

	/// Sum of only the lowest rolls of some dice, with the expression giving how many to keep
	KeepLow(Dice, Box<Self>),

	/// Parenthesized expression
	Group(Box<Self>),
}

impl Expr {
	/// Evaluates the expression, rolling any dice it contains with the given roller.
	/// Operands are always evaluated left before right and depth-first, so a roller producing a fixed sequence of
	/// values hands them out in the order the dice appear in the expression.
	///
	/// # Examples
	/// ```
	/// use dice_notation::{roller::Iter as IterRoller, Expr};
	///
	/// let expr: Expr = "2d6 + d8".parse()?;
	/// let outcome = expr.eval(&mut IterRoller::new([1, 2, 5]));
	/// assert_eq!(outcome.result, 8.0);
	/// assert_eq!(outcome.explanation, "[1 + 2] + [5]");
	/// # Ok::<(), dice_notation::Error>(())
	/// ```
	#[must_use]
	pub fn eval<R: Roller + ?Sized>(&self, roller: &mut R) -> Outcome {
		match self {
			Self::Num(x) => Outcome::new(to_f64(*x), x.to_string()),
			Self::Dice(dice) => dice.roll(roller),

			Self::Add(a, b) => Outcome::binary(a.eval(roller), '+', b.eval(roller), |a, b| a + b),
			Self::Sub(a, b) => Outcome::binary(a.eval(roller), '-', b.eval(roller), |a, b| a - b),
			Self::Mul(a, b) => Outcome::binary(a.eval(roller), '*', b.eval(roller), |a, b| a * b),
			Self::Div(a, b) => Outcome::binary(a.eval(roller), '/', b.eval(roller), |a, b| a / b),

			Self::KeepHigh(dice, amount) => Outcome::keep(dice.roll(roller), amount.eval(roller), Keep::Highest),
			Self::KeepLow(dice, amount) => Outcome::keep(dice.roll(roller), amount.eval(roller), Keep::Lowest),

			Self::Group(inner) => {
				let inner = inner.eval(roller);
				Outcome {
					result: inner.result,
					rolls: inner.rolls.clone(),
					explanation: format!("({})", inner.explanation),
					children: vec![inner],
				}
			}
		}
	}

	/// Counts how many individual dice will be rolled when evaluating the expression, which is exactly the number of
	/// times the roller will be asked for a die face. This only depends on the structure of the expression, so it can
	/// be checked against a limit before anything is rolled.
	///
	/// # Examples
	/// ```
	/// use dice_notation::Expr;
	///
	/// let expr: Expr = "4d6kh3 + d8 + 2".parse()?;
	/// assert_eq!(expr.count_rolls(), 5);
	/// # Ok::<(), dice_notation::Error>(())
	/// ```
	#[must_use]
	pub fn count_rolls(&self) -> u64 {
		match self {
			Self::Num(..) => 0,
			Self::Dice(dice) => dice.count,
			Self::Add(a, b) | Self::Sub(a, b) | Self::Mul(a, b) | Self::Div(a, b) => {
				a.count_rolls().saturating_add(b.count_rolls())
			}
			Self::KeepHigh(dice, amount) | Self::KeepLow(dice, amount) => dice.count.saturating_add(amount.count_rolls()),
			Self::Group(inner) => inner.count_rolls(),
		}
	}

	/// Checks whether the expression is deterministic (will always yield the same value with every evaluation).
	/// A [`Self::Num`] will always return `true`, a [`Self::Dice`] will always return `false` unless the dice only
	/// have one side or there are none of them, and all other expressions forward the check to their children.
	#[must_use]
	pub fn is_deterministic(&self) -> bool {
		match self {
			Self::Num(..) => true,
			Self::Dice(dice) => dice_is_deterministic(dice),
			Self::Add(a, b) | Self::Sub(a, b) | Self::Mul(a, b) | Self::Div(a, b) => {
				a.is_deterministic() && b.is_deterministic()
			}
			Self::KeepHigh(dice, amount) | Self::KeepLow(dice, amount) => {
				dice_is_deterministic(dice) && amount.is_deterministic()
			}
			Self::Group(inner) => inner.is_deterministic(),
		}
	}
}

impl fmt::Display for Expr {
	/// Formats the expression back into dice notation. Parentheses only appear where there are [`Expr::Group`]s.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Num(x) => write!(f, "{x}"),
			Self::Dice(dice) => write!(f, "{dice}"),
			Self::Add(a, b) => write!(f, "{a} + {b}"),
			Self::Sub(a, b) => write!(f, "{a} - {b}"),
			Self::Mul(a, b) => write!(f, "{a} * {b}"),
			Self::Div(a, b) => write!(f, "{a} / {b}"),
			Self::KeepHigh(dice, amount) => write!(f, "{dice}kh{amount}"),
			Self::KeepLow(dice, amount) => write!(f, "{dice}kl{amount}"),
			Self::Group(inner) => write!(f, "({inner})"),
		}
	}
}

/// Result of evaluating an [`Expr`], along with an explanation of how it was reached
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub struct Outcome {
	/// Final numeric value
	pub result: f64,

	/// Individual die faces in the order they were rolled, present only for dice terms (and groups directly around
	/// them)
	#[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
	pub rolls: Option<Vec<u64>>,

	/// Outcomes of the operands this outcome was computed from, in evaluation order
	#[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
	pub children: Vec<Outcome>,

	/// The expression with every sub-expression replaced by the values it produced
	pub explanation: String,
}

impl Outcome {
	/// Creates an outcome with no rolls or children.
	#[must_use]
	pub const fn new(result: f64, explanation: String) -> Self {
		Self {
			result,
			rolls: None,
			children: Vec::new(),
			explanation,
		}
	}

	/// Combines the outcomes of both operands of an arithmetic operator.
	fn binary(a: Self, op: char, b: Self, calc: impl FnOnce(f64, f64) -> f64) -> Self {
		Self {
			result: calc(a.result, b.result),
			rolls: None,
			explanation: format!("{} {op} {}", a.explanation, b.explanation),
			children: vec![a, b],
		}
	}

	/// Sums the highest or lowest of the rolls from some dice, keeping as many as the amount's result.
	fn keep(rolled: Self, amount: Self, keep: Keep) -> Self {
		let mut sorted = rolled.rolls.clone().unwrap_or_default();
		sorted.sort_unstable();

		let count = keep_count(amount.result, sorted.len());
		let kept = match keep {
			Keep::Highest => sorted.get(sorted.len().saturating_sub(count)..),
			Keep::Lowest => sorted.get(..count),
		};

		Self {
			result: sum(kept.unwrap_or_default()),
			rolls: None,
			explanation: format!("{}{}{}", rolled.explanation, keep.symbol(), amount.explanation),
			children: vec![rolled, amount],
		}
	}
}

impl fmt::Display for Outcome {
	/// Formats the outcome as its explanation followed by the result, e.g. `[1 + 2] + 3 = 6`.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} = {}", self.explanation, self.result)
	}
}

/// Which end of the sorted rolls a keep modifier takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keep {
	/// Keep the highest rolls (`kh`)
	Highest,

	/// Keep the lowest rolls (`kl`)
	Lowest,
}

impl Keep {
	/// Gets the notation for the modifier.
	const fn symbol(self) -> &'static str {
		match self {
			Self::Highest => "kh",
			Self::Lowest => "kl",
		}
	}
}

/// Determines how many rolls to keep from the result of a keep amount. Fractions are truncated, and the count is
/// clamped between zero and the number of rolls available.
#[expect(
	clippy::cast_possible_truncation,
	clippy::cast_sign_loss,
	reason = "The amount is checked to be at least 1 and float to int casts saturate"
)]
fn keep_count(amount: f64, available: usize) -> usize {
	if amount >= 1.0 {
		(amount.trunc() as usize).min(available)
	} else {
		0
	}
}

/// Dice are deterministic when they can't land on more than one face, or when none are rolled.
const fn dice_is_deterministic(dice: &Dice) -> bool {
	dice.sides <= 1 || dice.count == 0
}

/// Converts an integer to the real-valued number results are calculated with.
#[expect(clippy::cast_precision_loss, reason = "Results are real-valued, as division is exact")]
fn to_f64(value: u64) -> f64 {
	value as f64
}

/// Adds up rolls, starting from positive zero so that an empty set of rolls totals `0` rather than `-0`.
fn sum(rolls: &[u64]) -> f64 {
	rolls.iter().fold(0.0, |total, &roll| total + to_f64(roll))
}

/// Joins the values with a separator.
fn join(values: &[u64], sep: &str) -> String {
	values.iter().map(ToString::to_string).collect::<Vec<_>>().join(sep)
}
