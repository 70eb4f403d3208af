//! Sources of die faces used when evaluating dice expressions.

use std::iter::Peekable;

#[cfg(feature = "fastrand")]
use fastrand::Rng;

use crate::expr::Dice;

/// Rolls dice - what else is there to say?
///
/// Any `FnMut(u64) -> u64` closure is a roller as well, receiving the number of sides and returning the face.
pub trait Roller {
	/// Rolls a single die with the given number of sides.
	#[must_use]
	fn roll_die(&mut self, sides: u64) -> u64;

	/// Rolls every die of a dice term, returning the faces in the order they were rolled.
	fn roll_dice(&mut self, dice: &Dice) -> Vec<u64> {
		let mut rolls = Vec::new();
		for _ in 0..dice.count {
			rolls.push(self.roll_die(dice.sides));
		}
		rolls
	}
}

impl<F: FnMut(u64) -> u64> Roller for F {
	#[inline]
	fn roll_die(&mut self, sides: u64) -> u64 {
		self(sides)
	}
}

/// Generates rolls with uniformly random values using [fastrand]. Requires the `fastrand` feature (enabled by default).
///
/// # Examples
///
/// ## Default fastrand roller
/// ```
/// use dice_notation::roller::{FastRand as FastRandRoller, Roller};
///
/// let mut roller = FastRandRoller::default();
/// let face = roller.roll_die(6);
/// assert!((1..=6).contains(&face));
/// ```
///
/// ## Manually seeded fastrand roller
/// ```
/// use dice_notation::{roller::{FastRand as FastRandRoller, Roller}, Dice};
///
/// let mut a = FastRandRoller::with_seed(0x750c38d574400);
/// let mut b = FastRandRoller::with_seed(0x750c38d574400);
///
/// let dice = Dice::new(4, 6);
/// assert_eq!(a.roll_dice(&dice), b.roll_dice(&dice));
/// ```
#[cfg(feature = "fastrand")]
#[derive(Debug, Clone, Default)]
pub struct FastRand(Rng);

#[cfg(feature = "fastrand")]
impl FastRand {
	/// Creates a new fastrand roller that uses the given RNG instance to generate rolls.
	#[must_use]
	#[inline]
	pub const fn new(rng: Rng) -> Self {
		Self(rng)
	}

	/// Creates a new fastrand roller that uses a pre-seeded RNG instance to generate rolls.
	#[must_use]
	#[inline]
	pub fn with_seed(seed: u64) -> Self {
		Self(Rng::with_seed(seed))
	}
}

#[cfg(feature = "fastrand")]
impl Roller for FastRand {
	/// Rolls a single die using the [`fastrand::Rng`] the roller was created with.
	/// A die without any sides always lands on 1.
	#[inline]
	fn roll_die(&mut self, sides: u64) -> u64 {
		if sides > 0 {
			self.0.u64(1..=sides)
		} else {
			1
		}
	}
}

/// Generates rolls that always have a specific value.
///
/// # Examples
/// ```
/// use dice_notation::{roller::{Roller, Val as ValRoller}, Dice};
///
/// let mut roller = ValRoller(42);
/// assert_eq!(roller.roll_dice(&Dice::new(4, 6)), [42, 42, 42, 42]);
/// ```
#[derive(Debug, Default, Clone)]
#[expect(clippy::exhaustive_structs, reason = "Highly unlikely to change")]
pub struct Val(pub u64);

impl Roller for Val {
	/// Rolls a single die, always with one specific value.
	#[inline]
	fn roll_die(&mut self, _sides: u64) -> u64 {
		self.0
	}
}

/// Generates rolls that always have their max value.
///
/// # Examples
/// ```
/// use dice_notation::{roller::{Max as MaxRoller, Roller}, Dice};
///
/// let mut roller = MaxRoller;
/// assert_eq!(roller.roll_dice(&Dice::new(2, 20)), [20, 20]);
/// ```
#[derive(Debug, Default, Clone)]
#[expect(clippy::exhaustive_structs, reason = "Highly unlikely to change")]
pub struct Max;

impl Roller for Max {
	/// Rolls a single die, always with the max value (same as the number of sides).
	#[inline]
	fn roll_die(&mut self, sides: u64) -> u64 {
		sides
	}
}

/// Generates rolls from an iterator of values. Mainly useful for testing purposes.
///
/// # Examples
/// ```
/// use dice_notation::{roller::{Iter as IterRoller, Roller}, Dice};
///
/// let mut roller = IterRoller::new(vec![1, 2, 3, 4, 10]);
/// assert_eq!(roller.roll_dice(&Dice::new(5, 6)), [1, 2, 3, 4, 10]);
/// assert!(!roller.can_roll());
/// ```
#[derive(Debug, Clone)]
pub struct Iter<I: Iterator<Item = u64>>(Peekable<I>);

impl<I: Iterator<Item = u64>> Iter<I> {
	/// Checks whether the iterator still has values available.
	#[inline]
	pub fn can_roll(&mut self) -> bool {
		self.0.peek().is_some()
	}

	/// Creates a new roller that uses the given iterator to provide roll values.
	#[must_use]
	#[inline]
	pub fn new(iter: impl IntoIterator<IntoIter = I>) -> Self {
		Self(iter.into_iter().peekable())
	}
}

impl<I: Iterator<Item = u64>> Roller for Iter<I> {
	/// Rolls a die with the value from the next iteration.
	///
	/// # Panics
	/// If the iterator has finished, this will panic.
	#[inline]
	#[expect(
		clippy::expect_used,
		reason = "Mostly for testing, otherwise manual checking of can_roll() is expected"
	)]
	fn roll_die(&mut self, _sides: u64) -> u64 {
		self.0.next().expect("iterator is finished")
	}
}
