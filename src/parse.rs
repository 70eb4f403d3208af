//! Recursive-descent parsing of [`Token`]s into an [`Expr`].
//!
//! Precedence from lowest to highest:
//!
//! ```text
//! term    := factor (("+" | "-") factor)*
//! factor  := primary (("*" | "/") primary)*
//! primary := dice | NUMBER | "(" term ")"
//! dice    := NUMBER? "d" NUMBER (("kh" | "kl") primary)?
//! ```
//!
//! All binary operators are left-associative.

use std::str::FromStr;

use tracing::warn;

use crate::{
	expr::{Dice, Expr},
	lex::{self, Token, TokenKind},
};

/// Error for a token that doesn't fit the grammar where it appears
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
	/// Token that can't start an operand
	#[error("unexpected token {found} at position {offset}")]
	UnexpectedToken {
		/// Token that was found
		found: TokenKind,

		/// Character index of the token
		offset: usize,
	},

	/// Token other than the one the grammar requires next
	#[error("expected {expected} but found {found} at position {offset}")]
	ExpectedToken {
		/// Name of the required token type
		expected: &'static str,

		/// Token that was found instead
		found: TokenKind,

		/// Character index of the token
		offset: usize,
	},
}

impl Error {
	/// Gets the character index of the token the error is about.
	#[must_use]
	pub const fn offset(&self) -> usize {
		match self {
			Self::UnexpectedToken { offset, .. } | Self::ExpectedToken { offset, .. } => *offset,
		}
	}
}

/// Parses a sequence of tokens (as produced by [`lex::lex()`]) into an expression.
/// Any tokens left over after a complete expression are ignored, with a warning logged.
///
/// # Errors
/// If the tokens don't form a valid expression, an error for the first token that doesn't fit is returned.
///
/// # Examples
/// ```
/// use dice_notation::{lex::lex, parse::parse, Dice, Expr};
///
/// let tokens = lex("3d6kh1")?;
/// assert_eq!(parse(&tokens)?, Expr::KeepHigh(Dice::new(3, 6), Box::new(Expr::Num(1))));
/// # Ok::<(), dice_notation::Error>(())
/// ```
pub fn parse(tokens: &[Token<'_>]) -> Result<Expr, Error> {
	let mut parser = Parser { tokens, pos: 0 };
	let expr = parser.term()?;

	let rest = parser.peek();
	if rest.kind != TokenKind::Eof {
		warn!(
			offset = rest.offset,
			lexeme = rest.lexeme,
			"ignoring trailing input after complete expression"
		);
	}

	Ok(expr)
}

impl FromStr for Expr {
	type Err = crate::Error;

	/// Lexes and parses an expression in one go.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let tokens = lex::lex(s)?;
		Ok(parse(&tokens)?)
	}
}

/// Placeholder read past the end of a token sequence that is missing its [`TokenKind::Eof`]
const END: Token<'static> = Token::new(TokenKind::Eof, "", 0);

/// Type of the constructor functions for binary [`Expr`]s
type BinaryCtor = fn(Box<Expr>, Box<Expr>) -> Expr;

/// Type of the constructor functions for keep [`Expr`]s
type KeepCtor = fn(Dice, Box<Expr>) -> Expr;

/// Cursor over the tokens being parsed
struct Parser<'t, 'src> {
	/// Tokens being parsed
	tokens: &'t [Token<'src>],

	/// Index of the next token
	pos: usize,
}

impl<'src> Parser<'_, 'src> {
	/// Parses additions and subtractions.
	fn term(&mut self) -> Result<Expr, Error> {
		let mut expr = self.factor()?;

		loop {
			let op = match self.peek().kind {
				TokenKind::Plus => Expr::Add as BinaryCtor,
				TokenKind::Minus => Expr::Sub,
				_ => break,
			};
			self.advance();

			let rhs = self.factor()?;
			expr = op(Box::new(expr), Box::new(rhs));
		}

		Ok(expr)
	}

	/// Parses multiplications and divisions.
	fn factor(&mut self) -> Result<Expr, Error> {
		let mut expr = self.primary()?;

		loop {
			let op = match self.peek().kind {
				TokenKind::Star => Expr::Mul as BinaryCtor,
				TokenKind::Slash => Expr::Div,
				_ => break,
			};
			self.advance();

			let rhs = self.primary()?;
			expr = op(Box::new(expr), Box::new(rhs));
		}

		Ok(expr)
	}

	/// Parses a single operand: dice, a number, or a parenthesized expression.
	fn primary(&mut self) -> Result<Expr, Error> {
		let token = self.peek();
		match token.kind {
			// A number directly followed by `d` is the count of a dice term rather than a literal
			TokenKind::Dice => self.dice(),
			TokenKind::Number(..) if self.peek_nth(1).kind == TokenKind::Dice => self.dice(),

			TokenKind::Number(value) => {
				self.advance();
				Ok(Expr::Num(value))
			}

			TokenKind::ParenOpen => {
				self.advance();
				let inner = self.term()?;
				self.expect(TokenKind::ParenClose)?;
				Ok(Expr::Group(Box::new(inner)))
			}

			found => Err(Error::UnexpectedToken {
				found,
				offset: token.offset,
			}),
		}
	}

	/// Parses a dice term and its optional keep modifier.
	fn dice(&mut self) -> Result<Expr, Error> {
		let count = match self.peek().kind {
			TokenKind::Number(count) => {
				self.advance();
				count
			}
			_ => 1,
		};
		self.expect(TokenKind::Dice)?;
		let sides = self.expect_number()?;
		let dice = Dice::new(count, sides);

		let keep = match self.peek().kind {
			TokenKind::KeepHighest => Expr::KeepHigh as KeepCtor,
			TokenKind::KeepLowest => Expr::KeepLow,
			_ => return Ok(Expr::Dice(dice)),
		};
		self.advance();

		let amount = self.primary()?;
		Ok(keep(dice, Box::new(amount)))
	}

	/// Consumes the next token, failing if it isn't of the given kind.
	fn expect(&mut self, kind: TokenKind) -> Result<Token<'src>, Error> {
		let token = self.peek();
		if token.kind == kind {
			self.advance();
			Ok(token)
		} else {
			Err(Error::ExpectedToken {
				expected: kind.name(),
				found: token.kind,
				offset: token.offset,
			})
		}
	}

	/// Consumes the next token, failing if it isn't a number.
	fn expect_number(&mut self) -> Result<u64, Error> {
		let token = self.peek();
		match token.kind {
			TokenKind::Number(value) => {
				self.advance();
				Ok(value)
			}
			found => Err(Error::ExpectedToken {
				expected: "NUMBER",
				found,
				offset: token.offset,
			}),
		}
	}

	/// Gets the next token without consuming it.
	fn peek(&self) -> Token<'src> {
		self.peek_nth(0)
	}

	/// Gets the token `n` places after the next one without consuming anything.
	/// Reading past the end yields the final token.
	fn peek_nth(&self, n: usize) -> Token<'src> {
		self.tokens
			.get(self.pos.saturating_add(n))
			.or_else(|| self.tokens.last())
			.copied()
			.unwrap_or(END)
	}

	/// Moves past the next token. The final token is never moved past.
	fn advance(&mut self) {
		if self.pos < self.tokens.len().saturating_sub(1) {
			self.pos = self.pos.saturating_add(1);
		}
	}
}
