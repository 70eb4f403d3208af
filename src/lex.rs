//! Conversion of raw dice expression text into a sequence of [`Token`]s.
//!
//! The lexer scans the whole input in a single pass, recovering after every unrecognized character so that all
//! lexical errors are found. Only the earliest of them is reported, however.

use std::fmt;

use chumsky::prelude::*;

/// Type of a single [`Token`], along with the parsed value of number literals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum TokenKind {
	/// `+`
	Plus,

	/// `-`
	Minus,

	/// `*`
	Star,

	/// `/`
	Slash,

	/// Run of decimal digits, carrying its parsed value
	Number(u64),

	/// `d`
	Dice,

	/// `kh` or a bare `h`
	KeepHighest,

	/// `kl` or a bare `l`
	KeepLowest,

	/// `(`
	ParenOpen,

	/// `)`
	ParenClose,

	/// End of input
	Eof,
}

impl TokenKind {
	/// Gets the name of the token type, without any literal value.
	#[must_use]
	pub const fn name(&self) -> &'static str {
		match self {
			Self::Plus => "PLUS",
			Self::Minus => "MINUS",
			Self::Star => "STAR",
			Self::Slash => "SLASH",
			Self::Number(..) => "NUMBER",
			Self::Dice => "DICE",
			Self::KeepHighest => "KEEP_HIGHEST",
			Self::KeepLowest => "KEEP_LOWEST",
			Self::ParenOpen => "PAREN_OPEN",
			Self::ParenClose => "PAREN_CLOSE",
			Self::Eof => "EOF",
		}
	}
}

impl fmt::Display for TokenKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// Single lexical unit of a dice expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct Token<'src> {
	/// Type of the token
	pub kind: TokenKind,

	/// Exact source text the token was read from (empty for [`TokenKind::Eof`])
	pub lexeme: &'src str,

	/// Zero-based character index in the source where the token starts
	pub offset: usize,
}

impl<'src> Token<'src> {
	/// Creates a new token.
	#[must_use]
	pub const fn new(kind: TokenKind, lexeme: &'src str, offset: usize) -> Self {
		Self { kind, lexeme, offset }
	}

	/// Gets the parsed value of the token if it is a [`TokenKind::Number`].
	#[must_use]
	pub const fn literal(&self) -> Option<u64> {
		match self.kind {
			TokenKind::Number(value) => Some(value),
			_ => None,
		}
	}
}

/// Error for a character that can't begin (or continue) any token
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{} at position {offset}\n{expression}\n{}", describe_found(.character), caret(.offset))]
#[non_exhaustive]
pub struct Error {
	/// Full source text that was being lexed
	pub expression: String,

	/// Offending character, or `None` if the input ended unexpectedly
	pub character: Option<char>,

	/// Zero-based character index of the offending character
	pub offset: usize,
}

impl Error {
	/// Describes what was found at the location of the error, without the position or caret diagram.
	///
	/// # Examples
	/// ```
	/// use dice_notation::lex::lex;
	///
	/// assert_eq!(lex("1 @ 2").unwrap_err().message(), "unexpected character '@'");
	/// ```
	#[must_use]
	pub fn message(&self) -> String {
		describe_found(&self.character)
	}
}

/// Converts an expression into tokens. The returned tokens always end with a single [`TokenKind::Eof`].
///
/// # Errors
/// If the expression contains any character that isn't part of the dice notation, or a `k` that isn't followed by
/// `h` or `l`, an error is returned for the first such occurrence.
///
/// # Examples
/// ```
/// use dice_notation::lex::{lex, TokenKind};
///
/// let kinds: Vec<_> = lex("2d6 + 1")?.into_iter().map(|token| token.kind).collect();
/// assert_eq!(
/// 	kinds,
/// 	[TokenKind::Number(2), TokenKind::Dice, TokenKind::Number(6), TokenKind::Plus, TokenKind::Number(1), TokenKind::Eof]
/// );
/// # Ok::<(), dice_notation::lex::Error>(())
/// ```
pub fn lex(expression: &str) -> Result<Vec<Token<'_>>, Error> {
	let (output, errors) = lexer().parse(expression).into_output_errors();

	if let Some(err) = errors.into_iter().min_by_key(|err| err.span().start) {
		return Err(Error {
			expression: expression.to_owned(),
			character: err.found().copied(),
			offset: char_offset(expression, err.span().start),
		});
	}

	let mut tokens = output
		.unwrap_or_default()
		.into_iter()
		.map(|(kind, span)| {
			Token::new(
				kind,
				expression.get(span.start..span.end).unwrap_or_default(),
				char_offset(expression, span.start),
			)
		})
		.collect::<Vec<_>>();
	tokens.push(Token::new(TokenKind::Eof, "", expression.chars().count()));
	Ok(tokens)
}

/// Generates the lexer that turns source text into token kinds paired with their byte spans.
/// Unrecognized characters are skipped after their error is emitted so that lexing continues to the end.
fn lexer<'src>() -> impl Parser<'src, &'src str, Vec<(TokenKind, SimpleSpan)>, extra::Err<Rich<'src, char>>> {
	let number = text::digits(10)
		.collect::<String>()
		.map(|digits| TokenKind::Number(parse_literal(&digits)));

	// A `k` commits to a keep modifier, so anything but `h` or `l` after it is reported at that character
	let keep = just('k').ignore_then(choice((
		just('h').to(TokenKind::KeepHighest),
		just('l').to(TokenKind::KeepLowest),
	)));

	let token = choice((
		number,
		just('d').to(TokenKind::Dice),
		keep,
		just('h').to(TokenKind::KeepHighest),
		just('l').to(TokenKind::KeepLowest),
		just('+').to(TokenKind::Plus),
		just('-').to(TokenKind::Minus),
		just('*').to(TokenKind::Star),
		just('/').to(TokenKind::Slash),
		just('(').to(TokenKind::ParenOpen),
		just(')').to(TokenKind::ParenClose),
	));

	token
		.map_with(|kind, e| (kind, e.span()))
		.padded()
		.recover_with(skip_then_retry_until(any().ignored(), end()))
		.repeated()
		.collect::<Vec<_>>()
		.padded()
		.then_ignore(end())
}

/// Parses a run of ASCII digits, saturating at [`u64::MAX`] rather than failing on overly long runs.
fn parse_literal(digits: &str) -> u64 {
	digits
		.bytes()
		.fold(0_u64, |acc, digit| acc.saturating_mul(10).saturating_add(u64::from(digit - b'0')))
}

/// Converts a byte offset into the source to a character index.
fn char_offset(source: &str, byte_offset: usize) -> usize {
	source
		.get(..byte_offset)
		.map_or(byte_offset, |prefix| prefix.chars().count())
}

/// Describes what was found at the location of a lexical error.
fn describe_found(character: &Option<char>) -> String {
	match *character {
		Some(c) => format!("unexpected character {c:?}"),
		None => "unexpected end of input".to_owned(),
	}
}

/// Builds a line with a caret under the given character index.
fn caret(offset: &usize) -> String {
	format!("{}^", " ".repeat(*offset))
}
