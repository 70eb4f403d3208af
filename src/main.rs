use std::env;
use std::io::{self, Write};
use std::process::ExitCode;

use ariadne::{Label, Report, ReportKind, Source};
use dice_notation::Error;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
		.with_writer(io::stderr)
		.init();

	let input = match read_input() {
		Ok(input) => input,
		Err(err) => {
			eprintln!("Unable to read expression: {}", err);
			return ExitCode::FAILURE;
		}
	};

	match dice_notation::roll(&input) {
		Ok(outcome) => {
			println!("{}", outcome);
			ExitCode::SUCCESS
		}
		Err(err) => {
			report(&input, &err);
			ExitCode::FAILURE
		}
	}
}

fn read_input() -> io::Result<String> {
	let args = env::args();
	if args.len() > 1 {
		// Obtain the expression by combining all args passed to the executable, so that it can be left unquoted
		// even with spaces. The first argument is ignored since it is typically the name of the executable itself.
		return Ok(args.skip(1).collect::<Vec<String>>().join(" "));
	}

	let mut lines = io::stdin().lines();

	// If there isn't already input available in stdin, display a prompt for it
	if lines.size_hint().1.is_none() {
		print!("Enter dice expression: ");
		io::stdout().flush()?;
	}

	// Grab the first line available from stdin
	lines.next().unwrap_or_else(|| Ok(String::new()))
}

/// Prints an error, pointing at the offending part of the input when there is one.
fn report(input: &str, err: &Error) {
	let (offset, message) = match err {
		Error::Lex(lex) => (lex.offset, lex.message()),
		Error::Parse(parse) => (parse.offset(), parse.to_string()),
		_ => {
			eprintln!("Error: {}", err);
			return;
		}
	};

	let span = offset..offset.saturating_add(1);
	let printed = Report::build(ReportKind::Error, span.clone())
		.with_message(message)
		.with_label(Label::new(span).with_message("here"))
		.finish()
		.eprint(Source::from(input));

	if printed.is_err() {
		eprintln!("Error: {}", err);
	}
}
