use crate::{
	lex,
	parse,
	roll::{roll_with, Error, Options},
	roller::{Iter as IterRoller, Max as MaxRoller, Val as ValRoller},
};

#[test]
fn precedence() {
	assert_eq!(roll_with("2 * 3 + 1", Options::new(MaxRoller)).unwrap().result, 7.0);
	assert_eq!(roll_with("1 + 2 * 3", Options::new(MaxRoller)).unwrap().result, 7.0);
	assert_eq!(roll_with("(1 + 2) * 3", Options::new(MaxRoller)).unwrap().result, 9.0);
	assert_eq!(roll_with("10 - 4 - 3", Options::new(MaxRoller)).unwrap().result, 3.0);
	assert_eq!(roll_with("5 / 2", Options::new(MaxRoller)).unwrap().result, 2.5);
}

#[test]
fn grouping_shows_in_explanation() {
	let outcome = roll_with("(1 + 2) * 3", Options::new(MaxRoller)).unwrap();
	assert_eq!(outcome.explanation, "(1 + 2) * 3");
	assert_eq!(outcome.to_string(), "(1 + 2) * 3 = 9");
}

#[test]
fn dice_count_defaults_to_one() {
	let implicit = roll_with("d8", Options::new(ValRoller(5))).unwrap();
	let explicit = roll_with("1d8", Options::new(ValRoller(5))).unwrap();
	assert_eq!(implicit.result, 5.0);
	assert_eq!(implicit, explicit);
}

#[test]
fn keep_highest_and_lowest() {
	assert_eq!(roll_with("3d6kh1", Options::new(IterRoller::new([1, 2, 5]))).unwrap().result, 5.0);
	assert_eq!(roll_with("3d6kl2", Options::new(IterRoller::new([1, 2, 5]))).unwrap().result, 3.0);
}

#[test]
fn single_d20() {
	let outcome = roll_with("1d20", Options::new(IterRoller::new([15]))).unwrap();
	assert_eq!(outcome.result, 15.0);
	assert_eq!(outcome.rolls, Some(vec![15]));
	assert_eq!(outcome.explanation, "[15]");
}

#[test]
fn sibling_dice_roll_in_order() {
	let outcome = roll_with("2d6 + d8", Options::new(IterRoller::new([1, 2, 5]))).unwrap();
	assert_eq!(outcome.result, 8.0);
	assert_eq!(outcome.explanation, "[1 + 2] + [5]");
	assert_eq!(outcome.children[0].rolls, Some(vec![1, 2]));
	assert_eq!(outcome.children[1].rolls, Some(vec![5]));
}

#[test]
fn lex_errors_surface() {
	match roll_with("1 @ 2", Options::new(MaxRoller)).unwrap_err() {
		Error::Lex(err) => {
			assert_eq!(err.offset, 2);
			assert_eq!(err.character, Some('@'));
			assert_eq!(err.expression, "1 @ 2");
		}
		err => panic!("expected a lexical error, got {err:?}"),
	}
}

#[test]
fn unbalanced_parens() {
	let err = roll_with("(1 + 2", Options::new(MaxRoller)).unwrap_err();
	assert!(matches!(err, Error::Parse(parse::Error::ExpectedToken { expected: "PAREN_CLOSE", .. })));
	assert_eq!(err.to_string(), "expected PAREN_CLOSE but found EOF at position 6");
}

#[test]
fn transparent_error_messages() {
	let err = roll_with("2 # 2", Options::new(MaxRoller)).unwrap_err();
	let lex_err = lex::lex("2 # 2").unwrap_err();
	assert_eq!(err.to_string(), lex_err.to_string());
}

#[test]
fn roll_limit() {
	let options = Options::new(MaxRoller).max_rolls(3);
	assert_eq!(options.limit(), Some(3));
	assert_eq!(roll_with("2d6 + d8", options.clone()).unwrap().result, 20.0);
	assert_eq!(
		roll_with("2d6 + 2d8", options.clone()).unwrap_err(),
		Error::TooManyRolls { count: 4, max: 3 }
	);

	// Number literals don't count as rolls
	assert!(roll_with("3d6 + 1 + 2 + 3", options).is_ok());
}

#[test]
fn roll_limit_rejects_before_rolling() {
	let err = roll_with("4d6kh3", Options::new(IterRoller::new([])).max_rolls(0)).unwrap_err();
	assert_eq!(err, Error::TooManyRolls { count: 4, max: 0 });
	assert_eq!(err.to_string(), "expression rolls 4 dice, but at most 0 are allowed");
}

#[test]
fn replacing_roller_keeps_limit() {
	let options = Options::new(MaxRoller).max_rolls(1).roller(ValRoller(2));
	assert_eq!(options.limit(), Some(1));
	assert_eq!(roll_with("d6", options).unwrap().result, 2.0);
}

#[test]
fn trailing_input_is_ignored() {
	let outcome = roll_with("2d6 3", Options::new(ValRoller(1))).unwrap();
	assert_eq!(outcome.result, 2.0);
	assert_eq!(outcome.explanation, "[1 + 1]");
}

#[test]
fn closure_roller() {
	let mut calls = 0;
	let outcome = roll_with(
		"2d6kh1 + d4",
		Options::new(|sides: u64| -> u64 {
			calls += 1;
			sides
		}),
	)
	.unwrap();
	assert_eq!(outcome.result, 10.0);
	assert_eq!(calls, 3);
}

#[test]
#[cfg(feature = "fastrand")]
fn system_randomness() {
	for _ in 0..100 {
		let outcome = crate::roll("4d6kh3 + 1").unwrap();
		assert!((4.0..=19.0).contains(&outcome.result));
		assert_eq!(outcome.children[0].children[0].rolls.as_ref().map(Vec::len), Some(4));
	}
}

#[test]
#[cfg(feature = "serde")]
fn outcome_serialization() {
	let outcome = roll_with("(d6) + 2", Options::new(ValRoller(3))).unwrap();
	let json = serde_json::to_value(&outcome).unwrap();
	assert_eq!(json["result"], 5.0);
	assert_eq!(json["explanation"], "([3]) + 2");
	assert!(json.get("rolls").is_none());
	assert_eq!(json["children"][0]["rolls"], serde_json::json!([3]));
	assert!(json["children"][1].get("children").is_none());

	let back: crate::Outcome = serde_json::from_value(json).unwrap();
	assert_eq!(back, outcome);
}
