use anyhow::Result as AResult;
use nom::branch::alt;
use nom::bytes::complete::{tag, take_until, take_while, take_while1};
use nom::character::complete::{anychar, char, digit1, multispace0, multispace1, not_line_ending, satisfy};
use nom::combinator::{complete, cut, eof, map, map_res, opt, recognize, value};
use nom::error::{ErrorKind, FromExternalError};
use nom::multi::{many0, many0_count};
use nom::sequence::preceded;
use nom::{Finish, Parser};
use nom_language::error::VerboseError;
use tracing::trace;

use crate::Token;

/// How [lex] splits text into tokens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LexOptions {
	/// Let words continue across spaces, so `Brimful Blend` is one word.
	pub word_spaces: bool,
	/// Skip `// line` and `/* block */` comments.
	pub comments: bool,
}

impl Default for LexOptions {
	fn default() -> Self {
		Self {
			word_spaces: false,
			comments: true,
		}
	}
}

/// Split text into a list of tokens.
pub fn lex(input: &str, options: &LexOptions) -> AResult<Vec<Token>> {
	let res = complete(|input| top(input, options)).parse(input).finish();
	let res = res.map_err(|err| anyhow::anyhow!("{err:#?}"));
	let (_, res) = res?;
	trace!(tokens = res.len(), "lexed");
	Ok(res)
}

type PResult<'a, T> = nom::IResult<&'a str, T, VerboseError<&'a str>>;

macro_rules! nom_bail {
	($input:expr, $err:expr) => {
		return Err(nom::Err::Failure(VerboseError::from_external_error(
			$input,
			ErrorKind::Fail,
			$err,
		)))
	};
}

fn top<'a>(input: &'a str, options: &LexOptions) -> PResult<'a, Vec<Token>> {
	let (input, tokens) =
		many0(preceded(|input| skip(input, options), |input| token(input, options))).parse(input)?;
	let (input, _) = skip(input, options)?;
	let (input, _) = eof.parse(input)?;
	Ok((input, tokens))
}

fn token<'a>(input: &'a str, options: &LexOptions) -> PResult<'a, Token> {
	alt((
		map(number, Token::Number),
		map(|input| word(input, options), Token::Word),
		quoted,
		map(symbol, Token::Symbol),
	))
	.parse(input)
}

fn number(input: &str) -> PResult<f64> {
	map_res(
		recognize((opt(char('-')), digit1, opt((char('.'), digit1)))),
		str::parse::<f64>,
	)
	.parse(input)
}

fn word<'a>(input: &'a str, options: &LexOptions) -> PResult<'a, String> {
	fn is_word_char(char: char) -> bool {
		char.is_alphanumeric() || matches!(char, '-' | '_' | '\'')
	}

	let spaces = options.word_spaces;
	map(
		recognize((
			satisfy(|char: char| char.is_alphabetic() || char == '_'),
			take_while(move |char: char| is_word_char(char) || (spaces && char == ' ')),
		)),
		|word: &str| word.trim_end().to_string(),
	)
	.parse(input)
}

fn quoted(input: &str) -> PResult<Token> {
	let input_start = input;
	let (input, quote) = alt((char('"'), char('\''))).parse(input)?;
	let (input, body) = recognize(many0_count(alt((
		take_while1(move |char: char| char != quote && char != '\\'),
		recognize((char('\\'), anychar)),
	))))
	.parse(input)?;
	let closing: PResult<char> = char(quote).parse(input);
	let Ok((input, _)) = closing else {
		nom_bail!(input_start, "unterminated quoted string")
	};
	Ok((input, Token::Quoted(format!("{quote}{body}{quote}"))))
}

fn symbol(input: &str) -> PResult<String> {
	map(
		alt((
			tag("=:="),
			tag("!="),
			tag("<="),
			tag(">="),
			tag("=="),
			tag(":-"),
			tag("->"),
			recognize(satisfy(|char: char| !char.is_whitespace())),
		)),
		str::to_string,
	)
	.parse(input)
}

fn skip<'a>(input: &'a str, options: &LexOptions) -> PResult<'a, ()> {
	if !options.comments {
		return value((), multispace0).parse(input);
	}
	value(
		(),
		many0_count(alt((
			value((), multispace1),
			value((), (tag("//"), not_line_ending)),
			value((), (tag("/*"), cut((take_until("*/"), tag("*/"))))),
		))),
	)
	.parse(input)
}

#[cfg(test)]
fn words(texts: &[&str]) -> Vec<Token> {
	texts.iter().map(|text| Token::Word(text.to_string())).collect()
}

#[test]
fn test_lex_coffee_line() {
	assert_eq!(
		lex("Brimful, Regular, Kenya, 6.95", &LexOptions::default()).unwrap(),
		vec![
			Token::Word("Brimful".into()),
			Token::Symbol(",".into()),
			Token::Word("Regular".into()),
			Token::Symbol(",".into()),
			Token::Word("Kenya".into()),
			Token::Symbol(",".into()),
			Token::Number(6.95),
		]
	);
}

#[test]
fn test_word_spaces() {
	let options = LexOptions {
		word_spaces: true,
		..LexOptions::default()
	};
	assert_eq!(
		lex("Brimful Blend , Regular/French", &options).unwrap(),
		vec![
			Token::Word("Brimful Blend".into()),
			Token::Symbol(",".into()),
			Token::Word("Regular".into()),
			Token::Symbol("/".into()),
			Token::Word("French".into()),
		]
	);
	assert_eq!(
		lex("Brimful Blend", &LexOptions::default()).unwrap(),
		words(&["Brimful", "Blend"])
	);
}

#[test]
fn test_numbers() {
	assert_eq!(
		lex("-2 3.5 4. -x", &LexOptions::default()).unwrap(),
		vec![
			Token::Number(-2.0),
			Token::Number(3.5),
			Token::Number(4.0),
			Token::Symbol(".".into()),
			Token::Symbol("-".into()),
			Token::Word("x".into()),
		]
	);
	// digits can't start a word, but can continue one
	assert_eq!(
		lex("A65 7up", &LexOptions::default()).unwrap(),
		vec![
			Token::Word("A65".into()),
			Token::Number(7.0),
			Token::Word("up".into()),
		]
	);
}

#[test]
fn test_quoted() {
	assert_eq!(
		lex(r#"say "hello \"you\"" 'x'"#, &LexOptions::default()).unwrap(),
		vec![
			Token::Word("say".into()),
			Token::Quoted(r#""hello \"you\"""#.into()),
			Token::Quoted("'x'".into()),
		]
	);
	assert!(lex(r#"say "oops"#, &LexOptions::default()).is_err());
}

#[test]
fn test_symbols_and_comments() {
	assert_eq!(
		lex("a <= b // trailing\n/* block\n */ c != d", &LexOptions::default()).unwrap(),
		vec![
			Token::Word("a".into()),
			Token::Symbol("<=".into()),
			Token::Word("b".into()),
			Token::Word("c".into()),
			Token::Symbol("!=".into()),
			Token::Word("d".into()),
		]
	);
	assert!(lex("a /* never closed", &LexOptions::default()).is_err());

	let literal_slashes = LexOptions {
		comments: false,
		..LexOptions::default()
	};
	assert_eq!(
		lex("a//b", &literal_slashes).unwrap(),
		vec![
			Token::Word("a".into()),
			Token::Symbol("/".into()),
			Token::Symbol("/".into()),
			Token::Word("b".into()),
		]
	);
}

#[test]
fn test_empty_input() {
	assert_eq!(lex("", &LexOptions::default()).unwrap(), vec![]);
	assert_eq!(lex("  // nothing\n", &LexOptions::default()).unwrap(), vec![]);
}
