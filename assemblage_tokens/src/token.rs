use std::fmt;

use assemblage_engine::Element;

/// A lexed token.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
	/// A word, such as `Kenya` or `don't`.
	Word(String),
	/// A number, such as `6.95` or `-2`.
	Number(f64),
	/// A symbol, such as `,` or `<=`.
	Symbol(String),
	/// A quoted string, quotes included.
	Quoted(String),
}

impl Token {
	/// The source text of words, symbols and quoted strings.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::Word(text) | Self::Symbol(text) | Self::Quoted(text) => Some(text),
			Self::Number(_) => None,
		}
	}

	pub fn number(&self) -> Option<f64> {
		match *self {
			Self::Number(number) => Some(number),
			_ => None,
		}
	}

	/// The contents of a quoted string, with its quotes removed and escaped quotes restored.
	pub fn unquoted(&self) -> Option<String> {
		let Self::Quoted(text) = self else {
			return None;
		};
		let mut chars = text.chars();
		let quote = chars.next()?;
		chars.next_back()?;
		let escaped = format!("\\{quote}");
		Some(chars.as_str().replace(&escaped, &quote.to_string()))
	}

	pub fn is_word(&self) -> bool {
		matches!(self, Self::Word(_))
	}

	pub fn is_number(&self) -> bool {
		matches!(self, Self::Number(_))
	}

	pub fn is_symbol(&self) -> bool {
		matches!(self, Self::Symbol(_))
	}

	pub fn is_quoted(&self) -> bool {
		matches!(self, Self::Quoted(_))
	}
}

impl fmt::Display for Token {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Word(text) | Self::Symbol(text) | Self::Quoted(text) => f.write_str(text),
			Self::Number(number) => number.fmt(f),
		}
	}
}

impl Element for Token {}

#[test]
fn test_token_text() {
	assert_eq!(Token::Word("Kenya".into()).to_string(), "Kenya");
	assert_eq!(Token::Number(6.95).to_string(), "6.95");
	assert_eq!(Token::Number(2.0).to_string(), "2");
	assert_eq!(Token::Number(2.0).as_str(), None);
	assert_eq!(Token::Symbol("<=".into()).as_str(), Some("<="));
	assert_eq!(
		Token::Quoted(r#""say \"hi\"""#.into()).unquoted(),
		Some(r#"say "hi""#.to_string())
	);
	assert_eq!(Token::Word("x".into()).unquoted(), None);
}
