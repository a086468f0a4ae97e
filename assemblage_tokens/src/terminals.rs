use std::mem;

use assemblage_engine::Terminal;
use rand::{Rng, RngCore};

use crate::Token;

/// Matches any word.
#[derive(Clone, Copy, Debug, Default)]
pub struct Word;

/// Matches any number.
#[derive(Clone, Copy, Debug, Default)]
pub struct Num;

/// Matches any quoted string.
#[derive(Clone, Copy, Debug, Default)]
pub struct QuotedString;

/// Matches any token at all.
#[derive(Clone, Copy, Debug, Default)]
pub struct AnyToken;

/// Matches one specific symbol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Symbol(String);

impl Symbol {
	pub fn new(symbol: impl ToString) -> Self {
		Self(symbol.to_string())
	}
}

/**
	Matches one specific token, kind included.

	[Literal::new] expects a word, so `Literal::new(",")` will not match the
	symbol `,`; use [Literal::token] or [Symbol] for other kinds.
*/
#[derive(Clone, Debug, PartialEq)]
pub struct Literal(Token);

impl Literal {
	pub fn new(word: impl Into<String>) -> Self {
		Self(Token::Word(word.into()))
	}

	pub fn token(token: Token) -> Self {
		Self(token)
	}
}

/// Like [Literal], ignoring case.
#[derive(Clone, Debug, PartialEq)]
pub struct CaselessLiteral(Token);

impl CaselessLiteral {
	pub fn new(word: impl Into<String>) -> Self {
		Self(Token::Word(word.into()))
	}

	pub fn token(token: Token) -> Self {
		Self(token)
	}
}

fn literal_description(token: &Token) -> String {
	match token {
		Token::Word(text) => format!("{text:?}"),
		Token::Symbol(text) => format!("'{text}'"),
		Token::Number(_) | Token::Quoted(_) => token.to_string(),
	}
}

fn random_word(rng: &mut dyn RngCore) -> String {
	let len = rng.gen_range(3 ..= 7);
	(0 .. len)
		.map(|_| char::from(rng.gen_range(b'a' ..= b'z')))
		.collect()
}

impl Terminal<Token> for Word {
	fn qualifies(&self, token: &Token) -> bool {
		token.is_word()
	}

	fn describe(&self) -> String {
		"Word".into()
	}

	fn random_element(&self, rng: &mut dyn RngCore) -> String {
		random_word(rng)
	}
}

impl Terminal<Token> for Num {
	fn qualifies(&self, token: &Token) -> bool {
		token.is_number()
	}

	fn describe(&self) -> String {
		"Num".into()
	}

	fn random_element(&self, rng: &mut dyn RngCore) -> String {
		let tenths: u32 = rng.gen_range(0 .. 1000);
		(f64::from(tenths) / 10.0).to_string()
	}
}

impl Terminal<Token> for QuotedString {
	fn qualifies(&self, token: &Token) -> bool {
		token.is_quoted()
	}

	fn describe(&self) -> String {
		"QuotedString".into()
	}

	fn random_element(&self, rng: &mut dyn RngCore) -> String {
		format!("\"{}\"", random_word(rng))
	}
}

impl Terminal<Token> for AnyToken {
	fn qualifies(&self, _token: &Token) -> bool {
		true
	}

	fn describe(&self) -> String {
		"Token".into()
	}

	fn random_element(&self, rng: &mut dyn RngCore) -> String {
		random_word(rng)
	}
}

impl Terminal<Token> for Symbol {
	fn qualifies(&self, token: &Token) -> bool {
		matches!(token, Token::Symbol(symbol) if *symbol == self.0)
	}

	fn describe(&self) -> String {
		format!("'{}'", self.0)
	}

	fn random_element(&self, _rng: &mut dyn RngCore) -> String {
		self.0.clone()
	}
}

impl Terminal<Token> for Literal {
	fn qualifies(&self, token: &Token) -> bool {
		*token == self.0
	}

	fn describe(&self) -> String {
		literal_description(&self.0)
	}

	fn random_element(&self, _rng: &mut dyn RngCore) -> String {
		self.0.to_string()
	}
}

impl Terminal<Token> for CaselessLiteral {
	fn qualifies(&self, token: &Token) -> bool {
		if mem::discriminant(token) != mem::discriminant(&self.0) {
			return false;
		}
		match (token.as_str(), self.0.as_str()) {
			(Some(text), Some(expected)) => text.to_lowercase() == expected.to_lowercase(),
			_ => *token == self.0,
		}
	}

	fn describe(&self) -> String {
		literal_description(&self.0)
	}

	fn random_element(&self, _rng: &mut dyn RngCore) -> String {
		self.0.to_string()
	}
}

#[test]
fn test_token_classes() {
	let word = Token::Word("French".into());
	let number = Token::Number(6.95);
	let comma = Token::Symbol(",".into());
	let quoted = Token::Quoted("\"hi\"".into());

	assert!(Word.qualifies(&word) && !Word.qualifies(&number));
	assert!(Num.qualifies(&number) && !Num.qualifies(&comma));
	assert!(QuotedString.qualifies(&quoted) && !QuotedString.qualifies(&word));
	assert!([&word, &number, &comma, &quoted].into_iter().all(|token| AnyToken.qualifies(token)));

	assert!(Symbol::new(',').qualifies(&comma));
	assert!(!Symbol::new(',').qualifies(&Token::Word(",".into())));
	assert!(Literal::new("French").qualifies(&word));
	assert!(!Literal::new("french").qualifies(&word));
	assert!(CaselessLiteral::new("french").qualifies(&word));
	assert!(!CaselessLiteral::new("6.95").qualifies(&number));
}

#[test]
fn test_literals_compare_kind() {
	let comma = Token::Symbol(",".into());
	let quoted = Token::Quoted("\"Kenya\"".into());

	assert!(!Literal::new(",").qualifies(&comma));
	assert!(Literal::token(comma.clone()).qualifies(&comma));
	assert!(!Literal::token(comma.clone()).qualifies(&Token::Word(",".into())));
	assert!(!Literal::new("\"Kenya\"").qualifies(&quoted));
	assert!(Literal::token(Token::Number(6.95)).qualifies(&Token::Number(6.95)));

	assert!(!CaselessLiteral::new("kenya").qualifies(&Token::Symbol("Kenya".into())));
	assert!(CaselessLiteral::token(Token::Quoted("\"KENYA\"".into())).qualifies(&quoted));
	assert!(!CaselessLiteral::token(Token::Quoted("\"KENYA\"".into())).qualifies(&Token::Word("\"kenya\"".into())));

	assert_eq!(Terminal::<Token>::describe(&Literal::new("french")), "\"french\"");
	assert_eq!(Terminal::<Token>::describe(&Literal::token(comma)), "','");
}

#[test]
fn test_random_elements_lex_back() {
	use rand::SeedableRng;

	use crate::{LexOptions, lex};

	let mut rng = rand_xoshiro::Xoshiro256StarStar::seed_from_u64(3);
	for _ in 0 .. 25 {
		let word = Word.random_element(&mut rng);
		assert!(Word.qualifies(&lex(&word, &LexOptions::default()).unwrap()[0]));
		let number = Num.random_element(&mut rng);
		assert!(Num.qualifies(&lex(&number, &LexOptions::default()).unwrap()[0]));
		let quoted = QuotedString.random_element(&mut rng);
		assert!(QuotedString.qualifies(&lex(&quoted, &LexOptions::default()).unwrap()[0]));
	}
}
