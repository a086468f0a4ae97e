/*!
	Word-level input for [assemblage_engine]: a [Token] type, a lexer to
	produce tokens from text, and [terminals] that match them.
*/

use assemblage_engine::Assembly;

pub mod lexer;
pub mod terminals;
pub mod token;

pub use crate::lexer::{LexOptions, lex};
pub use crate::token::Token;

/// Lexes `input` into a fresh token assembly with no target.
pub fn assembly<T>(input: &str, options: &LexOptions) -> anyhow::Result<Assembly<Token, T>> {
	Ok(Assembly::new(lex(input, options)?))
}

/**
	Splits a token stream into the pieces between `delimiter` symbols.

	The delimiters themselves are dropped. A delimiter closing the stream does
	not start an empty last piece, so `a ; b ;` gives `[a]` and `[b]`.
*/
pub fn split_on<'a>(tokens: &'a [Token], delimiter: &str) -> Vec<&'a [Token]> {
	let mut pieces: Vec<&[Token]> = tokens
		.split(|token| matches!(token, Token::Symbol(symbol) if symbol == delimiter))
		.collect();
	if pieces.last().is_some_and(|piece| piece.is_empty()) {
		pieces.pop();
	}
	pieces
}

#[test]
fn test_split_on() {
	let tokens = lex("a ; b c ;; d", &LexOptions::default()).unwrap();
	let pieces: Vec<String> = split_on(&tokens, ";")
		.into_iter()
		.map(|piece| piece.iter().map(Token::to_string).collect::<Vec<_>>().join(" "))
		.collect();
	assert_eq!(pieces, vec!["a", "b c", "", "d"]);

	assert!(split_on(&[], ";").is_empty());
	// only symbols delimit
	let quoted = lex("a ';' b", &LexOptions::default()).unwrap();
	assert_eq!(split_on(&quoted, ";").len(), 1);
}

#[test]
fn test_count_words_per_piece() {
	use assemblage_engine::{AssemblyError, Grammar};

	use crate::terminals::Word;

	let mut grammar = Grammar::<Token>::new();
	let word = grammar.terminal(Word);
	grammar.discard(word).unwrap();
	grammar.set_assembler(word, |assembly: &mut Assembly<Token>| -> Result<(), AssemblyError> {
		let count = if assembly.stack_is_empty() {
			0.0
		} else {
			assembly.pop()?.into_number()?
		};
		assembly.push(count + 1.0);
		Ok(())
	});
	let words = grammar.repetition(word).unwrap();

	let tokens = lex("I came; I saw; I left in peace;", &LexOptions::default()).unwrap();
	let mut counts = vec![];
	for piece in split_on(&tokens, ";") {
		let mut matched = grammar.complete_match(words, &Assembly::new(piece)).unwrap().unwrap();
		counts.push(matched.pop().unwrap().into_number().unwrap());
	}
	assert_eq!(counts, vec![2.0, 2.0, 4.0]);
}
