/*!
	A grammar for lines of a coffee price list, such as
	`Launch Mi (Sumatra), French, Guatemala, 7.95` or
	`Brimful, Regular/French, Kenya, 6.95`.

	```text
	coffee     = name ',' roast ',' country ',' price;
	name       = Word (formerName | empty);
	formerName = '(' Word ')';
	roast      = Word (orFrench | empty);
	orFrench   = '/' "french";
	country    = Word;
	price      = Num;
	```
*/

use std::fmt;

use anyhow::{Context, bail};
use assemblage_engine::{Assembly, AssemblyError, EngineResult, Grammar, ParserId, duplicate_by_clone};
use assemblage_tokens::terminals::{CaselessLiteral, Num, Symbol, Word};
use assemblage_tokens::{LexOptions, Token, lex};

/// One line of the price list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Coffee {
	pub name: String,
	pub former_name: Option<String>,
	pub roast: String,
	pub also_offer_french: bool,
	pub country: String,
	pub price: f64,
}

duplicate_by_clone!(Coffee);

impl fmt::Display for Coffee {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.name)?;
		if let Some(former_name) = &self.former_name {
			write!(f, "({former_name})")?;
		}
		write!(f, ", {}", self.roast)?;
		if self.also_offer_french {
			f.write_str("/French")?;
		}
		write!(f, ", {}, {}", self.country, self.price)
	}
}

type CoffeeAssembly = Assembly<Token, Coffee>;

/// Pops a matched word and returns its trimmed text.
fn pop_text(assembly: &mut CoffeeAssembly) -> Result<String, AssemblyError> {
	let token = assembly.pop_element()?;
	match token.as_str() {
		Some(text) => Ok(text.trim().to_string()),
		None => Err(AssemblyError::UnexpectedValue {
			expected: "text token",
			found: token.to_string(),
		}),
	}
}

fn assemble_name(assembly: &mut CoffeeAssembly) -> Result<(), AssemblyError> {
	let name = pop_text(assembly)?;
	assembly.require_target()?.name = name;
	Ok(())
}

fn assemble_former_name(assembly: &mut CoffeeAssembly) -> Result<(), AssemblyError> {
	let former_name = pop_text(assembly)?;
	assembly.require_target()?.former_name = Some(former_name);
	Ok(())
}

fn assemble_roast(assembly: &mut CoffeeAssembly) -> Result<(), AssemblyError> {
	let roast = pop_text(assembly)?;
	assembly.require_target()?.roast = roast;
	Ok(())
}

fn assemble_french(assembly: &mut CoffeeAssembly) -> Result<(), AssemblyError> {
	pop_text(assembly)?;
	assembly.require_target()?.also_offer_french = true;
	Ok(())
}

fn assemble_country(assembly: &mut CoffeeAssembly) -> Result<(), AssemblyError> {
	let country = pop_text(assembly)?;
	assembly.require_target()?.country = country;
	Ok(())
}

fn assemble_price(assembly: &mut CoffeeAssembly) -> Result<(), AssemblyError> {
	let token = assembly.pop_element()?;
	let price = token.number().ok_or_else(|| AssemblyError::UnexpectedValue {
		expected: "number token",
		found: token.to_string(),
	})?;
	assembly.require_target()?.price = price;
	Ok(())
}

fn punctuation(grammar: &mut Grammar<Token, Coffee>, symbol: char) -> EngineResult<ParserId> {
	let id = grammar.terminal(Symbol::new(symbol));
	grammar.discard(id)
}

/// Builds the coffee grammar, returning it along with its start rule.
pub fn grammar() -> EngineResult<(Grammar<Token, Coffee>, ParserId)> {
	let mut grammar = Grammar::new();

	let name_word = grammar.terminal(Word);
	grammar.set_assembler(name_word, assemble_name);
	let open = punctuation(&mut grammar, '(')?;
	let former_word = grammar.terminal(Word);
	grammar.set_assembler(former_word, assemble_former_name);
	let close = punctuation(&mut grammar, ')')?;
	let former_name = grammar.sequence([open, former_word, close])?;
	grammar.named(former_name, "formerName");
	let no_former_name = grammar.empty();
	let maybe_former_name = grammar.alternation([former_name, no_former_name])?;
	let name = grammar.sequence([name_word, maybe_former_name])?;
	grammar.named(name, "name");

	let roast_word = grammar.terminal(Word);
	grammar.set_assembler(roast_word, assemble_roast);
	let slash = punctuation(&mut grammar, '/')?;
	let french = grammar.terminal(CaselessLiteral::new("french"));
	let or_french = grammar.sequence([slash, french])?;
	grammar.named(or_french, "orFrench");
	grammar.set_assembler(or_french, assemble_french);
	let not_french = grammar.empty();
	let maybe_french = grammar.alternation([or_french, not_french])?;
	let roast = grammar.sequence([roast_word, maybe_french])?;
	grammar.named(roast, "roast");

	let country = grammar.terminal(Word);
	grammar.named(country, "country");
	grammar.set_assembler(country, assemble_country);

	let price = grammar.terminal(Num);
	grammar.named(price, "price");
	grammar.set_assembler(price, assemble_price);

	let mut coffee = vec![];
	for (index, field) in [name, roast, country, price].into_iter().enumerate() {
		if index > 0 {
			coffee.push(punctuation(&mut grammar, ',')?);
		}
		coffee.push(field);
	}
	let coffee = grammar.sequence(coffee)?;
	grammar.named(coffee, "coffee");

	Ok((grammar, coffee))
}

/// Coffee names and countries may contain spaces, such as `Launch Mi`.
pub fn tokenizer() -> LexOptions {
	LexOptions {
		word_spaces: true,
		..LexOptions::default()
	}
}

/// Recognizes one line with a grammar built by [grammar].
pub fn recognize(grammar: &Grammar<Token, Coffee>, start: ParserId, line: &str) -> anyhow::Result<Coffee> {
	let tokens = lex(line, &tokenizer()).with_context(|| format!("failed to lex {line:?}"))?;
	let assembly = Assembly::with_target(tokens, Coffee::default());
	let Some(mut matched) = grammar.complete_match(start, &assembly)? else {
		bail!("not a coffee: {line:?}");
	};
	matched.take_target().context("matched coffee lost its target")
}

/// Parses one line of the price list.
pub fn parse_line(line: &str) -> anyhow::Result<Coffee> {
	let (grammar, start) = grammar()?;
	recognize(&grammar, start, line)
}

#[test]
fn test_parse_fields() {
	let coffee = parse_line("Brimful, Regular, Kenya, 6.95").unwrap();
	assert_eq!(
		coffee,
		Coffee {
			name: "Brimful".into(),
			former_name: None,
			roast: "Regular".into(),
			also_offer_french: false,
			country: "Kenya".into(),
			price: 6.95,
		}
	);
	assert_eq!(coffee.to_string(), "Brimful, Regular, Kenya, 6.95");
}

#[test]
fn test_parse_optional_parts() {
	let coffee = parse_line("Launch Mi (Sumatra), French, Guatemala, 7.95").unwrap();
	assert_eq!(coffee.name, "Launch Mi");
	assert_eq!(coffee.former_name.as_deref(), Some("Sumatra"));
	assert_eq!(coffee.roast, "French");
	assert!(!coffee.also_offer_french);

	let coffee = parse_line("Kona, Regular/french, Hawaii, 12").unwrap();
	assert!(coffee.also_offer_french);
	assert_eq!(coffee.to_string(), "Kona, Regular/French, Hawaii, 12");

	assert!(parse_line("Brimful, Regular, Kenya").is_err());
	assert!(parse_line("Brimful, Regular, Kenya, cheap").is_err());
}

#[test]
fn test_field_sequence_sets_target() {
	let mut grammar = Grammar::<Token, Coffee>::new();
	let name = grammar.terminal(Word);
	grammar.set_assembler(name, assemble_name);
	let roast = grammar.terminal(Word);
	grammar.set_assembler(roast, assemble_roast);
	let country = grammar.terminal(Word);
	grammar.set_assembler(country, assemble_country);
	let price = grammar.terminal(Num);
	grammar.set_assembler(price, assemble_price);
	let mut fields = vec![name];
	for field in [roast, country, price] {
		fields.push(punctuation(&mut grammar, ',').unwrap());
		fields.push(field);
	}
	let line = grammar.sequence(fields).unwrap();

	let tokens = lex("Brimful, Regular, Kenya, 6.95", &LexOptions::default()).unwrap();
	assert_eq!(tokens.len(), 7);
	let assembly = Assembly::with_target(tokens, Coffee::default());
	let matched = grammar.complete_match(line, &assembly).unwrap().unwrap();
	assert!(matched.stack_is_empty());
	let coffee = matched.target().unwrap();
	assert_eq!(
		(coffee.name.as_str(), coffee.roast.as_str(), coffee.country.as_str(), coffee.price),
		("Brimful", "Regular", "Kenya", 6.95)
	);
}

#[test]
fn test_optional_suffix_fires_once() {
	use std::cell::Cell;
	use std::rc::Rc;

	let fired = Rc::new(Cell::new(0));
	let mut grammar = Grammar::<Token>::new();
	let word = grammar.terminal(Word);
	let slash = grammar.terminal(Symbol::new('/'));
	grammar.discard(slash).unwrap();
	let french = grammar.terminal(CaselessLiteral::new("french"));
	let suffix = grammar.sequence([slash, french]).unwrap();
	let counter = Rc::clone(&fired);
	grammar.set_assembler(suffix, move |_: &mut Assembly<Token>| -> Result<(), AssemblyError> {
		counter.set(counter.get() + 1);
		Ok(())
	});
	let empty = grammar.empty();
	let optional = grammar.alternation([suffix, empty]).unwrap();
	let roast = grammar.sequence([word, optional]).unwrap();

	let assembly = assemblage_tokens::assembly("Regular/French", &LexOptions::default()).unwrap();
	assert_eq!(assembly.len(), 3);
	assert!(grammar.complete_match(roast, &assembly).unwrap().is_some());
	assert_eq!(fired.get(), 1);

	fired.set(0);
	let assembly = assemblage_tokens::assembly("Regular", &LexOptions::default()).unwrap();
	assert!(grammar.complete_match(roast, &assembly).unwrap().is_some());
	assert_eq!(fired.get(), 0);
}

#[test]
fn test_print_grammar() {
	let (grammar, coffee) = grammar().unwrap();
	assert_eq!(
		grammar.describe(coffee),
		[
			"coffee = (name ',' roast ',' country ',' price);",
			"name = (Word (formerName | empty));",
			"roast = (Word (orFrench | empty));",
			"country = Word;",
			"price = Num;",
			"formerName = ('(' Word ')');",
			"orFrench = ('/' \"french\");",
		]
		.join("\n")
	);
}

#[test]
fn test_random_coffees_parse() {
	use rand::SeedableRng;
	use rand_xoshiro::Xoshiro256StarStar;

	let (grammar, coffee) = grammar().unwrap();
	let mut rng = Xoshiro256StarStar::seed_from_u64(7);
	for _ in 0 .. 30 {
		let line = grammar.random_input(coffee, 4, " ", &mut rng).unwrap();
		assert!(
			recognize(&grammar, coffee, &line).is_ok(),
			"generated {line:?} does not parse"
		);
	}
}
