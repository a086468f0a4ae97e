use rand::{Rng, RngCore};

use crate::error::{EngineError, EngineResult};
use crate::grammar::{Grammar, Kind, ParserId};

/// Shape of random expansions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpansionOptions {
	/// A repetition expands its subparser fewer than this many times.
	pub width: usize,
	/**
		Hard cap on expansion depth. Past `max_depth` alternations settle on
		leaves and repetitions stop, so only a grammar that recurses without
		any way out can reach this cap.
	*/
	pub depth_limit: usize,
}

impl Default for ExpansionOptions {
	fn default() -> Self {
		Self {
			width: 4,
			depth_limit: 256,
		}
	}
}

impl<E, T> Grammar<E, T> {
	/**
		Generates a random element of the language `id` recognizes, joining
		the generated elements with `separator`.

		This is a fuzzing aid, not a uniform sampler. Beyond `max_depth` the
		expansion steers towards terminals so recursive grammars finish.
	*/
	pub fn random_input<R: RngCore>(
		&self,
		id: ParserId,
		max_depth: usize,
		separator: &str,
		rng: &mut R,
	) -> EngineResult<String> {
		self.random_input_with(id, max_depth, separator, &ExpansionOptions::default(), rng)
	}

	pub fn random_input_with<R: RngCore>(
		&self,
		id: ParserId,
		max_depth: usize,
		separator: &str,
		options: &ExpansionOptions,
		rng: &mut R,
	) -> EngineResult<String> {
		Ok(self.random_expansion(id, max_depth, options, rng)?.join(separator))
	}

	/// The elements of one random expansion of `id`, as text.
	pub fn random_expansion<R: RngCore>(
		&self,
		id: ParserId,
		max_depth: usize,
		options: &ExpansionOptions,
		rng: &mut R,
	) -> EngineResult<Vec<String>> {
		let mut out = vec![];
		self.expand(id, max_depth, 0, options, rng, &mut out)?;
		Ok(out)
	}

	fn expand(
		&self,
		id: ParserId,
		max_depth: usize,
		depth: usize,
		options: &ExpansionOptions,
		rng: &mut dyn RngCore,
		out: &mut Vec<String>,
	) -> EngineResult<()> {
		if depth > options.depth_limit {
			return Err(EngineError::ExpansionDepth {
				node: self.label(id),
				limit: options.depth_limit,
			});
		}

		match &self.node(id).kind {
			Kind::Terminal { terminal, .. } => out.push(terminal.random_element(rng)),
			Kind::Sequence(subparsers) => {
				for &subparser in subparsers {
					self.expand(subparser, max_depth, depth + 1, options, rng, out)?;
				}
			},
			Kind::Alternation(subparsers) => {
				let choice = if depth >= max_depth {
					self.settle(subparsers, rng)
				} else {
					pick(subparsers, rng)
				};
				if let Some(choice) = choice {
					self.expand(choice, max_depth, depth + 1, options, rng, out)?;
				}
			},
			&Kind::Repetition { subparser, .. } => {
				if depth >= max_depth || options.width == 0 {
					return Ok(());
				}
				let count = rng.gen_range(0 .. options.width);
				for _ in 0 .. count {
					self.expand(subparser, max_depth, depth + 1, options, rng, out)?;
				}
			},
			Kind::Empty => {},
		}
		Ok(())
	}

	/// Picks a leaf alternative if there is one, so expansion can bottom out.
	fn settle(&self, subparsers: &[ParserId], rng: &mut dyn RngCore) -> Option<ParserId> {
		let leaves: Vec<ParserId> = subparsers
			.iter()
			.copied()
			.filter(|&id| matches!(self.node(id).kind, Kind::Terminal { .. } | Kind::Empty))
			.collect();
		if leaves.is_empty() {
			pick(subparsers, rng)
		} else {
			pick(&leaves, rng)
		}
	}
}

fn pick(choices: &[ParserId], rng: &mut dyn RngCore) -> Option<ParserId> {
	if choices.is_empty() {
		return None;
	}
	Some(choices[rng.gen_range(0 .. choices.len())])
}

#[cfg(test)]
fn seeded(seed: u64) -> rand_xoshiro::Xoshiro256StarStar {
	use rand::SeedableRng;
	rand_xoshiro::Xoshiro256StarStar::seed_from_u64(seed)
}

#[test]
fn test_generated_inputs_match() {
	use crate::assembly::Assembly;
	use crate::terminal::{Exact, Letter};

	// list = Letter (',' list | empty)
	let mut grammar = Grammar::<char>::new();
	let list = grammar.sequence([]).unwrap();
	let letter = grammar.terminal(Letter);
	let comma = grammar.terminal(Exact(','));
	let more = grammar.sequence([comma, list]).unwrap();
	let empty = grammar.empty();
	let tail = grammar.alternation([more, empty]).unwrap();
	grammar.add(list, letter).unwrap();
	grammar.add(list, tail).unwrap();

	for seed in 0 .. 50 {
		let input = grammar.random_input(list, 6, "", &mut seeded(seed)).unwrap();
		let assembly = Assembly::characters(&input);
		assert!(
			grammar.complete_match(list, &assembly).unwrap().is_some(),
			"generated {input:?} does not match"
		);
	}
}

#[test]
fn test_same_seed_same_input() {
	use crate::terminal::Letter;

	let mut grammar = Grammar::<char>::new();
	let letter = grammar.terminal(Letter);
	let word = grammar.repetition(letter).unwrap();
	let first = grammar.random_input(word, 4, " ", &mut seeded(42)).unwrap();
	let second = grammar.random_input(word, 4, " ", &mut seeded(42)).unwrap();
	assert_eq!(first, second);
	assert!(first.split(' ').filter(|s| !s.is_empty()).count() < 4);
}

#[test]
fn test_depth_bounds() {
	use crate::terminal::Exact;

	let mut grammar = Grammar::<char>::new();
	let x = grammar.terminal(Exact('x'));
	let star = grammar.repetition(x).unwrap();
	for seed in 0 .. 10 {
		let expansion = grammar
			.random_expansion(star, 0, &ExpansionOptions::default(), &mut seeded(seed))
			.unwrap();
		assert!(expansion.is_empty());
	}

	// endless = 'x' endless, which has no way out
	let endless = grammar.sequence([x]).unwrap();
	grammar.named(endless, "endless");
	grammar.add(endless, endless).unwrap();
	let options = ExpansionOptions {
		width: 4,
		depth_limit: 16,
	};
	let err = grammar
		.random_expansion(endless, 3, &options, &mut seeded(0))
		.unwrap_err();
	assert!(matches!(err, EngineError::ExpansionDepth { limit: 16, .. }));
}
