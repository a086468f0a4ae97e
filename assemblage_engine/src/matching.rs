use std::slice;

use tracing::{debug, trace};

use crate::assembly::{Assembly, Duplicate, Element};
use crate::error::{EngineError, EngineResult};
use crate::grammar::{BoxedAssembler, Grammar, Kind, ParserId};
use crate::terminal::Terminal;

/// Limits applied while matching.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchOptions {
	/**
		Abort a repetition with [EngineError::RepetitionLimit] once it has
		applied its subparser this many times in one match. `None` disables
		the cap.

		With `require_progress` every round consumes an element, so a
		repetition already stops after at most one round per input element.
		The cap is meant for grammars matched without that guard.
	*/
	pub max_repetition_rounds: Option<usize>,
	/**
		Only keep repetition results that consumed at least one element more
		than the assembly they grew from. This stops a repetition over a
		subparser that can match nothing from looping forever.
	*/
	pub require_progress: bool,
}

impl Default for MatchOptions {
	fn default() -> Self {
		Self {
			max_repetition_rounds: None,
			require_progress: true,
		}
	}
}

impl<E: Element, T: Duplicate> Grammar<E, T> {
	/**
		Matches `id` against every assembly in `input`, returning every
		assembly that can result.

		For example, matching `a*` against `{^aaab}` yields
		`{^aaab, a^aab, aa^ab, aaa^b}`. No match is an empty set, not an error.
	*/
	pub fn match_set(&self, id: ParserId, input: &[Assembly<E, T>]) -> EngineResult<Vec<Assembly<E, T>>> {
		let out = match &self.node(id).kind {
			Kind::Terminal { terminal, discard } => {
				self.match_terminal(id, &**terminal, *discard, input)?
			},
			Kind::Sequence(subparsers) => self.match_sequence(id, subparsers, input)?,
			Kind::Alternation(subparsers) => {
				let mut out = vec![];
				for &subparser in subparsers {
					out.extend(self.match_and_assemble(subparser, input)?);
				}
				out
			},
			Kind::Repetition {
				subparser,
				pre_assembler,
			} => self.match_repetition(id, *subparser, pre_assembler.as_ref(), input)?,
			Kind::Empty => self.duplicate_all(id, input)?,
		};
		trace!(
			node = %self.label(id),
			input = input.len(),
			output = out.len(),
			"matched"
		);
		Ok(out)
	}

	/// Matches `id`, then runs its assembler on every resulting assembly.
	pub fn match_and_assemble(
		&self,
		id: ParserId,
		input: &[Assembly<E, T>],
	) -> EngineResult<Vec<Assembly<E, T>>> {
		let mut out = self.match_set(id, input)?;
		if let Some(assembler) = &self.node(id).assembler {
			for assembly in &mut out {
				assembler
					.work_on(assembly)
					.map_err(|source| EngineError::Assembler {
						node: self.label(id),
						source,
					})?;
			}
		}
		Ok(out)
	}

	/// The assembly with the most elements consumed after matching `id` against `assembly`.
	pub fn best_match(&self, id: ParserId, assembly: &Assembly<E, T>) -> EngineResult<Option<Assembly<E, T>>> {
		let out = self.match_and_assemble(id, slice::from_ref(assembly))?;
		let candidates = out.len();
		let best = best(out);
		debug!(
			node = %self.label(id),
			candidates,
			consumed = ?best.as_ref().map(Assembly::elements_consumed),
			"best match"
		);
		Ok(best)
	}

	/// The best match of `id` against `assembly`, if it consumed all of the input.
	pub fn complete_match(
		&self,
		id: ParserId,
		assembly: &Assembly<E, T>,
	) -> EngineResult<Option<Assembly<E, T>>> {
		let best = self.best_match(id, assembly)?;
		Ok(best.filter(|assembly| !assembly.has_more_elements()))
	}

	fn match_terminal(
		&self,
		id: ParserId,
		terminal: &dyn Terminal<E>,
		discard: bool,
		input: &[Assembly<E, T>],
	) -> EngineResult<Vec<Assembly<E, T>>> {
		let mut out = vec![];
		for assembly in input {
			let Some(next) = assembly.peek() else { continue };
			if !terminal.qualifies(next) {
				continue;
			}
			let mut advanced = self.duplicate(id, assembly)?;
			if let Some(element) = advanced.next_element() {
				if !discard {
					advanced.push_element(element);
				}
			}
			out.push(advanced);
		}
		Ok(out)
	}

	fn match_sequence(
		&self,
		id: ParserId,
		subparsers: &[ParserId],
		input: &[Assembly<E, T>],
	) -> EngineResult<Vec<Assembly<E, T>>> {
		let Some((&first, rest)) = subparsers.split_first() else {
			return self.duplicate_all(id, input);
		};
		let mut out = self.match_and_assemble(first, input)?;
		for &subparser in rest {
			if out.is_empty() {
				break;
			}
			out = self.match_and_assemble(subparser, &out)?;
		}
		Ok(out)
	}

	fn match_repetition(
		&self,
		id: ParserId,
		subparser: ParserId,
		pre_assembler: Option<&BoxedAssembler<E, T>>,
		input: &[Assembly<E, T>],
	) -> EngineResult<Vec<Assembly<E, T>>> {
		let primed = match pre_assembler {
			Some(pre_assembler) => Some(self.prime(id, pre_assembler, input)?),
			None => None,
		};
		let input = primed.as_deref().unwrap_or(input);

		// zero repetitions always match; each round works on the previous round's tail
		let mut out = self.duplicate_all(id, input)?;
		let mut round_start = 0;
		let mut rounds = 0;
		while round_start < out.len() {
			if let Some(limit) = self.options.max_repetition_rounds {
				if rounds >= limit {
					return Err(EngineError::RepetitionLimit {
						node: self.label(id),
						limit,
					});
				}
			}
			rounds += 1;

			let next = self.repeat_once(id, subparser, &out[round_start ..])?;
			round_start = out.len();
			out.extend(next);
		}
		Ok(out)
	}

	fn prime(
		&self,
		id: ParserId,
		pre_assembler: &BoxedAssembler<E, T>,
		input: &[Assembly<E, T>],
	) -> EngineResult<Vec<Assembly<E, T>>> {
		let mut primed = self.duplicate_all(id, input)?;
		for assembly in &mut primed {
			pre_assembler
				.work_on(assembly)
				.map_err(|source| EngineError::PreAssembler {
					node: self.label(id),
					source,
				})?;
		}
		Ok(primed)
	}

	fn repeat_once(
		&self,
		id: ParserId,
		subparser: ParserId,
		working: &[Assembly<E, T>],
	) -> EngineResult<Vec<Assembly<E, T>>> {
		if !self.options.require_progress {
			return self.match_and_assemble(subparser, working);
		}

		let mut next = vec![];
		let mut stalled = 0;
		for assembly in working {
			let floor = assembly.elements_consumed();
			for grown in self.match_and_assemble(subparser, slice::from_ref(assembly))? {
				if grown.elements_consumed() > floor {
					next.push(grown);
				} else {
					stalled += 1;
				}
			}
		}
		if stalled > 0 {
			debug!(node = %self.label(id), stalled, "dropped repetitions that consumed nothing");
		}
		Ok(next)
	}

	fn duplicate(&self, id: ParserId, assembly: &Assembly<E, T>) -> EngineResult<Assembly<E, T>> {
		assembly.duplicate().map_err(|source| EngineError::Duplication {
			node: self.label(id),
			source,
		})
	}

	fn duplicate_all(&self, id: ParserId, input: &[Assembly<E, T>]) -> EngineResult<Vec<Assembly<E, T>>> {
		input
			.iter()
			.map(|assembly| self.duplicate(id, assembly))
			.collect()
	}
}

/**
	Picks the most-matched assembly of a set.

	The first assembly with nothing left to consume wins outright. Otherwise
	the assembly that consumed the most elements wins, the earliest one on a
	tie.
*/
pub fn best<E: Element, T>(assemblies: Vec<Assembly<E, T>>) -> Option<Assembly<E, T>> {
	let mut best: Option<Assembly<E, T>> = None;
	for assembly in assemblies {
		if !assembly.has_more_elements() {
			return Some(assembly);
		}
		let better = match &best {
			Some(current) => assembly.elements_consumed() > current.elements_consumed(),
			None => true,
		};
		if better {
			best = Some(assembly);
		}
	}
	best
}

#[cfg(test)]
fn cursors<E: Element, T>(assemblies: &[Assembly<E, T>]) -> Vec<usize> {
	assemblies.iter().map(Assembly::elements_consumed).collect()
}

#[test]
fn test_repetition_of_terminal() {
	use crate::terminal::Exact;

	let mut grammar = Grammar::<char>::new();
	let a = grammar.terminal(Exact('a'));
	let star = grammar.repetition(a).unwrap();

	let input = Assembly::characters("aaab");
	let out = grammar.match_set(star, slice::from_ref(&input)).unwrap();
	assert_eq!(cursors(&out), vec![0, 1, 2, 3]);
	let shown: Vec<String> = out.iter().map(|a| format!("{}^{}", a.consumed(""), a.remainder(""))).collect();
	assert_eq!(shown, vec!["^aaab", "a^aab", "aa^ab", "aaa^b"]);

	let best = grammar.best_match(star, &input).unwrap().unwrap();
	assert_eq!(best.elements_consumed(), 3);
	assert_eq!(best.to_string(), "[a, a, a]aaa^b");
	assert!(grammar.complete_match(star, &input).unwrap().is_none());

	let all_a = Assembly::characters("aaa");
	let complete = grammar.complete_match(star, &all_a).unwrap().unwrap();
	assert_eq!(complete.elements_remaining(), 0);
}

#[test]
fn test_repetition_includes_zero_case() {
	use crate::terminal::Exact;

	let mut grammar = Grammar::<char>::new();
	let z = grammar.terminal(Exact('z'));
	let star = grammar.repetition(z).unwrap();

	let input = Assembly::characters("abc");
	let out = grammar.match_set(star, slice::from_ref(&input)).unwrap();
	assert_eq!(cursors(&out), vec![0]);
}

#[test]
fn test_alternation_is_a_union() {
	use crate::terminal::{Exact, Letter};

	let mut grammar = Grammar::<char>::new();
	let a = grammar.terminal(Exact('a'));
	let letter = grammar.terminal(Letter);
	let digit = grammar.terminal(crate::terminal::Digit);
	let either = grammar.alternation([a, letter, digit]).unwrap();

	let input = Assembly::characters("ab");
	let out = grammar.match_set(either, slice::from_ref(&input)).unwrap();
	assert_eq!(cursors(&out), vec![1, 1]);

	// both branches continue independently through a sequence
	let b = grammar.terminal(Exact('b'));
	let seq = grammar.sequence([either, b]).unwrap();
	let out = grammar.match_set(seq, slice::from_ref(&input)).unwrap();
	assert_eq!(cursors(&out), vec![2, 2]);
}

#[test]
fn test_sequence_isolates_assemblies() {
	use crate::assembly::Value;
	use crate::terminal::Exact;

	let mut grammar = Grammar::<char, Vec<String>>::new();
	let a = grammar.terminal(Exact('a'));
	grammar.set_assembler(a, |assembly: &mut Assembly<char, Vec<String>>| {
		let seen = assembly.pop_element()?;
		assembly.require_target()?.push(seen.to_string());
		Ok(())
	});
	let b = grammar.terminal(Exact('b'));
	let seq = grammar.sequence([a, b]).unwrap();

	let first = Assembly::with_target(vec!['a', 'b'], vec!["first".to_string()]);
	let mut second = Assembly::with_target(vec!['a', 'b'], vec!["second".to_string()]);
	second.push("marker");
	let input = vec![first, second];

	let out = grammar.match_set(seq, &input).unwrap();
	assert_eq!(out.len(), 2);
	assert_eq!(out[0].target().unwrap(), &vec!["first".to_string(), "a".to_string()]);
	assert_eq!(out[1].target().unwrap(), &vec!["second".to_string(), "a".to_string()]);
	assert_eq!(out[0].stack(), &[Value::Element('b')]);
	assert_eq!(out[1].stack(), &[Value::Text("marker".into()), Value::Element('b')]);

	// the input set is untouched
	assert_eq!(input[0].target().unwrap().len(), 1);
	assert_eq!(input[0].elements_consumed(), 0);
	assert_eq!(input[1].stack().len(), 1);
}

#[test]
fn test_sequence_dead_end() {
	use crate::terminal::Exact;

	let mut grammar = Grammar::<char>::new();
	let a = grammar.terminal(Exact('a'));
	let b = grammar.terminal(Exact('b'));
	let seq = grammar.sequence([b, a]).unwrap();
	let input = Assembly::characters("ab");
	assert!(grammar.match_set(seq, slice::from_ref(&input)).unwrap().is_empty());
	assert!(grammar.best_match(seq, &input).unwrap().is_none());
}

#[test]
fn test_empty_and_empty_sequence() {
	let mut grammar = Grammar::<char>::new();
	let empty = grammar.empty();
	let nothing = grammar.sequence([]).unwrap();
	let input = Assembly::characters("xy");
	assert_eq!(cursors(&grammar.match_set(empty, slice::from_ref(&input)).unwrap()), vec![0]);
	assert_eq!(cursors(&grammar.match_set(nothing, slice::from_ref(&input)).unwrap()), vec![0]);
}

#[test]
fn test_best_prefers_complete_then_longest() {
	let mut grammar = Grammar::<char>::new();
	let empty = grammar.empty();
	let base = Assembly::characters("abc");
	let mut assemblies = vec![];
	for (index, consumed) in [1, 2, 2, 0].into_iter().enumerate() {
		let mut assembly = grammar.match_set(empty, slice::from_ref(&base)).unwrap().remove(0);
		for _ in 0 .. consumed {
			assembly.next_element();
		}
		assembly.push(index as f64);
		assemblies.push(assembly);
	}
	let chosen = best(assemblies).unwrap();
	assert_eq!(chosen.elements_consumed(), 2);
	assert_eq!(chosen.stack(), &[crate::Value::Number(1.0)]);

	let mut done: Assembly<char> = Assembly::characters("a");
	done.next_element();
	let partial: Assembly<char> = Assembly::characters("ab");
	let chosen = best(vec![partial, done]).unwrap();
	assert_eq!(chosen.elements_remaining(), 0);

	assert!(best::<char, ()>(vec![]).is_none());
}

#[test]
fn test_discard_and_assembler_order() {
	use crate::terminal::Exact;

	let mut grammar = Grammar::<char>::new();
	let open = grammar.terminal(Exact('('));
	grammar.discard(open).unwrap();
	let x = grammar.terminal(Exact('x'));
	let close = grammar.terminal(Exact(')'));
	grammar.discard(close).unwrap();
	let group = grammar.sequence([open, x, close]).unwrap();
	grammar.set_assembler(group, |assembly: &mut Assembly<char>| {
		let inner = assembly.pop_element()?;
		assembly.push(format!("group({inner})"));
		Ok(())
	});

	let out = grammar
		.complete_match(group, &Assembly::characters("(x)"))
		.unwrap()
		.unwrap();
	assert_eq!(out.stack(), &[crate::Value::Text("group(x)".into())]);
}

#[test]
fn test_assembler_failure_names_node() {
	use crate::error::AssemblyError;
	use crate::terminal::Exact;

	let mut grammar = Grammar::<char>::new();
	let a = grammar.terminal(Exact('a'));
	grammar.discard(a).unwrap();
	grammar.named(a, "quiet-a");
	grammar.set_assembler(a, crate::assembler::Pop);

	let err = grammar.best_match(a, &Assembly::characters("a")).unwrap_err();
	match err {
		EngineError::Assembler { node, source } => {
			assert_eq!(node, "quiet-a");
			assert!(matches!(source, AssemblyError::StackUnderflow));
		},
		other => panic!("unexpected error {other:?}"),
	}
}

#[test]
fn test_nullable_repetition_terminates() {
	use crate::terminal::Exact;

	let mut grammar = Grammar::<char>::new();
	let a = grammar.terminal(Exact('a'));
	let empty = grammar.empty();
	let maybe_a = grammar.alternation([a, empty]).unwrap();
	let star = grammar.repetition(maybe_a).unwrap();

	let input = Assembly::characters("aab");
	let out = grammar.match_set(star, slice::from_ref(&input)).unwrap();
	assert_eq!(cursors(&out), vec![0, 1, 2]);

	// without the progress guard the round cap catches the loop
	grammar.set_options(MatchOptions {
		max_repetition_rounds: Some(8),
		require_progress: false,
	});
	let err = grammar.match_set(star, slice::from_ref(&input)).unwrap_err();
	assert!(matches!(err, EngineError::RepetitionLimit { limit: 8, .. }));
}

#[test]
fn test_pre_assembler_runs_once_per_input() {
	use crate::assembler::{Collect, Fence};
	use crate::terminal::Letter;

	let mut grammar = Grammar::<char>::new();
	let letter = grammar.terminal(Letter);
	let letters = grammar.repetition(letter).unwrap();
	grammar.set_pre_assembler(letters, Fence::new("{")).unwrap();
	grammar.set_assembler(letters, Collect::new("{"));

	let out = grammar
		.complete_match(letters, &Assembly::characters("ab"))
		.unwrap()
		.unwrap();
	assert_eq!(
		out.stack(),
		&[crate::Value::List(vec![
			crate::Value::Element('a'),
			crate::Value::Element('b'),
		])]
	);
}

#[test]
fn test_long_repetition_completes() {
	use crate::terminal::Exact;

	let mut grammar = Grammar::<char>::new();
	let a = grammar.terminal(Exact('a'));
	grammar.discard(a).unwrap();
	let star = grammar.repetition(a).unwrap();

	let input = Assembly::characters(&"a".repeat(20_000));
	let out = grammar.complete_match(star, &input).unwrap().unwrap();
	assert_eq!(out.elements_consumed(), 20_000);
}

#[test]
fn test_duplication_failure_names_node() {
	use crate::error::AssemblyError;
	use crate::terminal::Exact;

	#[derive(Debug)]
	struct Handle;

	impl Duplicate for Handle {
		fn duplicate(&self) -> Result<Self, AssemblyError> {
			Err(AssemblyError::Duplication {
				what: "handle",
				reason: "handles are unique".into(),
			})
		}
	}

	let mut grammar = Grammar::<char, Handle>::new();
	let a = grammar.terminal(Exact('a'));
	grammar.named(a, "handle-a");

	let input = Assembly::with_target(vec!['a'], Handle);
	match grammar.best_match(a, &input).unwrap_err() {
		EngineError::Duplication { node, source } => {
			assert_eq!(node, "handle-a");
			assert!(matches!(source, AssemblyError::Duplication { what: "handle", .. }));
		},
		other => panic!("unexpected error {other:?}"),
	}

	// a terminal that does not qualify never clones, so there is nothing to fail
	let b = grammar.terminal(Exact('b'));
	assert!(grammar.match_set(b, slice::from_ref(&input)).unwrap().is_empty());
}

#[test]
fn test_pre_assembler_failure_names_node() {
	use crate::error::AssemblyError;
	use crate::terminal::Letter;

	let mut grammar = Grammar::<char>::new();
	let letter = grammar.terminal(Letter);
	let letters = grammar.repetition(letter).unwrap();
	grammar.named(letters, "letters");
	grammar.set_pre_assembler(letters, crate::assembler::Pop).unwrap();

	match grammar.best_match(letters, &Assembly::characters("ab")).unwrap_err() {
		EngineError::PreAssembler { node, source } => {
			assert_eq!(node, "letters");
			assert!(matches!(source, AssemblyError::StackUnderflow));
		},
		other => panic!("unexpected error {other:?}"),
	}
}
