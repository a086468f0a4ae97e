use std::collections::{HashSet, VecDeque};

use crate::grammar::{Grammar, Kind, ParserId};

/// The nodes a walk has already reached.
pub type Visited = HashSet<ParserId>;

/**
	An operation over the nodes of a [Grammar], one method per kind of node.

	Grammars may be cyclic, so each method receives the set of nodes visited
	so far. A visitor that descends into sub-nodes must consult and update it,
	or it will never finish on a recursive grammar.
*/
pub trait ParserVisitor<E, T> {
	fn visit_terminal(&mut self, grammar: &Grammar<E, T>, id: ParserId, visited: &mut Visited);
	fn visit_sequence(&mut self, grammar: &Grammar<E, T>, id: ParserId, visited: &mut Visited);
	fn visit_alternation(&mut self, grammar: &Grammar<E, T>, id: ParserId, visited: &mut Visited);
	fn visit_repetition(&mut self, grammar: &Grammar<E, T>, id: ParserId, visited: &mut Visited);
	fn visit_empty(&mut self, grammar: &Grammar<E, T>, id: ParserId, visited: &mut Visited);
}

impl<E, T> Grammar<E, T> {
	/// Dispatches `visitor` on `id` with a fresh visited set.
	pub fn accept<V: ParserVisitor<E, T> + ?Sized>(&self, id: ParserId, visitor: &mut V) {
		self.accept_with(id, visitor, &mut Visited::new());
	}

	/// Dispatches `visitor` on `id`, continuing an existing walk.
	pub fn accept_with<V: ParserVisitor<E, T> + ?Sized>(
		&self,
		id: ParserId,
		visitor: &mut V,
		visited: &mut Visited,
	) {
		match self.node(id).kind {
			Kind::Terminal { .. } => visitor.visit_terminal(self, id, visited),
			Kind::Sequence(_) => visitor.visit_sequence(self, id, visited),
			Kind::Alternation(_) => visitor.visit_alternation(self, id, visited),
			Kind::Repetition { .. } => visitor.visit_repetition(self, id, visited),
			Kind::Empty => visitor.visit_empty(self, id, visited),
		}
	}

	/// A terminal's description, `None` for any other kind of node.
	pub fn terminal_description(&self, id: ParserId) -> Option<String> {
		match &self.node(id).kind {
			Kind::Terminal { terminal, .. } => Some(terminal.describe()),
			_ => None,
		}
	}

	/// Renders `id` and every named node it reaches, see [GrammarPrinter].
	pub fn describe(&self, id: ParserId) -> String {
		GrammarPrinter::print(self, id)
	}
}

/**
	Renders a grammar as text, one rule per named node.

	Sequences print as `(a b)`, alternations as `(a | b)`, repetitions as
	`a*` and the empty parser as `empty`. A named node is printed by name and
	its body is given once as its own `name = body;` rule. An unnamed node
	reached a second time prints as `...`.
*/
#[derive(Debug, Default)]
pub struct GrammarPrinter {
	current: String,
	pending: VecDeque<ParserId>,
}

impl GrammarPrinter {
	pub fn print<E, T>(grammar: &Grammar<E, T>, id: ParserId) -> String {
		let mut printer = Self::default();
		let mut visited = Visited::new();
		visited.insert(id);

		let mut lines = vec![];
		let mut rule = Some(id);
		while let Some(id) = rule {
			printer.current.clear();
			grammar.accept_with(id, &mut printer, &mut visited);
			lines.push(match grammar.name(id) {
				Some(name) => format!("{name} = {};", printer.current),
				None => printer.current.clone(),
			});
			rule = printer.pending.pop_front();
		}
		lines.join("\n")
	}

	fn child<E, T>(&mut self, grammar: &Grammar<E, T>, id: ParserId, visited: &mut Visited) {
		match grammar.name(id) {
			Some(name) => {
				self.current.push_str(name);
				if visited.insert(id) {
					self.pending.push_back(id);
				}
			},
			// leaves can't recurse, so shared ones print in full
			None if grammar.subparsers(id).is_empty() => grammar.accept_with(id, self, visited),
			None if !visited.insert(id) => self.current.push_str("..."),
			None => grammar.accept_with(id, self, visited),
		}
	}

	fn children<E, T>(
		&mut self,
		grammar: &Grammar<E, T>,
		id: ParserId,
		separator: &str,
		visited: &mut Visited,
	) {
		self.current.push('(');
		for (index, child) in grammar.subparsers(id).into_iter().enumerate() {
			if index > 0 {
				self.current.push_str(separator);
			}
			self.child(grammar, child, visited);
		}
		self.current.push(')');
	}
}

impl<E, T> ParserVisitor<E, T> for GrammarPrinter {
	fn visit_terminal(&mut self, grammar: &Grammar<E, T>, id: ParserId, _visited: &mut Visited) {
		if let Some(description) = grammar.terminal_description(id) {
			self.current.push_str(&description);
		}
	}

	fn visit_sequence(&mut self, grammar: &Grammar<E, T>, id: ParserId, visited: &mut Visited) {
		self.children(grammar, id, " ", visited);
	}

	fn visit_alternation(&mut self, grammar: &Grammar<E, T>, id: ParserId, visited: &mut Visited) {
		self.children(grammar, id, " | ", visited);
	}

	fn visit_repetition(&mut self, grammar: &Grammar<E, T>, id: ParserId, visited: &mut Visited) {
		for child in grammar.subparsers(id) {
			self.child(grammar, child, visited);
		}
		self.current.push('*');
	}

	fn visit_empty(&mut self, _grammar: &Grammar<E, T>, _id: ParserId, _visited: &mut Visited) {
		self.current.push_str("empty");
	}
}

/// Counts the distinct nodes reachable from where it is accepted, by kind.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeCounter {
	pub terminals: usize,
	pub sequences: usize,
	pub alternations: usize,
	pub repetitions: usize,
	pub empties: usize,
}

impl NodeCounter {
	pub fn total(&self) -> usize {
		self.terminals + self.sequences + self.alternations + self.repetitions + self.empties
	}

	fn descend<E, T>(&mut self, grammar: &Grammar<E, T>, id: ParserId, visited: &mut Visited) {
		for child in grammar.subparsers(id) {
			if !visited.contains(&child) {
				grammar.accept_with(child, self, visited);
			}
		}
	}
}

impl<E, T> ParserVisitor<E, T> for NodeCounter {
	fn visit_terminal(&mut self, _grammar: &Grammar<E, T>, id: ParserId, visited: &mut Visited) {
		if visited.insert(id) {
			self.terminals += 1;
		}
	}

	fn visit_sequence(&mut self, grammar: &Grammar<E, T>, id: ParserId, visited: &mut Visited) {
		if visited.insert(id) {
			self.sequences += 1;
			self.descend(grammar, id, visited);
		}
	}

	fn visit_alternation(&mut self, grammar: &Grammar<E, T>, id: ParserId, visited: &mut Visited) {
		if visited.insert(id) {
			self.alternations += 1;
			self.descend(grammar, id, visited);
		}
	}

	fn visit_repetition(&mut self, grammar: &Grammar<E, T>, id: ParserId, visited: &mut Visited) {
		if visited.insert(id) {
			self.repetitions += 1;
			self.descend(grammar, id, visited);
		}
	}

	fn visit_empty(&mut self, _grammar: &Grammar<E, T>, id: ParserId, visited: &mut Visited) {
		if visited.insert(id) {
			self.empties += 1;
		}
	}
}

#[cfg(test)]
fn list_grammar(named: bool) -> (Grammar<char>, ParserId) {
	use crate::terminal::{Exact, Letter};

	// list = Letter (',' list | empty)
	let mut grammar = Grammar::<char>::new();
	let list = grammar.sequence([]).unwrap();
	if named {
		grammar.named(list, "list");
	}
	let letter = grammar.terminal(Letter);
	let comma = grammar.terminal(Exact(','));
	let more = grammar.sequence([comma, list]).unwrap();
	let empty = grammar.empty();
	let tail = grammar.alternation([more, empty]).unwrap();
	grammar.add(list, letter).unwrap();
	grammar.add(list, tail).unwrap();
	(grammar, list)
}

#[test]
fn test_print_recursive_grammar() {
	let (grammar, list) = list_grammar(false);
	assert_eq!(grammar.describe(list), "(Letter ((',' ...) | empty))");

	let (grammar, list) = list_grammar(true);
	assert_eq!(grammar.describe(list), "list = (Letter ((',' list) | empty));");
}

#[test]
fn test_print_named_rules_once() {
	use crate::terminal::{Digit, Exact};

	let mut grammar = Grammar::<char>::new();
	let digit = grammar.terminal(Digit);
	let digits = grammar.repetition(digit).unwrap();
	grammar.named(digits, "digits");
	let dot = grammar.terminal(Exact('.'));
	let number = grammar.sequence([digits, dot, digits]).unwrap();
	grammar.named(number, "number");
	let star = grammar.repetition(number).unwrap();

	assert_eq!(
		grammar.describe(star),
		"number*\nnumber = (digits '.' digits);\ndigits = Digit*;"
	);
}

#[test]
fn test_count_nodes() {
	let (grammar, list) = list_grammar(false);
	let mut counter = NodeCounter::default();
	grammar.accept(list, &mut counter);
	assert_eq!(
		counter,
		NodeCounter {
			terminals: 2,
			sequences: 2,
			alternations: 1,
			repetitions: 0,
			empties: 1,
		}
	);
	assert_eq!(counter.total(), grammar.len());
}
