use std::fmt;
use std::sync::Arc;

use crate::error::AssemblyError;

/// An item an [Assembly] can be built over.
pub trait Element: Clone + fmt::Debug + fmt::Display + 'static {
	/// Text shown between elements when an assembly is displayed.
	const DELIMITER: &'static str = "/";
}

impl Element for char {
	const DELIMITER: &'static str = "";
}

/**
	An explicit deep copy, required of every target an [Assembly] carries.

	Each branch of a match owns its own target, so a target must be able to
	produce an independent copy of itself. Failing to do so aborts the match.
*/
pub trait Duplicate: Sized {
	fn duplicate(&self) -> Result<Self, AssemblyError>;
}

impl Duplicate for () {
	fn duplicate(&self) -> Result<Self, AssemblyError> {
		Ok(())
	}
}

impl<T: Duplicate> Duplicate for Option<T> {
	fn duplicate(&self) -> Result<Self, AssemblyError> {
		self.as_ref().map(Duplicate::duplicate).transpose()
	}
}

impl<T: Duplicate> Duplicate for Vec<T> {
	fn duplicate(&self) -> Result<Self, AssemblyError> {
		self.iter().map(Duplicate::duplicate).collect()
	}
}

/// Implements [Duplicate] for types whose `Clone` is already a deep copy.
#[macro_export]
macro_rules! duplicate_by_clone {
	($($ty:ty),* $(,)?) => {
		$(
			impl $crate::Duplicate for $ty {
				fn duplicate(&self) -> ::std::result::Result<Self, $crate::AssemblyError> {
					Ok(::std::clone::Clone::clone(self))
				}
			}
		)*
	};
}

duplicate_by_clone!(String, bool, char, i32, i64, u32, u64, usize, f32, f64);

/// A value on an assembly's working stack.
#[derive(Clone, Debug, PartialEq)]
pub enum Value<E> {
	Element(E),
	Text(String),
	Number(f64),
	Flag(bool),
	List(Vec<Value<E>>),
}

impl<E> Value<E> {
	pub fn kind(&self) -> &'static str {
		match self {
			Self::Element(_) => "element",
			Self::Text(_) => "text",
			Self::Number(_) => "number",
			Self::Flag(_) => "flag",
			Self::List(_) => "list",
		}
	}
}

impl<E: fmt::Display> Value<E> {
	pub fn into_element(self) -> Result<E, AssemblyError> {
		match self {
			Self::Element(element) => Ok(element),
			other => Err(other.unexpected("element")),
		}
	}

	pub fn into_text(self) -> Result<String, AssemblyError> {
		match self {
			Self::Text(text) => Ok(text),
			other => Err(other.unexpected("text")),
		}
	}

	pub fn into_number(self) -> Result<f64, AssemblyError> {
		match self {
			Self::Number(number) => Ok(number),
			other => Err(other.unexpected("number")),
		}
	}

	pub fn into_flag(self) -> Result<bool, AssemblyError> {
		match self {
			Self::Flag(flag) => Ok(flag),
			other => Err(other.unexpected("flag")),
		}
	}

	pub fn into_list(self) -> Result<Vec<Value<E>>, AssemblyError> {
		match self {
			Self::List(list) => Ok(list),
			other => Err(other.unexpected("list")),
		}
	}

	fn unexpected(&self, expected: &'static str) -> AssemblyError {
		AssemblyError::UnexpectedValue {
			expected,
			found: format!("{} {self}", self.kind()),
		}
	}
}

impl<E: fmt::Display> fmt::Display for Value<E> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Element(element) => element.fmt(f),
			Self::Text(text) => text.fmt(f),
			Self::Number(number) => number.fmt(f),
			Self::Flag(flag) => flag.fmt(f),
			Self::List(list) => {
				f.write_str("[")?;
				for (index, value) in list.iter().enumerate() {
					if index > 0 {
						f.write_str(", ")?;
					}
					value.fmt(f)?;
				}
				f.write_str("]")
			},
		}
	}
}

impl<E> From<String> for Value<E> {
	fn from(text: String) -> Self {
		Self::Text(text)
	}
}

impl<E> From<&str> for Value<E> {
	fn from(text: &str) -> Self {
		Self::Text(text.to_string())
	}
}

impl<E> From<f64> for Value<E> {
	fn from(number: f64) -> Self {
		Self::Number(number)
	}
}

impl<E> From<bool> for Value<E> {
	fn from(flag: bool) -> Self {
		Self::Flag(flag)
	}
}

impl<E> From<Vec<Value<E>>> for Value<E> {
	fn from(list: Vec<Value<E>>) -> Self {
		Self::List(list)
	}
}

/**
	One candidate parse state over a fixed input: how far matching got, a
	working stack for assemblers, and an optional target object.

	The input elements are shared between every assembly derived from the same
	input and are never mutated. The stack and target belong to this assembly
	alone; [Assembly::duplicate] copies both.
*/
#[derive(Debug)]
pub struct Assembly<E, T = ()> {
	elements: Arc<[E]>,
	index: usize,
	stack: Vec<Value<E>>,
	target: Option<T>,
}

impl<E: Element, T> Assembly<E, T> {
	pub fn new(elements: impl Into<Arc<[E]>>) -> Self {
		Self {
			elements: elements.into(),
			index: 0,
			stack: vec![],
			target: None,
		}
	}

	pub fn with_target(elements: impl Into<Arc<[E]>>, target: T) -> Self {
		let mut assembly = Self::new(elements);
		assembly.target = Some(target);
		assembly
	}

	pub fn len(&self) -> usize {
		self.elements.len()
	}

	pub fn is_empty(&self) -> bool {
		self.elements.is_empty()
	}

	pub fn elements(&self) -> &[E] {
		&self.elements
	}

	pub fn elements_consumed(&self) -> usize {
		self.index
	}

	pub fn elements_remaining(&self) -> usize {
		self.len() - self.index
	}

	pub fn has_more_elements(&self) -> bool {
		self.index < self.len()
	}

	/// The next unconsumed element, without consuming it.
	pub fn peek(&self) -> Option<&E> {
		self.elements.get(self.index)
	}

	/// Consumes and returns the next element.
	pub fn next_element(&mut self) -> Option<E> {
		let element = self.elements.get(self.index)?.clone();
		self.index += 1;
		Some(element)
	}

	/// Puts back `n` consumed elements, stopping at the start of the input.
	pub fn unget(&mut self, n: usize) {
		self.index = self.index.saturating_sub(n);
	}

	pub fn consumed(&self, delimiter: &str) -> String {
		join(&self.elements[.. self.index], delimiter)
	}

	pub fn remainder(&self, delimiter: &str) -> String {
		join(&self.elements[self.index ..], delimiter)
	}

	pub fn push(&mut self, value: impl Into<Value<E>>) {
		self.stack.push(value.into());
	}

	pub fn push_element(&mut self, element: E) {
		self.stack.push(Value::Element(element));
	}

	pub fn pop(&mut self) -> Result<Value<E>, AssemblyError> {
		self.stack.pop().ok_or(AssemblyError::StackUnderflow)
	}

	pub fn pop_element(&mut self) -> Result<E, AssemblyError> {
		self.pop()?.into_element()
	}

	/// The top of the stack, without removing it.
	pub fn peek_stack(&self) -> Option<&Value<E>> {
		self.stack.last()
	}

	pub fn stack(&self) -> &[Value<E>] {
		&self.stack
	}

	pub fn stack_is_empty(&self) -> bool {
		self.stack.is_empty()
	}

	pub fn target(&self) -> Option<&T> {
		self.target.as_ref()
	}

	pub fn target_mut(&mut self) -> Option<&mut T> {
		self.target.as_mut()
	}

	/// The target, or [AssemblyError::MissingTarget] for assemblers that need one.
	pub fn require_target(&mut self) -> Result<&mut T, AssemblyError> {
		self.target.as_mut().ok_or(AssemblyError::MissingTarget)
	}

	pub fn set_target(&mut self, target: T) {
		self.target = Some(target);
	}

	pub fn take_target(&mut self) -> Option<T> {
		self.target.take()
	}
}

impl<T> Assembly<char, T> {
	pub fn characters(text: &str) -> Self {
		Self::new(text.chars().collect::<Vec<_>>())
	}
}

impl<E: Element, T: Duplicate> Assembly<E, T> {
	/// Copies this assembly, sharing the input but not the stack or target.
	pub fn duplicate(&self) -> Result<Self, AssemblyError> {
		Ok(Self {
			elements: Arc::clone(&self.elements),
			index: self.index,
			stack: self.stack.clone(),
			target: self.target.duplicate()?,
		})
	}
}

impl<E: Element, T> fmt::Display for Assembly<E, T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("[")?;
		for (index, value) in self.stack.iter().enumerate() {
			if index > 0 {
				f.write_str(", ")?;
			}
			write!(f, "{value}")?;
		}
		write!(
			f,
			"]{}^{}",
			self.consumed(E::DELIMITER),
			self.remainder(E::DELIMITER)
		)
	}
}

fn join<E: fmt::Display>(elements: &[E], delimiter: &str) -> String {
	let mut joined = String::new();
	for (index, element) in elements.iter().enumerate() {
		if index > 0 {
			joined.push_str(delimiter);
		}
		joined.push_str(&element.to_string());
	}
	joined
}

#[test]
fn test_cursor_bookkeeping() {
	let mut assembly: Assembly<char> = Assembly::characters("abc");
	assert_eq!(assembly.len(), 3);
	assert_eq!(assembly.peek(), Some(&'a'));
	assert_eq!(assembly.next_element(), Some('a'));
	assert_eq!(assembly.next_element(), Some('b'));
	assert_eq!(assembly.elements_consumed(), 2);
	assert_eq!(assembly.elements_remaining(), 1);
	assert!(assembly.has_more_elements());
	assert_eq!(assembly.consumed(""), "ab");
	assert_eq!(assembly.remainder(""), "c");

	assembly.unget(5);
	assert_eq!(assembly.elements_consumed(), 0);
	assert_eq!(assembly.remainder("-"), "a-b-c");
}

#[test]
fn test_stack_underflow() {
	let mut assembly: Assembly<char> = Assembly::characters("x");
	assert!(matches!(assembly.pop(), Err(AssemblyError::StackUnderflow)));

	assembly.push("top");
	assert!(matches!(
		assembly.pop_element(),
		Err(AssemblyError::UnexpectedValue { expected: "element", .. })
	));
}

#[test]
fn test_duplicate_isolates_stack_and_target() {
	let mut original: Assembly<char, Vec<String>> =
		Assembly::with_target(vec!['a', 'b'], vec!["first".to_string()]);
	original.push_element('a');

	let mut copy = original.duplicate().unwrap();
	copy.push(1.5);
	copy.require_target().unwrap().push("second".to_string());
	copy.next_element();

	assert_eq!(original.stack(), &[Value::Element('a')]);
	assert_eq!(original.target().unwrap().len(), 1);
	assert_eq!(original.elements_consumed(), 0);
	assert_eq!(copy.stack().len(), 2);
	assert_eq!(copy.target().unwrap().len(), 2);
	assert!(Arc::ptr_eq(&original.elements, &copy.elements));
}

#[test]
fn test_duplicate_failure_surfaces() {
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

	let assembly: Assembly<char, Handle> = Assembly::with_target(vec!['a'], Handle);
	assert!(matches!(
		assembly.duplicate(),
		Err(AssemblyError::Duplication { what: "handle", .. })
	));
}

#[test]
fn test_display() {
	let mut assembly: Assembly<char> = Assembly::characters("aab");
	assembly.next_element();
	assembly.push_element('a');
	assembly.push(2.0);
	assert_eq!(assembly.to_string(), "[a, 2]a^ab");
}
