use crate::assembly::Assembly;
use crate::error::AssemblyError;

/**
	A semantic action run on an assembly after the parser it is bound to has
	matched it.

	Assemblers usually pop what the match pushed, and either push something
	new or update the assembly's target. An assembler only ever sees the one
	assembly it was invoked on; state that must survive a branch belongs on
	the stack or the target, not in the assembler.

	Any `Fn(&mut Assembly<E, T>) -> Result<(), AssemblyError>` is an assembler.
*/
pub trait Assembler<E, T> {
	fn work_on(&self, assembly: &mut Assembly<E, T>) -> Result<(), AssemblyError>;
}

impl<E, T, F> Assembler<E, T> for F
where
	F: Fn(&mut Assembly<E, T>) -> Result<(), AssemblyError>,
{
	fn work_on(&self, assembly: &mut Assembly<E, T>) -> Result<(), AssemblyError> {
		self(assembly)
	}
}

/// Pops a single value and drops it.
#[derive(Clone, Copy, Debug, Default)]
pub struct Pop;

impl<E: crate::Element, T> Assembler<E, T> for Pop {
	fn work_on(&self, assembly: &mut Assembly<E, T>) -> Result<(), AssemblyError> {
		assembly.pop().map(drop)
	}
}

/**
	Collects every stack value above a fence into a list and pushes it back.

	The fence is the stack value pushed by the matching [Fence] pre-assembler,
	typically installed on a repetition so that each repetition gathers exactly
	the values it produced.
*/
#[derive(Clone, Debug)]
pub struct Collect {
	fence: String,
}

impl Collect {
	pub fn new(fence: impl Into<String>) -> Self {
		Self { fence: fence.into() }
	}
}

impl<E: crate::Element, T> Assembler<E, T> for Collect {
	fn work_on(&self, assembly: &mut Assembly<E, T>) -> Result<(), AssemblyError> {
		let mut collected = vec![];
		loop {
			match assembly.pop()? {
				crate::Value::Text(text) if text == self.fence => break,
				value => collected.push(value),
			}
		}
		collected.reverse();
		assembly.push(collected);
		Ok(())
	}
}

/// Pushes a fence marker for a later [Collect].
#[derive(Clone, Debug)]
pub struct Fence {
	fence: String,
}

impl Fence {
	pub fn new(fence: impl Into<String>) -> Self {
		Self { fence: fence.into() }
	}
}

impl<E: crate::Element, T> Assembler<E, T> for Fence {
	fn work_on(&self, assembly: &mut Assembly<E, T>) -> Result<(), AssemblyError> {
		assembly.push(self.fence.as_str());
		Ok(())
	}
}

#[test]
fn test_closure_assembler() {
	let double = |assembly: &mut Assembly<char>| -> Result<(), AssemblyError> {
		let n = assembly.pop()?.into_number()?;
		assembly.push(n * 2.0);
		Ok(())
	};
	let mut assembly = Assembly::characters("");
	assembly.push(21.0);
	double.work_on(&mut assembly).unwrap();
	assert_eq!(assembly.stack(), &[crate::Value::Number(42.0)]);
}

#[test]
fn test_fence_and_collect() {
	let mut assembly: Assembly<char> = Assembly::characters("");
	assembly.push_element('x');
	Fence::new("{").work_on(&mut assembly).unwrap();
	assembly.push_element('a');
	assembly.push_element('b');
	Collect::new("{").work_on(&mut assembly).unwrap();
	assert_eq!(
		assembly.stack(),
		&[
			crate::Value::Element('x'),
			crate::Value::List(vec![crate::Value::Element('a'), crate::Value::Element('b')]),
		]
	);

	// a missing fence is an underflow
	let mut assembly: Assembly<char> = Assembly::characters("");
	assembly.push_element('a');
	assert!(matches!(
		Collect::new("{").work_on(&mut assembly),
		Err(AssemblyError::StackUnderflow)
	));
}
