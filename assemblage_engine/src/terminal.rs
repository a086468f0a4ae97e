use std::fmt;

use rand::{Rng, RngCore};

/**
	The predicate behind a terminal parser.

	A terminal matches one element. Element types plug into the engine by
	implementing this trait for the classes of element a grammar needs to
	recognize, such as a literal value, any number, or any word.
*/
pub trait Terminal<E> {
	/// Whether `element` can be consumed by this terminal.
	fn qualifies(&self, element: &E) -> bool;

	/// A short description used when printing grammars.
	fn describe(&self) -> String;

	/// A representative element of this terminal's class, as text.
	fn random_element(&self, rng: &mut dyn RngCore) -> String;
}

/// Matches elements equal to the given value.
#[derive(Clone, Debug, PartialEq)]
pub struct Exact<E>(pub E);

impl<E: PartialEq + fmt::Debug + fmt::Display> Terminal<E> for Exact<E> {
	fn qualifies(&self, element: &E) -> bool {
		*element == self.0
	}

	fn describe(&self) -> String {
		format!("{:?}", self.0)
	}

	fn random_element(&self, _rng: &mut dyn RngCore) -> String {
		self.0.to_string()
	}
}

type Predicate<E> = Box<dyn Fn(&E) -> bool>;
type Sample = Box<dyn Fn(&mut dyn RngCore) -> String>;

/// Matches elements accepted by an arbitrary predicate.
pub struct Satisfy<E> {
	label: String,
	predicate: Predicate<E>,
	sample: Sample,
}

impl<E> Satisfy<E> {
	pub fn new(
		label: impl Into<String>,
		predicate: impl Fn(&E) -> bool + 'static,
		sample: impl Fn(&mut dyn RngCore) -> String + 'static,
	) -> Self {
		Self {
			label: label.into(),
			predicate: Box::new(predicate),
			sample: Box::new(sample),
		}
	}
}

impl<E> fmt::Debug for Satisfy<E> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Satisfy").field("label", &self.label).finish_non_exhaustive()
	}
}

impl<E> Terminal<E> for Satisfy<E> {
	fn qualifies(&self, element: &E) -> bool {
		(self.predicate)(element)
	}

	fn describe(&self) -> String {
		self.label.clone()
	}

	fn random_element(&self, rng: &mut dyn RngCore) -> String {
		(self.sample)(rng)
	}
}

/// Matches any alphabetic character.
#[derive(Clone, Copy, Debug, Default)]
pub struct Letter;

impl Terminal<char> for Letter {
	fn qualifies(&self, element: &char) -> bool {
		element.is_alphabetic()
	}

	fn describe(&self) -> String {
		"Letter".into()
	}

	fn random_element(&self, rng: &mut dyn RngCore) -> String {
		char::from(rng.gen_range(b'a' ..= b'z')).to_string()
	}
}

/// Matches any ASCII digit.
#[derive(Clone, Copy, Debug, Default)]
pub struct Digit;

impl Terminal<char> for Digit {
	fn qualifies(&self, element: &char) -> bool {
		element.is_ascii_digit()
	}

	fn describe(&self) -> String {
		"Digit".into()
	}

	fn random_element(&self, rng: &mut dyn RngCore) -> String {
		char::from(rng.gen_range(b'0' ..= b'9')).to_string()
	}
}

#[test]
fn test_character_terminals() {
	use rand::SeedableRng;

	assert!(Exact('a').qualifies(&'a'));
	assert!(!Exact('a').qualifies(&'A'));
	assert_eq!(Exact('a').describe(), "'a'");

	assert!(Letter.qualifies(&'é'));
	assert!(!Letter.qualifies(&'1'));
	assert!(Digit.qualifies(&'7'));
	assert!(!Digit.qualifies(&'x'));

	let mut rng = rand_xoshiro::Xoshiro256StarStar::seed_from_u64(7);
	for _ in 0 .. 20 {
		let letter = Letter.random_element(&mut rng);
		assert!(Letter.qualifies(&letter.chars().next().unwrap()));
		let digit = Digit.random_element(&mut rng);
		assert!(Digit.qualifies(&digit.chars().next().unwrap()));
	}
}

#[test]
fn test_satisfy() {
	let vowel = Satisfy::new("Vowel", |c: &char| "aeiou".contains(*c), |_| "e".to_string());
	assert!(vowel.qualifies(&'o'));
	assert!(!vowel.qualifies(&'z'));
	assert_eq!(vowel.describe(), "Vowel");
}
