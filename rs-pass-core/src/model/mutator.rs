//! Post-generation mutation: uppercase letters and injected digits.
//!
//! Entropy estimates use fixed average-case constants
//! ([`AVERAGE_WORDS_PER_PHRASE`], [`AVERAGE_LETTERS_PER_WORD`]) rather than
//! the length of the phrase being mutated, so figures stay comparable across
//! templates. This is an approximation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PassError, Result};
use crate::random::{self, RandomSource};

pub const AVERAGE_WORDS_PER_PHRASE: f64 = 9.0;
pub const AVERAGE_LETTERS_PER_WORD: f64 = 5.0;
/// Upper bound of the digit count drawn when `count` is 0.
pub const MAX_RANDOM_DIGITS: usize = 5;

/// Where uppercase letters go inside a selected word.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CaseTechnique {
	StartOfWord,
	WholeWord,
	Anywhere,
	RunOfLetters,
	#[default]
	#[serde(rename = "random", alias = "Random")]
	Random,
}

const CASE_TECHNIQUES: [CaseTechnique; 4] =
	[CaseTechnique::StartOfWord, CaseTechnique::WholeWord, CaseTechnique::Anywhere, CaseTechnique::RunOfLetters];

/// Where a digit is spliced.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DigitTechnique {
	StartOfWord,
	EndOfWord,
	StartOrEndOfWord,
	EndOfPhrase,
	Anywhere,
	#[default]
	#[serde(rename = "random", alias = "Random")]
	Random,
}

/// Uppercase pass settings. A `count` of 0 draws the count at apply time.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(default, deny_unknown_fields)]
pub struct CaseMutation {
	#[serde(rename = "type", alias = "technique")]
	pub technique: CaseTechnique,
	pub count: u32,
}

/// Digit pass settings. A `count` of 0 draws the count at apply time.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(default, deny_unknown_fields)]
pub struct DigitMutation {
	#[serde(rename = "type", alias = "technique")]
	pub technique: DigitTechnique,
	pub count: u32,
}

/// Both passes; either may be disabled.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(default, deny_unknown_fields)]
pub struct MutatorConfig {
	pub upper: Option<CaseMutation>,
	pub numbers: Option<DigitMutation>,
}

/// How a caller designates a mutator.
#[derive(Clone, Debug, PartialEq)]
pub enum MutatorRef {
	Named(String),
	Inline(MutatorConfig),
}

impl From<&str> for MutatorRef {
	fn from(name: &str) -> Self {
		MutatorRef::Named(name.to_owned())
	}
}

impl From<MutatorConfig> for MutatorRef {
	fn from(config: MutatorConfig) -> Self {
		MutatorRef::Inline(config)
	}
}

impl MutatorRef {
	/// Reads a preset name or an inline `{upper, numbers}` object.
	pub fn from_value(value: Value) -> Result<Self> {
		match value {
			Value::String(name) => Ok(MutatorRef::Named(name)),
			value => Ok(MutatorRef::Inline(MutatorConfig::from_value("mutator", value)?)),
		}
	}
}

/// Uppercases the characters of `word` whose index falls in `range`.
fn upper_range(word: &str, range: std::ops::Range<usize>) -> String {
	word.chars()
		.enumerate()
		.flat_map(|(i, c)| {
			let upper: Vec<char> = if range.contains(&i) { c.to_uppercase().collect() } else { vec![c] };
			upper
		})
		.collect()
}

fn uppercase(word: &str, technique: CaseTechnique, rng: &dyn RandomSource) -> String {
	let len = word.chars().count();
	if len == 0 {
		return word.to_owned();
	}
	match technique {
		CaseTechnique::StartOfWord => upper_range(word, 0..1),
		CaseTechnique::WholeWord => word.to_uppercase(),
		CaseTechnique::Anywhere => {
			let i = random::index(rng, len);
			upper_range(word, i..i + 1)
		}
		CaseTechnique::RunOfLetters if len < 2 => word.to_uppercase(),
		CaseTechnique::RunOfLetters => {
			let start = random::index(rng, len - 1);
			let run = 2 + random::index(rng, len - start - 1);
			upper_range(word, start..start + run)
		}
		CaseTechnique::Random => uppercase(word, CASE_TECHNIQUES[random::index(rng, CASE_TECHNIQUES.len())], rng),
	}
}

fn splice_digit(word: &str, digit: usize, technique: DigitTechnique, rng: &dyn RandomSource) -> String {
	match technique {
		DigitTechnique::StartOfWord => format!("{digit}{word}"),
		DigitTechnique::EndOfWord | DigitTechnique::EndOfPhrase => format!("{word}{digit}"),
		DigitTechnique::StartOrEndOfWord if random::coin(rng) => format!("{digit}{word}"),
		DigitTechnique::StartOrEndOfWord => format!("{word}{digit}"),
		DigitTechnique::Anywhere | DigitTechnique::Random => {
			let chars: Vec<char> = word.chars().collect();
			if chars.len() < 2 {
				return format!("{word}{digit}");
			}
			let offset = 1 + random::index(rng, chars.len() - 1);
			let (head, tail) = chars.split_at(offset);
			format!("{}{digit}{}", head.iter().collect::<String>(), tail.iter().collect::<String>())
		}
	}
}

impl CaseMutation {
	fn apply(&self, words: &mut [String], rng: &dyn RandomSource) {
		let n = words.len();
		let count = match self.count {
			0 => random::index(rng, n) + 1,
			count => count as usize,
		}
		.min(n);

		// Positions are drawn without replacement
		let mut remaining: Vec<usize> = (0..n).collect();
		for _ in 0..count {
			let position = remaining.remove(random::index(rng, remaining.len()));
			words[position] = uppercase(&words[position], self.technique, rng);
		}
	}

	/// Bits added by this pass.
	pub fn entropy_bits(&self) -> f64 {
		let letter_bits = AVERAGE_LETTERS_PER_WORD.log2();
		let per_word = AVERAGE_WORDS_PER_PHRASE.log2()
			+ match self.technique {
				CaseTechnique::StartOfWord | CaseTechnique::WholeWord => 0.0,
				CaseTechnique::Anywhere => letter_bits,
				CaseTechnique::RunOfLetters => 2.0 * letter_bits,
				CaseTechnique::Random => 2.0 + 0.6 * letter_bits,
			};

		match self.count {
			0 => AVERAGE_WORDS_PER_PHRASE.log2() + (AVERAGE_WORDS_PER_PHRASE + 1.0) / 2.0 * per_word,
			count => (count as f64).min(AVERAGE_WORDS_PER_PHRASE) * per_word,
		}
	}
}

impl DigitMutation {
	fn apply(&self, words: &mut [String], rng: &dyn RandomSource) {
		let n = words.len();
		let count = match self.count {
			0 => random::index(rng, MAX_RANDOM_DIGITS) + 1,
			count => count as usize,
		};

		// Positions may repeat: digits stack on the same word
		for _ in 0..count {
			let position = match self.technique {
				DigitTechnique::EndOfPhrase => n - 1,
				_ => random::index(rng, n),
			};
			let digit = random::index(rng, 10);
			words[position] = splice_digit(&words[position], digit, self.technique, rng);
		}
	}

	/// Bits added by this pass.
	pub fn entropy_bits(&self) -> f64 {
		let word_bits = AVERAGE_WORDS_PER_PHRASE.log2();
		let letter_bits = AVERAGE_LETTERS_PER_WORD.log2();
		let per_digit = 10f64.log2()
			+ match self.technique {
				DigitTechnique::EndOfPhrase => 0.0,
				DigitTechnique::StartOfWord | DigitTechnique::EndOfWord => word_bits,
				DigitTechnique::StartOrEndOfWord => word_bits + 1.0,
				DigitTechnique::Anywhere | DigitTechnique::Random => word_bits + letter_bits,
			};

		match self.count {
			0 => {
				let mean = (MAX_RANDOM_DIGITS as f64 + 1.0) / 2.0;
				(MAX_RANDOM_DIGITS as f64).log2() + mean * per_digit
			}
			count => count as f64 * per_digit,
		}
	}
}

impl MutatorConfig {
	/// Decodes a mutator, naming `field` on error.
	pub fn from_value(field: &str, value: Value) -> Result<Self> {
		serde_json::from_value(value).map_err(|e| PassError::config(field, e.to_string()))
	}

	/// Applies the case pass, then the digit pass, to a phrase.
	///
	/// Words are split on whitespace and re-joined with single spaces.
	pub fn apply(&self, phrase: &str, rng: &dyn RandomSource) -> String {
		let mut words: Vec<String> = phrase.split_whitespace().map(str::to_owned).collect();
		if words.is_empty() {
			return phrase.to_owned();
		}

		if let Some(upper) = &self.upper {
			upper.apply(&mut words, rng);
		}
		if let Some(numbers) = &self.numbers {
			numbers.apply(&mut words, rng);
		}
		words.join(" ")
	}

	/// Bits both passes add, with average-case phrase dimensions.
	pub fn entropy_bits(&self) -> f64 {
		self.upper.map_or(0.0, |u| u.entropy_bits()) + self.numbers.map_or(0.0, |n| n.entropy_bits())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::random::{ScriptedRandom, SeededRandom};

	const PHRASE: &str = "the cat sat on the mat";

	fn config(json: &str) -> MutatorConfig {
		MutatorConfig::from_value("mutator", serde_json::from_str(json).unwrap()).unwrap()
	}

	#[test]
	fn it_uppercases_the_selected_word() {
		let mutator = config(r#"{"upper": {"type": "WholeWord", "count": 1}}"#);
		let rng = ScriptedRandom::new(vec![ScriptedRandom::pick(1, 6)]);
		assert_eq!(mutator.apply(PHRASE, &rng), "the CAT sat on the mat");
	}

	#[test]
	fn it_appends_a_digit_to_the_selected_word() {
		let mutator = config(r#"{"numbers": {"type": "EndOfWord", "count": 1}}"#);
		let rng = ScriptedRandom::new(vec![ScriptedRandom::pick(5, 6), ScriptedRandom::pick(3, 10)]);
		assert_eq!(mutator.apply(PHRASE, &rng), "the cat sat on the mat3");
	}

	#[test]
	fn it_applies_each_case_technique() {
		let rng = ScriptedRandom::new(vec![ScriptedRandom::pick(2, 5)]);
		assert_eq!(uppercase("horse", CaseTechnique::StartOfWord, &rng), "Horse");
		assert_eq!(uppercase("horse", CaseTechnique::WholeWord, &rng), "HORSE");
		assert_eq!(uppercase("horse", CaseTechnique::Anywhere, &rng), "hoRse");

		// start 1 of 4, then run 2 + (2 of 3) = 4 letters
		let rng = ScriptedRandom::new(vec![ScriptedRandom::pick(1, 4), ScriptedRandom::pick(2, 3)]);
		assert_eq!(uppercase("horse", CaseTechnique::RunOfLetters, &rng), "hORSE");
		assert_eq!(uppercase("a", CaseTechnique::RunOfLetters, &rng), "A");
	}

	#[test]
	fn it_never_uppercases_a_word_twice() {
		let mutator = config(r#"{"upper": {"type": "StartOfWord", "count": 3}}"#);
		let rng = SeededRandom::new(12);
		for _ in 0..200 {
			let mutated = mutator.apply("aa bb cc", &rng);
			assert_eq!(mutated, "Aa Bb Cc");
		}
	}

	#[test]
	fn it_clamps_the_case_count() {
		let mutator = config(r#"{"upper": {"type": "WholeWord", "count": 10}}"#);
		assert_eq!(mutator.apply("one two", &SeededRandom::new(1)), "ONE TWO");
	}

	#[test]
	fn it_lets_digits_stack_on_one_word() {
		let mutator = config(r#"{"numbers": {"type": "EndOfPhrase", "count": 3}}"#);
		let rng = ScriptedRandom::new(vec![ScriptedRandom::pick(1, 10), ScriptedRandom::pick(2, 10), ScriptedRandom::pick(3, 10)]);
		assert_eq!(mutator.apply(PHRASE, &rng), "the cat sat on the mat123");
	}

	#[test]
	fn it_splices_digits_inside_words() {
		let rng = ScriptedRandom::new(vec![ScriptedRandom::pick(1, 2)]);
		assert_eq!(splice_digit("mat", 7, DigitTechnique::Anywhere, &rng), "ma7t");
		assert_eq!(splice_digit("a", 7, DigitTechnique::Anywhere, &rng), "a7");
		assert_eq!(splice_digit("mat", 7, DigitTechnique::StartOfWord, &rng), "7mat");
	}

	#[test]
	fn it_puts_edge_digits_at_either_end() {
		// coin below one half: start, above: end
		let rng = ScriptedRandom::new(vec![0.25, 0.75]);
		assert_eq!(splice_digit("mat", 4, DigitTechnique::StartOrEndOfWord, &rng), "4mat");
		assert_eq!(splice_digit("mat", 4, DigitTechnique::StartOrEndOfWord, &rng), "mat4");

		let mutator = config(r#"{"numbers": {"type": "StartOrEndOfWord", "count": 1}}"#);
		let rng = SeededRandom::new(5);
		let (mut starts, mut ends) = (0, 0);
		for _ in 0..300 {
			let mutated = mutator.apply("cat dog", &rng);
			let word = mutated.split(' ').find(|w| w.chars().any(|c| c.is_ascii_digit())).unwrap();
			let first = word.chars().next().unwrap();
			let last = word.chars().last().unwrap();
			assert!(first.is_ascii_digit() ^ last.is_ascii_digit(), "{mutated}");
			if first.is_ascii_digit() { starts += 1 } else { ends += 1 }
		}
		assert!(starts > 0 && ends > 0);
	}

	#[test]
	fn it_draws_random_counts_in_range() {
		let mutator = config(r#"{"upper": {"type": "WholeWord"}, "numbers": {"type": "StartOrEndOfWord"}}"#);
		let rng = SeededRandom::new(99);
		for _ in 0..500 {
			let mutated = mutator.apply(PHRASE, &rng);
			let upper = mutated.split(' ').filter(|w| w.chars().any(char::is_uppercase)).count();
			let digits = mutated.chars().filter(char::is_ascii_digit).count();
			assert!((1..=6).contains(&upper), "{mutated}");
			assert!((1..=MAX_RANDOM_DIGITS).contains(&digits), "{mutated}");
		}
	}

	#[test]
	fn it_rejects_unknown_techniques() {
		let error = MutatorConfig::from_value("mutators.x", serde_json::json!({"upper": {"type": "Sideways"}})).unwrap_err();
		assert!(error.is_configuration());
		assert!(error.to_string().contains("mutators.x"));
	}

	#[test]
	fn it_accepts_the_technique_alias() {
		let mutator = config(r#"{"numbers": {"technique": "random", "count": 2}}"#);
		assert_eq!(mutator.numbers, Some(DigitMutation { technique: DigitTechnique::Random, count: 2 }));
	}

	#[test]
	fn it_estimates_case_entropy() {
		let words = AVERAGE_WORDS_PER_PHRASE.log2();
		let letters = AVERAGE_LETTERS_PER_WORD.log2();
		let bits = |technique, count| CaseMutation { technique, count }.entropy_bits();
		assert!((bits(CaseTechnique::WholeWord, 1) - words).abs() < 1e-12);
		assert!((bits(CaseTechnique::StartOfWord, 2) - 2.0 * words).abs() < 1e-12);
		assert!((bits(CaseTechnique::Anywhere, 1) - (words + letters)).abs() < 1e-12);
		assert!((bits(CaseTechnique::RunOfLetters, 1) - (words + 2.0 * letters)).abs() < 1e-12);
		assert!((bits(CaseTechnique::Random, 1) - (words + 2.0 + 0.6 * letters)).abs() < 1e-12);
		assert!((bits(CaseTechnique::WholeWord, 0) - (words + 5.0 * words)).abs() < 1e-12);
	}

	#[test]
	fn it_estimates_digit_entropy() {
		let digit = 10f64.log2();
		let words = AVERAGE_WORDS_PER_PHRASE.log2();
		let letters = AVERAGE_LETTERS_PER_WORD.log2();
		let bits = |technique, count| DigitMutation { technique, count }.entropy_bits();
		assert!((bits(DigitTechnique::EndOfPhrase, 1) - digit).abs() < 1e-12);
		assert!((bits(DigitTechnique::EndOfWord, 2) - 2.0 * (digit + words)).abs() < 1e-12);
		assert!((bits(DigitTechnique::Anywhere, 1) - (digit + words + letters)).abs() < 1e-12);
		assert_eq!(bits(DigitTechnique::Random, 1), bits(DigitTechnique::Anywhere, 1));
		assert!((bits(DigitTechnique::EndOfPhrase, 0) - (5f64.log2() + 3.0 * digit)).abs() < 1e-12);
	}

	#[test]
	fn it_adds_nothing_when_disabled() {
		assert_eq!(MutatorConfig::default().entropy_bits(), 0.0);
		assert_eq!(MutatorConfig::default().apply(PHRASE, &SeededRandom::new(1)), PHRASE);
	}
}
