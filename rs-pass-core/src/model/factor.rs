use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{PassError, Result};
use crate::random::RandomSource;

/// A declarative description of one random decision point.
///
/// Decoded from JSON as:
/// - `true`, `3`, `"proper"`: a fixed scalar (zero entropy)
/// - `[a, b]`: odds pair, `true` with probability `a / (a + b)`
/// - `{"x": 3, "y": 1}`: named outcomes with non-negative weights
///
/// # Invariants
/// - Weights and odds are finite and non-negative (checked by [`Factor::validate`])
/// - A weight set summing to zero is valid and means "never happens"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Factor {
	Bool(bool),
	Number(f64),
	Text(String),
	Odds([f64; 2]),
	Weights(Weights),
}

impl Default for Factor {
	fn default() -> Self {
		Factor::Bool(false)
	}
}

/// Concrete value produced by evaluating a [`Factor`].
#[derive(Debug, Clone, PartialEq)]
pub enum FactorValue {
	Bool(bool),
	Number(f64),
	Text(String),
}

impl FactorValue {
	/// Whether this value counts as "the factor happened".
	pub fn is_truthy(&self) -> bool {
		match self {
			FactorValue::Bool(b) => *b,
			FactorValue::Number(n) => *n != 0.0,
			FactorValue::Text(s) => !s.is_empty(),
		}
	}

	/// The chosen outcome name, if this value is one.
	pub fn name(&self) -> Option<&str> {
		match self {
			FactorValue::Text(s) => Some(s),
			_ => None,
		}
	}
}

/// Named outcome weights, kept in the order they were declared.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Weights(Vec<(String, f64)>);

impl Weights {
	pub fn new<I, S>(entries: I) -> Self
	where
		I: IntoIterator<Item = (S, f64)>,
		S: Into<String>,
	{
		Self(entries.into_iter().map(|(k, w)| (k.into(), w)).collect())
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
		self.0.iter().map(|(k, w)| (k.as_str(), *w))
	}

	pub fn total(&self) -> f64 {
		self.0.iter().map(|(_, w)| w).sum()
	}

	fn weight_of(&self, name: &str) -> f64 {
		self.0.iter().find(|(k, _)| k == name).map(|(_, w)| *w).unwrap_or(0.0)
	}
}

impl Serialize for Weights {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		let mut map = serializer.serialize_map(Some(self.0.len()))?;
		for (k, w) in &self.0 {
			map.serialize_entry(k, w)?;
		}
		map.end()
	}
}

impl<'de> Deserialize<'de> for Weights {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
		struct WeightsVisitor;

		impl<'de> Visitor<'de> for WeightsVisitor {
			type Value = Weights;

			fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
				f.write_str("a map of outcome names to weights")
			}

			fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Weights, A::Error> {
				let mut entries: Vec<(String, f64)> = Vec::with_capacity(access.size_hint().unwrap_or(0));
				while let Some((k, w)) = access.next_entry::<String, f64>()? {
					if entries.iter().any(|(seen, _)| *seen == k) {
						return Err(de::Error::custom(format!("duplicate outcome `{k}`")));
					}
					entries.push((k, w));
				}
				Ok(Weights(entries))
			}
		}

		deserializer.deserialize_map(WeightsVisitor)
	}
}

/// `-p * log2(p)`, with the `0 * log2(0) = 0` convention.
fn surprisal(p: f64) -> f64 {
	if p <= 0.0 { 0.0 } else { -p * p.log2() }
}

impl Factor {
	/// Odds pair `[a, b]`.
	pub fn odds(a: f64, b: f64) -> Self {
		Factor::Odds([a, b])
	}

	/// Weighted outcomes in declaration order.
	pub fn weights<I, S>(entries: I) -> Self
	where
		I: IntoIterator<Item = (S, f64)>,
		S: Into<String>,
	{
		Factor::Weights(Weights::new(entries))
	}

	/// Checks that odds and weights are finite and non-negative, and that
	/// no outcome is named twice.
	///
	/// # Errors
	/// Returns a configuration error naming `field` otherwise.
	pub fn validate(&self, field: &str) -> Result<()> {
		let bad = |w: f64| !w.is_finite() || w < 0.0;
		match self {
			Factor::Odds([a, b]) if bad(*a) || bad(*b) => {
				Err(PassError::config(field, format!("odds must be non-negative, got [{a}, {b}]")))
			}
			Factor::Weights(weights) => {
				if let Some((k, w)) = weights.iter().find(|(_, w)| bad(*w)) {
					return Err(PassError::config(field, format!("weight of `{k}` must be non-negative, got {w}")));
				}
				let names: Vec<&str> = weights.iter().map(|(k, _)| k).collect();
				match names.iter().enumerate().find(|&(i, k)| names[..i].contains(k)) {
					Some((_, k)) => Err(PassError::config(field, format!("outcome `{k}` is declared twice"))),
					None => Ok(()),
				}
			}
			_ => Ok(()),
		}
	}

	/// Outcome names this factor can produce (text scalar or weight keys).
	pub fn names(&self) -> Vec<&str> {
		match self {
			Factor::Text(s) => vec![s.as_str()],
			Factor::Weights(weights) => weights.iter().map(|(k, _)| k).collect(),
			_ => Vec::new(),
		}
	}

	/// Every outcome the factor declares.
	pub fn outcomes(&self) -> Vec<FactorValue> {
		match self {
			Factor::Bool(b) => vec![FactorValue::Bool(*b)],
			Factor::Number(n) => vec![FactorValue::Number(*n)],
			Factor::Text(s) => vec![FactorValue::Text(s.clone())],
			Factor::Odds(_) => vec![FactorValue::Bool(true), FactorValue::Bool(false)],
			Factor::Weights(weights) => weights.iter().map(|(k, _)| FactorValue::Text(k.to_owned())).collect(),
		}
	}

	/// Draws a concrete value.
	///
	/// - Scalars are returned unchanged, without consuming randomness.
	/// - Odds `[a, b]`: `r` in `[0, a + b)`, `true` iff `r <= a`.
	/// - Weights: `r` in `[0, total)`, first outcome whose cumulative weight exceeds `r`.
	/// - A zero total yields `false` (factor absent).
	pub fn evaluate(&self, rng: &dyn RandomSource) -> FactorValue {
		match self {
			Factor::Bool(b) => FactorValue::Bool(*b),
			Factor::Number(n) => FactorValue::Number(*n),
			Factor::Text(s) => FactorValue::Text(s.clone()),
			Factor::Odds([a, b]) => {
				let total = a + b;
				if total <= 0.0 || *a <= 0.0 {
					return FactorValue::Bool(false);
				}
				FactorValue::Bool(rng.random(total) <= *a)
			}
			Factor::Weights(weights) => {
				let total = weights.total();
				if total <= 0.0 {
					return FactorValue::Bool(false);
				}

				let mut r = rng.random(total);
				let mut fallback = None;
				for (name, weight) in weights.iter() {
					if weight <= 0.0 {
						continue;
					}
					if r < weight {
						return FactorValue::Text(name.to_owned());
					}
					r -= weight;
					fallback = Some(name);
				}

				// Floating-point leftovers land on the last live outcome
				match fallback {
					Some(name) => FactorValue::Text(name.to_owned()),
					None => FactorValue::Bool(false),
				}
			}
		}
	}

	/// Shorthand for `evaluate(rng).is_truthy()`.
	pub fn is_true(&self, rng: &dyn RandomSource) -> bool {
		self.evaluate(rng).is_truthy()
	}

	/// Probability that [`Factor::evaluate`] yields `value`.
	///
	/// For weights, asking for a boolean means "any outcome was chosen"
	/// (`true`) versus "none was" (`false`).
	pub fn probability_of(&self, value: &FactorValue) -> f64 {
		match (self, value) {
			(Factor::Bool(b), FactorValue::Bool(x)) => (b == x) as u8 as f64,
			(Factor::Number(n), FactorValue::Number(x)) => (n == x) as u8 as f64,
			(Factor::Text(s), FactorValue::Text(x)) => (s == x) as u8 as f64,
			(Factor::Number(_) | Factor::Text(_), FactorValue::Bool(x)) => {
				let truthy = self.outcomes().first().map(FactorValue::is_truthy).unwrap_or(false);
				(truthy == *x) as u8 as f64
			}
			(Factor::Odds([a, b]), FactorValue::Bool(x)) => {
				let total = a + b;
				if total <= 0.0 {
					0.0
				} else if *x {
					a / total
				} else {
					b / total
				}
			}
			(Factor::Weights(weights), FactorValue::Text(name)) => {
				let total = weights.total();
				if total <= 0.0 { 0.0 } else { weights.weight_of(name) / total }
			}
			(Factor::Weights(weights), FactorValue::Bool(x)) => {
				let chosen = weights.total() > 0.0;
				(chosen == *x) as u8 as f64
			}
			_ => 0.0,
		}
	}

	/// Probability that the factor "happens" (evaluates truthy).
	pub fn probability_true(&self) -> f64 {
		self.probability_of(&FactorValue::Bool(true))
	}

	/// Probability of a named outcome.
	pub fn probability_of_name(&self, name: &str) -> f64 {
		self.probability_of(&FactorValue::Text(name.to_owned()))
	}

	/// Shannon entropy of the decision, in bits.
	pub fn entropy_bits(&self) -> f64 {
		match self {
			Factor::Bool(_) | Factor::Number(_) | Factor::Text(_) => 0.0,
			Factor::Odds([a, b]) => {
				let total = a + b;
				if total <= 0.0 {
					return 0.0;
				}
				surprisal(a / total) + surprisal(b / total)
			}
			Factor::Weights(weights) => {
				let total = weights.total();
				if total <= 0.0 {
					return 0.0;
				}
				weights.iter().map(|(_, w)| surprisal(w / total)).sum()
			}
		}
	}
}

/// Binary entropy of a probability `p`.
pub(crate) fn binary_entropy(p: f64) -> f64 {
	surprisal(p) + surprisal(1.0 - p)
}

/// `log2(n)` for pool sizes, zero when there is no real choice.
pub(crate) fn choice_bits(n: usize) -> f64 {
	if n <= 1 { 0.0 } else { (n as f64).log2() }
}
