//! Randomness port.
//!
//! Every random decision in the crate goes through a [`RandomSource`], which
//! returns a uniform value in `[0, multiplier)`.
//!
//! The process-wide binding ([`set_random_source`]) is read at every single
//! draw by [`GlobalRandom`], so rebinding it affects in-flight generations
//! from their next draw on. A `Generator` may instead own a dedicated source
//! (seeded or scripted), which keeps tests independent of each other.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A source of uniform floating values.
pub trait RandomSource: Send + Sync {
	/// Returns a value uniformly distributed in `[0, multiplier)`.
	fn random(&self, multiplier: f64) -> f64;
}

/// Default source backed by the thread-local `rand` generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
	fn random(&self, multiplier: f64) -> f64 {
		rand::rng().random::<f64>() * multiplier
	}
}

/// Reproducible source seeded from a `u64`.
#[derive(Debug)]
pub struct SeededRandom {
	rng: Mutex<StdRng>,
}

impl SeededRandom {
	pub fn new(seed: u64) -> Self {
		Self { rng: Mutex::new(StdRng::seed_from_u64(seed)) }
	}
}

impl RandomSource for SeededRandom {
	fn random(&self, multiplier: f64) -> f64 {
		let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
		rng.random::<f64>() * multiplier
	}
}

/// Replays a fixed list of fractions, cycling when it runs out.
///
/// Each fraction is in `[0, 1)` and is scaled by the requested multiplier,
/// so `0.5` drawn against `random(6.0)` yields `3.0` (index 3 of 6).
#[derive(Debug)]
pub struct ScriptedRandom {
	fractions: Vec<f64>,
	cursor: AtomicUsize,
}

impl ScriptedRandom {
	/// Creates a scripted source. An empty script always yields `0`.
	pub fn new(fractions: Vec<f64>) -> Self {
		let fractions = fractions.into_iter().map(|f| f.clamp(0.0, 1.0 - f64::EPSILON)).collect();
		Self { fractions, cursor: AtomicUsize::new(0) }
	}

	/// Script that picks `index` out of `len` choices, for readable tests.
	pub fn pick(index: usize, len: usize) -> f64 {
		(index as f64 + 0.5) / len as f64
	}
}

impl RandomSource for ScriptedRandom {
	fn random(&self, multiplier: f64) -> f64 {
		if self.fractions.is_empty() {
			return 0.0;
		}
		let i = self.cursor.fetch_add(1, Ordering::Relaxed) % self.fractions.len();
		self.fractions[i] * multiplier
	}
}

static PORT: RwLock<Option<Arc<dyn RandomSource>>> = RwLock::new(None);

/// Binds the process-wide source.
pub fn set_random_source(source: Arc<dyn RandomSource>) {
	*PORT.write().unwrap_or_else(PoisonError::into_inner) = Some(source);
}

/// Restores the default [`ThreadRandom`] binding.
pub fn reset_random_source() {
	*PORT.write().unwrap_or_else(PoisonError::into_inner) = None;
}

/// Draws from whatever source is bound right now.
pub fn random(multiplier: f64) -> f64 {
	let bound = PORT.read().unwrap_or_else(PoisonError::into_inner).clone();
	match bound {
		Some(source) => source.random(multiplier),
		None => ThreadRandom.random(multiplier),
	}
}

/// Source that forwards every draw to the process-wide binding.
#[derive(Debug, Default, Clone, Copy)]
pub struct GlobalRandom;

impl RandomSource for GlobalRandom {
	fn random(&self, multiplier: f64) -> f64 {
		random(multiplier)
	}
}

/// Uniform index in `0..len`. `len` must be non-zero.
pub(crate) fn index(rng: &dyn RandomSource, len: usize) -> usize {
	let value = rng.random(len as f64).floor();
	(value.max(0.0) as usize).min(len.saturating_sub(1))
}

/// Fair coin.
pub(crate) fn coin(rng: &dyn RandomSource) -> bool {
	rng.random(2.0) < 1.0
}
