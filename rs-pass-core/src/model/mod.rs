//! Top-level module for sentence-based passphrase generation.
//!
//! This module provides:
//! - Weighted factors and their probabilities (`Factor`)
//! - Tagged words and the pools they are drawn from
//! - The lexicon, templates and mutator presets loaded from JSON
//! - A high-level generation interface (`Generator`)
//! - The analytic entropy of a template

/// High-level interface for generating passphrases.
///
/// Expands templates into agreed sentences, applies mutators,
/// retries exhausted sessions and generates batches in parallel.
pub mod generator;

/// Generation options (`unique_words`, `nb_try`).
pub mod options;

/// Weighted factor specification: evaluation, probability and entropy.
pub mod factor;

/// Words with grammatical tags.
pub mod word;

/// Plain, plural-pair, verb, article, pronoun and numeral pools.
pub mod pool;

/// Every word pool, compiled from `lexicon.json` and cached with postcard.
pub mod lexicon;

/// Clause templates, template collections and the registry naming them.
pub mod template;

/// Case and digit injection into a finished phrase.
pub mod mutator;

/// Static entropy pass over a template, mirroring the generator.
///
/// Not exposed; reached through `Generator::entropy_of`.
mod entropy;
