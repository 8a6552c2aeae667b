//! Sentence-based passphrase generation library.
//!
//! This crate builds memorable passphrases from grammatical templates
//! ("the old cats slowly see a dog") including:
//! - Word pools with plurality, tense and transitivity
//! - Weighted templates with subject/verb and article agreement
//! - Case and digit mutators
//! - An analytic entropy estimate for every template and mutator
//!
//! Randomness goes through a swappable source (see [`random`]).

/// Passphrase model and generation logic.
pub mod model;

/// Error type shared by the whole crate.
pub mod error;

/// Randomness port and the bundled random sources.
pub mod random;

/// I/O utilities (file loading, path helpers).
pub mod io;

pub use error::{PassError, Result};
pub use model::generator::Generator;
pub use model::lexicon::Lexicon;
pub use model::mutator::{MutatorConfig, MutatorRef};
pub use model::options::GeneratorOptions;
pub use model::template::{Registry, TemplateRef};
