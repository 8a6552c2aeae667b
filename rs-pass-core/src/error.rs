use thiserror::Error;

/// Maximum number of draws a pool makes before giving up on a word.
pub const MAX_ATTEMPTS: usize = 100;

/// The common error type used by this crate.
///
/// Two classes matter to callers:
/// - configuration errors (`Configuration`, `Json`): the template, mutator or
///   lexicon is malformed; retrying cannot help.
/// - exhaustion errors (`Exhausted`): a pool could not produce an unused word
///   within [`MAX_ATTEMPTS`] draws; retrying with a fresh session may succeed.
#[derive(Error, Debug)]
pub enum PassError {
	/// A template, mutator or lexicon field is invalid
	#[error("Invalid configuration at `{field}`: {reason}")]
	Configuration { field: String, reason: String },

	/// A pool ran out of acceptable words
	#[error("Pool `{category}` exhausted after {attempts} attempts")]
	Exhausted { category: String, attempts: usize },

	/// There was a problem reading or writing data files
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	/// A JSON document did not match the expected shape
	#[error("Malformed JSON: {0}")]
	Json(#[from] serde_json::Error),

	/// The binary lexicon cache could not be encoded or decoded
	#[error("Binary cache error: {0}")]
	Cache(#[from] postcard::Error),
}

impl PassError {
	/// Builds a configuration error for `field`.
	pub fn config(field: impl Into<String>, reason: impl Into<String>) -> Self {
		PassError::Configuration { field: field.into(), reason: reason.into() }
	}

	/// Builds an exhaustion error for a pool category.
	pub fn exhausted(category: impl Into<String>) -> Self {
		PassError::Exhausted { category: category.into(), attempts: MAX_ATTEMPTS }
	}

	/// True for structural errors that no amount of re-randomization fixes.
	pub fn is_configuration(&self) -> bool {
		matches!(self, PassError::Configuration { .. } | PassError::Json(_))
	}

	/// True when a fresh generation session may succeed.
	pub fn is_exhaustion(&self) -> bool {
		matches!(self, PassError::Exhausted { .. })
	}
}

pub type Result<T> = std::result::Result<T, PassError>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn it_classifies_errors() {
		let config = PassError::config("templates.x[0].subtype", "unknown subtype `verbal`");
		assert!(config.is_configuration());
		assert!(!config.is_exhaustion());
		assert_eq!(
			config.to_string(),
			"Invalid configuration at `templates.x[0].subtype`: unknown subtype `verbal`"
		);

		let exhausted = PassError::exhausted("nouns");
		assert!(exhausted.is_exhaustion());
		assert!(!exhausted.is_configuration());
		assert_eq!(exhausted.to_string(), "Pool `nouns` exhausted after 100 attempts");
	}

	#[test]
	fn it_treats_bad_json_as_configuration() {
		let error: PassError = serde_json::from_str::<u32>("\"nope\"").unwrap_err().into();
		assert!(error.is_configuration());
	}
}
