/// Upper bound for whole-generation retries.
pub const MAX_NB_TRY: usize = 1_000;

/// Input parameters for generating phrases.
///
/// # Responsibilities
/// - Track whether words may repeat within one phrase (`unique_words`)
/// - Track how many fresh sessions to try after an exhausted pool (`nb_try`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GeneratorOptions {
	/// Forbid repeating a content word inside one phrase.
	pub unique_words: bool,

	/// Number of extra attempts, each with a fresh session, when a pool is
	/// exhausted. 0 surfaces the first exhaustion error.
	nb_try: usize,
}

impl GeneratorOptions {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the current retry count.
	pub fn nb_try(&self) -> usize {
		self.nb_try
	}

	/// Sets the retry count.
	///
	/// # Errors
	/// Returns an error if the value exceeds [`MAX_NB_TRY`].
	pub fn set_nb_try(&mut self, nb_try: usize) -> Result<(), String> {
		if nb_try > MAX_NB_TRY {
			return Err(format!("nb_try must be at most {MAX_NB_TRY}, got {nb_try}"));
		}
		self.nb_try = nb_try;
		Ok(())
	}
}
