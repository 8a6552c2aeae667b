use serde::Serialize;

/// Tag names attached to generated words.
pub mod tag {
	pub const NOUN: &str = "noun";
	pub const PROPER: &str = "proper";
	pub const VERB: &str = "verb";
	pub const ADJECTIVE: &str = "adjective";
	pub const ADVERB: &str = "adverb";
	pub const ARTICLE: &str = "article";
	pub const DEFINITE: &str = "definite";
	pub const INDEFINITE: &str = "indefinite";
	pub const PREPOSITION: &str = "preposition";
	pub const CONJUNCTION: &str = "conjunction";
	pub const SPEECH: &str = "speech";
	pub const DEMONSTRATIVE: &str = "demonstrative";
	pub const PERSONAL_PRONOUN: &str = "personalPronoun";
	pub const PRONOUN: &str = "pronoun";
	pub const PERSONAL: &str = "personal";
	pub const IMPERSONAL: &str = "impersonal";
	pub const INTERROGATIVE: &str = "interrogative";
	pub const NUMERAL: &str = "numeral";
	pub const REQUIRES_SINGULAR_NOUN: &str = "requiresSingularNoun";
	pub const SINGULAR: &str = "singular";
	pub const PLURAL: &str = "plural";
	pub const TRANSITIVE: &str = "transitive";
	pub const INTRANSITIVE: &str = "intransitive";

	/// Plurality tag for a flag.
	pub fn number(plural: bool) -> &'static str {
		if plural { PLURAL } else { SINGULAR }
	}
}

/// A generated token: its surface text plus grammatical tags.
///
/// Only the indefinite-article fixup ever rewrites `text` after creation,
/// using the pre-vowel alternate captured at draw time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaggedWord {
	pub text: String,
	tags: Vec<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	before_vowel: Option<String>,
}

impl TaggedWord {
	pub fn new<I, S>(text: impl Into<String>, tags: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self { text: text.into(), tags: tags.into_iter().map(Into::into).collect(), before_vowel: None }
	}

	/// Attaches the form to use when the next word starts with a vowel.
	pub fn with_before_vowel(mut self, form: impl Into<String>) -> Self {
		self.before_vowel = Some(form.into());
		self
	}

	/// Adds one more tag.
	pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
		self.tags.push(tag.into());
		self
	}

	pub fn tags(&self) -> impl Iterator<Item = &str> {
		self.tags.iter().map(String::as_str)
	}

	/// True when every queried tag is present.
	pub fn has(&self, tags: &[&str]) -> bool {
		tags.iter().all(|t| self.tags.iter().any(|own| own == t))
	}

	pub fn is_plural(&self) -> bool {
		self.has(&[tag::PLURAL])
	}

	pub fn starts_with_vowel(&self) -> bool {
		self.text.chars().next().map(|c| "aeiouAEIOU".contains(c)).unwrap_or(false)
	}

	/// Switches to the pre-vowel alternate when the next word needs it.
	pub(crate) fn fix_before(&mut self, next: &TaggedWord) {
		if !self.has(&[tag::ARTICLE, tag::INDEFINITE]) || !next.starts_with_vowel() {
			return;
		}
		if let Some(form) = &self.before_vowel {
			self.text = form.clone();
		}
	}
}
