use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::io::{cache_path, read_to_string};
use crate::model::pool::{
	ArticlePool, IndefinitePronounPool, NumeralPool, PlainPool, PluralPairPool, RawIndefinitePronoun, RawPair, RawVerb,
	VerbPool, VerbPools,
};
use crate::model::word::tag;

/// Raw word lists, as read from `lexicon.json`.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct LexiconData {
	pub nouns: Vec<RawPair>,
	pub proper_nouns: Vec<String>,
	pub adjectives: Vec<String>,
	pub adverbs: Vec<String>,
	pub prepositions: Vec<String>,
	pub conjunctions: Vec<String>,
	pub speech_verbs: Vec<String>,
	pub interrogatives: Vec<String>,
	pub demonstratives: Vec<RawPair>,
	pub personal_pronouns: Vec<RawPair>,
	pub articles: ArticlePool,
	pub indefinite_pronouns: Vec<RawIndefinitePronoun>,
	pub numerals: NumeralPool,
	pub verbs: RawVerbs,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct RawVerbs {
	pub transitive: Vec<RawVerb>,
	pub intransitive: Vec<RawVerb>,
}

/// Every word pool the generator draws from.
///
/// Built once from [`LexiconData`] and read-only afterwards, so a single
/// lexicon can serve any number of generations at the same time.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Lexicon {
	pub nouns: PluralPairPool,
	pub proper_nouns: PlainPool,
	pub adjectives: PlainPool,
	pub adverbs: PlainPool,
	pub prepositions: PlainPool,
	pub conjunctions: PlainPool,
	pub speech_verbs: PlainPool,
	pub interrogatives: PlainPool,
	pub demonstratives: PluralPairPool,
	pub personal_pronouns: PluralPairPool,
	pub articles: ArticlePool,
	pub indefinite_pronouns: IndefinitePronounPool,
	pub numerals: NumeralPool,
	pub verbs: VerbPools,
}

impl Lexicon {
	/// Compiles raw word lists into pools.
	///
	/// # Errors
	/// Returns a configuration error if a verb override names no form.
	pub fn new(data: LexiconData) -> Result<Self> {
		Ok(Self {
			nouns: PluralPairPool::from_raw("nouns", &[tag::NOUN], data.nouns),
			proper_nouns: PlainPool::new("properNouns", &[tag::NOUN, tag::PROPER, tag::SINGULAR], data.proper_nouns),
			adjectives: PlainPool::new("adjectives", &[tag::ADJECTIVE], data.adjectives),
			adverbs: PlainPool::new("adverbs", &[tag::ADVERB], data.adverbs),
			prepositions: PlainPool::new("prepositions", &[tag::PREPOSITION], data.prepositions),
			conjunctions: PlainPool::new("conjunctions", &[tag::CONJUNCTION], data.conjunctions),
			speech_verbs: PlainPool::new("speechVerbs", &[tag::SPEECH], data.speech_verbs),
			interrogatives: PlainPool::new("interrogatives", &[tag::INTERROGATIVE], data.interrogatives),
			demonstratives: PluralPairPool::from_raw("demonstratives", &[tag::DEMONSTRATIVE], data.demonstratives),
			personal_pronouns: PluralPairPool::from_raw(
				"personalPronouns",
				&[tag::PERSONAL_PRONOUN],
				data.personal_pronouns,
			),
			articles: data.articles,
			indefinite_pronouns: IndefinitePronounPool::new(data.indefinite_pronouns),
			numerals: data.numerals,
			verbs: VerbPools {
				transitive: VerbPool::new("verbs.transitive", tag::TRANSITIVE, data.verbs.transitive)?,
				intransitive: VerbPool::new("verbs.intransitive", tag::INTRANSITIVE, data.verbs.intransitive)?,
			},
		})
	}

	/// Parses and compiles a JSON lexicon.
	pub fn from_json(json: &str) -> Result<Self> {
		Self::new(serde_json::from_str(json)?)
	}

	/// Loads a JSON lexicon from disk.
	pub fn load<P: AsRef<Path>>(filepath: P) -> Result<Self> {
		Self::from_json(&read_to_string(filepath)?)
	}

	/// Loads a lexicon, reusing the compiled binary next to it when present.
	///
	/// - `data/lexicon.json` is cached as `data/lexicon.bin` (postcard).
	/// - When the cache is missing, the JSON is compiled and the cache written.
	///
	/// # Notes
	/// The cache is not invalidated when the JSON changes; delete the `.bin`
	/// file after editing the word lists.
	pub fn load_cached<P: AsRef<Path>>(filepath: P) -> Result<Self> {
		let binary_data_path = cache_path(&filepath)?;
		if binary_data_path.exists() {
			log::debug!("loading compiled lexicon from {}", binary_data_path.display());
			let bytes = std::fs::read(binary_data_path)?;
			return Ok(postcard::from_bytes(&bytes)?);
		}

		let lexicon = Self::load(&filepath)?;
		let bytes = postcard::to_stdvec(&lexicon)?;
		std::fs::write(&binary_data_path, bytes)?;
		log::debug!("compiled lexicon cached to {}", binary_data_path.display());
		Ok(lexicon)
	}
}
