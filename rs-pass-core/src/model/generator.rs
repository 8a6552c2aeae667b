use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, mpsc};
use std::thread;

use crate::error::Result;
use crate::model::entropy::EntropyCalculator;
use crate::model::lexicon::Lexicon;
use crate::model::mutator::{MutatorConfig, MutatorRef};
use crate::model::options::GeneratorOptions;
use crate::model::pool::{Tense, VerbForm};
use crate::model::template::{
	ArticleKind, Clause, IntransitiveForm, NounClause, NounKind, Registry, TemplateRef, VerbClause, choose,
};
use crate::model::word::{TaggedWord, tag};
use crate::random::{self, GlobalRandom, RandomSource};

/// High-level passphrase generator.
///
/// # Responsibilities
/// - Expand templates into tagged words with article, subject and tense agreement
/// - Apply an optional mutator to the joined phrase
/// - Retry whole generations after an exhausted pool (`GeneratorOptions::nb_try`)
/// - Report the analytic entropy of a template and mutator
///
/// The lexicon and registry are read-only once the generator is built, so a
/// single generator can be shared between threads.
pub struct Generator {
	lexicon: Lexicon,
	registry: Registry,
	random: Arc<dyn RandomSource>,
	options: GeneratorOptions,
}

impl fmt::Debug for Generator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Generator")
			.field("lexicon", &self.lexicon)
			.field("registry", &self.registry)
			.field("options", &self.options)
			.finish_non_exhaustive()
	}
}

impl Generator {
	/// Creates a generator drawing from the process-wide random source.
	pub fn new(lexicon: Lexicon, registry: Registry) -> Self {
		Self { lexicon, registry, random: Arc::new(GlobalRandom), options: GeneratorOptions::default() }
	}

	/// Replaces the random source used by this generator only.
	pub fn with_random(mut self, random: Arc<dyn RandomSource>) -> Self {
		self.random = random;
		self
	}

	pub fn lexicon(&self) -> &Lexicon {
		&self.lexicon
	}

	pub fn registry(&self) -> &Registry {
		&self.registry
	}

	pub fn options(&self) -> &GeneratorOptions {
		&self.options
	}

	pub fn set_options(&mut self, options: GeneratorOptions) {
		self.options = options;
	}

	/// Generates one phrase.
	///
	/// # Parameters
	/// - `template`: registry name or inline clause list
	/// - `mutator`: optional registry name or inline configuration
	///
	/// # Errors
	/// - Configuration error for an unknown or invalid template or mutator
	/// - Exhaustion error when a pool runs dry more than `nb_try` times
	pub fn generate(&self, template: &TemplateRef, mutator: Option<&MutatorRef>) -> Result<String> {
		self.generate_with(template, mutator, &self.options)
	}

	/// Same as [`Generator::generate`], with options for this call only.
	/// The generator's own options are left untouched.
	pub fn generate_with(
		&self,
		template: &TemplateRef,
		mutator: Option<&MutatorRef>,
		options: &GeneratorOptions,
	) -> Result<String> {
		let mutator = mutator.map(|m| self.mutator_config(m)).transpose()?;
		let words = self.generate_words_with(template, options)?;
		let phrase = words.iter().map(|w| w.text.as_str()).collect::<Vec<_>>().join(" ");

		Ok(match mutator {
			Some(config) => config.apply(&phrase, self.random.as_ref()),
			None => phrase,
		})
	}

	/// Generates the tagged words of one phrase, before any mutation.
	///
	/// # Notes
	/// Each retry starts from a fresh session, so no partial sentence leaks
	/// from a failed attempt.
	pub fn generate_words(&self, template: &TemplateRef) -> Result<Vec<TaggedWord>> {
		self.generate_words_with(template, &self.options)
	}

	pub fn generate_words_with(&self, template: &TemplateRef, options: &GeneratorOptions) -> Result<Vec<TaggedWord>> {
		let mut nb_try = options.nb_try();
		loop {
			match self.assemble(template, options.unique_words) {
				Err(e) if e.is_exhaustion() && nb_try > 0 => {
					nb_try -= 1;
					log::warn!("{e}; retrying with a fresh session ({nb_try} tries left)");
				}
				result => return result,
			}
		}
	}

	/// Generates `count` independent phrases in parallel.
	///
	/// # Behavior
	/// - Splits the work into one chunk per CPU core.
	/// - Each worker generates its chunk with the shared, read-only generator.
	/// - Results are collected over an MPSC channel; order is not meaningful.
	///
	/// # Errors
	/// Returns the first error reported by a worker.
	pub fn generate_batch(&self, template: &TemplateRef, mutator: Option<&MutatorRef>, count: usize) -> Result<Vec<String>> {
		self.generate_batch_with(template, mutator, count, &self.options)
	}

	/// Same as [`Generator::generate_batch`], with options for this call only.
	pub fn generate_batch_with(
		&self,
		template: &TemplateRef,
		mutator: Option<&MutatorRef>,
		count: usize,
		options: &GeneratorOptions,
	) -> Result<Vec<String>> {
		if count == 0 {
			return Ok(Vec::new());
		}
		let workers = num_cpus::get().clamp(1, count);
		let chunk_size = count.div_ceil(workers);

		thread::scope(|scope| -> Result<Vec<String>> {
			let (tx, rx) = mpsc::channel();
			for worker in 0..workers {
				let size = chunk_size.min(count.saturating_sub(worker * chunk_size));
				if size == 0 {
					break;
				}
				let tx = tx.clone();
				scope.spawn(move || {
					let phrases: Result<Vec<String>> = (0..size).map(|_| self.generate_with(template, mutator, options)).collect();
					// The receiver outlives every worker
					tx.send(phrases).ok();
				});
			}
			drop(tx);

			let mut phrases = Vec::with_capacity(count);
			for chunk in rx {
				phrases.extend(chunk?);
			}
			Ok(phrases)
		})
	}

	/// Analytic strength of a template and optional mutator, in bits.
	///
	/// Deterministic; consumes no randomness.
	pub fn entropy_of(&self, template: &TemplateRef, mutator: Option<&MutatorRef>) -> Result<f64> {
		let template_bits = EntropyCalculator::new(&self.lexicon).template_bits(&self.registry, template)?;
		let mutator_bits = match mutator {
			Some(m) => self.mutator_config(m)?.entropy_bits(),
			None => 0.0,
		};
		Ok(template_bits + mutator_bits)
	}

	fn mutator_config(&self, mutator: &MutatorRef) -> Result<MutatorConfig> {
		match mutator {
			MutatorRef::Named(name) => self.registry.mutator(name).copied(),
			MutatorRef::Inline(config) => Ok(*config),
		}
	}

	/// One attempt with a fresh session.
	fn assemble(&self, template: &TemplateRef, unique_words: bool) -> Result<Vec<TaggedWord>> {
		let rng = self.random.as_ref();
		let clauses = self.registry.resolve(template, rng)?;
		let mut session = Session::new(&self.lexicon, rng, unique_words);

		for (i, clause) in clauses.iter().enumerate() {
			log::trace!("clause {i}: {clause:?}");
			if session.clause(clause)? == Flow::Stop {
				log::trace!("sentence ends after clause {i}");
				break;
			}
		}
		Ok(session.finish())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
	Continue,
	Stop,
}

/// Subject seen by a verb clause.
struct Subject {
	plural: bool,
	/// Where an interrogative word goes: after the last speech verb
	question_at: usize,
}

/// Per-call state: words assembled so far and, in uniqueness mode, the
/// content words already drawn.
struct Session<'a> {
	lexicon: &'a Lexicon,
	rng: &'a dyn RandomSource,
	words: Vec<TaggedWord>,
	used: Option<HashSet<String>>,
}

impl<'a> Session<'a> {
	fn new(lexicon: &'a Lexicon, rng: &'a dyn RandomSource, unique_words: bool) -> Self {
		Self { lexicon, rng, words: Vec::new(), used: unique_words.then(HashSet::new) }
	}

	fn used(&self) -> Option<&HashSet<String>> {
		self.used.as_ref()
	}

	fn push(&mut self, word: TaggedWord) {
		self.words.push(word);
	}

	/// Pushes a content word and records it for uniqueness.
	fn push_content(&mut self, word: TaggedWord) {
		if let Some(used) = &mut self.used {
			used.insert(word.text.clone());
		}
		self.words.push(word);
	}

	fn last_is_preposition(&self) -> bool {
		self.words.last().is_some_and(|w| w.has(&[tag::PREPOSITION]))
	}

	fn clause(&mut self, clause: &Clause) -> Result<Flow> {
		match clause {
			Clause::Conjunction => {
				let word = self.lexicon.conjunctions.select(self.rng, None)?;
				self.push(word);
			}
			Clause::DirectSpeech => {
				let word = self.lexicon.speech_verbs.select(self.rng, None)?;
				self.push(word);
			}
			Clause::Noun(noun) => self.noun(noun)?,
			Clause::Verb(verb) => return self.verb(verb),
		}
		Ok(Flow::Continue)
	}

	fn noun(&mut self, noun: &NounClause) -> Result<()> {
		let (lexicon, rng) = (self.lexicon, self.rng);
		match choose::<NounKind>(&noun.subtype, rng)? {
			None => {}
			Some(NounKind::Proper) => {
				let word = lexicon.proper_nouns.select(rng, self.used())?;
				self.push_content(word);
			}
			Some(NounKind::Common) => {
				let plural = self.prelude(noun)?;
				if plural && noun.numeral.is_true(rng) {
					let word = lexicon.numerals.select(true, rng, None)?;
					self.push(word);
				}
				if noun.adjective.is_true(rng) {
					let word = lexicon.adjectives.select(rng, self.used())?;
					self.push_content(word);
				}
				let word = lexicon.nouns.select(plural, rng, self.used())?;
				self.push_content(word);
			}
			Some(NounKind::Adjective) => {
				let plural = self.prelude(noun)?;
				let word = lexicon.adjectives.select(rng, self.used())?;
				self.push_content(word);
				let personal = random::coin(rng);
				let word = lexicon.indefinite_pronouns.select(Some(personal), plural, rng, self.used())?;
				self.push_content(word);
			}
		}
		Ok(())
	}

	/// Optional preposition, plurality and article. Returns the plurality.
	fn prelude(&mut self, noun: &NounClause) -> Result<bool> {
		let (lexicon, rng) = (self.lexicon, self.rng);
		if !self.last_is_preposition() && noun.preposition.is_true(rng) {
			let word = lexicon.prepositions.select(rng, None)?;
			self.push(word);
		}

		let plural = noun.plural.is_true(rng);
		let article = if plural { &noun.plural_article } else { &noun.singular_article };
		let word = match choose::<ArticleKind>(article, rng)? {
			None | Some(ArticleKind::None) => None,
			Some(ArticleKind::Definite) => Some(lexicon.articles.select_definite()),
			Some(ArticleKind::Indefinite) => Some(lexicon.articles.select_indefinite(rng)?),
			Some(ArticleKind::Demonstrative) => Some(lexicon.demonstratives.select(plural, rng, None)?),
			Some(ArticleKind::PersonalPronoun) => Some(lexicon.personal_pronouns.select(plural, rng, None)?),
		};
		if let Some(word) = word {
			self.push(word);
		}
		Ok(plural)
	}

	/// Scans for the subject of the next verb.
	///
	/// The first noun sets the plurality, falling back on the first
	/// indefinite pronoun. A speech verb starts a new sentence.
	fn subject(&self) -> Subject {
		let mut noun = None;
		let mut pronoun = None;
		let mut question_at = 0;
		for (i, word) in self.words.iter().enumerate() {
			if word.has(&[tag::SPEECH]) {
				noun = None;
				pronoun = None;
				question_at = i + 1;
			} else if noun.is_none() && word.has(&[tag::NOUN]) {
				noun = Some(word.is_plural());
			} else if pronoun.is_none() && word.has(&[tag::PRONOUN, tag::INDEFINITE]) {
				pronoun = Some(word.is_plural());
			}
		}
		Subject { plural: noun.or(pronoun).unwrap_or(false), question_at }
	}

	fn verb(&mut self, verb: &VerbClause) -> Result<Flow> {
		let (lexicon, rng) = (self.lexicon, self.rng);
		let subject = self.subject();

		let transitive = lexicon.verbs.choose_transitive(rng);
		let mut flow = Flow::Continue;
		let mut trailing_preposition = false;
		if !transitive {
			match choose::<IntransitiveForm>(&verb.intransitive, rng)? {
				Some(IntransitiveForm::NoNounClause) => flow = Flow::Stop,
				Some(IntransitiveForm::Preposition) => trailing_preposition = true,
				None => {}
			}
		}

		let form = if verb.interrogative.is_true(rng) {
			let word = lexicon.interrogatives.select(rng, None)?;
			self.words.insert(subject.question_at, word);
			VerbForm::new(Tense::Present, true)
		} else {
			let tense = choose::<Tense>(&verb.tense, rng)?.unwrap_or(Tense::Present);
			VerbForm::new(tense, subject.plural)
		};

		let adverb = if verb.adverb.is_true(rng) {
			let word = lexicon.adverbs.select(rng, self.used())?;
			Some((word, random::coin(rng)))
		} else {
			None
		};

		let word = lexicon.verbs.pool(transitive).select(form, rng, self.used())?;
		match adverb {
			Some((adverb, true)) => {
				self.push_content(adverb);
				self.push_content(word);
			}
			Some((adverb, false)) => {
				self.push_content(word);
				self.push_content(adverb);
			}
			None => self.push_content(word),
		}

		if trailing_preposition {
			let word = lexicon.prepositions.select(rng, None)?;
			self.push(word);
		}
		Ok(flow)
	}

	/// Applies the a/an fixup and hands the words over.
	fn finish(mut self) -> Vec<TaggedWord> {
		for i in 1..self.words.len() {
			let (head, tail) = self.words.split_at_mut(i);
			head[i - 1].fix_before(&tail[0]);
		}
		self.words
	}
}
