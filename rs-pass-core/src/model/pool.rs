//! Word pools.
//!
//! Every pool draws uniformly and, when given an "already used" set, redraws
//! until it finds an unused word, giving up after [`MAX_ATTEMPTS`] draws.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{MAX_ATTEMPTS, PassError, Result};
use crate::model::word::{TaggedWord, tag};
use crate::random::{self, RandomSource};

/// Draws with `attempt` until it yields a word outside `used`.
///
/// `attempt` returns `None` for a draw that hit an empty slot; such draws
/// count against the same budget.
fn draw<F>(category: &str, used: Option<&HashSet<String>>, mut attempt: F) -> Result<TaggedWord>
where
	F: FnMut() -> Option<TaggedWord>,
{
	for _ in 0..MAX_ATTEMPTS {
		match attempt() {
			Some(word) if used.is_none_or(|u| !u.contains(&word.text)) => return Ok(word),
			_ => continue,
		}
	}
	Err(PassError::exhausted(category))
}

fn empty_pool(category: &str) -> PassError {
	PassError::config(category, "pool has no words")
}

/// Uniform choice over a flat list.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct PlainPool {
	category: String,
	tags: Vec<String>,
	words: Vec<String>,
}

impl PlainPool {
	/// Creates a pool whose words carry `tags` (the first one being the word class).
	pub fn new(category: &str, tags: &[&str], words: Vec<String>) -> Self {
		Self {
			category: category.to_owned(),
			tags: tags.iter().map(|t| (*t).to_owned()).collect(),
			words,
		}
	}

	pub fn len(&self) -> usize {
		self.words.len()
	}

	pub fn is_empty(&self) -> bool {
		self.words.is_empty()
	}

	pub fn select(&self, rng: &dyn RandomSource, used: Option<&HashSet<String>>) -> Result<TaggedWord> {
		if self.words.is_empty() {
			return Err(empty_pool(&self.category));
		}
		draw(&self.category, used, || {
			let word = &self.words[random::index(rng, self.words.len())];
			Some(TaggedWord::new(word.as_str(), self.tags.iter().map(String::as_str)))
		})
	}
}

/// A word given as one string (plural appends `s`) or as an explicit
/// `[singular, plural]` pair where either slot may be `null` or empty.
#[derive(Deserialize, Clone, Debug)]
#[serde(untagged)]
pub enum RawPair {
	One(String),
	Pair([Option<String>; 2]),
}

/// Singular and plural forms of one entry; a missing form is `None`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PluralPair {
	pub singular: Option<String>,
	pub plural: Option<String>,
}

impl From<RawPair> for PluralPair {
	fn from(raw: RawPair) -> Self {
		let present = |s: Option<String>| s.filter(|s| !s.is_empty());
		match raw {
			RawPair::One(word) => Self { plural: present(Some(format!("{word}s"))), singular: present(Some(word)) },
			RawPair::Pair([singular, plural]) => Self { singular: present(singular), plural: present(plural) },
		}
	}
}

impl PluralPair {
	fn form(&self, plural: bool) -> Option<&str> {
		if plural { self.plural.as_deref() } else { self.singular.as_deref() }
	}
}

/// Entries with singular and plural forms; selection picks one plurality.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct PluralPairPool {
	category: String,
	tags: Vec<String>,
	entries: Vec<PluralPair>,
}

impl PluralPairPool {
	pub fn new(category: &str, tags: &[&str], entries: Vec<PluralPair>) -> Self {
		Self {
			category: category.to_owned(),
			tags: tags.iter().map(|t| (*t).to_owned()).collect(),
			entries,
		}
	}

	pub fn from_raw(category: &str, tags: &[&str], raw: Vec<RawPair>) -> Self {
		Self::new(category, tags, raw.into_iter().map(PluralPair::from).collect())
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Number of entries that have a form for this plurality.
	pub fn count(&self, plural: bool) -> usize {
		self.entries.iter().filter(|e| e.form(plural).is_some()).count()
	}

	/// Draws an entry and returns its singular or plural form.
	///
	/// Entries without the requested form are skipped and redrawn.
	pub fn select(&self, plural: bool, rng: &dyn RandomSource, used: Option<&HashSet<String>>) -> Result<TaggedWord> {
		if self.entries.is_empty() {
			return Err(empty_pool(&self.category));
		}
		draw(&self.category, used, || {
			let entry = &self.entries[random::index(rng, self.entries.len())];
			let form = entry.form(plural)?;
			Some(TaggedWord::new(form, self.tags.iter().map(String::as_str)).with_tag(tag::number(plural)))
		})
	}
}

/// Verb tense, independent of plurality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tense {
	Present,
	Past,
	Future,
	Perfect,
	Subjunctive,
	PresentContinuous,
	PastContinuous,
}

impl Tense {
	pub const ALL: [Tense; 7] = [
		Tense::Present,
		Tense::Past,
		Tense::Future,
		Tense::Perfect,
		Tense::Subjunctive,
		Tense::PresentContinuous,
		Tense::PastContinuous,
	];

	pub fn name(self) -> &'static str {
		match self {
			Tense::Present => "present",
			Tense::Past => "past",
			Tense::Future => "future",
			Tense::Perfect => "perfect",
			Tense::Subjunctive => "subjunctive",
			Tense::PresentContinuous => "presentContinuous",
			Tense::PastContinuous => "pastContinuous",
		}
	}
}

impl FromStr for Tense {
	type Err = String;

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		Tense::ALL.into_iter().find(|t| t.name() == s).ok_or_else(|| format!("unknown tense `{s}`"))
	}
}

impl fmt::Display for Tense {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// One of the 14 conjugation slots: a tense and a plurality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VerbForm {
	pub tense: Tense,
	pub plural: bool,
}

impl VerbForm {
	pub const COUNT: usize = Tense::ALL.len() * 2;

	pub fn new(tense: Tense, plural: bool) -> Self {
		Self { tense, plural }
	}

	fn slot(self) -> usize {
		let tense = Tense::ALL.iter().position(|t| *t == self.tense).unwrap_or(0);
		tense * 2 + self.plural as usize
	}

	/// All 14 forms in slot order.
	pub fn all() -> impl Iterator<Item = VerbForm> {
		Tense::ALL.into_iter().flat_map(|t| [VerbForm::new(t, false), VerbForm::new(t, true)])
	}
}

impl fmt::Display for VerbForm {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}{}", self.tense, if self.plural { "Plural" } else { "Singular" })
	}
}

impl FromStr for VerbForm {
	type Err = String;

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		VerbForm::all().find(|form| form.to_string() == s).ok_or_else(|| format!("unknown verb form `{s}`"))
	}
}

/// A verb as given in the lexicon: its base form, or an object with the base,
/// convenience overrides (`past`, `participle`, `ing`) and per-form overrides
/// (`"pastSingular": "was"`, or `null` to leave the form out).
#[derive(Deserialize, Clone, Debug)]
#[serde(untagged)]
pub enum RawVerb {
	Base(String),
	Detailed(VerbSpec),
}

#[derive(Deserialize, Clone, Debug)]
pub struct VerbSpec {
	pub base: String,
	#[serde(default)]
	pub past: Option<String>,
	#[serde(default)]
	pub participle: Option<String>,
	#[serde(default)]
	pub ing: Option<String>,
	#[serde(flatten)]
	pub forms: BTreeMap<String, Option<String>>,
}

/// Applies `f` to the first word only, so "look after" becomes "looks after".
fn inflect(base: &str, f: impl Fn(&str) -> String) -> String {
	match base.split_once(' ') {
		Some((head, rest)) => format!("{} {rest}", f(head)),
		None => f(base),
	}
}

fn is_vowel(c: char) -> bool {
	"aeiou".contains(c)
}

/// Last two characters of a word, if it has them.
fn tail(word: &str) -> Option<(char, char)> {
	let mut chars = word.chars().rev();
	let last = chars.next()?;
	let before = chars.next()?;
	Some((before, last))
}

fn third_person(word: &str) -> String {
	match tail(word) {
		Some((before, 'y')) if !is_vowel(before) => format!("{}ies", &word[..word.len() - 1]),
		_ if ["s", "x", "z", "ch", "sh", "o"].iter().any(|end| word.ends_with(end)) => format!("{word}es"),
		_ => format!("{word}s"),
	}
}

fn simple_past(word: &str) -> String {
	match tail(word) {
		Some((before, 'y')) if !is_vowel(before) => format!("{}ied", &word[..word.len() - 1]),
		_ if word.ends_with('e') => format!("{word}d"),
		_ => format!("{word}ed"),
	}
}

fn present_participle(word: &str) -> String {
	match tail(word) {
		Some(('i', 'e')) => format!("{}ying", &word[..word.len() - 2]),
		Some((before, 'e')) if !is_vowel(before) => format!("{}ing", &word[..word.len() - 1]),
		_ => format!("{word}ing"),
	}
}

/// Expands a verb into its 14 slots with the default rules.
fn conjugate(spec: &VerbSpec) -> [Option<String>; VerbForm::COUNT] {
	let base = spec.base.as_str();
	let past = spec.past.clone().unwrap_or_else(|| inflect(base, simple_past));
	let participle = spec.participle.clone().unwrap_or_else(|| past.clone());
	let ing = spec.ing.clone().unwrap_or_else(|| inflect(base, present_participle));

	let mut slots: [Option<String>; VerbForm::COUNT] = Default::default();
	for form in VerbForm::all() {
		let text = match (form.tense, form.plural) {
			(Tense::Present, false) => inflect(base, third_person),
			(Tense::Present, true) => base.to_owned(),
			(Tense::Past, _) => past.clone(),
			(Tense::Future, _) => format!("will {base}"),
			(Tense::Perfect, false) => format!("has {participle}"),
			(Tense::Perfect, true) => format!("have {participle}"),
			(Tense::Subjunctive, _) => format!("would {base}"),
			(Tense::PresentContinuous, false) => format!("is {ing}"),
			(Tense::PresentContinuous, true) => format!("are {ing}"),
			(Tense::PastContinuous, false) => format!("was {ing}"),
			(Tense::PastContinuous, true) => format!("were {ing}"),
		};
		slots[form.slot()] = Some(text);
	}
	slots
}

/// Verbs compiled into fixed conjugation slots.
///
/// # Invariants
/// - Every entry holds exactly [`VerbForm::COUNT`] slots
/// - A `None` slot means the verb has no valid form there
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct VerbPool {
	category: String,
	transitivity: String,
	entries: Vec<[Option<String>; VerbForm::COUNT]>,
}

impl VerbPool {
	/// Compiles raw verbs once.
	///
	/// # Errors
	/// Returns a configuration error for an override key that names no form.
	pub fn new(category: &str, transitivity: &str, raw: Vec<RawVerb>) -> Result<Self> {
		let mut entries = Vec::with_capacity(raw.len());
		for (i, verb) in raw.into_iter().enumerate() {
			let spec = match verb {
				RawVerb::Base(base) => VerbSpec {
					base,
					past: None,
					participle: None,
					ing: None,
					forms: BTreeMap::new(),
				},
				RawVerb::Detailed(spec) => spec,
			};

			let mut slots = conjugate(&spec);
			for (key, value) in &spec.forms {
				let form: VerbForm = key.parse().map_err(|e| PassError::config(format!("{category}[{i}].{key}"), e))?;
				slots[form.slot()] = value.clone().filter(|v| !v.is_empty());
			}
			entries.push(slots);
		}

		Ok(Self { category: category.to_owned(), transitivity: transitivity.to_owned(), entries })
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Number of verbs that have `form`.
	pub fn count(&self, form: VerbForm) -> usize {
		self.entries.iter().filter(|e| e[form.slot()].is_some()).count()
	}

	/// Draws uniformly among the verbs that have `form`.
	///
	/// # Errors
	/// - Configuration error if no verb has `form`
	/// - Exhaustion error if every candidate is already used
	pub fn select(&self, form: VerbForm, rng: &dyn RandomSource, used: Option<&HashSet<String>>) -> Result<TaggedWord> {
		let slot = form.slot();
		let candidates: Vec<&str> = self.entries.iter().filter_map(|e| e[slot].as_deref()).collect();
		if candidates.is_empty() {
			return Err(PassError::config(&self.category, format!("no verb has the form `{form}`")));
		}

		let form_name = form.to_string();
		draw(&self.category, used, || {
			let text = candidates[random::index(rng, candidates.len())];
			Some(TaggedWord::new(
				text,
				[tag::VERB, self.transitivity.as_str(), form.tense.name(), tag::number(form.plural), form_name.as_str()],
			))
		})
	}
}

/// Transitive and intransitive verbs, chosen in proportion to pool size.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct VerbPools {
	pub transitive: VerbPool,
	pub intransitive: VerbPool,
}

impl VerbPools {
	/// Probability of drawing from the intransitive pool.
	pub fn probability_intransitive(&self) -> f64 {
		let total = self.transitive.len() + self.intransitive.len();
		if total == 0 { 0.0 } else { self.intransitive.len() as f64 / total as f64 }
	}

	/// Decides transitivity, the larger pool being proportionally more likely.
	pub fn choose_transitive(&self, rng: &dyn RandomSource) -> bool {
		let transitive = self.transitive.len() as f64;
		let total = transitive + self.intransitive.len() as f64;
		if total <= 0.0 {
			return true;
		}
		rng.random(total) < transitive
	}

	pub fn pool(&self, transitive: bool) -> &VerbPool {
		if transitive { &self.transitive } else { &self.intransitive }
	}
}

/// An indefinite article and its pre-vowel alternate ("a" / "an").
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IndefiniteArticle {
	pub base: String,
	pub before_vowel: String,
}

/// The definite article and the indefinite forms.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ArticlePool {
	pub definite: String,
	pub indefinite: Vec<IndefiniteArticle>,
}

impl ArticlePool {
	pub fn select_definite(&self) -> TaggedWord {
		TaggedWord::new(self.definite.as_str(), [tag::ARTICLE, tag::DEFINITE])
	}

	/// Draws an indefinite form, keeping its alternate for the vowel fixup.
	pub fn select_indefinite(&self, rng: &dyn RandomSource) -> Result<TaggedWord> {
		if self.indefinite.is_empty() {
			return Err(empty_pool("articles.indefinite"));
		}
		let article = &self.indefinite[random::index(rng, self.indefinite.len())];
		Ok(TaggedWord::new(article.base.as_str(), [tag::ARTICLE, tag::INDEFINITE, tag::SINGULAR])
			.with_before_vowel(article.before_vowel.as_str()))
	}
}

/// An indefinite pronoun as given in the lexicon.
#[derive(Deserialize, Clone, Debug)]
pub struct RawIndefinitePronoun {
	pub word: RawPair,
	pub personal: bool,
}

/// Indefinite pronouns, split into personal ("someone") and impersonal
/// ("something") subsets when built.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct IndefinitePronounPool {
	personal: PluralPairPool,
	impersonal: PluralPairPool,
}

impl IndefinitePronounPool {
	pub fn new(raw: Vec<RawIndefinitePronoun>) -> Self {
		let (personal, impersonal): (Vec<_>, Vec<_>) = raw.into_iter().partition(|p| p.personal);
		let pairs = |list: Vec<RawIndefinitePronoun>| -> Vec<PluralPair> {
			list.into_iter().map(|p| PluralPair::from(p.word)).collect()
		};
		Self {
			personal: PluralPairPool::new(
				"indefinitePronouns.personal",
				&[tag::PRONOUN, tag::INDEFINITE, tag::PERSONAL],
				pairs(personal),
			),
			impersonal: PluralPairPool::new(
				"indefinitePronouns.impersonal",
				&[tag::PRONOUN, tag::INDEFINITE, tag::IMPERSONAL],
				pairs(impersonal),
			),
		}
	}

	fn subset(&self, personal: bool) -> &PluralPairPool {
		if personal { &self.personal } else { &self.impersonal }
	}

	/// Pronouns available for a personal flag (`None` = either) and plurality.
	pub fn count(&self, personal: Option<bool>, plural: bool) -> usize {
		match personal {
			Some(p) => self.subset(p).count(plural),
			None => self.personal.count(plural) + self.impersonal.count(plural),
		}
	}

	/// Draws a pronoun; with `personal == None` the subset is chosen in
	/// proportion to how many forms each offers.
	pub fn select(
		&self,
		personal: Option<bool>,
		plural: bool,
		rng: &dyn RandomSource,
		used: Option<&HashSet<String>>,
	) -> Result<TaggedWord> {
		let personal = match personal {
			Some(p) => p,
			None => {
				let people = self.personal.count(plural) as f64;
				let total = people + self.impersonal.count(plural) as f64;
				rng.random(total.max(1.0)) < people
			}
		};
		self.subset(personal).select(plural, rng, used)
	}
}

/// Integer range used for counted nouns ("7 cats").
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct NumeralPool {
	pub start: u32,
	pub end: u32,
}

impl Default for NumeralPool {
	fn default() -> Self {
		Self { start: 2, end: 12 }
	}
}

impl NumeralPool {
	/// Number of distinct numerals for a plurality.
	pub fn count(&self, plural: bool) -> usize {
		if !plural {
			return 1;
		}
		let low = self.start.max(2);
		if low > self.end { 0 } else { (self.end - low + 1) as usize }
	}

	/// Singular is always `1`; plural is uniform in `[max(2, start), end]`.
	pub fn select(&self, plural: bool, rng: &dyn RandomSource, used: Option<&HashSet<String>>) -> Result<TaggedWord> {
		if !plural {
			return Ok(TaggedWord::new("1", [tag::NUMERAL, tag::SINGULAR, tag::REQUIRES_SINGULAR_NOUN]));
		}

		let count = self.count(true);
		if count == 0 {
			return Err(empty_pool("numerals"));
		}
		let low = self.start.max(2);
		draw("numerals", used, || {
			let value = low + random::index(rng, count) as u32;
			Some(TaggedWord::new(value.to_string(), [tag::NUMERAL, tag::PLURAL]))
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::random::{ScriptedRandom, SeededRandom};

	fn words(list: &[&str]) -> Vec<String> {
		list.iter().map(|s| (*s).to_owned()).collect()
	}

	#[test]
	fn it_tags_plain_words_with_their_class() {
		let pool = PlainPool::new("adjectives", &[tag::ADJECTIVE], words(&["red", "blue"]));
		let word = pool.select(&ScriptedRandom::new(vec![0.9]), None).unwrap();
		assert_eq!(word.text, "blue");
		assert!(word.has(&[tag::ADJECTIVE]));
	}

	#[test]
	fn it_gives_up_after_the_retry_budget() {
		let pool = PlainPool::new("adverbs", &[tag::ADVERB], words(&["slowly"]));
		let used: HashSet<String> = ["slowly".to_owned()].into();
		let error = pool.select(&SeededRandom::new(3), Some(&used)).unwrap_err();
		assert!(error.is_exhaustion());
	}

	#[test]
	fn it_avoids_used_words() {
		let pool = PlainPool::new("adverbs", &[tag::ADVERB], words(&["slowly", "boldly", "oddly"]));
		let used: HashSet<String> = ["slowly".to_owned(), "boldly".to_owned()].into();
		let rng = SeededRandom::new(5);
		for _ in 0..50 {
			assert_eq!(pool.select(&rng, Some(&used)).unwrap().text, "oddly");
		}
	}

	#[test]
	fn it_rejects_empty_pools() {
		let pool = PlainPool::new("conjunctions", &[tag::CONJUNCTION], Vec::new());
		assert!(pool.select(&SeededRandom::new(1), None).unwrap_err().is_configuration());
	}

	#[test]
	fn it_pluralises_single_strings() {
		let raw: Vec<RawPair> = serde_json::from_str(r#"["cat", ["mouse", "mice"], ["sheep", "sheep"], [null, "scissors"]]"#).unwrap();
		let pool = PluralPairPool::from_raw("nouns", &[tag::NOUN], raw);
		assert_eq!(pool.count(false), 3);
		assert_eq!(pool.count(true), 4);

		let first = ScriptedRandom::new(vec![0.0]);
		assert_eq!(pool.select(false, &first, None).unwrap().text, "cat");
		assert_eq!(pool.select(true, &first, None).unwrap().text, "cats");
		let second = ScriptedRandom::new(vec![0.3]);
		assert_eq!(pool.select(false, &second, None).unwrap().text, "mouse");
		assert_eq!(pool.select(true, &second, None).unwrap().text, "mice");
	}

	#[test]
	fn it_skips_empty_slots() {
		let raw: Vec<RawPair> = serde_json::from_str(r#"[[null, "scissors"], ["dog", "dogs"]]"#).unwrap();
		let pool = PluralPairPool::from_raw("nouns", &[tag::NOUN], raw);
		let rng = SeededRandom::new(9);
		for _ in 0..100 {
			let word = pool.select(false, &rng, None).unwrap();
			assert_eq!(word.text, "dog");
			assert!(word.has(&[tag::NOUN, tag::SINGULAR]));
		}
	}

	#[test]
	fn it_never_repeats_singular_as_plural_for_distinct_pairs() {
		let raw: Vec<RawPair> = serde_json::from_str(r#"["cat", ["child", "children"], ["box", "boxes"]]"#).unwrap();
		let pool = PluralPairPool::from_raw("nouns", &[tag::NOUN], raw);
		for i in 0..3 {
			let rng = ScriptedRandom::new(vec![ScriptedRandom::pick(i, 3)]);
			let singular = pool.select(false, &rng, None).unwrap();
			let plural = pool.select(true, &rng, None).unwrap();
			assert_ne!(singular.text, plural.text);
		}
	}

	fn verbs(json: &str) -> VerbPool {
		let raw: Vec<RawVerb> = serde_json::from_str(json).unwrap();
		VerbPool::new("verbs.transitive", tag::TRANSITIVE, raw).unwrap()
	}

	fn only(pool: &VerbPool, form: &str) -> String {
		let form: VerbForm = form.parse().unwrap();
		pool.select(form, &ScriptedRandom::new(vec![0.0]), None).unwrap().text
	}

	#[test]
	fn it_conjugates_with_default_rules() {
		let pool = verbs(r#"["bake"]"#);
		assert_eq!(only(&pool, "presentSingular"), "bakes");
		assert_eq!(only(&pool, "presentPlural"), "bake");
		assert_eq!(only(&pool, "pastSingular"), "baked");
		assert_eq!(only(&pool, "futurePlural"), "will bake");
		assert_eq!(only(&pool, "perfectSingular"), "has baked");
		assert_eq!(only(&pool, "perfectPlural"), "have baked");
		assert_eq!(only(&pool, "subjunctiveSingular"), "would bake");
		assert_eq!(only(&pool, "presentContinuousSingular"), "is baking");
		assert_eq!(only(&pool, "pastContinuousPlural"), "were baking");

		let pool = verbs(r#"["carry", "watch", "see", "tie", "look after"]"#);
		let all = |form: &str| -> Vec<String> {
			(0..5).map(|i| {
				let rng = ScriptedRandom::new(vec![ScriptedRandom::pick(i, 5)]);
				pool.select(form.parse().unwrap(), &rng, None).unwrap().text
			}).collect()
		};
		assert_eq!(all("presentSingular"), ["carries", "watches", "sees", "ties", "looks after"]);
		assert_eq!(all("pastPlural"), ["carried", "watched", "seed", "tied", "looked after"]);
		assert_eq!(all("presentContinuousSingular"), ["is carrying", "is watching", "is seeing", "is tying", "is looking after"]);
	}

	#[test]
	fn it_applies_overrides_and_omissions() {
		let pool = verbs(r#"[{"base": "take", "past": "took", "participle": "taken"},
			{"base": "be", "ing": "being", "presentSingular": "is", "presentPlural": "are", "pastSingular": "was", "pastPlural": "were", "perfectPlural": null}]"#);
		let at = |i: usize, form: &str| {
			let rng = ScriptedRandom::new(vec![ScriptedRandom::pick(i, 2)]);
			pool.select(form.parse().unwrap(), &rng, None).unwrap().text
		};
		assert_eq!(at(0, "pastSingular"), "took");
		assert_eq!(at(0, "perfectSingular"), "has taken");
		assert_eq!(at(1, "presentSingular"), "is");
		assert_eq!(at(1, "pastPlural"), "were");
		assert_eq!(at(1, "pastContinuousSingular"), "was being");

		// "be" has no perfect plural: only "take" survives the filter
		assert_eq!(pool.count("perfectPlural".parse().unwrap()), 1);
		assert_eq!(at(1, "perfectPlural"), "have taken");
	}

	#[test]
	fn it_rejects_unknown_verb_forms() {
		let raw: Vec<RawVerb> = serde_json::from_str(r#"[{"base": "go", "pastSingulr": "went"}]"#).unwrap();
		let error = VerbPool::new("verbs.intransitive", tag::INTRANSITIVE, raw).unwrap_err();
		assert!(error.is_configuration());
		assert!(error.to_string().contains("verbs.intransitive[0].pastSingulr"));
	}

	#[test]
	fn it_fails_when_no_verb_has_the_form() {
		let pool = verbs(r#"[{"base": "must", "pastSingular": null, "pastPlural": null}]"#);
		let error = pool.select("pastSingular".parse().unwrap(), &SeededRandom::new(1), None).unwrap_err();
		assert!(error.is_configuration());
	}

	#[test]
	fn it_never_tags_past_singular_as_plural() {
		let pool = verbs(r#"["walk", "jump", {"base": "go", "past": "went"}, "fly"]"#);
		let rng = SeededRandom::new(21);
		for _ in 0..1_000 {
			let word = pool.select("pastSingular".parse().unwrap(), &rng, None).unwrap();
			assert!(!word.has(&[tag::PLURAL]));
			assert!(word.has(&[tag::VERB, "past", tag::SINGULAR, "pastSingular"]));
		}
	}

	#[test]
	fn it_biases_transitivity_by_pool_size() {
		let pools = VerbPools {
			transitive: verbs(r#"["see", "take", "hold"]"#),
			intransitive: verbs(r#"["sleep"]"#),
		};
		assert_eq!(pools.probability_intransitive(), 0.25);

		let rng = SeededRandom::new(4);
		let rounds = 40_000;
		let transitive = (0..rounds).filter(|_| pools.choose_transitive(&rng)).count();
		assert!((transitive as f64 / rounds as f64 - 0.75).abs() < 0.01);
	}

	#[test]
	fn it_keeps_the_vowel_alternate() {
		let pool = ArticlePool {
			definite: "the".into(),
			indefinite: vec![IndefiniteArticle { base: "a".into(), before_vowel: "an".into() }],
		};
		let mut word = pool.select_indefinite(&SeededRandom::new(1)).unwrap();
		assert_eq!(word.text, "a");
		word.fix_before(&TaggedWord::new("owl", [tag::NOUN]));
		assert_eq!(word.text, "an");
		assert!(pool.select_definite().has(&[tag::ARTICLE, tag::DEFINITE]));
	}

	#[test]
	fn it_partitions_indefinite_pronouns() {
		let raw: Vec<RawIndefinitePronoun> = serde_json::from_str(
			r#"[{"word": ["someone", "others"], "personal": true}, {"word": ["something", "things"], "personal": false}]"#,
		).unwrap();
		let pool = IndefinitePronounPool::new(raw);
		let rng = SeededRandom::new(2);
		let word = pool.select(Some(true), false, &rng, None).unwrap();
		assert_eq!(word.text, "someone");
		assert!(word.has(&[tag::PRONOUN, tag::INDEFINITE, tag::PERSONAL, tag::SINGULAR]));
		assert_eq!(pool.select(Some(false), true, &rng, None).unwrap().text, "things");
		assert_eq!(pool.count(None, true), 2);
	}

	#[test]
	fn it_draws_numerals_in_range() {
		let pool = NumeralPool { start: 0, end: 4 };
		let single = pool.select(false, &SeededRandom::new(1), None).unwrap();
		assert_eq!(single.text, "1");
		assert!(single.has(&[tag::REQUIRES_SINGULAR_NOUN]));

		assert_eq!(pool.count(true), 3);
		let rng = SeededRandom::new(8);
		for _ in 0..500 {
			let value: u32 = pool.select(true, &rng, None).unwrap().text.parse().unwrap();
			assert!((2..=4).contains(&value));
		}
	}
}
