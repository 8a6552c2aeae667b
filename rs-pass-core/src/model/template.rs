//! Sentence templates and the registry that names them.
//!
//! A template is either an ordered list of clauses or a collection of other
//! template names. Templates are validated once, when they enter a
//! [`Registry`] (or, for inline templates, before each use), so generation
//! never meets an unknown outcome name.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PassError, Result};
use crate::io::read_to_string;
use crate::model::factor::Factor;
use crate::model::mutator::MutatorConfig;
use crate::model::pool::Tense;
use crate::random::{self, RandomSource};

/// Declares a closed set of outcome names usable as factor keys.
macro_rules! outcome_names {
	($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
		$(#[$meta])*
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
		pub enum $name {
			$($variant),+
		}

		impl $name {
			pub const ALL: &'static [$name] = &[$($name::$variant),+];

			pub fn name(self) -> &'static str {
				match self {
					$($name::$variant => $text),+
				}
			}
		}

		impl FromStr for $name {
			type Err = String;

			fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
				$name::ALL
					.iter()
					.copied()
					.find(|k| k.name() == s)
					.ok_or_else(|| format!("unknown {} `{s}`", stringify!($name)))
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str(self.name())
			}
		}
	};
}

outcome_names! {
	/// Noun subtypes.
	NounKind {
		Common => "common",
		Adjective => "adjective",
		Proper => "proper",
	}
}

outcome_names! {
	/// What precedes a noun in its prelude.
	ArticleKind {
		None => "none",
		Definite => "definite",
		Indefinite => "indefinite",
		Demonstrative => "demonstrative",
		PersonalPronoun => "personalPronoun",
	}
}

outcome_names! {
	/// How an intransitive verb is realised.
	IntransitiveForm {
		NoNounClause => "noNounClause",
		Preposition => "preposition",
	}
}

/// Factors of a noun clause.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct NounClause {
	/// [`NounKind`] outcome
	pub subtype: Factor,
	/// Leading preposition
	pub preposition: Factor,
	pub plural: Factor,
	/// [`ArticleKind`] outcome for singular nouns
	pub singular_article: Factor,
	/// [`ArticleKind`] outcome for plural nouns; `indefinite` is not allowed
	pub plural_article: Factor,
	/// Adjective before a common noun
	pub adjective: Factor,
	/// Numeral before a plural common noun
	pub numeral: Factor,
}

impl Default for NounClause {
	fn default() -> Self {
		Self {
			subtype: Factor::Text(NounKind::Common.name().to_owned()),
			preposition: Factor::default(),
			plural: Factor::default(),
			singular_article: Factor::default(),
			plural_article: Factor::default(),
			adjective: Factor::default(),
			numeral: Factor::default(),
		}
	}
}

/// Factors of a verb clause.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct VerbClause {
	pub interrogative: Factor,
	pub adverb: Factor,
	/// [`IntransitiveForm`] outcome, consulted only for intransitive verbs
	pub intransitive: Factor,
	/// [`Tense`] outcome, ignored for interrogatives
	pub tense: Factor,
}

impl Default for VerbClause {
	fn default() -> Self {
		Self {
			interrogative: Factor::default(),
			adverb: Factor::default(),
			intransitive: Factor::default(),
			tense: Factor::Text(Tense::Present.name().to_owned()),
		}
	}
}

/// One unit of sentence construction.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Clause {
	Noun(NounClause),
	Verb(VerbClause),
	Conjunction,
	DirectSpeech,
}

/// A named template: clauses, or names of other templates to pick from.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum TemplateDef {
	Clauses(Vec<Clause>),
	Collection(Vec<String>),
}

/// How a caller designates a template.
#[derive(Clone, Debug, PartialEq)]
pub enum TemplateRef {
	Named(String),
	Inline(Vec<Clause>),
}

impl From<&str> for TemplateRef {
	fn from(name: &str) -> Self {
		TemplateRef::Named(name.to_owned())
	}
}

impl From<Vec<Clause>> for TemplateRef {
	fn from(clauses: Vec<Clause>) -> Self {
		TemplateRef::Inline(clauses)
	}
}

impl TemplateRef {
	/// Reads a name (`"simple"`) or an inline clause list from JSON.
	pub fn from_value(value: Value) -> Result<Self> {
		match value {
			Value::String(name) => Ok(TemplateRef::Named(name)),
			Value::Array(items) => Ok(TemplateRef::Inline(parse_clauses("template", items)?)),
			other => Err(PassError::config("template", format!("expected a name or a clause list, got {other}"))),
		}
	}
}

fn parse_clauses(field: &str, items: Vec<Value>) -> Result<Vec<Clause>> {
	items
		.into_iter()
		.enumerate()
		.map(|(i, item)| {
			serde_json::from_value(item).map_err(|e| PassError::config(format!("{field}[{i}]"), e.to_string()))
		})
		.collect()
}

impl TemplateDef {
	/// Decodes one template, naming the offending clause on error.
	pub fn from_value(name: &str, value: Value) -> Result<Self> {
		let field = format!("templates.{name}");
		let Value::Array(items) = value else {
			return Err(PassError::config(field, "expected an array"));
		};

		if !items.is_empty() && items.iter().all(Value::is_string) {
			let names = items.into_iter().filter_map(|v| v.as_str().map(str::to_owned)).collect();
			return Ok(TemplateDef::Collection(names));
		}
		Ok(TemplateDef::Clauses(parse_clauses(&field, items)?))
	}
}

/// Checks a factor whose outcomes must name a `K`.
///
/// `false` (never happens) is accepted; other scalars and odds are not names.
fn check_kind<K: FromStr<Err = String>>(factor: &Factor, field: &str) -> Result<()> {
	factor.validate(field)?;
	match factor {
		Factor::Bool(false) | Factor::Text(_) | Factor::Weights(_) => {}
		_ => return Err(PassError::config(field, "expected an outcome name or a weight map")),
	}
	for name in factor.names() {
		name.parse::<K>().map_err(|e| PassError::config(field, e))?;
	}
	Ok(())
}

/// Evaluates a validated kind factor. `None` means the factor was absent.
pub(crate) fn choose<K: FromStr<Err = String>>(factor: &Factor, rng: &dyn RandomSource) -> Result<Option<K>> {
	match factor.evaluate(rng).name() {
		Some(name) => name.parse().map(Some).map_err(|e| PassError::config("factor", e)),
		None => Ok(None),
	}
}

impl NounClause {
	fn validate(&self, field: &str) -> Result<()> {
		check_kind::<NounKind>(&self.subtype, &format!("{field}.subtype"))?;
		check_kind::<ArticleKind>(&self.singular_article, &format!("{field}.singularArticle"))?;

		let plural_field = format!("{field}.pluralArticle");
		check_kind::<ArticleKind>(&self.plural_article, &plural_field)?;
		if self.plural_article.names().contains(&ArticleKind::Indefinite.name()) {
			return Err(PassError::config(plural_field, "plural nouns cannot take an indefinite article"));
		}

		self.preposition.validate(&format!("{field}.preposition"))?;
		self.plural.validate(&format!("{field}.plural"))?;
		self.adjective.validate(&format!("{field}.adjective"))?;
		self.numeral.validate(&format!("{field}.numeral"))
	}
}

impl VerbClause {
	fn validate(&self, field: &str) -> Result<()> {
		check_kind::<IntransitiveForm>(&self.intransitive, &format!("{field}.intransitive"))?;
		check_kind::<Tense>(&self.tense, &format!("{field}.tense"))?;
		self.interrogative.validate(&format!("{field}.interrogative"))?;
		self.adverb.validate(&format!("{field}.adverb"))
	}
}

/// Validates every clause of a template.
pub fn validate_clauses(field: &str, clauses: &[Clause]) -> Result<()> {
	for (i, clause) in clauses.iter().enumerate() {
		let field = format!("{field}[{i}]");
		match clause {
			Clause::Noun(noun) => noun.validate(&field)?,
			Clause::Verb(verb) => verb.validate(&field)?,
			Clause::Conjunction | Clause::DirectSpeech => {}
		}
	}
	Ok(())
}

/// Named templates and mutator presets, owned by the caller.
///
/// # Invariants
/// - Every clause template is valid
/// - Every collection is non-empty and only names clause templates
#[derive(Clone, Debug, Default)]
pub struct Registry {
	templates: BTreeMap<String, TemplateDef>,
	mutators: BTreeMap<String, MutatorConfig>,
}

impl Registry {
	/// Builds a registry, validating every template.
	pub fn new(templates: BTreeMap<String, TemplateDef>, mutators: BTreeMap<String, MutatorConfig>) -> Result<Self> {
		for (name, template) in &templates {
			let field = format!("templates.{name}");
			match template {
				TemplateDef::Clauses(clauses) => validate_clauses(&field, clauses)?,
				TemplateDef::Collection(members) => {
					if members.is_empty() {
						return Err(PassError::config(field, "collection is empty"));
					}
					for member in members {
						match templates.get(member) {
							Some(TemplateDef::Clauses(_)) => {}
							Some(TemplateDef::Collection(_)) => {
								return Err(PassError::config(&field, format!("`{member}` is itself a collection")));
							}
							None => return Err(PassError::config(&field, format!("unknown template `{member}`"))),
						}
					}
				}
			}
		}
		Ok(Self { templates, mutators })
	}

	/// Parses `templates.json` and `mutators.json` contents.
	pub fn from_json(templates_json: &str, mutators_json: &str) -> Result<Self> {
		let raw: BTreeMap<String, Value> = serde_json::from_str(templates_json)?;
		let mut templates = BTreeMap::new();
		for (name, value) in raw {
			let template = TemplateDef::from_value(&name, value)?;
			templates.insert(name, template);
		}

		let raw: BTreeMap<String, Value> = serde_json::from_str(mutators_json)?;
		let mut mutators = BTreeMap::new();
		for (name, value) in raw {
			let mutator = MutatorConfig::from_value(&format!("mutators.{name}"), value)?;
			mutators.insert(name, mutator);
		}

		Self::new(templates, mutators)
	}

	/// Loads `templates.json` and `mutators.json` from a data folder.
	pub fn load<P: AsRef<Path>>(folder: P) -> Result<Self> {
		let folder = folder.as_ref();
		let templates = read_to_string(folder.join("templates.json"))?;
		let mutators = read_to_string(folder.join("mutators.json"))?;
		Self::from_json(&templates, &mutators)
	}

	pub fn template_names(&self) -> impl Iterator<Item = &str> {
		self.templates.keys().map(String::as_str)
	}

	pub fn mutator_names(&self) -> impl Iterator<Item = &str> {
		self.mutators.keys().map(String::as_str)
	}

	pub fn template(&self, name: &str) -> Result<&TemplateDef> {
		self.templates.get(name).ok_or_else(|| PassError::config("template", format!("unknown template `{name}`")))
	}

	pub fn mutator(&self, name: &str) -> Result<&MutatorConfig> {
		self.mutators.get(name).ok_or_else(|| PassError::config("mutator", format!("unknown mutator `{name}`")))
	}

	/// Clauses of a named clause template.
	pub(crate) fn clauses(&self, name: &str) -> Result<&[Clause]> {
		match self.template(name)? {
			TemplateDef::Clauses(clauses) => Ok(clauses),
			TemplateDef::Collection(_) => Err(PassError::config("template", format!("`{name}` is a collection"))),
		}
	}

	/// Resolves a template down to clauses, picking a collection member uniformly.
	pub fn resolve<'a>(&'a self, template: &'a TemplateRef, rng: &dyn RandomSource) -> Result<&'a [Clause]> {
		match template {
			TemplateRef::Inline(clauses) => {
				validate_clauses("template", clauses)?;
				Ok(clauses)
			}
			TemplateRef::Named(name) => match self.template(name)? {
				TemplateDef::Clauses(clauses) => Ok(clauses),
				TemplateDef::Collection(members) => {
					let member = &members[random::index(rng, members.len())];
					log::debug!("collection `{name}` resolved to `{member}`");
					self.clauses(member)
				}
			},
		}
	}
}
