//! Analytic strength of a template.
//!
//! The calculator walks the same decision tree as the generator without
//! drawing anything. Each term is weighted by the probability that the
//! corresponding draw actually happens; `multiplier` carries the probability
//! that the sentence is still running (an intransitive verb may end it).

use crate::error::Result;
use crate::model::factor::{Factor, binary_entropy, choice_bits};
use crate::model::lexicon::Lexicon;
use crate::model::pool::{Tense, VerbForm, VerbPool};
use crate::model::template::{
	ArticleKind, Clause, IntransitiveForm, NounClause, NounKind, Registry, TemplateDef, TemplateRef, VerbClause,
	validate_clauses,
};

pub(crate) struct EntropyCalculator<'a> {
	lexicon: &'a Lexicon,
}

impl<'a> EntropyCalculator<'a> {
	pub(crate) fn new(lexicon: &'a Lexicon) -> Self {
		Self { lexicon }
	}

	/// Bits of a template reference; collections average their members and
	/// add the bits of picking one.
	pub(crate) fn template_bits(&self, registry: &Registry, template: &TemplateRef) -> Result<f64> {
		match template {
			TemplateRef::Inline(clauses) => {
				validate_clauses("template", clauses)?;
				Ok(self.clauses_bits(clauses))
			}
			TemplateRef::Named(name) => match registry.template(name)? {
				TemplateDef::Clauses(clauses) => Ok(self.clauses_bits(clauses)),
				TemplateDef::Collection(members) => {
					let mut sum = 0.0;
					for member in members {
						sum += self.clauses_bits(registry.clauses(member)?);
					}
					Ok(sum / members.len() as f64 + choice_bits(members.len()))
				}
			},
		}
	}

	pub(crate) fn clauses_bits(&self, clauses: &[Clause]) -> f64 {
		let lexicon = self.lexicon;
		let mut multiplier = 1.0;
		// Probability that the last word so far is a preposition
		let mut after_preposition = 0.0;
		let mut bits = 0.0;

		for clause in clauses {
			match clause {
				Clause::Conjunction => {
					bits += choice_bits(lexicon.conjunctions.len()) * multiplier;
					after_preposition = 0.0;
				}
				Clause::DirectSpeech => {
					bits += choice_bits(lexicon.speech_verbs.len()) * multiplier;
					after_preposition = 0.0;
				}
				Clause::Noun(noun) => {
					bits += self.noun_bits(noun, after_preposition) * multiplier;
					// Only an absent noun leaves the previous word last
					let present: f64 = NounKind::ALL.iter().map(|k| noun.subtype.probability_of_name(k.name())).sum();
					after_preposition *= 1.0 - present;
				}
				Clause::Verb(verb) => {
					bits += self.verb_bits(verb) * multiplier;

					let intransitive = lexicon.verbs.probability_intransitive();
					let stop = intransitive * verb.intransitive.probability_of_name(IntransitiveForm::NoNounClause.name());
					let preposition =
						intransitive * verb.intransitive.probability_of_name(IntransitiveForm::Preposition.name());
					multiplier *= 1.0 - stop;
					after_preposition = if stop < 1.0 { preposition / (1.0 - stop) } else { 0.0 };
				}
			}
		}
		bits
	}

	fn noun_bits(&self, noun: &NounClause, after_preposition: f64) -> f64 {
		let lexicon = self.lexicon;
		let mut bits = noun.subtype.entropy_bits();
		for kind in NounKind::ALL {
			let p = noun.subtype.probability_of_name(kind.name());
			if p <= 0.0 {
				continue;
			}
			let inner = match kind {
				NounKind::Proper => choice_bits(lexicon.proper_nouns.len()),
				NounKind::Common => self.prelude_bits(noun, after_preposition) + self.common_bits(noun),
				NounKind::Adjective => self.prelude_bits(noun, after_preposition) + self.adjective_noun_bits(noun),
			};
			bits += p * inner;
		}
		bits
	}

	/// Preposition, plurality and article choice shared by common and
	/// adjective nouns.
	fn prelude_bits(&self, noun: &NounClause, after_preposition: f64) -> f64 {
		let lexicon = self.lexicon;
		let preposition = (1.0 - after_preposition)
			* (noun.preposition.entropy_bits()
				+ noun.preposition.probability_true() * choice_bits(lexicon.prepositions.len()));

		let plural = noun.plural.probability_true();
		let article = |factor: &Factor, is_plural: bool| -> f64 {
			let draws: f64 = ArticleKind::ALL
				.iter()
				.map(|kind| factor.probability_of_name(kind.name()) * self.article_bits(*kind, is_plural))
				.sum();
			factor.entropy_bits() + draws
		};

		preposition
			+ noun.plural.entropy_bits()
			+ (1.0 - plural) * article(&noun.singular_article, false)
			+ plural * article(&noun.plural_article, true)
	}

	fn article_bits(&self, kind: ArticleKind, plural: bool) -> f64 {
		let lexicon = self.lexicon;
		match kind {
			ArticleKind::None | ArticleKind::Definite => 0.0,
			ArticleKind::Indefinite => choice_bits(lexicon.articles.indefinite.len()),
			ArticleKind::Demonstrative => choice_bits(lexicon.demonstratives.count(plural)),
			ArticleKind::PersonalPronoun => choice_bits(lexicon.personal_pronouns.count(plural)),
		}
	}

	fn common_bits(&self, noun: &NounClause) -> f64 {
		let lexicon = self.lexicon;
		let plural = noun.plural.probability_true();
		let numeral = plural
			* (noun.numeral.entropy_bits()
				+ noun.numeral.probability_true() * choice_bits(lexicon.numerals.count(true)));
		let adjective =
			noun.adjective.entropy_bits() + noun.adjective.probability_true() * choice_bits(lexicon.adjectives.len());
		let noun_draw = (1.0 - plural) * choice_bits(lexicon.nouns.count(false)) + plural * choice_bits(lexicon.nouns.count(true));
		numeral + adjective + noun_draw
	}

	fn adjective_noun_bits(&self, noun: &NounClause) -> f64 {
		let lexicon = self.lexicon;
		let plural = noun.plural.probability_true();
		let pronoun: f64 = [true, false]
			.into_iter()
			.map(|personal| {
				let pronouns = &lexicon.indefinite_pronouns;
				0.5 * ((1.0 - plural) * choice_bits(pronouns.count(Some(personal), false))
					+ plural * choice_bits(pronouns.count(Some(personal), true)))
			})
			.sum();
		// adjective draw, personal coin, pronoun draw
		choice_bits(lexicon.adjectives.len()) + 1.0 + pronoun
	}

	fn verb_bits(&self, verb: &VerbClause) -> f64 {
		let lexicon = self.lexicon;
		let interrogative = verb.interrogative.probability_true();
		let adverb = verb.adverb.probability_true();
		let intransitive = lexicon.verbs.probability_intransitive();
		let preposition = verb.intransitive.probability_of_name(IntransitiveForm::Preposition.name());

		// Presence and before/after placement are both counted on the factor
		let mut bits = verb.interrogative.entropy_bits() + 2.0 * verb.adverb.entropy_bits();
		bits += binary_entropy(intransitive);
		bits += interrogative * choice_bits(lexicon.interrogatives.len());
		bits += adverb * (choice_bits(lexicon.adverbs.len()) + 1.0);
		bits += intransitive * preposition * choice_bits(lexicon.prepositions.len());

		bits += intransitive * verb.intransitive.entropy_bits();
		bits += (1.0 - interrogative) * verb.tense.entropy_bits();
		bits += (1.0 - intransitive) * self.verb_draw_bits(&lexicon.verbs.transitive, verb, interrogative);
		bits += intransitive * self.verb_draw_bits(&lexicon.verbs.intransitive, verb, interrogative);
		bits
	}

	/// Bits of drawing the verb itself; subject plurality is unknown
	/// statically, so both pluralities weigh the same.
	fn verb_draw_bits(&self, pool: &VerbPool, verb: &VerbClause, interrogative: f64) -> f64 {
		let question = choice_bits(pool.count(VerbForm::new(Tense::Present, true)));

		let named: f64 = Tense::ALL.iter().map(|t| verb.tense.probability_of_name(t.name())).sum();
		let statement: f64 = Tense::ALL
			.iter()
			.map(|tense| {
				let mut p = verb.tense.probability_of_name(tense.name());
				if *tense == Tense::Present {
					// An absent tense factor falls back to the present
					p += 1.0 - named;
				}
				let forms = choice_bits(pool.count(VerbForm::new(*tense, false)))
					+ choice_bits(pool.count(VerbForm::new(*tense, true)));
				p * forms / 2.0
			})
			.sum();

		interrogative * question + (1.0 - interrogative) * statement
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const LEXICON: &str = r#"{
		"nouns": ["cat", "dog", "owl", "eel"],
		"properNouns": ["Alice", "Bob"],
		"adjectives": ["red", "big", "odd", "shy"],
		"adverbs": ["slowly", "boldly"],
		"prepositions": ["on", "under", "near", "by"],
		"conjunctions": ["and", "but", "so", "yet", "or", "nor", "for", "then"],
		"interrogatives": ["do", "did"],
		"articles": {"definite": "the", "indefinite": [{"base": "a", "beforeVowel": "an"}]},
		"verbs": {"transitive": ["see", "hold", "take"], "intransitive": ["sleep"]}
	}"#;

	fn calculator_bits(clauses: serde_json::Value) -> f64 {
		let lexicon = Lexicon::from_json(LEXICON).unwrap();
		let clauses: Vec<Clause> = serde_json::from_value(clauses).unwrap();
		EntropyCalculator::new(&lexicon).clauses_bits(&clauses)
	}

	#[test]
	fn it_counts_plain_pools() {
		let bits = calculator_bits(serde_json::json!([{"type": "conjunction"}]));
		assert!((bits - 3.0).abs() < 1e-12);
		let bits = calculator_bits(serde_json::json!([{"type": "noun", "subtype": "proper"}]));
		assert!((bits - 1.0).abs() < 1e-12);
	}

	#[test]
	fn it_weights_noun_subtypes() {
		// subtype: 1 bit; common: plural 1 + singular article 0.5 * 1 + noun 2; proper: 1
		let bits = calculator_bits(serde_json::json!([{
			"type": "noun",
			"subtype": {"common": 1, "proper": 1},
			"plural": [1, 1],
			"singularArticle": {"definite": 1, "none": 1},
			"pluralArticle": "definite"
		}]));
		assert!((bits - 3.25).abs() < 1e-12, "{bits}");
	}

	#[test]
	fn it_skips_the_preposition_after_a_preposition() {
		let alone = calculator_bits(serde_json::json!([{"type": "noun", "preposition": [1, 1]}]));
		// 1 bit of presence + 0.5 * 2 bits of preposition + 2 bits of noun
		assert!((alone - 4.0).abs() < 1e-12, "{alone}");

		let verb = serde_json::json!({"type": "verb", "intransitive": "preposition"});
		let with_verb = calculator_bits(serde_json::json!([verb.clone()]));
		let both = calculator_bits(serde_json::json!([verb, {"type": "noun", "preposition": [1, 1]}]));
		// the noun follows a preposition a quarter of the time
		assert!((both - with_verb - (0.75 * 2.0 + 2.0)).abs() < 1e-12, "{both} {with_verb}");
	}

	#[test]
	fn it_shrinks_the_multiplier_after_terminal_verbs() {
		let verb = serde_json::json!({"type": "verb", "intransitive": {"noNounClause": 1}});
		let alone = calculator_bits(serde_json::json!([verb.clone()]));
		let followed = calculator_bits(serde_json::json!([verb, {"type": "conjunction"}]));
		// a quarter of the sentences stop at the verb
		assert!((followed - alone - 0.75 * 3.0).abs() < 1e-12);
	}

	#[test]
	fn it_counts_verb_terms() {
		let plain = calculator_bits(serde_json::json!([{"type": "verb"}]));
		// size split + transitive draw (3 verbs) + intransitive draw (1 verb)
		let expected = binary_entropy(0.25) + 0.75 * 3f64.log2();
		assert!((plain - expected).abs() < 1e-12, "{plain}");

		let adverb = calculator_bits(serde_json::json!([{"type": "verb", "adverb": [1, 1]}]));
		// twice the factor entropy, plus half the time the adverb and its placement
		assert!((adverb - plain - (2.0 + 0.5 * (1.0 + 1.0))).abs() < 1e-12, "{adverb}");

		let question = calculator_bits(serde_json::json!([{"type": "verb", "interrogative": true, "tense": {"past": 1, "future": 1}}]));
		// the tense factor is ignored by questions; the interrogative pool is not
		assert!((question - plain - 1.0).abs() < 1e-12, "{question}");
	}

	#[test]
	fn it_averages_collections() {
		let lexicon = Lexicon::from_json(LEXICON).unwrap();
		let registry = Registry::from_json(
			r#"{"one": [{"type": "conjunction"}], "two": [{"type": "conjunction"}, {"type": "conjunction"}], "both": ["one", "two"]}"#,
			"{}",
		)
		.unwrap();
		let calculator = EntropyCalculator::new(&lexicon);
		let bits = calculator.template_bits(&registry, &TemplateRef::from("both")).unwrap();
		assert!((bits - (4.5 + 1.0)).abs() < 1e-12);
		assert_eq!(bits, calculator.template_bits(&registry, &TemplateRef::from("both")).unwrap());
	}

	#[test]
	fn it_rejects_unknown_templates() {
		let lexicon = Lexicon::from_json(LEXICON).unwrap();
		let error = EntropyCalculator::new(&lexicon)
			.template_bits(&Registry::default(), &TemplateRef::from("nope"))
			.unwrap_err();
		assert!(error.is_configuration());
	}
}
