use std::collections::HashMap;
use std::sync::Arc;

use rs_pass_core::random::SeededRandom;
use rs_pass_core::{Generator, Lexicon, MutatorRef, Registry, TemplateRef};

const DATA: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../data");

const SMALL_LEXICON: &str = r#"{
	"nouns": ["cat", "dog", "owl", "eel"],
	"properNouns": ["Alice", "Bob"],
	"articles": {"definite": "the", "indefinite": [{"base": "a", "beforeVowel": "an"}]},
	"verbs": {"transitive": ["see", "hold", "take"], "intransitive": ["sleep"]}
}"#;

fn small(templates: &str) -> Generator {
	let lexicon = Lexicon::from_json(SMALL_LEXICON).unwrap();
	let registry = Registry::from_json(templates, "{}").unwrap();
	Generator::new(lexicon, registry).with_random(Arc::new(SeededRandom::new(99)))
}

/// Plug-in Shannon entropy of the phrases actually generated.
fn empirical_bits(generator: &Generator, template: &TemplateRef, samples: usize) -> f64 {
	let mut counts: HashMap<String, usize> = HashMap::new();
	for _ in 0..samples {
		*counts.entry(generator.generate(template, None).unwrap()).or_default() += 1;
	}
	counts
		.values()
		.map(|&c| {
			let p = c as f64 / samples as f64;
			-p * p.log2()
		})
		.sum()
}

#[test]
fn it_matches_the_generated_distribution_for_nouns() {
	let generator = small(
		r#"{"noun": [{
			"type": "noun",
			"subtype": {"common": 1, "proper": 1},
			"plural": [1, 1],
			"singularArticle": {"definite": 1, "none": 1},
			"pluralArticle": "definite"
		}]}"#,
	);
	let template = TemplateRef::from("noun");
	let analytic = generator.entropy_of(&template, None).unwrap();
	assert!((analytic - 3.25).abs() < 1e-12);

	let empirical = empirical_bits(&generator, &template, 200_000);
	assert!((analytic - empirical).abs() < 0.01, "{analytic} vs {empirical}");
}

#[test]
fn it_matches_the_generated_distribution_for_verbs() {
	let generator = small(
		r#"{"verb": [
			{"type": "noun", "subtype": "proper"},
			{"type": "verb", "tense": {"present": 1, "past": 1}}
		]}"#,
	);
	let template = TemplateRef::from("verb");
	let analytic = generator.entropy_of(&template, None).unwrap();
	let empirical = empirical_bits(&generator, &template, 200_000);
	assert!((analytic - empirical).abs() < 0.01, "{analytic} vs {empirical}");
}

#[test]
fn it_is_deterministic_for_every_bundled_template() {
	let lexicon = Lexicon::load(format!("{DATA}/lexicon.json")).unwrap();
	let registry = Registry::load(DATA).unwrap();
	let generator = Generator::new(lexicon, registry);

	let names: Vec<String> = generator.registry().template_names().map(str::to_owned).collect();
	for name in &names {
		let template = TemplateRef::from(name.as_str());
		let first = generator.entropy_of(&template, None).unwrap();
		assert!(first > 10.0, "{name}: {first}");
		assert_eq!(first, generator.entropy_of(&template, None).unwrap());

		let strong = generator.entropy_of(&template, Some(&MutatorRef::from("strong"))).unwrap();
		assert!(strong > first);
	}
}

#[test]
fn it_averages_the_default_collection() {
	let lexicon = Lexicon::load(format!("{DATA}/lexicon.json")).unwrap();
	let registry = Registry::load(DATA).unwrap();
	let generator = Generator::new(lexicon, registry);

	let members = ["simple", "adjective", "question", "speech"];
	let mean = members
		.iter()
		.map(|m| generator.entropy_of(&TemplateRef::from(*m), None).unwrap())
		.sum::<f64>()
		/ members.len() as f64;
	let collection = generator.entropy_of(&TemplateRef::from("default"), None).unwrap();
	assert!((collection - (mean + 2.0)).abs() < 1e-9);
}
