use std::sync::Arc;

use rs_pass_core::model::template::Clause;
use rs_pass_core::random::{self, ScriptedRandom};
use rs_pass_core::{Generator, Lexicon, Registry, TemplateRef};

// Runs in its own test binary: rebinding the process-wide source here cannot
// disturb the other suites.
#[test]
fn it_reads_the_process_wide_source_at_every_draw() {
	let lexicon = Lexicon::from_json(r#"{"properNouns": ["Alice", "Bob", "Chloe", "Dmitri"]}"#).unwrap();
	let generator = Generator::new(lexicon, Registry::default());
	let clauses: Vec<Clause> = serde_json::from_value(serde_json::json!([{"type": "noun", "subtype": "proper"}])).unwrap();
	let template = TemplateRef::from(clauses);

	random::set_random_source(Arc::new(ScriptedRandom::new(vec![ScriptedRandom::pick(2, 4)])));
	assert_eq!(random::random(4.0).floor(), 2.0);
	assert_eq!(generator.generate(&template, None).unwrap(), "Chloe");

	random::set_random_source(Arc::new(ScriptedRandom::new(vec![ScriptedRandom::pick(3, 4)])));
	assert_eq!(generator.generate(&template, None).unwrap(), "Dmitri");

	random::reset_random_source();
	let value = random::random(1.0);
	assert!((0.0..1.0).contains(&value));
}
