use std::sync::Arc;

use rs_pass_core::model::mutator::{CaseMutation, CaseTechnique, DigitMutation, DigitTechnique};
use rs_pass_core::random::SeededRandom;
use rs_pass_core::{Generator, GeneratorOptions, Lexicon, MutatorConfig, MutatorRef, Registry, TemplateRef};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Load the word pools from "data/lexicon.json"
    // A compiled "data/lexicon.bin" is reused if present, written otherwise
    let lexicon = Lexicon::load_cached("./data/lexicon.json")?;

    // Load the named templates and mutator presets
    let registry = Registry::load("./data")?;
    for name in registry.template_names() {
        println!("Template: {}", name);
    }

    let mut app = Generator::new(lexicon, registry);

    // Forbid repeating a noun, verb, adjective or adverb inside one phrase,
    // and allow a few fresh attempts when a pool runs dry
    let mut options = GeneratorOptions::new();
    options.unique_words = true;
    options.set_nb_try(10)?;

    // Out-of-range retry count
    match options.set_nb_try(1_000_000) {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("{}", e),
    }
    app.set_options(options);

    // Generate from a named template
    let template = TemplateRef::from("default");
    for i in 0..5 {
        println!("Generated phrase {}: {}", i + 1, app.generate(&template, None)?);
    }

    // Same template with a named mutator preset
    let mutator = MutatorRef::from("strong");
    println!("Mutated phrase: {}", app.generate(&template, Some(&mutator))?);
    println!("Entropy: {:.1} bits", app.entropy_of(&template, Some(&mutator))?);

    // Inline mutator: capitalise two words, append one digit at the end
    let inline = MutatorRef::from(MutatorConfig {
        upper: Some(CaseMutation { technique: CaseTechnique::StartOfWord, count: 2 }),
        numbers: Some(DigitMutation { technique: DigitTechnique::EndOfPhrase, count: 1 }),
    });
    println!("Inline mutator: {}", app.generate(&template, Some(&inline))?);

    // Unknown template names are configuration errors
    match app.generate(&TemplateRef::from("unknown"), None) {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("{}", e),
    }

    // Reproducible phrases with a seeded source
    let app = app.with_random(Arc::new(SeededRandom::new(42)));
    for _ in 0..3 {
        println!("Seeded phrase: {}", app.generate(&TemplateRef::from("simple"), None)?);
    }

    // Many phrases at once, spread over every core
    let batch = app.generate_batch(&template, None, 100)?;
    println!("Generated {} phrases in parallel", batch.len());

    Ok(())
}
