use std::env;
use std::path::Path;

use actix_cors::Cors;
use actix_web::{get, post, web, App, HttpResponse, HttpServer, Responder};

use rs_pass_core::io::data_folder;
use rs_pass_core::{Generator, GeneratorOptions, Lexicon, MutatorRef, PassError, Registry, TemplateRef};
use serde::Deserialize;
use serde_json::Value;

/// Template used when a request names none.
const DEFAULT_TEMPLATE: &str = "default";

/// Upper bound on phrases per request.
const MAX_COUNT: usize = 1_000;

/// Struct representing query parameters for the `/v1/generate` endpoint
#[derive(Deserialize)]
struct GenerateParams {
	template: Option<String>,
	mutator: Option<String>,
	count: Option<usize>,
	unique: Option<bool>,
}

/// Body of `POST /v1/generate`; references are names or inline JSON.
#[derive(Deserialize)]
struct GenerateBody {
	template: Option<Value>,
	mutator: Option<Value>,
	count: Option<usize>,
	unique: Option<bool>,
}

#[derive(Deserialize)]
struct EntropyParams {
	template: Option<String>,
	mutator: Option<String>,
}

/// Read-only state shared by every worker; requests never lock it.
struct SharedData {
	generator: Generator,
}

/// Maps a library error to a response: configuration errors are the
/// caller's fault, everything else is ours.
fn error_response(error: PassError) -> HttpResponse {
	if error.is_configuration() {
		HttpResponse::BadRequest().body(error.to_string())
	} else {
		log::error!("{error}");
		HttpResponse::InternalServerError().body(error.to_string())
	}
}

/// Generates `count` phrases, overriding uniqueness for this request only.
fn generate(
	data: &SharedData,
	template: &TemplateRef,
	mutator: Option<&MutatorRef>,
	count: Option<usize>,
	unique: Option<bool>,
) -> Result<Vec<String>, HttpResponse> {
	let count = count.unwrap_or(1);
	if count > MAX_COUNT {
		return Err(HttpResponse::BadRequest().body(format!("count must be at most {MAX_COUNT}")));
	}

	let mut options = *data.generator.options();
	if let Some(unique) = unique {
		options.unique_words = unique;
	}
	data.generator.generate_batch_with(template, mutator, count, &options).map_err(error_response)
}

/// HTTP GET endpoint `/v1/generate`
///
/// Generates phrases from a named template and optional mutator preset.
/// Returns one phrase per line.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<SharedData>, query: web::Query<GenerateParams>) -> impl Responder {
	let template = TemplateRef::from(query.template.as_deref().unwrap_or(DEFAULT_TEMPLATE));
	let mutator = query.mutator.as_deref().map(MutatorRef::from);

	match generate(&data, &template, mutator.as_ref(), query.count, query.unique) {
		Ok(phrases) => HttpResponse::Ok().body(phrases.join("\n")),
		Err(response) => response,
	}
}

/// HTTP POST endpoint `/v1/generate`
///
/// Accepts inline templates and mutators. Returns a JSON array of phrases.
#[post("/v1/generate")]
async fn post_generated(data: web::Data<SharedData>, body: web::Json<GenerateBody>) -> impl Responder {
	let body = body.into_inner();
	let template = match body.template {
		Some(value) => match TemplateRef::from_value(value) {
			Ok(t) => t,
			Err(e) => return error_response(e),
		},
		None => TemplateRef::from(DEFAULT_TEMPLATE),
	};
	let mutator = match body.mutator.map(MutatorRef::from_value).transpose() {
		Ok(m) => m,
		Err(e) => return error_response(e),
	};

	match generate(&data, &template, mutator.as_ref(), body.count, body.unique) {
		Ok(phrases) => HttpResponse::Ok().json(phrases),
		Err(response) => response,
	}
}

#[get("/v1/entropy")]
async fn get_entropy(data: web::Data<SharedData>, query: web::Query<EntropyParams>) -> impl Responder {
	let template = TemplateRef::from(query.template.as_deref().unwrap_or(DEFAULT_TEMPLATE));
	let mutator = query.mutator.as_deref().map(MutatorRef::from);

	match data.generator.entropy_of(&template, mutator.as_ref()) {
		Ok(bits) => HttpResponse::Ok().body(format!("{bits:.2}")),
		Err(e) => error_response(e),
	}
}

#[get("/v1/templates")]
async fn get_templates(data: web::Data<SharedData>) -> impl Responder {
	HttpResponse::Ok().body(data.generator.registry().template_names().collect::<Vec<_>>().join("\n"))
}

#[get("/v1/mutators")]
async fn get_mutators(data: web::Data<SharedData>) -> impl Responder {
	HttpResponse::Ok().body(data.generator.registry().mutator_names().collect::<Vec<_>>().join("\n"))
}

/// Loads the lexicon and the registry from a data folder.
fn load_generator(folder: &Path) -> Result<Generator, PassError> {
	let lexicon = Lexicon::load_cached(folder.join("lexicon.json"))?;
	let registry = Registry::load(folder)?;
	log::info!(
		"Loaded {} templates and {} mutators from {}",
		registry.template_names().count(),
		registry.mutator_names().count(),
		folder.display()
	);

	let mut generator = Generator::new(lexicon, registry);
	let mut options = GeneratorOptions::new();
	options.set_nb_try(10).map_err(|e| PassError::config("nb_try", e))?;
	generator.set_options(options);
	Ok(generator)
}

/// Main entry point for the server.
///
/// Loads the data folder (first argument, `./data` by default) and starts
/// an Actix-web HTTP server sharing one generator between workers.
///
/// # Notes
/// - The server binds to 127.0.0.1:5000.
/// - `RUST_LOG` controls log verbosity.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::init();

	let folder = data_folder(env::args().nth(1).as_deref());
	let generator = load_generator(&folder).map_err(std::io::Error::other)?;
	let shared_data = web::Data::new(SharedData { generator });

	log::info!("Listening on 127.0.0.1:5000");
	HttpServer::new(move || {
		App::new()
			.wrap(Cors::permissive())
			.app_data(shared_data.clone())
			.service(get_generated)
			.service(post_generated)
			.service(get_entropy)
			.service(get_templates)
			.service(get_mutators)
	})
		.bind(("127.0.0.1", 5000))?
		.run()
		.await
}
