use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, Responder, get, web};

use serde::Deserialize;
use suggest_core::model::suggestion::{SuggestionEngine, SuggestionInput};

/// Struct representing query parameters for the `/v1/suggest` endpoint
#[derive(Deserialize)]
struct SuggestParams {
	text: Option<String>,
	n_words: Option<usize>,
	n_texts: Option<usize>,
}

/// Joins suggestion tokens into display text.
///
/// Cosmetic pass only: the space before a sentence-ending punctuation
/// token is dropped so `go home !` renders as `go home!`.
fn render(tokens: &[String]) -> String {
	let mut out = String::new();
	for token in tokens {
		let ends_sentence =
			!token.is_empty() && token.chars().all(|c| matches!(c, '?' | '.' | '!' | '"'));
		if !out.is_empty() && !ends_sentence {
			out.push(' ');
		}
		out.push_str(token);
	}
	out
}

/// HTTP GET endpoint `/v1/suggest`
///
/// Completes the last word of `text` and extends it by `n_words` tokens
/// using the frozen suggestion engine. Returns the rendered suggestion
/// as the response body.
#[get("/v1/suggest")]
async fn get_suggestion(
	data: web::Data<SuggestionEngine>,
	query: web::Query<SuggestParams>,
) -> impl Responder {
	let text = match &query.text {
		Some(text) => text,
		None => return HttpResponse::BadRequest().body("Missing 'text' query parameter"),
	};
	let n_words = query.n_words.unwrap_or(3);
	let n_texts = query.n_texts.unwrap_or(1);

	let results = data.suggest(SuggestionInput::Text(text), n_words, n_texts);
	match results.first() {
		Some(tokens) => HttpResponse::Ok().body(render(tokens)),
		None => HttpResponse::Ok().body(String::new()),
	}
}

#[get("/v1/health")]
async fn get_health() -> impl Responder {
	HttpResponse::Ok().body("ok")
}

/// Main entry point for the server.
///
/// Loads the trained engine once at startup (path from the first argument,
/// default `./data/suggestion.bin`) and shares it read-only with every
/// worker: the models are frozen after training, so no lock is needed.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::init();

	let model_path = std::env::args()
		.nth(1)
		.unwrap_or_else(|| "./data/suggestion.bin".to_owned());
	let engine = match SuggestionEngine::load(&model_path) {
		Ok(engine) => engine,
		Err(e) => {
			return Err(std::io::Error::other(format!(
				"Failed to load model from {model_path}: {e}"
			)));
		}
	};
	log::info!("Model loaded from {model_path}");

	let shared_engine = web::Data::new(engine);

	HttpServer::new(move || {
		App::new()
			.wrap(Cors::permissive())
			.app_data(shared_engine.clone())
			.service(get_suggestion)
			.service(get_health)
	})
		.bind(("127.0.0.1", 5000))?
		.run()
		.await
}
