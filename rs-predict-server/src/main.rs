use std::sync::Mutex;

use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, Responder, delete, get, post, put, web};

use rs_predict_core::io::read_file;
use rs_predict_core::model::session::{Session, SessionConfig};
use rs_predict_core::model::store::ModelStore;
use serde::Deserialize;

/// Location of the persisted model.
const MODEL_PATH: &str = "./data/model.dat";

/// Optional corpus used to pre-train a brand new model, one text per line.
const CORPUS_PATH: &str = "./data/corpus.txt";

/// Struct representing query parameters for the `/v1/predict` endpoint
#[derive(Deserialize)]
struct PredictParams {
	context: Option<String>,
	count: Option<usize>,
}

/// Struct representing query parameters for the `/v1/learn` endpoint
#[derive(Deserialize)]
struct LearnParams {
	text: String,
}

struct SharedData {
	session: Session,
}

/// HTTP GET endpoint `/v1/predict`
///
/// Returns the ranked next-word candidates for the given context as a
/// JSON array of `{word, probability}` objects.
#[get("/v1/predict")]
async fn get_predictions(data: web::Data<Mutex<SharedData>>, query: web::Query<PredictParams>) -> impl Responder {
	let context = query.context.clone().unwrap_or_default();
	let count = query.count.unwrap_or(5);

	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Session lock failed"),
	};

	HttpResponse::Ok().json(shared_data.session.predict(&context, count))
}

/// HTTP PUT endpoint `/v1/learn`
///
/// Appends a text to the session history; a full buffer retrains and
/// persists the model synchronously.
#[put("/v1/learn")]
async fn put_text(data: web::Data<Mutex<SharedData>>, query: web::Query<LearnParams>) -> impl Responder {
	let text = query.text.trim();
	if text.is_empty() {
		return HttpResponse::BadRequest().body("Missing or empty text");
	}

	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Session lock failed"),
	};

	shared_data.session.accumulate(text);
	HttpResponse::Ok().body("Text accumulated")
}

/// HTTP POST endpoint `/v1/retrain`
///
/// Retrains on all pending history immediately. Training is kept in
/// memory even when persisting the model fails.
#[post("/v1/retrain")]
async fn post_retrain(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Session lock failed"),
	};

	match shared_data.session.force_retrain() {
		Ok(_) => HttpResponse::Ok().body("Model retrained and persisted"),
		Err(e) => HttpResponse::InternalServerError().body(format!("Model retrained but not persisted: {e}")),
	}
}

/// HTTP GET endpoint `/v1/stats`
///
/// Returns vocabulary size, total word count, model order and pending
/// history size as JSON.
#[get("/v1/stats")]
async fn get_stats(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Session lock failed"),
	};
	HttpResponse::Ok().json(shared_data.session.stats())
}

/// HTTP DELETE endpoint `/v1/history`
///
/// Drops all pending history without retraining.
#[delete("/v1/history")]
async fn delete_history(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Session lock failed"),
	};
	shared_data.session.clear_history();
	HttpResponse::Ok().body("History cleared")
}

/// Main entry point for the server.
///
/// Builds the prediction session (loading any persisted model, or
/// pre-training a fresh one from the bundled corpus), wraps it in a
/// `Mutex` for thread safety, and serves the prediction API with
/// Actix-web.
///
/// # Notes
/// - The server binds to 127.0.0.1:5000.
/// - Pre-training only happens when no persisted model exists yet.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	tracing_subscriber::fmt::init();

	let initial_corpus = read_file(CORPUS_PATH).unwrap_or_default();
	let session = Session::new(SessionConfig::default(), ModelStore::new(MODEL_PATH), &initial_corpus)
		.map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

	let shared_data = web::Data::new(Mutex::new(SharedData { session }));

	HttpServer::new(move || {
		App::new()
			.wrap(Cors::permissive())
			.app_data(shared_data.clone())
			.service(get_predictions)
			.service(put_text)
			.service(post_retrain)
			.service(get_stats)
			.service(delete_history)
	})
		.bind(("127.0.0.1", 5000))?
		.run()
		.await
}
