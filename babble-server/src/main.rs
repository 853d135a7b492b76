use std::path::PathBuf;
use std::sync::Mutex;

use actix_web::{get, post, put, web, App, HttpResponse, HttpServer, Responder};
use anyhow::Context;
use clap::Parser;
use serde::{Deserialize, Serialize};

use babble_core::corpus::Archive;
use babble_core::responder::Responder as ReplyPolicy;
use babble_core::{ChainError, ChainModel, Config};

/// Query parameters for the `/v1/generate` endpoint
#[derive(Deserialize)]
struct GenerateParams {
	max_words: Option<usize>,
	seed: Option<String> // space separated words to continue from
}

/// A chat message heard by the bot
#[derive(Deserialize, Serialize)]
struct Message {
	author: String,
	content: String,
}

/// The bot's answer to a message, if it has one
#[derive(Deserialize, Serialize, Debug, PartialEq)]
struct Reply {
	reply: Option<String>,
}

struct SharedData {
	model: ChainModel,
	archive: Archive,
	policy: ReplyPolicy,
	config: Config,
}

#[derive(Parser, Debug)]
#[command(name = "babble-server", version, about)]
struct Args {
	/// Configuration file (a default one is written if missing)
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Address to listen on
	#[arg(short, long, default_value = "127.0.0.1:5000")]
	bind: String,
}

/// HTTP GET endpoint `/v1/generate`
///
/// Generates a sentence, optionally continuing `seed`.
/// The seed words are not repeated in the response body.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<Mutex<SharedData>>, query: web::Query<GenerateParams>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	let max_words = query.max_words.unwrap_or(shared_data.config.sentence_length);

	let generated = match &query.seed {
		Some(seed) if !seed.trim().is_empty() => {
			let seed: Vec<&str> = seed.split_whitespace().collect();
			shared_data
				.model
				.generate_from(max_words, &seed)
				.map(|words| babble_core::format::format(&words))
		}
		_ => shared_data.model.sentence(max_words),
	};

	match generated {
		Ok(sentence) => HttpResponse::Ok().body(sentence),
		Err(e @ ChainError::EmptyModel) => HttpResponse::ServiceUnavailable().body(e.to_string()),
		Err(ChainError::UnknownPrefix(_)) => HttpResponse::NoContent().finish(),
		Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
	}
}

/// HTTP POST endpoint `/v1/message`
///
/// Archives and learns the message, then maybe replies to it.
#[post("/v1/message")]
async fn post_message(data: web::Data<Mutex<SharedData>>, message: web::Json<Message>) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	if !message.content.is_empty() {
		if let Err(e) = shared_data.archive.record(&message.author, &message.content) {
			log::warn!("could not archive message from {}: {}", message.author, e);
		}
		shared_data.model.learn(&message.content);
	}

	let reply = shared_data.policy.respond(&shared_data.model, &message.content);
	HttpResponse::Ok().json(Reply { reply })
}

/// HTTP PUT endpoint `/v1/learn`
///
/// Learns the plain text body without archiving it.
#[put("/v1/learn")]
async fn put_learn(data: web::Data<Mutex<SharedData>>, body: String) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	shared_data.model.learn(&body);
	HttpResponse::Ok().body(format!("{} prefixes known", shared_data.model.prefix_count()))
}

#[get("/v1/stats")]
async fn get_stats(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	HttpResponse::Ok().body(shared_data.model.stats().to_string())
}

/// Loads the configuration and learns the whole archive.
fn startup(args: &Args) -> anyhow::Result<SharedData> {
	let config = Config::load_or_init(&args.config)?;
	let archive = Archive::open(&config.archive_dir)
		.with_context(|| format!("could not open archive {}", config.archive_dir.display()))?;

	let mut model = ChainModel::new(config.prefix_length)?;
	let files = archive
		.load_into(&mut model)
		.with_context(|| format!("could not load archive {}", config.archive_dir.display()))?;
	log::info!("learned {} archive files", files);

	Ok(SharedData { model, archive, policy: ReplyPolicy::new(&config), config })
}

/// Main entry point for the server.
///
/// Learns the archive, wraps the model in a `Mutex` so learning and
/// generation never interleave, and starts an Actix-web HTTP server.
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
	let args = Args::parse();

	let shared_data = startup(&args)?;
	log::info!("\n{}", shared_data.model.stats());
	let shared_model = web::Data::new(Mutex::new(shared_data));

	log::info!("listening on {}", args.bind);
	HttpServer::new(move || {
		App::new()
			.app_data(shared_model.clone())
			.service(get_generated)
			.service(post_message)
			.service(put_learn)
			.service(get_stats)
	})
		.bind(&args.bind)?
		.run()
		.await?;

	Ok(())
}
