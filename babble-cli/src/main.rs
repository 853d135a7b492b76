use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;

use babble_core::command;
use babble_core::corpus::Archive;
use babble_core::{ChainModel, Config};

const HELP: &str = "\
BABBLE COMMANDS:
 speak              Generates a sentence.
 stats              Prints the stats for the current brain.
 output             Outputs the brain. WARNING: for large brains, this takes FOREVER.
 respond <phrase>   Responds to a phrase, interpreting it as a bot command.
 save [path]        Writes a snapshot of the brain.
 help               Prints this menu.
 exit               Shuts down.
All other input is learned as a sentence. It is NOT recorded in the archive.";

/// Interactive babbler: learns from the archive, then talks on stdin/stdout.
#[derive(Parser, Debug)]
#[command(name = "babble", version, about)]
struct Args {
	/// Configuration file (a default one is written if missing)
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Brain snapshot: loaded instead of the archive when present, written otherwise
	#[arg(short, long)]
	snapshot: Option<PathBuf>,
}

/// Builds the brain from a snapshot if there is one, else from the archive.
fn build_model(config: &Config, snapshot: Option<&Path>) -> anyhow::Result<ChainModel> {
	if let Some(path) = snapshot.filter(|p| p.exists()) {
		let model = ChainModel::load(path)
			.with_context(|| format!("could not load snapshot {}", path.display()))?;
		if model.prefix_len() != config.prefix_length {
			log::warn!(
				"snapshot uses prefix length {}, config says {}",
				model.prefix_len(),
				config.prefix_length
			);
		}
		log::info!("loaded snapshot {}", path.display());
		return Ok(model);
	}

	let mut model = ChainModel::new(config.prefix_length)?;
	let archive = Archive::open(&config.archive_dir)
		.with_context(|| format!("could not open archive {}", config.archive_dir.display()))?;
	let files = archive
		.load_into(&mut model)
		.with_context(|| format!("could not load archive {}", config.archive_dir.display()))?;
	log::info!("learned {} archive files", files);

	if let Some(path) = snapshot {
		model.save(path).with_context(|| format!("could not write snapshot {}", path.display()))?;
		log::info!("wrote snapshot {}", path.display());
	}

	Ok(model)
}

/// Command loop over an owned brain.
struct Repl {
	model: ChainModel,
	config: Config,
	snapshot: Option<PathBuf>,
}

impl Repl {
	fn new(model: ChainModel, config: Config, snapshot: Option<PathBuf>) -> Self {
		Self { model, config, snapshot }
	}

	fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> io::Result<()> {
		write!(out, "CMD > ")?;
		out.flush()?;
		for line in input.lines() {
			if !self.handle(line?.trim(), out)? {
				break;
			}
			write!(out, "CMD > ")?;
			out.flush()?;
		}
		writeln!(out, "Smell ya later")
	}

	/// Handles one line. Returns `false` once the user asked to exit.
	fn handle<W: Write>(&mut self, line: &str, out: &mut W) -> io::Result<bool> {
		if line.is_empty() {
			return Ok(true);
		}

		let (command, rest) = match line.split_once(char::is_whitespace) {
			Some((command, rest)) => (command, rest.trim()),
			None => (line, ""),
		};

		match command {
			"help" => writeln!(out, "{}", HELP)?,
			"stats" => writeln!(out, "{}", self.model.stats())?,
			"output" => {
				for (prefix, suffixes) in self.model.entries() {
					writeln!(out, "({}) {:?}: {}", suffixes.total(), prefix, suffixes)?;
				}
			}
			"speak" => match self.model.sentence(self.config.sentence_length) {
				Ok(sentence) => writeln!(out, "{}", sentence)?,
				Err(e) => writeln!(out, "Error: {}", e)?,
			},
			"respond" => {
				let words: Vec<&str> = rest.split_whitespace().collect();
				let reply = command::interpret(&self.model, &words, self.config.sentence_length);
				writeln!(out, "{}", reply.unwrap_or_default())?;
			}
			"save" => {
				let path = match (rest, &self.snapshot) {
					("", Some(path)) => path.clone(),
					("", None) => {
						writeln!(out, "No snapshot path given.")?;
						return Ok(true);
					}
					(path, _) => PathBuf::from(path),
				};
				match self.model.save(&path) {
					Ok(()) => writeln!(out, "Saved brain to {}", path.display())?,
					Err(e) => writeln!(out, "Error: {}", e)?,
				}
			}
			"exit" => return Ok(false),
			_ => {
				self.model.learn(line);
				writeln!(out, "Added {:?} to brain.", line)?;
			}
		}

		Ok(true)
	}
}

fn main() -> anyhow::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
	let args = Args::parse();

	let config = Config::load_or_init(&args.config)?;
	let model = build_model(&config, args.snapshot.as_deref())?;
	println!("{}", model.stats());

	let mut repl = Repl::new(model, config, args.snapshot);
	let stdin = io::stdin();
	let mut stdout = io::stdout();
	repl.run(stdin.lock(), &mut stdout)?;

	Ok(())
}
