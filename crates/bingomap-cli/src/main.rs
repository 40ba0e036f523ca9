//! `bingomap` — command-line client for the BingoMap server.
//!
//! # Usage
//!
//! ```
//! bingomap register --email ana@example.com
//! bingomap login --email ana@example.com
//! bingomap map
//! bingomap add SP "Ana Souza"
//! bingomap --url http://localhost:3000 ranking
//! ```

mod board;
mod client;
mod session;
mod storage;
mod view;

use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use bingomap_core::StateCode;
use board::{Mutation, ViewerBoard};
use clap::{Parser, Subcommand};
use client::ApiClient;
use serde::Deserialize;
use session::{RegisterOutcome, Screen, Session, validate_registration};
use storage::{FileTokenStore, StoredSession};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

const DEFAULT_URL: &str = "http://localhost:3000";

const LOGIN_REQUIRED: &str =
  "Você precisa estar logado. Use `bingomap login --email <email>`.";
const BAD_CREDENTIALS: &str = "Email ou senha incorretos";
const REGISTER_FAILED: &str =
  "Não foi possível criar a conta. Este email já pode estar em uso.";
const UNEXPECTED: &str = "Ocorreu um erro. Tente novamente.";

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "bingomap", about = "Command-line client for BingoMap Brasil")]
struct Args {
  /// Path to a TOML config file (url, session).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the BingoMap server (default: http://localhost:3000).
  #[arg(long, env = "BINGOMAP_URL")]
  url: Option<String>,

  /// Where the login session is kept
  /// (default: ~/.config/bingomap/session.json).
  #[arg(long, env = "BINGOMAP_SESSION", value_name = "FILE")]
  session: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Create an account. Password and confirmation are read from stdin.
  Register {
    #[arg(long)]
    email: String,
  },
  /// Log in and keep the token for later commands.
  Login {
    #[arg(long)]
    email: String,
  },
  /// Forget the stored token.
  Logout,
  #[command(flatten)]
  Session(SessionCommand),
}

/// Subcommands that need a verified session.
#[derive(Subcommand, Debug)]
enum SessionCommand {
  /// Show who is logged in.
  Whoami,
  /// Show every state with its viewer count.
  Map {
    /// Only list the viewers of this state, with their ids.
    #[arg(long, value_name = "UF")]
    state: Option<StateCode>,
  },
  /// Show the states with the most viewers.
  Ranking,
  /// Add a viewer to a state.
  Add {
    state: StateCode,
    #[arg(required = true, num_args = 1..)]
    name:  Vec<String>,
  },
  /// Remove a viewer by id (see `map --state`).
  Remove { id: Uuid },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:     String,
  #[serde(default)]
  session: Option<PathBuf>,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<ExitCode> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let base_url = args
    .url
    .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
    .unwrap_or_else(|| DEFAULT_URL.to_string());
  let session_path = args
    .session
    .or(file_cfg.session)
    .unwrap_or_else(default_session_path);

  let store = FileTokenStore::new(session_path);
  tracing::debug!(path = %store.path().display(), %base_url, "starting");

  let client = ApiClient::new(base_url)?;
  let mut session = Session::new(client, store);

  run(args.command, &mut session).await
}

type CliSession = Session<ApiClient, FileTokenStore>;

async fn run(command: Command, session: &mut CliSession) -> Result<ExitCode> {
  match command {
    Command::Register { email } => register(session, &email).await,
    Command::Login { email } => login(session, &email).await,
    Command::Logout => {
      session.logout()?;
      println!("Sessão encerrada.");
      Ok(ExitCode::SUCCESS)
    }
    Command::Session(command) => {
      session.initialize().await?;
      tracing::debug!(state = ?session.state(), "session initialized");
      let logged_in = match session.screen() {
        Screen::Ready(s) => s.clone(),
        Screen::Loading => {
          eprintln!("Carregando…");
          return Ok(ExitCode::FAILURE);
        }
        Screen::RedirectToLogin => {
          eprintln!("{LOGIN_REQUIRED}");
          return Ok(ExitCode::FAILURE);
        }
      };
      let board = ViewerBoard::new(session.api().clone());
      authenticated(command, &logged_in, board).await
    }
  }
}

// ─── Commands ─────────────────────────────────────────────────────────────────

async fn register(session: &CliSession, email: &str) -> Result<ExitCode> {
  let password = prompt("Senha: ")?;
  let confirm = prompt("Confirmar senha: ")?;

  if let Err(message) = validate_registration(email, &password, &confirm) {
    eprintln!("{message}");
    return Ok(ExitCode::FAILURE);
  }

  match session.register(email.trim(), &password).await {
    Ok(RegisterOutcome::Created(user)) => {
      println!("Conta criada para {}. Faça login para continuar.", user.email);
      Ok(ExitCode::SUCCESS)
    }
    Ok(RegisterOutcome::Rejected(reason)) => {
      tracing::debug!(%reason, "registration refused");
      eprintln!("{REGISTER_FAILED}");
      Ok(ExitCode::FAILURE)
    }
    Err(e) => Ok(unexpected(e)),
  }
}

async fn login(session: &mut CliSession, email: &str) -> Result<ExitCode> {
  let password = prompt("Senha: ")?;

  match session.login(email.trim(), &password).await {
    Ok(Ok(user)) => {
      println!("Logado como {}.", user.email);
      Ok(ExitCode::SUCCESS)
    }
    Ok(Err(reason)) => {
      tracing::debug!(%reason, "login refused");
      eprintln!("{BAD_CREDENTIALS}");
      Ok(ExitCode::FAILURE)
    }
    Err(e) => Ok(unexpected(e)),
  }
}

async fn authenticated(
  command: SessionCommand,
  logged_in: &StoredSession,
  mut board: ViewerBoard<ApiClient>,
) -> Result<ExitCode> {
  // `whoami` needs no viewer data.
  if !matches!(command, SessionCommand::Whoami)
    && let Err(e) = board.refresh().await
  {
    return Ok(unexpected(e));
  }

  let token = logged_in.token.as_str();
  let outcome = match command {
    SessionCommand::Map { state: None } => {
      print!("{}", view::render_map(board.states()));
      return Ok(ExitCode::SUCCESS);
    }
    SessionCommand::Map { state: Some(code) } => {
      print!("{}", view::render_state(code.as_ref(), board.viewers_in(code.as_ref())));
      return Ok(ExitCode::SUCCESS);
    }
    SessionCommand::Ranking => {
      print!("{}", view::render_ranking(&board.ranking()));
      return Ok(ExitCode::SUCCESS);
    }
    SessionCommand::Add { state, name } => board.add(token, state.as_ref(), &name.join(" ")).await,
    SessionCommand::Remove { id } => board.remove(token, id).await,
    SessionCommand::Whoami => {
      println!("{} ({})", logged_in.user.email, logged_in.user.id);
      return Ok(ExitCode::SUCCESS);
    }
  };

  match outcome {
    Ok(Mutation::Applied) => {
      print!("{}", view::render_map(board.states()));
      Ok(ExitCode::SUCCESS)
    }
    Ok(Mutation::Refused(message)) => {
      eprintln!("{message}");
      Ok(ExitCode::FAILURE)
    }
    Err(e) => Ok(unexpected(e)),
  }
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn unexpected(e: anyhow::Error) -> ExitCode {
  tracing::error!(error = %format!("{e:#}"), "request failed");
  eprintln!("{UNEXPECTED}");
  ExitCode::FAILURE
}

/// Read one line from stdin (no echo control).
fn prompt(label: &str) -> Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  eprint!("{label}");
  io::stderr().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line).context("reading stdin")?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}

fn default_session_path() -> PathBuf {
  match std::env::var("HOME") {
    Ok(home) => PathBuf::from(home).join(".config/bingomap/session.json"),
    Err(_) => PathBuf::from(".bingomap-session.json"),
  }
}
