//! Strictly Arena - Unified CLI
//!
//! Plays recorded matches and inspects their history.

#![warn(missing_docs)]

mod cli;

use std::path::Path;

use anyhow::{Result, bail};
use clap::Parser;
use cli::{Cli, Command};
use strictly_arena::games::tictactoe::{FirstAvailableAgent, RandomLegalAgent, TicTacToe};
use strictly_arena::{
    ActorFor, ActorId, AgentKind, ArenaConfig, Engine, GameSpec, HistorySource, MatchId,
    MatchRepository, MemoryMatchStore, generate_seed, verify_replay,
};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

type BoxedActor = Box<ActorFor<'static, TicTacToe>>;

fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ArenaConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Play {
            turns,
            seed,
            agent_a,
            agent_b,
            dry_run,
        } => run_play(&config, turns, seed, agent_a, agent_b, dry_run),
        Command::Schemas { out, register } => run_schemas(&config, &out, register),
        Command::List { limit } => run_list(&config, limit),
        Command::Show { match_id } => run_show(&config, match_id),
        Command::Verify { match_id } => run_verify(&config, match_id),
    }
}

/// Opens the configured database and applies pending migrations.
#[instrument(skip(config), fields(database_url = %config.database_url()))]
fn open_repository(config: &ArenaConfig) -> Result<MatchRepository> {
    let repo = MatchRepository::new(config.database_url().clone())?;
    repo.run_migrations()?;
    Ok(repo)
}

/// Builds the actor for one slot. Random actors derive their RNG from the
/// match seed so a seeded match is reproducible end to end.
fn build_actor(kind: AgentKind, slot: ActorId, seed: &str) -> BoxedActor {
    let name = format!("{}-{}", kind, slot);
    match kind {
        AgentKind::Random => Box::new(RandomLegalAgent::new(&name, &format!("{}:{}", seed, slot))),
        AgentKind::First => Box::new(FirstAvailableAgent::new(name)),
    }
}

/// Play one match and print its outcome
#[instrument(skip(config))]
fn run_play(
    config: &ArenaConfig,
    turns: Option<u32>,
    seed: Option<String>,
    agent_a: Option<AgentKind>,
    agent_b: Option<AgentKind>,
    dry_run: bool,
) -> Result<()> {
    let max_turns = turns.unwrap_or(*config.max_turns());
    let seed = seed.unwrap_or_else(generate_seed);

    let mut actor_a = build_actor(agent_a.unwrap_or(*config.agent_a()), ActorId::AgentA, &seed);
    let mut actor_b = build_actor(agent_b.unwrap_or(*config.agent_b()), ActorId::AgentB, &seed);

    let outcome = if dry_run {
        info!("Dry run: records kept in memory");
        let mut engine = Engine::new(MemoryMatchStore::new());
        engine.run_match_with_seed(
            seed,
            actor_a.as_mut(),
            actor_b.as_mut(),
            &TicTacToe,
            max_turns,
        )?
    } else {
        let mut engine = Engine::new(open_repository(config)?);
        engine.run_match_with_seed(
            seed,
            actor_a.as_mut(),
            actor_b.as_mut(),
            &TicTacToe,
            max_turns,
        )?
    };

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

/// Write every schema document of the built-in games
#[instrument(skip(config))]
fn run_schemas(config: &ArenaConfig, out: &Path, register: bool) -> Result<()> {
    let schemas = TicTacToe.schemas();
    let dir = out.join(TicTacToe::KEY).join(TicTacToe::VERSION);
    std::fs::create_dir_all(&dir)?;

    for (kind, schema) in schemas.iter() {
        let path = dir.join(format!("{}.schema.json", kind));
        std::fs::write(&path, serde_json::to_string_pretty(schema)?)?;
        info!(path = %path.display(), "Schema written");
    }

    if register {
        let repo = open_repository(config)?;
        let written = repo.register_schemas(TicTacToe::KEY, TicTacToe::VERSION, &schemas)?;
        println!("Registered {} schemas for {}@{}", written, TicTacToe::KEY, TicTacToe::VERSION);
    }
    Ok(())
}

/// List recorded matches
#[instrument(skip(config))]
fn run_list(config: &ArenaConfig, limit: i64) -> Result<()> {
    let repo = open_repository(config)?;
    for record in repo.list_matches(limit)? {
        println!(
            "{}\t{}\t{}@{}\t{}",
            record.id(),
            record.status(),
            record.game_key(),
            record.game_version(),
            record.seed()
        );
    }
    Ok(())
}

/// Print the recorded history of one match
#[instrument(skip(config))]
fn run_show(config: &ArenaConfig, match_id: MatchId) -> Result<()> {
    let repo = open_repository(config)?;
    let history = repo.load_history(match_id)?;
    println!("{}", serde_json::to_string_pretty(&history)?);
    Ok(())
}

/// Replay one match against its snapshots
#[instrument(skip(config))]
fn run_verify(config: &ArenaConfig, match_id: MatchId) -> Result<()> {
    let repo = open_repository(config)?;
    let history = repo.load_history(match_id)?;

    let record = history.record();
    if record.game_key() != TicTacToe::KEY || record.game_version() != TicTacToe::VERSION {
        bail!(
            "Match {} was played with {}@{}, which this build cannot replay",
            match_id,
            record.game_key(),
            record.game_version()
        );
    }

    let verified = verify_replay(&TicTacToe, &history)?;
    println!("Match {} verified: {} turns replayed", match_id, verified);
    Ok(())
}
