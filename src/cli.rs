//! Command-line interface for strictly_arena.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use strictly_arena::{AgentKind, MatchId};

/// Strictly Arena - Turn-based matches with replayable history
#[derive(Parser, Debug)]
#[command(name = "strictly_arena")]
#[command(about = "Run and inspect recorded two-actor matches", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play one tic-tac-toe match and print the outcome as JSON
    Play {
        /// Turn limit (overrides config)
        #[arg(short, long)]
        turns: Option<u32>,

        /// Match seed. A fresh one is generated if not provided.
        #[arg(short, long)]
        seed: Option<String>,

        /// Actor for the agentA slot (overrides config)
        #[arg(long, value_enum)]
        agent_a: Option<AgentKind>,

        /// Actor for the agentB slot (overrides config)
        #[arg(long, value_enum)]
        agent_b: Option<AgentKind>,

        /// Keep records in memory instead of the database
        #[arg(long)]
        dry_run: bool,
    },

    /// Export the JSON schemas of every built-in game
    Schemas {
        /// Output directory
        #[arg(short, long, default_value = "schemas")]
        out: PathBuf,

        /// Also store the schemas in the database registry
        #[arg(long)]
        register: bool,
    },

    /// List recorded matches, newest first
    List {
        /// Maximum number of matches to show
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },

    /// Print the full recorded history of a match as JSON
    Show {
        /// Match to show
        match_id: MatchId,
    },

    /// Replay a recorded match and check every snapshot
    Verify {
        /// Match to verify
        match_id: MatchId,
    },
}
