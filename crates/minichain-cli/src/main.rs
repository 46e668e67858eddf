use anyhow::Result;
use clap::{Parser, Subcommand};
use minichain_core::{
    constants::{DEFAULT_DIFFICULTY, MAX_DIFFICULTY},
    Chain, ChainConfig, MineOptions,
};
use std::io;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

mod menu;

#[derive(Parser, Debug)]
#[command(name = "minichain-cli")]
#[command(about = "Interactive proof-of-work blockchain demo")]
struct Cli {
    /// Leading zero hex digits required of every new block
    #[arg(long, default_value_t = DEFAULT_DIFFICULTY, value_parser = clap::value_parser!(u32).range(0..=i64::from(MAX_DIFFICULTY)))]
    difficulty: u32,

    /// Difficulty for the genesis block (defaults to --difficulty)
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=i64::from(MAX_DIFFICULTY)))]
    genesis_difficulty: Option<u32>,

    /// Give up on a block after this many hashes
    #[arg(long)]
    max_attempts: Option<u64>,

    #[command(subcommand)]
    cmd: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Menu driven session on stdin (the default)
    Menu,
    /// Mine some blocks, tamper with one, and validate before and after
    Demo {
        /// Blocks to mine on top of genesis
        #[arg(long, default_value_t = 3)]
        blocks: usize,
    },
}

impl Cli {
    fn chain_config(&self) -> ChainConfig {
        let mut mine = MineOptions::unbounded();
        if let Some(max_attempts) = self.max_attempts {
            mine = mine.with_max_attempts(max_attempts);
        }
        ChainConfig {
            genesis_difficulty: self.genesis_difficulty.unwrap_or(self.difficulty),
            mine,
        }
    }
}

fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.chain_config();
    info!(?config, difficulty = cli.difficulty, "starting");

    let mut chain = Chain::new(config)?;
    let mut input = io::stdin().lock();
    let mut out = io::stdout().lock();

    match cli.cmd.unwrap_or(Command::Menu) {
        Command::Menu => menu::run(&mut chain, cli.difficulty, &mut input, &mut out),
        Command::Demo { blocks } => menu::run_demo(&mut chain, cli.difficulty, blocks, &mut out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genesis_difficulty_follows_difficulty() {
        let cli = Cli::parse_from(["minichain-cli", "--difficulty", "2"]);
        let config = cli.chain_config();
        assert_eq!(config.genesis_difficulty, 2);
        assert_eq!(config.mine.max_attempts, None);
        assert!(cli.cmd.is_none());
    }

    #[test]
    fn explicit_options() {
        let cli = Cli::parse_from([
            "minichain-cli",
            "--genesis-difficulty",
            "0",
            "--max-attempts",
            "500",
            "demo",
            "--blocks",
            "5",
        ]);
        let config = cli.chain_config();
        assert_eq!(cli.difficulty, DEFAULT_DIFFICULTY);
        assert_eq!(config.genesis_difficulty, 0);
        assert_eq!(config.mine.max_attempts, Some(500));
        assert!(matches!(cli.cmd, Some(Command::Demo { blocks: 5 })));
    }

    #[test]
    fn difficulty_is_bounded() {
        assert!(Cli::try_parse_from(["minichain-cli", "--difficulty", "65"]).is_err());
        assert!(Cli::try_parse_from(["minichain-cli", "--difficulty", "64"]).is_ok());
    }
}
