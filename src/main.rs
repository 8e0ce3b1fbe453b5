//! Binary entry point for dfs-rewards: answers the three DFS queries against
//! a JSON snapshot of the swap contract's tables.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use dfs_rewards::config::{get_default_config_path, Config, LoggingConfig};
use dfs_rewards::database::{MemoryTableStore, TableSnapshot};
use dfs_rewards::dfs::{get_fee, get_reserves, RewardEngine};
use dfs_rewards::types::{Asset, Clock, FixedClock, Symbol, SystemClock, TimePointSec};

#[derive(Debug, Parser)]
#[command(name = "dfs-query", version, about = "Query DFS fees, reserves and trade rewards")]
struct Cli {
    /// TOML config file (defaults to the per-user config path if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// JSON table snapshot; overrides `tables.snapshot_path`
    #[arg(long, global = true)]
    tables: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Total fee in basis points
    Fee,
    /// Reserves of a market, the one held in `sort` first
    Reserves {
        mid: u64,
        /// e.g. `4,EOS`
        sort: Symbol,
    },
    /// Reward for a trade, e.g. `rewards 12 "1000.0000 EOS" "2741.0000 USDT"`
    Rewards {
        pair_id: u64,
        trade_in: Asset,
        trade_out: Asset,
        /// Evaluate at this block time (seconds or RFC 3339) instead of now
        #[arg(long)]
        at: Option<TimePointSec>,
    },
}

fn init_logging(logging: &LoggingConfig) {
    let env = env_logger::Env::default().default_filter_or(logging.level.as_str());
    let _ = env_logger::Builder::from_env(env).try_init();
}

fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let default_path = get_default_config_path();
    let path = match explicit {
        Some(path) => Some(path),
        None if default_path.exists() => Some(default_path.as_path()),
        None => None,
    };
    Config::load_layered(path).context("loading configuration")
}

fn load_tables(cli: &Cli, config: &Config) -> Result<MemoryTableStore> {
    let Some(path) = cli.tables.as_ref().or(config.tables.snapshot_path.as_ref()) else {
        bail!("no table snapshot: pass --tables or set tables.snapshot_path");
    };
    let snapshot = TableSnapshot::from_json_file(path)
        .with_context(|| format!("reading table snapshot {}", path.display()))?;
    log::info!(
        "Loaded {} markets, {} egg params, {} ranked pools from {}",
        snapshot.markets.len(),
        snapshot.egg_params.len(),
        snapshot.ranked_pools.len(),
        path.display()
    );
    Ok(MemoryTableStore::from_snapshot(snapshot)?)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    init_logging(&config.logging);

    match &cli.command {
        Command::Fee => {
            let fee = get_fee();
            if cli.json {
                println!("{}", serde_json::json!({ "fee": fee }));
            } else {
                println!("{}", fee);
            }
        }
        Command::Reserves { mid, sort } => {
            let store = load_tables(&cli, &config)?;
            let (reserve0, reserve1) = get_reserves(&store, *mid, *sort)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&(reserve0, reserve1))?);
            } else {
                println!("{}", reserve0);
                println!("{}", reserve1);
            }
        }
        Command::Rewards {
            pair_id,
            trade_in,
            trade_out,
            at,
        } => {
            let store = load_tables(&cli, &config)?;
            let clock: Box<dyn Clock> = match at {
                Some(at) => Box::new(FixedClock(*at)),
                None => Box::new(SystemClock),
            };
            let engine = RewardEngine::new(&store, clock.as_ref(), config.rewards.clone())?;
            let quote = engine.get_rewards(*pair_id, *trade_in, *trade_out)?;
            log::info!("pair {} at {}: {}", pair_id, clock.now(), quote);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&quote)?);
            } else {
                println!("{}", quote.quantity);
            }
        }
    }

    Ok(())
}
