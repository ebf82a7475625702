use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use fairseed_core::{
    derive_hash_hex, CommitmentManager, DiceConfig, DiceDirection, Engine, EngineParams,
    GameConfig, GameResult, MinesConfig, Paytable, PlinkoConfig, RiskTier, GRID_SIZE, PLINKO_ROWS,
};
use fairseed_shared::{AuditReport, Commitment, PlayLogEntry, PlayReceipt, Rotation};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fairseed-cli", about = "Operator and auditor CLI for provably-fair sandbox games")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// JSON file with engine params (house edges, plinko rtp)
    #[arg(long, global = true, env = "FAIRSEED_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a fresh seed pair and print the secret with its commitment
    NewSeed {
        #[arg(long)]
        client_seed: Option<String>,
    },
    /// Resolve one play and print its receipt
    Play {
        #[arg(long, env = "FAIRSEED_SERVER_SEED")]
        server_seed: String,
        #[arg(long, env = "FAIRSEED_CLIENT_SEED")]
        client_seed: String,
        #[arg(long, default_value_t = 0)]
        nonce: u64,
        #[command(subcommand)]
        game: GameArgs,
    },
    /// Audit a receipt against a revealed server seed
    Verify {
        #[arg(long, env = "FAIRSEED_SERVER_SEED")]
        server_seed: String,
        #[arg(long)]
        receipt: PathBuf,
    },
    /// Play many rounds through an in-memory session and report the return
    Simulate {
        #[arg(long, default_value_t = 10_000)]
        plays: u64,
        /// Rotate the seed pair every N plays (0 = never)
        #[arg(long, default_value_t = 0)]
        rotate_every: u64,
        #[arg(long)]
        client_seed: Option<String>,
        /// Export every play to CSV
        #[arg(long)]
        csv: Option<PathBuf>,
        #[command(subcommand)]
        game: GameArgs,
    },
    /// Print the plinko multiplier tables with their expected return
    Tables,
}

#[derive(Subcommand, Clone)]
enum GameArgs {
    Mines {
        #[arg(long, default_value_t = 3)]
        mines: u8,
        /// Tiles to reveal in order, comma separated
        #[arg(long, value_delimiter = ',')]
        picks: Vec<u8>,
    },
    Plinko {
        #[arg(long, default_value_t = 16)]
        rows: u8,
        #[arg(long, value_enum, default_value_t = RiskArg::Medium)]
        risk: RiskArg,
    },
    Dice(DiceArgs),
}

#[derive(Args, Clone)]
struct DiceArgs {
    #[arg(long, default_value_t = 50.0)]
    target: f64,
    /// Win when the roll is above the target instead of below
    #[arg(long)]
    over: bool,
}

#[derive(ValueEnum, Clone, Copy)]
enum RiskArg {
    Low,
    Medium,
    High,
}

impl From<RiskArg> for RiskTier {
    fn from(r: RiskArg) -> Self {
        match r {
            RiskArg::Low => RiskTier::Low,
            RiskArg::Medium => RiskTier::Medium,
            RiskArg::High => RiskTier::High,
        }
    }
}

impl From<GameArgs> for GameConfig {
    fn from(args: GameArgs) -> Self {
        match args {
            GameArgs::Mines { mines, picks } => GameConfig::Mines(MinesConfig::with_picks(mines, picks)),
            GameArgs::Plinko { rows, risk } => GameConfig::Plinko(PlinkoConfig {
                rows,
                risk: risk.into(),
            }),
            GameArgs::Dice(DiceArgs { target, over }) => GameConfig::Dice(DiceConfig {
                target,
                direction: if over {
                    DiceDirection::Over
                } else {
                    DiceDirection::Under
                },
            }),
        }
    }
}

#[derive(Serialize)]
struct NewSeedOutput {
    server_seed: String,
    commitment: Commitment,
}

#[derive(Serialize)]
struct SimulationReport {
    game: String,
    plays: u64,
    rotations: u64,
    total_return: f64,
    rtp: f64,
    hit_rate: f64,
    /// Mines only: how often each cell held a mine.
    #[serde(skip_serializing_if = "Option::is_none")]
    mine_frequency: Option<Vec<f64>>,
    last_rotation: Option<Rotation>,
}

fn load_engine(path: Option<&PathBuf>) -> anyhow::Result<Engine> {
    let params = match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("reading engine config {}", path.display()))?;
            serde_json::from_str::<EngineParams>(&raw)
                .with_context(|| format!("parsing engine config {}", path.display()))?
        }
        None => EngineParams::default(),
    };
    Ok(Engine::new(params)?)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn simulate(
    engine: &Engine,
    config: GameConfig,
    plays: u64,
    rotate_every: u64,
    client_seed: Option<String>,
    csv_path: Option<PathBuf>,
) -> anyhow::Result<SimulationReport> {
    config.validate()?;
    let mut manager = CommitmentManager::new(client_seed.clone());
    let mut wtr = match &csv_path {
        Some(path) => Some(
            csv::Writer::from_path(path)
                .with_context(|| format!("creating {}", path.display()))?,
        ),
        None => None,
    };
    let mut total_return = 0.0;
    let mut hits = 0u64;
    let mut rotations = 0u64;
    let mut last_rotation = None;
    let mut mine_counts = [0u64; GRID_SIZE as usize];

    for id in 0..plays {
        if rotate_every > 0 && id > 0 && id % rotate_every == 0 {
            let pair_id = manager.active().id();
            let revealed = manager.rotate(pair_id, client_seed.clone())?;
            rotations += 1;
            last_rotation = Some(Rotation {
                revealed,
                next: Commitment::from(manager.active()),
            });
        }
        let outcome = manager.play(engine, &config)?;
        total_return += outcome.multiplier;
        if outcome.multiplier > 0.0 {
            hits += 1;
        }
        if let GameResult::Mines { mines, .. } = &outcome.result {
            for cell in mines {
                mine_counts[*cell as usize] += 1;
            }
        }
        if let Some(wtr) = wtr.as_mut() {
            let pair = manager.active();
            wtr.serialize(PlayLogEntry {
                id,
                pair_id: pair.id(),
                server_seed_hash: pair.server_seed_hash().to_string(),
                client_seed: pair.client_seed().to_string(),
                nonce: outcome.nonce,
                game: outcome.game,
                result: serde_json::to_string(&outcome.result)?,
                multiplier: outcome.multiplier,
            })?;
        }
    }
    if let (Some(mut wtr), Some(path)) = (wtr, csv_path) {
        wtr.flush()?;
        info!(rows = plays, path = %path.display(), "exported plays");
    }

    let n = plays.max(1) as f64;
    Ok(SimulationReport {
        game: config.game_id().to_string(),
        plays,
        rotations,
        total_return,
        rtp: total_return / n,
        hit_rate: hits as f64 / n,
        mine_frequency: matches!(config, GameConfig::Mines(_))
            .then(|| mine_counts.iter().map(|c| *c as f64 / n).collect()),
        last_rotation,
    })
}

#[derive(Serialize)]
struct TableRow {
    risk: RiskTier,
    rows: u8,
    multipliers: Vec<f64>,
    rtp: f64,
}

fn tables(engine: &Engine) -> anyhow::Result<Vec<TableRow>> {
    let mut out = Vec::new();
    for risk in RiskTier::ALL {
        for rows in PLINKO_ROWS {
            let table = Paytable::plinko(&PlinkoConfig { rows, risk }, engine.params().plinko_rtp)?;
            let rtp = table.expected_return();
            out.push(TableRow {
                risk,
                rows,
                multipliers: table.multipliers,
                rtp,
            });
        }
    }
    Ok(out)
}

fn play(
    engine: &Engine,
    server_seed: &str,
    client_seed: &str,
    nonce: u64,
    config: GameConfig,
) -> anyhow::Result<PlayReceipt> {
    let outcome = engine.resolve(server_seed, client_seed, nonce, &config)?;
    let hash = derive_hash_hex(server_seed.as_bytes());
    Ok(PlayReceipt::new(hash, client_seed, config, outcome))
}

fn verify_receipt(engine: &Engine, server_seed: &str, raw: &str) -> anyhow::Result<AuditReport> {
    let receipt: PlayReceipt = serde_json::from_str(raw).context("parsing receipt")?;
    Ok(receipt.audit(engine, server_seed))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();
    let engine = load_engine(cli.config.as_ref())?;

    match cli.command {
        Commands::NewSeed { client_seed } => {
            let mut manager = CommitmentManager::new(client_seed);
            let commitment = Commitment::from(manager.active());
            // Rotating retires the pair, which is what makes its seed printable.
            let revealed = manager.rotate(commitment.pair_id, None)?;
            info!(hash = %commitment.server_seed_hash, "generated seed pair");
            print_json(&NewSeedOutput {
                server_seed: revealed.server_seed,
                commitment,
            })?;
        }
        Commands::Play {
            server_seed,
            client_seed,
            nonce,
            game,
        } => {
            print_json(&play(&engine, &server_seed, &client_seed, nonce, game.into())?)?;
        }
        Commands::Verify {
            server_seed,
            receipt,
        } => {
            let raw = fs::read_to_string(&receipt)
                .with_context(|| format!("reading receipt {}", receipt.display()))?;
            let report = verify_receipt(&engine, &server_seed, &raw)?;
            print_json(&report)?;
            if let Err(err) = report.into_result() {
                bail!("audit failed: {err}");
            }
            info!(nonce = report.nonce, game = %report.game, "receipt verified");
        }
        Commands::Simulate {
            plays,
            rotate_every,
            client_seed,
            csv,
            game,
        } => {
            let report = simulate(&engine, game.into(), plays, rotate_every, client_seed, csv)?;
            print_json(&report)?;
        }
        Commands::Tables => {
            print_json(&tables(&engine)?)?;
        }
    }

    Ok(())
}
