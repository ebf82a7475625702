pub mod commitment;
pub mod config;
pub mod dice;
pub mod engine;
pub mod error;
pub mod mines;
pub mod paytable;
pub mod plinko;
pub mod rng;
pub mod session;

pub use crate::commitment::{CommitmentManager, RevealedSeed, SeedPair, ServerSeed};
pub use crate::config::{
    DiceConfig, DiceDirection, EngineParams, GameConfig, GameId, MinesConfig, PlinkoConfig,
    RiskTier, GRID_SIZE, PLINKO_ROWS,
};
pub use crate::engine::{resolve_play, verify, verify_commitment, Engine, GameResult, PlayOutcome};
pub use crate::error::{FairError, FairResult};
pub use crate::paytable::{binomial_probabilities, Paytable};
pub use crate::plinko::Step;
pub use crate::rng::{derive_float, derive_hash_hex, derived_word, FairRng};
pub use crate::session::{GameSession, GameState, Round};
