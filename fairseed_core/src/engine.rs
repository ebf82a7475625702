use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::{
    config::{EngineParams, GameConfig, GameId},
    dice, mines,
    error::FairResult,
    plinko::{self, Step},
    rng::{derive_hash_hex, derived_word, FairRng},
};

/// Relative tolerance for the float fields of a claimed outcome.
const FLOAT_TOLERANCE: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= FLOAT_TOLERANCE * a.abs().max(1.0)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "game", rename_all = "lowercase")]
pub enum GameResult {
    Mines { mines: Vec<u8>, hit: Option<u8> },
    Plinko { path: Vec<Step>, bucket: usize },
    Dice { roll: f64, win: bool },
}

impl GameResult {
    fn reproduces(&self, claimed: &GameResult) -> bool {
        match (self, claimed) {
            (GameResult::Dice { roll, win }, GameResult::Dice { roll: r, win: w }) => {
                win == w && approx_eq(*roll, *r)
            }
            _ => self == claimed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayOutcome {
    pub game: GameId,
    pub nonce: u64,
    /// Derived values in sub-index order.
    pub derived: Vec<f64>,
    pub result: GameResult,
    pub multiplier: f64,
}

impl PlayOutcome {
    /// True when `claimed` reports this outcome. Derived values compare by
    /// their u32 word, the roll and multiplier within `FLOAT_TOLERANCE`.
    pub fn reproduces(&self, claimed: &PlayOutcome) -> bool {
        self.game == claimed.game
            && self.nonce == claimed.nonce
            && self.derived.len() == claimed.derived.len()
            && self
                .derived
                .iter()
                .zip(&claimed.derived)
                .all(|(a, b)| derived_word(*a) == derived_word(*b))
            && self.result.reproduces(&claimed.result)
            && approx_eq(self.multiplier, claimed.multiplier)
    }
}

/// Stateless outcome engine. Everything an outcome depends on is passed in.
#[derive(Debug, Clone, Copy, Default)]
pub struct Engine {
    params: EngineParams,
}

impl Engine {
    pub fn new(params: EngineParams) -> FairResult<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    pub fn resolve(
        &self,
        server_seed: &str,
        client_seed: &str,
        nonce: u64,
        config: &GameConfig,
    ) -> FairResult<PlayOutcome> {
        let mut rng = FairRng::new(server_seed, client_seed, nonce);
        let (result, multiplier) = match config {
            GameConfig::Mines(cfg) => {
                let res = mines::resolve(&mut rng, cfg, self.params.mines_house_edge)?;
                (
                    GameResult::Mines {
                        mines: res.mines,
                        hit: res.hit,
                    },
                    res.multiplier,
                )
            }
            GameConfig::Plinko(cfg) => {
                let res = plinko::resolve(&mut rng, cfg, self.params.plinko_rtp)?;
                (
                    GameResult::Plinko {
                        path: res.path,
                        bucket: res.bucket,
                    },
                    res.multiplier,
                )
            }
            GameConfig::Dice(cfg) => {
                let res = dice::resolve(&mut rng, cfg, self.params.dice_house_edge)?;
                (
                    GameResult::Dice {
                        roll: res.roll,
                        win: res.win,
                    },
                    res.multiplier,
                )
            }
        };
        trace!(game = %config.game_id(), nonce, multiplier, "play resolved");
        Ok(PlayOutcome {
            game: config.game_id(),
            nonce,
            derived: rng.into_consumed(),
            result,
            multiplier,
        })
    }

    /// Recomputes the outcome from revealed values and compares it with the
    /// claimed one. Any config error counts as a failed verification.
    pub fn verify(
        &self,
        server_seed: &str,
        client_seed: &str,
        nonce: u64,
        config: &GameConfig,
        claimed: &PlayOutcome,
    ) -> bool {
        match self.resolve(server_seed, client_seed, nonce, config) {
            Ok(actual) => actual.reproduces(claimed),
            Err(err) => {
                warn!(%err, "verification rejected config");
                false
            }
        }
    }
}

/// Convenience: resolve with default engine params.
pub fn resolve_play(
    server_seed: &str,
    client_seed: &str,
    nonce: u64,
    config: &GameConfig,
) -> FairResult<PlayOutcome> {
    Engine::default().resolve(server_seed, client_seed, nonce, config)
}

/// Verify a claimed outcome with default engine params.
pub fn verify(
    server_seed: &str,
    client_seed: &str,
    nonce: u64,
    config: &GameConfig,
    claimed: &PlayOutcome,
) -> bool {
    Engine::default().verify(server_seed, client_seed, nonce, config, claimed)
}

/// Checks a revealed server seed against its published hash.
pub fn verify_commitment(server_seed: &str, server_seed_hash: &str) -> bool {
    derive_hash_hex(server_seed.as_bytes()).eq_ignore_ascii_case(server_seed_hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DiceConfig, DiceDirection, MinesConfig, PlinkoConfig, RiskTier};

    fn configs() -> Vec<GameConfig> {
        vec![
            GameConfig::Mines(MinesConfig::with_picks(3, vec![0, 12, 24])),
            GameConfig::Plinko(PlinkoConfig { rows: 12, risk: RiskTier::Medium }),
            GameConfig::Dice(DiceConfig { target: 49.5, direction: DiceDirection::Under }),
        ]
    }

    #[test]
    fn test_resolve_deterministic() {
        let engine = Engine::default();
        for cfg in configs() {
            let out1 = engine.resolve("server", "client", 1, &cfg).unwrap();
            let out2 = engine.resolve("server", "client", 1, &cfg).unwrap();
            assert_eq!(out1, out2);
            assert_eq!(out1.game, cfg.game_id());
        }
    }

    #[test]
    fn verify_accepts_real_and_rejects_tampered() {
        let engine = Engine::default();
        for cfg in configs() {
            let out = engine.resolve("server", "client", 5, &cfg).unwrap();
            assert!(engine.verify("server", "client", 5, &cfg, &out));
            assert!(!engine.verify("servex", "client", 5, &cfg, &out));
            assert!(!engine.verify("server", "clienT", 5, &cfg, &out));
            assert!(!engine.verify("server", "client", 6, &cfg, &out));

            let mut forged = out.clone();
            forged.multiplier += 1.0;
            assert!(!engine.verify("server", "client", 5, &cfg, &forged));
        }
    }

    #[test]
    fn verify_tolerates_last_bit_drift() {
        let engine = Engine::default();
        let nudge = |v: f64| f64::from_bits(v.to_bits() + 1);
        for cfg in configs() {
            let out = engine.resolve("server", "client", 9, &cfg).unwrap();
            let mut drifted = out.clone();
            drifted.derived.iter_mut().for_each(|v| *v = nudge(*v));
            drifted.multiplier = nudge(drifted.multiplier);
            if let GameResult::Dice { roll, .. } = &mut drifted.result {
                *roll = nudge(*roll);
            }
            assert!(engine.verify("server", "client", 9, &cfg, &drifted));

            // one word off is a different outcome
            let mut forged = out.clone();
            forged.derived[0] = (forged.derived[0] + 1.0 / 4_294_967_296.0) % 1.0;
            assert!(!engine.verify("server", "client", 9, &cfg, &forged));
        }
    }

    #[test]
    fn verify_rejects_invalid_config() {
        let cfg = GameConfig::Mines(MinesConfig::new(3));
        let out = resolve_play("server", "client", 0, &cfg).unwrap();
        let bad = GameConfig::Mines(MinesConfig::new(30));
        assert!(!verify("server", "client", 0, &bad, &out));
    }

    #[test]
    fn engine_params_validated() {
        let params = EngineParams {
            mines_house_edge: 1.5,
            ..EngineParams::default()
        };
        assert!(Engine::new(params).is_err());
    }

    #[test]
    fn commitment_check() {
        let hash = derive_hash_hex(b"secret");
        assert!(verify_commitment("secret", &hash));
        assert!(verify_commitment("secret", &hash.to_uppercase()));
        assert!(!verify_commitment("secreT", &hash));
    }
}
