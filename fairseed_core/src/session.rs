use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::commitment::CommitmentManager;
use crate::config::{GameConfig, MinesConfig, GRID_SIZE};
use crate::engine::{Engine, GameResult, PlayOutcome};
use crate::error::{config_err, state_err, FairResult};
use crate::mines;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    Idle,
    Playing,
    CashedOut,
    Busted,
}

impl GameState {
    pub fn is_terminal(self) -> bool {
        matches!(self, GameState::CashedOut | GameState::Busted)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Round {
    pub config: GameConfig,
    pub pair_id: u64,
    pub server_seed_hash: String,
    pub client_seed: String,
    pub outcome: PlayOutcome,
}

#[derive(Debug, Clone)]
pub struct GameSession {
    config: GameConfig,
    state: GameState,
    round: Option<Round>,
    revealed: Vec<u8>,
    mines_house_edge: f64,
}

impl GameSession {
    pub fn new(config: GameConfig, engine: &Engine) -> FairResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: GameState::Idle,
            round: None,
            revealed: Vec::new(),
            mines_house_edge: engine.params().mines_house_edge,
        })
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    pub fn revealed(&self) -> &[u8] {
        &self.revealed
    }

    /// Applies from the next round; a settled round keeps its own config.
    pub fn set_config(&mut self, config: GameConfig) -> FairResult<()> {
        if self.state == GameState::Playing {
            return Err(state_err("cannot change config mid-round"));
        }
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn start<R: RngCore + CryptoRng>(
        &mut self,
        manager: &mut CommitmentManager<R>,
        engine: &Engine,
    ) -> FairResult<&Round> {
        if self.state == GameState::Playing {
            return Err(state_err("round already in progress"));
        }
        // Interactive mines rounds reveal tiles one at a time, so the layout is
        // resolved without picks.
        let play_config = match &self.config {
            GameConfig::Mines(cfg) => GameConfig::Mines(MinesConfig::new(cfg.mine_count)),
            other => other.clone(),
        };
        let outcome = manager.play(engine, &play_config)?;
        let pair = manager.active();
        self.revealed.clear();
        self.state = match outcome.result {
            GameResult::Mines { .. } => GameState::Playing,
            _ if outcome.multiplier > 0.0 => GameState::CashedOut,
            _ => GameState::Busted,
        };
        debug!(game = %outcome.game, nonce = outcome.nonce, state = ?self.state, "round started");
        Ok(&*self.round.insert(Round {
            config: self.config.clone(),
            pair_id: pair.id(),
            server_seed_hash: pair.server_seed_hash().to_string(),
            client_seed: pair.client_seed().to_string(),
            outcome,
        }))
    }

    fn mines_layout(&self) -> FairResult<(u8, &[u8])> {
        let round = self.round.as_ref().ok_or_else(|| state_err("no round started"))?;
        match (&round.config, &round.outcome.result) {
            (GameConfig::Mines(cfg), GameResult::Mines { mines, .. }) => {
                Ok((cfg.mine_count, mines.as_slice()))
            }
            _ => Err(state_err("not a mines round")),
        }
    }

    /// Revealing the last safe tile cashes out.
    pub fn reveal(&mut self, tile: u8) -> FairResult<GameState> {
        if self.state != GameState::Playing {
            return Err(state_err(format!("cannot reveal while {:?}", self.state)));
        }
        if tile >= GRID_SIZE {
            return Err(config_err(format!("tile {tile} outside the 5x5 grid")));
        }
        if self.revealed.contains(&tile) {
            return Err(state_err(format!("tile {tile} already revealed")));
        }
        let (mine_count, layout) = self.mines_layout()?;
        let is_mine = layout.contains(&tile);
        self.revealed.push(tile);
        if is_mine {
            self.state = GameState::Busted;
        } else if self.revealed.len() == (GRID_SIZE - mine_count) as usize {
            self.state = GameState::CashedOut;
        }
        Ok(self.state)
    }

    pub fn cash_out(&mut self) -> FairResult<f64> {
        if self.state != GameState::Playing {
            return Err(state_err(format!("cannot cash out while {:?}", self.state)));
        }
        self.mines_layout()?;
        self.state = GameState::CashedOut;
        self.multiplier()
    }

    pub fn multiplier(&self) -> FairResult<f64> {
        let round = match (self.state, self.round.as_ref()) {
            (GameState::Busted, _) => return Ok(0.0),
            (GameState::Idle, _) | (_, None) => return Ok(1.0),
            (_, Some(round)) => round,
        };
        match &round.config {
            GameConfig::Mines(cfg) => {
                mines::multiplier(cfg.mine_count, self.revealed.len() as u8, self.mines_house_edge)
            }
            _ => Ok(round.outcome.multiplier),
        }
    }

    pub fn next_multiplier(&self) -> FairResult<f64> {
        let (mine_count, _) = self.mines_layout()?;
        mines::multiplier(mine_count, self.revealed.len() as u8 + 1, self.mines_house_edge)
    }

    /// Outcome of the finished round as a resolve of `settled_config` reports it.
    pub fn settled_outcome(&self) -> FairResult<PlayOutcome> {
        if !self.state.is_terminal() {
            return Err(state_err(format!("round not settled ({:?})", self.state)));
        }
        let round = self.round.as_ref().ok_or_else(|| state_err("no round played"))?;
        let mut outcome = round.outcome.clone();
        if let GameResult::Mines { mines, hit } = &mut outcome.result {
            *hit = self.revealed.iter().copied().find(|t| mines.contains(t));
            outcome.multiplier = self.multiplier()?;
        }
        Ok(outcome)
    }

    /// Config that reproduces the last round in one resolve: for mines the
    /// revealed tiles become the ordered picks.
    pub fn settled_config(&self) -> GameConfig {
        let played = self.round.as_ref().map_or(&self.config, |r| &r.config);
        match played {
            GameConfig::Mines(cfg) => {
                GameConfig::Mines(MinesConfig::with_picks(cfg.mine_count, self.revealed.clone()))
            }
            other => other.clone(),
        }
    }
}
