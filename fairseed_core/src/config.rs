use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{config_err, FairResult};

pub const GRID_SIZE: u8 = 25;
pub const MIN_MINES: u8 = 1;
pub const MAX_MINES: u8 = GRID_SIZE - 1;
pub const PLINKO_ROWS: [u8; 5] = [8, 10, 12, 14, 16];

pub const DEFAULT_HOUSE_EDGE: f64 = 0.99;
pub const DEFAULT_PLINKO_RTP: f64 = 1.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum GameId {
    Mines,
    Plinko,
    Dice,
}

impl GameId {
    pub const ALL: [GameId; 3] = [GameId::Mines, GameId::Plinko, GameId::Dice];

    pub fn title(self) -> &'static str {
        match self {
            GameId::Mines => "Originals: Mines",
            GameId::Plinko => "Originals: Plinko",
            GameId::Dice => "Originals: Dice",
        }
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GameId::Mines => "mines",
            GameId::Plinko => "plinko",
            GameId::Dice => "dice",
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MinesConfig {
    pub mine_count: u8,
    /// Tiles revealed in order when the play is settled in one shot.
    #[serde(default)]
    pub picks: Vec<u8>,
}

impl MinesConfig {
    pub fn new(mine_count: u8) -> Self {
        Self {
            mine_count,
            picks: Vec::new(),
        }
    }

    pub fn with_picks(mine_count: u8, picks: Vec<u8>) -> Self {
        Self { mine_count, picks }
    }

    pub fn safe_tiles(&self) -> u8 {
        GRID_SIZE - self.mine_count
    }

    pub fn validate(&self) -> FairResult<()> {
        if !(MIN_MINES..=MAX_MINES).contains(&self.mine_count) {
            return Err(config_err(format!(
                "mine count {} outside {MIN_MINES}..={MAX_MINES}",
                self.mine_count
            )));
        }
        if self.picks.len() > self.safe_tiles() as usize {
            return Err(config_err(format!(
                "{} picks exceed the {} safe tiles",
                self.picks.len(),
                self.safe_tiles()
            )));
        }
        let mut seen = [false; GRID_SIZE as usize];
        for &tile in &self.picks {
            if tile >= GRID_SIZE {
                return Err(config_err(format!("tile {tile} outside the 5x5 grid")));
            }
            if seen[tile as usize] {
                return Err(config_err(format!("tile {tile} picked twice")));
            }
            seen[tile as usize] = true;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub const ALL: [RiskTier; 3] = [RiskTier::Low, RiskTier::Medium, RiskTier::High];
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RiskTier::Low => "low",
            RiskTier::Medium => "medium",
            RiskTier::High => "high",
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlinkoConfig {
    pub rows: u8,
    pub risk: RiskTier,
}

impl PlinkoConfig {
    pub fn validate(&self) -> FairResult<()> {
        if !PLINKO_ROWS.contains(&self.rows) {
            return Err(config_err(format!(
                "unsupported plinko row count {} (expected one of {PLINKO_ROWS:?})",
                self.rows
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DiceDirection {
    Under,
    Over,
}

/// Roll is in `[0, 100)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DiceConfig {
    pub target: f64,
    pub direction: DiceDirection,
}

impl DiceConfig {
    pub const RANGE: f64 = 100.0;
    pub const MIN_CHANCE: f64 = 0.01;
    pub const MAX_CHANCE: f64 = 0.98;

    pub fn win_chance(&self) -> f64 {
        match self.direction {
            DiceDirection::Under => self.target / Self::RANGE,
            DiceDirection::Over => (Self::RANGE - self.target) / Self::RANGE,
        }
    }

    pub fn validate(&self) -> FairResult<()> {
        if !self.target.is_finite() || self.target <= 0.0 || self.target >= Self::RANGE {
            return Err(config_err(format!(
                "dice target {} outside (0, {})",
                self.target,
                Self::RANGE
            )));
        }
        let chance = self.win_chance();
        if !(Self::MIN_CHANCE..=Self::MAX_CHANCE).contains(&chance) {
            return Err(config_err(format!(
                "dice win chance {chance:.4} outside {}..={}",
                Self::MIN_CHANCE,
                Self::MAX_CHANCE
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "game", rename_all = "lowercase")]
pub enum GameConfig {
    Mines(MinesConfig),
    Plinko(PlinkoConfig),
    Dice(DiceConfig),
}

impl GameConfig {
    pub fn game_id(&self) -> GameId {
        match self {
            GameConfig::Mines(_) => GameId::Mines,
            GameConfig::Plinko(_) => GameId::Plinko,
            GameConfig::Dice(_) => GameId::Dice,
        }
    }

    pub fn validate(&self) -> FairResult<()> {
        match self {
            GameConfig::Mines(c) => c.validate(),
            GameConfig::Plinko(c) => c.validate(),
            GameConfig::Dice(c) => c.validate(),
        }
    }
}

/// Engine-wide tunables. Defaults reproduce the sandbox constants.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineParams {
    pub mines_house_edge: f64,
    pub dice_house_edge: f64,
    pub plinko_rtp: f64,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            mines_house_edge: DEFAULT_HOUSE_EDGE,
            dice_house_edge: DEFAULT_HOUSE_EDGE,
            plinko_rtp: DEFAULT_PLINKO_RTP,
        }
    }
}

impl EngineParams {
    pub fn validate(&self) -> FairResult<()> {
        for (name, edge) in [
            ("mines_house_edge", self.mines_house_edge),
            ("dice_house_edge", self.dice_house_edge),
        ] {
            if !(edge > 0.0 && edge <= 1.0) {
                return Err(config_err(format!("{name} {edge} outside (0, 1]")));
            }
        }
        if !(self.plinko_rtp.is_finite() && self.plinko_rtp > 0.0) {
            return Err(config_err(format!(
                "plinko_rtp {} must be positive",
                self.plinko_rtp
            )));
        }
        Ok(())
    }
}
