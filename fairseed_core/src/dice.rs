use crate::config::{DiceConfig, DiceDirection};
use crate::error::FairResult;
use crate::rng::FairRng;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiceResolution {
    /// In `[0, 100)`.
    pub roll: f64,
    pub win: bool,
    pub multiplier: f64,
}

/// Multiplier paid on a win.
pub fn win_multiplier(config: &DiceConfig, house_edge: f64) -> FairResult<f64> {
    config.validate()?;
    Ok(house_edge / config.win_chance())
}

pub fn resolve(rng: &mut FairRng<'_>, config: &DiceConfig, house_edge: f64) -> FairResult<DiceResolution> {
    let payout = win_multiplier(config, house_edge)?;
    let roll = rng.next_float() * DiceConfig::RANGE;
    let win = match config.direction {
        DiceDirection::Under => roll < config.target,
        DiceDirection::Over => roll > config.target,
    };
    Ok(DiceResolution {
        roll,
        win,
        multiplier: if win { payout } else { 0.0 },
    })
}
