use crate::config::{MinesConfig, GRID_SIZE};
use crate::error::{config_err, FairResult};
use crate::rng::FairRng;

/// Payout after `revealed` safe tiles with `mines` mines on the 5x5 grid.
///
/// `house_edge * prod_{i<k} (25 - i) / (25 - m - i)`, and exactly 1.0 before
/// the first reveal.
pub fn multiplier(mines: u8, revealed: u8, house_edge: f64) -> FairResult<f64> {
    let safe = GRID_SIZE.saturating_sub(mines);
    if mines == 0 || mines >= GRID_SIZE {
        return Err(config_err(format!("mine count {mines} outside 1..=24")));
    }
    if revealed > safe {
        return Err(config_err(format!(
            "{revealed} reveals exceed the {safe} safe tiles"
        )));
    }
    if revealed == 0 {
        return Ok(1.0);
    }
    let total = f64::from(GRID_SIZE);
    let safe = f64::from(safe);
    let mut m = 1.0;
    for i in 0..revealed {
        let i = f64::from(i);
        m *= (total - i) / (safe - i);
    }
    Ok(m * house_edge)
}

/// Places `mine_count` mines with a partial Fisher-Yates shuffle, one derived
/// value per mine. Returned cells are sorted.
pub fn place_mines(rng: &mut FairRng<'_>, mine_count: u8) -> Vec<u8> {
    let mut cells: Vec<u8> = (0..GRID_SIZE).collect();
    let n = cells.len();
    for i in 0..mine_count as usize {
        let j = i + rng.next_index(n - i);
        cells.swap(i, j);
    }
    let mut mines = cells[..mine_count as usize].to_vec();
    mines.sort_unstable();
    mines
}

#[derive(Debug, Clone, PartialEq)]
pub struct MinesResolution {
    pub mines: Vec<u8>,
    /// First pick that landed on a mine, if any.
    pub hit: Option<u8>,
    pub multiplier: f64,
}

pub fn resolve(
    rng: &mut FairRng<'_>,
    config: &MinesConfig,
    house_edge: f64,
) -> FairResult<MinesResolution> {
    config.validate()?;
    let mines = place_mines(rng, config.mine_count);
    let hit = config.picks.iter().copied().find(|p| mines.contains(p));
    let payout = match hit {
        Some(_) => 0.0,
        None => multiplier(config.mine_count, config.picks.len() as u8, house_edge)?,
    };
    Ok(MinesResolution {
        mines,
        hit,
        multiplier: payout,
    })
}
