use serde::{Deserialize, Serialize};

use crate::config::PlinkoConfig;
use crate::error::FairResult;
use crate::paytable::Paytable;
use crate::rng::FairRng;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Left,
    Right,
}

impl Step {
    pub fn from_value(v: f64) -> Self {
        if v < 0.5 {
            Step::Left
        } else {
            Step::Right
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlinkoResolution {
    pub path: Vec<Step>,
    /// Number of right steps, `0..=rows`.
    pub bucket: usize,
    pub multiplier: f64,
}

pub fn drop_path(rng: &mut FairRng<'_>, rows: u8) -> Vec<Step> {
    (0..rows).map(|_| Step::from_value(rng.next_float())).collect()
}

pub fn resolve(rng: &mut FairRng<'_>, config: &PlinkoConfig, rtp: f64) -> FairResult<PlinkoResolution> {
    let table = Paytable::plinko(config, rtp)?;
    let path = drop_path(rng, config.rows);
    let bucket = path.iter().filter(|s| **s == Step::Right).count();
    let multiplier = table.multiplier(bucket).unwrap_or(0.0);
    Ok(PlinkoResolution {
        path,
        bucket,
        multiplier,
    })
}
