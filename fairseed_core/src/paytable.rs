use crate::config::{PlinkoConfig, RiskTier};
use crate::error::FairResult;

// Bucket shapes per (risk, rows), edge to edge. They are rescaled by
// `Paytable::plinko` so the binomially weighted sum equals the configured RTP.
const LOW_8: [f64; 9] = [5.6, 2.1, 1.1, 1.0, 0.5, 1.0, 1.1, 2.1, 5.6];
const LOW_10: [f64; 11] = [8.9, 3.0, 1.4, 1.1, 1.0, 0.5, 1.0, 1.1, 1.4, 3.0, 8.9];
const LOW_12: [f64; 13] = [10.0, 3.0, 1.6, 1.4, 1.1, 1.0, 0.5, 1.0, 1.1, 1.4, 1.6, 3.0, 10.0];
const LOW_14: [f64; 15] = [
    7.1, 4.0, 1.9, 1.4, 1.3, 1.1, 1.0, 0.5, 1.0, 1.1, 1.3, 1.4, 1.9, 4.0, 7.1,
];
const LOW_16: [f64; 17] = [
    16.0, 9.0, 2.0, 1.4, 1.4, 1.2, 1.1, 1.0, 0.5, 1.0, 1.1, 1.2, 1.4, 1.4, 2.0, 9.0, 16.0,
];

const MEDIUM_8: [f64; 9] = [13.0, 3.0, 1.3, 0.7, 0.4, 0.7, 1.3, 3.0, 13.0];
const MEDIUM_10: [f64; 11] = [22.0, 5.0, 2.0, 1.4, 0.6, 0.4, 0.6, 1.4, 2.0, 5.0, 22.0];
const MEDIUM_12: [f64; 13] = [
    33.0, 11.0, 4.0, 2.0, 1.1, 0.6, 0.3, 0.6, 1.1, 2.0, 4.0, 11.0, 33.0,
];
const MEDIUM_14: [f64; 15] = [
    58.0, 15.0, 7.0, 4.0, 1.9, 1.0, 0.5, 0.2, 0.5, 1.0, 1.9, 4.0, 7.0, 15.0, 58.0,
];
const MEDIUM_16: [f64; 17] = [
    110.0, 41.0, 10.0, 5.0, 3.0, 1.5, 1.0, 0.5, 0.3, 0.5, 1.0, 1.5, 3.0, 5.0, 10.0, 41.0, 110.0,
];

const HIGH_8: [f64; 9] = [29.0, 4.0, 1.5, 0.3, 0.2, 0.3, 1.5, 4.0, 29.0];
const HIGH_10: [f64; 11] = [76.0, 10.0, 3.0, 0.9, 0.3, 0.2, 0.3, 0.9, 3.0, 10.0, 76.0];
const HIGH_12: [f64; 13] = [
    170.0, 24.0, 8.1, 2.0, 0.7, 0.2, 0.2, 0.2, 0.7, 2.0, 8.1, 24.0, 170.0,
];
const HIGH_14: [f64; 15] = [
    420.0, 56.0, 18.0, 5.0, 1.9, 0.3, 0.2, 0.2, 0.2, 0.3, 1.9, 5.0, 18.0, 56.0, 420.0,
];
const HIGH_16: [f64; 17] = [
    1000.0, 130.0, 26.0, 9.0, 4.0, 2.0, 0.2, 0.2, 0.2, 0.2, 0.2, 2.0, 4.0, 9.0, 26.0, 130.0,
    1000.0,
];

fn shape(risk: RiskTier, rows: u8) -> Option<&'static [f64]> {
    let table: &'static [f64] = match (risk, rows) {
        (RiskTier::Low, 8) => &LOW_8,
        (RiskTier::Low, 10) => &LOW_10,
        (RiskTier::Low, 12) => &LOW_12,
        (RiskTier::Low, 14) => &LOW_14,
        (RiskTier::Low, 16) => &LOW_16,
        (RiskTier::Medium, 8) => &MEDIUM_8,
        (RiskTier::Medium, 10) => &MEDIUM_10,
        (RiskTier::Medium, 12) => &MEDIUM_12,
        (RiskTier::Medium, 14) => &MEDIUM_14,
        (RiskTier::Medium, 16) => &MEDIUM_16,
        (RiskTier::High, 8) => &HIGH_8,
        (RiskTier::High, 10) => &HIGH_10,
        (RiskTier::High, 12) => &HIGH_12,
        (RiskTier::High, 14) => &HIGH_14,
        (RiskTier::High, 16) => &HIGH_16,
        _ => return None,
    };
    Some(table)
}

/// `P(bucket = i)` for `rows` fair left/right steps.
pub fn binomial_probabilities(rows: u8) -> Vec<f64> {
    let n = rows as usize;
    let total = 2f64.powi(rows as i32);
    let mut coeff = 1.0f64;
    let mut out = Vec::with_capacity(n + 1);
    for k in 0..=n {
        out.push(coeff / total);
        coeff = coeff * (n - k) as f64 / (k + 1) as f64;
    }
    out
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paytable {
    pub risk: RiskTier,
    pub rows: u8,
    pub multipliers: Vec<f64>,
}

impl Paytable {
    pub fn plinko(config: &PlinkoConfig, rtp: f64) -> FairResult<Self> {
        config.validate()?;
        // validate() only admits rows that have a shape for every tier.
        let raw = shape(config.risk, config.rows).unwrap_or(&[]);
        let probs = binomial_probabilities(config.rows);
        let raw_rtp: f64 = raw.iter().zip(&probs).map(|(m, p)| m * p).sum();
        let scale = rtp / raw_rtp;
        Ok(Self {
            risk: config.risk,
            rows: config.rows,
            multipliers: raw.iter().map(|m| m * scale).collect(),
        })
    }

    pub fn multiplier(&self, bucket: usize) -> Option<f64> {
        self.multipliers.get(bucket).copied()
    }

    pub fn expected_return(&self) -> f64 {
        binomial_probabilities(self.rows)
            .iter()
            .zip(&self.multipliers)
            .map(|(p, m)| p * m)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PLINKO_ROWS;

    #[test]
    fn binomial_sums_to_one() {
        for rows in PLINKO_ROWS {
            let probs = binomial_probabilities(rows);
            assert_eq!(probs.len(), rows as usize + 1);
            assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        }
        assert_eq!(binomial_probabilities(8)[4], 70.0 / 256.0);
    }

    #[test]
    fn every_table_symmetric() {
        for risk in RiskTier::ALL {
            for rows in PLINKO_ROWS {
                let table = Paytable::plinko(&PlinkoConfig { rows, risk }, 1.0).unwrap();
                let m = &table.multipliers;
                assert_eq!(m.len(), rows as usize + 1);
                for i in 0..m.len() {
                    assert_eq!(m[i], m[m.len() - 1 - i]);
                }
            }
        }
    }

    #[test]
    fn configured_rtp_is_honoured() {
        let cfg = PlinkoConfig { rows: 12, risk: RiskTier::Medium };
        let table = Paytable::plinko(&cfg, 0.97).unwrap();
        assert!((table.expected_return() - 0.97).abs() < 1e-9);
    }

    #[test]
    fn rejects_unknown_rows() {
        let cfg = PlinkoConfig { rows: 7, risk: RiskTier::Low };
        assert!(Paytable::plinko(&cfg, 1.0).is_err());
    }
}
