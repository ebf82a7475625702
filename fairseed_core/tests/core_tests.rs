use fairseed_core::{
    binomial_probabilities, derive_hash_hex, mines, resolve_play, verify, verify_commitment,
    CommitmentManager, DiceConfig, DiceDirection, Engine, FairError, GameConfig, GameResult,
    MinesConfig, Paytable, PlinkoConfig, RiskTier, GRID_SIZE, PLINKO_ROWS,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

const VECTOR_SEED: &str = "abc123def456abc123def456abc123def456abc123def456abc123def456abcd";

fn mines_of(config: &GameConfig, server_seed: &str, client_seed: &str, nonce: u64) -> Vec<u8> {
    match resolve_play(server_seed, client_seed, nonce, config).unwrap().result {
        GameResult::Mines { mines, .. } => mines,
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn fixed_vector_mines() {
    assert_eq!(
        derive_hash_hex(VECTOR_SEED.as_bytes()),
        "bf749443e04b9613e09ec3caab147ffa0f2a75b8aa170b1114baec7ae5593acf"
    );
    let cfg = GameConfig::Mines(MinesConfig::new(3));
    let out = resolve_play(VECTOR_SEED, "test", 0, &cfg).unwrap();
    // HMAC-SHA256(key, "test:0:0") starts with bcd868ec
    assert_eq!(out.derived[0], f64::from(0xbcd8_68ecu32) / 4_294_967_296.0);
    assert_eq!(out.derived.len(), 3);
    assert_eq!(mines_of(&cfg, VECTOR_SEED, "test", 0), vec![7, 17, 18]);
    assert_eq!(mines_of(&cfg, VECTOR_SEED, "test", 1), vec![3, 8, 20]);
}

#[test]
fn fixed_vector_plinko_and_dice() {
    let plinko = GameConfig::Plinko(PlinkoConfig { rows: 8, risk: RiskTier::Low });
    let out = resolve_play(VECTOR_SEED, "test", 0, &plinko).unwrap();
    match out.result {
        GameResult::Plinko { bucket, .. } => assert_eq!(bucket, 6),
        other => panic!("unexpected {other:?}"),
    }

    let dice = GameConfig::Dice(DiceConfig { target: 70.0, direction: DiceDirection::Over });
    let out = resolve_play(VECTOR_SEED, "test", 0, &dice).unwrap();
    match out.result {
        GameResult::Dice { roll, win } => {
            assert!((roll - 73.767_715_226_858_85).abs() < 1e-9);
            assert!(win);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn resolve_repeatable() {
    let configs = [
        GameConfig::Mines(MinesConfig::new(7)),
        GameConfig::Plinko(PlinkoConfig { rows: 16, risk: RiskTier::High }),
        GameConfig::Dice(DiceConfig { target: 10.0, direction: DiceDirection::Under }),
    ];
    for cfg in &configs {
        for nonce in 0..20 {
            let a = resolve_play("s", "c", nonce, cfg).unwrap();
            let b = resolve_play("s", "c", nonce, cfg).unwrap();
            assert_eq!(a, b);
        }
    }
}

#[test]
fn session_outcomes_verify_after_reveal() {
    let mut manager = CommitmentManager::with_rng(StdRng::seed_from_u64(3), Some("player".into()));
    let engine = Engine::default();
    let pair_id = manager.active().id();
    let published_hash = manager.active().server_seed_hash().to_string();
    let configs = [
        GameConfig::Mines(MinesConfig::with_picks(3, vec![1, 2, 3])),
        GameConfig::Plinko(PlinkoConfig { rows: 10, risk: RiskTier::Medium }),
        GameConfig::Dice(DiceConfig { target: 33.0, direction: DiceDirection::Over }),
    ];
    let mut played = Vec::new();
    for round in 0..30 {
        let cfg = configs[round % configs.len()].clone();
        let outcome = manager.play(&engine, &cfg).unwrap();
        assert!(manager.active().commitment_holds());
        played.push((cfg, outcome));
    }
    let revealed = manager.rotate(pair_id, None).unwrap();
    assert!(verify_commitment(&revealed.server_seed, &published_hash));
    assert_eq!(revealed.plays, 30);

    for (cfg, outcome) in &played {
        assert!(verify(&revealed.server_seed, "player", outcome.nonce, cfg, outcome));
        // flip one byte of the seed
        let mut tampered = revealed.server_seed.clone().into_bytes();
        tampered[0] ^= 0x01;
        let tampered = String::from_utf8(tampered).unwrap();
        assert!(!verify(&tampered, "player", outcome.nonce, cfg, outcome));
        assert!(!verify(&revealed.server_seed, "playes", outcome.nonce, cfg, outcome));
    }
}

#[test]
fn mines_cell_frequency_uniform() {
    let mine_count = 3u8;
    let cfg = GameConfig::Mines(MinesConfig::new(mine_count));
    let plays = 100_000u64;
    let mut counts = [0u64; GRID_SIZE as usize];
    for nonce in 0..plays {
        for cell in mines_of(&cfg, "uniformity-server", "uniformity-client", nonce) {
            counts[cell as usize] += 1;
        }
    }
    let expected = f64::from(mine_count) / f64::from(GRID_SIZE);
    for (cell, count) in counts.iter().enumerate() {
        let freq = *count as f64 / plays as f64;
        // ~6 standard deviations at n = 100k
        assert!((freq - expected).abs() < 0.006, "cell {cell}: {freq} vs {expected}");
    }
}

#[test]
fn plinko_tables_return_configured_rtp() {
    for risk in RiskTier::ALL {
        for rows in PLINKO_ROWS {
            let table = Paytable::plinko(&PlinkoConfig { rows, risk }, 1.0).unwrap();
            let probs = binomial_probabilities(rows);
            let rtp: f64 = probs.iter().zip(&table.multipliers).map(|(p, m)| p * m).sum();
            assert!((rtp - 1.0).abs() < 1e-6, "{risk} {rows}: {rtp}");
        }
    }
}

#[test]
fn mines_multiplier_monotone() {
    for m in 1..GRID_SIZE {
        for k in 0..(GRID_SIZE - m) {
            let a = mines::multiplier(m, k, 0.99).unwrap();
            let b = mines::multiplier(m, k + 1, 0.99).unwrap();
            assert!(b > a);
        }
    }
}

#[test]
fn nonce_sequence_has_no_gaps() {
    let mut manager = CommitmentManager::new(None);
    let n = 1_000;
    let seq: Vec<u64> = (0..n).map(|_| manager.next_nonce()).collect();
    assert_eq!(seq, (0..n).collect::<Vec<u64>>());
}

#[test]
fn invalid_config_is_config_error() {
    let mut manager = CommitmentManager::new(None);
    let engine = Engine::default();
    let bad = [
        GameConfig::Mines(MinesConfig::new(25)),
        GameConfig::Plinko(PlinkoConfig { rows: 9, risk: RiskTier::Low }),
        GameConfig::Dice(DiceConfig { target: 100.0, direction: DiceDirection::Under }),
    ];
    for cfg in &bad {
        assert!(matches!(manager.play(&engine, cfg), Err(FairError::Config(_))));
    }
    assert_eq!(manager.active().nonce(), 0);
}
