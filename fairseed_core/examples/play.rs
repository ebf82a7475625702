use fairseed_core::{CommitmentManager, Engine, GameConfig, MinesConfig, PlinkoConfig, RiskTier};

fn main() -> Result<(), fairseed_core::FairError> {
    // Example end-to-end session: commit, play, rotate, verify
    let engine = Engine::default();
    let mut manager = CommitmentManager::new(Some("example-client-seed".into()));
    let pair_id = manager.active().id();
    println!("committed server_seed_hash={}", manager.active().server_seed_hash());

    let mines = GameConfig::Mines(MinesConfig::with_picks(3, vec![0, 6, 12]));
    let plinko = GameConfig::Plinko(PlinkoConfig { rows: 16, risk: RiskTier::Medium });
    let outcomes = vec![
        (mines.clone(), manager.play(&engine, &mines)?),
        (plinko.clone(), manager.play(&engine, &plinko)?),
    ];

    let revealed = manager.rotate(pair_id, None)?;
    for (config, outcome) in &outcomes {
        let ok = engine.verify(&revealed.server_seed, &revealed.client_seed, outcome.nonce, config, outcome);
        println!(
            "nonce={} game={} multiplier={:.4} result={:?} verified={ok}",
            outcome.nonce, outcome.game, outcome.multiplier, outcome.result
        );
    }
    println!("revealed server_seed={}", revealed.server_seed);
    Ok(())
}
