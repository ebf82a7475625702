use chrono::{DateTime, Utc};
use fairseed_core::{
    verify_commitment, Engine, FairError, FairResult, GameConfig, GameId, GameSession,
    PlayOutcome, RevealedSeed, SeedPair,
};
use serde::{Deserialize, Serialize};

/// Public view of the active seed pair. The server seed itself is withheld.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Commitment {
    pub pair_id: u64,
    pub server_seed_hash: String,
    pub client_seed: String,
    pub next_nonce: u64,
    pub created_at: DateTime<Utc>,
}

impl From<&SeedPair> for Commitment {
    fn from(pair: &SeedPair) -> Self {
        Self {
            pair_id: pair.id(),
            server_seed_hash: pair.server_seed_hash().to_string(),
            client_seed: pair.client_seed().to_string(),
            next_nonce: pair.nonce(),
            created_at: pair.created_at(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Rotation {
    pub revealed: RevealedSeed,
    pub next: Commitment,
}

/// Everything a third party needs, besides the later revealed server seed, to
/// re-derive a play.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PlayReceipt {
    pub server_seed_hash: String,
    pub client_seed: String,
    pub config: GameConfig,
    pub outcome: PlayOutcome,
    pub ts: DateTime<Utc>,
}

impl PlayReceipt {
    pub fn new(
        server_seed_hash: impl Into<String>,
        client_seed: impl Into<String>,
        config: GameConfig,
        outcome: PlayOutcome,
    ) -> Self {
        Self {
            server_seed_hash: server_seed_hash.into(),
            client_seed: client_seed.into(),
            config,
            outcome,
            ts: Utc::now(),
        }
    }

    /// Receipt for a finished session round.
    pub fn from_session(session: &GameSession) -> FairResult<Self> {
        let outcome = session.settled_outcome()?;
        let round = session
            .round()
            .ok_or_else(|| FairError::InvalidState("no round played".into()))?;
        Ok(Self::new(
            round.server_seed_hash.clone(),
            round.client_seed.clone(),
            session.settled_config(),
            outcome,
        ))
    }

    pub fn audit(&self, engine: &Engine, server_seed: &str) -> AuditReport {
        AuditReport {
            game: self.outcome.game,
            nonce: self.outcome.nonce,
            commitment_ok: verify_commitment(server_seed, &self.server_seed_hash),
            outcome_ok: engine.verify(
                server_seed,
                &self.client_seed,
                self.outcome.nonce,
                &self.config,
                &self.outcome,
            ),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct AuditReport {
    pub game: GameId,
    pub nonce: u64,
    pub commitment_ok: bool,
    pub outcome_ok: bool,
}

impl AuditReport {
    pub fn passed(&self) -> bool {
        self.commitment_ok && self.outcome_ok
    }

    pub fn into_result(self) -> AuditResult<Self> {
        if !self.commitment_ok {
            return Err(AuditError::CommitmentMismatch);
        }
        if !self.outcome_ok {
            return Err(AuditError::OutcomeMismatch { nonce: self.nonce });
        }
        Ok(self)
    }
}

/// One settled play, flattened for CSV export.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PlayLogEntry {
    pub id: u64,
    pub pair_id: u64,
    pub server_seed_hash: String,
    pub client_seed: String,
    pub nonce: u64,
    pub game: GameId,
    pub result: String,
    pub multiplier: f64,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AuditError {
    #[error("revealed server seed does not match the published hash")]
    CommitmentMismatch,
    #[error("outcome for nonce {nonce} does not reproduce")]
    OutcomeMismatch { nonce: u64 },
}

pub type AuditResult<T> = Result<T, AuditError>;
