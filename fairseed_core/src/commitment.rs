use std::collections::HashSet;
use std::fmt;
use std::mem;

use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use rand::{CryptoRng, Rng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::config::GameConfig;
use crate::engine::{Engine, PlayOutcome};
use crate::error::{state_err, FairResult};
use crate::rng::derive_hash_hex;

pub const SERVER_SEED_BYTES: usize = 32;
const CLIENT_SEED_PREFIX: &str = "user_session_";
const CLIENT_SEED_SUFFIX_LEN: usize = 8;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Hex encoded server secret. `Debug` never prints it.
#[derive(Clone, PartialEq, Eq)]
pub struct ServerSeed(String);

impl ServerSeed {
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn hash_hex(&self) -> String {
        derive_hash_hex(self.0.as_bytes())
    }
}

impl fmt::Debug for ServerSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ServerSeed(<hidden>)")
    }
}

#[derive(Debug)]
pub struct SeedPair {
    id: u64,
    server_seed: ServerSeed,
    server_seed_hash: String,
    client_seed: String,
    nonce: u64,
    created_at: DateTime<Utc>,
}

impl SeedPair {
    fn new(id: u64, server_seed: ServerSeed, client_seed: String) -> Self {
        let server_seed_hash = server_seed.hash_hex();
        Self {
            id,
            server_seed,
            server_seed_hash,
            client_seed,
            nonce: 0,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn server_seed_hash(&self) -> &str {
        &self.server_seed_hash
    }

    pub fn client_seed(&self) -> &str {
        &self.client_seed
    }

    /// The nonce the next play will use.
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Hands out the current nonce and advances the counter.
    pub fn next_nonce(&mut self) -> u64 {
        let nonce = self.nonce;
        self.nonce += 1;
        trace!(pair = self.id, nonce, "nonce issued");
        nonce
    }

    /// Recomputes the hash of the held secret and compares it with the
    /// published commitment.
    pub fn commitment_holds(&self) -> bool {
        self.server_seed.hash_hex() == self.server_seed_hash
    }

    fn resolve(&mut self, engine: &Engine, config: &GameConfig) -> FairResult<PlayOutcome> {
        if let Err(err) = config.validate() {
            warn!(pair = self.id, %err, "play rejected");
            return Err(err);
        }
        let nonce = self.next_nonce();
        engine.resolve(self.server_seed.expose(), &self.client_seed, nonce, config)
    }

    fn into_revealed(self) -> RevealedSeed {
        RevealedSeed {
            pair_id: self.id,
            server_seed: self.server_seed.0,
            server_seed_hash: self.server_seed_hash,
            client_seed: self.client_seed,
            plays: self.nonce,
            created_at: self.created_at,
            revealed_at: Utc::now(),
        }
    }
}

/// A retired pair, safe to publish.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RevealedSeed {
    pub pair_id: u64,
    pub server_seed: String,
    pub server_seed_hash: String,
    pub client_seed: String,
    /// Nonces `0..plays` were issued under this pair.
    pub plays: u64,
    pub created_at: DateTime<Utc>,
    pub revealed_at: DateTime<Utc>,
}

/// Owns the active seed pair and the revealed history of a session.
pub struct CommitmentManager<R = OsRng> {
    rng: R,
    next_id: u64,
    issued_hashes: HashSet<String>,
    active: SeedPair,
    revealed: Vec<RevealedSeed>,
}

impl CommitmentManager<OsRng> {
    pub fn new(client_seed: Option<String>) -> Self {
        Self::with_rng(OsRng, client_seed)
    }
}

impl<R: RngCore + CryptoRng> CommitmentManager<R> {
    pub fn with_rng(mut rng: R, client_seed: Option<String>) -> Self {
        let mut issued_hashes = HashSet::new();
        let active = create_seed_pair(&mut rng, &mut issued_hashes, 0, client_seed);
        Self {
            rng,
            next_id: 1,
            issued_hashes,
            active,
            revealed: Vec::new(),
        }
    }

    pub fn active(&self) -> &SeedPair {
        &self.active
    }

    pub fn next_nonce(&mut self) -> u64 {
        self.active.next_nonce()
    }

    /// Validates `config`, then resolves it under the next nonce of the active
    /// pair. A config error leaves the nonce untouched.
    pub fn play(&mut self, engine: &Engine, config: &GameConfig) -> FairResult<PlayOutcome> {
        self.active.resolve(engine, config)
    }

    /// Retires the pair `pair_id` and installs a fresh one. The outgoing
    /// secret is only released once the new pair is active.
    pub fn rotate(
        &mut self,
        pair_id: u64,
        new_client_seed: Option<String>,
    ) -> FairResult<RevealedSeed> {
        if pair_id != self.active.id {
            warn!(pair_id, active = self.active.id, "rotation of inactive pair");
            return Err(state_err(format!(
                "seed pair {pair_id} is not active (active is {})",
                self.active.id
            )));
        }
        let id = self.next_id;
        self.next_id += 1;
        let fresh = create_seed_pair(&mut self.rng, &mut self.issued_hashes, id, new_client_seed);
        let retired = mem::replace(&mut self.active, fresh);
        let revealed = retired.into_revealed();
        info!(
            retired = revealed.pair_id,
            plays = revealed.plays,
            active = self.active.id,
            hash = %self.active.server_seed_hash,
            "seed pair rotated"
        );
        self.revealed.push(revealed.clone());
        Ok(revealed)
    }

    /// Revelation of a retired pair.
    pub fn reveal(&self, pair_id: u64) -> FairResult<&RevealedSeed> {
        if pair_id == self.active.id {
            return Err(state_err(format!(
                "seed pair {pair_id} is still active; rotate before revealing"
            )));
        }
        self.revealed
            .iter()
            .find(|r| r.pair_id == pair_id)
            .ok_or_else(|| state_err(format!("unknown seed pair {pair_id}")))
    }

    pub fn history(&self) -> &[RevealedSeed] {
        &self.revealed
    }
}

fn create_seed_pair<R: RngCore + CryptoRng>(
    rng: &mut R,
    issued_hashes: &mut HashSet<String>,
    id: u64,
    client_seed: Option<String>,
) -> SeedPair {
    let server_seed = loop {
        let seed = generate_server_seed(rng);
        if issued_hashes.insert(seed.hash_hex()) {
            break seed;
        }
        warn!("server seed collision, drawing again");
    };
    let client_seed = client_seed.unwrap_or_else(|| generate_client_seed(rng));
    let pair = SeedPair::new(id, server_seed, client_seed);
    debug!(pair = id, hash = %pair.server_seed_hash, client_seed = %pair.client_seed, "seed pair committed");
    pair
}

pub fn generate_server_seed<R: RngCore + CryptoRng>(rng: &mut R) -> ServerSeed {
    let mut bytes = [0u8; SERVER_SEED_BYTES];
    rng.fill_bytes(&mut bytes);
    ServerSeed(hex::encode(bytes))
}

pub fn generate_client_seed<R: RngCore>(rng: &mut R) -> String {
    let suffix: String = (0..CLIENT_SEED_SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{CLIENT_SEED_PREFIX}{suffix}")
}
