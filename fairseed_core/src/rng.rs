use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

// Provably-fair derivation:
// HMAC-SHA256(key = server_seed, msg = "client_seed:nonce:sub_index")
// -> first 4 bytes, big-endian u32 -> divided by 2^32 -> float in [0,1)

pub type HmacSha256 = Hmac<Sha256>;

/// Number of leading HMAC bytes turned into one derived value.
pub const DERIVED_BYTES: usize = 4;

const DERIVED_SCALE: f64 = u32::MAX as f64 + 1.0;

pub fn derive_hash_hex(input: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input);
    hex::encode(hasher.finalize())
}

/// Raw HMAC for one sub-index of a play.
pub fn hmac_bytes(server_seed: &str, client_seed: &str, nonce: u64, sub_index: u32) -> [u8; 32] {
    let mut mac =
        HmacSha256::new_from_slice(server_seed.as_bytes()).expect("HMAC accepts any key length");
    mac.update(format!("{client_seed}:{nonce}:{sub_index}").as_bytes());
    let res = mac.finalize().into_bytes();
    let mut out = [0u8; 32];
    out.copy_from_slice(&res);
    out
}

pub fn bytes_to_float(bytes: &[u8; 32]) -> f64 {
    let mut word = [0u8; DERIVED_BYTES];
    word.copy_from_slice(&bytes[..DERIVED_BYTES]);
    f64::from(u32::from_be_bytes(word)) / DERIVED_SCALE
}

pub fn derive_float(server_seed: &str, client_seed: &str, nonce: u64, sub_index: u32) -> f64 {
    bytes_to_float(&hmac_bytes(server_seed, client_seed, nonce, sub_index))
}

/// The u32 word a derived value was made from. Rounds to the nearest word, so
/// a value that lost its last bit in a text round trip maps back to the same
/// word. `None` for anything outside [0,1).
pub fn derived_word(value: f64) -> Option<u32> {
    if !(0.0..1.0).contains(&value) {
        return None;
    }
    let scaled = (value * DERIVED_SCALE).round();
    (scaled <= f64::from(u32::MAX)).then_some(scaled as u32)
}

/// Cursor over the derived values of a single play. Each call consumes the
/// next sub-index, so every value is an independent HMAC.
pub struct FairRng<'a> {
    server_seed: &'a str,
    client_seed: &'a str,
    nonce: u64,
    sub_index: u32,
    consumed: Vec<f64>,
}

impl<'a> FairRng<'a> {
    pub fn new(server_seed: &'a str, client_seed: &'a str, nonce: u64) -> Self {
        Self {
            server_seed,
            client_seed,
            nonce,
            sub_index: 0,
            consumed: Vec::new(),
        }
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn next_float(&mut self) -> f64 {
        let v = derive_float(self.server_seed, self.client_seed, self.nonce, self.sub_index);
        self.sub_index += 1;
        self.consumed.push(v);
        v
    }

    /// Uniform index in `0..bound`. `bound` must be non-zero.
    pub fn next_index(&mut self, bound: usize) -> usize {
        let idx = (self.next_float() * bound as f64).floor() as usize;
        // floor(v * bound) < bound for v < 1, the min is only a guard.
        idx.min(bound - 1)
    }

    /// Every value drawn so far, in sub-index order.
    pub fn into_consumed(self) -> Vec<f64> {
        self.consumed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let mut rng1 = FairRng::new("server", "client", 1);
        let mut rng2 = FairRng::new("server", "client", 1);
        for _ in 0..5 {
            assert_eq!(rng1.next_float(), rng2.next_float());
        }
        assert_eq!(rng1.into_consumed(), rng2.into_consumed());
    }

    #[test]
    fn sub_indices_are_independent() {
        let a = derive_float("server", "client", 1, 0);
        let b = derive_float("server", "client", 1, 1);
        assert_ne!(a, b);
        let mut rng = FairRng::new("server", "client", 1);
        assert_eq!(rng.next_float(), a);
        assert_eq!(rng.next_float(), b);
    }

    #[test]
    fn values_in_unit_interval() {
        let mut rng = FairRng::new("s", "c", 9);
        for _ in 0..200 {
            let v = rng.next_float();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn bytes_to_float_edges() {
        let mut bytes = [0u8; 32];
        assert_eq!(bytes_to_float(&bytes), 0.0);
        bytes[..4].copy_from_slice(&[0xff; 4]);
        assert!(bytes_to_float(&bytes) < 1.0);
        bytes[..4].copy_from_slice(&[0x80, 0, 0, 0]);
        assert_eq!(bytes_to_float(&bytes), 0.5);
    }

    #[test]
    fn derived_word_survives_last_bit_drift() {
        let mut bytes = [0u8; 32];
        bytes[..4].copy_from_slice(&[0x3f, 0x1c, 0x9a, 0x07]);
        let v = bytes_to_float(&bytes);
        assert_eq!(derived_word(v), Some(0x3f1c_9a07));
        assert_eq!(derived_word(f64::from_bits(v.to_bits() + 1)), Some(0x3f1c_9a07));
        assert_eq!(derived_word(f64::from_bits(v.to_bits() - 1)), Some(0x3f1c_9a07));
        assert_eq!(derived_word(1.0 - 1.0 / DERIVED_SCALE), Some(u32::MAX));
        assert_eq!(derived_word(1.0), None);
        assert_eq!(derived_word(-0.25), None);
        assert_eq!(derived_word(f64::NAN), None);
    }

    #[test]
    fn sha256_known_vector() {
        assert_eq!(
            derive_hash_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
