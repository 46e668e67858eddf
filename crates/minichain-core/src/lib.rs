pub mod chain;
pub mod constants;
pub mod error;
pub mod mine;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};

use constants::HASH_SIZE;

pub use chain::{Chain, ChainConfig, MinedBlock, ValidationResult, Violation, ViolationKind};
pub use error::{ChainError, Result};
pub use mine::{CancelToken, MineOptions, Mined};

pub type Hash = [u8; HASH_SIZE];

pub fn sha256(bytes: &[u8]) -> Hash {
    let digest = Sha256::digest(bytes);
    let mut out = [0u8; HASH_SIZE];
    out.copy_from_slice(&digest[..]);
    out
}

pub(crate) fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or_default()
}

/// One link in the chain.
///
/// `hash` is the hex SHA-256 of [`Block::hash_input`] as it stood when mining
/// stopped. `difficulty` records the work claimed for the block and is not
/// itself hashed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub timestamp: f64,
    pub data: String,
    pub previous_hash: String,
    pub nonce: u64,
    pub hash: String,
    pub difficulty: u32,
}

impl Block {
    /// An unmined block stamped with the current time.
    pub fn new(index: u64, data: impl Into<String>, previous_hash: impl Into<String>) -> Self {
        Self::new_at(index, unix_now(), data, previous_hash)
    }

    pub fn new_at(
        index: u64,
        timestamp: f64,
        data: impl Into<String>,
        previous_hash: impl Into<String>,
    ) -> Self {
        let mut block = Self {
            index,
            timestamp,
            data: data.into(),
            previous_hash: previous_hash.into(),
            nonce: 0,
            hash: String::new(),
            difficulty: 0,
        };
        block.hash = block.compute_hash();
        block
    }

    /// Everything in the hash input that precedes the nonce.
    pub(crate) fn hash_prefix(&self) -> String {
        format!(
            "{}|{:?}|{}|{}:{}|",
            self.index,
            self.timestamp,
            self.previous_hash,
            self.data.len(),
            self.data
        )
    }

    /// Canonical serialization: `index|timestamp|previous_hash|len:data|nonce`.
    pub fn hash_input(&self) -> String {
        format!("{}{}", self.hash_prefix(), self.nonce)
    }

    pub fn digest(&self) -> Hash {
        sha256(self.hash_input().as_bytes())
    }

    pub fn compute_hash(&self) -> String {
        hex::encode(self.digest())
    }

    /// Whether the stored `hash` carries at least `difficulty` leading zero hex digits.
    pub fn meets_difficulty(&self, difficulty: u32) -> bool {
        let mut digest = [0u8; HASH_SIZE];
        hex::decode_to_slice(&self.hash, &mut digest).is_ok()
            && pow::meets_difficulty(&digest, difficulty)
    }
}

pub mod pow {
    use super::Hash;
    use crate::constants::{HASH_SIZE, MAX_DIFFICULTY, NIBBLE};

    pub fn count_leading_zero_bits(hash: &Hash) -> u32 {
        let mut total = 0u32;
        for b in hash {
            if *b == 0 {
                total += 8;
            } else {
                total += b.leading_zeros();
                break;
            }
        }
        total
    }

    /// Leading zero hex characters of the hash's hex encoding.
    pub fn leading_zero_nibbles(hash: &Hash) -> u32 {
        count_leading_zero_bits(hash) / NIBBLE
    }

    pub fn meets_difficulty(hash: &Hash, difficulty: u32) -> bool {
        leading_zero_nibbles(hash) >= difficulty
    }

    /// The threshold `2^(256 - 4 * difficulty)` as a big-endian number.
    ///
    /// `None` for difficulty 0, whose threshold does not fit in a digest (every
    /// hash qualifies), and for difficulties past `MAX_DIFFICULTY`.
    pub fn target_for(difficulty: u32) -> Option<Hash> {
        if difficulty == 0 || difficulty > MAX_DIFFICULTY {
            return None;
        }
        let bit = HASH_SIZE as u32 * 8 - difficulty * NIBBLE;
        let mut target = [0u8; HASH_SIZE];
        target[HASH_SIZE - 1 - (bit / 8) as usize] = 1 << (bit % 8);
        Some(target)
    }

    /// Both values are compared as 256-bit big-endian numbers.
    pub fn hash_below_target(hash: &Hash, target: &Hash) -> bool {
        hash < target
    }
}
