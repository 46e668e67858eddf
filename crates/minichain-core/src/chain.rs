use crate::{
    constants::{DEFAULT_DIFFICULTY, GENESIS_DATA, ZERO_HASH_HEX},
    Block, ChainError, MineOptions, Mined, Result,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Clone, Debug)]
pub struct ChainConfig {
    pub genesis_difficulty: u32,
    /// Applied to genesis and to every `add_block`.
    pub mine: MineOptions,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            genesis_difficulty: DEFAULT_DIFFICULTY,
            mine: MineOptions::unbounded(),
        }
    }
}

/// What `add_block` reports about the block it appended.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MinedBlock {
    pub index: u64,
    pub hash: String,
    pub nonce: u64,
    pub attempts: u64,
    pub elapsed: Duration,
}

impl MinedBlock {
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationKind {
    /// Stored hash differs from the recomputed one.
    HashMismatch,
    /// `previous_hash` does not name the preceding block.
    LinkMismatch,
    /// Genesis does not point at the all-zero digest.
    GenesisMismatch,
    /// Hash lacks the leading zeros the block's difficulty claims.
    InsufficientWork,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationKind::HashMismatch => write!(f, "hash mismatch"),
            ViolationKind::LinkMismatch => write!(f, "previous hash does not match the prior block"),
            ViolationKind::GenesisMismatch => write!(f, "genesis previous hash is not the zero digest"),
            ViolationKind::InsufficientWork => write!(f, "hash fails its difficulty target"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub index: usize,
    pub kind: ViolationKind,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block {}: {}", self.index, self.kind)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub first_bad_index: Option<usize>,
    pub reason: Option<ViolationKind>,
}

impl From<Option<Violation>> for ValidationResult {
    fn from(first: Option<Violation>) -> Self {
        Self {
            is_valid: first.is_none(),
            first_bad_index: first.map(|v| v.index),
            reason: first.map(|v| v.kind),
        }
    }
}

/// An in-memory, append-only chain rooted at a genesis block.
#[derive(Clone, Debug)]
pub struct Chain {
    pub(crate) blocks: Vec<Block>,
    config: ChainConfig,
}

impl Chain {
    /// Mine the genesis block and start a chain with it.
    pub fn new(config: ChainConfig) -> Result<Self> {
        let genesis = genesis_block(config.genesis_difficulty, &config.mine)?;
        info!(
            "Chain initialised with genesis {} (difficulty {})",
            genesis.hash, genesis.difficulty
        );
        Ok(Self {
            blocks: vec![genesis],
            config,
        })
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn block(&self, index: usize) -> Result<&Block> {
        self.blocks.get(index).ok_or(ChainError::IndexOutOfRange {
            index,
            len: self.blocks.len(),
        })
    }

    pub fn latest(&self) -> Result<&Block> {
        self.blocks.last().ok_or(ChainError::EmptyChain)
    }

    /// Mine a block on top of the latest one and append it.
    ///
    /// The chain is left untouched when mining fails.
    pub fn add_block(&mut self, data: impl Into<String>, difficulty: u32) -> Result<MinedBlock> {
        let latest = self.latest()?;
        let candidate = Block::new(latest.index + 1, data, latest.hash.clone());
        let Mined {
            block,
            attempts,
            elapsed,
        } = candidate.mine_with(difficulty, &self.config.mine)?;

        let mined = MinedBlock {
            index: block.index,
            hash: block.hash.clone(),
            nonce: block.nonce,
            attempts,
            elapsed,
        };
        self.blocks.push(block);
        Ok(mined)
    }

    /// Every block that fails a check, in chain order, with the first failing
    /// check per block. Linkage is checked before the hash, then the work.
    pub fn violations(&self) -> impl Iterator<Item = Violation> + '_ {
        self.blocks
            .iter()
            .enumerate()
            .filter_map(move |(index, block)| {
                let previous = index.checked_sub(1).map(|i| &self.blocks[i]);
                inspect(block, previous).map(|kind| Violation { index, kind })
            })
    }

    /// Recomputes the whole chain on every call.
    pub fn validate(&self) -> ValidationResult {
        let first = self.violations().next();
        match first {
            Some(violation) => warn!("Chain invalid at {violation}"),
            None => debug!("Chain of {} blocks is valid", self.blocks.len()),
        }
        first.into()
    }

    /// Overwrite a block's payload without re-hashing, breaking its integrity.
    #[cfg(any(test, feature = "tamper"))]
    pub fn tamper(&mut self, index: usize, new_data: impl Into<String>) -> Result<()> {
        let len = self.blocks.len();
        let block = self
            .blocks
            .get_mut(index)
            .ok_or(ChainError::IndexOutOfRange { index, len })?;
        block.data = new_data.into();
        warn!("Block {index} payload overwritten without re-hashing");
        Ok(())
    }
}

/// Genesis: index 0, the zero digest as its parent, mined at `difficulty`.
pub fn genesis_block(difficulty: u32, options: &MineOptions) -> Result<Block> {
    let candidate = Block::new(0, GENESIS_DATA, ZERO_HASH_HEX);
    Ok(candidate.mine_with(difficulty, options)?.block)
}

fn inspect(block: &Block, previous: Option<&Block>) -> Option<ViolationKind> {
    match previous {
        Some(prev) if block.previous_hash != prev.hash => return Some(ViolationKind::LinkMismatch),
        None if block.previous_hash != ZERO_HASH_HEX => return Some(ViolationKind::GenesisMismatch),
        _ => {}
    }
    if block.compute_hash() != block.hash {
        return Some(ViolationKind::HashMismatch);
    }
    if !block.meets_difficulty(block.difficulty) {
        return Some(ViolationKind::InsufficientWork);
    }
    None
}
