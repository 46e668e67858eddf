use crate::{
    constants::{CANCEL_CHECK_INTERVAL, HASH_SIZE, MAX_DIFFICULTY},
    pow::meets_difficulty,
    Block, ChainError, Hash, Result,
};
use sha2::{Digest, Sha256};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Cooperative stop signal for a running search. Clones share one flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Bounds on a nonce search. The default searches until a nonce is found.
#[derive(Clone, Debug, Default)]
pub struct MineOptions {
    pub max_attempts: Option<u64>,
    pub cancel: Option<CancelToken>,
}

impl MineOptions {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn with_max_attempts(mut self, max_attempts: u64) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }
}

/// A block whose hash meets its difficulty, with the cost of finding it.
#[derive(Clone, Debug)]
pub struct Mined {
    pub block: Block,
    pub attempts: u64,
    pub elapsed: Duration,
}

impl Block {
    /// Mine without an attempt bound. See [`Block::mine_with`].
    pub fn mine(self, difficulty: u32) -> Result<Mined> {
        self.mine_with(difficulty, &MineOptions::unbounded())
    }

    /// Increment the nonce, starting from the current one, until the hash has
    /// `difficulty` leading zero hex digits.
    ///
    /// Consumes the candidate; the returned block has `nonce`, `hash` and
    /// `difficulty` set. Fails when `difficulty` exceeds `MAX_DIFFICULTY`, when
    /// `options.max_attempts` digests were tried without success, or when the
    /// cancel token fires.
    pub fn mine_with(self, difficulty: u32, options: &MineOptions) -> Result<Mined> {
        if difficulty > MAX_DIFFICULTY {
            return Err(ChainError::DifficultyOutOfRange {
                difficulty,
                max: MAX_DIFFICULTY,
            });
        }

        let started = Instant::now();
        // Only the nonce changes between attempts.
        let base = Sha256::new_with_prefix(self.hash_prefix());
        let mut candidate = self;
        let mut attempts = 0u64;

        loop {
            if options.max_attempts.is_some_and(|max| attempts >= max) {
                debug!(index = candidate.index, attempts, difficulty, "attempt budget spent");
                return Err(ChainError::AttemptsExhausted {
                    attempts,
                    difficulty,
                });
            }
            if attempts % CANCEL_CHECK_INTERVAL == 0 && options.is_cancelled() {
                debug!(index = candidate.index, attempts, "mining cancelled");
                return Err(ChainError::Cancelled { attempts });
            }

            let mut hasher = base.clone();
            hasher.update(candidate.nonce.to_string());
            let mut digest: Hash = [0u8; HASH_SIZE];
            digest.copy_from_slice(&hasher.finalize()[..]);
            attempts += 1;

            if meets_difficulty(&digest, difficulty) {
                candidate.hash = hex::encode(digest);
                candidate.difficulty = difficulty;
                let elapsed = started.elapsed();
                info!(
                    "Mined block {} with nonce {} after {} attempts and hash {}",
                    candidate.index, candidate.nonce, attempts, candidate.hash
                );
                return Ok(Mined {
                    block: candidate,
                    attempts,
                    elapsed,
                });
            }

            candidate.nonce = match candidate.nonce.checked_add(1) {
                Some(nonce) => nonce,
                None => {
                    return Err(ChainError::AttemptsExhausted {
                        attempts,
                        difficulty,
                    })
                }
            };
        }
    }
}
