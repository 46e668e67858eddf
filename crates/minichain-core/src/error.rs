use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// The chain holds no blocks. Unreachable through `Chain::new`.
    #[error("chain has no blocks")]
    EmptyChain,

    #[error("block index {index} out of range (chain has {len} blocks)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("difficulty {difficulty} exceeds the maximum of {max}")]
    DifficultyOutOfRange { difficulty: u32, max: u32 },

    #[error("no nonce meeting difficulty {difficulty} found in {attempts} attempts")]
    AttemptsExhausted { attempts: u64, difficulty: u32 },

    #[error("mining cancelled after {attempts} attempts")]
    Cancelled { attempts: u64 },
}

pub type Result<T> = std::result::Result<T, ChainError>;
