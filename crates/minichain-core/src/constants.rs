pub const NIBBLE: u32 = 4;
pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;
pub const ZERO_HASH_HEX: &str = "0000000000000000000000000000000000000000000000000000000000000000";
pub const GENESIS_DATA: &str = "Genesis Block";
pub const DEFAULT_DIFFICULTY: u32 = 4;
pub const MAX_DIFFICULTY: u32 = HASH_HEX_SIZE as u32;
pub const CANCEL_CHECK_INTERVAL: u64 = 4096;
