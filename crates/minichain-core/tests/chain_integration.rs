use minichain_core::constants::{GENESIS_DATA, ZERO_HASH_HEX};
use minichain_core::{
    chain::genesis_block, Block, CancelToken, Chain, ChainConfig, ChainError, MineOptions,
};

#[test]
fn build_and_validate_chain() -> anyhow::Result<()> {
    let mut chain = Chain::new(ChainConfig {
        genesis_difficulty: 2,
        ..ChainConfig::default()
    })?;

    let payloads = ["alice pays bob 10", "bob pays carol 5", "carol pays dave 2"];
    for (i, payload) in payloads.iter().enumerate() {
        let mined = chain.add_block(*payload, 2)?;
        assert_eq!(mined.index, i as u64 + 1);
        assert!(mined.hash.starts_with("00"));
    }
    assert_eq!(chain.len(), payloads.len() + 1);

    // Every block names its parent and can be re-hashed from its fields.
    for pair in chain.blocks().windows(2) {
        assert_eq!(pair[1].previous_hash, pair[0].hash);
        assert_eq!(pair[1].index, pair[0].index + 1);
        assert_eq!(pair[1].compute_hash(), pair[1].hash);
    }

    let result = chain.validate();
    assert!(result.is_valid);
    assert_eq!(result.first_bad_index, None);
    Ok(())
}

#[test]
fn blocks_survive_json_round_trip() -> anyhow::Result<()> {
    let mut chain = Chain::new(ChainConfig {
        genesis_difficulty: 1,
        ..ChainConfig::default()
    })?;
    chain.add_block("payload with | separators", 1)?;

    let json = serde_json::to_string(chain.blocks())?;
    let blocks: Vec<Block> = serde_json::from_str(&json)?;
    assert_eq!(blocks, chain.blocks());
    assert!(blocks.iter().all(|b| b.compute_hash() == b.hash));
    Ok(())
}

#[test]
fn genesis_block_helper() -> anyhow::Result<()> {
    let genesis = genesis_block(1, &MineOptions::unbounded())?;
    assert_eq!(genesis.index, 0);
    assert_eq!(genesis.data, GENESIS_DATA);
    assert_eq!(genesis.previous_hash, ZERO_HASH_HEX);
    assert!(genesis.meets_difficulty(1));
    Ok(())
}

#[test]
fn cancelled_chain_creation() {
    let token = CancelToken::new();
    token.cancel();
    let err = Chain::new(ChainConfig {
        genesis_difficulty: 4,
        mine: MineOptions::unbounded().with_cancel(token),
    })
    .unwrap_err();
    assert_eq!(err, ChainError::Cancelled { attempts: 0 });
}

#[test]
fn error_messages() {
    assert_eq!(
        ChainError::IndexOutOfRange { index: 7, len: 3 }.to_string(),
        "block index 7 out of range (chain has 3 blocks)"
    );
    assert_eq!(
        ChainError::DifficultyOutOfRange {
            difficulty: 70,
            max: 64
        }
        .to_string(),
        "difficulty 70 exceeds the maximum of 64"
    );
    assert_eq!(ChainError::EmptyChain.to_string(), "chain has no blocks");
}
