use core::num::NonZeroU64;
use std::sync::Arc;

use num_bigint::BigUint;
use tokio_util::sync::CancellationToken;
use types::{
    primitives::{ExecutionBlockNumber, Gas, Slot, Wei, H256},
    uint256::Uint256,
};

use crate::{
    consensus_cache::{parent_slot, payload_of, ConsensusCache},
    error::{Error, Result},
    remote::{cancellable, RemoteChainSource},
};

/// Values a proposer of a given slot derives from the parent block.
pub struct ProposalContext<S> {
    cache: Arc<ConsensusCache<S>>,
}

impl<S: RemoteChainSource> ProposalContext<S> {
    #[must_use]
    pub const fn new(cache: Arc<ConsensusCache<S>>) -> Self {
        Self { cache }
    }

    /// Returns the gas limit of the block preceding (by slot) the block with `block_number`.
    pub async fn gas_limit_for_parent(
        &self,
        block_number: ExecutionBlockNumber,
        token: &CancellationToken,
    ) -> Result<Gas> {
        let slot = self.cache.slot_of_block_number(block_number)?;
        let parent = self.cache.get_block(parent_slot(slot)?, token).await?;
        Ok(payload_of(&parent)?.gas_limit)
    }

    pub async fn next_block_number(
        &self,
        slot: Slot,
        token: &CancellationToken,
    ) -> Result<ExecutionBlockNumber> {
        let parent = self.cache.get_block(parent_slot(slot)?, token).await?;

        payload_of(&parent)?
            .block_number
            .checked_add(1)
            .ok_or(Error::Overflow {
                what: "next block number",
            })
    }

    pub async fn next_base_fee(&self, slot: Slot, token: &CancellationToken) -> Result<Wei> {
        let config = self.cache.config();
        let parent = self.cache.get_block(parent_slot(slot)?, token).await?;
        let payload = payload_of(&parent)?;

        compute_base_fee(
            payload.gas_limit / config.elasticity_multiplier,
            payload.gas_used,
            payload.base_fee_per_gas,
            config.base_fee_change_denominator,
        )
    }

    /// Returns the RANDAO mix as of the parent slot.
    pub async fn randomness_seed(&self, slot: Slot, token: &CancellationToken) -> Result<H256> {
        let parent_slot = parent_slot(slot)?;
        cancellable(token, self.cache.source().randao(parent_slot)).await
    }
}

/// Computes the base fee of a block from its parent as specified in [EIP-1559].
///
/// Divisions truncate and are performed in the same order as in the EIP.
///
/// [EIP-1559]: https://eips.ethereum.org/EIPS/eip-1559
pub fn compute_base_fee(
    parent_gas_target: Gas,
    parent_gas_used: Gas,
    parent_base_fee: Wei,
    base_fee_change_denominator: NonZeroU64,
) -> Result<Wei> {
    if parent_gas_used == parent_gas_target {
        return Ok(parent_base_fee);
    }

    if parent_gas_target == 0 {
        return Err(Error::InvalidGasTarget {
            gas_used: parent_gas_used,
        });
    }

    let base_fee = to_big(parent_base_fee);
    let target = BigUint::from(parent_gas_target);
    let denominator = BigUint::from(base_fee_change_denominator.get());

    let base_fee = if parent_gas_used > parent_gas_target {
        let gas_used_delta = BigUint::from(parent_gas_used - parent_gas_target);
        let base_fee_delta = &gas_used_delta * &base_fee / &target / &denominator;
        base_fee + base_fee_delta.max(BigUint::from(1_u8))
    } else {
        let gas_used_delta = BigUint::from(parent_gas_target - parent_gas_used);
        let base_fee_delta = &gas_used_delta * &base_fee / &target / &denominator;

        if base_fee_delta > base_fee {
            BigUint::default()
        } else {
            base_fee - base_fee_delta
        }
    };

    from_big(&base_fee).ok_or(Error::Overflow { what: "base fee" })
}

fn to_big(value: Uint256) -> BigUint {
    BigUint::from_bytes_le(&value.to_le_bytes())
}

fn from_big(value: &BigUint) -> Option<Uint256> {
    Uint256::from_le_bytes(&value.to_bytes_le())
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use nonzero_ext::nonzero;
    use test_case::test_case;

    use crate::{
        config::{Config, BASE_FEE_CHANGE_DENOMINATOR},
        error::Missing,
        mock_source::{post_merge_block, prev_randao, MockChainSource, PayloadFields},
    };

    use super::*;

    #[test_case(15, 15, 1000 => 1000; "gas used equals target")]
    #[test_case(10, 20, 1000 => 1125; "gas used above target")]
    #[test_case(20, 10, 1000 => 938; "gas used below target")]
    #[test_case(10, 0, 4 => 4; "decrease truncates to zero")]
    #[test_case(20, 21, 4 => 5; "increase is at least one")]
    #[test_case(1, 0, 7 => 7; "empty block with small base fee")]
    #[test_case(1, 0, 1_000_000 => 875_000; "empty block lowers base fee by one eighth")]
    #[test_case(0, 0, 9 => 9; "zero target and zero gas used")]
    fn base_fee(target: Gas, used: Gas, base: u64) -> u64 {
        compute_base_fee(target, used, Uint256::from_u64(base), BASE_FEE_CHANGE_DENOMINATOR)
            .expect("base fee should be computable")
            .into_raw()
            .as_u64()
    }

    #[test]
    fn base_fee_rejects_zero_target() {
        assert!(matches!(
            compute_base_fee(0, 1, Uint256::from_u64(1), BASE_FEE_CHANGE_DENOMINATOR),
            Err(Error::InvalidGasTarget { gas_used: 1 }),
        ));
    }

    #[test]
    fn base_fee_overflow_is_an_error() {
        assert!(matches!(
            compute_base_fee(1, 2, Uint256::MAX, BASE_FEE_CHANGE_DENOMINATOR),
            Err(Error::Overflow { what: "base fee" }),
        ));
    }

    #[test]
    fn base_fee_handles_values_beyond_u64() -> Result<()> {
        let base = Uint256::from_le_bytes(&[0, 0, 0, 0, 0, 0, 0, 0, 8])
            .expect("9 bytes fit in 256 bits");

        let next = compute_base_fee(10, 0, base, nonzero!(8_u64))?;

        assert_eq!(
            next,
            Uint256::from_le_bytes(&[0, 0, 0, 0, 0, 0, 0, 0, 7]).expect("9 bytes fit in 256 bits"),
        );

        Ok(())
    }

    fn context_with_blocks(
        blocks: impl IntoIterator<Item = (Slot, PayloadFields)>,
    ) -> ProposalContext<MockChainSource> {
        let source = MockChainSource::default();

        for (slot, fields) in blocks {
            source.insert_block(post_merge_block(slot, fields));
        }

        ProposalContext::new(Arc::new(ConsensusCache::new(
            Arc::new(source),
            Config::default(),
        )))
    }

    #[tokio::test]
    async fn next_block_number_and_base_fee_come_from_parent() -> Result<()> {
        let context = context_with_blocks([(
            99,
            PayloadFields {
                block_number: 5_000,
                gas_limit: 30_000_000,
                gas_used: 30_000_000,
                base_fee_per_gas: 1_000,
            },
        )]);
        let token = CancellationToken::new();

        assert_eq!(context.next_block_number(100, &token).await?, 5_001);
        assert_eq!(
            context.next_base_fee(100, &token).await?,
            Uint256::from_u64(1_125),
        );

        Ok(())
    }

    #[tokio::test]
    async fn next_block_number_over_empty_parent_is_not_found() {
        let context = context_with_blocks([]);

        let error = context
            .next_block_number(100, &CancellationToken::new())
            .await
            .expect_err("parent slot is empty");

        assert!(matches!(
            error,
            Error::NotFound {
                what: Missing::Block(99),
            },
        ));
    }

    #[tokio::test]
    async fn gas_limit_for_parent_uses_block_number_index() -> Result<()> {
        let context = context_with_blocks([
            (
                40,
                PayloadFields {
                    block_number: 700,
                    gas_limit: 29_000_000,
                    ..PayloadFields::default()
                },
            ),
            (
                41,
                PayloadFields {
                    block_number: 701,
                    gas_limit: 31_000_000,
                    ..PayloadFields::default()
                },
            ),
        ]);
        let token = CancellationToken::new();

        context.cache.fetch_block(41, &token).await?;

        assert_eq!(context.gas_limit_for_parent(701, &token).await?, 29_000_000);

        assert!(matches!(
            context.gas_limit_for_parent(702, &token).await,
            Err(Error::UnknownBlockNumber { block_number: 702 }),
        ));

        Ok(())
    }

    #[tokio::test]
    async fn randomness_seed_is_parent_randao() -> Result<()> {
        let source = MockChainSource::default();
        source.insert_randao(63, prev_randao(63));

        let context = ProposalContext::new(Arc::new(ConsensusCache::new(
            Arc::new(source),
            Config::default(),
        )));

        assert_eq!(
            context
                .randomness_seed(64, &CancellationToken::new())
                .await?,
            prev_randao(63),
        );

        Ok(())
    }

    #[tokio::test]
    async fn randomness_seed_is_cancellable() {
        let source = MockChainSource::default();
        source.stall();

        let context = ProposalContext::new(Arc::new(ConsensusCache::new(
            Arc::new(source),
            Config::default(),
        )));

        let token = CancellationToken::new();
        token.cancel();

        let error = context
            .randomness_seed(64, &token)
            .await
            .expect_err("token is already cancelled");

        assert!(error.is_cancelled());
    }
}
