//! On-chain collaborator seam.
//!
//! Everything the engine needs from the chain — balance reads, per-protocol
//! quote calls, atomic swap submission, and the guild vault surface — sits
//! behind one async trait. The settlement contracts, signing, and JSON-RPC
//! transport live outside this crate; deployments plug in a transport-backed
//! implementation, while tests and offline replays use in-memory ones.

use alloy_primitives::{Address, U256};
use anyhow::Result;
use async_trait::async_trait;

use crate::types::{SwapStep, TxHash};

/// Read/write access to the chain, scoped to exactly the calls the decision
/// engine makes. One tick is ever in flight, so implementations need no
/// internal ordering guarantees beyond per-call atomicity.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// ERC-20 `balanceOf(owner)`.
    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256>;

    /// Uniswap V3 quote: `quoteExactInputSingle(tokenIn, tokenOut, fee,
    /// amountIn, 0)` against the quoter contract.
    async fn quote_exact_input_single(
        &self,
        token_in: Address,
        token_out: Address,
        fee: u32,
        amount_in: U256,
    ) -> Result<U256>;

    /// Curve quote: `get_dy(i, j, dx)` against a fixed pool.
    async fn get_dy(&self, pool: Address, i: i128, j: i128, dx: U256) -> Result<U256>;

    /// Submit one atomic multi-step settlement call
    /// `executeArbitrage(amountIn, minAmountOut, steps)`.
    async fn submit_swap(
        &self,
        amount_in: U256,
        min_amount_out: U256,
        steps: &[SwapStep],
    ) -> Result<TxHash>;

    /// Await confirmation of a previously submitted transaction.
    async fn await_confirmation(&self, tx: &TxHash) -> Result<()>;

    /// Vault `asset()`.
    async fn vault_asset(&self, vault: Address) -> Result<Address>;

    /// Vault `totalAssets()`.
    async fn vault_total_assets(&self, vault: Address) -> Result<U256>;

    /// Vault `executeRaid(amount, payload)`.
    async fn execute_raid(&self, vault: Address, amount: U256, payload: Vec<u8>) -> Result<TxHash>;

    /// Vault `accumulatedFees()`.
    async fn accumulated_fees(&self, vault: Address) -> Result<U256>;

    /// Vault `distributeFees()`.
    async fn distribute_fees(&self, vault: Address) -> Result<TxHash>;

    /// The wallet address whose balances fund the single-wallet flow.
    fn owner(&self) -> Address;
}
