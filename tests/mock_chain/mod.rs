//! Scripted in-memory chain client for integration tests.
//!
//! Quotes come from a fixed parts-per-million rate table; submitted swaps,
//! raids, and fee distributions are recorded for assertions.

use alloy_primitives::{Address, U256};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use monarch::chain::ChainClient;
use monarch::types::{SwapStep, TxHash};

pub struct SubmittedSwap {
    pub amount_in: U256,
    pub min_amount_out: U256,
    pub steps: Vec<SwapStep>,
}

pub struct SubmittedRaid {
    pub vault: Address,
    pub amount: U256,
    pub payload: Vec<u8>,
}

#[derive(Default)]
pub struct MockChain {
    owner: Address,
    balances: HashMap<(Address, Address), U256>,
    rates_ppm: HashMap<(Address, Address), u64>,
    vault_asset: Option<Address>,
    vault_total: U256,
    fees: U256,
    pub swaps: Mutex<Vec<SubmittedSwap>>,
    pub raids: Mutex<Vec<SubmittedRaid>>,
    pub distributions: Mutex<u32>,
}

impl MockChain {
    pub fn new(owner: Address) -> Self {
        Self { owner, ..Default::default() }
    }

    pub fn with_balance(mut self, token: Address, amount: U256) -> Self {
        self.balances.insert((token, self.owner), amount);
        self
    }

    /// Quote `from -> to` at `ppm` parts-per-million of the input. Applies
    /// to both Uniswap and Curve calls; unlisted pairs quote zero.
    pub fn with_rate(mut self, from: Address, to: Address, ppm: u64) -> Self {
        self.rates_ppm.insert((from, to), ppm);
        self
    }

    pub fn with_vault(mut self, asset: Address, total: U256, fees: U256) -> Self {
        self.vault_asset = Some(asset);
        self.vault_total = total;
        self.fees = fees;
        self
    }

    fn rate(&self, from: Address, to: Address, amount_in: U256) -> U256 {
        match self.rates_ppm.get(&(from, to)) {
            Some(ppm) => amount_in * U256::from(*ppm) / U256::from(1_000_000u64),
            None => U256::ZERO,
        }
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256> {
        Ok(self.balances.get(&(token, owner)).copied().unwrap_or(U256::ZERO))
    }

    async fn quote_exact_input_single(
        &self,
        token_in: Address,
        token_out: Address,
        _fee: u32,
        amount_in: U256,
    ) -> Result<U256> {
        Ok(self.rate(token_in, token_out, amount_in))
    }

    async fn get_dy(&self, _pool: Address, _i: i128, _j: i128, _dx: U256) -> Result<U256> {
        Ok(U256::ZERO)
    }

    async fn submit_swap(
        &self,
        amount_in: U256,
        min_amount_out: U256,
        steps: &[SwapStep],
    ) -> Result<TxHash> {
        self.swaps.lock().unwrap().push(SubmittedSwap {
            amount_in,
            min_amount_out,
            steps: steps.to_vec(),
        });
        Ok("0xmockswap".to_string())
    }

    async fn await_confirmation(&self, _tx: &TxHash) -> Result<()> {
        Ok(())
    }

    async fn vault_asset(&self, _vault: Address) -> Result<Address> {
        self.vault_asset.ok_or_else(|| anyhow::anyhow!("no vault scripted"))
    }

    async fn vault_total_assets(&self, _vault: Address) -> Result<U256> {
        Ok(self.vault_total)
    }

    async fn execute_raid(&self, vault: Address, amount: U256, payload: Vec<u8>) -> Result<TxHash> {
        self.raids.lock().unwrap().push(SubmittedRaid { vault, amount, payload });
        Ok("0xmockraid".to_string())
    }

    async fn accumulated_fees(&self, _vault: Address) -> Result<U256> {
        Ok(self.fees)
    }

    async fn distribute_fees(&self, _vault: Address) -> Result<TxHash> {
        *self.distributions.lock().unwrap() += 1;
        Ok("0xmockfees".to_string())
    }

    fn owner(&self) -> Address {
        self.owner
    }
}
