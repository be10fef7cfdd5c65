//! Configuration loading and validation.
//!
//! All tunables live in a single TOML file. Token roster and edge list are
//! declared by symbol and resolved into the address-keyed registry and
//! route graph at load time, so a typo fails fast at startup instead of
//! producing an empty scan.

use alloy_primitives::Address;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;

use crate::graph::RouteGraph;
use crate::oracle::curve::CurvePoolConfig;
use crate::types::{ExecutionMode, PriceSource, Protocol, ScanStrategy, TokenInfo, TokenRegistry};

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub bot: BotConfig,
    pub thresholds: ThresholdConfig,
    #[serde(default)]
    pub risk: RiskConfig,
    pub network: NetworkConfig,
    pub tokens: Vec<TokenConfig>,
    pub edges: Vec<EdgeConfig>,
    #[serde(default)]
    pub guilds: GuildConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    pub mode: ExecutionMode,
    pub price_source: PriceSource,
    pub scan_strategy: ScanStrategy,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Fallback starting capital, in whole units of `default_token`, used
    /// when no roster balance is found at capital discovery.
    pub default_capital: f64,
    pub default_token: String,
    /// Token forced exits unwind into. Symbol, resolved at load.
    pub safe_haven: String,
    #[serde(default = "default_max_hops")]
    pub max_hops: usize,
    #[serde(default = "default_state_file")]
    pub state_file: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThresholdConfig {
    /// Absolute profit floor in whole units on the 18-decimal basis.
    /// Takes precedence over the percent floor when set.
    pub min_profit_amount: Option<f64>,
    pub min_profit_percent: f64,
    pub force_exit_hours: i64,
    #[serde(default = "default_slippage_bps")]
    pub slippage_bps: u64,
    /// Persist the optimistic fill before awaiting confirmation. Crashing
    /// between submit and confirm then over-reports rather than losing a
    /// submitted position.
    #[serde(default)]
    pub commit_before_confirm: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RiskConfig {
    /// Apply the tier-downgrade haircut to scores.
    #[serde(default)]
    pub tiered: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    /// Environment variable names, not the secrets themselves.
    #[serde(default = "default_rpc_url_env")]
    pub rpc_url_env: String,
    #[serde(default = "default_private_key_env")]
    pub private_key_env: String,
    /// Settlement contract executing atomic multi-step swaps.
    pub settlement: Address,
    /// Uniswap V3 swap router, target of Uniswap hop payloads.
    pub uniswap_router: Address,
    pub curve: Option<CurvePoolConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    pub symbol: String,
    pub address: Address,
    pub decimals: u8,
    pub tier: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EdgeConfig {
    pub from: String,
    pub to: String,
    pub protocol: Protocol,
    #[serde(default)]
    pub fee: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GuildConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Vault addresses to run. Extended by ledger discovery when enabled.
    #[serde(default)]
    pub sources: Vec<Address>,
    #[serde(default = "default_fee_cooldown")]
    pub fee_cooldown_secs: u64,
    #[serde(default = "default_portal_color")]
    pub portal_color: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LedgerConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub base_url: String,
}

fn default_poll_interval() -> u64 {
    60
}

fn default_max_hops() -> usize {
    2
}

fn default_state_file() -> String {
    "monarch_state.json".to_string()
}

fn default_slippage_bps() -> u64 {
    50
}

fn default_rpc_url_env() -> String {
    "RPC_URL".to_string()
}

fn default_private_key_env() -> String {
    "PRIVATE_KEY".to_string()
}

fn default_fee_cooldown() -> u64 {
    86_400
}

fn default_portal_color() -> String {
    "#6d28d9".to_string()
}

impl AppConfig {
    pub fn load(path: &str) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: AppConfig =
            toml::from_str(&raw).with_context(|| format!("Failed to parse config file: {path}"))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.tokens.is_empty() {
            anyhow::bail!("Token roster is empty");
        }
        let registry = self.registry();
        for symbol in [&self.bot.default_token, &self.bot.safe_haven] {
            if registry.resolve(symbol).is_none() {
                anyhow::bail!("Unknown token symbol in [bot]: {symbol}");
            }
        }
        for edge in &self.edges {
            for symbol in [&edge.from, &edge.to] {
                if registry.resolve(symbol).is_none() {
                    anyhow::bail!("Unknown token symbol in edge list: {symbol}");
                }
            }
        }
        if self.thresholds.min_profit_percent < 0.0 {
            anyhow::bail!("min_profit_percent must be non-negative");
        }
        if self.guilds.enabled && self.guilds.sources.is_empty() && !self.ledger.enabled {
            anyhow::bail!("Guilds enabled with no sources and no ledger discovery");
        }
        if self.ledger.enabled && self.ledger.base_url.is_empty() {
            anyhow::bail!("Ledger enabled without base_url");
        }
        Ok(())
    }

    pub fn registry(&self) -> TokenRegistry {
        let tokens: HashMap<Address, TokenInfo> = self
            .tokens
            .iter()
            .map(|t| {
                (
                    t.address,
                    TokenInfo { symbol: t.symbol.clone(), decimals: t.decimals, tier: t.tier },
                )
            })
            .collect();
        TokenRegistry::new(tokens)
    }

    /// Build the route graph from the declared edge list. Validation has
    /// already checked every symbol resolves.
    pub fn graph(&self, registry: &TokenRegistry) -> Result<RouteGraph> {
        let mut graph = RouteGraph::new();
        for edge in &self.edges {
            let from = registry
                .resolve(&edge.from)
                .with_context(|| format!("Unknown edge token: {}", edge.from))?;
            let to = registry
                .resolve(&edge.to)
                .with_context(|| format!("Unknown edge token: {}", edge.to))?;
            graph.add_edge(from, to, edge.protocol, edge.fee);
        }
        Ok(graph)
    }

    pub fn default_token_address(&self, registry: &TokenRegistry) -> Result<Address> {
        registry
            .resolve(&self.bot.default_token)
            .with_context(|| format!("Unknown default token: {}", self.bot.default_token))
    }

    pub fn safe_haven_address(&self, registry: &TokenRegistry) -> Result<Address> {
        registry
            .resolve(&self.bot.safe_haven)
            .with_context(|| format!("Unknown safe haven token: {}", self.bot.safe_haven))
    }
}
