//! Shared types for the MONARCH agent.
//!
//! These types form the data model used across all modules.
//! They are designed to be stable so that graph, oracle, strategy,
//! and engine modules can depend on them without circular references.
//!
//! Amounts are `U256` integers in the smallest unit of their token;
//! scores are `I256` on a common 18-decimal fixed-point basis.

use alloy_primitives::{Address, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Protocol & graph primitives
// ---------------------------------------------------------------------------

/// Liquidity venue protocol. Closed set — adding a venue means adding a
/// variant here plus a `SwapEncoder` implementation, nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    UniswapV3,
    Curve,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::UniswapV3 => write!(f, "UNISWAP_V3"),
            Protocol::Curve => write!(f, "CURVE"),
        }
    }
}

/// A directed, protocol-tagged candidate swap between two tokens.
///
/// `fee` is a protocol-specific tier identifier (Uniswap V3 fee in
/// hundredths of a bip); protocols without tiers ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub from: Address,
    pub to: Address,
    pub protocol: Protocol,
    pub fee: u32,
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} via {} (fee {})", self.from, self.to, self.protocol, self.fee)
    }
}

/// An ordered sequence of edges forming a multi-hop swap plan.
/// Invariant: `route[i].to == route[i + 1].from`.
pub type Route = Vec<Edge>;

/// Validate route continuity and that it starts at `held`.
pub fn validate_route(route: &[Edge], held: Address) -> Result<(), MonarchError> {
    let first = route.first().ok_or(MonarchError::EmptyRoute)?;
    if first.from != held {
        return Err(MonarchError::RouteMismatch { expected: held, found: first.from });
    }
    for pair in route.windows(2) {
        if pair[0].to != pair[1].from {
            return Err(MonarchError::RouteMismatch { expected: pair[0].to, found: pair[1].from });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Token registry
// ---------------------------------------------------------------------------

/// Static metadata for a roster token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenInfo {
    pub symbol: String,
    pub decimals: u8,
    /// Risk tier, 1 = safest. Tokens outside the roster default to the
    /// riskiest tier.
    pub tier: u8,
}

/// Lookup table from token address to static metadata, injected from
/// configuration so tests can substitute synthetic rosters.
#[derive(Debug, Clone, Default)]
pub struct TokenRegistry {
    tokens: HashMap<Address, TokenInfo>,
}

/// Default decimal precision for tokens missing from the roster.
pub const DEFAULT_DECIMALS: u8 = 18;

/// Default (riskiest) tier for tokens missing from the roster.
pub const DEFAULT_TIER: u8 = 3;

impl TokenRegistry {
    pub fn new(tokens: HashMap<Address, TokenInfo>) -> Self {
        Self { tokens }
    }

    pub fn insert(&mut self, address: Address, info: TokenInfo) {
        self.tokens.insert(address, info);
    }

    /// All roster addresses (iteration order is unspecified).
    pub fn addresses(&self) -> impl Iterator<Item = &Address> {
        self.tokens.keys()
    }

    pub fn decimals_of(&self, token: Address) -> u8 {
        self.tokens.get(&token).map(|t| t.decimals).unwrap_or(DEFAULT_DECIMALS)
    }

    pub fn tier_of(&self, token: Address) -> u8 {
        self.tokens.get(&token).map(|t| t.tier).unwrap_or(DEFAULT_TIER)
    }

    /// Symbol for display; falls back to a shortened address.
    pub fn symbol_of(&self, token: Address) -> String {
        match self.tokens.get(&token) {
            Some(t) => t.symbol.clone(),
            None => {
                let hex = format!("{token}");
                hex.chars().take(8).collect()
            }
        }
    }

    /// Resolve a configured symbol back to its address.
    pub fn resolve(&self, symbol: &str) -> Option<Address> {
        self.tokens
            .iter()
            .find(|(_, info)| info.symbol.eq_ignore_ascii_case(symbol))
            .map(|(addr, _)| *addr)
    }
}

// ---------------------------------------------------------------------------
// Run-mode enums
// ---------------------------------------------------------------------------

/// How chosen routes are committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// No external calls; state updates as if the swap filled at the quote.
    Simulated,
    /// Payloads are constructed and logged but never submitted. State still
    /// updates optimistically at the quoted output.
    DryRun,
    /// Payloads are submitted as one atomic multi-step settlement call.
    Live,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::Simulated => write!(f, "SIMULATED"),
            ExecutionMode::DryRun => write!(f, "DRY_RUN"),
            ExecutionMode::Live => write!(f, "LIVE"),
        }
    }
}

/// Where quotes come from. Independent of `ExecutionMode` so the rest of
/// the system is identical between live and replayed runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    Live,
    Simulated,
}

/// Which path enumeration the decision loop consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStrategy {
    /// Greedy single-hop scan over direct neighbors.
    DirectOnly,
    /// General breadth-first enumeration up to `max_hops`.
    MultiHop,
}

// ---------------------------------------------------------------------------
// Execution payloads
// ---------------------------------------------------------------------------

/// One step of an atomic multi-step settlement call. `data` is the
/// protocol-specific encoded instruction; `token_in`/`token_out` are carried
/// for downstream bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapStep {
    pub target: Address,
    pub data: Vec<u8>,
    pub token_in: Address,
    pub token_out: Address,
}

/// Opaque transaction identifier returned by the settlement layer.
pub type TxHash = String;

// ---------------------------------------------------------------------------
// Position state
// ---------------------------------------------------------------------------

/// Position lifecycle status. Both states run the same evaluation body;
/// the distinction only affects the forced-exit timer and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositionStatus {
    Search,
    Hold,
}

impl fmt::Display for PositionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionStatus::Search => write!(f, "SEARCH"),
            PositionStatus::Hold => write!(f, "HOLD"),
        }
    }
}

/// Persistent position record, saved to a JSON file after each mutation.
///
/// `initial_capital`/`initial_token` are set exactly once, at capital
/// discovery, and never mutated afterwards — all profit accounting is
/// relative to this snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionState {
    pub held_token: Address,
    pub held_amount: U256,
    pub entry_timestamp: DateTime<Utc>,
    pub status: PositionStatus,
    pub initial_capital: U256,
    pub initial_token: Option<Address>,
}

impl fmt::Display for PositionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | held={} amount={} since={}",
            self.status,
            self.held_token,
            self.held_amount,
            self.entry_timestamp.format("%Y-%m-%d %H:%M:%S"),
        )
    }
}

impl PositionState {
    /// Fresh state holding `default_token` with no capital recorded yet.
    pub fn new(default_token: Address) -> Self {
        Self {
            held_token: default_token,
            held_amount: U256::ZERO,
            entry_timestamp: Utc::now(),
            status: PositionStatus::Search,
            initial_capital: U256::ZERO,
            initial_token: None,
        }
    }

    /// Whether capital discovery has already run.
    pub fn is_initialized(&self) -> bool {
        self.initial_token.is_some() && !self.initial_capital.is_zero()
    }

    /// Record the initial capital snapshot. Errors if already set — the
    /// snapshot is write-once.
    pub fn initialize_capital(&mut self, amount: U256, token: Address) -> Result<(), MonarchError> {
        if self.is_initialized() {
            return Err(MonarchError::CapitalAlreadyInitialized);
        }
        self.initial_capital = amount;
        self.initial_token = Some(token);
        self.held_token = token;
        self.held_amount = amount;
        Ok(())
    }

    /// Record a successful swap into `token` at the quoted output.
    pub fn update_hold(&mut self, token: Address, amount: U256) {
        self.held_token = token;
        self.held_amount = amount;
        self.entry_timestamp = Utc::now();
        self.status = PositionStatus::Hold;
    }

    /// Drop back to SEARCH without changing the held balance.
    pub fn reset_to_search(&mut self, token: Address) {
        self.held_token = token;
        self.status = PositionStatus::Search;
    }

    /// Elapsed time since the current position was entered.
    pub fn held_for(&self) -> chrono::Duration {
        Utc::now() - self.entry_timestamp
    }
}

// ---------------------------------------------------------------------------
// Tick report
// ---------------------------------------------------------------------------

/// Summary of a single evaluate-or-hold tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickReport {
    pub timestamp: DateTime<Utc>,
    pub status: PositionStatus,
    pub held_token: Address,
    pub edges_scanned: usize,
    /// Best score seen, formatted at the 18-decimal basis. None when every
    /// candidate quoted zero.
    pub best_score: Option<String>,
    pub executed: bool,
    pub forced_exit: bool,
    /// Estimated cumulative profit in initial-token units, when accounting
    /// succeeded this tick.
    pub profit: Option<String>,
    pub profit_percent: Option<f64>,
}

impl fmt::Display for TickReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "status={} scanned={} best={} executed={}{}",
            self.status,
            self.edges_scanned,
            self.best_score.as_deref().unwrap_or("-"),
            self.executed,
            if self.forced_exit { " (forced exit)" } else { "" },
        )?;
        if let Some(p) = &self.profit {
            write!(f, " profit={p}")?;
            if let Some(pct) = self.profit_percent {
                write!(f, " ({pct:.3}%)")?;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for MONARCH.
#[derive(Debug, thiserror::Error)]
pub enum MonarchError {
    #[error("token {0} has {1} decimals; only <= 18 supported")]
    UnsupportedDecimals(Address, u8),

    #[error("route is empty")]
    EmptyRoute,

    #[error("route discontinuity: expected {expected}, found {found}")]
    RouteMismatch { expected: Address, found: Address },

    #[error("no coin index mapped for token {0}")]
    UnmappedCurveToken(Address),

    #[error("chain client required for {0}")]
    ChainRequired(&'static str),

    #[error("initial capital already recorded")]
    CapitalAlreadyInitialized,

    #[error("execution failed: {0}")]
    Execution(String),
}

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------


#[cfg(test)]
mod tests {
    use super::test_fixtures::*;
    use super::*;

    #[test]
    fn test_protocol_display() {
        assert_eq!(format!("{}", Protocol::UniswapV3), "UNISWAP_V3");
        assert_eq!(format!("{}", Protocol::Curve), "CURVE");
    }

    #[test]
    fn test_protocol_serde_roundtrip() {
        for proto in [Protocol::UniswapV3, Protocol::Curve] {
            let json = serde_json::to_string(&proto).unwrap();
            let parsed: Protocol = serde_json::from_str(&json).unwrap();
            assert_eq!(proto, parsed);
        }
    }

    #[test]
    fn test_validate_route_ok() {
        let route = vec![
            edge(addr(1), addr(2), Protocol::UniswapV3, 500),
            edge(addr(2), addr(1), Protocol::Curve, 0),
        ];
        assert!(validate_route(&route, addr(1)).is_ok());
    }

    #[test]
    fn test_validate_route_empty() {
        assert!(matches!(validate_route(&[], addr(1)), Err(MonarchError::EmptyRoute)));
    }

    #[test]
    fn test_validate_route_wrong_start() {
        let route = vec![edge(addr(2), addr(3), Protocol::UniswapV3, 500)];
        assert!(matches!(
            validate_route(&route, addr(1)),
            Err(MonarchError::RouteMismatch { .. })
        ));
    }

    #[test]
    fn test_validate_route_discontinuity() {
        let route = vec![
            edge(addr(1), addr(2), Protocol::UniswapV3, 500),
            edge(addr(3), addr(1), Protocol::Curve, 0),
        ];
        assert!(validate_route(&route, addr(1)).is_err());
    }

    #[test]
    fn test_registry_known_token() {
        let reg = registry();
        assert_eq!(reg.decimals_of(addr(1)), 6);
        assert_eq!(reg.tier_of(addr(1)), 1);
        assert_eq!(reg.symbol_of(addr(1)), "AAA");
    }

    #[test]
    fn test_registry_unknown_token_defaults() {
        let reg = registry();
        assert_eq!(reg.decimals_of(addr(99)), DEFAULT_DECIMALS);
        assert_eq!(reg.tier_of(addr(99)), DEFAULT_TIER);
    }

    #[test]
    fn test_registry_resolve_symbol() {
        let reg = registry();
        assert_eq!(reg.resolve("AAA"), Some(addr(1)));
        assert_eq!(reg.resolve("bbb"), Some(addr(2)));
        assert_eq!(reg.resolve("ZZZ"), None);
    }

    #[test]
    fn test_position_state_new() {
        let state = PositionState::new(addr(1));
        assert_eq!(state.held_token, addr(1));
        assert_eq!(state.status, PositionStatus::Search);
        assert!(!state.is_initialized());
    }

    #[test]
    fn test_initialize_capital_once() {
        let mut state = PositionState::new(addr(1));
        state.initialize_capital(U256::from(1_000_000u64), addr(1)).unwrap();
        assert!(state.is_initialized());
        assert_eq!(state.held_amount, U256::from(1_000_000u64));

        // Second initialization must be rejected.
        let err = state.initialize_capital(U256::from(5u64), addr(2));
        assert!(matches!(err, Err(MonarchError::CapitalAlreadyInitialized)));
        assert_eq!(state.initial_capital, U256::from(1_000_000u64));
        assert_eq!(state.initial_token, Some(addr(1)));
    }

    #[test]
    fn test_update_hold() {
        let mut state = PositionState::new(addr(1));
        state.update_hold(addr(2), U256::from(42u64));
        assert_eq!(state.status, PositionStatus::Hold);
        assert_eq!(state.held_token, addr(2));
        assert_eq!(state.held_amount, U256::from(42u64));
    }

    #[test]
    fn test_reset_to_search() {
        let mut state = PositionState::new(addr(1));
        state.update_hold(addr(2), U256::from(42u64));
        state.reset_to_search(addr(2));
        assert_eq!(state.status, PositionStatus::Search);
        assert_eq!(state.held_amount, U256::from(42u64));
    }

    #[test]
    fn test_position_state_serde_roundtrip() {
        let mut state = PositionState::new(addr(1));
        state.initialize_capital(U256::from(1_000_000u64), addr(1)).unwrap();
        state.update_hold(addr(2), U256::from(999u64));

        let json = serde_json::to_string(&state).unwrap();
        let parsed: PositionState = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.held_token, addr(2));
        assert_eq!(parsed.held_amount, U256::from(999u64));
        assert_eq!(parsed.status, PositionStatus::Hold);
        assert_eq!(parsed.initial_capital, U256::from(1_000_000u64));
    }

    #[test]
    fn test_tick_report_display() {
        let report = TickReport {
            timestamp: Utc::now(),
            status: PositionStatus::Hold,
            held_token: addr(1),
            edges_scanned: 7,
            best_score: Some("0.0013".into()),
            executed: true,
            forced_exit: false,
            profit: Some("1.25".into()),
            profit_percent: Some(0.125),
        };
        let display = format!("{report}");
        assert!(display.contains("scanned=7"));
        assert!(display.contains("0.0013"));
        assert!(display.contains("profit=1.25"));
    }

    #[test]
    fn test_error_display() {
        let e = MonarchError::UnsupportedDecimals(addr(1), 24);
        assert!(format!("{e}").contains("24"));
        let e = MonarchError::ChainRequired("live execution");
        assert!(format!("{e}").contains("live execution"));
    }
}
