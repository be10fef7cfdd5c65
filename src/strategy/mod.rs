//! Decision math — scoring and profit thresholds.
//!
//! All comparisons happen on a common 18-decimal fixed-point basis so that
//! tokens of different precision score against each other directly. The
//! engine owns the loop; this module owns the arithmetic.

pub mod scoring;
pub mod thresholds;

pub use scoring::{denormalize, normalize, risk_penalty, score_swap};
pub use thresholds::profit_threshold;
