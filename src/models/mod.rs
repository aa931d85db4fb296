//! Shared data models spanning the engine layers.

pub mod signal;
pub mod snapshot;
pub mod symbol;

pub use signal::{SignalKind, SignalRecord, Verdict};
pub use snapshot::{
    AdxValues, BollingerBands, IndicatorSnapshot, MacdValues, ResolvedIndicators, StochRsiValues,
    INDICATOR_GROUPS,
};
pub use symbol::Symbol;
