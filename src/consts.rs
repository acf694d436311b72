/// Floor added to every density before taking its log, so a zero-density
/// miss costs ln(1e-10) instead of -inf.
pub static LOG_SCORE_EPSILON: f64 = 1e-10;

/// Default capacity of the rolling score window.
pub const DEFAULT_ROLLING_CAPACITY: usize = 100;

/// Smallest scale a strategy may emit.
pub static MIN_SCALE: f64 = 1e-6;
