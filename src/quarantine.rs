//! Horizon quarantine: holds values until they become verifiable.
//!
//! A value enqueued at observation time `t` is released once the caller's
//! clock reaches `t + horizon`. Release is *collapsing*: when several entries
//! have matured, only the freshest is returned and every older matured entry
//! is discarded, since it can never again be the most recent matured value.
//! Under a monotone clock this keeps occupancy bounded by the number of
//! entries enqueued within one horizon.
//!
//! ```ignore
//! let mut q = Quarantine::new(10.0)?;
//! q.enqueue(0.0, "a");
//! q.enqueue(5.0, "b");
//! assert!(q.release_up_to(9.0).is_none());
//! assert_eq!(q.release_up_to(15.0).map(|e| e.payload), Some("b")); // "a" is gone
//! ```
//!
//! Observation times must be non-decreasing. This is not checked.

use std::collections::VecDeque;

use tracing::trace;

use crate::errors::{Error, Result};
use crate::infra::logging::targets;

/// A pending value and the time at which it becomes releasable.
#[derive(Debug, Clone, PartialEq)]
pub struct QuarantineEntry<T> {
    pub release_time: f64,
    pub payload: T,
}

/// Time-ordered store of pending values keyed by release time.
#[derive(Debug, Clone)]
pub struct Quarantine<T> {
    horizon: f64,
    entries: VecDeque<QuarantineEntry<T>>,
}

impl<T> Quarantine<T> {
    /// Create an empty quarantine with a fixed horizon.
    ///
    /// # Errors
    /// `InvalidHorizon` if `horizon` is negative or not finite.
    pub fn new(horizon: f64) -> Result<Self> {
        if !horizon.is_finite() || horizon < 0.0 {
            return Err(Error::InvalidHorizon(horizon));
        }
        Ok(Self {
            horizon,
            entries: VecDeque::new(),
        })
    }

    /// Hold `payload` until `observation_time + horizon`.
    pub fn enqueue(&mut self, observation_time: f64, payload: T) {
        self.entries.push_back(QuarantineEntry {
            release_time: observation_time + self.horizon,
            payload,
        });
    }

    /// Release the freshest matured entry, if any.
    ///
    /// Takes the longest head run with `release_time <= current_time`, returns
    /// its last entry, and drops every entry released no later than that one.
    /// Entries that have not matured are left in place.
    pub fn release_up_to(&mut self, current_time: f64) -> Option<QuarantineEntry<T>> {
        let matured = self
            .entries
            .iter()
            .take_while(|e| e.release_time <= current_time)
            .count();
        if matured == 0 {
            return None;
        }

        let released = self.entries.remove(matured - 1)?;
        let before = self.entries.len();
        self.entries.retain(|e| e.release_time > released.release_time);

        trace!(
            target: targets::QUARANTINE,
            current_time,
            release_time = released.release_time,
            collapsed = before - self.entries.len(),
            pending = self.entries.len(),
            "Released matured entry"
        );

        Some(released)
    }

    /// Release time of the oldest pending entry.
    pub fn next_release_time(&self) -> Option<f64> {
        self.entries.front().map(|e| e.release_time)
    }

    /// Fixed horizon of this quarantine.
    #[inline]
    pub fn horizon(&self) -> f64 {
        self.horizon
    }

    /// Number of pending entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is pending.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all pending entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_horizon() {
        assert_eq!(
            Quarantine::<()>::new(-1.0).unwrap_err(),
            Error::InvalidHorizon(-1.0)
        );
        assert!(Quarantine::<()>::new(f64::INFINITY).is_err());
        assert!(Quarantine::<()>::new(f64::NAN).is_err());
        assert!(Quarantine::<()>::new(0.0).is_ok());
    }

    #[test]
    fn test_release_at_horizon_boundary() {
        let mut q = Quarantine::new(3.0).unwrap();
        q.enqueue(10.0, "p");

        assert!(q.release_up_to(12.999).is_none());
        assert_eq!(q.len(), 1);

        let entry = q.release_up_to(13.0).unwrap();
        assert_eq!(entry.payload, "p");
        assert_eq!(entry.release_time, 13.0);
        assert!(q.is_empty());
    }

    #[test]
    fn test_collapsing_release_returns_freshest() {
        let h = 2.0;
        let mut q = Quarantine::new(h).unwrap();
        q.enqueue(1.0, 1);
        q.enqueue(2.0, 2);
        q.enqueue(3.0, 3);

        let entry = q.release_up_to(3.0 + h).unwrap();
        assert_eq!(entry.payload, 3);
        assert!(q.is_empty());

        // Superseded entries never come back
        assert!(q.release_up_to(3.0 + h).is_none());
        assert!(q.release_up_to(100.0).is_none());
    }

    #[test]
    fn test_unmatured_entries_untouched() {
        let mut q = Quarantine::new(5.0).unwrap();
        for t in 0..10 {
            q.enqueue(t as f64, t);
        }

        // Matured: t = 0..=2 (release 5, 6, 7)
        let entry = q.release_up_to(7.5).unwrap();
        assert_eq!(entry.payload, 2);
        assert_eq!(q.len(), 7);
        assert_eq!(q.next_release_time(), Some(8.0));
    }

    #[test]
    fn test_equal_release_times() {
        let mut q = Quarantine::new(1.0).unwrap();
        q.enqueue(4.0, 'a');
        q.enqueue(4.0, 'b');

        let entry = q.release_up_to(5.0).unwrap();
        assert_eq!(entry.payload, 'b');
        assert!(q.is_empty());
    }

    #[test]
    fn test_zero_horizon_releases_immediately() {
        let mut q = Quarantine::new(0.0).unwrap();
        q.enqueue(7.0, "now");
        assert_eq!(q.release_up_to(7.0).unwrap().payload, "now");
    }

    #[test]
    fn test_occupancy_bounded_on_monotone_stream() {
        let mut q = Quarantine::new(10.0).unwrap();
        let mut max_len = 0;
        for t in 0..10_000 {
            q.enqueue(t as f64, t);
            q.release_up_to(t as f64);
            max_len = max_len.max(q.len());
        }
        assert!(max_len <= 11, "max_len = {max_len}");
    }

    #[test]
    fn test_clear() {
        let mut q = Quarantine::new(1.0).unwrap();
        q.enqueue(0.0, ());
        q.enqueue(1.0, ());
        q.clear();
        assert!(q.is_empty());
        assert!(q.release_up_to(10.0).is_none());
    }
}
