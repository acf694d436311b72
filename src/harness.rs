//! Head-to-head benchmark of a candidate strategy against a reference.
//!
//! Both strategies see the same observation stream in lockstep, each through
//! its own [`EvaluationSession`]. The harness adds nothing but the report
//! interval.
//!
//! ```ignore
//! let candidate = EvaluationSession::new(EwmaVarianceStrategy::with_horizon(10.0)?)?;
//! let reference = EvaluationSession::new(LastValueStrategy::new(10.0, 1.0)?)?;
//! let mut harness = BenchmarkHarness::new(candidate, reference, 1000);
//!
//! let report = harness.run(observations, |r| println!("{}", r.as_row()))?;
//! ```

use serde::Serialize;
use tracing::info;

use crate::errors::Result;
use crate::evaluation::{EvaluationSession, TickSnapshot};
use crate::infra::logging::targets;
use crate::strategy::ForecastStrategy;
use crate::types::Observation;

/// Both sessions' snapshots after one tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HarnessTick {
    pub candidate: TickSnapshot,
    pub reference: TickSnapshot,
}

/// Comparative scores at a point in the stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub ticks: usize,
    pub candidate: &'static str,
    pub candidate_lifetime: f64,
    pub candidate_recent: f64,
    pub candidate_scores: usize,
    pub reference: &'static str,
    pub reference_lifetime: f64,
    pub reference_recent: f64,
    pub reference_scores: usize,
}

impl ComparisonReport {
    /// True when the candidate's lifetime score beats the reference's.
    pub fn candidate_leads(&self) -> bool {
        self.candidate_lifetime > self.reference_lifetime
    }

    /// Format as a table row.
    pub fn as_row(&self) -> String {
        format!(
            "{:>8} ticks | {:>14} {:>9.4} / {:>9.4} | {:>14} {:>9.4} / {:>9.4}",
            self.ticks,
            self.candidate,
            self.candidate_lifetime,
            self.candidate_recent,
            self.reference,
            self.reference_lifetime,
            self.reference_recent,
        )
    }
}

/// Runs a candidate and a reference session over one stream.
#[derive(Debug)]
pub struct BenchmarkHarness<C, R> {
    candidate: EvaluationSession<C>,
    reference: EvaluationSession<R>,
    report_every: usize,
}

impl<C: ForecastStrategy, R: ForecastStrategy> BenchmarkHarness<C, R> {
    /// `report_every` is clamped to at least 1.
    pub fn new(
        candidate: EvaluationSession<C>,
        reference: EvaluationSession<R>,
        report_every: usize,
    ) -> Self {
        Self {
            candidate,
            reference,
            report_every: report_every.max(1),
        }
    }

    /// Feed one observation to both sessions.
    ///
    /// # Errors
    /// The first session error. The candidate is always ticked before the
    /// reference; if the candidate fails the reference is not ticked.
    pub fn tick(&mut self, observation: &Observation) -> Result<HarnessTick> {
        self.candidate.tick_and_predict(observation)?;
        self.reference.tick_and_predict(observation)?;
        Ok(HarnessTick {
            candidate: self.candidate.snapshot(),
            reference: self.reference.snapshot(),
        })
    }

    /// True on ticks that fall on the report interval.
    pub fn should_report(&self) -> bool {
        let ticks = self.candidate.ticks();
        ticks > 0 && ticks % self.report_every == 0
    }

    /// Current comparative scores.
    pub fn report(&self) -> ComparisonReport {
        let candidate = self.candidate.snapshot();
        let reference = self.reference.snapshot();
        ComparisonReport {
            ticks: self.candidate.ticks(),
            candidate: candidate.strategy,
            candidate_lifetime: candidate.lifetime_score,
            candidate_recent: candidate.recent_score,
            candidate_scores: candidate.n_scores,
            reference: reference.strategy,
            reference_lifetime: reference.lifetime_score,
            reference_recent: reference.recent_score,
            reference_scores: reference.n_scores,
        }
    }

    /// Drive the harness over `source` until it is exhausted.
    ///
    /// `on_report` is called every `report_every` ticks. Returns the final
    /// report.
    pub fn run<I, F>(&mut self, source: I, mut on_report: F) -> Result<ComparisonReport>
    where
        I: IntoIterator<Item = Observation>,
        F: FnMut(&ComparisonReport),
    {
        for observation in source {
            self.tick(&observation)?;
            if self.should_report() {
                let report = self.report();
                log_report(&report);
                on_report(&report);
            }
        }
        Ok(self.report())
    }

    pub fn candidate(&self) -> &EvaluationSession<C> {
        &self.candidate
    }

    pub fn reference(&self) -> &EvaluationSession<R> {
        &self.reference
    }

    pub fn report_every(&self) -> usize {
        self.report_every
    }

    /// Consume the harness, returning both sessions.
    pub fn into_sessions(self) -> (EvaluationSession<C>, EvaluationSession<R>) {
        (self.candidate, self.reference)
    }
}

/// Emit a report at `info` on the harness target.
pub fn log_report(report: &ComparisonReport) {
    info!(
        target: targets::HARNESS,
        ticks = report.ticks,
        candidate = report.candidate,
        candidate_lifetime = report.candidate_lifetime,
        candidate_recent = report.candidate_recent,
        reference = report.reference,
        reference_lifetime = report.reference_lifetime,
        reference_recent = report.reference_recent,
        "Benchmark progress"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::ConstantStrategy;

    fn zeros(n: usize) -> impl Iterator<Item = Observation> {
        (0..n).map(|t| Observation::new(t as f64, 0.0))
    }

    #[test]
    fn test_tight_centered_candidate_beats_wide_reference() {
        let candidate = EvaluationSession::new(ConstantStrategy::new(1.0, 0.0, 1.0)).unwrap();
        let reference = EvaluationSession::new(ConstantStrategy::new(1.0, 0.0, 100.0)).unwrap();
        let mut harness = BenchmarkHarness::new(candidate, reference, 10);

        let report = harness.run(zeros(50), |_| {}).unwrap();

        assert!(report.candidate_leads());
        assert!(harness.candidate().lifetime_score() > harness.reference().lifetime_score());
        assert_eq!(report.candidate_scores, 49);
        assert_eq!(report.reference_scores, 49);
    }

    #[test]
    fn test_periodic_reports() {
        let candidate = EvaluationSession::new(ConstantStrategy::new(1.0, 0.0, 1.0)).unwrap();
        let reference = EvaluationSession::new(ConstantStrategy::new(1.0, 0.0, 2.0)).unwrap();
        let mut harness = BenchmarkHarness::new(candidate, reference, 25);

        let mut seen = Vec::new();
        let last = harness.run(zeros(110), |r| seen.push(r.ticks)).unwrap();

        assert_eq!(seen, vec![25, 50, 75, 100]);
        assert_eq!(last.ticks, 110);
    }

    #[test]
    fn test_sessions_run_in_lockstep() {
        let candidate = EvaluationSession::new(ConstantStrategy::new(2.0, 0.0, 1.0)).unwrap();
        let reference = EvaluationSession::new(ConstantStrategy::new(1.0, 0.0, 1.0)).unwrap();
        let mut harness = BenchmarkHarness::new(candidate, reference, 0);
        assert_eq!(harness.report_every(), 1);

        let tick = harness.tick(&Observation::new(0.0, 0.0)).unwrap();
        assert_eq!(tick.candidate.time, Some(0.0));
        assert_eq!(tick.reference.time, Some(0.0));

        harness.tick(&Observation::new(1.0, 0.0)).unwrap();
        let (candidate, reference) = harness.into_sessions();
        assert_eq!(candidate.ticks(), reference.ticks());
        // Different horizons: only the shorter one has matured
        assert_eq!(candidate.score_count(), 0);
        assert_eq!(reference.score_count(), 1);
    }

    #[test]
    fn test_error_stops_run() {
        let candidate = EvaluationSession::new(ConstantStrategy::new(1.0, 0.0, -1.0)).unwrap();
        let reference = EvaluationSession::new(ConstantStrategy::new(1.0, 0.0, 1.0)).unwrap();
        let mut harness = BenchmarkHarness::new(candidate, reference, 10);

        assert!(harness.run(zeros(5), |_| {}).is_err());
        assert_eq!(harness.candidate().ticks(), 2);
    }

    #[test]
    fn test_report_row() {
        let candidate = EvaluationSession::new(ConstantStrategy::new(1.0, 0.0, 1.0)).unwrap();
        let reference = EvaluationSession::new(ConstantStrategy::new(1.0, 0.0, 1.0)).unwrap();
        let harness = BenchmarkHarness::new(candidate, reference, 10);
        let row = harness.report().as_row();
        assert!(row.contains("Constant"));
    }
}
