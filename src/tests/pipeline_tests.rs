//! End-to-end tests for the evaluation pipeline.
//!
//! These tests drive the public API across module boundaries:
//! - Density and mixture scoring identities
//! - Quarantine release and collapsing
//! - Delayed matching in a session
//! - Strategy feedback through running metrics
//! - Harness comparisons fed from config and JSON-lines input

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;
    use std::io::Cursor;

    use crate::{
        pdf_score, score_mixture, ArenaConfig, BenchmarkHarness, ConstantStrategy, Density,
        EvaluationSession, EwmaVarianceConfig, EwmaVarianceStrategy, ForecastStrategy,
        JsonLinesSource, LastValueStrategy, Observation, PredictiveDistribution, Quarantine,
        ScoringMetric, SessionConfig, SessionState, SyntheticWalk,
    };

    fn ramp(n: usize) -> Vec<Observation> {
        (0..n).map(|t| Observation::new(t as f64, t as f64)).collect()
    }

    // =========================================================================
    // Scoring
    // =========================================================================

    #[test]
    fn test_pdf_peak_integral_and_symmetry() {
        for &(loc, scale) in &[(0.0, 1.0), (3.0, 0.25), (-7.5, 4.0)] {
            let peak = pdf_score(loc, loc, scale).unwrap();
            assert_eq!(peak, 1.0 / (2.0 * PI * scale * scale).sqrt());

            let dx = scale / 1000.0;
            let integral: f64 = (-20_000..20_000)
                .map(|i| pdf_score(loc + (i as f64 + 0.5) * dx, loc, scale).unwrap() * dx)
                .sum();
            assert!((integral - 1.0).abs() < 1e-6, "integral = {integral}");

            for d in [0.1, 1.0, 2.5] {
                let left = pdf_score(loc - d * scale, loc, scale).unwrap();
                let right = pdf_score(loc + d * scale, loc, scale).unwrap();
                assert!((left - right).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_mixture_is_weighted_sum() {
        let metric = ScoringMetric::PdfScore;

        let single = PredictiveDistribution::mixture([(0.7, Density::normal(1.0, 2.0))]);
        let score = score_mixture(&single, 0.5, &metric).unwrap();
        assert!((score.weighted_score - 0.7 * pdf_score(0.5, 1.0, 2.0).unwrap()).abs() < 1e-12);

        let two = PredictiveDistribution::mixture([
            (0.3, Density::normal(0.0, 1.0)),
            (0.6, Density::normal(2.0, 0.5)),
        ]);
        let expected =
            0.3 * pdf_score(1.2, 0.0, 1.0).unwrap() + 0.6 * pdf_score(1.2, 2.0, 0.5).unwrap();
        let score = score_mixture(&two, 1.2, &metric).unwrap();
        assert!((score.weighted_score - expected).abs() < 1e-12);
        assert_eq!(score.dominant.unwrap().loc, 2.0);
    }

    // =========================================================================
    // Quarantine
    // =========================================================================

    #[test]
    fn test_release_at_horizon() {
        let mut q = Quarantine::new(2.0).unwrap();
        q.enqueue(5.0, "p");
        assert!(q.release_up_to(6.999).is_none());
        assert_eq!(q.release_up_to(7.0).unwrap().payload, "p");
    }

    #[test]
    fn test_collapsing_release() {
        let mut q = Quarantine::new(1.0).unwrap();
        q.enqueue(1.0, 1);
        q.enqueue(2.0, 2);
        q.enqueue(3.0, 3);

        assert_eq!(q.release_up_to(4.0).unwrap().payload, 3);
        assert!(q.is_empty());
        assert!(q.release_up_to(100.0).is_none());
    }

    // =========================================================================
    // Session
    // =========================================================================

    #[test]
    fn test_previous_value_strategy_scores_twice_in_four_ticks() {
        let strategy = LastValueStrategy::new(1.0, 1.0).unwrap();
        let mut session = EvaluationSession::new(strategy).unwrap();

        let matched: Vec<_> = ramp(4)
            .iter()
            .filter_map(|o| session.tick_and_predict(o).unwrap())
            .collect();

        assert_eq!(matched.len(), 2);
        assert_eq!(session.score_count(), 2);
        // Strategy lag plus quarantine lag: two units behind the ramp
        let two_off = pdf_score(2.0, 0.0, 1.0).unwrap();
        assert!(matched.iter().all(|s| (s - two_off).abs() < 1e-15));
    }

    #[test]
    fn test_empty_session_scores_zero() {
        let session = EvaluationSession::new(ConstantStrategy::new(1.0, 0.0, 1.0)).unwrap();
        assert_eq!(session.lifetime_score(), 0.0);
        assert_eq!(session.recent_score(), 0.0);
    }

    #[test]
    fn test_tiny_scale_forecast_scores_finite() {
        let mut session =
            EvaluationSession::new(ConstantStrategy::new(1.0, 0.0, 1e-200)).unwrap();
        for t in 0..5 {
            session.tick_and_predict(&Observation::new(t as f64, 0.0)).unwrap();
        }

        assert_eq!(session.score_count(), 4);
        assert!(session.lifetime_score().is_finite());
        assert!(session.lifetime_score() > 400.0);
    }

    #[test]
    fn test_rolling_window_capped() {
        let config = SessionConfig {
            rolling_capacity: 30,
            ..Default::default()
        };
        let mut session =
            EvaluationSession::with_config(ConstantStrategy::new(1.0, 0.0, 1.0), config).unwrap();

        for obs in ramp(80) {
            session.tick_and_predict(&obs).unwrap();
            assert!(session.recent_window_len() <= 30);
        }
        assert_eq!(session.recent_window_len(), 30);
        assert_eq!(session.score_count(), 79);
    }

    #[test]
    fn test_reset_feedback_reenters_warmup_once() {
        let strategy = EwmaVarianceStrategy::new(EwmaVarianceConfig {
            horizon: 1.0,
            warmup: 3,
            reset_threshold: Some(f64::INFINITY),
            ..Default::default()
        })
        .unwrap();
        let config = SessionConfig {
            warmup_cutoff: 3,
            ..Default::default()
        };
        let mut session = EvaluationSession::with_config(strategy, config).unwrap();
        let observations = ramp(15);

        for obs in &observations[..4] {
            session.tick_and_predict(obs).unwrap();
        }
        assert_eq!(session.score_count(), 1);
        assert_eq!(session.state(), SessionState::Active);

        // First tick that sees running metrics triggers the reset
        session.tick_and_predict(&observations[4]).unwrap();
        assert_eq!(session.strategy().tick_count(), 1);
        assert_eq!(session.state(), SessionState::WarmingUp);

        // Still below threshold, but disarmed
        for obs in &observations[5..] {
            session.tick_and_predict(obs).unwrap();
        }
        assert_eq!(session.strategy().tick_count(), 11);
        assert_eq!(session.state(), SessionState::Active);
    }

    // =========================================================================
    // Harness
    // =========================================================================

    #[test]
    fn test_tight_candidate_beats_wide_reference() {
        let candidate = EvaluationSession::new(ConstantStrategy::new(1.0, 0.0, 1.0)).unwrap();
        let reference = EvaluationSession::new(ConstantStrategy::new(1.0, 0.0, 100.0)).unwrap();
        let mut harness = BenchmarkHarness::new(candidate, reference, 100);

        let zeros = (0..200).map(|t| Observation::new(t as f64, 0.0));
        let report = harness.run(zeros, |_| {}).unwrap();

        assert!(report.candidate_lifetime > report.reference_lifetime);
        let expected_gap = (100.0f64).ln();
        assert!((report.candidate_lifetime - report.reference_lifetime - expected_gap).abs() < 1e-6);
    }

    #[test]
    fn test_json_lines_into_harness() {
        let input = (0..20)
            .map(|t| format!("{{\"time\": {t}, \"dove_location\": {}, \"falcon_id\": 1}}", t % 3))
            .collect::<Vec<_>>()
            .join("\n");
        let observations: Vec<Observation> = JsonLinesSource::new(Cursor::new(input))
            .collect::<crate::Result<_>>()
            .unwrap();
        assert_eq!(observations.len(), 20);

        let candidate = EvaluationSession::new(LastValueStrategy::new(1.0, 1.0).unwrap()).unwrap();
        let reference = EvaluationSession::new(ConstantStrategy::new(1.0, 1.0, 1.0)).unwrap();
        let mut harness = BenchmarkHarness::new(candidate, reference, 5);

        let mut reports = 0;
        let report = harness.run(observations, |_| reports += 1).unwrap();
        assert_eq!(reports, 4);
        assert_eq!(report.ticks, 20);
        assert_eq!(report.candidate_scores, 18);
        assert_eq!(report.reference_scores, 19);
    }

    #[test]
    fn test_harness_from_config() {
        let config: ArenaConfig = toml::from_str(
            r#"
            [session]
            rolling_capacity = 50

            [candidate]
            horizon = 5.0
            fading_factor = 0.05

            [reference]
            kind = "last_value"
            scale = 3.0

            [source]
            seed = 7
            "#,
        )
        .unwrap();
        config.validate().unwrap();

        let candidate = EvaluationSession::with_config(
            EwmaVarianceStrategy::new(config.candidate.clone()).unwrap(),
            config.session.clone(),
        )
        .unwrap();
        let reference = EvaluationSession::with_config(
            config.reference.build(config.candidate.horizon).unwrap(),
            config.session.clone(),
        )
        .unwrap();
        let mut harness = BenchmarkHarness::new(candidate, reference, config.harness.report_every);

        let walk = SyntheticWalk::new(&config.source).unwrap().take(500);
        let report = harness.run(walk, |_| {}).unwrap();

        assert_eq!(report.ticks, 500);
        assert_eq!(report.candidate, "EwmaVariance");
        assert_eq!(report.reference, "LastValue");
        assert!(report.candidate_scores > 0 && report.reference_scores > 0);
        assert!(report.candidate_lifetime.is_finite());
        assert!(report.reference_lifetime.is_finite());
        assert_eq!(harness.candidate().recent_window_len(), 50);
    }
}
