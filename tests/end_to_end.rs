//! End-to-end checks across sampling, statistics, and reporting.
//!
//! Run with: cargo test --test end_to_end

use simstats::experiment::{run_experiments, ExperimentConfig, ProductionScenario, STATUS_COLUMN};
use simstats::random::create_rng;
use simstats::report::{columns, render, Report, Value};
use simstats::sampler::{assembly_line_time, exponential_sample, produce};
use simstats::stats::{mean_variance, quantile, summarize};
use simstats::SimError;

// ============================================================================
// Sampling and statistics
// ============================================================================

mod sampling {
    use super::*;

    #[test]
    fn exponential_moments_match_theory() {
        let mut rng = create_rng(2024);
        let draws = exponential_sample(180.0, (100_000, 1), &mut rng).unwrap();
        assert_eq!(draws.shape().dims(), &[100_000, 1]);

        let (mean, variance) = mean_variance(draws.as_slice()).unwrap();
        assert!((mean - 180.0).abs() < 2.0, "mean {mean}");
        assert!((variance / 32_400.0 - 1.0).abs() < 0.05, "variance {variance}");

        // median of Exp(mean) is mean · ln 2
        let median = quantile(draws.as_slice(), 0.5).unwrap();
        let expected = 180.0 * std::f64::consts::LN_2;
        assert!((median / expected - 1.0).abs() < 0.05, "median {median}");
    }

    #[test]
    fn assembly_line_time_is_sum_of_station_times() {
        let mut rng = create_rng(11);
        let times: Vec<f64> = (0..20_000)
            .map(|_| assembly_line_time(3.0, 5, &mut rng).unwrap())
            .collect();
        let (mean, variance) = mean_variance(&times).unwrap();
        // Gamma(5, 3): mean 15, variance 45
        assert!((mean - 15.0).abs() < 0.3, "mean {mean}");
        assert!((variance - 45.0).abs() < 3.0, "variance {variance}");
    }

    #[test]
    fn production_runs_are_reproducible_and_bounded() {
        let run = |seed| {
            let mut rng = create_rng(seed);
            (0..500)
                .map(|_| produce(480.0, 3.0, 180.0, &mut rng).unwrap() as f64)
                .collect::<Vec<_>>()
        };
        let a = run(9);
        assert_eq!(a, run(9));

        let summary = summarize(&a, 0.05, 0.95).unwrap();
        assert!(summary.lower_quantile <= summary.mean);
        assert!(summary.mean <= summary.upper_quantile);
        assert!(summary.mean > 25.0 && summary.mean < 33.0, "{summary:?}");
    }

    #[test]
    fn invalid_arguments_are_rejected() {
        let mut rng = create_rng(0);
        assert!(matches!(
            exponential_sample(0.0, 10, &mut rng),
            Err(SimError::InvalidArgument(_))
        ));
        assert!(matches!(
            produce(480.0, -3.0, 180.0, &mut rng),
            Err(SimError::InvalidArgument(_))
        ));
        assert!(mean_variance(&[]).is_err());
        assert!(quantile(&[1.0], 1.5).is_err());
    }

    #[test]
    fn no_time_counts_the_unfinished_unit() {
        let mut rng = create_rng(0);
        assert_eq!(produce(0.0, 3.0, 180.0, &mut rng).unwrap(), -1);
        assert_eq!(produce(-10.0, 3.0, 0.0, &mut rng).unwrap(), -1);
    }
}

// ============================================================================
// Experiments and reporting
// ============================================================================

mod pipeline {
    use super::*;

    #[test]
    fn experiment_rows_render_as_one_table() {
        let config = ExperimentConfig {
            seed: Some(5),
            trials: vec![100, 1000],
            production: vec![
                ProductionScenario::default(),
                ProductionScenario {
                    mean: 0.0,
                    ..ProductionScenario::default()
                },
            ],
            options: vec![],
            ..ExperimentConfig::default()
        };
        let reports = run_experiments(&config);
        assert_eq!(reports.len(), 4);
        assert!(reports[3].contains_key(STATUS_COLUMN));

        let table = render(&reports, None);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2 + reports.len());
        let width = lines[0].chars().count();
        assert!(lines.iter().all(|l| l.chars().count() == width));

        let titles = columns(&reports, None);
        for title in ["production time", "number of trials", "sample mean", "5% percentile"] {
            assert!(titles.iter().any(|t| t == title), "missing {title}");
        }
        assert_eq!(titles.last().map(String::as_str), Some(STATUS_COLUMN));
    }

    #[test]
    fn config_file_drives_the_run() {
        let path = std::env::temp_dir().join(format!("simstats-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{ "seed": 1, "trials": [50], "options": [], "upper_quantile": 0.9 }"#,
        )
        .unwrap();
        let config = ExperimentConfig::from_path(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        let reports = run_experiments(&config);
        assert_eq!(reports.len(), 1);
        assert!(reports[0].contains_key("90% percentile"));
        assert_eq!(reports[0].get("number of trials"), Some(&Value::Int(50)));
    }

    #[test]
    fn known_titles_fix_column_order() {
        let reports = vec![
            Report::new().with("sample mean", 31.5).with("number of trials", 100),
        ];
        let table = render(&reports, Some(&["number of trials", "sample mean"]));
        assert!(table.starts_with("| number of trials| sample mean|\n"));
        assert!(table.ends_with("| 100             | 31.5       |\n"));
    }
}
