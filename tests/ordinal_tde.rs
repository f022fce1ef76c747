mod common;

use std::collections::HashSet;

use ordinal_tde::prelude::*;
use common::{ordinal_waves, univariate};


/// Tests for `OrdinalTde`.
#[cfg(test)]
pub mod ordinal_tde_tests {
    use super::*;

    fn small() -> OrdinalTde {
        OrdinalTde::init()
            .n_parameter_samples(5)
            .max_ensemble_size(2)
            .randomly_selected_params(3)
            .random_state(Some(42))
    }

    #[test]
    fn twenty_cases_three_classes() {
        let (x, y) = univariate(20, 42);
        let mut clf = small();
        clf.fit(&x, &y).unwrap();

        assert_eq!(clf.n_estimators().unwrap(), 2);
        assert_eq!(clf.weights().unwrap().len(), 2);
        assert_eq!(clf.n_classes().unwrap(), 3);
        assert_eq!(clf.n_cases().unwrap(), 20);
        assert_eq!(clf.n_timepoints().unwrap(), 40);

        let predictions = clf.predict(&x).unwrap();
        assert_eq!(predictions.len(), 20);
        let classes = clf.classes().unwrap();
        assert!(predictions.iter().all(|p| classes.contains(p)));
    }

    #[test]
    fn pool_size_is_min_of_cap_and_evaluations() {
        let (x, y) = univariate(12, 1);
        let mut clf = OrdinalTde::init()
            .n_parameter_samples(3)
            .max_ensemble_size(10)
            .randomly_selected_params(3)
            .random_state(Some(0));
        clf.fit(&x, &y).unwrap();
        assert_eq!(clf.n_estimators().unwrap(), 3);
        assert_eq!(clf.parameter_history().unwrap().len(), 3);
    }

    #[test]
    fn surrogate_phase_runs() {
        let (x, y) = univariate(12, 2);
        let mut clf = OrdinalTde::init()
            .n_parameter_samples(8)
            .max_ensemble_size(3)
            .randomly_selected_params(3)
            .random_state(Some(5));
        clf.fit(&x, &y).unwrap();

        let history = clf.parameter_history().unwrap();
        assert_eq!(history.len(), 8);
        let distinct = history.iter()
            .map(|(p, _)| *p)
            .collect::<HashSet<_>>();
        assert_eq!(distinct.len(), 8);
        assert_eq!(clf.n_estimators().unwrap(), 3);
    }

    #[test]
    fn seeded_fits_are_identical() {
        let (x, y) = univariate(15, 3);
        let (test, _) = univariate(9, 4);

        let mut a = small();
        a.fit(&x, &y).unwrap();
        let mut b = small();
        b.fit(&x, &y).unwrap();

        assert_eq!(a.weights().unwrap(), b.weights().unwrap());
        assert_eq!(a.predict(&test).unwrap(), b.predict(&test).unwrap());
        assert_eq!(
            a.predict_proba(&test).unwrap(),
            b.predict_proba(&test).unwrap(),
        );
    }

    #[test]
    fn worker_count_does_not_change_results() {
        let (x, y) = univariate(15, 8);
        let mut a = small();
        a.fit(&x, &y).unwrap();
        let mut b = small().n_jobs(Some(-1));
        b.fit(&x, &y).unwrap();
        assert_eq!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
    }

    #[test]
    fn proba_rows_sum_to_one() {
        let (x, y) = univariate(15, 5);
        let mut clf = small();
        clf.fit(&x, &y).unwrap();

        for row in clf.predict_proba(&x).unwrap() {
            assert_eq!(row.len(), 3);
            assert!((row.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        }

        for row in clf.fit_predict_proba(&x, &y).unwrap() {
            assert!((row.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn loocv_covered_cases_are_not_uniform() {
        let (x, y) = univariate(15, 6);
        let mut clf = small();
        let probas = clf.fit_predict_proba(&x, &y).unwrap();

        let mut covered = vec![false; 15];
        for member in clf.estimators().unwrap() {
            assert!(member.train_predictions().is_some());
            for &i in member.subsample() {
                covered[i] = true;
            }
        }

        let uniform = vec![1.0 / 3.0; 3];
        for (row, covered) in probas.iter().zip(covered) {
            // A covered case gets a one-hot vote mixture, never 1/3 each.
            assert_eq!(*row == uniform, !covered);
        }
    }

    #[test]
    fn oob_estimates() {
        let (x, y) = univariate(15, 7);
        let mut clf = small()
            .train_estimate_method(TrainEstimateMethod::Oob);
        let probas = clf.fit_predict_proba(&x, &y).unwrap();
        assert_eq!(probas.len(), 15);
        for row in &probas {
            assert!((row.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        }

        let predictions = clf.fit_predict(&x, &y).unwrap();
        assert_eq!(predictions.len(), 15);
    }

    #[test]
    fn bogus_train_estimate_method() {
        let err = "bogus".parse::<TrainEstimateMethod>().unwrap_err();
        assert!(matches!(err, TdeError::Config(_)));

        let err = OrdinalTdeConfig::from_json_str(
            r#"{"train_estimate_method": "bogus"}"#
        ).unwrap_err();
        assert!(matches!(err, TdeError::Config(_)));
    }

    #[test]
    fn config_from_json() {
        let config = OrdinalTdeConfig::from_json_str(r#"{
            "n_parameter_samples": 5,
            "max_ensemble_size": 2,
            "randomly_selected_params": 3,
            "random_state": 42
        }"#).unwrap();
        let (x, y) = univariate(20, 42);

        let mut a = OrdinalTde::from_config(config);
        a.fit(&x, &y).unwrap();
        let mut b = small();
        b.fit(&x, &y).unwrap();
        assert_eq!(a.weights().unwrap(), b.weights().unwrap());
    }

    #[test]
    fn json_round_trip() {
        let (x, y) = ordinal_waves(12, 2, 30, 3, 9);
        let mut clf = small();
        clf.fit(&x, &y).unwrap();

        let json = serde_json::to_string(&clf).unwrap();
        let restored: OrdinalTde = serde_json::from_str(&json).unwrap();

        assert_eq!(clf.weights().unwrap(), restored.weights().unwrap());
        assert_eq!(clf.predict(&x).unwrap(), restored.predict(&x).unwrap());
    }

    #[test]
    fn multivariate_ensemble() {
        let (x, y) = ordinal_waves(12, 3, 30, 3, 10);
        let mut clf = small().max_dims(2);
        clf.fit(&x, &y).unwrap();

        assert_eq!(clf.n_channels().unwrap(), 3);
        for member in clf.estimators().unwrap() {
            let channels = member.classifier().channels().unwrap();
            assert!(!channels.is_empty() && channels.len() <= 2);
            assert_eq!(member.classifier().highest_dim_bit(), Some(3));
        }
        assert_eq!(clf.predict(&x).unwrap().len(), 12);
    }

    #[test]
    fn missing_values_are_rejected() {
        let (x, y) = univariate(12, 11);
        let mut series = (0..12)
            .map(|i| x.series(i, 0).to_vec())
            .collect::<Vec<_>>();
        series[3][7] = f64::NAN;
        let x = SeriesCollection::from_univariate(series).unwrap();

        let mut clf = small();
        let err = clf.fit(&x, &y).unwrap_err();
        match err {
            TdeError::Capability { reason, .. } => {
                assert_eq!(reason, "missing values");
            },
            other => panic!("expected a capability error. got {other}"),
        }
        assert!(!clf.is_fitted());
    }

    #[test]
    fn min_window_above_series_length() {
        let (x, y) = ordinal_waves(12, 1, 8, 3, 12);
        let mut clf = small().min_window(20);
        clf.fit(&x, &y).unwrap();
        for (params, _) in clf.parameter_history().unwrap() {
            assert_eq!(params.window_size, 8);
        }
    }

    #[test]
    fn time_contract() {
        let (x, y) = univariate(12, 13);
        let mut clf = OrdinalTde::init()
            .time_limit_in_minutes(0.05)
            .contract_max_n_parameter_samples(Some(3))
            .max_ensemble_size(5)
            .randomly_selected_params(2)
            .random_state(Some(1));
        clf.fit(&x, &y).unwrap();

        let evaluated = clf.parameter_history().unwrap().len();
        assert!((1..=3).contains(&evaluated));
        assert_eq!(clf.n_estimators().unwrap(), evaluated);
    }

    #[test]
    fn huge_time_contract_is_a_config_error() {
        let (x, y) = univariate(12, 15);
        let mut clf = small()
            .time_limit_in_minutes(1e20)
            .contract_max_n_parameter_samples(Some(2));
        assert!(matches!(clf.fit(&x, &y), Err(TdeError::Config(_))));
    }

    #[test]
    fn label_mismatch() {
        let (x, _) = univariate(12, 14);
        let mut clf = small();
        assert!(matches!(
            clf.fit(&x, &[0, 1, 2]),
            Err(TdeError::InvalidInput(_))
        ));
    }
}
