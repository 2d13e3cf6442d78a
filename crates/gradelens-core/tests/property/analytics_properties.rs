use gradelens_core::bayes::{bayes_update, BayesQuery};
use gradelens_core::conditional::{conditional_probability, ConditionalQuery};
use gradelens_core::correlation::correlation_matrix;
use gradelens_core::dataset::Dataset;
use gradelens_core::model::{record_from_bits, ItemIndex, Outcome, Threshold, ITEM_COUNT};
use gradelens_core::query::{execute, AnalyticsQuery};
use gradelens_core::statistics::describe;
use proptest::prelude::*;

fn dataset_strategy() -> impl Strategy<Value = Dataset> {
    prop::collection::vec(prop::array::uniform10(0u8..=1), 1..60).prop_map(|rows| {
        let records = rows
            .into_iter()
            .enumerate()
            .map(|(i, bits)| record_from_bits(i as u32 + 1, bits).unwrap());
        Dataset::new(records).unwrap()
    })
}

fn item() -> impl Strategy<Value = ItemIndex> {
    (1u8..=ITEM_COUNT as u8).prop_map(|n| ItemIndex::new(n).unwrap())
}

proptest! {
    #[test]
    fn mean_and_median_lie_within_range(ds in dataset_strategy()) {
        let s = describe(&ds).unwrap();
        let (min, max) = (f64::from(s.min), f64::from(s.max));
        prop_assert!(min <= s.mean && s.mean <= max, "mean {} not in [{min}, {max}]", s.mean);
        prop_assert!(min <= s.median && s.median <= max, "median {} not in [{min}, {max}]", s.median);
        prop_assert!(s.std_dev >= 0.0);
        prop_assert_eq!(s.student_count, ds.len());
        for p in s.question_stats.values() {
            prop_assert!((0.0..=1.0).contains(p));
        }
        let bucketed: usize = s.score_distribution.iter().map(|b| b.count).sum();
        prop_assert_eq!(bucketed, ds.len());
    }

    #[test]
    fn correlation_matrix_is_symmetric_with_unit_diagonal(ds in dataset_strategy()) {
        let m = correlation_matrix(&ds).unwrap();
        prop_assert_eq!(m.matrix.len(), ITEM_COUNT);
        for i in 0..ITEM_COUNT {
            prop_assert_eq!(m.matrix[i][i], 1.0);
            for j in 0..ITEM_COUNT {
                let r = m.matrix[i][j];
                prop_assert!((-1.0..=1.0).contains(&r), "r[{i}][{j}] = {r}");
                prop_assert_eq!(r, m.matrix[j][i]);
            }
        }
    }

    #[test]
    fn conditional_probability_is_bounded(ds in dataset_strategy(), given in item(), target in item()) {
        let q = ConditionalQuery { given, target };
        if let Ok(c) = conditional_probability(&ds, &q) {
            prop_assert!((0.0..=1.0).contains(&c.probability));
            prop_assert!(c.both_correct_count <= c.given_correct_count);
        }
    }

    #[test]
    fn item_given_itself_is_certain(ds in dataset_strategy(), given in item()) {
        let q = ConditionalQuery { given, target: given };
        if let Ok(c) = conditional_probability(&ds, &q) {
            prop_assert_eq!(c.probability, 1.0);
        }
    }

    #[test]
    fn posterior_agrees_with_bayes_rule(
        ds in dataset_strategy(),
        condition in item(),
        correct in any::<bool>(),
        threshold in 0u8..=10,
    ) {
        let q = BayesQuery {
            condition,
            value: if correct { Outcome::Correct } else { Outcome::Incorrect },
            threshold: Threshold::new(threshold).unwrap(),
        };
        if let Ok(u) = bayes_update(&ds, &q) {
            for p in [u.prior_probability, u.likelihood_probability, u.posterior_probability] {
                prop_assert!((0.0..=1.0).contains(&p));
            }
            let via_rule = u.posterior_from_bayes_rule();
            prop_assert!((u.posterior_probability - via_rule).abs() < 1e-9);
        }
    }

    #[test]
    fn queries_are_idempotent(
        ds in dataset_strategy(),
        given in item(),
        target in item(),
        correct in any::<bool>(),
        threshold in 0u8..=10,
    ) {
        let bayes = BayesQuery {
            condition: given,
            value: if correct { Outcome::Correct } else { Outcome::Incorrect },
            threshold: Threshold::new(threshold).unwrap(),
        };
        for q in [
            AnalyticsQuery::Grades,
            AnalyticsQuery::Statistics,
            AnalyticsQuery::CorrelationMatrix,
            AnalyticsQuery::Conditional(ConditionalQuery { given, target }),
            AnalyticsQuery::Bayes(bayes),
        ] {
            prop_assert_eq!(execute(&ds, &q), execute(&ds, &q));
        }
    }
}
