use proptest::prelude::*;
use shopsim::release::{OrderPool, PooledOrder};
use shopsim::stats::FlowTimeHistory;

fn naive_mean(values: &[u64], n: usize) -> f64 {
    let window = &values[values.len().saturating_sub(n)..];
    if window.is_empty() {
        0.0
    } else {
        window.iter().map(|v| *v as f64).sum::<f64>() / window.len() as f64
    }
}

proptest! {
    #[test]
    fn rolling_mean_matches_naive_window(values in prop::collection::vec(0u64..10_000, 0..120)) {
        let mut history = FlowTimeHistory::new();
        for (i, value) in values.iter().enumerate() {
            history.push(*value);
            let seen = &values[..=i];
            prop_assert!((history.mean_of_last(5) - naive_mean(seen, 5)).abs() < 1e-6);
            prop_assert!((history.mean_of_last(50) - naive_mean(seen, 50)).abs() < 1e-6);
            prop_assert_eq!(history.last(), *value as f64);
        }
    }

    #[test]
    fn median_lies_within_window(values in prop::collection::vec(0u64..10_000, 1..60)) {
        let mut history = FlowTimeHistory::new();
        for value in &values {
            history.push(*value);
        }
        let window = &values[values.len().saturating_sub(5)..];
        let median = history.median_of_last(5);
        let min = *window.iter().min().unwrap() as f64;
        let max = *window.iter().max().unwrap() as f64;
        prop_assert!(median >= min && median <= max);
    }

    #[test]
    fn take_due_splits_pool_exactly(
        periods in prop::collection::vec(-3i64..20, 0..80),
        cutoff in -5i64..25,
    ) {
        let mut pool = OrderPool::new();
        for (i, period) in periods.iter().enumerate() {
            pool.insert(*period, PooledOrder { order_id: i as u64, due_date: 0, planned_release: 0 });
        }

        let released = pool.take_due(cutoff);
        let expected_due = periods.iter().filter(|p| **p <= cutoff).count();

        prop_assert_eq!(released.len(), expected_due);
        prop_assert_eq!(pool.len(), periods.len() - expected_due);
        prop_assert!(pool.periods().all(|p| p > cutoff));
        for order in &released {
            prop_assert!(periods[order.order_id as usize] <= cutoff);
        }
    }
}
