//! Property tests for strategy identifiers and the walker.

mod common;

use common::*;
use daytrader::domain::condition::{ConditionKind, ConditionSet};
use daytrader::domain::frame::Frame;
use daytrader::domain::strategy::{enumerate_all, parse_id, reconstruct};
use daytrader::domain::walker::{NOTIONAL, TradeLimits, Walker, WalkerConfig};
use proptest::prelude::*;

fn catalog() -> ConditionSet {
    ConditionSet::from_kinds(&ConditionKind::ALL)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn identifiers_round_trip(index in 0usize..958) {
        let set = catalog();
        let strategies = enumerate_all(&set);
        let strategy = strategies[index];

        let id = strategy.id();
        prop_assert_eq!(parse_id(&id).unwrap().len(), 3);
        prop_assert_eq!(reconstruct(&id, &set).unwrap(), strategy);
    }

    #[test]
    fn walking_is_deterministic(
        steps in prop::collection::vec(-0.3f64..0.3, 150..300),
        limits in any::<bool>(),
    ) {
        let mut price = 100.0;
        let closes: Vec<f64> = steps
            .iter()
            .map(|step| {
                price += step;
                price
            })
            .collect();
        let mut frame = Frame::new(minute_candles(at(6, 10, 0), &closes));
        let set = ConditionSet::build(&mut frame);
        let strategies: Vec<_> = enumerate_all(&set).into_iter().take(40).collect();

        let mut config = WalkerConfig::default();
        if limits {
            config.limits = Some(TradeLimits {
                stop_loss: 0.98,
                take_profit: 1.015,
            });
        }
        let walker = Walker::new(config);

        let sequential: Vec<_> = strategies.iter().map(|s| walker.walk(s, &frame)).collect();
        prop_assert_eq!(&walker.traverse(&strategies, &frame), &sequential);

        for outcome in &sequential {
            prop_assert_eq!(outcome.summary.trades(), outcome.trades.len());
            prop_assert_eq!(
                outcome.summary.profit,
                outcome.trades.iter().map(|t| t.profit - NOTIONAL).sum::<i64>()
            );
            prop_assert!(outcome.trades.iter().all(|t| t.time_buy < t.time_sell));
        }
    }
}
