//! Property-based tests for line-item pricing and dashboard time windows.

use chrono::{DateTime, Datelike, TimeZone, Utc};
use crm_api::services::{
    dashboard::{month_window, year_window},
    pricing::{calculate_total, line_total, LineItem},
};
use proptest::prelude::*;
use rust_decimal::Decimal;

fn amount_strategy(max_units: i64) -> impl Strategy<Value = Decimal> {
    (0..max_units * 100).prop_map(|cents| Decimal::new(cents, 2))
}

fn line_item_strategy() -> impl Strategy<Value = LineItem> {
    (amount_strategy(1_000), amount_strategy(100_000), 0u32..=100)
        .prop_map(|(quantity, unit_price, discount)| {
            LineItem::new(quantity, unit_price, Decimal::from(discount))
        })
}

fn instant_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    // 2000-01-01 .. 2100-01-01
    (946_684_800i64..4_102_444_800).prop_map(|secs| Utc.timestamp_opt(secs, 0).unwrap())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn total_is_sum_of_line_totals(items in prop::collection::vec(line_item_strategy(), 0..20)) {
        let expected: Decimal = items.iter().map(line_total).sum();
        prop_assert_eq!(calculate_total(&items), expected);
    }

    #[test]
    fn total_ignores_item_order(items in prop::collection::vec(line_item_strategy(), 0..20)) {
        let mut reversed = items.clone();
        reversed.reverse();
        prop_assert_eq!(calculate_total(&items), calculate_total(&reversed));
    }

    #[test]
    fn line_total_is_bounded_by_undiscounted_price(item in line_item_strategy()) {
        let total = line_total(&item);
        prop_assert!(total >= Decimal::ZERO);
        prop_assert!(total <= item.unit_price * item.quantity);
    }

    #[test]
    fn month_window_contains_now(now in instant_strategy()) {
        let window = month_window(now).unwrap();
        prop_assert!(window.contains(now));
        prop_assert!(!window.contains(window.end));
        prop_assert_eq!(window.start.day(), 1);
        prop_assert_eq!(window.end.day(), 1);
        prop_assert_eq!(window.start.month(), now.month());
    }

    #[test]
    fn year_window_contains_month_window(now in instant_strategy()) {
        let month = month_window(now).unwrap();
        let year = year_window(now).unwrap();
        prop_assert!(year.start <= month.start);
        prop_assert!(month.end <= year.end);
        prop_assert_eq!(year.start.year(), now.year());
        prop_assert_eq!(year.end.year(), now.year() + 1);
    }
}
